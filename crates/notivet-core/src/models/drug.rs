//! Drug record models.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::species::{parse_species, parse_string_list, serialize_species, Species};

/// A veterinary drug product as stored in the `drugs` table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Drug {
    /// Opaque unique identifier
    pub id: String,
    /// Product name
    pub name: String,
    pub generic_name: Option<String>,
    pub active_ingredient: String,
    pub manufacturer: String,
    pub description: Option<String>,
    pub dosage: Option<String>,
    pub contraindications: Option<String>,
    pub warnings: Option<String>,
    /// FARAD (residue avoidance) notes
    pub farad_info: Option<String>,
    pub withdrawal_time: Option<String>,
    pub product_code: Option<String>,
    pub establishment_code: Option<String>,
    pub subsidiaries: Option<String>,
    pub trade_name: Option<String>,
    pub distributors: Option<String>,
    /// JSON array of species codes, as stored
    pub species: String,
    /// JSON array of delivery methods (e.g. "ORAL"), as stored
    pub delivery_methods: String,
    /// RFC 3339 creation timestamp, used for recency ordering
    pub created_at: String,
}

impl Drug {
    /// Create a new drug record with required fields.
    pub fn new(name: String, active_ingredient: String, manufacturer: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            generic_name: None,
            active_ingredient,
            manufacturer,
            description: None,
            dosage: None,
            contraindications: None,
            warnings: None,
            farad_info: None,
            withdrawal_time: None,
            product_code: None,
            establishment_code: None,
            subsidiaries: None,
            trade_name: None,
            distributors: None,
            species: "[]".to_string(),
            delivery_methods: "[]".to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Replace the stored species list.
    pub fn set_species(&mut self, species: &[Species]) {
        self.species = serialize_species(species);
    }

    /// Replace the stored delivery-method list.
    pub fn set_delivery_methods<S: AsRef<str>>(&mut self, methods: &[S]) {
        let methods: Vec<&str> = methods.iter().map(|m| m.as_ref()).collect();
        self.delivery_methods =
            serde_json::to_string(&methods).unwrap_or_else(|_| "[]".to_string());
    }

    /// Parsed species set. Malformed data yields an empty set.
    pub fn species_set(&self) -> BTreeSet<Species> {
        parse_species(&self.species).unwrap_or_else(|e| {
            self.warn_malformed("species", &self.species, &e);
            BTreeSet::new()
        })
    }

    /// Parsed delivery methods. Malformed data yields an empty list.
    pub fn delivery_method_list(&self) -> Vec<String> {
        parse_string_list(&self.delivery_methods).unwrap_or_else(|e| {
            self.warn_malformed("delivery_methods", &self.delivery_methods, &e);
            Vec::new()
        })
    }

    fn warn_malformed(&self, column: &str, payload: &str, error: &serde_json::Error) {
        tracing::warn!(
            id = %self.id,
            column,
            payload,
            error = %error,
            "malformed stored list, treating as empty"
        );
    }

    /// Value of a searchable text field.
    pub fn field(&self, field: DrugField) -> Option<&str> {
        match field {
            DrugField::Name => Some(&self.name),
            DrugField::GenericName => self.generic_name.as_deref(),
            DrugField::ActiveIngredient => Some(&self.active_ingredient),
            DrugField::Manufacturer => Some(&self.manufacturer),
            DrugField::Description => self.description.as_deref(),
            DrugField::Dosage => self.dosage.as_deref(),
            DrugField::Contraindications => self.contraindications.as_deref(),
            DrugField::Warnings => self.warnings.as_deref(),
            DrugField::FaradInfo => self.farad_info.as_deref(),
            DrugField::WithdrawalTime => self.withdrawal_time.as_deref(),
            DrugField::ProductCode => self.product_code.as_deref(),
            DrugField::EstablishmentCode => self.establishment_code.as_deref(),
            DrugField::Subsidiaries => self.subsidiaries.as_deref(),
            DrugField::TradeName => self.trade_name.as_deref(),
            DrugField::Distributors => self.distributors.as_deref(),
        }
    }

    /// Lowercased concatenation of every searchable field plus the raw
    /// species and delivery-method payloads.
    pub fn haystack(&self) -> String {
        DrugField::SEARCHABLE
            .iter()
            .filter_map(|f| self.field(*f))
            .chain([self.species.as_str(), self.delivery_methods.as_str()])
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" \n ")
            .to_lowercase()
    }

    /// Label used when citing this drug: trade name if present, else name.
    pub fn display_name(&self) -> &str {
        match self.trade_name.as_deref() {
            Some(trade) if !trade.is_empty() => trade,
            _ => &self.name,
        }
    }
}

/// Text fields the matcher searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrugField {
    Name,
    GenericName,
    ActiveIngredient,
    Manufacturer,
    Description,
    Dosage,
    Contraindications,
    Warnings,
    FaradInfo,
    WithdrawalTime,
    ProductCode,
    EstablishmentCode,
    Subsidiaries,
    TradeName,
    Distributors,
}

impl DrugField {
    /// Every field consulted by retrieval.
    pub const SEARCHABLE: [DrugField; 15] = [
        DrugField::Name,
        DrugField::GenericName,
        DrugField::ActiveIngredient,
        DrugField::Manufacturer,
        DrugField::Description,
        DrugField::Dosage,
        DrugField::Contraindications,
        DrugField::Warnings,
        DrugField::FaradInfo,
        DrugField::WithdrawalTime,
        DrugField::ProductCode,
        DrugField::EstablishmentCode,
        DrugField::Subsidiaries,
        DrugField::TradeName,
        DrugField::Distributors,
    ];

    /// Column name in the `drugs` table.
    pub fn column(&self) -> &'static str {
        match self {
            DrugField::Name => "name",
            DrugField::GenericName => "generic_name",
            DrugField::ActiveIngredient => "active_ingredient",
            DrugField::Manufacturer => "manufacturer",
            DrugField::Description => "description",
            DrugField::Dosage => "dosage",
            DrugField::Contraindications => "contraindications",
            DrugField::Warnings => "warnings",
            DrugField::FaradInfo => "farad_info",
            DrugField::WithdrawalTime => "withdrawal_time",
            DrugField::ProductCode => "product_code",
            DrugField::EstablishmentCode => "establishment_code",
            DrugField::Subsidiaries => "subsidiaries",
            DrugField::TradeName => "trade_name",
            DrugField::Distributors => "distributors",
        }
    }
}
