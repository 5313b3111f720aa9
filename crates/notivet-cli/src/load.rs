//! Bulk drug import from JSON.

use std::path::Path;

use anyhow::{Context, Result};
use notivet_core::models::{Drug, Species};
use serde::Deserialize;

/// One drug entry in an import file. Species are canonical codes.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrugEntry {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub generic_name: Option<String>,
    pub active_ingredient: String,
    pub manufacturer: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub dosage: Option<String>,
    #[serde(default)]
    pub contraindications: Option<String>,
    #[serde(default)]
    pub warnings: Option<String>,
    #[serde(default)]
    pub farad_info: Option<String>,
    #[serde(default)]
    pub withdrawal_time: Option<String>,
    #[serde(default)]
    pub product_code: Option<String>,
    #[serde(default)]
    pub establishment_code: Option<String>,
    #[serde(default)]
    pub subsidiaries: Option<String>,
    #[serde(default)]
    pub trade_name: Option<String>,
    #[serde(default)]
    pub distributors: Option<String>,
    #[serde(default)]
    pub species: Vec<Species>,
    #[serde(default)]
    pub delivery_methods: Vec<String>,
    /// RFC 3339; defaults to import time
    #[serde(default)]
    pub created_at: Option<String>,
}

impl DrugEntry {
    pub fn into_drug(self) -> Drug {
        let mut drug = Drug::new(self.name, self.active_ingredient, self.manufacturer);
        if let Some(id) = self.id.filter(|id| !id.is_empty()) {
            drug.id = id;
        }
        if let Some(created_at) = self.created_at {
            drug.created_at = created_at;
        }
        drug.generic_name = self.generic_name;
        drug.description = self.description;
        drug.dosage = self.dosage;
        drug.contraindications = self.contraindications;
        drug.warnings = self.warnings;
        drug.farad_info = self.farad_info;
        drug.withdrawal_time = self.withdrawal_time;
        drug.product_code = self.product_code;
        drug.establishment_code = self.establishment_code;
        drug.subsidiaries = self.subsidiaries;
        drug.trade_name = self.trade_name;
        drug.distributors = self.distributors;
        drug.set_species(&self.species);
        drug.set_delivery_methods(&self.delivery_methods);
        drug
    }
}

/// Parse a JSON array of drug entries.
pub fn parse_entries(json: &str) -> Result<Vec<Drug>> {
    let entries: Vec<DrugEntry> = serde_json::from_str(json)?;
    Ok(entries.into_iter().map(DrugEntry::into_drug).collect())
}

/// Read and parse an import file.
pub fn read_entries(path: &Path) -> Result<Vec<Drug>> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse_entries(&json).with_context(|| format!("Invalid drug file {}", path.display()))
}
