//! Models produced by the query matcher.

use serde::{Deserialize, Serialize};

use super::drug::Drug;
use super::species::Species;

/// A retrieved drug with its relevance score.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    /// The candidate record
    pub drug: Drug,
    /// Heuristic relevance score (higher is better)
    pub score: u32,
    /// Normalized name equals the brand phrase
    pub exact_name_match: bool,
    /// Normalized trade name equals the brand phrase
    pub exact_trade_match: bool,
    /// Every brand token occurs in the normalized name
    pub all_tokens_in_name: bool,
    /// Every brand token occurs in the normalized trade name
    pub all_tokens_in_trade: bool,
}

impl ScoredCandidate {
    /// Strict matches carry every brand token in name or trade name.
    pub fn is_strict(&self) -> bool {
        self.all_tokens_in_name || self.all_tokens_in_trade
    }
}

/// Character budgets for the long text fields of a [`DrugDigest`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DigestBudgets {
    #[serde(default = "default_description")]
    pub description: usize,
    #[serde(default = "default_clinical")]
    pub dosage: usize,
    #[serde(default = "default_clinical")]
    pub contraindications: usize,
    #[serde(default = "default_clinical")]
    pub warnings: usize,
    #[serde(default = "default_regulatory")]
    pub farad_info: usize,
    #[serde(default = "default_withdrawal")]
    pub withdrawal_time: usize,
}

fn default_description() -> usize {
    400
}

fn default_clinical() -> usize {
    300
}

fn default_regulatory() -> usize {
    200
}

fn default_withdrawal() -> usize {
    120
}

impl Default for DigestBudgets {
    fn default() -> Self {
        Self {
            description: default_description(),
            dosage: default_clinical(),
            contraindications: default_clinical(),
            warnings: default_clinical(),
            farad_info: default_regulatory(),
            withdrawal_time: default_withdrawal(),
        }
    }
}

/// Truncated projection of a drug, used as grounding context.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DrugDigest {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generic_name: Option<String>,
    pub manufacturer: String,
    pub active_ingredient: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trade_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_code: Option<String>,
    pub species: Vec<Species>,
    pub delivery_methods: Vec<String>,
    pub description: String,
    pub dosage: String,
    pub contraindications: String,
    pub warnings: String,
    pub farad_info: String,
    pub withdrawal_time: String,
}

impl DrugDigest {
    /// Project a drug record, truncating long fields to the given budgets.
    pub fn from_drug(drug: &Drug, budgets: &DigestBudgets) -> Self {
        Self {
            id: drug.id.clone(),
            name: drug.name.clone(),
            generic_name: non_empty(&drug.generic_name),
            manufacturer: drug.manufacturer.clone(),
            active_ingredient: drug.active_ingredient.clone(),
            trade_name: non_empty(&drug.trade_name),
            product_code: non_empty(&drug.product_code),
            species: drug.species_set().into_iter().collect(),
            delivery_methods: drug.delivery_method_list(),
            description: truncate(drug.description.as_deref(), budgets.description),
            dosage: truncate(drug.dosage.as_deref(), budgets.dosage),
            contraindications: truncate(
                drug.contraindications.as_deref(),
                budgets.contraindications,
            ),
            warnings: truncate(drug.warnings.as_deref(), budgets.warnings),
            farad_info: truncate(drug.farad_info.as_deref(), budgets.farad_info),
            withdrawal_time: truncate(drug.withdrawal_time.as_deref(), budgets.withdrawal_time),
        }
    }

    /// Citation label: trade name if present, else name.
    pub fn source_label(&self) -> &str {
        self.trade_name.as_deref().unwrap_or(&self.name)
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.is_empty()).cloned()
}

/// Cap text at `max` characters, marking the cut with an ellipsis.
pub fn truncate(text: Option<&str>, max: usize) -> String {
    let Some(text) = text else {
        return String::new();
    };
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max).collect();
    out.push('…');
    out
}
