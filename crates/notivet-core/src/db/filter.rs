//! Composable record filters and their SQL rendering.

use crate::models::{DrugField, Species};

/// Boolean filter over drug records.
#[derive(Debug, Clone, PartialEq)]
pub enum DrugFilter {
    /// Every sub-filter must match. Empty means "match everything".
    All(Vec<DrugFilter>),
    /// At least one sub-filter must match. Empty means "match nothing".
    Any(Vec<DrugFilter>),
    /// Field contains the text (ASCII case-insensitive).
    FieldContains(DrugField, String),
    /// Stored species list mentions the code.
    SpeciesContains(Species),
}

impl DrugFilter {
    /// Render as a SQL boolean expression, appending bound parameters.
    pub fn to_sql(&self, params: &mut Vec<String>) -> String {
        match self {
            DrugFilter::All(filters) => join_sql(filters, " AND ", "1", params),
            DrugFilter::Any(filters) => join_sql(filters, " OR ", "0", params),
            DrugFilter::FieldContains(field, text) => {
                params.push(like_pattern(text));
                format!("{} LIKE ? ESCAPE '\\'", field.column())
            }
            DrugFilter::SpeciesContains(species) => {
                params.push(like_pattern(species.code()));
                "species LIKE ? ESCAPE '\\'".to_string()
            }
        }
    }
}

/// Longest run of terms rendered under one pair of parentheses.
const MAX_FLAT_TERMS: usize = 64;

fn join_sql(
    filters: &[DrugFilter],
    separator: &str,
    empty: &str,
    params: &mut Vec<String>,
) -> String {
    if filters.is_empty() {
        return empty.to_string();
    }
    let mut parts: Vec<String> = filters.iter().map(|f| f.to_sql(params)).collect();
    // SQLite parses a flat chain as a left-deep tree capped at depth 1000.
    while parts.len() > MAX_FLAT_TERMS {
        parts = parts
            .chunks(MAX_FLAT_TERMS)
            .map(|chunk| format!("({})", chunk.join(separator)))
            .collect();
    }
    format!("({})", parts.join(separator))
}

/// Wrap text in `%` wildcards, escaping LIKE metacharacters.
fn like_pattern(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + 2);
    escaped.push('%');
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}
