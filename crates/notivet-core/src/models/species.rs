//! Canonical species codes and the stored-list parsers.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Canonical animal species/category code as stored on drug records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Species {
    Canine,
    Feline,
    Equine,
    Bovine,
    Ovine,
    Caprine,
    Porcine,
    Avian,
    Exotic,
}

impl Species {
    /// All canonical codes, in declaration order.
    pub const ALL: [Species; 9] = [
        Species::Canine,
        Species::Feline,
        Species::Equine,
        Species::Bovine,
        Species::Ovine,
        Species::Caprine,
        Species::Porcine,
        Species::Avian,
        Species::Exotic,
    ];

    /// Stored code (e.g. `"CANINE"`).
    pub fn code(&self) -> &'static str {
        match self {
            Species::Canine => "CANINE",
            Species::Feline => "FELINE",
            Species::Equine => "EQUINE",
            Species::Bovine => "BOVINE",
            Species::Ovine => "OVINE",
            Species::Caprine => "CAPRINE",
            Species::Porcine => "PORCINE",
            Species::Avian => "AVIAN",
            Species::Exotic => "EXOTIC",
        }
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Error for a string that is not a canonical species code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown species code: {0}")]
pub struct UnknownSpecies(pub String);

impl FromStr for Species {
    type Err = UnknownSpecies;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        Species::ALL
            .iter()
            .copied()
            .find(|sp| sp.code() == upper)
            .ok_or(UnknownSpecies(s.to_string()))
    }
}

/// Serialize a species list the way the `species` column stores it.
pub fn serialize_species(species: &[Species]) -> String {
    let codes: Vec<&str> = species.iter().map(Species::code).collect();
    // A list of plain strings always serializes.
    serde_json::to_string(&codes).unwrap_or_else(|_| "[]".to_string())
}

/// Parse a stored species payload into a set of canonical codes.
///
/// This is the only place stored species text is interpreted. Empty or
/// malformed payloads yield an empty set; unknown codes inside a well-formed
/// list are skipped.
pub fn parse_species(raw: &str) -> serde_json::Result<BTreeSet<Species>> {
    Ok(parse_string_list(raw)?
        .iter()
        .filter_map(|code| code.parse().ok())
        .collect())
}

/// Parse a stored JSON string list (species, delivery methods).
///
/// Blank text is an empty list.
pub fn parse_string_list(raw: &str) -> serde_json::Result<Vec<String>> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(raw)
}
