//! Natural-language species resolution.

use std::collections::{BTreeMap, BTreeSet};

use crate::models::Species;

use super::QueryTokens;

/// Maps animal words (singular, plural, colloquial) to species codes.
#[derive(Debug, Clone)]
pub struct SpeciesResolver {
    synonyms: BTreeMap<String, Species>,
}

impl Default for SpeciesResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl SpeciesResolver {
    /// Create a resolver with the default synonym table.
    pub fn new() -> Self {
        Self::with_synonyms(Self::default_synonyms())
    }

    /// Create a resolver over a custom synonym table.
    pub fn with_synonyms(synonyms: BTreeMap<String, Species>) -> Self {
        let synonyms = synonyms
            .into_iter()
            .map(|(word, species)| (word.to_lowercase(), species))
            .collect();
        Self { synonyms }
    }

    /// Resolve one token: direct lookup, then once more without a trailing `s`.
    pub fn resolve(&self, token: &str) -> Option<Species> {
        if let Some(species) = self.synonyms.get(token) {
            return Some(*species);
        }
        token
            .strip_suffix('s')
            .and_then(|singular| self.synonyms.get(singular))
            .copied()
    }

    /// Species named anywhere in the query.
    pub fn requested(&self, tokens: &QueryTokens) -> BTreeSet<Species> {
        tokens.iter().filter_map(|t| self.resolve(t)).collect()
    }

    /// The synonym table.
    pub fn synonyms(&self) -> &BTreeMap<String, Species> {
        &self.synonyms
    }

    /// Default synonym table.
    pub fn default_synonyms() -> BTreeMap<String, Species> {
        let table: &[(&str, Species)] = &[
            ("canine", Species::Canine),
            ("canines", Species::Canine),
            ("dog", Species::Canine),
            ("dogs", Species::Canine),
            ("feline", Species::Feline),
            ("felines", Species::Feline),
            ("cat", Species::Feline),
            ("cats", Species::Feline),
            ("bovine", Species::Bovine),
            ("bovines", Species::Bovine),
            ("cattle", Species::Bovine),
            ("equine", Species::Equine),
            ("equines", Species::Equine),
            ("horse", Species::Equine),
            ("horses", Species::Equine),
            ("ovine", Species::Ovine),
            ("ovines", Species::Ovine),
            ("sheep", Species::Ovine),
            ("caprine", Species::Caprine),
            ("caprines", Species::Caprine),
            ("goat", Species::Caprine),
            ("goats", Species::Caprine),
            ("porcine", Species::Porcine),
            ("porcines", Species::Porcine),
            ("swine", Species::Porcine),
            ("avian", Species::Avian),
            ("avians", Species::Avian),
            ("poultry", Species::Avian),
            ("bird", Species::Avian),
            ("birds", Species::Avian),
            ("chicken", Species::Avian),
            ("chickens", Species::Avian),
            ("turkey", Species::Avian),
            ("turkeys", Species::Avian),
            ("duck", Species::Avian),
            ("ducks", Species::Avian),
            ("exotic", Species::Exotic),
            ("exotics", Species::Exotic),
        ];

        table
            .iter()
            .map(|(word, species)| (word.to_string(), *species))
            .collect()
    }
}
