//! Matcher configuration.
//!
//! All values are deserializable so hosts can tune them from a config file;
//! missing keys fall back to the defaults below.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::{DigestBudgets, Species};

use super::ranker::default_stop_words;
use super::species::SpeciesResolver;

/// Complete matcher configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct MatcherConfig {
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    #[serde(default)]
    pub ranking: RankingConfig,

    /// Truncation budgets for digests
    #[serde(default)]
    pub digest: DigestBudgets,

    #[serde(default)]
    pub vocabulary: VocabularyConfig,
}

/// Result caps for the retrieval passes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetrievalConfig {
    /// Cap for every pass's output
    #[serde(default = "default_result_limit")]
    pub result_limit: usize,

    /// Size of the recent-record sample scanned by the fallback pass
    #[serde(default = "default_fallback_sample")]
    pub fallback_sample: usize,
}

fn default_result_limit() -> usize {
    10
}

fn default_fallback_sample() -> usize {
    300
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            result_limit: default_result_limit(),
            fallback_sample: default_fallback_sample(),
        }
    }
}

/// Scoring weights and cutoffs for the relevance ranker.
///
/// These are tuned heuristics, not invariants.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RankingConfig {
    /// Name or trade name equals the brand phrase
    #[serde(default = "default_exact_bonus")]
    pub exact_bonus: u32,

    /// Name or trade name contains the brand phrase
    #[serde(default = "default_substring_bonus")]
    pub substring_bonus: u32,

    /// Every brand token in name, or every brand token in trade name
    #[serde(default = "default_all_tokens_bonus")]
    pub all_tokens_bonus: u32,

    /// Per brand token found, per field
    #[serde(default = "default_token_hit_bonus")]
    pub token_hit_bonus: u32,

    /// Maximum strict matches returned
    #[serde(default = "default_cap")]
    pub strict_cap: usize,

    /// Results kept when no fuzzy score clears `mid_floor`
    #[serde(default = "default_cap")]
    pub weak_cap: usize,

    #[serde(default = "default_high_floor")]
    pub high_floor: u32,

    /// Absolute minimum kept when the top score clears `high_floor`
    #[serde(default = "default_high_keep_min")]
    pub high_keep_min: u32,

    #[serde(default = "default_high_keep_ratio")]
    pub high_keep_ratio: f64,

    #[serde(default = "default_mid_floor")]
    pub mid_floor: u32,

    #[serde(default = "default_mid_keep_ratio")]
    pub mid_keep_ratio: f64,
}

fn default_exact_bonus() -> u32 {
    100
}

fn default_substring_bonus() -> u32 {
    80
}

fn default_all_tokens_bonus() -> u32 {
    60
}

fn default_token_hit_bonus() -> u32 {
    5
}

fn default_cap() -> usize {
    3
}

fn default_high_floor() -> u32 {
    80
}

fn default_high_keep_min() -> u32 {
    60
}

fn default_high_keep_ratio() -> f64 {
    0.9
}

fn default_mid_floor() -> u32 {
    60
}

fn default_mid_keep_ratio() -> f64 {
    0.85
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            exact_bonus: default_exact_bonus(),
            substring_bonus: default_substring_bonus(),
            all_tokens_bonus: default_all_tokens_bonus(),
            token_hit_bonus: default_token_hit_bonus(),
            strict_cap: default_cap(),
            weak_cap: default_cap(),
            high_floor: default_high_floor(),
            high_keep_min: default_high_keep_min(),
            high_keep_ratio: default_high_keep_ratio(),
            mid_floor: default_mid_floor(),
            mid_keep_ratio: default_mid_keep_ratio(),
        }
    }
}

/// Word tables used by the matcher.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VocabularyConfig {
    /// Conversational and domain-generic words ignored for name scoring
    #[serde(default = "default_stop_words")]
    pub stop_words: Vec<String>,

    /// Animal word → species code
    #[serde(default = "SpeciesResolver::default_synonyms")]
    pub species_synonyms: BTreeMap<String, Species>,
}

impl Default for VocabularyConfig {
    fn default() -> Self {
        Self {
            stop_words: default_stop_words(),
            species_synonyms: SpeciesResolver::default_synonyms(),
        }
    }
}
