//! Relevance ranking of retrieved candidates.
//!
//! Scoring (against the brand phrase and brand tokens):
//! - name or trade name equals the phrase: +100
//! - name or trade name contains the phrase: +80
//! - every brand token in name, or every one in trade name: +60
//! - +5 per brand token found, per field
//!
//! Strict matches (all brand tokens in name or trade name) win outright;
//! otherwise a score-relative cutoff keeps the plausible fuzzy matches.

use std::collections::HashSet;

use crate::models::{Drug, ScoredCandidate};

use super::config::RankingConfig;
use super::tokenizer::normalize_text;
use super::QueryTokens;

/// Query terms used for name/trade-name scoring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrandQuery {
    /// Tokens left after removing stop words and species words
    pub tokens: Vec<String>,
    /// Normalized query restricted to brand tokens, in query order
    pub phrase: String,
}

/// Scores and trims candidates.
#[derive(Debug, Clone)]
pub struct Ranker {
    stop_words: HashSet<String>,
    config: RankingConfig,
}

impl Default for Ranker {
    fn default() -> Self {
        Self::new(default_stop_words(), RankingConfig::default())
    }
}

impl Ranker {
    pub fn new(stop_words: Vec<String>, config: RankingConfig) -> Self {
        Self {
            stop_words: stop_words.into_iter().map(|w| w.to_lowercase()).collect(),
            config,
        }
    }

    pub fn is_stop_word(&self, token: &str) -> bool {
        self.stop_words.contains(token)
    }

    /// Build the brand query. `is_species` marks tokens that name a species.
    pub fn brand_query(
        &self,
        raw_query: &str,
        tokens: &QueryTokens,
        is_species: impl Fn(&str) -> bool,
    ) -> BrandQuery {
        let brand: Vec<String> = tokens
            .iter()
            .filter(|&t| !self.is_stop_word(t) && !is_species(t))
            .map(str::to_string)
            .collect();

        let normalized = normalize_text(raw_query);
        let phrase = if brand.is_empty() {
            normalized
        } else {
            normalized
                .split(' ')
                .filter(|word| brand.iter().any(|b| b == word))
                .collect::<Vec<_>>()
                .join(" ")
        };

        BrandQuery {
            tokens: brand,
            phrase,
        }
    }

    /// Score one candidate.
    pub fn score(&self, drug: Drug, brand: &BrandQuery) -> ScoredCandidate {
        let name = normalize_text(&drug.name);
        let trade = normalize_text(drug.trade_name.as_deref().unwrap_or(""));

        let exact_name_match = name == brand.phrase;
        let exact_trade_match = trade == brand.phrase;
        let all_tokens_in_name = brand.tokens.iter().all(|t| name.contains(t.as_str()));
        let all_tokens_in_trade = brand.tokens.iter().all(|t| trade.contains(t.as_str()));

        let mut score = 0;
        if exact_name_match || exact_trade_match {
            score += self.config.exact_bonus;
        }
        if name.contains(&brand.phrase) || trade.contains(&brand.phrase) {
            score += self.config.substring_bonus;
        }
        if all_tokens_in_name || all_tokens_in_trade {
            score += self.config.all_tokens_bonus;
        }
        let hits: u32 = brand
            .tokens
            .iter()
            .map(|t| u32::from(name.contains(t.as_str())) + u32::from(trade.contains(t.as_str())))
            .sum();
        score += hits * self.config.token_hit_bonus;

        ScoredCandidate {
            drug,
            score,
            exact_name_match,
            exact_trade_match,
            all_tokens_in_name,
            all_tokens_in_trade,
        }
    }

    /// Score, partition and trim. Ties keep retrieval order.
    pub fn rank(&self, candidates: Vec<Drug>, brand: &BrandQuery) -> Vec<ScoredCandidate> {
        let mut scored: Vec<ScoredCandidate> =
            candidates.into_iter().map(|d| self.score(d, brand)).collect();
        scored.sort_by(|a, b| b.score.cmp(&a.score));

        if scored.iter().any(ScoredCandidate::is_strict) {
            return scored
                .into_iter()
                .filter(ScoredCandidate::is_strict)
                .take(self.config.strict_cap)
                .collect();
        }

        let top = scored.first().map(|c| c.score).unwrap_or(0);
        let cfg = &self.config;
        if top >= cfg.high_floor {
            let cutoff = (f64::from(top) * cfg.high_keep_ratio).max(f64::from(cfg.high_keep_min));
            scored.retain(|c| f64::from(c.score) >= cutoff);
        } else if top >= cfg.mid_floor {
            let cutoff = f64::from(top) * cfg.mid_keep_ratio;
            scored.retain(|c| f64::from(c.score) >= cutoff);
        } else {
            scored.truncate(cfg.weak_cap);
        }
        scored
    }
}

/// Default stop words: conversational filler and domain-generic nouns/verbs.
pub fn default_stop_words() -> Vec<String> {
    [
        "what", "does", "do", "about", "for", "to", "the", "a", "an", "and", "or", "of", "in",
        "on", "with", "how", "is", "are", "be", "that", "this", "please", "need", "show", "me",
        "find", "info", "information", "tell", "explain", "give", "i", "we", "you",
        // domain-generic
        "drug", "drugs", "medication", "medications", "medicine", "vaccine", "vaccines", "use",
        "used", "using", "treat", "treats", "treatment", "treating", "against", "list", "search",
        "recommend", "help",
    ]
    .iter()
    .map(|w| w.to_string())
    .collect()
}
