//! Query tokenization and text normalization.

use std::collections::BTreeSet;

use super::{MatcherError, MatcherResult};

/// Deduplicated lowercase word tokens of a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTokens(BTreeSet<String>);

impl QueryTokens {
    /// Tokenize a raw query, rejecting one with no usable words.
    pub fn from_query(query: &str) -> MatcherResult<Self> {
        let tokens = tokenize(query);
        if tokens.is_empty() {
            return Err(MatcherError::InvalidQuery("query is required".into()));
        }
        Ok(Self(tokens))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn contains(&self, token: &str) -> bool {
        self.0.contains(token)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Split text into a set of lowercase ASCII alphanumeric words.
pub fn tokenize(text: &str) -> BTreeSet<String> {
    clean(text)
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Lowercase, strip punctuation and collapse whitespace to single spaces.
pub fn normalize_text(text: &str) -> String {
    clean(text).split_whitespace().collect::<Vec<_>>().join(" ")
}

fn clean(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect()
}
