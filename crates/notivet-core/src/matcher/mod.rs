//! Query-driven drug matcher.
//!
//! Pipeline: Tokenize → Resolve species → Retrieve (strict → relaxed → scan)
//! → Species filter → Rank → Digest

mod config;
mod ranker;
mod retriever;
mod species;
mod tokenizer;

pub use config::*;
pub use ranker::*;
pub use retriever::*;
pub use species::*;
pub use tokenizer::*;

use std::collections::BTreeSet;

use serde::Serialize;
use thiserror::Error;

use crate::db::{DbError, DrugStore};
use crate::models::{DigestBudgets, Drug, DrugDigest, ScoredCandidate, Species};

/// Matcher errors.
#[derive(Error, Debug)]
pub enum MatcherError {
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Retrieval failed: {0}")]
    Retrieval(#[from] DbError),
}

pub type MatcherResult<T> = Result<T, MatcherError>;

/// Result of one matcher run.
#[derive(Debug, Clone, Serialize)]
pub struct MatchReport {
    pub query: String,
    pub requested_species: Vec<Species>,
    /// Pass that produced candidates, if any did
    pub retrieval_pass: Option<PassKind>,
    /// Candidates returned by retrieval, before species filtering
    pub retrieved: usize,
    #[serde(skip)]
    pub ranked: Vec<ScoredCandidate>,
    pub drugs: Vec<DrugDigest>,
}

impl MatchReport {
    /// Citation labels for the matched drugs.
    pub fn sources(&self) -> Vec<String> {
        self.drugs
            .iter()
            .map(|d| d.source_label().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.drugs.is_empty()
    }
}

/// Coordinates the matching pipeline over a record store.
pub struct DrugMatcher<'a> {
    store: &'a dyn DrugStore,
    species: SpeciesResolver,
    retriever: Retriever,
    ranker: Ranker,
    budgets: DigestBudgets,
}

impl<'a> DrugMatcher<'a> {
    /// Create a matcher with default configuration.
    pub fn new(store: &'a dyn DrugStore) -> Self {
        Self::with_config(store, MatcherConfig::default())
    }

    /// Create a matcher with explicit configuration.
    pub fn with_config(store: &'a dyn DrugStore, config: MatcherConfig) -> Self {
        Self {
            store,
            species: SpeciesResolver::with_synonyms(config.vocabulary.species_synonyms),
            retriever: Retriever::standard(&config.retrieval),
            ranker: Ranker::new(config.vocabulary.stop_words, config.ranking),
            budgets: config.digest,
        }
    }

    /// Replace the retrieval chain.
    pub fn with_retriever(mut self, retriever: Retriever) -> Self {
        self.retriever = retriever;
        self
    }

    /// Run the full pipeline for a free-text query.
    pub fn search(&self, query: &str) -> MatcherResult<MatchReport> {
        let tokens = QueryTokens::from_query(query)?;
        let requested = self.species.requested(&tokens);

        let retrieval = self.retriever.retrieve(self.store, &tokens, &self.species)?;
        let retrieved = retrieval.drugs.len();

        let candidates = filter_by_species(retrieval.drugs, &requested);
        let brand = self
            .ranker
            .brand_query(query, &tokens, |t| self.species.resolve(t).is_some());
        let ranked = self.ranker.rank(candidates, &brand);

        tracing::debug!(
            tokens = tokens.len(),
            species = requested.len(),
            pass = retrieval.pass.map(|p| p.as_str()),
            retrieved,
            ranked = ranked.len(),
            "matched query"
        );

        let drugs = ranked
            .iter()
            .map(|c| DrugDigest::from_drug(&c.drug, &self.budgets))
            .collect();

        Ok(MatchReport {
            query: query.to_string(),
            requested_species: requested.into_iter().collect(),
            retrieval_pass: retrieval.pass,
            retrieved,
            ranked,
            drugs,
        })
    }
}

/// Keep candidates whose species intersect `requested`.
///
/// An empty request keeps everything. A record with missing or malformed
/// species never survives a non-empty request.
pub fn filter_by_species(candidates: Vec<Drug>, requested: &BTreeSet<Species>) -> Vec<Drug> {
    if requested.is_empty() {
        return candidates;
    }
    candidates
        .into_iter()
        .filter(|drug| !drug.species_set().is_disjoint(requested))
        .collect()
}
