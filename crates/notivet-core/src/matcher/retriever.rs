//! Candidate retrieval with progressive relaxation.
//!
//! Strategies run in order; the first one to return records wins:
//! - Strict: every token matches some field (AND of ORs)
//! - Relaxed: any token matches any field (OR)
//! - Fallback scan: substring scan over a recent sample, in process

use serde::{Deserialize, Serialize};

use crate::db::{DbResult, DrugFilter, DrugStore};
use crate::models::{Drug, DrugField};

use super::config::RetrievalConfig;
use super::{QueryTokens, SpeciesResolver};

/// Which retrieval pass produced the candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassKind {
    Strict,
    Relaxed,
    FallbackScan,
}

impl PassKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PassKind::Strict => "strict",
            PassKind::Relaxed => "relaxed",
            PassKind::FallbackScan => "fallback_scan",
        }
    }
}

/// One retrieval tier.
pub trait RetrievalStrategy: Send + Sync {
    fn kind(&self) -> PassKind;

    fn retrieve(
        &self,
        store: &dyn DrugStore,
        tokens: &QueryTokens,
        species: &SpeciesResolver,
    ) -> DbResult<Vec<Drug>>;
}

/// Filter matching `token` in any searchable field, or the species column
/// when the token names a species.
pub fn token_filter(token: &str, species: &SpeciesResolver) -> DrugFilter {
    let mut any: Vec<DrugFilter> = DrugField::SEARCHABLE
        .iter()
        .map(|field| DrugFilter::FieldContains(*field, token.to_string()))
        .collect();
    if let Some(code) = species.resolve(token) {
        any.push(DrugFilter::SpeciesContains(code));
    }
    DrugFilter::Any(any)
}

/// AND across tokens, OR across fields per token.
pub struct StrictPass {
    pub limit: usize,
}

impl RetrievalStrategy for StrictPass {
    fn kind(&self) -> PassKind {
        PassKind::Strict
    }

    fn retrieve(
        &self,
        store: &dyn DrugStore,
        tokens: &QueryTokens,
        species: &SpeciesResolver,
    ) -> DbResult<Vec<Drug>> {
        let filter = DrugFilter::All(tokens.iter().map(|t| token_filter(t, species)).collect());
        store.find_drugs(&filter, self.limit)
    }
}

/// OR across every token/field pair.
pub struct RelaxedPass {
    pub limit: usize,
}

impl RetrievalStrategy for RelaxedPass {
    fn kind(&self) -> PassKind {
        PassKind::Relaxed
    }

    fn retrieve(
        &self,
        store: &dyn DrugStore,
        tokens: &QueryTokens,
        species: &SpeciesResolver,
    ) -> DbResult<Vec<Drug>> {
        let clauses = tokens
            .iter()
            .flat_map(|t| match token_filter(t, species) {
                DrugFilter::Any(fields) => fields,
                other => vec![other],
            })
            .collect();
        store.find_drugs(&DrugFilter::Any(clauses), self.limit)
    }
}

/// In-process scan of a recent sample: every token must occur somewhere in
/// the record's lowercased text.
pub struct FallbackScan {
    pub sample: usize,
    pub limit: usize,
}

impl RetrievalStrategy for FallbackScan {
    fn kind(&self) -> PassKind {
        PassKind::FallbackScan
    }

    fn retrieve(
        &self,
        store: &dyn DrugStore,
        tokens: &QueryTokens,
        _species: &SpeciesResolver,
    ) -> DbResult<Vec<Drug>> {
        let sample = store.recent_drugs(self.sample)?;
        Ok(sample
            .into_iter()
            .filter(|drug| {
                let hay = drug.haystack();
                tokens.iter().all(|t| hay.contains(t))
            })
            .take(self.limit)
            .collect())
    }
}

/// Outcome of a retrieval run.
#[derive(Debug, Clone)]
pub struct Retrieval {
    /// Pass that produced the drugs; `None` when every pass came back empty
    pub pass: Option<PassKind>,
    pub drugs: Vec<Drug>,
}

/// Ordered chain of retrieval strategies.
pub struct Retriever {
    passes: Vec<Box<dyn RetrievalStrategy>>,
}

impl Retriever {
    /// Strict → relaxed → fallback scan.
    pub fn standard(config: &RetrievalConfig) -> Self {
        Self::with_passes(vec![
            Box::new(StrictPass {
                limit: config.result_limit,
            }),
            Box::new(RelaxedPass {
                limit: config.result_limit,
            }),
            Box::new(FallbackScan {
                sample: config.fallback_sample,
                limit: config.result_limit,
            }),
        ])
    }

    /// Custom strategy chain, tried in the given order.
    pub fn with_passes(passes: Vec<Box<dyn RetrievalStrategy>>) -> Self {
        Self { passes }
    }

    /// Run passes in order until one returns records. Store errors abort.
    pub fn retrieve(
        &self,
        store: &dyn DrugStore,
        tokens: &QueryTokens,
        species: &SpeciesResolver,
    ) -> DbResult<Retrieval> {
        for pass in &self.passes {
            let drugs = pass.retrieve(store, tokens, species)?;
            tracing::debug!(pass = pass.kind().as_str(), count = drugs.len(), "retrieval pass");
            if !drugs.is_empty() {
                return Ok(Retrieval {
                    pass: Some(pass.kind()),
                    drugs,
                });
            }
        }
        Ok(Retrieval {
            pass: None,
            drugs: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::models::Species;

    fn drug(name: &str, description: &str, created_at: &str) -> Drug {
        let mut d = Drug::new(name.into(), "ingredient".into(), "Acme".into());
        d.description = Some(description.into());
        d.created_at = created_at.into();
        d
    }

    fn tokens(q: &str) -> QueryTokens {
        QueryTokens::from_query(q).unwrap()
    }

    #[test]
    fn test_token_filter_adds_species_clause() {
        let species = SpeciesResolver::new();

        let DrugFilter::Any(plain) = token_filter("rimadyl", &species) else {
            panic!("expected Any");
        };
        assert_eq!(plain.len(), DrugField::SEARCHABLE.len());

        let DrugFilter::Any(with_species) = token_filter("dogs", &species) else {
            panic!("expected Any");
        };
        assert_eq!(with_species.len(), DrugField::SEARCHABLE.len() + 1);
        assert_eq!(
            with_species.last(),
            Some(&DrugFilter::SpeciesContains(Species::Canine))
        );
    }

    #[test]
    fn test_strict_requires_every_token() {
        let db = Database::open_in_memory().unwrap();
        db.upsert_drug(&drug("Alpha", "pain relief", "2024-01-01T00:00:00Z")).unwrap();
        db.upsert_drug(&drug("Beta", "pain", "2024-01-02T00:00:00Z")).unwrap();

        let pass = StrictPass { limit: 10 };
        let found = pass
            .retrieve(&db, &tokens("pain relief"), &SpeciesResolver::new())
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Alpha");
    }

    #[test]
    fn test_strict_matches_species_word() {
        let db = Database::open_in_memory().unwrap();
        let mut d = drug("Rimadyl", "nsaid", "2024-01-01T00:00:00Z");
        d.set_species(&[Species::Canine]);
        db.upsert_drug(&d).unwrap();

        let pass = StrictPass { limit: 10 };
        let found = pass
            .retrieve(&db, &tokens("rimadyl dogs"), &SpeciesResolver::new())
            .unwrap();
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn test_relaxed_requires_any_token() {
        let db = Database::open_in_memory().unwrap();
        db.upsert_drug(&drug("Alpha", "pain relief", "2024-01-01T00:00:00Z")).unwrap();
        db.upsert_drug(&drug("Beta", "pain", "2024-01-02T00:00:00Z")).unwrap();
        db.upsert_drug(&drug("Gamma", "itch", "2024-01-03T00:00:00Z")).unwrap();

        let pass = RelaxedPass { limit: 10 };
        let names: Vec<String> = pass
            .retrieve(&db, &tokens("relief pain"), &SpeciesResolver::new())
            .unwrap()
            .into_iter()
            .map(|d| d.name)
            .collect();
        assert_eq!(names, vec!["Beta", "Alpha"]);
    }

    #[test]
    fn test_fallback_scan_respects_sample_and_limit() {
        let db = Database::open_in_memory().unwrap();
        for i in 0..5 {
            db.upsert_drug(&drug(
                &format!("Drug {i}"),
                "wormer",
                &format!("2024-01-0{}T00:00:00Z", i + 1),
            ))
            .unwrap();
        }

        let scan = FallbackScan { sample: 3, limit: 2 };
        let names: Vec<String> = scan
            .retrieve(&db, &tokens("wormer"), &SpeciesResolver::new())
            .unwrap()
            .into_iter()
            .map(|d| d.name)
            .collect();
        assert_eq!(names, vec!["Drug 4", "Drug 3"]);
    }

    #[test]
    fn test_limit_applies_to_strict() {
        let db = Database::open_in_memory().unwrap();
        for i in 0..5 {
            db.upsert_drug(&drug(&format!("Drug {i}"), "wormer", "2024-01-01T00:00:00Z"))
                .unwrap();
        }
        let pass = StrictPass { limit: 2 };
        let found = pass
            .retrieve(&db, &tokens("wormer"), &SpeciesResolver::new())
            .unwrap();
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn test_retriever_reports_empty() {
        let db = Database::open_in_memory().unwrap();
        db.upsert_drug(&drug("Alpha", "pain", "2024-01-01T00:00:00Z")).unwrap();

        let retriever = Retriever::standard(&RetrievalConfig::default());
        let result = retriever
            .retrieve(&db, &tokens("zzzz"), &SpeciesResolver::new())
            .unwrap();
        assert_eq!(result.pass, None);
        assert!(result.drugs.is_empty());
    }
}
