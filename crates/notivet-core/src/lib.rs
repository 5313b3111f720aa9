//! NotiVet Core Library
//!
//! Local veterinary drug store plus the query matcher that selects a small,
//! relevance-ranked set of drug records to ground an assistant's answer.
//!
//! # Architecture
//!
//! ```text
//! Query → Tokenize → Species resolution
//!                         │
//!         ┌───────────────▼───────────────┐
//!         │  Retrieval (first non-empty)  │
//!         │  strict → relaxed → scan      │
//!         └───────────────┬───────────────┘
//!                         │
//!              Species filter (hard)
//!                         │
//!              Rank → Drug digests → LLM grounding
//! ```
//!
//! # Modules
//!
//! - [`db`]: SQLite drug store and filter algebra
//! - [`models`]: Domain types (Drug, Species, DrugDigest, etc.)
//! - [`matcher`]: Tokenizer, species resolver, retriever, ranker

pub mod db;
pub mod matcher;
pub mod models;

// Re-export commonly used types
pub use db::{Database, DrugFilter, DrugStore};
pub use matcher::{DrugMatcher, MatchReport, MatcherConfig, MatcherError, PassKind};
pub use models::{DigestBudgets, Drug, DrugDigest, ScoredCandidate, Species};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::{Arc, Mutex};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum NotiVetError {
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<db::DbError> for NotiVetError {
    fn from(e: db::DbError) -> Self {
        match e {
            db::DbError::NotFound(what) => NotiVetError::NotFound(what),
            other => NotiVetError::DatabaseError(other.to_string()),
        }
    }
}

impl From<MatcherError> for NotiVetError {
    fn from(e: MatcherError) -> Self {
        match e {
            MatcherError::InvalidQuery(msg) => NotiVetError::InvalidQuery(msg),
            MatcherError::Retrieval(db) => db.into(),
        }
    }
}

impl From<serde_json::Error> for NotiVetError {
    fn from(e: serde_json::Error) -> Self {
        NotiVetError::SerializationError(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for NotiVetError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        NotiVetError::DatabaseError(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open or create a database at the given path.
#[uniffi::export]
pub fn open_database(path: String) -> Result<Arc<NotiVetCore>, NotiVetError> {
    let db = Database::open(&path)?;
    Ok(Arc::new(NotiVetCore {
        db: Arc::new(Mutex::new(db)),
    }))
}

/// Create an in-memory database (for testing).
#[uniffi::export]
pub fn open_database_in_memory() -> Result<Arc<NotiVetCore>, NotiVetError> {
    let db = Database::open_in_memory()?;
    Ok(Arc::new(NotiVetCore {
        db: Arc::new(Mutex::new(db)),
    }))
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe database wrapper for FFI.
#[derive(uniffi::Object)]
pub struct NotiVetCore {
    db: Arc<Mutex<Database>>,
}

#[uniffi::export]
impl NotiVetCore {
    // =========================================================================
    // Drug Operations
    // =========================================================================

    /// Add or update a drug. Returns its id.
    pub fn upsert_drug(&self, drug: FfiDrug) -> Result<String, NotiVetError> {
        let db = self.db.lock()?;
        let drug = Drug::try_from(drug)?;
        db.upsert_drug(&drug)?;
        Ok(drug.id)
    }

    /// Get a drug by id.
    pub fn get_drug(&self, id: String) -> Result<Option<FfiDrug>, NotiVetError> {
        let db = self.db.lock()?;
        let drug = db.get_drug(&id)?;
        Ok(drug.map(|d| d.into()))
    }

    /// Delete a drug by id.
    pub fn delete_drug(&self, id: String) -> Result<(), NotiVetError> {
        let db = self.db.lock()?;
        if db.delete_drug(&id)? {
            Ok(())
        } else {
            Err(NotiVetError::NotFound(format!("drug {id}")))
        }
    }

    /// Number of stored drugs.
    pub fn count_drugs(&self) -> Result<u32, NotiVetError> {
        let db = self.db.lock()?;
        Ok(db.count_drugs()? as u32)
    }

    /// Most recently added drugs, newest first.
    pub fn list_recent_drugs(&self, limit: u32) -> Result<Vec<FfiDrug>, NotiVetError> {
        let db = self.db.lock()?;
        let drugs = db.list_recent_drugs(limit as usize)?;
        Ok(drugs.into_iter().map(|d| d.into()).collect())
    }

    // =========================================================================
    // Matcher Operations
    // =========================================================================

    /// Run the query matcher with default configuration.
    pub fn search_drugs(&self, query: String) -> Result<FfiSearchResult, NotiVetError> {
        let db = self.db.lock()?;
        let matcher = DrugMatcher::new(&*db);
        let report = matcher.search(&query)?;
        Ok(report.into())
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe drug record.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiDrug {
    /// Empty to generate a new id
    pub id: String,
    pub name: String,
    pub generic_name: Option<String>,
    pub active_ingredient: String,
    pub manufacturer: String,
    pub description: Option<String>,
    pub dosage: Option<String>,
    pub contraindications: Option<String>,
    pub warnings: Option<String>,
    pub farad_info: Option<String>,
    pub withdrawal_time: Option<String>,
    pub product_code: Option<String>,
    pub establishment_code: Option<String>,
    pub subsidiaries: Option<String>,
    pub trade_name: Option<String>,
    pub distributors: Option<String>,
    pub species: Vec<String>,
    pub delivery_methods: Vec<String>,
}

impl From<Drug> for FfiDrug {
    fn from(drug: Drug) -> Self {
        let species = drug
            .species_set()
            .into_iter()
            .map(|s| s.code().to_string())
            .collect();
        let delivery_methods = drug.delivery_method_list();
        Self {
            id: drug.id,
            name: drug.name,
            generic_name: drug.generic_name,
            active_ingredient: drug.active_ingredient,
            manufacturer: drug.manufacturer,
            description: drug.description,
            dosage: drug.dosage,
            contraindications: drug.contraindications,
            warnings: drug.warnings,
            farad_info: drug.farad_info,
            withdrawal_time: drug.withdrawal_time,
            product_code: drug.product_code,
            establishment_code: drug.establishment_code,
            subsidiaries: drug.subsidiaries,
            trade_name: drug.trade_name,
            distributors: drug.distributors,
            species,
            delivery_methods,
        }
    }
}

impl TryFrom<FfiDrug> for Drug {
    type Error = NotiVetError;

    fn try_from(item: FfiDrug) -> Result<Self, Self::Error> {
        let species = item
            .species
            .iter()
            .map(|code| code.parse::<Species>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| NotiVetError::SerializationError(e.to_string()))?;

        let mut drug = Drug::new(item.name, item.active_ingredient, item.manufacturer);
        if !item.id.is_empty() {
            drug.id = item.id;
        }
        drug.generic_name = item.generic_name;
        drug.description = item.description;
        drug.dosage = item.dosage;
        drug.contraindications = item.contraindications;
        drug.warnings = item.warnings;
        drug.farad_info = item.farad_info;
        drug.withdrawal_time = item.withdrawal_time;
        drug.product_code = item.product_code;
        drug.establishment_code = item.establishment_code;
        drug.subsidiaries = item.subsidiaries;
        drug.trade_name = item.trade_name;
        drug.distributors = item.distributors;
        drug.set_species(&species);
        drug.set_delivery_methods(&item.delivery_methods);
        Ok(drug)
    }
}

/// FFI-safe ranked drug digest.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiDrugDigest {
    pub id: String,
    pub name: String,
    pub trade_name: Option<String>,
    pub manufacturer: String,
    pub active_ingredient: String,
    pub species: Vec<String>,
    pub description: String,
    pub dosage: String,
    pub withdrawal_time: String,
    pub score: u32,
}

/// FFI-safe search result.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiSearchResult {
    pub requested_species: Vec<String>,
    /// "strict", "relaxed", "fallback_scan", or None when nothing matched
    pub retrieval_pass: Option<String>,
    pub drugs: Vec<FfiDrugDigest>,
}

impl From<MatchReport> for FfiSearchResult {
    fn from(report: MatchReport) -> Self {
        let drugs = report
            .drugs
            .into_iter()
            .zip(report.ranked.iter().map(|c| c.score))
            .map(|(digest, score)| FfiDrugDigest {
                id: digest.id,
                name: digest.name,
                trade_name: digest.trade_name,
                manufacturer: digest.manufacturer,
                active_ingredient: digest.active_ingredient,
                species: digest.species.iter().map(|s| s.code().to_string()).collect(),
                description: digest.description,
                dosage: digest.dosage,
                withdrawal_time: digest.withdrawal_time,
                score,
            })
            .collect();

        Self {
            requested_species: report
                .requested_species
                .iter()
                .map(|s| s.code().to_string())
                .collect(),
            retrieval_pass: report.retrieval_pass.map(|p| p.as_str().to_string()),
            drugs,
        }
    }
}
