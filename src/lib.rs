//! # Chemlink - Chemical Safety Data Store
//!
//! Keeps two independently populated chemical-safety datasets and correlates them by CAS
//! registry number.
//!
//! Chemlink provides:
//! - SQLite-backed record stores with non-unique secondary indexes and snapshot scans
//! - Batch import with per-record failure accounting inside a single transaction
//! - Normalization of exposure-limit workbooks into typed records
//! - Keyword, multi-criteria and paginated queries
//! - A cross-dataset linker keyed on exact CAS equality

pub mod chemical;
pub mod exposure;
pub mod storage;
pub mod importer;
pub mod query;
pub mod linker;
pub mod server;
pub mod config;
pub mod ui;

// Re-exports for convenient access
pub use chemical::ChemicalRecord;
pub use exposure::{ExposureLimitRecord, Organ};
pub use storage::{BatchInfo, BatchResult, Record, RecordFailure, Store};
pub use query::QueryEngine;
pub use linker::{CrossLinker, LinkSummary};

/// Result type alias for Chemlink operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Chemlink operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The medium could not be opened or carries an incompatible schema
    #[error("Initialization error: {0}")]
    Initialization(String),

    /// A single write was rejected by the medium
    #[error("Constraint error: {0}")]
    Constraint(#[source] rusqlite::Error),

    /// The enclosing write transaction aborted; nothing was persisted
    #[error("Transaction error: {0}")]
    Transaction(#[source] rusqlite::Error),

    /// An identifier probe failed because of a medium fault
    #[error("Lookup error for '{identifier}': {source}")]
    Lookup {
        identifier: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid value: {0}")]
    InvalidValue(String),
}
