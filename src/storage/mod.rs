//! Storage Layer - SQLite-backed persistence
//!
//! System of record is SQLite with tables:
//! - chemicals(name, name_en, cas, un_number, formula, physical properties, hazard text, ...)
//! - exposure_limits(cas, name, mac, pc_twa, pc_stel, health_effect, remarks, derived flags)
//! - import_batches(dataset, source, imported_at, total, status)

pub mod batch;
pub mod record;
pub mod schema;
pub mod sqlite;

pub use batch::{BatchInfo, BatchResult, ImportBatch, RecordFailure};
pub use record::Record;
pub use sqlite::{Snapshot, Store};
