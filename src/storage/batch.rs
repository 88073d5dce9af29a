//! Import batch metadata and per-batch outcome accounting

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Status written on every batch row; rows of aborted batches never become visible
pub const BATCH_STATUS_COMPLETED: &str = "completed";

/// Describes one ingest operation before it runs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchInfo {
    pub source: String,
    pub imported_at: DateTime<Utc>,
    /// Declared number of input records
    pub total: usize,
}

impl BatchInfo {
    pub fn new(source: impl Into<String>, total: usize) -> Self {
        Self {
            source: source.into(),
            imported_at: Utc::now(),
            total,
        }
    }
}

/// Persisted import batch row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportBatch {
    pub id: i64,
    pub dataset: String,
    pub source: String,
    pub imported_at: DateTime<Utc>,
    pub total: usize,
    pub status: String,
}

/// A single record that could not be written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordFailure {
    /// Zero-based position of the record in the batch input
    pub index: usize,
    pub cause: String,
}

/// Outcome of a committed batch import
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResult {
    pub batch_id: i64,
    pub success_count: usize,
    pub fail_count: usize,
    pub total: usize,
    pub errors: Vec<RecordFailure>,
}

impl BatchResult {
    pub fn is_complete(&self) -> bool {
        self.fail_count == 0
    }
}

impl fmt::Display for BatchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Import Batch #{}:", self.batch_id)?;
        writeln!(f, "  Declared: {}", self.total)?;
        writeln!(f, "  ✅ Imported: {}", self.success_count)?;
        write!(f, "  ❌ Failed: {}", self.fail_count)?;
        for failure in &self.errors {
            write!(f, "\n    #{}: {}", failure.index, failure.cause)?;
        }
        Ok(())
    }
}
