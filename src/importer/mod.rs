//! Importer - raw tabular input to normalized, stored records
//!
//! Normalization turns workbook sheets into [`ExposureLimitRecord`]s; the batch itself is
//! written by [`Store::batch_import`], which isolates per-record failures inside one
//! transaction.

pub mod derive;
pub mod normalize;
pub mod workbook;

pub use workbook::{Cell, Sheet, Workbook};

use chrono::{DateTime, Utc};
use serde::Serialize;
use crate::Result;
use crate::chemical::ChemicalRecord;
use crate::exposure::ExposureLimitRecord;
use crate::storage::{BatchInfo, BatchResult, Record, Store};

/// Progress event emitted once per processed input unit (a sheet)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportProgress {
    pub current: usize,
    pub total: usize,
    pub percentage: u8,
    pub unit_label: String,
}

impl ImportProgress {
    fn new(current: usize, total: usize, unit_label: &str) -> Self {
        let percentage = if total == 0 {
            100
        } else {
            ((current as f64 / total as f64) * 100.0).round() as u8
        };
        Self {
            current,
            total,
            percentage,
            unit_label: unit_label.to_string(),
        }
    }
}

/// Normalize every data sheet of a workbook.
///
/// Table-of-contents sheets and non-data rows are skipped silently. `on_progress` is
/// advisory and called after each data sheet.
pub fn normalize_workbook<F>(
    workbook: &Workbook,
    source: &str,
    imported_at: DateTime<Utc>,
    mut on_progress: F,
) -> Vec<ExposureLimitRecord>
where
    F: FnMut(ImportProgress),
{
    let data_sheets: Vec<&Sheet> = workbook
        .sheets
        .iter()
        .filter(|sheet| {
            let toc = normalize::is_toc_sheet(&sheet.name);
            if toc {
                tracing::debug!("Skipping table-of-contents sheet '{}'", sheet.name);
            }
            !toc
        })
        .collect();

    let total = data_sheets.len();
    let mut records = Vec::new();

    for (i, sheet) in data_sheets.into_iter().enumerate() {
        let before = records.len();
        records.extend(
            sheet
                .rows
                .iter()
                .skip(normalize::DATA_START_ROW)
                .filter_map(|row| normalize::parse_row(row, source, imported_at)),
        );
        tracing::debug!("Sheet '{}': {} record(s)", sheet.name, records.len() - before);
        on_progress(ImportProgress::new(i + 1, total, &sheet.name));
    }

    records
}

/// Drives normalization and batch insertion into one store
pub struct Importer<'a, R> {
    store: &'a Store<R>,
}

impl<'a, R: Record> Importer<'a, R> {
    pub fn new(store: &'a Store<R>) -> Self {
        Self { store }
    }

    /// Insert already-normalized records as one batch
    pub async fn import_records(&self, records: &[R], batch: &BatchInfo) -> Result<BatchResult> {
        let result = self.store.batch_import(records, batch).await?;
        if !result.is_complete() {
            tracing::warn!(
                "{} of {} record(s) from {} were rejected",
                result.fail_count,
                result.total,
                batch.source
            );
        }
        Ok(result)
    }
}

impl Importer<'_, ExposureLimitRecord> {
    /// Normalize a workbook and import its records as one batch
    pub async fn import_workbook<F>(&self, workbook: &Workbook, source: &str, on_progress: F) -> Result<BatchResult>
    where
        F: FnMut(ImportProgress),
    {
        let imported_at = Utc::now();
        let records = normalize_workbook(workbook, source, imported_at, on_progress);
        tracing::info!("Normalized {} exposure-limit record(s) from {}", records.len(), source);

        let batch = BatchInfo {
            source: source.to_string(),
            imported_at,
            total: records.len(),
        };
        self.import_records(&records, &batch).await
    }
}

impl Importer<'_, ChemicalRecord> {
    /// Import structured safety-data-sheet records, stamping batch provenance on each
    pub async fn import_chemicals(&self, records: Vec<ChemicalRecord>, source: &str) -> Result<BatchResult> {
        let batch = BatchInfo::new(source, records.len());
        let records: Vec<_> = records
            .into_iter()
            .map(|r| r.with_provenance(source, batch.imported_at))
            .collect();
        self.import_records(&records, &batch).await
    }
}
