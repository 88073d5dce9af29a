//! SQLite storage implementation

use std::fmt;
use std::marker::PhantomData;
use std::path::PathBuf;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params, params_from_iter};
use tokio::sync::{Mutex, MutexGuard, OnceCell};
use crate::{Error, Result};
use super::batch::{BATCH_STATUS_COMPLETED, BatchInfo, BatchResult, ImportBatch, RecordFailure};
use super::record::Record;
use super::schema;

#[derive(Debug, Clone)]
enum Location {
    File(PathBuf),
    Memory,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::File(path) => write!(f, "{}", path.display()),
            Location::Memory => write!(f, ":memory:"),
        }
    }
}

/// SQLite-backed collection of one record type.
///
/// A store is an explicit handle: nothing is opened until [`Store::init`] (or the first
/// operation) runs, and concurrent initializers share a single in-flight open. All
/// operations serialize on the store's connection.
pub struct Store<R> {
    location: Location,
    conn: OnceCell<Mutex<Connection>>,
    _record: PhantomData<fn() -> R>,
}

impl<R: Record> Store<R> {
    /// Handle for a database file (created on init if it doesn't exist)
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self::with_location(Location::File(path.into()))
    }

    /// Handle for a private in-memory database (for testing)
    pub fn open_in_memory() -> Self {
        Self::with_location(Location::Memory)
    }

    fn with_location(location: Location) -> Self {
        Self {
            location,
            conn: OnceCell::new(),
            _record: PhantomData,
        }
    }

    /// Open the medium and create the schema.
    ///
    /// Idempotent: later calls return the ready handle without touching the schema.
    pub async fn init(&self) -> Result<&Self> {
        self.cell().await?;
        Ok(self)
    }

    pub fn is_initialized(&self) -> bool {
        self.conn.initialized()
    }

    async fn cell(&self) -> Result<&Mutex<Connection>> {
        self.conn
            .get_or_try_init(|| async { self.open_connection() })
            .await
    }

    async fn connection(&self) -> Result<MutexGuard<'_, Connection>> {
        Ok(self.cell().await?.lock().await)
    }

    fn open_connection(&self) -> Result<Mutex<Connection>> {
        let conn = match &self.location {
            Location::File(path) => Connection::open(path),
            Location::Memory => Connection::open_in_memory(),
        }
        .map_err(|e| Error::Initialization(format!("cannot open {}: {}", self.location, e)))?;

        initialize_schema(&conn).map_err(|e| match e {
            Error::Initialization(msg) => Error::Initialization(msg),
            other => Error::Initialization(format!("{}: {}", self.location, other)),
        })?;

        tracing::info!("Opened {} store at {}", R::DATASET, self.location);
        Ok(Mutex::new(conn))
    }

    // ========== Record Operations ==========

    /// Insert a record and return its assigned id
    pub async fn insert(&self, record: &R) -> Result<i64> {
        let conn = self.connection().await?;
        insert_row(&conn, record)
    }

    /// Get a record by id
    pub async fn get_by_id(&self, id: i64) -> Result<Option<R>> {
        let conn = self.connection().await?;
        let sql = format!("{} WHERE id = ?1", select_sql::<R>());
        conn.query_row(&sql, [id], |row| R::from_row(row))
            .optional()
            .map_err(Into::into)
    }

    /// Delete a record by id; deleting a missing id is not an error
    pub async fn delete(&self, id: i64) -> Result<()> {
        let conn = self.connection().await?;
        let removed = conn.execute(&format!("DELETE FROM {} WHERE id = ?1", R::TABLE), [id])?;
        tracing::debug!("Deleted {} row(s) with id {} from {}", removed, id, R::TABLE);
        Ok(())
    }

    /// Snapshot of every record in insertion order
    pub async fn iterate_all(&self) -> Result<Snapshot<R>> {
        let conn = self.connection().await?;
        let sql = format!("{} ORDER BY id", select_sql::<R>());
        let mut stmt = conn.prepare(&sql)?;
        let records = stmt
            .query_map([], |row| R::from_row(row))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(Snapshot { records })
    }

    /// Count all records
    pub async fn count(&self) -> Result<usize> {
        let conn = self.connection().await?;
        let count: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {}", R::TABLE), [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Exact-key lookup over one of the record type's secondary indexes
    pub async fn find_by_index(&self, field: &str, value: &str) -> Result<Vec<R>> {
        if !R::INDEXED.contains(&field) {
            return Err(Error::InvalidValue(format!("{} has no index on '{}'", R::TABLE, field)));
        }
        let conn = self.connection().await?;
        query_by_column(&conn, field, value).map_err(Into::into)
    }

    /// All records whose CAS number equals `identifier` exactly
    pub async fn get_by_identifier(&self, identifier: &str) -> Result<Vec<R>> {
        let conn = self.connection().await?;
        query_by_column(&conn, R::IDENTIFIER_COLUMN, identifier).map_err(|source| Error::Lookup {
            identifier: identifier.to_string(),
            source,
        })
    }

    // ========== Bulk Operations ==========

    /// Write a batch row, then every record in its own savepoint.
    ///
    /// A rejected record is rolled back to its savepoint and reported in the result; any
    /// failure of the enclosing transaction aborts the whole batch.
    pub async fn batch_import(&self, records: &[R], batch: &BatchInfo) -> Result<BatchResult> {
        let mut conn = self.connection().await?;
        let mut tx = conn.transaction().map_err(Error::Transaction)?;

        tx.execute(
            r#"
            INSERT INTO import_batches (dataset, source, imported_at, total, status)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                R::DATASET,
                batch.source,
                batch.imported_at.to_rfc3339(),
                batch.total as i64,
                BATCH_STATUS_COMPLETED,
            ],
        )
        .map_err(Error::Transaction)?;
        let batch_id = tx.last_insert_rowid();

        let mut success_count = 0;
        let mut errors = Vec::new();

        for (index, record) in records.iter().enumerate() {
            let sp = tx.savepoint().map_err(Error::Transaction)?;
            match insert_row(&sp, record) {
                Ok(_) => {
                    sp.commit().map_err(Error::Transaction)?;
                    success_count += 1;
                }
                Err(e) => {
                    tracing::warn!("Record #{} ({}) rejected: {}", index, record.display_name(), e);
                    errors.push(RecordFailure {
                        index,
                        cause: e.to_string(),
                    });
                }
            }
        }

        tx.commit().map_err(Error::Transaction)?;

        tracing::info!(
            "Batch #{} into {}: {} imported, {} failed, {} declared",
            batch_id,
            R::TABLE,
            success_count,
            errors.len(),
            batch.total
        );

        Ok(BatchResult {
            batch_id,
            success_count,
            fail_count: errors.len(),
            total: batch.total,
            errors,
        })
    }

    /// Import batches recorded for this dataset, oldest first
    pub async fn batches(&self) -> Result<Vec<ImportBatch>> {
        let conn = self.connection().await?;
        let mut stmt = conn.prepare(
            "SELECT id, dataset, source, imported_at, total, status FROM import_batches WHERE dataset = ?1 ORDER BY id",
        )?;
        let batches = stmt
            .query_map([R::DATASET], |row| {
                let imported_at: String = row.get(3)?;
                let imported_at = DateTime::parse_from_rfc3339(&imported_at)
                    .map(|dt| dt.with_timezone(&Utc))
                    .map_err(|e| {
                        rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
                    })?;
                let total: i64 = row.get(4)?;
                Ok(ImportBatch {
                    id: row.get(0)?,
                    dataset: row.get(1)?,
                    source: row.get(2)?,
                    imported_at,
                    total: total as usize,
                    status: row.get(5)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(batches)
    }

    /// Delete every record and import batch of this dataset as one unit
    pub async fn clear(&self) -> Result<()> {
        let mut conn = self.connection().await?;
        clear_datasets(&mut conn, &[(R::TABLE, R::DATASET)])
    }

    /// Clear this dataset and `O`'s in a single transaction.
    ///
    /// Both datasets must live in this store's database, as they do when the stores share a
    /// file.
    pub async fn clear_with<O: Record>(&self) -> Result<()> {
        let mut conn = self.connection().await?;
        clear_datasets(&mut conn, &[(R::TABLE, R::DATASET), (O::TABLE, O::DATASET)])
    }

    #[cfg(test)]
    pub(crate) async fn set_query_only(&self, on: bool) -> Result<()> {
        let conn = self.connection().await?;
        conn.pragma_update(None, "query_only", on)?;
        Ok(())
    }

    #[cfg(test)]
    pub(crate) async fn execute_batch(&self, sql: &str) -> Result<()> {
        let conn = self.connection().await?;
        conn.execute_batch(sql)?;
        Ok(())
    }
}

/// Records materialized when a scan starts.
///
/// Writes made after the scan began are not visible; iterate as often as needed.
#[derive(Debug, Clone)]
pub struct Snapshot<R> {
    records: Vec<R>,
}

impl<R> Snapshot<R> {
    pub fn iter(&self) -> std::slice::Iter<'_, R> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_vec(self) -> Vec<R> {
        self.records
    }
}

impl<R> IntoIterator for Snapshot<R> {
    type Item = R;
    type IntoIter = std::vec::IntoIter<R>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a, R> IntoIterator for &'a Snapshot<R> {
    type Item = &'a R;
    type IntoIter = std::slice::Iter<'a, R>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Create tables and indexes, refusing databases stamped with another schema version
fn initialize_schema(conn: &Connection) -> Result<()> {
    let version: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    if version != 0 && version != schema::SCHEMA_VERSION {
        return Err(Error::Initialization(format!(
            "incompatible schema version {} (expected {})",
            version,
            schema::SCHEMA_VERSION
        )));
    }

    for stmt in schema::all_schema_statements() {
        conn.execute(stmt, [])?;
    }

    if version == 0 {
        conn.pragma_update(None, "user_version", schema::SCHEMA_VERSION)?;
    }
    Ok(())
}

fn clear_datasets(conn: &mut Connection, datasets: &[(&str, &str)]) -> Result<()> {
    let tx = conn.transaction().map_err(Error::Transaction)?;
    for (table, dataset) in datasets {
        tx.execute(&format!("DELETE FROM {}", table), [])
            .map_err(Error::Transaction)?;
        tx.execute("DELETE FROM import_batches WHERE dataset = ?1", [dataset])
            .map_err(Error::Transaction)?;
    }
    tx.commit().map_err(Error::Transaction)?;
    for (table, _) in datasets {
        tracing::info!("Cleared {}", table);
    }
    Ok(())
}

fn select_sql<R: Record>() -> String {
    format!("SELECT id, {} FROM {}", R::COLUMNS.join(", "), R::TABLE)
}

fn insert_row<R: Record>(conn: &Connection, record: &R) -> Result<i64> {
    let values = record.to_values()?;
    let placeholders: Vec<String> = (1..=R::COLUMNS.len()).map(|i| format!("?{}", i)).collect();
    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        R::TABLE,
        R::COLUMNS.join(", "),
        placeholders.join(", ")
    );
    conn.execute(&sql, params_from_iter(values))
        .map_err(Error::Constraint)?;
    Ok(conn.last_insert_rowid())
}

fn query_by_column<R: Record>(conn: &Connection, column: &str, value: &str) -> rusqlite::Result<Vec<R>> {
    let sql = format!("{} WHERE {} = ?1 ORDER BY id", select_sql::<R>(), column);
    let mut stmt = conn.prepare(&sql)?;
    let records = stmt
        .query_map([value], |row| R::from_row(row))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chemical::ChemicalRecord;
    use crate::exposure::ExposureLimitRecord;

    fn sample(name: &str, cas: &str) -> ChemicalRecord {
        ChemicalRecord::new(name).with_cas(cas)
    }

    #[tokio::test]
    async fn test_record_crud() {
        let store: Store<ChemicalRecord> = Store::open_in_memory();
        store.init().await.unwrap();

        let id = store.insert(&sample("苯", "71-43-2")).await.unwrap();

        let retrieved = store.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(retrieved.id, Some(id));
        assert_eq!(retrieved.name, "苯");
        assert_eq!(retrieved.cas.as_deref(), Some("71-43-2"));

        store.delete(id).await.unwrap();
        assert!(store.get_by_id(id).await.unwrap().is_none());

        // Deleting again is a no-op
        store.delete(id).await.unwrap();
    }

    #[tokio::test]
    async fn test_ids_never_reused() {
        let store: Store<ChemicalRecord> = Store::open_in_memory();
        let first = store.insert(&sample("a", "1")).await.unwrap();
        store.delete(first).await.unwrap();
        let second = store.insert(&sample("b", "2")).await.unwrap();
        assert!(second > first);
    }

    #[tokio::test]
    async fn test_iterate_all_in_insertion_order() {
        let store: Store<ChemicalRecord> = Store::open_in_memory();
        for name in ["toluene", "benzene", "acetone"] {
            store.insert(&ChemicalRecord::new(name)).await.unwrap();
        }

        let snapshot = store.iterate_all().await.unwrap();
        let names: Vec<_> = snapshot.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["toluene", "benzene", "acetone"]);

        // Restartable
        assert_eq!(snapshot.iter().count(), 3);

        // Later writes are not visible to an existing snapshot
        store.insert(&ChemicalRecord::new("xylene")).await.unwrap();
        assert_eq!(snapshot.len(), 3);
        assert_eq!(store.count().await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_non_unique_index_lookup() {
        let store: Store<ChemicalRecord> = Store::open_in_memory();
        store.insert(&sample("苯", "71-43-2")).await.unwrap();
        store.insert(&sample("benzene", "71-43-2")).await.unwrap();
        store.insert(&sample("toluene", "108-88-3")).await.unwrap();

        let matches = store.find_by_index("cas", "71-43-2").await.unwrap();
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].name, "苯");

        let by_identifier = store.get_by_identifier("71-43-2").await.unwrap();
        assert_eq!(by_identifier.len(), 2);

        assert!(matches!(
            store.find_by_index("formula", "C6H6").await,
            Err(Error::InvalidValue(_))
        ));
    }

    #[tokio::test]
    async fn test_insert_rejects_empty_name() {
        let store: Store<ChemicalRecord> = Store::open_in_memory();
        let result = store.insert(&ChemicalRecord::new("  ")).await;
        assert!(matches!(result, Err(Error::Constraint(_))));
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_batch_import_isolates_record_failures() {
        let store: Store<ChemicalRecord> = Store::open_in_memory();
        // Failure indexes are zero-based input positions: index 3 is the fourth record
        let records: Vec<_> = (0..10)
            .map(|i| {
                if i == 3 {
                    ChemicalRecord::new("")
                } else {
                    sample(&format!("chem-{}", i), &format!("{}-00-0", i))
                }
            })
            .collect();

        let result = store
            .batch_import(&records, &BatchInfo::new("test.json", records.len()))
            .await
            .unwrap();

        assert_eq!(result.success_count, 9);
        assert_eq!(result.fail_count, 1);
        assert_eq!(result.total, 10);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].index, 3);

        let names: Vec<_> = store
            .iterate_all()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        let expected: Vec<_> = (0..10).filter(|i| *i != 3).map(|i| format!("chem-{}", i)).collect();
        assert_eq!(names, expected);

        let batches = store.batches().await.unwrap();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].id, result.batch_id);
        assert_eq!(batches[0].total, 10);
        assert_eq!(batches[0].status, BATCH_STATUS_COMPLETED);
    }

    #[tokio::test]
    async fn test_batch_import_transaction_failure_is_fatal() {
        let store: Store<ChemicalRecord> = Store::open_in_memory();
        store.set_query_only(true).await.unwrap();

        let records = vec![sample("a", "1"), sample("b", "2")];
        let result = store.batch_import(&records, &BatchInfo::new("ro.json", 2)).await;
        assert!(matches!(result, Err(Error::Transaction(_))));

        store.set_query_only(false).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 0);
        assert!(store.batches().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_clear_removes_records_and_batches() {
        let chemicals: Store<ChemicalRecord> = Store::open_in_memory();
        chemicals
            .batch_import(&[sample("a", "1"), sample("b", "2")], &BatchInfo::new("x", 2))
            .await
            .unwrap();

        chemicals.clear().await.unwrap();
        assert_eq!(chemicals.count().await.unwrap(), 0);
        assert!(chemicals.batches().await.unwrap().is_empty());
    }

    async fn seed(chemicals: &Store<ChemicalRecord>, limits: &Store<ExposureLimitRecord>) {
        chemicals
            .batch_import(&[sample("苯", "71-43-2")], &BatchInfo::new("sds.json", 1))
            .await
            .unwrap();
        limits
            .batch_import(
                &[ExposureLimitRecord::new("苯").with_cas("71-43-2")],
                &BatchInfo::new("gbz.json", 1),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_clear_on_shared_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chemlink.db");
        let chemicals: Store<ChemicalRecord> = Store::open(&path);
        let limits: Store<ExposureLimitRecord> = Store::open(&path);

        seed(&chemicals, &limits).await;
        limits.clear().await.unwrap();
        assert_eq!(limits.count().await.unwrap(), 0);
        assert!(limits.batches().await.unwrap().is_empty());
        // The other dataset in the same file is untouched
        assert_eq!(chemicals.count().await.unwrap(), 1);
        assert_eq!(chemicals.batches().await.unwrap().len(), 1);

        seed(&chemicals, &limits).await;
        chemicals.clear_with::<ExposureLimitRecord>().await.unwrap();
        assert_eq!(chemicals.count().await.unwrap(), 0);
        assert_eq!(limits.count().await.unwrap(), 0);
        assert!(chemicals.batches().await.unwrap().is_empty());
        assert!(limits.batches().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_init_shares_one_open() {
        let store: Store<ExposureLimitRecord> = Store::open_in_memory();
        assert!(!store.is_initialized());

        let (a, b) = tokio::join!(store.init(), store.init());
        assert!(a.is_ok());
        assert!(b.is_ok());
        assert!(store.is_initialized());

        // Both callers see the same database
        store.insert(&ExposureLimitRecord::new("苯")).await.unwrap();
        assert_eq!(store.init().await.unwrap().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chemlink.db");

        {
            let store: Store<ChemicalRecord> = Store::open(&path);
            store.init().await.unwrap();
            store.init().await.unwrap();
            store.insert(&sample("苯", "71-43-2")).await.unwrap();
        }

        // Both datasets share one file and one schema version
        let chemicals: Store<ChemicalRecord> = Store::open(&path);
        let limits: Store<ExposureLimitRecord> = Store::open(&path);
        assert_eq!(chemicals.count().await.unwrap(), 1);
        assert_eq!(limits.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_init_rejects_incompatible_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("old.db");
        {
            let conn = Connection::open(&path).unwrap();
            conn.pragma_update(None, "user_version", 99).unwrap();
        }

        let store: Store<ChemicalRecord> = Store::open(&path);
        assert!(matches!(store.init().await, Err(Error::Initialization(_))));
    }

    #[tokio::test]
    async fn test_init_fails_on_unopenable_medium() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("nested").join("chemlink.db");

        let store: Store<ChemicalRecord> = Store::open(&path);
        assert!(matches!(store.init().await, Err(Error::Initialization(_))));
        assert!(!store.is_initialized());
    }
}
