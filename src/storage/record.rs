//! The seam between the generic store and concrete record types

use chrono::{DateTime, Utc};
use rusqlite::Row;
use rusqlite::types::{Type, Value};
use crate::Result;

/// A record type that can live in a [`Store`](super::Store).
///
/// Rows are read back as `id` followed by [`Record::COLUMNS`] in declaration order, so
/// `to_values` and `from_row` must agree on that order.
pub trait Record: Clone + Send + Sync + 'static {
    /// Table holding the records
    const TABLE: &'static str;
    /// Dataset label recorded on import batches
    const DATASET: &'static str;
    /// Persisted columns in bind order, excluding `id`
    const COLUMNS: &'static [&'static str];
    /// Columns carrying a non-unique secondary index
    const INDEXED: &'static [&'static str];
    /// Column holding the CAS registry number
    const IDENTIFIER_COLUMN: &'static str = "cas";

    /// CAS registry number used as the cross-dataset join key
    fn identifier(&self) -> Option<&str>;

    /// Primary (native-language) name
    fn display_name(&self) -> &str;

    /// Values for [`Record::COLUMNS`], in the same order
    fn to_values(&self) -> Result<Vec<Value>>;

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;
}

/// Timestamps are stored as RFC 3339 text
pub(crate) fn timestamp_value(ts: Option<&DateTime<Utc>>) -> Value {
    match ts {
        Some(ts) => Value::Text(ts.to_rfc3339()),
        None => Value::Null,
    }
}

pub(crate) fn timestamp_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|s| {
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
    })
    .transpose()
}
