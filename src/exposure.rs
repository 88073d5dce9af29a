//! Occupational exposure-limit records
//!
//! Each record carries three independently nullable limit values (ceiling, time-weighted
//! average, short-term) and a set of fields derived from its free text at ingest time.
//! Derived fields are persisted as computed and never recomputed on read.

use chrono::{DateTime, Utc};
use rusqlite::Row;
use rusqlite::types::{Type, Value};
use serde::{Deserialize, Serialize};
use crate::Result;
use crate::storage::record::{timestamp_column, timestamp_value};
use crate::storage::Record;

/// Target organ or system named by a health-effect description
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Organ {
    Respiratory,
    Nervous,
    Liver,
    Kidney,
    Blood,
    Skin,
    Eye,
    Heart,
    Reproductive,
}

impl Organ {
    pub fn as_str(&self) -> &'static str {
        match self {
            Organ::Respiratory => "respiratory",
            Organ::Nervous => "nervous",
            Organ::Liver => "liver",
            Organ::Kidney => "kidney",
            Organ::Blood => "blood",
            Organ::Skin => "skin",
            Organ::Eye => "eye",
            Organ::Heart => "heart",
            Organ::Reproductive => "reproductive",
        }
    }
}

impl std::fmt::Display for Organ {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A regulatory exposure-limit entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExposureLimitRecord {
    #[serde(skip_deserializing)]
    pub id: Option<i64>,
    pub cas: Option<String>,
    pub name: String,
    pub name_en: Option<String>,
    /// Maximum allowable (ceiling) concentration
    pub mac: Option<f64>,
    /// Permissible concentration, time-weighted average
    pub pc_twa: Option<f64>,
    /// Permissible concentration, short-term exposure
    pub pc_stel: Option<f64>,
    pub health_effect: Option<String>,
    pub remarks: Option<String>,
    /// Derived from `health_effect`, ordered and de-duplicated
    pub organs: Vec<Organ>,
    /// Derived from `remarks`
    pub skin_absorption: bool,
    /// Derived from `remarks`
    pub sensitizer: bool,
    /// Carcinogen classification code derived from `remarks`
    pub carcinogen: Option<String>,
    pub source: Option<String>,
    pub imported_at: Option<DateTime<Utc>>,
}

impl ExposureLimitRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_cas(mut self, cas: impl Into<String>) -> Self {
        self.cas = Some(cas.into());
        self
    }

    /// True when at least one limit value is present
    pub fn has_limits(&self) -> bool {
        self.mac.is_some() || self.pc_twa.is_some() || self.pc_stel.is_some()
    }
}

impl Record for ExposureLimitRecord {
    const TABLE: &'static str = "exposure_limits";
    const DATASET: &'static str = "exposure_limits";
    const COLUMNS: &'static [&'static str] = &[
        "cas",
        "name",
        "name_en",
        "mac",
        "pc_twa",
        "pc_stel",
        "health_effect",
        "remarks",
        "organs",
        "skin_absorption",
        "sensitizer",
        "carcinogen",
        "source",
        "imported_at",
    ];
    const INDEXED: &'static [&'static str] = &["cas", "name"];

    fn identifier(&self) -> Option<&str> {
        self.cas.as_deref()
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn to_values(&self) -> Result<Vec<Value>> {
        Ok(vec![
            Value::from(self.cas.clone()),
            Value::from(self.name.clone()),
            Value::from(self.name_en.clone()),
            Value::from(self.mac),
            Value::from(self.pc_twa),
            Value::from(self.pc_stel),
            Value::from(self.health_effect.clone()),
            Value::from(self.remarks.clone()),
            Value::Text(serde_json::to_string(&self.organs)?),
            Value::from(self.skin_absorption),
            Value::from(self.sensitizer),
            Value::from(self.carcinogen.clone()),
            Value::from(self.source.clone()),
            timestamp_value(self.imported_at.as_ref()),
        ])
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let organs_json: String = row.get(9)?;
        let organs: Vec<Organ> = serde_json::from_str(&organs_json)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(9, Type::Text, Box::new(e)))?;

        Ok(Self {
            id: Some(row.get(0)?),
            cas: row.get(1)?,
            name: row.get(2)?,
            name_en: row.get(3)?,
            mac: row.get(4)?,
            pc_twa: row.get(5)?,
            pc_stel: row.get(6)?,
            health_effect: row.get(7)?,
            remarks: row.get(8)?,
            organs,
            skin_absorption: row.get(10)?,
            sensitizer: row.get(11)?,
            carcinogen: row.get(12)?,
            source: row.get(13)?,
            imported_at: timestamp_column(row, 14)?,
        })
    }
}
