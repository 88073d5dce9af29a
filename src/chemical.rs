//! Safety-data-sheet records
//!
//! A chemical record is valid with only a native-language name; every other field is
//! optional. Numeric physical properties are independently nullable and `None` is distinct
//! from zero.

use chrono::{DateTime, Utc};
use rusqlite::Row;
use rusqlite::types::Value;
use serde::{Deserialize, Serialize};
use crate::Result;
use crate::storage::record::{timestamp_column, timestamp_value};
use crate::storage::Record;

/// A safety-data-sheet entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChemicalRecord {
    /// Assigned by the store on insert
    #[serde(skip_deserializing)]
    pub id: Option<i64>,
    pub name: String,
    pub name_en: Option<String>,
    /// CAS registry number
    pub cas: Option<String>,
    /// UN transport number
    pub un_number: Option<String>,
    pub formula: Option<String>,
    pub molecular_weight: Option<f64>,
    pub melting_point: Option<f64>,
    pub boiling_point: Option<f64>,
    pub flash_point: Option<f64>,
    pub density: Option<f64>,
    pub vapor_pressure: Option<f64>,
    pub physical_state: Option<String>,
    pub appearance: Option<String>,
    pub hazard_category: Option<String>,
    pub health_hazard: Option<String>,
    pub environmental_hazard: Option<String>,
    pub first_aid: Option<String>,
    pub fire_fighting: Option<String>,
    pub handling_storage: Option<String>,
    pub source: Option<String>,
    pub imported_at: Option<DateTime<Utc>>,
}

impl ChemicalRecord {
    /// Create a record carrying only a name
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

    pub fn with_un_number(mut self, un_number: impl Into<String>) -> Self {
        self.un_number = Some(un_number.into());
        self
    }

    pub fn with_name_en(mut self, name_en: impl Into<String>) -> Self {
        self.name_en = Some(name_en.into());
        self
    }

    pub fn with_formula(mut self, formula: impl Into<String>) -> Self {
        self.formula = Some(formula.into());
        self
    }

    /// Stamp batch provenance onto the record
    pub fn with_provenance(mut self, source: &str, imported_at: DateTime<Utc>) -> Self {
        self.source = Some(source.to_string());
        self.imported_at = Some(imported_at);
        self
    }
}

impl Record for ChemicalRecord {
    const TABLE: &'static str = "chemicals";
    const DATASET: &'static str = "chemicals";
    const COLUMNS: &'static [&'static str] = &[
        "name",
        "name_en",
        "cas",
        "un_number",
        "formula",
        "molecular_weight",
        "melting_point",
        "boiling_point",
        "flash_point",
        "density",
        "vapor_pressure",
        "physical_state",
        "appearance",
        "hazard_category",
        "health_hazard",
        "environmental_hazard",
        "first_aid",
        "fire_fighting",
        "handling_storage",
        "source",
        "imported_at",
    ];
    const INDEXED: &'static [&'static str] = &["cas", "un_number", "name"];

    fn identifier(&self) -> Option<&str> {
        self.cas.as_deref()
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn to_values(&self) -> Result<Vec<Value>> {
        Ok(vec![
            Value::from(self.name.clone()),
            Value::from(self.name_en.clone()),
            Value::from(self.cas.clone()),
            Value::from(self.un_number.clone()),
            Value::from(self.formula.clone()),
            Value::from(self.molecular_weight),
            Value::from(self.melting_point),
            Value::from(self.boiling_point),
            Value::from(self.flash_point),
            Value::from(self.density),
            Value::from(self.vapor_pressure),
            Value::from(self.physical_state.clone()),
            Value::from(self.appearance.clone()),
            Value::from(self.hazard_category.clone()),
            Value::from(self.health_hazard.clone()),
            Value::from(self.environmental_hazard.clone()),
            Value::from(self.first_aid.clone()),
            Value::from(self.fire_fighting.clone()),
            Value::from(self.handling_storage.clone()),
            Value::from(self.source.clone()),
            timestamp_value(self.imported_at.as_ref()),
        ])
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: Some(row.get(0)?),
            name: row.get(1)?,
            name_en: row.get(2)?,
            cas: row.get(3)?,
            un_number: row.get(4)?,
            formula: row.get(5)?,
            molecular_weight: row.get(6)?,
            melting_point: row.get(7)?,
            boiling_point: row.get(8)?,
            flash_point: row.get(9)?,
            density: row.get(10)?,
            vapor_pressure: row.get(11)?,
            physical_state: row.get(12)?,
            appearance: row.get(13)?,
            hazard_category: row.get(14)?,
            health_hazard: row.get(15)?,
            environmental_hazard: row.get(16)?,
            first_aid: row.get(17)?,
            fire_fighting: row.get(18)?,
            handling_storage: row.get(19)?,
            source: row.get(20)?,
            imported_at: timestamp_column(row, 21)?,
        })
    }
}
