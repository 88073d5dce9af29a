//! Rectangular sheet data handed over by the spreadsheet reader

use std::path::Path;
use serde::{Deserialize, Serialize};
use crate::Result;

/// A single cell as delivered by the reader
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Number(f64),
    Text(String),
    #[default]
    Empty,
}

impl Cell {
    /// Trimmed text, `None` for empty cells
    pub fn text(&self) -> Option<String> {
        match self {
            Cell::Number(n) => Some(format_number(*n)),
            Cell::Text(s) => {
                let trimmed = s.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            Cell::Empty => None,
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Cell::Number(n)
    }
}

/// Whole numbers print without a trailing `.0` so serials read back as integers
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Sheet {
    pub name: String,
    #[serde(default)]
    pub rows: Vec<Vec<Cell>>,
}

impl Sheet {
    pub fn new(name: impl Into<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    /// Build a sheet from plain text rows
    pub fn from_text_rows(name: impl Into<String>, rows: &[&[&str]]) -> Self {
        let rows = rows
            .iter()
            .map(|row| row.iter().map(|cell| Cell::from(*cell)).collect())
            .collect();
        Self::new(name, rows)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn new(sheets: Vec<Sheet>) -> Self {
        Self { sheets }
    }

    /// Load a workbook exported by the spreadsheet reader as JSON
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_text() {
        assert_eq!(Cell::from("  苯 ").text(), Some("苯".to_string()));
        assert_eq!(Cell::from("   ").text(), None);
        assert_eq!(Cell::Number(3.0).text(), Some("3".to_string()));
        assert_eq!(Cell::Number(0.5).text(), Some("0.5".to_string()));
        assert_eq!(Cell::Empty.text(), None);
    }

    #[test]
    fn test_workbook_json_mixed_cells() {
        let json = r#"{"sheets": [{"name": "Sheet1", "rows": [[1, "苯", null, "71-43-2"]]}]}"#;
        let workbook: Workbook = serde_json::from_str(json).unwrap();
        let row = &workbook.sheets[0].rows[0];
        assert_eq!(row[0], Cell::Number(1.0));
        assert_eq!(row[1], Cell::Text("苯".to_string()));
        assert_eq!(row[2], Cell::Empty);
    }
}
