//! Row acceptance and cell normalization for exposure-limit sheets
//!
//! Column contract (zero-based):
//! `[serial, name, name_en, cas, mac, pc_twa, pc_stel, health_effect, remarks]`.
//! Data starts at row index 3; the rows above are titles and headers.

use std::sync::OnceLock;
use chrono::{DateTime, Utc};
use regex::Regex;
use crate::exposure::ExposureLimitRecord;
use super::derive;
use super::workbook::Cell;

/// First data row of every sheet
pub const DATA_START_ROW: usize = 3;

/// Sheet name of the table-of-contents page
pub const TOC_SHEET_NAME: &str = "目录";

const COL_SERIAL: usize = 0;
const COL_NAME: usize = 1;
const COL_NAME_EN: usize = 2;
const COL_CAS: usize = 3;
const COL_MAC: usize = 4;
const COL_PC_TWA: usize = 5;
const COL_PC_STEL: usize = 6;
const COL_HEALTH_EFFECT: usize = 7;
const COL_REMARKS: usize = 8;

/// Placeholder glyphs meaning "no value"
const NO_VALUE_GLYPHS: &[&str] = &["-", "—", "－"];

static LEADING_NUMBER: OnceLock<Regex> = OnceLock::new();

fn leading_number() -> &'static Regex {
    LEADING_NUMBER.get_or_init(|| {
        Regex::new(r"^[+-]?(?:(?:\d{1,3}(?:,\d{3})+|\d+)(?:\.\d*)?|\.\d+)").expect("valid regex")
    })
}

/// True for the table-of-contents page, which never holds data
pub fn is_toc_sheet(name: &str) -> bool {
    let name = name.trim();
    name == TOC_SHEET_NAME || name.to_lowercase().contains("index")
}

/// Positive integer serial number in the first column
pub fn parse_serial(cell: &Cell) -> Option<u64> {
    match cell {
        Cell::Number(n) if *n >= 1.0 && n.fract() == 0.0 => Some(*n as u64),
        Cell::Text(s) => s.trim().parse::<u64>().ok().filter(|n| *n > 0),
        _ => None,
    }
}

/// Numeric limit value; blanks and dash placeholders are `None`, never zero.
///
/// Comma thousands separators are accepted in groups of three (`1,000`). A number whose
/// digits run on after a malformed separator (`1,00`) is `None` rather than truncated.
pub fn parse_limit(cell: &Cell) -> Option<f64> {
    match cell {
        Cell::Number(n) if n.is_finite() => Some(*n),
        Cell::Text(s) => {
            let s = s.trim();
            if s.is_empty() || NO_VALUE_GLYPHS.contains(&s) {
                return None;
            }
            let m = leading_number().find(s)?;
            let mut rest = s[m.end()..].chars();
            if matches!(rest.next(), Some(',' | '，')) && rest.next().is_some_and(|c| c.is_ascii_digit()) {
                tracing::debug!("Ignoring ambiguous limit value '{}'", s);
                return None;
            }
            m.as_str().replace(',', "").parse::<f64>().ok()
        }
        _ => None,
    }
}

/// Normalize one sheet row, or `None` if the row is not a data row
pub fn parse_row(row: &[Cell], source: &str, imported_at: DateTime<Utc>) -> Option<ExposureLimitRecord> {
    let empty = Cell::Empty;
    let cell = |idx: usize| row.get(idx).unwrap_or(&empty);

    parse_serial(cell(COL_SERIAL))?;
    let name = cell(COL_NAME).text()?;

    let health_effect = cell(COL_HEALTH_EFFECT).text();
    let remarks = cell(COL_REMARKS).text();
    let remarks_text = remarks.as_deref().unwrap_or("");

    Some(ExposureLimitRecord {
        id: None,
        // Trimmed here, so stored CAS values never carry edge whitespace; the linker still
        // compares them byte for byte, and untrimmed values can only come from direct inserts
        cas: cell(COL_CAS).text(),
        name,
        name_en: cell(COL_NAME_EN).text(),
        mac: parse_limit(cell(COL_MAC)),
        pc_twa: parse_limit(cell(COL_PC_TWA)),
        pc_stel: parse_limit(cell(COL_PC_STEL)),
        organs: health_effect.as_deref().map(derive::organs).unwrap_or_default(),
        skin_absorption: derive::skin_absorption(remarks_text),
        sensitizer: derive::sensitizer(remarks_text),
        carcinogen: derive::carcinogen(remarks_text),
        health_effect,
        remarks,
        source: Some(source.to_string()),
        imported_at: Some(imported_at),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exposure::Organ;

    fn row(cells: &[&str]) -> Vec<Cell> {
        cells.iter().map(|c| Cell::from(*c)).collect()
    }

    #[test]
    fn test_parse_limit() {
        assert_eq!(parse_limit(&Cell::from("10")), Some(10.0));
        assert_eq!(parse_limit(&Cell::from(" 0.5 (皮)")), Some(0.5));
        assert_eq!(parse_limit(&Cell::from("0")), Some(0.0));
        assert_eq!(parse_limit(&Cell::Number(6.0)), Some(6.0));
        for placeholder in ["-", "—", "－", "", "  "] {
            assert_eq!(parse_limit(&Cell::from(placeholder)), None);
        }
        assert_eq!(parse_limit(&Cell::from("n/a")), None);
        assert_eq!(parse_limit(&Cell::Empty), None);
    }

    #[test]
    fn test_parse_limit_thousands_separators() {
        assert_eq!(parse_limit(&Cell::from("1,000")), Some(1000.0));
        assert_eq!(parse_limit(&Cell::from("12,500.5 mg/m3")), Some(12500.5));
        assert_eq!(parse_limit(&Cell::from("1000")), Some(1000.0));
        // Malformed grouping is never truncated to its first digits
        assert_eq!(parse_limit(&Cell::from("1,00")), None);
        assert_eq!(parse_limit(&Cell::from("1，000")), None);
    }

    #[test]
    fn test_parse_serial() {
        assert_eq!(parse_serial(&Cell::from("1")), Some(1));
        assert_eq!(parse_serial(&Cell::Number(12.0)), Some(12));
        assert_eq!(parse_serial(&Cell::from("0")), None);
        assert_eq!(parse_serial(&Cell::from("abc")), None);
        assert_eq!(parse_serial(&Cell::from("")), None);
        assert_eq!(parse_serial(&Cell::Number(1.5)), None);
    }

    #[test]
    fn test_rows_without_serial_or_name_are_skipped() {
        let now = Utc::now();
        assert!(parse_row(&row(&["", "", "", "", "", "", "", "", ""]), "x", now).is_none());
        assert!(parse_row(&row(&["abc", "Benzene", "", "71-43-2"]), "x", now).is_none());
        assert!(parse_row(&row(&["2", "  "]), "x", now).is_none());
        assert!(parse_row(&[], "x", now).is_none());
    }

    #[test]
    fn test_benzene_row() {
        let now = Utc::now();
        let record = parse_row(
            &row(&["1", "Benzene", "C6H6-eng", "71-43-2", "-", "10", "-", "haematotoxic", "皮"]),
            "GBZ2.1.xlsx",
            now,
        )
        .unwrap();

        assert_eq!(record.name, "Benzene");
        assert_eq!(record.name_en.as_deref(), Some("C6H6-eng"));
        assert_eq!(record.cas.as_deref(), Some("71-43-2"));
        assert_eq!(record.mac, None);
        assert_eq!(record.pc_twa, Some(10.0));
        assert_eq!(record.pc_stel, None);
        assert!(record.skin_absorption);
        assert!(!record.sensitizer);
        assert_eq!(record.carcinogen, None);
        assert_eq!(record.organs, vec![Organ::Blood]);
        assert_eq!(record.source.as_deref(), Some("GBZ2.1.xlsx"));
        assert_eq!(record.imported_at, Some(now));
    }

    #[test]
    fn test_short_row_fills_missing_columns() {
        let record = parse_row(&row(&["3", "甲醛"]), "x", Utc::now()).unwrap();
        assert_eq!(record.name, "甲醛");
        assert!(record.cas.is_none());
        assert!(!record.has_limits());
        assert!(record.organs.is_empty());
    }

    #[test]
    fn test_toc_sheet_detection() {
        assert!(is_toc_sheet("目录"));
        assert!(is_toc_sheet("Index"));
        assert!(is_toc_sheet("Chemical index"));
        assert!(!is_toc_sheet("化学有害因素"));
    }
}
