//! Keyword-derived fields of exposure-limit records
//!
//! Pure functions of the source text; they run once during normalization and their output
//! is persisted with the record.

use crate::exposure::Organ;

/// Ordered keyword → organ table. Latin keywords are matched against lowercased text.
///
/// Chinese keywords are compounds: a bare 心 would also match 恶心 (nausea).
const ORGAN_KEYWORDS: &[(&str, Organ)] = &[
    ("呼吸", Organ::Respiratory),
    ("肺", Organ::Respiratory),
    ("respirat", Organ::Respiratory),
    ("pulmon", Organ::Respiratory),
    ("神经", Organ::Nervous),
    ("neuro", Organ::Nervous),
    ("nervous", Organ::Nervous),
    ("肝", Organ::Liver),
    ("hepat", Organ::Liver),
    ("liver", Organ::Liver),
    ("肾", Organ::Kidney),
    ("nephr", Organ::Kidney),
    ("kidney", Organ::Kidney),
    ("血液", Organ::Blood),
    ("造血", Organ::Blood),
    ("贫血", Organ::Blood),
    ("溶血", Organ::Blood),
    ("haemat", Organ::Blood),
    ("hemat", Organ::Blood),
    ("blood", Organ::Blood),
    ("皮肤", Organ::Skin),
    ("dermat", Organ::Skin),
    ("眼", Organ::Eye),
    ("ocular", Organ::Eye),
    ("eye", Organ::Eye),
    ("心脏", Organ::Heart),
    ("心肌", Organ::Heart),
    ("心血管", Organ::Heart),
    ("心律", Organ::Heart),
    ("cardi", Organ::Heart),
    ("生殖", Organ::Reproductive),
    ("reproduct", Organ::Reproductive),
];

const SKIN_MARKERS: &[&str] = &["皮", "skin"];
const SENSITIZER_MARKERS: &[&str] = &["敏", "sensitiz", "sensitis"];

/// Carcinogen classification codes, first match wins
const CARCINOGEN_CODES: &[&str] = &["G1", "G2A", "G2B"];

/// Organ tags named by a health-effect description, de-duplicated in table order
pub fn organs(health_effect: &str) -> Vec<Organ> {
    let text = health_effect.to_lowercase();
    let mut tags = Vec::new();
    for (keyword, organ) in ORGAN_KEYWORDS {
        if text.contains(keyword) && !tags.contains(organ) {
            tags.push(*organ);
        }
    }
    tags
}

pub fn skin_absorption(remarks: &str) -> bool {
    contains_any(remarks, SKIN_MARKERS)
}

pub fn sensitizer(remarks: &str) -> bool {
    contains_any(remarks, SENSITIZER_MARKERS)
}

pub fn carcinogen(remarks: &str) -> Option<String> {
    let upper = remarks.to_uppercase();
    CARCINOGEN_CODES
        .iter()
        .find(|code| upper.contains(*code))
        .map(|code| code.to_string())
}

fn contains_any(text: &str, markers: &[&str]) -> bool {
    let lower = text.to_lowercase();
    markers.iter().any(|m| lower.contains(m))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_organs_deduplicated_in_table_order() {
        assert_eq!(organs("haematotoxic"), vec![Organ::Blood]);
        assert_eq!(
            organs("肝、肾损害；血液系统损害；肝功能异常"),
            vec![Organ::Liver, Organ::Kidney, Organ::Blood]
        );
        assert_eq!(organs("Hepatotoxicity; respiratory irritation"), vec![Organ::Respiratory, Organ::Liver]);
        assert!(organs("").is_empty());
    }

    #[test]
    fn test_symptom_words_do_not_tag_organs() {
        let tags = organs("头痛、头晕、恶心、呕吐");
        assert!(!tags.contains(&Organ::Heart));
        assert!(tags.is_empty());

        assert_eq!(organs("心律失常，心肌损害"), vec![Organ::Heart]);
        assert_eq!(organs("溶血性贫血"), vec![Organ::Blood]);
        assert_eq!(organs("心血管系统损害"), vec![Organ::Heart]);
    }

    #[test]
    fn test_remark_flags() {
        assert!(skin_absorption("皮"));
        assert!(skin_absorption("Skin; G1"));
        assert!(!skin_absorption("G2B"));
        assert!(sensitizer("敏"));
        assert!(sensitizer("Dermal sensitizer"));
        assert!(!sensitizer("皮"));
    }

    #[test]
    fn test_carcinogen_first_code_wins() {
        assert_eq!(carcinogen("皮, G1"), Some("G1".to_string()));
        assert_eq!(carcinogen("g2b"), Some("G2B".to_string()));
        assert_eq!(carcinogen("G2A; G2B"), Some("G2A".to_string()));
        assert_eq!(carcinogen("皮"), None);
    }
}
