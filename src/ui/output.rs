use crate::exposure::ExposureLimitRecord;
use crate::storage::RecordFailure;
use crate::ui::{Icons, theme};
use owo_colors::OwoColorize;

pub fn header(text: &str) {
    println!("{} {}", Icons::ROCKET, text.style(theme().title.clone()));
}

pub fn status(icon: &str, label: &str, value: &str) {
    println!("{} {}: {}", icon, label.style(theme().label.clone()), value);
}

pub fn success(label: &str) {
    println!("{} {}", Icons::CHECK, label.style(theme().ok.clone()));
}

pub fn warn(label: &str) {
    eprintln!("{} {}", Icons::WARN, label.style(theme().caution.clone()));
}

pub fn info(label: &str, value: &str) {
    println!("{} {}: {}", Icons::INFO.style(theme().note.clone()), label.style(theme().label.clone()), value);
}

pub fn section(title: &str) {
    println!();
    println!("━{}━", title.style(theme().title.clone()));
}

/// A CAS number (or `-` when absent) in the identifier style
pub fn identifier(cas: Option<&str>) -> String {
    cas.unwrap_or("-").style(theme().identifier.clone()).to_string()
}

pub fn empty(label: &str) {
    println!("{} {}", Icons::EMPTY, label.style(theme().absent.clone()));
}

pub fn summary_row(label: &str, value: &str) {
    println!("  {} {}", label.style(theme().label.clone()), value);
}

/// Rejected records of a batch, one line each
pub fn record_failures(failures: &[RecordFailure]) {
    for failure in failures {
        warn(&format!("record #{}: {}", failure.index, failure.cause));
    }
}

/// Derived hazard markers of an exposure-limit record; prints nothing when none are set
pub fn hazard_flags(record: &ExposureLimitRecord) {
    let mut flags = Vec::new();
    if let Some(class) = &record.carcinogen {
        flags.push(format!("carcinogen {}", class));
    }
    if record.sensitizer {
        flags.push("sensitizer".to_string());
    }
    if record.skin_absorption {
        flags.push("skin absorption".to_string());
    }
    if !record.organs.is_empty() {
        let organs: Vec<_> = record.organs.iter().map(|o| o.as_str()).collect();
        flags.push(format!("targets {}", organs.join(", ")));
    }
    if flags.is_empty() {
        return;
    }
    println!("{} {}", Icons::SHIELD, flags.join(" · ").style(theme().hazard.clone()));
}

pub fn recommendation(text: &str) {
    println!("  {} {}", Icons::INFO.style(theme().note.clone()), text);
}
