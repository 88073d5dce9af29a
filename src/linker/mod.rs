pub mod cross_linker;

pub use cross_linker::{CrossLinker, LinkSummary, LinkedEntry, UnlinkedEntry};

pub mod combined;
pub use combined::{CombinedRecord, CompletenessReport, completeness, lookup};
