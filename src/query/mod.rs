pub mod engine;

pub use engine::{Page, QueryEngine, SearchCriteria, Searchable, Statistics};
