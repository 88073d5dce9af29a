//! Query engine implementation
//!
//! Provides high-level query operations:
//! - Keyword search (case-insensitive on names, literal on identifiers)
//! - Multi-criteria conjunctive search over safety-data-sheet records
//! - Paginated enumeration
//! - Statistics
//!
//! Every query is a full scan of a store snapshot: matching is by substring, which the
//! exact-key secondary indexes cannot serve.

use serde::{Deserialize, Serialize};
use crate::{Error, Result};
use crate::chemical::ChemicalRecord;
use crate::exposure::ExposureLimitRecord;
use crate::storage::{Record, Store};

/// Fields a keyword search looks at
pub trait Searchable: Record {
    /// Matched case-insensitively
    fn names(&self) -> [Option<&str>; 2];

    /// Matched literally, without case folding
    fn codes(&self) -> [Option<&str>; 2];
}

impl Searchable for ChemicalRecord {
    fn names(&self) -> [Option<&str>; 2] {
        [Some(self.name.as_str()), self.name_en.as_deref()]
    }

    fn codes(&self) -> [Option<&str>; 2] {
        [self.cas.as_deref(), self.un_number.as_deref()]
    }
}

impl Searchable for ExposureLimitRecord {
    fn names(&self) -> [Option<&str>; 2] {
        [Some(self.name.as_str()), self.name_en.as_deref()]
    }

    fn codes(&self) -> [Option<&str>; 2] {
        [self.cas.as_deref(), None]
    }
}

/// Optional criteria for [`QueryEngine::advanced_search`]; blank values are ignored
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchCriteria {
    pub name: Option<String>,
    pub cas: Option<String>,
    pub un_number: Option<String>,
    pub formula: Option<String>,
    pub hazard_keyword: Option<String>,
    pub physical_state: Option<String>,
}

impl SearchCriteria {
    pub fn is_empty(&self) -> bool {
        [
            &self.name,
            &self.cas,
            &self.un_number,
            &self.formula,
            &self.hazard_keyword,
            &self.physical_state,
        ]
        .iter()
        .all(|c| needle(c).is_none())
    }

    fn matches(&self, record: &ChemicalRecord) -> bool {
        field_matches(&self.name, &[Some(record.name.as_str()), record.name_en.as_deref()])
            && field_matches(&self.cas, &[record.cas.as_deref()])
            && field_matches(&self.un_number, &[record.un_number.as_deref()])
            && field_matches(&self.formula, &[record.formula.as_deref()])
            && field_matches(
                &self.hazard_keyword,
                &[
                    record.hazard_category.as_deref(),
                    record.health_hazard.as_deref(),
                    record.environmental_hazard.as_deref(),
                ],
            )
            && field_matches(&self.physical_state, &[record.physical_state.as_deref()])
    }
}

fn field_matches(criterion: &Option<String>, fields: &[Option<&str>]) -> bool {
    match needle(criterion) {
        Some(needle) => fields.iter().flatten().any(|f| f.to_lowercase().contains(&needle)),
        None => true,
    }
}

/// Lowercased criterion value, `None` when absent or blank
fn needle(criterion: &Option<String>) -> Option<String> {
    criterion
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase)
}

/// One page of records
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<R> {
    pub data: Vec<R>,
    /// Total records in the store, not the page length
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Statistics {
    pub dataset: String,
    pub total: usize,
    pub batches: usize,
}

/// Query engine over one store
pub struct QueryEngine<'a, R> {
    store: &'a Store<R>,
}

impl<'a, R: Searchable> QueryEngine<'a, R> {
    /// Create a new query engine
    pub fn new(store: &'a Store<R>) -> Self {
        Self { store }
    }

    /// Records whose names contain `keyword` (any case) or whose identifiers contain it
    /// literally. An empty keyword returns every record.
    pub async fn search(&self, keyword: &str) -> Result<Vec<R>> {
        let snapshot = self.store.iterate_all().await?;
        if keyword.is_empty() {
            return Ok(snapshot.into_vec());
        }

        let folded = keyword.to_lowercase();
        let results = snapshot
            .into_iter()
            .filter(|r| {
                r.names().iter().flatten().any(|n| n.to_lowercase().contains(&folded))
                    || r.codes().iter().flatten().any(|c| c.contains(keyword))
            })
            .collect();
        Ok(results)
    }

    /// One-based page of records in insertion order
    pub async fn get_all(&self, page: usize, page_size: usize) -> Result<Page<R>> {
        if page == 0 || page_size == 0 {
            return Err(Error::InvalidValue(format!(
                "page and page size must be positive (got page {}, size {})",
                page, page_size
            )));
        }

        let snapshot = self.store.iterate_all().await?;
        let total = snapshot.len();
        let data = snapshot
            .into_iter()
            .skip((page - 1).saturating_mul(page_size))
            .take(page_size)
            .collect();

        Ok(Page {
            data,
            total,
            page,
            page_size,
            total_pages: total.div_ceil(page_size),
        })
    }

    pub async fn get_statistics(&self) -> Result<Statistics> {
        Ok(Statistics {
            dataset: R::DATASET.to_string(),
            total: self.store.count().await?,
            batches: self.store.batches().await?.len(),
        })
    }
}

impl QueryEngine<'_, ChemicalRecord> {
    /// Records satisfying every present criterion; no criteria returns everything
    pub async fn advanced_search(&self, criteria: &SearchCriteria) -> Result<Vec<ChemicalRecord>> {
        let snapshot = self.store.iterate_all().await?;
        Ok(snapshot.into_iter().filter(|r| criteria.matches(r)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seeded_store() -> Store<ChemicalRecord> {
        let store = Store::open_in_memory();
        let mut benzene = ChemicalRecord::new("苯").with_name_en("Benzene").with_cas("71-43-2").with_un_number("UN1114");
        benzene.formula = Some("C6H6".to_string());
        benzene.physical_state = Some("Liquid".to_string());
        benzene.health_hazard = Some("Carcinogenic; damages bone marrow".to_string());

        let mut toluene = ChemicalRecord::new("甲苯").with_name_en("Toluene").with_cas("108-88-3").with_un_number("UN1294");
        toluene.formula = Some("C7H8".to_string());
        toluene.physical_state = Some("liquid".to_string());
        toluene.environmental_hazard = Some("Toxic to aquatic life".to_string());

        let mut naphthalene = ChemicalRecord::new("萘").with_name_en("Naphthalene").with_cas("91-20-3");
        naphthalene.formula = Some("C10H8".to_string());
        naphthalene.physical_state = Some("Solid".to_string());
        naphthalene.hazard_category = Some("Flammable solid".to_string());

        for record in [benzene, toluene, naphthalene] {
            store.insert(&record).await.unwrap();
        }
        store
    }

    fn names(records: &[ChemicalRecord]) -> Vec<&str> {
        records.iter().map(|r| r.name.as_str()).collect()
    }

    #[tokio::test]
    async fn test_search_names_case_insensitive() {
        let store = seeded_store().await;
        let engine = QueryEngine::new(&store);

        assert_eq!(names(&engine.search("BENZ").await.unwrap()), vec!["苯"]);
        assert_eq!(names(&engine.search("甲").await.unwrap()), vec!["甲苯"]);
        assert_eq!(names(&engine.search("ene").await.unwrap()), vec!["苯", "甲苯", "萘"]);
    }

    #[tokio::test]
    async fn test_search_identifiers_are_literal() {
        let store = seeded_store().await;
        let engine = QueryEngine::new(&store);

        assert_eq!(names(&engine.search("71-43").await.unwrap()), vec!["苯"]);
        assert_eq!(names(&engine.search("UN1294").await.unwrap()), vec!["甲苯"]);
        // Identifier fields are not case-folded
        assert!(engine.search("un1294").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_keyword_returns_everything() {
        let empty: Store<ChemicalRecord> = Store::open_in_memory();
        assert!(QueryEngine::new(&empty).search("").await.unwrap().is_empty());

        let single: Store<ChemicalRecord> = Store::open_in_memory();
        single.insert(&ChemicalRecord::new("苯")).await.unwrap();
        assert_eq!(QueryEngine::new(&single).search("").await.unwrap().len(), 1);

        let many = seeded_store().await;
        assert_eq!(QueryEngine::new(&many).search("").await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_advanced_search_is_conjunctive() {
        let store = seeded_store().await;
        let engine = QueryEngine::new(&store);

        let liquids = SearchCriteria {
            physical_state: Some("LIQUID".to_string()),
            ..Default::default()
        };
        assert_eq!(names(&engine.advanced_search(&liquids).await.unwrap()), vec!["苯", "甲苯"]);

        let liquid_c7 = SearchCriteria {
            formula: Some("c7".to_string()),
            ..liquids.clone()
        };
        assert_eq!(names(&engine.advanced_search(&liquid_c7).await.unwrap()), vec!["甲苯"]);

        // Disjoint criteria
        let disjoint = SearchCriteria {
            physical_state: Some("solid".to_string()),
            cas: Some("71-43-2".to_string()),
            ..Default::default()
        };
        assert!(engine.advanced_search(&disjoint).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_advanced_search_hazard_checks_all_hazard_fields() {
        let store = seeded_store().await;
        let engine = QueryEngine::new(&store);

        for (keyword, expected) in [("carcinogenic", "苯"), ("aquatic", "甲苯"), ("flammable", "萘")] {
            let criteria = SearchCriteria {
                hazard_keyword: Some(keyword.to_string()),
                ..Default::default()
            };
            assert_eq!(names(&engine.advanced_search(&criteria).await.unwrap()), vec![expected]);
        }
    }

    #[tokio::test]
    async fn test_advanced_search_single_criterion_matches_field_search() {
        let store = seeded_store().await;
        let engine = QueryEngine::new(&store);

        let criteria = SearchCriteria {
            name: Some("toluene".to_string()),
            ..Default::default()
        };
        assert_eq!(
            names(&engine.advanced_search(&criteria).await.unwrap()),
            names(&engine.search("toluene").await.unwrap())
        );

        let blank = SearchCriteria {
            name: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(blank.is_empty());
        assert_eq!(engine.advanced_search(&blank).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_get_all_pagination() {
        let store: Store<ChemicalRecord> = Store::open_in_memory();
        for i in 0..7 {
            store.insert(&ChemicalRecord::new(format!("chem-{}", i))).await.unwrap();
        }
        let engine = QueryEngine::new(&store);

        let all = engine.get_all(1, 7).await.unwrap();
        assert_eq!(all.total, 7);
        assert_eq!(all.total_pages, 1);
        assert_eq!(all.data.len(), 7);
        assert_eq!(all.data[0].name, "chem-0");
        assert_eq!(all.data[6].name, "chem-6");

        let second = engine.get_all(2, 3).await.unwrap();
        assert_eq!(second.total, 7);
        assert_eq!(second.total_pages, 3);
        assert_eq!(names(&second.data), vec!["chem-3", "chem-4", "chem-5"]);

        let last = engine.get_all(3, 3).await.unwrap();
        assert_eq!(names(&last.data), vec!["chem-6"]);

        let past_end = engine.get_all(9, 3).await.unwrap();
        assert!(past_end.data.is_empty());
        assert_eq!(past_end.total, 7);

        assert!(matches!(engine.get_all(0, 3).await, Err(Error::InvalidValue(_))));
        assert!(matches!(engine.get_all(1, 0).await, Err(Error::InvalidValue(_))));
    }

    #[tokio::test]
    async fn test_statistics() {
        let store = seeded_store().await;
        let stats = QueryEngine::new(&store).get_statistics().await.unwrap();
        assert_eq!(stats.dataset, "chemicals");
        assert_eq!(stats.total, 3);
        assert_eq!(stats.batches, 0);
    }
}
