use crate::Result;
use crate::storage::{Record, Store};
use serde::Serialize;
use std::fmt;

/// A left record whose identifier exists in the right store
#[derive(Debug, Clone, Serialize)]
pub struct LinkedEntry<L, R> {
    pub identifier: String,
    pub left: L,
    pub right: R,
}

/// A left record whose identifier has no match on the right
#[derive(Debug, Clone, Serialize)]
pub struct UnlinkedEntry {
    pub name: String,
    pub identifier: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LinkSummary<L, R> {
    pub linked: Vec<LinkedEntry<L, R>>,
    pub unlinked: Vec<UnlinkedEntry>,
    /// Left records carrying no identifier at all
    pub without_identifier: usize,
    pub total: usize,
}

impl<L, R> fmt::Display for LinkSummary<L, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Cross Linker Stats:")?;
        writeln!(f, "  Total Records: {}", self.total)?;
        writeln!(f, "  ✅ Linked: {}", self.linked.len())?;
        writeln!(f, "  🌍 Unlinked: {}", self.unlinked.len())?;
        write!(f, "  ∅ No CAS: {}", self.without_identifier)
    }
}

/// Partitions the left store against the right store by exact CAS equality.
///
/// Each left record costs one probe of the right store's CAS index, so a run is
/// O(L · log R); this per-record probe is what bounds scalability. Identifiers are compared
/// byte for byte: incidental whitespace or casing differences leave a record unlinked.
/// The two stores are scanned independently, so the summary is a best-effort view if
/// either store is written to during the run.
pub struct CrossLinker<'a, L, R> {
    left: &'a Store<L>,
    right: &'a Store<R>,
}

impl<'a, L: Record, R: Record> CrossLinker<'a, L, R> {
    pub fn new(left: &'a Store<L>, right: &'a Store<R>) -> Self {
        Self { left, right }
    }

    pub async fn run(&self) -> Result<LinkSummary<L, R>> {
        let left_records = self.left.iterate_all().await?;
        let total = left_records.len();
        let mut linked = Vec::new();
        let mut unlinked = Vec::new();
        let mut without_identifier = 0;

        for record in left_records {
            let Some(identifier) = record.identifier().map(str::to_string) else {
                without_identifier += 1;
                continue;
            };

            // Lookup faults propagate; they are never reported as "unlinked"
            let mut matches = self.right.get_by_identifier(&identifier).await?;
            if matches.is_empty() {
                unlinked.push(UnlinkedEntry {
                    name: record.display_name().to_string(),
                    identifier,
                });
            } else {
                if matches.len() > 1 {
                    tracing::debug!("{} has {} matches in {}, using the first", identifier, matches.len(), R::TABLE);
                }
                linked.push(LinkedEntry {
                    identifier,
                    left: record,
                    right: matches.swap_remove(0),
                });
            }
        }

        tracing::info!(
            "Linked {} of {} {} record(s) against {}",
            linked.len(),
            total,
            L::TABLE,
            R::TABLE
        );

        Ok(LinkSummary {
            linked,
            unlinked,
            without_identifier,
            total,
        })
    }
}
