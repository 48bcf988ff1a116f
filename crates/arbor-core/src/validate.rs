//! Data-quality checks over a record store.
//!
//! Building a tree never requires validation: orphans and unreachable
//! records are simply left out. Callers that want strictness run these
//! checks and decide what to do with the findings.

use crate::record::{Record, RecordId, RecordStore};
use serde::Serialize;
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use tracing::{debug, warn};

/// A single finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Issue {
    /// The same id is used by several records
    DuplicateId { id: RecordId, count: usize },

    /// The declared parent does not exist
    MissingParent { id: RecordId, parent_id: RecordId },

    /// Parent chain loops back on itself
    ParentCycle { members: Vec<RecordId> },

    /// Descends from an orphan or a cycle
    Unreachable { id: RecordId },
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Issue::DuplicateId { id, count } => {
                write!(f, "duplicate id {} ({} records)", id, count)
            }
            Issue::MissingParent { id, parent_id } => {
                write!(f, "record {} references missing parent {}", id, parent_id)
            }
            Issue::ParentCycle { members } => {
                let chain: Vec<String> = members.iter().map(|m| m.to_string()).collect();
                write!(f, "parent cycle: {}", chain.join(" -> "))
            }
            Issue::Unreachable { id } => write!(f, "record {} is unreachable from the root", id),
        }
    }
}

/// Result of [`validate`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    /// Records in the store
    pub record_count: usize,

    /// Records that appear in the built tree
    pub reachable_count: usize,

    /// Findings in a stable order
    pub issues: Vec<Issue>,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    /// Ids of records whose parent is missing.
    pub fn orphans(&self) -> impl Iterator<Item = &RecordId> {
        self.issues.iter().filter_map(|issue| match issue {
            Issue::MissingParent { id, .. } => Some(id),
            _ => None,
        })
    }

    /// Detected parent cycles.
    pub fn cycles(&self) -> impl Iterator<Item = &[RecordId]> {
        self.issues.iter().filter_map(|issue| match issue {
            Issue::ParentCycle { members } => Some(members.as_slice()),
            _ => None,
        })
    }
}

/// Check a store for duplicate ids, orphans, cycles and unreachable records.
pub fn validate(store: &RecordStore) -> ValidationReport {
    let mut issues = Vec::new();

    for (id, count) in store.duplicate_ids() {
        warn!(id = %id, count, "Duplicate record id");
        issues.push(Issue::DuplicateId { id, count });
    }

    let reached = reachable(store);
    let reachable_count = reached.iter().filter(|r| **r).count();

    let unreachable: Vec<&Record> = store
        .iter()
        .zip(&reached)
        .filter(|(_, reached)| !**reached)
        .map(|(record, _)| record)
        .collect();

    let known = store.id_set();
    let is_orphan = |record: &Record| {
        record
            .parent_id
            .as_ref()
            .is_some_and(|parent_id| !known.contains(parent_id))
    };

    // First unreachable record per id decides where its parent chain leads.
    // Every record under an unreached parent is unreached too, so the chain
    // never needs a reached record's entry.
    let mut parent_of: HashMap<&RecordId, Option<&RecordId>> = HashMap::new();
    for record in &unreachable {
        parent_of
            .entry(&record.id)
            .or_insert(record.parent_id.as_ref());
    }

    let mut classified: HashSet<&RecordId> = HashSet::new();
    let mut on_cycle: HashSet<&RecordId> = HashSet::new();
    let mut cycles: Vec<Vec<RecordId>> = Vec::new();

    for record in &unreachable {
        let mut path: Vec<&RecordId> = Vec::new();
        let mut position: HashMap<&RecordId, usize> = HashMap::new();
        let mut current = Some(&record.id);

        while let Some(id) = current {
            if classified.contains(id) {
                break;
            }
            if let Some(&start) = position.get(id) {
                on_cycle.extend(path[start..].iter().copied());
                cycles.push(path[start..].iter().map(|p| (*p).clone()).collect());
                break;
            }
            position.insert(id, path.len());
            path.push(id);
            current = parent_of.get(id).copied().flatten();
        }

        classified.extend(path);
    }

    for record in &unreachable {
        match &record.parent_id {
            Some(parent_id) if !known.contains(parent_id) => {
                issues.push(Issue::MissingParent {
                    id: record.id.clone(),
                    parent_id: parent_id.clone(),
                });
            }
            _ => {}
        }
    }

    issues.extend(
        cycles
            .into_iter()
            .map(|members| Issue::ParentCycle { members }),
    );

    for &record in &unreachable {
        if !is_orphan(record) && !on_cycle.contains(&record.id) {
            issues.push(Issue::Unreachable {
                id: record.id.clone(),
            });
        }
    }

    debug!(
        records = store.len(),
        reachable = reachable_count,
        issues = issues.len(),
        "Validation finished"
    );

    ValidationReport {
        record_count: store.len(),
        reachable_count,
        issues,
    }
}

/// Per-record reachability from the root sentinel, by store position.
///
/// A record is reached when its parent id belongs to any reached record,
/// which is exactly when the materializer emits it.
fn reachable(store: &RecordStore) -> Vec<bool> {
    let records = store.records();
    let mut children: HashMap<Option<&RecordId>, Vec<usize>> = HashMap::new();
    for (pos, record) in records.iter().enumerate() {
        children
            .entry(record.parent_id.as_ref())
            .or_default()
            .push(pos);
    }

    let mut reached = vec![false; records.len()];
    let mut expanded: HashSet<&RecordId> = HashSet::new();
    let mut queue: VecDeque<usize> = children.get(&None).cloned().unwrap_or_default().into();

    while let Some(pos) = queue.pop_front() {
        if reached[pos] {
            continue;
        }
        reached[pos] = true;

        let id = &records[pos].id;
        if expanded.insert(id) {
            if let Some(kids) = children.get(&Some(id)) {
                queue.extend(kids.iter().copied());
            }
        }
    }

    reached
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_store() {
        let store = RecordStore::new(vec![
            Record::root(1, "Root"),
            Record::child(2, 1, "A"),
            Record::child(3, 2, "B"),
        ]);
        let report = validate(&store);

        assert!(report.is_clean());
        assert_eq!(report.record_count, 3);
        assert_eq!(report.reachable_count, 3);
    }

    #[test]
    fn test_empty_store_is_clean() {
        let report = validate(&RecordStore::default());
        assert!(report.is_clean());
        assert_eq!(report.reachable_count, 0);
    }

    #[test]
    fn test_orphan_and_descendant() {
        let store = RecordStore::new(vec![
            Record::root(1, "Root"),
            Record::child(2, 99, "Orphan"),
            Record::child(3, 2, "Below orphan"),
        ]);
        let report = validate(&store);

        assert_eq!(
            report.issues,
            vec![
                Issue::MissingParent {
                    id: RecordId::from(2),
                    parent_id: RecordId::from(99),
                },
                Issue::Unreachable {
                    id: RecordId::from(3)
                },
            ]
        );
        assert_eq!(report.orphans().collect::<Vec<_>>(), vec![&RecordId::from(2)]);
        assert_eq!(report.reachable_count, 1);
    }

    #[test]
    fn test_two_cycle() {
        let store = RecordStore::new(vec![
            Record::root(0, "Root"),
            Record::child("A", "B", "A"),
            Record::child("B", "A", "B"),
            Record::child("C", "A", "hangs off cycle"),
        ]);
        let report = validate(&store);

        let cycles: Vec<&[RecordId]> = report.cycles().collect();
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0], &[RecordId::from("A"), RecordId::from("B")][..]);
        assert!(report.issues.contains(&Issue::Unreachable {
            id: RecordId::from("C")
        }));
        assert_eq!(report.issues.len(), 2);
    }

    #[test]
    fn test_self_cycle() {
        let store = RecordStore::new(vec![Record::child("C", "C", "self")]);
        let report = validate(&store);

        assert_eq!(
            report.issues,
            vec![Issue::ParentCycle {
                members: vec![RecordId::from("C")]
            }]
        );
    }

    #[test]
    fn test_duplicate_ids_reported_first() {
        let store = RecordStore::new(vec![
            Record::root(1, "a"),
            Record::root(1, "b"),
            Record::child(2, 7, "orphan"),
        ]);
        let report = validate(&store);

        assert_eq!(
            report.issues[0],
            Issue::DuplicateId {
                id: RecordId::from(1),
                count: 2
            }
        );
        assert_eq!(report.issues.len(), 2);
    }

    #[test]
    fn test_shared_id_does_not_hide_orphan() {
        let store = RecordStore::new(vec![Record::root(1, "Root"), Record::child(1, 99, "Ghost")]);
        let report = validate(&store);

        assert_eq!(report.reachable_count, 1);
        assert_eq!(
            report.issues,
            vec![
                Issue::DuplicateId {
                    id: RecordId::from(1),
                    count: 2
                },
                Issue::MissingParent {
                    id: RecordId::from(1),
                    parent_id: RecordId::from(99),
                },
            ]
        );
    }

    #[test]
    fn test_shared_id_below_reached_parent_counts_once() {
        // Both records with id 2 hang off the reached root; each counts once
        let store = RecordStore::new(vec![
            Record::root(1, "Root"),
            Record::child(2, 1, "first"),
            Record::child(2, 1, "second"),
            Record::child(3, 2, "leaf"),
        ]);
        let report = validate(&store);

        assert_eq!(report.reachable_count, 4);
        assert_eq!(report.issues.len(), 1);
    }

    #[test]
    fn test_long_orphaned_chain() {
        const LEN: i64 = 20_000;

        // Leaf first, so every walk starts at the far end of the chain
        let store: RecordStore = (0..LEN)
            .map(|i| Record::child(i, i + 1, format!("n{i}")))
            .collect();

        let start = std::time::Instant::now();
        let report = validate(&store);
        let elapsed = start.elapsed();

        assert_eq!(report.reachable_count, 0);
        assert_eq!(
            report.orphans().collect::<Vec<_>>(),
            vec![&RecordId::from(LEN - 1)]
        );
        let unreachable = report
            .issues
            .iter()
            .filter(|i| matches!(i, Issue::Unreachable { .. }))
            .count();
        assert_eq!(unreachable, LEN as usize - 1);
        assert!(
            elapsed < std::time::Duration::from_secs(5),
            "validation took {elapsed:?}"
        );
    }

    #[test]
    fn test_issue_display() {
        let issue = Issue::ParentCycle {
            members: vec![RecordId::from("a"), RecordId::from(2)],
        };
        assert_eq!(issue.to_string(), "parent cycle: a -> 2");
    }

    #[test]
    fn test_report_serialization() {
        let store = RecordStore::new(vec![Record::child(2, 9, "x")]);
        let json = serde_json::to_value(validate(&store)).unwrap();

        assert_eq!(json["issues"][0]["kind"], "missing_parent");
        assert_eq!(json["issues"][0]["parent_id"], 9);
    }
}
