//! Adjacency index: records grouped by parent key.

use crate::record::{Record, RecordId, RecordStore};
use indexmap::IndexMap;
use std::fmt;
use tracing::debug;

/// Grouping key for the index. `Root` is the reserved "no parent" sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParentKey {
    Root,
    Id(RecordId),
}

impl ParentKey {
    /// The bucket a record belongs to.
    pub fn of(record: &Record) -> Self {
        match &record.parent_id {
            Some(parent) => ParentKey::Id(parent.clone()),
            None => ParentKey::Root,
        }
    }

    pub fn as_id(&self) -> Option<&RecordId> {
        match self {
            ParentKey::Root => None,
            ParentKey::Id(id) => Some(id),
        }
    }
}

impl From<RecordId> for ParentKey {
    fn from(id: RecordId) -> Self {
        ParentKey::Id(id)
    }
}

impl fmt::Display for ParentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParentKey::Root => write!(f, "<root>"),
            ParentKey::Id(id) => write!(f, "{}", id),
        }
    }
}

/// Multimap from parent key to the records that declare it, in input order.
///
/// Borrows the records it was built from and never changes after `build`.
#[derive(Debug, Clone, Default)]
pub struct AdjacencyIndex<'a> {
    buckets: IndexMap<ParentKey, Vec<&'a Record>>,
}

impl<'a> AdjacencyIndex<'a> {
    /// Group records by parent key.
    pub fn build<I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a Record>,
    {
        let mut buckets: IndexMap<ParentKey, Vec<&'a Record>> = IndexMap::new();
        let mut record_count = 0;

        for record in records {
            buckets.entry(ParentKey::of(record)).or_default().push(record);
            record_count += 1;
        }

        debug!(
            records = record_count,
            buckets = buckets.len(),
            "Adjacency index built"
        );

        Self { buckets }
    }

    /// Records whose parent is `key`, or an empty slice.
    pub fn children(&self, key: &ParentKey) -> &[&'a Record] {
        self.bucket(key).unwrap_or(&[])
    }

    /// The bucket for `key`, if any record declares it.
    pub fn bucket(&self, key: &ParentKey) -> Option<&[&'a Record]> {
        self.buckets.get(key).map(Vec::as_slice)
    }

    /// Parent keys in first-seen order.
    pub fn keys(&self) -> impl Iterator<Item = &ParentKey> {
        self.buckets.keys()
    }

    /// Buckets in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&ParentKey, &[&'a Record])> {
        self.buckets.iter().map(|(k, v)| (k, v.as_slice()))
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn record_count(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Bucket keys that name no record in `store`.
    ///
    /// Every record in such a bucket is an orphan and never reaches the root.
    pub fn orphaned_keys<'s>(&'s self, store: &RecordStore) -> Vec<&'s RecordId> {
        let known = store.id_set();
        self.keys()
            .filter_map(ParentKey::as_id)
            .filter(|id| !known.contains(id))
            .collect()
    }
}

/// Build an index over `records`.
pub fn build_index<'a, I>(records: I) -> AdjacencyIndex<'a>
where
    I: IntoIterator<Item = &'a Record>,
{
    AdjacencyIndex::build(records)
}
