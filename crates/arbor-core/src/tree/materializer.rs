//! Tree materializer: walks the adjacency index into nested nodes.

use super::{count_nodes, TreeNode};
use crate::error::{ArborError, Result};
use crate::index::{AdjacencyIndex, ParentKey};
use crate::record::{RecordId, RecordStore};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

/// Default nesting limit for materialized trees.
pub const DEFAULT_MAX_DEPTH: usize = 1024;

/// What to do when a parent chain re-enters the active path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CyclePolicy {
    /// Fail with `ArborError::Cycle`
    #[default]
    Strict,
    /// Emit the re-entering node without children
    Permissive,
}

impl fmt::Display for CyclePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CyclePolicy::Strict => write!(f, "strict"),
            CyclePolicy::Permissive => write!(f, "permissive"),
        }
    }
}

impl FromStr for CyclePolicy {
    type Err = ArborError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "strict" => Ok(CyclePolicy::Strict),
            "permissive" => Ok(CyclePolicy::Permissive),
            other => Err(ArborError::UnknownCyclePolicy(other.to_string())),
        }
    }
}

/// Materialization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterializeOptions {
    /// Cycle handling
    #[serde(default)]
    pub cycle_policy: CyclePolicy,

    /// Maximum nesting depth of emitted nodes (None disables the check)
    #[serde(default = "default_max_depth")]
    pub max_depth: Option<usize>,
}

fn default_max_depth() -> Option<usize> {
    Some(DEFAULT_MAX_DEPTH)
}

impl Default for MaterializeOptions {
    fn default() -> Self {
        Self {
            cycle_policy: CyclePolicy::default(),
            max_depth: default_max_depth(),
        }
    }
}

impl MaterializeOptions {
    pub fn permissive() -> Self {
        Self {
            cycle_policy: CyclePolicy::Permissive,
            ..Self::default()
        }
    }
}

/// Expands an adjacency index from a given key.
pub struct Materializer<'i, 'a> {
    index: &'i AdjacencyIndex<'a>,
    options: MaterializeOptions,
}

impl<'i, 'a> Materializer<'i, 'a> {
    pub fn new(index: &'i AdjacencyIndex<'a>) -> Self {
        Self::with_options(index, MaterializeOptions::default())
    }

    pub fn with_options(index: &'i AdjacencyIndex<'a>, options: MaterializeOptions) -> Self {
        Self { index, options }
    }

    /// Materialize the children of `key`.
    ///
    /// When `key` names a record, that record counts as already on the
    /// active path.
    pub fn materialize(&self, key: &ParentKey) -> Result<Vec<TreeNode>> {
        let mut visited = HashSet::new();
        let mut path = Vec::new();
        if let ParentKey::Id(id) = key {
            visited.insert(id.clone());
            path.push(id.clone());
        }

        let nodes = self.expand(key, &mut visited, &mut path, 1)?;

        debug!(root = %key, nodes = count_nodes(&nodes), "Tree materialized");
        Ok(nodes)
    }

    fn expand(
        &self,
        key: &ParentKey,
        visited: &mut HashSet<RecordId>,
        path: &mut Vec<RecordId>,
        depth: usize,
    ) -> Result<Vec<TreeNode>> {
        // No bucket means a leaf
        let Some(bucket) = self.index.bucket(key) else {
            return Ok(Vec::new());
        };

        if let Some(limit) = self.options.max_depth {
            if depth > limit {
                return Err(ArborError::DepthExceeded {
                    key: bucket[0].id.clone(),
                    limit,
                });
            }
        }

        let mut nodes = Vec::with_capacity(bucket.len());

        for record in bucket {
            let mut node = TreeNode::leaf(record.id.clone(), record.name.clone());

            if visited.contains(&record.id) {
                match self.options.cycle_policy {
                    CyclePolicy::Strict => {
                        let mut cycle_path = path.clone();
                        cycle_path.push(record.id.clone());
                        return Err(ArborError::Cycle {
                            key: record.id.clone(),
                            path: cycle_path,
                        });
                    }
                    CyclePolicy::Permissive => {
                        warn!(key = %record.id, "Cycle detected, expansion stopped");
                        nodes.push(node);
                        continue;
                    }
                }
            }

            visited.insert(record.id.clone());
            path.push(record.id.clone());

            let children = self.expand(
                &ParentKey::Id(record.id.clone()),
                visited,
                path,
                depth + 1,
            );

            path.pop();
            visited.remove(&record.id);

            node.children = children?;
            nodes.push(node);
        }

        Ok(nodes)
    }
}

/// Expand `root_key` with an explicitly threaded active-path set.
///
/// Keys in `visited` are treated as already on the path; on return the set
/// holds exactly what it held on entry.
pub fn materialize(
    index: &AdjacencyIndex<'_>,
    root_key: &ParentKey,
    visited: &mut HashSet<RecordId>,
    options: &MaterializeOptions,
) -> Result<Vec<TreeNode>> {
    let materializer = Materializer::with_options(index, options.clone());
    let mut path: Vec<RecordId> = Vec::new();
    materializer.expand(root_key, visited, &mut path, 1)
}

/// Index `store` and materialize everything reachable from the root sentinel.
pub fn build_forest(store: &RecordStore, options: &MaterializeOptions) -> Result<Vec<TreeNode>> {
    let index = AdjacencyIndex::build(store);
    Materializer::with_options(&index, options.clone()).materialize(&ParentKey::Root)
}

/// Index `store` and materialize the descendants of `id`.
pub fn build_subtree(
    store: &RecordStore,
    id: &RecordId,
    options: &MaterializeOptions,
) -> Result<Vec<TreeNode>> {
    let index = AdjacencyIndex::build(store);
    Materializer::with_options(&index, options.clone()).materialize(&ParentKey::Id(id.clone()))
}
