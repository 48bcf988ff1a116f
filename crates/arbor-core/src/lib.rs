//! Arbor Core
//!
//! This crate rebuilds a rooted forest from flat records, including:
//! - A record store checked once at ingestion
//! - An adjacency index grouping records by parent key
//! - A tree materializer with explicit cycle and depth handling
//! - Optional data-quality validation (duplicates, orphans, cycles)

mod error;
pub mod index;
pub mod record;
pub mod tree;
pub mod validate;

pub use error::{ArborError, Result};
pub use index::{build_index, AdjacencyIndex, ParentKey};
pub use record::{Record, RecordId, RecordStore};
pub use tree::{
    build_forest, build_subtree, count_nodes, materialize, CyclePolicy, MaterializeOptions,
    Materializer, TreeNode, DEFAULT_MAX_DEPTH,
};
pub use validate::{validate, Issue, ValidationReport};
