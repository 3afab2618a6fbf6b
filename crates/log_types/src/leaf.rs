use serde::{Deserialize, Serialize};

use crate::tree::TreeId;

/// A record appended to the log. `merkle_leaf_hash` is computed by the facade before any
/// storage write, and `leaf_identity_hash` defaults to it when the caller doesn't supply one.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct LogLeaf {
    pub leaf_value: Vec<u8>,
    pub extra_data: Vec<u8>,
    pub leaf_identity_hash: Vec<u8>,
    pub merkle_leaf_hash: Vec<u8>,
    /// Sequence position. Required (and caller-supplied) for `PreorderedLog` writes; assigned by
    /// the sequencer for plain `Log` writes, in which case it is `None` until integration.
    pub leaf_index: Option<i64>,
    pub queue_timestamp_nanos: Option<i64>,
    pub integrate_timestamp_nanos: Option<i64>,
}

impl LogLeaf {
    pub fn new(leaf_value: Vec<u8>, extra_data: Vec<u8>) -> Self {
        Self { leaf_value, extra_data, ..Default::default() }
    }

    pub fn with_leaf_index(mut self, leaf_index: i64) -> Self {
        self.leaf_index = Some(leaf_index);
        self
    }

    pub fn with_identity_hash(mut self, leaf_identity_hash: Vec<u8>) -> Self {
        self.leaf_identity_hash = leaf_identity_hash;
        self
    }
}

/// The outcome of queuing a single leaf: `New` if this is the first time its identity hash was
/// seen, `AlreadyExists` on a dedup hit (storage returns the previously-stored leaf).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum LeafStatus {
    New,
    AlreadyExists,
}

/// Per-leaf queueing result returned by `QueueLeaves`/`AddSequencedLeaves`.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct QueuedLeaf {
    pub leaf: LogLeaf,
    pub status: LeafStatus,
}

/// Computes `merkle_leaf_hash` for every leaf in place and defaults an empty `leaf_identity_hash`
/// to it.
pub fn hash_leaves(leaves: &mut [LogLeaf], hasher: &dyn crate::hasher::LogHasher) {
    for leaf in leaves.iter_mut() {
        leaf.merkle_leaf_hash = hasher.hash_leaf(&leaf.leaf_value);
        if leaf.leaf_identity_hash.is_empty() {
            leaf.leaf_identity_hash = leaf.merkle_leaf_hash.clone();
        }
    }
}

/// Context carried alongside a tree id once the tree has been resolved; not part of the wire
/// model but kept here since several modules need to thread `(tree_id, tree_type)` together.
#[derive(Clone, Copy, Debug)]
pub struct TreeContext {
    pub tree_id: TreeId,
}
