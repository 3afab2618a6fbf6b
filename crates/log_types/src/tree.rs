use serde::{Deserialize, Serialize};

use crate::hasher::HashStrategy;

/// A tree's identity is a 64-bit id; lifecycle (create/freeze/delete) belongs to the external
/// admin registry -- this crate only models the shape the facade reads.
pub type TreeId = i64;

/// `Log`: clients append, the sequencer assigns `LeafIndex`. `PreorderedLog`: clients assign
/// `LeafIndex` themselves, bypassing the sequencer.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum TreeType {
    Log,
    PreorderedLog,
}

/// The operation-class filter the tree resolver applies: each RPC family declares which tree
/// types it may operate against.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum OperationClass {
    Admin,
    Query,
    QueueLog,
    SequenceLog,
}

impl OperationClass {
    /// Whether a tree of the given type may be used for this operation class.
    pub fn permits(self, tree_type: TreeType) -> bool {
        match self {
            OperationClass::Admin => matches!(tree_type, TreeType::Log | TreeType::PreorderedLog),
            OperationClass::Query => matches!(tree_type, TreeType::Log | TreeType::PreorderedLog),
            OperationClass::QueueLog => matches!(tree_type, TreeType::Log),
            OperationClass::SequenceLog => matches!(tree_type, TreeType::PreorderedLog),
        }
    }
}

/// The tree descriptor the admin registry owns; the facade only reads it.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct TreeDescriptor {
    pub tree_id: TreeId,
    pub tree_type: TreeType,
    pub hash_strategy: HashStrategy,
}

impl TreeDescriptor {
    pub fn new(tree_id: TreeId, tree_type: TreeType, hash_strategy: HashStrategy) -> Self {
        Self { tree_id, tree_type, hash_strategy }
    }
}
