use serde::{Deserialize, Serialize};

/// `{LeafIndex, Hashes[]}`. For inclusion, `hashes` is the sibling path in root-ward order; for
/// consistency, the RFC 6962 §2.1.2 hash set. Transient: owned by the response, never persisted.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Proof {
    pub leaf_index: i64,
    pub hashes: Vec<Vec<u8>>,
}

impl Proof {
    pub fn new(leaf_index: i64, hashes: Vec<Vec<u8>>) -> Self {
        Self { leaf_index, hashes }
    }

    pub fn empty() -> Self {
        Self { leaf_index: 0, hashes: Vec::new() }
    }
}
