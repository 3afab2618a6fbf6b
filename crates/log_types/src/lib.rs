pub mod error;
pub mod hasher;
pub mod leaf;
pub mod proof;
pub mod root;
pub mod tree;

pub use error::{LogError, LogResult};
pub use hasher::{HashStrategy, LogHasher, Rfc6962Sha256};
pub use leaf::{hash_leaves, LeafStatus, LogLeaf, QueuedLeaf, TreeContext};
pub use proof::Proof;
pub use root::{LogRootV1, SignedLogRoot};
pub use tree::{OperationClass, TreeDescriptor, TreeId, TreeType};
