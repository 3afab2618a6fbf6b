use std::sync::Arc;

use log_storage::memory::MemoryLogStorage;
use log_types::{HashStrategy, TreeId, TreeType};

use crate::config::LogServerConfig;
use crate::signer::NoopSigner;
use crate::tree_resolver::StaticTreeRegistry;
use crate::MemoryLogServer;

impl MemoryLogServer {
    /// A facade over a fresh, empty in-memory backend. `register_tree` hands it an admin-registry
    /// entry and a matching storage slot in one call, the way a real deployment's admin API and
    /// storage provisioning would be driven together by a single "create tree" operation.
    pub fn new_for_testing() -> Self {
        Self::new(
            MemoryLogStorage::new(),
            StaticTreeRegistry::new(),
            Arc::new(NoopSigner),
            Arc::new(apollo_time::SystemClock),
            LogServerConfig::default(),
        )
    }

    pub fn register_tree(&self, tree_id: TreeId, tree_type: TreeType) {
        self.registry.register(tree_id, tree_type, HashStrategy::Rfc6962Sha256);
        self.storage.register_tree(tree_id, HashStrategy::Rfc6962Sha256);
    }
}
