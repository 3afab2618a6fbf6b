//! Resolves a [`TreeId`] to its admin-registry descriptor and checks the operation the caller is
//! attempting against the tree's type, independent of storage: a tree that doesn't support an
//! operation is rejected before any transaction is opened.

use async_trait::async_trait;
use log_rpc_types::LogServerResult;
use log_types::{HashStrategy, LogError, LogHasher, OperationClass, TreeDescriptor, TreeId, TreeType};

/// The narrow admin-registry capability the facade needs: look up a tree's type and hash
/// strategy. Lifecycle operations (create/freeze/delete a tree) live outside this crate.
#[async_trait]
pub trait TreeRegistry: Send + Sync {
    async fn get_tree(&self, tree_id: TreeId) -> Option<TreeDescriptor>;
}

pub async fn resolve_tree(
    registry: &dyn TreeRegistry,
    tree_id: TreeId,
    operation_class: OperationClass,
    operation: &'static str,
) -> LogServerResult<(TreeDescriptor, Box<dyn LogHasher>)> {
    let descriptor = registry.get_tree(tree_id).await.ok_or(LogError::TreeNotFound { tree_id })?;
    if !operation_class.permits(descriptor.tree_type) {
        return Err(LogError::TreeTypeMismatch { tree_id, actual: descriptor.tree_type, operation });
    }
    let hasher = descriptor.hash_strategy.hasher();
    Ok((descriptor, hasher))
}

/// An in-process admin registry, backed by a `RwLock<HashMap>`. Stands in for the external
/// registry a production deployment would reach over the network.
pub struct StaticTreeRegistry {
    trees: std::sync::RwLock<std::collections::HashMap<TreeId, TreeDescriptor>>,
}

impl Default for StaticTreeRegistry {
    fn default() -> Self {
        Self { trees: std::sync::RwLock::new(std::collections::HashMap::new()) }
    }
}

impl StaticTreeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, tree_id: TreeId, tree_type: TreeType, hash_strategy: HashStrategy) {
        self.trees
            .write()
            .unwrap()
            .insert(tree_id, TreeDescriptor::new(tree_id, tree_type, hash_strategy));
    }
}

#[async_trait]
impl TreeRegistry for StaticTreeRegistry {
    async fn get_tree(&self, tree_id: TreeId) -> Option<TreeDescriptor> {
        self.trees.read().unwrap().get(&tree_id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[tokio::test]
    async fn unregistered_tree_is_not_found() {
        let registry = StaticTreeRegistry::new();
        let result =
            resolve_tree(&registry, 1, OperationClass::Query, "GetLatestSignedLogRoot").await;
        assert_matches!(result, Err(LogError::TreeNotFound { tree_id: 1 }));
    }

    #[tokio::test]
    async fn queue_log_rejects_preordered_tree() {
        let registry = StaticTreeRegistry::new();
        registry.register(1, TreeType::PreorderedLog, HashStrategy::Rfc6962Sha256);
        let result = resolve_tree(&registry, 1, OperationClass::QueueLog, "QueueLeaves").await;
        assert_matches!(result, Err(LogError::TreeTypeMismatch { tree_id: 1, .. }));
    }

    #[tokio::test]
    async fn sequence_log_rejects_plain_log() {
        let registry = StaticTreeRegistry::new();
        registry.register(1, TreeType::Log, HashStrategy::Rfc6962Sha256);
        let result =
            resolve_tree(&registry, 1, OperationClass::SequenceLog, "AddSequencedLeaves").await;
        assert_matches!(result, Err(LogError::TreeTypeMismatch { tree_id: 1, .. }));
    }

    #[tokio::test]
    async fn query_permits_either_tree_type() {
        let registry = StaticTreeRegistry::new();
        registry.register(1, TreeType::Log, HashStrategy::Rfc6962Sha256);
        registry.register(2, TreeType::PreorderedLog, HashStrategy::Rfc6962Sha256);
        assert!(resolve_tree(&registry, 1, OperationClass::Query, "GetEntryAndProof")
            .await
            .is_ok());
        assert!(resolve_tree(&registry, 2, OperationClass::Query, "GetEntryAndProof")
            .await
            .is_ok());
    }
}
