//! An in-memory reference [`LogStorage`](crate::LogStorage) implementation. The physical storage
//! engine is out of scope here; this backend exists so the rest of the crate — and `log_server`
//! above it — has something concrete to run against in tests.
//!
//! The sequencer/integration pipeline and the signer are likewise external collaborators this
//! reimplementation never models as production components. [`MemoryLogStorage::integrate_for_testing`]
//! stands in for both, gated behind the `testing` feature, so tests can drive a tree from queued
//! leaves through to a signed head without pulling in a real sequencer.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;
use log_types::{
    HashStrategy, LogError, LogHasher, LogLeaf, LogResult, LogRootV1, LeafStatus, QueuedLeaf,
    SignedLogRoot, TreeId,
};

use crate::{LogStorage, LogTreeTx, ReadOnlyLogTreeTx};

struct TreeState {
    hasher: Box<dyn LogHasher>,
    /// Leaves queued on a `Log` tree but not yet integrated; FIFO by queue order.
    unsequenced: Vec<LogLeaf>,
    /// Sequenced leaves, keyed by their assigned index (sparse for `PreorderedLog` trees).
    sequenced: BTreeMap<i64, LogLeaf>,
    /// Dedup index shared across queue/add-sequenced paths, keyed by `leaf_identity_hash`.
    by_identity: HashMap<Vec<u8>, LogLeaf>,
    latest_root: Option<SignedLogRoot>,
    revision: u64,
    /// Materialized complete-subtree nodes, keyed by revision then `(level, index)`.
    nodes: HashMap<u64, HashMap<(u64, u64), Vec<u8>>>,
}

impl TreeState {
    fn new(hash_strategy: HashStrategy) -> Self {
        Self {
            hasher: hash_strategy.hasher(),
            unsequenced: Vec::new(),
            sequenced: BTreeMap::new(),
            by_identity: HashMap::new(),
            latest_root: None,
            revision: 0,
            nodes: HashMap::new(),
        }
    }

    fn materialize_complete_subtrees(&mut self, revision: u64) {
        let size = self.sequenced.len() as u64;
        let leaf_hash = |i: u64| self.sequenced.get(&(i as i64)).map(|l| l.merkle_leaf_hash.clone());
        let by_rev = self.nodes.entry(revision).or_default();
        materialize(&*self.hasher, size, &leaf_hash, by_rev);
    }
}

fn materialize(
    hasher: &dyn LogHasher,
    size: u64,
    leaf_hash: &dyn Fn(u64) -> Option<Vec<u8>>,
    out: &mut HashMap<(u64, u64), Vec<u8>>,
) {
    fn compute_range(
        hasher: &dyn LogHasher,
        start: u64,
        end: u64,
        leaf_hash: &dyn Fn(u64) -> Option<Vec<u8>>,
    ) -> Option<Vec<u8>> {
        if end - start == 1 {
            return leaf_hash(start);
        }
        let mut k = 1u64;
        while k * 2 < end - start {
            k *= 2;
        }
        let left = compute_range(hasher, start, start + k, leaf_hash)?;
        let right = compute_range(hasher, start + k, end, leaf_hash)?;
        Some(hasher.hash_children(&left, &right))
    }

    let mut span = 2u64;
    let mut level = 1u64;
    while span <= size {
        let complete_count = size / span;
        for index in 0..complete_count {
            let start = index * span;
            if let Some(hash) = compute_range(hasher, start, start + span, leaf_hash) {
                out.insert((level, index), hash);
            }
        }
        level += 1;
        span *= 2;
    }
}

/// A shared, clonable handle over in-memory tree state. Matches the way the frontend expects to
/// hold a single long-lived storage handle.
#[derive(Clone)]
pub struct MemoryLogStorage {
    trees: std::sync::Arc<Mutex<HashMap<TreeId, TreeState>>>,
}

impl Default for MemoryLogStorage {
    fn default() -> Self {
        Self { trees: std::sync::Arc::new(Mutex::new(HashMap::new())) }
    }
}

impl MemoryLogStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a tree so it can be snapshotted/written against. Mirrors what the (external)
    /// admin registry + `InitLog` would have set up before the frontend ever sees the tree id.
    pub fn register_tree(&self, tree_id: TreeId, hash_strategy: HashStrategy) {
        self.trees.lock().unwrap().entry(tree_id).or_insert_with(|| TreeState::new(hash_strategy));
    }

    /// Test-only stand-in for the sequencer+signer pipeline: integrates every currently queued
    /// leaf, recomputes the tree, and stores a freshly signed (unsigned, in this reference
    /// backend) head. Returns the new `SignedLogRoot` for convenience.
    #[cfg(any(test, feature = "testing"))]
    pub async fn integrate_for_testing(
        &self,
        tree_id: TreeId,
        integrate_timestamp_nanos: i64,
    ) -> LogResult<SignedLogRoot> {
        let mut trees = self.trees.lock().unwrap();
        let state = trees.get_mut(&tree_id).ok_or(LogError::TreeNotFound { tree_id })?;

        let mut next_index = state.sequenced.keys().next_back().map(|i| i + 1).unwrap_or(0);
        for mut leaf in std::mem::take(&mut state.unsequenced) {
            leaf.leaf_index = Some(next_index);
            leaf.integrate_timestamp_nanos = Some(integrate_timestamp_nanos);
            state.by_identity.insert(leaf.leaf_identity_hash.clone(), leaf.clone());
            state.sequenced.insert(next_index, leaf);
            next_index += 1;
        }

        let revision = state.revision + 1;
        state.materialize_complete_subtrees(revision);
        let tree_size = state.sequenced.len() as u64;
        let root_hash = if tree_size == 0 {
            state.hasher.empty_root()
        } else {
            state
                .nodes
                .get(&revision)
                .and_then(|nodes| full_tree_root(&*state.hasher, tree_size, nodes, &state.sequenced))
                .ok_or_else(|| LogError::internal("failed to materialize root hash"))?
        };

        let log_root = LogRootV1 {
            tree_size,
            root_hash,
            timestamp_nanos: integrate_timestamp_nanos as u64,
            revision,
            metadata: Vec::new(),
        };
        let signed = SignedLogRoot { log_root: log_root.marshal_binary(), log_root_signature: Vec::new() };
        state.latest_root = Some(signed.clone());
        state.revision = revision;
        Ok(signed)
    }
}

#[cfg(any(test, feature = "testing"))]
fn full_tree_root(
    hasher: &dyn LogHasher,
    size: u64,
    nodes: &HashMap<(u64, u64), Vec<u8>>,
    sequenced: &BTreeMap<i64, LogLeaf>,
) -> Option<Vec<u8>> {
    fn go(
        hasher: &dyn LogHasher,
        start: u64,
        end: u64,
        nodes: &HashMap<(u64, u64), Vec<u8>>,
        sequenced: &BTreeMap<i64, LogLeaf>,
    ) -> Option<Vec<u8>> {
        let size = end - start;
        if size == 1 {
            return sequenced.get(&(start as i64)).map(|l| l.merkle_leaf_hash.clone());
        }
        if size.is_power_of_two() {
            let level = size.trailing_zeros() as u64;
            if let Some(hash) = nodes.get(&(level, start / size)) {
                return Some(hash.clone());
            }
        }
        let mut k = 1u64;
        while k * 2 < size {
            k *= 2;
        }
        let left = go(hasher, start, start + k, nodes, sequenced)?;
        let right = go(hasher, start + k, end, nodes, sequenced)?;
        Some(hasher.hash_children(&left, &right))
    }
    go(hasher, 0, size, nodes, sequenced)
}

#[async_trait]
impl LogStorage for MemoryLogStorage {
    async fn check_database_accessible(&self) -> LogResult<()> {
        Ok(())
    }

    async fn snapshot(&self, tree_id: TreeId) -> LogResult<Box<dyn ReadOnlyLogTreeTx>> {
        self.ensure_registered(tree_id)?;
        Ok(Box::new(MemoryTx { storage: self.clone(), tree_id }))
    }

    async fn begin(&self, tree_id: TreeId) -> LogResult<Box<dyn LogTreeTx>> {
        self.ensure_registered(tree_id)?;
        Ok(Box::new(MemoryTx { storage: self.clone(), tree_id }))
    }
}

impl MemoryLogStorage {
    fn ensure_registered(&self, tree_id: TreeId) -> LogResult<()> {
        if self.trees.lock().unwrap().contains_key(&tree_id) {
            Ok(())
        } else {
            Err(LogError::TreeNotFound { tree_id })
        }
    }

    fn current_revision(&self, tree_id: TreeId) -> u64 {
        self.trees.lock().unwrap().get(&tree_id).map(|s| s.revision).unwrap_or(0)
    }
}

/// A transaction handle. This reference backend holds no real connection, so open/close/commit
/// only manipulate the shared `Mutex`-guarded state directly; the scoped-guard lifecycle in
/// `crate::TreeTxGuard` is still exercised by callers exactly as it would be against a real
/// backend.
struct MemoryTx {
    storage: MemoryLogStorage,
    tree_id: TreeId,
}

#[async_trait]
impl ReadOnlyLogTreeTx for MemoryTx {
    async fn latest_signed_log_root(&self) -> LogResult<Option<SignedLogRoot>> {
        let trees = self.storage.trees.lock().unwrap();
        let state = trees.get(&self.tree_id).ok_or(LogError::TreeNotFound { tree_id: self.tree_id })?;
        Ok(state.latest_root.clone())
    }

    async fn sequenced_leaf_count(&self) -> LogResult<i64> {
        let trees = self.storage.trees.lock().unwrap();
        let state = trees.get(&self.tree_id).ok_or(LogError::TreeNotFound { tree_id: self.tree_id })?;
        Ok(state.sequenced.len() as i64)
    }

    async fn leaves_by_index(&self, leaf_indices: &[i64]) -> LogResult<Vec<LogLeaf>> {
        let trees = self.storage.trees.lock().unwrap();
        let state = trees.get(&self.tree_id).ok_or(LogError::TreeNotFound { tree_id: self.tree_id })?;
        leaf_indices
            .iter()
            .map(|idx| {
                state
                    .sequenced
                    .get(idx)
                    .cloned()
                    .ok_or_else(|| LogError::internal(format!("no leaf at index {idx}")))
            })
            .collect()
    }

    async fn leaves_by_range(&self, start_index: i64, count: i64) -> LogResult<Vec<LogLeaf>> {
        let trees = self.storage.trees.lock().unwrap();
        let state = trees.get(&self.tree_id).ok_or(LogError::TreeNotFound { tree_id: self.tree_id })?;
        Ok(state
            .sequenced
            .range(start_index..start_index.saturating_add(count))
            .map(|(_, leaf)| leaf.clone())
            .collect())
    }

    async fn leaves_by_hash(&self, leaf_hashes: &[Vec<u8>]) -> LogResult<Vec<LogLeaf>> {
        let trees = self.storage.trees.lock().unwrap();
        let state = trees.get(&self.tree_id).ok_or(LogError::TreeNotFound { tree_id: self.tree_id })?;
        // Returns every sequenced leaf whose hash matches any requested hash, not just the first:
        // without per-leaf dedup, distinct sequence positions can share a `merkle_leaf_hash`, and
        // proof-by-hash needs all of them.
        let wanted: std::collections::HashSet<&[u8]> =
            leaf_hashes.iter().map(Vec::as_slice).collect();
        Ok(state
            .sequenced
            .values()
            .filter(|leaf| wanted.contains(leaf.merkle_leaf_hash.as_slice()))
            .cloned()
            .collect())
    }

    fn read_revision(&self) -> u64 {
        self.storage.current_revision(self.tree_id)
    }

    async fn get_leaf_hash(&self, leaf_index: u64) -> LogResult<Option<Vec<u8>>> {
        let trees = self.storage.trees.lock().unwrap();
        let state = trees.get(&self.tree_id).ok_or(LogError::TreeNotFound { tree_id: self.tree_id })?;
        Ok(state.sequenced.get(&(leaf_index as i64)).map(|l| l.merkle_leaf_hash.clone()))
    }

    async fn get_merkle_node(&self, level: u64, index: u64) -> LogResult<Option<Vec<u8>>> {
        let trees = self.storage.trees.lock().unwrap();
        let state = trees.get(&self.tree_id).ok_or(LogError::TreeNotFound { tree_id: self.tree_id })?;
        Ok(state.nodes.get(&state.revision).and_then(|nodes| nodes.get(&(level, index)).cloned()))
    }
}

#[async_trait]
impl LogTreeTx for MemoryTx {
    async fn queue_leaves(
        &mut self,
        leaves: Vec<LogLeaf>,
        queue_timestamp_nanos: i64,
    ) -> LogResult<Vec<QueuedLeaf>> {
        let mut trees = self.storage.trees.lock().unwrap();
        let state = trees.get_mut(&self.tree_id).ok_or(LogError::TreeNotFound { tree_id: self.tree_id })?;

        let mut out = Vec::with_capacity(leaves.len());
        for mut leaf in leaves {
            if let Some(existing) = state.by_identity.get(&leaf.leaf_identity_hash) {
                out.push(QueuedLeaf { leaf: existing.clone(), status: LeafStatus::AlreadyExists });
                continue;
            }
            leaf.queue_timestamp_nanos = Some(queue_timestamp_nanos);
            state.by_identity.insert(leaf.leaf_identity_hash.clone(), leaf.clone());
            state.unsequenced.push(leaf.clone());
            out.push(QueuedLeaf { leaf, status: LeafStatus::New });
        }
        Ok(out)
    }

    async fn add_sequenced_leaves(
        &mut self,
        leaves: Vec<LogLeaf>,
        integrate_timestamp_nanos: i64,
    ) -> LogResult<Vec<QueuedLeaf>> {
        let mut trees = self.storage.trees.lock().unwrap();
        let state = trees.get_mut(&self.tree_id).ok_or(LogError::TreeNotFound { tree_id: self.tree_id })?;

        let mut out = Vec::with_capacity(leaves.len());
        for mut leaf in leaves {
            if let Some(existing) = state.by_identity.get(&leaf.leaf_identity_hash) {
                out.push(QueuedLeaf { leaf: existing.clone(), status: LeafStatus::AlreadyExists });
                continue;
            }
            let index = leaf
                .leaf_index
                .ok_or_else(|| LogError::invalid_argument("leaf_index", "required for a pre-ordered log"))?;
            if state.sequenced.contains_key(&index) {
                return Err(LogError::internal(format!("leaf index {index} already occupied")));
            }
            leaf.integrate_timestamp_nanos = Some(integrate_timestamp_nanos);
            state.by_identity.insert(leaf.leaf_identity_hash.clone(), leaf.clone());
            state.sequenced.insert(index, leaf.clone());
            out.push(QueuedLeaf { leaf, status: LeafStatus::New });
        }
        Ok(out)
    }

    async fn store_signed_log_root(&mut self, signed_root: SignedLogRoot) -> LogResult<()> {
        let decoded = signed_root.decode()?;
        let mut trees = self.storage.trees.lock().unwrap();
        let state = trees.get_mut(&self.tree_id).ok_or(LogError::TreeNotFound { tree_id: self.tree_id })?;
        if decoded.tree_size != state.sequenced.len() as u64 {
            return Err(LogError::internal("stored root's tree_size does not match sequenced leaf count"));
        }
        state.materialize_complete_subtrees(decoded.revision);
        state.latest_root = Some(signed_root);
        state.revision = decoded.revision;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> LogResult<()> {
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> LogResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use log_types::HashStrategy;

    use super::*;

    #[tokio::test]
    async fn init_then_query_empty_tree() {
        let storage = MemoryLogStorage::new();
        storage.register_tree(42, HashStrategy::Rfc6962Sha256);

        let mut tx = storage.begin(42).await.unwrap();
        assert!(tx.latest_signed_log_root().await.unwrap().is_none());

        let hasher = HashStrategy::Rfc6962Sha256.hasher();
        let root = LogRootV1 {
            tree_size: 0,
            root_hash: hasher.empty_root(),
            timestamp_nanos: 1,
            revision: 1,
            metadata: Vec::new(),
        };
        tx.store_signed_log_root(SignedLogRoot {
            log_root: root.marshal_binary(),
            log_root_signature: Vec::new(),
        })
        .await
        .unwrap();
        tx.commit().await.unwrap();

        let snapshot = storage.snapshot(42).await.unwrap();
        let stored = snapshot.latest_signed_log_root().await.unwrap().unwrap().decode().unwrap();
        assert_eq!(stored.tree_size, 0);
        assert_eq!(stored.root_hash, hasher.empty_root());
    }

    #[tokio::test]
    async fn queue_then_dedup_then_integrate() {
        let storage = MemoryLogStorage::new();
        storage.register_tree(7, HashStrategy::Rfc6962Sha256);

        let mut tx = storage.begin(7).await.unwrap();
        let mut leaf = LogLeaf::new(b"hello".to_vec(), Vec::new());
        leaf.merkle_leaf_hash = HashStrategy::Rfc6962Sha256.hasher().hash_leaf(&leaf.leaf_value);
        leaf.leaf_identity_hash = leaf.merkle_leaf_hash.clone();

        let first = tx.queue_leaves(vec![leaf.clone()], 100).await.unwrap();
        assert_eq!(first[0].status, LeafStatus::New);
        let second = tx.queue_leaves(vec![leaf.clone()], 200).await.unwrap();
        assert_eq!(second[0].status, LeafStatus::AlreadyExists);
        tx.commit().await.unwrap();

        let root = storage.integrate_for_testing(7, 300).await.unwrap();
        let decoded = root.decode().unwrap();
        assert_eq!(decoded.tree_size, 1);

        let snapshot = storage.snapshot(7).await.unwrap();
        assert_eq!(snapshot.sequenced_leaf_count().await.unwrap(), 1);
        let fetched = snapshot.get_leaf_hash(0).await.unwrap().unwrap();
        assert_eq!(fetched, leaf.merkle_leaf_hash);
    }

    #[tokio::test]
    async fn snapshot_of_unregistered_tree_is_not_found() {
        let storage = MemoryLogStorage::new();
        let err = storage.snapshot(999).await.unwrap_err();
        assert_matches::assert_matches!(err, LogError::TreeNotFound { tree_id: 999 });
    }
}
