//! The storage boundary the log frontend (`log_server`) consumes, plus the Merkle proof
//! algorithm built on top of it and an in-memory reference backend for tests.
//!
//! The physical storage engine is treated as an external collaborator: this crate models the
//! trait surface the frontend needs, not a production-grade database. [`memory`] is the only
//! implementation shipped here.

pub mod memory;
pub mod merkle;

use async_trait::async_trait;
use log_types::{LogResult, LogRootV1, LogLeaf, QueuedLeaf, SignedLogRoot, TreeId};

pub use merkle::{MerkleNodeSource, NodeAddress, ProofNode};

/// Read-only view of a tree at whatever revision the transaction was opened against. Every read
/// inside a transaction is tied to a single revision so a proof built across several calls stays
/// consistent with one root.
#[async_trait]
pub trait ReadOnlyLogTreeTx: Send + Sync {
    /// `None` when the tree has been created in the admin registry but never had a root stored
    /// (`TreeNeedsInit`, distinct from `TreeNotFound`, which the tree resolver already screens
    /// out before a transaction is ever opened).
    async fn latest_signed_log_root(&self) -> LogResult<Option<SignedLogRoot>>;

    async fn sequenced_leaf_count(&self) -> LogResult<i64>;

    async fn leaves_by_index(&self, leaf_indices: &[i64]) -> LogResult<Vec<LogLeaf>>;

    async fn leaves_by_range(&self, start_index: i64, count: i64) -> LogResult<Vec<LogLeaf>>;

    async fn leaves_by_hash(&self, leaf_hashes: &[Vec<u8>]) -> LogResult<Vec<LogLeaf>>;

    /// The revision this transaction reads at. Every [`MerkleNodeSource`] fetch issued while
    /// building a proof must be pinned to this value.
    fn read_revision(&self) -> u64;

    async fn get_leaf_hash(&self, leaf_index: u64) -> LogResult<Option<Vec<u8>>>;

    async fn get_merkle_node(&self, level: u64, index: u64) -> LogResult<Option<Vec<u8>>>;

    /// Runs out-of-band; storage transactions in this reimplementation don't hold a live
    /// connection to release, so this is a no-op placeholder for backends that do.
    async fn close(&self) -> LogResult<()> {
        Ok(())
    }
}

/// A read-write transaction. Callers are expected to use [`TreeTxGuard`] rather than holding a
/// bare `Box<dyn LogTreeTx>`, so an unhandled early return still rolls back.
#[async_trait]
pub trait LogTreeTx: ReadOnlyLogTreeTx {
    /// Appends leaves to the unsequenced queue, deduplicating by `leaf_identity_hash`. Leaves
    /// that already exist come back tagged `LeafStatus::AlreadyExists` carrying the
    /// previously-stored leaf, mirroring `QueueLeaves`' dedup contract.
    async fn queue_leaves(
        &mut self,
        leaves: Vec<LogLeaf>,
        queue_timestamp_nanos: i64,
    ) -> LogResult<Vec<QueuedLeaf>>;

    /// Writes leaves that already carry a caller-assigned `leaf_index` directly into the
    /// sequenced set, for `PreorderedLog` trees (`AddSequencedLeaves`).
    async fn add_sequenced_leaves(
        &mut self,
        leaves: Vec<LogLeaf>,
        integrate_timestamp_nanos: i64,
    ) -> LogResult<Vec<QueuedLeaf>>;

    /// Persists a newly signed tree head, materializing any newly-complete Merkle nodes implied
    /// by the new `tree_size` at the transaction's revision.
    async fn store_signed_log_root(&mut self, signed_root: SignedLogRoot) -> LogResult<()>;

    async fn commit(self: Box<Self>) -> LogResult<()>;

    async fn rollback(self: Box<Self>) -> LogResult<()>;
}

/// The storage-wide entry point. Implementations are expected to be cheap to clone/share (an
/// `Arc` around shared state), matching how the frontend holds a single long-lived handle.
#[async_trait]
pub trait LogStorage: Send + Sync {
    /// `CheckDatabaseAccessible`: a liveness probe independent of any particular tree, used by
    /// `IsHealthy`.
    async fn check_database_accessible(&self) -> LogResult<()>;

    async fn snapshot(&self, tree_id: TreeId) -> LogResult<Box<dyn ReadOnlyLogTreeTx>>;

    async fn begin(&self, tree_id: TreeId) -> LogResult<Box<dyn LogTreeTx>>;
}

/// Drop-based transaction guard: commit-or-rollback needs to happen even when a handler returns
/// early via `?`. Holding the boxed transaction behind this guard and calling
/// [`TreeTxGuard::commit`] explicitly on every success path means a bug that forgets to commit
/// closes as a rollback instead of leaking an open transaction.
pub struct TreeTxGuard {
    tx: Option<Box<dyn LogTreeTx>>,
}

impl TreeTxGuard {
    pub fn new(tx: Box<dyn LogTreeTx>) -> Self {
        Self { tx: Some(tx) }
    }

    pub fn as_mut(&mut self) -> &mut (dyn LogTreeTx + 'static) {
        self.tx.as_deref_mut().expect("transaction guard used after close")
    }

    pub fn as_ref(&self) -> &(dyn LogTreeTx + 'static) {
        self.tx.as_deref().expect("transaction guard used after close")
    }

    pub async fn commit(mut self) -> LogResult<()> {
        let tx = self.tx.take().expect("transaction guard used after close");
        tx.commit().await
    }
}

impl Drop for TreeTxGuard {
    fn drop(&mut self) {
        if let Some(tx) = self.tx.take() {
            // The transaction is rolled back on the best-effort basis an in-process `Drop` can
            // offer: spawn it so an async rollback isn't silently skipped by a sync drop.
            tokio::spawn(async move {
                let _ = tx.rollback().await;
            });
        }
    }
}

/// Binds a transaction's leaf/node reads to [`MerkleNodeSource`], the narrow capability the
/// proof builder in [`merkle`] actually needs.
pub struct TxNodeSource<'a> {
    tx: &'a dyn ReadOnlyLogTreeTx,
}

impl<'a> TxNodeSource<'a> {
    pub fn new(tx: &'a dyn ReadOnlyLogTreeTx) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl<'a> MerkleNodeSource for TxNodeSource<'a> {
    async fn get_node(&self, level: u64, index: u64) -> Option<Vec<u8>> {
        self.tx.get_merkle_node(level, index).await.ok().flatten()
    }

    async fn get_leaf_hash(&self, leaf_index: u64) -> Option<Vec<u8>> {
        self.tx.get_leaf_hash(leaf_index).await.ok().flatten()
    }
}

/// Convenience used by the frontend: decode the latest root and fetch it in one call, surfacing
/// `TreeNeedsInit` as `Ok(None)` rather than forcing every caller to decode separately.
pub async fn latest_log_root(tx: &dyn ReadOnlyLogTreeTx) -> LogResult<Option<LogRootV1>> {
    match tx.latest_signed_log_root().await? {
        Some(signed) => Ok(Some(signed.decode()?)),
        None => Ok(None),
    }
}
