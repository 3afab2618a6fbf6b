//! The log RPC frontend's business logic: request validation, tree resolution, transaction
//! choreography, and proof construction wired together into one operation per RPC.

use std::sync::Arc;

use apollo_time::WallClock;
use async_trait::async_trait;
use log_rpc_types::requests::{
    ConsistencyProofRequest,
    ConsistencyProofResponse,
    EntryAndProofRequest,
    EntryAndProofResponse,
    InclusionProofByHashRequest,
    InclusionProofByHashResponse,
    InclusionProofRequest,
    InclusionProofResponse,
    LeavesByHashRequest,
    LeavesByIndexRequest,
    LeavesByRangeRequest,
    LeavesResponse,
};
use log_rpc_types::LogServerResult;
use log_storage::{LogStorage, ReadOnlyLogTreeTx, TreeTxGuard};
use log_types::{
    hash_leaves,
    LeafStatus,
    LogError,
    LogLeaf,
    LogRootV1,
    OperationClass,
    QueuedLeaf,
    SignedLogRoot,
    TreeId,
};
use tracing::instrument;

use crate::config::LogServerConfig;
use crate::metrics::{HEAD_TREE_SIZE, PROOF_BUILD_SECONDS, QUEUED_LEAVES_EXISTING, QUEUED_LEAVES_NEW};
use crate::proof_builder::{build_consistency_proof, build_inclusion_proof};
use crate::signer::LogSigner;
use crate::tree_resolver::{resolve_tree, TreeRegistry};
use crate::validator;

/// Generic over the storage backend and the admin-tree registry, mirroring how the business-logic
/// struct elsewhere in this workspace is generic over its storage trait rather than tied to one
/// concrete implementation.
pub struct LogServer<S: LogStorage, R: TreeRegistry> {
    pub storage: S,
    pub registry: R,
    pub signer: Arc<dyn LogSigner>,
    pub clock: Arc<dyn WallClock>,
    pub config: LogServerConfig,
}

impl<S: LogStorage, R: TreeRegistry> LogServer<S, R> {
    pub fn new(
        storage: S,
        registry: R,
        signer: Arc<dyn LogSigner>,
        clock: Arc<dyn WallClock>,
        config: LogServerConfig,
    ) -> Self {
        Self { storage, registry, signer, clock, config }
    }

    async fn anchor(
        &self,
        tx: &dyn ReadOnlyLogTreeTx,
        tree_id: TreeId,
    ) -> LogServerResult<(SignedLogRoot, LogRootV1)> {
        let signed =
            tx.latest_signed_log_root().await?.ok_or(LogError::TreeNotInitialized { tree_id })?;
        let decoded = signed.decode()?;
        HEAD_TREE_SIZE.set_lossy(decoded.tree_size);
        Ok((signed, decoded))
    }

    #[instrument(skip(self), err)]
    pub async fn init_log(&self, tree_id: TreeId) -> LogServerResult<SignedLogRoot> {
        let (_descriptor, hasher) =
            resolve_tree(&self.registry, tree_id, OperationClass::Admin, "InitLog").await?;
        let tx = self.storage.begin(tree_id).await?;
        let mut guard = TreeTxGuard::new(tx);
        if guard.as_ref().latest_signed_log_root().await?.is_some() {
            return Err(LogError::AlreadyInitialized { tree_id });
        }
        let root = LogRootV1 {
            tree_size: 0,
            root_hash: hasher.empty_root(),
            timestamp_nanos: self.clock.now_nanos(),
            revision: guard.as_ref().read_revision() + 1,
            metadata: Vec::new(),
        };
        let signed = self.signer.sign(tree_id, &root).await?;
        guard.as_mut().store_signed_log_root(signed.clone()).await?;
        guard.commit().await?;
        HEAD_TREE_SIZE.set_lossy(root.tree_size);
        Ok(signed)
    }

    #[instrument(skip(self, leaves), err)]
    pub async fn queue_leaves(
        &self,
        tree_id: TreeId,
        mut leaves: Vec<LogLeaf>,
    ) -> LogServerResult<Vec<QueuedLeaf>> {
        validator::validate_queue_leaves(&leaves)?;
        let (_descriptor, hasher) =
            resolve_tree(&self.registry, tree_id, OperationClass::QueueLog, "QueueLeaves").await?;
        hash_leaves(&mut leaves, hasher.as_ref());
        let tx = self.storage.begin(tree_id).await?;
        let mut guard = TreeTxGuard::new(tx);
        let queued = guard.as_mut().queue_leaves(leaves, self.clock.now_nanos()).await?;
        guard.commit().await?;
        for entry in &queued {
            match entry.status {
                LeafStatus::New => QUEUED_LEAVES_NEW.increment(1),
                LeafStatus::AlreadyExists => QUEUED_LEAVES_EXISTING.increment(1),
            }
        }
        Ok(queued)
    }

    pub async fn queue_leaf(&self, tree_id: TreeId, leaf: LogLeaf) -> LogServerResult<QueuedLeaf> {
        single_result(self.queue_leaves(tree_id, vec![leaf]).await?)
    }

    #[instrument(skip(self, leaves), err)]
    pub async fn add_sequenced_leaves(
        &self,
        tree_id: TreeId,
        mut leaves: Vec<LogLeaf>,
    ) -> LogServerResult<Vec<QueuedLeaf>> {
        validator::validate_add_sequenced_leaves(&leaves)?;
        let (_descriptor, hasher) = resolve_tree(
            &self.registry,
            tree_id,
            OperationClass::SequenceLog,
            "AddSequencedLeaves",
        )
        .await?;
        let want = leaves.len();
        hash_leaves(&mut leaves, hasher.as_ref());
        let tx = self.storage.begin(tree_id).await?;
        let mut guard = TreeTxGuard::new(tx);
        let added = guard.as_mut().add_sequenced_leaves(leaves, self.clock.now_nanos()).await?;
        guard.commit().await?;
        if added.len() != want {
            return Err(LogError::internal(format!(
                "add_sequenced_leaves returned {} results for {} input leaves",
                added.len(),
                want
            )));
        }
        Ok(added)
    }

    pub async fn add_sequenced_leaf(
        &self,
        tree_id: TreeId,
        leaf: LogLeaf,
    ) -> LogServerResult<QueuedLeaf> {
        single_result(self.add_sequenced_leaves(tree_id, vec![leaf]).await?)
    }

    #[instrument(skip(self), err)]
    pub async fn get_latest_signed_log_root(&self, tree_id: TreeId) -> LogServerResult<SignedLogRoot> {
        resolve_tree(&self.registry, tree_id, OperationClass::Query, "GetLatestSignedLogRoot")
            .await?;
        let tx = self.storage.snapshot(tree_id).await?;
        let (signed, _decoded) = self.anchor(tx.as_ref(), tree_id).await?;
        tx.close().await?;
        Ok(signed)
    }

    #[instrument(skip(self), err)]
    pub async fn get_sequenced_leaf_count(&self, tree_id: TreeId) -> LogServerResult<i64> {
        resolve_tree(&self.registry, tree_id, OperationClass::Query, "GetSequencedLeafCount")
            .await?;
        let tx = self.storage.snapshot(tree_id).await?;
        let count = tx.sequenced_leaf_count().await?;
        tx.close().await?;
        Ok(count)
    }

    #[instrument(skip(self), err)]
    pub async fn get_inclusion_proof(
        &self,
        request: InclusionProofRequest,
    ) -> LogServerResult<InclusionProofResponse> {
        validator::validate_inclusion_proof(request.leaf_index, request.tree_size)?;
        let (_descriptor, hasher) =
            resolve_tree(&self.registry, request.tree_id, OperationClass::Query, "GetInclusionProof")
                .await?;
        let tx = self.storage.snapshot(request.tree_id).await?;
        let (signed_head, head) = self.anchor(tx.as_ref(), request.tree_id).await?;
        let requested_size = request.tree_size as u64;
        if requested_size > head.tree_size {
            tx.close().await?;
            return Ok(InclusionProofResponse { signed_log_root: signed_head, proof: None });
        }
        let started = std::time::Instant::now();
        let proof = build_inclusion_proof(
            tx.as_ref(),
            hasher.as_ref(),
            requested_size,
            request.leaf_index as u64,
        )
        .await?;
        PROOF_BUILD_SECONDS.record_lossy(started.elapsed().as_secs_f64());
        tx.close().await?;
        Ok(InclusionProofResponse { signed_log_root: signed_head, proof: Some(proof) })
    }

    #[instrument(skip(self), err)]
    pub async fn get_inclusion_proof_by_hash(
        &self,
        mut request: InclusionProofByHashRequest,
    ) -> LogServerResult<InclusionProofByHashResponse> {
        validator::validate_tree_size_positive(request.tree_size)?;
        let (_descriptor, hasher) = resolve_tree(
            &self.registry,
            request.tree_id,
            OperationClass::Query,
            "GetInclusionProofByHash",
        )
        .await?;
        validator::validate_inclusion_proof_by_hash_hash_len(&request.leaf_hash, hasher.size())?;
        let tx = self.storage.snapshot(request.tree_id).await?;
        let (signed_head, head) = self.anchor(tx.as_ref(), request.tree_id).await?;
        let requested_size = request.tree_size as u64;
        if requested_size > head.tree_size {
            tx.close().await?;
            return Ok(InclusionProofByHashResponse { signed_log_root: signed_head, proofs: vec![] });
        }
        let leaf_hash = std::mem::take(&mut request.leaf_hash);
        let mut matches = tx.leaves_by_hash(std::slice::from_ref(&leaf_hash)).await?;
        if matches.is_empty() {
            tx.close().await?;
            return Err(LogError::NoLeavesForHash { leaf_hash: hex::encode(&leaf_hash) });
        }
        if request.order_by_sequence {
            matches.sort_by_key(|leaf| leaf.leaf_index);
        }
        let cap = self.config.max_inclusion_proof_by_hash_results;
        if matches.len() > cap {
            tracing::warn!(
                tree_id = request.tree_id,
                dropped = matches.len() - cap,
                "GetInclusionProofByHash match set truncated to the configured cap"
            );
            matches.truncate(cap);
        }
        let mut proofs = Vec::with_capacity(matches.len());
        for leaf in &matches {
            let leaf_index = leaf
                .leaf_index
                .ok_or_else(|| LogError::internal("sequenced leaf is missing a leaf_index"))?;
            proofs.push(
                build_inclusion_proof(tx.as_ref(), hasher.as_ref(), requested_size, leaf_index as u64)
                    .await?,
            );
        }
        tx.close().await?;
        Ok(InclusionProofByHashResponse { signed_log_root: signed_head, proofs })
    }

    #[instrument(skip(self), err)]
    pub async fn get_consistency_proof(
        &self,
        request: ConsistencyProofRequest,
    ) -> LogServerResult<ConsistencyProofResponse> {
        validator::validate_consistency_proof(request.first_tree_size, request.second_tree_size)?;
        let (_descriptor, hasher) = resolve_tree(
            &self.registry,
            request.tree_id,
            OperationClass::Query,
            "GetConsistencyProof",
        )
        .await?;
        let tx = self.storage.snapshot(request.tree_id).await?;
        let (signed_head, head) = self.anchor(tx.as_ref(), request.tree_id).await?;
        let second_size = request.second_tree_size as u64;
        if second_size > head.tree_size {
            tx.close().await?;
            return Ok(ConsistencyProofResponse { signed_log_root: signed_head, proof: None });
        }
        let started = std::time::Instant::now();
        let proof = build_consistency_proof(
            tx.as_ref(),
            hasher.as_ref(),
            request.first_tree_size as u64,
            second_size,
        )
        .await?;
        PROOF_BUILD_SECONDS.record_lossy(started.elapsed().as_secs_f64());
        tx.close().await?;
        Ok(ConsistencyProofResponse { signed_log_root: signed_head, proof: Some(proof) })
    }

    #[instrument(skip(self), err)]
    pub async fn get_leaves_by_index(
        &self,
        request: LeavesByIndexRequest,
    ) -> LogServerResult<LeavesResponse> {
        validator::validate_leaves_by_index(&request.leaf_indices)?;
        resolve_tree(&self.registry, request.tree_id, OperationClass::Query, "GetLeavesByIndex")
            .await?;
        let tx = self.storage.snapshot(request.tree_id).await?;
        let (signed_head, _head) = self.anchor(tx.as_ref(), request.tree_id).await?;
        let leaves = tx.leaves_by_index(&request.leaf_indices).await?;
        tx.close().await?;
        Ok(LeavesResponse { signed_log_root: signed_head, leaves })
    }

    #[instrument(skip(self), err)]
    pub async fn get_leaves_by_range(
        &self,
        request: LeavesByRangeRequest,
    ) -> LogServerResult<LeavesResponse> {
        validator::validate_leaves_by_range(request.start_index, request.count)?;
        resolve_tree(&self.registry, request.tree_id, OperationClass::Query, "GetLeavesByRange")
            .await?;
        let tx = self.storage.snapshot(request.tree_id).await?;
        let (signed_head, head) = self.anchor(tx.as_ref(), request.tree_id).await?;
        let start = request.start_index as u64;
        let leaves = if start >= head.tree_size {
            Vec::new()
        } else {
            let available = head.tree_size - start;
            let count = (request.count as u64).min(available) as i64;
            tx.leaves_by_range(request.start_index, count).await?
        };
        tx.close().await?;
        Ok(LeavesResponse { signed_log_root: signed_head, leaves })
    }

    #[instrument(skip(self), err)]
    pub async fn get_leaves_by_hash(
        &self,
        request: LeavesByHashRequest,
    ) -> LogServerResult<LeavesResponse> {
        resolve_tree(&self.registry, request.tree_id, OperationClass::Query, "GetLeavesByHash")
            .await?;
        let tx = self.storage.snapshot(request.tree_id).await?;
        let (signed_head, _head) = self.anchor(tx.as_ref(), request.tree_id).await?;
        let mut leaves = tx.leaves_by_hash(&request.leaf_hashes).await?;
        if request.order_by_sequence {
            leaves.sort_by_key(|leaf| leaf.leaf_index);
        }
        tx.close().await?;
        Ok(LeavesResponse { signed_log_root: signed_head, leaves })
    }

    #[instrument(skip(self), err)]
    pub async fn get_entry_and_proof(
        &self,
        request: EntryAndProofRequest,
    ) -> LogServerResult<EntryAndProofResponse> {
        validator::validate_entry_and_proof(request.leaf_index, request.tree_size)?;
        let (_descriptor, hasher) =
            resolve_tree(&self.registry, request.tree_id, OperationClass::Query, "GetEntryAndProof")
                .await?;
        let tx = self.storage.snapshot(request.tree_id).await?;
        let (signed_head, head) = self.anchor(tx.as_ref(), request.tree_id).await?;
        let leaf_index = request.leaf_index as u64;
        if leaf_index >= head.tree_size {
            tx.close().await?;
            return Ok(EntryAndProofResponse { signed_log_root: signed_head, leaf: None, proof: None });
        }
        // Silently clamp an oversized tree_size down to the head rather than reject the request:
        // the leaf itself is still within range even though the caller's view of the head is stale.
        let snapshot_size = (request.tree_size as u64).min(head.tree_size);
        let mut leaves = tx.leaves_by_index(&[request.leaf_index]).await?;
        if leaves.len() != 1 {
            tx.close().await?;
            return Err(LogError::internal("expected exactly one leaf for GetEntryAndProof"));
        }
        let leaf = leaves.pop().expect("length checked above");
        let proof = build_inclusion_proof(tx.as_ref(), hasher.as_ref(), snapshot_size, leaf_index).await?;
        tx.close().await?;
        Ok(EntryAndProofResponse {
            signed_log_root: signed_head,
            leaf: Some(leaf),
            proof: Some(proof),
        })
    }

    pub async fn is_healthy(&self) -> bool {
        self.storage.check_database_accessible().await.is_ok()
    }
}

fn single_result<T>(mut results: Vec<T>) -> LogServerResult<T> {
    if results.len() != 1 {
        return Err(LogError::internal(format!(
            "expected exactly one result, got {}",
            results.len()
        )));
    }
    Ok(results.pop().expect("length checked above"))
}

#[async_trait]
impl<S: LogStorage, R: TreeRegistry> apollo_infra::component_definitions::ComponentStarter
    for LogServer<S, R>
{
    async fn start(&mut self) {
        apollo_infra::component_definitions::default_component_start_fn::<Self>().await;
        crate::metrics::register_metrics();
    }
}

#[cfg(test)]
#[path = "facade_test.rs"]
mod facade_test;
