pub mod requests;

use std::sync::Arc;

use apollo_infra::component_client::{ClientError, LocalComponentClient, RemoteComponentClient};
use apollo_infra::component_definitions::{ComponentClient, ComponentRequestAndResponseSender};
use apollo_infra::handle_all_response_variants;
use async_trait::async_trait;
pub use log_types::{LogError, LogResult};
use log_types::{LogLeaf, Proof, QueuedLeaf, SignedLogRoot, TreeId};
#[cfg(feature = "testing")]
use mockall::automock;
pub use requests::{
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
    LogServerRequest,
    LogServerResponse,
};
use thiserror::Error;

/// A component-internal result: the error kinds a handler can produce, as named in
/// `log_types::LogError`. No transport concerns leak in here.
pub type LogServerError = LogError;
pub type LogServerResult<T> = LogResult<T>;

pub type LocalLogServerClient = LocalComponentClient<LogServerRequest, LogServerResponse>;
pub type RemoteLogServerClient = RemoteComponentClient<LogServerRequest, LogServerResponse>;
pub type SharedLogServerClient = Arc<dyn LogServerClient>;
pub type LogServerRequestAndResponseSender =
    ComponentRequestAndResponseSender<LogServerRequest, LogServerResponse>;

/// Client-facing error: either the façade rejected the request (`LogServerError`) or the
/// request never made it there (`ClientError`, a transport failure).
#[derive(Clone, Debug, Error)]
pub enum LogServerClientError {
    #[error(transparent)]
    ClientError(#[from] ClientError),
    #[error(transparent)]
    LogServerError(#[from] LogServerError),
}

pub type LogServerClientResult<T> = Result<T, LogServerClientError>;

/// The log RPC frontend's shared interface: one method per operation in the RPC surface.
/// `Send + Sync` so it can be shared across tasks behind an `Arc`.
#[cfg_attr(feature = "testing", automock)]
#[async_trait]
pub trait LogServerClient: Send + Sync {
    async fn init_log(&self, tree_id: TreeId) -> LogServerClientResult<SignedLogRoot>;

    async fn queue_leaf(&self, tree_id: TreeId, leaf: LogLeaf) -> LogServerClientResult<QueuedLeaf>;

    async fn queue_leaves(
        &self,
        tree_id: TreeId,
        leaves: Vec<LogLeaf>,
    ) -> LogServerClientResult<Vec<QueuedLeaf>>;

    async fn add_sequenced_leaf(
        &self,
        tree_id: TreeId,
        leaf: LogLeaf,
    ) -> LogServerClientResult<QueuedLeaf>;

    async fn add_sequenced_leaves(
        &self,
        tree_id: TreeId,
        leaves: Vec<LogLeaf>,
    ) -> LogServerClientResult<Vec<QueuedLeaf>>;

    async fn get_latest_signed_log_root(
        &self,
        tree_id: TreeId,
    ) -> LogServerClientResult<SignedLogRoot>;

    async fn get_sequenced_leaf_count(&self, tree_id: TreeId) -> LogServerClientResult<i64>;

    async fn get_inclusion_proof(
        &self,
        request: InclusionProofRequest,
    ) -> LogServerClientResult<InclusionProofResponse>;

    async fn get_inclusion_proof_by_hash(
        &self,
        request: InclusionProofByHashRequest,
    ) -> LogServerClientResult<InclusionProofByHashResponse>;

    async fn get_consistency_proof(
        &self,
        request: ConsistencyProofRequest,
    ) -> LogServerClientResult<ConsistencyProofResponse>;

    async fn get_leaves_by_index(
        &self,
        request: LeavesByIndexRequest,
    ) -> LogServerClientResult<LeavesResponse>;

    async fn get_leaves_by_range(
        &self,
        request: LeavesByRangeRequest,
    ) -> LogServerClientResult<LeavesResponse>;

    async fn get_leaves_by_hash(
        &self,
        request: LeavesByHashRequest,
    ) -> LogServerClientResult<LeavesResponse>;

    async fn get_entry_and_proof(
        &self,
        request: EntryAndProofRequest,
    ) -> LogServerClientResult<EntryAndProofResponse>;
}

#[async_trait]
impl<ComponentClientType> LogServerClient for ComponentClientType
where
    ComponentClientType: Send + Sync + ComponentClient<LogServerRequest, LogServerResponse>,
{
    async fn init_log(&self, tree_id: TreeId) -> LogServerClientResult<SignedLogRoot> {
        let request = LogServerRequest::InitLog(tree_id);
        handle_all_response_variants!(
            self,
            request,
            LogServerResponse,
            InitLog,
            LogServerClientError,
            LogServerError,
            Direct
        )
    }

    async fn queue_leaf(&self, tree_id: TreeId, leaf: LogLeaf) -> LogServerClientResult<QueuedLeaf> {
        let request = LogServerRequest::QueueLeaf(tree_id, leaf);
        handle_all_response_variants!(
            self,
            request,
            LogServerResponse,
            QueueLeaf,
            LogServerClientError,
            LogServerError,
            Direct
        )
    }

    async fn queue_leaves(
        &self,
        tree_id: TreeId,
        leaves: Vec<LogLeaf>,
    ) -> LogServerClientResult<Vec<QueuedLeaf>> {
        let request = LogServerRequest::QueueLeaves(tree_id, leaves);
        handle_all_response_variants!(
            self,
            request,
            LogServerResponse,
            QueueLeaves,
            LogServerClientError,
            LogServerError,
            Direct
        )
    }

    async fn add_sequenced_leaf(
        &self,
        tree_id: TreeId,
        leaf: LogLeaf,
    ) -> LogServerClientResult<QueuedLeaf> {
        let request = LogServerRequest::AddSequencedLeaf(tree_id, leaf);
        handle_all_response_variants!(
            self,
            request,
            LogServerResponse,
            AddSequencedLeaf,
            LogServerClientError,
            LogServerError,
            Direct
        )
    }

    async fn add_sequenced_leaves(
        &self,
        tree_id: TreeId,
        leaves: Vec<LogLeaf>,
    ) -> LogServerClientResult<Vec<QueuedLeaf>> {
        let request = LogServerRequest::AddSequencedLeaves(tree_id, leaves);
        handle_all_response_variants!(
            self,
            request,
            LogServerResponse,
            AddSequencedLeaves,
            LogServerClientError,
            LogServerError,
            Direct
        )
    }

    async fn get_latest_signed_log_root(
        &self,
        tree_id: TreeId,
    ) -> LogServerClientResult<SignedLogRoot> {
        let request = LogServerRequest::GetLatestSignedLogRoot(tree_id);
        handle_all_response_variants!(
            self,
            request,
            LogServerResponse,
            GetLatestSignedLogRoot,
            LogServerClientError,
            LogServerError,
            Direct
        )
    }

    async fn get_sequenced_leaf_count(&self, tree_id: TreeId) -> LogServerClientResult<i64> {
        let request = LogServerRequest::GetSequencedLeafCount(tree_id);
        handle_all_response_variants!(
            self,
            request,
            LogServerResponse,
            GetSequencedLeafCount,
            LogServerClientError,
            LogServerError,
            Direct
        )
    }

    async fn get_inclusion_proof(
        &self,
        request: InclusionProofRequest,
    ) -> LogServerClientResult<InclusionProofResponse> {
        let request = LogServerRequest::GetInclusionProof(request);
        handle_all_response_variants!(
            self,
            request,
            LogServerResponse,
            GetInclusionProof,
            LogServerClientError,
            LogServerError,
            Direct
        )
    }

    async fn get_inclusion_proof_by_hash(
        &self,
        request: InclusionProofByHashRequest,
    ) -> LogServerClientResult<InclusionProofByHashResponse> {
        let request = LogServerRequest::GetInclusionProofByHash(request);
        handle_all_response_variants!(
            self,
            request,
            LogServerResponse,
            GetInclusionProofByHash,
            LogServerClientError,
            LogServerError,
            Direct
        )
    }

    async fn get_consistency_proof(
        &self,
        request: ConsistencyProofRequest,
    ) -> LogServerClientResult<ConsistencyProofResponse> {
        let request = LogServerRequest::GetConsistencyProof(request);
        handle_all_response_variants!(
            self,
            request,
            LogServerResponse,
            GetConsistencyProof,
            LogServerClientError,
            LogServerError,
            Direct
        )
    }

    async fn get_leaves_by_index(
        &self,
        request: LeavesByIndexRequest,
    ) -> LogServerClientResult<LeavesResponse> {
        let request = LogServerRequest::GetLeavesByIndex(request);
        handle_all_response_variants!(
            self,
            request,
            LogServerResponse,
            GetLeavesByIndex,
            LogServerClientError,
            LogServerError,
            Direct
        )
    }

    async fn get_leaves_by_range(
        &self,
        request: LeavesByRangeRequest,
    ) -> LogServerClientResult<LeavesResponse> {
        let request = LogServerRequest::GetLeavesByRange(request);
        handle_all_response_variants!(
            self,
            request,
            LogServerResponse,
            GetLeavesByRange,
            LogServerClientError,
            LogServerError,
            Direct
        )
    }

    async fn get_leaves_by_hash(
        &self,
        request: LeavesByHashRequest,
    ) -> LogServerClientResult<LeavesResponse> {
        let request = LogServerRequest::GetLeavesByHash(request);
        handle_all_response_variants!(
            self,
            request,
            LogServerResponse,
            GetLeavesByHash,
            LogServerClientError,
            LogServerError,
            Direct
        )
    }

    async fn get_entry_and_proof(
        &self,
        request: EntryAndProofRequest,
    ) -> LogServerClientResult<EntryAndProofResponse> {
        let request = LogServerRequest::GetEntryAndProof(request);
        handle_all_response_variants!(
            self,
            request,
            LogServerResponse,
            GetEntryAndProof,
            LogServerClientError,
            LogServerError,
            Direct
        )
    }
}
