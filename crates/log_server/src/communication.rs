use apollo_infra::component_definitions::ComponentRequestHandler;
use apollo_infra::component_server::{ConcurrentLocalComponentServer, RemoteComponentServer};
use async_trait::async_trait;
use log_rpc_types::{LogServerRequest, LogServerResponse};
use log_storage::LogStorage;

use crate::facade::LogServer;
use crate::tree_resolver::TreeRegistry;

pub type LocalLogServerServer<S, R> =
    ConcurrentLocalComponentServer<LogServer<S, R>, LogServerRequest, LogServerResponse>;
pub type RemoteLogServerServer = RemoteComponentServer<LogServerRequest, LogServerResponse>;

#[async_trait]
impl<S: LogStorage, R: TreeRegistry> ComponentRequestHandler<LogServerRequest, LogServerResponse>
    for LogServer<S, R>
{
    async fn handle_request(&mut self, request: LogServerRequest) -> LogServerResponse {
        match request {
            LogServerRequest::InitLog(tree_id) => {
                LogServerResponse::InitLog(self.init_log(tree_id).await)
            }
            LogServerRequest::QueueLeaf(tree_id, leaf) => {
                LogServerResponse::QueueLeaf(self.queue_leaf(tree_id, leaf).await)
            }
            LogServerRequest::QueueLeaves(tree_id, leaves) => {
                LogServerResponse::QueueLeaves(self.queue_leaves(tree_id, leaves).await)
            }
            LogServerRequest::AddSequencedLeaf(tree_id, leaf) => {
                LogServerResponse::AddSequencedLeaf(self.add_sequenced_leaf(tree_id, leaf).await)
            }
            LogServerRequest::AddSequencedLeaves(tree_id, leaves) => {
                LogServerResponse::AddSequencedLeaves(
                    self.add_sequenced_leaves(tree_id, leaves).await,
                )
            }
            LogServerRequest::GetLatestSignedLogRoot(tree_id) => {
                LogServerResponse::GetLatestSignedLogRoot(
                    self.get_latest_signed_log_root(tree_id).await,
                )
            }
            LogServerRequest::GetSequencedLeafCount(tree_id) => {
                LogServerResponse::GetSequencedLeafCount(
                    self.get_sequenced_leaf_count(tree_id).await,
                )
            }
            LogServerRequest::GetInclusionProof(request) => {
                LogServerResponse::GetInclusionProof(self.get_inclusion_proof(request).await)
            }
            LogServerRequest::GetInclusionProofByHash(request) => {
                LogServerResponse::GetInclusionProofByHash(
                    self.get_inclusion_proof_by_hash(request).await,
                )
            }
            LogServerRequest::GetConsistencyProof(request) => {
                LogServerResponse::GetConsistencyProof(self.get_consistency_proof(request).await)
            }
            LogServerRequest::GetLeavesByIndex(request) => {
                LogServerResponse::GetLeavesByIndex(self.get_leaves_by_index(request).await)
            }
            LogServerRequest::GetLeavesByRange(request) => {
                LogServerResponse::GetLeavesByRange(self.get_leaves_by_range(request).await)
            }
            LogServerRequest::GetLeavesByHash(request) => {
                LogServerResponse::GetLeavesByHash(self.get_leaves_by_hash(request).await)
            }
            LogServerRequest::GetEntryAndProof(request) => {
                LogServerResponse::GetEntryAndProof(self.get_entry_and_proof(request).await)
            }
        }
    }
}
