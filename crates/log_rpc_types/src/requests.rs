use apollo_infra::impl_debug_for_infra_requests_and_responses;
use log_types::{LogLeaf, Proof, QueuedLeaf, SignedLogRoot, TreeId};
use serde::{Deserialize, Serialize};

use crate::LogServerResult;

/// `GetInclusionProof` request payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InclusionProofRequest {
    pub tree_id: TreeId,
    pub leaf_index: i64,
    pub tree_size: i64,
}

/// `GetInclusionProof` response: the head is always returned; `proof` is `None` when
/// `tree_size` was above the head and the server only had the head to report.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InclusionProofResponse {
    pub signed_log_root: SignedLogRoot,
    pub proof: Option<Proof>,
}

/// `GetInclusionProofByHash` request payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InclusionProofByHashRequest {
    pub tree_id: TreeId,
    pub leaf_hash: Vec<u8>,
    pub tree_size: i64,
    pub order_by_sequence: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InclusionProofByHashResponse {
    pub signed_log_root: SignedLogRoot,
    pub proofs: Vec<Proof>,
}

/// `GetConsistencyProof` request payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsistencyProofRequest {
    pub tree_id: TreeId,
    pub first_tree_size: i64,
    pub second_tree_size: i64,
}

/// `proof` is `None` when `second_tree_size` was above the head and only the head could be
/// reported; `Some(Proof::empty())` is a legitimate (non-`None`) answer for a trivial proof.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsistencyProofResponse {
    pub signed_log_root: SignedLogRoot,
    pub proof: Option<Proof>,
}

/// `GetLeavesByIndex` request payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeavesByIndexRequest {
    pub tree_id: TreeId,
    pub leaf_indices: Vec<i64>,
}

/// `GetLeavesByRange` request payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeavesByRangeRequest {
    pub tree_id: TreeId,
    pub start_index: i64,
    pub count: i64,
}

/// `GetLeavesByHash` request payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeavesByHashRequest {
    pub tree_id: TreeId,
    pub leaf_hashes: Vec<Vec<u8>>,
    pub order_by_sequence: bool,
}

/// Shared response shape for `GetLeavesByIndex`/`GetLeavesByRange`/`GetLeavesByHash`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeavesResponse {
    pub signed_log_root: SignedLogRoot,
    pub leaves: Vec<LogLeaf>,
}

/// `GetEntryAndProof` request payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryAndProofRequest {
    pub tree_id: TreeId,
    pub leaf_index: i64,
    pub tree_size: i64,
}

/// `leaf`/`proof` are `None` when `leaf_index` fell at or beyond the head (the head-bounded-read
/// rule applies here too, even though `tree_size` itself is silently clamped down to the head
/// rather than rejected).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryAndProofResponse {
    pub signed_log_root: SignedLogRoot,
    pub leaf: Option<LogLeaf>,
    pub proof: Option<Proof>,
}

#[derive(Clone, Serialize, Deserialize, strum_macros::AsRefStr)]
pub enum LogServerRequest {
    InitLog(TreeId),
    QueueLeaf(TreeId, LogLeaf),
    QueueLeaves(TreeId, Vec<LogLeaf>),
    AddSequencedLeaf(TreeId, LogLeaf),
    AddSequencedLeaves(TreeId, Vec<LogLeaf>),
    GetLatestSignedLogRoot(TreeId),
    GetSequencedLeafCount(TreeId),
    GetInclusionProof(InclusionProofRequest),
    GetInclusionProofByHash(InclusionProofByHashRequest),
    GetConsistencyProof(ConsistencyProofRequest),
    GetLeavesByIndex(LeavesByIndexRequest),
    GetLeavesByRange(LeavesByRangeRequest),
    GetLeavesByHash(LeavesByHashRequest),
    GetEntryAndProof(EntryAndProofRequest),
}
impl_debug_for_infra_requests_and_responses!(LogServerRequest);

#[derive(Clone, Serialize, Deserialize, strum_macros::AsRefStr)]
pub enum LogServerResponse {
    InitLog(LogServerResult<SignedLogRoot>),
    QueueLeaf(LogServerResult<QueuedLeaf>),
    QueueLeaves(LogServerResult<Vec<QueuedLeaf>>),
    AddSequencedLeaf(LogServerResult<QueuedLeaf>),
    AddSequencedLeaves(LogServerResult<Vec<QueuedLeaf>>),
    GetLatestSignedLogRoot(LogServerResult<SignedLogRoot>),
    GetSequencedLeafCount(LogServerResult<i64>),
    GetInclusionProof(LogServerResult<InclusionProofResponse>),
    GetInclusionProofByHash(LogServerResult<InclusionProofByHashResponse>),
    GetConsistencyProof(LogServerResult<ConsistencyProofResponse>),
    GetLeavesByIndex(LogServerResult<LeavesResponse>),
    GetLeavesByRange(LogServerResult<LeavesResponse>),
    GetLeavesByHash(LogServerResult<LeavesResponse>),
    GetEntryAndProof(LogServerResult<EntryAndProofResponse>),
}
impl_debug_for_infra_requests_and_responses!(LogServerResponse);
