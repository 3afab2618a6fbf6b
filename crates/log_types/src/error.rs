use thiserror::Error;

/// Wire-level error kinds, matching the taxonomy that the frontend maps every failure onto
/// before it reaches a client.
#[derive(Clone, Debug, Error, Eq, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum LogError {
    #[error("invalid argument: {field}: {reason}")]
    InvalidArgument { field: String, reason: String },

    #[error("tree {tree_id} not found")]
    TreeNotFound { tree_id: i64 },

    #[error("no leaves found for hash {leaf_hash}")]
    NoLeavesForHash { leaf_hash: String },

    #[error("log {tree_id} is already initialized")]
    AlreadyInitialized { tree_id: i64 },

    #[error("tree {tree_id} has no signed root yet")]
    TreeNotInitialized { tree_id: i64 },

    #[error("tree {tree_id} has type {actual:?}, which does not support {operation}")]
    TreeTypeMismatch { tree_id: i64, actual: crate::tree::TreeType, operation: &'static str },

    #[error("signer unavailable for tree {tree_id}: {reason}")]
    SignerUnavailable { tree_id: i64, reason: String },

    #[error("storage transaction aborted: {reason}")]
    Aborted { reason: String },

    #[error("internal error: {0}")]
    Internal(String),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

pub type LogResult<T> = Result<T, LogError>;

impl LogError {
    pub fn invalid_argument(field: impl Into<String>, reason: impl Into<String>) -> Self {
        LogError::InvalidArgument { field: field.into(), reason: reason.into() }
    }

    pub fn internal(reason: impl std::fmt::Display) -> Self {
        LogError::Internal(reason.to_string())
    }
}
