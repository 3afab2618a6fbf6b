//! The signer that stamps a freshly built [`LogRootV1`] into a [`SignedLogRoot`] on init. Treated
//! as an external collaborator: this crate models the capability the facade needs, not a key
//! management system.

use async_trait::async_trait;
use log_rpc_types::LogServerResult;
use log_types::{LogError, LogRootV1, SignedLogRoot, TreeId};
#[cfg(any(feature = "testing", test))]
use mockall::automock;

#[cfg_attr(any(feature = "testing", test), automock)]
#[async_trait]
pub trait LogSigner: Send + Sync {
    /// Signs `log_root`'s binary encoding, returning the complete [`SignedLogRoot`]. Fails with
    /// `SignerUnavailable` rather than panicking when no key is reachable.
    async fn sign(&self, tree_id: TreeId, log_root: &LogRootV1) -> LogServerResult<SignedLogRoot>;
}

/// A signer that never fails and produces an empty signature. Suitable for the demo/test wiring
/// in this crate, which has no real key material to sign with.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSigner;

#[async_trait]
impl LogSigner for NoopSigner {
    async fn sign(&self, _tree_id: TreeId, log_root: &LogRootV1) -> LogServerResult<SignedLogRoot> {
        Ok(SignedLogRoot { log_root: log_root.marshal_binary(), log_root_signature: Vec::new() })
    }
}

/// A signer that always reports itself unavailable, for exercising the `SignerUnavailable` error
/// path without a real key-management failure.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableSigner;

#[async_trait]
impl LogSigner for UnavailableSigner {
    async fn sign(&self, tree_id: TreeId, _log_root: &LogRootV1) -> LogServerResult<SignedLogRoot> {
        Err(LogError::SignerUnavailable { tree_id, reason: "no signing key configured".to_string() })
    }
}
