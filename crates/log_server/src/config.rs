use std::collections::BTreeMap;

use apollo_config::dumping::{append_sub_config_name, ser_param, SerializeConfig};
use apollo_config::{ParamPath, ParamPrivacyInput, SerializedParam};
use apollo_infra::component_definitions::LocalServerConfig;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Default cap on how many matches `GetInclusionProofByHash` will build proofs for and return in
/// a single response, applied after any `order_by_sequence` sort.
const DEFAULT_MAX_INCLUSION_PROOF_BY_HASH_RESULTS: usize = 1000;

#[derive(Clone, Debug, Serialize, Deserialize, Validate, PartialEq, Eq)]
pub struct LogServerConfig {
    /// Truncates, rather than rejects, an oversized `GetInclusionProofByHash` match set.
    pub max_inclusion_proof_by_hash_results: usize,
}

impl Default for LogServerConfig {
    fn default() -> Self {
        Self {
            max_inclusion_proof_by_hash_results: DEFAULT_MAX_INCLUSION_PROOF_BY_HASH_RESULTS,
        }
    }
}

impl SerializeConfig for LogServerConfig {
    fn dump(&self) -> BTreeMap<ParamPath, SerializedParam> {
        BTreeMap::from([ser_param(
            "max_inclusion_proof_by_hash_results",
            &self.max_inclusion_proof_by_hash_results,
            "Maximum number of proofs GetInclusionProofByHash builds and returns per request.",
            ParamPrivacyInput::Public,
        )])
    }
}

/// Component-wiring config: how the facade is exposed locally and, for a remote deployment, how
/// a client reaches it.
#[derive(Clone, Debug, Default, Serialize, Deserialize, Validate, PartialEq, Eq)]
pub struct LogServerComponentConfig {
    pub log_server_config: LogServerConfig,
    pub local_server_config: LocalServerConfig,
}

impl SerializeConfig for LogServerComponentConfig {
    fn dump(&self) -> BTreeMap<ParamPath, SerializedParam> {
        let mut dump = BTreeMap::new();
        dump.append(&mut append_sub_config_name(
            self.log_server_config.dump(),
            "log_server_config",
        ));
        dump.append(&mut append_sub_config_name(
            self.local_server_config.dump(),
            "local_server_config",
        ));
        dump
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = LogServerComponentConfig::default();
        assert!(!config.dump().is_empty());
    }
}
