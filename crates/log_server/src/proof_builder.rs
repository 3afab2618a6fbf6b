//! Orchestrates [`log_storage::merkle`]'s node-address calculation and ephemeral-node rehashing
//! into full [`Proof`]s, pinned to a single [`ReadOnlyLogTreeTx`]'s revision.

use log_rpc_types::LogServerResult;
use log_storage::merkle::{
    calc_consistency_proof_node_addresses,
    calc_inclusion_proof_node_addresses,
    resolve_proof_node,
    ProofNode,
};
use log_storage::{ReadOnlyLogTreeTx, TxNodeSource};
use log_types::{LogError, LogHasher, Proof};

pub async fn build_inclusion_proof(
    tx: &dyn ReadOnlyLogTreeTx,
    hasher: &dyn LogHasher,
    snapshot_size: u64,
    leaf_index: u64,
) -> LogServerResult<Proof> {
    let addresses = calc_inclusion_proof_node_addresses(snapshot_size, leaf_index)
        .map_err(LogError::internal)?;
    let source = TxNodeSource::new(tx);
    let mut hashes = Vec::with_capacity(addresses.len());
    for addr in addresses {
        let hash = resolve_proof_node(&source, hasher, ProofNode::Address(addr), snapshot_size)
            .await
            .map_err(LogError::internal)?;
        hashes.push(hash);
    }
    Ok(Proof::new(
        i64::try_from(leaf_index).map_err(|_| LogError::internal("leaf_index overflowed i64"))?,
        hashes,
    ))
}

pub async fn build_consistency_proof(
    tx: &dyn ReadOnlyLogTreeTx,
    hasher: &dyn LogHasher,
    first_size: u64,
    second_size: u64,
) -> LogServerResult<Proof> {
    let nodes =
        calc_consistency_proof_node_addresses(first_size, second_size).map_err(LogError::internal)?;
    let source = TxNodeSource::new(tx);
    let mut hashes = Vec::with_capacity(nodes.len());
    for node in nodes {
        let hash =
            resolve_proof_node(&source, hasher, node, second_size).await.map_err(LogError::internal)?;
        hashes.push(hash);
    }
    Ok(Proof::new(0, hashes))
}
