//! Proof node-address calculation and ephemeral-node rehashing. Node addresses are calculated
//! independently of any storage backend (`MerkleNodeSource` is the only capability required), so
//! the algorithm is unit-testable against the RFC 6962 example trees without a `LogStorage`
//! implementation.
//!
//! The sibling-walk used for inclusion proofs and the `SUBPROOF` recursion used for consistency
//! proofs are the textbook RFC 6962 §2.1 algorithms.

use log_types::LogHasher;

/// A complete, power-of-two aligned Merkle subtree spanning leaves
/// `[index << level, (index + 1) << level)`. `level == 0` addresses a single leaf.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct NodeAddress {
    pub level: u64,
    pub index: u64,
}

impl NodeAddress {
    pub fn new(level: u64, index: u64) -> Self {
        Self { level, index }
    }

    /// The `[start, end)` leaf range this address nominally covers, ignoring any snapshot-size
    /// clipping (see [`Self::clipped_range`]).
    pub fn leaf_range(&self) -> (u64, u64) {
        (self.index << self.level, (self.index + 1) << self.level)
    }

    /// The leaf range this address covers once clipped to a tree of `snapshot_size` leaves. A
    /// node is "complete" (materialized by storage) when this equals [`Self::leaf_range`]; when
    /// it's smaller, the node is ephemeral and must be rehashed from its children.
    fn clipped_range(&self, snapshot_size: u64) -> (u64, u64) {
        let (start, end) = self.leaf_range();
        (start, end.min(snapshot_size))
    }

    fn is_complete(&self, snapshot_size: u64) -> bool {
        self.leaf_range().1 <= snapshot_size
    }
}

/// A single step of a consistency proof: either a complete, storage-addressable node, or a
/// non-power-of-two leaf range that storage never materializes directly and which must always
/// be rehashed from its children.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ProofNode {
    Address(NodeAddress),
    Range { start: u64, end: u64 },
}

/// Read access to persisted Merkle nodes and leaf hashes at a fixed storage revision. Kept
/// narrow (no snapshot/transaction concepts) so the rehash algorithm below can be unit tested
/// with a plain in-memory map.
#[async_trait::async_trait]
pub trait MerkleNodeSource: Send + Sync {
    async fn get_node(&self, level: u64, index: u64) -> Option<Vec<u8>>;
    async fn get_leaf_hash(&self, leaf_index: u64) -> Option<Vec<u8>>;
}

/// `CalcInclusionProofNodeAddresses`: the ordered list of sibling addresses from leaf to root of
/// the `snapshot_size`-leaf tree. Returns an error for `leaf_index >= snapshot_size` or
/// `snapshot_size == 0`; these are expected to already have been rejected by the request
/// validator, so callers inside the proof builder may `expect` success.
pub fn calc_inclusion_proof_node_addresses(
    snapshot_size: u64,
    leaf_index: u64,
) -> Result<Vec<NodeAddress>, String> {
    if snapshot_size == 0 {
        return Err("snapshot_size must be > 0".to_string());
    }
    if leaf_index >= snapshot_size {
        return Err(format!("leaf_index {leaf_index} out of range for snapshot_size {snapshot_size}"));
    }

    let mut addresses = Vec::new();
    let mut node = leaf_index;
    let mut last_node = snapshot_size - 1;
    let mut level = 0u64;
    while last_node > 0 {
        let sibling = node ^ 1;
        if sibling <= last_node {
            addresses.push(NodeAddress::new(level, sibling));
        }
        node >>= 1;
        last_node >>= 1;
        level += 1;
    }
    Ok(addresses)
}

/// `CalcConsistencyProofNodeAddresses`: the RFC 6962 §2.1.2 `SUBPROOF` decomposition, expressed
/// as a flat, ordered list of proof steps. `first_size == 0` or `first_size == second_size`
/// yields an empty proof (callers should special-case this before calling, but this function
/// also handles it defensively).
pub fn calc_consistency_proof_node_addresses(
    first_size: u64,
    second_size: u64,
) -> Result<Vec<ProofNode>, String> {
    if first_size > second_size {
        return Err(format!("first_size {first_size} exceeds second_size {second_size}"));
    }
    if first_size == 0 || first_size == second_size {
        return Ok(Vec::new());
    }
    let mut out = Vec::new();
    subproof(0, first_size, second_size, true, &mut out);
    Ok(out)
}

fn subproof(start: u64, m: u64, n: u64, consistent: bool, out: &mut Vec<ProofNode>) {
    if m == n {
        if !consistent {
            out.push(range_node(start, n));
        }
        return;
    }
    let k = largest_pow2_lt(n);
    if m <= k {
        subproof(start, m, k, consistent, out);
        out.push(range_node(start + k, n - k));
    } else {
        subproof(start + k, m - k, n - k, false, out);
        out.push(range_node(start, k));
    }
}

fn range_node(start: u64, size: u64) -> ProofNode {
    if let Some(level) = size.trailing_zeros().checked_sub(0).filter(|_| size.is_power_of_two()) {
        if size.is_power_of_two() && start % size == 0 {
            return ProofNode::Address(NodeAddress::new(u64::from(level), start / size));
        }
    }
    ProofNode::Range { start, end: start + size }
}

fn largest_pow2_lt(n: u64) -> u64 {
    debug_assert!(n > 1, "largest_pow2_lt is only called for n > 1");
    let mut k = 1u64;
    while k * 2 < n {
        k *= 2;
    }
    k
}

/// Resolves a single proof node (complete or ephemeral) to its hash, recursively rehashing from
/// children when storage has nothing materialized for it. `snapshot_size` bounds which leaves
/// exist; every recursive call stays at the same storage revision as the caller.
pub async fn resolve_proof_node(
    source: &dyn MerkleNodeSource,
    hasher: &dyn LogHasher,
    node: ProofNode,
    snapshot_size: u64,
) -> Result<Vec<u8>, String> {
    match node {
        ProofNode::Address(addr) => resolve_address(source, hasher, addr, snapshot_size).await,
        ProofNode::Range { start, end } => {
            resolve_range(source, hasher, start, end.min(snapshot_size)).await
        }
    }
}

fn resolve_address<'a>(
    source: &'a dyn MerkleNodeSource,
    hasher: &'a dyn LogHasher,
    addr: NodeAddress,
    snapshot_size: u64,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Vec<u8>, String>> + Send + 'a>> {
    Box::pin(async move {
        if addr.level == 0 {
            return source
                .get_leaf_hash(addr.index)
                .await
                .ok_or_else(|| format!("missing leaf hash at index {}", addr.index));
        }
        if addr.is_complete(snapshot_size) {
            if let Some(hash) = source.get_node(addr.level, addr.index).await {
                return Ok(hash);
            }
        }
        let (start, end) = addr.clipped_range(snapshot_size);
        resolve_range(source, hasher, start, end).await
    })
}

fn resolve_range<'a>(
    source: &'a dyn MerkleNodeSource,
    hasher: &'a dyn LogHasher,
    start: u64,
    end: u64,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Vec<u8>, String>> + Send + 'a>> {
    Box::pin(async move {
        let size = end - start;
        if size == 0 {
            return Err(format!("empty range [{start}, {end})"));
        }
        if size == 1 {
            return source
                .get_leaf_hash(start)
                .await
                .ok_or_else(|| format!("missing leaf hash at index {start}"));
        }
        if size.is_power_of_two() && start % size == 0 {
            let level = size.trailing_zeros() as u64;
            if let Some(hash) = source.get_node(level, start / size).await {
                return Ok(hash);
            }
        }
        let k = largest_pow2_lt(size);
        let left = resolve_range(source, hasher, start, start + k).await?;
        let right = resolve_range(source, hasher, start + k, end).await?;
        Ok(hasher.hash_children(&left, &right))
    })
}
