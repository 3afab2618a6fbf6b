//! Syntactic request validation: every check here runs against the request's own fields only, no
//! storage or registry lookups. Each `validate_*` call happens before a transaction opens so a
//! malformed request never costs a round trip.

use log_rpc_types::LogServerResult;
use log_types::{LogError, LogLeaf};

pub fn validate_queue_leaves(leaves: &[LogLeaf]) -> LogServerResult<()> {
    if leaves.is_empty() {
        return Err(LogError::invalid_argument("leaves", "must not be empty"));
    }
    for (i, leaf) in leaves.iter().enumerate() {
        if leaf.leaf_value.is_empty() {
            return Err(LogError::invalid_argument(
                "leaves",
                format!("leaf {i} has an empty leaf_value"),
            ));
        }
    }
    Ok(())
}

pub fn validate_add_sequenced_leaves(leaves: &[LogLeaf]) -> LogServerResult<()> {
    if leaves.is_empty() {
        return Err(LogError::invalid_argument("leaves", "must not be empty"));
    }
    for (i, leaf) in leaves.iter().enumerate() {
        if leaf.leaf_value.is_empty() {
            return Err(LogError::invalid_argument(
                "leaves",
                format!("leaf {i} has an empty leaf_value"),
            ));
        }
        match leaf.leaf_index {
            Some(index) if index >= 0 => {}
            _ => {
                return Err(LogError::invalid_argument(
                    "leaves",
                    format!("leaf {i} needs a non-negative leaf_index"),
                ));
            }
        }
    }
    Ok(())
}

pub fn validate_tree_size_positive(tree_size: i64) -> LogServerResult<()> {
    if tree_size <= 0 {
        return Err(LogError::invalid_argument("tree_size", "must be positive"));
    }
    Ok(())
}

pub fn validate_inclusion_proof(leaf_index: i64, tree_size: i64) -> LogServerResult<()> {
    validate_tree_size_positive(tree_size)?;
    if leaf_index < 0 || leaf_index >= tree_size {
        return Err(LogError::invalid_argument(
            "leaf_index",
            format!("must be in [0, {tree_size})"),
        ));
    }
    Ok(())
}

pub fn validate_inclusion_proof_by_hash_hash_len(
    leaf_hash: &[u8],
    expected_len: usize,
) -> LogServerResult<()> {
    if leaf_hash.len() != expected_len {
        return Err(LogError::invalid_argument(
            "leaf_hash",
            format!("must be {expected_len} bytes, got {}", leaf_hash.len()),
        ));
    }
    Ok(())
}

pub fn validate_consistency_proof(first_tree_size: i64, second_tree_size: i64) -> LogServerResult<()> {
    if first_tree_size < 0 {
        return Err(LogError::invalid_argument("first_tree_size", "must be non-negative"));
    }
    if second_tree_size < first_tree_size {
        return Err(LogError::invalid_argument(
            "second_tree_size",
            "must be greater than or equal to first_tree_size",
        ));
    }
    Ok(())
}

pub fn validate_leaves_by_index(leaf_indices: &[i64]) -> LogServerResult<()> {
    if leaf_indices.is_empty() {
        return Err(LogError::invalid_argument("leaf_indices", "must not be empty"));
    }
    if leaf_indices.iter().any(|&idx| idx < 0) {
        return Err(LogError::invalid_argument("leaf_indices", "must all be non-negative"));
    }
    Ok(())
}

pub fn validate_leaves_by_range(start_index: i64, count: i64) -> LogServerResult<()> {
    if start_index < 0 {
        return Err(LogError::invalid_argument("start_index", "must be non-negative"));
    }
    if count <= 0 {
        return Err(LogError::invalid_argument("count", "must be positive"));
    }
    Ok(())
}

pub fn validate_entry_and_proof(leaf_index: i64, tree_size: i64) -> LogServerResult<()> {
    validate_inclusion_proof(leaf_index, tree_size)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use log_types::LogError;

    use super::*;

    #[test]
    fn queue_leaves_rejects_empty_batch() {
        assert_matches!(validate_queue_leaves(&[]), Err(LogError::InvalidArgument { .. }));
    }

    #[test]
    fn queue_leaves_rejects_nil_value() {
        let leaves = vec![LogLeaf::new(Vec::new(), Vec::new())];
        assert_matches!(validate_queue_leaves(&leaves), Err(LogError::InvalidArgument { .. }));
    }

    #[test]
    fn add_sequenced_leaves_requires_non_negative_index() {
        let leaves = vec![LogLeaf::new(vec![1], Vec::new())];
        assert_matches!(
            validate_add_sequenced_leaves(&leaves),
            Err(LogError::InvalidArgument { .. })
        );
        let leaves = vec![LogLeaf::new(vec![1], Vec::new()).with_leaf_index(-1)];
        assert_matches!(
            validate_add_sequenced_leaves(&leaves),
            Err(LogError::InvalidArgument { .. })
        );
        let leaves = vec![LogLeaf::new(vec![1], Vec::new()).with_leaf_index(0)];
        assert!(validate_add_sequenced_leaves(&leaves).is_ok());
    }

    #[test]
    fn inclusion_proof_bounds_are_checked() {
        assert!(validate_inclusion_proof(0, 1).is_ok());
        assert_matches!(validate_inclusion_proof(1, 1), Err(LogError::InvalidArgument { .. }));
        assert_matches!(validate_inclusion_proof(0, 0), Err(LogError::InvalidArgument { .. }));
        assert_matches!(validate_inclusion_proof(-1, 5), Err(LogError::InvalidArgument { .. }));
    }

    #[test]
    fn consistency_proof_orders_sizes() {
        assert!(validate_consistency_proof(0, 0).is_ok());
        assert!(validate_consistency_proof(3, 7).is_ok());
        assert_matches!(validate_consistency_proof(7, 3), Err(LogError::InvalidArgument { .. }));
        assert_matches!(validate_consistency_proof(-1, 3), Err(LogError::InvalidArgument { .. }));
    }

    #[test]
    fn leaves_by_range_requires_positive_count() {
        assert!(validate_leaves_by_range(0, 1).is_ok());
        assert_matches!(validate_leaves_by_range(-1, 1), Err(LogError::InvalidArgument { .. }));
        assert_matches!(validate_leaves_by_range(0, 0), Err(LogError::InvalidArgument { .. }));
    }
}
