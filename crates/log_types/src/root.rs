use serde::{Deserialize, Serialize};

use crate::error::{LogError, LogResult};

/// Version tag of the `LogRootV1` wire encoding.
pub const LOG_ROOT_V1_VERSION: u16 = 1;

/// The decoded contents of a signed tree head. `revision` is storage-internal: every node read
/// needed to build a proof consistent with this root must be performed at this revision.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct LogRootV1 {
    pub tree_size: u64,
    pub root_hash: Vec<u8>,
    pub timestamp_nanos: u64,
    pub revision: u64,
    pub metadata: Vec<u8>,
}

impl LogRootV1 {
    /// Length-prefixed binary encoding: `version(u16) | tree_size(u64) | len(u8) | root_hash |
    /// timestamp_nanos(u64) | revision(u64) | len(u32) | metadata`. This facade never needs to
    /// interoperate with a different encoder, so the exact byte layout is a private
    /// implementation detail.
    pub fn marshal_binary(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(2 + 8 + 1 + self.root_hash.len() + 8 + 8 + 4 + self.metadata.len());
        buf.extend_from_slice(&LOG_ROOT_V1_VERSION.to_be_bytes());
        buf.extend_from_slice(&self.tree_size.to_be_bytes());
        buf.push(u8::try_from(self.root_hash.len()).expect("root hash longer than 255 bytes"));
        buf.extend_from_slice(&self.root_hash);
        buf.extend_from_slice(&self.timestamp_nanos.to_be_bytes());
        buf.extend_from_slice(&self.revision.to_be_bytes());
        buf.extend_from_slice(&u32::try_from(self.metadata.len()).unwrap_or(u32::MAX).to_be_bytes());
        buf.extend_from_slice(&self.metadata);
        buf
    }

    pub fn unmarshal_binary(bytes: &[u8]) -> LogResult<Self> {
        let mut cursor = bytes;
        let version = take_u16(&mut cursor)?;
        if version != LOG_ROOT_V1_VERSION {
            return Err(LogError::internal(format!("unsupported log root version {version}")));
        }
        let tree_size = take_u64(&mut cursor)?;
        let hash_len = take_u8(&mut cursor)? as usize;
        let root_hash = take_n(&mut cursor, hash_len)?;
        let timestamp_nanos = take_u64(&mut cursor)?;
        let revision = take_u64(&mut cursor)?;
        let metadata_len = take_u32(&mut cursor)? as usize;
        let metadata = take_n(&mut cursor, metadata_len)?;
        Ok(LogRootV1 { tree_size, root_hash, timestamp_nanos, revision, metadata })
    }
}

fn take_u8(cursor: &mut &[u8]) -> LogResult<u8> {
    let b = take_n(cursor, 1)?;
    Ok(b[0])
}

fn take_u16(cursor: &mut &[u8]) -> LogResult<u16> {
    let b = take_n(cursor, 2)?;
    Ok(u16::from_be_bytes(b.try_into().expect("length checked above")))
}

fn take_u32(cursor: &mut &[u8]) -> LogResult<u32> {
    let b = take_n(cursor, 4)?;
    Ok(u32::from_be_bytes(b.try_into().expect("length checked above")))
}

fn take_u64(cursor: &mut &[u8]) -> LogResult<u64> {
    let b = take_n(cursor, 8)?;
    Ok(u64::from_be_bytes(b.try_into().expect("length checked above")))
}

fn take_n(cursor: &mut &[u8], n: usize) -> LogResult<Vec<u8>> {
    if cursor.len() < n {
        return Err(LogError::internal("truncated log root encoding"));
    }
    let (head, tail) = cursor.split_at(n);
    *cursor = tail;
    Ok(head.to_vec())
}

/// An opaque signed blob: the length-prefixed `LogRootV1` serialization plus a signature over
/// it. The facade decodes it but never re-signs it on read paths.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct SignedLogRoot {
    pub log_root: Vec<u8>,
    pub log_root_signature: Vec<u8>,
}

impl SignedLogRoot {
    pub fn decode(&self) -> LogResult<LogRootV1> {
        LogRootV1::unmarshal_binary(&self.log_root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_marshal_unmarshal() {
        let root = LogRootV1 {
            tree_size: 42,
            root_hash: vec![1, 2, 3, 4],
            timestamp_nanos: 1_700_000_000_000_000_000,
            revision: 7,
            metadata: vec![9, 9],
        };
        let encoded = root.marshal_binary();
        let decoded = LogRootV1::unmarshal_binary(&encoded).unwrap();
        assert_eq!(root, decoded);
    }

    #[test]
    fn rejects_truncated_encoding() {
        let bytes = [0u8, 1, 0, 0];
        assert!(LogRootV1::unmarshal_binary(&bytes).is_err());
    }
}
