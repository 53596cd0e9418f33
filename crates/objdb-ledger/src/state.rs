//! Ledger state and its on-medium encodings.

use std::collections::BTreeSet;

use bytes::{Buf, BufMut};
use objdb_types::{IdRange, ObjectId};
use serde::{Deserialize, Serialize};

/// Snapshot of the allocation ledger.
///
/// `next_id` is a `u64` so that the exhausted value `max_id + 1` fits even
/// for a range ending at `u32::MAX`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationState {
    pub next_id: u64,
    pub free_ids: BTreeSet<ObjectId>,
}

impl AllocationState {
    /// A never-used ledger for `range`.
    pub fn fresh(range: IdRange) -> Self {
        Self {
            next_id: u64::from(range.min().get()),
            free_ids: BTreeSet::new(),
        }
    }

    /// Whether the counter has passed the end of `range`.
    pub fn counter_exhausted(&self, range: IdRange) -> bool {
        self.next_id > u64::from(range.max().get())
    }

    /// Whether `id` has been handed out by the counter at some point.
    pub fn was_issued(&self, id: ObjectId) -> bool {
        u64::from(id.get()) < self.next_id
    }
}

/// Why a persisted ledger file could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StateDecodeError {
    #[error("counter is not decimal text: {0}")]
    BadCounter(String),

    #[error("free set truncated: header says {count} ids, {available} bytes follow")]
    TruncatedFreeSet { count: u32, available: usize },

    #[error("free set has {0} trailing bytes")]
    TrailingBytes(usize),

    #[error("free set shorter than its 4-byte header")]
    MissingHeader,
}

pub(crate) fn encode_counter(next_id: u64) -> Vec<u8> {
    next_id.to_string().into_bytes()
}

pub(crate) fn decode_counter(data: &[u8]) -> Result<u64, StateDecodeError> {
    let text = std::str::from_utf8(data)
        .map_err(|e| StateDecodeError::BadCounter(e.to_string()))?
        .trim();
    text.parse::<u64>()
        .map_err(|e| StateDecodeError::BadCounter(format!("{text:?}: {e}")))
}

pub(crate) fn encode_free_set(free_ids: &BTreeSet<ObjectId>) -> Vec<u8> {
    let mut buf = Vec::with_capacity(4 + 4 * free_ids.len());
    buf.put_u32_le(free_ids.len() as u32);
    for id in free_ids {
        buf.put_u32_le(id.get());
    }
    buf
}

/// Decode `free.dat`. The buffer must be exactly `4 + 4 * count` bytes.
pub(crate) fn decode_free_set(mut data: &[u8]) -> Result<Vec<ObjectId>, StateDecodeError> {
    if data.remaining() < 4 {
        return Err(StateDecodeError::MissingHeader);
    }
    let count = data.get_u32_le();
    let needed = (count as usize).saturating_mul(4);
    if data.remaining() < needed {
        return Err(StateDecodeError::TruncatedFreeSet {
            count,
            available: data.remaining(),
        });
    }
    let mut ids = Vec::with_capacity(count as usize);
    for _ in 0..count {
        ids.push(ObjectId::new(data.get_u32_le()));
    }
    if data.has_remaining() {
        return Err(StateDecodeError::TrailingBytes(data.remaining()));
    }
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[u32]) -> BTreeSet<ObjectId> {
        raw.iter().copied().map(ObjectId::new).collect()
    }

    #[test]
    fn counter_text_format() {
        assert_eq!(encode_counter(5), b"5");
        assert_eq!(decode_counter(b"5").unwrap(), 5);
        assert_eq!(decode_counter(b" 12\n").unwrap(), 12);
    }

    #[test]
    fn counter_rejects_garbage() {
        assert!(matches!(decode_counter(b""), Err(StateDecodeError::BadCounter(_))));
        assert!(matches!(decode_counter(b"-3"), Err(StateDecodeError::BadCounter(_))));
        assert!(matches!(decode_counter(&[0xff, 0xfe]), Err(StateDecodeError::BadCounter(_))));
    }

    #[test]
    fn free_set_layout() {
        let bytes = encode_free_set(&ids(&[7, 2]));
        assert_eq!(bytes, vec![2, 0, 0, 0, 2, 0, 0, 0, 7, 0, 0, 0]);
        assert_eq!(
            decode_free_set(&bytes).unwrap(),
            vec![ObjectId::new(2), ObjectId::new(7)]
        );
    }

    #[test]
    fn empty_free_set() {
        let bytes = encode_free_set(&BTreeSet::new());
        assert_eq!(bytes, vec![0, 0, 0, 0]);
        assert!(decode_free_set(&bytes).unwrap().is_empty());
    }

    #[test]
    fn free_set_corruption_detected() {
        assert_eq!(decode_free_set(&[1, 0]), Err(StateDecodeError::MissingHeader));
        assert_eq!(
            decode_free_set(&[2, 0, 0, 0, 1, 0, 0, 0]),
            Err(StateDecodeError::TruncatedFreeSet { count: 2, available: 4 })
        );
        assert_eq!(
            decode_free_set(&[0, 0, 0, 0, 9]),
            Err(StateDecodeError::TrailingBytes(1))
        );
    }

    #[test]
    fn fresh_state() {
        let range = IdRange::new(10, 12).unwrap();
        let state = AllocationState::fresh(range);
        assert_eq!(state.next_id, 10);
        assert!(!state.counter_exhausted(range));
        assert!(!state.was_issued(ObjectId::new(10)));
    }
}
