//! Mazebox Wire Types
//!
//! Shared types for adapters that carry maze requests and supervisory
//! snapshots across a process boundary.
//!
//! # Contents
//!
//! - **Move batch codec**: the fixed-width payload a client writes to submit
//!   several deltas at once (8 bytes per delta, `i32 dx` then `i32 dy`,
//!   little-endian).
//! - **Snapshot messages** (Protobuf via prost): one summary per table slot,
//!   for the supervisory view.

#![deny(unsafe_code)]

use mazebox_engine::{Coord, MazeView};
use prost::Message;

// ============================================================================
// Type Aliases (matching server crate)
// ============================================================================

/// Owner identity (client process id) for wire messages.
pub type OwnerId = u32;

// ============================================================================
// Move Batch Codec
// ============================================================================

/// Encoded size of one delta in a move batch.
pub const BATCH_STRIDE: usize = 8;

/// Errors produced while decoding wire payloads.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WireError {
    /// Payload length is not a whole number of deltas.
    #[error("move batch of {len} bytes is not a multiple of {stride}")]
    InvalidBatchLength { len: usize, stride: usize },
}

/// Decode a move batch payload into deltas, in submission order.
pub fn decode_move_batch(payload: &[u8]) -> Result<Vec<Coord>, WireError> {
    if payload.len() % BATCH_STRIDE != 0 {
        return Err(WireError::InvalidBatchLength {
            len: payload.len(),
            stride: BATCH_STRIDE,
        });
    }

    Ok(payload
        .chunks_exact(BATCH_STRIDE)
        .map(|chunk| {
            let dx = i32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
            let dy = i32::from_le_bytes([chunk[4], chunk[5], chunk[6], chunk[7]]);
            Coord::new(dx, dy)
        })
        .collect())
}

/// Encode deltas as a move batch payload.
pub fn encode_move_batch(deltas: &[Coord]) -> Vec<u8> {
    let mut payload = Vec::with_capacity(deltas.len() * BATCH_STRIDE);
    for delta in deltas {
        payload.extend_from_slice(&delta.x.to_le_bytes());
        payload.extend_from_slice(&delta.y.to_le_bytes());
    }
    payload
}

// ============================================================================
// Snapshot Messages
// ============================================================================

/// A coordinate or `(width, height)` pair.
#[derive(Clone, Copy, PartialEq, Message)]
pub struct CoordProto {
    #[prost(sint32, tag = "1")]
    pub x: i32,

    #[prost(sint32, tag = "2")]
    pub y: i32,
}

/// Summary of one table slot.
///
/// Vacant slots carry only `slot`; every other field is default.
#[derive(Clone, PartialEq, Message)]
pub struct SlotSummaryProto {
    /// Slot index in the table.
    #[prost(uint32, tag = "1")]
    pub slot: u32,

    #[prost(bool, tag = "2")]
    pub occupied: bool,

    #[prost(uint32, tag = "3")]
    pub owner: OwnerId,

    /// `(width, height)`.
    #[prost(message, optional, tag = "4")]
    pub bounds: Option<CoordProto>,

    #[prost(message, optional, tag = "5")]
    pub start: Option<CoordProto>,

    #[prost(message, optional, tag = "6")]
    pub end: Option<CoordProto>,

    #[prost(message, optional, tag = "7")]
    pub current: Option<CoordProto>,

    /// Display rows, one glyph per cell.
    #[prost(string, repeated, tag = "8")]
    pub rows: Vec<String>,

    #[prost(uint64, tag = "9")]
    pub layout_digest: u64,
}

impl SlotSummaryProto {
    pub fn vacant(slot: u32) -> Self {
        Self {
            slot,
            ..Default::default()
        }
    }

    pub fn occupied(slot: u32, owner: OwnerId, view: &MazeView) -> Self {
        Self {
            slot,
            occupied: true,
            owner,
            bounds: Some(view.bounds.into()),
            start: Some(view.start.into()),
            end: Some(view.end.into()),
            current: Some(view.current.into()),
            rows: view.rows.clone(),
            layout_digest: view.layout_digest,
        }
    }
}

/// Every slot of the table, captured at one instant.
#[derive(Clone, PartialEq, Message)]
pub struct MazeSnapshotProto {
    /// Slots in index order.
    #[prost(message, repeated, tag = "1")]
    pub slots: Vec<SlotSummaryProto>,
}

impl MazeSnapshotProto {
    /// Number of occupied slots.
    pub fn occupied_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.occupied).count()
    }
}

// ============================================================================
// Conversion Traits
// ============================================================================

impl From<Coord> for CoordProto {
    fn from(c: Coord) -> Self {
        Self { x: c.x, y: c.y }
    }
}

impl From<CoordProto> for Coord {
    fn from(c: CoordProto) -> Self {
        Self::new(c.x, c.y)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_move_batch_little_endian() {
        let payload = [
            1, 0, 0, 0, 0xff, 0xff, 0xff, 0xff, // (1, -1)
            0, 0, 0, 0, 2, 0, 0, 0, // (0, 2)
        ];
        assert_eq!(
            decode_move_batch(&payload).unwrap(),
            vec![Coord::new(1, -1), Coord::new(0, 2)]
        );
    }

    #[test]
    fn test_decode_empty_batch() {
        assert_eq!(decode_move_batch(&[]).unwrap(), Vec::<Coord>::new());
    }

    #[test]
    fn test_decode_rejects_partial_element() {
        for len in [1, 4, 7, 9, 15] {
            let payload = vec![0u8; len];
            assert_eq!(
                decode_move_batch(&payload),
                Err(WireError::InvalidBatchLength {
                    len,
                    stride: BATCH_STRIDE
                })
            );
        }
    }

    #[test]
    fn test_encode_matches_decode_layout() {
        let deltas = [Coord::new(-3, 7), Coord::new(i32::MIN, i32::MAX)];
        let payload = encode_move_batch(&deltas);
        assert_eq!(payload.len(), deltas.len() * BATCH_STRIDE);
        assert_eq!(&payload[0..4], &(-3i32).to_le_bytes());
        assert_eq!(decode_move_batch(&payload).unwrap(), deltas);
    }

    #[test]
    fn test_vacant_slot_has_no_maze_fields() {
        let slot = SlotSummaryProto::vacant(3);
        assert_eq!(slot.slot, 3);
        assert!(!slot.occupied);
        assert!(slot.bounds.is_none());
        assert!(slot.rows.is_empty());
    }

    #[test]
    fn test_occupied_slot_copies_view() {
        let view = MazeView {
            bounds: Coord::new(5, 3),
            start: Coord::new(1, 1),
            end: Coord::new(3, 1),
            current: Coord::new(2, 1),
            rows: vec!["#####".into(), "#S*E#".into(), "#####".into()],
            layout_digest: 0xfeed,
        };
        let slot = SlotSummaryProto::occupied(0, 4242, &view);
        assert!(slot.occupied);
        assert_eq!(slot.owner, 4242);
        assert_eq!(slot.bounds.map(Coord::from), Some(Coord::new(5, 3)));
        assert_eq!(slot.current.map(Coord::from), Some(Coord::new(2, 1)));
        assert_eq!(slot.rows, view.rows);

        let snapshot = MazeSnapshotProto {
            slots: vec![slot, SlotSummaryProto::vacant(1)],
        };
        assert_eq!(snapshot.occupied_count(), 1);
        let decoded = MazeSnapshotProto::decode(snapshot.encode_to_vec().as_slice()).unwrap();
        assert_eq!(decoded, snapshot);
    }
}
