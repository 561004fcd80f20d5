//! Mazebox Maze Engine
//!
//! This crate contains the per-client maze engine: the bounded cell grid,
//! the randomized generator with its solvability guarantee, and the movement
//! rules applied to a client's live position.
//!
//! # Architecture Constraints
//!
//! The engine MUST NOT:
//! - Perform I/O operations (file, network, etc.)
//! - Use ambient randomness; every draw comes from a caller-supplied `Rng`
//! - Take locks or know about owners; the Session Table owns concurrency
//!
//! Errors are returned to the caller, never logged.

#![deny(unsafe_code)]

pub mod generator;
pub mod grid;
pub mod movement;
pub mod reachability;

use std::fmt;
use std::ops::{Add, Sub};

pub use generator::{GenerateError, GenerationLimits, generate};
pub use grid::{Cell, Grid};
pub use movement::{BatchOutcome, Maze, MazeView, MoveOutcome};
pub use reachability::{VisitedScratch, is_reachable};

// ============================================================================
// Limits (Normative)
// ============================================================================

/// Maximum grid width in cells.
pub const MAX_X: i32 = 101;

/// Maximum grid height in cells.
pub const MAX_Y: i32 = 101;

/// Number of session slots a table holds by default.
pub const MAX_USERS: usize = 8;

/// One interior cell in `WALL_ODDS` becomes a wall.
pub const WALL_ODDS: u32 = 4;

// ============================================================================
// Coord
// ============================================================================

/// A cell coordinate or a relative movement delta.
///
/// `x` grows to the right (column), `y` grows downward (row).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Component-wise add that reports overflow instead of wrapping.
    pub fn checked_add(self, delta: Coord) -> Option<Coord> {
        Some(Coord {
            x: self.x.checked_add(delta.x)?,
            y: self.y.checked_add(delta.y)?,
        })
    }
}

impl Add for Coord {
    type Output = Self;

    fn add(self, other: Self) -> Self::Output {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl Sub for Coord {
    type Output = Self;

    fn sub(self, other: Self) -> Self::Output {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

impl From<(i32, i32)> for Coord {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "({}, {})", self.x, self.y)
    }
}

// ============================================================================
// Layout Digest
// ============================================================================

/// FNV-1a 64-bit offset basis.
const FNV1A_OFFSET_BASIS: u64 = 0xcbf29ce484222325;

/// FNV-1a 64-bit prime.
const FNV1A_PRIME: u64 = 0x100000001b3;

/// FNV-1a 64-bit hasher used for layout digests.
#[derive(Debug, Clone)]
pub(crate) struct Fnv1a64 {
    state: u64,
}

impl Fnv1a64 {
    pub(crate) fn new() -> Self {
        Self {
            state: FNV1A_OFFSET_BASIS,
        }
    }

    pub(crate) fn update(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.state ^= u64::from(byte);
            self.state = self.state.wrapping_mul(FNV1A_PRIME);
        }
    }

    pub(crate) fn finish(self) -> u64 {
        self.state
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coord_arithmetic() {
        let a = Coord::new(3, 4);
        let b = Coord::new(-1, 2);
        assert_eq!(a + b, Coord::new(2, 6));
        assert_eq!(a - b, Coord::new(4, 2));
        assert_eq!(Coord::from((7, -7)), Coord::new(7, -7));
    }

    #[test]
    fn test_coord_checked_add_overflow() {
        let edge = Coord::new(i32::MAX, 0);
        assert_eq!(edge.checked_add(Coord::new(1, 0)), None);
        assert_eq!(
            edge.checked_add(Coord::new(-1, 5)),
            Some(Coord::new(i32::MAX - 1, 5))
        );
    }

    #[test]
    fn test_coord_display() {
        assert_eq!(Coord::new(1, -2).to_string(), "(1, -2)");
    }

    #[test]
    fn test_fnv1a_known_vectors() {
        // Empty input yields the offset basis.
        assert_eq!(Fnv1a64::new().finish(), FNV1A_OFFSET_BASIS);

        let mut hasher = Fnv1a64::new();
        hasher.update(b"a");
        assert_eq!(hasher.finish(), 0xaf63dc4c8601ec8c);
    }
}
