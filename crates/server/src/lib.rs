//! Mazebox Session Table
//!
//! The server side owns every client's maze. It provides:
//! - A fixed-capacity table of per-owner sessions behind one global lock
//! - Request validation
//! - A device-style facade (`device`) for adapters: command dispatch,
//!   bitmap reads, move batch writes, disconnect and proc rendering
//!
//! # Concurrency
//!
//! Every table operation, including the supervisory snapshot, takes the
//! single table lock for its whole duration. Two owners' sessions are never
//! touched at the same time; this is the throughput ceiling of the design.
//! No operation performs I/O while holding the lock.

#![deny(unsafe_code)]

pub mod device;
pub mod error;
pub mod session;
pub mod validation;

use std::env;

use mazebox_engine::{
    BatchOutcome, Coord, GenerationLimits, MAX_USERS, MAX_X, MAX_Y, MoveOutcome, generate,
};
use mazebox_wire::{MazeSnapshotProto, SlotSummaryProto, decode_move_batch};
use parking_lot::Mutex;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

pub use error::MazeError;
pub use session::{OwnerId, Session, SessionId, SessionView, SlotSnapshot};
use validation::validate_dimensions;

// ============================================================================
// Configuration
// ============================================================================

/// Table configuration.
#[derive(Debug, Clone)]
pub struct TableConfig {
    pub max_users: usize,
    pub max_width: i32,
    pub max_height: i32,
    /// Fixed RNG seed; `None` seeds from OS entropy.
    pub seed: Option<u64>,
    pub generation: GenerationLimits,
}

/// Upper bound on `max_users`; slots are allocated up front.
pub const MAX_USERS_LIMIT: usize = 1024;

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            max_users: MAX_USERS,
            max_width: MAX_X,
            max_height: MAX_Y,
            seed: None,
            generation: GenerationLimits::default(),
        }
    }
}

impl TableConfig {
    /// Defaults overridden by `MAZEBOX_MAX_USERS`, `MAZEBOX_SEED`,
    /// `MAZEBOX_MAX_ENDPOINT_ATTEMPTS` and `MAZEBOX_MAX_LAYOUTS`.
    /// Absent or unparsable values keep the default.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`TableConfig::from_env`], reading values through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let parse = |key: &str| lookup(key).and_then(|value| value.trim().parse().ok());
        let defaults = Self::default();
        Self {
            max_users: parse("MAZEBOX_MAX_USERS")
                .map_or(defaults.max_users, |n: u64| {
                    usize::try_from(n).unwrap_or(MAX_USERS_LIMIT)
                }),
            seed: parse("MAZEBOX_SEED").or(defaults.seed),
            generation: GenerationLimits {
                max_endpoint_attempts: parse("MAZEBOX_MAX_ENDPOINT_ATTEMPTS")
                    .map_or(defaults.generation.max_endpoint_attempts, |n: u64| {
                        u32::try_from(n).unwrap_or(u32::MAX)
                    }),
                max_layouts: parse("MAZEBOX_MAX_LAYOUTS")
                    .map_or(defaults.generation.max_layouts, |n: u64| {
                        u32::try_from(n).unwrap_or(u32::MAX)
                    }),
            },
            ..defaults
        }
    }

    /// Clamp values into the ranges the table supports.
    fn normalized(self) -> Self {
        Self {
            max_users: self.max_users.clamp(1, MAX_USERS_LIMIT),
            max_width: self.max_width.min(MAX_X),
            max_height: self.max_height.min(MAX_Y),
            ..self
        }
    }
}

// ============================================================================
// Session Table
// ============================================================================

/// Everything guarded by the table lock.
struct TableState {
    slots: Vec<Option<Session>>,
    rng: ChaCha8Rng,
}

impl TableState {
    fn find(&self, owner: OwnerId) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| slot.as_ref().is_some_and(|s| s.owner == owner))
    }

    fn session_mut(&mut self, owner: OwnerId) -> Result<&mut Session, MazeError> {
        self.slots
            .iter_mut()
            .flatten()
            .find(|s| s.owner == owner)
            .ok_or(MazeError::NotFound { owner })
    }
}

/// Fixed-capacity table of per-owner maze sessions.
///
/// Slots are reused: a new session takes the first free slot.
pub struct SessionTable {
    config: TableConfig,
    state: Mutex<TableState>,
}

impl SessionTable {
    /// Create an empty table.
    pub fn new(config: TableConfig) -> Self {
        let config = config.normalized();
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        let slots = (0..config.max_users).map(|_| None).collect();

        Self {
            state: Mutex::new(TableState { slots, rng }),
            config,
        }
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    /// Number of slots.
    pub fn capacity(&self) -> usize {
        self.config.max_users
    }

    /// Number of occupied slots.
    pub fn session_count(&self) -> usize {
        self.state.lock().slots.iter().flatten().count()
    }

    /// Generate a maze for `owner` and install it in the first free slot.
    pub fn create(&self, owner: OwnerId, width: i32, height: i32) -> Result<SessionId, MazeError> {
        let mut state = self.state.lock();

        if state.find(owner).is_some() {
            return Err(MazeError::AlreadyExists { owner });
        }
        validate_dimensions(width, height, &self.config)?;
        let Some(slot) = state.slots.iter().position(Option::is_none) else {
            return Err(MazeError::Exhausted {
                capacity: self.config.max_users,
            });
        };

        // Nothing is installed until generation has fully succeeded.
        let maze = generate(width, height, &self.config.generation, &mut state.rng)?;
        state.slots[slot] = Some(Session::new(owner, maze));
        Ok(SessionId(slot))
    }

    /// Slot held by `owner`, if any.
    pub fn find(&self, owner: OwnerId) -> Option<SessionId> {
        self.state.lock().find(owner).map(SessionId)
    }

    /// Free `owner`'s slot and drop its maze.
    pub fn destroy(&self, owner: OwnerId) -> Result<(), MazeError> {
        let mut state = self.state.lock();
        let slot = state.find(owner).ok_or(MazeError::NotFound { owner })?;
        state.slots[slot] = None;
        Ok(())
    }

    /// Owner disconnected: drop its session if it has one.
    ///
    /// Returns true if a session was released.
    pub fn release(&self, owner: OwnerId) -> bool {
        self.destroy(owner).is_ok()
    }

    /// Apply one delta to `owner`'s position. Blocked moves are not errors.
    pub fn move_by(&self, owner: OwnerId, delta: Coord) -> Result<MoveOutcome, MazeError> {
        self.with_session(owner, |session| session.maze.apply_delta(delta))
    }

    /// Apply deltas in order; blocked deltas are skipped.
    pub fn apply_batch(&self, owner: OwnerId, deltas: &[Coord]) -> Result<BatchOutcome, MazeError> {
        self.with_session(owner, |session| session.maze.apply_batch(deltas))
    }

    /// Decode a raw move batch payload and apply it.
    ///
    /// Returns the number of deltas submitted. The owner is checked first; a
    /// payload that is not a whole number of deltas is then rejected before
    /// any move.
    pub fn apply_move_batch(&self, owner: OwnerId, payload: &[u8]) -> Result<usize, MazeError> {
        self.with_session(owner, |session| -> Result<usize, MazeError> {
            let deltas = decode_move_batch(payload)?;
            Ok(session.maze.apply_batch(&deltas).submitted())
        })?
    }

    /// Return `owner`'s position to its start cell.
    pub fn reset(&self, owner: OwnerId) -> Result<(), MazeError> {
        self.with_session(owner, |session| session.maze.reset())
    }

    pub fn position(&self, owner: OwnerId) -> Result<Coord, MazeError> {
        self.with_session(owner, |session| session.maze.position())
    }

    /// `(width, height)` of `owner`'s maze.
    pub fn bounds(&self, owner: OwnerId) -> Result<Coord, MazeError> {
        self.with_session(owner, |session| session.maze.grid().bounds())
    }

    pub fn start(&self, owner: OwnerId) -> Result<Coord, MazeError> {
        self.with_session(owner, |session| session.maze.grid().start())
    }

    pub fn end(&self, owner: OwnerId) -> Result<Coord, MazeError> {
        self.with_session(owner, |session| session.maze.grid().end())
    }

    /// One byte per cell, row-major: 1 for wall, 0 for open.
    pub fn wall_bitmap(&self, owner: OwnerId) -> Result<Vec<u8>, MazeError> {
        self.with_session(owner, |session| session.maze.grid().wall_bitmap())
    }

    /// Every slot, copied under one lock acquisition.
    pub fn snapshot_all(&self) -> Vec<SlotSnapshot> {
        let state = self.state.lock();
        state
            .slots
            .iter()
            .enumerate()
            .map(|(slot, session)| SlotSnapshot {
                slot,
                session: session.as_ref().map(Session::view),
            })
            .collect()
    }

    /// Snapshot in wire form.
    pub fn snapshot_proto(&self) -> MazeSnapshotProto {
        let slots = self
            .snapshot_all()
            .iter()
            .map(|entry| {
                let slot = u32::try_from(entry.slot).unwrap_or(u32::MAX);
                match &entry.session {
                    Some(view) => SlotSummaryProto::occupied(slot, view.owner, &view.maze),
                    None => SlotSummaryProto::vacant(slot),
                }
            })
            .collect();
        MazeSnapshotProto { slots }
    }

    fn with_session<T>(
        &self,
        owner: OwnerId,
        f: impl FnOnce(&mut Session) -> T,
    ) -> Result<T, MazeError> {
        let mut state = self.state.lock();
        state.session_mut(owner).map(f)
    }
}

// ============================================================================
// Tests
// ============================================================================
