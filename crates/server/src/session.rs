//! Per-client session state held in a table slot.

use mazebox_engine::{Maze, MazeView};

/// Client identity that keys a session (the client's process id).
pub type OwnerId = u32;

/// Handle for an occupied slot. Only meaningful while the session lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(pub(crate) usize);

impl SessionId {
    /// Slot index, for display.
    pub fn slot(&self) -> usize {
        self.0
    }
}

/// One client's live maze.
#[derive(Debug, Clone)]
pub struct Session {
    pub owner: OwnerId,
    pub maze: Maze,
}

impl Session {
    pub fn new(owner: OwnerId, maze: Maze) -> Self {
        Self { owner, maze }
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            owner: self.owner,
            maze: self.maze.view(),
        }
    }
}

/// Read-only copy of a session for the supervisory view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionView {
    pub owner: OwnerId,
    pub maze: MazeView,
}

/// One slot of a table snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotSnapshot {
    pub slot: usize,
    pub session: Option<SessionView>,
}
