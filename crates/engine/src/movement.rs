//! Movement engine: a grid plus the client's live position.
//!
//! Moves are relative deltas. A delta whose target is outside the grid or on
//! a wall is a silent no-op ("bump into wall"). When the position leaves a
//! cell, that cell gets back its semantic marker: `Start`, `End`, or `Path`.

use crate::{Cell, Coord, Grid};

/// Result of applying a single delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Position changed to the contained coordinate.
    Moved(Coord),
    /// Target was a wall or outside the grid; position unchanged.
    Blocked,
}

impl MoveOutcome {
    pub fn is_moved(&self) -> bool {
        matches!(self, Self::Moved(_))
    }
}

/// Summary of a batch of deltas.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    /// Deltas that moved the position.
    pub moved: usize,
    /// Deltas skipped as blocked.
    pub blocked: usize,
}

impl BatchOutcome {
    /// Number of deltas processed (moved + blocked).
    pub fn submitted(&self) -> usize {
        self.moved + self.blocked
    }
}

/// Read-only copy of a maze's observable state, taken at one instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MazeView {
    pub bounds: Coord,
    pub start: Coord,
    pub end: Coord,
    pub current: Coord,
    /// Display rows, see [`Grid::render_rows`].
    pub rows: Vec<String>,
    pub layout_digest: u64,
}

/// One client's maze: the grid and the current position on it.
///
/// Invariant: exactly one cell holds `Current`, at `position`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Maze {
    grid: Grid,
    position: Coord,
}

impl Maze {
    /// Place the live position on the grid's start cell.
    pub(crate) fn at_start(mut grid: Grid) -> Self {
        let start = grid.start();
        grid.set_cell(start, Cell::Current);
        Self {
            grid,
            position: start,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn position(&self) -> Coord {
        self.position
    }

    /// Copy out everything a supervisor may display.
    pub fn view(&self) -> MazeView {
        MazeView {
            bounds: self.grid.bounds(),
            start: self.grid.start(),
            end: self.grid.end(),
            current: self.position,
            rows: self.grid.render_rows(),
            layout_digest: self.grid.layout_digest(),
        }
    }

    /// Returns true if the live position is on the end cell.
    pub fn is_solved(&self) -> bool {
        self.position == self.grid.end()
    }

    /// Apply one delta, validating the target against the grid.
    pub fn apply_delta(&mut self, delta: Coord) -> MoveOutcome {
        let Some(target) = self.position.checked_add(delta) else {
            return MoveOutcome::Blocked;
        };
        if !self.grid.is_open(target) {
            return MoveOutcome::Blocked;
        }

        self.relocate(target);
        MoveOutcome::Moved(target)
    }

    /// Apply deltas in order. Each is validated against the position left by
    /// the previous one; blocked deltas are skipped, earlier progress is kept.
    pub fn apply_batch(&mut self, deltas: &[Coord]) -> BatchOutcome {
        deltas
            .iter()
            .fold(BatchOutcome::default(), |mut outcome, &delta| {
                if self.apply_delta(delta).is_moved() {
                    outcome.moved += 1;
                } else {
                    outcome.blocked += 1;
                }
                outcome
            })
    }

    /// Return the live position to the start cell.
    pub fn reset(&mut self) {
        let start = self.grid.start();
        self.relocate(start);
    }

    /// Move the `Current` marker from the old position to `target`.
    fn relocate(&mut self, target: Coord) {
        let underlying = self.underlying(self.position);
        self.grid.set_cell(self.position, underlying);
        self.grid.set_cell(target, Cell::Current);
        self.position = target;
    }

    /// The symbol a cell shows when the position is elsewhere.
    fn underlying(&self, at: Coord) -> Cell {
        if at == self.grid.start() {
            Cell::Start
        } else if at == self.grid.end() {
            Cell::End
        } else {
            Cell::Path
        }
    }
}
