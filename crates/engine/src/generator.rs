//! Randomized maze generation with a solvability guarantee.
//!
//! A layout is drawn by making each interior cell a wall with probability
//! `1 / WALL_ODDS`. Start and end are then sampled from the open cells until
//! the end is reachable from the start. After `max_endpoint_attempts` failed
//! samples the wall layout itself is redrawn, up to `max_layouts` times.

use rand::Rng;

use crate::grid::{Cell, Grid};
use crate::movement::Maze;
use crate::reachability::{VisitedScratch, is_reachable};
use crate::{Coord, MAX_X, MAX_Y, WALL_ODDS};

/// Default start/end resamples per wall layout.
pub const DEFAULT_MAX_ENDPOINT_ATTEMPTS: u32 = 4096;

/// Default wall layouts tried before giving up.
pub const DEFAULT_MAX_LAYOUTS: u32 = 16;

/// Errors produced while building a maze.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerateError {
    /// Dimensions are non-positive, above `MAX_X`/`MAX_Y`, or leave fewer
    /// than two interior cells.
    #[error("invalid maze size {width}x{height}")]
    InvalidSize { width: i32, height: i32 },

    /// Cell storage could not be reserved.
    #[error("failed to allocate {cells} maze cells")]
    AllocationFailure { cells: usize },

    /// No connected start/end pair was found within the retry bounds.
    #[error("no solvable maze after {layouts} layouts ({attempts} endpoint samples)")]
    GenerationTimeout { layouts: u32, attempts: u64 },
}

/// Retry bounds for the solvability loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationLimits {
    pub max_endpoint_attempts: u32,
    pub max_layouts: u32,
}

impl Default for GenerationLimits {
    fn default() -> Self {
        Self {
            max_endpoint_attempts: DEFAULT_MAX_ENDPOINT_ATTEMPTS,
            max_layouts: DEFAULT_MAX_LAYOUTS,
        }
    }
}

/// Generate a solvable `width x height` maze.
///
/// The returned maze has `Start` and `End` marked and the live position on
/// the start cell (shown as `Current`).
pub fn generate<R: Rng + ?Sized>(
    width: i32,
    height: i32,
    limits: &GenerationLimits,
    rng: &mut R,
) -> Result<Maze, GenerateError> {
    validate_size(width, height)?;

    let mut grid = Grid::new(width, height)?;
    let mut scratch = VisitedScratch::for_grid(&grid);
    let mut open = Vec::new();
    open.try_reserve_exact(grid.area())
        .map_err(|_| GenerateError::AllocationFailure { cells: grid.area() })?;

    let mut attempts: u64 = 0;
    for _ in 0..limits.max_layouts {
        fill_walls(&mut grid, rng);

        open.clear();
        open.extend(grid.coords().filter(|&at| grid.is_open(at)));
        if open.len() < 2 {
            continue;
        }

        for _ in 0..limits.max_endpoint_attempts {
            attempts += 1;
            let (start, end) = pick_endpoints(&open, rng);

            scratch.reset();
            if is_reachable(&grid, start, end, &mut scratch) {
                grid.set_cell(start, Cell::Start);
                grid.set_cell(end, Cell::End);
                grid.set_endpoints(start, end);
                return Ok(Maze::at_start(grid));
            }
        }
    }

    Err(GenerateError::GenerationTimeout {
        layouts: limits.max_layouts,
        attempts,
    })
}

/// Check dimensions before any allocation.
pub fn validate_size(width: i32, height: i32) -> Result<(), GenerateError> {
    let in_range = width > 0 && height > 0 && width <= MAX_X && height <= MAX_Y;
    // A solvable maze needs two distinct open interior cells.
    if !in_range || (width - 2).max(0) * (height - 2).max(0) < 2 {
        return Err(GenerateError::InvalidSize { width, height });
    }
    Ok(())
}

/// Redraw every interior cell; the border stays `Wall`.
fn fill_walls<R: Rng + ?Sized>(grid: &mut Grid, rng: &mut R) {
    for y in 1..grid.height() - 1 {
        for x in 1..grid.width() - 1 {
            let cell = if rng.gen_range(0..WALL_ODDS) == 0 {
                Cell::Wall
            } else {
                Cell::Path
            };
            grid.set_cell(Coord::new(x, y), cell);
        }
    }
}

/// Two distinct cells drawn uniformly from `open` (which holds at least two).
fn pick_endpoints<R: Rng + ?Sized>(open: &[Coord], rng: &mut R) -> (Coord, Coord) {
    let start_index = rng.gen_range(0..open.len());
    let mut end_index = rng.gen_range(0..open.len() - 1);
    if end_index >= start_index {
        end_index += 1;
    }
    (open[start_index], open[end_index])
}
