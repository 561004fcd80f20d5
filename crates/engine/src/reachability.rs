//! Depth-first connectivity test between two grid cells.
//!
//! The traversal uses an explicit stack, so its depth is bounded by the grid
//! area rather than the call stack.

use crate::{Coord, Grid};

/// Orthogonal neighbor offsets, in visiting order.
const NEIGHBORS: [Coord; 4] = [
    Coord::new(1, 0),
    Coord::new(-1, 0),
    Coord::new(0, 1),
    Coord::new(0, -1),
];

/// Same-shape visited flags for one grid.
#[derive(Debug, Clone)]
pub struct VisitedScratch {
    width: i32,
    height: i32,
    visited: Vec<bool>,
}

impl VisitedScratch {
    pub fn for_grid(grid: &Grid) -> Self {
        Self {
            width: grid.width(),
            height: grid.height(),
            visited: vec![false; grid.area()],
        }
    }

    /// Clear every flag so the scratch can be reused.
    pub fn reset(&mut self) {
        self.visited.fill(false);
    }

    pub fn is_visited(&self, at: Coord) -> bool {
        self.index_of(at).is_some_and(|index| self.visited[index])
    }

    /// Mark `at` visited; returns false if it already was (or lies outside).
    fn mark(&mut self, at: Coord) -> bool {
        match self.index_of(at) {
            Some(index) if !self.visited[index] => {
                self.visited[index] = true;
                true
            }
            _ => false,
        }
    }

    fn index_of(&self, at: Coord) -> Option<usize> {
        let inside = at.x >= 0 && at.y >= 0 && at.x < self.width && at.y < self.height;
        inside.then(|| (at.y * self.width + at.x) as usize)
    }
}

/// Returns true if `to` can be reached from `from` through non-wall cells
/// using orthogonal steps.
///
/// Marks every explored cell in `scratch`; reset it before reusing.
///
/// # Panics
/// If `scratch` was not built for a grid of the same shape.
pub fn is_reachable(grid: &Grid, from: Coord, to: Coord, scratch: &mut VisitedScratch) -> bool {
    assert!(
        scratch.width == grid.width() && scratch.height == grid.height(),
        "scratch shape {}x{} does not match grid {}x{}",
        scratch.width,
        scratch.height,
        grid.width(),
        grid.height()
    );

    if !grid.is_open(from) || !scratch.mark(from) {
        return false;
    }

    let mut stack = vec![from];
    while let Some(at) = stack.pop() {
        if at == to {
            return true;
        }
        for offset in NEIGHBORS {
            let next = at + offset;
            if grid.is_open(next) && scratch.mark(next) {
                stack.push(next);
            }
        }
    }

    false
}
