//! Bounded maze grid.
//!
//! Cells are stored row-major. The border is always `Wall`; the generator
//! fills the interior and places the start/end markers.

use crate::generator::GenerateError;
use crate::{Coord, Fnv1a64, MAX_X, MAX_Y};

/// Symbol held by a single grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cell {
    Wall,
    Path,
    Start,
    End,
    /// The client's live position.
    Current,
}

impl Cell {
    /// Display glyph used by the supervisory render.
    pub const fn glyph(self) -> char {
        match self {
            Self::Wall => '#',
            Self::Path => '.',
            Self::Start => 'S',
            Self::End => 'E',
            Self::Current => '*',
        }
    }

    pub const fn is_wall(self) -> bool {
        matches!(self, Self::Wall)
    }
}

/// A `width x height` cell array with fixed start and end coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: i32,
    height: i32,
    cells: Vec<Cell>,
    start: Coord,
    end: Coord,
}

impl Grid {
    /// Create a grid with a solid `Wall` border and an all-`Path` interior.
    ///
    /// Fails with `InvalidSize` when a dimension is not positive or exceeds
    /// `MAX_X`/`MAX_Y`, and with `AllocationFailure` when cell storage
    /// cannot be reserved.
    pub fn new(width: i32, height: i32) -> Result<Self, GenerateError> {
        if width <= 0 || height <= 0 || width > MAX_X || height > MAX_Y {
            return Err(GenerateError::InvalidSize { width, height });
        }

        // Both dimensions are positive and bounded, so the product fits.
        let area = (width * height) as usize;
        let mut cells = Vec::new();
        cells
            .try_reserve_exact(area)
            .map_err(|_| GenerateError::AllocationFailure { cells: area })?;

        for y in 0..height {
            for x in 0..width {
                let border = y == 0 || y == height - 1 || x == 0 || x == width - 1;
                cells.push(if border { Cell::Wall } else { Cell::Path });
            }
        }

        Ok(Self {
            width,
            height,
            cells,
            start: Coord::default(),
            end: Coord::default(),
        })
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// `(width, height)` as a coordinate pair.
    pub fn bounds(&self) -> Coord {
        Coord::new(self.width, self.height)
    }

    pub fn start(&self) -> Coord {
        self.start
    }

    pub fn end(&self) -> Coord {
        self.end
    }

    pub fn contains(&self, at: Coord) -> bool {
        at.x >= 0 && at.y >= 0 && at.x < self.width && at.y < self.height
    }

    pub fn is_border(&self, at: Coord) -> bool {
        at.x == 0 || at.y == 0 || at.x == self.width - 1 || at.y == self.height - 1
    }

    /// Cell at `at`, or `None` outside the grid.
    pub fn cell_at(&self, at: Coord) -> Option<Cell> {
        self.index_of(at).map(|index| self.cells[index])
    }

    /// Returns true if `at` is inside the grid and not a wall.
    pub fn is_open(&self, at: Coord) -> bool {
        self.cell_at(at).is_some_and(|cell| !cell.is_wall())
    }

    /// Overwrite a single cell.
    ///
    /// # Panics
    /// If `at` lies outside the grid. Callers validate coordinates first.
    pub fn set_cell(&mut self, at: Coord, cell: Cell) {
        match self.index_of(at) {
            Some(index) => self.cells[index] = cell,
            None => panic!(
                "set_cell({at}) outside {}x{} grid",
                self.width, self.height
            ),
        }
    }

    /// Iterate every coordinate in row-major order.
    pub fn coords(&self) -> impl Iterator<Item = Coord> + use<> {
        let (width, height) = (self.width, self.height);
        (0..height).flat_map(move |y| (0..width).map(move |x| Coord::new(x, y)))
    }

    /// One byte per cell, row-major: 1 for `Wall`, 0 for anything else.
    pub fn wall_bitmap(&self) -> Vec<u8> {
        self.cells.iter().map(|cell| u8::from(cell.is_wall())).collect()
    }

    /// One string per row using each cell's display glyph.
    pub fn render_rows(&self) -> Vec<String> {
        self.cells
            .chunks(self.width as usize)
            .map(|row| row.iter().map(|cell| cell.glyph()).collect())
            .collect()
    }

    /// FNV-1a 64 digest over the dimensions and the wall bitmap.
    ///
    /// Markers (`Start`, `End`, `Current`) do not contribute, so movement
    /// never changes the digest.
    pub fn layout_digest(&self) -> u64 {
        let mut hasher = Fnv1a64::new();
        hasher.update(&self.width.to_le_bytes());
        hasher.update(&self.height.to_le_bytes());
        hasher.update(&self.wall_bitmap());
        hasher.finish()
    }

    pub(crate) fn set_endpoints(&mut self, start: Coord, end: Coord) {
        self.start = start;
        self.end = end;
    }

    pub(crate) fn index_of(&self, at: Coord) -> Option<usize> {
        if self.contains(at) {
            Some((at.y * self.width + at.x) as usize)
        } else {
            None
        }
    }

    /// Number of cells (`width * height`).
    pub(crate) fn area(&self) -> usize {
        self.cells.len()
    }
}
