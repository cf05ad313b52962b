//! Grid: cell occupancy, placement legality, row and column clears.

use crate::catalog::{BlockColor, Shape};
use crate::error::EngineError;

/// Single cell: empty or filled with a block colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Filled(BlockColor),
}

impl Cell {
    #[inline]
    pub fn is_empty(self) -> bool {
        self == Self::Empty
    }
}

/// Rows and columns found complete in one detection pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletedLines {
    pub rows: Vec<usize>,
    pub cols: Vec<usize>,
}

impl CompletedLines {
    pub fn count(&self) -> u32 {
        (self.rows.len() + self.cols.len()) as u32
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() && self.cols.is_empty()
    }

    /// True if (x, y) lies on any completed row or column.
    pub fn contains(&self, x: usize, y: usize) -> bool {
        self.rows.contains(&y) || self.cols.contains(&x)
    }
}

/// Board of `height` rows x `width` columns. y=0 is the top row; indexed `[y][x]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    rows: Vec<Vec<Cell>>,
}

impl Grid {
    pub fn new(width: usize, height: usize) -> Result<Self, EngineError> {
        if width == 0 || height == 0 {
            return Err(EngineError::InvalidDimensions { width, height });
        }
        Ok(Self {
            width,
            height,
            rows: vec![vec![Cell::Empty; width]; height],
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<Cell> {
        self.rows.get(y).and_then(|row| row.get(x)).copied()
    }

    /// Read-only view of the cell array, for drawing.
    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn filled_count(&self) -> usize {
        self.rows.iter().flatten().filter(|c| !c.is_empty()).count()
    }

    /// Board coordinate of offset (dx, dy) from anchor (ax, ay), if it is on the board.
    /// Anchors near `i32::MIN`/`i32::MAX` are off the board, not an overflow.
    fn target(&self, ax: i32, ay: i32, dx: i8, dy: i8) -> Option<(usize, usize)> {
        let x = usize::try_from(ax.checked_add(i32::from(dx))?).ok()?;
        let y = usize::try_from(ay.checked_add(i32::from(dy))?).ok()?;
        (x < self.width && y < self.height).then_some((x, y))
    }

    /// True iff every cell of `shape` anchored at (ax, ay) is on the board and empty.
    pub fn can_place(&self, shape: &Shape, ax: i32, ay: i32) -> bool {
        shape.cells().iter().all(|&(dx, dy)| {
            self.target(ax, ay, dx, dy)
                .is_some_and(|(x, y)| self.rows[y][x].is_empty())
        })
    }

    /// Write `color` into every target cell. Re-validates first and writes
    /// nothing if any target is out of bounds or occupied.
    pub fn place(
        &mut self,
        shape: &Shape,
        ax: i32,
        ay: i32,
        color: BlockColor,
    ) -> Result<(), EngineError> {
        if !self.can_place(shape, ax, ay) {
            return Err(EngineError::InvalidPlacement { x: ax, y: ay });
        }
        for &(dx, dy) in shape.cells() {
            if let Some((x, y)) = self.target(ax, ay, dx, dy) {
                self.rows[y][x] = Cell::Filled(color);
            }
        }
        log::debug!("placed {} at ({ax}, {ay}) as {color:?}", shape.name);
        Ok(())
    }

    /// Empty every cell, keeping the dimensions.
    pub fn clear(&mut self) {
        for row in &mut self.rows {
            row.fill(Cell::Empty);
        }
    }

    /// Detection only: every full row and every full column of the current state.
    pub fn completed_lines(&self) -> CompletedLines {
        let rows = (0..self.height)
            .filter(|&y| self.rows[y].iter().all(|c| !c.is_empty()))
            .collect();
        let cols = (0..self.width)
            .filter(|&x| self.rows.iter().all(|row| !row[x].is_empty()))
            .collect();
        CompletedLines { rows, cols }
    }

    /// Lines that placing `shape` at (ax, ay) would complete; empty if the
    /// placement is illegal.
    pub fn completed_lines_after(&self, shape: &Shape, ax: i32, ay: i32) -> CompletedLines {
        let mut probe = self.clone();
        match probe.place(shape, ax, ay, BlockColor::Red) {
            Ok(()) => probe.completed_lines(),
            Err(_) => CompletedLines::default(),
        }
    }

    /// Detect all complete rows and columns against the pre-clear state, then
    /// empty every cell on any of them. Returns the number of lines detected.
    pub fn clear_completed_lines(&mut self) -> u32 {
        let lines = self.completed_lines();
        for &y in &lines.rows {
            self.rows[y].fill(Cell::Empty);
        }
        for &x in &lines.cols {
            for row in &mut self.rows {
                row[x] = Cell::Empty;
            }
        }
        if !lines.is_empty() {
            log::debug!("cleared rows {:?} cols {:?}", lines.rows, lines.cols);
        }
        lines.count()
    }

    /// True if some anchor on the board accepts `shape`.
    pub fn fits_anywhere(&self, shape: &Shape) -> bool {
        let (w, h) = (self.width as i32, self.height as i32);
        (0..h).any(|ay| (0..w).any(|ax| self.can_place(shape, ax, ay)))
    }
}
