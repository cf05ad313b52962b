//! Shape and colour catalog: the fixed polyomino library and block palette.

use crate::error::EngineError;

/// Largest bounding box side of any catalog shape (matches the drag preview box).
pub const MAX_SHAPE_EXTENT: usize = 5;

/// Block colours, in palette order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockColor {
    Red,
    Orange,
    Yellow,
    Green,
    Blue,
    Navy,
    Purple,
    Pink,
    Cyan,
}

impl BlockColor {
    pub const ALL: [Self; 9] = [
        Self::Red,
        Self::Orange,
        Self::Yellow,
        Self::Green,
        Self::Blue,
        Self::Navy,
        Self::Purple,
        Self::Pink,
        Self::Cyan,
    ];

    /// Palette index 0..9, used by the theme to pick a terminal colour.
    pub fn index(self) -> usize {
        match self {
            Self::Red => 0,
            Self::Orange => 1,
            Self::Yellow => 2,
            Self::Green => 3,
            Self::Blue => 4,
            Self::Navy => 5,
            Self::Purple => 6,
            Self::Pink => 7,
            Self::Cyan => 8,
        }
    }
}

/// A polyomino: relative (dx, dy) offsets from the local origin, normalised so
/// the smallest dx and dy are both 0.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct Shape {
    pub name: &'static str,
    cells: &'static [(i8, i8)],
}

impl Shape {
    pub const fn new(name: &'static str, cells: &'static [(i8, i8)]) -> Self {
        Self { name, cells }
    }

    #[inline]
    pub fn cells(&self) -> &'static [(i8, i8)] {
        self.cells
    }

    /// Bounding box width in cells.
    pub fn width(&self) -> usize {
        self.cells.iter().map(|&(dx, _)| dx as usize + 1).max().unwrap_or(0)
    }

    /// Bounding box height in cells.
    pub fn height(&self) -> usize {
        self.cells.iter().map(|&(_, dy)| dy as usize + 1).max().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }
}

pub static SHAPES: [Shape; 21] = [
    Shape::new("monomino", &[(0, 0)]),
    Shape::new("domino-h", &[(0, 0), (1, 0)]),
    Shape::new("domino-v", &[(0, 0), (0, 1)]),
    Shape::new("diagonal", &[(0, 0), (1, 1)]),
    Shape::new("i3-h", &[(0, 0), (1, 0), (2, 0)]),
    Shape::new("i3-v", &[(0, 0), (0, 1), (0, 2)]),
    Shape::new("l3-a", &[(0, 0), (0, 1), (1, 1)]),
    Shape::new("l3-b", &[(0, 0), (1, 0), (0, 1)]),
    Shape::new("l3-c", &[(0, 0), (1, 0), (1, 1)]),
    Shape::new("l3-d", &[(1, 0), (0, 1), (1, 1)]),
    Shape::new("i4-h", &[(0, 0), (1, 0), (2, 0), (3, 0)]),
    Shape::new("i4-v", &[(0, 0), (0, 1), (0, 2), (0, 3)]),
    Shape::new("o", &[(0, 0), (1, 0), (0, 1), (1, 1)]),
    Shape::new("t", &[(0, 0), (1, 0), (2, 0), (1, 1)]),
    Shape::new("s", &[(1, 0), (2, 0), (0, 1), (1, 1)]),
    Shape::new("z", &[(0, 0), (1, 0), (1, 1), (2, 1)]),
    Shape::new("l", &[(0, 0), (0, 1), (0, 2), (1, 2)]),
    Shape::new("j", &[(1, 0), (1, 1), (0, 2), (1, 2)]),
    Shape::new("i5-h", &[(0, 0), (1, 0), (2, 0), (3, 0), (4, 0)]),
    Shape::new("i5-v", &[(0, 0), (0, 1), (0, 2), (0, 3), (0, 4)]),
    Shape::new(
        "square3",
        &[
            (0, 0),
            (1, 0),
            (2, 0),
            (0, 1),
            (1, 1),
            (2, 1),
            (0, 2),
            (1, 2),
            (2, 2),
        ],
    ),
];

/// Read-only shapes and colours the spawner samples from.
#[derive(Debug, Clone)]
pub struct Catalog {
    shapes: Vec<&'static Shape>,
    colors: Vec<BlockColor>,
}

impl Catalog {
    pub fn new(shapes: Vec<&'static Shape>, colors: Vec<BlockColor>) -> Result<Self, EngineError> {
        if shapes.is_empty() || colors.is_empty() {
            return Err(EngineError::EmptyCatalog);
        }
        Ok(Self { shapes, colors })
    }

    /// Every built-in shape and all nine colours.
    pub fn standard() -> Self {
        Self {
            shapes: SHAPES.iter().collect(),
            colors: BlockColor::ALL.to_vec(),
        }
    }

    /// Keep only shapes whose bounding box fits a `width` x `height` grid.
    pub fn fitting(self, width: usize, height: usize) -> Result<Self, EngineError> {
        let shapes = self
            .shapes
            .into_iter()
            .filter(|s| s.width() <= width && s.height() <= height)
            .collect();
        Self::new(shapes, self.colors)
    }

    #[inline]
    pub fn shapes(&self) -> &[&'static Shape] {
        &self.shapes
    }

    #[inline]
    pub fn colors(&self) -> &[BlockColor] {
        &self.colors
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::standard()
    }
}
