//! Core geometry types: Offset, Size, Region.
//!
//! Element rectangles are supplied by the host's layout pass in CSS pixels.
//! The runtime only reads them (hit-testing, floating placement) and writes
//! the computed top/left of floating panels back.

// ---------------------------------------------------------------------------
// Offset
// ---------------------------------------------------------------------------

/// A 2D position or displacement in pixels.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Offset {
    pub x: i32,
    pub y: i32,
}

impl Offset {
    /// Create a new offset.
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

// ---------------------------------------------------------------------------
// Size
// ---------------------------------------------------------------------------

/// A 2D size in pixels (width x height).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    /// A zero-sized size.
    pub const ZERO: Size = Size { width: 0, height: 0 };

    /// Create a new size.
    #[inline]
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

// ---------------------------------------------------------------------------
// Region
// ---------------------------------------------------------------------------

/// A rectangle defined by its top-left corner and size.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Region {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Region {
    /// An empty region at the origin.
    pub const EMPTY: Region = Region { x: 0, y: 0, width: 0, height: 0 };

    /// Create a new region.
    #[inline]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// The right edge (exclusive): `x + width`.
    #[inline]
    pub const fn right(self) -> i32 {
        self.x + self.width
    }

    /// The bottom edge (exclusive): `y + height`.
    #[inline]
    pub const fn bottom(self) -> i32 {
        self.y + self.height
    }

    /// The top-left corner as an [`Offset`].
    #[inline]
    pub const fn offset(self) -> Offset {
        Offset { x: self.x, y: self.y }
    }

    /// The dimensions as a [`Size`].
    #[inline]
    pub const fn size(self) -> Size {
        Size { width: self.width, height: self.height }
    }

    /// Whether the region has no area.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Whether the point (x, y) lies inside this region.
    #[inline]
    pub const fn contains(self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
