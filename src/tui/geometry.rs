//! Rectangle helpers for drag selection.
//!
//! All coordinates live in the grid's content space: columns and rows
//! measured from the top-left of the scrollable card area, with the scroll
//! offset already added. Bounds are inclusive on every edge so a one-cell
//! drag still touches the card underneath it.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Chebyshev distance, the number of cells the pointer travelled along
    /// its dominant axis.
    pub fn distance(&self, other: Point) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }
}

/// The rubber band drawn while dragging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SelectionBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl SelectionBox {
    pub fn bounds(&self) -> Bounds {
        Bounds {
            left: self.x,
            top: self.y,
            right: self.x + self.width,
            bottom: self.y + self.height,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Bounds {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self { left, top, right, bottom }
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.left && point.x <= self.right && point.y >= self.top && point.y <= self.bottom
    }
}

/// Separating-axis test: the two boxes overlap unless one lies wholly to
/// the left, right, above or below the other. Touching edges count.
pub fn intersects(a: &Bounds, b: &Bounds) -> bool {
    !(a.right < b.left || a.left > b.right || a.bottom < b.top || a.top > b.bottom)
}

/// Axis-aligned box spanned by the drag origin and the current pointer.
pub fn calculate_box(start: Point, current: Point) -> SelectionBox {
    SelectionBox {
        x: start.x.min(current.x),
        y: start.y.min(current.y),
        width: (current.x - start.x).abs(),
        height: (current.y - start.y).abs(),
    }
}
