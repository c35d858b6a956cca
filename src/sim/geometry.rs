//! Axis-aligned level geometry
//!
//! Walls, doors and rooms are all plain rectangles in world space with the
//! origin at the top-left corner and +Y pointing down.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Inclusive point containment (points on the border count)
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    /// Strict overlap with a square of side `size` centered at `center`.
    /// Touching edges do not overlap.
    pub fn overlaps_square(&self, center: Vec2, size: f32) -> bool {
        let half = size / 2.0;
        center.x + half > self.x
            && center.x - half < self.right()
            && center.y + half > self.y
            && center.y - half < self.bottom()
    }

    /// Inclusive overlap of the vertical extents
    fn spans_y_of(&self, other: &Rect) -> bool {
        self.bottom() >= other.y && self.y <= other.bottom()
    }

    /// Inclusive overlap of the horizontal extents
    fn spans_x_of(&self, other: &Rect) -> bool {
        self.right() >= other.x && self.x <= other.right()
    }
}

/// Static, always-blocking geometry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Wall {
    pub rect: Rect,
}

impl Wall {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            rect: Rect::new(x, y, width, height),
        }
    }
}

/// Door orientation, derived from its aspect ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoorOrientation {
    /// Taller than wide: joins a room on the left to a room on the right
    Vertical,
    /// Wider than tall: joins a room above to a room below
    Horizontal,
}

/// A purchasable door. Blocks movement until opened; opening is permanent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Door {
    pub id: u32,
    pub rect: Rect,
    pub cost: u32,
    pub is_open: bool,
}

impl Door {
    pub const fn new(id: u32, x: f32, y: f32, width: f32, height: f32, cost: u32) -> Self {
        Self {
            id,
            rect: Rect::new(x, y, width, height),
            cost,
            is_open: false,
        }
    }

    pub fn orientation(&self) -> DoorOrientation {
        if self.rect.width < self.rect.height {
            DoorOrientation::Vertical
        } else {
            DoorOrientation::Horizontal
        }
    }

    /// Whether this door sits between `first` (left/above) and `second`
    /// (right/below), with both room edges within `tolerance` of the door
    /// faces and the door overlapping both rooms along the shared edge.
    pub fn joins(&self, first: &Rect, second: &Rect, tolerance: f32) -> bool {
        let d = &self.rect;
        match self.orientation() {
            DoorOrientation::Vertical => {
                (d.x - first.right()).abs() < tolerance
                    && (second.x - d.right()).abs() < tolerance
                    && d.spans_y_of(first)
                    && d.spans_y_of(second)
            }
            DoorOrientation::Horizontal => {
                (d.y - first.bottom()).abs() < tolerance
                    && (second.y - d.bottom()).abs() < tolerance
                    && d.spans_x_of(first)
                    && d.spans_x_of(second)
            }
        }
    }
}

/// A region enemies may spawn in once it is reachable
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub rect: Rect,
}

impl Room {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            rect: Rect::new(x, y, width, height),
        }
    }
}
