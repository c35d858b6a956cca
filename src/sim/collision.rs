//! Collision queries against level geometry
//!
//! Every moving entity is treated as an axis-aligned square centered on its
//! position. Walls always block; doors block only while closed.

use glam::Vec2;

use super::geometry::{Door, Wall};

/// Whether a square of side `size` centered at `pos` overlaps any wall or
/// any closed door. Pure: identical arguments always give identical results.
pub fn collides(pos: Vec2, size: f32, walls: &[Wall], doors: &[Door]) -> bool {
    walls.iter().any(|w| w.rect.overlaps_square(pos, size))
        || doors
            .iter()
            .filter(|d| !d.is_open)
            .any(|d| d.rect.overlaps_square(pos, size))
}

/// Outcome of a per-axis move attempt
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisMove {
    pub pos: Vec2,
    pub blocked_x: bool,
    pub blocked_y: bool,
}

impl AxisMove {
    pub fn blocked_any(&self) -> bool {
        self.blocked_x || self.blocked_y
    }

    pub fn blocked_both(&self) -> bool {
        self.blocked_x && self.blocked_y
    }
}

/// Attempt a displacement one axis at a time, X first.
///
/// Each axis is applied only if the square would be clear after it, so a
/// diagonal move into a wall keeps sliding along the free axis.
pub fn slide(pos: Vec2, delta: Vec2, size: f32, walls: &[Wall], doors: &[Door]) -> AxisMove {
    let mut out = pos;

    let try_x = Vec2::new(pos.x + delta.x, pos.y);
    let blocked_x = collides(try_x, size, walls, doors);
    if !blocked_x {
        out.x = try_x.x;
    }

    let try_y = Vec2::new(out.x, pos.y + delta.y);
    let blocked_y = collides(try_y, size, walls, doors);
    if !blocked_y {
        out.y = try_y.y;
    }

    AxisMove {
        pos: out,
        blocked_x,
        blocked_y,
    }
}
