//! Room connectivity
//!
//! Rooms become reachable when an open door joins them to a room that is
//! already reachable. The set is re-derived every tick from the player's room,
//! the previous set and the current door flags, propagated to a fixed point.

use std::collections::BTreeSet;

use glam::Vec2;

use super::geometry::{Door, Room};
use crate::consts::DOOR_ADJACENCY_TOLERANCE;

/// Index of the first room containing `pos`
pub fn room_at(pos: Vec2, rooms: &[Room]) -> Option<usize> {
    rooms.iter().position(|r| r.rect.contains(pos))
}

/// Whether `pos` lies inside a room that is currently accessible
pub fn in_accessible_room(pos: Vec2, rooms: &[Room], accessible: &BTreeSet<usize>) -> bool {
    room_at(pos, rooms).is_some_and(|i| accessible.contains(&i))
}

/// Ordered room pairs `(a, b)` joined by `door`
fn joined_pairs<'a>(door: &'a Door, rooms: &'a [Room]) -> impl Iterator<Item = (usize, usize)> + 'a {
    (0..rooms.len()).flat_map(move |i| {
        (0..rooms.len())
            .filter(move |&j| i != j)
            .filter(move |&j| door.joins(&rooms[i].rect, &rooms[j].rect, DOOR_ADJACENCY_TOLERANCE))
            .map(move |j| (i, j))
    })
}

/// Compute the set of rooms reachable from the player.
///
/// Starts from `previous` plus the room containing the player and grows the
/// set through open doors until nothing changes. Doors never close, so the
/// result is always a superset of `previous`.
pub fn accessible_rooms(
    player: Vec2,
    rooms: &[Room],
    doors: &[Door],
    previous: &BTreeSet<usize>,
) -> BTreeSet<usize> {
    let mut accessible = previous.clone();
    if let Some(i) = room_at(player, rooms) {
        accessible.insert(i);
    }

    let links: Vec<(usize, usize)> = doors
        .iter()
        .filter(|d| d.is_open)
        .flat_map(|d| joined_pairs(d, rooms))
        .collect();

    loop {
        let mut grew = false;
        for &(a, b) in &links {
            let has_a = accessible.contains(&a);
            let has_b = accessible.contains(&b);
            if has_a != has_b {
                accessible.insert(if has_a { b } else { a });
                grew = true;
            }
        }
        if !grew {
            break;
        }
    }

    accessible
}
