//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Time comes in as frame timestamps, never read from a clock
//! - Seeded RNG only, passed in by the caller
//! - Stable iteration order (by entity ID)
//! - No rendering, audio backend or platform dependencies

pub mod collision;
pub mod entities;
pub mod geometry;
pub mod input;
pub mod level;
pub mod rooms;
pub mod state;
pub mod tick;
pub mod weapons;

pub use collision::{AxisMove, collides, slide};
pub use entities::{
    Bullet, BuyStation, DropKind, Enemy, IdCounter, ItemDrop, NavMode, Particle, Player,
    StationKind,
};
pub use geometry::{Door, Rect, Room, Wall};
pub use input::{GamepadState, Key, TickInput};
pub use rooms::{accessible_rooms, in_accessible_room, room_at};
pub use state::{
    Camera, Difficulty, GamePhase, GameState, PowerupState, ReloadState, create_initial_state,
    reset_state,
};
pub use tick::{Prompt, TickOutput, spawn_enemy, tick};
pub use weapons::{OwnedWeapon, WeaponKind};
