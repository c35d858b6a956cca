//! Per-tick input snapshot
//!
//! The host polls devices and hands the simulation the latest values. No
//! debouncing happens here; fire rate, weapon-switch cooldowns and
//! interact edge detection are handled by the tick itself.

use std::collections::HashSet;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Keyboard keys the game listens to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    W,
    A,
    S,
    D,
    /// Interact (doors, buy stations)
    E,
    /// Reload
    R,
    /// Number row, 1..=9
    Digit(u8),
}

/// Standard-mapping gamepad button indices
pub mod pad {
    pub const A: usize = 0;
    pub const X: usize = 2;
    pub const Y: usize = 3;
    pub const RIGHT_TRIGGER: usize = 7;
}

/// Raw gamepad state for one tick
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GamepadState {
    /// Left stick x/y, right stick x/y
    pub axes: [f32; 4],
    /// Analog button values in 0..=1
    pub buttons: Vec<f32>,
}

impl GamepadState {
    pub fn button(&self, index: usize) -> f32 {
        self.buttons.get(index).copied().unwrap_or(0.0)
    }

    pub fn pressed(&self, index: usize) -> bool {
        self.button(index) > 0.0
    }

    pub fn left_stick(&self) -> Vec2 {
        Vec2::new(self.axes[0], self.axes[1])
    }

    pub fn right_stick(&self) -> Vec2 {
        Vec2::new(self.axes[2], self.axes[3])
    }
}

/// Whether either component of a stick is past the deadzone
pub fn outside_deadzone(stick: Vec2, deadzone: f32) -> bool {
    stick.x.abs() > deadzone || stick.y.abs() > deadzone
}

/// Input commands for a single tick
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TickInput {
    /// Keys currently held
    pub keys: HashSet<Key>,
    /// Pointer position in canvas space
    pub pointer: Option<Vec2>,
    /// Primary mouse button held
    pub mouse_fire: bool,
    /// Wheel movement since last tick; negative is "up"
    pub wheel: f32,
    /// `None` when no controller is connected
    pub gamepad: Option<GamepadState>,
}

impl TickInput {
    pub fn held(&self, key: Key) -> bool {
        self.keys.contains(&key)
    }

    pub fn press(&mut self, key: Key) -> &mut Self {
        self.keys.insert(key);
        self
    }

    fn pad_pressed(&self, button: usize) -> bool {
        self.gamepad.as_ref().is_some_and(|g| g.pressed(button))
    }

    pub fn interact(&self) -> bool {
        self.held(Key::E) || self.pad_pressed(pad::A)
    }

    pub fn reload(&self) -> bool {
        self.held(Key::R) || self.pad_pressed(pad::X)
    }

    pub fn cycle_pad(&self) -> bool {
        self.pad_pressed(pad::Y)
    }

    pub fn trigger(&self, threshold: f32) -> bool {
        self.mouse_fire
            || self
                .gamepad
                .as_ref()
                .is_some_and(|g| g.button(pad::RIGHT_TRIGGER) > threshold)
    }

    /// Lowest held digit slot, zero-based
    pub fn slot(&self) -> Option<usize> {
        (1..=9u8)
            .find(|&d| self.held(Key::Digit(d)))
            .map(|d| usize::from(d - 1))
    }

    /// WASD as a unit-step direction per axis (not normalized)
    pub fn keyboard_move(&self) -> Vec2 {
        let mut v = Vec2::ZERO;
        if self.held(Key::W) {
            v.y -= 1.0;
        }
        if self.held(Key::S) {
            v.y += 1.0;
        }
        if self.held(Key::A) {
            v.x -= 1.0;
        }
        if self.held(Key::D) {
            v.x += 1.0;
        }
        v
    }
}
