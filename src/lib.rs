//! Room Siege - a top-down survival shooter simulation
//!
//! Core modules:
//! - `sim`: Deterministic simulation (movement, collisions, combat, economy)
//! - `audio`: Symbolic sound cues and the audio sink boundary
//! - `settings`: Player preferences persisted as JSON
//! - `session`: Frame driver that owns the state and the seeded RNG

pub mod audio;
pub mod session;
pub mod settings;
pub mod sim;

pub use session::Session;
pub use settings::Settings;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// World dimensions
    pub const WORLD_WIDTH: f32 = 3000.0;
    pub const WORLD_HEIGHT: f32 = 2000.0;

    /// Frame rate the per-frame tunables were authored against
    pub const BASELINE_FPS: f32 = 60.0;

    /// Entity sizes (side of the collision square)
    pub const PLAYER_SIZE: f32 = 24.0;
    pub const ENEMY_SIZE: f32 = 24.0;
    pub const BULLET_SIZE: f32 = 4.0;
    pub const DROP_SIZE: f32 = 12.0;
    pub const BUY_STATION_SIZE: f32 = 40.0;

    /// Player defaults
    pub const PLAYER_START_X: f32 = 200.0;
    pub const PLAYER_START_Y: f32 = WORLD_HEIGHT / 2.0;
    pub const PLAYER_MAX_HEALTH: f32 = 100.0;
    pub const PLAYER_BASE_SPEED: f32 = 3.0;
    pub const PLAYER_BOOSTED_SPEED: f32 = 5.0;
    pub const PLAYER_START_CURRENCY: u32 = 100;

    /// Enemy defaults
    pub const ENEMY_MAX_HEALTH: f32 = 30.0;
    pub const ENEMY_BASE_SPEED: f32 = 1.0;
    pub const ENEMY_SPEED_JITTER: f32 = 0.5;
    pub const MAX_ENEMIES: usize = 15;
    pub const ENEMY_SPAWN_INTERVAL_MS: f64 = 2000.0;
    pub const SPAWN_ATTEMPTS: u32 = 50;
    /// Spawn positions are kept this far from the world edge
    pub const SPAWN_EDGE_MARGIN: f32 = 30.0;
    /// Fallback spawn ring around the player
    pub const SPAWN_RING_MIN: f32 = 400.0;
    pub const SPAWN_RING_MAX: f32 = 600.0;
    /// Contact damage per 60 Hz frame
    pub const ENEMY_CONTACT_DAMAGE: f32 = 0.5;
    pub const ROAM_HOLD_MIN_MS: f64 = 2000.0;
    pub const ROAM_HOLD_MAX_MS: f64 = 4000.0;
    /// Per-tick separation chance below hard difficulty
    pub const SEPARATION_CHANCE: f64 = 0.3;

    /// Combat
    pub const BULLET_DAMAGE: f32 = 10.0;
    pub const BULLET_SPEED: f32 = 8.0;
    pub const SHOTGUN_BULLET_SPEED: f32 = 6.0;
    pub const SHOTGUN_PELLETS: u32 = 5;
    pub const SHOTGUN_SPREAD: f32 = 0.2;
    pub const FIRE_COOLDOWN_MS: f64 = 150.0;
    pub const MUZZLE_OFFSET: f32 = PLAYER_SIZE * 1.2;
    pub const KILL_REWARD: u32 = 25;
    pub const DROP_CHANCE: f32 = 0.6;

    /// Timers
    pub const RELOAD_TIME_MS: f64 = 1500.0;
    pub const WHEEL_SWITCH_DEBOUNCE_MS: f64 = 200.0;
    pub const PAD_SWITCH_DEBOUNCE_MS: f64 = 300.0;
    pub const POWERUP_DURATION_MS: f64 = 5000.0;
    pub const DROP_LIFETIME_MS: f64 = 7000.0;
    pub const DAMAGE_FLASH_SECS: f32 = 0.5;
    pub const SCREEN_SHAKE_SECS: f32 = 0.15;

    /// Economy
    pub const DOOR_INTERACT_RADIUS: f32 = 50.0;
    pub const HEALTH_STATION_COST: u32 = 75;
    pub const HEALTH_STATION_HEAL: f32 = 50.0;
    pub const MONEY_DROP_VALUE: u32 = 50;

    /// Input
    pub const GAMEPAD_DEADZONE: f32 = 0.15;
    pub const TRIGGER_THRESHOLD: f32 = 0.5;

    /// Camera
    pub const CANVAS_WIDTH: f32 = 1200.0;
    pub const CANVAS_HEIGHT: f32 = 800.0;
    pub const CAMERA_ZOOM: f32 = 1.3;

    /// Particles
    pub const PARTICLE_LIFE: f32 = 30.0;
    pub const PARTICLE_DAMPING: f32 = 0.95;

    /// Rooms count as joined by a door within this distance of their edges
    pub const DOOR_ADJACENCY_TOLERANCE: f32 = 20.0;
}

/// Unit vector for an angle in radians
#[inline]
pub fn direction(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

/// Angle of a vector in radians
#[inline]
pub fn heading(v: Vec2) -> f32 {
    v.y.atan2(v.x)
}

/// Scale factor turning per-frame tunables into per-`dt` amounts
#[inline]
pub fn frame_scale(dt: f32) -> f32 {
    dt * consts::BASELINE_FPS
}
