//! Game state and core simulation types
//!
//! Everything a tick reads or writes lives in `GameState`. The renderer and
//! HUD only ever see it by shared reference after the tick returns.

use std::collections::BTreeSet;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entities::{Bullet, BuyStation, Enemy, IdCounter, ItemDrop, Particle, Player};
use super::geometry::{Door, Room, Wall};
use super::level;
use crate::consts::*;

/// Current phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Player alive, enemies chasing
    Playing,
    /// Player dead; terminal until the state is rebuilt
    GameOver,
}

/// Difficulty tier, gating enemy navigation quality.
///
/// Serialized lowercase; parsed case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Difficulty {
    /// Straight-line chasing, occasional separation; no obstacle avoidance
    Easy,
    /// Wall sliding and sidesteps, occasional enemy separation
    #[default]
    Medium,
    /// Wall sliding and sidesteps, separation every tick
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "medium" | "med" | "normal" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }
}

impl TryFrom<String> for Difficulty {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s).ok_or_else(|| format!("unknown difficulty `{s}`"))
    }
}

/// Reload state machine. There is no cancel transition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ReloadState {
    Idle,
    Reloading { started_at: f64 },
}

impl ReloadState {
    pub fn is_reloading(&self) -> bool {
        matches!(self, ReloadState::Reloading { .. })
    }
}

/// Speed boost granted by a powerup drop
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PowerupState {
    Inactive,
    Active { until: f64 },
}

impl PowerupState {
    pub fn is_active(&self) -> bool {
        matches!(self, PowerupState::Active { .. })
    }
}

/// Per-kind id counters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityIds {
    pub enemy: IdCounter,
    pub bullet: IdCounter,
    pub particle: IdCounter,
    pub drop: IdCounter,
}

/// Top-left corner of the visible world region
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub offset: Vec2,
}

impl Camera {
    /// World-space size of the viewport
    pub fn visible_size() -> Vec2 {
        Vec2::new(CANVAS_WIDTH, CANVAS_HEIGHT) / CAMERA_ZOOM
    }

    /// Center on `target`, keeping the viewport inside the world
    pub fn follow(&mut self, target: Vec2) {
        let visible = Self::visible_size();
        let max = Vec2::new(WORLD_WIDTH, WORLD_HEIGHT) - visible;
        self.offset = (target - visible / 2.0).clamp(Vec2::ZERO, max);
    }

    /// Canvas pixel position to world position
    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        self.offset + screen / CAMERA_ZOOM
    }
}

/// Complete game state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub player: Player,
    /// Live entities, in spawn (id) order
    pub enemies: Vec<Enemy>,
    pub bullets: Vec<Bullet>,
    pub particles: Vec<Particle>,
    pub drops: Vec<ItemDrop>,
    /// Level data
    pub buy_stations: Vec<BuyStation>,
    pub walls: Vec<Wall>,
    pub doors: Vec<Door>,
    pub rooms: Vec<Room>,
    /// Rooms reachable from the player; only grows within a session
    pub accessible_rooms: BTreeSet<usize>,
    pub ids: EntityIds,
    /// Timestamps (ms)
    pub last_shot: f64,
    pub last_enemy_spawn: f64,
    pub last_weapon_switch: f64,
    /// Frame timestamp of the previous tick, 0 before the first one
    pub last_time: f64,
    pub reload: ReloadState,
    pub powerup: PowerupState,
    pub camera: Camera,
    /// Seconds of damage flash / screen shake left
    pub damage_flash: f32,
    pub screen_shake: f32,
    /// Whether hits start the flash / shake timers at all
    pub damage_flash_enabled: bool,
    pub screen_shake_enabled: bool,
    /// Player health at the end of the previous tick
    pub last_health: f32,
    pub phase: GamePhase,
    pub difficulty: Difficulty,
    /// Gamepad the host polls, if any
    pub controller_index: Option<usize>,
    pub gamepad_deadzone: f32,
    /// Interact input as seen last tick, for edge detection
    pub interact_held: bool,
    /// Magazine ran dry while trying to fire; cleared by a finished reload
    pub reload_prompt: bool,
    /// Bumped once per tick so the minimap knows to redraw
    pub minimap_revision: u64,
    /// Simulation tick counter
    pub time_ticks: u64,
}

impl GameState {
    /// Fresh state on the fixed map
    pub fn new() -> Self {
        let player = Player::new();
        let last_health = player.health;
        let mut camera = Camera::default();
        camera.follow(player.pos);
        Self {
            player,
            enemies: Vec::new(),
            bullets: Vec::new(),
            particles: Vec::new(),
            drops: Vec::new(),
            buy_stations: level::buy_stations(),
            walls: level::walls(),
            doors: level::doors(),
            rooms: level::rooms(),
            accessible_rooms: BTreeSet::from([level::START_ROOM]),
            ids: EntityIds::default(),
            last_shot: 0.0,
            last_enemy_spawn: 0.0,
            last_weapon_switch: 0.0,
            last_time: 0.0,
            reload: ReloadState::Idle,
            powerup: PowerupState::Inactive,
            camera,
            damage_flash: 0.0,
            screen_shake: 0.0,
            damage_flash_enabled: true,
            screen_shake_enabled: true,
            last_health,
            phase: GamePhase::Playing,
            difficulty: Difficulty::default(),
            controller_index: None,
            gamepad_deadzone: GAMEPAD_DEADZONE,
            interact_held: false,
            reload_prompt: false,
            minimap_revision: 0,
            time_ticks: 0,
        }
    }

    /// Fresh state keeping the host's controller and the chosen difficulty
    pub fn reset(controller_index: Option<usize>, difficulty: Difficulty) -> Self {
        Self {
            controller_index,
            difficulty,
            ..Self::new()
        }
    }

    pub fn is_player_dead(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    /// Serialized snapshot for external renderers and debugging
    pub fn snapshot_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

/// Session boundary: a fresh state with default settings
pub fn create_initial_state() -> GameState {
    GameState::new()
}

/// Session boundary: rebuild from scratch for a restart
pub fn reset_state(controller_index: Option<usize>, difficulty: Difficulty) -> GameState {
    GameState::reset(controller_index, difficulty)
}
