//! Game entities and their factories
//!
//! Factories take every input explicitly: position, the id handed out by the
//! caller and, where attributes are randomized, the RNG to draw from.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::weapons::{OwnedWeapon, WeaponKind};
use crate::consts::*;
use crate::direction;

/// Monotonic id source for one entity kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdCounter {
    next: u32,
}

impl IdCounter {
    pub fn allocate(&mut self) -> u32 {
        let id = self.next;
        self.next += 1;
        id
    }
}

/// The player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    /// Facing angle (radians)
    pub angle: f32,
    pub health: f32,
    pub max_health: f32,
    pub kills: u32,
    pub currency: u32,
    pub speed: f32,
    /// Owned weapons in purchase order
    pub weapons: Vec<OwnedWeapon>,
    /// Always one of `weapons`
    pub equipped: WeaponKind,
}

impl Player {
    pub fn new() -> Self {
        Self {
            pos: Vec2::new(PLAYER_START_X, PLAYER_START_Y),
            angle: 0.0,
            health: PLAYER_MAX_HEALTH,
            max_health: PLAYER_MAX_HEALTH,
            kills: 0,
            currency: PLAYER_START_CURRENCY,
            speed: PLAYER_BASE_SPEED,
            weapons: vec![OwnedWeapon::new(WeaponKind::Pistol)],
            equipped: WeaponKind::Pistol,
        }
    }

    pub fn owns(&self, kind: WeaponKind) -> bool {
        self.weapons.iter().any(|w| w.kind == kind)
    }

    pub fn current_weapon(&self) -> Option<&OwnedWeapon> {
        self.weapons.iter().find(|w| w.kind == self.equipped)
    }

    pub fn current_weapon_mut(&mut self) -> Option<&mut OwnedWeapon> {
        let kind = self.equipped;
        self.weapons.iter_mut().find(|w| w.kind == kind)
    }

    fn equipped_index(&self) -> Option<usize> {
        self.weapons.iter().position(|w| w.kind == self.equipped)
    }

    /// Equip the weapon in the given zero-based slot; empty slots are ignored
    pub fn select_slot(&mut self, slot: usize) -> bool {
        match self.weapons.get(slot) {
            Some(w) => {
                self.equipped = w.kind;
                true
            }
            None => false,
        }
    }

    /// Step through owned weapons, wrapping at both ends
    pub fn cycle_weapon(&mut self, forward: bool) {
        let n = self.weapons.len();
        let Some(i) = self.equipped_index() else { return };
        let next = if forward { (i + 1) % n } else { (i + n - 1) % n };
        self.equipped = self.weapons[next].kind;
    }

    /// Add a weapon with a full magazine; returns false if already owned
    pub fn grant_weapon(&mut self, kind: WeaponKind) -> bool {
        if self.owns(kind) {
            return false;
        }
        self.weapons.push(OwnedWeapon::new(kind));
        true
    }

    pub fn heal(&mut self, amount: f32) {
        self.health = (self.health + amount).min(self.max_health);
    }

    /// Apply damage, flooring at zero. Returns true if this killed the player.
    pub fn damage(&mut self, amount: f32) -> bool {
        let was_alive = self.health > 0.0;
        self.health = (self.health - amount).max(0.0);
        was_alive && self.health <= 0.0
    }
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}

/// Enemy navigation mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NavMode {
    /// Chasing the player
    Attacking,
    /// Wandering; only while the player is dead
    Roaming,
}

/// Cosmetic sprite indices, opaque to the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnemyLook {
    pub head: u8,
    pub body: u8,
    pub weapon: u8,
}

/// An enemy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub pos: Vec2,
    pub angle: f32,
    pub health: f32,
    pub max_health: f32,
    pub speed: f32,
    pub mode: NavMode,
    /// Unit vector used while roaming
    pub roam_dir: Vec2,
    /// When `roam_dir` was last picked (ms)
    pub last_roam_change: f64,
    /// How long the current roam direction is held (ms)
    pub roam_hold: f64,
    pub look: EnemyLook,
}

impl Enemy {
    /// Spawn an enemy with randomized speed, sprites and roam direction
    pub fn spawn<R: Rng + ?Sized>(pos: Vec2, id: u32, now: f64, rng: &mut R) -> Self {
        let look = EnemyLook {
            head: rng.random_range(1..=14),
            body: rng.random_range(1..=3),
            weapon: rng.random_range(1..=10),
        };
        let speed = ENEMY_BASE_SPEED + rng.random::<f32>() * ENEMY_SPEED_JITTER;
        let mut enemy = Self {
            id,
            pos,
            angle: 0.0,
            health: ENEMY_MAX_HEALTH,
            max_health: ENEMY_MAX_HEALTH,
            speed,
            mode: NavMode::Attacking,
            roam_dir: Vec2::X,
            last_roam_change: now,
            roam_hold: ROAM_HOLD_MIN_MS,
            look,
        };
        enemy.pick_roam_direction(now, rng);
        enemy
    }

    /// Choose a fresh roam direction and hold time
    pub fn pick_roam_direction<R: Rng + ?Sized>(&mut self, now: f64, rng: &mut R) {
        self.roam_dir = direction(rng.random_range(0.0..TAU));
        self.roam_hold = rng.random_range(ROAM_HOLD_MIN_MS..ROAM_HOLD_MAX_MS);
        self.last_roam_change = now;
    }

    pub fn roam_expired(&self, now: f64) -> bool {
        now - self.last_roam_change > self.roam_hold
    }

    /// Subtract damage, flooring at zero. Returns true if the enemy died.
    pub fn take_damage(&mut self, amount: f32) -> bool {
        self.health = (self.health - amount).max(0.0);
        self.health <= 0.0
    }
}

/// A projectile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bullet {
    pub id: u32,
    pub pos: Vec2,
    /// Displacement per 60 Hz frame
    pub vel: Vec2,
}

impl Bullet {
    pub fn new(pos: Vec2, angle: f32, speed: f32, id: u32) -> Self {
        Self {
            id,
            pos,
            vel: direction(angle) * speed,
        }
    }

    pub fn in_world(&self) -> bool {
        self.pos.x > 0.0 && self.pos.x < WORLD_WIDTH && self.pos.y > 0.0 && self.pos.y < WORLD_HEIGHT
    }
}

/// Particle colors (0xRRGGBB)
pub mod colors {
    pub const MUZZLE: u32 = 0xffff00;
    pub const BLOOD: u32 = 0xff0000;
    pub const DOOR: u32 = 0x00ff00;
    pub const MONEY: u32 = 0x00ff00;
    pub const AMMO: u32 = 0xffaa00;
    pub const POWERUP: u32 = 0xff00ff;
}

/// A decaying visual-feedback particle. Never read by gameplay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub id: u32,
    pub pos: Vec2,
    /// Displacement per 60 Hz frame, damped every frame
    pub vel: Vec2,
    /// Remaining life in 60 Hz frames
    pub life: f32,
    pub max_life: f32,
    pub size: f32,
    pub color: u32,
}

impl Particle {
    /// A radial burst of `count` particles
    pub fn burst<R: Rng + ?Sized>(
        pos: Vec2,
        count: u32,
        color: u32,
        ids: &mut IdCounter,
        rng: &mut R,
    ) -> Vec<Particle> {
        (0..count)
            .map(|_| {
                let angle = rng.random_range(0.0..TAU);
                let speed = rng.random_range(1.0..4.0);
                Particle {
                    id: ids.allocate(),
                    pos,
                    vel: direction(angle) * speed,
                    life: PARTICLE_LIFE,
                    max_life: PARTICLE_LIFE,
                    size: rng.random_range(2.0..5.0),
                    color,
                }
            })
            .collect()
    }

    /// Advance by `frames` 60 Hz frames
    pub fn age(&mut self, frames: f32) {
        self.pos += self.vel * frames;
        self.vel *= PARTICLE_DAMPING.powf(frames);
        self.life -= frames;
    }

    pub fn is_alive(&self) -> bool {
        self.life > 0.0
    }
}

/// What a drop grants on pickup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DropKind {
    /// Half a magazine for the equipped weapon
    Ammo,
    /// Flat currency grant
    Money,
    /// Timed speed boost
    Powerup,
}

impl DropKind {
    /// Weighted pick: 40% ammo, 35% money, 25% powerup
    pub fn from_roll(roll: f32) -> Self {
        if roll < 0.4 {
            DropKind::Ammo
        } else if roll < 0.75 {
            DropKind::Money
        } else {
            DropKind::Powerup
        }
    }
}

/// A pickup left behind by a dead enemy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemDrop {
    pub id: u32,
    pub pos: Vec2,
    pub kind: DropKind,
    pub spawned_at: f64,
    pub size: f32,
}

impl ItemDrop {
    pub fn roll<R: Rng + ?Sized>(pos: Vec2, now: f64, id: u32, rng: &mut R) -> Self {
        Self {
            id,
            pos,
            kind: DropKind::from_roll(rng.random()),
            spawned_at: now,
            size: DROP_SIZE,
        }
    }

    pub fn expired(&self, now: f64) -> bool {
        now - self.spawned_at > DROP_LIFETIME_MS
    }
}

/// What a buy station sells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StationKind {
    Weapon(WeaponKind),
    Health,
    /// Refills the equipped weapon's magazine
    Ammo,
}

/// A static shop point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BuyStation {
    pub pos: Vec2,
    pub kind: StationKind,
    pub cost: u32,
    pub size: f32,
}

impl BuyStation {
    pub fn new(pos: Vec2, kind: StationKind, cost: u32) -> Self {
        Self {
            pos,
            kind,
            cost,
            size: BUY_STATION_SIZE,
        }
    }

    pub fn weapon(pos: Vec2, weapon: WeaponKind) -> Self {
        Self::new(pos, StationKind::Weapon(weapon), weapon.cost())
    }

    pub fn health(pos: Vec2) -> Self {
        Self::new(pos, StationKind::Health, HEALTH_STATION_COST)
    }

    /// Prompt label, e.g. `WEAPON (RIFLE)`
    pub fn label(&self) -> String {
        match self.kind {
            StationKind::Weapon(w) => format!("WEAPON ({})", w.name()),
            StationKind::Health => "HEALTH".to_string(),
            StationKind::Ammo => "AMMO".to_string(),
        }
    }

    /// Whether the player at `pos` is close enough to use this station
    pub fn in_reach(&self, pos: Vec2) -> bool {
        pos.distance(self.pos) < self.size + PLAYER_SIZE
    }
}
