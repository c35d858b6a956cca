//! Weapon catalog

use serde::{Deserialize, Serialize};

use crate::audio::SoundEffect;
use crate::consts::{BULLET_SPEED, SHOTGUN_BULLET_SPEED};

/// Every weapon the player can own
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WeaponKind {
    Pistol,
    Rifle,
    Shotgun,
    Smg,
    Sniper,
}

impl WeaponKind {
    /// Stable numeric id (also the sprite/HUD index)
    pub fn id(self) -> u32 {
        match self {
            WeaponKind::Pistol => 1,
            WeaponKind::Rifle => 3,
            WeaponKind::Shotgun => 4,
            WeaponKind::Smg => 5,
            WeaponKind::Sniper => 6,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            WeaponKind::Pistol => "PISTOL",
            WeaponKind::Rifle => "RIFLE",
            WeaponKind::Shotgun => "SHOTGUN",
            WeaponKind::Smg => "SMG",
            WeaponKind::Sniper => "SNIPER",
        }
    }

    pub fn mag_size(self) -> u32 {
        match self {
            WeaponKind::Pistol => 8,
            WeaponKind::Rifle => 30,
            WeaponKind::Shotgun => 8,
            WeaponKind::Smg => 50,
            WeaponKind::Sniper => 10,
        }
    }

    /// Price at a weapon station
    pub fn cost(self) -> u32 {
        match self {
            WeaponKind::Pistol => 0,
            WeaponKind::Rifle => 200,
            WeaponKind::Shotgun => 300,
            WeaponKind::Smg => 250,
            WeaponKind::Sniper => 400,
        }
    }

    /// Pellets spawned per trigger pull
    pub fn is_spread(self) -> bool {
        self == WeaponKind::Shotgun
    }

    pub fn bullet_speed(self) -> f32 {
        if self.is_spread() {
            SHOTGUN_BULLET_SPEED
        } else {
            BULLET_SPEED
        }
    }

    pub fn shot_sound(self) -> SoundEffect {
        match self {
            WeaponKind::Pistol => SoundEffect::PistolShot,
            WeaponKind::Rifle | WeaponKind::Smg => SoundEffect::RifleShot,
            WeaponKind::Shotgun => SoundEffect::ShotgunShot,
            WeaponKind::Sniper => SoundEffect::SniperShot,
        }
    }

    pub fn reload_sound(self) -> SoundEffect {
        match self {
            WeaponKind::Pistol => SoundEffect::ReloadPistol,
            WeaponKind::Shotgun => SoundEffect::ReloadShotgun,
            WeaponKind::Rifle | WeaponKind::Smg | WeaponKind::Sniper => SoundEffect::ReloadRifle,
        }
    }
}

/// A weapon in the player's inventory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnedWeapon {
    pub kind: WeaponKind,
    /// Rounds left in the magazine, never above `mag_size`
    pub ammo: u32,
    pub mag_size: u32,
}

impl OwnedWeapon {
    /// A freshly bought weapon comes with a full magazine
    pub fn new(kind: WeaponKind) -> Self {
        Self {
            kind,
            ammo: kind.mag_size(),
            mag_size: kind.mag_size(),
        }
    }

    pub fn is_full(&self) -> bool {
        self.ammo >= self.mag_size
    }

    pub fn refill(&mut self) {
        self.ammo = self.mag_size;
    }

    /// Add half a magazine, capped at capacity
    pub fn add_half_mag(&mut self) {
        self.ammo = (self.ammo + self.mag_size / 2).min(self.mag_size);
    }
}
