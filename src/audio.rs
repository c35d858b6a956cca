//! Audio boundary
//!
//! The simulation never touches audio buffers. It names a cue and hands it
//! to whatever `AudioSink` the host wires in (Web Audio, a native mixer, or
//! nothing at all in tests).

use serde::{Deserialize, Serialize};

/// Sound effect cues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundEffect {
    /// Pistol fired
    PistolShot,
    /// Rifle or SMG fired
    RifleShot,
    /// Shotgun fired
    ShotgunShot,
    /// Sniper fired
    SniperShot,
    /// Enemy touching the player
    PlayerHit,
    /// Ammo or money picked up, ammo bought
    PickUp,
    /// Powerup, door, weapon or health purchase, enemy killed
    PowerUp,
    /// Reload finished (pistol)
    ReloadPistol,
    /// Reload finished (rifle, SMG, sniper)
    ReloadRifle,
    /// Reload finished (shotgun)
    ReloadShotgun,
}

impl SoundEffect {
    /// Asset name understood by the host's sound bank
    pub fn name(self) -> &'static str {
        match self {
            SoundEffect::PistolShot => "pistol",
            SoundEffect::RifleShot => "rifle",
            SoundEffect::ShotgunShot => "shotgun",
            SoundEffect::SniperShot => "sniper",
            SoundEffect::PlayerHit => "player-hit",
            SoundEffect::PickUp => "pick-up",
            SoundEffect::PowerUp => "power-up-1",
            SoundEffect::ReloadPistol => "reload-pistol",
            SoundEffect::ReloadRifle => "reload-rifle",
            SoundEffect::ReloadShotgun => "reload-shotgun",
        }
    }
}

/// Looping background tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MusicTrack {
    /// In-game loop
    PixelShowdown,
}

impl MusicTrack {
    pub fn name(self) -> &'static str {
        match self {
            MusicTrack::PixelShowdown => "pixel-showdown",
        }
    }
}

/// Sink for sound and music cues
pub trait AudioSink {
    /// Fire-and-forget sound effect
    fn play_sound(&mut self, effect: SoundEffect);

    /// Start a music track, replacing whatever is playing
    fn play_music(&mut self, track: MusicTrack, looping: bool);

    /// Stop the current music track
    fn stop_music(&mut self);

    /// Final gains (0.0 - 1.0) for effects and music
    fn set_volumes(&mut self, _sfx: f32, _music: f32) {}
}

/// Discards every cue
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play_sound(&mut self, _effect: SoundEffect) {}
    fn play_music(&mut self, _track: MusicTrack, _looping: bool) {}
    fn stop_music(&mut self) {}
}

/// Logs cues at trace level, for headless runs
#[derive(Debug, Default, Clone, Copy)]
pub struct LogAudio;

impl AudioSink for LogAudio {
    fn play_sound(&mut self, effect: SoundEffect) {
        log::trace!("sound: {}", effect.name());
    }

    fn play_music(&mut self, track: MusicTrack, looping: bool) {
        log::debug!("music: {} (looping: {})", track.name(), looping);
    }

    fn stop_music(&mut self) {
        log::debug!("music stopped");
    }

    fn set_volumes(&mut self, sfx: f32, music: f32) {
        log::debug!("volumes: sfx {:.2}, music {:.2}", sfx, music);
    }
}

/// Records cues in order; handy for asserting on trigger points
#[derive(Debug, Default, Clone)]
pub struct RecordingAudio {
    pub sounds: Vec<SoundEffect>,
    pub music: Option<MusicTrack>,
    /// Last (sfx, music) gains set
    pub volumes: Option<(f32, f32)>,
}

impl RecordingAudio {
    pub fn played(&self, effect: SoundEffect) -> bool {
        self.sounds.contains(&effect)
    }
}

impl AudioSink for RecordingAudio {
    fn play_sound(&mut self, effect: SoundEffect) {
        self.sounds.push(effect);
    }

    fn play_music(&mut self, track: MusicTrack, _looping: bool) {
        self.music = Some(track);
    }

    fn stop_music(&mut self) {
        self.music = None;
    }

    fn set_volumes(&mut self, sfx: f32, music: f32) {
        self.volumes = Some((sfx, music));
    }
}
