//! Frame driver
//!
//! Owns the game state, the seeded RNG and the audio sink. The host calls
//! `frame` once per animation frame with the frame timestamp; delta time is
//! derived here so the simulation never reads a clock.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::audio::{AudioSink, MusicTrack};
use crate::settings::Settings;
use crate::sim::{Difficulty, GameState, TickInput, TickOutput, reset_state, tick};

/// One play session, from start to game over and any restarts
pub struct Session<A: AudioSink> {
    state: GameState,
    rng: Pcg32,
    audio: A,
}

/// Copy the preferences the simulation reads into a fresh state
fn apply_settings(state: &mut GameState, settings: &Settings) {
    state.gamepad_deadzone = settings.gamepad_deadzone;
    state.damage_flash_enabled = settings.effective_damage_flash();
    state.screen_shake_enabled = settings.effective_screen_shake();
}

impl<A: AudioSink> Session<A> {
    /// Start a session and its background music
    pub fn new(seed: u64, settings: &Settings, controller_index: Option<usize>, mut audio: A) -> Self {
        let mut state = reset_state(controller_index, settings.difficulty);
        apply_settings(&mut state, settings);
        audio.set_volumes(settings.effective_sfx_volume(), settings.effective_music_volume());
        audio.play_music(MusicTrack::PixelShowdown, true);
        log::info!(
            "Session started (seed {}, difficulty {})",
            seed,
            settings.difficulty.as_str()
        );
        Self {
            state,
            rng: Pcg32::seed_from_u64(seed),
            audio,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    /// Advance one frame. `timestamp` is in milliseconds.
    ///
    /// The first frame runs with zero delta time.
    pub fn frame(&mut self, timestamp: f64, input: &TickInput) -> TickOutput {
        let dt = if self.state.last_time > 0.0 {
            ((timestamp - self.state.last_time) / 1000.0).max(0.0) as f32
        } else {
            0.0
        };
        self.state.last_time = timestamp;

        let was_over = self.state.is_player_dead();
        let out = tick(&mut self.state, input, timestamp, dt, &mut self.rng, &mut self.audio);
        if out.game_over && !was_over {
            log::info!(
                "Game over after {} ticks (kills: {})",
                self.state.time_ticks,
                self.state.player.kills
            );
        }
        out
    }

    /// Throw the current state away and start over on the same RNG stream
    pub fn restart(&mut self, difficulty: Difficulty) {
        let fresh = reset_state(self.state.controller_index, difficulty);
        let previous = std::mem::replace(&mut self.state, fresh);
        self.state.gamepad_deadzone = previous.gamepad_deadzone;
        self.state.damage_flash_enabled = previous.damage_flash_enabled;
        self.state.screen_shake_enabled = previous.screen_shake_enabled;
        log::info!("Session restarted ({})", difficulty.as_str());
    }

    /// Stop the music and hand back the sink
    pub fn end(mut self) -> A {
        self.audio.stop_music();
        log::info!("Session ended after {} ticks", self.state.time_ticks);
        self.audio
    }
}
