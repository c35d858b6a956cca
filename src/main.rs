//! Room Siege entry point
//!
//! Runs a short headless session with scripted input and logs the outcome.
//! Hosts with a renderer drive `Session::frame` from their own frame loop.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use glam::Vec2;
    use room_siege::Settings;
    use room_siege::audio::LogAudio;
    use room_siege::session::Session;
    use room_siege::sim::{Key, TickInput};

    env_logger::init();
    log::info!("Room Siege (headless) starting...");

    let settings = Settings::load("room-siege-settings.json");
    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(0x5eed);
    let mut session = Session::new(seed, &settings, None, LogAudio);

    // One minute at 60 fps: strafe around the start room and keep shooting
    let frame_ms = 1000.0 / 60.0;
    for frame in 0..3600u32 {
        let mut input = TickInput {
            pointer: Some(Vec2::new(600.0, 400.0)),
            mouse_fire: frame % 4 == 0,
            ..Default::default()
        };
        match (frame / 120) % 4 {
            0 => input.press(Key::D),
            1 => input.press(Key::S),
            2 => input.press(Key::A),
            _ => input.press(Key::W),
        };
        if frame % 300 == 299 {
            input.press(Key::R);
        }

        let out = session.frame(1.0 + f64::from(frame) * frame_ms, &input);
        if out.game_over {
            break;
        }
    }

    let state = session.state();
    log::info!(
        "Finished: {} ticks, {} kills, {} currency, health {:.1}, {} enemies alive",
        state.time_ticks,
        state.player.kills,
        state.player.currency,
        state.player.health,
        state.enemies.len()
    );
    session.end();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The web host drives `Session` directly; nothing to do here
}
