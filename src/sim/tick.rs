//! Per-frame simulation tick
//!
//! One call advances every system in a fixed order. Later steps see the
//! results of earlier ones within the same tick.

use std::collections::HashSet;
use std::f32::consts::FRAC_PI_2;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::{collides, slide};
use super::entities::{
    Bullet, DropKind, Enemy, ItemDrop, NavMode, Particle, StationKind, colors,
};
use super::geometry::{Door, Wall};
use super::input::{TickInput, outside_deadzone};
use super::rooms::{accessible_rooms, in_accessible_room};
use super::state::{Difficulty, GamePhase, GameState, PowerupState, ReloadState};
use super::weapons::WeaponKind;
use crate::audio::{AudioSink, SoundEffect};
use crate::consts::*;
use crate::{direction, frame_scale, heading};

/// Interaction prompt for the HUD
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Prompt {
    /// Standing at a closed door
    Door { cost: u32 },
    /// Standing at a buy station
    Buy {
        label: String,
        cost: u32,
        weapon: Option<WeaponKind>,
    },
}

/// Advisory outputs for the HUD, produced once per tick
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickOutput {
    pub prompt: Option<Prompt>,
    pub reload_prompt: bool,
    pub controller_connected: bool,
    pub minimap_revision: u64,
    pub game_over: bool,
}

/// Advance the game state by one frame.
///
/// `now` is the frame timestamp in milliseconds and `dt` the seconds since the
/// previous frame. Per-frame tunables are scaled against a 60 Hz baseline.
pub fn tick<R: Rng + ?Sized>(
    state: &mut GameState,
    input: &TickInput,
    now: f64,
    dt: f32,
    rng: &mut R,
    audio: &mut dyn AudioSink,
) -> TickOutput {
    state.time_ticks += 1;
    let previous_health = state.last_health;

    refresh_rooms(state);

    let alive = !state.is_player_dead();
    let prompt = if alive {
        interact(state, input, rng, audio)
    } else {
        None
    };
    if alive {
        update_reload(state, input, now, audio);
        switch_weapon(state, input, now);
        aim(state, input);
        fire(state, input, now, rng, audio);
    }

    if now - state.last_enemy_spawn > ENEMY_SPAWN_INTERVAL_MS {
        spawn_enemy(state, now, rng);
        state.last_enemy_spawn = now;
    }

    if alive {
        move_player(state, input, dt);
    }
    state.camera.follow(state.player.pos);

    collect_drops(state, now, rng, audio);
    step_bullets(state, dt);
    resolve_bullet_hits(state, now, rng, audio);
    update_enemies(state, now, dt, rng, audio);

    update_feedback(state, previous_health, dt);
    age_particles(state, dt);
    expire_powerup(state, now);

    state.minimap_revision += 1;

    TickOutput {
        prompt,
        reload_prompt: state.reload_prompt,
        controller_connected: state.controller_index.is_some() && input.gamepad.is_some(),
        minimap_revision: state.minimap_revision,
        game_over: state.is_player_dead(),
    }
}

/// Re-derive the accessible room set from the player's position and doors
pub fn refresh_rooms(state: &mut GameState) {
    state.accessible_rooms = accessible_rooms(
        state.player.pos,
        &state.rooms,
        &state.doors,
        &state.accessible_rooms,
    );
}

fn emit_particles<R: Rng + ?Sized>(
    state: &mut GameState,
    pos: Vec2,
    count: u32,
    color: u32,
    rng: &mut R,
) {
    let burst = Particle::burst(pos, count, color, &mut state.ids.particle, rng);
    state.particles.extend(burst);
}

/// Closest closed door within reach of the player
fn nearest_closed_door(state: &GameState) -> Option<usize> {
    let pos = state.player.pos;
    state
        .doors
        .iter()
        .enumerate()
        .filter(|(_, d)| !d.is_open)
        .map(|(i, d)| (i, pos.distance(d.rect.center())))
        .filter(|&(_, dist)| dist < DOOR_INTERACT_RADIUS)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(i, _)| i)
}

/// Closest buy station within reach of the player
fn nearest_station(state: &GameState) -> Option<usize> {
    let pos = state.player.pos;
    state
        .buy_stations
        .iter()
        .enumerate()
        .filter(|(_, s)| s.in_reach(pos))
        .min_by(|a, b| pos.distance(a.1.pos).total_cmp(&pos.distance(b.1.pos)))
        .map(|(i, _)| i)
}

/// Show prompts for whatever the player stands at and, on a fresh interact
/// press, try to buy it. Doors take priority over stations.
fn interact<R: Rng + ?Sized>(
    state: &mut GameState,
    input: &TickInput,
    rng: &mut R,
    audio: &mut dyn AudioSink,
) -> Option<Prompt> {
    let pressed = input.interact();
    let fresh_press = pressed && !state.interact_held;
    state.interact_held = pressed;

    if let Some(i) = nearest_closed_door(state) {
        let cost = state.doors[i].cost;
        if fresh_press {
            open_door(state, i, rng, audio);
        }
        return Some(Prompt::Door { cost });
    }

    let i = nearest_station(state)?;
    let station = state.buy_stations[i];
    let weapon = match station.kind {
        StationKind::Weapon(w) => Some(w),
        _ => None,
    };
    if fresh_press {
        buy(state, i, rng, audio);
    }
    Some(Prompt::Buy {
        label: station.label(),
        cost: station.cost,
        weapon,
    })
}

fn open_door<R: Rng + ?Sized>(
    state: &mut GameState,
    index: usize,
    rng: &mut R,
    audio: &mut dyn AudioSink,
) {
    let door = state.doors[index];
    if state.player.currency < door.cost {
        log::debug!(
            "door {} costs {}, player has {}",
            door.id,
            door.cost,
            state.player.currency
        );
        return;
    }

    state.player.currency -= door.cost;
    state.doors[index].is_open = true;
    refresh_rooms(state);
    log::info!(
        "door {} opened for {}, accessible rooms: {:?}",
        door.id,
        door.cost,
        state.accessible_rooms
    );

    emit_particles(state, door.rect.center(), 20, colors::DOOR, rng);
    audio.play_sound(SoundEffect::PowerUp);
}

fn buy<R: Rng + ?Sized>(
    state: &mut GameState,
    index: usize,
    rng: &mut R,
    audio: &mut dyn AudioSink,
) {
    let station = state.buy_stations[index];
    if state.player.currency < station.cost {
        return;
    }

    let (sound, color) = match station.kind {
        StationKind::Weapon(w) => {
            if !state.player.grant_weapon(w) {
                // Already owned: nothing to sell
                return;
            }
            log::info!("bought {} (id {}) for {}", w.name(), w.id(), station.cost);
            (SoundEffect::PowerUp, colors::MUZZLE)
        }
        StationKind::Ammo => {
            if let Some(weapon) = state.player.current_weapon_mut() {
                weapon.refill();
            }
            (SoundEffect::PickUp, colors::AMMO)
        }
        StationKind::Health => {
            state.player.heal(HEALTH_STATION_HEAL);
            (SoundEffect::PowerUp, colors::MONEY)
        }
    };

    state.player.currency -= station.cost;
    emit_particles(state, station.pos, 8, color, rng);
    audio.play_sound(sound);
}

/// Start a reload on request and finish one whose timer ran out
fn update_reload(state: &mut GameState, input: &TickInput, now: f64, audio: &mut dyn AudioSink) {
    if input.reload() && !state.reload.is_reloading() {
        let needs_ammo = state.player.current_weapon().is_some_and(|w| !w.is_full());
        if needs_ammo {
            state.reload = ReloadState::Reloading { started_at: now };
            log::debug!("reload started ({})", state.player.equipped.name());
        }
    }

    if let ReloadState::Reloading { started_at } = state.reload {
        if now - started_at >= RELOAD_TIME_MS {
            if let Some(weapon) = state.player.current_weapon_mut() {
                weapon.refill();
                audio.play_sound(weapon.kind.reload_sound());
            }
            state.reload = ReloadState::Idle;
            state.reload_prompt = false;
        }
    }
}

fn switch_weapon(state: &mut GameState, input: &TickInput, now: f64) {
    if let Some(slot) = input.slot() {
        state.player.select_slot(slot);
    }

    if input.wheel != 0.0 && now - state.last_weapon_switch >= WHEEL_SWITCH_DEBOUNCE_MS {
        state.player.cycle_weapon(input.wheel < 0.0);
        state.last_weapon_switch = now;
    }

    if input.cycle_pad() && now - state.last_weapon_switch > PAD_SWITCH_DEBOUNCE_MS {
        state.player.cycle_weapon(true);
        state.last_weapon_switch = now;
    }
}

/// Right stick wins over the mouse when it is pushed past the deadzone
fn aim(state: &mut GameState, input: &TickInput) {
    let stick = input.gamepad.as_ref().map(|g| g.right_stick());
    if let Some(stick) = stick.filter(|s| outside_deadzone(*s, state.gamepad_deadzone)) {
        state.player.angle = heading(stick);
        return;
    }

    if let Some(pointer) = input.pointer {
        let target = state.camera.screen_to_world(pointer);
        state.player.angle = heading(target - state.player.pos);
    }
}

fn fire<R: Rng + ?Sized>(
    state: &mut GameState,
    input: &TickInput,
    now: f64,
    rng: &mut R,
    audio: &mut dyn AudioSink,
) {
    if !input.trigger(TRIGGER_THRESHOLD) {
        return;
    }
    let Some(weapon) = state.player.current_weapon().copied() else {
        return;
    };
    if weapon.ammo == 0 {
        state.reload_prompt = true;
        return;
    }
    if state.reload.is_reloading() || now - state.last_shot <= FIRE_COOLDOWN_MS {
        return;
    }

    let angle = state.player.angle;
    let muzzle = state.player.pos + direction(angle) * MUZZLE_OFFSET;
    let speed = weapon.kind.bullet_speed();

    if weapon.kind.is_spread() {
        for _ in 0..SHOTGUN_PELLETS {
            let spread = rng.random_range(-SHOTGUN_SPREAD..SHOTGUN_SPREAD);
            let id = state.ids.bullet.allocate();
            state.bullets.push(Bullet::new(muzzle, angle + spread, speed, id));
        }
    } else {
        let id = state.ids.bullet.allocate();
        state.bullets.push(Bullet::new(muzzle, angle, speed, id));
    }

    if let Some(w) = state.player.current_weapon_mut() {
        w.ammo -= 1;
    }
    state.last_shot = now;
    emit_particles(state, muzzle, 3, colors::MUZZLE, rng);
    audio.play_sound(weapon.kind.shot_sound());
}

/// Try to place one enemy in a reachable room.
///
/// Falls back to a ring around the player when no room is reachable yet and
/// gives up quietly after a fixed number of attempts.
pub fn spawn_enemy<R: Rng + ?Sized>(state: &mut GameState, now: f64, rng: &mut R) {
    if state.enemies.len() >= MAX_ENEMIES {
        return;
    }

    let candidates: Vec<usize> = state.accessible_rooms.iter().copied().collect();
    let min = Vec2::splat(SPAWN_EDGE_MARGIN);
    let max = Vec2::new(WORLD_WIDTH, WORLD_HEIGHT) - SPAWN_EDGE_MARGIN;

    for _ in 0..SPAWN_ATTEMPTS {
        let candidate = if candidates.is_empty() {
            let angle = rng.random_range(0.0..std::f32::consts::TAU);
            let distance = rng.random_range(SPAWN_RING_MIN..SPAWN_RING_MAX);
            state.player.pos + direction(angle) * distance
        } else {
            let room = state.rooms[candidates[rng.random_range(0..candidates.len())]].rect;
            Vec2::new(
                room.x + rng.random::<f32>() * (room.width - ENEMY_SIZE),
                room.y + rng.random::<f32>() * (room.height - ENEMY_SIZE),
            )
        };
        let pos = candidate.clamp(min, max);

        let clear = !collides(pos, ENEMY_SIZE, &state.walls, &state.doors);
        let reachable = candidates.is_empty()
            || in_accessible_room(pos, &state.rooms, &state.accessible_rooms);
        if clear && reachable {
            let id = state.ids.enemy.allocate();
            state.enemies.push(Enemy::spawn(pos, id, now, rng));
            return;
        }
    }

    log::debug!("no spawn position found after {SPAWN_ATTEMPTS} attempts");
}

/// Keyboard and left stick movement with per-axis wall sliding
fn move_player(state: &mut GameState, input: &TickInput, dt: f32) {
    let mut dir = input.keyboard_move();
    if let Some(pad) = &input.gamepad {
        let stick = pad.left_stick();
        if outside_deadzone(stick, state.gamepad_deadzone) {
            dir += stick;
        }
    }
    if dir == Vec2::ZERO {
        return;
    }

    let delta = dir * state.player.speed * frame_scale(dt);
    let moved = slide(state.player.pos, delta, PLAYER_SIZE, &state.walls, &state.doors);
    state.player.pos = moved.pos.clamp(
        Vec2::splat(PLAYER_SIZE),
        Vec2::new(WORLD_WIDTH, WORLD_HEIGHT) - PLAYER_SIZE,
    );
}

/// Expire old drops and apply the ones the player walks over
fn collect_drops<R: Rng + ?Sized>(
    state: &mut GameState,
    now: f64,
    rng: &mut R,
    audio: &mut dyn AudioSink,
) {
    let drops = std::mem::take(&mut state.drops);
    let mut kept = Vec::with_capacity(drops.len());

    for drop in drops {
        if drop.expired(now) {
            continue;
        }
        if state.player.pos.distance(drop.pos) >= PLAYER_SIZE + drop.size {
            kept.push(drop);
            continue;
        }

        match drop.kind {
            DropKind::Ammo => {
                if let Some(w) = state.player.current_weapon_mut() {
                    w.add_half_mag();
                }
                emit_particles(state, drop.pos, 8, colors::AMMO, rng);
                audio.play_sound(SoundEffect::PickUp);
            }
            DropKind::Money => {
                state.player.currency += MONEY_DROP_VALUE;
                emit_particles(state, drop.pos, 8, colors::MONEY, rng);
                audio.play_sound(SoundEffect::PickUp);
            }
            DropKind::Powerup => {
                state.powerup = PowerupState::Active {
                    until: now + POWERUP_DURATION_MS,
                };
                state.player.speed = PLAYER_BOOSTED_SPEED;
                emit_particles(state, drop.pos, 12, colors::POWERUP, rng);
                audio.play_sound(SoundEffect::PowerUp);
            }
        }
    }

    state.drops = kept;
}

/// Move bullets; wall/door hits and world exits remove them
pub fn step_bullets(state: &mut GameState, dt: f32) {
    let scale = frame_scale(dt);
    let mut spent = HashSet::new();

    for bullet in &mut state.bullets {
        let moved = slide(
            bullet.pos,
            bullet.vel * scale,
            BULLET_SIZE,
            &state.walls,
            &state.doors,
        );
        bullet.pos = moved.pos;
        if moved.blocked_any() || !bullet.in_world() {
            spent.insert(bullet.id);
        }
    }

    state.bullets.retain(|b| !spent.contains(&b.id));
}

/// Resolve bullet/enemy overlaps.
///
/// Each bullet damages at most one enemy, the first live one in id order.
/// Removals are collected first and both collections compacted once.
pub fn resolve_bullet_hits<R: Rng + ?Sized>(
    state: &mut GameState,
    now: f64,
    rng: &mut R,
    audio: &mut dyn AudioSink,
) {
    let mut spent = HashSet::new();
    let mut killed = HashSet::new();
    // (hit position, killed)
    let mut hits = Vec::new();

    for bullet in &state.bullets {
        let target = state
            .enemies
            .iter_mut()
            .filter(|e| !killed.contains(&e.id))
            .find(|e| e.pos.distance(bullet.pos) < ENEMY_SIZE);
        let Some(enemy) = target else { continue };

        spent.insert(bullet.id);
        let dead = enemy.take_damage(BULLET_DAMAGE);
        if dead {
            killed.insert(enemy.id);
        }
        hits.push((enemy.pos, dead));
    }

    for (pos, dead) in hits {
        emit_particles(state, pos, 5, colors::BLOOD, rng);
        if !dead {
            continue;
        }
        state.player.kills += 1;
        state.player.currency += KILL_REWARD;
        emit_particles(state, pos, 15, colors::BLOOD, rng);
        if rng.random::<f32>() < DROP_CHANCE {
            let id = state.ids.drop.allocate();
            state.drops.push(ItemDrop::roll(pos, now, id, rng));
        }
        audio.play_sound(SoundEffect::PowerUp);
    }

    state.bullets.retain(|b| !spent.contains(&b.id));
    state.enemies.retain(|e| !killed.contains(&e.id));
}

/// Per-axis move; when both axes are blocked, try a sidestep perpendicular to
/// `facing`, first to one side, then the other.
fn avoid_obstacles(
    pos: Vec2,
    step: Vec2,
    facing: f32,
    walls: &[Wall],
    doors: &[Door],
) -> (Vec2, bool) {
    let moved = slide(pos, step, ENEMY_SIZE, walls, doors);
    if !moved.blocked_both() {
        return (moved.pos, moved.blocked_any());
    }

    let side = direction(facing + FRAC_PI_2) * ENEMY_SIZE * 0.5;
    let pos = [pos + side, pos - side]
        .into_iter()
        .find(|p| !collides(*p, ENEMY_SIZE, walls, doors))
        .unwrap_or(pos);
    (pos, true)
}

/// Push `target` away from overlapping enemies, skipping pushes that would
/// land in a wall
fn separate(
    index: usize,
    mut target: Vec2,
    enemies: &[Enemy],
    walls: &[Wall],
    doors: &[Door],
) -> Vec2 {
    let origin = enemies[index].pos;
    for (j, other) in enemies.iter().enumerate() {
        if j == index {
            continue;
        }
        let dist = target.distance(other.pos);
        if dist >= ENEMY_SIZE {
            continue;
        }
        let push = direction(heading(origin - other.pos)) * (ENEMY_SIZE - dist) / 2.0;
        let pushed = target + push;
        if !collides(pushed, ENEMY_SIZE, walls, doors) {
            target = pushed;
        }
    }
    target
}

/// Hard always separates. Medium rolls every tick; easy rolls too, but only
/// while chasing.
fn wants_separation<R: Rng + ?Sized>(difficulty: Difficulty, chasing: bool, rng: &mut R) -> bool {
    match difficulty {
        Difficulty::Hard => true,
        Difficulty::Medium => rng.random_bool(SEPARATION_CHANCE),
        Difficulty::Easy => chasing && rng.random_bool(SEPARATION_CHANCE),
    }
}

/// Chase the player while alive, roam once dead
fn update_enemies<R: Rng + ?Sized>(
    state: &mut GameState,
    now: f64,
    dt: f32,
    rng: &mut R,
    audio: &mut dyn AudioSink,
) {
    let scale = frame_scale(dt);
    let player_dead = state.is_player_dead();

    for i in 0..state.enemies.len() {
        if player_dead {
            roam(state, i, now, scale, rng);
        } else {
            chase(state, i, scale, rng, audio);
        }
    }

    let mode = if state.is_player_dead() {
        NavMode::Roaming
    } else {
        NavMode::Attacking
    };
    for enemy in &mut state.enemies {
        enemy.mode = mode;
    }
}

fn chase<R: Rng + ?Sized>(
    state: &mut GameState,
    i: usize,
    scale: f32,
    rng: &mut R,
    audio: &mut dyn AudioSink,
) {
    let enemy = &state.enemies[i];
    let pos = enemy.pos;
    let to_player = state.player.pos - pos;
    let facing = heading(to_player);
    let step = to_player.normalize_or_zero() * enemy.speed * scale;

    let mut target = match state.difficulty {
        Difficulty::Easy => pos + step,
        _ => avoid_obstacles(pos, step, facing, &state.walls, &state.doors).0,
    };
    if wants_separation(state.difficulty, true, rng) {
        target = separate(i, target, &state.enemies, &state.walls, &state.doors);
    }

    let moved = slide(pos, target - pos, ENEMY_SIZE, &state.walls, &state.doors);
    state.enemies[i].angle = facing;
    state.enemies[i].pos = moved.pos;

    if state.is_player_dead() {
        return;
    }
    if moved.pos.distance(state.player.pos) < PLAYER_SIZE + ENEMY_SIZE {
        let killed = state.player.damage(ENEMY_CONTACT_DAMAGE * scale);
        audio.play_sound(SoundEffect::PlayerHit);
        if killed {
            state.phase = GamePhase::GameOver;
            log::info!(
                "player died: {} kills, {} currency",
                state.player.kills,
                state.player.currency
            );
        }
    }
}

fn roam<R: Rng + ?Sized>(state: &mut GameState, i: usize, now: f64, scale: f32, rng: &mut R) {
    if state.enemies[i].roam_expired(now) {
        state.enemies[i].pick_roam_direction(now, rng);
    }

    let enemy = &state.enemies[i];
    let pos = enemy.pos;
    let facing = heading(enemy.roam_dir);
    let step = enemy.roam_dir * enemy.speed * scale;

    let (mut target, blocked) = match state.difficulty {
        Difficulty::Easy => {
            let moved = slide(pos, step, ENEMY_SIZE, &state.walls, &state.doors);
            (moved.pos, moved.blocked_any())
        }
        _ => avoid_obstacles(pos, step, facing, &state.walls, &state.doors),
    };
    if wants_separation(state.difficulty, false, rng) {
        target = separate(i, target, &state.enemies, &state.walls, &state.doors);
    }

    let enemy = &mut state.enemies[i];
    enemy.pos = target;
    if blocked {
        enemy.pick_roam_direction(now, rng);
    }
    enemy.angle = heading(enemy.roam_dir);
}

/// Start flash/shake on health loss, then decay both
fn update_feedback(state: &mut GameState, previous_health: f32, dt: f32) {
    if state.player.health < previous_health {
        if state.damage_flash_enabled {
            state.damage_flash = DAMAGE_FLASH_SECS;
        }
        if state.screen_shake_enabled {
            state.screen_shake = SCREEN_SHAKE_SECS;
        }
    }
    state.damage_flash = (state.damage_flash - dt).max(0.0);
    state.screen_shake = (state.screen_shake - dt).max(0.0);
    state.last_health = state.player.health;
}

fn age_particles(state: &mut GameState, dt: f32) {
    let frames = frame_scale(dt);
    for particle in &mut state.particles {
        particle.age(frames);
    }
    state.particles.retain(|p| p.is_alive());
}

fn expire_powerup(state: &mut GameState, now: f64) {
    if let PowerupState::Active { until } = state.powerup {
        if now > until {
            state.powerup = PowerupState::Inactive;
            state.player.speed = PLAYER_BASE_SPEED;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::audio::RecordingAudio;
    use crate::sim::entities::Enemy;
    use crate::sim::input::{GamepadState, Key};
    use proptest::prelude::*;
    use rand::{RngCore, SeedableRng};
    use rand_pcg::Pcg32;

    const DT: f32 = 1.0 / 60.0;

    /// Returns the same fraction for every float draw
    struct FixedRng(f64);

    impl RngCore for FixedRng {
        fn next_u32(&mut self) -> u32 {
            ((self.0 * f64::from(1u32 << 24)) as u32) << 8
        }

        fn next_u64(&mut self) -> u64 {
            ((self.0 * (1u64 << 53) as f64) as u64) << 11
        }

        fn fill_bytes(&mut self, dst: &mut [u8]) {
            dst.fill(0);
        }
    }

    fn setup() -> (GameState, Pcg32, RecordingAudio) {
        (GameState::new(), Pcg32::seed_from_u64(7), RecordingAudio::default())
    }

    fn held(keys: &[Key]) -> TickInput {
        let mut input = TickInput::default();
        for &k in keys {
            input.press(k);
        }
        input
    }

    fn firing() -> TickInput {
        TickInput {
            mouse_fire: true,
            ..Default::default()
        }
    }

    fn enemy_at(state: &mut GameState, pos: Vec2) -> usize {
        let mut rng = Pcg32::seed_from_u64(99);
        let id = state.ids.enemy.allocate();
        state.enemies.push(Enemy::spawn(pos, id, 0.0, &mut rng));
        state.enemies.len() - 1
    }

    #[test]
    fn test_door_purchase_opens_rooms_same_tick() {
        let (mut state, mut rng, mut audio) = setup();
        state.player.pos = Vec2::new(680.0, 615.0);

        let out = tick(&mut state, &held(&[Key::E]), 1000.0, DT, &mut rng, &mut audio);

        assert!(state.doors[0].is_open);
        assert_eq!(state.player.currency, 0);
        assert_eq!(state.accessible_rooms, BTreeSet::from([0, 1, 2, 3]));
        assert!(audio.played(SoundEffect::PowerUp));
        assert_eq!(state.particles.len(), 20);
        assert_eq!(out.prompt, Some(Prompt::Door { cost: 100 }));
    }

    #[test]
    fn test_door_too_expensive_shows_prompt_only() {
        let (mut state, mut rng, mut audio) = setup();
        state.player.pos = Vec2::new(680.0, 615.0);
        state.player.currency = 40;

        let out = tick(&mut state, &held(&[Key::E]), 1000.0, DT, &mut rng, &mut audio);

        assert_eq!(out.prompt, Some(Prompt::Door { cost: 100 }));
        assert_eq!(state.player.currency, 40);
        assert!(!state.doors[0].is_open);
        assert_eq!(state.accessible_rooms, BTreeSet::from([1]));
    }

    #[test]
    fn test_interact_is_edge_triggered() {
        let (mut state, mut rng, mut audio) = setup();
        state.player.pos = Vec2::new(800.0, 300.0);
        state.player.currency = 200;
        state.player.health = 20.0;
        state.last_health = 20.0;
        let input = held(&[Key::E]);

        let out = tick(&mut state, &input, 1000.0, DT, &mut rng, &mut audio);
        assert_eq!(state.player.health, 70.0);
        assert_eq!(state.player.currency, 125);
        assert!(matches!(out.prompt, Some(Prompt::Buy { cost: 75, .. })));

        tick(&mut state, &input, 1016.0, DT, &mut rng, &mut audio);
        assert_eq!(state.player.currency, 125);

        tick(&mut state, &TickInput::default(), 1032.0, DT, &mut rng, &mut audio);
        tick(&mut state, &input, 1048.0, DT, &mut rng, &mut audio);
        assert_eq!(state.player.health, 100.0);
        assert_eq!(state.player.currency, 50);
    }

    #[test]
    fn test_weapon_station_skips_owned_weapon() {
        let (mut state, mut rng, mut audio) = setup();
        state.player.currency = 300;

        let out = tick(&mut state, &held(&[Key::E]), 1000.0, DT, &mut rng, &mut audio);
        assert!(state.player.owns(WeaponKind::Rifle));
        assert_eq!(state.player.currency, 100);
        assert_eq!(
            out.prompt,
            Some(Prompt::Buy {
                label: "WEAPON (RIFLE)".to_string(),
                cost: 200,
                weapon: Some(WeaponKind::Rifle),
            })
        );

        state.player.currency = 300;
        tick(&mut state, &TickInput::default(), 1016.0, DT, &mut rng, &mut audio);
        tick(&mut state, &held(&[Key::E]), 1032.0, DT, &mut rng, &mut audio);
        assert_eq!(state.player.currency, 300);
        assert_eq!(state.player.weapons.len(), 2);
    }

    #[test]
    fn test_reload_completes_after_delay() {
        let (mut state, mut rng, mut audio) = setup();
        state.last_enemy_spawn = 5000.0;
        state.player.weapons[0].ammo = 0;

        tick(&mut state, &held(&[Key::R]), 1000.0, DT, &mut rng, &mut audio);
        assert_eq!(state.reload, ReloadState::Reloading { started_at: 1000.0 });

        tick(&mut state, &TickInput::default(), 2499.0, DT, &mut rng, &mut audio);
        assert!(state.reload.is_reloading());
        assert_eq!(state.player.weapons[0].ammo, 0);

        tick(&mut state, &TickInput::default(), 2500.0, DT, &mut rng, &mut audio);
        assert_eq!(state.reload, ReloadState::Idle);
        assert_eq!(state.player.weapons[0].ammo, 8);
        assert!(audio.played(SoundEffect::ReloadPistol));
    }

    #[test]
    fn test_reload_ignored_when_full() {
        let (mut state, mut rng, mut audio) = setup();
        tick(&mut state, &held(&[Key::R]), 1000.0, DT, &mut rng, &mut audio);
        assert_eq!(state.reload, ReloadState::Idle);
    }

    #[test]
    fn test_empty_magazine_sets_reload_prompt() {
        let (mut state, mut rng, mut audio) = setup();
        state.player.weapons[0].ammo = 0;

        let out = tick(&mut state, &firing(), 1000.0, DT, &mut rng, &mut audio);
        assert!(out.reload_prompt);
        assert!(state.bullets.is_empty());

        let mut input = firing();
        input.press(Key::R);
        tick(&mut state, &input, 1016.0, DT, &mut rng, &mut audio);
        tick(&mut state, &TickInput::default(), 2600.0, DT, &mut rng, &mut audio);
        assert!(!state.reload_prompt);
    }

    #[test]
    fn test_fire_cooldown() {
        let (mut state, mut rng, mut audio) = setup();
        let input = firing();

        tick(&mut state, &input, 1000.0, DT, &mut rng, &mut audio);
        assert_eq!(state.player.weapons[0].ammo, 7);
        tick(&mut state, &input, 1100.0, DT, &mut rng, &mut audio);
        assert_eq!(state.player.weapons[0].ammo, 7);
        tick(&mut state, &input, 1151.0, DT, &mut rng, &mut audio);
        assert_eq!(state.player.weapons[0].ammo, 6);
        assert!(audio.played(SoundEffect::PistolShot));
    }

    #[test]
    fn test_shotgun_fires_five_pellets_for_one_shell() {
        let (mut state, mut rng, mut audio) = setup();
        state.player.grant_weapon(WeaponKind::Shotgun);
        state.player.equipped = WeaponKind::Shotgun;

        tick(&mut state, &firing(), 1000.0, 0.0, &mut rng, &mut audio);

        assert_eq!(state.bullets.len(), 5);
        assert_eq!(state.player.current_weapon().map(|w| w.ammo), Some(7));
        for bullet in &state.bullets {
            let angle = heading(bullet.vel);
            assert!(angle.abs() <= SHOTGUN_SPREAD + 1e-4);
            assert!((bullet.vel.length() - SHOTGUN_BULLET_SPEED).abs() < 1e-3);
        }
        assert!(audio.played(SoundEffect::ShotgunShot));
    }

    #[test]
    fn test_wheel_switch_is_debounced() {
        let (mut state, mut rng, mut audio) = setup();
        state.player.grant_weapon(WeaponKind::Rifle);
        let input = TickInput {
            wheel: -1.0,
            ..Default::default()
        };

        tick(&mut state, &input, 1000.0, DT, &mut rng, &mut audio);
        assert_eq!(state.player.equipped, WeaponKind::Rifle);
        tick(&mut state, &input, 1100.0, DT, &mut rng, &mut audio);
        assert_eq!(state.player.equipped, WeaponKind::Rifle);
        tick(&mut state, &input, 1250.0, DT, &mut rng, &mut audio);
        assert_eq!(state.player.equipped, WeaponKind::Pistol);
    }

    #[test]
    fn test_digit_selects_slot() {
        let (mut state, mut rng, mut audio) = setup();
        state.player.grant_weapon(WeaponKind::Sniper);
        tick(&mut state, &held(&[Key::Digit(2)]), 1000.0, DT, &mut rng, &mut audio);
        assert_eq!(state.player.equipped, WeaponKind::Sniper);
        tick(&mut state, &held(&[Key::Digit(5)]), 1016.0, DT, &mut rng, &mut audio);
        assert_eq!(state.player.equipped, WeaponKind::Sniper);
    }

    #[test]
    fn test_player_moves_with_keys() {
        let (mut state, mut rng, mut audio) = setup();
        tick(&mut state, &held(&[Key::D]), 1000.0, DT, &mut rng, &mut audio);
        assert!((state.player.pos.x - 203.0).abs() < 1e-3);
        assert_eq!(state.player.pos.y, 1000.0);
    }

    #[test]
    fn test_bullet_moves_one_frame() {
        let (mut state, _, _) = setup();
        state.bullets.push(Bullet::new(Vec2::new(100.0, 100.0), 0.0, 8.0, 0));

        step_bullets(&mut state, DT);

        assert_eq!(state.bullets.len(), 1);
        assert!((state.bullets[0].pos - Vec2::new(108.0, 100.0)).length() < 1e-3);
    }

    #[test]
    fn test_bullet_removed_when_leaving_world() {
        let (mut state, _, _) = setup();
        state.walls.clear();
        state.bullets.push(Bullet::new(Vec2::new(2996.0, 100.0), 0.0, 8.0, 0));
        state.bullets.push(Bullet::new(Vec2::new(4.0, 100.0), std::f32::consts::PI, 8.0, 1));

        step_bullets(&mut state, DT);
        assert!(state.bullets.is_empty());
    }

    #[test]
    fn test_bullet_stopped_by_wall() {
        let (mut state, _, _) = setup();
        state.bullets.push(Bullet::new(Vec2::new(695.0, 100.0), 0.0, 8.0, 0));
        step_bullets(&mut state, DT);
        assert!(state.bullets.is_empty());
    }

    fn kill_with_roll(roll: f64) -> GameState {
        let (mut state, _, mut audio) = setup();
        let pos = Vec2::new(400.0, 1200.0);
        let i = enemy_at(&mut state, pos);
        state.enemies[i].health = 10.0;
        state.bullets.push(Bullet::new(pos, 0.0, 8.0, 0));

        resolve_bullet_hits(&mut state, 1000.0, &mut FixedRng(roll), &mut audio);
        assert!(audio.played(SoundEffect::PowerUp));
        state
    }

    #[test]
    fn test_kill_below_drop_chance_leaves_drop() {
        let state = kill_with_roll(0.59);
        assert!(state.enemies.is_empty());
        assert!(state.bullets.is_empty());
        assert_eq!(state.player.kills, 1);
        assert_eq!(state.player.currency, 125);
        assert_eq!(state.drops.len(), 1);
        assert_eq!(state.drops[0].kind, DropKind::Money);
        assert_eq!(state.particles.len(), 20);
    }

    #[test]
    fn test_kill_above_drop_chance_leaves_nothing() {
        let state = kill_with_roll(0.61);
        assert_eq!(state.player.kills, 1);
        assert!(state.drops.is_empty());
    }

    #[test]
    fn test_bullet_damages_only_one_enemy() {
        let (mut state, mut rng, mut audio) = setup();
        let pos = Vec2::new(400.0, 1200.0);
        enemy_at(&mut state, pos);
        enemy_at(&mut state, pos + Vec2::new(2.0, 0.0));
        state.bullets.push(Bullet::new(pos, 0.0, 8.0, 0));

        resolve_bullet_hits(&mut state, 1000.0, &mut rng, &mut audio);

        assert!(state.bullets.is_empty());
        assert_eq!(state.enemies.len(), 2);
        assert_eq!(state.enemies[0].health, 20.0);
        assert_eq!(state.enemies[1].health, 30.0);
    }

    #[test]
    fn test_spawn_lands_in_accessible_room() {
        let (mut state, mut rng, _) = setup();
        for _ in 0..5 {
            spawn_enemy(&mut state, 3000.0, &mut rng);
        }
        assert_eq!(state.enemies.len(), 5);
        for enemy in &state.enemies {
            assert!(in_accessible_room(enemy.pos, &state.rooms, &state.accessible_rooms));
            assert!(!collides(enemy.pos, ENEMY_SIZE, &state.walls, &state.doors));
        }
    }

    #[test]
    fn test_spawn_respects_cap() {
        let (mut state, mut rng, _) = setup();
        for _ in 0..MAX_ENEMIES {
            enemy_at(&mut state, Vec2::new(400.0, 1200.0));
        }
        spawn_enemy(&mut state, 3000.0, &mut rng);
        assert_eq!(state.enemies.len(), MAX_ENEMIES);
    }

    #[test]
    fn test_spawn_timer_drives_spawning() {
        let (mut state, mut rng, mut audio) = setup();
        tick(&mut state, &TickInput::default(), 1000.0, DT, &mut rng, &mut audio);
        assert!(state.enemies.is_empty());
        tick(&mut state, &TickInput::default(), 2001.0, DT, &mut rng, &mut audio);
        assert_eq!(state.enemies.len(), 1);
        assert_eq!(state.last_enemy_spawn, 2001.0);
    }

    #[test]
    fn test_contact_damage_triggers_feedback() {
        let (mut state, mut rng, mut audio) = setup();
        let pos = state.player.pos;
        enemy_at(&mut state, pos);

        tick(&mut state, &TickInput::default(), 1000.0, DT, &mut rng, &mut audio);

        assert!((state.player.health - 99.5).abs() < 1e-4);
        assert!(state.damage_flash > 0.45);
        assert!(state.screen_shake > 0.1);
        assert!(audio.played(SoundEffect::PlayerHit));

        tick(&mut state, &TickInput::default(), 1016.0, 1.0, &mut rng, &mut audio);
        state.enemies.clear();
        tick(&mut state, &TickInput::default(), 1032.0, 1.0, &mut rng, &mut audio);
        assert_eq!(state.damage_flash, 0.0);
        assert_eq!(state.screen_shake, 0.0);
    }

    #[test]
    fn test_death_switches_enemies_to_roaming() {
        let (mut state, mut rng, mut audio) = setup();
        let pos = state.player.pos;
        enemy_at(&mut state, pos);
        state.player.health = 0.1;

        let out = tick(&mut state, &TickInput::default(), 1000.0, DT, &mut rng, &mut audio);

        assert!(out.game_over);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.player.health, 0.0);
        assert!(state.enemies.iter().all(|e| e.mode == NavMode::Roaming));

        // A dead player no longer moves or fires
        let mut input = firing();
        input.press(Key::D);
        tick(&mut state, &input, 1500.0, DT, &mut rng, &mut audio);
        assert_eq!(state.player.pos, pos);
        assert_eq!(state.player.weapons[0].ammo, 8);
    }

    #[test]
    fn test_drop_pickups() {
        let (mut state, mut rng, mut audio) = setup();
        let pos = state.player.pos;
        state.drops.push(ItemDrop {
            id: 0,
            pos,
            kind: DropKind::Money,
            spawned_at: 900.0,
            size: DROP_SIZE,
        });
        state.drops.push(ItemDrop {
            id: 1,
            pos: pos + Vec2::new(5.0, 0.0),
            kind: DropKind::Powerup,
            spawned_at: 900.0,
            size: DROP_SIZE,
        });
        state.drops.push(ItemDrop {
            id: 2,
            pos: Vec2::new(500.0, 1500.0),
            kind: DropKind::Ammo,
            spawned_at: 900.0,
            size: DROP_SIZE,
        });

        tick(&mut state, &TickInput::default(), 1000.0, DT, &mut rng, &mut audio);

        assert_eq!(state.player.currency, 150);
        assert!(state.powerup.is_active());
        assert_eq!(state.player.speed, PLAYER_BOOSTED_SPEED);
        assert_eq!(state.drops.len(), 1);
        assert!(audio.played(SoundEffect::PickUp));

        // Unclaimed drop times out
        state.last_enemy_spawn = 8000.0;
        tick(&mut state, &TickInput::default(), 7901.0, DT, &mut rng, &mut audio);
        assert!(state.drops.is_empty());
    }

    #[test]
    fn test_powerup_expires() {
        let (mut state, mut rng, mut audio) = setup();
        state.powerup = PowerupState::Active { until: 1000.0 };
        state.player.speed = PLAYER_BOOSTED_SPEED;

        tick(&mut state, &TickInput::default(), 1000.0, DT, &mut rng, &mut audio);
        assert!(state.powerup.is_active());
        tick(&mut state, &TickInput::default(), 1001.0, DT, &mut rng, &mut audio);
        assert_eq!(state.powerup, PowerupState::Inactive);
        assert_eq!(state.player.speed, PLAYER_BASE_SPEED);
    }

    #[test]
    fn test_minimap_revision_bumps_every_tick() {
        let (mut state, mut rng, mut audio) = setup();
        let a = tick(&mut state, &TickInput::default(), 1000.0, DT, &mut rng, &mut audio);
        let b = tick(&mut state, &TickInput::default(), 1016.0, DT, &mut rng, &mut audio);
        assert_eq!(b.minimap_revision, a.minimap_revision + 1);
        assert_eq!(state.time_ticks, 2);
    }

    fn gap_after(difficulty: Difficulty, ticks: u32) -> f32 {
        let (mut state, mut rng, mut audio) = setup();
        state.difficulty = difficulty;
        state.last_enemy_spawn = 1e12;
        let pos = Vec2::new(500.0, 1400.0);
        enemy_at(&mut state, pos);
        enemy_at(&mut state, pos);

        for frame in 0..ticks {
            let now = 1000.0 + f64::from(frame) * 1000.0 / 60.0;
            tick(&mut state, &TickInput::default(), now, DT, &mut rng, &mut audio);
        }
        state.enemies[0].pos.distance(state.enemies[1].pos)
    }

    #[test]
    fn test_hard_enemies_separate_immediately() {
        assert!(gap_after(Difficulty::Hard, 1) > 1.0);
    }

    #[test]
    fn test_easy_chasers_spread_apart() {
        assert!(gap_after(Difficulty::Easy, 60) > 1.0);
    }

    #[test]
    fn test_separation_pushes_overlapping_enemies_apart() {
        let mut rng = Pcg32::seed_from_u64(3);
        let enemies = vec![
            Enemy::spawn(Vec2::new(500.0, 1400.0), 0, 0.0, &mut rng),
            Enemy::spawn(Vec2::new(510.0, 1400.0), 1, 0.0, &mut rng),
        ];

        let target = separate(0, enemies[0].pos, &enemies, &[], &[]);
        assert!((target - Vec2::new(493.0, 1400.0)).length() < 1e-4);

        // A push that would end inside a wall is dropped
        let walls = [Wall::new(475.0, 1300.0, 10.0, 200.0)];
        let target = separate(0, enemies[0].pos, &enemies, &walls, &[]);
        assert_eq!(target, enemies[0].pos);
    }

    #[test]
    fn test_sidestep_when_both_axes_blocked() {
        let walls = [
            // Right of the enemy, blocks the X move
            Wall::new(113.0, 60.0, 10.0, 80.0),
            // Below and to the right, blocks the Y move
            Wall::new(105.0, 113.0, 35.0, 10.0),
        ];
        let pos = Vec2::new(100.0, 100.0);
        let step = Vec2::new(3.0, 3.0);
        let facing = heading(step);

        let moved = slide(pos, step, ENEMY_SIZE, &walls, &[]);
        assert!(moved.blocked_both());

        let (target, blocked) = avoid_obstacles(pos, step, facing, &walls, &[]);
        assert!(blocked);
        let expected = pos + direction(facing + FRAC_PI_2) * ENEMY_SIZE * 0.5;
        assert!((target - expected).length() < 1e-4);
        assert!(!collides(target, ENEMY_SIZE, &walls, &[]));
    }

    #[test]
    fn test_sidestep_gives_up_when_boxed_in() {
        let walls = [
            Wall::new(113.0, 0.0, 10.0, 200.0),
            Wall::new(0.0, 113.0, 200.0, 10.0),
            Wall::new(0.0, 77.0, 200.0, 10.0),
        ];
        let pos = Vec2::new(100.0, 100.0);
        let (target, blocked) = avoid_obstacles(pos, Vec2::new(3.0, 3.0), FRAC_PI_2 / 2.0, &walls, &[]);
        assert!(blocked);
        assert_eq!(target, pos);
    }

    #[test]
    fn test_roam_picks_new_direction_on_expiry() {
        let (mut state, mut rng, _) = setup();
        state.phase = GamePhase::GameOver;
        let i = enemy_at(&mut state, Vec2::new(400.0, 1200.0));
        state.enemies[i].roam_hold = 2000.0;

        roam(&mut state, i, 1500.0, 1.0, &mut rng);
        assert_eq!(state.enemies[i].last_roam_change, 0.0);

        roam(&mut state, i, 2500.0, 1.0, &mut rng);
        let enemy = &state.enemies[i];
        assert_eq!(enemy.last_roam_change, 2500.0);
        assert!((2000.0..4000.0).contains(&enemy.roam_hold));
        assert!((enemy.angle - heading(enemy.roam_dir)).abs() < 1e-6);
    }

    #[test]
    fn test_roam_repicks_when_blocked() {
        for difficulty in [Difficulty::Easy, Difficulty::Medium] {
            let (mut state, mut rng, _) = setup();
            state.phase = GamePhase::GameOver;
            state.difficulty = difficulty;
            let i = enemy_at(&mut state, Vec2::new(33.0, 1000.0));
            state.enemies[i].speed = 1.5;
            state.enemies[i].roam_dir = Vec2::NEG_X;
            state.enemies[i].roam_hold = 4000.0;

            roam(&mut state, i, 100.0, 1.0, &mut rng);

            let enemy = &state.enemies[i];
            assert_eq!(enemy.pos.x, 33.0);
            assert_eq!(enemy.last_roam_change, 100.0);
            assert!((enemy.angle - heading(enemy.roam_dir)).abs() < 1e-6);
        }
    }

    #[test]
    fn test_right_stick_beats_pointer() {
        let (mut state, _, _) = setup();
        let mut input = TickInput {
            pointer: Some(Vec2::new(0.0, 0.0)),
            gamepad: Some(GamepadState {
                axes: [0.0, 0.0, 0.0, 1.0],
                buttons: Vec::new(),
            }),
            ..Default::default()
        };

        aim(&mut state, &input);
        assert!((state.player.angle - FRAC_PI_2).abs() < 1e-6);

        // Inside the deadzone the pointer takes over
        if let Some(pad) = input.gamepad.as_mut() {
            pad.axes = [0.0, 0.0, 0.1, 0.15];
        }
        aim(&mut state, &input);
        let target = state.camera.screen_to_world(Vec2::ZERO);
        assert!((state.player.angle - heading(target - state.player.pos)).abs() < 1e-6);
    }

    fn scripted_run(seed: u64) -> String {
        let mut state = GameState::new();
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut audio = RecordingAudio::default();
        for frame in 0..600u32 {
            let mut input = TickInput {
                mouse_fire: frame % 7 == 0,
                pointer: Some(Vec2::new(900.0, 400.0)),
                ..Default::default()
            };
            if frame % 90 < 45 {
                input.press(Key::D);
            } else {
                input.press(Key::S);
            }
            let now = 1000.0 + f64::from(frame) * 1000.0 / 60.0;
            tick(&mut state, &input, now, DT, &mut rng, &mut audio);
        }
        state.snapshot_json().expect("serializes")
    }

    #[test]
    fn test_same_seed_same_outcome() {
        assert_eq!(scripted_run(42), scripted_run(42));
    }

    proptest! {
        #[test]
        fn prop_state_stays_in_bounds(
            frames in prop::collection::vec((0u8..16, any::<bool>(), -1i8..=1, any::<bool>()), 1..120),
            seed in any::<u64>(),
            difficulty in prop_oneof![
                Just(Difficulty::Easy),
                Just(Difficulty::Medium),
                Just(Difficulty::Hard),
            ],
        ) {
            let mut state = GameState::new();
            state.difficulty = difficulty;
            state.player.currency = 1000;
            let mut rng = Pcg32::seed_from_u64(seed);
            let mut audio = RecordingAudio::default();
            let keys = [Key::W, Key::A, Key::S, Key::D];

            for (i, (mask, fire, wheel, reload)) in frames.into_iter().enumerate() {
                let mut input = TickInput {
                    mouse_fire: fire,
                    wheel: f32::from(wheel),
                    ..Default::default()
                };
                for (bit, key) in keys.iter().enumerate() {
                    if mask & (1 << bit) != 0 {
                        input.press(*key);
                    }
                }
                if reload {
                    input.press(Key::R);
                }
                let now = 1000.0 + i as f64 * 250.0;
                tick(&mut state, &input, now, DT, &mut rng, &mut audio);

                prop_assert!(state.player.health >= 0.0);
                prop_assert!(state.player.health <= state.player.max_health);
                prop_assert!(state.enemies.len() <= MAX_ENEMIES);
                for e in &state.enemies {
                    prop_assert!(e.health >= 0.0 && e.health <= e.max_health);
                }
                prop_assert!(state.accessible_rooms.contains(&1));
                for w in &state.player.weapons {
                    prop_assert!(w.ammo <= w.mag_size);
                }
                prop_assert!(!collides(state.player.pos, PLAYER_SIZE, &state.walls, &state.doors));
            }
        }
    }
}
