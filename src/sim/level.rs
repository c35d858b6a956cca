//! The fixed level: nine rooms split by walls, four purchasable doors and
//! the buy stations scattered through them.

use glam::Vec2;

use super::entities::{BuyStation, StationKind};
use super::geometry::{Door, Room, Wall};
use super::weapons::WeaponKind;
use crate::consts::{WORLD_HEIGHT, WORLD_WIDTH};

/// Index of the room the player starts in
pub const START_ROOM: usize = 1;

pub fn walls() -> Vec<Wall> {
    vec![
        // Outer walls
        Wall::new(0.0, 0.0, WORLD_WIDTH, 20.0),
        Wall::new(0.0, WORLD_HEIGHT - 20.0, WORLD_WIDTH, 20.0),
        Wall::new(0.0, 0.0, 20.0, WORLD_HEIGHT),
        Wall::new(WORLD_WIDTH - 20.0, 0.0, 20.0, WORLD_HEIGHT),
        // Left divider
        Wall::new(700.0, 20.0, 30.0, 450.0),
        Wall::new(700.0, 750.0, 30.0, 1230.0),
        // Middle divider
        Wall::new(1500.0, 20.0, 30.0, 550.0),
        Wall::new(1500.0, 900.0, 30.0, 1080.0),
        // Horizontal dividers
        Wall::new(730.0, 600.0, 470.0, 30.0),
        Wall::new(1530.0, 600.0, 470.0, 30.0),
        Wall::new(730.0, 1300.0, 470.0, 30.0),
        Wall::new(1530.0, 1300.0, 470.0, 30.0),
        // Cover
        Wall::new(200.0, 400.0, 250.0, 30.0),
        Wall::new(300.0, 900.0, 30.0, 250.0),
        Wall::new(900.0, 300.0, 30.0, 200.0),
        Wall::new(1100.0, 1100.0, 200.0, 30.0),
        Wall::new(1700.0, 300.0, 250.0, 30.0),
        Wall::new(2200.0, 800.0, 30.0, 300.0),
        Wall::new(2000.0, 1500.0, 300.0, 30.0),
        Wall::new(400.0, 1600.0, 200.0, 30.0),
    ]
}

pub fn doors() -> Vec<Door> {
    vec![
        Door::new(0, 700.0, 450.0, 30.0, 330.0, 100),
        Door::new(1, 1180.0, 600.0, 340.0, 30.0, 150),
        Door::new(2, 1500.0, 550.0, 30.0, 370.0, 200),
        Door::new(3, 1180.0, 1300.0, 340.0, 30.0, 150),
    ]
}

pub fn rooms() -> Vec<Room> {
    vec![
        Room::new(20.0, 20.0, 680.0, 580.0),     // 0: left upper
        Room::new(20.0, 750.0, 680.0, 1230.0),   // 1: left lower (start)
        Room::new(730.0, 20.0, 770.0, 580.0),    // 2: center top
        Room::new(730.0, 630.0, 450.0, 670.0),   // 3: center left middle
        Room::new(1530.0, 630.0, 450.0, 670.0),  // 4: center right middle
        Room::new(730.0, 1330.0, 770.0, 650.0),  // 5: center bottom
        Room::new(1530.0, 20.0, 1450.0, 580.0),  // 6: right top
        Room::new(1530.0, 900.0, 1450.0, 400.0), // 7: right middle
        Room::new(1530.0, 1330.0, 1450.0, 650.0), // 8: right bottom
    ]
}

pub fn buy_stations() -> Vec<BuyStation> {
    let ammo = |x: f32, y: f32, weapon: WeaponKind| {
        BuyStation::new(Vec2::new(x, y), StationKind::Ammo, weapon.cost() / 2)
    };
    vec![
        BuyStation::weapon(Vec2::new(250.0, WORLD_HEIGHT / 2.0), WeaponKind::Rifle),
        BuyStation::health(Vec2::new(800.0, 300.0)),
        BuyStation::weapon(Vec2::new(1800.0, 1400.0), WeaponKind::Shotgun),
        BuyStation::health(Vec2::new(2600.0, 800.0)),
        BuyStation::weapon(Vec2::new(1000.0, 1000.0), WeaponKind::Smg),
        ammo(1300.0, 1700.0, WeaponKind::Rifle),
        ammo(2200.0, 500.0, WeaponKind::Shotgun),
        BuyStation::weapon(Vec2::new(400.0, 200.0), WeaponKind::Sniper),
        ammo(2100.0, 1300.0, WeaponKind::Smg),
    ]
}
