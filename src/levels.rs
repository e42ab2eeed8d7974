//! Built-in level catalogue.
//!
//! Levels are static data: the engine mutates only the per-entity flags
//! (collected / dead / broken) of its own copy.

use std::path::Path;

use tracing::warn;

use crate::arena::Arena;
use crate::entities::{
    Collectible, CollectibleKind, Enemy, EnemyKind, Level, Platform, PlatformKind, PowerUp,
    PowerUpKind, Rgb, DEFAULT_GROUND_Y,
};
use crate::error::GameError;

const GROUND_HEIGHT: f32 = 50.0;
const LEDGE_HEIGHT: f32 = 20.0;

fn ground(x: f32, width: f32) -> Platform {
    Platform::new(PlatformKind::Ground, x, DEFAULT_GROUND_Y, width, GROUND_HEIGHT)
}

fn ledge(x: f32, y: f32, width: f32) -> Platform {
    Platform::new(PlatformKind::Floating, x, y, width, LEDGE_HEIGHT)
}

fn crumbling(x: f32, y: f32, width: f32) -> Platform {
    Platform::new(PlatformKind::Breakable, x, y, width, LEDGE_HEIGHT)
}

/// Enemy standing on the main ground line.
fn walker(kind: EnemyKind, x: f32, patrol: f32, speed: f32) -> Enemy {
    let (_, height) = kind.size();
    Enemy::new(kind, x, DEFAULT_GROUND_Y - height, patrol, speed)
}

fn coins(xs: &[f32], y: f32) -> Vec<Collectible> {
    xs.iter().map(|&x| Collectible::new(CollectibleKind::Coin, x, y)).collect()
}

fn haunted_graveyard() -> Level {
    let mut collectibles = coins(&[250.0, 300.0, 350.0, 1000.0, 1050.0, 2050.0, 2100.0], 500.0);
    collectibles.push(Collectible::new(CollectibleKind::Pumpkin, 460.0, 370.0));
    collectibles.push(Collectible::new(CollectibleKind::Candy, 1340.0, 380.0));
    collectibles.push(Collectible::new(CollectibleKind::Pumpkin, 2450.0, 370.0));

    Level {
        id: 1,
        name: "Haunted Graveyard".to_string(),
        platforms: Arena::from(vec![
            ground(0.0, 800.0),
            ground(900.0, 800.0),
            ground(1800.0, 1400.0),
            ledge(400.0, 420.0, 150.0),
            ledge(1000.0, 400.0, 120.0),
            crumbling(1300.0, 430.0, 120.0),
            ledge(2000.0, 380.0, 150.0),
            crumbling(2400.0, 420.0, 120.0),
        ]),
        enemies: Arena::from(vec![
            walker(EnemyKind::Ghost, 600.0, 150.0, 1.0),
            walker(EnemyKind::Skeleton, 1200.0, 200.0, 1.2),
            Enemy::new(EnemyKind::Bat, 1500.0, 350.0, 200.0, 1.5),
            walker(EnemyKind::Ghost, 2200.0, 150.0, 1.0),
        ]),
        collectibles: Arena::from(collectibles),
        power_ups: Arena::from(vec![
            PowerUp::new(PowerUpKind::Speed, 700.0, 480.0),
            PowerUp::new(PowerUpKind::DoubleJump, 2050.0, 330.0),
        ]),
        background_color: Rgb::new(0x1a, 0x00, 0x33),
        gravity: None,
        time_limit: None,
        finish_x: 3000.0,
    }
}

fn spooky_forest() -> Level {
    let mut collectibles = coins(&[300.0, 620.0, 660.0, 1400.0, 1440.0, 2600.0, 2640.0, 3300.0], 500.0);
    collectibles.push(Collectible::new(CollectibleKind::Candy, 860.0, 330.0));
    collectibles.push(Collectible::new(CollectibleKind::Pumpkin, 1860.0, 300.0));
    collectibles.push(Collectible::new(CollectibleKind::Candy, 3050.0, 350.0));

    Level {
        id: 2,
        name: "Spooky Forest".to_string(),
        platforms: Arena::from(vec![
            ground(0.0, 700.0),
            ground(820.0, 600.0),
            ground(1550.0, 500.0),
            ground(2180.0, 1800.0),
            ledge(650.0, 430.0, 140.0),
            crumbling(830.0, 380.0, 100.0),
            ledge(1420.0, 440.0, 110.0),
            crumbling(1800.0, 360.0, 120.0),
            ledge(2050.0, 420.0, 120.0),
            ledge(3000.0, 400.0, 150.0),
        ]),
        enemies: Arena::from(vec![
            walker(EnemyKind::Zombie, 450.0, 180.0, 0.8),
            walker(EnemyKind::Witch, 1000.0, 220.0, 1.4),
            Enemy::new(EnemyKind::Bat, 1650.0, 320.0, 250.0, 1.8),
            walker(EnemyKind::Zombie, 2400.0, 200.0, 1.0),
            walker(EnemyKind::Witch, 2900.0, 250.0, 1.5),
            Enemy::new(EnemyKind::Bat, 3300.0, 330.0, 200.0, 2.0),
        ]),
        collectibles: Arena::from(collectibles),
        power_ups: Arena::from(vec![
            PowerUp::new(PowerUpKind::Invincibility, 1450.0, 390.0),
            PowerUp::new(PowerUpKind::Fireball, 2300.0, 480.0),
        ]),
        background_color: Rgb::new(0x0d, 0x1a, 0x0d),
        gravity: Some(0.45),
        time_limit: None,
        finish_x: 3800.0,
    }
}

fn witchs_castle() -> Level {
    let mut collectibles = coins(&[350.0, 900.0, 940.0, 1700.0, 2500.0, 2540.0, 3600.0, 4100.0], 500.0);
    collectibles.push(Collectible::new(CollectibleKind::Pumpkin, 1230.0, 320.0));
    collectibles.push(Collectible::new(CollectibleKind::Candy, 2080.0, 300.0));
    collectibles.push(Collectible::new(CollectibleKind::Pumpkin, 3380.0, 320.0));

    Level {
        id: 3,
        name: "Witch's Castle".to_string(),
        platforms: Arena::from(vec![
            ground(0.0, 600.0),
            ground(760.0, 400.0),
            ground(1400.0, 450.0),
            ground(2300.0, 700.0),
            ground(3200.0, 1500.0),
            crumbling(620.0, 450.0, 100.0),
            ledge(1180.0, 380.0, 120.0),
            crumbling(1880.0, 420.0, 100.0),
            crumbling(2050.0, 360.0, 100.0),
            crumbling(3020.0, 430.0, 110.0),
            ledge(3330.0, 380.0, 140.0),
        ]),
        enemies: Arena::from(vec![
            walker(EnemyKind::Skeleton, 400.0, 150.0, 1.3),
            walker(EnemyKind::Witch, 850.0, 200.0, 1.6),
            Enemy::new(EnemyKind::Bat, 1300.0, 300.0, 250.0, 2.0),
            walker(EnemyKind::Zombie, 1500.0, 250.0, 1.1),
            walker(EnemyKind::Ghost, 2450.0, 300.0, 1.4),
            walker(EnemyKind::Witch, 2700.0, 200.0, 1.8),
            Enemy::new(EnemyKind::Bat, 3500.0, 300.0, 300.0, 2.2),
            walker(EnemyKind::Skeleton, 3900.0, 300.0, 1.5),
        ]),
        collectibles: Arena::from(collectibles),
        power_ups: Arena::from(vec![
            PowerUp::new(PowerUpKind::DoubleJump, 1200.0, 330.0),
            PowerUp::new(PowerUpKind::Fireball, 2400.0, 480.0),
            PowerUp::new(PowerUpKind::Invincibility, 3380.0, 330.0),
        ]),
        background_color: Rgb::new(0x1a, 0x0d, 0x1a),
        gravity: Some(0.5),
        time_limit: Some(300),
        finish_x: 4500.0,
    }
}

/// Every built-in level in id order.
pub fn catalogue() -> Vec<Level> {
    vec![haunted_graveyard(), spooky_forest(), witchs_castle()]
}

pub fn level_count() -> u32 {
    3
}

/// Look up a level by its 1-based id, falling back to the first level.
pub fn level_by_id(id: u32) -> Level {
    let mut levels = catalogue();
    match levels.iter().position(|level| level.id == id) {
        Some(index) => levels.swap_remove(index),
        None => {
            warn!(id, "unknown level id, using level 1");
            levels.swap_remove(0)
        }
    }
}

pub fn load_level_file(path: &Path) -> Result<Level, GameError> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

/// Thin or densify a level's enemy roster by the difficulty's count factor.
///
/// Below 1.0 the roster is truncated (never to zero if it had enemies);
/// above 1.0 clones of the leading enemies are added mid-patrol, walking
/// the other way.
pub fn scale_enemies(level: &mut Level, factor: f32) {
    let count = level.enemies.len();
    if count == 0 {
        return;
    }
    let target = ((count as f32 * factor).round() as usize).max(1);
    if target == count {
        return;
    }

    let originals: Vec<Enemy> = level.enemies.iter().cloned().collect();
    let scaled: Arena<Enemy> = if target < count {
        originals.into_iter().take(target).collect()
    } else {
        let extras: Vec<Enemy> = (0..target - count)
            .map(|i| {
                let mut twin = originals[i % count].clone();
                twin.body.x = twin.start_x + twin.patrol_distance / 2.0;
                twin.direction = -twin.direction;
                twin
            })
            .collect();
        originals.into_iter().chain(extras).collect()
    };
    level.enemies = scaled;
}
