//! Game entity types: plain data, no behaviour beyond small constructors.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::arena::{Arena, Live};
use crate::geometry::{Rect, Vec2};

// ── Colour ────────────────────────────────────────────────────────────────────

/// 24-bit colour, written as `#rrggbb` in level files.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }

    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(digits.get(i..i + 2)?, 16).ok();
        Some(Rgb::new(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Linear mix: `t = 0` keeps `self`, `t = 1` gives `other`.
    pub fn lerp(self, other: Rgb, t: f32) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Rgb::new(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }

    pub fn darken(self, amount: f32) -> Rgb {
        self.lerp(Rgb::BLACK, amount)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl TryFrom<String> for Rgb {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Rgb::from_hex(&value).ok_or_else(|| format!("invalid colour {value:?}"))
    }
}

impl From<Rgb> for String {
    fn from(value: Rgb) -> Self {
        value.to_string()
    }
}

// ── Kinds ─────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnemyKind {
    Ghost,
    /// Flies: bobs vertically on top of its patrol.
    Bat,
    Skeleton,
    Witch,
    Zombie,
}

impl EnemyKind {
    /// Default body size (width, height).
    pub fn size(self) -> (f32, f32) {
        match self {
            EnemyKind::Ghost => (35.0, 40.0),
            EnemyKind::Bat => (30.0, 25.0),
            EnemyKind::Skeleton => (35.0, 40.0),
            EnemyKind::Witch => (35.0, 40.0),
            EnemyKind::Zombie => (36.0, 45.0),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformKind {
    Ground,
    Floating,
    /// Crumbles a short real-time delay after being landed on.
    Breakable,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectibleKind {
    Coin,
    Pumpkin,
    Candy,
}

impl CollectibleKind {
    /// Base points before the difficulty multiplier.
    pub fn value(self) -> u32 {
        match self {
            CollectibleKind::Coin => 10,
            CollectibleKind::Pumpkin => 50,
            CollectibleKind::Candy => 25,
        }
    }

    pub fn size(self) -> f32 {
        match self {
            CollectibleKind::Coin => 24.0,
            CollectibleKind::Pumpkin => 30.0,
            CollectibleKind::Candy => 28.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PowerUpKind {
    Invincibility,
    Speed,
    DoubleJump,
    Fireball,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 4] = [
        PowerUpKind::Invincibility,
        PowerUpKind::Speed,
        PowerUpKind::DoubleJump,
        PowerUpKind::Fireball,
    ];

    pub fn label(self) -> &'static str {
        match self {
            PowerUpKind::Invincibility => "Invincible",
            PowerUpKind::Speed => "Speed Boost",
            PowerUpKind::DoubleJump => "Double Jump",
            PowerUpKind::Fireball => "Fireball",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ParticleKind {
    #[default]
    Normal,
    Ember,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Facing {
    Left,
    Right,
}

impl Facing {
    pub fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }
}

// ── Player ────────────────────────────────────────────────────────────────────

pub const PLAYER_WIDTH: f32 = 32.0;
pub const PLAYER_HEIGHT: f32 = 48.0;
pub const PLAYER_SPAWN: Vec2 = Vec2::new(100.0, 400.0);

/// The player's `body.x` is in screen space; world x is `body.x + scroll`.
#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    pub body: Rect,
    pub velocity: Vec2,
    pub on_ground: bool,
    pub facing: Facing,
    pub invincible: bool,
    pub invincible_timer: u32,
    pub lives: u32,
    pub coins: u32,
    pub power_up: Option<PowerUpKind>,
    pub power_up_timer: u32,
    pub is_jumping: bool,
}

impl Player {
    pub fn spawn(lives: u32) -> Self {
        Player {
            body: Rect::new(PLAYER_SPAWN.x, PLAYER_SPAWN.y, PLAYER_WIDTH, PLAYER_HEIGHT),
            velocity: Vec2::ZERO,
            on_ground: false,
            facing: Facing::Right,
            invincible: false,
            invincible_timer: 0,
            lives,
            coins: 0,
            power_up: None,
            power_up_timer: 0,
            is_jumping: false,
        }
    }

    /// Back to the spawn point at rest; lives, coins and power-up survive.
    pub fn respawn(&mut self) {
        self.body.x = PLAYER_SPAWN.x;
        self.body.y = PLAYER_SPAWN.y;
        self.velocity = Vec2::ZERO;
    }

    pub fn has_power_up(&self, kind: PowerUpKind) -> bool {
        self.power_up == Some(kind)
    }
}

// ── Level entities ────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enemy {
    #[serde(flatten)]
    pub body: Rect,
    #[serde(skip)]
    pub velocity: Vec2,
    #[serde(rename = "type")]
    pub kind: EnemyKind,
    pub start_x: f32,
    pub patrol_distance: f32,
    pub speed: f32,
    #[serde(default = "forward")]
    pub direction: f32,
    #[serde(default)]
    pub dead: bool,
}

fn forward() -> f32 {
    1.0
}

impl Enemy {
    pub fn new(kind: EnemyKind, x: f32, y: f32, patrol_distance: f32, speed: f32) -> Self {
        let (width, height) = kind.size();
        Enemy {
            body: Rect::new(x, y, width, height),
            velocity: Vec2::ZERO,
            kind,
            start_x: x,
            patrol_distance,
            speed,
            direction: 1.0,
            dead: false,
        }
    }
}

impl Live for Enemy {
    fn is_live(&self) -> bool {
        !self.dead
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    #[serde(flatten)]
    pub body: Rect,
    #[serde(rename = "type")]
    pub kind: PlatformKind,
    #[serde(default)]
    pub broken: bool,
}

impl Platform {
    pub fn new(kind: PlatformKind, x: f32, y: f32, width: f32, height: f32) -> Self {
        Platform { body: Rect::new(x, y, width, height), kind, broken: false }
    }
}

impl Live for Platform {
    fn is_live(&self) -> bool {
        !self.broken
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collectible {
    #[serde(flatten)]
    pub body: Rect,
    #[serde(rename = "type")]
    pub kind: CollectibleKind,
    #[serde(default)]
    pub collected: bool,
    pub value: u32,
    #[serde(default)]
    pub bob_offset: f32,
}

impl Collectible {
    pub fn new(kind: CollectibleKind, x: f32, y: f32) -> Self {
        let size = kind.size();
        Collectible {
            body: Rect::new(x, y, size, size),
            kind,
            collected: false,
            value: kind.value(),
            bob_offset: 0.0,
        }
    }
}

impl Live for Collectible {
    fn is_live(&self) -> bool {
        !self.collected
    }
}

pub const POWER_UP_SIZE: f32 = 30.0;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PowerUp {
    #[serde(flatten)]
    pub body: Rect,
    #[serde(rename = "type")]
    pub kind: PowerUpKind,
    #[serde(default)]
    pub collected: bool,
    #[serde(default)]
    pub bob_offset: f32,
}

impl PowerUp {
    pub fn new(kind: PowerUpKind, x: f32, y: f32) -> Self {
        PowerUp {
            body: Rect::new(x, y, POWER_UP_SIZE, POWER_UP_SIZE),
            kind,
            collected: false,
            bob_offset: 0.0,
        }
    }
}

impl Live for PowerUp {
    fn is_live(&self) -> bool {
        !self.collected
    }
}

// ── Transient effects ─────────────────────────────────────────────────────────

/// Spark or ember. Positions are world space.
#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
    pub life: u32,
    pub max_life: u32,
    pub color: Rgb,
    pub size: f32,
    pub kind: ParticleKind,
}

impl Particle {
    /// Remaining life as a fraction, used for fading.
    pub fn alpha(&self) -> f32 {
        if self.max_life == 0 {
            0.0
        } else {
            (self.life as f32 / self.max_life as f32).min(1.0)
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FogParticle {
    pub position: Vec2,
    pub velocity: Vec2,
    pub size: f32,
    pub opacity: f32,
    pub life_time: u32,
}

/// Projectile thrown while the fireball power-up is active.
#[derive(Clone, Debug, PartialEq)]
pub struct Fireball {
    /// World space.
    pub body: Rect,
    pub velocity: Vec2,
    pub life: u32,
}

// ── Level ─────────────────────────────────────────────────────────────────────

pub const DEFAULT_GROUND_Y: f32 = 550.0;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Level {
    pub id: u32,
    pub name: String,
    pub platforms: Arena<Platform>,
    pub enemies: Arena<Enemy>,
    pub collectibles: Arena<Collectible>,
    pub power_ups: Arena<PowerUp>,
    pub background_color: Rgb,
    /// Overrides the global gravity when set.
    #[serde(default)]
    pub gravity: Option<f32>,
    #[serde(default)]
    pub time_limit: Option<u32>,
    pub finish_x: f32,
}

impl Level {
    /// Top of the first platform, which levels use as their main ground line.
    pub fn ground_y(&self) -> f32 {
        self.platforms.first().map(|p| p.body.y).unwrap_or(DEFAULT_GROUND_Y)
    }
}

// ── Session state ─────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum GamePhase {
    #[default]
    Menu,
    Playing,
    Paused,
    GameOver,
    LevelComplete,
}

impl GamePhase {
    /// Game over and level complete end the session.
    pub fn is_terminal(self) -> bool {
        matches!(self, GamePhase::GameOver | GamePhase::LevelComplete)
    }
}

/// Snapshot pushed to the shell; the engine's own state is authoritative.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GameStats {
    pub score: u32,
    pub lives: u32,
    pub coins: u32,
    pub level: u32,
    /// Whole seconds of play, pauses excluded.
    pub time: u64,
    pub high_score: u32,
}
