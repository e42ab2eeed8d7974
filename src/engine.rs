//! The simulation core.
//!
//! One `Engine` per playthrough owns every piece of mutable game state. The
//! host calls [`Engine::frame`] once per display frame while it returns true,
//! [`Engine::run_timers`] every loop iteration, and [`Engine::render`] to
//! paint. Restarting means dropping the engine and building a new one.

use std::sync::mpsc::Sender;
use std::time::{Duration, Instant};

use rand::Rng;
use tracing::{debug, info};

use crate::arena::{Handle, Live};
use crate::audio::{Cue, CuePlayer, SoundBoard};
use crate::collision::{resolve_platform_side, Side, PLATFORM_TOLERANCE};
use crate::config::{DifficultySettings, GameConfig};
use crate::effects::{self, Lightning, ScreenShake, EMBER_SPAWN_CHANCE, FOG_SPAWN_CHANCE};
use crate::entities::{
    EnemyKind, Facing, Fireball, FogParticle, GamePhase, GameStats, Level, Particle, Player, PlatformKind,
    PowerUpKind, Rgb,
};
use crate::error::GameError;
use crate::geometry::{Rect, Vec2};
use crate::input::{Key, KeyState};
use crate::levels::scale_enemies;
use crate::renderer::{self, Scene};
use crate::storage::{load_high_score, record_high_score, SharedStore};
use crate::surface::Canvas;
use crate::timers::{Deferred, Timers};

// ── Tuning ────────────────────────────────────────────────────────────────────

pub const PLAYER_SPEED: f32 = 3.0;
pub const SPEED_BOOST: f32 = 1.5;
pub const JUMP_POWER: f32 = 14.0;
pub const DOUBLE_JUMP_FACTOR: f32 = 0.8;
pub const GRAVITY: f32 = 0.4;
/// Horizontal velocity multiplier per frame with no direction held.
pub const FRICTION: f32 = 0.8;
/// Falling below this y costs a life.
pub const FALL_LIMIT_Y: f32 = 650.0;
pub const INVINCIBILITY_FRAMES: u32 = 120;
/// ≈10 s at 60 fps.
pub const POWER_UP_FRAMES: u32 = 600;
pub const STOMP_MARGIN: f32 = 10.0;
pub const STOMP_BOUNCE: f32 = -8.0;
/// The player is held at `view_width / CAMERA_DIVISOR` once scrolling starts.
pub const CAMERA_DIVISOR: f32 = 2.5;
pub const BOB_STEP: f32 = 0.1;
pub const BREAK_DELAY: Duration = Duration::from_millis(500);
pub const FLASH_DURATION: Duration = Duration::from_millis(100);
pub const DAMAGE_SHAKE: f32 = 15.0;

pub const ENEMY_DEFEAT_POINTS: u32 = 100;
pub const LEVEL_COMPLETE_POINTS: u32 = 1000;

pub const FIREBALL_SPEED: f32 = 7.0;
pub const FIREBALL_LIFE: u32 = 90;
pub const FIREBALL_SIZE: f32 = 16.0;
pub const MAX_FIREBALLS: usize = 2;

const BAT_BOB_PERIOD_MS: f32 = 200.0;
const BAT_BOB_AMPLITUDE: f32 = 2.0;

const C_COIN_SPARK: Rgb = Rgb::new(0xff, 0xcc, 0x00);
const C_POWER_SPARK: Rgb = Rgb::new(0xff, 0xff, 0x00);
const C_DEFEAT_SPARK: Rgb = Rgb::new(0xff, 0x00, 0x00);

// ── Collaborators ─────────────────────────────────────────────────────────────

/// Change notifications pushed to the shell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineEvent {
    Phase(GamePhase),
    Stats(GameStats),
}

/// Everything outside the simulation the engine talks to.
pub struct Hooks {
    pub events: Sender<EngineEvent>,
    pub storage: SharedStore,
    /// `None` when no audio backend could be opened.
    pub audio: Option<Box<dyn CuePlayer>>,
}

// ── Engine ────────────────────────────────────────────────────────────────────

pub struct Engine {
    view_width: f32,
    view_height: f32,

    level: Level,
    config: GameConfig,
    tuning: DifficultySettings,
    player: Player,
    scroll_offset: f32,

    particles: Vec<Particle>,
    fog: Vec<FogParticle>,
    fireballs: Vec<Fireball>,
    shake: ScreenShake,
    lightning: Lightning,

    keys: KeyState,
    /// Jump keys released since the last jump; a double jump needs a new press.
    jump_armed: bool,
    fire_requested: bool,

    phase: GamePhase,
    stats: GameStats,
    last_time: Option<Instant>,
    epoch: Option<Instant>,
    elapsed: Duration,

    timers: Timers,
    alive: bool,
    listening: bool,

    events: Sender<EngineEvent>,
    storage: SharedStore,
    sound: SoundBoard,
}

impl Engine {
    /// Build a session for `level`. Fails when the canvas has no area.
    pub fn new(canvas: &Canvas, mut level: Level, config: GameConfig, hooks: Hooks) -> Result<Self, GameError> {
        if !canvas.is_drawable() {
            return Err(GameError::NoSurface { cols: canvas.cols(), rows: canvas.rows() });
        }

        let tuning = config.difficulty.settings();
        scale_enemies(&mut level, tuning.enemy_count_factor);

        let player = Player::spawn(tuning.player_lives);
        let high_score = load_high_score(&*hooks.storage.borrow());
        let stats = GameStats {
            score: 0,
            lives: player.lives,
            coins: 0,
            level: level.id,
            time: 0,
            high_score,
        };

        info!(
            level = level.id,
            name = %level.name,
            difficulty = ?config.difficulty,
            player = %config.player_name,
            "session created"
        );

        Ok(Engine {
            view_width: canvas.width(),
            view_height: canvas.height(),
            sound: SoundBoard::new(config.sound_enabled, hooks.audio),
            level,
            config,
            tuning,
            player,
            scroll_offset: 0.0,
            particles: Vec::new(),
            fog: Vec::new(),
            fireballs: Vec::new(),
            shake: ScreenShake::default(),
            lightning: Lightning::default(),
            keys: KeyState::default(),
            jump_armed: true,
            fire_requested: false,
            phase: GamePhase::Menu,
            stats,
            last_time: None,
            epoch: None,
            elapsed: Duration::ZERO,
            timers: Timers::new(),
            alive: true,
            listening: true,
            events: hooks.events,
            storage: hooks.storage,
        })
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────────

    pub fn start(&mut self) {
        if self.alive && self.phase == GamePhase::Menu {
            self.last_time = None;
            self.set_phase(GamePhase::Playing);
        }
    }

    pub fn pause(&mut self) {
        if self.alive && self.phase == GamePhase::Playing {
            self.set_phase(GamePhase::Paused);
        }
    }

    pub fn resume(&mut self) {
        if self.alive && self.phase == GamePhase::Paused {
            // Paused time must not count as a frame delta.
            self.last_time = None;
            self.set_phase(GamePhase::Playing);
        }
    }

    /// Tear down: no more frames, input or deferred mutations.
    pub fn stop(&mut self) {
        if !self.alive {
            return;
        }
        self.alive = false;
        self.listening = false;
        self.keys.clear();
        self.timers.cancel_all();
        info!(score = self.stats.score, phase = ?self.phase, "session stopped");
    }

    // ── Input ─────────────────────────────────────────────────────────────────

    pub fn key_down(&mut self, key: Key) {
        if !self.listening {
            return;
        }
        let pressed = self.keys.press(key);
        match key {
            Key::Escape if pressed => match self.phase {
                GamePhase::Playing => self.pause(),
                GamePhase::Paused => self.resume(),
                _ => {}
            },
            Key::KeyX if pressed && self.phase == GamePhase::Playing => {
                self.fire_requested = true;
            }
            _ => {}
        }
    }

    pub fn key_up(&mut self, key: Key) {
        if !self.listening {
            return;
        }
        self.keys.release(key);
        if !self.keys.jump() {
            self.jump_armed = true;
        }
    }

    // ── Host entry points ─────────────────────────────────────────────────────

    /// Advance one frame if playing. Returns whether another frame is wanted.
    pub fn frame(&mut self, now: Instant, rng: &mut impl Rng) -> bool {
        if !self.alive || self.phase != GamePhase::Playing {
            return false;
        }
        let delta = self
            .last_time
            .map(|last| now.saturating_duration_since(last))
            .unwrap_or(Duration::ZERO);
        self.last_time = Some(now);
        self.epoch.get_or_insert(now);

        self.advance(delta, now, rng);
        self.alive && self.phase == GamePhase::Playing
    }

    /// Apply every deferred action that has come due. A no-op once stopped.
    pub fn run_timers(&mut self, now: Instant) {
        if !self.alive {
            return;
        }
        for action in self.timers.take_due(now) {
            match action {
                Deferred::BreakPlatform(handle) => {
                    if let Some(platform) = self.level.platforms.get_mut(handle) {
                        if !platform.broken {
                            platform.broken = true;
                            debug!(platform = handle.index(), "platform crumbled");
                        }
                    }
                }
                Deferred::ClearFlash => self.lightning.flash = false,
            }
        }
    }

    /// Record new surface dimensions after the host window changed size.
    pub fn resize(&mut self, canvas: &Canvas) {
        self.view_width = canvas.width();
        self.view_height = canvas.height();
    }

    /// Paint the current state. Never mutates the simulation.
    pub fn render(&self, canvas: &mut Canvas, now: Instant) {
        let scene = Scene {
            level: &self.level,
            player: &self.player,
            particles: &self.particles,
            fog: &self.fog,
            fireballs: &self.fireballs,
            scroll_offset: self.scroll_offset,
            shake: self.shake.offset,
            lightning_flash: self.lightning.flash,
            anim_ms: self.anim_ms(now),
        };
        renderer::render(canvas, &scene);
    }

    // ── Read access ───────────────────────────────────────────────────────────

    pub fn stats(&self) -> GameStats {
        self.stats
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    #[doc(hidden)]
    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn scroll_offset(&self) -> f32 {
        self.scroll_offset
    }

    /// Active power-up with its remaining frames.
    pub fn power_up(&self) -> Option<(PowerUpKind, u32)> {
        self.player.power_up.map(|kind| (kind, self.player.power_up_timer))
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn fog(&self) -> &[FogParticle] {
        &self.fog
    }

    pub fn fireballs(&self) -> &[Fireball] {
        &self.fireballs
    }

    pub fn shake(&self) -> ScreenShake {
        self.shake
    }

    pub fn lightning_flash(&self) -> bool {
        self.lightning.flash
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    pub fn view_size(&self) -> (f32, f32) {
        (self.view_width, self.view_height)
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    fn anim_ms(&self, now: Instant) -> u64 {
        self.epoch
            .map(|epoch| now.saturating_duration_since(epoch).as_millis() as u64)
            .unwrap_or(0)
    }

    // ── Frame pipeline ────────────────────────────────────────────────────────

    /// Fixed step order: each stage reads what the previous ones wrote.
    fn advance(&mut self, delta: Duration, now: Instant, rng: &mut impl Rng) {
        self.elapsed += delta;
        self.stats.time = self.elapsed.as_secs();

        self.update_player(now);
        if self.phase != GamePhase::Playing {
            return;
        }
        self.update_enemies(now, rng);
        if self.phase != GamePhase::Playing {
            return;
        }
        self.update_collectibles(rng);
        self.update_power_ups(rng);
        self.update_fireballs(rng);
        effects::update_particles(&mut self.particles);
        self.update_atmosphere(now, rng);
        self.update_camera();
        self.check_level_complete();
    }

    fn update_player(&mut self, now: Instant) {
        let mut speed = PLAYER_SPEED;
        if self.player.has_power_up(PowerUpKind::Speed) {
            speed *= SPEED_BOOST;
        }

        let player = &mut self.player;
        if self.keys.left() {
            player.velocity.x = -speed;
            player.facing = Facing::Left;
        } else if self.keys.right() {
            player.velocity.x = speed;
            player.facing = Facing::Right;
        } else {
            player.velocity.x *= FRICTION;
        }

        let jump = self.keys.jump();
        if jump && player.on_ground {
            player.velocity.y = -JUMP_POWER;
            player.on_ground = false;
            player.is_jumping = true;
            self.jump_armed = false;
            self.sound.play(Cue::Jump);
        } else if jump
            && self.jump_armed
            && !player.on_ground
            && player.is_jumping
            && player.has_power_up(PowerUpKind::DoubleJump)
        {
            player.velocity.y = -JUMP_POWER * DOUBLE_JUMP_FACTOR;
            player.is_jumping = false;
            self.jump_armed = false;
            self.sound.play(Cue::Jump);
        }

        let gravity = self.level.gravity.filter(|g| *g > 0.0).unwrap_or(GRAVITY);
        player.velocity.y += gravity;
        player.body.x += player.velocity.x;
        player.body.y += player.velocity.y;

        player.on_ground = false;
        for handle in self.level.platforms.handles() {
            let Some(platform) = self.level.platforms.get(handle) else { continue };
            if !platform.is_live() {
                continue;
            }
            let screen = platform.body.shifted_x(-self.scroll_offset);
            let breakable = platform.kind == PlatformKind::Breakable;

            match resolve_platform_side(&player.body, player.velocity, &screen, PLATFORM_TOLERANCE) {
                Some(Side::Top) => {
                    let falling = player.velocity.y > 0.0;
                    player.body.y = screen.y - player.body.height;
                    player.velocity.y = 0.0;
                    player.on_ground = true;
                    player.is_jumping = false;

                    let action = Deferred::BreakPlatform(handle);
                    if breakable && falling && !self.timers.is_scheduled(action) {
                        self.timers.schedule(now, BREAK_DELAY, action);
                        debug!(platform = handle.index(), "breakable platform stepped on");
                    }
                }
                Some(Side::Bottom) => {
                    player.body.y = screen.bottom();
                    player.velocity.y = 0.0;
                }
                Some(Side::Left) => {
                    player.body.x = screen.x - player.body.width;
                    player.velocity.x = 0.0;
                }
                Some(Side::Right) => {
                    player.body.x = screen.right();
                    player.velocity.x = 0.0;
                }
                None => {}
            }
        }

        if player.body.x < 0.0 {
            player.body.x = 0.0;
        }

        if player.body.y > FALL_LIMIT_Y {
            self.take_damage();
        }

        let player = &mut self.player;
        if player.invincible {
            player.invincible_timer = player.invincible_timer.saturating_sub(1);
            if player.invincible_timer == 0 {
                player.invincible = false;
            }
        }
        if player.power_up_timer > 0 {
            player.power_up_timer -= 1;
            if player.power_up_timer == 0 {
                player.power_up = None;
            }
        }
    }

    fn update_enemies(&mut self, now: Instant, rng: &mut impl Rng) {
        let speed_factor = self.tuning.enemy_speed_factor;
        // Real-time phase: the bat's bob period does not depend on frame rate.
        let bob_phase = self.anim_ms(now) as f32 / BAT_BOB_PERIOD_MS;

        for handle in self.level.enemies.handles() {
            let (screen, top) = {
                let Some(enemy) = self.level.enemies.get_mut(handle) else { continue };
                if enemy.dead {
                    continue;
                }
                let step = enemy.speed * enemy.direction * speed_factor;
                enemy.velocity.x = step;
                enemy.body.x += step;

                if enemy.body.x > enemy.start_x + enemy.patrol_distance {
                    enemy.direction = -1.0;
                } else if enemy.body.x < enemy.start_x {
                    enemy.direction = 1.0;
                }

                if enemy.kind == EnemyKind::Bat {
                    let dy = bob_phase.sin() * BAT_BOB_AMPLITUDE;
                    enemy.velocity.y = dy;
                    enemy.body.y += dy;
                }
                (enemy.body.shifted_x(-self.scroll_offset), enemy.body.y)
            };

            if self.player.body.overlaps(&screen) {
                let stomp = self.player.velocity.y > 0.0
                    && self.player.body.bottom() - STOMP_MARGIN < top;
                if stomp {
                    self.defeat_enemy(handle, rng);
                    self.player.velocity.y = STOMP_BOUNCE;
                } else {
                    self.take_damage();
                    if self.phase != GamePhase::Playing {
                        return;
                    }
                }
            }
        }
    }

    fn update_collectibles(&mut self, rng: &mut impl Rng) {
        for handle in self.level.collectibles.handles() {
            let picked = {
                let Some(item) = self.level.collectibles.get_mut(handle) else { continue };
                item.bob_offset += BOB_STEP;
                if item.collected {
                    continue;
                }
                let screen = item.body.shifted_x(-self.scroll_offset);
                if !self.player.body.overlaps(&screen) {
                    continue;
                }
                item.collected = true;
                (item.kind, item.value, item.body.center())
            };
            let (kind, value, center) = picked;

            self.stats.score += self.tuning.award(value);
            self.stats.coins += 1;
            self.player.coins += 1;
            debug!(?kind, value, score = self.stats.score, "collectible picked up");
            self.notify_stats();
            self.sound.play(Cue::Collect);
            effects::burst(&mut self.particles, center, C_COIN_SPARK, 8, rng);
        }
    }

    fn update_power_ups(&mut self, rng: &mut impl Rng) {
        for handle in self.level.power_ups.handles() {
            let picked = {
                let Some(item) = self.level.power_ups.get_mut(handle) else { continue };
                item.bob_offset += BOB_STEP;
                if item.collected {
                    continue;
                }
                let screen = item.body.shifted_x(-self.scroll_offset);
                if !self.player.body.overlaps(&screen) {
                    continue;
                }
                item.collected = true;
                (item.kind, item.body.center())
            };
            let (kind, center) = picked;

            // Replaces whatever was active, timer included.
            self.player.power_up = Some(kind);
            self.player.power_up_timer = POWER_UP_FRAMES;
            debug!(?kind, "power-up collected");
            self.sound.play(Cue::PowerUp);
            effects::burst(&mut self.particles, center, C_POWER_SPARK, 12, rng);
        }
    }

    fn update_fireballs(&mut self, rng: &mut impl Rng) {
        if std::mem::take(&mut self.fire_requested)
            && self.player.has_power_up(PowerUpKind::Fireball)
            && self.fireballs.len() < MAX_FIREBALLS
        {
            let center = self.player.body.center();
            self.fireballs.push(Fireball {
                body: Rect::new(
                    center.x + self.scroll_offset - FIREBALL_SIZE / 2.0,
                    center.y - FIREBALL_SIZE / 2.0,
                    FIREBALL_SIZE,
                    FIREBALL_SIZE,
                ),
                velocity: Vec2::new(FIREBALL_SPEED * self.player.facing.sign(), 0.0),
                life: FIREBALL_LIFE,
            });
        }

        let scroll = self.scroll_offset;
        let view_width = self.view_width;
        let enemies = &self.level.enemies;
        let mut hits: Vec<Handle> = Vec::new();
        self.fireballs.retain_mut(|fireball| {
            fireball.body.x += fireball.velocity.x;
            fireball.life = fireball.life.saturating_sub(1);
            let screen_x = fireball.body.x - scroll;
            if fireball.life == 0 || screen_x + fireball.body.width < 0.0 || screen_x > view_width {
                return false;
            }
            match enemies.live().find(|(_, enemy)| enemy.body.overlaps(&fireball.body)) {
                Some((handle, _)) => {
                    hits.push(handle);
                    false
                }
                None => true,
            }
        });

        for handle in hits {
            self.defeat_enemy(handle, rng);
        }
    }

    fn update_atmosphere(&mut self, now: Instant, rng: &mut impl Rng) {
        let ground_y = self.level.ground_y();

        if rng.gen_bool(FOG_SPAWN_CHANCE) {
            effects::spawn_fog(&mut self.fog, self.scroll_offset, self.view_width, ground_y, rng);
        }
        effects::update_fog(&mut self.fog);

        self.shake.update(rng);

        if self.lightning.tick(rng) {
            self.timers.schedule(now, FLASH_DURATION, Deferred::ClearFlash);
        }

        if rng.gen_bool(EMBER_SPAWN_CHANCE) {
            effects::spawn_ember(&mut self.particles, self.scroll_offset, self.view_width, ground_y, rng);
        }
    }

    /// Forward-only scroll lock.
    fn update_camera(&mut self) {
        let lock_x = self.view_width / CAMERA_DIVISOR;
        if self.player.body.x > lock_x {
            self.scroll_offset += self.player.body.x - lock_x;
            self.player.body.x = lock_x;
        }
    }

    fn check_level_complete(&mut self) {
        if self.phase != GamePhase::Playing {
            return;
        }
        let world_x = self.player.body.x + self.scroll_offset;
        if world_x >= self.level.finish_x {
            self.level_complete();
        }
    }

    // ── Outcomes ──────────────────────────────────────────────────────────────

    /// Lose a life unless protected. Respawns, or ends the session on the last life.
    #[doc(hidden)]
    pub fn take_damage(&mut self) {
        if self.phase != GamePhase::Playing {
            return;
        }
        if self.player.invincible || self.player.has_power_up(PowerUpKind::Invincibility) {
            return;
        }

        self.player.lives = self.player.lives.saturating_sub(1);
        self.stats.lives = self.player.lives;
        debug!(lives = self.player.lives, "player damaged");
        self.notify_stats();
        self.sound.play(Cue::Damage);
        self.shake.trigger(DAMAGE_SHAKE);

        if self.player.lives == 0 {
            self.game_over();
        } else {
            self.player.respawn();
            self.player.invincible = true;
            self.player.invincible_timer = INVINCIBILITY_FRAMES;
            self.scroll_offset = 0.0;
        }
    }

    fn defeat_enemy(&mut self, handle: Handle, rng: &mut impl Rng) {
        let center = match self.level.enemies.get_mut(handle) {
            Some(enemy) if !enemy.dead => {
                enemy.dead = true;
                enemy.body.center()
            }
            _ => return,
        };

        self.stats.score += self.tuning.award(ENEMY_DEFEAT_POINTS);
        debug!(enemy = handle.index(), score = self.stats.score, "enemy defeated");
        self.notify_stats();
        self.sound.play(Cue::EnemyDefeat);
        effects::burst(&mut self.particles, center, C_DEFEAT_SPARK, 10, rng);
    }

    fn level_complete(&mut self) {
        self.stats.score += self.tuning.award(LEVEL_COMPLETE_POINTS);
        self.persist_high_score();
        self.notify_stats();
        self.set_phase(GamePhase::LevelComplete);
        self.sound.play(Cue::LevelComplete);
    }

    fn game_over(&mut self) {
        self.set_phase(GamePhase::GameOver);
        self.sound.play(Cue::GameOver);
        if self.persist_high_score() {
            self.notify_stats();
        }
    }

    /// Write the score through if it beats the stored value.
    fn persist_high_score(&mut self) -> bool {
        let saved = record_high_score(&mut *self.storage.borrow_mut(), self.stats.score);
        self.stats.high_score = self.stats.high_score.max(self.stats.score);
        saved
    }

    fn set_phase(&mut self, phase: GamePhase) {
        info!(from = ?self.phase, to = ?phase, "phase change");
        self.phase = phase;
        let _ = self.events.send(EngineEvent::Phase(phase));
    }

    fn notify_stats(&self) {
        // The shell may already be gone; that is not the engine's problem.
        let _ = self.events.send(EngineEvent::Stats(self.stats));
    }
}
