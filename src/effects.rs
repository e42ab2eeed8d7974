//! Cosmetic simulation: sparks, embers, fog, screen shake and lightning.
//!
//! Nothing in here feeds back into collision or scoring.

use std::f32::consts::TAU;

use rand::Rng;

use crate::entities::{FogParticle, Particle, ParticleKind, Rgb};
use crate::geometry::Vec2;

pub const PARTICLE_GRAVITY: f32 = 0.2;
pub const SPARK_LIFE: u32 = 30;
pub const FOG_SPAWN_CHANCE: f64 = 0.3;
pub const EMBER_SPAWN_CHANCE: f64 = 0.05;
/// Lifetime over which fog fades from `FOG_MAX_OPACITY` to nothing.
const FOG_FADE_FRAMES: f32 = 300.0;
const FOG_MAX_OPACITY: f32 = 0.3;
const EMBER_MAX_LIFE: u32 = 120;
const SHAKE_DECAY: f32 = 0.9;
const SHAKE_FLOOR: f32 = 0.1;

// ── Sparks & embers ───────────────────────────────────────────────────────────

/// Spray `count` sparks outward from `at` at random angles.
pub fn burst(particles: &mut Vec<Particle>, at: Vec2, color: Rgb, count: usize, rng: &mut impl Rng) {
    for _ in 0..count {
        let angle = rng.gen::<f32>() * TAU;
        let speed = rng.gen::<f32>() * 3.0 + 2.0;
        particles.push(Particle {
            position: at,
            velocity: Vec2::new(angle.cos() * speed, angle.sin() * speed),
            life: SPARK_LIFE,
            max_life: SPARK_LIFE,
            color,
            size: rng.gen::<f32>() * 4.0 + 2.0,
            kind: ParticleKind::Normal,
        });
    }
}

/// A rising ember somewhere across the visible stretch of the level.
pub fn spawn_ember(
    particles: &mut Vec<Particle>,
    scroll: f32,
    view_width: f32,
    ground_y: f32,
    rng: &mut impl Rng,
) {
    let angle = rng.gen::<f32>() * TAU;
    let speed = rng.gen::<f32>() * 0.5 + 0.5;
    let color = if rng.gen_bool(0.5) {
        Rgb::new(0xff, 0x66, 0x00)
    } else {
        Rgb::new(0xff, 0x33, 0x00)
    };
    particles.push(Particle {
        position: Vec2::new(scroll + rng.gen::<f32>() * view_width, ground_y - rng.gen::<f32>() * 100.0),
        velocity: Vec2::new(angle.cos() * speed, -(angle.sin() * speed).abs() - 1.0),
        life: rng.gen_range(60..120),
        max_life: EMBER_MAX_LIFE,
        color,
        size: 2.0 + rng.gen::<f32>() * 3.0,
        kind: ParticleKind::Ember,
    });
}

/// Integrate, apply the constant downward pull, and drop the expired.
pub fn update_particles(particles: &mut Vec<Particle>) {
    particles.retain_mut(|p| {
        p.position.x += p.velocity.x;
        p.position.y += p.velocity.y;
        p.velocity.y += PARTICLE_GRAVITY;
        p.life = p.life.saturating_sub(1);
        p.life > 0
    });
}

// ── Fog ───────────────────────────────────────────────────────────────────────

pub fn spawn_fog(fog: &mut Vec<FogParticle>, scroll: f32, view_width: f32, ground_y: f32, rng: &mut impl Rng) {
    fog.push(FogParticle {
        position: Vec2::new(
            scroll + rng.gen::<f32>() * view_width,
            ground_y - 50.0 - rng.gen::<f32>() * 200.0,
        ),
        velocity: Vec2::new(-0.2 + rng.gen::<f32>() * 0.4, -0.1 + rng.gen::<f32>() * 0.2),
        size: 50.0 + rng.gen::<f32>() * 100.0,
        opacity: 0.1 + rng.gen::<f32>() * 0.2,
        life_time: rng.gen_range(200..300),
    });
}

/// Drift, fade with remaining lifetime, drop the expired.
pub fn update_fog(fog: &mut Vec<FogParticle>) {
    fog.retain_mut(|f| {
        f.position.x += f.velocity.x;
        f.position.y += f.velocity.y;
        f.life_time = f.life_time.saturating_sub(1);
        f.opacity = f.life_time as f32 / FOG_FADE_FRAMES * FOG_MAX_OPACITY;
        f.life_time > 0
    });
}

// ── Screen shake ──────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScreenShake {
    pub offset: Vec2,
    pub intensity: f32,
}

impl ScreenShake {
    pub fn trigger(&mut self, intensity: f32) {
        self.intensity = intensity;
    }

    /// Jitter by the current intensity, then decay it geometrically.
    pub fn update(&mut self, rng: &mut impl Rng) {
        if self.intensity <= 0.0 {
            return;
        }
        self.offset = Vec2::new(
            (rng.gen::<f32>() - 0.5) * self.intensity,
            (rng.gen::<f32>() - 0.5) * self.intensity,
        );
        self.intensity *= SHAKE_DECAY;
        if self.intensity < SHAKE_FLOOR {
            *self = ScreenShake::default();
        }
    }
}

// ── Lightning ─────────────────────────────────────────────────────────────────

/// Frame counter for randomly spaced lightning strikes. The flash itself is
/// cleared by a real-time timer owned by the engine.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Lightning {
    timer: u32,
    pub flash: bool,
}

impl Lightning {
    /// Returns true on the frame a new flash starts.
    pub fn tick(&mut self, rng: &mut impl Rng) -> bool {
        self.timer += 1;
        let threshold = 300.0 + rng.gen::<f32>() * 300.0;
        if self.timer as f32 > threshold {
            self.timer = 0;
            self.flash = true;
            return true;
        }
        false
    }
}
