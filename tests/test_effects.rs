use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use haunted_run::arena::{Arena, Live};
use haunted_run::audio::{Cue, CuePlayer, SoundBoard};
use haunted_run::effects::*;
use haunted_run::entities::{FogParticle, ParticleKind, Rgb};
use haunted_run::geometry::Vec2;
use haunted_run::input::{Key, KeyState};
use haunted_run::timers::{Deferred, Timers};

use rand::rngs::StdRng;
use rand::SeedableRng;

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

// ── particles ─────────────────────────────────────────────────────────────────

#[test]
fn burst_spawns_requested_count_at_point() {
    let mut rng = seeded_rng();
    let mut particles = Vec::new();
    let at = Vec2::new(1200.0, 300.0);
    burst(&mut particles, at, Rgb::new(0xff, 0xcc, 0x00), 8, &mut rng);

    assert_eq!(particles.len(), 8);
    for p in &particles {
        assert_eq!(p.position, at);
        assert_eq!(p.life, SPARK_LIFE);
        assert_eq!(p.kind, ParticleKind::Normal);
        let speed = (p.velocity.x * p.velocity.x + p.velocity.y * p.velocity.y).sqrt();
        assert!((2.0..=5.0 + 1e-3).contains(&speed));
    }
}

#[test]
fn particles_fall_and_expire() {
    let mut rng = seeded_rng();
    let mut particles = Vec::new();
    burst(&mut particles, Vec2::ZERO, Rgb::WHITE, 4, &mut rng);
    let vy = particles[0].velocity.y;

    update_particles(&mut particles);
    assert!((particles[0].velocity.y - (vy + PARTICLE_GRAVITY)).abs() < 1e-6);
    assert_eq!(particles[0].life, SPARK_LIFE - 1);

    for _ in 1..SPARK_LIFE {
        update_particles(&mut particles);
    }
    assert!(particles.is_empty());
}

#[test]
fn embers_rise_inside_the_view() {
    let mut rng = seeded_rng();
    let mut particles = Vec::new();
    for _ in 0..50 {
        spawn_ember(&mut particles, 1000.0, 800.0, 550.0, &mut rng);
    }
    for p in &particles {
        assert_eq!(p.kind, ParticleKind::Ember);
        assert!(p.position.x >= 1000.0 && p.position.x <= 1800.0);
        assert!(p.position.y <= 550.0 && p.position.y >= 450.0);
        assert!(p.velocity.y < 0.0);
        assert!(p.alpha() <= 1.0);
    }
}

// ── fog ───────────────────────────────────────────────────────────────────────

#[test]
fn fog_fades_with_remaining_life() {
    let mut fog = vec![FogParticle {
        position: Vec2::new(10.0, 10.0),
        velocity: Vec2::new(0.1, 0.0),
        size: 80.0,
        opacity: 0.25,
        life_time: 150,
    }];
    update_fog(&mut fog);
    assert_eq!(fog[0].life_time, 149);
    assert!((fog[0].opacity - 149.0 / 300.0 * 0.3).abs() < 1e-6);
    assert!((fog[0].position.x - 10.1).abs() < 1e-5);

    for _ in 0..149 {
        update_fog(&mut fog);
    }
    assert!(fog.is_empty());
}

#[test]
fn fog_spawns_above_ground() {
    let mut rng = seeded_rng();
    let mut fog = Vec::new();
    for _ in 0..30 {
        spawn_fog(&mut fog, 0.0, 800.0, 550.0, &mut rng);
    }
    assert!(fog.iter().all(|f| f.position.y <= 500.0 && f.position.y >= 300.0));
    assert!(fog.iter().all(|f| (200..300).contains(&f.life_time)));
}

// ── shake & lightning ─────────────────────────────────────────────────────────

#[test]
fn shake_decays_to_rest() {
    let mut rng = seeded_rng();
    let mut shake = ScreenShake::default();
    shake.trigger(15.0);
    shake.update(&mut rng);
    assert!((shake.intensity - 13.5).abs() < 1e-4);
    assert!(shake.offset.x.abs() <= 7.5 && shake.offset.y.abs() <= 7.5);

    for _ in 0..100 {
        shake.update(&mut rng);
    }
    assert_eq!(shake, ScreenShake::default());
}

#[test]
fn lightning_strikes_between_300_and_600_frames() {
    let mut rng = seeded_rng();
    let mut lightning = Lightning::default();
    let mut first = None;
    for frame in 1..=601u32 {
        if lightning.tick(&mut rng) {
            first = Some(frame);
            break;
        }
    }
    let frame = first.expect("no strike");
    assert!(frame > 300);
    assert!(lightning.flash);
}

// ── timers ────────────────────────────────────────────────────────────────────

#[test]
fn timers_fire_in_due_order() {
    let t0 = Instant::now();
    let platforms: Arena<u8> = vec![0, 1].into();
    let handles: Vec<_> = platforms.handles().collect();

    let mut timers = Timers::new();
    timers.schedule(t0, Duration::from_millis(500), Deferred::BreakPlatform(handles[1]));
    timers.schedule(t0, Duration::from_millis(100), Deferred::ClearFlash);
    timers.schedule(t0, Duration::from_millis(200), Deferred::BreakPlatform(handles[0]));

    assert!(timers.take_due(t0 + Duration::from_millis(99)).is_empty());
    assert_eq!(
        timers.take_due(t0 + Duration::from_millis(250)),
        vec![Deferred::ClearFlash, Deferred::BreakPlatform(handles[0])]
    );
    assert_eq!(timers.len(), 1);
    assert!(timers.is_scheduled(Deferred::BreakPlatform(handles[1])));
}

#[test]
fn equal_deadlines_fire_in_schedule_order() {
    let t0 = Instant::now();
    let platforms: Arena<u8> = vec![0, 1].into();
    let handles: Vec<_> = platforms.handles().collect();

    let mut timers = Timers::new();
    timers.schedule(t0, Duration::from_millis(100), Deferred::BreakPlatform(handles[1]));
    timers.schedule(t0, Duration::from_millis(100), Deferred::ClearFlash);
    timers.schedule(t0, Duration::from_millis(100), Deferred::BreakPlatform(handles[0]));

    assert_eq!(
        timers.take_due(t0 + Duration::from_millis(100)),
        vec![
            Deferred::BreakPlatform(handles[1]),
            Deferred::ClearFlash,
            Deferred::BreakPlatform(handles[0]),
        ]
    );
    assert!(timers.is_empty());
}

#[test]
fn cancel_all_empties_queue() {
    let t0 = Instant::now();
    let mut timers = Timers::new();
    timers.schedule(t0, Duration::from_millis(1), Deferred::ClearFlash);
    timers.schedule(t0, Duration::from_millis(2), Deferred::ClearFlash);
    timers.cancel_all();
    assert!(timers.is_empty());
}

// ── arena ─────────────────────────────────────────────────────────────────────

#[derive(Debug)]
struct Pumpkin {
    smashed: bool,
}

impl Live for Pumpkin {
    fn is_live(&self) -> bool {
        !self.smashed
    }
}

#[test]
fn handles_stay_valid_as_items_die() {
    let mut arena = Arena::new();
    let a = arena.push(Pumpkin { smashed: false });
    let b = arena.push(Pumpkin { smashed: false });
    let c = arena.push(Pumpkin { smashed: false });

    arena.get_mut(b).unwrap().smashed = true;

    let live: Vec<_> = arena.live().map(|(h, _)| h).collect();
    assert_eq!(live, vec![a, c]);
    assert_eq!(arena.live_count(), 2);
    assert_eq!(arena.len(), 3);
    assert!(arena.get(b).unwrap().smashed);
    assert_eq!(c.index(), 2);
}

// ── input ─────────────────────────────────────────────────────────────────────

#[test]
fn press_reports_only_the_edge() {
    let mut keys = KeyState::default();
    assert!(keys.press(Key::Escape));
    assert!(!keys.press(Key::Escape));
    keys.release(Key::Escape);
    assert!(keys.press(Key::Escape));
}

#[test]
fn both_jump_aliases_count() {
    let mut keys = KeyState::default();
    keys.press(Key::ArrowUp);
    assert!(keys.jump());
    keys.release(Key::ArrowUp);
    keys.press(Key::Space);
    assert!(keys.jump());
    keys.clear();
    assert!(!keys.jump() && !keys.left() && !keys.right());
}

// ── audio ─────────────────────────────────────────────────────────────────────

struct Recorder(Rc<RefCell<Vec<Cue>>>);

impl CuePlayer for Recorder {
    fn play(&mut self, cue: Cue) {
        self.0.borrow_mut().push(cue);
    }
}

#[test]
fn sound_board_respects_setting() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut on = SoundBoard::new(true, Some(Box::new(Recorder(log.clone()))));
    let mut off = SoundBoard::new(false, Some(Box::new(Recorder(log.clone()))));
    on.play(Cue::Jump);
    off.play(Cue::Damage);
    assert_eq!(*log.borrow(), vec![Cue::Jump]);
}

#[test]
fn missing_backend_is_silent() {
    let mut board = SoundBoard::new(true, None);
    board.play(Cue::GameOver);
}
