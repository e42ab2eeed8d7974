use haunted_run::arena::Arena;
use haunted_run::entities::*;
use haunted_run::geometry::{Rect, Vec2};
use haunted_run::renderer::*;
use haunted_run::surface::*;

fn empty_level() -> Level {
    Level {
        id: 9,
        name: "Blank".to_string(),
        platforms: Arena::new(),
        enemies: Arena::new(),
        collectibles: Arena::new(),
        power_ups: Arena::new(),
        background_color: Rgb::new(0x1a, 0x00, 0x33),
        gravity: None,
        time_limit: None,
        finish_x: 5000.0,
    }
}

fn paint(level: &Level, player: &Player, scroll_offset: f32, lightning_flash: bool) -> Canvas {
    let mut canvas = Canvas::new(100, 30);
    let scene = Scene {
        level,
        player,
        particles: &[],
        fog: &[],
        fireballs: &[],
        scroll_offset,
        shake: Vec2::ZERO,
        lightning_flash,
        anim_ms: 0,
    };
    render(&mut canvas, &scene);
    canvas
}

fn glyph_at(canvas: &Canvas, x: f32, y: f32) -> char {
    let (col, row) = canvas.to_cell(x, y).expect("on canvas");
    canvas.cell(col, row).expect("cell").glyph
}

// ── Canvas ────────────────────────────────────────────────────────────────────

#[test]
fn canvas_maps_pixels_to_cells() {
    let canvas = Canvas::new(100, 30);
    assert_eq!(canvas.width(), 800.0);
    assert_eq!(canvas.height(), VIEW_HEIGHT);
    assert_eq!(canvas.cell_height(), 20.0);
    assert_eq!(canvas.to_cell(0.0, 0.0), Some((0, 0)));
    assert_eq!(canvas.to_cell(15.9, 39.9), Some((1, 1)));
    assert_eq!(canvas.to_cell(799.0, 599.0), Some((99, 29)));
    assert_eq!(canvas.to_cell(800.0, 10.0), None);
    assert_eq!(canvas.to_cell(-1.0, 10.0), None);
}

#[test]
fn empty_canvas_is_not_drawable() {
    assert!(!Canvas::new(0, 24).is_drawable());
    assert!(!Canvas::new(80, 0).is_drawable());
    assert!(Canvas::new(1, 1).is_drawable());
}

#[test]
fn fill_rect_is_clipped() {
    let mut canvas = Canvas::new(10, 10);
    let red = Rgb::new(0xff, 0, 0);
    canvas.fill_rect(Rect::new(-100.0, -100.0, 116.0, 200.0), red);
    assert_eq!(canvas.cell(0, 0).unwrap().bg, red);
    assert_eq!(canvas.cell(1, 1).unwrap().bg, red);
    assert_eq!(canvas.cell(2, 0).unwrap().bg, Rgb::BLACK);
}

#[test]
fn put_str_keeps_background_and_skips_spaces() {
    let mut canvas = Canvas::new(10, 10);
    let blue = Rgb::new(0, 0, 0xff);
    canvas.clear(blue);
    canvas.put_char(8.0, 0.0, '#', Rgb::WHITE);
    canvas.put_str(0.0, 0.0, "a c", Rgb::WHITE);
    assert_eq!(canvas.cell(0, 0).unwrap().glyph, 'a');
    assert_eq!(canvas.cell(1, 0).unwrap().glyph, '#');
    assert_eq!(canvas.cell(2, 0).unwrap().glyph, 'c');
    assert_eq!(canvas.cell(2, 0).unwrap().bg, blue);
}

#[test]
fn resize_clears_to_new_size() {
    let mut canvas = Canvas::new(10, 10);
    canvas.put_char(0.0, 0.0, 'x', Rgb::WHITE);
    canvas.resize(20, 5);
    assert_eq!((canvas.cols(), canvas.rows()), (20, 5));
    assert_eq!(canvas.cell(0, 0).unwrap().glyph, ' ');
    assert_eq!(canvas.row(4).len(), 20);
}

// ── Renderer ──────────────────────────────────────────────────────────────────

#[test]
fn player_is_drawn_at_screen_position() {
    let player = Player::spawn(3);
    let canvas = paint(&empty_level(), &player, 0.0, false);
    assert_eq!(glyph_at(&canvas, PLAYER_SPAWN.x, PLAYER_SPAWN.y), '▄');
}

#[test]
fn broken_platforms_are_not_drawn() {
    let mut level = empty_level();
    let handle = level.platforms.push(Platform::new(PlatformKind::Breakable, 400.0, 300.0, 160.0, 20.0));
    let player = Player::spawn(3);

    let canvas = paint(&level, &player, 0.0, false);
    assert_eq!(glyph_at(&canvas, 400.0, 300.0), '▀');

    level.platforms.get_mut(handle).unwrap().broken = true;
    let canvas = paint(&level, &player, 0.0, false);
    assert_eq!(glyph_at(&canvas, 400.0, 300.0), ' ');
}

#[test]
fn scroll_brings_world_into_view() {
    let mut level = empty_level();
    level.collectibles.push(Collectible::new(CollectibleKind::Coin, 1000.0, 300.0));
    let player = Player::spawn(3);

    let canvas = paint(&level, &player, 700.0, false);
    assert_eq!(glyph_at(&canvas, 312.0, 312.0), '◉');

    let canvas = paint(&level, &player, 0.0, false);
    let coins = (0..canvas.rows())
        .flat_map(|row| canvas.row(row).iter())
        .filter(|cell| cell.glyph == '◉')
        .count();
    assert_eq!(coins, 0);
}

#[test]
fn collected_items_and_dead_enemies_vanish() {
    let mut level = empty_level();
    let coin = level.collectibles.push(Collectible::new(CollectibleKind::Coin, 500.0, 300.0));
    let ghost = level.enemies.push(Enemy::new(EnemyKind::Ghost, 600.0, 200.0, 0.0, 0.0));
    level.collectibles.get_mut(coin).unwrap().collected = true;
    level.enemies.get_mut(ghost).unwrap().dead = true;

    let canvas = paint(&level, &Player::spawn(3), 0.0, false);
    assert_eq!(glyph_at(&canvas, 512.0, 312.0), ' ');
    assert_eq!(glyph_at(&canvas, 600.0, 200.0), ' ');
}

#[test]
fn lightning_brightens_the_sky() {
    let level = empty_level();
    let player = Player::spawn(3);
    let dark = paint(&level, &player, 0.0, false);
    let lit = paint(&level, &player, 0.0, true);
    let (col, row) = (50, 15);
    assert!(lit.cell(col, row).unwrap().bg.r > dark.cell(col, row).unwrap().bg.r);
}

#[test]
fn every_power_up_has_a_look() {
    for kind in PowerUpKind::ALL {
        assert_ne!(power_up_icon(kind), ' ');
        assert_ne!(power_up_color(kind), Rgb::BLACK);
    }
}
