//! Paints one frame of the world onto a [`Canvas`].
//!
//! Stateless between calls: everything comes in through [`Scene`]. World x is
//! turned into screen x by subtracting the scroll offset, and the whole scene
//! is displaced by the current screen shake.

use crate::entities::{
    Collectible, CollectibleKind, Enemy, EnemyKind, Facing, Fireball, FogParticle, Level,
    Particle, ParticleKind, Platform, PlatformKind, Player, PowerUp, PowerUpKind, Rgb,
};
use crate::geometry::{Rect, Vec2};
use crate::surface::{Canvas, CELL_WIDTH};

// ── Colour palette ────────────────────────────────────────────────────────────

const C_MOON: Rgb = Rgb::new(0xff, 0xff, 0x99);
const C_FLASH: Rgb = Rgb::new(0xcc, 0xcc, 0xff);
const C_FOG: Rgb = Rgb::new(0xaa, 0xaa, 0xcc);
const C_PLAYER: Rgb = Rgb::WHITE;
const C_PLAYER_FADED: Rgb = Rgb::new(0x88, 0x88, 0x99);
const C_EYE: Rgb = Rgb::BLACK;
const C_GHOST: Rgb = Rgb::new(0xcc, 0xcc, 0xff);
const C_BAT: Rgb = Rgb::new(0x66, 0x33, 0x66);
const C_SKELETON: Rgb = Rgb::new(0xee, 0xee, 0xee);
const C_WITCH_HAT: Rgb = Rgb::new(0x33, 0x33, 0x33);
const C_WITCH: Rgb = Rgb::new(0x66, 0x33, 0x99);
const C_ZOMBIE: Rgb = Rgb::new(0x66, 0x99, 0x66);
const C_RED_EYE: Rgb = Rgb::new(0xff, 0x00, 0x00);
const C_YELLOW_EYE: Rgb = Rgb::new(0xff, 0xff, 0x00);
const C_GREEN_EYE: Rgb = Rgb::new(0x00, 0xff, 0x00);
const C_DIRT: Rgb = Rgb::new(0x66, 0x33, 0x00);
const C_DIRT_LOOSE: Rgb = Rgb::new(0x99, 0x66, 0x33);
const C_DIRT_DETAIL: Rgb = Rgb::new(0x55, 0x22, 0x00);
const C_GRASS: Rgb = Rgb::new(0x33, 0xcc, 0x33);
const C_MOSS: Rgb = Rgb::new(0x66, 0x99, 0x66);
const C_COIN: Rgb = Rgb::new(0xff, 0xcc, 0x00);
const C_PUMPKIN: Rgb = Rgb::new(0xff, 0x66, 0x00);
const C_STEM: Rgb = Rgb::new(0x33, 0x66, 0x00);
const C_CANDY: Rgb = Rgb::new(0xff, 0x33, 0x66);
const C_POLE: Rgb = Rgb::new(0xcc, 0xcc, 0xcc);
const C_FLAG: Rgb = Rgb::new(0x00, 0xff, 0x00);
const C_FINISH_TEXT: Rgb = Rgb::new(0xff, 0xff, 0x00);
const C_TOMBSTONE: Rgb = Rgb::new(0x55, 0x55, 0x66);
const C_FIREBALL: Rgb = Rgb::new(0xff, 0x99, 0x00);

const BOB_AMPLITUDE: f32 = 5.0;
const TOMBSTONE_SPACING: f32 = 400.0;

/// Read-only view of everything drawn in a frame.
pub struct Scene<'a> {
    pub level: &'a Level,
    pub player: &'a Player,
    pub particles: &'a [Particle],
    pub fog: &'a [FogParticle],
    pub fireballs: &'a [Fireball],
    pub scroll_offset: f32,
    pub shake: Vec2,
    pub lightning_flash: bool,
    /// Milliseconds of real time, drives wing flaps and blinking.
    pub anim_ms: u64,
}

/// Paint the whole scene, back to front.
pub fn render(canvas: &mut Canvas, scene: &Scene) {
    let mut r = Renderer {
        canvas,
        scroll: scene.scroll_offset,
        shake: scene.shake,
        anim_ms: scene.anim_ms,
    };
    let ground_y = scene.level.ground_y();

    r.draw_background(scene.level.background_color, scene.lightning_flash);
    r.draw_moon(scene.lightning_flash);
    for fog in scene.fog {
        r.draw_fog(fog);
    }
    r.draw_finish_flag(scene.level.finish_x, ground_y);
    r.draw_decorations(ground_y, scene.level.finish_x);

    for platform in scene.level.platforms.iter() {
        r.draw_platform(platform);
    }
    for collectible in scene.level.collectibles.iter() {
        r.draw_collectible(collectible);
    }
    for power_up in scene.level.power_ups.iter() {
        r.draw_power_up(power_up);
    }
    for enemy in scene.level.enemies.iter() {
        r.draw_enemy(enemy);
    }
    for fireball in scene.fireballs {
        r.draw_fireball(fireball);
    }
    for particle in scene.particles {
        r.draw_particle(particle);
    }

    r.draw_player(scene.player);
    r.draw_vignette();
}

struct Renderer<'c> {
    canvas: &'c mut Canvas,
    scroll: f32,
    shake: Vec2,
    anim_ms: u64,
}

impl Renderer<'_> {
    /// World x → screen x, shake included.
    fn sx(&self, world_x: f32) -> f32 {
        world_x - self.scroll + self.shake.x
    }

    fn sy(&self, y: f32) -> f32 {
        y + self.shake.y
    }

    fn on_screen(&self, screen_x: f32, width: f32) -> bool {
        screen_x + width >= 0.0 && screen_x <= self.canvas.width()
    }

    fn row_height(&self) -> f32 {
        self.canvas.cell_height()
    }

    /// Draw text rows starting at a pixel position, skipping spaces.
    fn sprite(&mut self, x: f32, y: f32, rows: &[&str], color: Rgb) {
        let rh = self.row_height();
        for (r, line) in rows.iter().enumerate() {
            self.canvas.put_str(x, y + r as f32 * rh, line, color);
        }
    }

    /// Glyph drawn on its own background, for eyes and faces.
    fn accent(&mut self, x: f32, y: f32, col: usize, row: usize, glyph: char, fg: Rgb, bg: Rgb) {
        let rh = self.row_height();
        self.canvas.put_cell(x + col as f32 * CELL_WIDTH, y + row as f32 * rh, glyph, fg, bg);
    }

    // ── Sky ───────────────────────────────────────────────────────────────────

    fn draw_background(&mut self, base: Rgb, flash: bool) {
        let rows = self.canvas.rows().max(1);
        for row in 0..rows {
            let t = row as f32 / rows as f32;
            let mut color = base.lerp(base.darken(0.7), t);
            if flash {
                color = color.lerp(C_FLASH, 0.5);
            }
            self.canvas.fill_row(row, color);
        }
    }

    fn draw_moon(&mut self, flash: bool) {
        let w = self.canvas.width();
        let h = self.canvas.height();
        let center = Vec2::new(w * 0.85, h * 0.15);
        let radius = w.min(h) * 0.05;
        let color = if flash { Rgb::WHITE } else { C_MOON };
        self.canvas.blend_ellipse(center, radius * 2.0, radius * 2.0, color, 0.15);
        self.canvas.fill_ellipse(center, radius, radius, color);
    }

    fn draw_fog(&mut self, fog: &FogParticle) {
        let center = Vec2::new(self.sx(fog.position.x), self.sy(fog.position.y));
        if !self.on_screen(center.x - fog.size / 2.0, fog.size) {
            return;
        }
        self.canvas.blend_ellipse(center, fog.size / 2.0, fog.size / 4.0, C_FOG, fog.opacity);
    }

    // ── Scenery ───────────────────────────────────────────────────────────────

    fn draw_finish_flag(&mut self, finish_x: f32, ground_y: f32) {
        let x = self.sx(finish_x);
        if !self.on_screen(x, 60.0) {
            return;
        }
        let top = self.sy(ground_y - 150.0);
        self.canvas.fill_rect(Rect::new(x, top, 5.0, 150.0), C_POLE);
        for i in 0..3 {
            for j in 0..2 {
                let color = if (i + j) % 2 == 0 { Rgb::WHITE } else { C_FLAG };
                let square = Rect::new(x + 5.0 + i as f32 * 18.0, top + j as f32 * 20.0, 18.0, 20.0);
                self.canvas.fill_rect(square, color);
            }
        }
        let label_y = top - 10.0 - self.row_height();
        self.canvas.put_str(x + 30.0 - 3.0 * CELL_WIDTH, label_y, "FINISH", C_FINISH_TEXT);
    }

    /// Tombstones at fixed world spacing along the ground line.
    fn draw_decorations(&mut self, ground_y: f32, finish_x: f32) {
        let first = (self.scroll / TOMBSTONE_SPACING).floor().max(0.0) as u32;
        let last = ((self.scroll + self.canvas.width()) / TOMBSTONE_SPACING).ceil() as u32;
        for k in first..=last {
            let world_x = 150.0 + k as f32 * TOMBSTONE_SPACING;
            if world_x > finish_x {
                break;
            }
            let x = self.sx(world_x);
            let top = self.sy(ground_y - 30.0);
            self.canvas.fill_rect(Rect::new(x, top, 24.0, 30.0), C_TOMBSTONE);
            self.canvas.put_cell(x + 8.0, top, '✝', C_POLE, C_TOMBSTONE);
        }
    }

    fn draw_platform(&mut self, platform: &Platform) {
        if platform.broken {
            return;
        }
        let body = platform.body;
        let x = self.sx(body.x);
        if !self.on_screen(x, body.width) {
            return;
        }
        let y = self.sy(body.y);
        let (base, top) = match platform.kind {
            PlatformKind::Ground => (C_DIRT, C_GRASS),
            PlatformKind::Floating => (C_DIRT, C_MOSS),
            PlatformKind::Breakable => (C_DIRT_LOOSE, C_MOSS),
        };
        self.canvas.fill_rect(Rect::new(x, y, body.width, body.height), base);

        let mut cx = x;
        while cx < x + body.width {
            self.canvas.put_cell(cx, y, '▀', top, base);
            cx += CELL_WIDTH;
        }

        let below = y + self.row_height();
        if below < y + body.height {
            match platform.kind {
                PlatformKind::Breakable => {
                    let mut seam = x + 20.0;
                    while seam < x + body.width {
                        self.canvas.put_char(seam, below, '┊', C_DIRT);
                        seam += 30.0;
                    }
                }
                PlatformKind::Ground | PlatformKind::Floating => {
                    let mut root = x;
                    while root < x + body.width {
                        self.canvas.put_char(root, below, '╷', C_DIRT_DETAIL);
                        root += 20.0;
                    }
                }
            }
        }
    }

    // ── Pickups ───────────────────────────────────────────────────────────────

    fn draw_collectible(&mut self, collectible: &Collectible) {
        if collectible.collected {
            return;
        }
        let body = collectible.body;
        let x = self.sx(body.x);
        if !self.on_screen(x, body.width) {
            return;
        }
        let bob = collectible.bob_offset.sin() * BOB_AMPLITUDE;
        let center = Vec2::new(x + body.width / 2.0, self.sy(body.y + bob) + body.height / 2.0);
        match collectible.kind {
            CollectibleKind::Coin => {
                self.canvas.put_char(center.x, center.y, '◉', C_COIN);
            }
            CollectibleKind::Pumpkin => {
                let stem_y = center.y - self.row_height();
                self.canvas.put_char(center.x, center.y, '●', C_PUMPKIN);
                self.canvas.put_char(center.x, stem_y, '╿', C_STEM);
            }
            CollectibleKind::Candy => {
                self.canvas.put_str(center.x - CELL_WIDTH, center.y, "◀▬▶", C_CANDY);
            }
        }
    }

    fn draw_power_up(&mut self, power_up: &PowerUp) {
        if power_up.collected {
            return;
        }
        let body = power_up.body;
        let x = self.sx(body.x);
        if !self.on_screen(x, body.width) {
            return;
        }
        let bob = power_up.bob_offset.sin() * BOB_AMPLITUDE;
        let center = Vec2::new(x + body.width / 2.0, self.sy(body.y + bob));
        let color = power_up_color(power_up.kind);
        self.canvas.blend_ellipse(center, body.width, body.width / 2.0, color, 0.3);
        self.canvas.put_char(center.x - CELL_WIDTH / 2.0, center.y, '★', color);
        self.canvas.put_char(center.x + CELL_WIDTH / 2.0, center.y, power_up_icon(power_up.kind), Rgb::WHITE);
    }

    // ── Enemies ───────────────────────────────────────────────────────────────

    fn draw_enemy(&mut self, enemy: &Enemy) {
        if enemy.dead {
            return;
        }
        let x = self.sx(enemy.body.x);
        if !self.on_screen(x, enemy.body.width) {
            return;
        }
        let y = self.sy(enemy.body.y);
        match enemy.kind {
            EnemyKind::Ghost => self.draw_ghost(x, y),
            EnemyKind::Bat => self.draw_bat(x, y),
            EnemyKind::Skeleton => self.draw_skeleton(x, y),
            EnemyKind::Witch => self.draw_witch(x, y),
            EnemyKind::Zombie => self.draw_zombie(x, y),
        }
    }

    fn draw_ghost(&mut self, x: f32, y: f32) {
        let body = self.canvas.bg_at(x, y).lerp(C_GHOST, 0.8);
        self.sprite(x, y, &["▄██▄", "████", "▀▄▀▄"], body);
        self.accent(x, y, 1, 1, '●', C_RED_EYE, body);
        self.accent(x, y, 3, 1, '●', C_RED_EYE, body);
    }

    fn draw_bat(&mut self, x: f32, y: f32) {
        let wings = if (self.anim_ms / 100) % 2 == 0 { "▀▄▄▀" } else { "▄▀▀▄" };
        self.sprite(x, y, &[wings, " ██ "], C_BAT);
        self.accent(x, y, 1, 1, '•', C_YELLOW_EYE, C_BAT);
        self.accent(x, y, 2, 1, '•', C_YELLOW_EYE, C_BAT);
    }

    fn draw_skeleton(&mut self, x: f32, y: f32) {
        self.sprite(x, y, &["▄██▄", "████", " ╨╨ "], C_SKELETON);
        self.accent(x, y, 1, 1, '●', C_EYE, C_SKELETON);
        self.accent(x, y, 2, 1, '▾', C_EYE, C_SKELETON);
        self.accent(x, y, 3, 1, '●', C_EYE, C_SKELETON);
    }

    fn draw_witch(&mut self, x: f32, y: f32) {
        self.sprite(x, y, &[" ▲  ", "▀▀▀▀"], C_WITCH_HAT);
        self.sprite(x, y, &["", "", "████"], C_WITCH);
        self.accent(x, y, 1, 2, '•', C_GREEN_EYE, C_WITCH);
        self.accent(x, y, 2, 2, '•', C_GREEN_EYE, C_WITCH);
    }

    fn draw_zombie(&mut self, x: f32, y: f32) {
        self.sprite(x, y, &[" ▄▄▄ ", " ███ ", "═███═"], C_ZOMBIE);
        self.accent(x, y, 1, 1, '■', Rgb::WHITE, C_ZOMBIE);
        self.accent(x, y, 3, 1, '▪', Rgb::WHITE, C_ZOMBIE);
    }

    // ── Transients ────────────────────────────────────────────────────────────

    fn draw_particle(&mut self, particle: &Particle) {
        let x = self.sx(particle.position.x);
        let y = self.sy(particle.position.y);
        let under = self.canvas.bg_at(x, y);
        let color = under.lerp(particle.color, particle.alpha());
        let glyph = match particle.kind {
            ParticleKind::Ember => '*',
            ParticleKind::Normal if particle.size > 4.0 => '•',
            ParticleKind::Normal => '·',
        };
        self.canvas.put_char(x, y, glyph, color);
    }

    fn draw_fireball(&mut self, fireball: &Fireball) {
        let center = fireball.body.center();
        let x = self.sx(center.x);
        let y = self.sy(center.y);
        self.canvas.blend_ellipse(Vec2::new(x, y), 14.0, 10.0, C_PUMPKIN, 0.35);
        self.canvas.put_char(x, y, '✹', C_FIREBALL);
    }

    // ── Player ────────────────────────────────────────────────────────────────

    fn draw_player(&mut self, player: &Player) {
        // Player x is already in screen space.
        let x = player.body.x + self.shake.x;
        let y = self.sy(player.body.y);
        let blinking = player.invincible && (self.anim_ms / 100) % 2 == 0;
        let body = if blinking { C_PLAYER_FADED } else { C_PLAYER };

        if player.has_power_up(PowerUpKind::Invincibility) {
            let center = Vec2::new(x + player.body.width / 2.0, y + player.body.height / 2.0);
            self.canvas.blend_ellipse(center, player.body.width, player.body.height * 0.75, C_YELLOW_EYE, 0.3);
        }

        self.sprite(x, y, &["▄██▄", "████", "▀▄▀▄"], body);
        let (left_eye, right_eye) = match player.facing {
            Facing::Right => (1, 3),
            Facing::Left => (0, 2),
        };
        self.accent(x, y, left_eye, 1, '●', C_EYE, body);
        self.accent(x, y, right_eye, 1, '●', C_EYE, body);
    }

    /// Darken toward the corners.
    fn draw_vignette(&mut self) {
        let cols = self.canvas.cols();
        let rows = self.canvas.rows();
        for row in 0..rows {
            for col in 0..cols {
                let dx = (col as f32 + 0.5) / cols as f32 - 0.5;
                let dy = (row as f32 + 0.5) / rows as f32 - 0.5;
                let d = (dx * dx + dy * dy).sqrt() / std::f32::consts::FRAC_1_SQRT_2;
                let alpha = ((d - 0.55) / 0.45).clamp(0.0, 1.0) * 0.6;
                if alpha > 0.0 {
                    self.canvas.shade(col, row, Rgb::BLACK, alpha);
                }
            }
        }
    }
}

pub fn power_up_color(kind: PowerUpKind) -> Rgb {
    match kind {
        PowerUpKind::Invincibility => Rgb::new(0xff, 0xff, 0x00),
        PowerUpKind::Speed => Rgb::new(0x00, 0xff, 0xff),
        PowerUpKind::DoubleJump => Rgb::new(0xff, 0x00, 0xff),
        PowerUpKind::Fireball => Rgb::new(0xff, 0x66, 0x00),
    }
}

pub fn power_up_icon(kind: PowerUpKind) -> char {
    match kind {
        PowerUpKind::Invincibility => '✦',
        PowerUpKind::Speed => '»',
        PowerUpKind::DoubleJump => '↟',
        PowerUpKind::Fireball => '✹',
    }
}
