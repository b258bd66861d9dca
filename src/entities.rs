/// All game entity types, each with its own per-frame update rule.

use rand::Rng;

use crate::config::{
    Arena, GameConfig, BULLET_MUZZLE, BULLET_OFFSCREEN_Y, BULLET_RADIUS, BULLET_SPEED,
    ENEMY_ESCAPE_MARGIN, PLAYER_BOTTOM_MARGIN, PLAYER_HEIGHT, PLAYER_SPEED, PLAYER_WIDTH,
    POINTER_FOLLOW, SHAKE_DECAY, UFO_DRIFT, UFO_DRIFT_FREQ,
};
use crate::spawn::SpawnController;

// ── Value types ──────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Point { x, y }
    }

    pub fn distance(self, other: Point) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Rotate around the origin by `angle` radians.
    pub fn rotated(self, angle: f32) -> Point {
        let (sin, cos) = angle.sin_cos();
        Point::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }

    pub fn offset(self, by: Point) -> Point {
        Point::new(self.x + by.x, self.y + by.y)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }

    /// `hue` in degrees, `saturation` and `brightness` in 0..=1.
    pub fn from_hsb(hue: f32, saturation: f32, brightness: f32) -> Self {
        let s = saturation.clamp(0.0, 1.0);
        let v = brightness.clamp(0.0, 1.0);
        let c = v * s;
        let h = hue.rem_euclid(360.0) / 60.0;
        let x = c * (1.0 - (h % 2.0 - 1.0).abs());
        let (r, g, b) = match h as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };
        let m = v - c;
        let to_u8 = |ch: f32| ((ch + m) * 255.0).round().clamp(0.0, 255.0) as u8;
        Rgb::new(to_u8(r), to_u8(g), to_u8(b))
    }
}

pub const PLAYER_COLOR: Rgb = Rgb::new(0x00, 0xf2, 0xff);
pub const UFO_COLOR: Rgb = Rgb::new(0xff, 0xff, 0x00);
pub const BULLET_COLOR: Rgb = Rgb::new(0xff, 0xff, 0xff);

// ── Session status & input ───────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameStatus {
    Title,
    Playing,
    GameOver,
}

/// Input polled at the start of a frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameInput {
    pub left: bool,
    pub right: bool,
    pub fire: bool,
    /// Horizontal position of a pressed pointer (mouse or touch), if any.
    /// The player follows it and fires while it is held.
    pub pointer: Option<f32>,
}

impl FrameInput {
    pub fn fire_active(&self) -> bool {
        self.fire || self.pointer.is_some()
    }
}

// ── Player ───────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub speed: f32,
    /// Clock reading of the last shot; `None` until the first one.
    pub last_shot_ms: Option<f64>,
}

impl Player {
    pub fn new(arena: &Arena) -> Self {
        Player {
            x: arena.width / 2.0,
            y: arena.height - PLAYER_BOTTOM_MARGIN,
            width: PLAYER_WIDTH,
            height: PLAYER_HEIGHT,
            speed: PLAYER_SPEED,
            last_shot_ms: None,
        }
    }

    pub fn center(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Apply keyboard movement and pointer following, then keep the hull on screen.
    pub fn steer(&mut self, input: &FrameInput, arena: &Arena) {
        if input.left {
            self.x -= self.speed;
        }
        if input.right {
            self.x += self.speed;
        }
        if let Some(target) = input.pointer {
            self.x += (target - self.x) * POINTER_FOLLOW;
        }
        let half = self.width / 2.0;
        self.x = self.x.clamp(half, arena.width - half);
    }

    pub fn can_fire(&self, now_ms: f64, cooldown_ms: f64) -> bool {
        match self.last_shot_ms {
            None => true,
            Some(last) => now_ms - last > cooldown_ms,
        }
    }

    pub fn shoot(&mut self, now_ms: f64) -> Bullet {
        self.last_shot_ms = Some(now_ms);
        Bullet::new(self.x, self.y - BULLET_MUZZLE)
    }
}

// ── Bullet ───────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Bullet {
    pub x: f32,
    pub y: f32,
    /// Upward speed per frame.
    pub speed: f32,
    pub radius: f32,
}

impl Bullet {
    pub fn new(x: f32, y: f32) -> Self {
        Bullet {
            x,
            y,
            speed: BULLET_SPEED,
            radius: BULLET_RADIUS,
        }
    }

    pub fn center(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn update(&mut self) {
        self.y -= self.speed;
    }

    pub fn is_off_screen(&self) -> bool {
        self.y < BULLET_OFFSCREEN_Y
    }
}

// ── Enemy ────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Enemy {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    /// Downward speed per frame.
    pub speed: f32,
    pub rotation: f32,
    pub rotation_speed: f32,
    /// Polygon vertices relative to the centre, before rotation.
    pub outline: Vec<Point>,
    pub hp: u8,
    pub is_ufo: bool,
    pub reward: u32,
    pub color: Rgb,
}

impl Enemy {
    pub fn center(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Bullets closer than this (plus their own radius) hit.
    pub fn hit_radius(&self) -> f32 {
        self.size * 0.6
    }

    pub fn body_radius(&self) -> f32 {
        self.size * 0.5
    }

    pub fn update(&mut self, frame: u64) {
        self.y += self.speed;
        self.rotation += self.rotation_speed;
        if self.is_ufo {
            self.x += (frame as f32 * UFO_DRIFT_FREQ).sin() * UFO_DRIFT;
        }
    }

    pub fn has_escaped(&self, arena: &Arena) -> bool {
        self.y > arena.height + ENEMY_ESCAPE_MARGIN
    }

    /// Outline rotated and placed at the enemy's position.
    pub fn world_outline(&self) -> Vec<Point> {
        self.outline
            .iter()
            .map(|p| p.rotated(self.rotation).offset(self.center()))
            .collect()
    }
}

// ── Particle ─────────────────────────────────────────────────────────────────

pub const PARTICLE_FULL_LIFE: i32 = 255;
const PARTICLE_DRAG: f32 = 0.95;

#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub life: i32,
    /// Life lost per frame.
    pub decay: i32,
    pub size: f32,
    pub color: Rgb,
}

impl Particle {
    pub fn new<R: Rng + ?Sized>(rng: &mut R, origin: Point, color: Rgb) -> Self {
        let angle = rng.gen_range(0.0..std::f32::consts::TAU);
        let force = rng.gen_range(2.0..7.0);
        Particle {
            x: origin.x,
            y: origin.y,
            vx: angle.cos() * force,
            vy: angle.sin() * force,
            life: PARTICLE_FULL_LIFE,
            decay: rng.gen_range(8..15),
            size: rng.gen_range(2.0..5.0),
            color,
        }
    }

    pub fn update(&mut self) {
        self.x += self.vx;
        self.y += self.vy;
        self.vx *= PARTICLE_DRAG;
        self.vy *= PARTICLE_DRAG;
        self.life -= self.decay;
    }

    pub fn is_dead(&self) -> bool {
        self.life <= 0
    }
}

// ── Star ─────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Star {
    pub x: f32,
    pub y: f32,
    /// Depth in `1.0..4.0`; nearer stars are bigger, brighter and faster.
    pub z: f32,
    pub speed: f32,
}

impl Star {
    /// A star anywhere on screen, for the initial field.
    pub fn scattered<R: Rng + ?Sized>(rng: &mut R, arena: &Arena) -> Self {
        let mut star = Star::at_top(rng, arena);
        star.y = rng.gen_range(0.0..arena.height);
        star
    }

    pub fn at_top<R: Rng + ?Sized>(rng: &mut R, arena: &Arena) -> Self {
        let z = rng.gen_range(1.0..4.0);
        Star {
            x: rng.gen_range(0.0..arena.width),
            y: -10.0,
            z,
            speed: z * 1.5,
        }
    }

    pub fn update<R: Rng + ?Sized>(&mut self, rng: &mut R, arena: &Arena) {
        self.y += self.speed;
        if self.y > arena.height {
            *self = Star::at_top(rng, arena);
        }
    }

    /// Alpha in 50..=200 by depth.
    pub fn brightness(&self) -> u8 {
        let t = ((self.z - 1.0) / 3.0).clamp(0.0, 1.0);
        (50.0 + t * 150.0) as u8
    }
}

// ── Screen effects ───────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Effects {
    /// Shake amplitude in world units.
    pub shake: f32,
    /// Remaining flash frames.
    pub flash: u32,
}

impl Effects {
    pub fn shake(&mut self, amplitude: f32) {
        self.shake = self.shake.max(amplitude);
    }

    pub fn flash(&mut self, frames: u32) {
        self.flash = self.flash.max(frames);
    }

    pub fn decay(&mut self) {
        self.shake *= SHAKE_DECAY;
        if self.shake < 0.05 {
            self.shake = 0.0;
        }
        self.flash = self.flash.saturating_sub(1);
    }
}

// ── Master game state ────────────────────────────────────────────────────────

/// One play session. Owns every entity collection; the frame loop in
/// [`crate::compute`] is the only thing that mutates it.
#[derive(Clone, Debug)]
pub struct GameSession {
    pub config: GameConfig,
    pub status: GameStatus,
    pub score: u32,
    /// Highest final score reached by this session value.
    pub best_score: u32,
    pub lives: u32,
    /// Clock reading when the current run started.
    pub start_ms: f64,
    /// Clock reading of the latest tick.
    pub now_ms: f64,
    pub frame: u64,
    pub player: Player,
    pub bullets: Vec<Bullet>,
    pub enemies: Vec<Enemy>,
    pub particles: Vec<Particle>,
    pub stars: Vec<Star>,
    pub effects: Effects,
    pub spawner: SpawnController,
}
