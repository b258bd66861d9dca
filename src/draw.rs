/// Drawing. The core only ever talks to a [`Canvas`]; the host decides what
/// a line or an ellipse actually turns into.

use crate::config::UFO_FLASH;
use crate::entities::{
    Bullet, Enemy, GameSession, GameStatus, Particle, Player, Point, Rgb, Star, BULLET_COLOR,
    PLAYER_COLOR,
};

const GRID_COLOR: Rgb = Rgb::new(0x00, 0x3a, 0x3d);
const GRID_SPACING: f32 = 60.0;
const GRID_SCROLL: f32 = 2.0;
const FLASH_MAX_ALPHA: f32 = 150.0 / 255.0;

/// Player hull, nose up, relative to its centre.
const PLAYER_HULL: [Point; 5] = [
    Point::new(0.0, -25.0),
    Point::new(25.0, 15.0),
    Point::new(10.0, 5.0),
    Point::new(-10.0, 5.0),
    Point::new(-25.0, 15.0),
];

/// 2D drawing primitives. Coordinates are world units.
pub trait Canvas {
    fn line(&mut self, from: Point, to: Point, color: Rgb);

    /// Closed, stroked polygon.
    fn polygon(&mut self, points: &[Point], color: Rgb);

    fn ellipse(&mut self, center: Point, rx: f32, ry: f32, color: Rgb, filled: bool);

    /// Glow for the following strokes; `0.0` turns it off.
    fn glow(&mut self, blur: f32, color: Rgb) {
        let _ = (blur, color);
    }

    /// Full-screen white overlay with the given opacity in `0.0..=1.0`.
    fn flash(&mut self, alpha: f32) {
        let _ = alpha;
    }
}

/// Draw one frame of the session. `shake` is added to every coordinate
/// except the background grid and flash, and only while playing.
pub fn draw_frame<C: Canvas + ?Sized>(session: &GameSession, canvas: &mut C, shake: Point) {
    draw_grid(session, canvas);
    for star in &session.stars {
        draw_star(canvas, star);
    }
    if session.status == GameStatus::Title {
        return;
    }
    let shake = if session.status == GameStatus::Playing {
        shake
    } else {
        Point::default()
    };

    draw_player(canvas, &session.player, shake);
    for bullet in &session.bullets {
        draw_bullet(canvas, bullet, shake);
    }
    for enemy in &session.enemies {
        draw_enemy(canvas, enemy, shake);
    }
    for particle in &session.particles {
        draw_particle(canvas, particle, shake);
    }
    canvas.glow(0.0, BULLET_COLOR);

    if session.effects.flash > 0 {
        let alpha = session.effects.flash as f32 / UFO_FLASH as f32 * FLASH_MAX_ALPHA;
        canvas.flash(alpha.min(FLASH_MAX_ALPHA));
    }
}

fn draw_grid<C: Canvas + ?Sized>(session: &GameSession, canvas: &mut C) {
    let arena = session.config.arena;
    let y_offset = (session.frame as f32 * GRID_SCROLL) % GRID_SPACING;

    let mut x = 0.0;
    while x <= arena.width {
        canvas.line(Point::new(x, 0.0), Point::new(x, arena.height), GRID_COLOR);
        x += GRID_SPACING;
    }
    let mut y = y_offset;
    while y <= arena.height {
        canvas.line(Point::new(0.0, y), Point::new(arena.width, y), GRID_COLOR);
        y += GRID_SPACING;
    }
}

fn draw_star<C: Canvas + ?Sized>(canvas: &mut C, star: &Star) {
    let v = star.brightness();
    let r = star.z / 2.0;
    canvas.ellipse(Point::new(star.x, star.y), r, r, Rgb::new(v, v, v), true);
}

fn draw_player<C: Canvas + ?Sized>(canvas: &mut C, player: &Player, shake: Point) {
    let origin = player.center().offset(shake);
    let hull: Vec<Point> = PLAYER_HULL.iter().map(|p| p.offset(origin)).collect();

    canvas.glow(15.0, PLAYER_COLOR);
    canvas.polygon(&hull, PLAYER_COLOR);
    // Engine flame
    canvas.ellipse(
        Point::new(0.0, 10.0).offset(origin),
        5.0,
        2.5,
        Rgb::new(0xff, 0xff, 0xff),
        true,
    );
}

fn draw_bullet<C: Canvas + ?Sized>(canvas: &mut C, bullet: &Bullet, shake: Point) {
    canvas.glow(8.0, BULLET_COLOR);
    canvas.ellipse(
        bullet.center().offset(shake),
        bullet.radius,
        bullet.radius * 2.5,
        BULLET_COLOR,
        true,
    );
}

fn draw_enemy<C: Canvas + ?Sized>(canvas: &mut C, enemy: &Enemy, shake: Point) {
    let outline: Vec<Point> = enemy.world_outline().into_iter().map(|p| p.offset(shake)).collect();
    canvas.glow(12.0, enemy.color);
    canvas.polygon(&outline, enemy.color);

    if enemy.is_ufo {
        let center = enemy.center().offset(shake);
        canvas.ellipse(center, enemy.size * 0.2, enemy.size * 0.2, enemy.color, false);
        canvas.glow(20.0, enemy.color);
        canvas.ellipse(center, enemy.size * 0.4, enemy.size * 0.4, enemy.color, false);
    }
}

fn draw_particle<C: Canvas + ?Sized>(canvas: &mut C, particle: &Particle, shake: Point) {
    if particle.is_dead() {
        return;
    }
    let r = particle.size / 2.0;
    canvas.glow(0.0, particle.color);
    canvas.ellipse(
        Point::new(particle.x, particle.y).offset(shake),
        r,
        r,
        particle.color,
        true,
    );
}
