/// Per-frame collision pass.
///
/// Runs after everything has moved. Destroyed entities are first marked,
/// then compacted out once the pass is done, so list order during the
/// pass is the order entities were created in.

use rand::Rng;
use tracing::debug;

use crate::config::{EXPLOSION_PARTICLES, UFO_FLASH, UFO_SHAKE};
use crate::entities::{GameSession, GameStatus, Particle, Point, Rgb};
use crate::hooks::{play, GameHooks, SoundCue};

/// What happened during one collision pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CollisionReport {
    /// Enemies destroyed by bullets.
    pub kills: usize,
    /// Bullet hits that left the enemy alive.
    pub hits: usize,
    /// Enemies that rammed the player.
    pub contacts: usize,
    /// Enemies that slipped past the bottom edge.
    pub escapes: usize,
    /// Lives actually lost.
    pub damage: u32,
}

/// Push an explosion of [`EXPLOSION_PARTICLES`] particles at `origin`.
pub fn spawn_explosion<R: Rng + ?Sized>(
    particles: &mut Vec<Particle>,
    origin: Point,
    color: Rgb,
    rng: &mut R,
) {
    particles.extend((0..EXPLOSION_PARTICLES).map(|_| Particle::new(rng, origin, color)));
}

/// Drop every element whose `removed` flag is set, keeping order.
fn compact<T>(items: &mut Vec<T>, removed: &[bool]) {
    let mut flags = removed.iter();
    items.retain(|_| !flags.next().copied().unwrap_or(false));
}

pub fn resolve<R, H>(session: &mut GameSession, rng: &mut R, hooks: &mut H) -> CollisionReport
where
    R: Rng + ?Sized,
    H: GameHooks + ?Sized,
{
    let mut report = CollisionReport::default();
    if session.status != GameStatus::Playing {
        return report;
    }

    let mut destroyed = vec![false; session.enemies.len()];

    // ── 1. Bullets ↔ enemies ─────────────────────────────────────────────────
    let mut spent = vec![false; session.bullets.len()];
    for (bi, bullet) in session.bullets.iter().enumerate() {
        for (ei, enemy) in session.enemies.iter_mut().enumerate() {
            if destroyed[ei] {
                continue;
            }
            if bullet.center().distance(enemy.center()) >= enemy.hit_radius() + bullet.radius {
                continue;
            }

            spent[bi] = true;
            enemy.hp = enemy.hp.saturating_sub(1);
            if enemy.hp > 0 {
                report.hits += 1;
                play(hooks, SoundCue::Hit);
                break;
            }

            destroyed[ei] = true;
            report.kills += 1;
            spawn_explosion(&mut session.particles, enemy.center(), enemy.color, rng);
            session.score = session.score.saturating_add(enemy.reward);
            if enemy.is_ufo {
                session.effects.shake(UFO_SHAKE);
                session.effects.flash(UFO_FLASH);
                play(hooks, SoundCue::UfoKill);
            } else {
                play(hooks, SoundCue::Explosion);
            }
            debug!(reward = enemy.reward, is_ufo = enemy.is_ufo, score = session.score, "enemy destroyed");
            hooks.hud_changed(session.score, session.lives);
            break;
        }
    }
    compact(&mut session.bullets, &spent);

    // ── 2. Enemies ↔ player, 3. enemies past the bottom edge ─────────────────
    let player = session.player.center();
    let player_radius = session.player.width * 0.5;
    for ei in 0..session.enemies.len() {
        if destroyed[ei] {
            continue;
        }
        // After a fatal hit nothing else touches the player, but escaped
        // enemies are still cleared out.
        let playing = session.status == GameStatus::Playing;

        let enemy = &session.enemies[ei];
        let (origin, color) = (enemy.center(), enemy.color);
        if playing && player.distance(origin) < player_radius + enemy.body_radius() {
            destroyed[ei] = true;
            report.contacts += 1;
            spawn_explosion(&mut session.particles, origin, color, rng);
            if session.take_damage(hooks) {
                report.damage += 1;
            }
        } else if enemy.has_escaped(&session.config.arena) {
            destroyed[ei] = true;
            report.escapes += 1;
            if session.config.escape_counts_as_damage && session.take_damage(hooks) {
                report.damage += 1;
            }
        }
    }
    compact(&mut session.enemies, &destroyed);

    report
}
