/// Enemy spawning: when to spawn, and what comes out.

use rand::Rng;
use tracing::trace;

use crate::config::{
    Arena, DifficultyParams, GameConfig, SpawnPolicy, ENEMY_BASE_REWARD, ENEMY_MAX_SIZE,
    ENEMY_MAX_SPEED, ENEMY_MAX_SPIN, ENEMY_MIN_SIZE, ENEMY_MIN_SPEED, ENEMY_SPAWN_MARGIN,
    ENEMY_SPAWN_Y, ENEMY_SPEED_GROWTH, NORMAL_SPAWN_RATE, UFO_HP, UFO_REWARD, UFO_SIZE, UFO_SPEED,
};
use crate::entities::{Enemy, Point, Rgb, UFO_COLOR};

const OUTLINE_MIN_VERTICES: usize = 7;
const OUTLINE_MAX_VERTICES: usize = 13; // exclusive
const OUTLINE_JITTER: (f32, f32) = (0.6, 1.4);

fn minutes(elapsed_ms: f64) -> f32 {
    (elapsed_ms / 60_000.0) as f32
}

/// Per-frame spawn probability under [`SpawnPolicy::Probability`].
pub fn spawn_probability(params: &DifficultyParams, elapsed_ms: f64, growth_per_minute: f32) -> f32 {
    params.spawn_rate * (1.0 + minutes(elapsed_ms) * growth_per_minute)
}

/// Speed multiplier from elapsed play time: +20% per minute.
pub fn speed_boost(elapsed_ms: f64) -> f32 {
    1.0 + minutes(elapsed_ms) * ENEMY_SPEED_GROWTH
}

/// Scale factor applied to interval cooldowns: harder tiers spawn sooner.
fn interval_scale(params: &DifficultyParams) -> f64 {
    f64::from(NORMAL_SPAWN_RATE / params.spawn_rate)
}

// ── Controller ───────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct SpawnController {
    policy: SpawnPolicy,
    /// Elapsed time of the last spawn (interval policy only).
    last_spawn_ms: f64,
    /// Current cooldown (interval policy only), already difficulty-scaled.
    cooldown_ms: f64,
}

impl SpawnController {
    pub fn new(policy: SpawnPolicy, params: &DifficultyParams) -> Self {
        let mut controller = SpawnController {
            policy,
            last_spawn_ms: 0.0,
            cooldown_ms: 0.0,
        };
        controller.reset(params);
        controller
    }

    pub fn policy(&self) -> SpawnPolicy {
        self.policy
    }

    pub fn cooldown_ms(&self) -> f64 {
        self.cooldown_ms
    }

    pub fn reset(&mut self, params: &DifficultyParams) {
        self.last_spawn_ms = 0.0;
        self.cooldown_ms = match self.policy {
            SpawnPolicy::Probability { .. } => 0.0,
            SpawnPolicy::Interval {
                initial_cooldown_ms,
                ..
            } => initial_cooldown_ms * interval_scale(params),
        };
    }

    /// Decide whether this frame spawns. Advances the interval schedule when it does.
    pub fn should_spawn<R: Rng + ?Sized>(
        &mut self,
        elapsed_ms: f64,
        params: &DifficultyParams,
        rng: &mut R,
    ) -> bool {
        match self.policy {
            SpawnPolicy::Probability { growth_per_minute } => {
                let p = spawn_probability(params, elapsed_ms, growth_per_minute);
                rng.gen::<f32>() < p
            }
            SpawnPolicy::Interval {
                step_ms,
                min_cooldown_ms,
                ..
            } => {
                if elapsed_ms - self.last_spawn_ms < self.cooldown_ms {
                    return false;
                }
                self.last_spawn_ms = elapsed_ms;
                let floor = min_cooldown_ms * interval_scale(params);
                self.cooldown_ms = (self.cooldown_ms - step_ms).max(floor);
                true
            }
        }
    }

    /// Run one frame of the spawn schedule, returning the new enemy if any.
    pub fn poll<R: Rng + ?Sized>(
        &mut self,
        elapsed_ms: f64,
        config: &GameConfig,
        rng: &mut R,
    ) -> Option<Enemy> {
        let params = config.params();
        if !self.should_spawn(elapsed_ms, &params, rng) {
            return None;
        }
        let is_ufo = rng.gen::<f64>() < config.ufo_chance;
        let enemy = build_enemy(rng, &config.arena, &params, elapsed_ms, is_ufo);
        trace!(x = enemy.x, speed = enemy.speed, is_ufo, "enemy spawned");
        Some(enemy)
    }
}

// ── Construction ─────────────────────────────────────────────────────────────

/// Build an enemy just above the top edge.
pub fn build_enemy<R: Rng + ?Sized>(
    rng: &mut R,
    arena: &Arena,
    params: &DifficultyParams,
    elapsed_ms: f64,
    is_ufo: bool,
) -> Enemy {
    let x = rng.gen_range(ENEMY_SPAWN_MARGIN..arena.width - ENEMY_SPAWN_MARGIN);
    let size = if is_ufo {
        UFO_SIZE
    } else {
        rng.gen_range(ENEMY_MIN_SIZE..ENEMY_MAX_SIZE)
    };
    let base_speed = if is_ufo {
        UFO_SPEED
    } else {
        rng.gen_range(ENEMY_MIN_SPEED..ENEMY_MAX_SPEED)
    };
    let color = if is_ufo {
        UFO_COLOR
    } else {
        Rgb::from_hsb(rng.gen_range(280..340) as f32, 0.8, 1.0)
    };
    let reward = if is_ufo {
        UFO_REWARD
    } else {
        (ENEMY_BASE_REWARD as f32 * params.score_mult).round() as u32
    };
    let outline = generate_outline(rng, size);

    Enemy {
        x,
        y: ENEMY_SPAWN_Y,
        size,
        speed: base_speed * params.speed_mult * speed_boost(elapsed_ms),
        rotation: 0.0,
        rotation_speed: rng.gen_range(-ENEMY_MAX_SPIN..ENEMY_MAX_SPIN),
        outline,
        hp: if is_ufo { UFO_HP } else { 1 },
        is_ufo,
        reward,
        color,
    }
}

/// Jagged polygon around the origin: vertices at even angles, each at
/// `size/2` scaled by a random factor in `0.6..1.4`.
pub fn generate_outline<R: Rng + ?Sized>(rng: &mut R, size: f32) -> Vec<Point> {
    let count = rng.gen_range(OUTLINE_MIN_VERTICES..OUTLINE_MAX_VERTICES);
    (0..count)
        .map(|i| {
            let angle = i as f32 / count as f32 * std::f32::consts::TAU;
            let r = size / 2.0 * rng.gen_range(OUTLINE_JITTER.0..OUTLINE_JITTER.1);
            Point::new(angle.cos() * r, angle.sin() * r)
        })
        .collect()
}
