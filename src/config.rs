/// Difficulty tiers, spawn policies and the tunables that shape a session.

use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

// ── Gameplay constants ───────────────────────────────────────────────────────

pub const PLAYER_WIDTH: f32 = 50.0;
pub const PLAYER_HEIGHT: f32 = 40.0;
pub const PLAYER_SPEED: f32 = 10.0;
/// Distance of the player's centre above the bottom edge.
pub const PLAYER_BOTTOM_MARGIN: f32 = 80.0;
/// Fraction of the remaining distance covered per frame when following a pointer.
pub const POINTER_FOLLOW: f32 = 0.2;

pub const BULLET_SPEED: f32 = 18.0;
pub const BULLET_RADIUS: f32 = 4.0;
/// Muzzle offset above the player's centre.
pub const BULLET_MUZZLE: f32 = 15.0;
/// Bullets above this y are discarded.
pub const BULLET_OFFSCREEN_Y: f32 = -50.0;

pub const ENEMY_SPAWN_Y: f32 = -60.0;
pub const ENEMY_SPAWN_MARGIN: f32 = 50.0;
/// Enemies further than this below the bottom edge have escaped.
pub const ENEMY_ESCAPE_MARGIN: f32 = 40.0;
pub const ENEMY_MIN_SIZE: f32 = 35.0;
pub const ENEMY_MAX_SIZE: f32 = 55.0;
pub const ENEMY_MIN_SPEED: f32 = 2.0;
pub const ENEMY_MAX_SPEED: f32 = 5.0;
pub const ENEMY_MAX_SPIN: f32 = 0.04;
pub const ENEMY_BASE_REWARD: u32 = 100;
/// Enemy speed grows by this fraction per elapsed minute.
pub const ENEMY_SPEED_GROWTH: f32 = 0.2;

pub const UFO_SIZE: f32 = 60.0;
pub const UFO_SPEED: f32 = 4.0;
pub const UFO_HP: u8 = 2;
pub const UFO_REWARD: u32 = 1000;
pub const UFO_DRIFT: f32 = 5.0;
pub const UFO_DRIFT_FREQ: f32 = 0.08;

pub const EXPLOSION_PARTICLES: usize = 20;

pub const DAMAGE_SHAKE: f32 = 25.0;
pub const UFO_SHAKE: f32 = 15.0;
pub const UFO_FLASH: u32 = 15;
pub const SHAKE_DECAY: f32 = 0.9;

const DEFAULT_STAR_COUNT: usize = 80;
const DEFAULT_FIRE_COOLDOWN_MS: f64 = 120.0;
const DEFAULT_UFO_CHANCE: f64 = 0.05;

/// Spawn rate of [`Difficulty::Normal`]; interval cooldowns are scaled against it.
pub const NORMAL_SPAWN_RATE: f32 = 0.035;

pub const MIN_ARENA_WIDTH: f32 = 200.0;
pub const MIN_ARENA_HEIGHT: f32 = 240.0;

// ── Difficulty ───────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DifficultyParams {
    /// Per-frame spawn probability at t = 0.
    pub spawn_rate: f32,
    pub speed_mult: f32,
    pub score_mult: f32,
    pub starting_lives: u32,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Normal, Difficulty::Hard];

    pub fn params(self) -> DifficultyParams {
        match self {
            Difficulty::Easy => DifficultyParams {
                spawn_rate: 0.02,
                speed_mult: 0.8,
                score_mult: 0.5,
                starting_lives: 5,
            },
            Difficulty::Normal => DifficultyParams {
                spawn_rate: NORMAL_SPAWN_RATE,
                speed_mult: 1.0,
                score_mult: 1.0,
                starting_lives: 3,
            },
            Difficulty::Hard => DifficultyParams {
                spawn_rate: 0.06,
                speed_mult: 1.3,
                score_mult: 2.0,
                starting_lives: 1,
            },
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Difficulty {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "normal" => Ok(Difficulty::Normal),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(ConfigError::UnknownDifficulty(s.to_string())),
        }
    }
}

// ── Spawn policy ─────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SpawnPolicy {
    /// Independent trial every frame with probability
    /// `spawn_rate * (1 + elapsed_minutes * growth_per_minute)`.
    Probability { growth_per_minute: f32 },
    /// Spawn whenever `cooldown` has elapsed since the last spawn; the
    /// cooldown shrinks by `step_ms` per spawn down to `min_cooldown_ms`.
    /// Both ends are scaled by the difficulty's spawn rate.
    Interval {
        initial_cooldown_ms: f64,
        step_ms: f64,
        min_cooldown_ms: f64,
    },
}

impl SpawnPolicy {
    pub const DEFAULT_INTERVAL: SpawnPolicy = SpawnPolicy::Interval {
        initial_cooldown_ms: 1200.0,
        step_ms: 15.0,
        min_cooldown_ms: 350.0,
    };

    fn validate(&self) -> Result<(), ConfigError> {
        match *self {
            SpawnPolicy::Probability { growth_per_minute } => {
                if !growth_per_minute.is_finite() || growth_per_minute < 0.0 {
                    return Err(ConfigError::InvalidSpawnPolicy(
                        "growth per minute must be a non-negative number",
                    ));
                }
            }
            SpawnPolicy::Interval {
                initial_cooldown_ms,
                step_ms,
                min_cooldown_ms,
            } => {
                if !(min_cooldown_ms > 0.0 && min_cooldown_ms.is_finite()) {
                    return Err(ConfigError::InvalidSpawnPolicy(
                        "minimum cooldown must be positive",
                    ));
                }
                if !(initial_cooldown_ms >= min_cooldown_ms && initial_cooldown_ms.is_finite()) {
                    return Err(ConfigError::InvalidSpawnPolicy(
                        "initial cooldown must not be below the minimum",
                    ));
                }
                if !(step_ms >= 0.0 && step_ms.is_finite()) {
                    return Err(ConfigError::InvalidSpawnPolicy(
                        "cooldown step must be non-negative",
                    ));
                }
            }
        }
        Ok(())
    }
}

impl Default for SpawnPolicy {
    fn default() -> Self {
        SpawnPolicy::Probability {
            growth_per_minute: 0.5,
        }
    }
}

// ── Arena & session config ───────────────────────────────────────────────────

/// Visible play area in world units, origin top-left, y growing downward.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Arena {
    pub width: f32,
    pub height: f32,
}

impl Default for Arena {
    fn default() -> Self {
        Arena {
            width: 640.0,
            height: 720.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct GameConfig {
    pub difficulty: Difficulty,
    pub arena: Arena,
    pub spawn_policy: SpawnPolicy,
    /// An enemy slipping past the bottom edge costs a life.
    pub escape_counts_as_damage: bool,
    pub star_count: usize,
    pub fire_cooldown_ms: f64,
    pub ufo_chance: f64,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            difficulty: Difficulty::default(),
            arena: Arena::default(),
            spawn_policy: SpawnPolicy::default(),
            escape_counts_as_damage: true,
            star_count: DEFAULT_STAR_COUNT,
            fire_cooldown_ms: DEFAULT_FIRE_COOLDOWN_MS,
            ufo_chance: DEFAULT_UFO_CHANCE,
        }
    }
}

impl GameConfig {
    /// Replace the difficulty by its key, e.g. `"hard"`.
    pub fn with_difficulty_key(mut self, key: &str) -> Result<Self, ConfigError> {
        self.difficulty = key.parse()?;
        Ok(self)
    }

    pub fn params(&self) -> DifficultyParams {
        self.difficulty.params()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let Arena { width, height } = self.arena;
        if !(width >= MIN_ARENA_WIDTH && height >= MIN_ARENA_HEIGHT) {
            return Err(ConfigError::ArenaTooSmall {
                width,
                height,
                min_width: MIN_ARENA_WIDTH,
                min_height: MIN_ARENA_HEIGHT,
            });
        }
        if !(0.0..=1.0).contains(&self.ufo_chance) {
            return Err(ConfigError::UfoChanceOutOfRange(self.ufo_chance));
        }
        if !(self.fire_cooldown_ms >= 0.0 && self.fire_cooldown_ms.is_finite()) {
            return Err(ConfigError::InvalidFireCooldown(self.fire_cooldown_ms));
        }
        self.spawn_policy.validate()
    }
}
