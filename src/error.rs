use thiserror::Error;

/// Rejected game configuration. Raised before a session starts.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("unknown difficulty '{0}' (expected easy, normal or hard)")]
    UnknownDifficulty(String),

    #[error("arena {width}x{height} is too small (need at least {min_width}x{min_height})")]
    ArenaTooSmall {
        width: f32,
        height: f32,
        min_width: f32,
        min_height: f32,
    },

    #[error("ufo chance {0} is outside 0..=1")]
    UfoChanceOutOfRange(f64),

    #[error("invalid spawn policy: {0}")]
    InvalidSpawnPolicy(&'static str),

    #[error("fire cooldown must be a non-negative number of milliseconds, got {0}")]
    InvalidFireCooldown(f64),
}

/// Failure of an optional audio output. Never fatal to gameplay.
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("audio output unavailable")]
    Unavailable,

    #[error("audio output failed: {0}")]
    Io(#[from] std::io::Error),
}
