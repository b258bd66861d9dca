//! Game core for Neon Sentinel, a vertical-scrolling shooter.
//!
//! Everything in here is host-agnostic: the caller supplies the clock,
//! the per-frame input snapshot, a random source, a [`draw::Canvas`] and
//! a [`hooks::GameHooks`] implementation.

pub mod collision;
pub mod compute;
pub mod config;
pub mod draw;
pub mod entities;
pub mod error;
pub mod hooks;
pub mod spawn;

pub use compute::Command;
pub use config::{Arena, Difficulty, DifficultyParams, GameConfig, SpawnPolicy};
pub use entities::{FrameInput, GameSession, GameStatus};
pub use error::{AudioError, ConfigError};
pub use hooks::{GameHooks, NoHooks, SoundCue};
