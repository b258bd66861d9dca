/// Outward notifications: sound cues and HUD updates.

use tracing::debug;

use crate::error::AudioError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SoundCue {
    Shoot,
    Explosion,
    Hit,
    UfoKill,
}

/// Everything the core tells its host about. All methods default to no-ops.
pub trait GameHooks {
    /// Fire-and-forget. An error here is logged and otherwise ignored.
    fn play_sound(&mut self, cue: SoundCue) -> Result<(), AudioError> {
        let _ = cue;
        Ok(())
    }

    /// Called after every change to score or lives.
    fn hud_changed(&mut self, score: u32, lives: u32) {
        let _ = (score, lives);
    }

    fn game_over(&mut self, final_score: u32) {
        let _ = final_score;
    }
}

/// Hooks that ignore everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoHooks;

impl GameHooks for NoHooks {}

pub(crate) fn play<H: GameHooks + ?Sized>(hooks: &mut H, cue: SoundCue) {
    if let Err(err) = hooks.play_sound(cue) {
        debug!(?cue, error = %err, "sound cue dropped");
    }
}
