/// Frame loop and session state machine.
///
/// The session is owned by the caller and advanced in place, one `tick`
/// per display frame. Clock, input, randomness and hooks are all injected,
/// so a seeded RNG and a fixed clock make a run fully reproducible.
///
/// ```text
/// Title ──Start──▶ Playing ──lives = 0──▶ GameOver ──Restart──▶ Playing
/// ```

use rand::Rng;
use tracing::{debug, info};

use crate::collision::{self, CollisionReport};
use crate::config::{Difficulty, GameConfig, DAMAGE_SHAKE};
use crate::entities::{Effects, FrameInput, GameSession, GameStatus, Player, Star};
use crate::error::ConfigError;
use crate::hooks::{play, GameHooks, SoundCue};
use crate::spawn::SpawnController;

/// Discrete commands from the host UI.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Leave the title screen.
    Start,
    /// Play again after a game over.
    Restart,
}

impl GameSession {
    /// Build a session on the title screen. Fails fast on invalid config.
    pub fn new<R: Rng + ?Sized>(config: GameConfig, rng: &mut R) -> Result<Self, ConfigError> {
        config.validate()?;
        let params = config.params();
        let stars = (0..config.star_count)
            .map(|_| Star::scattered(rng, &config.arena))
            .collect();

        Ok(GameSession {
            status: GameStatus::Title,
            score: 0,
            best_score: 0,
            lives: params.starting_lives,
            start_ms: 0.0,
            now_ms: 0.0,
            frame: 0,
            player: Player::new(&config.arena),
            bullets: Vec::new(),
            enemies: Vec::new(),
            particles: Vec::new(),
            stars,
            effects: Effects::default(),
            spawner: SpawnController::new(config.spawn_policy, &params),
            config,
        })
    }

    /// Milliseconds since the current run started.
    pub fn elapsed_ms(&self) -> f64 {
        (self.now_ms - self.start_ms).max(0.0)
    }

    /// Change difficulty by key. Only allowed outside of play; takes
    /// effect at the next start.
    pub fn select_difficulty(&mut self, key: &str) -> Result<bool, ConfigError> {
        let difficulty: Difficulty = key.parse()?;
        if self.status == GameStatus::Playing {
            return Ok(false);
        }
        self.config.difficulty = difficulty;
        if self.status == GameStatus::Title {
            self.lives = self.config.params().starting_lives;
        }
        debug!(%difficulty, "difficulty selected");
        Ok(true)
    }

    /// Apply a start/restart command. Returns whether the session changed state.
    pub fn handle_command<H: GameHooks + ?Sized>(
        &mut self,
        command: Command,
        now_ms: f64,
        hooks: &mut H,
    ) -> bool {
        match (command, self.status) {
            (Command::Start, GameStatus::Title) | (Command::Restart, GameStatus::GameOver) => {
                self.start(now_ms, hooks);
                true
            }
            _ => false,
        }
    }

    /// Reset everything gameplay-related and enter `Playing`.
    pub fn start<H: GameHooks + ?Sized>(&mut self, now_ms: f64, hooks: &mut H) {
        let params = self.config.params();
        self.status = GameStatus::Playing;
        self.score = 0;
        self.lives = params.starting_lives;
        self.start_ms = now_ms;
        self.now_ms = now_ms;
        self.frame = 0;
        self.player = Player::new(&self.config.arena);
        self.bullets = Vec::new();
        self.enemies = Vec::new();
        self.particles = Vec::new();
        self.effects = Effects::default();
        self.spawner.reset(&params);

        info!(difficulty = %self.config.difficulty, lives = self.lives, "run started");
        hooks.hud_changed(self.score, self.lives);
    }

    /// Lose one life. Returns `false` when nothing happened because the
    /// session is not in play.
    pub fn take_damage<H: GameHooks + ?Sized>(&mut self, hooks: &mut H) -> bool {
        if self.status != GameStatus::Playing {
            return false;
        }
        self.lives = self.lives.saturating_sub(1);
        self.effects.shake(DAMAGE_SHAKE);
        play(hooks, SoundCue::Hit);
        hooks.hud_changed(self.score, self.lives);
        debug!(lives = self.lives, "player damaged");

        if self.lives == 0 {
            self.game_over(hooks);
        }
        true
    }

    fn game_over<H: GameHooks + ?Sized>(&mut self, hooks: &mut H) {
        self.status = GameStatus::GameOver;
        // The game-over screen is static.
        self.effects = Effects::default();
        self.best_score = self.best_score.max(self.score);
        info!(score = self.score, best = self.best_score, frame = self.frame, "game over");
        hooks.game_over(self.score);
    }

    /// Advance one frame.
    ///
    /// The background always scrolls. Everything else only moves while
    /// `Playing`; title and game-over screens are frozen.
    pub fn tick<R, H>(
        &mut self,
        input: &FrameInput,
        now_ms: f64,
        rng: &mut R,
        hooks: &mut H,
    ) -> CollisionReport
    where
        R: Rng + ?Sized,
        H: GameHooks + ?Sized,
    {
        self.now_ms = now_ms;
        let arena = self.config.arena;

        // ── 1. Background ────────────────────────────────────────────────────
        for star in &mut self.stars {
            star.update(rng, &arena);
        }

        if self.status != GameStatus::Playing {
            return CollisionReport::default();
        }
        self.frame += 1;

        // ── 2. Spawn ─────────────────────────────────────────────────────────
        let elapsed = self.elapsed_ms();
        if let Some(enemy) = self.spawner.poll(elapsed, &self.config, rng) {
            self.enemies.push(enemy);
        }

        // ── 3. Player ────────────────────────────────────────────────────────
        self.player.steer(input, &arena);
        if input.fire_active() && self.player.can_fire(now_ms, self.config.fire_cooldown_ms) {
            let bullet = self.player.shoot(now_ms);
            self.bullets.push(bullet);
            play(hooks, SoundCue::Shoot);
        }

        // ── 4. Bullets ───────────────────────────────────────────────────────
        for bullet in &mut self.bullets {
            bullet.update();
        }
        self.bullets.retain(|b| !b.is_off_screen());

        // ── 5. Enemies ───────────────────────────────────────────────────────
        let frame = self.frame;
        for enemy in &mut self.enemies {
            enemy.update(frame);
        }

        // ── 6. Particles ─────────────────────────────────────────────────────
        for particle in &mut self.particles {
            particle.update();
        }
        self.particles.retain(|p| !p.is_dead());

        // ── 7. Collisions ────────────────────────────────────────────────────
        let report = collision::resolve(self, rng, hooks);
        if self.status != GameStatus::Playing {
            return report;
        }

        // ── 8. Transient effects ─────────────────────────────────────────────
        self.effects.decay();
        report
    }
}
