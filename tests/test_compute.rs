use neon_sentinel::compute::*;
use neon_sentinel::config::*;
use neon_sentinel::entities::*;
use neon_sentinel::error::*;
use neon_sentinel::hooks::*;

use rand::rngs::StdRng;
use rand::SeedableRng;

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

/// Default config with an interval so long that nothing ever spawns.
fn quiet_config() -> GameConfig {
    GameConfig {
        spawn_policy: SpawnPolicy::Interval {
            initial_cooldown_ms: 1e12,
            step_ms: 0.0,
            min_cooldown_ms: 1e12,
        },
        ..GameConfig::default()
    }
}

fn playing_session() -> GameSession {
    let mut session = GameSession::new(quiet_config(), &mut seeded_rng()).unwrap();
    session.start(0.0, &mut NoHooks);
    session
}

fn still_enemy(x: f32, y: f32) -> Enemy {
    Enemy {
        x,
        y,
        size: 40.0,
        speed: 0.0,
        rotation: 0.0,
        rotation_speed: 0.0,
        outline: vec![Point::new(0.0, -20.0), Point::new(20.0, 20.0), Point::new(-20.0, 20.0)],
        hp: 1,
        is_ufo: false,
        reward: 100,
        color: Rgb::new(255, 0, 255),
    }
}

#[derive(Default)]
struct RecordingHooks {
    sounds: Vec<SoundCue>,
    hud: Vec<(u32, u32)>,
    game_overs: Vec<u32>,
    fail_audio: bool,
}

impl GameHooks for RecordingHooks {
    fn play_sound(&mut self, cue: SoundCue) -> Result<(), AudioError> {
        self.sounds.push(cue);
        if self.fail_audio {
            Err(AudioError::Unavailable)
        } else {
            Ok(())
        }
    }

    fn hud_changed(&mut self, score: u32, lives: u32) {
        self.hud.push((score, lives));
    }

    fn game_over(&mut self, final_score: u32) {
        self.game_overs.push(final_score);
    }
}

fn idle() -> FrameInput {
    FrameInput::default()
}

// ── construction ──────────────────────────────────────────────────────────────

#[test]
fn new_session_waits_on_title() {
    let s = GameSession::new(GameConfig::default(), &mut seeded_rng()).unwrap();
    assert_eq!(s.status, GameStatus::Title);
    assert_eq!(s.score, 0);
    assert_eq!(s.lives, 3);
    assert_eq!(s.stars.len(), 80);
    assert!(s.bullets.is_empty());
    assert!(s.enemies.is_empty());
    assert!(s.particles.is_empty());
}

#[test]
fn new_session_rejects_invalid_config() {
    let config = GameConfig {
        arena: Arena {
            width: 100.0,
            height: 720.0,
        },
        ..GameConfig::default()
    };
    let err = GameSession::new(config, &mut seeded_rng()).unwrap_err();
    assert!(matches!(err, ConfigError::ArenaTooSmall { .. }));
}

#[test]
fn player_starts_centred_near_bottom() {
    let s = playing_session();
    assert_eq!(s.player.x, 320.0);
    assert_eq!(s.player.y, 640.0);
}

// ── commands & state machine ──────────────────────────────────────────────────

#[test]
fn start_only_leaves_title() {
    let mut s = GameSession::new(quiet_config(), &mut seeded_rng()).unwrap();
    assert!(!s.handle_command(Command::Restart, 0.0, &mut NoHooks));
    assert_eq!(s.status, GameStatus::Title);

    assert!(s.handle_command(Command::Start, 0.0, &mut NoHooks));
    assert_eq!(s.status, GameStatus::Playing);

    // Already playing: both commands are ignored
    assert!(!s.handle_command(Command::Start, 0.0, &mut NoHooks));
    assert!(!s.handle_command(Command::Restart, 0.0, &mut NoHooks));
}

#[test]
fn start_notifies_hud() {
    let mut s = GameSession::new(quiet_config(), &mut seeded_rng()).unwrap();
    let mut hooks = RecordingHooks::default();
    s.handle_command(Command::Start, 0.0, &mut hooks);
    assert_eq!(hooks.hud, vec![(0, 3)]);
}

#[test]
fn restart_after_game_over_resets_run() {
    let mut s = playing_session();
    let mut rng = seeded_rng();
    s.score = 700;
    s.bullets.push(Bullet::new(10.0, 10.0));
    s.enemies.push(still_enemy(100.0, 100.0));
    s.particles.push(Particle::new(&mut rng, Point::new(5.0, 5.0), Rgb::new(1, 2, 3)));
    s.lives = 1;
    assert!(s.take_damage(&mut NoHooks));
    assert_eq!(s.status, GameStatus::GameOver);

    assert!(!s.handle_command(Command::Start, 1000.0, &mut NoHooks));
    assert!(s.handle_command(Command::Restart, 1000.0, &mut NoHooks));

    assert_eq!(s.status, GameStatus::Playing);
    assert_eq!(s.score, 0);
    assert_eq!(s.lives, 3);
    assert_eq!(s.best_score, 700);
    assert_eq!(s.start_ms, 1000.0);
    assert_eq!(s.frame, 0);
    assert!(s.bullets.is_empty());
    assert!(s.enemies.is_empty());
    assert!(s.particles.is_empty());
    assert_eq!(s.effects, Effects::default());
}

#[test]
fn select_difficulty_on_title_changes_lives() {
    let mut s = GameSession::new(quiet_config(), &mut seeded_rng()).unwrap();
    assert_eq!(s.select_difficulty("easy"), Ok(true));
    assert_eq!(s.config.difficulty, Difficulty::Easy);
    assert_eq!(s.lives, 5);

    s.start(0.0, &mut NoHooks);
    assert_eq!(s.lives, 5);
}

#[test]
fn select_difficulty_rejects_unknown_key() {
    let mut s = GameSession::new(quiet_config(), &mut seeded_rng()).unwrap();
    assert_eq!(
        s.select_difficulty("nightmare"),
        Err(ConfigError::UnknownDifficulty("nightmare".to_string()))
    );
    assert_eq!(s.config.difficulty, Difficulty::Normal);
}

#[test]
fn select_difficulty_ignored_while_playing() {
    let mut s = playing_session();
    assert_eq!(s.select_difficulty("hard"), Ok(false));
    assert_eq!(s.config.difficulty, Difficulty::Normal);
    assert_eq!(s.lives, 3);
}

// ── tick — frame bookkeeping ──────────────────────────────────────────────────

#[test]
fn tick_on_title_only_scrolls_background() {
    let mut s = GameSession::new(quiet_config(), &mut seeded_rng()).unwrap();
    let stars_before = s.stars.clone();
    s.tick(&idle(), 16.0, &mut seeded_rng(), &mut NoHooks);
    assert_eq!(s.frame, 0);
    assert_ne!(s.stars, stars_before);
    assert_eq!(s.player, Player::new(&s.config.arena));
}

#[test]
fn tick_increments_frame_while_playing() {
    let mut s = playing_session();
    let mut rng = seeded_rng();
    s.tick(&idle(), 16.0, &mut rng, &mut NoHooks);
    s.tick(&idle(), 32.0, &mut rng, &mut NoHooks);
    assert_eq!(s.frame, 2);
    assert_eq!(s.elapsed_ms(), 32.0);
}

// ── tick — player ─────────────────────────────────────────────────────────────

#[test]
fn tick_moves_player_with_keys() {
    let mut s = playing_session();
    let mut rng = seeded_rng();
    let left = FrameInput {
        left: true,
        ..idle()
    };
    s.tick(&left, 16.0, &mut rng, &mut NoHooks);
    assert_eq!(s.player.x, 310.0);

    let right = FrameInput {
        right: true,
        ..idle()
    };
    s.tick(&right, 32.0, &mut rng, &mut NoHooks);
    s.tick(&right, 48.0, &mut rng, &mut NoHooks);
    assert_eq!(s.player.x, 330.0);
}

#[test]
fn tick_clamps_player_to_arena() {
    let mut s = playing_session();
    let mut rng = seeded_rng();
    s.player.x = 30.0;
    let left = FrameInput {
        left: true,
        ..idle()
    };
    s.tick(&left, 16.0, &mut rng, &mut NoHooks);
    assert_eq!(s.player.x, 25.0); // half the hull width
}

#[test]
fn tick_player_follows_pointer() {
    let mut s = playing_session();
    let pointer = FrameInput {
        pointer: Some(420.0),
        ..idle()
    };
    s.tick(&pointer, 16.0, &mut seeded_rng(), &mut NoHooks);
    assert!((s.player.x - 340.0).abs() < 1e-4);
    // A held pointer also fires
    assert_eq!(s.bullets.len(), 1);
}

// ── tick — bullets ────────────────────────────────────────────────────────────

#[test]
fn tick_fire_spawns_bullet_above_player() {
    let mut s = playing_session();
    let mut hooks = RecordingHooks::default();
    let fire = FrameInput {
        fire: true,
        ..idle()
    };
    s.tick(&fire, 16.0, &mut seeded_rng(), &mut hooks);
    assert_eq!(s.bullets.len(), 1);
    let b = &s.bullets[0];
    assert_eq!(b.x, 320.0);
    assert_eq!(b.y, 640.0 - 15.0 - 18.0); // spawned, then moved once
    assert_eq!(hooks.sounds, vec![SoundCue::Shoot]);
}

#[test]
fn tick_fire_respects_cooldown() {
    let mut s = playing_session();
    let mut rng = seeded_rng();
    let fire = FrameInput {
        fire: true,
        ..idle()
    };
    s.tick(&fire, 0.0, &mut rng, &mut NoHooks);
    s.tick(&fire, 100.0, &mut rng, &mut NoHooks);
    assert_eq!(s.bullets.len(), 1);
    s.tick(&fire, 121.0, &mut rng, &mut NoHooks);
    assert_eq!(s.bullets.len(), 2);
}

#[test]
fn tick_prunes_bullets_past_top() {
    let mut s = playing_session();
    s.bullets.push(Bullet::new(100.0, -40.0)); // → -58, gone
    s.bullets.push(Bullet::new(200.0, -30.0)); // → -48, kept
    s.tick(&idle(), 16.0, &mut seeded_rng(), &mut NoHooks);
    assert_eq!(s.bullets.len(), 1);
    assert_eq!(s.bullets[0].x, 200.0);
    assert_eq!(s.bullets[0].y, -48.0);
}

#[test]
fn audio_failure_does_not_block_firing() {
    let mut s = playing_session();
    let mut hooks = RecordingHooks {
        fail_audio: true,
        ..RecordingHooks::default()
    };
    let fire = FrameInput {
        fire: true,
        ..idle()
    };
    s.tick(&fire, 0.0, &mut seeded_rng(), &mut hooks);
    assert_eq!(s.bullets.len(), 1);
    assert_eq!(s.status, GameStatus::Playing);
}

// ── tick — particles ──────────────────────────────────────────────────────────

#[test]
fn tick_prunes_expired_particles() {
    let mut s = playing_session();
    let particle = |life| Particle {
        x: 10.0,
        y: 10.0,
        vx: 0.0,
        vy: 0.0,
        life,
        decay: 10,
        size: 3.0,
        color: Rgb::new(255, 0, 255),
    };
    s.particles.push(particle(5));
    s.particles.push(particle(20));
    s.tick(&idle(), 16.0, &mut seeded_rng(), &mut NoHooks);
    assert_eq!(s.particles.len(), 1);
    assert_eq!(s.particles[0].life, 10);
}

// ── tick — scenarios ──────────────────────────────────────────────────────────

#[test]
fn tick_single_bullet_kill_scores_base_reward() {
    let mut s = playing_session();
    let mut hooks = RecordingHooks::default();
    s.enemies.push(still_enemy(300.0, 300.0));
    s.bullets.push(Bullet::new(300.0, 318.0)); // moves onto the enemy
    s.tick(&idle(), 16.0, &mut seeded_rng(), &mut hooks);

    assert_eq!(s.score, 100);
    assert!(s.enemies.is_empty());
    assert!(s.bullets.is_empty());
    assert_eq!(s.particles.len(), 20);
    assert!(s.particles.iter().all(|p| p.color == Rgb::new(255, 0, 255)));
    assert_eq!(hooks.sounds, vec![SoundCue::Explosion]);
    assert_eq!(hooks.hud, vec![(100, 3)]);
}

#[test]
fn tick_last_life_collision_ends_game_same_frame() {
    let mut s = playing_session();
    let mut rng = seeded_rng();
    let mut hooks = RecordingHooks::default();
    s.lives = 1;
    s.enemies.push(still_enemy(320.0, 640.0));
    s.tick(&idle(), 16.0, &mut rng, &mut hooks);

    assert_eq!(s.lives, 0);
    assert_eq!(s.status, GameStatus::GameOver);
    assert_eq!(hooks.game_overs, vec![0]);
    // The game-over screen does not shake or flash
    assert_eq!(s.effects, Effects::default());

    let frozen = (s.frame, s.player.clone(), s.particles.clone());
    s.bullets.push(Bullet::new(100.0, 100.0));
    s.tick(&FrameInput { left: true, fire: true, ..idle() }, 32.0, &mut rng, &mut hooks);
    assert_eq!((s.frame, s.player.clone(), s.particles.clone()), frozen);
    assert_eq!(s.bullets, vec![Bullet::new(100.0, 100.0)]);
    assert_eq!(hooks.game_overs.len(), 1);
}

#[test]
fn game_over_screen_stays_still() {
    let mut s = playing_session();
    let mut rng = seeded_rng();
    s.lives = 1;
    s.effects.flash(UFO_FLASH);
    s.enemies.push(still_enemy(320.0, 640.0));
    s.tick(&idle(), 16.0, &mut rng, &mut NoHooks);
    assert_eq!(s.status, GameStatus::GameOver);

    for f in 2..600 {
        s.tick(&idle(), f as f64 * 16.0, &mut rng, &mut NoHooks);
    }
    assert_eq!(s.effects.shake, 0.0);
    assert_eq!(s.effects.flash, 0);
}

#[test]
fn take_damage_after_game_over_is_ignored() {
    let mut s = playing_session();
    let mut hooks = RecordingHooks::default();
    s.lives = 1;
    assert!(s.take_damage(&mut hooks));
    assert!(!s.take_damage(&mut hooks));
    assert!(!s.take_damage(&mut hooks));
    assert_eq!(s.lives, 0);
    assert_eq!(hooks.game_overs, vec![0]);
    assert_eq!(hooks.hud, vec![(0, 0)]);
}

#[test]
fn take_damage_shakes_and_plays_hit() {
    let mut s = playing_session();
    let mut hooks = RecordingHooks::default();
    assert!(s.take_damage(&mut hooks));
    assert_eq!(s.lives, 2);
    assert_eq!(s.status, GameStatus::Playing);
    assert_eq!(s.effects.shake, 25.0);
    assert_eq!(hooks.sounds, vec![SoundCue::Hit]);
}

#[test]
fn tick_decays_effects() {
    let mut s = playing_session();
    s.effects = Effects {
        shake: 20.0,
        flash: 15,
    };
    s.tick(&idle(), 16.0, &mut seeded_rng(), &mut NoHooks);
    assert!((s.effects.shake - 18.0).abs() < 1e-4);
    assert_eq!(s.effects.flash, 14);
}

// ── long run invariants ───────────────────────────────────────────────────────

#[test]
fn long_run_keeps_invariants() {
    let config = GameConfig {
        difficulty: Difficulty::Easy,
        ..GameConfig::default()
    };
    let mut rng = StdRng::seed_from_u64(7);
    let mut s = GameSession::new(config, &mut rng).unwrap();
    s.start(0.0, &mut NoHooks);

    let mut last_score = 0;
    for f in 1..=20_000u64 {
        let input = FrameInput {
            left: (f / 90) % 2 == 0,
            right: (f / 90) % 2 == 1,
            fire: true,
            pointer: None,
        };
        s.tick(&input, f as f64 * 16.0, &mut rng, &mut NoHooks);

        assert!(s.score >= last_score);
        last_score = s.score;

        if s.status == GameStatus::GameOver {
            assert_eq!(s.lives, 0);
            return;
        }
        assert!(s.lives >= 1);
        assert!(s.bullets.iter().all(|b| !b.is_off_screen()));
        assert!(s.particles.iter().all(|p| p.life > 0));
        assert!(s.enemies.iter().all(|e| e.hp > 0 && !e.has_escaped(&s.config.arena)));
    }
}
