//! World controller.
//!
//! Owns the level, its physics world and the camera, and runs one frame of
//! game logic per [`WorldController::update`]:
//!
//! 1. keys (reset, camera follow toggle), then player or debug camera input
//! 2. level object updates
//! 3. physics step and contact dispatch
//! 4. camera follow
//! 5. game over countdown, or the fall check
//!
//! The controller never switches screens itself. It reports
//! [`UpdateOutcome::ReturnToMenu`] and the host decides what that means.

use bevy::math::Vec2;

use crate::audio::{AudioSink, SoundCue};
use crate::camera::CameraHelper;
use crate::config::GameConfig;
use crate::error::LevelError;
use crate::input::InputState;
use crate::level::{Level, LevelSource};
use crate::objects::ObjectId;
use crate::physics::{ContactEvent, PhysicsWorld};

/// Debug camera pan speed in m/s.
const CAMERA_MOVE_SPEED: f32 = 5.0;
/// Debug camera zoom speed per second.
const CAMERA_ZOOM_SPEED: f32 = 1.0;
/// Multiplier while shift is held.
const CAMERA_SPEED_BOOST: f32 = 5.0;

/// Result of one controller update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Continue,
    /// The game over delay ran out.
    ReturnToMenu,
}

/// Game state changes, queued until [`WorldController::drain_events`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    CandycornCollected { index: usize, score: u32 },
    OrbCollected { index: usize, score: u32 },
    GoalReached,
    LifeLost { lives_left: i32 },
    GameOver,
    LevelReset,
}

pub struct WorldController {
    config: GameConfig,
    source: Box<dyn LevelSource + Send + Sync>,
    audio: Box<dyn AudioSink + Send + Sync>,
    level: Level,
    physics: PhysicsWorld,
    camera: CameraHelper,
    score: u32,
    lives: i32,
    /// Set while game over is pending.
    game_over_time_left: Option<f32>,
    events: Vec<GameEvent>,
}

impl std::fmt::Debug for WorldController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorldController")
            .field("level", &self.source.name())
            .field("score", &self.score)
            .field("lives", &self.lives)
            .field("game_over_time_left", &self.game_over_time_left)
            .field("physics", &self.physics)
            .finish_non_exhaustive()
    }
}

impl WorldController {
    /// Loads the first level instance from `source`.
    pub fn new(
        config: GameConfig,
        source: Box<dyn LevelSource + Send + Sync>,
        audio: Box<dyn AudioSink + Send + Sync>,
    ) -> Result<Self, LevelError> {
        let mut level = Level::load(source.as_ref(), &config)?;
        let mut physics = PhysicsWorld::new(&config.physics);
        level.init_physics(&mut physics);
        let mut camera = CameraHelper::new(&config.camera);
        camera.set_target(Some(ObjectId::Player));

        tracing::info!(
            level = %source.name(),
            max_lives = config.max_lives,
            "[controller] game started"
        );

        Ok(Self {
            lives: config.max_lives,
            config,
            source,
            audio,
            level,
            physics,
            camera,
            score: 0,
            game_over_time_left: None,
            events: Vec::new(),
        })
    }

    /// Runs one frame.
    ///
    /// Errors only come from re-decoding the level after a reset or a lost
    /// life; the previous state is kept in that case.
    pub fn update(&mut self, dt: f32, input: &InputState) -> Result<UpdateOutcome, LevelError> {
        self.handle_keys(input)?;
        self.handle_input(dt, input);

        self.level.update(dt, &mut self.physics);
        for contact in self.physics.step(dt) {
            match contact {
                ContactEvent::Begin(a, b) => self.handle_contact(a, b),
                ContactEvent::End(..) => {}
            }
        }

        let target = self.camera.target().and_then(|id| self.level.position_of(id));
        self.camera.update(dt, target);

        if let Some(time_left) = &mut self.game_over_time_left {
            *time_left -= dt;
            if *time_left < 0.0 {
                tracing::info!(score = self.score, "[controller] back to menu");
                return Ok(UpdateOutcome::ReturnToMenu);
            }
        } else if self.level.player.object.position.y < self.config.fall_threshold {
            self.lose_life()?;
        }

        Ok(UpdateOutcome::Continue)
    }

    /// Applies a begin-contact between two objects.
    ///
    /// Only contacts involving the player matter. Each pickup and the goal
    /// trigger once; repeated calls are no-ops.
    pub fn handle_contact(&mut self, a: ObjectId, b: ObjectId) {
        let other = match (a, b) {
            (ObjectId::Player, other) | (other, ObjectId::Player) => other,
            _ => return,
        };

        match other {
            ObjectId::Candycorn(index) => {
                let Some(candycorn) = self.level.candycorns.get_mut(index) else {
                    return;
                };
                if candycorn.collect() {
                    self.score += self.config.candycorn_score;
                    tracing::debug!(index, score = self.score, "[controller] player <-> candycorn");
                    self.events.push(GameEvent::CandycornCollected {
                        index,
                        score: self.score,
                    });
                }
            }
            ObjectId::Orb(index) => {
                let Some(orb) = self.level.orbs.get_mut(index) else {
                    return;
                };
                if orb.collect() {
                    self.score += self.config.orb_score;
                    self.level.player.collected_orb();
                    self.audio.play(SoundCue::Powerup);
                    tracing::debug!(index, score = self.score, "[controller] player <-> orb");
                    self.events.push(GameEvent::OrbCollected {
                        index,
                        score: self.score,
                    });
                }
            }
            ObjectId::Goal => {
                let Some(goal) = &mut self.level.goal else {
                    return;
                };
                if goal.on_player_reached() {
                    tracing::info!(score = self.score, "[controller] goal reached");
                    self.events.push(GameEvent::GoalReached);
                }
            }
            ObjectId::Bat(id) => {
                tracing::debug!(id, "[controller] player <-> bat");
            }
            ObjectId::Land(_) | ObjectId::Player => {}
        }
    }

    /// Takes all events queued since the last call.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Restarts the game: fresh level, score 0, full lives.
    pub fn reset_world(&mut self) -> Result<(), LevelError> {
        let level = Level::load(self.source.as_ref(), &self.config)?;
        self.install_level(level);
        self.camera = CameraHelper::new(&self.config.camera);
        self.camera.set_target(Some(ObjectId::Player));
        self.score = 0;
        self.lives = self.config.max_lives;
        self.game_over_time_left = None;
        self.events.push(GameEvent::LevelReset);
        tracing::info!("[controller] game world reset");
        Ok(())
    }

    /// Toggles the camera between following the player and free mode.
    pub fn toggle_camera_follow(&mut self) {
        if self.camera.has_target() {
            self.camera.set_target(None);
        } else {
            self.camera.set_target(Some(ObjectId::Player));
            self.camera.set_zoom(1.0);
        }
        tracing::debug!(
            follow = self.camera.has_target(),
            "[controller] camera follow toggled"
        );
    }

    pub fn is_game_over(&self) -> bool {
        self.lives < 0
    }

    /// Seconds left before returning to the menu, while game over is pending.
    pub fn game_over_time_left(&self) -> Option<f32> {
        self.game_over_time_left
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn lives(&self) -> i32 {
        self.lives
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn physics(&self) -> &PhysicsWorld {
        &self.physics
    }

    pub fn camera(&self) -> &CameraHelper {
        &self.camera
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    fn handle_keys(&mut self, input: &InputState) -> Result<(), LevelError> {
        if input.reset_world_released {
            self.reset_world()?;
        } else if input.toggle_follow_released {
            self.toggle_camera_follow();
        }
        Ok(())
    }

    fn handle_input(&mut self, dt: f32, input: &InputState) {
        if self.camera.has_target_of(ObjectId::Player) {
            if self.level.player.handle_input(input, &self.physics) {
                self.audio.play(SoundCue::Jump);
            }
        } else if self.config.debug_camera {
            self.handle_debug_camera(dt, input);
        }
    }

    fn handle_debug_camera(&mut self, dt: f32, input: &InputState) {
        let boost = if input.shift { CAMERA_SPEED_BOOST } else { 1.0 };

        let speed = CAMERA_MOVE_SPEED * dt * boost;
        let mut delta = Vec2::ZERO;
        if input.left {
            delta.x -= speed;
        }
        if input.right {
            delta.x += speed;
        }
        if input.up {
            delta.y += speed;
        }
        if input.down {
            delta.y -= speed;
        }
        self.camera.set_position(self.camera.position() + delta);
        if input.recenter {
            self.camera.set_position(Vec2::ZERO);
        }

        let zoom_speed = CAMERA_ZOOM_SPEED * dt * boost;
        if input.zoom_out {
            self.camera.add_zoom(zoom_speed);
        }
        if input.zoom_in {
            self.camera.add_zoom(-zoom_speed);
        }
        if input.zoom_reset {
            self.camera.set_zoom(1.0);
        }
    }

    /// Swaps in a decoded level. The previous world is emptied before the
    /// next one is built and populated.
    fn install_level(&mut self, mut level: Level) {
        self.physics.clear();
        self.physics = PhysicsWorld::new(&self.config.physics);
        level.init_physics(&mut self.physics);
        self.level = level;
    }

    /// Takes a life, then reloads the level or starts the game over delay.
    fn lose_life(&mut self) -> Result<(), LevelError> {
        let lives_left = self.lives - 1;
        let fresh = if lives_left < 0 {
            None
        } else {
            Some(Level::load(self.source.as_ref(), &self.config)?)
        };

        self.lives = lives_left;
        self.audio.play(SoundCue::LifeLost);
        self.events.push(GameEvent::LifeLost { lives_left });
        tracing::info!(lives_left, "[controller] life lost");

        match fresh {
            Some(level) => {
                self.install_level(level);
                self.camera.set_target(Some(ObjectId::Player));
                self.events.push(GameEvent::LevelReset);
            }
            None => {
                self.game_over_time_left = Some(self.config.game_over_delay);
                self.events.push(GameEvent::GameOver);
                tracing::info!(
                    score = self.score,
                    delay = self.config.game_over_delay,
                    "[controller] game over"
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::audio::{NullAudio, SharedAudio};
    use crate::level::InMemoryLevel;
    use crate::render::{RecordingBatch, WorldRenderer};

    const DT: f32 = 1.0 / 60.0;

    /// Player standing on ground with a candycorn, an orb and a goal.
    const GROUND: &[&str] = &[".@.c.o.G....", "############"];
    /// Player spawns over nothing and falls out of the world.
    const PIT: &[&str] = &["@.c.o", "....."];

    fn controller_with(rows: &[&str], config: GameConfig) -> WorldController {
        let source = InMemoryLevel::from_ascii("test", rows);
        WorldController::new(config, Box::new(source), Box::new(NullAudio))
            .expect("level should load")
    }

    /// Runs frames until `done` holds, failing after ten seconds.
    fn run_until(controller: &mut WorldController, done: impl Fn(&WorldController) -> bool) {
        for _ in 0..600 {
            controller.update(DT, &InputState::none()).unwrap();
            if done(controller) {
                return;
            }
        }
        panic!("condition not reached");
    }

    /// Loads once, then fails every later load.
    struct FailAfterFirst {
        inner: InMemoryLevel,
        loads: AtomicUsize,
    }

    impl LevelSource for FailAfterFirst {
        fn name(&self) -> String {
            "fail-after-first".to_string()
        }

        fn load_image(&self) -> Result<image::RgbaImage, LevelError> {
            if self.loads.fetch_add(1, Ordering::SeqCst) == 0 {
                self.inner.load_image()
            } else {
                Err(LevelError::MissingPlayerSpawn)
            }
        }
    }

    #[test]
    fn test_new_controller_state() {
        let controller = controller_with(GROUND, GameConfig::default());
        assert_eq!(controller.score(), 0);
        assert_eq!(controller.lives(), 3);
        assert!(!controller.is_game_over());
        assert!(controller.camera().has_target_of(ObjectId::Player));
    }

    #[test]
    fn test_candycorn_collected_once() {
        let mut controller = controller_with(GROUND, GameConfig::default());

        controller.handle_contact(ObjectId::Player, ObjectId::Candycorn(0));
        controller.handle_contact(ObjectId::Candycorn(0), ObjectId::Player);

        assert_eq!(controller.score(), 50);
        assert!(controller.level().candycorns[0].collected);
        assert_eq!(
            controller.drain_events(),
            vec![GameEvent::CandycornCollected { index: 0, score: 50 }]
        );
    }

    #[test]
    fn test_orb_scores_powers_up_and_plays_sound() {
        let audio = SharedAudio::new();
        let source = InMemoryLevel::from_ascii("test", GROUND);
        let mut controller =
            WorldController::new(GameConfig::default(), Box::new(source), Box::new(audio.clone()))
                .unwrap();

        controller.handle_contact(ObjectId::Orb(0), ObjectId::Player);
        controller.handle_contact(ObjectId::Orb(0), ObjectId::Player);

        assert_eq!(controller.score(), 250);
        assert!(controller.level().player.has_powerup());
        assert_eq!(audio.drain(), vec![SoundCue::Powerup]);
    }

    #[test]
    fn test_goal_reached_once() {
        let mut controller = controller_with(GROUND, GameConfig::default());

        controller.handle_contact(ObjectId::Player, ObjectId::Goal);
        controller.handle_contact(ObjectId::Player, ObjectId::Goal);

        assert!(controller.level().goal.as_ref().unwrap().reached);
        assert_eq!(controller.drain_events(), vec![GameEvent::GoalReached]);
    }

    #[test]
    fn test_contacts_without_player_ignored() {
        let mut controller = controller_with(GROUND, GameConfig::default());

        controller.handle_contact(ObjectId::Land(0), ObjectId::Candycorn(0));
        controller.handle_contact(ObjectId::Player, ObjectId::Candycorn(9));
        controller.handle_contact(ObjectId::Player, ObjectId::Bat(0));

        assert_eq!(controller.score(), 0);
        assert!(controller.drain_events().is_empty());
    }

    #[test]
    fn test_player_rests_on_land() {
        let mut controller = controller_with(GROUND, GameConfig::default());

        for _ in 0..120 {
            controller.update(DT, &InputState::none()).unwrap();
        }

        let y = controller.level().player.object.position.y;
        assert!((y - 1.94).abs() < 0.1, "player y = {y}");
        assert_eq!(controller.lives(), 3);
    }

    #[test]
    fn test_jump_plays_sound() {
        let audio = SharedAudio::new();
        let source = InMemoryLevel::from_ascii("test", GROUND);
        let mut controller =
            WorldController::new(GameConfig::default(), Box::new(source), Box::new(audio.clone()))
                .unwrap();

        controller.update(DT, &InputState::jump()).unwrap();

        assert_eq!(audio.drain(), vec![SoundCue::Jump]);
    }

    #[test]
    fn test_life_loss_replaces_level() {
        let mut controller = controller_with(PIT, GameConfig::default());
        controller.handle_contact(ObjectId::Player, ObjectId::Candycorn(0));
        controller.drain_events();

        let bodies = controller.physics().body_count();
        run_until(&mut controller, |c| c.lives() < 3);

        assert_eq!(controller.lives(), 2);
        assert_eq!(controller.physics().body_count(), bodies);
        assert_eq!(controller.physics().current_frame(), 0);
        assert_eq!(controller.score(), 50);
        assert!(!controller.level().candycorns[0].collected);
        assert_eq!(controller.level().player.object.position, Vec2::new(0.0, 2.0));
        assert_eq!(
            controller.drain_events(),
            vec![GameEvent::LifeLost { lives_left: 2 }, GameEvent::LevelReset]
        );
    }

    #[test]
    fn test_game_over_pending_once_then_menu() {
        let config = GameConfig {
            max_lives: 0,
            ..GameConfig::default()
        };
        let mut controller = controller_with(PIT, config);

        run_until(&mut controller, WorldController::is_game_over);
        assert_eq!(controller.lives(), -1);
        assert_eq!(controller.game_over_time_left(), Some(5.0));

        for _ in 0..5 {
            let outcome = controller.update(1.0, &InputState::none()).unwrap();
            assert_eq!(outcome, UpdateOutcome::Continue);
        }
        let outcome = controller.update(1.0, &InputState::none()).unwrap();
        assert_eq!(outcome, UpdateOutcome::ReturnToMenu);
        assert_eq!(controller.lives(), -1);

        let events = controller.drain_events();
        let game_overs = events.iter().filter(|e| **e == GameEvent::GameOver).count();
        let lives_lost = events
            .iter()
            .filter(|e| matches!(e, GameEvent::LifeLost { .. }))
            .count();
        assert_eq!(game_overs, 1);
        assert_eq!(lives_lost, 1);
    }

    #[test]
    fn test_game_over_message_rendered() {
        let config = GameConfig {
            max_lives: 0,
            ..GameConfig::default()
        };
        let mut controller = controller_with(PIT, config);
        run_until(&mut controller, WorldController::is_game_over);

        let mut batch = RecordingBatch::default();
        WorldRenderer::new().render(&controller, &mut batch);

        assert!(batch.texts().contains(&"GAME OVER"));
    }

    #[test]
    fn test_reset_key_restarts_game() {
        let mut controller = controller_with(GROUND, GameConfig::default());
        controller.handle_contact(ObjectId::Player, ObjectId::Candycorn(0));
        controller.toggle_camera_follow();

        let input = InputState {
            reset_world_released: true,
            ..InputState::default()
        };
        controller.update(DT, &input).unwrap();

        assert_eq!(controller.score(), 0);
        assert_eq!(controller.lives(), 3);
        assert!(!controller.level().candycorns[0].collected);
        assert!(controller.camera().has_target_of(ObjectId::Player));
        assert!(controller.drain_events().contains(&GameEvent::LevelReset));
    }

    #[test]
    fn test_camera_toggle_and_debug_controls() {
        let mut controller = controller_with(GROUND, GameConfig::default());
        let toggle = InputState {
            toggle_follow_released: true,
            ..InputState::default()
        };

        controller.update(DT, &toggle).unwrap();
        assert!(!controller.camera().has_target());
        let start = controller.camera().position();

        let pan = InputState {
            right: true,
            shift: true,
            zoom_out: true,
            ..InputState::default()
        };
        controller.update(0.1, &pan).unwrap();
        assert!((controller.camera().position().x - (start.x + 2.5)).abs() < 1e-4);
        assert!((controller.camera().zoom() - 1.5).abs() < 1e-4);

        let recenter = InputState {
            recenter: true,
            zoom_reset: true,
            ..InputState::default()
        };
        controller.update(DT, &recenter).unwrap();
        assert_eq!(controller.camera().position(), Vec2::ZERO);
        assert_eq!(controller.camera().zoom(), 1.0);

        controller.update(DT, &toggle).unwrap();
        assert!(controller.camera().has_target_of(ObjectId::Player));
    }

    #[test]
    fn test_free_camera_leaves_player_idle() {
        let mut controller = controller_with(GROUND, GameConfig::default());
        controller.toggle_camera_follow();

        controller.update(DT, &InputState::right()).unwrap();

        assert_eq!(controller.level().player.move_state, crate::objects::MoveState::Stopped);
    }

    #[test]
    fn test_failed_reset_keeps_state() {
        let source = FailAfterFirst {
            inner: InMemoryLevel::from_ascii("test", GROUND),
            loads: AtomicUsize::new(0),
        };
        let mut controller =
            WorldController::new(GameConfig::default(), Box::new(source), Box::new(NullAudio))
                .unwrap();
        controller.handle_contact(ObjectId::Player, ObjectId::Candycorn(0));

        let err = controller.reset_world().unwrap_err();

        assert!(matches!(err, LevelError::MissingPlayerSpawn));
        assert_eq!(controller.score(), 50);
        assert!(controller.level().candycorns[0].collected);
        assert!(controller.physics().body_count() > 0);
    }

    #[test]
    fn test_failed_reload_after_fall_keeps_lives() {
        let source = FailAfterFirst {
            inner: InMemoryLevel::from_ascii("test", PIT),
            loads: AtomicUsize::new(0),
        };
        let mut controller =
            WorldController::new(GameConfig::default(), Box::new(source), Box::new(NullAudio))
                .unwrap();

        let mut result = Ok(UpdateOutcome::Continue);
        for _ in 0..600 {
            result = controller.update(DT, &InputState::none());
            if result.is_err() {
                break;
            }
        }

        assert!(matches!(result, Err(LevelError::MissingPlayerSpawn)));
        assert_eq!(controller.lives(), 3);
    }
}
