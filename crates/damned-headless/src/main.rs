//! Headless runner.
//!
//! Plays a level with a scripted input timeline and logs what happens.
//!
//! ```text
//! damned-headless [LEVEL_PNG] [CONFIG_JSON] [SECONDS]
//! ```
//!
//! `LEVEL_PNG` defaults to `levels/level-01.png`, `SECONDS` to 30. Set
//! `RUST_LOG=debug` to see contacts and bat spawns.

use std::path::PathBuf;

use anyhow::{Context, Result};
use damned_core::config::LEVEL_01;
use damned_core::{
    FileLevel, GameConfig, GameEvent, InputState, RecordingBatch, SharedAudio, UpdateOutcome,
    WorldController, WorldRenderer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const FRAME_DT: f32 = 1.0 / 60.0;
/// The script presses jump once per this many frames.
const JUMP_EVERY: u64 = 45;

struct Args {
    level: PathBuf,
    config: Option<PathBuf>,
    seconds: f32,
}

impl Args {
    fn parse() -> Result<Self> {
        let mut args = std::env::args().skip(1);
        let level = args.next().map_or_else(|| PathBuf::from(LEVEL_01), PathBuf::from);
        let config = args.next().map(PathBuf::from);
        let seconds = match args.next() {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("invalid SECONDS value `{raw}`"))?,
            None => 30.0,
        };
        Ok(Self {
            level,
            config,
            seconds,
        })
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<GameConfig> {
    let Some(path) = path else {
        return Ok(GameConfig::default());
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    GameConfig::from_json(&json).with_context(|| format!("invalid config {}", path.display()))
}

/// Runs right and jumps at a fixed rhythm.
fn scripted_input(frame: u64) -> InputState {
    InputState {
        right: true,
        jump_pressed: frame % JUMP_EVERY == 0,
        ..InputState::default()
    }
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse()?;
    let config = load_config(args.config.as_ref())?;
    let audio = SharedAudio::new();
    let mut controller = WorldController::new(
        config,
        Box::new(FileLevel::new(&args.level)),
        Box::new(audio.clone()),
    )
    .with_context(|| format!("failed to load level {}", args.level.display()))?;

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let frames = (args.seconds.max(0.0) / FRAME_DT) as u64;
    tracing::info!(frames, level = %args.level.display(), "[headless] starting run");

    let mut played = 0u64;

    for frame in 0..frames {
        let outcome = controller.update(FRAME_DT, &scripted_input(frame))?;
        played = frame + 1;

        for event in controller.drain_events() {
            match event {
                GameEvent::GoalReached | GameEvent::GameOver | GameEvent::LifeLost { .. } => {
                    tracing::info!(frame, ?event, "[headless] game event");
                }
                _ => tracing::debug!(frame, ?event, "[headless] game event"),
            }
        }
        for cue in audio.drain() {
            tracing::debug!(frame, ?cue, "[headless] sound");
        }

        if outcome == UpdateOutcome::ReturnToMenu {
            tracing::info!(frame, "[headless] returned to menu");
            break;
        }
    }

    let mut batch = RecordingBatch::default();
    WorldRenderer::new().render(&controller, &mut batch);

    let player = controller.level().player.object.position;
    tracing::info!(
        frames = played,
        score = controller.score(),
        lives = controller.lives(),
        player_x = player.x,
        player_y = player.y,
        physics_hash = controller.physics().compute_hash(),
        sprites = batch.sprites().len(),
        "[headless] run finished"
    );
    Ok(())
}
