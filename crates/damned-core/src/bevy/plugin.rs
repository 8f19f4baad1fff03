//! Bevy plugin for the platformer.
//!
//! The plugin is logic only: it needs `MinimalPlugins`, the states plugin and
//! the input plugin, and leaves drawing and sound playback to the host, which
//! reads [`SoundCueMessage`]s and renders through
//! [`WorldRenderer`](crate::render::WorldRenderer).

use std::sync::Arc;

use bevy::prelude::*;

use crate::audio::SharedAudio;
use crate::bevy::events::{GameEventMessage, SoundCueMessage};
use crate::bevy::resources::{AudioQueue, GameConfigRes, InputStateRes, LevelSourceRes};
use crate::bevy::systems;
use crate::config::GameConfig;
use crate::level::LevelSource;

/// Top-level screen.
#[derive(States, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GameScreen {
    #[default]
    Menu,
    Playing,
}

/// Runs a [`WorldController`](crate::controller::WorldController) while
/// [`GameScreen::Playing`] is active.
pub struct DamnedGamePlugin {
    pub config: GameConfig,
    pub source: Arc<dyn LevelSource + Send + Sync>,
}

impl DamnedGamePlugin {
    pub fn new(config: GameConfig, source: impl LevelSource + Send + Sync + 'static) -> Self {
        Self {
            config,
            source: Arc::new(source),
        }
    }
}

impl Plugin for DamnedGamePlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<GameScreen>();

        app.insert_resource(GameConfigRes(self.config.clone()))
            .insert_resource(LevelSourceRes(Arc::clone(&self.source)))
            .insert_resource(AudioQueue(SharedAudio::new()))
            .init_resource::<InputStateRes>();

        app.add_message::<SoundCueMessage>()
            .add_message::<GameEventMessage>();

        app.add_systems(OnEnter(GameScreen::Playing), systems::start_game);
        app.add_systems(OnExit(GameScreen::Playing), systems::stop_game);

        app.add_systems(
            Update,
            (
                systems::collect_input,
                systems::step_world,
                systems::forward_output,
            )
                .chain()
                .run_if(in_state(GameScreen::Playing)),
        );
    }
}
