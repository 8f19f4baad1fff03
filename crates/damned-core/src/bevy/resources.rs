//! ECS resources wrapping the world controller and its services.

use std::sync::Arc;

use bevy::prelude::*;

use crate::audio::SharedAudio;
use crate::config::GameConfig;
use crate::controller::WorldController;
use crate::input::InputState;
use crate::level::LevelSource;

/// The running game. Present only while [`GameScreen::Playing`](super::GameScreen).
#[derive(Resource, Debug)]
pub struct WorldControllerRes(pub WorldController);

/// Configuration used whenever a game starts.
#[derive(Resource, Debug, Clone, Default)]
pub struct GameConfigRes(pub GameConfig);

/// Level a new game is loaded from.
#[derive(Resource, Clone)]
pub struct LevelSourceRes(pub Arc<dyn LevelSource + Send + Sync>);

/// Keyboard state mapped for the controller this frame.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct InputStateRes(pub InputState);

/// Sound cues queued by the controller, forwarded as messages each frame.
#[derive(Resource, Debug, Clone, Default)]
pub struct AudioQueue(pub SharedAudio);
