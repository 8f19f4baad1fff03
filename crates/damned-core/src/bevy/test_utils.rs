//! Test utilities for headless Bevy integration tests.
//!
//! Provides `TestApp`, a wrapper around `bevy::app::App` that uses
//! `MinimalPlugins` + `DamnedGamePlugin` for testing game logic
//! without a rendering or windowing backend.

use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;

use crate::bevy::plugin::{DamnedGamePlugin, GameScreen};
use crate::bevy::resources::WorldControllerRes;
use crate::config::GameConfig;
use crate::controller::WorldController;
use crate::level::InMemoryLevel;

/// Frame time fed to every update.
pub const FRAME_DT: f32 = 1.0 / 60.0;

/// A headless Bevy app wrapper for testing.
pub(crate) struct TestApp {
    pub app: App,
}

impl TestApp {
    /// Creates an app on the menu screen for an ASCII level.
    pub fn new(rows: &[&str], config: GameConfig) -> Self {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(bevy::state::app::StatesPlugin);
        app.add_plugins(bevy::input::InputPlugin);
        app.add_plugins(DamnedGamePlugin::new(
            config,
            InMemoryLevel::from_ascii("test", rows),
        ));
        // Fixed frame time so runs are reproducible.
        app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f32(
            FRAME_DT,
        )));
        app.update();
        Self { app }
    }

    pub fn update(&mut self) {
        self.app.update();
    }

    pub fn run_frames(&mut self, n: usize) {
        for _ in 0..n {
            self.app.update();
        }
    }

    /// Requests the playing screen and runs updates until it is entered.
    pub fn start_playing(&mut self) {
        self.app
            .world_mut()
            .resource_mut::<NextState<GameScreen>>()
            .set(GameScreen::Playing);
        self.update();
        self.update();
    }

    pub fn screen(&self) -> GameScreen {
        *self.app.world().resource::<State<GameScreen>>().get()
    }

    pub fn controller(&self) -> Option<&WorldController> {
        self.app
            .world()
            .get_resource::<WorldControllerRes>()
            .map(|res| &res.0)
    }

    pub fn press(&mut self, key: KeyCode) {
        self.app
            .world_mut()
            .resource_mut::<ButtonInput<KeyCode>>()
            .press(key);
    }

    pub fn world_mut(&mut self) -> &mut World {
        self.app.world_mut()
    }
}
