//! Systems driving the world controller.

use bevy::prelude::*;

use super::GameScreen;
use crate::bevy::events::{GameEventMessage, SoundCueMessage};
use crate::bevy::resources::{
    AudioQueue, GameConfigRes, InputStateRes, LevelSourceRes, WorldControllerRes,
};
use crate::controller::{UpdateOutcome, WorldController};
use crate::input::InputState;

/// Maps keyboard state to an [`InputState`].
pub fn input_from_keys(keys: &ButtonInput<KeyCode>) -> InputState {
    InputState {
        left: keys.pressed(KeyCode::ArrowLeft),
        right: keys.pressed(KeyCode::ArrowRight),
        up: keys.pressed(KeyCode::ArrowUp),
        down: keys.pressed(KeyCode::ArrowDown),
        shift: keys.pressed(KeyCode::ShiftLeft),
        jump_pressed: keys.just_pressed(KeyCode::Space),
        zoom_out: keys.pressed(KeyCode::Comma),
        zoom_in: keys.pressed(KeyCode::Period),
        zoom_reset: keys.pressed(KeyCode::Slash),
        recenter: keys.pressed(KeyCode::Backspace),
        reset_world_released: keys.just_released(KeyCode::KeyR),
        toggle_follow_released: keys.just_released(KeyCode::Enter),
    }
}

pub fn collect_input(keys: Res<ButtonInput<KeyCode>>, mut input: ResMut<InputStateRes>) {
    input.0 = input_from_keys(&keys);
}

/// Builds a fresh controller when entering [`GameScreen::Playing`].
pub fn start_game(
    mut commands: Commands,
    config: Res<GameConfigRes>,
    source: Res<LevelSourceRes>,
    audio: Res<AudioQueue>,
    mut next_screen: ResMut<NextState<GameScreen>>,
) {
    let result = WorldController::new(
        config.0.clone(),
        Box::new(source.0.clone()),
        Box::new(audio.0.clone()),
    );
    match result {
        Ok(controller) => {
            commands.insert_resource(WorldControllerRes(controller));
        }
        Err(err) => {
            tracing::error!(error = %err, "[game] failed to start");
            next_screen.set(GameScreen::Menu);
        }
    }
}

pub fn stop_game(mut commands: Commands) {
    commands.remove_resource::<WorldControllerRes>();
}

/// Runs one controller frame with the real frame time.
pub fn step_world(
    time: Res<Time>,
    input: Res<InputStateRes>,
    controller: Option<ResMut<WorldControllerRes>>,
    mut next_screen: ResMut<NextState<GameScreen>>,
) {
    let Some(mut controller) = controller else {
        return;
    };
    match controller.0.update(time.delta_secs(), &input.0) {
        Ok(UpdateOutcome::Continue) => {}
        Ok(UpdateOutcome::ReturnToMenu) => next_screen.set(GameScreen::Menu),
        Err(err) => {
            tracing::error!(error = %err, "[game] level reload failed");
            next_screen.set(GameScreen::Menu);
        }
    }
}

/// Forwards queued game events and sound cues as messages.
pub fn forward_output(
    controller: Option<ResMut<WorldControllerRes>>,
    audio: Res<AudioQueue>,
    mut game_events: MessageWriter<GameEventMessage>,
    mut sound_cues: MessageWriter<SoundCueMessage>,
) {
    if let Some(mut controller) = controller {
        for event in controller.0.drain_events() {
            game_events.write(GameEventMessage(event));
        }
    }
    for cue in audio.0.drain() {
        sound_cues.write(SoundCueMessage(cue));
    }
}
