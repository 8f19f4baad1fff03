//! ECS messages emitted by the game.
//!
//! Note: In Bevy 0.18+, buffered events use the Message trait instead of Event.

use bevy::prelude::*;

use crate::audio::SoundCue;
use crate::controller::GameEvent;

/// A sound the host should play.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SoundCueMessage(pub SoundCue);

/// A game state change reported by the controller.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameEventMessage(pub GameEvent);
