//! Damned Core Library
//!
//! Simulation core of a 2D side-scrolling platformer: image-based level
//! decoding, a `Rapier2D`-backed game object model, and the world controller
//! that ties player input, physics contacts and the camera together.
//!
//! Rendering, audio playback and level storage are reached through the
//! [`SpriteBatch`](render::SpriteBatch), [`AudioSink`](audio::AudioSink) and
//! [`LevelSource`](level::LevelSource) traits. The [`crate::bevy`] module runs the
//! controller inside a Bevy app.

#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]

pub mod audio;
pub mod camera;
pub mod config;
pub mod controller;
pub mod error;
pub mod input;
pub mod level;
pub mod objects;
pub mod physics;
pub mod render;

// Bevy integration
pub mod bevy;

pub use audio::{AudioSink, NullAudio, SharedAudio, SoundCue};
pub use camera::CameraHelper;
pub use config::{AirControl, GameConfig};
pub use controller::{GameEvent, UpdateOutcome, WorldController};
pub use error::{ConfigError, LevelError};
pub use input::InputState;
pub use level::{BlockType, FileLevel, InMemoryLevel, Level, LevelSource};
pub use objects::{Behavior, GameObject, ObjectId, ObjectKind};
pub use physics::PhysicsWorld;
pub use render::{OrthographicCamera, RecordingBatch, Sprite, SpriteBatch, WorldRenderer};
