//! Bevy integration for the platformer.
//!
//! Wraps the [`WorldController`](crate::controller::WorldController) in an ECS
//! resource, feeds it keyboard input each frame and publishes its output as
//! messages.

pub mod events;
pub mod plugin;
pub mod resources;
pub mod systems;

#[cfg(test)]
pub(crate) mod test_utils;

pub use events::*;
pub use plugin::{DamnedGamePlugin, GameScreen};
pub use resources::*;
