//! Decorative backdrop. Has no body.

use bevy::math::Vec2;

use super::{Behavior, GameObject, ObjectKind};
use crate::render::SpriteBatch;

#[derive(Debug, Clone, PartialEq)]
pub struct Background {
    pub object: GameObject,
}

impl Background {
    pub const REGION: &'static str = "background";

    pub fn new(length: f32, width: f32) -> Self {
        Self {
            object: GameObject {
                position: Vec2::new(0.0, -3.0),
                dimension: Vec2::new(length, width),
                origin: Vec2::new(length / 2.0, width / 2.0),
                ..GameObject::default()
            },
        }
    }
}

impl Default for Background {
    fn default() -> Self {
        Self::new(20.0, 15.0)
    }
}

impl Behavior for Background {
    fn kind(&self) -> ObjectKind {
        ObjectKind::Background
    }

    fn object(&self) -> &GameObject {
        &self.object
    }

    fn object_mut(&mut self) -> &mut GameObject {
        &mut self.object
    }

    fn render(&self, batch: &mut dyn SpriteBatch) {
        batch.draw(self.object.sprite(Self::REGION));
    }
}
