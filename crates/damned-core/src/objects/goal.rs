//! Level goal.

use bevy::math::{Rect, Vec2};

use super::{Animation, Behavior, GameObject, ObjectKind, PlayMode};
use crate::physics::{BodyDesc, BodyKind};
use crate::render::SpriteBatch;

#[derive(Debug, Clone, PartialEq)]
pub struct Goal {
    pub object: GameObject,
    pub reached: bool,
}

impl Goal {
    pub const ANIM_NORMAL: Animation = Animation::new("goal", 4, 0.1, PlayMode::Loop);
    pub const ANIM_EXPLODE: Animation = Animation::new("goal_explode", 8, 0.1, PlayMode::Normal);

    pub fn new(position: Vec2) -> Self {
        let mut object = GameObject {
            position,
            origin: Vec2::splat(0.5),
            bounds: Rect::new(0.0, 0.0, 1.0, 1.0),
            ..GameObject::default()
        };
        object.set_animation(Self::ANIM_NORMAL);
        Self {
            object,
            reached: false,
        }
    }

    /// Marks the goal reached and starts the explosion.
    /// Returns false if it was already reached.
    pub fn on_player_reached(&mut self) -> bool {
        if self.reached {
            return false;
        }
        self.reached = true;
        self.object.set_animation(Self::ANIM_EXPLODE);
        true
    }
}

impl Behavior for Goal {
    fn kind(&self) -> ObjectKind {
        ObjectKind::Goal
    }

    fn object(&self) -> &GameObject {
        &self.object
    }

    fn object_mut(&mut self) -> &mut GameObject {
        &mut self.object
    }

    fn body_desc(&self) -> Option<BodyDesc> {
        Some(self.object.body_desc(BodyKind::Fixed, true))
    }

    fn render(&self, batch: &mut dyn SpriteBatch) {
        if let Some(sprite) = self.object.animated_sprite() {
            batch.draw(sprite);
        }
    }
}
