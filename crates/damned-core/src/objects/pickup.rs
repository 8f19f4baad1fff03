//! Collectible items.
//!
//! Both pickups are fixed sensors: the player passes through them and the
//! controller flips `collected` on the first contact.

use bevy::math::{Rect, Vec2};

use super::{Animation, Behavior, GameObject, ObjectKind, PlayMode};
use crate::physics::{BodyDesc, BodyKind};
use crate::render::SpriteBatch;

const PICKUP_SIZE: f32 = 0.5;

fn pickup_object(position: Vec2) -> GameObject {
    let dimension = Vec2::splat(PICKUP_SIZE);
    GameObject {
        position,
        dimension,
        origin: dimension / 2.0,
        bounds: Rect::new(0.0, 0.0, dimension.x, dimension.y),
        ..GameObject::default()
    }
}

/// Candy corn worth a small score bonus.
#[derive(Debug, Clone, PartialEq)]
pub struct Candycorn {
    pub object: GameObject,
    pub collected: bool,
}

impl Candycorn {
    pub const REGION: &'static str = "candycorn";

    pub fn new(position: Vec2) -> Self {
        Self {
            object: pickup_object(position),
            collected: false,
        }
    }

    /// Marks the pickup collected. Returns false if it already was.
    pub fn collect(&mut self) -> bool {
        !std::mem::replace(&mut self.collected, true)
    }
}

impl Behavior for Candycorn {
    fn kind(&self) -> ObjectKind {
        ObjectKind::Candycorn
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
        if self.collected {
            return;
        }
        batch.draw(self.object.sprite(Self::REGION));
    }
}

/// Power-up orb: bigger score bonus and a temporary jump boost.
#[derive(Debug, Clone, PartialEq)]
pub struct Orb {
    pub object: GameObject,
    pub collected: bool,
}

impl Orb {
    pub const ANIM_NORMAL: Animation = Animation::new("powerup", 6, 0.1, PlayMode::Loop);

    pub fn new(position: Vec2) -> Self {
        let mut object = pickup_object(position);
        object.set_animation(Self::ANIM_NORMAL);
        Self {
            object,
            collected: false,
        }
    }

    /// Marks the orb collected. Returns false if it already was.
    pub fn collect(&mut self) -> bool {
        !std::mem::replace(&mut self.collected, true)
    }
}

impl Behavior for Orb {
    fn kind(&self) -> ObjectKind {
        ObjectKind::Orb
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
        if self.collected {
            return;
        }
        if let Some(sprite) = self.object.animated_sprite() {
            batch.draw(sprite);
        }
    }
}
