//! Land platforms.

use bevy::math::{Rect, Vec2};

use super::{Behavior, GameObject, ObjectKind};
use crate::physics::{BodyDesc, BodyKind};
use crate::render::SpriteBatch;

/// Surface type of a land segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LandKind {
    /// Ground level; collides over its full height.
    Normal,
    /// Floating platform; collides over its upper half.
    Floating,
}

impl LandKind {
    /// Share of the tile height covered by the collision box.
    pub fn collision_height_ratio(self) -> f32 {
        match self {
            Self::Normal => 1.0,
            Self::Floating => 0.5,
        }
    }

    pub fn edge_region(self) -> &'static str {
        match self {
            Self::Normal => "land_edge_norm",
            Self::Floating => "land_edge_float",
        }
    }

    pub fn middle_region(self) -> &'static str {
        match self {
            Self::Normal => "land_middle_norm",
            Self::Floating => "land_middle_float",
        }
    }
}

/// A horizontal run of land tiles.
#[derive(Debug, Clone, PartialEq)]
pub struct Land {
    pub object: GameObject,
    pub land_kind: LandKind,
    length: u32,
}

impl Land {
    /// Creates a one-tile segment at `position`.
    pub fn new(land_kind: LandKind, position: Vec2) -> Self {
        let mut land = Self {
            object: GameObject {
                position,
                ..GameObject::default()
            },
            land_kind,
            length: 1,
        };
        land.set_length(1);
        land
    }

    pub fn length(&self) -> u32 {
        self.length
    }

    /// Sets the tile count and resizes the collision box to match.
    /// Lengths below one are raised to one.
    #[allow(clippy::cast_precision_loss)]
    pub fn set_length(&mut self, length: u32) {
        self.length = length.max(1);
        let width = self.object.dimension.x * self.length as f32;
        let height = self.object.dimension.y;
        let bottom = height * (1.0 - self.land_kind.collision_height_ratio());
        self.object.bounds = Rect::new(0.0, bottom, width, height);
    }

    pub fn increase_length(&mut self, amount: u32) {
        self.set_length(self.length.saturating_add(amount));
    }
}

impl Behavior for Land {
    fn kind(&self) -> ObjectKind {
        ObjectKind::Land
    }

    fn object(&self) -> &GameObject {
        &self.object
    }

    fn object_mut(&mut self) -> &mut GameObject {
        &mut self.object
    }

    fn body_desc(&self) -> Option<BodyDesc> {
        Some(self.object.body_desc(BodyKind::Kinematic, false))
    }

    /// Left edge, middle tiles with alternating flip, then a mirrored right edge.
    fn render(&self, batch: &mut dyn SpriteBatch) {
        let obj = &self.object;

        let mut left = obj.sprite(self.land_kind.edge_region());
        left.position.x -= obj.dimension.x;
        batch.draw(left);

        let mut rel_x = 0.0;
        for i in 0..self.length {
            let mut middle = obj.sprite(self.land_kind.middle_region());
            middle.position.x += rel_x;
            middle.dimension.x += 0.01;
            middle.flip_x = i % 2 == 0;
            batch.draw(middle);
            rel_x += obj.dimension.x;
        }

        let mut right = obj.sprite(self.land_kind.edge_region());
        right.position.x += rel_x;
        right.origin.x += obj.dimension.x / 8.0;
        right.flip_x = true;
        batch.draw(right);
    }
}
