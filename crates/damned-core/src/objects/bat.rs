//! Bat flock.
//!
//! Bats fly right to left across the level as kinematic sensors. Once a bat
//! passes the despawn line its body is destroyed and a fresh bat spawns past
//! the end of the level near the player's height. Spawns draw from a seeded
//! [`ChaCha8Rng`], so equal seeds give equal flocks.

use bevy::math::{Rect, Vec2};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use super::{Animation, Behavior, GameObject, ObjectId, ObjectKind, PlayMode};
use crate::config::BatConfig;
use crate::physics::{BodyDesc, BodyKind, PhysicsWorld};
use crate::render::SpriteBatch;

const BAT_SIZE: f32 = 0.25;
/// Height added to every spawn before the random spread.
const BASE_HEIGHT: f32 = 1.75;
/// Half range of the random spread around the player's height.
const HEIGHT_SPREAD: f32 = 2.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Bat {
    pub object: GameObject,
    /// Flock-unique id, used as the physics owner.
    pub id: u64,
}

impl Bat {
    pub const ANIM_NORMAL: Animation = Animation::new("bat", 4, 0.1, PlayMode::LoopPingPong);

    pub fn new(id: u64, position: Vec2, speed: f32) -> Self {
        let dimension = Vec2::splat(BAT_SIZE);
        let mut object = GameObject {
            position,
            dimension,
            origin: dimension / 2.0,
            velocity: Vec2::new(speed, 0.0),
            terminal_velocity: Vec2::splat(f32::MAX),
            bounds: Rect::new(0.0, 0.0, dimension.x, dimension.y),
            ..GameObject::default()
        };
        object.set_animation(Self::ANIM_NORMAL);
        Self { object, id }
    }

    pub fn object_id(&self) -> ObjectId {
        ObjectId::Bat(self.id)
    }
}

impl Behavior for Bat {
    fn kind(&self) -> ObjectKind {
        ObjectKind::Bat
    }

    fn object(&self) -> &GameObject {
        &self.object
    }

    fn object_mut(&mut self) -> &mut GameObject {
        &mut self.object
    }

    fn body_desc(&self) -> Option<BodyDesc> {
        Some(self.object.body_desc(BodyKind::Kinematic, true))
    }

    /// Drawn mirrored so the sprite faces its flight direction.
    fn render(&self, batch: &mut dyn SpriteBatch) {
        if let Some(mut sprite) = self.object.animated_sprite() {
            sprite.flip_x = true;
            batch.draw(sprite);
        }
    }
}

/// The level's bat flock.
#[derive(Debug, Clone)]
pub struct Bats {
    bats: Vec<Bat>,
    config: BatConfig,
    level_length: f32,
    player_y: f32,
    rng: ChaCha8Rng,
    next_id: u64,
}

impl Bats {
    /// Spawns one bat per `spacing` meters of level, spread `spacing` apart.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn new(level_length: f32, player_y: f32, config: &BatConfig, seed: u64) -> Self {
        let mut flock = Self {
            bats: Vec::new(),
            config: config.clone(),
            level_length,
            player_y,
            rng: ChaCha8Rng::seed_from_u64(seed),
            next_id: 0,
        };
        if !config.enabled || config.spacing <= 0.0 {
            return flock;
        }

        let count = (level_length / config.spacing).max(0.0) as usize;
        flock.bats.reserve(count * 2);
        for i in 0..count {
            let mut bat = flock.spawn_bat();
            bat.object.position.x = i as f32 * config.spacing;
            flock.bats.push(bat);
        }
        tracing::debug!(count, "[bats] flock spawned");
        flock
    }

    fn spawn_bat(&mut self) -> Bat {
        let id = self.next_id;
        self.next_id += 1;

        let speed = -(self.config.base_speed + self.rng.random_range(0.0..=self.config.speed_jitter));
        let spread = self
            .rng
            .random_range(self.player_y - HEIGHT_SPREAD..=self.player_y + HEIGHT_SPREAD);
        let side = if self.rng.random_bool(0.5) { 1.0 } else { -1.0 };
        let position = Vec2::new(
            self.level_length + self.config.spawn_margin,
            BASE_HEIGHT + spread + side,
        );

        tracing::debug!(id, x = position.x, y = position.y, speed, "[bats] spawn bat");
        Bat::new(id, position, speed)
    }

    /// Creates bodies for every bat in the flock.
    pub fn init_physics(&mut self, physics: &mut PhysicsWorld) {
        for bat in &mut self.bats {
            let id = bat.object_id();
            bat.init_physics(physics, id);
        }
    }

    /// Moves the flock and recycles bats that left the level.
    ///
    /// Recycled bats get a body only when the flock already had physics.
    pub fn update(&mut self, dt: f32, physics: &mut PhysicsWorld) {
        for i in (0..self.bats.len()).rev() {
            self.bats[i].update(dt, physics);
            if self.bats[i].object.position.x >= self.config.despawn_x {
                continue;
            }

            let old = self.bats.remove(i);
            let had_body = old.object.body.is_some();
            if let Some(handle) = old.object.body {
                physics.remove_body(handle);
            }
            let mut bat = self.spawn_bat();
            if had_body {
                let id = bat.object_id();
                bat.init_physics(physics, id);
            }
            self.bats.push(bat);
        }
    }

    /// Height around which new bats spawn.
    pub fn update_player_y(&mut self, player_y: f32) {
        self.player_y = player_y;
    }

    pub fn bats(&self) -> &[Bat] {
        &self.bats
    }

    pub fn get(&self, id: u64) -> Option<&Bat> {
        self.bats.iter().find(|bat| bat.id == id)
    }

    pub fn len(&self) -> usize {
        self.bats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bats.is_empty()
    }

    pub fn render(&self, batch: &mut dyn SpriteBatch) {
        for bat in &self.bats {
            bat.render(batch);
        }
    }
}
