//! Game object model.
//!
//! Every object embeds a [`GameObject`] with its spatial and physical state
//! and implements [`Behavior`] for the parts that differ per kind (bodies,
//! updates, sprites). The set of kinds is closed, see [`ObjectKind`].

pub mod animation;
pub mod background;
pub mod bat;
pub mod goal;
pub mod land;
pub mod pickup;
pub mod player;

pub use animation::{Animation, PlayMode};
pub use background::Background;
pub use bat::{Bat, Bats};
pub use goal::Goal;
pub use land::{Land, LandKind};
pub use pickup::{Candycorn, Orb};
pub use player::{JumpState, MoveState, Player, ViewDirection};

use bevy::math::{Rect, Vec2};

use crate::physics::{BodyDesc, BodyHandle, BodyKind, PhysicsWorld};
use crate::render::{Sprite, SpriteBatch};

/// Kind tag of a game object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Land,
    Player,
    Candycorn,
    Orb,
    Goal,
    Bat,
    Background,
}

/// Identifies an object inside the current [`Level`](crate::level::Level).
///
/// Indices point into the level's collections; bats use their spawn id
/// because the flock is recycled while the level runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectId {
    Land(usize),
    Player,
    Candycorn(usize),
    Orb(usize),
    Goal,
    Bat(u64),
}

impl ObjectId {
    pub fn kind(self) -> ObjectKind {
        match self {
            Self::Land(_) => ObjectKind::Land,
            Self::Player => ObjectKind::Player,
            Self::Candycorn(_) => ObjectKind::Candycorn,
            Self::Orb(_) => ObjectKind::Orb,
            Self::Goal => ObjectKind::Goal,
            Self::Bat(_) => ObjectKind::Bat,
        }
    }
}

/// Spatial and physical state shared by all objects.
#[derive(Debug, Clone, PartialEq)]
pub struct GameObject {
    /// World position in meters.
    pub position: Vec2,
    pub dimension: Vec2,
    /// Local pivot for rotation and scale.
    pub origin: Vec2,
    pub scale: Vec2,
    /// Rotation in degrees.
    pub rotation: f32,
    /// Current speed in m/s.
    pub velocity: Vec2,
    /// Positive and negative max speed in m/s.
    pub terminal_velocity: Vec2,
    /// Deceleration applied until velocity reaches zero.
    pub friction: Vec2,
    /// Constant acceleration in m/s².
    pub acceleration: Vec2,
    /// Collision rectangle in local space.
    pub bounds: Rect,
    pub body: Option<BodyHandle>,
    /// Seconds since the current animation started.
    pub state_time: f32,
    pub animation: Option<Animation>,
}

impl Default for GameObject {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            dimension: Vec2::ONE,
            origin: Vec2::ZERO,
            scale: Vec2::ONE,
            rotation: 0.0,
            velocity: Vec2::ZERO,
            terminal_velocity: Vec2::ONE,
            friction: Vec2::ZERO,
            acceleration: Vec2::ZERO,
            bounds: Rect::new(0.0, 0.0, 0.0, 0.0),
            body: None,
            state_time: 0.0,
            animation: None,
        }
    }
}

impl GameObject {
    /// Advances the animation clock and pulls the authoritative state from
    /// the physics body, or integrates motion locally when there is none.
    pub fn update(&mut self, dt: f32, physics: &PhysicsWorld) {
        self.state_time += dt;
        match self.body {
            Some(handle) => self.sync_from_body(handle, physics),
            None => self.update_motion(dt),
        }
    }

    /// Copies position, rotation and velocity from the physics body.
    pub fn sync_from_body(&mut self, handle: BodyHandle, physics: &PhysicsWorld) {
        if let Some(position) = physics.translation(handle) {
            self.position = position;
        }
        if let Some(rotation) = physics.rotation_degrees(handle) {
            self.rotation = rotation;
        }
        if let Some(velocity) = physics.linvel(handle) {
            self.velocity = velocity;
        }
    }

    /// Integrates friction, acceleration and the terminal velocity clamp.
    pub fn update_motion(&mut self, dt: f32) {
        self.velocity.x = Self::integrate_axis(
            self.velocity.x,
            self.friction.x,
            self.acceleration.x,
            self.terminal_velocity.x,
            dt,
        );
        self.velocity.y = Self::integrate_axis(
            self.velocity.y,
            self.friction.y,
            self.acceleration.y,
            self.terminal_velocity.y,
            dt,
        );
        self.position += self.velocity * dt;
    }

    fn integrate_axis(velocity: f32, friction: f32, acceleration: f32, terminal: f32, dt: f32) -> f32 {
        let mut velocity = if velocity > 0.0 {
            (velocity - friction * dt).max(0.0)
        } else if velocity < 0.0 {
            (velocity + friction * dt).min(0.0)
        } else {
            velocity
        };
        velocity += acceleration * dt;
        velocity.clamp(-terminal, terminal)
    }

    /// Switches animation and restarts the clock.
    pub fn set_animation(&mut self, animation: Animation) {
        self.animation = Some(animation);
        self.state_time = 0.0;
    }

    /// Whether `animation` is the one currently playing.
    pub fn is_playing(&self, animation: &Animation) -> bool {
        self.animation.as_ref().is_some_and(|current| current.key == animation.key)
    }

    /// Body description covering [`GameObject::bounds`].
    pub fn body_desc(&self, kind: BodyKind, sensor: bool) -> BodyDesc {
        BodyDesc {
            kind,
            position: self.position,
            half_extents: self.bounds.half_size(),
            offset: self.bounds.center(),
            sensor,
            linvel: self.velocity,
            lock_rotations: kind == BodyKind::Dynamic,
        }
    }

    /// Sprite at the object's transform showing `region`.
    pub fn sprite(&self, region: &'static str) -> Sprite {
        Sprite {
            region,
            frame: 0,
            position: self.position,
            origin: self.origin,
            dimension: self.dimension,
            scale: self.scale,
            rotation: self.rotation,
            flip_x: false,
            flip_y: false,
        }
    }

    /// Sprite for the current animation frame, if an animation is set.
    pub fn animated_sprite(&self) -> Option<Sprite> {
        let animation = self.animation.as_ref()?;
        let mut sprite = self.sprite(animation.key);
        sprite.frame = animation.key_frame_index(self.state_time);
        Some(sprite)
    }
}

/// Per-kind behavior on top of [`GameObject`].
pub trait Behavior {
    fn kind(&self) -> ObjectKind;

    fn object(&self) -> &GameObject;

    fn object_mut(&mut self) -> &mut GameObject;

    /// Body this object needs in the physics world, if any.
    fn body_desc(&self) -> Option<BodyDesc> {
        None
    }

    /// Creates the object's body and keeps the handle.
    fn init_physics(&mut self, physics: &mut PhysicsWorld, id: ObjectId) {
        if let Some(desc) = self.body_desc() {
            let handle = physics.create_body(&desc, id);
            self.object_mut().body = Some(handle);
        }
    }

    fn update(&mut self, dt: f32, physics: &mut PhysicsWorld) {
        self.object_mut().update(dt, physics);
    }

    fn render(&self, batch: &mut dyn SpriteBatch);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_friction_stops_at_zero() {
        let mut object = GameObject {
            velocity: Vec2::new(1.0, 0.0),
            friction: Vec2::new(12.0, 0.0),
            terminal_velocity: Vec2::new(3.0, 4.0),
            ..GameObject::default()
        };

        object.update_motion(0.5);

        assert_eq!(object.velocity.x, 0.0);
        assert_eq!(object.position, Vec2::ZERO);
    }

    #[test]
    fn test_terminal_velocity_clamps_acceleration() {
        let mut object = GameObject {
            acceleration: Vec2::new(0.0, -25.0),
            terminal_velocity: Vec2::new(3.0, 4.0),
            ..GameObject::default()
        };

        for _ in 0..10 {
            object.update_motion(0.1);
        }

        assert_eq!(object.velocity.y, -4.0);
        assert!(object.position.y < 0.0);
    }

    #[test]
    fn test_body_desc_uses_bounds_center() {
        let object = GameObject {
            position: Vec2::new(3.0, 2.0),
            bounds: Rect::new(0.15, 0.06, 0.85, 0.96),
            ..GameObject::default()
        };

        let desc = object.body_desc(BodyKind::Dynamic, false);

        assert_eq!(desc.position, Vec2::new(3.0, 2.0));
        assert!((desc.offset - Vec2::new(0.5, 0.51)).length() < 1e-5);
        assert!((desc.half_extents - Vec2::new(0.35, 0.45)).length() < 1e-5);
        assert!(desc.lock_rotations);
    }

    #[test]
    fn test_set_animation_restarts_clock() {
        let mut object = GameObject {
            state_time: 3.0,
            ..GameObject::default()
        };
        let anim = Animation::new("test/anim", 4, 0.1, PlayMode::Loop);

        object.set_animation(anim);

        assert_eq!(object.state_time, 0.0);
        assert!(object.is_playing(&anim));
    }
}
