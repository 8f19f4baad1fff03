//! The player character.
//!
//! Movement is velocity driven: each update reads the body's velocity,
//! overrides the horizontal part from the move state and the vertical part
//! on jump start, and writes it back to the body.

use bevy::math::{Rect, Vec2};

use super::{Animation, Behavior, GameObject, ObjectKind, PlayMode};
use crate::config::{AirControl, PlayerConfig};
use crate::input::InputState;
use crate::physics::{BodyDesc, BodyKind, PhysicsWorld};
use crate::render::SpriteBatch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewDirection {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveState {
    MoveRight,
    MoveLeft,
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpState {
    /// Jump requested; the impulse is applied on the next update.
    JumpStart,
    Jumping,
    Grounded,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub object: GameObject,
    pub view_direction: ViewDirection,
    pub move_state: MoveState,
    pub jump_state: JumpState,
    /// Seconds of orb power-up left.
    pub powerup_time_left: f32,
    config: PlayerConfig,
}

impl Player {
    pub const ANIM_IDLE: Animation = Animation::new("jack_idle", 4, 0.1, PlayMode::Loop);
    pub const ANIM_RUN: Animation = Animation::new("jack_run", 6, 0.1, PlayMode::Loop);
    pub const ANIM_JUMP: Animation = Animation::new("jack_jump", 4, 0.1, PlayMode::Normal);

    pub fn new(position: Vec2, config: &PlayerConfig) -> Self {
        let dimension = Vec2::ONE;
        let mut object = GameObject {
            position,
            dimension,
            origin: dimension / 2.0,
            // Sprite padding trimmed off the sides and top.
            bounds: Rect::new(0.15, 0.06, 0.85, 0.96),
            terminal_velocity: Vec2::new(3.0, 4.0),
            friction: Vec2::new(12.0, 0.0),
            acceleration: Vec2::new(0.0, -25.0),
            ..GameObject::default()
        };
        object.set_animation(Self::ANIM_IDLE);
        Self {
            object,
            view_direction: ViewDirection::Right,
            move_state: MoveState::Stopped,
            jump_state: JumpState::Grounded,
            powerup_time_left: 0.0,
            config: config.clone(),
        }
    }

    pub fn has_powerup(&self) -> bool {
        self.powerup_time_left > 0.0
    }

    /// Starts (or refreshes) the orb power-up.
    pub fn collected_orb(&mut self) {
        self.powerup_time_left = self.config.powerup_duration;
    }

    /// Grounded means no vertical motion within the configured epsilon.
    pub fn is_grounded(&self, vel_y: f32) -> bool {
        vel_y.abs() <= self.config.grounded_epsilon
    }

    /// Current velocity from the body, or the locally integrated one.
    fn current_velocity(&self, physics: &PhysicsWorld) -> Vec2 {
        self.object
            .body
            .and_then(|handle| physics.linvel(handle))
            .unwrap_or(self.object.velocity)
    }

    /// Applies this frame's keys. Returns true when a jump was started.
    pub fn handle_input(&mut self, input: &InputState, physics: &PhysicsWorld) -> bool {
        self.move_state = if input.right {
            MoveState::MoveRight
        } else if input.left {
            MoveState::MoveLeft
        } else {
            MoveState::Stopped
        };

        let vel = self.current_velocity(physics);
        if input.jump_pressed && self.jump_state != JumpState::JumpStart && self.is_grounded(vel.y) {
            self.jump_state = JumpState::JumpStart;
            return true;
        }
        false
    }

    /// Applies move and jump state to the velocity.
    fn step(&mut self, physics: &mut PhysicsWorld) {
        let mut vel = self.current_velocity(physics);
        let may_steer = match self.config.air_control {
            AirControl::Full => true,
            AirControl::GroundedOnly => self.is_grounded(vel.y),
        };

        match self.move_state {
            MoveState::MoveRight if may_steer => vel.x = self.config.run_speed,
            MoveState::MoveLeft if may_steer => vel.x = -self.config.run_speed,
            MoveState::Stopped => vel.x = 0.0,
            MoveState::MoveRight | MoveState::MoveLeft => {}
        }

        match self.jump_state {
            JumpState::JumpStart => {
                let boost = if self.has_powerup() {
                    self.config.powerup_jump_multiplier
                } else {
                    1.0
                };
                vel.y = self.config.jump_velocity * boost;
            }
            JumpState::Jumping => {
                if self.is_grounded(vel.y) {
                    self.jump_state = JumpState::Grounded;
                }
            }
            JumpState::Grounded => {}
        }

        if let Some(handle) = self.object.body {
            physics.set_linvel(handle, vel);
        }
        self.object.velocity = vel;
    }

    fn update_animation(&mut self) {
        if self.jump_state == JumpState::JumpStart {
            self.object.set_animation(Self::ANIM_JUMP);
            self.jump_state = JumpState::Jumping;
        }

        if self.object.is_playing(&Self::ANIM_JUMP)
            && Self::ANIM_JUMP.is_finished(self.object.state_time)
        {
            self.object.set_animation(Self::ANIM_RUN);
        }

        if self.jump_state == JumpState::Grounded {
            let next = if self.move_state == MoveState::Stopped {
                Self::ANIM_IDLE
            } else {
                Self::ANIM_RUN
            };
            if !self.object.is_playing(&next) {
                self.object.set_animation(next);
            }
        }
    }
}

impl Behavior for Player {
    fn kind(&self) -> ObjectKind {
        ObjectKind::Player
    }

    fn object(&self) -> &GameObject {
        &self.object
    }

    fn object_mut(&mut self) -> &mut GameObject {
        &mut self.object
    }

    fn body_desc(&self) -> Option<BodyDesc> {
        Some(self.object.body_desc(BodyKind::Dynamic, false))
    }

    fn update(&mut self, dt: f32, physics: &mut PhysicsWorld) {
        self.object.update(dt, physics);

        if self.object.velocity.x < 0.0 {
            self.view_direction = ViewDirection::Left;
        } else if self.object.velocity.x > 0.0 {
            self.view_direction = ViewDirection::Right;
        }

        self.step(physics);
        self.update_animation();

        if self.powerup_time_left > 0.0 {
            self.powerup_time_left = (self.powerup_time_left - dt).max(0.0);
        }
    }

    /// Mirrored while facing left.
    fn render(&self, batch: &mut dyn SpriteBatch) {
        if let Some(mut sprite) = self.object.animated_sprite() {
            sprite.flip_x = self.view_direction == ViewDirection::Left;
            batch.draw(sprite);
        }
    }
}
