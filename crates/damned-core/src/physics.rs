//! Physics world adapter over `Rapier2D`.
//!
//! Game objects never hold rapier types directly. Each object owns an opaque
//! [`BodyHandle`] and each rigid body carries its owner's [`ObjectId`] in
//! `user_data`, so contact events resolve back to level objects by index.

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

use bevy::math::Vec2;
use parking_lot::Mutex;
use rapier2d::prelude::*;

use crate::config::PhysicsConfig;
use crate::objects::{ObjectId, ObjectKind};

/// Opaque handle to a body owned by the [`PhysicsWorld`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyHandle(RigidBodyHandle);

/// How a body participates in the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    /// Never moves; used for pickups and the goal.
    Fixed,
    /// Moves with a prescribed velocity and pushes dynamic bodies.
    Kinematic,
    /// Fully simulated.
    Dynamic,
}

/// Everything needed to create a body with a single box fixture.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyDesc {
    pub kind: BodyKind,
    /// Body origin in world space.
    pub position: Vec2,
    /// Box half extents.
    pub half_extents: Vec2,
    /// Box center relative to the body origin.
    pub offset: Vec2,
    /// Sensors report overlaps without a collision response.
    pub sensor: bool,
    pub linvel: Vec2,
    pub lock_rotations: bool,
}

/// Overlap notification between two level objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactEvent {
    Begin(ObjectId, ObjectId),
    End(ObjectId, ObjectId),
}

/// Encodes an object id into rapier `user_data` (`tag << 64 | index`).
///
/// Tag 0 is reserved so that bodies without an owner decode to `None`.
pub fn encode_user_data(id: ObjectId) -> u128 {
    let (tag, index) = match id {
        ObjectId::Land(i) => (1u64, i as u64),
        ObjectId::Player => (2, 0),
        ObjectId::Candycorn(i) => (3, i as u64),
        ObjectId::Orb(i) => (4, i as u64),
        ObjectId::Goal => (5, 0),
        ObjectId::Bat(id) => (6, id),
    };
    (u128::from(tag) << 64) | u128::from(index)
}

/// Decodes rapier `user_data` written by [`encode_user_data`].
#[allow(clippy::cast_possible_truncation)]
pub fn decode_user_data(user_data: u128) -> Option<ObjectId> {
    let tag = (user_data >> 64) as u64;
    let index = user_data as u64;
    match tag {
        1 => Some(ObjectId::Land(index as usize)),
        2 => Some(ObjectId::Player),
        3 => Some(ObjectId::Candycorn(index as usize)),
        4 => Some(ObjectId::Orb(index as usize)),
        5 => Some(ObjectId::Goal),
        6 => Some(ObjectId::Bat(index)),
        _ => None,
    }
}

/// Collects collision events raised while the pipeline steps.
#[derive(Default)]
struct ContactCollector {
    events: Mutex<Vec<CollisionEvent>>,
}

impl EventHandler for ContactCollector {
    fn handle_collision_event(
        &self,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        event: CollisionEvent,
        _contact_pair: Option<&ContactPair>,
    ) {
        self.events.lock().push(event);
    }

    fn handle_contact_force_event(
        &self,
        _dt: Real,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        _contact_pair: &ContactPair,
        _total_force_magnitude: Real,
    ) {
    }
}

/// Physics world containing all `Rapier2D` state for one level instance.
pub struct PhysicsWorld {
    pub rigid_body_set: RigidBodySet,
    pub collider_set: ColliderSet,
    pub integration_parameters: IntegrationParameters,
    pub physics_pipeline: PhysicsPipeline,
    pub island_manager: IslandManager,
    pub broad_phase: DefaultBroadPhase,
    pub narrow_phase: NarrowPhase,
    pub impulse_joint_set: ImpulseJointSet,
    pub multibody_joint_set: MultibodyJointSet,
    pub ccd_solver: CCDSolver,
    pub gravity: Vector,
    pub frame: u64,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new(&PhysicsConfig::default())
    }
}

impl fmt::Debug for PhysicsWorld {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhysicsWorld")
            .field("frame", &self.frame)
            .field("rigid_body_count", &self.rigid_body_set.len())
            .field("collider_count", &self.collider_set.len())
            .field("gravity", &self.gravity)
            .finish_non_exhaustive()
    }
}

impl PhysicsWorld {
    /// Creates an empty world with the configured gravity and solver iterations.
    pub fn new(config: &PhysicsConfig) -> Self {
        let mut integration_parameters = IntegrationParameters::default();
        integration_parameters.num_solver_iterations = config.velocity_iterations;
        integration_parameters.num_internal_stabilization_iterations = config.position_iterations;

        Self {
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            integration_parameters,
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            gravity: Vector::new(config.gravity[0], config.gravity[1]),
            frame: 0,
        }
    }

    /// Advances the simulation by `dt` seconds and returns the contacts that
    /// began or ended during the step, resolved to their owning objects.
    ///
    /// A non-positive `dt` leaves the world untouched.
    pub fn step(&mut self, dt: f32) -> Vec<ContactEvent> {
        if dt <= 0.0 {
            return Vec::new();
        }
        self.integration_parameters.dt = dt;

        let collector = ContactCollector::default();
        self.physics_pipeline.step(
            self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            &(),
            &collector,
        );
        self.frame += 1;

        collector
            .events
            .into_inner()
            .into_iter()
            .filter_map(|event| match event {
                CollisionEvent::Started(h1, h2, _flags) => {
                    Some(ContactEvent::Begin(self.owner_of(h1)?, self.owner_of(h2)?))
                }
                CollisionEvent::Stopped(h1, h2, _flags) => {
                    Some(ContactEvent::End(self.owner_of(h1)?, self.owner_of(h2)?))
                }
            })
            .collect()
    }

    /// Creates a body with one box fixture owned by `owner`.
    pub fn create_body(&mut self, desc: &BodyDesc, owner: ObjectId) -> BodyHandle {
        let builder = match desc.kind {
            BodyKind::Fixed => RigidBodyBuilder::fixed(),
            BodyKind::Kinematic => RigidBodyBuilder::kinematic_velocity_based(),
            BodyKind::Dynamic => RigidBodyBuilder::dynamic(),
        };
        let mut builder = builder
            .translation(Vector::new(desc.position.x, desc.position.y))
            .linvel(Vector::new(desc.linvel.x, desc.linvel.y))
            .user_data(encode_user_data(owner));
        if desc.lock_rotations {
            builder = builder.lock_rotations();
        }
        let body_handle = self.rigid_body_set.insert(builder.build());

        let collider = ColliderBuilder::cuboid(desc.half_extents.x, desc.half_extents.y)
            .translation(Vector::new(desc.offset.x, desc.offset.y))
            .sensor(desc.sensor)
            .active_events(ActiveEvents::COLLISION_EVENTS)
            .build();
        self.collider_set
            .insert_with_parent(collider, body_handle, &mut self.rigid_body_set);

        tracing::trace!(?owner, kind = ?desc.kind, "[physics] body created");
        BodyHandle(body_handle)
    }

    /// Removes a body and its fixture.
    pub fn remove_body(&mut self, handle: BodyHandle) {
        self.rigid_body_set.remove(
            handle.0,
            &mut self.island_manager,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            true,
        );
    }

    /// Removes every body and rewinds the frame counter.
    pub fn clear(&mut self) {
        let handles: Vec<RigidBodyHandle> =
            self.rigid_body_set.iter().map(|(handle, _)| handle).collect();
        for handle in handles {
            self.remove_body(BodyHandle(handle));
        }
        self.frame = 0;
    }

    /// Returns true while the body exists in this world.
    pub fn contains(&self, handle: BodyHandle) -> bool {
        self.rigid_body_set.get(handle.0).is_some()
    }

    /// Body origin in world space.
    pub fn translation(&self, handle: BodyHandle) -> Option<Vec2> {
        self.rigid_body_set.get(handle.0).map(|body| {
            let pos = body.translation();
            Vec2::new(pos.x, pos.y)
        })
    }

    /// Body rotation in degrees.
    pub fn rotation_degrees(&self, handle: BodyHandle) -> Option<f32> {
        self.rigid_body_set
            .get(handle.0)
            .map(|body| body.rotation().angle().to_degrees())
    }

    pub fn linvel(&self, handle: BodyHandle) -> Option<Vec2> {
        self.rigid_body_set.get(handle.0).map(|body| {
            let vel = body.linvel();
            Vec2::new(vel.x, vel.y)
        })
    }

    pub fn set_linvel(&mut self, handle: BodyHandle, linvel: Vec2) {
        if let Some(body) = self.rigid_body_set.get_mut(handle.0) {
            body.set_linvel(Vector::new(linvel.x, linvel.y), true);
        }
    }

    /// Kind tag of the object owning `handle`'s body.
    pub fn owner_kind(&self, handle: BodyHandle) -> Option<ObjectKind> {
        let body = self.rigid_body_set.get(handle.0)?;
        decode_user_data(body.user_data).map(|id| id.kind())
    }

    /// Number of bodies in the world.
    pub fn body_count(&self) -> usize {
        self.rigid_body_set.len()
    }

    /// Returns the current simulation frame number.
    pub fn current_frame(&self) -> u64 {
        self.frame
    }

    /// Computes a deterministic hash of all body states.
    pub fn compute_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.frame.hash(&mut hasher);

        for (handle, body) in self.rigid_body_set.iter() {
            let (index, generation) = handle.into_raw_parts();
            index.hash(&mut hasher);
            generation.hash(&mut hasher);

            let pos = body.translation();
            hash_f32(pos.x, &mut hasher);
            hash_f32(pos.y, &mut hasher);

            let linvel = body.linvel();
            hash_f32(linvel.x, &mut hasher);
            hash_f32(linvel.y, &mut hasher);
        }

        hasher.finish()
    }

    fn owner_of(&self, handle: ColliderHandle) -> Option<ObjectId> {
        let collider = self.collider_set.get(handle)?;
        let body = self.rigid_body_set.get(collider.parent()?)?;
        decode_user_data(body.user_data)
    }
}

/// Hashes a f32 value by converting to bits.
fn hash_f32(value: f32, hasher: &mut impl Hasher) {
    value.to_bits().hash(hasher);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn box_desc(kind: BodyKind, position: Vec2, sensor: bool) -> BodyDesc {
        BodyDesc {
            kind,
            position,
            half_extents: Vec2::splat(0.5),
            offset: Vec2::splat(0.5),
            sensor,
            linvel: Vec2::ZERO,
            lock_rotations: kind == BodyKind::Dynamic,
        }
    }

    #[test]
    fn test_user_data_roundtrip() {
        for id in [
            ObjectId::Land(7),
            ObjectId::Player,
            ObjectId::Candycorn(0),
            ObjectId::Orb(3),
            ObjectId::Goal,
            ObjectId::Bat(42),
        ] {
            assert_eq!(decode_user_data(encode_user_data(id)), Some(id));
        }
        assert_eq!(decode_user_data(0), None);
    }

    #[test]
    fn test_dynamic_body_falls() {
        let mut world = PhysicsWorld::default();
        let handle = world.create_body(
            &box_desc(BodyKind::Dynamic, Vec2::new(0.0, 10.0), false),
            ObjectId::Player,
        );

        for _ in 0..30 {
            world.step(1.0 / 60.0);
        }

        let pos = world.translation(handle).unwrap();
        assert!(pos.y < 10.0);
        assert!(world.linvel(handle).unwrap().y < 0.0);
        assert_eq!(world.current_frame(), 30);
    }

    #[test]
    fn test_kinematic_body_ignores_gravity() {
        let mut world = PhysicsWorld::default();
        let mut desc = box_desc(BodyKind::Kinematic, Vec2::new(5.0, 2.0), true);
        desc.linvel = Vec2::new(-2.0, 0.0);
        let handle = world.create_body(&desc, ObjectId::Bat(0));

        for _ in 0..60 {
            world.step(1.0 / 60.0);
        }

        let pos = world.translation(handle).unwrap();
        assert!((pos.x - 3.0).abs() < 0.05);
        assert!((pos.y - 2.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_sensor_overlap_reports_owners() {
        let mut world = PhysicsWorld::default();
        world.create_body(
            &box_desc(BodyKind::Fixed, Vec2::new(0.0, 0.0), true),
            ObjectId::Candycorn(2),
        );
        world.create_body(
            &box_desc(BodyKind::Dynamic, Vec2::new(0.0, 0.2), false),
            ObjectId::Player,
        );

        let events = world.step(1.0 / 60.0);

        assert!(events.iter().any(|event| matches!(
            event,
            ContactEvent::Begin(ObjectId::Player, ObjectId::Candycorn(2))
                | ContactEvent::Begin(ObjectId::Candycorn(2), ObjectId::Player)
        )));
    }

    #[test]
    fn test_remove_body() {
        let mut world = PhysicsWorld::default();
        let handle = world.create_body(
            &box_desc(BodyKind::Kinematic, Vec2::ZERO, true),
            ObjectId::Bat(1),
        );
        assert!(world.contains(handle));
        assert_eq!(world.owner_kind(handle), Some(ObjectKind::Bat));

        world.remove_body(handle);
        assert!(!world.contains(handle));
        assert_eq!(world.body_count(), 0);
    }

    #[test]
    fn test_solver_iterations_from_config() {
        let config = PhysicsConfig {
            velocity_iterations: 6,
            position_iterations: 2,
            ..PhysicsConfig::default()
        };
        let world = PhysicsWorld::new(&config);

        assert_eq!(world.integration_parameters.num_solver_iterations, 6);
        assert_eq!(
            world
                .integration_parameters
                .num_internal_stabilization_iterations,
            2
        );
    }

    #[test]
    fn test_clear_removes_all_bodies() {
        let mut world = PhysicsWorld::default();
        let player = world.create_body(
            &box_desc(BodyKind::Dynamic, Vec2::new(0.0, 2.0), false),
            ObjectId::Player,
        );
        world.create_body(
            &box_desc(BodyKind::Kinematic, Vec2::ZERO, false),
            ObjectId::Land(0),
        );
        world.step(1.0 / 60.0);

        world.clear();

        assert_eq!(world.body_count(), 0);
        assert_eq!(world.collider_set.len(), 0);
        assert!(!world.contains(player));
        assert_eq!(world.current_frame(), 0);
    }

    #[test]
    fn test_zero_dt_does_not_step() {
        let mut world = PhysicsWorld::default();
        assert!(world.step(0.0).is_empty());
        assert_eq!(world.current_frame(), 0);
    }

    #[test]
    fn test_deterministic_simulation() {
        let mut world1 = PhysicsWorld::default();
        let mut world2 = PhysicsWorld::default();
        let desc = box_desc(BodyKind::Dynamic, Vec2::new(1.0, 4.0), false);
        world1.create_body(&desc, ObjectId::Player);
        world2.create_body(&desc, ObjectId::Player);

        for _ in 0..100 {
            world1.step(1.0 / 60.0);
            world2.step(1.0 / 60.0);
        }

        assert_eq!(world1.compute_hash(), world2.compute_hash());
    }
}
