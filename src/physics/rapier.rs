use super::{PhysicsBody, RaycastResult, Raycaster};
use glam::Vec3;
use rapier3d::na as nalgebra;
use rapier3d::prelude::{
    point, vector, CCDSolver, ColliderBuilder, ColliderHandle, ColliderSet, DefaultBroadPhase, ImpulseJointSet,
    IntegrationParameters, IslandManager, MultibodyJointSet, NarrowPhase, PhysicsPipeline, QueryFilter,
    QueryPipeline, Ray, Real, RigidBodyBuilder, RigidBodyHandle, RigidBodySet, Vector,
};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone, Copy)]
pub struct PhysicsParams {
    pub gravity: Vec3,
}

impl Default for PhysicsParams {
    fn default() -> Self {
        Self { gravity: Vec3::new(0.0, -19.62, 0.0) }
    }
}

/// Collision capsule for the character body.
#[derive(Debug, Clone, Copy)]
pub struct CapsuleParams {
    pub height: f32,
    pub radius: f32,
    pub mass: f32,
    pub restitution: f32,
    pub linear_damping: f32,
}

impl Default for CapsuleParams {
    fn default() -> Self {
        Self { height: 1.75, radius: 0.3, mass: 20.0, restitution: 0.01, linear_damping: 50.0 }
    }
}

pub struct RapierWorld {
    pipeline: PhysicsPipeline,
    gravity: Vector<Real>,
    integration_parameters: IntegrationParameters,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,
}

pub type SharedRapierWorld = Rc<RefCell<RapierWorld>>;

impl RapierWorld {
    pub fn new(params: &PhysicsParams) -> Self {
        Self {
            pipeline: PhysicsPipeline::new(),
            gravity: vec_to_rapier(params.gravity),
            integration_parameters: IntegrationParameters::default(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
        }
    }

    pub fn into_shared(self) -> SharedRapierWorld {
        Rc::new(RefCell::new(self))
    }

    /// Adds fixed box geometry (walls, floors) centred at `center`.
    pub fn insert_static_box(&mut self, center: Vec3, half: Vec3) -> ColliderHandle {
        let body = RigidBodyBuilder::fixed().translation(vec_to_rapier(center)).build();
        let body_handle = self.bodies.insert(body);
        let collider = ColliderBuilder::cuboid(half.x, half.y, half.z).friction(0.8).build();
        let handle = self.colliders.insert_with_parent(collider, body_handle, &mut self.bodies);
        self.query_pipeline.update(&self.colliders);
        handle
    }

    /// Spawns the upright character capsule with its feet at `feet`.
    pub fn spawn_character(&mut self, feet: Vec3, capsule: &CapsuleParams) -> RigidBodyHandle {
        let center = feet + Vec3::Y * (capsule.height * 0.5);
        let body = RigidBodyBuilder::dynamic()
            .translation(vec_to_rapier(center))
            .linear_damping(capsule.linear_damping)
            .lock_rotations()
            .build();
        let body_handle = self.bodies.insert(body);
        let half_segment = (capsule.height * 0.5 - capsule.radius).max(0.0);
        let collider = ColliderBuilder::capsule_y(half_segment, capsule.radius)
            .mass(capsule.mass)
            .restitution(capsule.restitution)
            .build();
        self.colliders.insert_with_parent(collider, body_handle, &mut self.bodies);
        self.query_pipeline.update(&self.colliders);
        body_handle
    }

    pub fn step(&mut self, dt: f32) {
        self.integration_parameters.dt = dt;
        let hooks = ();
        let events = ();
        self.pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &hooks,
            &events,
        );
        self.query_pipeline.update(&self.colliders);
    }

    pub fn body_translation(&self, handle: RigidBodyHandle) -> Option<Vec3> {
        self.bodies.get(handle).map(|body| vec_from_rapier(body.translation()))
    }

    pub fn body_velocity(&self, handle: RigidBodyHandle) -> Option<Vec3> {
        self.bodies.get(handle).map(|body| vec_from_rapier(body.linvel()))
    }

    pub fn set_body_velocity(&mut self, handle: RigidBodyHandle, velocity: Vec3) {
        if let Some(body) = self.bodies.get_mut(handle) {
            body.set_linvel(vec_to_rapier(velocity), true);
        }
    }

    pub fn apply_body_impulse(&mut self, handle: RigidBodyHandle, impulse: Vec3, at: Vec3) {
        if let Some(body) = self.bodies.get_mut(handle) {
            body.apply_impulse_at_point(vec_to_rapier(impulse), point![at.x, at.y, at.z], true);
        }
    }

    /// First hit along the segment `from -> to`, as (point, distance from `from`).
    pub fn cast_segment(&self, from: Vec3, to: Vec3, exclude: Option<RigidBodyHandle>) -> Option<(Vec3, f32)> {
        let delta = to - from;
        let length = delta.length();
        if length <= f32::EPSILON {
            return None;
        }
        let dir = delta / length;
        let ray = Ray::new(point![from.x, from.y, from.z], vector![dir.x, dir.y, dir.z]);
        let filter = match exclude {
            Some(handle) => QueryFilter::default().exclude_rigid_body(handle),
            None => QueryFilter::default(),
        };
        self.query_pipeline
            .cast_ray(&self.bodies, &self.colliders, &ray, length, true, filter)
            .map(|(_, toi)| (from + dir * toi, toi))
    }
}

/// The character body inside a shared [`RapierWorld`].
#[derive(Clone)]
pub struct RapierBody {
    world: SharedRapierWorld,
    handle: RigidBodyHandle,
}

impl RapierBody {
    pub fn new(world: SharedRapierWorld, handle: RigidBodyHandle) -> Self {
        Self { world, handle }
    }

    pub fn handle(&self) -> RigidBodyHandle {
        self.handle
    }
}

impl PhysicsBody for RapierBody {
    fn position(&self) -> Vec3 {
        self.world.borrow().body_translation(self.handle).unwrap_or(Vec3::ZERO)
    }

    fn linear_velocity(&self) -> Vec3 {
        self.world.borrow().body_velocity(self.handle).unwrap_or(Vec3::ZERO)
    }

    fn set_linear_velocity(&mut self, velocity: Vec3) {
        self.world.borrow_mut().set_body_velocity(self.handle, velocity);
    }

    fn apply_impulse(&mut self, impulse: Vec3, at: Vec3) {
        self.world.borrow_mut().apply_body_impulse(self.handle, impulse, at);
    }
}

/// Raycasts against a shared [`RapierWorld`], ignoring one body (usually the character).
#[derive(Clone)]
pub struct RapierRaycaster {
    world: SharedRapierWorld,
    exclude: Option<RigidBodyHandle>,
}

impl RapierRaycaster {
    pub fn new(world: SharedRapierWorld, exclude: Option<RigidBodyHandle>) -> Self {
        Self { world, exclude }
    }
}

impl Raycaster for RapierRaycaster {
    fn raycast_to_ref(&self, from: Vec3, to: Vec3, result: &mut RaycastResult) {
        result.reset();
        if let Some((point, _)) = self.world.borrow().cast_segment(from, to, self.exclude) {
            result.set_hit(point);
        }
    }
}

fn vec_to_rapier(v: Vec3) -> Vector<Real> {
    Vector::new(v.x, v.y, v.z)
}

fn vec_from_rapier(v: &Vector<Real>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}
