//! Physics collaborator seams: the character's rigid body and scene raycasts.

use glam::Vec3;
use std::cell::RefCell;
use std::rc::Rc;

#[cfg(feature = "rapier")]
pub mod rapier;

/// Handle to the character's dynamic body.
pub trait PhysicsBody {
    fn position(&self) -> Vec3;
    fn linear_velocity(&self) -> Vec3;
    fn set_linear_velocity(&mut self, velocity: Vec3);
    fn apply_impulse(&mut self, impulse: Vec3, at: Vec3);
}

impl<T: PhysicsBody + ?Sized> PhysicsBody for Rc<RefCell<T>> {
    fn position(&self) -> Vec3 {
        self.borrow().position()
    }
    fn linear_velocity(&self) -> Vec3 {
        self.borrow().linear_velocity()
    }
    fn set_linear_velocity(&mut self, velocity: Vec3) {
        self.borrow_mut().set_linear_velocity(velocity);
    }
    fn apply_impulse(&mut self, impulse: Vec3, at: Vec3) {
        self.borrow_mut().apply_impulse(impulse, at);
    }
}

/// Reusable raycast output. Cleared with [`RaycastResult::reset`] between uses.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RaycastResult {
    pub has_hit: bool,
    pub hit_point_world: Vec3,
}

impl RaycastResult {
    pub fn set_hit(&mut self, point: Vec3) {
        self.has_hit = true;
        self.hit_point_world = point;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Segment raycast against scene geometry, writing into a caller-owned result.
pub trait Raycaster {
    fn raycast_to_ref(&self, from: Vec3, to: Vec3, result: &mut RaycastResult);
}

impl<T: Raycaster + ?Sized> Raycaster for Rc<RefCell<T>> {
    fn raycast_to_ref(&self, from: Vec3, to: Vec3, result: &mut RaycastResult) {
        self.borrow().raycast_to_ref(from, to, result);
    }
}
