use crate::config::RadiusLimits;
use glam::{EulerRot, Mat4, Quat, Vec2, Vec3};
use std::cell::RefCell;
use std::f32::consts::FRAC_PI_2;
use std::rc::Rc;

const PITCH_LIMIT: f32 = FRAC_PI_2 - 0.01;

/// Orbit-style camera surface the controller drives.
pub trait CameraRig {
    fn position(&self) -> Vec3;
    fn set_position(&mut self, position: Vec3);
    fn target(&self) -> Vec3;
    fn set_target(&mut self, target: Vec3);
    fn radius_limits(&self) -> RadiusLimits;
    fn set_lower_radius_limit(&mut self, limit: f32);
    fn set_upper_radius_limit(&mut self, limit: f32);
    /// World rotation of the camera; local +Z is the view direction.
    fn absolute_rotation(&self) -> Quat;
}

impl<T: CameraRig + ?Sized> CameraRig for Rc<RefCell<T>> {
    fn position(&self) -> Vec3 {
        self.borrow().position()
    }
    fn set_position(&mut self, position: Vec3) {
        self.borrow_mut().set_position(position);
    }
    fn target(&self) -> Vec3 {
        self.borrow().target()
    }
    fn set_target(&mut self, target: Vec3) {
        self.borrow_mut().set_target(target);
    }
    fn radius_limits(&self) -> RadiusLimits {
        self.borrow().radius_limits()
    }
    fn set_lower_radius_limit(&mut self, limit: f32) {
        self.borrow_mut().set_lower_radius_limit(limit);
    }
    fn set_upper_radius_limit(&mut self, limit: f32) {
        self.borrow_mut().set_upper_radius_limit(limit);
    }
    fn absolute_rotation(&self) -> Quat {
        self.borrow().absolute_rotation()
    }
}

/// Camera orbiting a target. Position and target are stored directly; view angles are
/// rebuilt whenever either moves so a zero-radius (first-person) camera keeps its heading.
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    position: Vec3,
    target: Vec3,
    yaw_radians: f32,
    pitch_radians: f32,
    limits: RadiusLimits,
}

impl OrbitCamera {
    /// Places the camera `radius` away from `target`, looking at it along `yaw`/`pitch`.
    pub fn new(target: Vec3, radius: f32, yaw_radians: f32, pitch_radians: f32) -> Self {
        let mut camera = Self {
            position: target,
            target,
            yaw_radians,
            pitch_radians: pitch_radians.clamp(-PITCH_LIMIT, PITCH_LIMIT),
            limits: RadiusLimits::new(0.0, f32::INFINITY),
        };
        camera.place_at_radius(radius.max(0.0));
        camera
    }

    pub fn radius(&self) -> f32 {
        self.position.distance(self.target)
    }

    pub fn view_direction(&self) -> Vec3 {
        self.absolute_rotation() * Vec3::Z
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_to_lh(self.position, self.view_direction(), Vec3::Y)
    }

    /// Rotates around the target by `delta` (yaw, pitch) radians.
    pub fn orbit(&mut self, delta: Vec2) {
        let radius = self.radius();
        self.yaw_radians += delta.x;
        self.pitch_radians = (self.pitch_radians + delta.y).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.place_at_radius(radius);
    }

    /// Scales the orbit radius, clamped to the current radius limits.
    pub fn zoom(&mut self, factor: f32) {
        let radius = self.clamp_radius(self.radius() * factor);
        self.place_at_radius(radius);
    }

    fn clamp_radius(&self, radius: f32) -> f32 {
        let upper = self.limits.upper.max(self.limits.lower);
        radius.clamp(self.limits.lower, upper)
    }

    fn place_at_radius(&mut self, radius: f32) {
        self.position = self.target - self.view_direction() * radius;
    }

    fn rebuild_angles(&mut self) {
        let offset = self.target - self.position;
        if offset.length_squared() <= f32::EPSILON {
            return;
        }
        let dir = offset.normalize();
        self.yaw_radians = dir.x.atan2(dir.z);
        self.pitch_radians = (-dir.y.clamp(-1.0, 1.0).asin()).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }
}

impl CameraRig for OrbitCamera {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.rebuild_angles();
    }

    fn target(&self) -> Vec3 {
        self.target
    }

    fn set_target(&mut self, target: Vec3) {
        self.target = target;
        self.rebuild_angles();
    }

    fn radius_limits(&self) -> RadiusLimits {
        self.limits
    }

    fn set_lower_radius_limit(&mut self, limit: f32) {
        self.limits.lower = limit;
    }

    fn set_upper_radius_limit(&mut self, limit: f32) {
        self.limits.upper = limit;
    }

    fn absolute_rotation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw_radians, self.pitch_radians, 0.0)
    }
}
