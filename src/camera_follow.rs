//! Translation-locked camera follow with a physics raycast that keeps walls out of the shot.

use crate::camera::CameraRig;
use crate::config::{ControllerConfig, RadiusLimits};
use crate::physics::{RaycastResult, Raycaster};
use glam::Vec3;

/// Outcome of the wall check for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WallCheck {
    /// No physics engine was available, so the check was skipped.
    Skipped,
    Clear,
    Hit { point: Vec3, upper_radius_limit: f32 },
}

#[derive(Debug, Clone)]
pub struct CameraFollow {
    previous_character_position: Vec3,
    look_at_height: f32,
    raycast_height: f32,
    distance_from_wall: f32,
    lerp: f32,
    result: RaycastResult,
}

impl CameraFollow {
    pub fn new(config: &ControllerConfig) -> Self {
        Self {
            previous_character_position: Vec3::ZERO,
            look_at_height: config.look_at_height(),
            raycast_height: config.raycast_height,
            distance_from_wall: config.distance_from_wall,
            lerp: config.camera_lerp,
            result: RaycastResult::default(),
        }
    }

    /// Restarts delta tracking from `position` so the next frame does not jump the camera.
    pub fn reset(&mut self, position: Vec3) {
        self.previous_character_position = position;
    }

    /// Carries the camera along with the character, re-aims it and runs the wall check.
    pub fn update(
        &mut self,
        character_position: Vec3,
        camera: &mut dyn CameraRig,
        raycaster: Option<&dyn Raycaster>,
        default_limits: RadiusLimits,
    ) -> WallCheck {
        let delta = character_position - self.previous_character_position;
        self.previous_character_position = character_position;
        camera.set_position(camera.position() + delta);
        camera.set_target(character_position + Vec3::Y * self.look_at_height);

        match raycaster {
            Some(raycaster) => self.avoid_walls(character_position, camera, raycaster, default_limits),
            None => WallCheck::Skipped,
        }
    }

    fn avoid_walls(
        &mut self,
        character_position: Vec3,
        camera: &mut dyn CameraRig,
        raycaster: &dyn Raycaster,
        default_limits: RadiusLimits,
    ) -> WallCheck {
        let origin = character_position + Vec3::Y * self.raycast_height;
        let camera_position = camera.position();
        raycaster.raycast_to_ref(origin, camera_position, &mut self.result);

        if !self.result.has_hit {
            camera.set_upper_radius_limit(default_limits.upper);
            return WallCheck::Clear;
        }

        let hit = self.result.hit_point_world;
        self.result.reset();
        let toward_camera = (camera_position - hit).normalize_or_zero();
        let hit_distance = hit.distance(camera_position);
        let corrected = hit - toward_camera * (self.distance_from_wall * hit_distance);
        let upper_radius_limit = hit.distance(camera.target());
        camera.set_upper_radius_limit(upper_radius_limit);
        camera.set_position(camera_position.lerp(corrected, self.lerp));
        WallCheck::Hit { point: hit, upper_radius_limit }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::OrbitCamera;
    use std::cell::Cell;

    struct FixedHit(Option<Vec3>, Cell<usize>);

    impl Raycaster for FixedHit {
        fn raycast_to_ref(&self, _from: Vec3, _to: Vec3, result: &mut RaycastResult) {
            self.1.set(self.1.get() + 1);
            result.reset();
            if let Some(point) = self.0 {
                result.set_hit(point);
            }
        }
    }

    fn camera_behind() -> OrbitCamera {
        OrbitCamera::new(Vec3::new(0.0, 1.65, 0.0), 4.0, 0.0, 0.0)
    }

    #[test]
    fn camera_translates_with_character() {
        let config = ControllerConfig::default();
        let mut follow = CameraFollow::new(&config);
        let mut camera = camera_behind();
        follow.reset(Vec3::ZERO);
        let before = camera.position();
        let check = follow.update(Vec3::new(1.0, 0.0, -2.0), &mut camera, None, config.third_person_radius);
        assert_eq!(check, WallCheck::Skipped);
        assert!((camera.position() - (before + Vec3::new(1.0, 0.0, -2.0))).length() < 1e-5);
        assert!((camera.target() - Vec3::new(1.0, 1.65, -2.0)).length() < 1e-5);
    }

    #[test]
    fn clear_ray_restores_mode_default() {
        let config = ControllerConfig::default();
        let mut follow = CameraFollow::new(&config);
        let mut camera = camera_behind();
        camera.set_upper_radius_limit(1.0);
        let raycaster = FixedHit(None, Cell::new(0));
        let check = follow.update(Vec3::ZERO, &mut camera, Some(&raycaster), config.third_person_radius);
        assert_eq!(check, WallCheck::Clear);
        assert_eq!(camera.radius_limits().upper, 5.0);
        assert_eq!(raycaster.1.get(), 1);
    }

    #[test]
    fn hit_pulls_camera_between_character_and_wall() {
        let config = ControllerConfig::default();
        let mut follow = CameraFollow::new(&config);
        let mut camera = camera_behind();
        let start = camera.position();
        // Wall 2 units behind the ray origin on the camera side.
        let origin = Vec3::new(0.0, 1.15, 0.0);
        let hit = origin + (start - origin).normalize() * 2.0;
        let raycaster = FixedHit(Some(hit), Cell::new(0));

        let check = follow.update(Vec3::ZERO, &mut camera, Some(&raycaster), config.third_person_radius);

        let dir = (start - hit).normalize();
        let corrected = hit - dir * (0.8 * start.distance(hit));
        let expected = start.lerp(corrected, 0.8);
        assert!((camera.position() - expected).length() < 1e-4);
        let expected_limit = hit.distance(Vec3::new(0.0, 1.65, 0.0));
        match check {
            WallCheck::Hit { upper_radius_limit, .. } => assert!((upper_radius_limit - expected_limit).abs() < 1e-5),
            other => panic!("expected hit, got {other:?}"),
        }
        assert!((camera.radius_limits().upper - expected_limit).abs() < 1e-5);
    }

    #[test]
    fn camera_just_past_a_wall_moves_a_short_way() {
        let config = ControllerConfig::default();
        let mut follow = CameraFollow::new(&config);
        let mut camera = camera_behind();
        let start = camera.position();
        let origin = Vec3::new(0.0, 1.15, 0.0);
        let hit = origin.lerp(start, 0.95);
        let raycaster = FixedHit(Some(hit), Cell::new(0));

        follow.update(Vec3::ZERO, &mut camera, Some(&raycaster), config.third_person_radius);

        let moved = start.distance(camera.position());
        assert!(moved < 0.5, "camera jumped {moved} for a wall it barely crossed");
        assert!(camera.position().distance(origin) < start.distance(origin));
    }
}
