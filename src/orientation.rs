//! Character facing: camera-relative yaw plus a per-direction offset, blended per frame.

use crate::config::JoystickConvention;
use crate::input::DirectionKeys;
use crate::motion::{MotionIntent, Steering};
use glam::{Quat, Vec3};
use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI};

/// Yaw that points from the character toward the camera.
pub fn camera_yaw(camera_position: Vec3, character_position: Vec3) -> f32 {
    (camera_position.x - character_position.x).atan2(camera_position.z - character_position.z)
}

/// Eight-way facing offset for the held direction keys. Opposing keys cancel before lookup.
pub fn direction_offset(keys: DirectionKeys) -> f32 {
    match (keys.forward_axis(), keys.side_axis()) {
        (1, 0) => PI,
        (1, -1) => -(FRAC_PI_4 + FRAC_PI_2),
        (1, 1) => FRAC_PI_4 + FRAC_PI_2,
        (-1, -1) => -FRAC_PI_4,
        (-1, 1) => FRAC_PI_4,
        (0, -1) => -FRAC_PI_2,
        (0, 1) => FRAC_PI_2,
        _ => 0.0,
    }
}

pub fn joystick_offset(angle_radians: f32, convention: JoystickConvention) -> f32 {
    let offset = -angle_radians + FRAC_PI_2;
    match convention {
        JoystickConvention::FrontFacing => offset,
        JoystickConvention::BackFacing => offset + PI,
    }
}

#[derive(Debug, Clone, Copy)]
pub struct OrientationSolver {
    pub blend: f32,
    pub convention: JoystickConvention,
}

impl OrientationSolver {
    pub fn new(blend: f32, convention: JoystickConvention) -> Self {
        Self { blend, convention }
    }

    /// Target facing for this frame, or `None` when nothing steers.
    pub fn target(&self, intent: &MotionIntent, camera_position: Vec3, character_position: Vec3) -> Option<Quat> {
        let offset = match intent.steering {
            Steering::None => return None,
            Steering::Keys(keys) => direction_offset(keys),
            Steering::Joystick { angle_radians } => joystick_offset(angle_radians, self.convention),
        };
        let yaw = camera_yaw(camera_position, character_position) + offset;
        Some(Quat::from_axis_angle(Vec3::Y, yaw))
    }

    /// Blends `current` one fixed step toward the target. The step is per call, not per second.
    pub fn solve(
        &self,
        current: Quat,
        intent: &MotionIntent,
        camera_position: Vec3,
        character_position: Vec3,
    ) -> Quat {
        match self.target(intent, camera_position, character_position) {
            Some(target) => current.slerp(target, self.blend),
            None => current,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    #[test]
    fn offsets_follow_the_eight_way_table() {
        let f = DirectionKeys::FORWARD;
        let b = DirectionKeys::BACKWARD;
        let l = DirectionKeys::LEFT;
        let r = DirectionKeys::RIGHT;
        let cases = [
            (f, PI),
            (f | r, -(FRAC_PI_4 + FRAC_PI_2)),
            (f | l, FRAC_PI_4 + FRAC_PI_2),
            (b, 0.0),
            (b | r, -FRAC_PI_4),
            (b | l, FRAC_PI_4),
            (r, -FRAC_PI_2),
            (l, FRAC_PI_2),
            (DirectionKeys::empty(), 0.0),
        ];
        for (keys, expected) in cases {
            assert!((direction_offset(keys) - expected).abs() < EPS, "{keys:?}");
        }
    }

    #[test]
    fn opposing_side_keys_cancel_before_lookup() {
        let keys = DirectionKeys::FORWARD | DirectionKeys::LEFT | DirectionKeys::RIGHT;
        assert_eq!(direction_offset(keys), PI);
    }

    #[test]
    fn camera_yaw_points_at_camera() {
        let yaw = camera_yaw(Vec3::new(0.0, 2.0, 5.0), Vec3::ZERO);
        assert!(yaw.abs() < EPS);
        let yaw = camera_yaw(Vec3::new(3.0, 0.0, 0.0), Vec3::ZERO);
        assert!((yaw - FRAC_PI_2).abs() < EPS);
    }

    #[test]
    fn joystick_conventions_differ_by_half_turn() {
        let front = joystick_offset(0.3, JoystickConvention::FrontFacing);
        let back = joystick_offset(0.3, JoystickConvention::BackFacing);
        assert!((front - (FRAC_PI_2 - 0.3)).abs() < EPS);
        assert!((back - front - PI).abs() < EPS);
    }

    #[test]
    fn solve_blends_a_fifth_of_the_way() {
        let solver = OrientationSolver::new(0.2, JoystickConvention::FrontFacing);
        let intent = MotionIntent {
            planar_direction: Vec3::NEG_X,
            is_moving: true,
            steering: Steering::Keys(DirectionKeys::LEFT),
            ..MotionIntent::idle()
        };
        // Camera straight behind on +Z gives yaw 0, so the target yaw is +π/2.
        let next = solver.solve(Quat::IDENTITY, &intent, Vec3::new(0.0, 1.0, 4.0), Vec3::ZERO);
        let (axis, angle) = next.to_axis_angle();
        assert!((axis - Vec3::Y).length() < 1e-4);
        assert!((angle - FRAC_PI_2 * 0.2).abs() < 1e-4);
    }

    #[test]
    fn idle_keeps_current_facing() {
        let solver = OrientationSolver::new(0.2, JoystickConvention::FrontFacing);
        let current = Quat::from_rotation_y(1.0);
        let next = solver.solve(current, &MotionIntent::idle(), Vec3::new(0.0, 1.0, 4.0), Vec3::ZERO);
        assert_eq!(next, current);
    }
}
