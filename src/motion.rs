//! Merges keyboard state and the latest joystick sample into one movement intent per frame.

use crate::config::SpeedTiers;
use crate::input::{DirectionKeys, Input};
use crate::joystick::JoystickSample;
use glam::Vec3;

/// What steered this frame's movement. Drives the facing offset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Steering {
    None,
    Keys(DirectionKeys),
    Joystick { angle_radians: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionIntent {
    /// Camera-local ground-plane direction (+X right, +Z forward), unit length or zero.
    pub planar_direction: Vec3,
    pub speed: f32,
    pub is_moving: bool,
    pub is_running: bool,
    pub is_crouching: bool,
    pub is_dancing: bool,
    pub steering: Steering,
}

impl MotionIntent {
    pub fn idle() -> Self {
        Self {
            planar_direction: Vec3::ZERO,
            speed: 0.0,
            is_moving: false,
            is_running: false,
            is_crouching: false,
            is_dancing: false,
            steering: Steering::None,
        }
    }
}

/// Sticky locomotion modes carried across frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModeFlags {
    pub running: bool,
    pub crouching: bool,
    pub dancing: bool,
}

#[derive(Debug, Clone)]
pub struct MotionUnifier {
    speeds: SpeedTiers,
    modes: ModeFlags,
}

impl MotionUnifier {
    pub fn new(speeds: SpeedTiers) -> Self {
        Self { speeds, modes: ModeFlags::default() }
    }

    pub fn modes(&self) -> ModeFlags {
        self.modes
    }

    pub fn set_speeds(&mut self, speeds: SpeedTiers) {
        self.speeds = speeds;
    }

    /// Consumes pending toggles from `input` and produces this frame's intent.
    pub fn update(&mut self, input: &mut Input, joystick: Option<JoystickSample>) -> MotionIntent {
        if input.take_run_toggle() {
            self.modes.running = !self.modes.running;
        }
        if input.take_dance_toggle() {
            self.modes.dancing = !self.modes.dancing;
        }
        self.modes.crouching = input.crouch_held();

        let (planar_direction, steering) = match joystick.and_then(|sample| {
            sample.steering_angle().map(|angle| (sample, angle))
        }) {
            Some((sample, angle)) => (
                Vec3::new(sample.vector.x, 0.0, sample.vector.y).normalize_or_zero(),
                Steering::Joystick { angle_radians: angle },
            ),
            None => {
                let keys = input.direction_keys();
                (keyboard_direction(keys), Steering::Keys(keys))
            }
        };

        let is_moving = planar_direction != Vec3::ZERO;
        if is_moving || self.modes.crouching {
            self.modes.dancing = false;
        }

        MotionIntent {
            planar_direction,
            speed: self.speed_tier(),
            is_moving,
            is_running: self.modes.running,
            is_crouching: self.modes.crouching,
            is_dancing: self.modes.dancing,
            steering: if is_moving { steering } else { Steering::None },
        }
    }

    fn speed_tier(&self) -> f32 {
        if self.modes.crouching {
            self.speeds.crouch
        } else if self.modes.running {
            self.speeds.run
        } else {
            self.speeds.walk
        }
    }
}

/// Normalized camera-local direction for the held keys. Opposing keys cancel.
pub fn keyboard_direction(keys: DirectionKeys) -> Vec3 {
    let front = keys.forward_axis() as f32;
    let side = keys.side_axis() as f32;
    Vec3::new(-side, 0.0, front).normalize_or_zero()
}
