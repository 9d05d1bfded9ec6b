//! Turns the planar intent into body velocity. The only code that sets the body's velocity.

use crate::config::ControllerConfig;
use crate::motion::MotionIntent;
use crate::physics::PhysicsBody;
use glam::{Quat, Vec3};

#[derive(Debug, Clone, Copy)]
pub struct VelocityDriver {
    pub velocity_scale: f32,
    pub speed_multiplier: f32,
    pub jump_impulse: f32,
}

impl VelocityDriver {
    pub fn from_config(config: &ControllerConfig) -> Self {
        Self {
            velocity_scale: config.velocity_scale,
            speed_multiplier: config.speed_multiplier,
            jump_impulse: config.jump_impulse,
        }
    }

    /// World-space velocity for the intent, before the vertical component is replaced.
    pub fn world_velocity(&self, intent: &MotionIntent, camera_rotation: Quat) -> Vec3 {
        if !intent.is_moving {
            return Vec3::ZERO;
        }
        // The build multiplier only scales walk and run.
        let multiplier = if intent.is_crouching { 1.0 } else { self.speed_multiplier };
        let local = intent.planar_direction * (intent.speed * multiplier * self.velocity_scale);
        camera_rotation * local
    }

    /// Writes this frame's velocity, keeping whatever vertical velocity the body already has.
    /// Idle frames hard-stop horizontal motion.
    pub fn drive(&self, body: &mut dyn PhysicsBody, intent: &MotionIntent, camera_rotation: Quat) -> Vec3 {
        let vertical = body.linear_velocity().y;
        let mut velocity = self.world_velocity(intent, camera_rotation);
        velocity.y = vertical;
        body.set_linear_velocity(velocity);
        velocity
    }

    pub fn jump(&self, body: &mut dyn PhysicsBody) {
        let at = body.position();
        body.apply_impulse(Vec3::Y * self.jump_impulse, at);
    }
}
