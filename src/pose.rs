use crate::physics::PhysicsBody;
use glam::{Quat, Vec3};
use std::cell::RefCell;
use std::rc::Rc;

/// Posable root transform of the visible character.
pub trait CharacterRoot {
    fn position(&self) -> Vec3;
    fn set_position(&mut self, position: Vec3);
    fn rotation(&self) -> Quat;
    fn set_rotation(&mut self, rotation: Quat);
}

impl<T: CharacterRoot + ?Sized> CharacterRoot for Rc<RefCell<T>> {
    fn position(&self) -> Vec3 {
        self.borrow().position()
    }
    fn set_position(&mut self, position: Vec3) {
        self.borrow_mut().set_position(position);
    }
    fn rotation(&self) -> Quat {
        self.borrow().rotation()
    }
    fn set_rotation(&mut self, rotation: Quat) {
        self.borrow_mut().set_rotation(rotation);
    }
}

/// Plain root transform, enough for hosts that copy it into their own scene graph.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CharacterPose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl CharacterPose {
    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }
}

impl Default for CharacterPose {
    fn default() -> Self {
        Self { position: Vec3::ZERO, rotation: Quat::IDENTITY }
    }
}

impl CharacterRoot for CharacterPose {
    fn position(&self) -> Vec3 {
        self.position
    }
    fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }
    fn rotation(&self) -> Quat {
        self.rotation
    }
    fn set_rotation(&mut self, rotation: Quat) {
        self.rotation = rotation;
    }
}

/// Moves the root to the body's feet: the body reports its capsule centre.
pub fn sync_root_to_body(root: &mut dyn CharacterRoot, body: &dyn PhysicsBody, capsule_height: f32) {
    let feet = body.position() - Vec3::Y * (capsule_height * 0.5);
    root.set_position(feet);
}
