pub mod animation;
pub mod camera;
pub mod camera_follow;
pub mod cli;
pub mod config;
pub mod controller;
pub mod frame;
pub mod input;
pub mod joystick;
pub mod motion;
pub mod orientation;
pub mod physics;
pub mod pose;
pub mod velocity;

pub use animation::{select_animation, AnimationClip, AnimationState, ClipLibrary, ClipPlayer};
pub use camera::{CameraRig, OrbitCamera};
pub use config::{ControllerConfig, SceneSettings, ViewMode};
pub use controller::{AvatarController, ControllerError, ControllerParts, Dependency, FrameReport};
pub use frame::{FrameLoop, SceneLifecycle};
pub use input::{Input, InputEvent};
pub use joystick::{JoystickProvider, JoystickSample, VirtualJoystick};
pub use physics::{PhysicsBody, RaycastResult, Raycaster};
pub use pose::{CharacterPose, CharacterRoot};
