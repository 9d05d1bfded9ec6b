//! The avatar controller: one before-render callback that runs input, facing, velocity,
//! camera follow and animation selection in that order.

use crate::animation::{select_animation, AnimationState, ClipLibrary};
use crate::camera::CameraRig;
use crate::camera_follow::{CameraFollow, WallCheck};
use crate::config::{ControllerConfig, SceneSettings, ViewMode};
use crate::frame::{FrameInfo, ObserverId, SceneLifecycle};
use crate::input::{Input, InputEvent};
use crate::joystick::{latest_channel, JoystickProvider, JoystickSample, LatestReader};
use crate::motion::{ModeFlags, MotionIntent, MotionUnifier, Steering};
use crate::orientation::OrientationSolver;
use crate::physics::{PhysicsBody, Raycaster};
use crate::pose::{sync_root_to_body, CharacterRoot};
use crate::velocity::VelocityDriver;
use glam::Vec3;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dependency {
    CharacterRoot,
    PhysicsBody,
    Camera,
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Dependency::CharacterRoot => "character root",
            Dependency::PhysicsBody => "physics body",
            Dependency::Camera => "camera",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ControllerError {
    #[error("avatar controller is missing its {0}")]
    MissingDependency(Dependency),
}

/// Collaborators handed to the controller. Any of the first three may be absent; the
/// controller then stays inert until they are supplied.
#[derive(Default)]
pub struct ControllerParts {
    pub root: Option<Box<dyn CharacterRoot>>,
    pub body: Option<Box<dyn PhysicsBody>>,
    pub camera: Option<Box<dyn CameraRig>>,
    pub clips: ClipLibrary,
    /// `None` while the physics engine is not enabled; wall avoidance is skipped.
    pub raycaster: Option<Box<dyn Raycaster>>,
    pub input: Input,
}

impl ControllerParts {
    pub fn new(root: Box<dyn CharacterRoot>, body: Box<dyn PhysicsBody>, camera: Box<dyn CameraRig>) -> Self {
        Self { root: Some(root), body: Some(body), camera: Some(camera), ..Self::default() }
    }

    pub fn with_clips(mut self, clips: ClipLibrary) -> Self {
        self.clips = clips;
        self
    }

    pub fn with_raycaster(mut self, raycaster: Box<dyn Raycaster>) -> Self {
        self.raycaster = Some(raycaster);
        self
    }

    pub fn with_input(mut self, input: Input) -> Self {
        self.input = input;
        self
    }
}

/// What the last active frame did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    pub frame: u64,
    pub intent: MotionIntent,
    pub velocity: Vec3,
    pub jumped: bool,
    pub wall: WallCheck,
    pub animation: AnimationState,
    /// False when the selected clip was never registered.
    pub animation_played: bool,
}

struct ControllerState {
    config: ControllerConfig,
    settings: SceneSettings,
    root: Option<Box<dyn CharacterRoot>>,
    body: Option<Box<dyn PhysicsBody>>,
    camera: Option<Box<dyn CameraRig>>,
    raycaster: Option<Box<dyn Raycaster>>,
    clips: ClipLibrary,
    input: Input,
    joystick: Option<LatestReader<JoystickSample>>,
    unifier: MotionUnifier,
    orientation: OrientationSolver,
    driver: VelocityDriver,
    follow: CameraFollow,
    last_frame: Option<FrameReport>,
}

impl ControllerState {
    fn missing(&self) -> Vec<Dependency> {
        let mut missing = Vec::new();
        if self.root.is_none() {
            missing.push(Dependency::CharacterRoot);
        }
        if self.body.is_none() {
            missing.push(Dependency::PhysicsBody);
        }
        if self.camera.is_none() {
            missing.push(Dependency::Camera);
        }
        missing
    }

    /// Places the root on the body and restarts camera delta tracking from there.
    fn prime(&mut self) {
        let (Some(root), Some(body)) = (self.root.as_mut(), self.body.as_ref()) else {
            return;
        };
        sync_root_to_body(&mut **root, &**body, self.config.capsule_height);
        self.follow.reset(root.position());
    }

    fn apply_view_mode(&mut self) {
        let limits = self.config.radius_limits(self.settings.view_mode);
        if let Some(camera) = self.camera.as_mut() {
            camera.set_lower_radius_limit(limits.lower);
            camera.set_upper_radius_limit(limits.upper);
        }
    }

    fn frame(&mut self, info: &FrameInfo) {
        let Self {
            config,
            settings,
            root,
            body,
            camera,
            raycaster,
            clips,
            input,
            joystick,
            unifier,
            orientation,
            driver,
            follow,
            last_frame,
        } = self;
        let (Some(root), Some(body), Some(camera)) = (root.as_mut(), body.as_mut(), camera.as_mut()) else {
            return;
        };

        sync_root_to_body(&mut **root, &**body, config.capsule_height);

        let sample = joystick.as_ref().and_then(|reader| reader.latest());
        let intent = unifier.update(input, sample);

        if let Some(target) = orientation.target(&intent, camera.position(), root.position()) {
            let facing = root.rotation().slerp(target, orientation.blend);
            root.set_rotation(facing);
        }

        let velocity = driver.drive(&mut **body, &intent, camera.absolute_rotation());
        let jumped = input.take_jump_pressed();
        if jumped {
            driver.jump(&mut **body);
        }

        let limits = config.radius_limits(settings.view_mode);
        let wall = follow.update(root.position(), &mut **camera, raycaster.as_deref(), limits);

        let animation = select_animation(intent.is_moving, intent.is_crouching, intent.is_running, intent.is_dancing);
        let animation_played = clips.play_exclusive(animation, config.animation_speed);

        tracing::trace!(
            frame = info.index,
            moving = intent.is_moving,
            clip = animation.clip_name(),
            ?wall,
            "avatar frame"
        );
        *last_frame = Some(FrameReport { frame: info.index, intent, velocity, jumped, wall, animation, animation_played });
    }
}

/// Third-person avatar controller bound to a scene's before-render hook.
pub struct AvatarController {
    state: Rc<RefCell<ControllerState>>,
    observer: Option<ObserverId>,
}

impl AvatarController {
    /// Builds the controller and starts it when every dependency is present. Missing
    /// dependencies are logged and leave the controller inert.
    pub fn new(
        parts: ControllerParts,
        config: ControllerConfig,
        settings: SceneSettings,
        lifecycle: &mut dyn SceneLifecycle,
        joystick: Option<&mut dyn JoystickProvider>,
    ) -> Self {
        let joystick = joystick.map(|provider| {
            let (writer, reader) = latest_channel();
            provider.subscribe(writer);
            reader
        });
        let state = ControllerState {
            unifier: MotionUnifier::new(config.speeds),
            orientation: OrientationSolver::new(config.facing_slerp, config.joystick_convention),
            driver: VelocityDriver::from_config(&config),
            follow: CameraFollow::new(&config),
            config,
            settings,
            root: parts.root,
            body: parts.body,
            camera: parts.camera,
            raycaster: parts.raycaster,
            clips: parts.clips,
            input: parts.input,
            joystick,
            last_frame: None,
        };
        let mut controller = Self { state: Rc::new(RefCell::new(state)), observer: None };

        let missing = controller.missing_dependencies();
        if missing.is_empty() {
            controller.state.borrow_mut().apply_view_mode();
            if let Err(err) = controller.start(lifecycle) {
                tracing::error!(error = %err, "avatar controller failed to start");
            }
        } else {
            for dependency in missing {
                tracing::error!(%dependency, "avatar controller dependency missing; controller stays inactive");
            }
        }
        controller
    }

    pub fn missing_dependencies(&self) -> Vec<Dependency> {
        self.state.borrow().missing()
    }

    pub fn is_active(&self) -> bool {
        self.observer.is_some()
    }

    /// Registers the per-frame callback. Calling it while already active does nothing.
    pub fn start(&mut self, lifecycle: &mut dyn SceneLifecycle) -> Result<(), ControllerError> {
        if self.observer.is_some() {
            return Ok(());
        }
        if let Some(dependency) = self.missing_dependencies().into_iter().next() {
            return Err(ControllerError::MissingDependency(dependency));
        }
        {
            let mut state = self.state.borrow_mut();
            state.prime();
            state.input.take_jump_pressed();
        }
        let state = Rc::clone(&self.state);
        let id = lifecycle.add_before_render(Box::new(move |info| state.borrow_mut().frame(info)));
        self.observer = Some(id);
        tracing::debug!(observer = id.raw(), "avatar controller started");
        Ok(())
    }

    /// Unregisters the per-frame callback. Returns false when the controller was not active.
    pub fn stop(&mut self, lifecycle: &mut dyn SceneLifecycle) -> bool {
        let Some(id) = self.observer.take() else {
            return false;
        };
        lifecycle.remove_before_render(id);
        tracing::debug!(observer = id.raw(), "avatar controller stopped");
        true
    }

    /// Stops the controller and releases every collaborator. A disposed controller can be
    /// revived only by supplying new dependencies.
    pub fn dispose(&mut self, lifecycle: &mut dyn SceneLifecycle) {
        self.stop(lifecycle);
        let mut state = self.state.borrow_mut();
        state.root = None;
        state.body = None;
        state.camera = None;
        state.raycaster = None;
        state.clips = ClipLibrary::new();
        state.joystick = None;
        state.last_frame = None;
        tracing::debug!("avatar controller disposed");
    }

    /// Feeds a key event. Held keys are always tracked; jump presses are dropped while inactive.
    pub fn push_input(&self, event: InputEvent) {
        let mut state = self.state.borrow_mut();
        state.input.push(event);
        if !self.is_active() {
            state.input.take_jump_pressed();
        }
    }

    /// Swapping the root while running re-seeds the camera follow from the new pose.
    pub fn set_character_root(&self, root: Box<dyn CharacterRoot>) {
        let mut state = self.state.borrow_mut();
        state.root = Some(root);
        if self.is_active() {
            state.prime();
        }
    }

    pub fn set_physics_body(&self, body: Box<dyn PhysicsBody>) {
        let mut state = self.state.borrow_mut();
        state.body = Some(body);
        if self.is_active() {
            state.prime();
        }
    }

    pub fn set_camera(&self, camera: Box<dyn CameraRig>) {
        let mut state = self.state.borrow_mut();
        state.camera = Some(camera);
        state.apply_view_mode();
    }

    /// Enables wall avoidance once the physics engine is up.
    pub fn set_raycaster(&self, raycaster: Option<Box<dyn Raycaster>>) {
        self.state.borrow_mut().raycaster = raycaster;
    }

    pub fn view_mode(&self) -> ViewMode {
        self.state.borrow().settings.view_mode
    }

    /// Switches view mode and applies that mode's camera radius limits.
    pub fn set_view_mode(&self, mode: ViewMode) {
        let mut state = self.state.borrow_mut();
        state.settings.view_mode = mode;
        state.apply_view_mode();
        tracing::debug!(?mode, "avatar view mode changed");
    }

    pub fn settings(&self) -> SceneSettings {
        self.state.borrow().settings
    }

    pub fn config(&self) -> ControllerConfig {
        self.state.borrow().config.clone()
    }

    pub fn modes(&self) -> ModeFlags {
        self.state.borrow().unifier.modes()
    }

    pub fn last_frame(&self) -> Option<FrameReport> {
        self.state.borrow().last_frame
    }

    /// Steering source of the last frame, if any.
    pub fn last_steering(&self) -> Steering {
        self.last_frame().map(|report| report.intent.steering).unwrap_or(Steering::None)
    }

    /// Names of the clips currently playing.
    pub fn playing_clips(&self) -> Vec<String> {
        self.state.borrow().clips.playing().into_iter().map(str::to_owned).collect()
    }
}
