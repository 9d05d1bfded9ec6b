//! Headless run of the avatar controller in a walled rapier room.
//! Scripts a short input sequence and logs where the character and camera end up.

use anyhow::Result;
use avatar_controller::animation::{AnimationState, ClipLibrary, ClipPlayer};
use avatar_controller::camera::{CameraRig, OrbitCamera};
use avatar_controller::cli::SimArgs;
use avatar_controller::config::{ControllerConfig, SceneSettings};
use avatar_controller::controller::{AvatarController, ControllerParts};
use avatar_controller::frame::FrameLoop;
use avatar_controller::input::{Input, InputEvent};
use avatar_controller::joystick::{JoystickSample, VirtualJoystick};
use avatar_controller::physics::rapier::{CapsuleParams, PhysicsParams, RapierBody, RapierRaycaster, RapierWorld};
use avatar_controller::pose::{CharacterPose, CharacterRoot};
use glam::Vec3;
use std::cell::RefCell;
use std::f32::consts::FRAC_PI_2;
use std::rc::Rc;
use tracing::info;
use winit::keyboard::{Key, NamedKey};

const FIXED_DT: f32 = 1.0 / 60.0;
const CLIP_FPS: f32 = 30.0;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = match SimArgs::parse_from_env() {
        Ok(args) => args,
        Err(err) => {
            eprintln!("[cli] {err}");
            std::process::exit(2);
        }
    };
    let mut config = match args.config_path() {
        Some(path) => ControllerConfig::load_or_default(path),
        None => ControllerConfig::default(),
    };
    let overrides = args.config_overrides();
    if !overrides.is_empty() {
        info!(fields = ?overrides.applied_fields(), "Applying CLI overrides");
        config.apply_overrides(&overrides);
    }

    let mut world = RapierWorld::new(&PhysicsParams::default());
    world.insert_static_box(Vec3::new(0.0, -0.5, 0.0), Vec3::new(8.0, 0.5, 8.0));
    world.insert_static_box(Vec3::new(0.0, 1.5, -3.0), Vec3::new(8.0, 1.5, 0.5));
    world.insert_static_box(Vec3::new(0.0, 1.5, 8.0), Vec3::new(8.0, 1.5, 0.5));
    world.insert_static_box(Vec3::new(-8.0, 1.5, 2.5), Vec3::new(0.5, 1.5, 6.0));
    world.insert_static_box(Vec3::new(8.0, 1.5, 2.5), Vec3::new(0.5, 1.5, 6.0));
    let capsule = CapsuleParams { height: config.capsule_height, ..CapsuleParams::default() };
    let handle = world.spawn_character(Vec3::ZERO, &capsule);
    let world = world.into_shared();

    let root = Rc::new(RefCell::new(CharacterPose::default()));
    let camera = Rc::new(RefCell::new(OrbitCamera::new(Vec3::Y * config.look_at_height(), 4.0, 0.0, 0.2)));
    let mut clips = ClipLibrary::new();
    let mut players = Vec::new();
    for state in AnimationState::ALL {
        let player = Rc::new(RefCell::new(ClipPlayer::new(0.0, 48.0)));
        clips.insert(state.clip_name(), Box::new(Rc::clone(&player)));
        players.push(player);
    }

    let parts = ControllerParts::new(
        Box::new(Rc::clone(&root)),
        Box::new(RapierBody::new(Rc::clone(&world), handle)),
        Box::new(Rc::clone(&camera)),
    )
    .with_clips(clips)
    .with_raycaster(Box::new(RapierRaycaster::new(Rc::clone(&world), Some(handle))))
    .with_input(Input::new());

    let settings = SceneSettings { view_mode: args.view() };
    let mut frames = FrameLoop::new();
    let mut joystick = VirtualJoystick::new();
    let controller = AvatarController::new(parts, config, settings, &mut frames, Some(&mut joystick));
    if !controller.is_active() {
        anyhow::bail!("controller did not start; missing {:?}", controller.missing_dependencies());
    }

    let total = args.frames();
    for frame in 0..total {
        script_input(frame, total, &controller, &joystick);
        frames.run_frame_with_delta(FIXED_DT);
        world.borrow_mut().step(FIXED_DT);
        for player in &players {
            player.borrow_mut().advance(FIXED_DT * CLIP_FPS);
        }
        if frame % 30 == 0 || frame + 1 == total {
            let camera = camera.borrow();
            let report = controller.last_frame();
            info!(
                frame,
                elapsed = frames.elapsed_seconds(),
                character = ?root.borrow().position(),
                camera = ?camera.position(),
                upper_radius = camera.radius_limits().upper,
                clip = report.map(|r| r.animation.clip_name()).unwrap_or("-"),
                "sim frame"
            );
        }
    }

    info!(
        character = ?root.borrow().position(),
        playing = ?controller.playing_clips(),
        elapsed = frames.elapsed_seconds(),
        "simulation finished"
    );
    Ok(())
}

/// The script is split into eight equal phases; returns the phase when `frame` opens one.
fn phase_start(frame: u32, total: u32) -> Option<u64> {
    let (scaled, total) = (u64::from(frame) * 8, u64::from(total.max(1)));
    (scaled % total < 8).then_some(scaled / total)
}

/// Walk toward the back wall, run diagonally, crouch, dance, jump, then steer with the joystick.
fn script_input(frame: u32, total: u32, controller: &AvatarController, joystick: &VirtualJoystick) {
    let Some(phase) = phase_start(frame, total) else {
        return;
    };
    let w = || Key::Character("w".into());
    let d = || Key::Character("d".into());
    match phase {
        0 => controller.push_input(InputEvent::key_down(w())),
        1 => {
            controller.push_input(InputEvent::key_down(Key::Named(NamedKey::Control)));
            controller.push_input(InputEvent::key_up(Key::Named(NamedKey::Control)));
            controller.push_input(InputEvent::key_down(d()));
        }
        2 => controller.push_input(InputEvent::key_down(Key::Named(NamedKey::Shift))),
        3 => {
            controller.push_input(InputEvent::key_up(Key::Named(NamedKey::Shift)));
            controller.push_input(InputEvent::key_up(w()));
            controller.push_input(InputEvent::key_up(d()));
        }
        4 => {
            controller.push_input(InputEvent::key_down(Key::Character("g".into())));
            controller.push_input(InputEvent::key_up(Key::Character("g".into())));
        }
        5 => {
            controller.push_input(InputEvent::key_down(Key::Named(NamedKey::Space)));
            controller.push_input(InputEvent::key_up(Key::Named(NamedKey::Space)));
        }
        6 => {
            joystick.emit(JoystickSample::start());
            joystick.emit(JoystickSample::moved(FRAC_PI_2));
        }
        _ => joystick.emit(JoystickSample::end()),
    }
}
