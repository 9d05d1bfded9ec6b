use avatar_controller::config::{AvatarBuild, ConfigOverrides, ControllerConfig, JoystickConvention, ViewMode};
use avatar_controller::input::{DirectionKeys, Input, InputEvent};
use std::io::Write;
use tempfile::NamedTempFile;
use winit::keyboard::{Key, NamedKey};

#[test]
fn remapped_directions_override_defaults() {
    let mut temp = NamedTempFile::new().expect("temp input config");
    write!(temp, r#"{{"bindings":{{"forward":["i","up"],"dance_toggle":["k"],"jump":["bogus_key"]}}}}"#)
        .expect("write remap config");

    let mut input = Input::from_config(temp.path());

    input.push(InputEvent::key_down(Key::Character("w".into())));
    assert!(input.direction_keys().is_empty(), "w is no longer bound to forward");

    input.push(InputEvent::key_down(Key::Character("i".into())));
    assert_eq!(input.direction_keys(), DirectionKeys::FORWARD);

    input.push(InputEvent::key_down(Key::Character("k".into())));
    assert!(input.take_dance_toggle(), "custom key toggles dance");

    input.push(InputEvent::key_down(Key::Named(NamedKey::Space)));
    assert!(input.take_jump_pressed(), "jump keeps its default when no remapped key is valid");
}

#[test]
fn unreadable_bindings_fall_back_to_defaults() {
    let mut temp = NamedTempFile::new().expect("temp input config");
    write!(temp, "not json").expect("write garbage");
    let mut input = Input::from_config(temp.path());
    input.push(InputEvent::key_down(Key::Named(NamedKey::ArrowLeft)));
    assert_eq!(input.direction_keys(), DirectionKeys::LEFT);
}

#[test]
fn controller_config_loads_partial_file() {
    let mut temp = NamedTempFile::new().expect("temp controller config");
    write!(
        temp,
        r#"{{"speeds":{{"run":0.1}},"distance_from_wall":0.6,"joystick_convention":"back_facing",
            "third_person_radius":{{"lower":1.0,"upper":3.0}}}}"#
    )
    .expect("write controller config");

    let config = ControllerConfig::load(temp.path()).expect("load controller config");
    assert_eq!(config.speeds.run, 0.1);
    assert_eq!(config.speeds.walk, 0.03, "missing tiers keep their defaults");
    assert_eq!(config.distance_from_wall, 0.6);
    assert_eq!(config.joystick_convention, JoystickConvention::BackFacing);
    assert_eq!(config.radius_limits(ViewMode::ThirdPerson).upper, 3.0);
    assert_eq!(config.radius_limits(ViewMode::FirstPerson).upper, 0.0);
    assert_eq!(config.jump_impulse, 1000.0);
}

#[test]
fn broken_controller_config_reports_path_or_defaults() {
    let mut temp = NamedTempFile::new().expect("temp controller config");
    write!(temp, "{{ \"speeds\": ").expect("write truncated config");

    let err = ControllerConfig::load(temp.path()).unwrap_err();
    assert!(err.to_string().contains("Failed to parse config file"), "got {err}");

    let fallback = ControllerConfig::load_or_default(temp.path());
    assert_eq!(fallback.speeds.walk, 0.03);
    assert_eq!(fallback.camera_lerp, 0.8);
}

#[test]
fn slight_build_override_adjusts_speed_and_head() {
    let mut config = ControllerConfig::default();
    let overrides = ConfigOverrides { build: Some(AvatarBuild::Slight), ..ConfigOverrides::default() };
    config.apply_overrides(&overrides);
    assert_eq!(config.speed_multiplier, 0.7);
    assert!((config.look_at_height() - 1.45).abs() < 1e-6);
    assert_eq!(overrides.applied_fields(), vec!["build"]);
}
