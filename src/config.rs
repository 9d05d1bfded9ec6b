use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Per-frame-equivalent movement speeds for each locomotion tier.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct SpeedTiers {
    #[serde(default = "SpeedTiers::default_crouch")]
    pub crouch: f32,
    #[serde(default = "SpeedTiers::default_walk")]
    pub walk: f32,
    #[serde(default = "SpeedTiers::default_run")]
    pub run: f32,
}

impl SpeedTiers {
    pub const CROUCH: f32 = 0.015;
    pub const WALK: f32 = 0.03;
    pub const RUN: f32 = 0.08;

    const fn default_crouch() -> f32 {
        Self::CROUCH
    }

    const fn default_walk() -> f32 {
        Self::WALK
    }

    const fn default_run() -> f32 {
        Self::RUN
    }
}

impl Default for SpeedTiers {
    fn default() -> Self {
        Self { crouch: Self::CROUCH, walk: Self::WALK, run: Self::RUN }
    }
}

/// Orbit distance bounds applied to the camera.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct RadiusLimits {
    pub lower: f32,
    pub upper: f32,
}

impl RadiusLimits {
    pub const fn new(lower: f32, upper: f32) -> Self {
        Self { lower, upper }
    }
}

/// Which way the character faces relative to the joystick angle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JoystickConvention {
    /// Offset is `-angle + π/2`.
    #[default]
    FrontFacing,
    /// Offset is `-angle + π/2 + π`, for rigs authored facing away from +Z.
    BackFacing,
}

impl JoystickConvention {
    pub fn label(self) -> &'static str {
        match self {
            JoystickConvention::FrontFacing => "front_facing",
            JoystickConvention::BackFacing => "back_facing",
        }
    }
}

/// Character build variants. Each one carries a small correction to speed and eye height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AvatarBuild {
    #[default]
    Standard,
    Slight,
}

impl AvatarBuild {
    pub fn speed_multiplier(self) -> f32 {
        match self {
            AvatarBuild::Standard => 1.0,
            AvatarBuild::Slight => 0.7,
        }
    }

    pub fn head_height_adjust(self) -> f32 {
        match self {
            AvatarBuild::Standard => 0.0,
            AvatarBuild::Slight => 0.2,
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "standard" => Some(Self::Standard),
            "slight" => Some(Self::Slight),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ControllerConfig {
    #[serde(default)]
    pub speeds: SpeedTiers,
    #[serde(default = "ControllerConfig::default_speed_multiplier")]
    pub speed_multiplier: f32,
    /// Converts per-frame-equivalent speeds into body velocity units.
    #[serde(default = "ControllerConfig::default_velocity_scale")]
    pub velocity_scale: f32,
    #[serde(default = "ControllerConfig::default_head_height")]
    pub head_height: f32,
    #[serde(default)]
    pub head_height_adjust: f32,
    #[serde(default = "ControllerConfig::default_raycast_height")]
    pub raycast_height: f32,
    #[serde(default = "ControllerConfig::default_distance_from_wall")]
    pub distance_from_wall: f32,
    #[serde(default = "ControllerConfig::default_camera_lerp")]
    pub camera_lerp: f32,
    #[serde(default = "ControllerConfig::default_facing_slerp")]
    pub facing_slerp: f32,
    #[serde(default = "ControllerConfig::default_animation_speed")]
    pub animation_speed: f32,
    #[serde(default = "ControllerConfig::default_jump_impulse")]
    pub jump_impulse: f32,
    #[serde(default = "ControllerConfig::default_capsule_height")]
    pub capsule_height: f32,
    #[serde(default)]
    pub joystick_convention: JoystickConvention,
    #[serde(default = "ControllerConfig::default_third_person_radius")]
    pub third_person_radius: RadiusLimits,
    #[serde(default = "ControllerConfig::default_first_person_radius")]
    pub first_person_radius: RadiusLimits,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub build: Option<AvatarBuild>,
    pub joystick_convention: Option<JoystickConvention>,
    pub distance_from_wall: Option<f32>,
}

impl ControllerConfig {
    const fn default_speed_multiplier() -> f32 {
        1.0
    }

    const fn default_velocity_scale() -> f32 {
        100.0
    }

    const fn default_head_height() -> f32 {
        1.65
    }

    const fn default_raycast_height() -> f32 {
        1.15
    }

    const fn default_distance_from_wall() -> f32 {
        0.8
    }

    const fn default_camera_lerp() -> f32 {
        0.8
    }

    const fn default_facing_slerp() -> f32 {
        0.2
    }

    const fn default_animation_speed() -> f32 {
        1.0
    }

    const fn default_jump_impulse() -> f32 {
        1000.0
    }

    const fn default_capsule_height() -> f32 {
        1.75
    }

    const fn default_third_person_radius() -> RadiusLimits {
        RadiusLimits::new(0.5, 5.0)
    }

    const fn default_first_person_radius() -> RadiusLimits {
        RadiusLimits::new(0.0, 0.0)
    }

    /// Applies a build preset on top of the current values.
    pub fn with_build(mut self, build: AvatarBuild) -> Self {
        self.speed_multiplier = build.speed_multiplier();
        self.head_height_adjust = build.head_height_adjust();
        self
    }

    /// Height of the camera look-at point above the character's feet.
    pub fn look_at_height(&self) -> f32 {
        self.head_height - self.head_height_adjust
    }

    pub fn radius_limits(&self, mode: ViewMode) -> RadiusLimits {
        match mode {
            ViewMode::FirstPerson => self.first_person_radius,
            ViewMode::ThirdPerson => self.third_person_radius,
        }
    }

    pub fn from_json_str(s: &str) -> serde_json::Result<Self> {
        serde_json::from_str(s)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes =
            fs::read(path).with_context(|| format!("Failed to read config file {}", path.display()))?;
        let cfg = serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(cfg)
    }

    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(err) => {
                tracing::warn!(error = ?err, "Controller config load failed, falling back to defaults");
                Self::default()
            }
        }
    }

    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(build) = overrides.build {
            self.speed_multiplier = build.speed_multiplier();
            self.head_height_adjust = build.head_height_adjust();
        }
        if let Some(convention) = overrides.joystick_convention {
            self.joystick_convention = convention;
        }
        if let Some(distance) = overrides.distance_from_wall {
            self.distance_from_wall = distance;
        }
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            speeds: SpeedTiers::default(),
            speed_multiplier: Self::default_speed_multiplier(),
            velocity_scale: Self::default_velocity_scale(),
            head_height: Self::default_head_height(),
            head_height_adjust: 0.0,
            raycast_height: Self::default_raycast_height(),
            distance_from_wall: Self::default_distance_from_wall(),
            camera_lerp: Self::default_camera_lerp(),
            facing_slerp: Self::default_facing_slerp(),
            animation_speed: Self::default_animation_speed(),
            jump_impulse: Self::default_jump_impulse(),
            capsule_height: Self::default_capsule_height(),
            joystick_convention: JoystickConvention::default(),
            third_person_radius: Self::default_third_person_radius(),
            first_person_radius: Self::default_first_person_radius(),
        }
    }
}

impl ConfigOverrides {
    pub fn is_empty(&self) -> bool {
        self.build.is_none() && self.joystick_convention.is_none() && self.distance_from_wall.is_none()
    }

    pub fn applied_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.build.is_some() {
            fields.push("build");
        }
        if self.joystick_convention.is_some() {
            fields.push("joystick_convention");
        }
        if self.distance_from_wall.is_some() {
            fields.push("distance_from_wall");
        }
        fields
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    #[default]
    FirstPerson,
    ThirdPerson,
}

impl ViewMode {
    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "first" | "first_person" | "firstperson" => Some(Self::FirstPerson),
            "third" | "third_person" | "thirdperson" => Some(Self::ThirdPerson),
            _ => None,
        }
    }
}

/// Scene-wide settings the controller reads. Changed only through explicit setters on the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SceneSettings {
    pub view_mode: ViewMode,
}

impl SceneSettings {
    pub fn third_person() -> Self {
        Self { view_mode: ViewMode::ThirdPerson }
    }

    pub fn is_third_person(&self) -> bool {
        self.view_mode == ViewMode::ThirdPerson
    }
}
