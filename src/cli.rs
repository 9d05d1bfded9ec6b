use crate::config::{AvatarBuild, ConfigOverrides, JoystickConvention, ViewMode};
use anyhow::{anyhow, bail, Context, Result};
use std::env;
use std::path::PathBuf;

pub const DEFAULT_FRAMES: u32 = 240;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SimArgs {
    frames: Option<u32>,
    config: Option<PathBuf>,
    view: Option<ViewMode>,
    build: Option<AvatarBuild>,
    joystick: Option<JoystickConvention>,
    wall_distance: Option<f32>,
}

impl SimArgs {
    pub fn parse_from_env() -> Result<Self> {
        Self::parse(env::args())
    }

    pub fn parse<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut parsed = SimArgs::default();
        let mut iter = args.into_iter();
        let _ = iter.next(); // skip program name if present
        while let Some(raw_flag) = iter.next() {
            let flag = raw_flag.as_ref();
            let Some(key) = flag.strip_prefix("--") else {
                bail!("Unexpected argument '{flag}'. Flags take the form --name value.");
            };
            let value =
                iter.next().ok_or_else(|| anyhow!("Expected a value after '{flag}'"))?.as_ref().to_string();
            match key {
                "frames" => {
                    parsed.frames =
                        Some(value.parse::<u32>().with_context(|| format!("Invalid frame count '{value}'"))?);
                }
                "config" => parsed.config = Some(PathBuf::from(value)),
                "view" => {
                    parsed.view = Some(
                        ViewMode::from_str(&value)
                            .ok_or_else(|| anyhow!("Invalid view '{value}'. Use first or third."))?,
                    );
                }
                "build" => {
                    parsed.build = Some(
                        AvatarBuild::from_str(&value)
                            .ok_or_else(|| anyhow!("Invalid build '{value}'. Use standard or slight."))?,
                    );
                }
                "joystick" => parsed.joystick = Some(parse_convention(&value)?),
                "wall-distance" => {
                    let distance =
                        value.parse::<f32>().with_context(|| format!("Invalid wall distance '{value}'"))?;
                    if !(0.0..=1.0).contains(&distance) {
                        bail!("Wall distance must be between 0 and 1, got {distance}.");
                    }
                    parsed.wall_distance = Some(distance);
                }
                _ => bail!(
                    "Unknown flag '{flag}'. Supported flags: --frames, --config, --view, --build, --joystick, --wall-distance."
                ),
            }
        }
        Ok(parsed)
    }

    pub fn frames(&self) -> u32 {
        self.frames.unwrap_or(DEFAULT_FRAMES)
    }

    pub fn config_path(&self) -> Option<&PathBuf> {
        self.config.as_ref()
    }

    pub fn view(&self) -> ViewMode {
        self.view.unwrap_or(ViewMode::ThirdPerson)
    }

    pub fn config_overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            build: self.build,
            joystick_convention: self.joystick,
            distance_from_wall: self.wall_distance,
        }
    }
}

fn parse_convention(value: &str) -> Result<JoystickConvention> {
    match value.to_ascii_lowercase().as_str() {
        "front" | "front_facing" => Ok(JoystickConvention::FrontFacing),
        "back" | "back_facing" => Ok(JoystickConvention::BackFacing),
        other => bail!("Invalid joystick convention '{other}'. Use front or back."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_flag() {
        let args = [
            "avatar_sim",
            "--frames",
            "90",
            "--config",
            "avatar.json",
            "--view",
            "first",
            "--build",
            "slight",
            "--joystick",
            "back",
            "--wall-distance",
            "0.5",
        ];
        let parsed = SimArgs::parse(args).expect("parse args");
        assert_eq!(parsed.frames(), 90);
        assert_eq!(parsed.config_path(), Some(&PathBuf::from("avatar.json")));
        assert_eq!(parsed.view(), ViewMode::FirstPerson);
        let overrides = parsed.config_overrides();
        assert_eq!(overrides.build, Some(AvatarBuild::Slight));
        assert_eq!(overrides.joystick_convention, Some(JoystickConvention::BackFacing));
        assert_eq!(overrides.distance_from_wall, Some(0.5));
    }

    #[test]
    fn defaults_without_flags() {
        let parsed = SimArgs::parse(["avatar_sim"]).expect("parse args");
        assert_eq!(parsed.frames(), DEFAULT_FRAMES);
        assert_eq!(parsed.view(), ViewMode::ThirdPerson);
        assert!(parsed.config_overrides().is_empty());
    }

    #[test]
    fn latest_flag_wins() {
        let args = ["avatar_sim", "--frames", "10", "--frames", "20", "--view", "first", "--view", "third"];
        let parsed = SimArgs::parse(args).expect("parse args");
        assert_eq!(parsed.frames(), 20);
        assert_eq!(parsed.view(), ViewMode::ThirdPerson);
    }

    #[test]
    fn missing_value_errors() {
        let err = SimArgs::parse(["avatar_sim", "--frames"]).unwrap_err();
        assert!(err.to_string().contains("Expected a value"), "error should mention missing value");
    }

    #[test]
    fn rejects_unknown_flags_and_bad_values() {
        let err = SimArgs::parse(["avatar_sim", "--foo", "bar"]).unwrap_err();
        assert!(err.to_string().contains("Unknown flag"));
        let err = SimArgs::parse(["avatar_sim", "--build", "giant"]).unwrap_err();
        assert!(err.to_string().contains("Invalid build"));
        let err = SimArgs::parse(["avatar_sim", "--wall-distance", "2"]).unwrap_err();
        assert!(err.to_string().contains("between 0 and 1"));
    }
}
