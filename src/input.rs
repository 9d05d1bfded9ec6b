use bitflags::bitflags;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use winit::event::{ElementState, WindowEvent};
use winit::keyboard::{Key, NamedKey};

bitflags! {
    /// Directional movement keys currently held.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct DirectionKeys: u8 {
        const FORWARD = 1 << 0;
        const BACKWARD = 1 << 1;
        const LEFT = 1 << 2;
        const RIGHT = 1 << 3;
    }
}

impl DirectionKeys {
    /// `forward - backward`, in {-1, 0, 1}.
    pub fn forward_axis(self) -> i8 {
        self.contains(Self::FORWARD) as i8 - self.contains(Self::BACKWARD) as i8
    }

    /// `left - right`, in {-1, 0, 1}.
    pub fn side_axis(self) -> i8 {
        self.contains(Self::LEFT) as i8 - self.contains(Self::RIGHT) as i8
    }
}

/// Keyboard state for the avatar: held keys plus pending edge-triggered presses.
pub struct Input {
    bindings: InputBindings,
    held: HashSet<InputKeyBinding>,
    run_toggle_pending: bool,
    dance_toggle_pending: bool,
    jump_pressed: bool,
}

impl Input {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(path: impl AsRef<Path>) -> Self {
        let bindings = InputBindings::load_or_default(path);
        Self::with_bindings(bindings)
    }

    fn with_bindings(bindings: InputBindings) -> Self {
        Self {
            bindings,
            held: HashSet::new(),
            run_toggle_pending: false,
            dance_toggle_pending: false,
            jump_pressed: false,
        }
    }

    pub fn push(&mut self, ev: InputEvent) {
        match ev {
            InputEvent::Key { key, pressed } => self.apply_key(&key, pressed),
            InputEvent::Other => {}
        }
    }

    pub fn direction_keys(&self) -> DirectionKeys {
        let mut keys = DirectionKeys::empty();
        keys.set(DirectionKeys::FORWARD, self.action_held(InputAction::Forward));
        keys.set(DirectionKeys::BACKWARD, self.action_held(InputAction::Backward));
        keys.set(DirectionKeys::LEFT, self.action_held(InputAction::Left));
        keys.set(DirectionKeys::RIGHT, self.action_held(InputAction::Right));
        keys
    }

    pub fn crouch_held(&self) -> bool {
        self.action_held(InputAction::Crouch)
    }

    /// Returns true when an odd number of run-toggle presses arrived since the last call.
    pub fn take_run_toggle(&mut self) -> bool {
        std::mem::take(&mut self.run_toggle_pending)
    }

    /// Returns true when an odd number of dance-toggle presses arrived since the last call.
    pub fn take_dance_toggle(&mut self) -> bool {
        std::mem::take(&mut self.dance_toggle_pending)
    }

    pub fn take_jump_pressed(&mut self) -> bool {
        std::mem::take(&mut self.jump_pressed)
    }

    fn action_held(&self, action: InputAction) -> bool {
        self.bindings.keys_for_action(action).any(|key| self.held.contains(key))
    }

    fn apply_key(&mut self, key: &Key, pressed: bool) {
        let Some(binding_key) = InputKeyBinding::from_event_key(key) else {
            return;
        };
        let edge = if pressed {
            self.held.insert(binding_key.clone())
        } else {
            self.held.remove(&binding_key);
            false
        };
        if !edge {
            return;
        }
        let actions: Vec<_> = self.bindings.actions_for_key(&binding_key).collect();
        for action in actions {
            match action {
                InputAction::RunToggle => self.run_toggle_pending = !self.run_toggle_pending,
                InputAction::DanceToggle => self.dance_toggle_pending = !self.dance_toggle_pending,
                InputAction::Jump => self.jump_pressed = true,
                InputAction::Forward
                | InputAction::Backward
                | InputAction::Left
                | InputAction::Right
                | InputAction::Crouch => {}
            }
        }
    }
}

impl Default for Input {
    fn default() -> Self {
        Self::with_bindings(InputBindings::default())
    }
}

#[derive(Debug, Clone)]
struct InputBindings {
    action_to_keys: HashMap<InputAction, Vec<InputKeyBinding>>,
    key_to_actions: HashMap<InputKeyBinding, Vec<InputAction>>,
}

impl InputBindings {
    fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str::<InputConfigFile>(&contents) {
                Ok(config) => Self::from_config(config, &path.display().to_string()),
                Err(err) => {
                    tracing::warn!(path = %path.display(), %err, "Failed to parse key bindings, using defaults");
                    Self::default()
                }
            },
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "Failed to read key bindings, using defaults");
                Self::default()
            }
        }
    }

    fn from_config(config: InputConfigFile, origin: &str) -> Self {
        let overrides = config.into_overrides(origin);
        Self::with_overrides(overrides)
    }

    fn with_overrides(overrides: HashMap<InputAction, Vec<InputKeyBinding>>) -> Self {
        let mut action_map = Self::default_action_map();
        for (action, keys) in overrides {
            if keys.is_empty() {
                continue;
            }
            action_map.insert(action, keys);
        }
        Self::from_action_map(action_map)
    }

    fn default_action_map() -> HashMap<InputAction, Vec<InputKeyBinding>> {
        use InputAction::*;
        let mut map = HashMap::new();
        map.insert(
            Forward,
            vec![InputKeyBinding::character("w"), InputKeyBinding::named(NamedKeyCode::ArrowUp)],
        );
        map.insert(
            Backward,
            vec![InputKeyBinding::character("s"), InputKeyBinding::named(NamedKeyCode::ArrowDown)],
        );
        map.insert(
            Left,
            vec![InputKeyBinding::character("a"), InputKeyBinding::named(NamedKeyCode::ArrowLeft)],
        );
        map.insert(
            Right,
            vec![InputKeyBinding::character("d"), InputKeyBinding::named(NamedKeyCode::ArrowRight)],
        );
        map.insert(Crouch, vec![InputKeyBinding::named(NamedKeyCode::Shift)]);
        map.insert(RunToggle, vec![InputKeyBinding::named(NamedKeyCode::Control)]);
        map.insert(DanceToggle, vec![InputKeyBinding::character("g")]);
        map.insert(Jump, vec![InputKeyBinding::named(NamedKeyCode::Space)]);
        map
    }

    fn from_action_map(action_map: HashMap<InputAction, Vec<InputKeyBinding>>) -> Self {
        let mut key_to_actions: HashMap<InputKeyBinding, Vec<InputAction>> = HashMap::new();
        for (action, keys) in &action_map {
            for key in keys {
                key_to_actions.entry(key.clone()).or_default().push(*action);
            }
        }
        Self { action_to_keys: action_map, key_to_actions }
    }

    fn actions_for_key(&self, key: &InputKeyBinding) -> impl Iterator<Item = InputAction> + '_ {
        self.key_to_actions.get(key).into_iter().flatten().copied()
    }

    fn keys_for_action(&self, action: InputAction) -> impl Iterator<Item = &InputKeyBinding> + '_ {
        self.action_to_keys.get(&action).into_iter().flatten()
    }
}

impl Default for InputBindings {
    fn default() -> Self {
        Self::from_action_map(Self::default_action_map())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum InputKeyBinding {
    Character(String),
    Named(NamedKeyCode),
}

impl InputKeyBinding {
    fn character(ch: &str) -> Self {
        Self::Character(ch.to_lowercase())
    }

    fn named(named: NamedKeyCode) -> Self {
        Self::Named(named)
    }

    fn from_event_key(key: &Key) -> Option<Self> {
        match key {
            Key::Character(ch) => {
                let s = ch.to_string();
                if s.is_empty() {
                    None
                } else {
                    Some(Self::Character(s.to_lowercase()))
                }
            }
            Key::Named(named) => NamedKeyCode::from_named_key(named).map(Self::Named),
            _ => None,
        }
    }

    fn from_config_value(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_lowercase();
        if normalized.is_empty() {
            return None;
        }
        if let Some(named) = NamedKeyCode::from_str(&normalized) {
            return Some(Self::Named(named));
        }
        if normalized.chars().count() == 1 {
            return Some(Self::Character(normalized));
        }
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum NamedKeyCode {
    Space,
    Shift,
    Control,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
}

impl NamedKeyCode {
    fn from_named_key(key: &NamedKey) -> Option<Self> {
        match key {
            NamedKey::Space => Some(Self::Space),
            NamedKey::Shift => Some(Self::Shift),
            NamedKey::Control => Some(Self::Control),
            NamedKey::ArrowUp => Some(Self::ArrowUp),
            NamedKey::ArrowDown => Some(Self::ArrowDown),
            NamedKey::ArrowLeft => Some(Self::ArrowLeft),
            NamedKey::ArrowRight => Some(Self::ArrowRight),
            _ => None,
        }
    }

    fn from_str(value: &str) -> Option<Self> {
        match value {
            "space" => Some(Self::Space),
            "shift" | "left_shift" | "right_shift" => Some(Self::Shift),
            "ctrl" | "control" | "left_ctrl" | "right_ctrl" => Some(Self::Control),
            "arrowup" | "up" => Some(Self::ArrowUp),
            "arrowdown" | "down" => Some(Self::ArrowDown),
            "arrowleft" | "left" => Some(Self::ArrowLeft),
            "arrowright" | "right" => Some(Self::ArrowRight),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum InputAction {
    Forward,
    Backward,
    Left,
    Right,
    Crouch,
    RunToggle,
    DanceToggle,
    Jump,
}

impl InputAction {
    fn from_str(value: &str) -> Option<Self> {
        match value {
            "forward" => Some(Self::Forward),
            "backward" => Some(Self::Backward),
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            "crouch" => Some(Self::Crouch),
            "run_toggle" => Some(Self::RunToggle),
            "dance_toggle" => Some(Self::DanceToggle),
            "jump" => Some(Self::Jump),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct InputConfigFile {
    #[serde(default)]
    bindings: HashMap<String, Vec<String>>,
}

impl InputConfigFile {
    fn into_overrides(self, origin: &str) -> HashMap<InputAction, Vec<InputKeyBinding>> {
        let mut overrides = HashMap::new();
        for (action_name, keys) in self.bindings {
            let action_key = action_name.trim().to_lowercase();
            match InputAction::from_str(&action_key) {
                Some(action) => {
                    let mut parsed = Vec::new();
                    for key in keys {
                        match InputKeyBinding::from_config_value(&key) {
                            Some(binding) => parsed.push(binding),
                            None => tracing::warn!(
                                %origin,
                                %key,
                                action = %action_name,
                                "Unknown key in binding, ignoring"
                            ),
                        }
                    }
                    if parsed.is_empty() {
                        tracing::warn!(%origin, action = %action_name, "Action has no valid keys, keeping defaults");
                        continue;
                    }
                    overrides.insert(action, parsed);
                }
                None => tracing::warn!(%origin, action = %action_name, "Unknown action, ignoring"),
            }
        }
        overrides
    }
}

pub enum InputEvent {
    Key { key: Key, pressed: bool },
    Other,
}

impl InputEvent {
    pub fn key_down(key: Key) -> Self {
        InputEvent::Key { key, pressed: true }
    }

    pub fn key_up(key: Key) -> Self {
        InputEvent::Key { key, pressed: false }
    }

    pub fn from_window_event(ev: &WindowEvent) -> Self {
        match ev {
            WindowEvent::KeyboardInput { event, .. } => InputEvent::Key {
                key: event.logical_key.clone(),
                pressed: event.state == ElementState::Pressed,
            },
            _ => InputEvent::Other,
        }
    }
}
