use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// The closed set of character clips. Exactly one plays after every frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimationState {
    Idle,
    Walk,
    Run,
    Crouch,
    CrouchWalk,
    Dance,
}

impl AnimationState {
    pub const ALL: [AnimationState; 6] = [
        AnimationState::Idle,
        AnimationState::Walk,
        AnimationState::Run,
        AnimationState::Crouch,
        AnimationState::CrouchWalk,
        AnimationState::Dance,
    ];

    pub fn clip_name(self) -> &'static str {
        match self {
            AnimationState::Idle => "Idle",
            AnimationState::Walk => "Walk",
            AnimationState::Run => "Run",
            AnimationState::Crouch => "Crouch",
            AnimationState::CrouchWalk => "CrouchWalk",
            AnimationState::Dance => "Dance",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|state| state.clip_name().eq_ignore_ascii_case(value))
    }
}

/// Priority pick, highest first: CrouchWalk, Run, Walk, Dance, Crouch, Idle.
pub fn select_animation(is_moving: bool, crouching: bool, running: bool, dancing: bool) -> AnimationState {
    match (is_moving, crouching, running, dancing) {
        (true, true, _, _) => AnimationState::CrouchWalk,
        (true, false, true, _) => AnimationState::Run,
        (true, false, false, _) => AnimationState::Walk,
        (false, _, _, true) => AnimationState::Dance,
        (false, true, _, false) => AnimationState::Crouch,
        (false, false, _, false) => AnimationState::Idle,
    }
}

/// A playable clip owned by the character provider.
pub trait AnimationClip {
    fn start(&mut self, looping: bool, speed: f32, from: f32, to: f32, additive: bool);
    fn stop(&mut self);
    fn from_frame(&self) -> f32;
    fn to_frame(&self) -> f32;
    fn is_playing(&self) -> bool;
}

impl<T: AnimationClip + ?Sized> AnimationClip for Rc<RefCell<T>> {
    fn start(&mut self, looping: bool, speed: f32, from: f32, to: f32, additive: bool) {
        self.borrow_mut().start(looping, speed, from, to, additive);
    }
    fn stop(&mut self) {
        self.borrow_mut().stop();
    }
    fn from_frame(&self) -> f32 {
        self.borrow().from_frame()
    }
    fn to_frame(&self) -> f32 {
        self.borrow().to_frame()
    }
    fn is_playing(&self) -> bool {
        self.borrow().is_playing()
    }
}

/// In-memory clip with a frame cursor. Used by headless hosts and tests.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipPlayer {
    pub from: f32,
    pub to: f32,
    pub frame: f32,
    pub speed: f32,
    pub looping: bool,
    pub playing: bool,
    pub additive: bool,
    pub start_count: u32,
}

impl ClipPlayer {
    pub fn new(from: f32, to: f32) -> Self {
        Self {
            from,
            to: to.max(from),
            frame: from,
            speed: 1.0,
            looping: false,
            playing: false,
            additive: false,
            start_count: 0,
        }
    }

    /// Advances the cursor by `frames * speed`. Non-looping clips stop on the last frame.
    pub fn advance(&mut self, frames: f32) {
        if !self.playing {
            return;
        }
        let span = self.to - self.from;
        self.frame += frames * self.speed;
        if self.frame <= self.to {
            return;
        }
        if self.looping && span > f32::EPSILON {
            self.frame = self.from + (self.frame - self.from) % span;
        } else {
            self.frame = self.to;
            self.playing = false;
        }
    }
}

impl AnimationClip for ClipPlayer {
    fn start(&mut self, looping: bool, speed: f32, from: f32, to: f32, additive: bool) {
        if !self.playing || self.from != from || self.to != to {
            self.frame = from;
        }
        self.from = from;
        self.to = to.max(from);
        self.looping = looping;
        self.speed = speed;
        self.additive = additive;
        self.playing = true;
        self.start_count += 1;
    }

    fn stop(&mut self) {
        self.playing = false;
    }

    fn from_frame(&self) -> f32 {
        self.from
    }

    fn to_frame(&self) -> f32 {
        self.to
    }

    fn is_playing(&self) -> bool {
        self.playing
    }
}

/// Named clips the controller manages exclusively.
#[derive(Default)]
pub struct ClipLibrary {
    clips: HashMap<String, Box<dyn AnimationClip>>,
}

impl ClipLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, clip: Box<dyn AnimationClip>) -> Option<Box<dyn AnimationClip>> {
        self.clips.insert(name.into(), clip)
    }

    pub fn with_clip(mut self, name: impl Into<String>, clip: Box<dyn AnimationClip>) -> Self {
        self.insert(name, clip);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.clips.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&dyn AnimationClip> {
        self.clips.get(name).map(|clip| clip.as_ref())
    }

    /// Names of every clip currently playing, sorted.
    pub fn playing(&self) -> Vec<&str> {
        let mut names: Vec<&str> =
            self.clips.iter().filter(|(_, clip)| clip.is_playing()).map(|(name, _)| name.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Starts `state`'s clip looping over its full range and stops every other clip.
    /// Returns false without touching anything when the clip was never registered.
    pub fn play_exclusive(&mut self, state: AnimationState, speed: f32) -> bool {
        let target = state.clip_name();
        if !self.clips.contains_key(target) {
            return false;
        }
        for (name, clip) in self.clips.iter_mut() {
            if name == target {
                let (from, to) = (clip.from_frame(), clip.to_frame());
                clip.start(true, speed, from, to, false);
            } else if clip.is_playing() {
                clip.stop();
            }
        }
        true
    }
}
