//! Virtual joystick samples and the single-slot channel the controller polls.
//!
//! The joystick reports from UI callbacks that run between frames. Each report
//! overwrites the previous one; the frame loop only ever sees the latest value.

use glam::Vec2;
use std::cell::Cell;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JoystickEventKind {
    Start,
    Move,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JoystickSample {
    pub event: JoystickEventKind,
    /// Stick angle in radians, counter-clockwise from screen right.
    pub angle_radians: Option<f32>,
    /// Unit stick direction, `y` pointing screen up.
    pub vector: Vec2,
}

impl JoystickSample {
    pub fn start() -> Self {
        Self { event: JoystickEventKind::Start, angle_radians: None, vector: Vec2::ZERO }
    }

    pub fn moved(angle_radians: f32) -> Self {
        Self {
            event: JoystickEventKind::Move,
            angle_radians: Some(angle_radians),
            vector: Vec2::new(angle_radians.cos(), angle_radians.sin()),
        }
    }

    pub fn end() -> Self {
        Self { event: JoystickEventKind::End, angle_radians: None, vector: Vec2::ZERO }
    }

    /// Angle that should steer the character, if this sample drives movement.
    pub fn steering_angle(&self) -> Option<f32> {
        match (self.event, self.angle_radians) {
            (JoystickEventKind::Move, Some(angle)) if angle.is_finite() => Some(angle),
            _ => None,
        }
    }
}

/// Creates a connected writer/reader pair sharing one overwrite-on-write slot.
pub fn latest_channel<T: Copy>() -> (LatestWriter<T>, LatestReader<T>) {
    let slot = Rc::new(Cell::new(None));
    (LatestWriter { slot: Rc::clone(&slot) }, LatestReader { slot })
}

pub struct LatestWriter<T: Copy> {
    slot: Rc<Cell<Option<T>>>,
}

impl<T: Copy> LatestWriter<T> {
    pub fn write(&self, value: T) {
        self.slot.set(Some(value));
    }
}

#[derive(Clone)]
pub struct LatestReader<T: Copy> {
    slot: Rc<Cell<Option<T>>>,
}

impl<T: Copy> LatestReader<T> {
    /// Reads the most recent value without consuming it.
    pub fn latest(&self) -> Option<T> {
        self.slot.get()
    }
}

/// Source of joystick samples. Subscribers receive every start/move/end report.
pub trait JoystickProvider {
    fn subscribe(&mut self, sink: LatestWriter<JoystickSample>);
}

/// On-screen joystick that fans its reports out to subscribers.
pub struct VirtualJoystick {
    sinks: Vec<LatestWriter<JoystickSample>>,
    visible: bool,
}

impl VirtualJoystick {
    pub fn new() -> Self {
        Self { sinks: Vec::new(), visible: true }
    }

    /// Reports are dropped while the joystick is hidden.
    pub fn emit(&self, sample: JoystickSample) {
        if !self.visible {
            return;
        }
        for sink in &self.sinks {
            sink.write(sample);
        }
    }

    pub fn show(&mut self) {
        self.visible = true;
    }

    /// Hiding releases the stick, so a drag in progress stops steering.
    pub fn hide(&mut self) {
        if self.visible {
            self.emit(JoystickSample::end());
        }
        self.visible = false;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn subscriber_count(&self) -> usize {
        self.sinks.len()
    }
}

impl Default for VirtualJoystick {
    fn default() -> Self {
        Self::new()
    }
}

impl JoystickProvider for VirtualJoystick {
    fn subscribe(&mut self, sink: LatestWriter<JoystickSample>) {
        self.sinks.push(sink);
    }
}
