/// Handle returned when a before-render observer is registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(u64);

impl ObserverId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInfo {
    pub index: u64,
    pub delta_seconds: f32,
}

pub type BeforeRenderObserver = Box<dyn FnMut(&FrameInfo)>;

/// Host scene hook the controller registers its per-frame callback with.
pub trait SceneLifecycle {
    fn add_before_render(&mut self, observer: BeforeRenderObserver) -> ObserverId;
    /// Returns false when `id` was not registered.
    fn remove_before_render(&mut self, id: ObserverId) -> bool;
}

/// Minimal render loop: observers run once per frame in registration order.
#[derive(Default)]
pub struct FrameLoop {
    observers: Vec<(ObserverId, BeforeRenderObserver)>,
    next_id: u64,
    frame_index: u64,
    elapsed_seconds: f64,
}

impl FrameLoop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Simulated time: the sum of every delta run so far.
    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed_seconds
    }

    /// Runs one frame with a caller-chosen delta. Negative or non-finite deltas count as zero.
    pub fn run_frame_with_delta(&mut self, delta_seconds: f32) -> FrameInfo {
        let delta_seconds = if delta_seconds.is_finite() { delta_seconds.max(0.0) } else { 0.0 };
        let info = FrameInfo { index: self.frame_index, delta_seconds };
        for (_, observer) in self.observers.iter_mut() {
            observer(&info);
        }
        self.frame_index += 1;
        self.elapsed_seconds += f64::from(delta_seconds);
        info
    }
}

impl SceneLifecycle for FrameLoop {
    fn add_before_render(&mut self, observer: BeforeRenderObserver) -> ObserverId {
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        self.observers.push((id, observer));
        id
    }

    fn remove_before_render(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(existing, _)| *existing != id);
        self.observers.len() != before
    }
}
