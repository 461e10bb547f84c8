/// Fixed-stride decimation of a source down to a target processing rate.
///
/// Every frame read bumps a counter; a frame is processed only when the
/// counter is a multiple of `frame_skip`. Rejected frames are dropped.
#[derive(Clone, Debug)]
pub struct RateController {
    frame_skip: u64,
    counter: u64,
}

impl RateController {
    pub fn new(native_fps: f64, target_fps: u32) -> Self {
        Self {
            frame_skip: frame_skip(native_fps, target_fps),
            counter: 0,
        }
    }

    /// Counts one frame read and reports whether to process it.
    pub fn accept(&mut self) -> bool {
        self.counter += 1;
        self.counter % self.frame_skip == 0
    }

    pub fn frame_skip(&self) -> u64 {
        self.frame_skip
    }

    /// Frames counted so far.
    pub fn counter(&self) -> u64 {
        self.counter
    }
}

/// `max(1, floor(native_fps / target_fps))`. Non-finite or non-positive
/// rates process every frame.
pub fn frame_skip(native_fps: f64, target_fps: u32) -> u64 {
    if target_fps == 0 || !native_fps.is_finite() || native_fps <= 0.0 {
        return 1;
    }
    ((native_fps / target_fps as f64).floor() as u64).max(1)
}
