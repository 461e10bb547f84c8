use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

/// Lifecycle of one capture session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Running,
    Stopping,
    Stopped,
    Failed,
}

impl LoopState {
    fn to_u8(self) -> u8 {
        match self {
            LoopState::Idle => 0,
            LoopState::Running => 1,
            LoopState::Stopping => 2,
            LoopState::Stopped => 3,
            LoopState::Failed => 4,
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            1 => LoopState::Running,
            2 => LoopState::Stopping,
            3 => LoopState::Stopped,
            4 => LoopState::Failed,
            _ => LoopState::Idle,
        }
    }

    /// `Stopped` or `Failed`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, LoopState::Stopped | LoopState::Failed)
    }
}

/// Atomic cell holding a [`LoopState`]. Only the capture loop moves it
/// forward; everyone else holds a [`StopHandle`].
#[derive(Debug)]
pub(crate) struct SharedState(AtomicU8);

impl SharedState {
    pub(crate) fn new(state: LoopState) -> Self {
        Self(AtomicU8::new(state.to_u8()))
    }

    pub(crate) fn load(&self) -> LoopState {
        LoopState::from_u8(self.0.load(Ordering::Acquire))
    }

    pub(crate) fn store(&self, state: LoopState) {
        self.0.store(state.to_u8(), Ordering::Release);
    }

    /// Moves `from` -> `to`; false if the state was something else.
    pub(crate) fn transition(&self, from: LoopState, to: LoopState) -> bool {
        self.0
            .compare_exchange(from.to_u8(), to.to_u8(), Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

/// Read access to a session's state plus the one external mutation:
/// asking it to stop.
#[derive(Clone, Debug)]
pub struct StopHandle {
    state: Arc<SharedState>,
}

impl StopHandle {
    pub(crate) fn new(state: Arc<SharedState>) -> Self {
        Self { state }
    }

    /// Requests a cooperative stop. The loop notices at the top of its next
    /// iteration. Returns false when the session was not running, which
    /// makes repeated calls harmless.
    pub fn request_stop(&self) -> bool {
        self.state.transition(LoopState::Idle, LoopState::Stopping)
            || self.state.transition(LoopState::Running, LoopState::Stopping)
    }

    pub fn state(&self) -> LoopState {
        self.state.load()
    }
}
