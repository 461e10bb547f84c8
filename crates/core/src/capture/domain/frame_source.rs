use std::path::PathBuf;

use thiserror::Error;

use crate::shared::frame::Frame;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("could not open {target}: {reason}")]
    Open { target: String, reason: String },
    #[error("source is not open")]
    NotOpen,
    #[error("source disconnected: {0}")]
    Disconnected(String),
    #[error("frame decode failed: {0}")]
    Decode(String),
    #[error("unsupported file type: {0}")]
    UnsupportedFile(PathBuf),
}

impl SourceError {
    /// A transient failure affects one frame only; the source stays usable.
    pub fn is_transient(&self) -> bool {
        matches!(self, SourceError::Decode(_))
    }
}

/// What kind of device or file backs a source.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceKind {
    Camera,
    Video,
    Image,
}

/// Properties reported by [`FrameSource::open`].
#[derive(Clone, Debug, PartialEq)]
pub struct SourceInfo {
    pub kind: SourceKind,
    /// Probed for files; assumed constant for cameras.
    pub native_fps: f64,
    pub width: u32,
    pub height: u32,
}

/// A camera device or a file presented as a sequence of frames.
///
/// Sources are owned by the capture loop that opened them and never leave
/// its thread, so the trait does not require `Send`.
pub trait FrameSource {
    fn open(&mut self) -> Result<SourceInfo, SourceError>;

    /// The next frame in source order; `Ok(None)` at end of stream.
    fn read(&mut self) -> Result<Option<Frame>, SourceError>;

    /// Releases the underlying handle. Safe to call repeatedly, and after a
    /// failed or partial `open`.
    fn close(&mut self);

    fn is_open(&self) -> bool;
}
