use std::path::PathBuf;

use crate::capture::domain::frame_source::{FrameSource, SourceError, SourceInfo, SourceKind};
use crate::shared::constants::is_image;
use crate::shared::frame::Frame;

/// A still image presented as a one-frame finite source.
pub struct StillImageSource {
    path: PathBuf,
    pending: Option<Frame>,
    opened: bool,
}

impl StillImageSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            pending: None,
            opened: false,
        }
    }
}

impl FrameSource for StillImageSource {
    fn open(&mut self) -> Result<SourceInfo, SourceError> {
        self.close();
        if !is_image(&self.path) {
            return Err(SourceError::UnsupportedFile(self.path.clone()));
        }
        let img = image::open(&self.path).map_err(|e| SourceError::Open {
            target: self.path.display().to_string(),
            reason: e.to_string(),
        })?;
        let frame = Frame::from_rgb_image(img.to_rgb8(), 0);
        let info = SourceInfo {
            kind: SourceKind::Image,
            native_fps: 1.0,
            width: frame.width(),
            height: frame.height(),
        };
        self.pending = Some(frame);
        self.opened = true;
        Ok(info)
    }

    fn read(&mut self) -> Result<Option<Frame>, SourceError> {
        if !self.opened {
            return Err(SourceError::NotOpen);
        }
        Ok(self.pending.take())
    }

    fn close(&mut self) {
        self.pending = None;
        self.opened = false;
    }

    fn is_open(&self) -> bool {
        self.opened
    }
}
