use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{CameraIndex, RequestedFormat, RequestedFormatType};
use nokhwa::Camera;

use crate::capture::domain::frame_source::{FrameSource, SourceError, SourceInfo, SourceKind};
use crate::shared::frame::Frame;

/// A live camera device opened through `nokhwa`.
///
/// The device's frame rate is not probed; `assumed_fps` is reported as the
/// native rate. The stream runs until [`FrameSource::close`] or drop.
pub struct CameraSource {
    device_index: u32,
    assumed_fps: f64,
    camera: Option<Camera>,
    frame_index: usize,
}

impl CameraSource {
    pub fn new(device_index: u32, assumed_fps: f64) -> Self {
        Self {
            device_index,
            assumed_fps,
            camera: None,
            frame_index: 0,
        }
    }

    fn open_err(&self, reason: impl ToString) -> SourceError {
        SourceError::Open {
            target: format!("camera {}", self.device_index),
            reason: reason.to_string(),
        }
    }
}

impl FrameSource for CameraSource {
    fn open(&mut self) -> Result<SourceInfo, SourceError> {
        self.close();
        let requested =
            RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestFrameRate);
        let mut camera = Camera::new(CameraIndex::Index(self.device_index), requested)
            .map_err(|e| self.open_err(e))?;
        camera.open_stream().map_err(|e| self.open_err(e))?;

        let resolution = camera.resolution();
        log::info!(
            "Camera {} opened: {}x{}",
            self.device_index,
            resolution.width(),
            resolution.height()
        );

        self.camera = Some(camera);
        self.frame_index = 0;
        Ok(SourceInfo {
            kind: SourceKind::Camera,
            native_fps: self.assumed_fps,
            width: resolution.width(),
            height: resolution.height(),
        })
    }

    fn read(&mut self) -> Result<Option<Frame>, SourceError> {
        let camera = self.camera.as_mut().ok_or(SourceError::NotOpen)?;
        let buffer = camera
            .frame()
            .map_err(|e| SourceError::Disconnected(e.to_string()))?;
        let index = self.frame_index;
        self.frame_index += 1;

        let decoded = buffer
            .decode_image::<RgbFormat>()
            .map_err(|e| SourceError::Decode(e.to_string()))?;
        let (width, height) = (decoded.width(), decoded.height());
        let data = decoded.into_raw();
        if data.len() != width as usize * height as usize * 3 {
            return Err(SourceError::Decode(format!(
                "camera buffer of {} bytes does not match {width}x{height}",
                data.len()
            )));
        }
        Ok(Some(Frame::new(data, width, height, index)))
    }

    fn close(&mut self) {
        if let Some(mut camera) = self.camera.take() {
            if let Err(e) = camera.stop_stream() {
                log::warn!("Failed to stop camera {} stream: {e}", self.device_index);
            } else {
                log::info!("Camera {} released", self.device_index);
            }
        }
    }

    fn is_open(&self) -> bool {
        self.camera.is_some()
    }
}

impl Drop for CameraSource {
    fn drop(&mut self) {
        self.close();
    }
}
