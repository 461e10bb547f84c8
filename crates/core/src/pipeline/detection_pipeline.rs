use std::time::Instant;

use thiserror::Error;

use crate::detection::domain::detection::{Detection, FrameResult};
use crate::detection::domain::emotion_classifier::EmotionModel;
use crate::detection::domain::face_locator::{FaceLocator, LocateError, LocatorParams};
use crate::pipeline::pipeline_logger::{NullPipelineLogger, PipelineLogger};
use crate::shared::config::PipelineConfig;
use crate::shared::frame::Frame;

/// Failure confined to one frame. The capture loop skips the frame and
/// carries on.
#[derive(Error, Debug)]
pub enum FrameProcessingError {
    #[error("face location failed: {0}")]
    Locate(#[from] LocateError),
    #[error("frame processing panicked: {0}")]
    Panicked(String),
}

/// Locates faces, classifies each one and applies the confidence floor.
pub struct DetectionPipeline {
    locator: Box<dyn FaceLocator>,
    emotion_model: EmotionModel,
}

impl DetectionPipeline {
    pub fn new(locator: Box<dyn FaceLocator>, emotion_model: EmotionModel) -> Self {
        if !emotion_model.is_available() {
            log::info!("Emotion model unavailable; faces will be reported without emotions");
        }
        Self {
            locator,
            emotion_model,
        }
    }

    pub fn emotion_model_available(&self) -> bool {
        self.emotion_model.is_available()
    }

    pub fn process(
        &mut self,
        frame: &Frame,
        config: &PipelineConfig,
    ) -> Result<FrameResult, FrameProcessingError> {
        self.process_logged(frame, config, &mut NullPipelineLogger)
    }

    /// Same as [`DetectionPipeline::process`], reporting `locate` and
    /// `classify` timings and the face count to `logger`.
    ///
    /// Real scores below the threshold are dropped; placeholders are always
    /// kept so a located face is never hidden. Output keeps locator order.
    pub fn process_logged(
        &mut self,
        frame: &Frame,
        config: &PipelineConfig,
        logger: &mut dyn PipelineLogger,
    ) -> Result<FrameResult, FrameProcessingError> {
        let params = LocatorParams::from(config);

        let t0 = Instant::now();
        let boxes = self.locator.locate(frame, &params)?;
        logger.timing("locate", t0.elapsed().as_secs_f64() * 1000.0);
        logger.metric("faces_located", boxes.len() as f64);

        let t1 = Instant::now();
        let threshold = config.confidence_threshold();
        let mut results = Vec::with_capacity(boxes.len());
        for bbox in boxes {
            let Some(face) = frame.crop(&bbox) else {
                log::trace!("Discarding box outside frame: {bbox:?}");
                continue;
            };
            let classification = self.emotion_model.classify(&face);
            let confidence = classification.scores().confidence();
            if !classification.is_placeholder() && confidence < threshold {
                log::trace!(
                    "Dropping face at {bbox:?}: confidence {confidence:.2} < {threshold:.2}"
                );
                continue;
            }
            if let Some(detection) = Detection::new(bbox, classification.into_scores()) {
                results.push(detection);
            }
        }
        logger.timing("classify", t1.elapsed().as_secs_f64() * 1000.0);

        Ok(results)
    }
}
