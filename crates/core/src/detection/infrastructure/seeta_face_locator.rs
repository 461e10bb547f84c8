use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::detection::domain::face_locator::{FaceLocator, LocateError, LocatorParams};
use crate::shared::bounding_box::BoundingBox;
use crate::shared::frame::Frame;

/// Smallest window the SeetaFace cascade supports.
const MIN_WINDOW: u32 = 20;

/// Score threshold at the default `min_neighbors` of 5.
const BASE_SCORE_THRESH: f64 = 2.0;

/// Threshold change per `min_neighbors` step away from the default.
const SCORE_THRESH_STEP: f64 = 0.25;

const MIN_SCORE_THRESH: f64 = 0.5;

const SLIDE_STEP: u32 = 4;

/// Classical cascade face locator backed by `rustface` (SeetaFace).
///
/// A fresh detector is built from the loaded model on every call, so the
/// locator itself holds only plain model data and detection is stateless.
pub struct SeetaFaceLocator {
    model: rustface::Model,
}

impl SeetaFaceLocator {
    pub fn new(model_path: &Path) -> Result<Self, LocateError> {
        let file = File::open(model_path).map_err(|e| LocateError::ModelLoad {
            path: model_path.to_path_buf(),
            source: e,
        })?;
        let model =
            rustface::read_model(BufReader::new(file)).map_err(|e| LocateError::ModelLoad {
                path: model_path.to_path_buf(),
                source: e,
            })?;
        log::info!("Loaded face model from {}", model_path.display());
        Ok(Self { model })
    }
}

/// Maps `min_neighbors` (how many overlapping hits a cascade needs before
/// it trusts a face) onto SeetaFace's score threshold: more neighbours,
/// stricter threshold.
pub fn score_threshold(min_neighbors: u32) -> f64 {
    let delta = min_neighbors as f64 - 5.0;
    (BASE_SCORE_THRESH + delta * SCORE_THRESH_STEP).max(MIN_SCORE_THRESH)
}

/// SeetaFace shrinks the image by this factor per pyramid level; a cascade
/// grows its window by `scale_factor`, which is the inverse.
pub fn pyramid_scale(scale_factor: f64) -> f32 {
    (1.0 / scale_factor).clamp(0.01, 0.99) as f32
}

pub fn min_window(min_face_size: (u32, u32)) -> u32 {
    min_face_size.0.min(min_face_size.1).max(MIN_WINDOW)
}

impl FaceLocator for SeetaFaceLocator {
    fn locate(
        &mut self,
        frame: &Frame,
        params: &LocatorParams,
    ) -> Result<Vec<BoundingBox>, LocateError> {
        let (fw, fh) = (frame.width(), frame.height());
        let window = min_window(params.min_face_size);
        if fw < window || fh < window {
            return Ok(Vec::new());
        }

        let mut detector = rustface::create_detector_with_model(self.model.clone());
        detector.set_min_face_size(window);
        detector.set_score_thresh(score_threshold(params.min_neighbors));
        detector.set_pyramid_scale_factor(pyramid_scale(params.scale_factor));
        detector.set_slide_window_step(SLIDE_STEP, SLIDE_STEP);

        let gray = frame.to_grayscale();
        let faces = detector.detect(&rustface::ImageData::new(&gray, fw, fh));

        Ok(faces
            .iter()
            .filter_map(|face| {
                let bbox = face.bbox();
                BoundingBox::from_signed(
                    bbox.x() as i64,
                    bbox.y() as i64,
                    bbox.width() as i64,
                    bbox.height() as i64,
                    fw,
                    fh,
                )
            })
            .inspect(|b| debug_assert!(b.is_within(fw, fh)))
            .collect())
    }
}
