use std::path::PathBuf;

use thiserror::Error;

use crate::shared::bounding_box::BoundingBox;
use crate::shared::config::PipelineConfig;
use crate::shared::frame::Frame;

#[derive(Error, Debug)]
pub enum LocateError {
    #[error("failed to load face model {path}: {source}")]
    ModelLoad {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("face detector failed: {0}")]
    Backend(String),
}

/// Detector sensitivity knobs, taken from [`PipelineConfig`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LocatorParams {
    pub min_neighbors: u32,
    pub scale_factor: f64,
    pub min_face_size: (u32, u32),
}

impl From<&PipelineConfig> for LocatorParams {
    fn from(config: &PipelineConfig) -> Self {
        Self {
            min_neighbors: config.min_neighbors(),
            scale_factor: config.scale_factor(),
            min_face_size: config.min_face_size(),
        }
    }
}

/// Finds faces in a frame.
///
/// Every returned box is non-empty and lies inside `frame`. An empty list
/// means no face, which is not an error.
pub trait FaceLocator: Send {
    fn locate(
        &mut self,
        frame: &Frame,
        params: &LocatorParams,
    ) -> Result<Vec<BoundingBox>, LocateError>;
}
