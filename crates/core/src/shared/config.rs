use thiserror::Error;

pub const DEFAULT_MIN_NEIGHBORS: u32 = 5;
pub const DEFAULT_SCALE_FACTOR: f64 = 1.1;
pub const DEFAULT_MIN_FACE_SIZE: (u32, u32) = (30, 30);
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.5;
pub const DEFAULT_TARGET_FPS: u32 = 10;

pub const MIN_TARGET_FPS: u32 = 1;
pub const MAX_TARGET_FPS: u32 = 30;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("min_neighbors must be >= 1, got {0}")]
    MinNeighbors(u32),
    #[error("scale_factor must be > 1.0, got {0}")]
    ScaleFactor(f64),
    #[error("min_face_size must be positive, got {0}x{1}")]
    MinFaceSize(u32, u32),
    #[error("confidence_threshold must be within [0, 1], got {0}")]
    ConfidenceThreshold(f32),
    #[error("target_fps must be within [{MIN_TARGET_FPS}, {MAX_TARGET_FPS}], got {0}")]
    TargetFps(u32),
}

/// Detector sensitivity, confidence floor and processing rate.
///
/// Validated once at construction and read-only afterwards. The only
/// change allowed is swapping in a new `target_fps` between sessions via
/// [`PipelineConfig::with_target_fps`].
#[derive(Clone, Debug, PartialEq)]
pub struct PipelineConfig {
    min_neighbors: u32,
    scale_factor: f64,
    min_face_size: (u32, u32),
    confidence_threshold: f32,
    target_fps: u32,
}

impl PipelineConfig {
    pub fn new(
        min_neighbors: u32,
        scale_factor: f64,
        min_face_size: (u32, u32),
        confidence_threshold: f32,
        target_fps: u32,
    ) -> Result<Self, ConfigError> {
        if min_neighbors < 1 {
            return Err(ConfigError::MinNeighbors(min_neighbors));
        }
        if !(scale_factor > 1.0 && scale_factor.is_finite()) {
            return Err(ConfigError::ScaleFactor(scale_factor));
        }
        if min_face_size.0 == 0 || min_face_size.1 == 0 {
            return Err(ConfigError::MinFaceSize(min_face_size.0, min_face_size.1));
        }
        if !(0.0..=1.0).contains(&confidence_threshold) {
            return Err(ConfigError::ConfidenceThreshold(confidence_threshold));
        }
        if !(MIN_TARGET_FPS..=MAX_TARGET_FPS).contains(&target_fps) {
            return Err(ConfigError::TargetFps(target_fps));
        }
        Ok(Self {
            min_neighbors,
            scale_factor,
            min_face_size,
            confidence_threshold,
            target_fps,
        })
    }

    pub fn min_neighbors(&self) -> u32 {
        self.min_neighbors
    }

    pub fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    pub fn min_face_size(&self) -> (u32, u32) {
        self.min_face_size
    }

    pub fn confidence_threshold(&self) -> f32 {
        self.confidence_threshold
    }

    pub fn target_fps(&self) -> u32 {
        self.target_fps
    }

    /// Copy of this config with `target_fps` clamped into `[1, 30]`.
    pub fn with_target_fps(&self, fps: u32) -> Self {
        Self {
            target_fps: fps.clamp(MIN_TARGET_FPS, MAX_TARGET_FPS),
            ..self.clone()
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            min_neighbors: DEFAULT_MIN_NEIGHBORS,
            scale_factor: DEFAULT_SCALE_FACTOR,
            min_face_size: DEFAULT_MIN_FACE_SIZE,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            target_fps: DEFAULT_TARGET_FPS,
        }
    }
}
