use std::path::Path;
use std::time::Duration;

/// SeetaFace frontal cascade used by the classical face locator.
pub const FACE_MODEL_NAME: &str = "seeta_fd_frontal_v1.0.bin";

/// 7-class FER-2013-ordered emotion classifier.
pub const EMOTION_MODEL_NAME: &str = "emotion_fer7.onnx";

pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "tiff"];
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "wmv", "mkv", "mov"];

/// Native rate assumed for cameras, which are not probed.
pub const ASSUMED_CAMERA_FPS: f64 = 30.0;

/// Processed frames are bounded to this size before detection.
pub const MAX_FRAME_WIDTH: u32 = 800;
pub const MAX_FRAME_HEIGHT: u32 = 600;

pub const DEFAULT_DISPLAY_WIDTH: u32 = 800;
pub const DEFAULT_DISPLAY_HEIGHT: u32 = 600;

/// Fill colour of the letterbox canvas.
pub const LETTERBOX_FILL: [u8; 3] = [128, 128, 128];

/// Pause between releasing the source and reporting `Stopped`, so a
/// display update already in flight can land first.
pub const SETTLE_DELAY: Duration = Duration::from_secs(1);

/// How long `stop()` waits for the worker to wind down.
pub const STOP_TIMEOUT: Duration = Duration::from_secs(3);

pub const APP_DIR_NAME: &str = "MoodLens";

pub fn is_image(path: &Path) -> bool {
    has_extension(path, IMAGE_EXTENSIONS)
}

pub fn is_video(path: &Path) -> bool {
    has_extension(path, VIDEO_EXTENSIONS)
}

fn has_extension(path: &Path, accepted: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| accepted.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}
