use std::path::PathBuf;

use crate::detection::domain::emotion_classifier::ModelLoadOptions;
use crate::detection::infrastructure::onnx_emotion_classifier::load_emotion_model;
use crate::detection::infrastructure::seeta_face_locator::SeetaFaceLocator;
use crate::pipeline::detection_pipeline::DetectionPipeline;
use crate::pipeline::session::SessionError;
use crate::shared::constants::{EMOTION_MODEL_NAME, FACE_MODEL_NAME};
use crate::shared::model_resolver::{self, AppDirs, ProgressFn};

/// Where to look for, or fetch, the two models.
#[derive(Clone, Debug, Default)]
pub struct ModelSources {
    /// Searched after the weights directory; usually
    /// [`model_resolver::shared_cache_dir`].
    pub cache_dir: Option<PathBuf>,
    pub face_model_url: Option<String>,
    pub emotion_model_url: Option<String>,
    pub load_options: ModelLoadOptions,
}

/// Builds the detection pipeline from the weights directory.
///
/// The face model is mandatory; the emotion model is optional and its
/// absence selects degraded mode.
pub fn build_pipeline(
    dirs: &AppDirs,
    sources: &ModelSources,
) -> Result<DetectionPipeline, SessionError> {
    let face_path = model_resolver::resolve(
        FACE_MODEL_NAME,
        &dirs.weights_dir,
        sources.cache_dir.as_deref(),
        sources.face_model_url.as_deref(),
        Some(download_progress(FACE_MODEL_NAME)),
    )?;
    let locator = SeetaFaceLocator::new(&face_path)?;

    let emotion_path: Option<PathBuf> = match model_resolver::resolve(
        EMOTION_MODEL_NAME,
        &dirs.weights_dir,
        sources.cache_dir.as_deref(),
        sources.emotion_model_url.as_deref(),
        Some(download_progress(EMOTION_MODEL_NAME)),
    ) {
        Ok(path) => Some(path),
        Err(e) => {
            log::warn!("{e}");
            None
        }
    };
    let emotion_model = load_emotion_model(emotion_path.as_deref(), sources.load_options);

    Ok(DetectionPipeline::new(Box::new(locator), emotion_model))
}

/// Logs download progress in 10% steps.
fn download_progress(name: &'static str) -> ProgressFn {
    let last_decile = std::sync::atomic::AtomicU64::new(u64::MAX);
    Box::new(move |done, total| {
        if total == 0 {
            return;
        }
        let decile = done * 10 / total;
        if last_decile.swap(decile, std::sync::atomic::Ordering::Relaxed) != decile {
            log::info!("Downloading {name}: {}%", decile * 10);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dirs_in(root: &std::path::Path) -> AppDirs {
        AppDirs {
            weights_dir: root.join("weights"),
            output_dir: root.join("outputs"),
        }
    }

    #[test]
    fn test_missing_face_model_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let err = build_pipeline(&dirs_in(tmp.path()), &ModelSources::default())
            .err()
            .unwrap();
        assert!(matches!(err, SessionError::ModelResolve(_)));
        assert!(err.to_string().contains(FACE_MODEL_NAME));
    }

    #[test]
    fn test_corrupt_face_model_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let dirs = dirs_in(tmp.path());
        dirs.ensure_exist().unwrap();
        std::fs::write(dirs.weights_dir.join(FACE_MODEL_NAME), b"garbage").unwrap();
        let err = build_pipeline(&dirs, &ModelSources::default()).err().unwrap();
        assert!(matches!(err, SessionError::Locate(_)));
    }

    #[test]
    fn test_face_model_is_looked_up_in_cache_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = tmp.path().join("cache");
        std::fs::create_dir_all(&cache).unwrap();
        std::fs::write(cache.join(FACE_MODEL_NAME), b"garbage").unwrap();
        let sources = ModelSources {
            cache_dir: Some(cache),
            ..ModelSources::default()
        };
        // Found in the cache, then rejected by the locator.
        let err = build_pipeline(&dirs_in(tmp.path()), &sources).err().unwrap();
        assert!(matches!(err, SessionError::Locate(_)));
    }

    #[test]
    #[ignore = "requires MOODLENS_WEIGHTS with the face model"]
    fn test_face_model_without_emotion_model_is_degraded() {
        let weights = PathBuf::from(std::env::var("MOODLENS_WEIGHTS").unwrap());
        let tmp = tempfile::tempdir().unwrap();
        let dirs = AppDirs {
            weights_dir: tmp.path().to_path_buf(),
            output_dir: tmp.path().join("out"),
        };
        std::fs::copy(weights.join(FACE_MODEL_NAME), dirs.weights_dir.join(FACE_MODEL_NAME))
            .unwrap();
        let pipeline = build_pipeline(&dirs, &ModelSources::default()).unwrap();
        assert!(!pipeline.emotion_model_available());
    }
}
