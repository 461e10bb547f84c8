/// Emotion classifier using ONNX Runtime via `ort`.
///
/// Expects a single-channel NCHW model (`[1, 1, H, W]`, 48x48 for the
/// bundled FER-2013 network) emitting 7 scores in [`Emotion::CLASSES`]
/// order. Logits are passed through softmax; outputs that already form a
/// distribution are used as-is.
use std::path::Path;

use image::imageops::{self, FilterType};
use image::GrayImage;

use crate::detection::domain::emotion::{Emotion, EmotionScores};
use crate::detection::domain::emotion_classifier::{
    ClassifyError, EmotionClassifier, EmotionModel, ModelLoadOptions,
};
use crate::detection::infrastructure::execution_provider::{
    preferred_execution_providers, runtime_log_level,
};
use crate::detection::infrastructure::math::{is_distribution, softmax};
use crate::shared::frame::Frame;

/// Input resolution used when the model's shape is dynamic.
const DEFAULT_INPUT_SIZE: u32 = 48;

pub struct OnnxEmotionClassifier {
    session: ort::session::Session,
    input_size: u32,
}

impl OnnxEmotionClassifier {
    pub fn new(
        model_path: &Path,
        options: ModelLoadOptions,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let session = ort::session::Session::builder()?
            .with_log_level(runtime_log_level(options.log_level))?
            .with_execution_providers(preferred_execution_providers())?
            .commit_from_file(model_path)?;

        // NCHW: [1, 1, H, W]
        let input_size = session
            .inputs()
            .first()
            .and_then(|input| {
                if let ort::value::ValueType::Tensor { ref shape, .. } = input.dtype() {
                    if shape.len() >= 4 && shape[2] > 0 {
                        Some(shape[2] as u32)
                    } else {
                        None
                    }
                } else {
                    None
                }
            })
            .unwrap_or(DEFAULT_INPUT_SIZE);

        Ok(Self {
            session,
            input_size,
        })
    }
}

/// Loads the classifier at `model_path`, falling back to
/// [`EmotionModel::Unavailable`] when the file is missing or unloadable.
pub fn load_emotion_model(model_path: Option<&Path>, options: ModelLoadOptions) -> EmotionModel {
    let Some(path) = model_path else {
        log::warn!("No emotion model configured; reporting faces only");
        return EmotionModel::Unavailable;
    };
    match OnnxEmotionClassifier::new(path, options) {
        Ok(classifier) => {
            log::info!("Loaded emotion model from {}", path.display());
            EmotionModel::Available(Box::new(classifier))
        }
        Err(e) => {
            log::warn!(
                "Emotion model {} unavailable ({e}); reporting faces only",
                path.display()
            );
            EmotionModel::Unavailable
        }
    }
}

impl EmotionClassifier for OnnxEmotionClassifier {
    fn classify(&mut self, face: &Frame) -> Result<EmotionScores, ClassifyError> {
        if face.width() == 0 || face.height() == 0 {
            return Err(ClassifyError::EmptyRegion);
        }

        let tensor = preprocess(face, self.input_size);
        let input_value = ort::value::Tensor::from_array(tensor)
            .map_err(|e| ClassifyError::Inference(e.to_string()))?;
        let outputs = self
            .session
            .run(ort::inputs![input_value])
            .map_err(|e| ClassifyError::Inference(e.to_string()))?;

        let array = outputs[0]
            .try_extract_array::<f32>()
            .map_err(|e| ClassifyError::Output(e.to_string()))?;
        let raw: Vec<f32> = array.iter().copied().collect();
        if raw.len() < Emotion::CLASSES.len() {
            return Err(ClassifyError::Output(format!(
                "expected {} scores, got {}",
                Emotion::CLASSES.len(),
                raw.len()
            )));
        }
        Ok(EmotionScores::from_probabilities(&to_probabilities(
            &raw[..Emotion::CLASSES.len()],
        )))
    }
}

fn to_probabilities(raw: &[f32]) -> Vec<f32> {
    if is_distribution(raw) {
        raw.to_vec()
    } else {
        softmax(raw)
    }
}

/// Grayscale, resize to `size` x `size`, scale to `[0, 1]`.
fn preprocess(face: &Frame, size: u32) -> ndarray::Array4<f32> {
    let gray = GrayImage::from_raw(face.width(), face.height(), face.to_grayscale())
        .unwrap_or_else(|| GrayImage::new(size, size));
    let resized = imageops::resize(&gray, size, size, FilterType::Triangle);

    let n = size as usize;
    let mut tensor = ndarray::Array4::<f32>::zeros((1, 1, n, n));
    for (x, y, px) in resized.enumerate_pixels() {
        tensor[[0, 0, y as usize, x as usize]] = px.0[0] as f32 / 255.0;
    }
    tensor
}
