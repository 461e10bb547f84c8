use std::panic::{self, AssertUnwindSafe};

use thiserror::Error;

use crate::detection::domain::emotion::{Emotion, EmotionScores};
use crate::shared::frame::Frame;
use crate::shared::panic_payload::panic_message;

#[derive(Error, Debug)]
pub enum ClassifyError {
    #[error("face region is empty")]
    EmptyRegion,
    #[error("inference failed: {0}")]
    Inference(String),
    #[error("unexpected model output: {0}")]
    Output(String),
}

/// Scores the emotions of one cropped face.
pub trait EmotionClassifier: Send {
    fn classify(&mut self, face: &Frame) -> Result<EmotionScores, ClassifyError>;
}

/// The emotion model chosen once when the pipeline is built.
///
/// A missing model is a supported configuration: faces are still located
/// and reported with the [`Emotion::FaceDetected`] placeholder.
pub enum EmotionModel {
    Available(Box<dyn EmotionClassifier>),
    Unavailable,
}

/// Outcome of classifying one face.
#[derive(Clone, Debug, PartialEq)]
pub enum Classification {
    /// Real model output, subject to the confidence threshold.
    Scored(EmotionScores),
    /// Placeholder label at full confidence; never filtered.
    Placeholder(EmotionScores),
}

impl Classification {
    pub fn scores(&self) -> &EmotionScores {
        match self {
            Classification::Scored(s) | Classification::Placeholder(s) => s,
        }
    }

    pub fn into_scores(self) -> EmotionScores {
        match self {
            Classification::Scored(s) | Classification::Placeholder(s) => s,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Classification::Placeholder(_))
    }
}

impl EmotionModel {
    pub fn is_available(&self) -> bool {
        matches!(self, EmotionModel::Available(_))
    }

    /// Classifies `face`, degrading to a placeholder instead of failing.
    ///
    /// Errors and panics from the classifier both become `unknown`; neither
    /// reaches the caller.
    pub fn classify(&mut self, face: &Frame) -> Classification {
        let classifier = match self {
            EmotionModel::Unavailable => {
                return Classification::Placeholder(EmotionScores::placeholder(
                    Emotion::FaceDetected,
                ))
            }
            EmotionModel::Available(classifier) => classifier,
        };
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| classifier.classify(face)));
        match outcome {
            Ok(Ok(scores)) if !scores.is_empty() => Classification::Scored(scores),
            Ok(Ok(_)) => {
                log::warn!("Emotion classifier returned no scores");
                Classification::Placeholder(EmotionScores::placeholder(Emotion::Unknown))
            }
            Ok(Err(e)) => {
                log::warn!("Emotion classification failed: {e}");
                Classification::Placeholder(EmotionScores::placeholder(Emotion::Unknown))
            }
            Err(payload) => {
                log::warn!("Emotion classifier panicked: {}", panic_message(&*payload));
                Classification::Placeholder(EmotionScores::placeholder(Emotion::Unknown))
            }
        }
    }
}

/// Options applied when loading an inference session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModelLoadOptions {
    /// Most verbose level the inference runtime itself may emit.
    pub log_level: log::LevelFilter,
}

impl Default for ModelLoadOptions {
    fn default() -> Self {
        Self {
            log_level: log::LevelFilter::Warn,
        }
    }
}
