use crate::detection::domain::emotion::{Emotion, EmotionScores};
use crate::shared::bounding_box::BoundingBox;

/// One face and its classification.
///
/// `dominant_emotion` is the arg-max of `scores` and `confidence` its
/// value, so the three fields never disagree.
#[derive(Clone, Debug, PartialEq)]
pub struct Detection {
    pub bounding_box: BoundingBox,
    pub dominant_emotion: Emotion,
    pub scores: EmotionScores,
    pub confidence: f32,
}

impl Detection {
    /// Returns `None` when `scores` is empty.
    pub fn new(bounding_box: BoundingBox, scores: EmotionScores) -> Option<Self> {
        let (dominant_emotion, confidence) = scores.dominant()?;
        Some(Self {
            bounding_box,
            dominant_emotion,
            scores,
            confidence,
        })
    }
}

/// Detections for one frame, in locator output order. Possibly empty.
pub type FrameResult = Vec<Detection>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_takes_argmax() {
        let scores = EmotionScores::from_pairs([(Emotion::Neutral, 0.3), (Emotion::Fear, 0.6)]);
        let d = Detection::new(BoundingBox::new(0, 0, 5, 5), scores).unwrap();
        assert_eq!(d.dominant_emotion, Emotion::Fear);
        assert_eq!(d.confidence, 0.6);
    }

    #[test]
    fn test_new_with_empty_scores_is_none() {
        assert!(Detection::new(BoundingBox::new(0, 0, 5, 5), EmotionScores::from_pairs([])).is_none());
    }
}
