use std::fmt;

/// The closed emotion vocabulary, plus the two placeholder labels used
/// when a face was found but no real classification is available.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Emotion {
    Angry,
    Disgust,
    Fear,
    Happy,
    Sad,
    Surprise,
    Neutral,
    /// Classification was attempted on this face and failed.
    Unknown,
    /// No emotion model is loaded; only the face itself is reported.
    FaceDetected,
}

impl Emotion {
    /// Real classifier classes, in the model's output order.
    pub const CLASSES: [Emotion; 7] = [
        Emotion::Angry,
        Emotion::Disgust,
        Emotion::Fear,
        Emotion::Happy,
        Emotion::Sad,
        Emotion::Surprise,
        Emotion::Neutral,
    ];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::CLASSES.get(index).copied()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Angry => "angry",
            Emotion::Disgust => "disgust",
            Emotion::Fear => "fear",
            Emotion::Happy => "happy",
            Emotion::Sad => "sad",
            Emotion::Surprise => "surprise",
            Emotion::Neutral => "neutral",
            Emotion::Unknown => "unknown",
            Emotion::FaceDetected => "face_detected",
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Emotion::Unknown | Emotion::FaceDetected)
    }

    /// Label with the first letter of every word upper-cased and the rest
    /// lower-cased (`"happy"` -> `"Happy"`).
    pub fn title_case(&self) -> String {
        let mut out = String::with_capacity(self.as_str().len());
        let mut at_word_start = true;
        for ch in self.as_str().chars() {
            if ch.is_alphabetic() {
                if at_word_start {
                    out.extend(ch.to_uppercase());
                } else {
                    out.extend(ch.to_lowercase());
                }
                at_word_start = false;
            } else {
                out.push(ch);
                at_word_start = true;
            }
        }
        out
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-label confidences for one face, each within `[0, 1]`.
///
/// Real classifier output covers every class in [`Emotion::CLASSES`] and
/// sums to 1; placeholders carry a single label at 1.0.
#[derive(Clone, Debug, PartialEq)]
pub struct EmotionScores {
    scores: Vec<(Emotion, f32)>,
}

impl EmotionScores {
    /// Maps class probabilities (in [`Emotion::CLASSES`] order) to scores.
    /// Values are clamped into `[0, 1]`; extra entries are ignored.
    pub fn from_probabilities(probabilities: &[f32]) -> Self {
        let scores = Emotion::CLASSES
            .iter()
            .zip(probabilities)
            .map(|(&emotion, &p)| (emotion, sanitize(p)))
            .collect();
        Self { scores }
    }

    pub fn from_pairs(pairs: impl IntoIterator<Item = (Emotion, f32)>) -> Self {
        Self {
            scores: pairs.into_iter().map(|(e, p)| (e, sanitize(p))).collect(),
        }
    }

    /// A single `label` at full confidence.
    pub fn placeholder(label: Emotion) -> Self {
        debug_assert!(label.is_placeholder(), "{label:?} is a real emotion");
        Self {
            scores: vec![(label, 1.0)],
        }
    }

    pub fn get(&self, emotion: Emotion) -> Option<f32> {
        self.scores
            .iter()
            .find(|(e, _)| *e == emotion)
            .map(|&(_, p)| p)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Emotion, f32)> + '_ {
        self.scores.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Highest-scoring label. Ties go to the label listed first.
    pub fn dominant(&self) -> Option<(Emotion, f32)> {
        self.scores.iter().copied().fold(None, |best, (e, p)| match best {
            Some((_, bp)) if bp >= p => best,
            _ => Some((e, p)),
        })
    }

    /// `max(scores)`, or 0 when empty.
    pub fn confidence(&self) -> f32 {
        self.dominant().map(|(_, p)| p).unwrap_or(0.0)
    }
}

fn sanitize(p: f32) -> f32 {
    if p.is_nan() {
        0.0
    } else {
        p.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[test]
    fn test_class_order_matches_model_output() {
        let labels: Vec<_> = Emotion::CLASSES.iter().map(|e| e.as_str()).collect();
        assert_eq!(
            labels,
            ["angry", "disgust", "fear", "happy", "sad", "surprise", "neutral"]
        );
        assert_eq!(Emotion::from_index(3), Some(Emotion::Happy));
        assert_eq!(Emotion::from_index(7), None);
    }

    #[rstest]
    #[case(Emotion::Happy, "Happy")]
    #[case(Emotion::Surprise, "Surprise")]
    #[case(Emotion::Unknown, "Unknown")]
    #[case(Emotion::FaceDetected, "Face_Detected")]
    fn test_title_case(#[case] emotion: Emotion, #[case] expected: &str) {
        assert_eq!(emotion.title_case(), expected);
    }

    #[test]
    fn test_placeholders() {
        assert!(Emotion::Unknown.is_placeholder());
        assert!(Emotion::FaceDetected.is_placeholder());
        assert!(!Emotion::Neutral.is_placeholder());
    }

    #[test]
    fn test_dominant_picks_highest() {
        let scores =
            EmotionScores::from_probabilities(&[0.05, 0.0, 0.05, 0.7, 0.1, 0.05, 0.05]);
        let (emotion, p) = scores.dominant().unwrap();
        assert_eq!(emotion, Emotion::Happy);
        assert_relative_eq!(p, 0.7);
        assert_relative_eq!(scores.confidence(), 0.7);
    }

    #[test]
    fn test_dominant_tie_goes_to_first() {
        let scores = EmotionScores::from_pairs([(Emotion::Sad, 0.5), (Emotion::Fear, 0.5)]);
        assert_eq!(scores.dominant().unwrap().0, Emotion::Sad);
    }

    #[test]
    fn test_from_probabilities_clamps_and_drops_nan() {
        let scores = EmotionScores::from_probabilities(&[1.4, -0.2, f32::NAN]);
        assert_eq!(scores.len(), 3);
        assert_relative_eq!(scores.get(Emotion::Angry).unwrap(), 1.0);
        assert_relative_eq!(scores.get(Emotion::Disgust).unwrap(), 0.0);
        assert_relative_eq!(scores.get(Emotion::Fear).unwrap(), 0.0);
        assert!(scores.get(Emotion::Happy).is_none());
    }

    #[test]
    fn test_placeholder_scores() {
        let scores = EmotionScores::placeholder(Emotion::Unknown);
        assert_eq!(scores.dominant(), Some((Emotion::Unknown, 1.0)));
        assert_eq!(scores.len(), 1);
    }

    #[test]
    fn test_empty_confidence_is_zero() {
        let scores = EmotionScores::from_pairs([]);
        assert!(scores.is_empty());
        assert_eq!(scores.dominant(), None);
        assert_relative_eq!(scores.confidence(), 0.0);
    }
}
