use crate::capture::domain::frame_source::SourceKind;
use crate::detection::domain::detection::Detection;
use crate::detection::domain::emotion::Emotion;
use crate::presentation::domain::display::TextStyle;

pub const NO_FACE_TEXT: &str = "No face detected";

/// Summary text for one frame's detections.
///
/// One face shows its title-cased label and confidence; several faces show
/// the count and the first face's raw label.
pub fn format_results(results: &[Detection]) -> String {
    match results {
        [] => NO_FACE_TEXT.to_string(),
        [only] => {
            let label = if only.dominant_emotion == Emotion::FaceDetected {
                "Face detected".to_string()
            } else {
                only.dominant_emotion.title_case()
            };
            format!("{label}\n(Confidence: {:.2})", only.confidence)
        }
        [first, ..] => format!(
            "{} faces detected\nMain: {}",
            results.len(),
            first.dominant_emotion
        ),
    }
}

pub fn text_style(results: &[Detection], kind: SourceKind) -> TextStyle {
    match (results.is_empty(), kind) {
        (false, _) => TextStyle::Detected,
        (true, SourceKind::Image) => TextStyle::Failed,
        (true, _) => TextStyle::NoFace,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::domain::emotion::EmotionScores;
    use crate::shared::bounding_box::BoundingBox;
    use rstest::rstest;

    fn detection(emotion: Emotion, confidence: f32) -> Detection {
        Detection::new(
            BoundingBox::new(0, 0, 10, 10),
            EmotionScores::from_pairs([(emotion, confidence)]),
        )
        .unwrap()
    }

    #[test]
    fn test_empty() {
        assert_eq!(format_results(&[]), "No face detected");
    }

    #[rstest]
    #[case(Emotion::Happy, 0.87, "Happy\n(Confidence: 0.87)")]
    #[case(Emotion::Neutral, 0.5, "Neutral\n(Confidence: 0.50)")]
    #[case(Emotion::FaceDetected, 1.0, "Face detected\n(Confidence: 1.00)")]
    #[case(Emotion::Unknown, 1.0, "Unknown\n(Confidence: 1.00)")]
    fn test_single(#[case] emotion: Emotion, #[case] confidence: f32, #[case] expected: &str) {
        assert_eq!(format_results(&[detection(emotion, confidence)]), expected);
    }

    #[test]
    fn test_multiple_uses_first_raw_label() {
        let results = [
            detection(Emotion::Surprise, 0.9),
            detection(Emotion::Happy, 0.95),
        ];
        assert_eq!(format_results(&results), "2 faces detected\nMain: surprise");
    }

    #[test]
    fn test_multiple_with_placeholder_main() {
        let results = [
            detection(Emotion::FaceDetected, 1.0),
            detection(Emotion::FaceDetected, 1.0),
            detection(Emotion::FaceDetected, 1.0),
        ];
        assert_eq!(
            format_results(&results),
            "3 faces detected\nMain: face_detected"
        );
    }

    #[rstest]
    #[case(false, SourceKind::Camera, TextStyle::Detected)]
    #[case(false, SourceKind::Image, TextStyle::Detected)]
    #[case(true, SourceKind::Camera, TextStyle::NoFace)]
    #[case(true, SourceKind::Video, TextStyle::NoFace)]
    #[case(true, SourceKind::Image, TextStyle::Failed)]
    fn test_text_style(#[case] empty: bool, #[case] kind: SourceKind, #[case] expected: TextStyle) {
        let results = if empty {
            vec![]
        } else {
            vec![detection(Emotion::Sad, 0.7)]
        };
        assert_eq!(text_style(&results, kind), expected);
    }
}
