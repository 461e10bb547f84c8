pub mod detection;
pub mod emotion;
pub mod emotion_classifier;
pub mod face_locator;
