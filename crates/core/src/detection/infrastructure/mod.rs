pub mod execution_provider;
pub mod math;
pub mod onnx_emotion_classifier;
pub mod seeta_face_locator;
