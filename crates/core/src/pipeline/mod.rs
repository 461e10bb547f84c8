pub mod capture_loop;
pub mod detection_pipeline;
pub mod loop_state;
pub mod pipeline_factory;
pub mod pipeline_logger;
pub mod rate_controller;
pub mod session;
