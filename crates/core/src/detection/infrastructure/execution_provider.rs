/// Preferred ONNX execution providers for the current platform.
///
/// ONNX Runtime falls back to CPU when the listed provider cannot be
/// registered, so an empty list simply means CPU.
pub fn preferred_execution_providers() -> Vec<ort::execution_providers::ExecutionProviderDispatch> {
    #[cfg(target_os = "macos")]
    {
        vec![ort::execution_providers::CoreMLExecutionProvider::default().build()]
    }
    #[cfg(target_os = "windows")]
    {
        vec![ort::execution_providers::DirectMLExecutionProvider::default().build()]
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        vec![]
    }
}

/// Maps a `log` filter onto the runtime's own severity scale.
pub fn runtime_log_level(filter: log::LevelFilter) -> ort::logging::LogLevel {
    use ort::logging::LogLevel;
    match filter {
        log::LevelFilter::Off => LogLevel::Fatal,
        log::LevelFilter::Error => LogLevel::Error,
        log::LevelFilter::Warn => LogLevel::Warning,
        log::LevelFilter::Info => LogLevel::Info,
        log::LevelFilter::Debug | log::LevelFilter::Trace => LogLevel::Verbose,
    }
}
