use std::collections::BTreeMap;
use std::time::Instant;

/// Observer for capture-loop events.
///
/// Decouples the loop from how a caller wants to report progress and
/// stage timings, so the CLI can print a summary while tests stay silent.
pub trait PipelineLogger: Send {
    /// A frame was accepted and processed. `read` counts every frame pulled
    /// from the source, including decimated ones.
    fn progress(&mut self, processed: usize, read: usize);

    /// How long a named stage (`locate`, `classify`, `render`) took.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// A point-in-time value such as the number of faces in a frame.
    fn metric(&mut self, name: &str, value: f64);

    fn info(&mut self, message: &str);

    /// End-of-session report. Default: no-op.
    fn summary(&self) {}
}

/// Discards every event.
pub struct NullPipelineLogger;

impl PipelineLogger for NullPipelineLogger {
    fn progress(&mut self, _processed: usize, _read: usize) {}
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn metric(&mut self, _name: &str, _value: f64) {}
    fn info(&mut self, _message: &str) {}
}

#[derive(Default)]
struct Series {
    count: usize,
    total: f64,
    max: f64,
}

impl Series {
    fn push(&mut self, value: f64) {
        self.count += 1;
        self.total += value;
        self.max = self.max.max(value);
    }

    fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.total / self.count as f64
        }
    }
}

/// Keeps running per-stage timings and metrics and logs a summary through
/// the `log` facade when the session ends.
///
/// Progress is logged every `throttle_frames` processed frames.
pub struct StatsPipelineLogger {
    throttle_frames: usize,
    timings: BTreeMap<String, Series>,
    metrics: BTreeMap<String, Series>,
    start_time: Instant,
    processed: usize,
    read: usize,
}

impl StatsPipelineLogger {
    pub fn new(throttle_frames: usize) -> Self {
        Self {
            throttle_frames: throttle_frames.max(1),
            timings: BTreeMap::new(),
            metrics: BTreeMap::new(),
            start_time: Instant::now(),
            processed: 0,
            read: 0,
        }
    }

    /// Formatted summary, or `None` if nothing was recorded.
    pub fn summary_string(&self) -> Option<String> {
        if self.timings.is_empty() && self.metrics.is_empty() && self.processed == 0 {
            return None;
        }

        let elapsed_s = self.start_time.elapsed().as_secs_f64();
        let mut lines = vec![format!(
            "Session summary ({} of {} frames processed, {:.1}s):",
            self.processed, self.read, elapsed_s
        )];

        for (stage, series) in &self.timings {
            lines.push(format!(
                "  {stage:10}: avg {:6.1}ms  max {:6.1}ms  ({} runs)",
                series.mean(),
                series.max,
                series.count
            ));
        }
        for (name, series) in &self.metrics {
            lines.push(format!("  {name}: avg {:.2}  max {:.0}", series.mean(), series.max));
        }
        if self.processed > 0 && elapsed_s > 0.0 {
            lines.push(format!(
                "  Processing rate: {:.1} fps",
                self.processed as f64 / elapsed_s
            ));
        }
        Some(lines.join("\n"))
    }

    pub fn mean_timing(&self, stage: &str) -> Option<f64> {
        self.timings.get(stage).map(Series::mean)
    }

    pub fn timing_count(&self, stage: &str) -> usize {
        self.timings.get(stage).map_or(0, |s| s.count)
    }

    pub fn mean_metric(&self, name: &str) -> Option<f64> {
        self.metrics.get(name).map(Series::mean)
    }

    pub fn processed(&self) -> usize {
        self.processed
    }
}

impl Default for StatsPipelineLogger {
    fn default() -> Self {
        Self::new(100)
    }
}

impl PipelineLogger for StatsPipelineLogger {
    fn progress(&mut self, processed: usize, read: usize) {
        self.processed = processed;
        self.read = read;
        if processed % self.throttle_frames == 0 {
            log::debug!("Processed {processed} frames ({read} read)");
        }
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        self.timings
            .entry(stage.to_string())
            .or_default()
            .push(duration_ms);
    }

    fn metric(&mut self, name: &str, value: f64) {
        self.metrics.entry(name.to_string()).or_default().push(value);
    }

    fn info(&mut self, message: &str) {
        log::info!("{message}");
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n{text}");
        }
    }
}
