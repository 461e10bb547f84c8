use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use crate::capture::domain::frame_source::{FrameSource, SourceKind};
use crate::pipeline::detection_pipeline::{DetectionPipeline, FrameProcessingError};
use crate::pipeline::loop_state::{LoopState, SharedState, StopHandle};
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::pipeline::rate_controller::RateController;
use crate::presentation::domain::display::{DisplayCommand, DisplaySink};
use crate::presentation::domain::notification::{notify, Notification, NotificationSender};
use crate::presentation::domain::result_presenter::{format_results, text_style};
use crate::presentation::infrastructure::overlay_renderer::{title_for, OverlayRenderer};
use crate::presentation::infrastructure::scaling::{letterbox, resize_frame};
use crate::shared::config::PipelineConfig;
use crate::shared::constants::{
    DEFAULT_DISPLAY_HEIGHT, DEFAULT_DISPLAY_WIDTH, LETTERBOX_FILL, MAX_FRAME_HEIGHT,
    MAX_FRAME_WIDTH, SETTLE_DELAY,
};
use crate::shared::frame::Frame;
use crate::shared::panic_payload::panic_message;

/// Consecutive transient read failures tolerated before the source is
/// treated as lost.
pub const MAX_CONSECUTIVE_READ_ERRORS: u32 = 25;

#[derive(Clone, Debug, PartialEq)]
pub struct LoopOptions {
    /// Frames are shrunk to fit this before detection.
    pub max_frame_size: (u32, u32),
    /// Exact size of every image published to the display.
    pub display_size: (u32, u32),
    /// Pause between clearing the display and reporting `Stopped`.
    pub settle_delay: Duration,
}

impl Default for LoopOptions {
    fn default() -> Self {
        Self {
            max_frame_size: (MAX_FRAME_WIDTH, MAX_FRAME_HEIGHT),
            display_size: (DEFAULT_DISPLAY_WIDTH, DEFAULT_DISPLAY_HEIGHT),
            settle_delay: SETTLE_DELAY,
        }
    }
}

/// Collaborators shared by every session of one controller.
#[derive(Clone)]
pub struct LoopContext {
    pub pipeline: Arc<Mutex<DetectionPipeline>>,
    pub renderer: Arc<OverlayRenderer>,
    pub display: Arc<dyn DisplaySink>,
    pub notifications: NotificationSender,
    pub options: LoopOptions,
}

/// Drives one capture session: owns the source, decimates, runs the
/// detection pipeline, renders and publishes.
///
/// The loop is the only writer of its [`LoopState`]; others get a
/// [`StopHandle`]. A stop request is observed at the top of the next
/// [`CaptureLoop::step`], so at most the frame in flight completes.
pub struct CaptureLoop {
    source: Box<dyn FrameSource>,
    kind: SourceKind,
    ctx: LoopContext,
    config: PipelineConfig,
    logger: Box<dyn PipelineLogger>,
    state: Arc<SharedState>,
    rate: Option<RateController>,
    pending: Option<Frame>,
    processed: usize,
    read_errors: u32,
}

impl CaptureLoop {
    /// `config` is captured here and stays fixed for the whole session.
    pub fn new(
        source: Box<dyn FrameSource>,
        kind: SourceKind,
        ctx: LoopContext,
        config: PipelineConfig,
        logger: Box<dyn PipelineLogger>,
    ) -> Self {
        Self::with_state(
            source,
            kind,
            ctx,
            config,
            logger,
            Arc::new(SharedState::new(LoopState::Idle)),
        )
    }

    pub(crate) fn with_state(
        source: Box<dyn FrameSource>,
        kind: SourceKind,
        ctx: LoopContext,
        config: PipelineConfig,
        logger: Box<dyn PipelineLogger>,
        state: Arc<SharedState>,
    ) -> Self {
        Self {
            source,
            kind,
            ctx,
            config,
            logger,
            state,
            rate: None,
            pending: None,
            processed: 0,
            read_errors: 0,
        }
    }

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle::new(self.state.clone())
    }

    pub fn state(&self) -> LoopState {
        self.state.load()
    }

    /// Number of frames that made it through detection and were published.
    pub fn processed(&self) -> usize {
        self.processed
    }

    /// Idle -> Running, then opens the source and reads the first frame.
    ///
    /// Either failure moves to `Failed` and raises an error notification.
    /// A stop requested before start leaves the source unopened.
    pub fn start(&mut self) -> LoopState {
        if !self.state.transition(LoopState::Idle, LoopState::Running) {
            return self.state.load();
        }

        let info = match self.source.open() {
            Ok(info) => info,
            Err(e) => return self.fail(format!("{}: {e}", self.open_failure_prefix())),
        };
        match self.source.read() {
            Ok(Some(frame)) => self.pending = Some(frame),
            Ok(None) => {
                return self.fail(format!(
                    "{}: no frames could be read",
                    self.open_failure_prefix()
                ))
            }
            Err(e) => return self.fail(format!("{}: {e}", self.open_failure_prefix())),
        }

        let rate = RateController::new(info.native_fps, self.config.target_fps());
        self.logger.info(&format!(
            "{:?} source {}x{} @ {:.2} fps: processing every {} frame(s) (target {} fps)",
            info.kind,
            info.width,
            info.height,
            info.native_fps,
            rate.frame_skip(),
            self.config.target_fps()
        ));
        self.kind = info.kind;
        self.rate = Some(rate);
        self.read_errors = 0;
        self.state.load()
    }

    /// One iteration: read, decimate, process, publish.
    ///
    /// End of stream or a lost source moves to `Stopping`. A frame that
    /// fails to process is skipped and the loop stays `Running`.
    pub fn step(&mut self) -> LoopState {
        if self.state.load() != LoopState::Running {
            return self.state.load();
        }

        let next = match self.pending.take() {
            Some(frame) => Ok(Some(frame)),
            None => self.source.read(),
        };
        let frame = match next {
            Ok(Some(frame)) => {
                self.read_errors = 0;
                frame
            }
            Ok(None) => {
                log::info!("End of stream");
                return self.begin_stopping();
            }
            Err(e) if e.is_transient() && self.read_errors < MAX_CONSECUTIVE_READ_ERRORS => {
                self.read_errors += 1;
                log::warn!("Skipping unreadable frame: {e}");
                return self.state.load();
            }
            Err(e) => {
                log::warn!("Capture source lost: {e}");
                return self.begin_stopping();
            }
        };

        let Some(rate) = self.rate.as_mut() else {
            return self.state.load();
        };
        if !rate.accept() {
            return self.state.load();
        }
        let read = rate.counter() as usize;

        let index = frame.index();
        match self.process_guarded(frame) {
            Ok(()) => {
                self.processed += 1;
                self.logger.progress(self.processed, read);
            }
            Err(e) if self.kind == SourceKind::Image => {
                notify(
                    &self.ctx.notifications,
                    Notification::error(format!("Image processing failed: {e}")),
                );
            }
            Err(e) => log::warn!("Skipping frame {index}: {e}"),
        }
        self.state.load()
    }

    /// Releases the source, clears the display, waits `settle_delay`, then
    /// reports `Stopped`. A failed session stays `Failed`.
    pub fn finish(&mut self) -> LoopState {
        self.source.close();
        if self.state.load().is_terminal() {
            return self.state.load();
        }
        self.state.store(LoopState::Stopping);
        self.ctx.display.publish(DisplayCommand::Clear);
        thread::sleep(self.ctx.options.settle_delay);
        self.state.store(LoopState::Stopped);
        self.logger.summary();
        LoopState::Stopped
    }

    /// Runs a live session to completion.
    pub fn run(&mut self) -> LoopState {
        self.start();
        while self.step() == LoopState::Running {}
        self.finish()
    }

    /// Processes a single still frame and leaves it on display.
    pub fn run_still(&mut self) -> LoopState {
        if self.start() == LoopState::Running {
            self.step();
        }
        self.source.close();
        if !self.state.load().is_terminal() {
            self.state.store(LoopState::Stopped);
        }
        self.state.load()
    }

    fn begin_stopping(&mut self) -> LoopState {
        self.state.transition(LoopState::Running, LoopState::Stopping);
        self.state.load()
    }

    fn fail(&mut self, message: String) -> LoopState {
        self.source.close();
        self.state.store(LoopState::Failed);
        notify(&self.ctx.notifications, Notification::error(message));
        LoopState::Failed
    }

    fn open_failure_prefix(&self) -> &'static str {
        match self.kind {
            SourceKind::Camera => "Could not start the camera",
            SourceKind::Video => "Could not open the video",
            SourceKind::Image => "Could not read the image file",
        }
    }

    fn process_guarded(&mut self, frame: Frame) -> Result<(), FrameProcessingError> {
        panic::catch_unwind(AssertUnwindSafe(|| self.process_frame(frame)))
            .unwrap_or_else(|payload| Err(FrameProcessingError::Panicked(panic_message(&*payload))))
    }

    fn process_frame(&mut self, frame: Frame) -> Result<(), FrameProcessingError> {
        let (max_w, max_h) = self.ctx.options.max_frame_size;
        let frame = resize_frame(frame, max_w, max_h);

        let results = {
            let mut pipeline = self
                .ctx
                .pipeline
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            pipeline.process_logged(&frame, &self.config, self.logger.as_mut())?
        };

        let t0 = Instant::now();
        let title = title_for(self.kind, self.config.target_fps());
        let annotated = self.ctx.renderer.render(&frame, &results, &title);
        let (dw, dh) = self.ctx.options.display_size;
        let image = letterbox(&annotated, dw, dh, LETTERBOX_FILL);
        self.logger
            .timing("render", t0.elapsed().as_secs_f64() * 1000.0);

        self.ctx.display.publish(DisplayCommand::Show {
            image,
            text: format_results(&results),
            style: text_style(&results, self.kind),
        });
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::capture::domain::frame_source::{SourceError, SourceInfo};
    use crate::detection::domain::emotion_classifier::EmotionModel;
    use crate::detection::domain::face_locator::{FaceLocator, LocateError, LocatorParams};
    use crate::pipeline::detection_pipeline::tests::{FixedLocator, FlakyLocator};
    use crate::pipeline::pipeline_logger::NullPipelineLogger;
    use crate::presentation::domain::display::TextStyle;
    use crate::presentation::domain::notification::{notification_channel, Severity};
    use crate::shared::bounding_box::BoundingBox;
    use crossbeam_channel::Receiver;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};

    pub(crate) type Script = VecDeque<Result<Option<Frame>, SourceError>>;

    /// Replays a scripted sequence of reads. Counts reads and real releases.
    pub(crate) struct FakeSource {
        pub kind: SourceKind,
        pub native_fps: f64,
        pub fail_open: bool,
        pub script: Script,
        pub open: bool,
        pub reads: Arc<AtomicUsize>,
        pub releases: Arc<AtomicUsize>,
    }

    impl FakeSource {
        pub(crate) fn frames(kind: SourceKind, native_fps: f64, count: usize) -> Self {
            let script = (0..count).map(|i| Ok(Some(test_frame(i)))).collect();
            Self::scripted(kind, native_fps, script)
        }

        pub(crate) fn scripted(kind: SourceKind, native_fps: f64, script: Script) -> Self {
            Self {
                kind,
                native_fps,
                fail_open: false,
                script,
                open: false,
                reads: Arc::new(AtomicUsize::new(0)),
                releases: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    impl FrameSource for FakeSource {
        fn open(&mut self) -> Result<SourceInfo, SourceError> {
            if self.fail_open {
                return Err(SourceError::Open {
                    target: "fake".into(),
                    reason: "no device".into(),
                });
            }
            self.open = true;
            Ok(SourceInfo {
                kind: self.kind,
                native_fps: self.native_fps,
                width: 64,
                height: 48,
            })
        }

        fn read(&mut self) -> Result<Option<Frame>, SourceError> {
            if !self.open {
                return Err(SourceError::NotOpen);
            }
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.script.pop_front().unwrap_or(Ok(None))
        }

        fn close(&mut self) {
            if self.open {
                self.open = false;
                self.releases.fetch_add(1, Ordering::SeqCst);
            }
        }

        fn is_open(&self) -> bool {
            self.open
        }
    }

    /// Keeps every published command.
    #[derive(Clone, Default)]
    pub(crate) struct RecordingSink(pub Arc<Mutex<Vec<DisplayCommand>>>);

    impl RecordingSink {
        pub(crate) fn commands(&self) -> Vec<DisplayCommand> {
            self.0.lock().unwrap().clone()
        }

        pub(crate) fn shows(&self) -> Vec<(String, TextStyle)> {
            self.commands()
                .into_iter()
                .filter_map(|c| match c {
                    DisplayCommand::Show { text, style, .. } => Some((text, style)),
                    DisplayCommand::Clear => None,
                })
                .collect()
        }
    }

    impl DisplaySink for RecordingSink {
        fn publish(&self, command: DisplayCommand) {
            self.0.lock().unwrap().push(command);
        }
    }

    struct PanickingLocator;

    impl FaceLocator for PanickingLocator {
        fn locate(
            &mut self,
            frame: &Frame,
            _params: &LocatorParams,
        ) -> Result<Vec<BoundingBox>, LocateError> {
            if frame.index() == 1 {
                panic!("detector blew up");
            }
            Ok(vec![])
        }
    }

    pub(crate) fn test_frame(index: usize) -> Frame {
        Frame::new(vec![90; 64 * 48 * 3], 64, 48, index)
    }

    pub(crate) fn test_options() -> LoopOptions {
        LoopOptions {
            max_frame_size: (800, 600),
            display_size: (80, 60),
            settle_delay: Duration::ZERO,
        }
    }

    fn context(
        locator: Box<dyn FaceLocator>,
    ) -> (LoopContext, RecordingSink, Receiver<Notification>) {
        let sink = RecordingSink::default();
        let (tx, rx) = notification_channel();
        let ctx = LoopContext {
            pipeline: Arc::new(Mutex::new(DetectionPipeline::new(
                locator,
                EmotionModel::Unavailable,
            ))),
            renderer: Arc::new(OverlayRenderer::new(None)),
            display: Arc::new(sink.clone()),
            notifications: tx,
            options: test_options(),
        };
        (ctx, sink, rx)
    }

    fn one_face() -> Box<dyn FaceLocator> {
        Box::new(FixedLocator(vec![BoundingBox::new(5, 5, 20, 20)]))
    }

    fn config(target_fps: u32) -> PipelineConfig {
        PipelineConfig::default().with_target_fps(target_fps)
    }

    fn capture_loop(source: FakeSource, ctx: LoopContext, target_fps: u32) -> CaptureLoop {
        let kind = source.kind;
        CaptureLoop::new(
            Box::new(source),
            kind,
            ctx,
            config(target_fps),
            Box::new(NullPipelineLogger),
        )
    }

    #[test]
    fn test_runs_every_frame_then_clears_and_stops() {
        let (ctx, sink, rx) = context(one_face());
        let source = FakeSource::frames(SourceKind::Video, 10.0, 4);
        let releases = source.releases.clone();
        let mut lp = capture_loop(source, ctx, 10);

        assert_eq!(lp.run(), LoopState::Stopped);
        assert_eq!(lp.processed(), 4);
        let commands = sink.commands();
        assert_eq!(commands.len(), 5);
        assert_eq!(commands.last(), Some(&DisplayCommand::Clear));
        assert!(sink
            .shows()
            .iter()
            .all(|(text, style)| text == "Face detected\n(Confidence: 1.00)"
                && *style == TextStyle::Detected));
        assert_eq!(releases.load(Ordering::SeqCst), 1);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_decimates_to_target_rate() {
        let (ctx, sink, _rx) = context(one_face());
        let source = FakeSource::frames(SourceKind::Camera, 30.0, 9);
        let mut lp = capture_loop(source, ctx, 10);
        lp.run();
        assert_eq!(sink.shows().len(), 3);
    }

    #[test]
    fn test_open_failure_fails_and_notifies() {
        let (ctx, sink, rx) = context(one_face());
        let mut source = FakeSource::frames(SourceKind::Camera, 30.0, 3);
        source.fail_open = true;
        let reads = source.reads.clone();
        let mut lp = capture_loop(source, ctx, 10);

        assert_eq!(lp.run(), LoopState::Failed);
        assert_eq!(reads.load(Ordering::SeqCst), 0);
        assert!(sink.commands().is_empty());
        let n = rx.try_recv().unwrap();
        assert_eq!(n.severity, Severity::Error);
        assert!(n.message.starts_with("Could not start the camera"));
    }

    #[test]
    fn test_missing_first_frame_fails() {
        let (ctx, sink, rx) = context(one_face());
        let source = FakeSource::frames(SourceKind::Video, 30.0, 0);
        let releases = source.releases.clone();
        let mut lp = capture_loop(source, ctx, 10);

        assert_eq!(lp.start(), LoopState::Failed);
        assert_eq!(lp.step(), LoopState::Failed);
        assert_eq!(lp.finish(), LoopState::Failed);
        assert_eq!(releases.load(Ordering::SeqCst), 1);
        assert!(sink.commands().is_empty());
        assert!(rx.try_recv().unwrap().message.contains("no frames"));
    }

    #[test]
    fn test_bad_frame_is_skipped_and_loop_keeps_running() {
        let (ctx, sink, rx) = context(Box::new(FlakyLocator {
            fail_on: vec![1],
            bbox: BoundingBox::new(0, 0, 10, 10),
        }));
        let source = FakeSource::frames(SourceKind::Video, 10.0, 3);
        let mut lp = capture_loop(source, ctx, 10);

        assert_eq!(lp.start(), LoopState::Running);
        assert_eq!(lp.step(), LoopState::Running);
        assert_eq!(lp.step(), LoopState::Running);
        assert_eq!(lp.step(), LoopState::Running);
        assert_eq!(lp.processed(), 2);
        assert_eq!(sink.shows().len(), 2);
        assert!(rx.try_recv().is_err());

        assert_eq!(lp.step(), LoopState::Stopping);
        assert_eq!(lp.finish(), LoopState::Stopped);
    }

    #[test]
    fn test_panicking_detector_only_costs_one_frame() {
        let (ctx, sink, _rx) = context(Box::new(PanickingLocator));
        let source = FakeSource::frames(SourceKind::Video, 10.0, 3);
        let mut lp = capture_loop(source, ctx, 10);
        assert_eq!(lp.run(), LoopState::Stopped);
        assert_eq!(lp.processed(), 2);
        assert_eq!(sink.shows().len(), 2);
    }

    #[test]
    fn test_stop_is_observed_before_next_read() {
        let (ctx, sink, _rx) = context(one_face());
        let source = FakeSource::frames(SourceKind::Camera, 30.0, 100);
        let reads = source.reads.clone();
        let releases = source.releases.clone();
        let mut lp = capture_loop(source, ctx, 30);
        let handle = lp.stop_handle();

        lp.start();
        lp.step();
        let reads_at_stop = reads.load(Ordering::SeqCst);
        assert!(handle.request_stop());
        assert!(!handle.request_stop());

        assert_eq!(lp.step(), LoopState::Stopping);
        assert_eq!(reads.load(Ordering::SeqCst), reads_at_stop);
        assert_eq!(lp.finish(), LoopState::Stopped);
        assert_eq!(lp.finish(), LoopState::Stopped);
        assert_eq!(releases.load(Ordering::SeqCst), 1);
        assert_eq!(sink.shows().len(), 1);
        assert_eq!(handle.state(), LoopState::Stopped);
    }

    #[test]
    fn test_stop_before_start_never_opens_source() {
        let (ctx, sink, _rx) = context(one_face());
        let source = FakeSource::frames(SourceKind::Camera, 30.0, 5);
        let reads = source.reads.clone();
        let mut lp = capture_loop(source, ctx, 10);
        lp.stop_handle().request_stop();

        assert_eq!(lp.run(), LoopState::Stopped);
        assert_eq!(reads.load(Ordering::SeqCst), 0);
        assert_eq!(sink.commands(), vec![DisplayCommand::Clear]);
    }

    #[test]
    fn test_transient_read_errors_are_skipped() {
        let (ctx, sink, _rx) = context(one_face());
        let script: Script = VecDeque::from([
            Ok(Some(test_frame(0))),
            Err(SourceError::Decode("glitch".into())),
            Ok(Some(test_frame(2))),
        ]);
        let source = FakeSource::scripted(SourceKind::Video, 10.0, script);
        let mut lp = capture_loop(source, ctx, 10);
        assert_eq!(lp.run(), LoopState::Stopped);
        assert_eq!(sink.shows().len(), 2);
    }

    #[test]
    fn test_disconnect_stops_session() {
        let (ctx, sink, rx) = context(one_face());
        let script: Script = VecDeque::from([
            Ok(Some(test_frame(0))),
            Err(SourceError::Disconnected("unplugged".into())),
            Ok(Some(test_frame(2))),
        ]);
        let source = FakeSource::scripted(SourceKind::Camera, 10.0, script);
        let mut lp = capture_loop(source, ctx, 10);
        assert_eq!(lp.run(), LoopState::Stopped);
        assert_eq!(sink.shows().len(), 1);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_endless_decode_errors_eventually_stop() {
        let (ctx, _sink, _rx) = context(one_face());
        let mut script: Script = VecDeque::from([Ok(Some(test_frame(0)))]);
        for _ in 0..=MAX_CONSECUTIVE_READ_ERRORS {
            script.push_back(Err(SourceError::Decode("bad".into())));
        }
        script.push_back(Ok(Some(test_frame(99))));
        let source = FakeSource::scripted(SourceKind::Video, 10.0, script);
        let mut lp = capture_loop(source, ctx, 10);
        assert_eq!(lp.run(), LoopState::Stopped);
        assert_eq!(lp.processed(), 1);
    }

    #[test]
    fn test_published_images_are_letterboxed_to_display_size() {
        let (ctx, sink, _rx) = context(one_face());
        let source = FakeSource::frames(SourceKind::Video, 10.0, 1);
        let mut lp = capture_loop(source, ctx, 10);
        lp.run();
        match &sink.commands()[0] {
            DisplayCommand::Show { image, .. } => assert_eq!(image.dimensions(), (80, 60)),
            other => panic!("expected Show, got {other:?}"),
        }
    }

    #[test]
    fn test_still_image_without_face_is_red_and_stays_displayed() {
        let (ctx, sink, rx) = context(Box::new(FixedLocator(vec![])));
        let source = FakeSource::frames(SourceKind::Image, 1.0, 1);
        let mut lp = capture_loop(source, ctx, 10);

        assert_eq!(lp.run_still(), LoopState::Stopped);
        assert_eq!(
            sink.shows(),
            vec![("No face detected".to_string(), TextStyle::Failed)]
        );
        assert!(!sink.commands().contains(&DisplayCommand::Clear));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_still_image_processing_error_is_notified() {
        let (ctx, _sink, rx) = context(Box::new(FlakyLocator {
            fail_on: vec![0],
            bbox: BoundingBox::new(0, 0, 10, 10),
        }));
        let source = FakeSource::frames(SourceKind::Image, 1.0, 1);
        let mut lp = capture_loop(source, ctx, 10);
        lp.run_still();
        let n = rx.try_recv().unwrap();
        assert_eq!(n.severity, Severity::Error);
        assert!(n.message.starts_with("Image processing failed"));
    }

    #[test]
    fn test_live_session_without_faces_is_yellow() {
        let (ctx, sink, _rx) = context(Box::new(FixedLocator(vec![])));
        let source = FakeSource::frames(SourceKind::Camera, 10.0, 1);
        let mut lp = capture_loop(source, ctx, 10);
        lp.run();
        assert_eq!(
            sink.shows(),
            vec![("No face detected".to_string(), TextStyle::NoFace)]
        );
    }

    #[test]
    fn test_placeholder_label_survives_any_threshold() {
        let (ctx, sink, _rx) = context(one_face());
        let source = FakeSource::frames(SourceKind::Video, 10.0, 1);
        let mut lp = CaptureLoop::new(
            Box::new(source),
            SourceKind::Video,
            ctx,
            PipelineConfig::new(5, 1.1, (30, 30), 1.0, 10).unwrap(),
            Box::new(NullPipelineLogger),
        );
        lp.run();
        assert_eq!(
            sink.shows(),
            vec![("Face detected\n(Confidence: 1.00)".to_string(), TextStyle::Detected)]
        );
    }
}
