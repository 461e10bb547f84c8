use std::io;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, TryRecvError};
use thiserror::Error;

use crate::capture::domain::frame_source::{FrameSource, SourceKind};
use crate::capture::infrastructure::camera_source::CameraSource;
use crate::capture::infrastructure::ffmpeg_video_source::FfmpegVideoSource;
use crate::capture::infrastructure::still_image_source::StillImageSource;
use crate::detection::domain::face_locator::LocateError;
use crate::pipeline::capture_loop::{CaptureLoop, LoopContext, LoopOptions};
use crate::pipeline::detection_pipeline::DetectionPipeline;
use crate::pipeline::loop_state::{LoopState, SharedState, StopHandle};
use crate::pipeline::pipeline_logger::{PipelineLogger, StatsPipelineLogger};
use crate::presentation::domain::display::DisplaySink;
use crate::presentation::domain::notification::{notify, Notification, NotificationSender};
use crate::presentation::infrastructure::overlay_renderer::OverlayRenderer;
use crate::shared::config::{ConfigError, PipelineConfig};
use crate::shared::constants::{
    is_image, is_video, ASSUMED_CAMERA_FPS, DEFAULT_DISPLAY_HEIGHT, DEFAULT_DISPLAY_WIDTH,
    MAX_FRAME_HEIGHT, MAX_FRAME_WIDTH, SETTLE_DELAY, STOP_TIMEOUT,
};
use crate::shared::model_resolver::ModelResolveError;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("a capture session is already running")]
    AlreadyRunning,
    #[error("{0}")]
    BadInput(String),
    #[error("pipeline not configured: {0}")]
    NotConfigured(String),
    #[error("failed to spawn capture worker: {0}")]
    Spawn(#[source] io::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    ModelResolve(#[from] ModelResolveError),
    #[error(transparent)]
    Locate(#[from] LocateError),
}

/// Session-level knobs, fixed for the lifetime of a controller.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionConfig {
    pub camera_index: u32,
    pub display_size: (u32, u32),
    pub max_frame_size: (u32, u32),
    /// Cameras rarely report a reliable rate, so this is used instead.
    pub assumed_camera_fps: f64,
    pub settle_delay: Duration,
    /// How long `stop()` waits for the worker to finish.
    pub stop_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            camera_index: 0,
            display_size: (DEFAULT_DISPLAY_WIDTH, DEFAULT_DISPLAY_HEIGHT),
            max_frame_size: (MAX_FRAME_WIDTH, MAX_FRAME_HEIGHT),
            assumed_camera_fps: ASSUMED_CAMERA_FPS,
            settle_delay: SETTLE_DELAY,
            stop_timeout: STOP_TIMEOUT,
        }
    }
}

type LoggerFactory = Box<dyn Fn() -> Box<dyn PipelineLogger> + Send>;

struct ActiveSession {
    kind: SourceKind,
    handle: StopHandle,
    done: Receiver<LoopState>,
    worker: Option<JoinHandle<()>>,
}

/// Start/stop surface for the outer application.
///
/// Owns the detection pipeline, renderer and display sink, and at most one
/// live capture session running on its own worker thread. Still images are
/// processed synchronously on the caller's thread.
pub struct SessionController {
    pipeline: Result<Arc<Mutex<DetectionPipeline>>, String>,
    renderer: Arc<OverlayRenderer>,
    display: Arc<dyn DisplaySink>,
    notifications: NotificationSender,
    config: PipelineConfig,
    session_config: SessionConfig,
    logger_factory: LoggerFactory,
    active: Option<ActiveSession>,
    last_state: LoopState,
}

impl SessionController {
    /// A pipeline that failed to build is kept as an error and reported
    /// each time a session is requested.
    pub fn new(
        pipeline: Result<DetectionPipeline, SessionError>,
        renderer: OverlayRenderer,
        display: Arc<dyn DisplaySink>,
        notifications: NotificationSender,
        config: PipelineConfig,
        session_config: SessionConfig,
    ) -> Self {
        match &pipeline {
            Ok(p) if !p.emotion_model_available() => notify(
                &notifications,
                Notification::info("Emotion model unavailable; faces are shown without emotions"),
            ),
            Ok(_) => {}
            Err(e) => log::error!("Detection pipeline unavailable: {e}"),
        }
        let pipeline = pipeline
            .map(|p| Arc::new(Mutex::new(p)))
            .map_err(|e| e.to_string());
        Self {
            pipeline,
            renderer: Arc::new(renderer),
            display,
            notifications,
            config,
            session_config,
            logger_factory: Box::new(|| Box::new(StatsPipelineLogger::default())),
            active: None,
            last_state: LoopState::Idle,
        }
    }

    pub fn with_logger_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> Box<dyn PipelineLogger> + Send + 'static,
    {
        self.logger_factory = Box::new(factory);
        self
    }

    pub fn pipeline_config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Clamped into `[1, 30]`. A running session keeps its rate; the new
    /// value applies from the next start.
    pub fn set_target_fps(&mut self, fps: u32) -> u32 {
        self.config = self.config.with_target_fps(fps);
        log::info!("Target FPS set to {}", self.config.target_fps());
        self.config.target_fps()
    }

    pub fn open_camera(&mut self) -> Result<StopHandle, SessionError> {
        let index = self.session_config.camera_index;
        let fps = self.session_config.assumed_camera_fps;
        self.start_session(SourceKind::Camera, move || {
            Box::new(CameraSource::new(index, fps)) as Box<dyn FrameSource>
        })
    }

    pub fn open_video(&mut self, path: &Path) -> Result<StopHandle, SessionError> {
        self.ensure_idle()?;
        if !is_video(path) {
            return Err(self.bad_input(format!(
                "Unsupported video format: {}",
                path.display()
            )));
        }
        let path = path.to_path_buf();
        self.start_session(SourceKind::Video, move || {
            Box::new(FfmpegVideoSource::new(path)) as Box<dyn FrameSource>
        })
    }

    /// Processes one image and leaves the result on display. Returns the
    /// final state: `Stopped`, or `Failed` when the image could not be read
    /// (already reported on the notification channel).
    pub fn manual_image(&mut self, path: &Path) -> Result<LoopState, SessionError> {
        self.ensure_idle()?;
        if !is_image(path) {
            return Err(self.bad_input(format!(
                "Unsupported image format: {}",
                path.display()
            )));
        }
        let ctx = self.loop_context()?;
        let mut capture = CaptureLoop::new(
            Box::new(StillImageSource::new(path)),
            SourceKind::Image,
            ctx,
            self.config.clone(),
            (self.logger_factory)(),
        );
        let state = capture.run_still();
        self.last_state = state;
        Ok(state)
    }

    /// Requests a cooperative stop and waits up to `stop_timeout` for the
    /// worker. Safe to call repeatedly or with no session.
    pub fn stop(&mut self) -> LoopState {
        let Some(session) = &self.active else {
            return self.last_state;
        };
        let kind = session.kind;
        if session.handle.request_stop() {
            log::info!("Stopping {kind:?} session");
        }
        match self.wait(self.session_config.stop_timeout) {
            Some(state) => state,
            None => {
                notify(
                    &self.notifications,
                    Notification::warning(format!(
                        "{kind:?} capture is still shutting down after {:?}",
                        self.session_config.stop_timeout
                    )),
                );
                self.state()
            }
        }
    }

    /// Blocks until the current session ends or `timeout` elapses.
    /// `None` means the session is still going.
    pub fn wait(&mut self, timeout: Duration) -> Option<LoopState> {
        let Some(session) = &self.active else {
            return Some(self.last_state);
        };
        let outcome = session.done.recv_timeout(timeout);
        match outcome {
            Ok(state) => Some(self.reap(state)),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => Some(self.reap(LoopState::Failed)),
        }
    }

    /// State of the current session, or of the last one if none is active.
    pub fn state(&self) -> LoopState {
        match &self.active {
            Some(session) => session.handle.state(),
            None => self.last_state,
        }
    }

    pub fn is_running(&self) -> bool {
        self.active.is_some() && !self.state().is_terminal()
    }

    pub(crate) fn start_session<F>(
        &mut self,
        kind: SourceKind,
        factory: F,
    ) -> Result<StopHandle, SessionError>
    where
        F: FnOnce() -> Box<dyn FrameSource> + Send + 'static,
    {
        self.ensure_idle()?;
        let ctx = self.loop_context()?;
        let config = self.config.clone();
        let logger = (self.logger_factory)();
        let state = Arc::new(SharedState::new(LoopState::Idle));
        let handle = StopHandle::new(state.clone());
        let (done_tx, done_rx) = crossbeam_channel::bounded(1);

        let worker = thread::Builder::new()
            .name(format!("capture-{kind:?}").to_lowercase())
            .spawn(move || {
                let mut capture = CaptureLoop::with_state(factory(), kind, ctx, config, logger, state);
                let final_state = capture.run();
                let _ = done_tx.send(final_state);
            })
            .map_err(SessionError::Spawn)?;

        log::info!("{kind:?} session started");
        self.active = Some(ActiveSession {
            kind,
            handle: handle.clone(),
            done: done_rx,
            worker: Some(worker),
        });
        Ok(handle)
    }

    /// Reaps a session that already finished on its own, then refuses to
    /// start if one is still live.
    fn ensure_idle(&mut self) -> Result<(), SessionError> {
        if let Some(session) = &self.active {
            match session.done.try_recv() {
                Ok(state) => {
                    self.reap(state);
                }
                Err(TryRecvError::Disconnected) => {
                    self.reap(LoopState::Failed);
                }
                Err(TryRecvError::Empty) => return Err(SessionError::AlreadyRunning),
            }
        }
        Ok(())
    }

    fn reap(&mut self, state: LoopState) -> LoopState {
        if let Some(mut session) = self.active.take() {
            if let Some(worker) = session.worker.take() {
                if worker.join().is_err() {
                    notify(
                        &self.notifications,
                        Notification::error(format!("{:?} session ended unexpectedly", session.kind)),
                    );
                }
            }
            log::info!("{:?} session ended: {state:?}", session.kind);
        }
        self.last_state = state;
        state
    }

    fn loop_context(&self) -> Result<LoopContext, SessionError> {
        let pipeline = match &self.pipeline {
            Ok(pipeline) => pipeline.clone(),
            Err(reason) => {
                notify(&self.notifications, Notification::error(reason.clone()));
                return Err(SessionError::NotConfigured(reason.clone()));
            }
        };
        Ok(LoopContext {
            pipeline,
            renderer: self.renderer.clone(),
            display: self.display.clone(),
            notifications: self.notifications.clone(),
            options: LoopOptions {
                max_frame_size: self.session_config.max_frame_size,
                display_size: self.session_config.display_size,
                settle_delay: self.session_config.settle_delay,
            },
        })
    }

    fn bad_input(&self, message: String) -> SessionError {
        notify(&self.notifications, Notification::error(message.clone()));
        SessionError::BadInput(message)
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        self.stop();
    }
}
