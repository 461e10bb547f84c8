mod settings;

use std::error::Error;
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use clap::{Parser, Subcommand};
use crossbeam_channel::Receiver;
use image::RgbImage;

use moodlens_core::detection::domain::emotion_classifier::ModelLoadOptions;
use moodlens_core::pipeline::loop_state::{LoopState, StopHandle};
use moodlens_core::pipeline::pipeline_factory::{build_pipeline, ModelSources};
use moodlens_core::pipeline::session::{SessionConfig, SessionController, SessionError};
use moodlens_core::presentation::domain::display::DisplayCommand;
use moodlens_core::presentation::domain::notification::{notification_channel, Notification};
use moodlens_core::presentation::infrastructure::display_channel::display_channel;
use moodlens_core::presentation::infrastructure::overlay_renderer::OverlayRenderer;
use moodlens_core::shared::config::{PipelineConfig, DEFAULT_TARGET_FPS};
use moodlens_core::shared::model_resolver::{self, AppDirs, ModelResolveError};

use settings::Settings;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Facial emotion detection for cameras, videos and still images.
#[derive(Parser)]
#[command(name = "moodlens", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Frames processed per second (1-30).
    #[arg(long, global = true)]
    target_fps: Option<u32>,

    /// Minimum emotion confidence to report a face (0.0-1.0).
    #[arg(long, global = true)]
    confidence: Option<f32>,

    /// Detector strictness; higher finds fewer, surer faces.
    #[arg(long, global = true)]
    min_neighbors: Option<u32>,

    /// Detection window growth per pyramid level (> 1.0).
    #[arg(long, global = true)]
    scale_factor: Option<f64>,

    /// Smallest face to look for, as WxH.
    #[arg(long, global = true, value_parser = parse_size)]
    min_face_size: Option<(u32, u32)>,

    /// Directory holding the model files.
    #[arg(long, global = true)]
    weights_dir: Option<PathBuf>,

    /// Directory for saved results.
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,

    /// TrueType font for labels.
    #[arg(long, global = true)]
    font: Option<PathBuf>,

    /// Download URL for the emotion model if it is not on disk.
    #[arg(long, global = true)]
    emotion_model_url: Option<String>,

    /// Persist the effective settings.
    #[arg(long, global = true)]
    save_settings: bool,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Command {
    /// Live detection from a camera. Press Enter to stop.
    Camera {
        /// Camera device index.
        #[arg(long)]
        index: Option<u32>,
    },
    /// Detection on a video file, until it ends or Enter is pressed.
    Video { path: PathBuf },
    /// Detection on a single image.
    Image { path: PathBuf },
}

impl Cli {
    /// Flags win over stored settings.
    fn apply(&self, mut settings: Settings) -> Settings {
        if let Some(v) = self.target_fps {
            settings.target_fps = v;
        }
        if let Some(v) = self.confidence {
            settings.confidence = v;
        }
        if let Some(v) = self.min_neighbors {
            settings.min_neighbors = v;
        }
        if let Some(v) = self.scale_factor {
            settings.scale_factor = v;
        }
        if let Some(v) = self.min_face_size {
            settings.min_face_size = v;
        }
        if let Command::Camera { index: Some(i) } = self.command {
            settings.camera_index = i;
        }
        if self.weights_dir.is_some() {
            settings.weights_dir = self.weights_dir.clone();
        }
        if self.output_dir.is_some() {
            settings.output_dir = self.output_dir.clone();
        }
        if self.font.is_some() {
            settings.font = self.font.clone();
        }
        if self.emotion_model_url.is_some() {
            settings.emotion_model_url = self.emotion_model_url.clone();
        }
        settings
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let settings = cli.apply(Settings::load());
    if cli.save_settings {
        let path = settings.save()?;
        log::info!("Settings saved to {}", path.display());
    }

    let config = PipelineConfig::new(
        settings.min_neighbors,
        settings.scale_factor,
        settings.min_face_size,
        settings.confidence,
        DEFAULT_TARGET_FPS,
    )?
    .with_target_fps(settings.target_fps);

    let dirs = app_dirs(&settings)?;
    dirs.ensure_exist()?;

    let (notify_tx, notify_rx) = notification_channel();
    let printer = spawn_notification_printer(notify_rx)?;
    let (display_tx, display_rx) = display_channel();
    let display = spawn_display(display_rx)?;

    let sources = ModelSources {
        cache_dir: model_resolver::shared_cache_dir(),
        face_model_url: None,
        emotion_model_url: settings.emotion_model_url.clone(),
        load_options: ModelLoadOptions {
            log_level: log::max_level().min(log::LevelFilter::Warn),
        },
    };
    let mut controller = SessionController::new(
        build_pipeline(&dirs, &sources),
        OverlayRenderer::with_font_search(settings.font.as_deref()),
        Arc::new(display_tx),
        notify_tx,
        config,
        SessionConfig {
            camera_index: settings.camera_index,
            ..SessionConfig::default()
        },
    );

    let outcome = match &cli.command {
        Command::Camera { .. } => run_live(&mut controller, |c| c.open_camera()),
        Command::Video { path } => run_live(&mut controller, |c| c.open_video(path)),
        Command::Image { path } => controller.manual_image(path),
    };

    // Closes both channels so the helper threads drain and exit.
    drop(controller);
    let last_image = display.join().map_err(|_| "display thread panicked")?;
    let _ = printer.join();

    let state = match outcome {
        Ok(state) => state,
        // Already reported on the notification channel.
        Err(SessionError::BadInput(_) | SessionError::NotConfigured(_)) => LoopState::Failed,
        Err(e) => return Err(e.into()),
    };

    if let Some(image) = last_image {
        let path = dirs.output_dir.join(output_file_name(&cli.command));
        image.save(&path)?;
        log::info!("Last result written to {}", path.display());
    }

    match state {
        LoopState::Failed => Err("session failed".into()),
        _ => Ok(()),
    }
}

/// Starts a live session and blocks until it ends or Enter is pressed.
fn run_live<F>(controller: &mut SessionController, start: F) -> Result<LoopState, SessionError>
where
    F: FnOnce(&mut SessionController) -> Result<StopHandle, SessionError>,
{
    start(controller)?;
    eprintln!("Press Enter to stop.");
    let enter = spawn_enter_listener();
    loop {
        if let Some(state) = controller.wait(POLL_INTERVAL) {
            return Ok(state);
        }
        if enter.try_recv().is_ok() {
            return Ok(controller.stop());
        }
    }
}

fn spawn_enter_listener() -> Receiver<()> {
    let (tx, rx) = crossbeam_channel::bounded(1);
    let _ = thread::Builder::new().name("stdin".into()).spawn(move || {
        let mut line = String::new();
        if std::io::stdin().lock().read_line(&mut line).is_ok() {
            let _ = tx.send(());
        }
    });
    rx
}

/// Stands in for the display widget: logs every change of summary text
/// and keeps the last image shown.
fn spawn_display(rx: Receiver<DisplayCommand>) -> std::io::Result<JoinHandle<Option<RgbImage>>> {
    thread::Builder::new().name("display".into()).spawn(move || {
        let mut last_text: Option<String> = None;
        let mut last_image = None;
        for command in rx.iter() {
            match command {
                DisplayCommand::Show { image, text, style } => {
                    if last_text.as_deref() != Some(text.as_str()) {
                        let [r, g, b] = style.rgb();
                        log::info!("[#{r:02x}{g:02x}{b:02x}] {}", text.replace('\n', " "));
                        last_text = Some(text);
                    }
                    last_image = Some(image);
                }
                DisplayCommand::Clear => {
                    log::debug!("Display cleared");
                    last_text = None;
                }
            }
        }
        last_image
    })
}

fn spawn_notification_printer(rx: Receiver<Notification>) -> std::io::Result<JoinHandle<()>> {
    thread::Builder::new().name("notifications".into()).spawn(move || {
        for n in rx.iter() {
            eprintln!("[{}] {}", n.severity.as_str().to_uppercase(), n.message);
        }
    })
}

fn app_dirs(settings: &Settings) -> Result<AppDirs, ModelResolveError> {
    if let (Some(weights_dir), Some(output_dir)) = (&settings.weights_dir, &settings.output_dir) {
        return Ok(AppDirs {
            weights_dir: weights_dir.clone(),
            output_dir: output_dir.clone(),
        });
    }
    let defaults = AppDirs::platform_default()?;
    Ok(AppDirs {
        weights_dir: settings.weights_dir.clone().unwrap_or(defaults.weights_dir),
        output_dir: settings.output_dir.clone().unwrap_or(defaults.output_dir),
    })
}

fn output_file_name(command: &Command) -> String {
    let stem = |path: &Path| {
        path.file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "output".to_string())
    };
    match command {
        Command::Camera { .. } => "camera_last_frame.png".to_string(),
        Command::Video { path } => format!("{}_last_frame.png", stem(path)),
        Command::Image { path } => format!("{}_emotions.png", stem(path)),
    }
}

fn parse_size(s: &str) -> Result<(u32, u32), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WxH, got '{s}'"))?;
    let w: u32 = w.trim().parse().map_err(|_| format!("bad width in '{s}'"))?;
    let h: u32 = h.trim().parse().map_err(|_| format!("bad height in '{s}'"))?;
    if w == 0 || h == 0 {
        return Err(format!("size must be positive, got '{s}'"));
    }
    Ok((w, h))
}
