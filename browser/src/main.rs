//! Shelf Browser - product category browser with camera swipe scrolling
//!
//! Twelve grocery categories laid out as full-screen snap panels; a
//! vertical hand swipe in front of the camera scrolls one panel.

mod backend;
mod catalog;
mod console;
mod gesture;
mod scroll;
mod state;
mod view;

use clap::Parser;
use tracing::info;

use backend::sim::{SimCamera, SimConfig, SimDetectorBackend};
use gesture::camera::{CameraError, FacingMode, StreamConstraints};
use gesture::detector::{DetectorOptions, ModelComplexity};
use gesture::{ClassifierConfig, GestureSession, SessionConfig};
use state::HostConfig;
use view::Layout;

#[derive(Parser, Debug)]
#[command(name = "shelf-browser", about = "Product category browser with gesture scrolling")]
struct Cli {
    /// Page layout: vertical, horizontal, or split
    #[arg(long, default_value = "vertical")]
    layout: String,

    /// Start gesture control at launch
    #[arg(long)]
    gesture: bool,

    /// Minimum hand movement (fraction of frame height) that counts as a swipe
    #[arg(long, default_value_t = 0.05)]
    threshold: f32,

    /// Quiet period (ms) after the last swipe before it scrolls
    #[arg(long, default_value_t = 300)]
    debounce_ms: u64,

    /// Detector model: lite or full
    #[arg(long, default_value = "full")]
    model: String,

    /// Camera to request: user or environment
    #[arg(long, default_value = "user")]
    camera_facing: String,

    /// Requested camera frame size, e.g. 640x480
    #[arg(long, default_value = "640x480")]
    camera_size: String,

    /// Simulated camera frame rate
    #[arg(long, default_value_t = 30)]
    fps: u32,

    /// Simulated hand track, e.g. "0.5,0.5,0.3,-,0.4" (default: built-in demo)
    #[arg(long)]
    hand_track: Option<String>,

    /// End the camera stream when the hand track runs out instead of looping
    #[arg(long)]
    no_loop_track: bool,

    /// Simulate a camera failure: permission-denied, no-device, or device-busy
    #[arg(long)]
    camera_fail: Option<String>,

    /// Jump between panels instead of smooth scrolling
    #[arg(long)]
    instant_scroll: bool,

    /// Height of one panel in pixels
    #[arg(long, default_value_t = 800.0)]
    viewport_height: f64,

    /// Exit after N seconds
    #[arg(long)]
    exit_after: Option<u64>,

    /// Log all console commands to stderr
    #[arg(long)]
    trace_commands: bool,

    /// Trace detected hand skeletons
    #[arg(long)]
    debug_overlay: bool,

    /// Show version and exit
    #[arg(long)]
    version: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.version {
        println!("shelf-browser {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shelf_browser=info".into()),
        )
        .init();

    info!("shelf-browser v{} starting", env!("CARGO_PKG_VERSION"));

    let Some(layout) = Layout::from_str(&cli.layout) else {
        anyhow::bail!(
            "unknown layout: {}. Use: vertical, horizontal, or split",
            cli.layout
        );
    };
    if !(cli.threshold > 0.0 && cli.threshold < 1.0) {
        anyhow::bail!("threshold must be within (0.0, 1.0), got {}", cli.threshold);
    }
    if cli.viewport_height <= 0.0 {
        anyhow::bail!("viewport height must be positive");
    }
    let Some(model_complexity) = ModelComplexity::from_str(&cli.model) else {
        anyhow::bail!("unknown model: {}. Use: lite or full", cli.model);
    };
    let Some(facing) = FacingMode::from_str(&cli.camera_facing) else {
        anyhow::bail!(
            "unknown camera facing: {}. Use: user or environment",
            cli.camera_facing
        );
    };
    let Some((width, height)) = StreamConstraints::parse_size(&cli.camera_size) else {
        anyhow::bail!(
            "invalid camera size: {}. Use WIDTHxHEIGHT, e.g. 640x480",
            cli.camera_size
        );
    };

    let track = match cli.hand_track.as_deref() {
        Some(track) => SimConfig::parse_track(track)?,
        None => SimConfig::demo_track(),
    };
    let fail = match cli.camera_fail.as_deref() {
        Some(name) => Some(CameraError::from_str(name).ok_or_else(|| {
            anyhow::anyhow!(
                "unknown camera failure: {name}. Use: permission-denied, no-device, or device-busy"
            )
        })?),
        None => None,
    };
    let sim = SimConfig {
        fps: cli.fps.max(1),
        track,
        looped: !cli.no_loop_track,
        fail,
    };

    let session_config = SessionConfig {
        classifier: ClassifierConfig {
            threshold: cli.threshold,
            debounce_ms: cli.debounce_ms,
        },
        detector: DetectorOptions {
            model_complexity,
            ..Default::default()
        },
        constraints: StreamConstraints {
            facing,
            width,
            height,
        },
    };
    let session = GestureSession::new(
        session_config,
        Box::new(SimCamera::new(sim)),
        Box::new(SimDetectorBackend::default()),
    );

    let config = HostConfig {
        layout,
        viewport_height: cli.viewport_height,
        start_gesture: cli.gesture,
        exit_after: cli.exit_after,
        trace_commands: cli.trace_commands,
        debug_overlay: cli.debug_overlay,
        instant_scroll: cli.instant_scroll,
        ..Default::default()
    };

    backend::headless::run(config, session)
}
