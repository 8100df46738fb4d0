//! Simulated camera and detector.
//!
//! The camera renders a bright disk (the "hand") that follows a scripted
//! vertical track, one track entry per frame, on its own thread.  The blob
//! detector finds the disk and reports 21 landmarks anchored at its
//! centroid.  Together they drive the full gesture pipeline without
//! hardware.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::TrySendError;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use anyhow::{bail, Context};
use tracing::{debug, info, trace, warn};

use crate::gesture::camera::{
    Camera, CameraError, FrameSink, MediaStream, StreamConstraints, VideoFrame,
};
use crate::gesture::detector::{DetectorBackend, DetectorOptions, HandDetector};
use crate::gesture::landmarks::{Landmark, LandmarkFrame, LANDMARK_COUNT};

/// Luma value of the rendered hand.
const HAND_LUMA: u8 = 230;

/// Pixels at or above this luma count as hand.
const BLOB_LUMA_THRESHOLD: u8 = 128;

/// Blob size (pixels) treated as full detection confidence.
const FULL_CONFIDENCE_PIXELS: f32 = 40.0;

// ── Config ─────────────────────────────────────────────────

/// Simulated camera configuration.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Frames per second.
    pub fps: u32,
    /// Hand position per frame (`None` = no hand in view).
    pub track: Vec<Option<f32>>,
    /// Restart the track when it runs out instead of ending the stream.
    pub looped: bool,
    /// Refuse stream requests with this error.
    pub fail: Option<CameraError>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            fps: 30,
            track: Vec::new(),
            looped: true,
            fail: None,
        }
    }
}

impl SimConfig {
    /// Parse a comma-separated track such as `"0.5,0.5,0.3,-,0.4"`.
    ///
    /// `-` (or `none`) marks a frame without a hand.
    pub fn parse_track(s: &str) -> anyhow::Result<Vec<Option<f32>>> {
        s.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| match part {
                "-" | "none" => Ok(None),
                value => {
                    let y: f32 = value
                        .parse()
                        .with_context(|| format!("invalid hand position {value:?}"))?;
                    if !(0.0..=1.0).contains(&y) {
                        bail!("hand position {y} outside 0.0-1.0");
                    }
                    Ok(Some(y))
                }
            })
            .collect()
    }

    /// A slow drift down the frame followed by a fast upward swipe.
    pub fn demo_track() -> Vec<Option<f32>> {
        let mut track = Vec::new();
        track.extend(std::iter::repeat(None).take(15));
        track.extend((0..30).map(|i| Some(0.4 + i as f32 * 0.005)));
        track.extend((0..4).map(|i| Some(0.55 - i as f32 * 0.08)));
        track.extend(std::iter::repeat(Some(0.31)).take(30));
        track.extend((0..4).map(|i| Some(0.31 + i as f32 * 0.08)));
        track.extend(std::iter::repeat(Some(0.55)).take(30));
        track
    }
}

/// Render one frame with the hand centered at normalized height `hand_y`.
pub fn render_hand_frame(width: u32, height: u32, sequence: u64, hand_y: Option<f32>) -> VideoFrame {
    let mut frame = VideoFrame::blank(width, height, sequence);
    let Some(y) = hand_y else {
        return frame;
    };

    let cx = width as f32 * 0.5;
    let cy = y * height as f32;
    let radius = height as f32 / 8.0;
    for py in 0..height {
        for px in 0..width {
            let dx = px as f32 + 0.5 - cx;
            let dy = py as f32 + 0.5 - cy;
            if dx * dx + dy * dy <= radius * radius {
                frame.luma[(py * width + px) as usize] = HAND_LUMA;
            }
        }
    }
    frame
}

// ── Camera ─────────────────────────────────────────────────

/// Camera that plays back a scripted hand track at the requested frame size.
pub struct SimCamera {
    pub config: SimConfig,
}

impl SimCamera {
    pub fn new(config: SimConfig) -> Self {
        Self { config }
    }
}

impl Camera for SimCamera {
    fn request_stream(
        &mut self,
        constraints: &StreamConstraints,
        sink: FrameSink,
    ) -> Result<Box<dyn MediaStream>, CameraError> {
        if let Some(err) = self.config.fail {
            warn!("Simulated camera refusing stream: {}", err);
            return Err(err);
        }

        let live = Arc::new(AtomicBool::new(true));
        let dropped = Arc::new(AtomicU64::new(0));
        let producer = FrameProducer {
            config: self.config.clone(),
            width: constraints.width,
            height: constraints.height,
            live: Arc::clone(&live),
            dropped: Arc::clone(&dropped),
        };
        let worker = std::thread::Builder::new()
            .name("sim-camera".into())
            .spawn(move || producer.run(sink))
            .map_err(|e| {
                warn!("Failed to spawn simulated camera thread: {}", e);
                CameraError::DeviceBusy
            })?;

        info!(
            "Simulated camera streaming ({} facing, {}x{} @ {} fps)",
            constraints.facing.as_str(),
            constraints.width,
            constraints.height,
            self.config.fps
        );
        Ok(Box::new(SimStream {
            label: format!("sim-camera-{}", constraints.facing.as_str()),
            live,
            dropped,
            worker: Some(worker),
        }))
    }
}

/// Frame producer, run on the camera thread.
struct FrameProducer {
    config: SimConfig,
    width: u32,
    height: u32,
    live: Arc<AtomicBool>,
    dropped: Arc<AtomicU64>,
}

impl FrameProducer {
    fn run(self, sink: FrameSink) {
        let config = &self.config;
        let interval = Duration::from_secs_f64(1.0 / config.fps.max(1) as f64);
        let mut sequence = 0u64;

        while self.live.load(Ordering::SeqCst) {
            let index = sequence as usize;
            let hand_y = if config.track.is_empty() {
                None
            } else if config.looped {
                config.track[index % config.track.len()]
            } else if index < config.track.len() {
                config.track[index]
            } else {
                break;
            };

            let frame = render_hand_frame(self.width, self.height, sequence, hand_y);
            match sink.try_send(frame) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    self.dropped.fetch_add(1, Ordering::Relaxed);
                    trace!(sequence, "frame queue full, dropping frame");
                }
                Err(TrySendError::Disconnected(_)) => break,
            }
            sequence += 1;
            std::thread::sleep(interval);
        }

        self.live.store(false, Ordering::SeqCst);
        debug!(
            sequence,
            dropped = self.dropped.load(Ordering::Relaxed),
            "simulated camera stopped producing"
        );
    }
}

/// Running simulated stream; stopping it joins the camera thread.
struct SimStream {
    label: String,
    live: Arc<AtomicBool>,
    dropped: Arc<AtomicU64>,
    worker: Option<JoinHandle<()>>,
}

impl MediaStream for SimStream {
    fn label(&self) -> &str {
        &self.label
    }

    fn stop(&mut self) {
        self.live.store(false, Ordering::SeqCst);
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("Simulated camera thread panicked");
            }
            debug!("{} stopped", self.label);
        }
    }

    fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }

    fn dropped_frames(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl Drop for SimStream {
    fn drop(&mut self) {
        self.stop();
    }
}

// ── Detector ───────────────────────────────────────────────

/// Loads [`BlobDetector`] instances.
#[derive(Debug, Default)]
pub struct SimDetectorBackend {
    /// Fail every load with this message.
    pub fail_load: Option<String>,
}

impl DetectorBackend for SimDetectorBackend {
    fn name(&self) -> &str {
        "blob"
    }

    fn load(&mut self, options: &DetectorOptions) -> anyhow::Result<Box<dyn HandDetector>> {
        if let Some(reason) = &self.fail_load {
            bail!("{reason}");
        }
        options.validate().context("invalid detector options")?;
        debug!(
            "Blob detector loaded (model {}, detection {:.2}, tracking {:.2})",
            options.model_complexity.as_str(),
            options.min_detection_confidence,
            options.min_tracking_confidence
        );
        Ok(Box::new(BlobDetector::new(options.clone())))
    }
}

/// Finds the bright disk rendered by [`SimCamera`].
#[derive(Debug)]
pub struct BlobDetector {
    options: DetectorOptions,
    /// Whether a hand was reported on the previous frame.
    tracking: bool,
    closed: bool,
}

impl BlobDetector {
    pub fn new(options: DetectorOptions) -> Self {
        Self {
            options,
            tracking: false,
            closed: false,
        }
    }

    #[cfg(test)]
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl HandDetector for BlobDetector {
    fn process(&mut self, frame: &VideoFrame) -> anyhow::Result<Vec<LandmarkFrame>> {
        if self.closed {
            bail!("detector already closed");
        }
        let expected = (frame.width * frame.height) as usize;
        if frame.luma.len() != expected {
            bail!(
                "frame {} has {} bytes, expected {}",
                frame.sequence,
                frame.luma.len(),
                expected
            );
        }

        let (mut sum_x, mut sum_y, mut count) = (0.0f64, 0.0f64, 0u32);
        for py in 0..frame.height {
            for px in 0..frame.width {
                if frame.pixel(px, py) >= BLOB_LUMA_THRESHOLD {
                    sum_x += px as f64 + 0.5;
                    sum_y += py as f64 + 0.5;
                    count += 1;
                }
            }
        }

        let confidence = (count as f32 / FULL_CONFIDENCE_PIXELS).min(1.0);
        let required = if self.tracking {
            self.options.min_tracking_confidence
        } else {
            self.options.min_detection_confidence
        };
        if count == 0 || confidence < required {
            self.tracking = false;
            return Ok(Vec::new());
        }
        self.tracking = true;

        let cx = (sum_x / count as f64) as f32 / frame.width as f32;
        let cy = (sum_y / count as f64) as f32 / frame.height as f32;
        let spread = (count as f32).sqrt() / frame.height as f32;
        Ok(LandmarkFrame::from_points(&fan_landmarks(cx, cy, spread))
            .into_iter()
            .collect())
    }

    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            debug!("Blob detector closed");
        }
    }
}

/// Lay out 21 landmarks as five fingers fanning upward from the wrist.
fn fan_landmarks(wrist_x: f32, wrist_y: f32, spread: f32) -> Vec<Landmark> {
    let mut points = Vec::with_capacity(LANDMARK_COUNT);
    points.push(Landmark::new(wrist_x, wrist_y));
    for finger in 0..5 {
        let dx = (finger as f32 - 2.0) * spread * 0.25;
        for joint in 1..=4 {
            let reach = joint as f32 * spread * 0.25;
            points.push(Landmark::new(
                (wrist_x + dx * joint as f32 * 0.5).clamp(0.0, 1.0),
                (wrist_y - reach).clamp(0.0, 1.0),
            ));
        }
    }
    points
}
