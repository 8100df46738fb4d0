//! Gesture session: camera, detector, and classifier lifecycle.
//!
//! `start` acquires the camera stream and the detector and registers the
//! frame feed with the event loop; every resource lives in one
//! [`SessionContext`] which releases all of it when dropped.  Debounced
//! swipes become event-loop timers that are removed when a newer crossing
//! replaces them or the session stops.

use std::fmt;
use std::time::Instant;

use calloop::channel::{self, Event as ChannelEvent};
use calloop::timer::{TimeoutAction, Timer};
use calloop::{LoopHandle, RegistrationToken};
use thiserror::Error;
use tracing::{debug, info, trace, warn};

use super::camera::{Camera, CameraError, MediaStream, StreamConstraints, VideoFrame};
use super::classifier::{ClassifierConfig, GestureClassifier, GestureEvent, Observation};
use super::detector::{DetectorBackend, DetectorOptions, HandDetector};
use super::landmarks::LandmarkFrame;
use super::overlay::DebugOverlay;
use crate::state::BrowserState;

/// Frames queued between camera and detector before the camera drops new ones.
pub const FRAME_QUEUE_DEPTH: usize = 2;

// ── Errors ─────────────────────────────────────────────────

/// Why a session could not start.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("camera unavailable: {0}")]
    CameraUnavailable(#[from] CameraError),
    #[error("hand detector failed to initialize: {0}")]
    DetectorInitFailed(String),
    #[error("could not register frame feed: {0}")]
    FeedRegistration(String),
}

impl SessionError {
    /// Stable reason code for status reporting.
    pub fn code(&self) -> &'static str {
        match self {
            Self::CameraUnavailable(e) => e.as_str(),
            Self::DetectorInitFailed(_) => "detector-init-failed",
            Self::FeedRegistration(_) => "feed-registration",
        }
    }
}

/// Reason code reported after the camera stops delivering frames.
const STREAM_ENDED: &str = "stream-ended";

// ── Status ─────────────────────────────────────────────────

/// User-facing session status.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionStatus {
    /// No session running.
    Off,
    /// Camera live, no hand seen yet.
    Waiting,
    /// Hand in view.
    Tracking,
    /// Hand left the frame.
    HandLost,
    /// A swipe was just dispatched.
    Swiped(GestureEvent),
    /// The last start attempt or the running stream failed.
    Failed(String),
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Off => write!(f, "Gesture control off"),
            Self::Waiting => write!(f, "Camera ready, show your hand"),
            Self::Tracking => write!(f, "Hand detected"),
            Self::HandLost => write!(f, "No hand detected"),
            Self::Swiped(GestureEvent::SwipeUp) => write!(f, "Swipe up"),
            Self::Swiped(GestureEvent::SwipeDown) => write!(f, "Swipe down"),
            Self::Failed(reason) => write!(f, "Gesture control unavailable: {}", reason),
        }
    }
}

/// Per-session counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub frames: u64,
    pub hand_frames: u64,
    pub detector_errors: u64,
    pub swipes: u64,
}

// ── Config ─────────────────────────────────────────────────

/// Everything a session needs to configure its collaborators.
#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    pub classifier: ClassifierConfig,
    pub detector: DetectorOptions,
    pub constraints: StreamConstraints,
}

// ── Context ────────────────────────────────────────────────

/// Resources owned by a running session.
struct SessionContext {
    loop_handle: LoopHandle<'static, BrowserState>,
    stream: Box<dyn MediaStream>,
    detector: Box<dyn HandDetector>,
    classifier: GestureClassifier,
    /// Frame channel source.
    feed: Option<RegistrationToken>,
    /// Timer for the scheduled swipe.
    debounce: Option<RegistrationToken>,
}

impl SessionContext {
    /// Replace the debounce timer with one firing at `deadline`.
    fn schedule_debounce(&mut self, deadline: Instant) {
        if let Some(token) = self.debounce.take() {
            self.loop_handle.remove(token);
        }
        let timer = Timer::from_deadline(deadline);
        match self
            .loop_handle
            .insert_source(timer, |fired_at, _, state: &mut BrowserState| {
                GestureSession::on_debounce(state, fired_at);
                TimeoutAction::Drop
            }) {
            Ok(token) => self.debounce = Some(token),
            Err(e) => {
                warn!("Failed to schedule swipe timer: {}", e.error);
                self.classifier.cancel_pending();
            }
        }
    }
}

impl Drop for SessionContext {
    fn drop(&mut self) {
        if let Some(token) = self.debounce.take() {
            self.loop_handle.remove(token);
            debug!("Pending swipe discarded");
        }
        if let Some(token) = self.feed.take() {
            self.loop_handle.remove(token);
        }
        self.stream.stop();
        self.detector.close();
        debug!("Released {}", self.stream.label());
    }
}

// ── Session ────────────────────────────────────────────────

/// Gesture control: at most one live session at a time.
pub struct GestureSession {
    pub config: SessionConfig,
    camera: Box<dyn Camera>,
    detector_backend: Box<dyn DetectorBackend>,
    overlay: Option<Box<dyn DebugOverlay>>,
    context: Option<SessionContext>,
    status: SessionStatus,
    stats: SessionStats,
    /// Reason code of the last failure, cleared by a successful start.
    failure: Option<&'static str>,
}

impl GestureSession {
    pub fn new(
        config: SessionConfig,
        camera: Box<dyn Camera>,
        detector_backend: Box<dyn DetectorBackend>,
    ) -> Self {
        Self {
            config,
            camera,
            detector_backend,
            overlay: None,
            context: None,
            status: SessionStatus::Off,
            stats: SessionStats::default(),
            failure: None,
        }
    }

    pub fn set_overlay(&mut self, overlay: Box<dyn DebugOverlay>) {
        self.overlay = Some(overlay);
    }

    pub fn is_active(&self) -> bool {
        self.context.is_some()
    }

    pub fn status(&self) -> &SessionStatus {
        &self.status
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Reason code of the last start or stream failure.
    pub fn failure(&self) -> Option<&'static str> {
        self.failure
    }

    /// Baseline of the running classifier.
    #[cfg(test)]
    pub fn last_hand_y(&self) -> Option<f32> {
        self.context.as_ref().and_then(|c| c.classifier.last_hand_y())
    }

    /// Whether a swipe is waiting on its debounce timer.
    #[cfg(test)]
    pub fn has_pending_swipe(&self) -> bool {
        self.context
            .as_ref()
            .map(|c| c.debounce.is_some())
            .unwrap_or(false)
    }

    /// Start gesture control. No-op while a session is already running.
    pub fn start(state: &mut BrowserState) -> Result<(), SessionError> {
        if state.gesture.is_active() {
            debug!("Gesture session already active ({})", state.gesture.status);
            return Ok(());
        }

        match Self::acquire(state) {
            Ok(context) => {
                info!(
                    "Gesture session started ({} via {} detector)",
                    context.stream.label(),
                    state.gesture.detector_backend.name()
                );
                state.gesture.context = Some(context);
                state.gesture.status = SessionStatus::Waiting;
                state.gesture.stats = SessionStats::default();
                state.gesture.failure = None;
                Ok(())
            }
            Err(e) => {
                warn!("Gesture session failed to start ({}): {}", e.code(), e);
                state.gesture.failure = Some(e.code());
                state.gesture.status = SessionStatus::Failed(e.to_string());
                Err(e)
            }
        }
    }

    /// Acquire camera, detector and feed; anything obtained is released on error.
    fn acquire(state: &mut BrowserState) -> Result<SessionContext, SessionError> {
        let session = &mut state.gesture;
        let (sink, frames) = channel::sync_channel::<VideoFrame>(FRAME_QUEUE_DEPTH);

        let mut stream = session
            .camera
            .request_stream(&session.config.constraints, sink)?;

        let detector = match session.detector_backend.load(&session.config.detector) {
            Ok(detector) => detector,
            Err(e) => {
                stream.stop();
                return Err(SessionError::DetectorInitFailed(format!("{e:#}")));
            }
        };

        let mut context = SessionContext {
            loop_handle: state.loop_handle.clone(),
            stream,
            detector,
            classifier: GestureClassifier::new(session.config.classifier.clone()),
            feed: None,
            debounce: None,
        };

        let token = state
            .loop_handle
            .insert_source(frames, |event, _, state: &mut BrowserState| match event {
                ChannelEvent::Msg(frame) => GestureSession::on_frame(state, frame),
                ChannelEvent::Closed => GestureSession::on_stream_closed(state),
            })
            .map_err(|e| SessionError::FeedRegistration(e.error.to_string()))?;
        context.feed = Some(token);

        Ok(context)
    }

    /// Stop gesture control and release every session resource. Idempotent.
    pub fn stop(state: &mut BrowserState) {
        let Some(context) = state.gesture.context.take() else {
            trace!("Gesture session already stopped");
            return;
        };
        drop(context);
        state.gesture.status = SessionStatus::Off;
        let stats = state.gesture.stats;
        info!(
            frames = stats.frames,
            hand_frames = stats.hand_frames,
            swipes = stats.swipes,
            "Gesture session stopped"
        );
    }

    /// One camera frame: detect, draw overlay, classify.
    fn on_frame(state: &mut BrowserState, frame: VideoFrame) {
        let now = Instant::now();
        let session = &mut state.gesture;
        let Some(context) = session.context.as_mut() else {
            return;
        };
        session.stats.frames += 1;

        let hands = match context.detector.process(&frame) {
            Ok(hands) => hands,
            Err(e) => {
                session.stats.detector_errors += 1;
                warn!("Detector failed on frame {}: {:#}", frame.sequence, e);
                return;
            }
        };
        let primary = hands.into_iter().next();

        if let Some(overlay) = session.overlay.as_mut() {
            overlay.draw(&frame, primary.as_ref());
        }

        let hand_y = primary.as_ref().map(LandmarkFrame::hand_y);
        match context.classifier.observe(hand_y, now) {
            Observation::HandLost => {
                if session.status != SessionStatus::HandLost {
                    debug!("Status: {}", SessionStatus::HandLost);
                    session.status = SessionStatus::HandLost;
                }
            }
            Observation::Baseline | Observation::Steady { .. } => {
                session.stats.hand_frames += 1;
                if !matches!(session.status, SessionStatus::Tracking) {
                    debug!("Status: {}", SessionStatus::Tracking);
                    session.status = SessionStatus::Tracking;
                }
            }
            Observation::Scheduled { deadline, .. } => {
                session.stats.hand_frames += 1;
                context.schedule_debounce(deadline);
            }
        }
    }

    /// Debounce timer fired: emit the swipe and scroll.
    fn on_debounce(state: &mut BrowserState, fired_at: Instant) {
        let session = &mut state.gesture;
        let Some(context) = session.context.as_mut() else {
            return;
        };
        let Some(event) = context.classifier.poll(fired_at) else {
            return;
        };
        context.debounce = None;
        session.stats.swipes += 1;
        session.status = SessionStatus::Swiped(event);
        info!("Gesture: {}", event.as_str());
        state.apply_gesture(event);
    }

    /// Camera stopped delivering frames; end the session once the loop is idle.
    fn on_stream_closed(state: &mut BrowserState) {
        debug!("Camera frame channel closed");
        state.loop_handle.insert_idle(|state: &mut BrowserState| {
            let ended = state
                .gesture
                .context
                .as_ref()
                .map(|c| !c.stream.is_live())
                .unwrap_or(false);
            if ended {
                warn!("Camera stream ended");
                Self::stop(state);
                state.gesture.status = SessionStatus::Failed("camera stream ended".into());
                state.gesture.failure = Some(STREAM_ENDED);
            }
        });
    }

    /// Generate s-expression for status reporting.
    pub fn status_sexp(&self) -> String {
        let classifier = self
            .context
            .as_ref()
            .map(|c| c.classifier.status_sexp())
            .unwrap_or_else(|| "nil".to_string());
        let dropped = self
            .context
            .as_ref()
            .map(|c| c.stream.dropped_frames())
            .unwrap_or(0);
        format!(
            "(:active {} :status \"{}\" :failure {} :frames {} :hand-frames {} :dropped-frames {} :detector-errors {} :swipes {} :classifier {})",
            if self.is_active() { "t" } else { "nil" },
            self.status,
            self.failure
                .map(|code| format!(":{code}"))
                .unwrap_or_else(|| "nil".to_string()),
            self.stats.frames,
            self.stats.hand_frames,
            dropped,
            self.stats.detector_errors,
            self.stats.swipes,
            classifier,
        )
    }
}

// ── Tests ──────────────────────────────────────────────────
