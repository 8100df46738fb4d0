//! Debug overlay hook: draws the detected skeleton over each frame.

use tracing::trace;

use super::camera::VideoFrame;
use super::landmarks::{HandLandmark, LandmarkFrame};

/// Receives every processed frame with the primary hand, if any.
pub trait DebugOverlay {
    fn draw(&mut self, frame: &VideoFrame, hand: Option<&LandmarkFrame>);
}

/// Overlay that traces skeleton geometry instead of painting it.
#[derive(Debug, Default)]
pub struct TraceOverlay {
    /// Frames drawn with a hand present.
    drawn: u64,
}

impl TraceOverlay {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DebugOverlay for TraceOverlay {
    fn draw(&mut self, frame: &VideoFrame, hand: Option<&LandmarkFrame>) {
        let Some(hand) = hand else {
            trace!(seq = frame.sequence, "overlay: no hand");
            return;
        };
        self.drawn += 1;
        let (x0, y0, x1, y1) = hand.bounds();
        trace!(
            seq = frame.sequence,
            drawn = self.drawn,
            segments = hand.segments().count(),
            "overlay: hand bounds ({:.2}, {:.2})-({:.2}, {:.2})",
            x0,
            y0,
            x1,
            y1
        );
        for tip in HandLandmark::fingertips() {
            let p = hand.point(tip);
            trace!(seq = frame.sequence, "overlay: {} at ({:.2}, {:.2})", tip.as_str(), p.x, p.y);
        }
    }
}
