//! Hand-landmark detector capability.
//!
//! The detector itself is opaque: it is loaded with [`DetectorOptions`],
//! fed one frame at a time, and reports the landmarks of every hand it
//! found (at most `max_hands`).

use anyhow::bail;

use super::camera::VideoFrame;
use super::landmarks::LandmarkFrame;

/// Detector model size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelComplexity {
    Lite = 0,
    Full = 1,
}

impl ModelComplexity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lite => "lite",
            Self::Full => "full",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "lite" => Some(Self::Lite),
            "full" => Some(Self::Full),
            _ => None,
        }
    }
}

/// Options passed to the detector when it is loaded.
#[derive(Debug, Clone)]
pub struct DetectorOptions {
    pub max_hands: u8,
    pub model_complexity: ModelComplexity,
    /// Minimum confidence (0.0-1.0) for a new hand to be reported.
    pub min_detection_confidence: f32,
    /// Minimum confidence (0.0-1.0) to keep tracking a known hand.
    pub min_tracking_confidence: f32,
}

impl Default for DetectorOptions {
    fn default() -> Self {
        Self {
            max_hands: 1,
            model_complexity: ModelComplexity::Full,
            min_detection_confidence: 0.7,
            min_tracking_confidence: 0.5,
        }
    }
}

impl DetectorOptions {
    /// Reject option sets a detector cannot be configured with.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.max_hands != 1 {
            bail!("max_hands must be 1, got {}", self.max_hands);
        }
        for (name, value) in [
            ("min_detection_confidence", self.min_detection_confidence),
            ("min_tracking_confidence", self.min_tracking_confidence),
        ] {
            if !(0.0..=1.0).contains(&value) {
                bail!("{name} must be within 0.0-1.0, got {value}");
            }
        }
        Ok(())
    }
}

/// Loads detector instances.
pub trait DetectorBackend {
    fn name(&self) -> &str;
    /// Load and configure a detector.
    fn load(&mut self, options: &DetectorOptions) -> anyhow::Result<Box<dyn HandDetector>>;
}

/// A loaded detector.
pub trait HandDetector {
    /// Run detection on one frame. Hands are ordered by confidence.
    fn process(&mut self, frame: &VideoFrame) -> anyhow::Result<Vec<LandmarkFrame>>;
    /// Release the model. Safe to call more than once.
    fn close(&mut self);
}
