//! Camera capability consumed by the gesture session.
//!
//! A camera hands out a live stream that pushes decoded frames into an
//! event-loop channel for as long as the stream runs.

use calloop::channel::SyncSender;
use thiserror::Error;

/// Which way the camera faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacingMode {
    /// Front camera, facing the user.
    User,
    /// Rear camera.
    Environment,
}

impl FacingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Environment => "environment",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "user" => Some(Self::User),
            "environment" => Some(Self::Environment),
            _ => None,
        }
    }
}

/// Requested stream properties.
#[derive(Debug, Clone)]
pub struct StreamConstraints {
    pub facing: FacingMode,
    pub width: u32,
    pub height: u32,
}

impl Default for StreamConstraints {
    fn default() -> Self {
        Self {
            facing: FacingMode::User,
            width: 640,
            height: 480,
        }
    }
}

impl StreamConstraints {
    /// Parse a "WxH" frame size string. Returns (width, height) or None.
    pub fn parse_size(s: &str) -> Option<(u32, u32)> {
        let (w, h) = s.split_once('x')?;
        let w = w.parse::<u32>().ok()?;
        let h = h.parse::<u32>().ok()?;
        if w > 0 && h > 0 {
            Some((w, h))
        } else {
            None
        }
    }
}

/// Why a stream could not be acquired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CameraError {
    #[error("camera permission denied")]
    PermissionDenied,
    #[error("no camera device found")]
    NoDevice,
    #[error("camera is in use by another application")]
    DeviceBusy,
}

impl CameraError {
    /// Reason code for status reporting.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PermissionDenied => "permission-denied",
            Self::NoDevice => "no-device",
            Self::DeviceBusy => "device-busy",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "permission-denied" => Some(Self::PermissionDenied),
            "no-device" => Some(Self::NoDevice),
            "device-busy" => Some(Self::DeviceBusy),
            _ => None,
        }
    }
}

/// One decoded grayscale camera frame.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoFrame {
    pub width: u32,
    pub height: u32,
    /// Capture order, starting at 0 for each stream.
    pub sequence: u64,
    /// Row-major 8-bit luma, `width * height` bytes.
    pub luma: Vec<u8>,
}

impl VideoFrame {
    /// A black frame.
    pub fn blank(width: u32, height: u32, sequence: u64) -> Self {
        Self {
            width,
            height,
            sequence,
            luma: vec![0; (width * height) as usize],
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> u8 {
        self.luma[(y * self.width + x) as usize]
    }
}

/// Where a stream delivers its frames.
pub type FrameSink = SyncSender<VideoFrame>;

/// A source of camera streams.
pub trait Camera {
    /// Open a stream matching `constraints`, delivering frames into `sink`.
    fn request_stream(
        &mut self,
        constraints: &StreamConstraints,
        sink: FrameSink,
    ) -> Result<Box<dyn MediaStream>, CameraError>;
}

/// A running camera stream.
pub trait MediaStream {
    /// Human-readable device label.
    fn label(&self) -> &str;
    /// Stop all tracks. Safe to call more than once.
    fn stop(&mut self);
    /// Whether the stream is still producing frames.
    fn is_live(&self) -> bool;
    /// Frames discarded because the consumer was behind.
    fn dropped_frames(&self) -> u64 {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_constraints_face_user() {
        let c = StreamConstraints::default();
        assert_eq!(c.facing, FacingMode::User);
        assert_eq!(c.facing.as_str(), "user");
    }

    #[test]
    fn test_facing_mode_from_str() {
        assert_eq!(FacingMode::from_str("environment"), Some(FacingMode::Environment));
        assert_eq!(FacingMode::from_str("user"), Some(FacingMode::User));
        assert_eq!(FacingMode::from_str("sideways"), None);
    }

    #[test]
    fn test_parse_size() {
        assert_eq!(StreamConstraints::parse_size("640x480"), Some((640, 480)));
        assert_eq!(StreamConstraints::parse_size("0x480"), None);
        assert_eq!(StreamConstraints::parse_size("640"), None);
        assert_eq!(StreamConstraints::parse_size("axb"), None);
    }

    #[test]
    fn test_camera_error_codes_round_trip() {
        for err in [
            CameraError::PermissionDenied,
            CameraError::NoDevice,
            CameraError::DeviceBusy,
        ] {
            assert_eq!(CameraError::from_str(err.as_str()), Some(err));
        }
        assert_eq!(CameraError::from_str("melted"), None);
    }

    #[test]
    fn test_camera_error_display() {
        assert_eq!(CameraError::PermissionDenied.to_string(), "camera permission denied");
        assert_eq!(CameraError::NoDevice.to_string(), "no camera device found");
    }

    #[test]
    fn test_blank_frame() {
        let frame = VideoFrame::blank(4, 3, 7);
        assert_eq!(frame.luma.len(), 12);
        assert_eq!(frame.pixel(3, 2), 0);
        assert_eq!(frame.sequence, 7);
    }
}
