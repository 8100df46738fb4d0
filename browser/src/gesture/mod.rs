//! Gesture control: camera hand tracking mapped to scroll commands.
//!
//! Provides:
//! - `camera`: camera capability and video frames
//! - `detector`: hand-landmark detector capability
//! - `landmarks`: the 21-point hand skeleton
//! - `classifier`: vertical-swipe recognition with debounce
//! - `session`: start/stop lifecycle on the event loop
//! - `overlay`: optional debug drawing of detected hands

pub mod camera;
pub mod classifier;
pub mod detector;
pub mod landmarks;
pub mod overlay;
pub mod session;

pub use classifier::{ClassifierConfig, GestureEvent};
pub use session::{GestureSession, SessionConfig};
