//! Scroll command execution and the virtual snap-scroll container.
//!
//! A swipe moves the active container by exactly one viewport height.
//! Without a bound container the command is dropped.

use tracing::{debug, trace};

use crate::gesture::GestureEvent;

/// How a scroll should be applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBehavior {
    Smooth,
    Instant,
}

impl ScrollBehavior {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Smooth => "smooth",
            Self::Instant => "instant",
        }
    }
}

/// A vertically scrollable region.
pub trait ScrollTarget {
    /// Current scroll offset in pixels.
    fn scroll_offset(&self) -> f64;
    /// Visible height in pixels.
    fn viewport_height(&self) -> f64;
    /// Scroll to `offset`.
    fn scroll_to(&mut self, offset: f64, behavior: ScrollBehavior);
}

/// Apply a gesture to the active scroll target.
///
/// Returns the requested offset, or `None` when nothing is bound.
pub fn execute(
    event: GestureEvent,
    target: Option<&mut dyn ScrollTarget>,
    behavior: ScrollBehavior,
) -> Option<f64> {
    let Some(target) = target else {
        debug!("No scroll container bound, dropping {}", event.as_str());
        return None;
    };

    let current = target.scroll_offset();
    let step = target.viewport_height();
    let offset = match event {
        GestureEvent::SwipeDown => current + step,
        GestureEvent::SwipeUp => current - step,
    };

    debug!(
        "Scroll {}: {:.0} -> {:.0} (viewport {:.0})",
        event.as_str(),
        current,
        offset,
        step
    );
    target.scroll_to(offset, behavior);
    Some(offset)
}

// ── Snap container ─────────────────────────────────────────

/// Full-screen panels stacked vertically with mandatory snapping.
#[derive(Debug, Clone)]
pub struct SnapScrollContainer {
    /// Number of full-height panels.
    panel_count: usize,
    /// Viewport height in pixels (one panel per viewport).
    viewport_height: f64,
    /// Current offset in pixels.
    offset: f64,
    /// Behavior of the most recent scroll, if any.
    last_behavior: Option<ScrollBehavior>,
}

impl SnapScrollContainer {
    pub fn new(panel_count: usize, viewport_height: f64) -> Self {
        Self {
            panel_count,
            viewport_height: viewport_height.max(1.0),
            offset: 0.0,
            last_behavior: None,
        }
    }

    pub fn panel_count(&self) -> usize {
        self.panel_count
    }

    /// Total scrollable content height.
    pub fn content_height(&self) -> f64 {
        self.panel_count as f64 * self.viewport_height
    }

    /// Largest reachable offset.
    pub fn max_offset(&self) -> f64 {
        (self.content_height() - self.viewport_height).max(0.0)
    }

    /// Index of the panel currently snapped into view.
    pub fn current_panel(&self) -> usize {
        (self.offset / self.viewport_height).round() as usize
    }

    pub fn last_behavior(&self) -> Option<ScrollBehavior> {
        self.last_behavior
    }
}

impl ScrollTarget for SnapScrollContainer {
    fn scroll_offset(&self) -> f64 {
        self.offset
    }

    fn viewport_height(&self) -> f64 {
        self.viewport_height
    }

    fn scroll_to(&mut self, offset: f64, behavior: ScrollBehavior) {
        let clamped = offset.clamp(0.0, self.max_offset());
        let snapped = (clamped / self.viewport_height).round() * self.viewport_height;
        trace!(
            requested = offset,
            snapped,
            behavior = behavior.as_str(),
            "snap container scroll"
        );
        self.offset = snapped;
        self.last_behavior = Some(behavior);
    }
}
