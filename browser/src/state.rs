//! Browser state: the central struct owned by the event loop.
//!
//! A single `BrowserState` owns the catalog, the view, the active scroll
//! container and the gesture session, and is passed as `&mut` to every
//! event-loop callback.

use calloop::LoopHandle;
use tracing::{debug, info};

use crate::catalog::Catalog;
use crate::console::ConsoleServer;
use crate::gesture::{GestureEvent, GestureSession};
use crate::scroll::{self, ScrollBehavior, ScrollTarget, SnapScrollContainer};
use crate::view::{Layout, ScrollRegion, ViewState};

/// Host process configuration.
#[derive(Debug, Clone)]
pub struct HostConfig {
    /// Initial page layout.
    pub layout: Layout,
    /// Height of one full-screen panel in pixels.
    pub viewport_height: f64,
    /// Start gesture control at launch.
    pub start_gesture: bool,
    /// Exit after N seconds.
    pub exit_after: Option<u64>,
    /// Log every console command and response.
    pub trace_commands: bool,
    /// Trace detected hand skeletons.
    pub debug_overlay: bool,
    /// Jump to the next panel instead of animating.
    pub instant_scroll: bool,
    /// Maximum time (ms) a single loop dispatch waits for events.
    pub poll_interval_ms: u64,
    /// Seconds between periodic status log lines.
    pub status_interval_secs: u64,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            layout: Layout::VerticalSnap,
            viewport_height: 800.0,
            start_gesture: false,
            exit_after: None,
            trace_commands: false,
            debug_overlay: false,
            instant_scroll: false,
            poll_interval_ms: 100,
            status_interval_secs: 60,
        }
    }
}

/// Central browser state.
pub struct BrowserState {
    pub loop_handle: LoopHandle<'static, Self>,

    // Page
    pub catalog: Catalog,
    pub view: ViewState,
    pub viewport_height: f64,
    scroll_behavior: ScrollBehavior,

    // Active vertical scroll container
    scroll_region: Option<ScrollRegion>,
    scroll: Option<SnapScrollContainer>,

    // Gesture control
    pub gesture: GestureSession,

    // Console
    pub console: ConsoleServer,

    // Shutdown flag
    pub running: bool,
}

impl BrowserState {
    pub fn new(
        loop_handle: LoopHandle<'static, Self>,
        config: &HostConfig,
        gesture: GestureSession,
    ) -> Self {
        let mut state = Self {
            loop_handle,
            catalog: Catalog::new(),
            view: ViewState::new(config.layout),
            viewport_height: config.viewport_height,
            scroll_behavior: if config.instant_scroll {
                ScrollBehavior::Instant
            } else {
                ScrollBehavior::Smooth
            },
            scroll_region: None,
            scroll: None,
            gesture,
            console: ConsoleServer::new(config.trace_commands),
            running: true,
        };
        state.rebind_scroll();
        info!(
            "BrowserState initialized ({} categories, {} layout)",
            state.catalog.len(),
            config.layout.as_str()
        );
        state
    }

    /// Select a category; unknown names are ignored.
    pub fn select_category(&mut self, name: &str) -> bool {
        let changed = self.view.select(&self.catalog, name);
        self.rebind_scroll();
        changed
    }

    pub fn toggle_overview(&mut self) {
        self.view.toggle_overview();
        self.rebind_scroll();
    }

    pub fn set_layout(&mut self, layout: Layout) {
        self.view.set_layout(layout);
        self.rebind_scroll();
    }

    /// Bind a fresh container when the scrollable region changed.
    fn rebind_scroll(&mut self) {
        let region = self.view.scroll_region();
        if region == self.scroll_region {
            return;
        }
        self.scroll_region = region;
        self.scroll = region
            .map(|r| SnapScrollContainer::new(r.panel_count(&self.catalog), self.viewport_height));
        match region {
            Some(r) => debug!(
                "Scroll container bound: {:?} ({} panels)",
                r,
                r.panel_count(&self.catalog)
            ),
            None => debug!("Scroll container unbound"),
        }
    }

    #[cfg(test)]
    pub fn scroll_region(&self) -> Option<ScrollRegion> {
        self.scroll_region
    }

    /// Offset of the active container, if one is bound.
    pub fn scroll_offset(&self) -> Option<f64> {
        self.scroll.as_ref().map(|c| c.scroll_offset())
    }

    /// Panel currently in view, if a container is bound.
    pub fn current_panel(&self) -> Option<usize> {
        self.scroll.as_ref().map(|c| c.current_panel())
    }

    /// Route a swipe to the active container.
    pub fn apply_gesture(&mut self, event: GestureEvent) -> Option<f64> {
        let target = self.scroll.as_mut().map(|c| c as &mut dyn ScrollTarget);
        scroll::execute(event, target, self.scroll_behavior)
    }

    /// Generate s-expression for status reporting.
    pub fn status_sexp(&self) -> String {
        let scroll = match (&self.scroll_region, &self.scroll) {
            (Some(region), Some(container)) => format!(
                "(:region :{} :panel {} :panels {} :offset {:.0} :last-scroll {})",
                match region {
                    ScrollRegion::Categories => "categories",
                    ScrollRegion::Subcategories(_) => "subcategories",
                },
                container.current_panel(),
                container.panel_count(),
                container.scroll_offset(),
                container
                    .last_behavior()
                    .map(|b| format!(":{}", b.as_str()))
                    .unwrap_or_else(|| "nil".to_string()),
            ),
            _ => "nil".to_string(),
        };
        format!(
            "(:view {} :scroll {} :gesture {})",
            self.view.status_sexp(),
            scroll,
            self.gesture.status_sexp(),
        )
    }
}
