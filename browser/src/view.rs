//! View state: category selection, overview toggle, and layout.
//!
//! Pure transitions; the host rebinds the active scroll container from
//! [`ViewState::scroll_region`] after every change.

use tracing::debug;

use crate::catalog::{Catalog, Category};

/// Page layout variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Layout {
    /// Full-screen panels stacked vertically.
    #[default]
    VerticalSnap,
    /// Categories stack vertically; a selected category's subcategories
    /// scroll sideways.
    HorizontalSnap,
    /// Category list on the left, subcategories on the right.
    SplitPane,
}

impl Layout {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::VerticalSnap => "vertical",
            Self::HorizontalSnap => "horizontal",
            Self::SplitPane => "split",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "vertical" => Some(Self::VerticalSnap),
            "horizontal" => Some(Self::HorizontalSnap),
            "split" => Some(Self::SplitPane),
            _ => None,
        }
    }
}

/// What the vertically scrollable region currently shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollRegion {
    /// One panel per category.
    Categories,
    /// One panel per subcategory of the named category.
    Subcategories(&'static str),
}

impl ScrollRegion {
    /// Number of full-height panels in this region.
    pub fn panel_count(&self, catalog: &Catalog) -> usize {
        match self {
            Self::Categories => catalog.len(),
            Self::Subcategories(name) => catalog
                .lookup(name)
                .map(|c| c.subcategories.len())
                .unwrap_or(0),
        }
    }
}

/// Selection and overview state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewState {
    selected: Option<&'static str>,
    overview: bool,
    layout: Layout,
}

impl ViewState {
    pub fn new(layout: Layout) -> Self {
        Self {
            selected: None,
            overview: false,
            layout,
        }
    }

    pub fn selected_category(&self) -> Option<&'static str> {
        self.selected
    }

    pub fn overview_mode(&self) -> bool {
        self.overview
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Select a category by name. Unknown names leave the state untouched.
    ///
    /// Returns whether the state changed.
    pub fn select(&mut self, catalog: &Catalog, name: &str) -> bool {
        let Some(category) = catalog.lookup(name) else {
            debug!("Ignoring selection of unknown category {:?}", name);
            return false;
        };
        let changed = self.selected != Some(category.name);
        self.selected = Some(category.name);
        changed
    }

    /// Flip overview mode and clear any selection.
    pub fn toggle_overview(&mut self) {
        self.overview = !self.overview;
        self.selected = None;
    }

    pub fn set_layout(&mut self, layout: Layout) {
        self.layout = layout;
    }

    /// Selected category resolved against the catalog.
    pub fn current_category(&self, catalog: &Catalog) -> Option<&'static Category> {
        self.selected.and_then(|name| catalog.lookup(name))
    }

    /// The region gesture scrolling applies to, if any.
    ///
    /// A selection takes precedence over the overview grid, which is how a
    /// category picked from the grid opens its subcategories.
    pub fn scroll_region(&self) -> Option<ScrollRegion> {
        match (self.layout, self.selected) {
            (Layout::HorizontalSnap, Some(_)) => None,
            (_, Some(name)) => Some(ScrollRegion::Subcategories(name)),
            (_, None) if self.overview => None,
            (_, None) => Some(ScrollRegion::Categories),
        }
    }

    /// Generate s-expression for status reporting.
    pub fn status_sexp(&self) -> String {
        let selected = self
            .selected
            .map(|s| format!("\"{}\"", s))
            .unwrap_or_else(|| "nil".to_string());
        format!(
            "(:layout :{} :selected {} :overview {})",
            self.layout.as_str(),
            selected,
            if self.overview { "t" } else { "nil" },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state_browsing() {
        let view = ViewState::new(Layout::VerticalSnap);
        assert_eq!(view.selected_category(), None);
        assert!(!view.overview_mode());
        assert_eq!(view.scroll_region(), Some(ScrollRegion::Categories));
    }

    #[test]
    fn test_select_known_category() {
        let catalog = Catalog::new();
        let mut view = ViewState::default();
        assert!(view.select(&catalog, "Beverages"));
        assert_eq!(view.selected_category(), Some("Beverages"));
        assert_eq!(view.current_category(&catalog).unwrap().subcategories[0], "Water");
    }

    #[test]
    fn test_select_replaces_selection() {
        let catalog = Catalog::new();
        let mut view = ViewState::default();
        view.select(&catalog, "Beverages");
        assert!(view.select(&catalog, "Bakery"));
        assert_eq!(view.selected_category(), Some("Bakery"));
        assert!(!view.select(&catalog, "Bakery"));
    }

    #[test]
    fn test_select_unknown_is_noop() {
        let catalog = Catalog::new();
        let mut view = ViewState::default();
        view.select(&catalog, "Bakery");
        let before = view;
        assert!(!view.select(&catalog, "NonexistentCategory"));
        assert_eq!(view, before);
    }

    #[test]
    fn test_toggle_overview_clears_selection() {
        let catalog = Catalog::new();
        let mut view = ViewState::default();
        view.select(&catalog, "Bakery");
        view.toggle_overview();
        assert!(view.overview_mode());
        assert_eq!(view.selected_category(), None);
        assert_eq!(view.scroll_region(), None);
    }

    #[test]
    fn test_toggle_overview_parity() {
        let mut view = ViewState::default();
        view.toggle_overview();
        view.toggle_overview();
        assert_eq!(view, ViewState::default());
    }

    #[test]
    fn test_select_from_overview_opens_subcategories() {
        let catalog = Catalog::new();
        let mut view = ViewState::default();
        view.toggle_overview();
        assert_eq!(view.scroll_region(), None);
        view.select(&catalog, "Bakery");
        assert!(view.overview_mode());
        assert_eq!(view.scroll_region(), Some(ScrollRegion::Subcategories("Bakery")));
    }

    #[test]
    fn test_scroll_region_per_layout() {
        let catalog = Catalog::new();

        let mut view = ViewState::new(Layout::VerticalSnap);
        view.select(&catalog, "Bakery");
        assert_eq!(view.scroll_region(), Some(ScrollRegion::Subcategories("Bakery")));

        let mut view = ViewState::new(Layout::HorizontalSnap);
        assert_eq!(view.scroll_region(), Some(ScrollRegion::Categories));
        view.select(&catalog, "Bakery");
        assert_eq!(view.scroll_region(), None);

        let mut view = ViewState::new(Layout::SplitPane);
        assert_eq!(view.scroll_region(), Some(ScrollRegion::Categories));
        view.select(&catalog, "Bakery");
        assert_eq!(view.scroll_region(), Some(ScrollRegion::Subcategories("Bakery")));
    }

    #[test]
    fn test_panel_count() {
        let catalog = Catalog::new();
        assert_eq!(ScrollRegion::Categories.panel_count(&catalog), 12);
        assert_eq!(ScrollRegion::Subcategories("Bakery").panel_count(&catalog), 6);
        assert_eq!(ScrollRegion::Subcategories("Gone").panel_count(&catalog), 0);
    }

    #[test]
    fn test_layout_from_str() {
        assert_eq!(Layout::from_str("split"), Some(Layout::SplitPane));
        assert_eq!(Layout::from_str("vertical"), Some(Layout::VerticalSnap));
        assert_eq!(Layout::from_str("diagonal"), None);
        assert_eq!(Layout::HorizontalSnap.as_str(), "horizontal");
    }

    #[test]
    fn test_status_sexp() {
        let catalog = Catalog::new();
        let mut view = ViewState::default();
        assert_eq!(view.status_sexp(), "(:layout :vertical :selected nil :overview nil)");
        view.select(&catalog, "Bakery");
        assert!(view.status_sexp().contains(":selected \"Bakery\""));
    }
}
