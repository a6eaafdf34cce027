//! Interaction-state cores shared by the frontend hooks.
//!
//! Each controller owns plain data and exposes pure transitions; the DOM
//! wiring (listeners, observers, timers) lives in `frontend::hooks`. Keeping
//! the transitions target-independent lets the behavior run under a native
//! `cargo test`.

use std::collections::HashSet;

/// How long a press reads as "pressed". A press is a timed pulse that
/// approximates a momentary input state, not a tracked pointer-up.
pub const PRESS_PULSE_MS: u32 = 200;

/// Scroll deltas below this are treated as jitter and do not flip direction.
pub const SCROLL_DIRECTION_MIN_DELTA: f64 = 10.0;

pub const NAV_SCROLLED_THRESHOLD: f64 = 32.0;
pub const BACK_TO_TOP_THRESHOLD: f64 = 480.0;

pub const NOTIFICATION_DISMISS_MS: u32 = 5_000;
pub const SUBMIT_RESET_MS: u32 = 2_000;
pub const POPUP_SHOW_DELAY_MS: u32 = 3_000;
pub const SKELETON_MIN_MS: f64 = 400.0;
pub const CAROUSEL_INTERVAL_MS: u32 = 6_000;

pub const ALL_CATEGORY: &str = "All";

/// Open/closed state with an optional associated payload.
///
/// Two states, no nesting, no guard against double-open; `close` always
/// clears the payload.
#[derive(Clone, PartialEq)]
pub struct Disclosure<T> {
    open: bool,
    payload: Option<T>,
}

impl<T> Default for Disclosure<T> {
    fn default() -> Self {
        Self {
            open: false,
            payload: None,
        }
    }
}

impl<T> Disclosure<T> {
    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn payload(&self) -> Option<&T> {
        self.payload.as_ref()
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    pub fn open_with(&mut self, payload: T) {
        self.open = true;
        self.payload = Some(payload);
    }

    pub fn close(&mut self) {
        self.open = false;
        self.payload = None;
    }

    pub fn toggle(&mut self) {
        if self.open {
            self.close();
        } else {
            self.open();
        }
    }
}

/// Booleans derived from the window scroll position.
///
/// Direction only flips once the distance from the last accepted position
/// exceeds [`SCROLL_DIRECTION_MIN_DELTA`]; smaller movements accumulate
/// against that anchor instead of resetting it.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct ScrollModel {
    anchor_y: f64,
    pub scrolling_down: bool,
    pub scrolled: bool,
    pub show_back_to_top: bool,
}

impl ScrollModel {
    pub fn at(y: f64) -> Self {
        Self {
            anchor_y: y.max(0.0),
            scrolling_down: false,
            scrolled: y > NAV_SCROLLED_THRESHOLD,
            show_back_to_top: y > BACK_TO_TOP_THRESHOLD,
        }
    }

    pub fn observe(&mut self, y: f64) {
        self.scrolled = y > NAV_SCROLLED_THRESHOLD;
        self.show_back_to_top = y > BACK_TO_TOP_THRESHOLD;

        if y <= 0.0 {
            self.anchor_y = 0.0;
            self.scrolling_down = false;
            return;
        }

        let delta = y - self.anchor_y;
        if delta.abs() < SCROLL_DIRECTION_MIN_DELTA {
            return;
        }

        self.scrolling_down = delta > 0.0;
        self.anchor_y = y;
    }

    /// The nav hides while condensed and moving down.
    pub fn nav_hidden(&self) -> bool {
        self.scrolled && self.scrolling_down
    }
}

/// Visibility flag fed by an intersection observer.
///
/// With `trigger_once`, the first intersecting notification latches the flag;
/// later notifications cannot clear it and the caller should stop observing.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct RevealState {
    pub visible: bool,
    trigger_once: bool,
    latched: bool,
}

impl RevealState {
    pub fn new(trigger_once: bool) -> Self {
        Self {
            visible: false,
            trigger_once,
            latched: false,
        }
    }

    pub fn trigger_once(&self) -> bool {
        self.trigger_once
    }

    /// Feed one observer notification. Returns true when the element no
    /// longer needs observing.
    pub fn observe(&mut self, intersecting: bool) -> bool {
        if self.latched {
            return true;
        }

        if intersecting {
            self.visible = true;
            if self.trigger_once {
                self.latched = true;
                return true;
            }
        } else {
            self.visible = false;
        }

        false
    }
}

/// Selected category plus the derived view over a static list.
///
/// Pure view filter: never mutates the backing array, never touches the
/// network, and an empty result is a valid outcome.
#[derive(Clone, PartialEq)]
pub struct CategoryFilter {
    selected: String,
}

impl Default for CategoryFilter {
    fn default() -> Self {
        Self {
            selected: ALL_CATEGORY.to_string(),
        }
    }
}

impl CategoryFilter {
    pub fn is_selected(&self, key: &str) -> bool {
        self.selected == key
    }

    pub fn select(&mut self, key: impl Into<String>) {
        self.selected = key.into();
    }

    pub fn matches(&self, category: &str) -> bool {
        self.selected == ALL_CATEGORY || self.selected == category
    }

    pub fn apply<'a, T>(&self, items: &'a [T], category_of: impl Fn(&T) -> &str) -> Vec<&'a T> {
        items
            .iter()
            .filter(|item| self.matches(category_of(item)))
            .collect()
    }
}

/// Per-item boolean toggles (likes, wishlist).
#[derive(Clone, PartialEq, Default)]
pub struct ToggleSet {
    ids: HashSet<String>,
}

impl ToggleSet {
    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn toggle(&mut self, id: &str) {
        if !self.ids.remove(id) {
            self.ids.insert(id.to_string());
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SubmitStatus {
    Idle,
    Sending,
    Sent,
    Failed,
}

impl SubmitStatus {
    pub fn in_flight(self) -> bool {
        matches!(self, Self::Sending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disclosure_open_close_toggle() {
        let mut disclosure = Disclosure::<&str>::default();
        assert!(!disclosure.is_open());

        disclosure.open();
        assert!(disclosure.is_open());

        disclosure.close();
        assert!(!disclosure.is_open());

        disclosure.toggle();
        assert!(disclosure.is_open());
        disclosure.toggle();
        assert!(!disclosure.is_open());
    }

    #[test]
    fn disclosure_close_when_closed_is_a_noop() {
        let mut disclosure = Disclosure::<()>::default();
        disclosure.close();
        disclosure.close();
        assert!(!disclosure.is_open());
    }

    #[test]
    fn disclosure_payload_stored_on_open_and_cleared_on_close() {
        let mut disclosure = Disclosure::default();
        disclosure.open_with("details");
        assert_eq!(disclosure.payload(), Some(&"details"));

        disclosure.close();
        assert_eq!(disclosure.payload(), None);

        disclosure.open();
        assert_eq!(disclosure.payload(), None);
    }

    #[test]
    fn scroll_delta_below_guard_changes_nothing() {
        let mut model = ScrollModel::at(100.0);
        model.observe(105.0);
        assert!(!model.scrolling_down);
        assert!(!model.nav_hidden());
    }

    #[test]
    fn scroll_down_past_guard_hides_nav() {
        let mut model = ScrollModel::at(100.0);
        model.observe(115.0);
        assert!(model.scrolling_down);
        assert!(model.scrolled);
        assert!(model.nav_hidden());
    }

    #[test]
    fn scroll_up_past_guard_shows_nav_again() {
        let mut model = ScrollModel::at(100.0);
        model.observe(115.0);
        assert!(model.nav_hidden());

        model.observe(100.0);
        assert!(!model.scrolling_down);
        assert!(!model.nav_hidden());
    }

    #[test]
    fn scroll_to_top_always_shows_nav() {
        let mut model = ScrollModel::at(600.0);
        model.observe(700.0);
        assert!(model.nav_hidden());
        assert!(model.show_back_to_top);

        model.observe(0.0);
        assert!(!model.scrolling_down);
        assert!(!model.scrolled);
        assert!(!model.show_back_to_top);
    }

    #[test]
    fn scroll_jitter_accumulates_against_anchor() {
        let mut model = ScrollModel::at(100.0);
        model.observe(104.0);
        model.observe(108.0);
        assert!(!model.scrolling_down);

        model.observe(112.0);
        assert!(model.scrolling_down);
    }

    #[test]
    fn reveal_trigger_once_latches() {
        let mut reveal = RevealState::new(true);
        assert!(!reveal.visible);

        let done = reveal.observe(true);
        assert!(reveal.visible);
        assert!(done);

        reveal.observe(false);
        assert!(reveal.visible, "latched flag must not clear");
    }

    #[test]
    fn reveal_without_trigger_once_tracks_intersection() {
        let mut reveal = RevealState::new(false);
        assert!(!reveal.observe(true));
        assert!(reveal.visible);

        assert!(!reveal.observe(false));
        assert!(!reveal.visible);
    }

    #[test]
    fn filter_all_passes_everything() {
        let items = ["Branding", "Web", "Motion", "Web"];
        let filter = CategoryFilter::default();
        assert_eq!(filter.apply(&items, |c| c).len(), items.len());
    }

    #[test]
    fn filter_category_passes_only_matches() {
        let items = ["Branding", "Web", "Motion", "Web"];
        let mut filter = CategoryFilter::default();
        filter.select("Web");

        let filtered = filter.apply(&items, |c| c);
        assert_eq!(filtered.len(), 2);
        assert!(filtered.iter().all(|c| **c == "Web"));
    }

    #[test]
    fn filter_with_no_matches_yields_empty_view() {
        let items = ["Branding", "Web"];
        let mut filter = CategoryFilter::default();
        filter.select("Ceramics");
        assert!(filter.apply(&items, |c| c).is_empty());
    }

    #[test]
    fn toggle_set_flips_per_item() {
        let mut set = ToggleSet::default();
        set.toggle("tote");
        assert!(set.contains("tote"));

        set.toggle("tote");
        assert!(!set.contains("tote"));
        assert!(set.is_empty());
    }
}
