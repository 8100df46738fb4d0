//! Swipe classification from per-frame vertical hand positions.
//!
//! Compares each sample with the previous one and, when the hand jumps by
//! more than the threshold, schedules a swipe that fires after the
//! debounce delay.  A newer crossing replaces the scheduled one, so a burst
//! of fast frames yields a single swipe.  The classifier runs on an explicit
//! clock; the session turns each [`Observation::Scheduled`] deadline into an
//! event-loop timer.

use std::time::{Duration, Instant};

use tracing::{debug, trace};

// ── Events ─────────────────────────────────────────────────

/// Discrete swipe commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureEvent {
    SwipeUp,
    SwipeDown,
}

impl GestureEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SwipeUp => "swipe-up",
            Self::SwipeDown => "swipe-down",
        }
    }

    /// Classify a frame-to-frame displacement.
    ///
    /// Hand moving toward the top of the frame (negative delta) is a swipe
    /// down; toward the bottom is a swipe up.  The camera image is mirrored.
    /// Movement within `threshold` is no swipe.
    fn from_delta(delta: f32, threshold: f32) -> Option<Self> {
        if delta < -threshold {
            Some(Self::SwipeDown)
        } else if delta > threshold {
            Some(Self::SwipeUp)
        } else {
            None
        }
    }
}

/// What a single observation did to the classifier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Observation {
    /// No hand this frame; baseline cleared.
    HandLost,
    /// First sample after a gap; baseline recorded.
    Baseline,
    /// Movement within the threshold.
    Steady { delta: f32 },
    /// Threshold crossed; a swipe is scheduled for `deadline`.
    Scheduled {
        delta: f32,
        event: GestureEvent,
        deadline: Instant,
        /// Whether an earlier scheduled swipe was cancelled.
        replaced: bool,
    },
}

// ── Config ─────────────────────────────────────────────────

/// Classifier thresholds and timing.
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// Minimum frame-to-frame displacement (normalized units) for a swipe.
    pub threshold: f32,
    /// Delay before a scheduled swipe fires (ms).
    pub debounce_ms: u64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            threshold: 0.05,
            debounce_ms: 300,
        }
    }
}

impl ClassifierConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

// ── State ──────────────────────────────────────────────────

/// A swipe waiting for its debounce window to elapse.
#[derive(Debug, Clone, Copy, PartialEq)]
struct PendingSwipe {
    event: GestureEvent,
    deadline: Instant,
}

/// Debounced swipe classifier.
#[derive(Debug)]
pub struct GestureClassifier {
    pub config: ClassifierConfig,
    /// Vertical position from the previous frame with a hand.
    last_hand_y: Option<f32>,
    /// Most recent scheduled swipe.
    pending: Option<PendingSwipe>,
}

impl Default for GestureClassifier {
    fn default() -> Self {
        Self::new(ClassifierConfig::default())
    }
}

impl GestureClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self {
            config,
            last_hand_y: None,
            pending: None,
        }
    }

    #[cfg(test)]
    pub fn last_hand_y(&self) -> Option<f32> {
        self.last_hand_y
    }

    #[cfg(test)]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.map(|p| p.deadline)
    }

    #[cfg(test)]
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Feed one frame's hand position (`None` when no hand was detected).
    ///
    /// A non-finite position counts as no hand.
    pub fn observe(&mut self, hand_y: Option<f32>, now: Instant) -> Observation {
        let Some(y) = hand_y.filter(|y| y.is_finite()) else {
            if hand_y.is_some() {
                debug!("Discarding non-finite hand position");
            }
            if self.last_hand_y.take().is_some() {
                debug!("Hand lost, baseline cleared");
            }
            return Observation::HandLost;
        };

        let Some(prev) = self.last_hand_y.replace(y) else {
            trace!(y, "baseline recorded");
            return Observation::Baseline;
        };

        let delta = y - prev;
        let Some(event) = GestureEvent::from_delta(delta, self.config.threshold) else {
            trace!(y, delta, "steady");
            return Observation::Steady { delta };
        };
        let deadline = now + self.config.debounce();
        let replaced = self
            .pending
            .replace(PendingSwipe { event, deadline })
            .is_some();
        debug!(
            "Crossing {:+.3} -> {} scheduled{}",
            delta,
            event.as_str(),
            if replaced { " (replaced pending)" } else { "" }
        );
        Observation::Scheduled {
            delta,
            event,
            deadline,
            replaced,
        }
    }

    /// Fire the scheduled swipe if its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<GestureEvent> {
        match self.pending {
            Some(p) if p.deadline <= now => {
                self.pending = None;
                debug!("Swipe fired: {}", p.event.as_str());
                Some(p.event)
            }
            _ => None,
        }
    }

    /// Drop the scheduled swipe without firing it.
    pub fn cancel_pending(&mut self) -> bool {
        self.pending.take().is_some()
    }

    /// Generate s-expression for status reporting.
    pub fn status_sexp(&self) -> String {
        let last = self
            .last_hand_y
            .map(|y| format!("{:.3}", y))
            .unwrap_or_else(|| "nil".to_string());
        let pending = self
            .pending
            .map(|p| format!(":{}", p.event.as_str()))
            .unwrap_or_else(|| "nil".to_string());
        format!(
            "(:threshold {:.3} :debounce-ms {} :last-hand-y {} :pending {})",
            self.config.threshold, self.config.debounce_ms, last, pending,
        )
    }
}

// ── Tests ──────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    /// Feed `(offset_ms, y)` samples and poll after each; collects fired
    /// events, then drains anything left after the last debounce window.
    fn run(classifier: &mut GestureClassifier, t0: Instant, samples: &[(u64, Option<f32>)]) -> Vec<GestureEvent> {
        let mut fired = Vec::new();
        for &(at, y) in samples {
            let now = t0 + ms(at);
            fired.extend(classifier.poll(now));
            classifier.observe(y, now);
        }
        let end = samples.last().map(|s| s.0).unwrap_or(0) + classifier.config.debounce_ms + 1;
        fired.extend(classifier.poll(t0 + ms(end)));
        fired
    }

    #[test]
    fn test_new_state() {
        let classifier = GestureClassifier::default();
        assert_eq!(classifier.config.threshold, 0.05);
        assert_eq!(classifier.config.debounce_ms, 300);
        assert!(classifier.last_hand_y().is_none());
        assert!(!classifier.has_pending());
    }

    #[test]
    fn test_first_sample_is_baseline() {
        let mut classifier = GestureClassifier::default();
        let now = Instant::now();
        assert_eq!(classifier.observe(Some(0.5), now), Observation::Baseline);
        assert_eq!(classifier.last_hand_y(), Some(0.5));
        assert!(classifier.poll(now + ms(1000)).is_none());
    }

    #[test]
    fn test_upward_motion_swipes_down_after_debounce() {
        let mut classifier = GestureClassifier::default();
        let t0 = Instant::now();
        classifier.observe(Some(0.5), t0);

        let obs = classifier.observe(Some(0.3), t0 + ms(33));
        assert!(matches!(
            obs,
            Observation::Scheduled { event: GestureEvent::SwipeDown, replaced: false, .. }
        ));

        assert!(classifier.poll(t0 + ms(33 + 299)).is_none());
        assert_eq!(classifier.poll(t0 + ms(33 + 300)), Some(GestureEvent::SwipeDown));
        assert!(classifier.poll(t0 + ms(2000)).is_none());
    }

    #[test]
    fn test_downward_motion_swipes_up() {
        let mut classifier = GestureClassifier::default();
        let fired = run(&mut classifier, Instant::now(), &[(0, Some(0.3)), (33, Some(0.5))]);
        assert_eq!(fired, vec![GestureEvent::SwipeUp]);
    }

    #[test]
    fn test_small_motion_updates_baseline_only() {
        let mut classifier = GestureClassifier::default();
        let t0 = Instant::now();
        classifier.observe(Some(0.5), t0);
        let obs = classifier.observe(Some(0.52), t0 + ms(33));
        assert!(matches!(obs, Observation::Steady { .. }));
        assert_eq!(classifier.last_hand_y(), Some(0.52));
        assert!(!classifier.has_pending());
        assert!(classifier.poll(t0 + ms(5000)).is_none());
    }

    #[test]
    fn test_baseline_moves_even_when_crossing() {
        let mut classifier = GestureClassifier::default();
        let t0 = Instant::now();
        classifier.observe(Some(0.5), t0);
        classifier.observe(Some(0.3), t0 + ms(33));
        assert_eq!(classifier.last_hand_y(), Some(0.3));
        // Measured from 0.3, not 0.5: steady.
        let obs = classifier.observe(Some(0.28), t0 + ms(66));
        assert!(matches!(obs, Observation::Steady { .. }));
    }

    #[test]
    fn test_crossings_within_window_collapse_to_last() {
        let mut classifier = GestureClassifier::default();
        let t0 = Instant::now();
        classifier.observe(Some(0.5), t0);
        classifier.observe(Some(0.3), t0 + ms(10));
        let obs = classifier.observe(Some(0.6), t0 + ms(110));
        assert!(matches!(
            obs,
            Observation::Scheduled { event: GestureEvent::SwipeUp, replaced: true, .. }
        ));

        // First crossing's deadline passes without firing.
        assert!(classifier.poll(t0 + ms(310)).is_none());
        assert_eq!(classifier.poll(t0 + ms(410)), Some(GestureEvent::SwipeUp));
        assert!(classifier.poll(t0 + ms(1000)).is_none());
    }

    #[test]
    fn test_sliding_window_burst_fires_once() {
        let mut classifier = GestureClassifier::default();
        // A long swipe: 10 fast frames 33 ms apart, each crossing the threshold.
        let samples: Vec<(u64, Option<f32>)> = (0..10)
            .map(|i| (i * 33, Some(0.9 - i as f32 * 0.08)))
            .collect();
        let fired = run(&mut classifier, Instant::now(), &samples);
        assert_eq!(fired, vec![GestureEvent::SwipeDown]);
    }

    #[test]
    fn test_separate_windows_fire_separately() {
        let mut classifier = GestureClassifier::default();
        let fired = run(
            &mut classifier,
            Instant::now(),
            &[
                (0, Some(0.5)),
                (33, Some(0.3)),
                (400, Some(0.3)),
                (433, Some(0.5)),
            ],
        );
        assert_eq!(fired, vec![GestureEvent::SwipeDown, GestureEvent::SwipeUp]);
    }

    #[test]
    fn test_no_crossing_never_fires() {
        let mut classifier = GestureClassifier::default();
        let samples: Vec<(u64, Option<f32>)> = (0..50)
            .map(|i| (i * 33, Some(0.2 + i as f32 * 0.012)))
            .collect();
        assert!(run(&mut classifier, Instant::now(), &samples).is_empty());
    }

    #[test]
    fn test_hand_lost_resets_baseline() {
        let mut classifier = GestureClassifier::default();
        let t0 = Instant::now();
        classifier.observe(Some(0.5), t0);
        assert_eq!(classifier.observe(None, t0 + ms(33)), Observation::HandLost);
        assert!(classifier.last_hand_y().is_none());

        // A far-away sample after the gap only re-establishes the baseline.
        assert_eq!(classifier.observe(Some(0.1), t0 + ms(66)), Observation::Baseline);
        assert!(!classifier.has_pending());
        assert!(classifier.poll(t0 + ms(1000)).is_none());
    }

    #[test]
    fn test_gap_does_not_bridge_samples() {
        let mut classifier = GestureClassifier::default();
        let fired = run(
            &mut classifier,
            Instant::now(),
            &[(0, Some(0.9)), (33, None), (66, Some(0.1)), (99, Some(0.12))],
        );
        assert!(fired.is_empty());
    }

    #[test]
    fn test_hand_lost_keeps_scheduled_swipe() {
        let mut classifier = GestureClassifier::default();
        let t0 = Instant::now();
        classifier.observe(Some(0.5), t0);
        classifier.observe(Some(0.3), t0 + ms(33));
        classifier.observe(None, t0 + ms(66));
        assert_eq!(classifier.poll(t0 + ms(333)), Some(GestureEvent::SwipeDown));
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let mut classifier = GestureClassifier::new(ClassifierConfig {
            threshold: 0.25,
            debounce_ms: 300,
        });
        let t0 = Instant::now();
        classifier.observe(Some(0.5), t0);
        // 0.75 - 0.5 is exactly representable in f32.
        let obs = classifier.observe(Some(0.75), t0 + ms(33));
        assert_eq!(obs, Observation::Steady { delta: 0.25 });
    }

    #[test]
    fn test_cancel_pending() {
        let mut classifier = GestureClassifier::default();
        let t0 = Instant::now();
        classifier.observe(Some(0.5), t0);
        classifier.observe(Some(0.3), t0 + ms(33));
        assert!(classifier.cancel_pending());
        assert!(!classifier.cancel_pending());
        assert!(classifier.poll(t0 + ms(1000)).is_none());
        assert_eq!(classifier.last_hand_y(), Some(0.3));
    }

    #[test]
    fn test_non_finite_position_is_hand_lost() {
        let mut classifier = GestureClassifier::default();
        let t0 = Instant::now();
        classifier.observe(Some(0.5), t0);
        assert_eq!(classifier.observe(Some(f32::NAN), t0 + ms(33)), Observation::HandLost);
        assert!(classifier.last_hand_y().is_none());
        assert!(!classifier.has_pending());

        // The next real sample is a fresh baseline, not a crossing.
        assert_eq!(classifier.observe(Some(0.5), t0 + ms(66)), Observation::Baseline);
        assert_eq!(classifier.observe(Some(f32::INFINITY), t0 + ms(99)), Observation::HandLost);
        assert!(classifier.poll(t0 + ms(1000)).is_none());
    }

    #[test]
    fn test_from_delta_requires_crossing() {
        assert_eq!(GestureEvent::from_delta(-0.06, 0.05), Some(GestureEvent::SwipeDown));
        assert_eq!(GestureEvent::from_delta(0.06, 0.05), Some(GestureEvent::SwipeUp));
        assert_eq!(GestureEvent::from_delta(0.05, 0.05), None);
        assert_eq!(GestureEvent::from_delta(-0.05, 0.05), None);
        assert_eq!(GestureEvent::from_delta(f32::NAN, 0.05), None);
    }

    #[test]
    fn test_custom_debounce() {
        let mut classifier = GestureClassifier::new(ClassifierConfig {
            threshold: 0.05,
            debounce_ms: 50,
        });
        let t0 = Instant::now();
        classifier.observe(Some(0.5), t0);
        classifier.observe(Some(0.7), t0);
        assert_eq!(classifier.next_deadline(), Some(t0 + ms(50)));
        assert_eq!(classifier.poll(t0 + ms(50)), Some(GestureEvent::SwipeUp));
    }

    #[test]
    fn test_status_sexp() {
        let mut classifier = GestureClassifier::default();
        assert_eq!(
            classifier.status_sexp(),
            "(:threshold 0.050 :debounce-ms 300 :last-hand-y nil :pending nil)"
        );
        let t0 = Instant::now();
        classifier.observe(Some(0.5), t0);
        classifier.observe(Some(0.25), t0);
        let sexp = classifier.status_sexp();
        assert!(sexp.contains(":last-hand-y 0.250"));
        assert!(sexp.contains(":pending :swipe-down"));
    }

    #[test]
    fn test_gesture_event_as_str() {
        assert_eq!(GestureEvent::SwipeUp.as_str(), "swipe-up");
        assert_eq!(GestureEvent::SwipeDown.as_str(), "swipe-down");
    }
}
