//! Scroll intensity
//!
//! A running estimate of how rapidly the user is producing input. Every
//! qualifying event adds one unit; the value bleeds off linearly with time.
//! When the value climbs past [`BURST_THRESHOLD`] the user is typing or
//! navigating faster than a full-length animation could keep up with.

use std::time::Instant;

/// Units lost per elapsed millisecond.
pub const DECAY_PER_MS: f32 = 0.015;

/// Intensity above which input counts as a rapid-fire burst.
pub const BURST_THRESHOLD: f32 = 3.0;

#[derive(Clone, Debug, Default)]
pub struct IntensityTracker {
    value: f32,
    last_event: Option<Instant>,
}

impl IntensityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value after applying decay up to `now`, without recording an event.
    pub fn value_at(&self, now: Instant) -> f32 {
        let Some(last) = self.last_event else {
            return self.value;
        };
        let elapsed_ms = now.saturating_duration_since(last).as_secs_f32() * 1000.0;
        (self.value - elapsed_ms * DECAY_PER_MS).max(0.0)
    }

    /// Record one qualifying event and return the new value.
    pub fn bump(&mut self, now: Instant) -> f32 {
        self.value = self.value_at(now) + 1.0;
        self.last_event = Some(now);
        self.value
    }

    pub fn is_bursting(&self, now: Instant) -> bool {
        self.value_at(now) > BURST_THRESHOLD
    }

    pub fn reset(&mut self) {
        self.value = 0.0;
        self.last_event = None;
    }
}
