//! Mouse-wheel vs. trackpad classification
//!
//! Both device types can emit pixel-mode wheel events, so no single signal
//! separates them. The classifier combines the delta unit, the axis shape of
//! the event, a sticky window after confirmed trackpad use and a composite
//! score built from burst timing, batch sizes, canonical hardware deltas and
//! delta magnitude.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::settings::ClassifierSettings;
use crate::wheel::WheelSample;

/// Inter-event delays remembered within the current burst.
pub const DELAY_HISTORY_LEN: usize = 50;
/// Completed bursts whose sizes are remembered.
pub const BATCH_HISTORY_LEN: usize = 3;
/// EWMA smoothing factor of the interval energy.
pub const ENERGY_SMOOTHING: f32 = 0.3;
/// The interval energy is discarded when not refreshed within this window.
pub const ENERGY_WINDOW: Duration = Duration::from_millis(600);

/// Per-notch deltas emitted by common wheel hardware and drivers.
const CANONICAL_WHEEL_DELTAS: [f32; 2] = [120.0, 197.18];
const CANONICAL_TOLERANCE: f32 = 0.01;

const BURST_START_BONUS: f32 = 0.6;
const SLOW_DELAY_BONUS: f32 = 0.3;
const SLOW_DELAY_RATIO: f32 = 1.5;
const SMALL_BATCH_BONUS: f32 = 0.3;
const SMALL_BATCH_MAX: f32 = 3.0;
const CANONICAL_DELTA_BONUS: f32 = 1.2;
const MAGNITUDE_FLOOR: f32 = 100.0;
const MAGNITUDE_SPAN: f32 = 100.0;
const MAGNITUDE_MAX_BONUS: f32 = 1.0;
const HIGH_ENERGY_RATE: f32 = 40.0;
const HIGH_ENERGY_PENALTY: f32 = 0.2;

/// The device class a wheel event is attributed to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputDevice {
    MouseWheel,
    Trackpad,
}

impl InputDevice {
    pub fn is_trackpad(self) -> bool {
        matches!(self, InputDevice::Trackpad)
    }
}

#[derive(Clone, Debug)]
struct BoundedHistory {
    values: VecDeque<f32>,
    capacity: usize,
}

impl BoundedHistory {
    fn new(capacity: usize) -> Self {
        Self {
            values: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    fn push(&mut self, value: f32) {
        if self.values.len() == self.capacity {
            self.values.pop_front();
        }
        self.values.push_back(value);
    }

    fn mean(&self) -> Option<f32> {
        if self.values.is_empty() {
            return None;
        }
        Some(self.values.iter().sum::<f32>() / self.values.len() as f32)
    }

    fn len(&self) -> usize {
        self.values.len()
    }

    fn clear(&mut self) {
        self.values.clear();
    }
}

/// Exponentially weighted event rate (events per second).
#[derive(Clone, Debug, Default)]
pub struct IntervalEnergy {
    value: f32,
    updated: Option<Instant>,
}

impl IntervalEnergy {
    /// Fold in one inter-event interval observed at `now`.
    pub fn observe(&mut self, now: Instant, interval: Duration) -> f32 {
        let rate = 1000.0 / (interval.as_secs_f32() * 1000.0).max(1.0);
        self.value = if self.is_fresh(now) {
            ENERGY_SMOOTHING * rate + (1.0 - ENERGY_SMOOTHING) * self.value
        } else {
            rate
        };
        self.updated = Some(now);
        self.value
    }

    pub fn value_at(&self, now: Instant) -> f32 {
        if self.is_fresh(now) {
            self.value
        } else {
            0.0
        }
    }

    fn is_fresh(&self, now: Instant) -> bool {
        self.updated
            .is_some_and(|updated| now.saturating_duration_since(updated) <= ENERGY_WINDOW)
    }
}

/// Running statistics owned by the classifier. Never persisted.
#[derive(Clone, Debug)]
pub struct ClassifierState {
    last_trackpad_use: Option<Instant>,
    last_event: Option<Instant>,
    delays: BoundedHistory,
    batch_sizes: BoundedHistory,
    current_batch: u32,
    energy: IntervalEnergy,
}

impl Default for ClassifierState {
    fn default() -> Self {
        Self {
            last_trackpad_use: None,
            last_event: None,
            delays: BoundedHistory::new(DELAY_HISTORY_LEN),
            batch_sizes: BoundedHistory::new(BATCH_HISTORY_LEN),
            current_batch: 0,
            energy: IntervalEnergy::default(),
        }
    }
}

impl ClassifierState {
    /// Track burst boundaries. Returns true when this event starts a new burst.
    ///
    /// A gap longer than `burst_gap` (or no previous event at all) closes the
    /// running burst into the batch-size history and clears the delay history.
    pub fn analyze_delay(&mut self, since_previous: Option<Duration>, burst_gap: Duration) -> bool {
        match since_previous {
            Some(gap) if gap <= burst_gap => {
                self.delays.push(gap.as_secs_f32() * 1000.0);
                self.current_batch += 1;
                false
            }
            _ => {
                if self.current_batch > 0 {
                    self.batch_sizes.push(self.current_batch as f32);
                }
                self.delays.clear();
                self.current_batch = 1;
                true
            }
        }
    }

    pub fn last_trackpad_use(&self) -> Option<Instant> {
        self.last_trackpad_use
    }

    pub fn mean_delay_ms(&self) -> Option<f32> {
        self.delays.mean()
    }

    pub fn mean_batch_size(&self) -> Option<f32> {
        self.batch_sizes.mean()
    }
}

/// Timing and shape signals that feed the mouse score.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScoreSignals {
    pub burst_start: bool,
    pub delay_ms: Option<f32>,
    pub mean_delay_ms: Option<f32>,
    pub delay_samples: usize,
    pub mean_batch_size: Option<f32>,
    pub delta_y: f32,
    pub energy: f32,
}

/// Composite evidence that an event came from a notched wheel.
pub fn mouse_score(signals: &ScoreSignals) -> f32 {
    let mut score = 0.0;

    if signals.burst_start {
        score += BURST_START_BONUS;
    } else if let (Some(delay), Some(mean)) = (signals.delay_ms, signals.mean_delay_ms) {
        if signals.delay_samples >= 2 && delay > mean * SLOW_DELAY_RATIO {
            score += SLOW_DELAY_BONUS;
        }
    }

    if signals
        .mean_batch_size
        .is_some_and(|mean| mean <= SMALL_BATCH_MAX)
    {
        score += SMALL_BATCH_BONUS;
    }

    if is_canonical_wheel_delta(signals.delta_y) {
        score += CANONICAL_DELTA_BONUS;
    }

    let magnitude = signals.delta_y.abs();
    if magnitude > MAGNITUDE_FLOOR {
        score += ((magnitude - MAGNITUDE_FLOOR) / MAGNITUDE_SPAN).min(MAGNITUDE_MAX_BONUS);
    }

    if signals.energy > HIGH_ENERGY_RATE {
        score -= HIGH_ENERGY_PENALTY;
    }

    score
}

/// Whole multiples of the per-notch deltas that wheel drivers emit.
pub fn is_canonical_wheel_delta(delta: f32) -> bool {
    let magnitude = delta.abs();
    CANONICAL_WHEEL_DELTAS.iter().any(|base| {
        let ratio = magnitude / base;
        let notches = ratio.round();
        notches >= 1.0 && (ratio - notches).abs() < CANONICAL_TOLERANCE
    })
}

/// Labels wheel events as mouse-wheel or trackpad input.
#[derive(Clone, Debug, Default)]
pub struct WheelSampleClassifier {
    state: ClassifierState,
}

impl WheelSampleClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ClassifierState {
        &self.state
    }

    /// Classify one normalized sample, updating the running statistics.
    pub fn classify(&mut self, sample: &WheelSample, settings: &ClassifierSettings) -> InputDevice {
        let now = sample.timestamp;
        let state = &mut self.state;

        let since_previous = state
            .last_event
            .map(|previous| now.saturating_duration_since(previous));
        let first_event = state.last_event.is_none();
        let mean_delay_ms = state.delays.mean();
        let delay_samples = state.delays.len();
        let mean_batch_size = state.batch_sizes.mean();

        state.last_event = Some(now);
        let burst_start = state.analyze_delay(since_previous, settings.burst_gap());
        if let Some(gap) = since_previous {
            state.energy.observe(now, gap);
        }

        if !sample.delta_mode.is_pixel() {
            state.last_trackpad_use = None;
            log::debug!("wheel classified as mouse: {:?} units", sample.delta_mode);
            return InputDevice::MouseWheel;
        }

        if sample.is_two_axis() {
            state.last_trackpad_use = Some(now);
            log::debug!("wheel classified as trackpad: two-axis delta");
            return InputDevice::Trackpad;
        }

        if let Some(last_use) = state.last_trackpad_use {
            if now.saturating_duration_since(last_use) < settings.grace() {
                log::trace!("wheel classified as trackpad: within grace window");
                return InputDevice::Trackpad;
            }
        }

        if first_event {
            log::debug!("wheel classified as mouse: no history yet");
            return InputDevice::MouseWheel;
        }

        let signals = ScoreSignals {
            burst_start,
            delay_ms: since_previous.map(|gap| gap.as_secs_f32() * 1000.0),
            mean_delay_ms,
            delay_samples,
            mean_batch_size,
            delta_y: sample.delta_y,
            energy: state.energy.value_at(now),
        };
        let score = mouse_score(&signals);

        if score < settings.score_threshold {
            state.last_trackpad_use = Some(now);
            log::trace!("wheel classified as trackpad: score {score:.2}");
            InputDevice::Trackpad
        } else {
            log::debug!("wheel classified as mouse: score {score:.2}");
            InputDevice::MouseWheel
        }
    }
}
