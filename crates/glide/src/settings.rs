//! Settings for glide
//!
//! This module provides scroll and centering configuration using a JSON config file.
//! The engine only ever reads these values.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Errors raised while reading or writing the settings file.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to access settings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to serialize settings: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("failed to parse settings file: {0}")]
    Parse(#[source] serde_json::Error),
}

/// Cursor centering ("typewriter scrolling") configuration
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CenteringSettings {
    /// Keep the cursor inside the comfort zone around the viewport center
    pub enabled: bool,
    /// Comfort zone radius as a percentage of half the viewport height
    pub radius_percent: f32,
    /// Animation smoothness, 0 (instant) to 100 (slowest)
    pub smoothness: f32,
    /// Let navigation bursts shorten the animation like typing bursts do
    pub dynamic_animation: bool,
    /// Scroll in a single step when the cursor moved because of an edit
    pub instant_edit_scroll: bool,
    /// Center after the cursor was placed with the mouse
    pub center_on_mouse: bool,
    /// Center while a mouse-made selection is active
    pub center_on_mouse_selection: bool,
    /// How long a mouse-up keeps counting as "the mouse just moved the cursor"
    pub mouse_up_debounce_ms: u64,
}

impl Default for CenteringSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            radius_percent: 50.0,
            smoothness: 50.0,
            dynamic_animation: true,
            instant_edit_scroll: false,
            center_on_mouse: false,
            center_on_mouse_selection: false,
            mouse_up_debounce_ms: 150,
        }
    }
}

impl CenteringSettings {
    pub fn mouse_up_debounce(&self) -> Duration {
        Duration::from_millis(self.mouse_up_debounce_ms)
    }
}

/// Smooth wheel scrolling configuration
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SmoothScrollSettings {
    /// Animate discrete mouse-wheel input
    pub mouse_enabled: bool,
    /// Animate trackpad input with momentum
    pub trackpad_enabled: bool,
    /// Reverse the scroll direction
    pub invert: bool,
    /// Mouse-wheel distance multiplier
    pub mouse_speed: f32,
    /// Trackpad distance multiplier
    pub trackpad_speed: f32,
    /// Duration of one mouse-wheel animation in milliseconds
    pub mouse_duration_ms: u64,
    /// Trackpad coasting, 0 (stops at once) to 100 (longest glide)
    pub trackpad_smoothness: f32,
    /// Delta magnitude in pixels at which a trackpad stroke gets full coasting
    pub friction_threshold: f32,
}

impl Default for SmoothScrollSettings {
    fn default() -> Self {
        Self {
            mouse_enabled: true,
            trackpad_enabled: true,
            invert: false,
            mouse_speed: default_speed(),
            trackpad_speed: default_speed(),
            mouse_duration_ms: default_mouse_duration_ms(),
            trackpad_smoothness: default_trackpad_smoothness(),
            friction_threshold: default_friction_threshold(),
        }
    }
}

impl SmoothScrollSettings {
    pub fn invert_sign(&self) -> f32 {
        if self.invert {
            -1.0
        } else {
            1.0
        }
    }

    pub fn mouse_duration(&self) -> Duration {
        Duration::from_millis(self.mouse_duration_ms)
    }
}

/// Cursor-follows-scroll configuration
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FollowSettings {
    /// Move the cursor along when the document is scrolled by hand
    pub enabled: bool,
}

impl Default for FollowSettings {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Tuning knobs of the mouse/trackpad classifier
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClassifierSettings {
    /// How long a confirmed trackpad keeps later events classified as trackpad
    pub grace_ms: u64,
    /// Mouse score at or above which an event counts as mouse-wheel input
    pub score_threshold: f32,
    /// Gap between events that starts a new burst
    pub burst_gap_ms: u64,
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            grace_ms: default_grace_ms(),
            score_threshold: default_score_threshold(),
            burst_gap_ms: default_burst_gap_ms(),
        }
    }
}

impl ClassifierSettings {
    pub fn grace(&self) -> Duration {
        Duration::from_millis(self.grace_ms)
    }

    pub fn burst_gap(&self) -> Duration {
        Duration::from_millis(self.burst_gap_ms)
    }
}

/// Glide settings
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct GlideSettings {
    /// Cursor centering
    #[serde(default)]
    pub centering: CenteringSettings,
    /// Smooth wheel scrolling
    #[serde(default)]
    pub smooth_scroll: SmoothScrollSettings,
    /// Cursor follows manual scrolling
    #[serde(default)]
    pub cursor_follows_scroll: FollowSettings,
    /// Input device classifier
    #[serde(default)]
    pub classifier: ClassifierSettings,
}

const MAX_PERCENT: f32 = 100.0;
const MAX_SPEED: f32 = 10.0;
const MAX_DURATION_MS: u64 = 2000;
const MAX_GRACE_MS: u64 = 5000;

fn default_speed() -> f32 {
    1.0
}

fn default_mouse_duration_ms() -> u64 {
    200
}

fn default_trackpad_smoothness() -> f32 {
    85.0
}

fn default_friction_threshold() -> f32 {
    40.0
}

fn default_grace_ms() -> u64 {
    1000
}

fn default_score_threshold() -> f32 {
    1.1
}

fn default_burst_gap_ms() -> u64 {
    300
}

fn sanitize_percent(value: f32, default: f32) -> f32 {
    if value.is_finite() {
        value.clamp(0.0, MAX_PERCENT)
    } else {
        default
    }
}

fn sanitize_positive(value: f32, default: f32, max: f32) -> f32 {
    if value.is_finite() && value > 0.0 {
        value.min(max)
    } else {
        default
    }
}

fn sanitize_millis(value: u64, default: u64, max: u64) -> u64 {
    if value == 0 {
        default
    } else {
        value.min(max)
    }
}

impl GlideSettings {
    fn sanitize(mut self) -> Self {
        let defaults = GlideSettings::default();

        let centering = &mut self.centering;
        centering.radius_percent =
            sanitize_percent(centering.radius_percent, defaults.centering.radius_percent);
        centering.smoothness = sanitize_percent(centering.smoothness, defaults.centering.smoothness);
        centering.mouse_up_debounce_ms = centering.mouse_up_debounce_ms.min(MAX_DURATION_MS);

        let scroll = &mut self.smooth_scroll;
        scroll.mouse_speed = sanitize_positive(scroll.mouse_speed, default_speed(), MAX_SPEED);
        scroll.trackpad_speed =
            sanitize_positive(scroll.trackpad_speed, default_speed(), MAX_SPEED);
        scroll.mouse_duration_ms = sanitize_millis(
            scroll.mouse_duration_ms,
            default_mouse_duration_ms(),
            MAX_DURATION_MS,
        );
        scroll.trackpad_smoothness =
            sanitize_percent(scroll.trackpad_smoothness, default_trackpad_smoothness());
        scroll.friction_threshold = sanitize_positive(
            scroll.friction_threshold,
            default_friction_threshold(),
            f32::MAX,
        );

        let classifier = &mut self.classifier;
        classifier.grace_ms = classifier.grace_ms.min(MAX_GRACE_MS);
        classifier.score_threshold = sanitize_positive(
            classifier.score_threshold,
            default_score_threshold(),
            f32::MAX,
        );
        classifier.burst_gap_ms =
            sanitize_millis(classifier.burst_gap_ms, default_burst_gap_ms(), MAX_GRACE_MS);

        self
    }

    /// Load settings from a JSON file, reporting every failure.
    pub fn try_load(config_path: &Path) -> Result<Self, SettingsError> {
        let contents = std::fs::read_to_string(config_path)?;
        let settings = serde_json::from_str::<Self>(&contents).map_err(SettingsError::Parse)?;
        Ok(settings.sanitize())
    }

    /// Load settings from a JSON file
    pub fn load(config_path: &Path) -> Self {
        if config_path.exists() {
            match Self::try_load(config_path) {
                Ok(settings) => return settings,
                Err(e) => {
                    log::warn!("Failed to load config file {}: {}", config_path.display(), e);
                }
            }
        }

        // Return defaults if file doesn't exist or parsing fails
        Self::default()
    }

    /// Load settings from a JSON file and create a default file when missing.
    pub fn load_or_create(config_path: &Path) -> Self {
        let settings = Self::load(config_path);
        if !config_path.exists() {
            if let Err(err) = settings.save(config_path) {
                log::warn!(
                    "failed to initialize settings file at {}: {err}",
                    config_path.display()
                );
            }
        }
        settings
    }

    /// Save settings to a JSON file.
    pub fn save(&self, config_path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let serialized = serde_json::to_string_pretty(self).map_err(SettingsError::Serialize)?;
        std::fs::write(config_path, serialized)?;
        Ok(())
    }

    /// Get the config directory path
    pub fn config_dir() -> PathBuf {
        directories::BaseDirs::new()
            .map(|dirs| dirs.home_dir().join(".glide"))
            .unwrap_or_else(|| PathBuf::from("./.glide"))
    }

    /// Get the default config file path
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("settings.json")
    }
}
