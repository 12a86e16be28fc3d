//! Glide - scroll and cursor synchronization for text editors
//!
//! This crate classifies wheel input as mouse-wheel or trackpad, animates the
//! resulting scroll with a matching physical model, keeps the cursor centered
//! while typing and drags it along when the view is scrolled by hand.
//! Hosts plug in through the traits in [`host`] and [`frame`].

pub mod centering;
pub mod classifier;
pub mod easing;
pub mod follow;
pub mod frame;
pub mod host;
pub mod intensity;
pub mod mouse_wheel;
pub mod session;
pub mod settings;
pub mod suppression;
pub mod trackpad;
pub mod wheel;

pub use centering::{CenteringPlan, CursorCenteringController};
pub use classifier::{InputDevice, WheelSampleClassifier};
pub use follow::CursorFollowsScrollController;
pub use frame::{FrameHandle, FrameQueue, FrameScheduler};
pub use host::{
    ChangeOrigin, CursorChange, CursorGeometry, EditorHost, ElementId, ScrollMetrics,
    ScrollSurface, ViewKind,
};
pub use session::{ScrollEngine, SharedEngine, ViewSession, WheelDisposition};
pub use settings::{GlideSettings, SettingsError};
pub use wheel::{DeltaMode, WheelSample};
