//! Engine entry points
//!
//! [`ScrollEngine`] is the object a host editor talks to. It owns the
//! settings, the device classifier (which outlives any single view) and a
//! [`ViewSession`] holding everything tied to the active document view.
//! Every host notification maps to one method here.

use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;

use crate::centering::{CenteringPlan, CursorCenteringController};
use crate::classifier::{InputDevice, WheelSampleClassifier};
use crate::follow::CursorFollowsScrollController;
use crate::frame::{FrameHandle, FrameScheduler};
use crate::host::{CursorChange, EditorHost, ViewKind};
use crate::mouse_wheel::MouseWheelAnimator;
use crate::settings::GlideSettings;
use crate::suppression::SuppressionFlags;
use crate::trackpad::TrackpadAnimator;
use crate::wheel::WheelSample;

/// Engine shared between threads of a host with real concurrency.
pub type SharedEngine = Arc<Mutex<ScrollEngine>>;

/// Whether the host should still run its native handling of a wheel event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WheelDisposition {
    /// The engine animates the scroll; suppress the native default.
    Handled,
    /// The engine ignored the event; let the host scroll natively.
    PassThrough,
}

impl WheelDisposition {
    pub fn is_handled(self) -> bool {
        matches!(self, WheelDisposition::Handled)
    }
}

/// State bound to one active document view.
#[derive(Debug)]
pub struct ViewSession {
    kind: ViewKind,
    flags: SuppressionFlags,
    mouse: MouseWheelAnimator,
    trackpad: TrackpadAnimator,
    centering: CursorCenteringController,
    follow: CursorFollowsScrollController,
}

impl ViewSession {
    fn new(kind: ViewKind) -> Self {
        Self {
            kind,
            flags: SuppressionFlags::new(),
            mouse: MouseWheelAnimator::new(),
            trackpad: TrackpadAnimator::new(),
            centering: CursorCenteringController::new(),
            follow: CursorFollowsScrollController::new(),
        }
    }

    pub fn kind(&self) -> ViewKind {
        self.kind
    }

    pub fn flags(&self) -> &SuppressionFlags {
        &self.flags
    }

    pub fn follow(&self) -> &CursorFollowsScrollController {
        &self.follow
    }

    pub fn is_animating(&self) -> bool {
        self.mouse.active_count() > 0
            || self.trackpad.active_count() > 0
            || self.centering.is_animating()
    }

    /// Number of running animations across every animator.
    pub fn active_animations(&self) -> usize {
        self.mouse.active_count()
            + self.trackpad.active_count()
            + usize::from(self.centering.is_animating())
    }

    fn cancel_all(&mut self, frames: &mut dyn FrameScheduler) {
        self.mouse.cancel_all(frames);
        self.trackpad.cancel_all(frames);
        self.centering.cancel(frames);
    }
}

#[derive(Debug)]
pub struct ScrollEngine {
    settings: GlideSettings,
    classifier: WheelSampleClassifier,
    view: Option<ViewSession>,
}

impl ScrollEngine {
    pub fn new(settings: GlideSettings) -> Self {
        Self {
            settings,
            classifier: WheelSampleClassifier::new(),
            view: None,
        }
    }

    /// Create an engine behind a mutex for hosts that touch it from several threads.
    pub fn shared(settings: GlideSettings) -> SharedEngine {
        Arc::new(Mutex::new(Self::new(settings)))
    }

    pub fn settings(&self) -> &GlideSettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: GlideSettings) {
        self.settings = settings;
    }

    pub fn classifier(&self) -> &WheelSampleClassifier {
        &self.classifier
    }

    pub fn view(&self) -> Option<&ViewSession> {
        self.view.as_ref()
    }

    pub fn is_animating(&self) -> bool {
        self.view.as_ref().is_some_and(ViewSession::is_animating)
    }

    /// Attach to a newly active document view.
    ///
    /// Animations, intensity, recorded offsets and suppression flags all start
    /// over; the classifier keeps what it learned about the input device.
    pub fn activate_view(&mut self, kind: ViewKind, frames: &mut dyn FrameScheduler) {
        self.deactivate_view(frames);
        log::debug!("activated {:?} view", kind);
        self.view = Some(ViewSession::new(kind));
    }

    pub fn deactivate_view(&mut self, frames: &mut dyn FrameScheduler) {
        if let Some(mut view) = self.view.take() {
            view.cancel_all(frames);
        }
    }

    /// Route a wheel event to the animator of the detected device.
    pub fn on_wheel<H: EditorHost>(
        &mut self,
        sample: WheelSample,
        host: &mut H,
        frames: &mut dyn FrameScheduler,
    ) -> WheelDisposition {
        if sample.ctrl_key {
            return WheelDisposition::PassThrough;
        }
        let Some(view) = self.view.as_mut() else {
            return WheelDisposition::PassThrough;
        };
        let Some(element) = view.kind.locate_scroller(host) else {
            log::trace!("no scroller in {:?} view", view.kind);
            return WheelDisposition::PassThrough;
        };
        let Some(metrics) = host.metrics(element) else {
            return WheelDisposition::PassThrough;
        };

        let now = sample.timestamp;
        let sample = sample.normalized(metrics.viewport_height);
        let device = self.classifier.classify(&sample, &self.settings.classifier);

        if sample.shift_key || sample.is_horizontal_only() {
            return WheelDisposition::PassThrough;
        }

        let smooth = &self.settings.smooth_scroll;
        let enabled = match device {
            InputDevice::MouseWheel => smooth.mouse_enabled,
            InputDevice::Trackpad => smooth.trackpad_enabled,
        };
        if !enabled {
            return WheelDisposition::PassThrough;
        }

        view.centering.cancel_on(element, frames);
        let scrolled = match device {
            InputDevice::MouseWheel => {
                view.trackpad.cancel(element, frames);
                view.mouse
                    .scroll(element, sample.delta_y, now, smooth, host, frames)
            }
            InputDevice::Trackpad => {
                view.mouse.cancel(element, frames);
                view.trackpad
                    .scroll(element, sample.delta_y, now, smooth, host, frames)
            }
        };

        if scrolled {
            WheelDisposition::Handled
        } else {
            WheelDisposition::PassThrough
        }
    }

    /// The cursor or selection changed, or the document was edited.
    pub fn on_cursor_change<H: EditorHost>(
        &mut self,
        change: CursorChange,
        now: Instant,
        host: &mut H,
        frames: &mut dyn FrameScheduler,
    ) -> Option<CenteringPlan> {
        let view = self.view.as_mut()?;
        if !view.kind.has_cursor() {
            return None;
        }
        let line = host.cursor().map(|cursor| cursor.line);
        // Only the line follow-scroll placed the cursor on is its own echo.
        if view.flags.skip_cursor.take(now) && line == view.flags.last_line {
            log::trace!("cursor move from follow-scroll ignored");
            return None;
        }

        view.follow.record(host);
        if change.is_edit() {
            view.flags.arm_recent_edit(now);
        }
        if line.is_some() {
            view.flags.last_line = line;
        }

        let plan = view.centering.on_cursor_or_edit_event(
            change,
            now,
            &self.settings.centering,
            &mut view.flags,
            host,
            frames,
        )?;
        if view.mouse.is_animating(plan.element) || view.trackpad.is_animating(plan.element) {
            log::debug!("centering takes over wheel animation on {:?}", plan.element);
        }
        view.mouse.cancel(plan.element, frames);
        view.trackpad.cancel(plan.element, frames);
        Some(plan)
    }

    /// The scroll offset of the editor changed. Returns the line the cursor moved to.
    pub fn on_scroll<H: EditorHost>(&mut self, now: Instant, host: &mut H) -> Option<usize> {
        let view = self.view.as_mut()?;
        if !view.kind.has_cursor() {
            return None;
        }
        view.follow.on_manual_scroll(
            now,
            &self.settings.cursor_follows_scroll,
            &mut view.flags,
            host,
        )
    }

    pub fn on_mouse_up(&mut self, now: Instant) {
        let debounce = self.settings.centering.mouse_up_debounce();
        if let Some(view) = self.view.as_mut() {
            view.flags.arm_recent_mouse_up(now, debounce);
        }
    }

    pub fn on_key_down(&mut self, _now: Instant) {
        if let Some(view) = self.view.as_mut() {
            view.flags.recent_mouse_up.clear();
        }
    }

    /// Run the animation step that requested `handle`.
    pub fn on_frame<H: EditorHost>(
        &mut self,
        handle: FrameHandle,
        now: Instant,
        host: &mut H,
        frames: &mut dyn FrameScheduler,
    ) -> bool {
        let Some(view) = self.view.as_mut() else {
            return false;
        };
        view.mouse.on_frame(handle, now, host, frames)
            || view.trackpad.on_frame(handle, now, host, frames)
            || view
                .centering
                .on_frame(handle, now, &mut view.flags, host, frames)
    }
}
