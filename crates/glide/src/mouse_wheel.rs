//! Mouse-wheel animation
//!
//! Each wheel notch moves the scroll target by a fixed distance and the
//! element eases toward it over a fixed duration. Notches that arrive while an
//! animation is still running extend the previous target instead of the live
//! offset, so fast spinning accumulates distance rather than stuttering.

use std::time::{Duration, Instant};

use rustc_hash::FxHashMap;

use crate::easing::{ease_out_quad, lerp};
use crate::frame::{FrameHandle, FrameScheduler, FrameSlot};
use crate::host::{ElementId, ScrollSurface};
use crate::settings::SmoothScrollSettings;

#[derive(Debug)]
struct Glide {
    start_value: f32,
    target: f32,
    start_time: Instant,
    duration: Duration,
    slot: FrameSlot,
}

impl Glide {
    fn progress(&self, now: Instant) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        now.saturating_duration_since(self.start_time).as_secs_f32() / self.duration.as_secs_f32()
    }
}

#[derive(Debug, Default)]
pub struct MouseWheelAnimator {
    glides: FxHashMap<ElementId, Glide>,
}

impl MouseWheelAnimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start or extend an eased scroll of `element` by `delta` pixels.
    ///
    /// Returns false when the element is missing or the move has no effect.
    pub fn scroll(
        &mut self,
        element: ElementId,
        delta: f32,
        now: Instant,
        settings: &SmoothScrollSettings,
        surface: &mut dyn ScrollSurface,
        frames: &mut dyn FrameScheduler,
    ) -> bool {
        let Some(metrics) = surface.metrics(element) else {
            return false;
        };

        let previous = self.glides.remove(&element);
        let base = previous
            .as_ref()
            .map_or(metrics.scroll_top, |glide| glide.target);
        let target = metrics.clamp(base + delta * settings.mouse_speed * settings.invert_sign());

        let mut slot = match previous {
            Some(glide) => glide.slot,
            None => FrameSlot::default(),
        };

        if (target - metrics.scroll_top).abs() < f32::EPSILON {
            slot.cancel(frames);
            return false;
        }

        slot.schedule(frames);
        log::debug!(
            "mouse glide on {:?}: {:.1} -> {:.1}",
            element,
            metrics.scroll_top,
            target
        );
        self.glides.insert(
            element,
            Glide {
                start_value: metrics.scroll_top,
                target,
                start_time: now,
                duration: settings.mouse_duration(),
                slot,
            },
        );
        true
    }

    /// Advance the glide that owns `handle`. Returns false if no glide owns it.
    pub fn on_frame(
        &mut self,
        handle: FrameHandle,
        now: Instant,
        surface: &mut dyn ScrollSurface,
        frames: &mut dyn FrameScheduler,
    ) -> bool {
        let Some(element) = self
            .glides
            .iter()
            .find_map(|(element, glide)| glide.slot.owns(handle).then_some(*element))
        else {
            return false;
        };
        let Some(glide) = self.glides.get_mut(&element) else {
            return false;
        };
        glide.slot.fire(handle);

        if surface.metrics(element).is_none() {
            self.glides.remove(&element);
            return true;
        }

        let progress = glide.progress(now);
        if progress >= 1.0 {
            surface.set_scroll_top(element, glide.target);
            self.glides.remove(&element);
            return true;
        }

        let value = lerp(glide.start_value, glide.target, ease_out_quad(progress));
        log::trace!("mouse glide frame {:?}: {:.2}", element, value);
        surface.set_scroll_top(element, value);
        glide.slot.schedule(frames);
        true
    }

    pub fn cancel(&mut self, element: ElementId, frames: &mut dyn FrameScheduler) {
        if let Some(mut glide) = self.glides.remove(&element) {
            glide.slot.cancel(frames);
        }
    }

    pub fn cancel_all(&mut self, frames: &mut dyn FrameScheduler) {
        for (_, mut glide) in self.glides.drain() {
            glide.slot.cancel(frames);
        }
    }

    pub fn is_animating(&self, element: ElementId) -> bool {
        self.glides.contains_key(&element)
    }

    pub fn target(&self, element: ElementId) -> Option<f32> {
        self.glides.get(&element).map(|glide| glide.target)
    }

    pub fn active_count(&self) -> usize {
        self.glides.len()
    }
}
