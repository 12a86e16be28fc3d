//! Cursor centering
//!
//! Keeps the cursor inside a comfort zone around the vertical center of the
//! viewport. When the cursor leaves the zone the view is scrolled just far
//! enough to bring it back to the zone's edge, eased over a number of frames
//! that grows with the distance and shrinks when input arrives in bursts.

use std::time::Instant;

use crate::easing::{ease_out_quad, lerp};
use crate::frame::{FrameHandle, FrameScheduler, FrameSlot};
use crate::host::{ChangeOrigin, CursorChange, EditorHost, ElementId};
use crate::intensity::IntensityTracker;
use crate::settings::CenteringSettings;
use crate::suppression::SuppressionFlags;

/// Distances below this are not worth animating.
pub const MIN_DISTANCE_PX: f32 = 1.0;

/// Signed distance the view must scroll to bring a cursor at `cursor_y` back
/// to the edge of the comfort zone, or `None` when it is already inside.
pub fn centering_distance(cursor_y: f32, viewport_height: f32, radius_percent: f32) -> Option<f32> {
    let half = viewport_height / 2.0;
    let radius = half * radius_percent.clamp(0.0, 100.0) / 100.0;
    let center_offset = cursor_y - half;
    if center_offset.abs() <= radius {
        return None;
    }
    let distance = center_offset - center_offset.signum() * radius;
    (distance.abs() >= MIN_DISTANCE_PX).then_some(distance)
}

/// Number of animation frames for a scroll of `distance` pixels.
pub fn step_count(distance: f32, smoothness: f32) -> u32 {
    let steps = (2.0 * (smoothness / 100.0) * distance.abs().sqrt()).ceil();
    steps.max(1.0) as u32
}

/// Shorter animation used while input arrives faster than it could finish.
pub fn reduced_step_count(steps: u32) -> u32 {
    (steps as f32).sqrt().ceil().max(1.0) as u32
}

/// A scroll decided by the controller.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CenteringPlan {
    pub element: ElementId,
    pub from: f32,
    pub target: f32,
    pub steps: u32,
}

#[derive(Debug)]
struct CenteringAnimation {
    plan: CenteringPlan,
    step: u32,
    slot: FrameSlot,
}

#[derive(Debug, Default)]
pub struct CursorCenteringController {
    intensity: IntensityTracker,
    animation: Option<CenteringAnimation>,
}

impl CursorCenteringController {
    pub fn new() -> Self {
        Self::default()
    }

    /// React to a cursor change, scrolling if the cursor left the comfort zone.
    #[allow(clippy::too_many_arguments)]
    pub fn on_cursor_or_edit_event(
        &mut self,
        change: CursorChange,
        now: Instant,
        settings: &CenteringSettings,
        flags: &mut SuppressionFlags,
        host: &mut dyn EditorHost,
        frames: &mut dyn FrameScheduler,
    ) -> Option<CenteringPlan> {
        if !settings.enabled {
            return None;
        }
        if change.origin == ChangeOrigin::PointerDrag {
            return None;
        }
        if change.has_selection && change.from_pointer() && !settings.center_on_mouse_selection {
            return None;
        }
        let after_mouse_up = flags.recent_mouse_up.take(now);
        if (after_mouse_up || change.origin == ChangeOrigin::Pointer) && !settings.center_on_mouse
        {
            log::trace!("centering skipped: cursor placed with the mouse");
            return None;
        }

        let instant_edit = change.is_edit() && settings.instant_edit_scroll;
        if change.is_edit() {
            if settings.instant_edit_scroll {
                self.intensity.reset();
            } else {
                self.intensity.bump(now);
            }
        } else if settings.dynamic_animation {
            self.intensity.bump(now);
        }

        let element = host.scroller()?;
        let metrics = host.metrics(element)?;
        let cursor = host.cursor()?;

        let distance =
            centering_distance(cursor.y, metrics.viewport_height, settings.radius_percent)?;
        let target = metrics.clamp(metrics.scroll_top + distance);
        let distance = target - metrics.scroll_top;
        if distance.abs() < MIN_DISTANCE_PX {
            return None;
        }

        let mut steps = step_count(distance, settings.smoothness);
        if instant_edit {
            steps = 1;
        } else if self.intensity.is_bursting(now) || distance.abs() > metrics.viewport_height {
            steps = reduced_step_count(steps);
        }

        let plan = CenteringPlan {
            element,
            from: metrics.scroll_top,
            target,
            steps,
        };
        log::debug!(
            "centering cursor on line {}: {:.1} -> {:.1} in {} steps",
            cursor.line,
            plan.from,
            plan.target,
            plan.steps
        );

        self.cancel(frames);
        if steps == 1 {
            host.set_scroll_top(element, target);
            flags.arm_scroll_echo(now);
        } else {
            let mut slot = FrameSlot::default();
            slot.schedule(frames);
            self.animation = Some(CenteringAnimation {
                plan,
                step: 0,
                slot,
            });
        }
        Some(plan)
    }

    /// Advance the centering animation if it owns `handle`.
    pub fn on_frame(
        &mut self,
        handle: FrameHandle,
        now: Instant,
        flags: &mut SuppressionFlags,
        host: &mut dyn EditorHost,
        frames: &mut dyn FrameScheduler,
    ) -> bool {
        let Some(animation) = self.animation.as_mut() else {
            return false;
        };
        if !animation.slot.fire(handle) {
            return false;
        }

        let plan = animation.plan;
        if host.metrics(plan.element).is_none() {
            self.animation = None;
            return true;
        }

        animation.step += 1;
        let done = animation.step >= plan.steps;
        let value = if done {
            plan.target
        } else {
            lerp(
                plan.from,
                plan.target,
                ease_out_quad(animation.step as f32 / plan.steps as f32),
            )
        };
        log::trace!("centering frame {}/{}: {:.2}", animation.step, plan.steps, value);
        host.set_scroll_top(plan.element, value);
        flags.arm_scroll_echo(now);

        if done {
            self.animation = None;
        } else {
            animation.slot.schedule(frames);
        }
        true
    }

    pub fn cancel(&mut self, frames: &mut dyn FrameScheduler) {
        if let Some(mut animation) = self.animation.take() {
            animation.slot.cancel(frames);
        }
    }

    /// Cancel the animation if it scrolls `element`.
    pub fn cancel_on(&mut self, element: ElementId, frames: &mut dyn FrameScheduler) {
        if self
            .animation
            .as_ref()
            .is_some_and(|animation| animation.plan.element == element)
        {
            self.cancel(frames);
        }
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    pub fn intensity(&self, now: Instant) -> f32 {
        self.intensity.value_at(now)
    }
}
