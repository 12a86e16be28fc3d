//! Trackpad momentum
//!
//! Trackpad deltas feed a velocity that is integrated every frame and decays
//! by a multiplicative friction. Friction is derived from the size of the
//! stroke: small nudges settle almost at once, long strokes coast.

use std::time::Instant;

use rustc_hash::FxHashMap;

use crate::frame::{frames_elapsed, FrameHandle, FrameScheduler, FrameSlot};
use crate::host::{ElementId, ScrollSurface};
use crate::settings::SmoothScrollSettings;

/// Coasting stops once the velocity falls below this many pixels per frame.
pub const STOP_VELOCITY: f32 = 0.1;
/// Upper bound of the per-frame friction factor; keeps every coast finite.
pub const MAX_FRICTION: f32 = 0.95;
/// Lower bound of the per-frame friction factor.
pub const MIN_FRICTION: f32 = 0.5;

/// Shortest step, in nominal frames, a fired frame advances the physics.
const MIN_FRAME_STEP: f32 = 0.1;

/// Friction for a stroke of `delta` pixels.
///
/// `min(1, (|delta| / threshold)^3) * smoothness`, where smoothness maps the
/// 0-100 setting onto `[0, MAX_FRICTION]`, floored at [`MIN_FRICTION`].
pub fn friction_for(delta: f32, settings: &SmoothScrollSettings) -> f32 {
    let threshold = settings.friction_threshold.max(f32::EPSILON);
    let stroke = (delta.abs() / threshold).powi(3).min(1.0);
    let smoothness = (settings.trackpad_smoothness / 100.0).clamp(0.0, 1.0) * MAX_FRICTION;
    (stroke * smoothness).clamp(MIN_FRICTION, MAX_FRICTION)
}

#[derive(Debug)]
struct Coast {
    position: f32,
    velocity: f32,
    friction: f32,
    last_frame: Instant,
    slot: FrameSlot,
}

#[derive(Debug, Default)]
pub struct TrackpadAnimator {
    coasts: FxHashMap<ElementId, Coast>,
}

impl TrackpadAnimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a trackpad delta to the momentum of `element`.
    ///
    /// A delta against the current direction of travel restarts the coast from
    /// the live offset with fresh friction. Returns false when the element is missing.
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

        let impulse = delta * settings.trackpad_speed * settings.invert_sign();
        let friction = friction_for(delta, settings);

        let coast = self.coasts.entry(element).or_insert_with(|| Coast {
            position: metrics.scroll_top,
            velocity: 0.0,
            friction,
            last_frame: now,
            slot: FrameSlot::default(),
        });

        let reversed = coast.velocity != 0.0
            && impulse != 0.0
            && coast.velocity.signum() != impulse.signum();
        if reversed {
            log::debug!("trackpad reversal on {:?}, restarting coast", element);
            coast.velocity = 0.0;
            coast.position = metrics.scroll_top;
            coast.friction = friction;
        } else if coast.slot.is_scheduled() {
            coast.friction = coast.friction.max(friction);
        } else {
            coast.position = metrics.scroll_top;
            coast.friction = friction;
        }

        coast.velocity += impulse;
        if !coast.slot.is_scheduled() {
            coast.last_frame = now;
            coast.slot.schedule(frames);
        }
        true
    }

    /// Advance the coast that owns `handle`. Returns false if no coast owns it.
    pub fn on_frame(
        &mut self,
        handle: FrameHandle,
        now: Instant,
        surface: &mut dyn ScrollSurface,
        frames: &mut dyn FrameScheduler,
    ) -> bool {
        let Some(element) = self
            .coasts
            .iter()
            .find_map(|(element, coast)| coast.slot.owns(handle).then_some(*element))
        else {
            return false;
        };
        let Some(coast) = self.coasts.get_mut(&element) else {
            return false;
        };
        coast.slot.fire(handle);

        let Some(metrics) = surface.metrics(element) else {
            self.coasts.remove(&element);
            return true;
        };

        let step = frames_elapsed(now.saturating_duration_since(coast.last_frame))
            .max(MIN_FRAME_STEP);
        coast.last_frame = now;

        let unclamped = coast.position + coast.velocity * step;
        let position = metrics.clamp(unclamped);
        coast.velocity *= coast.friction.powf(step);
        if position != unclamped {
            coast.velocity = 0.0;
        }
        coast.position = position;

        log::trace!(
            "trackpad frame {:?}: offset {:.2} velocity {:.3}",
            element,
            position,
            coast.velocity
        );
        surface.set_scroll_top(element, position);

        if coast.velocity.abs() < STOP_VELOCITY {
            self.coasts.remove(&element);
        } else {
            coast.slot.schedule(frames);
        }
        true
    }

    pub fn cancel(&mut self, element: ElementId, frames: &mut dyn FrameScheduler) {
        if let Some(mut coast) = self.coasts.remove(&element) {
            coast.slot.cancel(frames);
        }
    }

    pub fn cancel_all(&mut self, frames: &mut dyn FrameScheduler) {
        for (_, mut coast) in self.coasts.drain() {
            coast.slot.cancel(frames);
        }
    }

    pub fn is_animating(&self, element: ElementId) -> bool {
        self.coasts.contains_key(&element)
    }

    pub fn velocity(&self, element: ElementId) -> Option<f32> {
        self.coasts.get(&element).map(|coast| coast.velocity)
    }

    pub fn active_count(&self) -> usize {
        self.coasts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::{friction_for, TrackpadAnimator, MAX_FRICTION, MIN_FRICTION, STOP_VELOCITY};
    use crate::frame::FrameQueue;
    use crate::host::{ElementId, ScrollMetrics, ScrollSurface};
    use crate::settings::SmoothScrollSettings;
    use std::time::{Duration, Instant};

    const SCROLLER: ElementId = ElementId(7);

    struct Surface {
        scroll_top: f32,
        content_height: f32,
    }

    impl Default for Surface {
        fn default() -> Self {
            Self {
                scroll_top: 5000.0,
                content_height: 100_000.0,
            }
        }
    }

    impl ScrollSurface for Surface {
        fn locate(&self, _selector: &str) -> Option<ElementId> {
            Some(SCROLLER)
        }

        fn metrics(&self, element: ElementId) -> Option<ScrollMetrics> {
            (element == SCROLLER).then_some(ScrollMetrics {
                scroll_top: self.scroll_top,
                viewport_height: 800.0,
                content_height: self.content_height,
            })
        }

        fn set_scroll_top(&mut self, _element: ElementId, scroll_top: f32) {
            self.scroll_top = scroll_top;
        }
    }

    #[test]
    fn friction_grows_with_stroke_size_and_stays_bounded() {
        let settings = SmoothScrollSettings::default();
        let nudge = friction_for(2.0, &settings);
        let stroke = friction_for(36.0, &settings);
        let fling = friction_for(400.0, &settings);
        assert_eq!(nudge, MIN_FRICTION);
        assert!(stroke > nudge);
        assert!(fling >= stroke);
        assert!(fling <= MAX_FRICTION);

        let glassy = SmoothScrollSettings {
            trackpad_smoothness: 100.0,
            ..SmoothScrollSettings::default()
        };
        assert_eq!(friction_for(1000.0, &glassy), MAX_FRICTION);
    }

    #[test]
    fn velocity_decays_monotonically_until_stop() {
        let settings = SmoothScrollSettings::default();
        let mut surface = Surface::default();
        let mut queue = FrameQueue::new();
        let mut animator = TrackpadAnimator::new();
        let mut now = Instant::now();

        animator.scroll(SCROLLER, 60.0, now, &settings, &mut surface, &mut queue);
        let mut previous = animator.velocity(SCROLLER).expect("coast should start");

        while !queue.is_empty() {
            now += Duration::from_millis(16);
            for handle in queue.take_pending() {
                animator.on_frame(handle, now, &mut surface, &mut queue);
            }
            match animator.velocity(SCROLLER) {
                Some(velocity) => {
                    assert!(velocity.abs() < previous.abs());
                    previous = velocity;
                }
                None => break,
            }
        }

        assert!(previous.abs() >= STOP_VELOCITY);
        assert!(!animator.is_animating(SCROLLER));
        assert!(surface.scroll_top > 5060.0);
    }

    #[test]
    fn continued_strokes_accumulate_velocity() {
        let settings = SmoothScrollSettings::default();
        let mut surface = Surface::default();
        let mut queue = FrameQueue::new();
        let mut animator = TrackpadAnimator::new();
        let now = Instant::now();

        animator.scroll(SCROLLER, 10.0, now, &settings, &mut surface, &mut queue);
        animator.scroll(SCROLLER, 10.0, now, &settings, &mut surface, &mut queue);
        assert_eq!(animator.velocity(SCROLLER), Some(20.0));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn reversal_restarts_the_coast() {
        let settings = SmoothScrollSettings::default();
        let mut surface = Surface::default();
        let mut queue = FrameQueue::new();
        let mut animator = TrackpadAnimator::new();
        let now = Instant::now();

        animator.scroll(SCROLLER, 40.0, now, &settings, &mut surface, &mut queue);
        animator.scroll(SCROLLER, -5.0, now, &settings, &mut surface, &mut queue);
        assert_eq!(animator.velocity(SCROLLER), Some(-5.0));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn coast_stops_at_document_end() {
        let settings = SmoothScrollSettings::default();
        let mut surface = Surface {
            scroll_top: 1190.0,
            content_height: 2000.0,
        };
        let mut queue = FrameQueue::new();
        let mut animator = TrackpadAnimator::new();
        let now = Instant::now();

        animator.scroll(SCROLLER, 80.0, now, &settings, &mut surface, &mut queue);
        let handle = queue.take_pending()[0];
        animator.on_frame(
            handle,
            now + Duration::from_millis(16),
            &mut surface,
            &mut queue,
        );

        assert_eq!(surface.scroll_top, 1200.0);
        assert!(!animator.is_animating(SCROLLER));
        assert!(queue.is_empty());
    }

    #[test]
    fn missing_element_is_a_no_op() {
        let settings = SmoothScrollSettings::default();
        let mut surface = Surface::default();
        let mut queue = FrameQueue::new();
        let mut animator = TrackpadAnimator::new();
        assert!(!animator.scroll(
            ElementId(0),
            10.0,
            Instant::now(),
            &settings,
            &mut surface,
            &mut queue
        ));
        assert!(queue.is_empty());
    }
}
