//! Frame scheduling
//!
//! Animations never block. Each animation holds at most one pending frame
//! request in a [`FrameSlot`]; when the host fires that frame the animation
//! advances one step and, if it is not finished, requests the next frame.
//! Replacing an animation cancels its pending request first, so there is never
//! more than one outstanding request per slot.

use std::time::Duration;

/// Nominal frame interval used to normalize per-frame physics.
pub const FRAME_INTERVAL: Duration = Duration::from_micros(16_667);

/// Opaque identifier of a requested frame callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameHandle(u64);

impl FrameHandle {
    pub fn id(self) -> u64 {
        self.0
    }
}

/// Per-frame callback scheduler provided by the host.
///
/// When a requested frame fires, the host passes its handle back to
/// [`crate::ScrollEngine::on_frame`].
pub trait FrameScheduler {
    fn request_frame(&mut self) -> FrameHandle;
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// A simple queue-backed scheduler.
///
/// Requests accumulate until the host drains them with [`FrameQueue::take_pending`]
/// at its next frame boundary.
#[derive(Debug, Default)]
pub struct FrameQueue {
    next_id: u64,
    pending: Vec<FrameHandle>,
}

impl FrameQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> &[FrameHandle] {
        &self.pending
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Remove and return every pending request in request order.
    pub fn take_pending(&mut self) -> Vec<FrameHandle> {
        std::mem::take(&mut self.pending)
    }
}

impl FrameScheduler for FrameQueue {
    fn request_frame(&mut self) -> FrameHandle {
        self.next_id += 1;
        let handle = FrameHandle(self.next_id);
        self.pending.push(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        self.pending.retain(|pending| *pending != handle);
    }
}

/// Holder for an animation's single outstanding frame request.
#[derive(Debug, Default)]
pub struct FrameSlot {
    handle: Option<FrameHandle>,
}

impl FrameSlot {
    /// Request the next frame, cancelling any request this slot still holds.
    pub fn schedule(&mut self, frames: &mut dyn FrameScheduler) -> FrameHandle {
        self.cancel(frames);
        let handle = frames.request_frame();
        self.handle = Some(handle);
        handle
    }

    pub fn cancel(&mut self, frames: &mut dyn FrameScheduler) {
        if let Some(handle) = self.handle.take() {
            frames.cancel_frame(handle);
        }
    }

    /// Returns true and releases the slot when `handle` is the request it holds.
    ///
    /// A fired frame is no longer pending, so it is released without cancelling.
    pub fn fire(&mut self, handle: FrameHandle) -> bool {
        if self.handle == Some(handle) {
            self.handle = None;
            true
        } else {
            false
        }
    }

    pub fn owns(&self, handle: FrameHandle) -> bool {
        self.handle == Some(handle)
    }

    pub fn is_scheduled(&self) -> bool {
        self.handle.is_some()
    }
}

/// Elapsed time since the previous frame expressed in nominal frames.
pub fn frames_elapsed(elapsed: Duration) -> f32 {
    (elapsed.as_secs_f32() / FRAME_INTERVAL.as_secs_f32()).clamp(0.0, 4.0)
}
