//! Feedback suppression between the scroll and cursor controllers
//!
//! Centering scrolls because the cursor moved; following moves the cursor
//! because the view scrolled. Each side arms a one-shot flag right after it
//! mutates, and the other side consumes that flag instead of reacting. A flag
//! that is never consumed expires at its deadline, so a lost event can at most
//! swallow one legitimate reaction.

use std::time::{Duration, Instant};

/// How long a cursor move made by the follow controller stays suppressed.
pub const SKIP_CURSOR_WINDOW: Duration = Duration::from_millis(100);
/// How long a scroll written by the centering controller stays suppressed.
pub const SCROLL_ECHO_WINDOW: Duration = Duration::from_millis(100);
/// How long after an edit a scroll is attributed to the edit.
pub const RECENT_EDIT_WINDOW: Duration = Duration::from_millis(150);

/// A single-shot flag with an expiry deadline.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OneShot {
    armed_until: Option<Instant>,
}

impl OneShot {
    pub fn arm(&mut self, now: Instant, window: Duration) {
        self.armed_until = Some(now + window);
    }

    /// Consume the flag. Returns true only if it was armed and not yet expired.
    pub fn take(&mut self, now: Instant) -> bool {
        match self.armed_until.take() {
            Some(until) => now < until,
            None => false,
        }
    }

    pub fn is_armed(&self, now: Instant) -> bool {
        self.armed_until.is_some_and(|until| now < until)
    }

    pub fn clear(&mut self) {
        self.armed_until = None;
    }
}

/// Flags shared by every controller of one document view.
#[derive(Clone, Debug, Default)]
pub struct SuppressionFlags {
    /// The next cursor change was made by the follow controller.
    pub skip_cursor: OneShot,
    /// The next scroll event was written by the centering controller.
    pub skip_scroll_echo: OneShot,
    /// An edit just happened; the next scroll belongs to it.
    pub recent_edit: OneShot,
    /// The mouse button was just released over the editor.
    pub recent_mouse_up: OneShot,
    /// Line the cursor was last seen on.
    pub last_line: Option<usize>,
}

impl SuppressionFlags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arm_skip_cursor(&mut self, now: Instant) {
        self.skip_cursor.arm(now, SKIP_CURSOR_WINDOW);
    }

    pub fn arm_scroll_echo(&mut self, now: Instant) {
        self.skip_scroll_echo.arm(now, SCROLL_ECHO_WINDOW);
    }

    pub fn arm_recent_edit(&mut self, now: Instant) {
        self.recent_edit.arm(now, RECENT_EDIT_WINDOW);
    }

    pub fn arm_recent_mouse_up(&mut self, now: Instant, debounce: Duration) {
        self.recent_mouse_up.arm(now, debounce);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
