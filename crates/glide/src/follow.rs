//! Cursor follows scroll
//!
//! When the user scrolls by hand, the cursor is dragged along so it keeps its
//! position relative to the viewport. The offset is captured whenever the
//! cursor moves on its own, and replayed against the new scroll offset.

use std::time::Instant;

use crate::host::EditorHost;
use crate::settings::FollowSettings;
use crate::suppression::SuppressionFlags;

#[derive(Clone, Debug, Default)]
pub struct CursorFollowsScrollController {
    relative_offset: Option<f32>,
}

impl CursorFollowsScrollController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember where the cursor sits inside the viewport.
    pub fn record(&mut self, host: &dyn EditorHost) {
        let Some(cursor) = host.cursor() else {
            return;
        };
        let Some(metrics) = host.scroller().and_then(|element| host.metrics(element)) else {
            return;
        };
        self.relative_offset = Some(cursor.y.clamp(0.0, metrics.viewport_height));
    }

    pub fn relative_offset(&self) -> Option<f32> {
        self.relative_offset
    }

    /// Move the cursor to the line now under the recorded offset.
    ///
    /// Returns the new cursor line, or `None` when nothing moved.
    pub fn on_manual_scroll(
        &mut self,
        now: Instant,
        settings: &FollowSettings,
        flags: &mut SuppressionFlags,
        host: &mut dyn EditorHost,
    ) -> Option<usize> {
        if !settings.enabled {
            return None;
        }
        // Self-caused scrolls still shift the cursor inside the viewport.
        if flags.skip_scroll_echo.take(now) {
            log::trace!("scroll echo from centering ignored");
            self.record(host);
            return None;
        }
        if flags.recent_edit.take(now) {
            log::trace!("scroll caused by an edit ignored");
            self.record(host);
            return None;
        }

        let offset = self.relative_offset?;
        let metrics = host.scroller().and_then(|element| host.metrics(element))?;
        // The offset was clamped against the viewport at record time; a viewport
        // that shrank since then can leave the target below its bottom edge.
        let target_y = metrics.scroll_top + offset;
        let viewport = metrics.scroll_top..=metrics.scroll_top + metrics.viewport_height;
        if !viewport.contains(&target_y) {
            log::trace!("follow target {target_y:.1} lies outside the viewport");
            return None;
        }

        let line = host.line_at_height(target_y)?;
        let current = host.cursor().map(|cursor| cursor.line);
        if current == Some(line) {
            return None;
        }

        log::debug!("cursor follows scroll to line {line}");
        host.set_cursor_line(line);
        flags.arm_skip_cursor(now);
        flags.last_line = Some(line);
        Some(line)
    }

    pub fn reset(&mut self) {
        self.relative_offset = None;
    }
}
