#![allow(dead_code)]

use std::time::{Duration, Instant};

use glide::{
    CursorChange, CursorGeometry, EditorHost, ElementId, FrameQueue, ScrollEngine, ScrollMetrics,
    ScrollSurface,
};

pub const LINE_HEIGHT: f32 = 20.0;
pub const VIEWPORT_HEIGHT: f32 = 800.0;
pub const SCROLLER: ElementId = ElementId(1);
pub const FRAME: Duration = Duration::from_millis(16);

/// In-memory editor with fixed-height lines.
#[derive(Debug)]
pub struct FakeEditor {
    pub scroll_top: f32,
    pub line_count: usize,
    pub cursor_line: usize,
    pub scroll_writes: Vec<f32>,
    pub cursor_moves: usize,
}

impl FakeEditor {
    pub fn new(line_count: usize) -> Self {
        Self {
            scroll_top: 0.0,
            line_count,
            cursor_line: 0,
            scroll_writes: Vec::new(),
            cursor_moves: 0,
        }
    }

    pub fn scrolled_to(mut self, scroll_top: f32) -> Self {
        self.scroll_top = scroll_top;
        self
    }

    pub fn with_cursor(mut self, line: usize) -> Self {
        self.cursor_line = line;
        self
    }

    /// Cursor center relative to the viewport top.
    pub fn cursor_y(&self) -> f32 {
        self.cursor_line as f32 * LINE_HEIGHT + LINE_HEIGHT / 2.0 - self.scroll_top
    }
}

impl ScrollSurface for FakeEditor {
    fn locate(&self, selector: &str) -> Option<ElementId> {
        matches!(
            selector,
            ".cm-scroller" | ".markdown-preview-view" | ".pdf-viewer-container"
        )
        .then_some(SCROLLER)
    }

    fn metrics(&self, element: ElementId) -> Option<ScrollMetrics> {
        (element == SCROLLER).then_some(ScrollMetrics {
            scroll_top: self.scroll_top,
            viewport_height: VIEWPORT_HEIGHT,
            content_height: self.line_count as f32 * LINE_HEIGHT,
        })
    }

    fn set_scroll_top(&mut self, _element: ElementId, scroll_top: f32) {
        self.scroll_top = scroll_top;
        self.scroll_writes.push(scroll_top);
    }
}

impl EditorHost for FakeEditor {
    fn scroller(&self) -> Option<ElementId> {
        Some(SCROLLER)
    }

    fn cursor(&self) -> Option<CursorGeometry> {
        Some(CursorGeometry {
            y: self.cursor_y(),
            line: self.cursor_line,
        })
    }

    fn line_at_height(&self, document_y: f32) -> Option<usize> {
        if document_y < 0.0 || self.line_count == 0 {
            return None;
        }
        Some(((document_y / LINE_HEIGHT) as usize).min(self.line_count - 1))
    }

    fn set_cursor_line(&mut self, line: usize) {
        self.cursor_line = line;
        self.cursor_moves += 1;
    }
}

/// Fire pending frames until every animation settles, echoing the
/// notifications a real editor would send back after each write.
///
/// Returns the time of the last frame and the number of frame ticks.
pub fn settle(
    engine: &mut ScrollEngine,
    host: &mut FakeEditor,
    queue: &mut FrameQueue,
    start: Instant,
) -> (Instant, usize) {
    let mut now = start;
    let mut ticks = 0;
    while !queue.is_empty() {
        assert!(ticks < 2_000, "animation never settled");
        now += FRAME;
        ticks += 1;
        for handle in queue.take_pending() {
            let scroll_before = host.scroll_top;
            let moves_before = host.cursor_moves;
            engine.on_frame(handle, now, host, queue);
            if host.scroll_top != scroll_before {
                engine.on_scroll(now, host);
            }
            if host.cursor_moves != moves_before {
                engine.on_cursor_change(CursorChange::navigation(), now, host, queue);
            }
        }
    }
    (now, ticks)
}
