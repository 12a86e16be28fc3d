//! Text document model behind the view
//!
//! Holds the lines, cursor, selection and scroll offset, and exposes them to
//! the scroll engine through [`EditorHost`]. Writes made by the engine raise
//! change flags that the view drains and reports back.

use std::ops::Range;

use glide::{CursorGeometry, EditorHost, ElementId, ScrollMetrics, ScrollSurface, ViewKind};

pub(super) const SOURCE_SCROLLER: ElementId = ElementId(1);
pub(super) const PREVIEW_SCROLLER: ElementId = ElementId(2);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub(super) struct Position {
    pub(super) line: usize,
    pub(super) column: usize,
}

impl Position {
    pub(super) fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum Motion {
    Left,
    Right,
    Up,
    Down,
    PageUp,
    PageDown,
    LineStart,
    LineEnd,
    DocumentStart,
    DocumentEnd,
}

#[derive(Debug)]
pub(super) struct Document {
    lines: Vec<String>,
    cursor: Position,
    anchor: Option<Position>,
    kind: ViewKind,
    scroll_top: f32,
    viewport_height: f32,
    line_height: f32,
    scroll_changed: bool,
    cursor_changed: bool,
}

impl Document {
    pub(super) fn new(text: &str, line_height: f32) -> Self {
        let mut lines: Vec<String> = text.lines().map(str::to_string).collect();
        if lines.is_empty() {
            lines.push(String::new());
        }
        Self {
            lines,
            cursor: Position::default(),
            anchor: None,
            kind: ViewKind::MarkdownSource,
            scroll_top: 0.0,
            viewport_height: 0.0,
            line_height,
            scroll_changed: false,
            cursor_changed: false,
        }
    }

    /// Generated markdown used when no file is given.
    pub(super) fn sample_text(sections: usize) -> String {
        let mut text = String::from("# Glide\n\nScroll with a wheel or a trackpad, type, and watch the cursor.\n");
        for section in 1..=sections {
            text.push_str(&format!("\n## Section {section}\n\n"));
            for paragraph in 1..=4 {
                text.push_str(&format!(
                    "Paragraph {paragraph} of section {section}. The quick brown fox jumps over the lazy dog.\n"
                ));
            }
            text.push_str("\n- first item\n- second item\n- third item\n");
        }
        text
    }

    pub(super) fn lines(&self) -> &[String] {
        &self.lines
    }

    pub(super) fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub(super) fn cursor_position(&self) -> Position {
        self.cursor
    }

    /// Ordered selection bounds, if any text is selected.
    pub(super) fn selection(&self) -> Option<(Position, Position)> {
        let anchor = self.anchor?;
        if anchor == self.cursor {
            return None;
        }
        Some((anchor.min(self.cursor), anchor.max(self.cursor)))
    }

    /// Selected columns of `line`. A selection running past the end of a line
    /// covers one extra column for the line break.
    pub(super) fn selection_columns(&self, line: usize) -> Option<Range<usize>> {
        let (start, end) = self.selection()?;
        if line < start.line || line > end.line {
            return None;
        }
        let first = if line == start.line { start.column } else { 0 };
        let last = if line == end.line {
            end.column
        } else {
            self.line_len(line) + 1
        };
        (last > first).then_some(first..last)
    }

    pub(super) fn has_selection(&self) -> bool {
        self.selection().is_some()
    }

    pub(super) fn kind(&self) -> ViewKind {
        self.kind
    }

    pub(super) fn set_kind(&mut self, kind: ViewKind) {
        self.kind = kind;
        self.anchor = None;
    }

    pub(super) fn scroll_top(&self) -> f32 {
        self.scroll_top
    }

    pub(super) fn line_height(&self) -> f32 {
        self.line_height
    }

    pub(super) fn viewport_height(&self) -> f32 {
        self.viewport_height
    }

    fn content_height(&self) -> f32 {
        self.lines.len() as f32 * self.line_height
    }

    fn max_scroll_top(&self) -> f32 {
        (self.content_height() - self.viewport_height).max(0.0)
    }

    pub(super) fn set_viewport_height(&mut self, viewport_height: f32) {
        self.viewport_height = viewport_height.max(0.0);
        self.scroll_top = self.scroll_top.clamp(0.0, self.max_scroll_top());
    }

    fn active_scroller(&self) -> Option<ElementId> {
        match self.kind {
            ViewKind::MarkdownSource => Some(SOURCE_SCROLLER),
            ViewKind::MarkdownPreview | ViewKind::Pdf => Some(PREVIEW_SCROLLER),
            ViewKind::Image => None,
        }
    }

    /// Scroll without animation. Returns true when the offset moved.
    pub(super) fn scroll_by(&mut self, delta: f32) -> bool {
        let target = (self.scroll_top + delta).clamp(0.0, self.max_scroll_top());
        if target == self.scroll_top {
            return false;
        }
        self.scroll_top = target;
        true
    }

    /// Returns true if the cursor moved.
    pub(super) fn move_cursor(&mut self, motion: Motion, extend: bool) -> bool {
        let Position { line, column } = self.cursor;
        let page = ((self.viewport_height / self.line_height.max(1.0)) as usize).max(1);
        let last_line = self.lines.len() - 1;
        let target = match motion {
            Motion::Left if column > 0 => Position::new(line, column - 1),
            Motion::Left if line > 0 => Position::new(line - 1, self.line_len(line - 1)),
            Motion::Left => self.cursor,
            Motion::Right if column < self.line_len(line) => Position::new(line, column + 1),
            Motion::Right if line < last_line => Position::new(line + 1, 0),
            Motion::Right => self.cursor,
            Motion::Up => self.clamped(line.saturating_sub(1), column),
            Motion::Down => self.clamped((line + 1).min(last_line), column),
            Motion::PageUp => self.clamped(line.saturating_sub(page), column),
            Motion::PageDown => self.clamped((line + page).min(last_line), column),
            Motion::LineStart => Position::new(line, 0),
            Motion::LineEnd => Position::new(line, self.line_len(line)),
            Motion::DocumentStart => Position::default(),
            Motion::DocumentEnd => Position::new(last_line, self.line_len(last_line)),
        };
        self.place_cursor(target, extend)
    }

    /// Returns true if the cursor or selection changed.
    pub(super) fn place_cursor(&mut self, position: Position, extend: bool) -> bool {
        let position = self.clamped(position.line, position.column);
        let anchor = if extend {
            Some(self.anchor.unwrap_or(self.cursor))
        } else {
            None
        };
        let changed = position != self.cursor || anchor != self.anchor;
        self.cursor = position;
        self.anchor = anchor;
        changed
    }

    /// Document position under a point given relative to the viewport top.
    pub(super) fn position_at(&self, x: f32, viewport_y: f32, cell_width: f32) -> Position {
        let document_y = (self.scroll_top + viewport_y).max(0.0);
        let line = ((document_y / self.line_height) as usize).min(self.lines.len() - 1);
        let column = super::utils::column_for_x(x, cell_width, self.line_len(line));
        Position::new(line, column)
    }

    pub(super) fn insert_text(&mut self, text: &str) {
        self.delete_selection();
        for ch in text.chars() {
            if ch == '\n' {
                self.insert_newline();
                continue;
            }
            let Position { line, column } = self.cursor;
            let index = byte_index(&self.lines[line], column);
            self.lines[line].insert(index, ch);
            self.cursor.column += 1;
        }
    }

    pub(super) fn insert_newline(&mut self) {
        self.delete_selection();
        let Position { line, column } = self.cursor;
        let index = byte_index(&self.lines[line], column);
        let rest = self.lines[line].split_off(index);
        self.lines.insert(line + 1, rest);
        self.cursor = Position::new(line + 1, 0);
    }

    /// Returns true if anything was deleted.
    pub(super) fn backspace(&mut self) -> bool {
        if self.delete_selection() {
            return true;
        }
        let Position { line, column } = self.cursor;
        if column > 0 {
            let start = byte_index(&self.lines[line], column - 1);
            let end = byte_index(&self.lines[line], column);
            self.lines[line].replace_range(start..end, "");
            self.cursor.column -= 1;
            true
        } else if line > 0 {
            let removed = self.lines.remove(line);
            let previous_len = self.line_len(line - 1);
            self.lines[line - 1].push_str(&removed);
            self.cursor = Position::new(line - 1, previous_len);
            true
        } else {
            false
        }
    }

    fn delete_selection(&mut self) -> bool {
        let Some((start, end)) = self.selection() else {
            self.anchor = None;
            return false;
        };
        let tail_index = byte_index(&self.lines[end.line], end.column);
        let tail = self.lines[end.line][tail_index..].to_string();
        let head_index = byte_index(&self.lines[start.line], start.column);
        self.lines[start.line].truncate(head_index);
        self.lines[start.line].push_str(&tail);
        self.lines.drain(start.line + 1..=end.line);
        self.cursor = start;
        self.anchor = None;
        true
    }

    fn line_len(&self, line: usize) -> usize {
        self.lines.get(line).map_or(0, |text| text.chars().count())
    }

    fn clamped(&self, line: usize, column: usize) -> Position {
        let line = line.min(self.lines.len() - 1);
        Position::new(line, column.min(self.line_len(line)))
    }

    pub(super) fn take_scroll_changed(&mut self) -> bool {
        std::mem::take(&mut self.scroll_changed)
    }

    pub(super) fn take_cursor_changed(&mut self) -> bool {
        std::mem::take(&mut self.cursor_changed)
    }
}

fn byte_index(text: &str, column: usize) -> usize {
    text.char_indices()
        .nth(column)
        .map_or(text.len(), |(index, _)| index)
}

impl ScrollSurface for Document {
    fn locate(&self, selector: &str) -> Option<ElementId> {
        let wanted = self.kind.scroller_selector()?;
        if selector != wanted {
            return None;
        }
        self.active_scroller()
    }

    fn metrics(&self, element: ElementId) -> Option<ScrollMetrics> {
        (Some(element) == self.active_scroller()).then(|| ScrollMetrics {
            scroll_top: self.scroll_top,
            viewport_height: self.viewport_height,
            content_height: self.content_height(),
        })
    }

    fn set_scroll_top(&mut self, element: ElementId, scroll_top: f32) {
        if Some(element) != self.active_scroller() {
            return;
        }
        let scroll_top = scroll_top.clamp(0.0, self.max_scroll_top());
        if scroll_top != self.scroll_top {
            self.scroll_top = scroll_top;
            self.scroll_changed = true;
        }
    }
}

impl EditorHost for Document {
    fn scroller(&self) -> Option<ElementId> {
        self.kind.has_cursor().then_some(SOURCE_SCROLLER)
    }

    fn cursor(&self) -> Option<CursorGeometry> {
        if !self.kind.has_cursor() || self.viewport_height <= 0.0 {
            return None;
        }
        Some(CursorGeometry {
            y: self.cursor.line as f32 * self.line_height + self.line_height / 2.0
                - self.scroll_top,
            line: self.cursor.line,
        })
    }

    fn line_at_height(&self, document_y: f32) -> Option<usize> {
        if document_y < 0.0 {
            return None;
        }
        Some(((document_y / self.line_height) as usize).min(self.lines.len() - 1))
    }

    fn set_cursor_line(&mut self, line: usize) {
        let position = self.clamped(line, 0);
        if position != self.cursor || self.anchor.is_some() {
            self.cursor = position;
            self.anchor = None;
            self.cursor_changed = true;
        }
    }
}
