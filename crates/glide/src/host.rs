//! Host editor interfaces
//!
//! The engine never owns the document or its widgets. Everything it needs to
//! read or mutate goes through these traits, implemented by the host editor.

/// Identifier of a scrollable element inside the host view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub u64);

/// Vertical scroll geometry of one element.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollMetrics {
    pub scroll_top: f32,
    pub viewport_height: f32,
    pub content_height: f32,
}

impl ScrollMetrics {
    pub fn max_scroll_top(&self) -> f32 {
        (self.content_height - self.viewport_height).max(0.0)
    }

    pub fn clamp(&self, scroll_top: f32) -> f32 {
        scroll_top.clamp(0.0, self.max_scroll_top())
    }
}

/// Scrollable elements of the host view.
pub trait ScrollSurface {
    /// Resolve a scroller selector to an element of the active view.
    fn locate(&self, selector: &str) -> Option<ElementId>;

    /// Geometry of `element`, or `None` when it is missing or detached.
    fn metrics(&self, element: ElementId) -> Option<ScrollMetrics>;

    /// Write the vertical scroll offset of `element`.
    fn set_scroll_top(&mut self, element: ElementId, scroll_top: f32);
}

/// Where the cursor currently sits.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CursorGeometry {
    /// Vertical center of the cursor, relative to the top of the viewport.
    pub y: f32,
    /// Zero-based document line holding the cursor.
    pub line: usize,
}

/// Queries and mutators of a text editor view.
pub trait EditorHost: ScrollSurface {
    /// The text scroller of the active editor.
    fn scroller(&self) -> Option<ElementId>;

    /// Cursor position, or `None` when it has not been measured yet.
    fn cursor(&self) -> Option<CursorGeometry>;

    /// Document line under a vertical position given in document (not viewport) pixels.
    fn line_at_height(&self, document_y: f32) -> Option<usize>;

    /// Place the cursor at the start of `line` without scrolling the view.
    fn set_cursor_line(&mut self, line: usize);
}

/// What caused a cursor or selection change.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ChangeOrigin {
    /// Text was inserted or deleted.
    Edit,
    /// Keyboard navigation.
    #[default]
    Keyboard,
    /// A click placed the cursor.
    Pointer,
    /// A pointer drag extended the selection.
    PointerDrag,
}

/// A cursor or selection change notification.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CursorChange {
    pub origin: ChangeOrigin,
    pub has_selection: bool,
}

impl CursorChange {
    pub fn edit() -> Self {
        Self {
            origin: ChangeOrigin::Edit,
            has_selection: false,
        }
    }

    pub fn navigation() -> Self {
        Self::default()
    }

    pub fn pointer(has_selection: bool) -> Self {
        Self {
            origin: ChangeOrigin::Pointer,
            has_selection,
        }
    }

    pub fn is_edit(&self) -> bool {
        matches!(self.origin, ChangeOrigin::Edit)
    }

    pub fn from_pointer(&self) -> bool {
        matches!(self.origin, ChangeOrigin::Pointer | ChangeOrigin::PointerDrag)
    }
}

/// Kind of document view the engine is attached to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ViewKind {
    MarkdownSource,
    MarkdownPreview,
    Pdf,
    Image,
}

/// Scroller selector for each view kind. Image views have no scroller.
const SCROLLER_SELECTORS: &[(ViewKind, Option<&str>)] = &[
    (ViewKind::MarkdownSource, Some(".cm-scroller")),
    (ViewKind::MarkdownPreview, Some(".markdown-preview-view")),
    (ViewKind::Pdf, Some(".pdf-viewer-container")),
    (ViewKind::Image, None),
];

impl ViewKind {
    pub fn scroller_selector(self) -> Option<&'static str> {
        SCROLLER_SELECTORS
            .iter()
            .find(|(kind, _)| *kind == self)
            .and_then(|(_, selector)| *selector)
    }

    /// Locate the element wheel input should scroll in a view of this kind.
    pub fn locate_scroller(self, surface: &dyn ScrollSurface) -> Option<ElementId> {
        self.scroller_selector()
            .and_then(|selector| surface.locate(selector))
    }

    /// Only source views have a text cursor to center or move.
    pub fn has_cursor(self) -> bool {
        matches!(self, ViewKind::MarkdownSource)
    }
}
