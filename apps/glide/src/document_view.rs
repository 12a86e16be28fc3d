//! Document view - renders a text document with GPUI and drives the scroll engine

use gpui::{
    canvas, div, fill, hsla, point, px, size, App, AsyncWindowContext, Bounds, ContentMask,
    Context, FocusHandle, Focusable, Font, FontFallbacks, FontFeatures, FontStyle, FontWeight,
    InteractiveElement, IntoElement, KeyDownEvent, MouseButton, MouseDownEvent, MouseMoveEvent,
    MouseUpEvent, ParentElement, Pixels, Render, ScrollWheelEvent, ShapedLine, SharedString,
    Size, Styled, Subscription, TextRun, WeakEntity, Window,
};
use std::time::Instant;

use glide::frame::FRAME_INTERVAL;
use glide::{
    ChangeOrigin, CursorChange, FrameQueue, GlideSettings, ScrollEngine, ScrollSurface, ViewKind,
};

mod document;
mod utils;

use document::{Document, Position};
use utils::{
    is_gesture_boundary, motion_for_key, native_scroll_delta, scrollbar_thumb, text_to_insert,
    visible_line_range, wheel_sample,
};

const FONT_SIZE: f32 = 14.0;
const LINE_HEIGHT_RATIO: f32 = 1.4;
const SCROLLBAR_WIDTH: f32 = 8.0;
const MIN_THUMB_HEIGHT: f32 = 24.0;
const CURSOR_WIDTH: f32 = 2.0;

fn font_family() -> &'static str {
    if cfg!(target_os = "macos") {
        "Menlo"
    } else if cfg!(target_os = "windows") {
        "Consolas"
    } else {
        "DejaVu Sans Mono"
    }
}

fn font_fallbacks() -> Vec<String> {
    ["SF Mono", "Liberation Mono", "Noto Sans Mono", "Monospace"]
        .into_iter()
        .map(str::to_string)
        .collect()
}

pub struct DocumentView {
    document: Document,
    engine: ScrollEngine,
    frames: FrameQueue,
    focus_handle: FocusHandle,
    font: Font,
    font_size: Pixels,
    cell_size: Size<Pixels>,
    frame_tx: smol::channel::Sender<()>,
    pump_active: bool,
    dragging: bool,
    _resize_subscription: Subscription,
}

impl DocumentView {
    pub fn new(
        window: &mut Window,
        cx: &mut Context<Self>,
        settings: GlideSettings,
        text: String,
    ) -> Self {
        let text_system = window.text_system().clone();
        let font = Font {
            family: SharedString::from(font_family()),
            features: FontFeatures::default(),
            fallbacks: Some(FontFallbacks::from_fonts(font_fallbacks())),
            weight: FontWeight::NORMAL,
            style: FontStyle::Normal,
        };
        let font_size = px(FONT_SIZE);

        let font_id = text_system.resolve_font(&font);
        let cell_width = text_system
            .advance(font_id, font_size, 'm')
            .map(|advance| advance.width)
            .unwrap_or(px(8.4));
        let line_height = font_size * LINE_HEIGHT_RATIO;

        let mut document = Document::new(&text, f32::from(line_height));
        document.set_viewport_height(f32::from(window.viewport_size().height));

        let mut frames = FrameQueue::new();
        let mut engine = ScrollEngine::new(settings);
        engine.activate_view(document.kind(), &mut frames);

        let focus_handle = cx.focus_handle();
        window.focus(&focus_handle);

        let resize_subscription =
            cx.observe_window_bounds(window, |this: &mut Self, window, cx| {
                this.handle_resize(window, cx);
            });

        // Frame pump: each wake-up runs frames one interval apart until no
        // animation asks for another.
        let (frame_tx, frame_rx) = smol::channel::unbounded::<()>();
        cx.spawn_in(
            window,
            async move |this: WeakEntity<DocumentView>, cx: &mut AsyncWindowContext| {
                while frame_rx.recv().await.is_ok() {
                    loop {
                        smol::Timer::after(FRAME_INTERVAL).await;
                        let more = cx.update(|_window, cx| {
                            this.update(cx, |view, cx| view.tick_frames(Instant::now(), cx))
                        });
                        match more {
                            Ok(Ok(true)) => continue,
                            Ok(Ok(false)) => break,
                            _ => return,
                        }
                    }
                }
            },
        )
        .detach();

        DocumentView {
            document,
            engine,
            frames,
            focus_handle,
            font,
            font_size,
            cell_size: Size {
                width: cell_width,
                height: line_height,
            },
            frame_tx,
            pump_active: false,
            dragging: false,
            _resize_subscription: resize_subscription,
        }
    }

    pub fn sample_text(sections: usize) -> String {
        Document::sample_text(sections)
    }

    fn handle_resize(&mut self, window: &Window, cx: &mut Context<Self>) {
        let height = f32::from(window.viewport_size().height);
        if height != self.document.viewport_height() {
            self.document.set_viewport_height(height);
            cx.notify();
        }
    }

    fn ensure_frame_pump(&mut self) {
        if self.pump_active || self.frames.is_empty() {
            return;
        }
        if self.frame_tx.try_send(()).is_ok() {
            self.pump_active = true;
        } else {
            log::warn!("frame pump is gone; dropping {} frame requests", self.frames.len());
        }
    }

    /// Run every pending frame. Returns true while animations still want frames.
    fn tick_frames(&mut self, now: Instant, cx: &mut Context<Self>) -> bool {
        for handle in self.frames.take_pending() {
            self.engine
                .on_frame(handle, now, &mut self.document, &mut self.frames);
            self.flush_notifications(now);
        }
        cx.notify();

        let more = !self.frames.is_empty();
        if !more {
            self.pump_active = false;
        }
        more
    }

    /// Report document changes made by the engine back to it, the way an
    /// editor emits scroll and selection events after a programmatic write.
    fn flush_notifications(&mut self, now: Instant) {
        if self.document.take_scroll_changed() {
            if let Some(line) = self.engine.on_scroll(now, &mut self.document) {
                log::trace!("cursor followed scroll to line {line}");
            }
        }
        if self.document.take_cursor_changed() {
            self.engine.on_cursor_change(
                CursorChange::navigation(),
                now,
                &mut self.document,
                &mut self.frames,
            );
        }
    }

    fn cursor_changed(&mut self, origin: ChangeOrigin, now: Instant) {
        let change = CursorChange {
            origin,
            has_selection: self.document.has_selection(),
        };
        if let Some(plan) =
            self.engine
                .on_cursor_change(change, now, &mut self.document, &mut self.frames)
        {
            log::debug!(
                "centering {:.0} -> {:.0} in {} steps",
                plan.from,
                plan.target,
                plan.steps
            );
        }
        self.flush_notifications(now);
        self.ensure_frame_pump();
    }

    fn scrolled_natively(&mut self, delta: f32, now: Instant) {
        if self.document.scroll_by(delta) {
            self.engine.on_scroll(now, &mut self.document);
            self.flush_notifications(now);
        }
    }

    fn toggle_view_kind(&mut self, window: &mut Window) {
        let kind = match self.document.kind() {
            ViewKind::MarkdownSource => ViewKind::MarkdownPreview,
            _ => ViewKind::MarkdownSource,
        };
        self.document.set_kind(kind);
        self.engine.activate_view(kind, &mut self.frames);
        window.set_window_title(window_title(kind));
    }

    fn position_for(&self, x: Pixels, y: Pixels) -> Position {
        self.document
            .position_at(f32::from(x), f32::from(y), f32::from(self.cell_size.width))
    }

    fn shape_visible_lines(&self, text_system: &gpui::WindowTextSystem) -> Vec<(usize, ShapedLine)> {
        let range = visible_line_range(
            self.document.scroll_top(),
            self.document.viewport_height(),
            self.document.line_height(),
            self.document.line_count(),
        );
        let lines = self.document.lines();
        range
            .filter(|line| !lines[*line].is_empty())
            .map(|line| {
                let text = lines[line].clone();
                let shaped = text_system.shape_line(
                    SharedString::from(text.clone()),
                    self.font_size,
                    &[TextRun {
                        len: text.len(),
                        font: self.font.clone(),
                        color: hsla(0.0, 0.0, 0.9, 1.0),
                        background_color: None,
                        underline: None,
                        strikethrough: None,
                    }],
                    Some(self.cell_size.width),
                );
                (line, shaped)
            })
            .collect()
    }
}

fn window_title(kind: ViewKind) -> &'static str {
    match kind {
        ViewKind::MarkdownSource => "glide (source)",
        ViewKind::MarkdownPreview => "glide (preview)",
        ViewKind::Pdf => "glide (pdf)",
        ViewKind::Image => "glide (image)",
    }
}

impl Focusable for DocumentView {
    fn focus_handle(&self, _cx: &App) -> FocusHandle {
        self.focus_handle.clone()
    }
}

/// Everything the paint pass needs, in viewport coordinates.
struct PaintState {
    lines: Vec<(f32, ShapedLine)>,
    selection: Vec<(f32, f32, f32)>,
    cursor: Option<(f32, f32)>,
    thumb: Option<(f32, f32)>,
}

impl Render for DocumentView {
    fn render(&mut self, window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let text_system = window.text_system().clone();
        let cell_size = self.cell_size;
        let cell_width = f32::from(cell_size.width);
        let line_height = self.document.line_height();
        let scroll_top = self.document.scroll_top();
        let row_y = |line: usize| line as f32 * line_height - scroll_top;

        let lines = self
            .shape_visible_lines(&text_system)
            .into_iter()
            .map(|(line, shaped)| (row_y(line), shaped))
            .collect();
        let selection = visible_line_range(
            scroll_top,
            self.document.viewport_height(),
            line_height,
            self.document.line_count(),
        )
        .filter_map(|line| {
            self.document.selection_columns(line).map(|columns| {
                (
                    row_y(line),
                    columns.start as f32 * cell_width,
                    columns.len() as f32 * cell_width,
                )
            })
        })
        .collect();
        let cursor = self.document.kind().has_cursor().then(|| {
            let position = self.document.cursor_position();
            (position.column as f32 * cell_width, row_y(position.line))
        });
        let thumb = self
            .document
            .metrics(document::SOURCE_SCROLLER)
            .or_else(|| self.document.metrics(document::PREVIEW_SCROLLER))
            .and_then(|metrics| {
                scrollbar_thumb(
                    metrics.scroll_top,
                    metrics.viewport_height,
                    metrics.content_height,
                    MIN_THUMB_HEIGHT,
                )
            });
        let state = PaintState {
            lines,
            selection,
            cursor,
            thumb,
        };

        div()
            .id("document")
            .track_focus(&self.focus_handle)
            .size_full()
            .bg(hsla(0.0, 0.0, 0.1, 1.0))
            .on_mouse_down(
                MouseButton::Left,
                cx.listener(|this, event: &MouseDownEvent, window, cx| {
                    window.focus(&this.focus_handle);
                    if !this.document.kind().has_cursor() {
                        return;
                    }
                    let position = this.position_for(event.position.x, event.position.y);
                    this.dragging = true;
                    if this
                        .document
                        .place_cursor(position, event.modifiers.shift)
                    {
                        this.cursor_changed(ChangeOrigin::Pointer, Instant::now());
                        cx.notify();
                    }
                }),
            )
            .on_mouse_up(
                MouseButton::Left,
                cx.listener(|this, _event: &MouseUpEvent, _window, _cx| {
                    this.dragging = false;
                    this.engine.on_mouse_up(Instant::now());
                }),
            )
            .on_mouse_move(cx.listener(|this, event: &MouseMoveEvent, _window, cx| {
                if !this.dragging {
                    return;
                }
                if event.pressed_button != Some(MouseButton::Left) {
                    this.dragging = false;
                    return;
                }
                let position = this.position_for(event.position.x, event.position.y);
                if this.document.place_cursor(position, true) {
                    this.cursor_changed(ChangeOrigin::PointerDrag, Instant::now());
                    cx.notify();
                }
            }))
            .on_scroll_wheel(cx.listener(|this, event: &ScrollWheelEvent, _window, cx| {
                if is_gesture_boundary(event.touch_phase) {
                    return;
                }
                let now = Instant::now();
                let sample = wheel_sample(event, now);
                let disposition =
                    this.engine
                        .on_wheel(sample, &mut this.document, &mut this.frames);
                if !disposition.is_handled() {
                    let delta = native_scroll_delta(event.delta, this.cell_size.height);
                    this.scrolled_natively(delta, now);
                }
                this.ensure_frame_pump();
                cx.notify();
            }))
            .on_key_down(cx.listener(|this, event: &KeyDownEvent, window, cx| {
                let now = Instant::now();
                let keystroke = &event.keystroke;
                this.engine.on_key_down(now);

                if keystroke.key == "f2" {
                    this.toggle_view_kind(window);
                    cx.notify();
                    return;
                }
                if !this.document.kind().has_cursor() {
                    return;
                }

                if let Some(motion) = motion_for_key(&keystroke.key, keystroke.modifiers.platform)
                {
                    if this
                        .document
                        .move_cursor(motion, keystroke.modifiers.shift)
                    {
                        this.cursor_changed(ChangeOrigin::Keyboard, now);
                    }
                } else if keystroke.key == "enter" {
                    this.document.insert_newline();
                    this.cursor_changed(ChangeOrigin::Edit, now);
                } else if keystroke.key == "backspace" {
                    if this.document.backspace() {
                        this.cursor_changed(ChangeOrigin::Edit, now);
                    }
                } else if let Some(text) = text_to_insert(keystroke) {
                    this.document.insert_text(&text);
                    this.cursor_changed(ChangeOrigin::Edit, now);
                } else {
                    return;
                }
                cx.notify();
            }))
            .child(
                canvas(
                    move |_bounds, _window, _cx| state,
                    move |bounds, state, window, cx| {
                        let origin = bounds.origin;
                        window.with_content_mask(Some(ContentMask { bounds }), |window| {
                            for (y, x, width) in state.selection.iter() {
                                let selection_bounds = Bounds {
                                    origin: point(origin.x + px(*x), origin.y + px(*y)),
                                    size: size(px(*width), cell_size.height),
                                };
                                window.paint_quad(fill(
                                    selection_bounds,
                                    hsla(0.6, 0.5, 0.4, 0.5),
                                ));
                            }

                            for (y, shaped) in state.lines.iter() {
                                let line_origin = point(origin.x, origin.y + px(*y));
                                let _ = shaped.paint(line_origin, cell_size.height, window, cx);
                            }

                            if let Some((x, y)) = state.cursor {
                                let cursor_bounds = Bounds {
                                    origin: point(origin.x + px(x), origin.y + px(y)),
                                    size: size(px(CURSOR_WIDTH), cell_size.height),
                                };
                                window.paint_quad(fill(cursor_bounds, hsla(0., 0., 0.8, 0.9)));
                            }

                            if let Some((top, height)) = state.thumb {
                                let track = Bounds {
                                    origin: point(
                                        origin.x + bounds.size.width - px(SCROLLBAR_WIDTH),
                                        origin.y,
                                    ),
                                    size: size(px(SCROLLBAR_WIDTH), bounds.size.height),
                                };
                                let thumb = Bounds {
                                    origin: point(track.origin.x, origin.y + px(top)),
                                    size: size(px(SCROLLBAR_WIDTH), px(height)),
                                };
                                window.paint_quad(fill(track, hsla(0.0, 0.0, 0.25, 0.35)));
                                window.paint_quad(fill(thumb, hsla(0.0, 0.0, 0.65, 0.8)));
                            }
                        });
                    },
                )
                .size_full(),
            )
    }
}
