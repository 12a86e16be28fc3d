use glide::{DeltaMode, WheelSample};
use gpui::{Pixels, ScrollDelta, ScrollWheelEvent, TouchPhase};
use std::ops::Range;
use std::time::Instant;

use super::document::Motion;

/// Gesture start and end notifications carry no motion worth animating.
pub(super) fn is_gesture_boundary(touch_phase: TouchPhase) -> bool {
    !matches!(touch_phase, TouchPhase::Moved)
}

/// Convert a gpui wheel event into an engine sample.
///
/// gpui reports positive deltas when content should move down, the engine
/// expects positive deltas to increase the scroll offset.
pub(super) fn wheel_sample(event: &ScrollWheelEvent, now: Instant) -> WheelSample {
    let (delta_x, delta_y, delta_mode) = match event.delta {
        ScrollDelta::Lines(pt) => (-pt.x, -pt.y, DeltaMode::Line),
        ScrollDelta::Pixels(pt) => (-f32::from(pt.x), -f32::from(pt.y), DeltaMode::Pixel),
    };
    WheelSample {
        delta_x,
        delta_y,
        delta_mode,
        timestamp: now,
        ctrl_key: event.modifiers.control,
        shift_key: event.modifiers.shift,
    }
}

/// Pixel distance for a wheel event the engine passed through.
pub(super) fn native_scroll_delta(delta: ScrollDelta, line_height: Pixels) -> f32 {
    match delta {
        ScrollDelta::Lines(pt) => -pt.y * f32::from(line_height),
        ScrollDelta::Pixels(pt) => -f32::from(pt.y),
    }
}

/// Lines at least partly inside the viewport.
pub(super) fn visible_line_range(
    scroll_top: f32,
    viewport_height: f32,
    line_height: f32,
    line_count: usize,
) -> Range<usize> {
    if line_height <= 0.0 || line_count == 0 {
        return 0..0;
    }
    let first = (scroll_top.max(0.0) / line_height).floor() as usize;
    let last = ((scroll_top.max(0.0) + viewport_height.max(0.0)) / line_height).ceil() as usize;
    first.min(line_count)..last.min(line_count)
}

/// Scrollbar thumb as `(top, height)` inside a track as tall as the viewport.
pub(super) fn scrollbar_thumb(
    scroll_top: f32,
    viewport_height: f32,
    content_height: f32,
    min_thumb_height: f32,
) -> Option<(f32, f32)> {
    if viewport_height <= 0.0 || content_height <= viewport_height {
        return None;
    }
    let height = (viewport_height * viewport_height / content_height)
        .max(min_thumb_height)
        .min(viewport_height);
    let max_scroll_top = content_height - viewport_height;
    let progress = (scroll_top / max_scroll_top).clamp(0.0, 1.0);
    Some(((viewport_height - height) * progress, height))
}

pub(super) fn column_for_x(x: f32, cell_width: f32, line_len: usize) -> usize {
    if cell_width <= 0.0 {
        return 0;
    }
    ((x / cell_width).round().max(0.0) as usize).min(line_len)
}

pub(super) fn motion_for_key(key: &str, platform: bool) -> Option<Motion> {
    let motion = match (key, platform) {
        ("up", true) => Motion::DocumentStart,
        ("down", true) => Motion::DocumentEnd,
        ("left", true) | ("home", _) => Motion::LineStart,
        ("right", true) | ("end", _) => Motion::LineEnd,
        ("up", false) => Motion::Up,
        ("down", false) => Motion::Down,
        ("left", false) => Motion::Left,
        ("right", false) => Motion::Right,
        ("pageup", _) => Motion::PageUp,
        ("pagedown", _) => Motion::PageDown,
        _ => return None,
    };
    Some(motion)
}

pub(super) fn text_to_insert(keystroke: &gpui::Keystroke) -> Option<String> {
    if keystroke.modifiers.control || keystroke.modifiers.platform {
        return None;
    }

    if keystroke.modifiers.alt && keystroke.key_char.is_none() {
        return None;
    }

    if let Some(text) = keystroke.key_char.as_ref() {
        if !text.is_empty() && !text.chars().any(char::is_control) {
            return Some(text.clone());
        }
    }

    if keystroke.key.chars().count() == 1 && !keystroke.modifiers.alt && !keystroke.modifiers.function
    {
        return Some(keystroke.key.clone());
    }

    if keystroke.key == "space" {
        return Some(" ".to_string());
    }

    None
}

#[cfg(test)]
mod tests {
    use super::{
        column_for_x, is_gesture_boundary, motion_for_key, native_scroll_delta, scrollbar_thumb,
        text_to_insert, visible_line_range, wheel_sample,
    };
    use crate::document_view::document::Motion;
    use glide::DeltaMode;
    use gpui::{point, px, Keystroke, Modifiers, Point, ScrollDelta, ScrollWheelEvent, TouchPhase};
    use std::time::Instant;

    fn wheel_event(delta: ScrollDelta, modifiers: Modifiers) -> ScrollWheelEvent {
        ScrollWheelEvent {
            position: point(px(0.0), px(0.0)),
            delta,
            modifiers,
            touch_phase: TouchPhase::Moved,
        }
    }

    #[test]
    fn only_moved_phase_carries_scroll() {
        assert!(is_gesture_boundary(TouchPhase::Started));
        assert!(is_gesture_boundary(TouchPhase::Ended));
        assert!(!is_gesture_boundary(TouchPhase::Moved));
    }

    #[test]
    fn line_deltas_keep_their_unit_and_flip_direction() {
        let event = wheel_event(
            ScrollDelta::Lines(Point { x: 0.0, y: -3.0 }),
            Modifiers::default(),
        );
        let sample = wheel_sample(&event, Instant::now());
        assert_eq!(sample.delta_mode, DeltaMode::Line);
        assert_eq!(sample.delta_y, 3.0);
        assert!(!sample.ctrl_key);
    }

    #[test]
    fn pixel_deltas_carry_both_axes_and_modifiers() {
        let event = wheel_event(
            ScrollDelta::Pixels(Point {
                x: px(1.5),
                y: px(12.0),
            }),
            Modifiers {
                control: true,
                shift: true,
                ..Modifiers::default()
            },
        );
        let sample = wheel_sample(&event, Instant::now());
        assert_eq!(sample.delta_mode, DeltaMode::Pixel);
        assert_eq!(sample.delta_x, -1.5);
        assert_eq!(sample.delta_y, -12.0);
        assert!(sample.ctrl_key);
        assert!(sample.shift_key);
    }

    #[test]
    fn native_scroll_converts_lines_using_line_height() {
        assert_eq!(
            native_scroll_delta(ScrollDelta::Lines(Point { x: 0.0, y: -2.0 }), px(20.0)),
            40.0
        );
        assert_eq!(
            native_scroll_delta(
                ScrollDelta::Pixels(Point {
                    x: px(0.0),
                    y: px(15.0)
                }),
                px(20.0)
            ),
            -15.0
        );
    }

    #[test]
    fn visible_range_includes_partial_lines() {
        assert_eq!(visible_line_range(0.0, 100.0, 20.0, 50), 0..5);
        assert_eq!(visible_line_range(30.0, 100.0, 20.0, 50), 1..7);
        assert_eq!(visible_line_range(950.0, 100.0, 20.0, 50), 47..50);
        assert_eq!(visible_line_range(0.0, 100.0, 20.0, 0), 0..0);
    }

    #[test]
    fn scrollbar_thumb_tracks_scroll_progress() {
        assert_eq!(scrollbar_thumb(0.0, 100.0, 400.0, 10.0), Some((0.0, 25.0)));
        assert_eq!(scrollbar_thumb(300.0, 100.0, 400.0, 10.0), Some((75.0, 25.0)));
        assert_eq!(scrollbar_thumb(0.0, 100.0, 100_000.0, 10.0), Some((0.0, 10.0)));
        assert_eq!(scrollbar_thumb(0.0, 100.0, 80.0, 10.0), None);
    }

    #[test]
    fn column_rounds_to_nearest_cell_boundary() {
        assert_eq!(column_for_x(0.0, 8.0, 10), 0);
        assert_eq!(column_for_x(11.0, 8.0, 10), 1);
        assert_eq!(column_for_x(13.0, 8.0, 10), 2);
        assert_eq!(column_for_x(500.0, 8.0, 10), 10);
        assert_eq!(column_for_x(-4.0, 8.0, 10), 0);
    }

    #[test]
    fn navigation_keys_map_to_motions() {
        assert_eq!(motion_for_key("up", false), Some(Motion::Up));
        assert_eq!(motion_for_key("up", true), Some(Motion::DocumentStart));
        assert_eq!(motion_for_key("pagedown", false), Some(Motion::PageDown));
        assert_eq!(motion_for_key("home", true), Some(Motion::LineStart));
        assert_eq!(motion_for_key("a", false), None);
    }

    #[test]
    fn text_to_insert_returns_key_char_and_single_key_fallback() {
        let with_char = Keystroke {
            modifiers: Modifiers::default(),
            key: "a".to_string(),
            key_char: Some("ä".to_string()),
        };
        assert_eq!(text_to_insert(&with_char).as_deref(), Some("ä"));

        let without_char = Keystroke {
            modifiers: Modifiers::default(),
            key: "x".to_string(),
            key_char: None,
        };
        assert_eq!(text_to_insert(&without_char).as_deref(), Some("x"));
    }

    #[test]
    fn text_to_insert_rejects_control_and_named_keys() {
        let ctrl = Keystroke::parse("ctrl-a").expect("valid keystroke");
        assert_eq!(text_to_insert(&ctrl), None);

        let enter = Keystroke {
            modifiers: Modifiers::default(),
            key: "enter".to_string(),
            key_char: Some("\n".to_string()),
        };
        assert_eq!(text_to_insert(&enter), None);
    }
}
