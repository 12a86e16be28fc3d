//! Wheel samples
//!
//! A [`WheelSample`] is one normalized wheel event. Hosts report deltas in
//! pixels, lines or pages; everything downstream of [`WheelSample::normalized`]
//! works in pixels.

use std::time::Instant;

/// Pixel height of one line-mode wheel unit.
pub const LINE_HEIGHT_PX: f32 = 20.0;

/// Unit the host used for a wheel delta.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DeltaMode {
    /// Raw pixels, as reported by trackpads and most high-resolution wheels.
    #[default]
    Pixel,
    /// Whole lines, as reported by classic notched wheels.
    Line,
    /// Whole pages.
    Page,
}

impl DeltaMode {
    pub fn is_pixel(self) -> bool {
        matches!(self, DeltaMode::Pixel)
    }
}

/// A single wheel event.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WheelSample {
    pub delta_x: f32,
    pub delta_y: f32,
    pub delta_mode: DeltaMode,
    pub timestamp: Instant,
    pub ctrl_key: bool,
    pub shift_key: bool,
}

impl WheelSample {
    pub fn pixels(delta_x: f32, delta_y: f32, timestamp: Instant) -> Self {
        Self {
            delta_x,
            delta_y,
            delta_mode: DeltaMode::Pixel,
            timestamp,
            ctrl_key: false,
            shift_key: false,
        }
    }

    pub fn lines(delta_y: f32, timestamp: Instant) -> Self {
        Self {
            delta_x: 0.0,
            delta_y,
            delta_mode: DeltaMode::Line,
            timestamp,
            ctrl_key: false,
            shift_key: false,
        }
    }

    /// Rescale line and page deltas into pixel-equivalent deltas.
    ///
    /// The original [`DeltaMode`] is kept so the classifier can still see that
    /// the device reported discrete units.
    pub fn normalized(mut self, viewport_height: f32) -> Self {
        let scale = match self.delta_mode {
            DeltaMode::Pixel => 1.0,
            DeltaMode::Line => LINE_HEIGHT_PX,
            DeltaMode::Page => viewport_height.max(0.0),
        };
        self.delta_x *= scale;
        self.delta_y *= scale;
        self
    }

    /// Both axes carry motion in the same event.
    pub fn is_two_axis(&self) -> bool {
        self.delta_x != 0.0 && self.delta_y != 0.0
    }

    /// The event moves only horizontally.
    pub fn is_horizontal_only(&self) -> bool {
        self.delta_y == 0.0 && self.delta_x != 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::{DeltaMode, WheelSample, LINE_HEIGHT_PX};
    use std::time::Instant;

    #[test]
    fn line_deltas_scale_by_line_height() {
        let sample = WheelSample::lines(3.0, Instant::now()).normalized(800.0);
        assert_eq!(sample.delta_y, 3.0 * LINE_HEIGHT_PX);
        assert_eq!(sample.delta_mode, DeltaMode::Line);
    }

    #[test]
    fn page_deltas_scale_by_viewport_height() {
        let sample = WheelSample {
            delta_mode: DeltaMode::Page,
            ..WheelSample::pixels(0.0, -1.0, Instant::now())
        }
        .normalized(640.0);
        assert_eq!(sample.delta_y, -640.0);
    }

    #[test]
    fn pixel_deltas_are_untouched() {
        let sample = WheelSample::pixels(1.5, 7.25, Instant::now()).normalized(800.0);
        assert_eq!(sample.delta_x, 1.5);
        assert_eq!(sample.delta_y, 7.25);
    }

    #[test]
    fn axis_shape_helpers() {
        let now = Instant::now();
        assert!(WheelSample::pixels(1.0, 2.0, now).is_two_axis());
        assert!(!WheelSample::pixels(0.0, 2.0, now).is_two_axis());
        assert!(WheelSample::pixels(4.0, 0.0, now).is_horizontal_only());
        assert!(!WheelSample::pixels(0.0, 0.0, now).is_horizontal_only());
    }
}
