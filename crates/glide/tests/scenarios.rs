mod common;

use std::time::{Duration, Instant};

use common::{settle, FakeEditor, FRAME};
use glide::settings::ClassifierSettings;
use glide::{
    CursorChange, FrameQueue, GlideSettings, InputDevice, ScrollEngine, ViewKind, WheelSample,
    WheelSampleClassifier,
};

fn source_engine(settings: GlideSettings, queue: &mut FrameQueue) -> ScrollEngine {
    let mut engine = ScrollEngine::new(settings);
    engine.activate_view(ViewKind::MarkdownSource, queue);
    engine
}

#[test]
fn single_notch_glides_to_exact_target() {
    let mut queue = FrameQueue::new();
    let mut engine = source_engine(GlideSettings::default(), &mut queue);
    let mut host = FakeEditor::new(10_000).scrolled_to(1000.0);
    let start = Instant::now();

    let disposition = engine.on_wheel(WheelSample::lines(120.0, start), &mut host, &mut queue);
    assert!(disposition.is_handled());
    assert_eq!(engine.classifier().state().last_trackpad_use(), None);

    let (_, ticks) = settle(&mut engine, &mut host, &mut queue, start);

    // 200 ms at 16 ms per frame.
    assert_eq!(ticks, 13);
    assert_eq!(host.scroll_top, 1000.0 + 120.0 * 20.0);
    assert!(host.scroll_writes.windows(2).all(|pair| pair[1] > pair[0]));
}

#[test]
fn notch_honors_speed_and_invert() {
    let mut settings = GlideSettings::default();
    settings.smooth_scroll.invert = true;
    settings.smooth_scroll.mouse_speed = 0.5;
    let mut queue = FrameQueue::new();
    let mut engine = source_engine(settings, &mut queue);
    let mut host = FakeEditor::new(10_000).scrolled_to(3000.0);
    let start = Instant::now();

    engine.on_wheel(WheelSample::lines(120.0, start), &mut host, &mut queue);
    settle(&mut engine, &mut host, &mut queue, start);

    assert_eq!(host.scroll_top, 1800.0);
}

#[test]
fn repeated_notches_keep_one_frame_request() {
    let mut queue = FrameQueue::new();
    let mut engine = source_engine(GlideSettings::default(), &mut queue);
    let mut host = FakeEditor::new(10_000);
    let start = Instant::now();

    engine.on_wheel(WheelSample::lines(3.0, start), &mut host, &mut queue);
    assert_eq!(queue.len(), 1);

    let now = start + FRAME;
    for handle in queue.take_pending() {
        engine.on_frame(handle, now, &mut host, &mut queue);
    }
    assert_eq!(queue.len(), 1);

    engine.on_wheel(
        WheelSample::lines(3.0, start + Duration::from_millis(50)),
        &mut host,
        &mut queue,
    );
    assert_eq!(queue.len(), 1);
    assert_eq!(engine.view().map(|view| view.active_animations()), Some(1));

    settle(&mut engine, &mut host, &mut queue, start + Duration::from_millis(50));
    assert_eq!(host.scroll_top, 120.0);
}

#[test]
fn trackpad_coast_decelerates_every_frame() {
    let mut queue = FrameQueue::new();
    let mut engine = source_engine(GlideSettings::default(), &mut queue);
    let mut host = FakeEditor::new(10_000).scrolled_to(2000.0);
    let start = Instant::now();

    let swipe = WheelSample::pixels(2.0, 30.0, start);
    assert!(engine.on_wheel(swipe, &mut host, &mut queue).is_handled());
    assert!(engine.classifier().state().last_trackpad_use().is_some());

    settle(&mut engine, &mut host, &mut queue, start);

    let mut positions = vec![2000.0];
    positions.extend(host.scroll_writes.iter().copied());
    let steps: Vec<f32> = positions.windows(2).map(|pair| pair[1] - pair[0]).collect();
    assert!(steps.len() > 2);
    assert!(steps.iter().all(|step| *step > 0.0));
    assert!(steps.windows(2).all(|pair| pair[1] < pair[0]));
    assert!(!engine.is_animating());
}

#[test]
fn sticky_trackpad_expires_after_grace_window() {
    let settings = ClassifierSettings::default();
    let mut classifier = WheelSampleClassifier::new();
    let t0 = Instant::now();

    let samples = [
        (WheelSample::pixels(1.5, 4.0, t0), InputDevice::Trackpad),
        (
            WheelSample::pixels(1.0, 6.0, t0 + Duration::from_millis(16)),
            InputDevice::Trackpad,
        ),
        (
            WheelSample::pixels(0.0, 120.0, t0 + Duration::from_millis(500)),
            InputDevice::Trackpad,
        ),
        (
            WheelSample::pixels(0.0, 120.0, t0 + Duration::from_millis(1500)),
            InputDevice::MouseWheel,
        ),
    ];
    for (index, (sample, expected)) in samples.iter().enumerate() {
        assert_eq!(
            classifier.classify(sample, &settings),
            *expected,
            "sample {index}"
        );
    }
}

#[test]
fn two_axis_streams_always_read_as_trackpad() {
    let settings = ClassifierSettings::default();
    let mut classifier = WheelSampleClassifier::new();
    let mut now = Instant::now();

    for i in 0..200u64 {
        now += Duration::from_millis(1 + (i * 37) % 400);
        let delta_x = if i % 2 == 0 { 0.5 } else { -3.0 };
        let delta_y = [120.0, -4.0, 0.25, 240.0, -60.0][i as usize % 5];
        let sample = WheelSample::pixels(delta_x, delta_y, now);
        assert_eq!(
            classifier.classify(&sample, &settings),
            InputDevice::Trackpad,
            "event {i}"
        );
    }
}

#[test]
fn isolated_line_notch_reads_as_mouse() {
    let settings = ClassifierSettings::default();
    let mut classifier = WheelSampleClassifier::new();
    let now = Instant::now();
    assert_eq!(
        classifier.classify(&WheelSample::lines(120.0, now), &settings),
        InputDevice::MouseWheel
    );

    // A line notch ends any sticky trackpad classification.
    classifier.classify(
        &WheelSample::pixels(1.0, 1.0, now + Duration::from_millis(10)),
        &settings,
    );
    assert!(classifier.state().last_trackpad_use().is_some());
    assert_eq!(
        classifier.classify(
            &WheelSample::lines(3.0, now + Duration::from_millis(20)),
            &settings
        ),
        InputDevice::MouseWheel
    );
    assert_eq!(classifier.state().last_trackpad_use(), None);
}

#[test]
fn slow_pixel_notches_read_as_mouse() {
    let settings = ClassifierSettings::default();
    let mut classifier = WheelSampleClassifier::new();
    let mut now = Instant::now();
    for _ in 0..5 {
        assert_eq!(
            classifier.classify(&WheelSample::pixels(0.0, 120.0, now), &settings),
            InputDevice::MouseWheel
        );
        now += Duration::from_millis(400);
    }
}

#[test]
fn centering_scrolls_to_comfort_zone_edge() {
    let mut settings = GlideSettings::default();
    settings.centering.radius_percent = 25.0;
    let mut queue = FrameQueue::new();
    let mut engine = source_engine(settings, &mut queue);
    let mut host = FakeEditor::new(10_000).scrolled_to(990.0).with_cursor(77);
    assert_eq!(host.cursor_y(), 560.0);
    let start = Instant::now();

    let plan = engine
        .on_cursor_change(CursorChange::navigation(), start, &mut host, &mut queue)
        .expect("cursor sits 160px below center");
    assert_eq!(plan.target, 1050.0);

    settle(&mut engine, &mut host, &mut queue, start);
    assert_eq!(host.scroll_top, 1050.0);
    assert_eq!(host.cursor_y(), 500.0);
    assert_eq!(host.cursor_moves, 0);
}

#[test]
fn comfortable_cursor_never_scrolls() {
    let start = Instant::now();
    for radius in (0..=100).step_by(10) {
        let mut settings = GlideSettings::default();
        settings.centering.radius_percent = radius as f32;
        let mut queue = FrameQueue::new();
        let mut engine = source_engine(settings, &mut queue);
        let allowed = 400.0 * radius as f32 / 100.0;

        for line in 100..140 {
            let mut host = FakeEditor::new(10_000).scrolled_to(2000.0).with_cursor(line);
            if (host.cursor_y() - 400.0).abs() > allowed {
                continue;
            }
            let plan =
                engine.on_cursor_change(CursorChange::navigation(), start, &mut host, &mut queue);
            assert!(plan.is_none(), "radius {radius} line {line}");
            assert!(host.scroll_writes.is_empty());
        }
        assert!(queue.is_empty());
    }
}

#[test]
fn wheel_cancels_running_centering() {
    let mut queue = FrameQueue::new();
    let mut engine = source_engine(GlideSettings::default(), &mut queue);
    let mut host = FakeEditor::new(10_000).scrolled_to(1000.0).with_cursor(120);
    let start = Instant::now();

    assert!(engine
        .on_cursor_change(CursorChange::navigation(), start, &mut host, &mut queue)
        .is_some());
    assert_eq!(engine.view().map(|view| view.active_animations()), Some(1));

    engine.on_wheel(
        WheelSample::lines(-3.0, start + Duration::from_millis(5)),
        &mut host,
        &mut queue,
    );
    assert_eq!(queue.len(), 1);
    assert_eq!(engine.view().map(|view| view.active_animations()), Some(1));
}

fn assert_centering_takes_over(sample: WheelSample) {
    let mut queue = FrameQueue::new();
    let mut engine = source_engine(GlideSettings::default(), &mut queue);
    let mut host = FakeEditor::new(10_000).scrolled_to(2000.0).with_cursor(400);
    let start = sample.timestamp;

    assert!(engine.on_wheel(sample, &mut host, &mut queue).is_handled());
    assert!(engine.is_animating());

    let plan = engine
        .on_cursor_change(
            CursorChange::navigation(),
            start + Duration::from_millis(5),
            &mut host,
            &mut queue,
        )
        .expect("cursor far below the viewport is centered");
    assert!(plan.steps > 1);
    assert_eq!(queue.len(), 1);
    assert_eq!(engine.view().map(|view| view.active_animations()), Some(1));

    settle(&mut engine, &mut host, &mut queue, start + Duration::from_millis(5));
    assert_eq!(host.scroll_top, plan.target);
    assert_eq!(host.cursor_line, 400);
    assert_eq!(host.cursor_moves, 0);
    assert!(!engine.is_animating());
}

#[test]
fn centering_takes_over_from_trackpad_coast() {
    assert_centering_takes_over(WheelSample::pixels(2.0, 60.0, Instant::now()));
}

#[test]
fn centering_takes_over_from_mouse_glide() {
    assert_centering_takes_over(WheelSample::lines(3.0, Instant::now()));
}
