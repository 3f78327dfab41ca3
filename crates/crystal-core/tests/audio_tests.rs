// Envelope, transport and per-frame audio extraction.

use crystal_core::*;
use glam::Vec3;

fn loud_window() -> Vec<u8> {
    (0..256).map(|i| if i % 2 == 0 { 0 } else { 255 }).collect()
}

fn bounds() -> Bounds {
    Bounds {
        min: Vec3::new(-10.0, -1.0, -1.0),
        max: Vec3::new(10.0, 1.0, 1.0),
    }
}

#[test]
fn envelope_rises_faster_than_it_falls() {
    let mut env = AudioEnvelope::new(EnvelopeConfig::default());
    let rise = env.update(1.0);
    assert!((rise - 0.5).abs() < 1e-6, "one attack step, got {rise}");

    for _ in 0..60 {
        env.update(1.0);
    }
    let settled = env.level();
    assert!(settled > 0.999);
    let after = env.update(0.0);
    let fall = settled - after;
    assert!((fall - settled * 0.1).abs() < 1e-6);
    assert!(rise > fall, "rise {rise} should exceed fall {fall}");
}

#[test]
fn envelope_decays_to_silence_and_gates_on_floor() {
    let mut env = AudioEnvelope::new(EnvelopeConfig::default());
    env.update(0.5);
    assert!(env.is_audible());
    for _ in 0..200 {
        env.update(0.0);
    }
    assert!(!env.is_audible(), "level {} still audible", env.level());
    env.reset();
    assert_eq!(env.level(), 0.0);
}

#[test]
fn envelope_ignores_garbage_readings() {
    let mut env = AudioEnvelope::new(EnvelopeConfig::default());
    env.update(0.4);
    let before = env.level();
    let after = env.update(f32::NAN);
    assert!(after.is_finite());
    assert!(after < before, "NaN is treated as silence");
    assert!(env.update(-3.0) >= 0.0);
}

#[test]
fn rms_of_byte_windows() {
    assert_eq!(rms_from_bytes(&[]), 0.0);
    assert_eq!(rms_from_bytes(&[128; 64]), 0.0);
    let loud = rms_from_bytes(&loud_window());
    assert!(loud > 0.99 && loud <= 1.0, "got {loud}");
    let quiet: Vec<u8> = (0..64).map(|i| if i % 2 == 0 { 120 } else { 136 }).collect();
    let q = rms_from_bytes(&quiet);
    assert!((q - 8.0 / 128.0).abs() < 1e-6, "got {q}");
}

#[test]
fn rms_of_float_samples() {
    assert_eq!(rms(&[]), 0.0);
    assert!((rms(&[1.0, -1.0, 1.0, -1.0]) - 1.0).abs() < 1e-6);
    assert!((rms(&[0.5; 10]) - 0.5).abs() < 1e-6);
}

#[test]
fn play_needs_a_buffer() {
    let mut clock = PlaybackClock::default();
    assert_eq!(clock.play(0.0), None);
    assert_eq!(clock.state(), PlaybackState::Stopped);
    clock.load(0.0);
    assert!(!clock.has_buffer(), "zero-length buffers are rejected");
    assert_eq!(clock.tick(1.0), PlaybackTick::Idle);
}

#[test]
fn play_pause_resume_and_end() {
    let mut clock = PlaybackClock::default();
    clock.load(10.0);
    assert_eq!(clock.play(100.0), Some(0.0));
    assert!(clock.is_playing());
    assert_eq!(clock.play(101.0), None, "already playing");
    assert!((clock.progress(105.0) - 0.5).abs() < 1e-9);

    assert!(clock.pause(105.0));
    assert_eq!(clock.state(), PlaybackState::Paused { offset: 5.0 });
    assert!(!clock.pause(106.0));
    assert_eq!(clock.tick(500.0), PlaybackTick::Progress(0.5));

    assert_eq!(clock.play(200.0), Some(5.0));
    assert!((clock.progress(201.0) - 0.6).abs() < 1e-9);
    match clock.tick(203.0) {
        PlaybackTick::Progress(p) => assert!((p - 0.8).abs() < 1e-9),
        other => panic!("expected progress, got {other:?}"),
    }
    assert_eq!(clock.tick(206.0), PlaybackTick::Ended);
    assert_eq!(clock.state(), PlaybackState::Stopped);
    assert!(clock.has_buffer(), "buffer survives the end of playback");
    assert_eq!(clock.play(300.0), Some(0.0), "replay starts from the top");
}

#[test]
fn loading_a_buffer_stops_playback() {
    let mut clock = PlaybackClock::default();
    clock.load(10.0);
    clock.play(0.0);
    clock.load(4.0);
    assert_eq!(clock.state(), PlaybackState::Stopped);
    assert_eq!(clock.duration(), Some(4.0));
    clock.unload();
    assert!(!clock.has_buffer());
}

#[test]
fn progress_is_clamped() {
    let mut clock = PlaybackClock::default();
    assert_eq!(clock.progress(5.0), 0.0);
    clock.load(2.0);
    clock.play(10.0);
    assert_eq!(clock.progress(100.0), 1.0);
    assert_eq!(clock.progress(0.0), 0.0);
}

#[test]
fn play_x_maps_progress_onto_bounds() {
    let b = bounds();
    assert_eq!(play_x_for(0.0, &b), -10.0);
    assert_eq!(play_x_for(1.0, &b), 10.0);
    assert!((play_x_for(0.25, &b) + 5.0).abs() < 1e-6);
    assert!(!is_valid_play_x(PLAY_X_SENTINEL));
    assert!(is_valid_play_x(-10.0));
}

#[test]
fn extractor_reads_window_only_while_playing() {
    let window = loud_window();
    let b = bounds();
    let mut ex = AudioLevelExtractor::default();
    ex.load(10.0);

    let idle = ex.update(0.0, Some(&window), Some(&b));
    assert_eq!(idle.level, 0.0);
    assert!(!idle.play_x_valid());

    ex.clock.play(0.0);
    let frame = ex.update(5.0, Some(&window), Some(&b));
    assert!(frame.level > 0.4, "level {}", frame.level);
    assert!(frame.play_x.abs() < 1e-5, "halfway through maps to centre");
    assert!(!frame.ended);
}

#[test]
fn extractor_keeps_position_while_paused_and_clears_on_stop() {
    let b = bounds();
    let mut ex = AudioLevelExtractor::default();
    ex.load(10.0);
    ex.clock.play(0.0);
    ex.update(1.0, None, Some(&b));
    ex.clock.pause(2.5);
    let paused = ex.update(100.0, None, Some(&b));
    assert!((paused.play_x + 5.0).abs() < 1e-5, "got {}", paused.play_x);

    ex.stop();
    assert_eq!(ex.play_x(), PLAY_X_SENTINEL);
}

#[test]
fn extractor_signals_end_once() {
    let b = bounds();
    let window = loud_window();
    let mut ex = AudioLevelExtractor::default();
    ex.load(10.0);
    ex.clock.play(0.0);
    ex.update(9.0, Some(&window), Some(&b));

    let end = ex.update(11.0, Some(&window), Some(&b));
    assert!(end.ended);
    assert_eq!(end.play_x, PLAY_X_SENTINEL);
    let after = ex.update(12.0, Some(&window), Some(&b));
    assert!(!after.ended);
    assert!(after.level < end.level, "envelope decays once stopped");
}

#[test]
fn extractor_without_bounds_keeps_sentinel() {
    let mut ex = AudioLevelExtractor::default();
    ex.load(10.0);
    ex.clock.play(0.0);
    let frame = ex.update(3.0, None, None);
    assert_eq!(frame.play_x, PLAY_X_SENTINEL);
}
