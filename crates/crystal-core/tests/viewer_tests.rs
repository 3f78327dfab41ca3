// Viewer lifecycle: loads, frames, camera, motion and frame-rate tracking.

use crystal_core::*;
use glam::Vec3;
use rand::rngs::StdRng;
use rand::SeedableRng;

const DT: f64 = 1.0 / 60.0;

fn cube(half: f32) -> GeometryBuffers {
    let positions = vec![
        Vec3::new(-half, -half, -half),
        Vec3::new(half, half, half),
        Vec3::new(half, -half, half),
    ];
    let colors = vec![Vec3::X, Vec3::Y, Vec3::Z];
    GeometryBuffers::new(positions, colors, vec![[0, 1], [1, 2]])
}

fn audio_geometry() -> SourceGeometry {
    let left: Vec<f32> = (0..4000).map(|i| ((i as f32) * 0.07).sin() * 0.4).collect();
    let audio = DecodedAudio {
        sample_rate: 4000.0,
        channels: vec![left],
        duration_sec: 10.0,
    };
    let buffers =
        synthesize(&audio, &SynthConfig::default(), &mut StdRng::seed_from_u64(2)).expect("synth");
    SourceGeometry::Audio {
        buffers,
        duration_sec: audio.duration_sec,
    }
}

fn input(elapsed: f64, audio_now: f64, window: Option<&[u8]>) -> FrameInput<'_> {
    FrameInput {
        dt: DT,
        elapsed,
        audio_now,
        window,
    }
}

#[test]
fn oversized_chain_still_spans_full_length_in_uniforms() {
    let config = ViewerConfig {
        spine: SpineConfig {
            count: 40,
            ..SpineConfig::default()
        },
        ..ViewerConfig::default()
    };
    let mut viewer = Viewer::new(config, 5);
    viewer.frame(input(DT, 0.0, None));
    let spine = viewer.uniforms.spine();
    assert_eq!(spine.len(), SPINE_POINTS);
    assert_eq!(viewer.spine.len(), SPINE_POINTS);
    let half = viewer.spine.config.length / 2.0;
    assert!((spine[0].x + half).abs() < 1e-4, "first sample at {}", spine[0].x);
    assert!(
        (spine[SPINE_POINTS - 1].x - half).abs() < 1e-4,
        "last sample at {}",
        spine[SPINE_POINTS - 1].x
    );
}

#[test]
fn idle_viewer_frames_without_geometry() {
    let mut viewer = Viewer::new(ViewerConfig::default(), 1);
    assert!(viewer.geometry().is_none());
    let rest = viewer.spine.export_positions();
    assert_eq!(viewer.uniforms.spine(), rest.as_slice());

    let out = viewer.frame(input(DT, 0.0, None));
    assert_eq!(out.substeps, 1);
    assert_eq!(out.level, 0.0);
    assert_eq!(out.play_x, PLAY_X_SENTINEL);
    assert!(!out.ended);
    assert_eq!(viewer.spine.export_positions(), rest);
    assert!((viewer.time() - DT as f32).abs() < 1e-6);
}

#[test]
fn loading_a_file_swaps_geometry_and_fits_camera() {
    let mut viewer = Viewer::new(ViewerConfig::default(), 1);
    let ticket = viewer.begin_load();
    let outcome = viewer
        .finish_load(ticket, Ok(SourceGeometry::File(cube(2.0))))
        .expect("load");
    assert_eq!(
        outcome,
        LoadOutcome::Swapped(GeometryStats {
            nodes: 3,
            links: 2,
            layers: 10
        })
    );
    assert!(viewer.geometry().is_some());
    assert!(!viewer.audio.clock.has_buffer());

    let expected = 2.0 / (CAMERA_FOV_DEG.to_radians() / 2.0).tan() * CAMERA_FIT_MARGIN;
    assert!(
        (viewer.camera.distance() - expected).abs() < 1e-3,
        "distance {} expected {expected}",
        viewer.camera.distance()
    );
}

#[test]
fn stale_loads_are_discarded() {
    let mut viewer = Viewer::new(ViewerConfig::default(), 1);
    let first = viewer.begin_load();
    let second = viewer.begin_load();

    let outcome = viewer.finish_load(first, Ok(SourceGeometry::File(cube(1.0))));
    assert_eq!(outcome, Ok(LoadOutcome::Stale));
    assert!(viewer.geometry().is_none());

    let stale_error = viewer.finish_load(first, Err(LoadError::NotPly));
    assert_eq!(stale_error, Ok(LoadOutcome::Stale), "stale errors are dropped too");

    let outcome = viewer.finish_load(second, Ok(SourceGeometry::File(cube(3.0))));
    assert!(matches!(outcome, Ok(LoadOutcome::Swapped(_))));
}

#[test]
fn failed_load_keeps_previous_geometry() {
    let mut viewer = Viewer::new(ViewerConfig::default(), 1);
    let t = viewer.begin_load();
    viewer
        .finish_load(t, Ok(SourceGeometry::File(cube(2.0))))
        .expect("first load");
    let before = viewer.geometry().map(|g| g.stats());

    let t = viewer.begin_load();
    let err = viewer.finish_load(t, Err(LoadError::MissingHeader));
    assert_eq!(err, Err(LoadError::MissingHeader));
    assert_eq!(viewer.geometry().map(|g| g.stats()), before);
}

#[test]
fn audio_playback_drives_the_spine() {
    let mut viewer = Viewer::new(ViewerConfig::default(), 4);
    let t = viewer.begin_load();
    viewer.finish_load(t, Ok(audio_geometry())).expect("audio load");
    assert!(viewer.audio.clock.has_buffer());
    assert_eq!(viewer.audio.clock.play(0.0), Some(0.0));

    let window: Vec<u8> = (0..256).map(|i| if i % 2 == 0 { 40 } else { 216 }).collect();
    let rest = viewer.spine.rest_positions().to_vec();
    let mut last = None;
    for f in 0..30 {
        let now = 5.0 + f as f64 * DT;
        last = Some(viewer.frame(input(now, now, Some(&window))));
    }
    let out = last.expect("frames ran");
    assert!(out.level > AUDIO_NOISE_FLOOR);
    let bounds = *viewer.geometry().expect("geometry").bounds();
    assert!(out.play_x > bounds.min.x && out.play_x < bounds.max.x);

    let moved = viewer
        .spine
        .export_positions()
        .iter()
        .zip(&rest)
        .any(|(p, r)| (*p - *r).length() > 1e-3);
    assert!(moved, "spine should respond to audio");
    assert_eq!(viewer.uniforms.spine(), viewer.spine.export_positions().as_slice());
}

#[test]
fn playback_end_is_reported() {
    let mut viewer = Viewer::new(ViewerConfig::default(), 4);
    let t = viewer.begin_load();
    viewer.finish_load(t, Ok(audio_geometry())).expect("audio load");
    viewer.audio.clock.play(0.0);
    let out = viewer.frame(input(1.0, 10.5, None));
    assert!(out.ended);
    assert_eq!(out.play_x, PLAY_X_SENTINEL);
    assert!(!viewer.audio.clock.is_playing());
}

#[test]
fn begin_load_stops_playback() {
    let mut viewer = Viewer::new(ViewerConfig::default(), 4);
    let t = viewer.begin_load();
    viewer.finish_load(t, Ok(audio_geometry())).expect("audio load");
    viewer.audio.clock.play(0.0);
    viewer.begin_load();
    assert!(!viewer.audio.clock.is_playing());
    assert_eq!(viewer.audio.play_x(), PLAY_X_SENTINEL);
}

#[test]
fn packed_uniforms_reflect_frame_state() {
    let mut viewer = Viewer::new(ViewerConfig::default(), 1);
    viewer.motion.point_size.amount = 0.0;
    let out = viewer.frame(input(2.0, 0.0, None));
    let u = viewer.uniforms_for(&out);
    assert_eq!(u.audio[0], 2.0);
    assert_eq!(u.audio[2], PLAY_X_SENTINEL);
    assert_eq!(u.style[3], viewer.motion.point_size.base_size);
    assert_eq!(u.spine_info[0], SPINE_LENGTH);
    assert_eq!(u.spine_info[1], SPINE_POINTS as f32);
    assert_eq!(u.soup[2], SOUP_AMPLITUDE);
    assert_eq!(u.spine[0][0], -SPINE_LENGTH / 2.0);
    let pal = viewer.uniforms.palette_current()[1];
    assert_eq!(&u.palette[1][..3], &pal.to_array());
}

#[test]
fn auto_rotate_keeps_orbit_distance() {
    let mut viewer = Viewer::new(ViewerConfig::default(), 1);
    let d0 = viewer.camera.distance();
    let eye0 = viewer.camera.eye;
    for f in 0..120 {
        viewer.frame(input(f as f64 * DT, 0.0, None));
    }
    assert!((viewer.camera.distance() - d0).abs() < 1e-2);
    assert!((viewer.camera.eye - eye0).length() > 0.1, "camera should have orbited");

    viewer.motion.rotate.enabled = false;
    let eye1 = viewer.camera.eye;
    viewer.frame(input(3.0, 0.0, None));
    assert_eq!(viewer.camera.eye, eye1);
}

#[test]
fn camera_orbit_and_dolly() {
    let mut cam = OrbitCamera::default();
    let d = cam.distance();
    cam.orbit(0.7, 0.2);
    assert!((cam.distance() - d).abs() < 1e-3);
    cam.orbit(0.0, 10.0);
    let pitch = ((cam.eye.y - cam.target.y) / cam.distance()).asin();
    assert!(pitch <= 1.5 + 1e-4, "pitch {pitch} past the pole clamp");

    cam.dolly(0.5);
    assert!((cam.distance() - d * 0.5).abs() < 1e-2);
    cam.dolly(1.0e-6);
    assert!((cam.distance() - 0.5).abs() < 1e-4);
    cam.dolly(1.0e9);
    assert!((cam.distance() - cam.zfar * 0.5).abs() < 1e-1);
}

#[test]
fn camera_fit_centres_on_bounds() {
    let mut cam = OrbitCamera::default();
    let b = Bounds {
        min: Vec3::new(0.0, 10.0, 0.0),
        max: Vec3::new(4.0, 14.0, 2.0),
    };
    cam.fit_to_bounds(&b);
    assert_eq!(cam.target, b.center());
    let dir = (cam.eye - cam.target).normalize();
    let expected = Vec3::from(CAMERA_FIT_DIR).normalize();
    assert!((dir - expected).length() < 1e-5);

    cam.pan_vertical(2.0);
    assert_eq!(cam.target.y, 14.0);
}

#[test]
fn point_size_breathes_around_base() {
    let mut lfo = PointSizeLfo::default();
    for i in 0..100 {
        let s = lfo.size(i as f64 * 0.05);
        assert!(s >= lfo.base_size * 0.8 - 1e-6 && s <= lfo.base_size * 1.2 + 1e-6);
    }
    lfo.amount = 0.0;
    assert_eq!(lfo.size(1.23), lfo.base_size);
    lfo.amount = 5.0;
    for i in 0..100 {
        assert!(lfo.size(i as f64 * 0.1) >= 0.001);
    }
}

#[test]
fn auto_pan_sweeps_between_limits() {
    let mut pan = AutoPan::default();
    pan.reset();
    assert_eq!(pan.step(), 0.0, "disabled pan does not move");

    assert!(pan.toggle());
    pan.speed = 5.0;
    let lo = pan.height_for(pan.min);
    let hi = pan.height_for(pan.max);
    let start = pan.last_y();
    let mut total = 0.0;
    for _ in 0..500 {
        total += pan.step();
        let y = pan.last_y();
        assert!(y >= lo - 1e-4 && y <= hi + 1e-4, "y {y} outside {lo}..{hi}");
    }
    assert!((start + total - pan.last_y()).abs() < 1e-3);
}

#[test]
fn manual_height_scales_with_model() {
    let mut pan = AutoPan::default();
    pan.set_model(30.0, -15.0);
    pan.reset();
    let mid = pan.last_y();
    let dy = pan.manual_height(PAN_REFERENCE_HEIGHT);
    assert!((pan.last_y() - 15.0).abs() < 1e-5);
    assert!((dy - (15.0 - mid)).abs() < 1e-5);

    let mut viewer = Viewer::new(ViewerConfig::default(), 1);
    let y0 = viewer.camera.target.y;
    let expected = viewer.motion.pan.height_for(12.0) - viewer.motion.pan.last_y();
    viewer.set_manual_height(12.0);
    assert!((viewer.camera.target.y - y0 - expected).abs() < 1e-5);
}

#[test]
fn auto_rotate_rate() {
    let mut rot = AutoRotate::default();
    rot.speed = 1.0;
    let per_minute = rot.angle_per_frame() * 3600.0;
    assert!((per_minute - std::f32::consts::TAU).abs() < 1e-4);
    rot.enabled = false;
    assert_eq!(rot.angle_per_frame(), 0.0);
}

#[test]
fn load_guard_only_honours_latest_ticket() {
    let mut guard = LoadGuard::default();
    let a = guard.begin();
    assert!(guard.is_current(a));
    let b = guard.begin();
    assert!(!guard.is_current(a));
    assert!(guard.is_current(b));
    assert!(b.generation() > a.generation());
}

#[test]
fn fps_is_reported_per_window() {
    let mut perf = PerformanceMonitor::new(0.0);
    let mut reported = None;
    let mut t = 0.0;
    while reported.is_none() {
        reported = perf.record(t);
        t += 16.7;
    }
    let fps = reported.expect("window closed");
    assert!(fps > 50.0 && fps < 70.0, "fps {fps}");
    assert_eq!(perf.fps(), fps);
}

#[test]
fn fps_counts_slots_not_calls() {
    let mut perf = PerformanceMonitor::new(0.0);
    assert_eq!(perf.record(1.0), None);
    assert_eq!(perf.record(2.0), None);
    assert_eq!(perf.record(3.0), None);
    assert_eq!(perf.record(251.0), Some(8.0));

    perf.reset(1000.0);
    assert_eq!(perf.record(1100.0), None);
    assert_eq!(perf.record(1251.0), Some(8.0));
}
