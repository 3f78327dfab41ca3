// Smoothed parameters, control mappings and palettes.

use crystal_core::*;
use glam::Vec3;

fn close(a: f32, b: f32, tol: f32) -> bool {
    (a - b).abs() <= tol
}

#[test]
fn animator_starts_settled_on_defaults() {
    let anim = UniformAnimator::new();
    for p in Param::ALL {
        let s = anim.get(p);
        assert_eq!(s.current, p.default_value(), "{p:?}");
        assert_eq!(s.target, s.current, "{p:?}");
    }
    assert!(anim.spine().is_empty());
}

#[test]
fn tick_moves_a_fixed_fraction_toward_target() {
    let mut anim = UniformAnimator::new();
    anim.set_thinning(1.0);
    assert_eq!(anim.current(Param::Thinning), 0.4, "targets apply on tick");
    anim.tick();
    let v = anim.current(Param::Thinning);
    assert!(close(v, 0.4 + 0.6 * SCALAR_SMOOTHING, 1e-6), "got {v}");
    for _ in 0..100 {
        anim.tick();
    }
    assert!(close(anim.current(Param::Thinning), 1.0, 1e-4));
}

#[test]
fn toggles_snap_immediately() {
    let mut anim = UniformAnimator::new();
    anim.set_invert_influence(false);
    assert_eq!(anim.current(Param::InvertInfluence), 0.0);
    anim.set_pulse(true);
    assert_eq!(anim.current(Param::PulseEnabled), 1.0);
    anim.tick();
    assert_eq!(anim.current(Param::PulseEnabled), 1.0);
    assert_eq!(anim.current(Param::InvertInfluence), 0.0);
}

#[test]
fn non_finite_targets_are_ignored() {
    let mut anim = UniformAnimator::new();
    anim.set_target(Param::LineOpacity, f32::NAN);
    anim.set_target(Param::LineOpacity, f32::INFINITY);
    assert_eq!(anim.target(Param::LineOpacity), Param::LineOpacity.default_value());
}

#[test]
fn fade_slider_maps_to_near_and_far() {
    assert_eq!(fade_distances(0.0), (2.0, 3.0));
    let (near, far) = fade_distances(100.0);
    assert!(close(near, 150.0, 1e-4) && close(far, 225.0, 1e-4));
    assert_eq!(fade_distances(-5.0), fade_distances(0.0));

    let mut anim = UniformAnimator::new();
    anim.set_line_dist(50.0);
    assert!(close(anim.target(Param::LineNear), 76.0, 1e-4));
    assert!(close(anim.target(Param::LineFar), 114.0, 1e-4));
    assert_eq!(anim.target(Param::NodeNear), Param::NodeNear.default_value());
}

#[test]
fn density_percent_is_clamped() {
    assert_eq!(density_fraction(50.0), 0.5);
    assert_eq!(density_fraction(150.0), 1.0);
    assert_eq!(density_fraction(-1.0), 0.0);
}

#[test]
fn xor_curve_has_floor_and_no_jump_at_knee() {
    assert!(close(xor_density_curve(0.0), XOR_DENSITY_FLOOR, 1e-7));
    let below = xor_density_curve(XOR_KNEE - 1e-3);
    let at = xor_density_curve(XOR_KNEE);
    let above = xor_density_curve(XOR_KNEE + 1e-3);
    assert!(close(below, at, 1e-3), "{below} vs {at}");
    assert!(close(above, at, 1e-3), "{above} vs {at}");

    let mut prev = xor_density_curve(0.0);
    for i in 1..=100 {
        let v = xor_density_curve(i as f32);
        assert!(v >= prev, "curve not monotonic at {i}");
        prev = v;
    }
    assert!(close(xor_density_curve(100.0), 0.068 + 9.9, 1e-3));
}

#[test]
fn xor_threshold_has_a_floor() {
    assert_eq!(xor_threshold(0.0), XOR_THRESHOLD_MIN);
    assert!(close(xor_threshold(100.0), 0.05, 1e-7));
    assert!(close(xor_threshold(50.0), 0.025, 1e-7));

    let mut anim = UniformAnimator::new();
    anim.set_xor_density(0.0);
    assert_eq!(anim.target(Param::XorThreshold), XOR_THRESHOLD_MIN);
    assert!(close(anim.target(Param::XorDensity), XOR_DENSITY_FLOOR, 1e-7));
}

#[test]
fn palette_selection_is_idempotent() {
    let mut anim = UniformAnimator::new();
    anim.set_palette("classic");
    let first = *anim.palette_target();
    anim.set_palette("classic");
    assert_eq!(*anim.palette_target(), first);
    anim.set_palette("no-such-palette");
    assert_eq!(*anim.palette_target(), first, "unknown names fall back to classic");
}

#[test]
fn palette_blends_at_its_own_rate() {
    let mut anim = UniformAnimator::new();
    anim.set_palette("classic");
    assert_eq!(anim.palette_current()[0], Vec3::ONE);
    anim.tick();
    let c = anim.palette_current()[0];
    assert!(close(c.x, 1.0, 1e-6));
    assert!(close(c.y, 1.0 - PALETTE_SMOOTHING, 1e-6), "got {c:?}");
    for _ in 0..300 {
        anim.tick();
    }
    assert!((anim.palette_current()[0] - Vec3::X).length() < 1e-4);
}

#[test]
fn spine_mirror_truncates_to_capacity() {
    let mut anim = UniformAnimator::new();
    let long: Vec<Vec3> = (0..40).map(|i| Vec3::splat(i as f32)).collect();
    anim.mirror_spine(&long);
    assert_eq!(anim.spine().len(), SPINE_POINTS);
    assert_eq!(anim.spine()[3], Vec3::splat(3.0));
    anim.mirror_spine(&long[..5]);
    assert_eq!(anim.spine().len(), 5);
}

#[test]
fn every_palette_resolves() {
    assert!(palette_names().any(|n| n == DEFAULT_PALETTE));
    for name in palette_names() {
        let colors = palette_colors(name);
        assert_eq!(colors.len(), PALETTE_LEN);
        assert!(colors.iter().all(|c| c.min_element() >= 0.0 && c.max_element() <= 1.0));
        assert_eq!(palette_colors(&name.to_uppercase()), colors);
    }
}

#[test]
fn hex_parsing() {
    assert_eq!(hex_to_rgb("#ff0000"), Vec3::X);
    assert_eq!(hex_to_rgb("00ff00"), Vec3::Y);
    assert_eq!(hex_to_rgb("#fff"), Vec3::ZERO);
    assert_eq!(hex_to_rgb("#zzzzzz"), Vec3::ZERO);
}

#[test]
fn hsl_and_hue_round_trip_primaries() {
    assert!((hsl_to_rgb(0.0, 1.0, 0.5) - Vec3::X).length() < 1e-6);
    assert!((hsl_to_rgb(1.0 / 3.0, 1.0, 0.5) - Vec3::Y).length() < 1e-5);
    assert!((hsl_to_rgb(2.0 / 3.0, 1.0, 0.5) - Vec3::Z).length() < 1e-5);
    assert_eq!(hsl_to_rgb(0.3, 0.0, 0.25), Vec3::splat(0.25));

    assert_eq!(rgb_hue(Vec3::X), 0.0);
    assert!(close(rgb_hue(Vec3::Y), 1.0 / 3.0, 1e-6));
    assert!(close(rgb_hue(Vec3::Z), 2.0 / 3.0, 1e-6));
    assert_eq!(rgb_hue(Vec3::splat(0.5)), 0.0);
}

#[test]
fn remap_walks_the_palette_ramp() {
    let pal = palette_colors("classic");
    assert_eq!(remap_to_palette(Vec3::X, &pal), pal[0]);
    let blue = remap_to_palette(Vec3::Z, &pal);
    let expected = pal[3].lerp(pal[4], 1.0 / 3.0);
    assert!((blue - expected).length() < 1e-4, "{blue:?} vs {expected:?}");
    let grey = remap_to_palette(Vec3::splat(0.4), &pal);
    assert_eq!(grey, pal[0]);
}
