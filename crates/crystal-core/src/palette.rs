//! Named six-colour palettes and the hue remap the shaders apply.

use crate::constants::PALETTE_LEN;
use glam::Vec3;

pub type PaletteColors = [Vec3; PALETTE_LEN];

pub const DEFAULT_PALETTE: &str = "classic";

pub const PALETTES: &[(&str, [&str; PALETTE_LEN])] = &[
    ("classic", ["#ff0000", "#ffff00", "#00ff00", "#00ffff", "#0000ff", "#ff00ff"]),
    ("stockholm", ["#2E3440", "#4C566A", "#81A1C1", "#88C0D0", "#8FBCBB", "#ECEFF4"]),
    ("copenhagen", ["#4A4E69", "#9A8C98", "#C9ADA7", "#F2E9E4", "#22223B", "#822100"]),
    ("helsinki", ["#001219", "#005F73", "#0A9396", "#94D2BD", "#E9D8A6", "#EE9B00"]),
    ("berlin", ["#2B2D42", "#8D99AE", "#EDF2F4", "#EF233C", "#D90429", "#FFD700"]),
    ("kyoto", ["#2D3142", "#4F5D75", "#BFC0C0", "#FFFFFF", "#EF8354", "#84A59D"]),
    ("brooklyn", ["#355070", "#6D597A", "#B56576", "#E56B6F", "#EAAC8B", "#FFB700"]),
    ("malmo", ["#003049", "#669BBC", "#FDF0D5", "#C1121F", "#780000", "#F4A261"]),
];

pub fn palette_names() -> impl Iterator<Item = &'static str> {
    PALETTES.iter().map(|(name, _)| *name)
}

/// `#rrggbb` (leading `#` optional) to linear 0..1 components. Malformed input is black.
pub fn hex_to_rgb(hex: &str) -> Vec3 {
    let h = hex.trim_start_matches('#');
    let channel = |i: usize| {
        h.get(i..i + 2)
            .and_then(|s| u8::from_str_radix(s, 16).ok())
            .map_or(0.0, |v| v as f32 / 255.0)
    };
    if h.len() != 6 {
        return Vec3::ZERO;
    }
    Vec3::new(channel(0), channel(2), channel(4))
}

/// Resolve a palette by name, falling back to classic for unknown names.
pub fn palette_colors(name: &str) -> PaletteColors {
    let hexes = PALETTES
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .or_else(|| PALETTES.first())
        .map(|(_, hexes)| *hexes)
        .unwrap_or(["#ffffff"; PALETTE_LEN]);
    hexes.map(hex_to_rgb)
}

fn hue_to_channel(p: f32, q: f32, t: f32) -> f32 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

pub fn hsl_to_rgb(h: f32, s: f32, l: f32) -> Vec3 {
    if s <= 0.0 {
        return Vec3::splat(l);
    }
    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    Vec3::new(
        hue_to_channel(p, q, h + 1.0 / 3.0),
        hue_to_channel(p, q, h),
        hue_to_channel(p, q, h - 1.0 / 3.0),
    )
}

/// Hue in `[0, 1)` of an RGB colour, matching `rgb_hue` in the shader.
pub fn rgb_hue(c: Vec3) -> f32 {
    let max = c.max_element();
    let min = c.min_element();
    let delta = max - min;
    if delta <= 0.0 {
        return 0.0;
    }
    let h = if max == c.x {
        ((c.y - c.z) / delta).rem_euclid(6.0)
    } else if max == c.y {
        (c.z - c.x) / delta + 2.0
    } else {
        (c.x - c.y) / delta + 4.0
    };
    (h / 6.0).rem_euclid(1.0)
}

/// Replace a vertex colour by its hue's position along the palette ramp.
pub fn remap_to_palette(c: Vec3, palette: &PaletteColors) -> Vec3 {
    let scaled = rgb_hue(c) * (PALETTE_LEN - 1) as f32;
    let i = (scaled.floor() as usize).min(PALETTE_LEN - 2);
    let f = scaled - i as f32;
    palette[i].lerp(palette[i + 1], f)
}
