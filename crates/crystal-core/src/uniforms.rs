//! Smoothed shader parameters.
//!
//! Controls write targets; once per frame `tick` moves every current value a
//! fixed fraction of the way toward its target. Toggle-like parameters snap.

use crate::constants::*;
use crate::palette::{palette_colors, PaletteColors};
use fnv::FnvHashMap;
use glam::Vec3;

/// Every continuously animated scalar the shaders read.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Param {
    LineNear,
    LineFar,
    NodeNear,
    NodeFar,
    Thinning,
    LineDensity,
    NodeDensity,
    XorDensity,
    XorThreshold,
    ColorInfluence,
    LineOpacity,
    NodeOpacity,
    InvertInfluence,
    NodeSaturation,
    PulseEnabled,
}

impl Param {
    pub const ALL: [Param; 15] = [
        Param::LineNear,
        Param::LineFar,
        Param::NodeNear,
        Param::NodeFar,
        Param::Thinning,
        Param::LineDensity,
        Param::NodeDensity,
        Param::XorDensity,
        Param::XorThreshold,
        Param::ColorInfluence,
        Param::LineOpacity,
        Param::NodeOpacity,
        Param::InvertInfluence,
        Param::NodeSaturation,
        Param::PulseEnabled,
    ];

    pub fn default_value(self) -> f32 {
        match self {
            Param::LineNear | Param::NodeNear => 150.0,
            Param::LineFar | Param::NodeFar => 1000.0,
            Param::Thinning => 0.4,
            Param::LineDensity | Param::NodeDensity => 1.0,
            Param::XorDensity => 0.62,
            Param::XorThreshold => 0.0115,
            Param::ColorInfluence => 0.9,
            Param::LineOpacity => 0.4,
            Param::NodeOpacity => 1.0,
            Param::InvertInfluence => 1.0,
            Param::NodeSaturation => 0.5,
            Param::PulseEnabled => 0.0,
        }
    }

    /// Parameters that only ever jump; smoothing would read as lag.
    pub fn snaps(self) -> bool {
        matches!(self, Param::PulseEnabled)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Smoothed {
    pub current: f32,
    pub target: f32,
}

impl Smoothed {
    fn settled(value: f32) -> Self {
        Self {
            current: value,
            target: value,
        }
    }
}

/// Distance slider (0..100) to fade `(near, far)`.
pub fn fade_distances(slider: f32) -> (f32, f32) {
    let near = DIST_NEAR_MIN + slider.clamp(0.0, 100.0) / 100.0 * DIST_NEAR_SPAN;
    (near, near * DIST_FAR_RATIO)
}

/// Percentage slider to a 0..1 density.
pub fn density_fraction(percent: f32) -> f32 {
    (percent / 100.0).clamp(0.0, 1.0)
}

/// XOR-line opacity curve: quadratic up to the knee, exponential beyond it.
pub fn xor_density_curve(slider: f32) -> f32 {
    let v = slider.clamp(0.0, 100.0);
    let knee_value = XOR_DENSITY_FLOOR + 0.06;
    if v <= XOR_KNEE {
        let t = v / XOR_KNEE;
        XOR_DENSITY_FLOOR + t * t * 0.06
    } else {
        let t = (v - XOR_KNEE) / (100.0 - XOR_KNEE);
        knee_value + 0.1 * (100f32.powf(t) - 1.0)
    }
}

/// Fraction of edges drawn as XOR lines for a density slider value.
pub fn xor_threshold(slider: f32) -> f32 {
    (slider.clamp(0.0, 100.0) / 100.0 * 0.05).max(XOR_THRESHOLD_MIN)
}

#[derive(Clone, Debug)]
pub struct UniformAnimator {
    values: FnvHashMap<Param, Smoothed>,
    palette_current: PaletteColors,
    palette_target: PaletteColors,
    spine: [Vec3; SPINE_POINTS],
    spine_len: usize,
    pub scalar_rate: f32,
    pub palette_rate: f32,
}

impl Default for UniformAnimator {
    fn default() -> Self {
        Self::new()
    }
}

impl UniformAnimator {
    pub fn new() -> Self {
        let values = Param::ALL
            .iter()
            .map(|&p| (p, Smoothed::settled(p.default_value())))
            .collect();
        Self {
            values,
            palette_current: [Vec3::ONE; PALETTE_LEN],
            palette_target: [Vec3::ONE; PALETTE_LEN],
            spine: [Vec3::ZERO; SPINE_POINTS],
            spine_len: 0,
            scalar_rate: SCALAR_SMOOTHING,
            palette_rate: PALETTE_SMOOTHING,
        }
    }

    pub fn get(&self, param: Param) -> Smoothed {
        self.values
            .get(&param)
            .copied()
            .unwrap_or_else(|| Smoothed::settled(param.default_value()))
    }

    #[inline]
    pub fn current(&self, param: Param) -> f32 {
        self.get(param).current
    }

    #[inline]
    pub fn target(&self, param: Param) -> f32 {
        self.get(param).target
    }

    /// Set a target; picked up on the next `tick`. Snapping parameters jump now.
    pub fn set_target(&mut self, param: Param, value: f32) {
        if !value.is_finite() {
            log::warn!("[uniforms] ignoring non-finite target for {param:?}");
            return;
        }
        let entry = self
            .values
            .entry(param)
            .or_insert_with(|| Smoothed::settled(param.default_value()));
        entry.target = value;
        if param.snaps() {
            entry.current = value;
        }
    }

    /// Set target and current together.
    pub fn snap(&mut self, param: Param, value: f32) {
        self.set_target(param, value);
        if let Some(entry) = self.values.get_mut(&param) {
            entry.current = entry.target;
        }
    }

    /// One smoothing step for every scalar and palette channel.
    pub fn tick(&mut self) {
        let rate = self.scalar_rate;
        for s in self.values.values_mut() {
            s.current += (s.target - s.current) * rate;
        }
        let rate = self.palette_rate;
        for (cur, target) in self.palette_current.iter_mut().zip(self.palette_target.iter()) {
            *cur += (*target - *cur) * rate;
        }
    }

    pub fn palette_current(&self) -> &PaletteColors {
        &self.palette_current
    }

    pub fn palette_target(&self) -> &PaletteColors {
        &self.palette_target
    }

    /// Select a named palette as the new colour target.
    pub fn set_palette(&mut self, name: &str) {
        self.palette_target = palette_colors(name);
    }

    /// Copy chain positions into the fixed-size shader array.
    pub fn mirror_spine(&mut self, positions: &[Vec3]) {
        let n = positions.len().min(SPINE_POINTS);
        self.spine[..n].copy_from_slice(&positions[..n]);
        self.spine_len = n;
    }

    pub fn spine(&self) -> &[Vec3] {
        &self.spine[..self.spine_len]
    }

    // Control-surface setters

    pub fn set_line_dist(&mut self, slider: f32) {
        let (near, far) = fade_distances(slider);
        self.set_target(Param::LineNear, near);
        self.set_target(Param::LineFar, far);
    }

    pub fn set_node_dist(&mut self, slider: f32) {
        let (near, far) = fade_distances(slider);
        self.set_target(Param::NodeNear, near);
        self.set_target(Param::NodeFar, far);
    }

    pub fn set_thinning(&mut self, value: f32) {
        self.set_target(Param::Thinning, value);
    }

    pub fn set_line_density(&mut self, percent: f32) {
        self.set_target(Param::LineDensity, density_fraction(percent));
    }

    pub fn set_node_density(&mut self, percent: f32) {
        self.set_target(Param::NodeDensity, density_fraction(percent));
    }

    pub fn set_xor_density(&mut self, slider: f32) {
        self.set_target(Param::XorDensity, xor_density_curve(slider));
        self.set_target(Param::XorThreshold, xor_threshold(slider));
    }

    pub fn set_color_influence(&mut self, value: f32) {
        self.set_target(Param::ColorInfluence, value);
    }

    pub fn set_line_opacity(&mut self, value: f32) {
        self.set_target(Param::LineOpacity, value);
    }

    pub fn set_node_opacity(&mut self, value: f32) {
        self.set_target(Param::NodeOpacity, value);
    }

    pub fn set_invert_influence(&mut self, enabled: bool) {
        self.snap(Param::InvertInfluence, if enabled { 1.0 } else { 0.0 });
    }

    pub fn set_node_saturation(&mut self, value: f32) {
        self.set_target(Param::NodeSaturation, value);
    }

    pub fn set_pulse(&mut self, enabled: bool) {
        self.snap(Param::PulseEnabled, if enabled { 1.0 } else { 0.0 });
    }
}
