//! Per-point displacement shared by node and line geometry.
//!
//! This is the CPU statement of what `vs_node` and `vs_line` in
//! `shaders/crystal.wgsl` compute. The renderer never calls it per vertex; it
//! exists so the field can be reasoned about and tested off the GPU.

use crate::constants::*;
use crate::noise::simplex3;
use glam::Vec3;

#[derive(Clone, Copy, Debug)]
pub struct DeformConfig {
    pub soup_frequency: f32,
    pub soup_speed: f32,
    pub soup_amplitude: f32,
    pub bounce_radius: f32,
    pub bounce_gain: f32,
    pub noise_floor: f32,
}

impl Default for DeformConfig {
    fn default() -> Self {
        Self {
            soup_frequency: SOUP_FREQUENCY,
            soup_speed: SOUP_SPEED,
            soup_amplitude: SOUP_AMPLITUDE,
            bounce_radius: BOUNCE_RADIUS,
            bounce_gain: BOUNCE_GAIN,
            noise_floor: AUDIO_NOISE_FLOOR,
        }
    }
}

/// Chain state as seen by the field: positions plus the span they cover.
#[derive(Clone, Copy, Debug)]
pub struct SpineSample<'a> {
    pub positions: &'a [Vec3],
    pub length: f32,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct DeformationField {
    pub config: DeformConfig,
}

#[inline]
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

#[inline]
pub fn fract(x: f32) -> f32 {
    x - x.floor()
}

/// Stable pseudo-random value in `[0, 1)` for a rest position.
#[inline]
pub fn position_seed(p: Vec3) -> f32 {
    fract(p.dot(Vec3::new(12.9898, 78.233, 45.164)).sin() * 43758.5453)
}

/// Pulse intensity travelling along z, 0 almost everywhere.
pub fn pulse(p: Vec3, time: f32) -> f32 {
    let offset = (p.x * 0.5).sin() + (p.y * 0.5).cos();
    let wave = (p.z * 0.2 + time * 2.5 + offset * 0.5).sin();
    smoothstep(0.9, 1.0, wave)
}

/// Distance fade in `[0, 1]`, squared for a softer tail.
#[inline]
pub fn fog_factor(near: f32, far: f32, dist: f32) -> f32 {
    let f = 1.0 - smoothstep(near, far, dist);
    f * f
}

/// Node sprites shrink toward the model centre.
#[inline]
pub fn node_size_scale(p: Vec3) -> f32 {
    let t = smoothstep(0.0, 7.5, p.length());
    0.2 + (1.0 - 0.2) * t
}

impl DeformationField {
    pub fn new(config: DeformConfig) -> Self {
        Self { config }
    }

    /// Slow noise drift independent of audio and simulation.
    pub fn soup_offset(&self, rest: Vec3, time: f32) -> Vec3 {
        let c = &self.config;
        let q = rest * c.soup_frequency + Vec3::splat(time * c.soup_speed);
        Vec3::new(
            simplex3(q),
            simplex3(q + Vec3::splat(SOUP_PHASE_Y)),
            simplex3(q + Vec3::splat(SOUP_PHASE_Z)),
        ) * c.soup_amplitude
    }

    /// How far the bent spine has dragged the axial slice at `x`.
    ///
    /// Interpolates the per-point displacement from rest between the two
    /// bracketing chain points. Outside the chain the nearest endpoint's
    /// displacement is used.
    pub fn spine_offset(&self, x: f32, spine: SpineSample<'_>) -> Vec3 {
        let n = spine.positions.len();
        if n < 2 || spine.length <= 0.0 {
            return Vec3::ZERO;
        }
        let half = spine.length / 2.0;
        let step = spine.length / (n - 1) as f32;
        let rest = |i: usize| Vec3::new(-half + i as f32 * step, 0.0, 0.0);
        let disp = |i: usize| spine.positions[i] - rest(i);

        let idx = (x + half) / step;
        if idx <= 0.0 {
            return disp(0);
        }
        let i = idx.floor() as usize;
        if i >= n - 1 {
            return disp(n - 1);
        }
        let f = idx - i as f32;
        disp(i).lerp(disp(i + 1), f)
    }

    /// Radial bulge around the playback position.
    pub fn audio_bounce(&self, rest: Vec3, level: f32, play_x: f32) -> Vec3 {
        let c = &self.config;
        if level <= c.noise_floor || play_x <= PLAY_X_VALID_ABOVE {
            return Vec3::ZERO;
        }
        let influence = 1.0 - smoothstep(0.0, c.bounce_radius, (rest.x - play_x).abs());
        if influence <= 0.0 {
            return Vec3::ZERO;
        }
        let radial = Vec3::new(0.0, rest.y, rest.z);
        let dir = if radial.length() > 0.001 {
            radial.normalize()
        } else {
            Vec3::Y
        };
        dir * level * influence * c.bounce_gain
    }

    /// Total displacement for a rest position.
    pub fn displacement(
        &self,
        rest: Vec3,
        time: f32,
        spine: SpineSample<'_>,
        level: f32,
        play_x: f32,
    ) -> Vec3 {
        self.soup_offset(rest, time)
            + self.spine_offset(rest.x, spine)
            + self.audio_bounce(rest, level, play_x)
    }

    pub fn displace(
        &self,
        rest: Vec3,
        time: f32,
        spine: SpineSample<'_>,
        level: f32,
        play_x: f32,
    ) -> Vec3 {
        rest + self.displacement(rest, time, spine, level, play_x)
    }
}
