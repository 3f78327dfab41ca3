//! Turn decoded audio into a tube of octagonal rings along the x axis.
//!
//! A one-pole low-pass splits each sample into bass and treble. Bass swells
//! the bottom of a ring, treble spikes the top, and the rings are stitched
//! together with a partly random lattice of edges.

use crate::error::LoadError;
use crate::geometry::GeometryBuffers;
use crate::palette::hsl_to_rgb;
use glam::Vec3;
use rand::Rng;
use std::f32::consts::TAU;

/// Decoded PCM as handed over by the platform decoder.
#[derive(Clone, Debug, Default)]
pub struct DecodedAudio {
    pub sample_rate: f32,
    pub channels: Vec<Vec<f32>>,
    pub duration_sec: f64,
}

#[derive(Clone, Debug)]
pub struct SynthConfig {
    pub target_rings: usize,
    pub segments: usize,
    /// Samples between low-pass updates.
    pub filter_stride: usize,
    pub filter_alpha: f32,
    pub time_scale: f32,
    pub base_radius: f32,
    pub amp_scale: f32,
    pub middle_scale: f32,
    pub bass_min_amp: f32,
    pub spike_threshold: f32,
    pub spike_scale: f32,
    pub bass_noise: f32,
    pub other_noise: f32,
    pub jitter: f32,
    /// Probability of each diagonal edge between neighbouring rings.
    pub diagonal_chance: f64,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            target_rings: 2000,
            segments: 8,
            filter_stride: 10,
            filter_alpha: 0.45,
            time_scale: 0.025,
            base_radius: 0.08,
            amp_scale: 12.0,
            middle_scale: 3.0,
            bass_min_amp: 0.05,
            spike_threshold: 0.02,
            spike_scale: 8.0,
            bass_noise: 0.02,
            other_noise: 0.15,
            jitter: 0.05,
            diagonal_chance: 0.6,
        }
    }
}

const BASS_BAND: f32 = -0.2; // sin(angle) below this is the bass region
const TREBLE_BAND: f32 = 0.2;

/// Build centred ring geometry from decoded audio.
pub fn synthesize<R: Rng>(
    audio: &DecodedAudio,
    config: &SynthConfig,
    rng: &mut R,
) -> Result<GeometryBuffers, LoadError> {
    let left = audio.channels.first().ok_or(LoadError::NoChannels)?;
    let right = audio.channels.get(1).unwrap_or(left);
    let total = left.len();
    if total == 0 {
        return Err(LoadError::EmptyAudio);
    }

    let step = (total / config.target_rings.max(1)).max(1);
    let segments = config.segments.max(3);
    let stride = config.filter_stride.max(1);
    let alpha = config.filter_alpha;
    let diagonal = config.diagonal_chance.clamp(0.0, 1.0);

    let mut positions = Vec::new();
    let mut colors = Vec::new();
    let mut edges: Vec<[u32; 2]> = Vec::new();

    let mut lp_l = 0.0f32;
    let mut lp_r = 0.0f32;
    let mut next_ring = 0usize;
    let mut prev_ring: Option<u32> = None;

    for i in (0..total).step_by(stride) {
        let raw_l = left[i];
        let raw_r = right.get(i).copied().unwrap_or(raw_l);
        lp_l += alpha * (raw_l - lp_l);
        lp_r += alpha * (raw_r - lp_r);

        if i < next_ring {
            continue;
        }
        next_ring += step;

        let bass = ((lp_l + lp_r) * 0.5).abs();
        let treble = (((raw_l - lp_l) + (raw_r - lp_r)) * 0.5).abs();
        let x = (i as f32 / step as f32) * config.time_scale;
        let ring_start = positions.len() as u32;
        let roll = rng.gen::<f32>() * TAU;

        for s in 0..segments {
            let angle = (s as f32 / segments as f32) * TAU + roll;
            let sin_v = angle.sin();

            let (amp, spike, is_bass) = if sin_v < BASS_BAND {
                ((bass * config.amp_scale).max(config.bass_min_amp), 0.0, true)
            } else if sin_v > TREBLE_BAND {
                let spike = if treble > config.spike_threshold {
                    rng.gen::<f32>() * treble * config.spike_scale
                } else {
                    0.0
                };
                (treble * config.amp_scale, spike, false)
            } else {
                ((bass + treble) * config.middle_scale, 0.0, false)
            };

            let noise_amount = if is_bass { config.bass_noise } else { config.other_noise };
            let radius = config.base_radius + amp + rng.gen::<f32>() * noise_amount + spike;
            let jitter = Vec3::new(
                rng.gen::<f32>() - 0.5,
                rng.gen::<f32>() - 0.5,
                rng.gen::<f32>() - 0.5,
            ) * config.jitter;

            positions.push(Vec3::new(x, angle.sin() * radius, angle.cos() * radius) + jitter);
            colors.push(if is_bass {
                Vec3::new(0.1, 0.5 + bass * 5.0, 1.0)
            } else {
                let hue = (x * 0.05 + angle / TAU).rem_euclid(1.0);
                hsl_to_rgb(hue, 1.0, 0.5)
            });
        }

        if let Some(prev) = prev_ring {
            let seg = segments as u32;
            for s in 0..seg {
                let next = (s + 1) % seg;
                let cur = ring_start + s;
                let cur_next = ring_start + next;
                let prev_idx = prev + s;
                let prev_next = prev + next;
                edges.push([prev_idx, cur]);
                edges.push([cur, cur_next]);
                if rng.gen_bool(diagonal) {
                    edges.push([prev_idx, cur_next]);
                }
                if rng.gen_bool(diagonal) {
                    edges.push([prev_next, cur]);
                }
            }
        }
        prev_ring = Some(ring_start);
    }

    log::debug!(
        "[synth] {} rings from {} samples at {} Hz",
        positions.len() / segments,
        total,
        audio.sample_rate
    );
    Ok(GeometryBuffers::new(positions, colors, edges).centered())
}
