use crate::constants::{AUDIO_NOISE_FLOOR, ENVELOPE_ATTACK, ENVELOPE_DECAY};

#[derive(Clone, Copy, Debug)]
pub struct EnvelopeConfig {
    /// Blend factor used when the raw level rises above the smoothed one.
    pub attack: f32,
    /// Blend factor used otherwise.
    pub decay: f32,
    pub noise_floor: f32,
}

impl Default for EnvelopeConfig {
    fn default() -> Self {
        Self {
            attack: ENVELOPE_ATTACK,
            decay: ENVELOPE_DECAY,
            noise_floor: AUDIO_NOISE_FLOOR,
        }
    }
}

/// Asymmetrically smoothed audio energy: fast rise, slow fall.
#[derive(Clone, Debug, Default)]
pub struct AudioEnvelope {
    pub config: EnvelopeConfig,
    level: f32,
}

impl AudioEnvelope {
    pub fn new(config: EnvelopeConfig) -> Self {
        Self { config, level: 0.0 }
    }

    #[inline]
    pub fn level(&self) -> f32 {
        self.level
    }

    /// True once the level is loud enough to drive forces and bounce.
    #[inline]
    pub fn is_audible(&self) -> bool {
        self.level > self.config.noise_floor
    }

    /// Fold one raw RMS reading into the envelope and return the new level.
    pub fn update(&mut self, raw: f32) -> f32 {
        let raw = if raw.is_finite() { raw.max(0.0) } else { 0.0 };
        let rate = if raw > self.level {
            self.config.attack
        } else {
            self.config.decay
        };
        self.level += (raw - self.level) * rate;
        self.level
    }

    pub fn reset(&mut self) {
        self.level = 0.0;
    }
}

/// Root-mean-square of normalized samples.
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: f32 = samples.iter().map(|s| s * s).sum();
    (sum / samples.len() as f32).sqrt()
}

/// RMS of unsigned 8-bit time-domain data where 128 is silence.
pub fn rms_from_bytes(window: &[u8]) -> f32 {
    if window.is_empty() {
        return 0.0;
    }
    let sum: f32 = window
        .iter()
        .map(|&b| {
            let v = (b as f32 - 128.0) / 128.0;
            v * v
        })
        .sum();
    (sum / window.len() as f32).sqrt()
}
