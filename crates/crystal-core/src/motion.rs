//! Frame-driven motion that is not part of the deformation field: point-size
//! breathing, vertical auto-pan and auto-rotate.

use crate::constants::PAN_REFERENCE_HEIGHT;
use std::f32::consts::TAU;

#[derive(Clone, Debug)]
pub struct PointSizeLfo {
    pub base_size: f32,
    pub amount: f32,
    pub speed: f32,
}

impl Default for PointSizeLfo {
    fn default() -> Self {
        Self {
            base_size: 0.2,
            amount: 0.2,
            speed: 3.5,
        }
    }
}

impl PointSizeLfo {
    const MIN_SIZE: f32 = 0.001;

    /// Sprite size at wall-clock `t_sec`.
    pub fn size(&self, t_sec: f64) -> f32 {
        if self.amount <= 0.0 {
            return self.base_size;
        }
        let phase = (t_sec * self.speed as f64).sin() as f32;
        (self.base_size * (1.0 + phase * self.amount)).max(Self::MIN_SIZE)
    }
}

/// Slow vertical camera sweep between two heights expressed in slider units.
///
/// Slider units span `PAN_REFERENCE_HEIGHT` of a model, so the same settings
/// cover tall and short objects alike.
#[derive(Clone, Debug)]
pub struct AutoPan {
    pub enabled: bool,
    pub speed: f32,
    pub min: f32,
    pub max: f32,
    model_height: f32,
    model_bottom: f32,
    phase: f32,
    last_y: f32,
}

impl Default for AutoPan {
    fn default() -> Self {
        Self {
            enabled: false,
            speed: 0.0,
            min: 3.0,
            max: 9.0,
            model_height: PAN_REFERENCE_HEIGHT,
            model_bottom: -PAN_REFERENCE_HEIGHT / 2.0,
            phase: 0.0,
            last_y: 0.0,
        }
    }
}

impl AutoPan {
    const PHASE_PER_FRAME: f32 = 0.016;
    const SPEED_FLOOR: f32 = 0.01; // slider 0 still drifts

    pub fn set_model(&mut self, height: f32, bottom: f32) {
        self.model_height = height;
        self.model_bottom = bottom;
    }

    /// World height for a slider value.
    pub fn height_for(&self, slider: f32) -> f32 {
        self.model_bottom + slider * self.model_height / PAN_REFERENCE_HEIGHT
    }

    pub fn mid_height(&self) -> f32 {
        self.height_for((self.min + self.max) / 2.0)
    }

    /// Restart the sweep from the middle, as after a camera refit.
    pub fn reset(&mut self) {
        self.phase = 0.0;
        self.last_y = self.mid_height();
    }

    pub fn last_y(&self) -> f32 {
        self.last_y
    }

    /// Advance one frame; returns the vertical delta to apply to the camera.
    pub fn step(&mut self) -> f32 {
        if !self.enabled {
            return 0.0;
        }
        self.phase += Self::PHASE_PER_FRAME * (self.speed + Self::SPEED_FLOOR);
        let lo = self.height_for(self.min);
        let hi = self.height_for(self.max);
        let mid = (lo + hi) / 2.0;
        let amp = (hi - lo) / 2.0;
        self.move_to(mid + self.phase.sin() * amp)
    }

    /// Jump to a slider height; returns the vertical delta.
    pub fn manual_height(&mut self, slider: f32) -> f32 {
        let y = self.height_for(slider);
        self.move_to(y)
    }

    fn move_to(&mut self, y: f32) -> f32 {
        let delta = y - self.last_y;
        self.last_y = y;
        delta
    }

    pub fn toggle(&mut self) -> bool {
        self.enabled = !self.enabled;
        self.enabled
    }
}

#[derive(Clone, Debug)]
pub struct AutoRotate {
    pub enabled: bool,
    pub speed: f32,
}

impl Default for AutoRotate {
    fn default() -> Self {
        Self {
            enabled: true,
            speed: 0.2,
        }
    }
}

impl AutoRotate {
    /// Yaw increment per frame; speed 1 is one revolution per minute at 60 fps.
    pub fn angle_per_frame(&self) -> f32 {
        if self.enabled {
            TAU / 3600.0 * self.speed
        } else {
            0.0
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct MotionSettings {
    pub point_size: PointSizeLfo,
    pub pan: AutoPan,
    pub rotate: AutoRotate,
}
