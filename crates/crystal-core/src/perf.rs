use crate::constants::{FPS_FRAME_MS, FPS_WINDOW_MS};

/// Frame-rate tracking for one viewer.
///
/// Counts distinct ~60 Hz frame slots seen in a fixed window and reports a
/// rate whenever the window closes. Timestamps are milliseconds from any
/// monotonic origin; the monitor never reads a clock itself.
#[derive(Clone, Debug)]
pub struct PerformanceMonitor {
    window_start_ms: f64,
    last_slot: Option<i64>,
    frames: u32,
    last_fps: f32,
}

impl PerformanceMonitor {
    pub fn new(now_ms: f64) -> Self {
        Self {
            window_start_ms: now_ms,
            last_slot: None,
            frames: 0,
            last_fps: 0.0,
        }
    }

    /// Start a fresh window, forgetting any partial count.
    pub fn reset(&mut self, now_ms: f64) {
        *self = Self::new(now_ms);
    }

    pub fn fps(&self) -> f32 {
        self.last_fps
    }

    /// Record a rendered frame. Returns the new rate when a window closes.
    pub fn record(&mut self, now_ms: f64) -> Option<f32> {
        let slot = (now_ms / FPS_FRAME_MS).floor() as i64;
        if self.last_slot != Some(slot) {
            self.frames += 1;
            self.last_slot = Some(slot);
        }
        if now_ms > self.window_start_ms + FPS_WINDOW_MS {
            self.last_fps = self.frames as f32 / (FPS_WINDOW_MS / 1000.0) as f32;
            self.frames = 0;
            self.window_start_ms = now_ms;
            return Some(self.last_fps);
        }
        None
    }
}
