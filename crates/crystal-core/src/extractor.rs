//! Per-frame audio level and playback position.

use crate::constants::{PLAY_X_SENTINEL, PLAY_X_VALID_ABOVE};
use crate::envelope::{rms_from_bytes, AudioEnvelope, EnvelopeConfig};
use crate::geometry::Bounds;
use crate::playback::{PlaybackClock, PlaybackTick};

/// What the rest of the frame needs from the audio side.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AudioFrame {
    pub level: f32,
    pub play_x: f32,
    /// Set on the frame where playback ran past the end of the buffer.
    pub ended: bool,
}

impl AudioFrame {
    pub fn play_x_valid(&self) -> bool {
        is_valid_play_x(self.play_x)
    }
}

#[inline]
pub fn is_valid_play_x(play_x: f32) -> bool {
    play_x > PLAY_X_VALID_ABOVE
}

/// Map a playback fraction onto the x extent of the loaded geometry.
#[inline]
pub fn play_x_for(progress: f64, bounds: &Bounds) -> f32 {
    bounds.min.x + progress as f32 * (bounds.max.x - bounds.min.x)
}

#[derive(Clone, Debug)]
pub struct AudioLevelExtractor {
    pub envelope: AudioEnvelope,
    pub clock: PlaybackClock,
    play_x: f32,
}

impl Default for AudioLevelExtractor {
    fn default() -> Self {
        Self::new(EnvelopeConfig::default())
    }
}

impl AudioLevelExtractor {
    pub fn new(config: EnvelopeConfig) -> Self {
        Self {
            envelope: AudioEnvelope::new(config),
            clock: PlaybackClock::default(),
            play_x: PLAY_X_SENTINEL,
        }
    }

    #[inline]
    pub fn level(&self) -> f32 {
        self.envelope.level()
    }

    #[inline]
    pub fn play_x(&self) -> f32 {
        self.play_x
    }

    /// Explicit stop. Clears the play position back to the sentinel.
    pub fn stop(&mut self) {
        self.clock.stop();
        self.play_x = PLAY_X_SENTINEL;
    }

    /// Attach a new buffer; implies a stop and clears the envelope.
    pub fn load(&mut self, duration_sec: f64) {
        self.stop();
        self.envelope.reset();
        self.clock.load(duration_sec);
    }

    pub fn unload(&mut self) {
        self.stop();
        self.envelope.reset();
        self.clock.unload();
    }

    /// Sample one frame.
    ///
    /// `window` is the analyser's latest unsigned 8-bit time-domain snapshot;
    /// it only counts while the clock is playing. `bounds` is the loaded
    /// geometry, without which the play position cannot be mapped.
    pub fn update(&mut self, now: f64, window: Option<&[u8]>, bounds: Option<&Bounds>) -> AudioFrame {
        let raw = match window {
            Some(w) if self.clock.is_playing() => rms_from_bytes(w),
            _ => 0.0,
        };
        let level = self.envelope.update(raw);

        let mut ended = false;
        match self.clock.tick(now) {
            PlaybackTick::Progress(p) => {
                if let Some(b) = bounds {
                    self.play_x = play_x_for(p, b);
                }
            }
            PlaybackTick::Ended => {
                self.play_x = PLAY_X_SENTINEL;
                ended = true;
                log::info!("[audio] playback reached the end of the buffer");
            }
            PlaybackTick::Idle => {}
        }

        AudioFrame {
            level,
            play_x: self.play_x,
            ended,
        }
    }
}
