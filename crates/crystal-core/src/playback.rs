//! Transport state for the decoded audio buffer.
//!
//! Times are seconds on the audio clock supplied by the host. The clock never
//! reads a timer itself, which keeps every transition reproducible in tests.

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PlaybackState {
    Stopped,
    Playing { started_at: f64 },
    Paused { offset: f64 },
}

#[derive(Clone, Debug)]
pub struct PlaybackClock {
    state: PlaybackState,
    duration: Option<f64>,
}

impl Default for PlaybackClock {
    fn default() -> Self {
        Self {
            state: PlaybackState::Stopped,
            duration: None,
        }
    }
}

/// Where the transport stands after a tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PlaybackTick {
    Idle,
    Progress(f64),
    Ended,
}

impl PlaybackClock {
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        matches!(self.state, PlaybackState::Playing { .. })
    }

    pub fn has_buffer(&self) -> bool {
        self.duration.is_some()
    }

    pub fn duration(&self) -> Option<f64> {
        self.duration
    }

    /// Attach a newly decoded buffer. Any running playback is stopped first.
    pub fn load(&mut self, duration_sec: f64) {
        self.stop();
        self.duration = (duration_sec.is_finite() && duration_sec > 0.0).then_some(duration_sec);
    }

    pub fn unload(&mut self) {
        self.stop();
        self.duration = None;
    }

    /// Start or resume. Returns the buffer offset to start the source at, or
    /// `None` when there is nothing to play or playback is already running.
    pub fn play(&mut self, now: f64) -> Option<f64> {
        self.duration?;
        let offset = match self.state {
            PlaybackState::Playing { .. } => return None,
            PlaybackState::Paused { offset } => offset,
            PlaybackState::Stopped => 0.0,
        };
        self.state = PlaybackState::Playing {
            started_at: now - offset,
        };
        Some(offset)
    }

    /// Returns true when a running source should be halted.
    pub fn pause(&mut self, now: f64) -> bool {
        match self.state {
            PlaybackState::Playing { started_at } => {
                self.state = PlaybackState::Paused {
                    offset: (now - started_at).max(0.0),
                };
                true
            }
            _ => false,
        }
    }

    pub fn stop(&mut self) {
        self.state = PlaybackState::Stopped;
    }

    /// Elapsed fraction in `[0, 1]`, or 0 when stopped.
    pub fn progress(&self, now: f64) -> f64 {
        let Some(duration) = self.duration else {
            return 0.0;
        };
        let elapsed = match self.state {
            PlaybackState::Playing { started_at } => now - started_at,
            PlaybackState::Paused { offset } => offset,
            PlaybackState::Stopped => 0.0,
        };
        (elapsed / duration).clamp(0.0, 1.0)
    }

    /// Advance the transport, stopping it when the end of the buffer is reached.
    pub fn tick(&mut self, now: f64) -> PlaybackTick {
        let Some(duration) = self.duration else {
            return PlaybackTick::Idle;
        };
        match self.state {
            PlaybackState::Playing { started_at } => {
                let elapsed = now - started_at;
                if elapsed >= duration {
                    self.stop();
                    PlaybackTick::Ended
                } else {
                    PlaybackTick::Progress((elapsed / duration).max(0.0))
                }
            }
            PlaybackState::Paused { offset } if offset > 0.0 => {
                PlaybackTick::Progress(offset / duration)
            }
            _ => PlaybackTick::Idle,
        }
    }
}
