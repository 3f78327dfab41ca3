//! Per-viewer state and the per-frame data flow.
//!
//! Audio level and play position feed the spine; the spine is stepped and
//! mirrored into the uniforms; camera motion is applied. Platform frontends
//! call `frame` once per display refresh and then draw.

use crate::camera::OrbitCamera;
use crate::deform::DeformConfig;
use crate::envelope::EnvelopeConfig;
use crate::error::LoadError;
use crate::extractor::AudioLevelExtractor;
use crate::geometry::{GeometryStats, SourceGeometry};
use crate::loader::{LoadGuard, LoadTicket};
use crate::motion::MotionSettings;
use crate::packing::{CrystalUniforms, FrameUniforms};
use crate::palette::DEFAULT_PALETTE;
use crate::spine::{SpineConfig, SpineSimulator};
use crate::uniforms::UniformAnimator;

#[derive(Clone, Debug, Default)]
pub struct ViewerConfig {
    pub spine: SpineConfig,
    pub envelope: EnvelopeConfig,
    pub deform: DeformConfig,
}

#[derive(Clone, Copy, Debug)]
pub struct FrameInput<'a> {
    /// Wall-clock seconds since the previous frame.
    pub dt: f64,
    /// Seconds since the viewer started; drives noise and pulses.
    pub elapsed: f64,
    /// Current audio clock reading.
    pub audio_now: f64,
    /// Latest analyser time-domain snapshot, if an analyser exists.
    pub window: Option<&'a [u8]>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameOutput {
    pub level: f32,
    pub play_x: f32,
    pub point_size: f32,
    pub substeps: u32,
    /// Playback ran off the end this frame; the frontend should halt its source.
    pub ended: bool,
}

/// What `finish_load` did with a result.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    Swapped(GeometryStats),
    Stale,
}

pub struct Viewer {
    pub spine: SpineSimulator,
    pub audio: AudioLevelExtractor,
    pub uniforms: UniformAnimator,
    pub motion: MotionSettings,
    pub camera: OrbitCamera,
    pub deform: DeformConfig,
    geometry: Option<SourceGeometry>,
    loads: LoadGuard,
    time: f32,
}

impl Viewer {
    pub fn new(config: ViewerConfig, seed: u64) -> Self {
        let mut uniforms = UniformAnimator::new();
        uniforms.set_palette(DEFAULT_PALETTE);
        let spine = SpineSimulator::new(config.spine, seed);
        uniforms.mirror_spine(&spine.export_positions());
        let mut motion = MotionSettings::default();
        motion.pan.reset();
        Self {
            spine,
            audio: AudioLevelExtractor::new(config.envelope),
            uniforms,
            motion,
            camera: OrbitCamera::default(),
            deform: config.deform,
            geometry: None,
            loads: LoadGuard::default(),
            time: 0.0,
        }
    }

    pub fn geometry(&self) -> Option<&SourceGeometry> {
        self.geometry.as_ref()
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    /// Start a new load. Playback stops now; the old geometry stays on screen
    /// until `finish_load` swaps in a successful result.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.audio.stop();
        self.loads.begin()
    }

    /// False once a newer load has begun.
    pub fn is_current_load(&self, ticket: LoadTicket) -> bool {
        self.loads.is_current(ticket)
    }

    /// Publish a load result between frames.
    ///
    /// Stale tickets are dropped whatever the result. Errors on a current
    /// ticket are returned and leave the previous geometry in place.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<SourceGeometry, LoadError>,
    ) -> Result<LoadOutcome, LoadError> {
        if !self.loads.is_current(ticket) {
            log::info!("[load] discarding stale load #{}", ticket.generation());
            return Ok(LoadOutcome::Stale);
        }
        let geometry = result?;
        match &geometry {
            SourceGeometry::Audio { duration_sec, .. } => self.audio.load(*duration_sec),
            SourceGeometry::File(_) => self.audio.unload(),
        }
        let stats = geometry.stats();
        self.geometry = Some(geometry);
        self.fit_camera();
        log::info!(
            "[load] #{} ready: {} nodes, {} links",
            ticket.generation(),
            stats.nodes,
            stats.links
        );
        Ok(LoadOutcome::Swapped(stats))
    }

    /// Re-frame the loaded geometry and restart the pan sweep from its middle.
    pub fn fit_camera(&mut self) {
        let Some(bounds) = self.geometry.as_ref().map(|g| *g.bounds()) else {
            return;
        };
        self.camera.fit_to_bounds(&bounds);
        self.motion.pan.set_model(bounds.height(), bounds.min.y);
        let mid = self.motion.pan.mid_height();
        self.camera.pan_vertical(mid - bounds.center().y);
        self.motion.pan.reset();
    }

    pub fn set_manual_height(&mut self, slider: f32) {
        let dy = self.motion.pan.manual_height(slider);
        self.camera.pan_vertical(dy);
    }

    /// Run one frame of simulation and animation.
    pub fn frame(&mut self, input: FrameInput<'_>) -> FrameOutput {
        self.uniforms.tick();

        let bounds = self.geometry.as_ref().map(|g| *g.bounds());
        let audio = self.audio.update(input.audio_now, input.window, bounds.as_ref());
        if self.audio.envelope.is_audible() {
            self.spine.apply_force(audio.level, audio.play_x);
        }
        let substeps = self.spine.step(input.dt);
        self.uniforms.mirror_spine(&self.spine.export_positions());

        self.time = input.elapsed as f32;
        let dy = self.motion.pan.step();
        self.camera.pan_vertical(dy);
        let yaw = self.motion.rotate.angle_per_frame();
        if yaw != 0.0 {
            self.camera.orbit(yaw, 0.0);
        }

        FrameOutput {
            level: audio.level,
            play_x: audio.play_x,
            point_size: self.motion.point_size.size(input.elapsed),
            substeps,
            ended: audio.ended,
        }
    }

    /// Pack everything the shaders need for the frame just computed.
    pub fn uniforms_for(&self, out: &FrameOutput) -> CrystalUniforms {
        CrystalUniforms::pack(
            &self.uniforms,
            &FrameUniforms {
                view: self.camera.view_matrix(),
                proj: self.camera.projection_matrix(),
                time: self.time,
                audio_level: out.level,
                play_x: out.play_x,
                point_size: out.point_size,
                spine_length: self.spine.config.length,
                deform: self.deform,
            },
        )
    }
}
