use crate::audio::AudioOutput;
use crate::dom;
use crate::render;
use crystal_core::{
    line_vertices, node_instances, synthesize, DecodedAudio, FrameInput, GeometryStats,
    LoadOutcome, LoadTicket, PerformanceMonitor, SourceGeometry, SynthConfig, Viewer,
};
use instant::Instant;
use rand::rngs::StdRng;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys as web;

pub struct FrameContext<'a> {
    pub viewer: Viewer,
    pub audio: AudioOutput,
    pub canvas: web::HtmlCanvasElement,
    pub gpu: Option<render::GpuState<'a>>,
    pub perf: PerformanceMonitor,
    pub rng: StdRng,
    pub on_point_size: Option<js_sys::Function>,

    pub started: Instant,
    pub last_instant: Instant,
    pub window_buf: Vec<u8>,
}

/// What a frame hands back to JS once the context borrow is released.
pub struct FrameReport {
    point_size: f32,
    fps: Option<f32>,
    on_point_size: Option<js_sys::Function>,
}

impl FrameReport {
    /// Run the point-size callback and publish the frame rate. Listeners may
    /// call back into the viewer, so this runs with no borrow held.
    pub fn publish(self) {
        if let Some(cb) = &self.on_point_size {
            let _ = cb.call1(&JsValue::NULL, &JsValue::from_f64(self.point_size as f64));
        }
        if let Some(fps) = self.fps {
            dom::report_fps(fps);
        }
    }
}

impl<'a> FrameContext<'a> {
    pub fn frame(&mut self) -> FrameReport {
        let now = Instant::now();
        let dt = (now - self.last_instant).as_secs_f64();
        self.last_instant = now;
        let elapsed = (now - self.started).as_secs_f64();

        self.audio.sample_window(&mut self.window_buf);
        let out = self.viewer.frame(FrameInput {
            dt,
            elapsed,
            audio_now: self.audio.now(),
            window: Some(self.window_buf.as_slice()),
        });
        if out.ended {
            self.audio.halt();
        }

        let report = FrameReport {
            point_size: out.point_size,
            fps: self.perf.record(elapsed * 1000.0),
            on_point_size: self.on_point_size.clone(),
        };

        if let Some(g) = &mut self.gpu {
            g.resize_if_needed(self.canvas.width(), self.canvas.height());
            self.viewer.camera.aspect = g.aspect();
            let uniforms = self.viewer.uniforms_for(&out);
            match g.render(&uniforms) {
                Ok(()) => {}
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => g.reconfigure(),
                Err(e) => log::error!("render error: {:?}", e),
            }
        }
        report
    }

    /// Stop playback and take a ticket for a new load.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.audio.halt();
        self.viewer.begin_load()
    }

    pub fn finish_file_load(
        &mut self,
        ticket: LoadTicket,
        geometry: Result<SourceGeometry, crystal_core::LoadError>,
    ) -> anyhow::Result<Option<GeometryStats>> {
        match self.viewer.finish_load(ticket, geometry)? {
            LoadOutcome::Swapped(stats) => {
                self.audio.set_buffer(None);
                self.upload_geometry();
                Ok(Some(stats))
            }
            LoadOutcome::Stale => Ok(None),
        }
    }

    pub fn finish_audio_load(
        &mut self,
        ticket: LoadTicket,
        decoded: anyhow::Result<(web::AudioBuffer, DecodedAudio)>,
    ) -> anyhow::Result<Option<GeometryStats>> {
        if !self.viewer.is_current_load(ticket) {
            log::info!("[load] discarding stale audio #{}", ticket.generation());
            return Ok(None);
        }
        let (buffer, pcm) = decoded?;
        let geometry =
            synthesize(&pcm, &SynthConfig::default(), &mut self.rng).map(|buffers| {
                SourceGeometry::Audio {
                    buffers,
                    duration_sec: pcm.duration_sec,
                }
            });
        match self.viewer.finish_load(ticket, geometry)? {
            LoadOutcome::Swapped(stats) => {
                self.audio.set_buffer(Some(buffer));
                self.upload_geometry();
                Ok(Some(stats))
            }
            LoadOutcome::Stale => Ok(None),
        }
    }

    fn upload_geometry(&mut self) {
        let (Some(g), Some(geometry)) = (&mut self.gpu, self.viewer.geometry()) else {
            return;
        };
        let buffers = geometry.buffers();
        let nodes = node_instances(buffers);
        let lines = line_vertices(buffers, &mut self.rng);
        g.upload_geometry(&nodes, &lines);
    }

    /// Play from the paused offset, or pause if running.
    pub fn toggle_playback(&mut self) {
        let now = self.audio.now();
        if self.viewer.audio.clock.pause(now) {
            self.audio.halt();
            return;
        }
        if let Some(offset) = self.viewer.audio.clock.play(now) {
            if let Err(e) = self.audio.start(offset) {
                log::error!("[audio] start failed: {:?}", e);
                self.viewer.audio.stop();
            }
        }
    }

    pub fn stop_playback(&mut self) {
        self.audio.halt();
        self.viewer.audio.stop();
    }
}

pub async fn init_gpu(canvas: &web::HtmlCanvasElement) -> Option<render::GpuState<'static>> {
    // leak a canvas clone to satisfy 'static lifetime for surface
    let leaked_canvas = Box::leak(Box::new(canvas.clone()));
    match render::GpuState::new(leaked_canvas).await {
        Ok(g) => Some(g),
        Err(e) => {
            log::error!("WebGPU init error: {:?}", e);
            None
        }
    }
}

pub fn start_loop(frame_ctx: Rc<RefCell<FrameContext<'static>>>) {
    let tick: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let tick_clone = tick.clone();
    *tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        let report = frame_ctx.borrow_mut().frame();
        report.publish();
        request_frame(&tick_clone);
    }) as Box<dyn FnMut()>));
    request_frame(&tick);
}

fn request_frame(tick: &Rc<RefCell<Option<Closure<dyn FnMut()>>>>) {
    if let (Some(w), Some(cb)) = (web::window(), tick.borrow().as_ref()) {
        let _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
    }
}
