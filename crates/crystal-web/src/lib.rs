#![cfg(target_arch = "wasm32")]
mod audio;
mod constants;
mod dom;
mod events;
mod fetch;
mod frame;
mod render;

use crate::frame::FrameContext;
use crate::render::BlendMode;
use crystal_core::{parse_ply, GeometryStats, PerformanceMonitor, SourceGeometry, Viewer, ViewerConfig};
use instant::Instant;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("crystal-web starting");
    Ok(())
}

fn to_js(e: anyhow::Error) -> JsValue {
    JsValue::from_str(&format!("{e:#}"))
}

fn stats_to_js(stats: Option<GeometryStats>) -> JsValue {
    let Some(stats) = stats else {
        return JsValue::NULL;
    };
    let obj = js_sys::Object::new();
    let set = |k: &str, v: f64| {
        let _ = js_sys::Reflect::set(&obj, &JsValue::from_str(k), &JsValue::from_f64(v));
    };
    set("nodes", stats.nodes as f64);
    set("links", stats.links as f64);
    set("layers", stats.layers as f64);
    obj.into()
}

/// Build the renderer on `canvas_id` and start drawing.
#[wasm_bindgen]
pub async fn create_viewer(canvas_id: String) -> Result<CrystalViewer, JsValue> {
    let canvas = dom::canvas_by_id(&canvas_id).map_err(to_js)?;
    dom::sync_canvas_backing_size(&canvas);
    events::wire_resize(&canvas);

    let audio = audio::AudioOutput::new().map_err(to_js)?;
    let gpu = frame::init_gpu(&canvas).await;
    if gpu.is_none() {
        log::warn!("[init] running without WebGPU; nothing will be drawn");
    }

    let mut rng = StdRng::from_entropy();
    let seed: u64 = rng.gen();
    let now = Instant::now();
    let ctx = Rc::new(RefCell::new(FrameContext {
        viewer: Viewer::new(ViewerConfig::default(), seed),
        audio,
        canvas: canvas.clone(),
        gpu,
        perf: PerformanceMonitor::new(0.0),
        rng,
        on_point_size: None,
        started: now,
        last_instant: now,
        window_buf: Vec::new(),
    }));
    events::wire_canvas(&canvas, &ctx);
    events::wire_keys(&ctx);
    frame::start_loop(ctx.clone());
    log::info!("[init] viewer ready on #{canvas_id}");
    Ok(CrystalViewer { ctx })
}

/// JS handle for one viewer.
#[wasm_bindgen]
pub struct CrystalViewer {
    ctx: Rc<RefCell<FrameContext<'static>>>,
}

#[wasm_bindgen]
impl CrystalViewer {
    /// Fetch and show a PLY crystal. Resolves to `{nodes, links, layers}`, or
    /// `null` when a newer load superseded this one.
    pub fn load_crystal(&self, url: String) -> js_sys::Promise {
        let ctx = self.ctx.clone();
        future_to_promise(async move {
            let ticket = ctx.borrow_mut().begin_load();
            log::info!("[load] #{} fetching {url}", ticket.generation());
            let bytes = match fetch::fetch_bytes(&url).await {
                Ok(b) => b,
                Err(e) if !ctx.borrow().viewer.is_current_load(ticket) => {
                    log::info!("[load] ignoring failure of superseded load: {e:#}");
                    return Ok(JsValue::NULL);
                }
                Err(e) => return Err(to_js(e)),
            };
            let geometry = parse_ply(&bytes).map(SourceGeometry::File);
            let stats = ctx
                .borrow_mut()
                .finish_file_load(ticket, geometry)
                .map_err(to_js)?;
            Ok(stats_to_js(stats))
        })
    }

    /// Decode audio bytes, build ring geometry from them and attach the buffer
    /// for playback.
    pub fn load_audio(&self, bytes: Vec<u8>) -> js_sys::Promise {
        let ctx = self.ctx.clone();
        future_to_promise(async move {
            let (ticket, audio_ctx) = {
                let mut c = ctx.borrow_mut();
                (c.begin_load(), c.audio.context())
            };
            let decoded = audio::decode(&audio_ctx, &bytes).await;
            let stats = ctx
                .borrow_mut()
                .finish_audio_load(ticket, decoded)
                .map_err(to_js)?;
            Ok(stats_to_js(stats))
        })
    }

    pub fn toggle_audio(&self) {
        self.ctx.borrow_mut().toggle_playback();
    }

    pub fn stop_audio(&self) {
        self.ctx.borrow_mut().stop_playback();
    }

    /// Returns the new muted state.
    pub fn toggle_mute(&self) -> bool {
        self.ctx.borrow_mut().audio.toggle_mute()
    }

    pub fn is_playing(&self) -> bool {
        self.ctx.borrow().viewer.audio.clock.is_playing()
    }

    /// Playback position as a fraction in `[0, 1]`.
    pub fn audio_progress(&self) -> f64 {
        let c = self.ctx.borrow();
        c.viewer.audio.clock.progress(c.audio.now())
    }

    // Rendering controls

    pub fn set_line_dist(&self, slider: f32) {
        self.ctx.borrow_mut().viewer.uniforms.set_line_dist(slider);
    }

    pub fn set_node_dist(&self, slider: f32) {
        self.ctx.borrow_mut().viewer.uniforms.set_node_dist(slider);
    }

    pub fn set_thinning(&self, value: f32) {
        self.ctx.borrow_mut().viewer.uniforms.set_thinning(value);
    }

    pub fn set_line_density(&self, percent: f32) {
        self.ctx.borrow_mut().viewer.uniforms.set_line_density(percent);
    }

    pub fn set_node_density(&self, percent: f32) {
        self.ctx.borrow_mut().viewer.uniforms.set_node_density(percent);
    }

    pub fn set_xor_density(&self, slider: f32) {
        self.ctx.borrow_mut().viewer.uniforms.set_xor_density(slider);
    }

    pub fn set_color_influence(&self, value: f32) {
        self.ctx.borrow_mut().viewer.uniforms.set_color_influence(value);
    }

    pub fn set_line_opacity(&self, value: f32) {
        self.ctx.borrow_mut().viewer.uniforms.set_line_opacity(value);
    }

    pub fn set_node_opacity(&self, value: f32) {
        self.ctx.borrow_mut().viewer.uniforms.set_node_opacity(value);
    }

    pub fn set_invert_influence(&self, enabled: bool) {
        self.ctx.borrow_mut().viewer.uniforms.set_invert_influence(enabled);
    }

    pub fn set_node_saturation(&self, value: f32) {
        self.ctx.borrow_mut().viewer.uniforms.set_node_saturation(value);
    }

    pub fn set_pulse(&self, enabled: bool) {
        self.ctx.borrow_mut().viewer.uniforms.set_pulse(enabled);
    }

    pub fn set_palette(&self, name: &str) {
        self.ctx.borrow_mut().viewer.uniforms.set_palette(name);
    }

    /// `"additive"` or `"normal"`.
    pub fn set_node_blending(&self, mode: &str) {
        if let Some(g) = &mut self.ctx.borrow_mut().gpu {
            g.node_blend = BlendMode::parse(mode);
        }
    }

    pub fn set_line_blending(&self, mode: &str) {
        if let Some(g) = &mut self.ctx.borrow_mut().gpu {
            g.line_blend = BlendMode::parse(mode);
        }
    }

    // Motion controls

    pub fn set_auto_rotate(&self, enabled: bool) {
        self.ctx.borrow_mut().viewer.motion.rotate.enabled = enabled;
    }

    pub fn set_rot_speed(&self, speed: f32) {
        self.ctx.borrow_mut().viewer.motion.rotate.speed = speed;
    }

    /// Returns whether auto-pan is now on.
    pub fn toggle_auto_pan(&self) -> bool {
        self.ctx.borrow_mut().viewer.motion.pan.toggle()
    }

    pub fn set_pan_speed(&self, speed: f32) {
        self.ctx.borrow_mut().viewer.motion.pan.speed = speed;
    }

    pub fn set_pan_min(&self, slider: f32) {
        self.ctx.borrow_mut().viewer.motion.pan.min = slider;
    }

    pub fn set_pan_max(&self, slider: f32) {
        self.ctx.borrow_mut().viewer.motion.pan.max = slider;
    }

    pub fn set_manual_height(&self, slider: f32) {
        self.ctx.borrow_mut().viewer.set_manual_height(slider);
    }

    pub fn set_base_size(&self, size: f32) {
        self.ctx.borrow_mut().viewer.motion.point_size.base_size = size;
    }

    pub fn set_lfo_amount(&self, amount: f32) {
        self.ctx.borrow_mut().viewer.motion.point_size.amount = amount;
    }

    pub fn set_lfo_speed(&self, speed: f32) {
        self.ctx.borrow_mut().viewer.motion.point_size.speed = speed;
    }

    /// Called every frame with the current sprite size.
    pub fn on_point_size(&self, callback: Option<js_sys::Function>) {
        self.ctx.borrow_mut().on_point_size = callback;
    }

    /// Re-frame the current geometry.
    pub fn reset_view(&self) {
        self.ctx.borrow_mut().viewer.fit_camera();
    }

    pub fn fps(&self) -> f32 {
        self.ctx.borrow().perf.fps()
    }
}
