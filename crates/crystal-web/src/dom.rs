use crate::constants::{FPS_COUNTER_ID, FPS_EVENT};
use wasm_bindgen::{JsCast, JsValue};
use web_sys as web;

#[inline]
pub fn window_document() -> Option<web::Document> {
    web::window().and_then(|w| w.document())
}

#[inline]
pub fn js_err(e: JsValue) -> anyhow::Error {
    anyhow::anyhow!(format!("{:?}", e))
}

pub fn canvas_by_id(id: &str) -> anyhow::Result<web::HtmlCanvasElement> {
    let document = window_document().ok_or_else(|| anyhow::anyhow!("no document"))?;
    document
        .get_element_by_id(id)
        .ok_or_else(|| anyhow::anyhow!("missing #{id}"))?
        .dyn_into::<web::HtmlCanvasElement>()
        .map_err(|e| anyhow::anyhow!(format!("#{id} is not a canvas: {:?}", e)))
}

pub fn sync_canvas_backing_size(canvas: &web::HtmlCanvasElement) {
    if let Some(w) = web::window() {
        let dpr = w.device_pixel_ratio();
        let rect = canvas.get_bounding_client_rect();
        let w_px = (rect.width() * dpr) as u32;
        let h_px = (rect.height() * dpr) as u32;
        canvas.set_width(w_px.max(1));
        canvas.set_height(h_px.max(1));
    }
}

/// Write the rate into `#fps-counter` if present and broadcast it.
pub fn report_fps(fps: f32) {
    let Some(document) = window_document() else {
        return;
    };
    if let Some(el) = document.get_element_by_id(FPS_COUNTER_ID) {
        el.set_text_content(Some(&format!("{fps:.0} FPS")));
    }
    let init = web::CustomEventInit::new();
    init.set_detail(&JsValue::from_f64(fps as f64));
    if let Ok(ev) = web::CustomEvent::new_with_event_init_dict(FPS_EVENT, &init) {
        if let Some(w) = web::window() {
            let _ = w.dispatch_event(&ev);
        }
    }
}
