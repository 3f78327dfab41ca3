// Browser-side checks, run with `wasm-pack test --headless --chrome crates/crystal-web`.
#![cfg(target_arch = "wasm32")]

use crystal_web::{create_viewer, CrystalViewer};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

async fn viewer_on_fresh_canvas(id: &str) -> Rc<CrystalViewer> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .expect("document");
    let canvas = document.create_element("canvas").expect("canvas");
    canvas.set_id(id);
    document
        .body()
        .expect("body")
        .append_child(&canvas)
        .expect("append canvas");
    Rc::new(create_viewer(id.to_string()).await.expect("viewer"))
}

#[wasm_bindgen_test]
async fn frame_callbacks_can_use_the_viewer() {
    let viewer = viewer_on_fresh_canvas("reentry-canvas").await;

    let sizes_seen = Rc::new(Cell::new(0u32));
    let on_size = {
        let viewer = viewer.clone();
        let sizes_seen = sizes_seen.clone();
        Closure::wrap(Box::new(move |size: JsValue| {
            assert!(size.as_f64().is_some_and(|s| s > 0.0));
            // Both a shared and a mutable borrow of the viewer state.
            let _ = viewer.is_playing();
            viewer.set_base_size(0.25);
            sizes_seen.set(sizes_seen.get() + 1);
        }) as Box<dyn FnMut(JsValue)>)
    };
    viewer.on_point_size(Some(on_size.as_ref().unchecked_ref::<js_sys::Function>().clone()));

    // Resolves on the first fps-update, after reading the viewer from the listener.
    let resolve_slot: Rc<RefCell<Option<js_sys::Function>>> = Rc::new(RefCell::new(None));
    let done = {
        let slot = resolve_slot.clone();
        js_sys::Promise::new(&mut move |resolve, _reject| {
            *slot.borrow_mut() = Some(resolve);
        })
    };
    let on_fps = {
        let viewer = viewer.clone();
        let slot = resolve_slot.clone();
        Closure::wrap(Box::new(move |_ev: web_sys::Event| {
            let fps = viewer.fps();
            viewer.set_lfo_speed(2.0);
            if let Some(resolve) = slot.borrow_mut().take() {
                let _ = resolve.call1(&JsValue::NULL, &JsValue::from_f64(fps as f64));
            }
        }) as Box<dyn FnMut(web_sys::Event)>)
    };
    let window = web_sys::window().expect("window");
    window
        .add_event_listener_with_callback("fps-update", on_fps.as_ref().unchecked_ref())
        .expect("listen");

    let fps = JsFuture::from(done).await.expect("fps-update");
    assert!(fps.as_f64().is_some_and(|f| f >= 0.0));
    assert!(sizes_seen.get() > 0, "point-size callback never ran");

    let _ = window.remove_event_listener_with_callback("fps-update", on_fps.as_ref().unchecked_ref());
    viewer.on_point_size(None);
}
