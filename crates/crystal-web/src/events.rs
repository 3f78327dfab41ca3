use crate::constants::{ORBIT_RADIANS_PER_PX, WHEEL_DOLLY_RATE};
use crate::frame::FrameContext;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

#[derive(Default, Clone, Copy)]
struct DragState {
    active: bool,
    x: f32,
    y: f32,
}

fn listen<E: JsCast + 'static>(
    target: &web::EventTarget,
    kind: &str,
    mut handler: impl FnMut(E) + 'static,
) {
    let closure = Closure::wrap(Box::new(move |ev: web::Event| {
        if let Ok(ev) = ev.dyn_into::<E>() {
            handler(ev);
        }
    }) as Box<dyn FnMut(web::Event)>);
    let _ = target.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref());
    closure.forget();
}

/// Pointer drag orbits the camera, the wheel dollies it.
pub fn wire_canvas(canvas: &web::HtmlCanvasElement, ctx: &Rc<RefCell<FrameContext<'static>>>) {
    let drag = Rc::new(RefCell::new(DragState::default()));
    let target: &web::EventTarget = canvas.as_ref();

    {
        let drag = drag.clone();
        listen(target, "pointerdown", move |ev: web::PointerEvent| {
            *drag.borrow_mut() = DragState {
                active: true,
                x: ev.client_x() as f32,
                y: ev.client_y() as f32,
            };
        });
    }
    {
        let drag = drag.clone();
        let ctx = ctx.clone();
        listen(target, "pointermove", move |ev: web::PointerEvent| {
            let mut d = drag.borrow_mut();
            if !d.active {
                return;
            }
            let (x, y) = (ev.client_x() as f32, ev.client_y() as f32);
            let (dx, dy) = (x - d.x, y - d.y);
            d.x = x;
            d.y = y;
            ctx.borrow_mut()
                .viewer
                .camera
                .orbit(-dx * ORBIT_RADIANS_PER_PX, dy * ORBIT_RADIANS_PER_PX);
        });
    }
    for kind in ["pointerup", "pointercancel", "pointerleave"] {
        let drag = drag.clone();
        listen(target, kind, move |_: web::PointerEvent| {
            drag.borrow_mut().active = false;
        });
    }
    {
        let ctx = ctx.clone();
        listen(target, "wheel", move |ev: web::WheelEvent| {
            ev.prevent_default();
            let factor = (ev.delta_y() as f32 * WHEEL_DOLLY_RATE).exp();
            ctx.borrow_mut().viewer.camera.dolly(factor);
        });
    }
}

/// Space toggles playback.
pub fn wire_keys(ctx: &Rc<RefCell<FrameContext<'static>>>) {
    let Some(window) = web::window() else {
        return;
    };
    let ctx = ctx.clone();
    listen(window.as_ref(), "keydown", move |ev: web::KeyboardEvent| {
        if ev.code() == "Space" {
            ev.prevent_default();
            ctx.borrow_mut().toggle_playback();
        }
    });
}

/// Keep the canvas backing store in step with its CSS size.
pub fn wire_resize(canvas: &web::HtmlCanvasElement) {
    let Some(window) = web::window() else {
        return;
    };
    let canvas = canvas.clone();
    listen(window.as_ref(), "resize", move |_: web::Event| {
        crate::dom::sync_canvas_backing_size(&canvas);
    });
}
