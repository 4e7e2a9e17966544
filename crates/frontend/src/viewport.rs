use std::cell::RefCell;
use std::rc::Rc;

use dioxus::prelude::*;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;

/// Width assumed before the window can be measured.
const DEFAULT_WIDTH_PX: f64 = 1024.0;

fn window_width() -> Option<f64> {
    web_sys::window()?.inner_width().ok()?.as_f64()
}

/// Undoes a registration exactly once, either on `run` or when dropped.
struct Detach(RefCell<Option<Box<dyn FnOnce()>>>);

impl Detach {
    fn new(action: impl FnOnce() + 'static) -> Self {
        Detach(RefCell::new(Some(Box::new(action))))
    }

    fn run(&self) {
        let action = self.0.borrow_mut().take();
        if let Some(action) = action {
            action();
        }
    }
}

impl Drop for Detach {
    fn drop(&mut self) {
        self.run();
    }
}

fn listen_for_resize(mut width: Signal<f64>) -> Option<Detach> {
    let window = web_sys::window()?;
    let on_resize = Closure::<dyn FnMut()>::new(move || {
        if let Some(w) = window_width() {
            // The signal is gone once the owning component unmounts.
            if let Ok(mut current) = width.try_write() {
                *current = w;
            }
        }
    });
    window
        .add_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref())
        .ok()?;
    Some(Detach::new(move || {
        let _ = window
            .remove_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref());
    }))
}

/// Current `window.innerWidth`, kept up to date by a resize listener that is
/// removed when the calling component unmounts.
pub fn use_viewport_width() -> Signal<f64> {
    let width = use_signal(|| window_width().unwrap_or(DEFAULT_WIDTH_PX));
    let listener = use_hook(move || listen_for_resize(width).map(Rc::new));

    use_drop(move || {
        if let Some(listener) = listener {
            listener.run();
        }
    });

    width
}
