//! Platform abstraction layer
//!
//! Browser/native differences for:
//! - Wall-clock time
//! - The periodic host timer that feeds a running session
//! - LocalStorage-backed JSON persistence
//!
//! Native hosts have no timer here; they call `update(dt)` from their own loop.

/// Milliseconds since the Unix epoch
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> f64 {
    js_sys::Date::now()
}

/// Milliseconds since the Unix epoch
#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}

/// Seed derived from the wall clock, for hosts that want to log it
pub fn clock_seed() -> u64 {
    now_ms() as u64
}

pub mod storage;

#[cfg(target_arch = "wasm32")]
pub use interval::Interval;

#[cfg(target_arch = "wasm32")]
mod interval {
    use std::cell::Cell;
    use std::ops::ControlFlow;
    use std::rc::Rc;

    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;

    fn clear(handle: &Cell<Option<i32>>) {
        if let (Some(id), Some(window)) = (handle.take(), web_sys::window()) {
            window.clear_interval_with_handle(id);
            log::debug!("Interval #{} cleared", id);
        }
    }

    /// Owned `setInterval` registration
    ///
    /// Cleared when dropped, or from inside the callback as soon as it
    /// returns `ControlFlow::Break`.
    pub struct Interval {
        handle: Rc<Cell<Option<i32>>>,
        _callback: Closure<dyn FnMut()>,
    }

    impl Interval {
        /// Call `callback` every `period_ms` until it breaks or this guard is dropped
        pub fn new(
            period_ms: i32,
            mut callback: impl FnMut() -> ControlFlow<()> + 'static,
        ) -> Option<Self> {
            let window = web_sys::window()?;
            let handle = Rc::new(Cell::new(None));
            let slot = handle.clone();
            let callback = Closure::<dyn FnMut()>::new(move || {
                if callback().is_break() {
                    clear(&slot);
                }
            });
            let id = window
                .set_interval_with_callback_and_timeout_and_arguments_0(
                    callback.as_ref().unchecked_ref(),
                    period_ms,
                )
                .ok()?;
            handle.set(Some(id));
            log::debug!("Interval #{} started ({} ms)", id, period_ms);
            Some(Self {
                handle,
                _callback: callback,
            })
        }

        /// Whether the browser still fires this interval
        pub fn is_active(&self) -> bool {
            self.handle.get().is_some()
        }
    }

    impl Drop for Interval {
        fn drop(&mut self) {
            clear(&self.handle);
        }
    }
}
