#![cfg(target_arch = "wasm32")]

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use strm_core::{ClientError, Scheduler, Task, TimerId};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::Window;

type Pending = RefCell<HashMap<i32, Closure<dyn FnMut()>>>;

/// `setTimeout`/`clearTimeout` của window. Closure của mỗi timeout sống trong `pending`
/// tới khi nó chạy hoặc bị hủy.
pub struct BrowserScheduler {
    window: Window,
    pending: Rc<Pending>,
}

impl BrowserScheduler {
    pub fn new(window: Window) -> Self {
        Self {
            window,
            pending: Rc::new(RefCell::new(HashMap::new())),
        }
    }
}

impl Scheduler for BrowserScheduler {
    fn schedule(&self, delay: Duration, task: Task) -> Result<TimerId, ClientError> {
        let handle = Rc::new(Cell::new(None::<i32>));
        let pending = Rc::downgrade(&self.pending);
        let fired = Rc::clone(&handle);
        let mut task = Some(task);
        let callback = Closure::<dyn FnMut()>::new(move || {
            // wasm-bindgen hoãn giải phóng closure tới khi lời gọi này kết thúc.
            let own = fired
                .get()
                .and_then(|id| pending.upgrade().and_then(|map| map.borrow_mut().remove(&id)));
            if let Some(task) = task.take() {
                task();
            }
            drop(own);
        });

        let millis = i32::try_from(delay.as_millis()).unwrap_or(i32::MAX);
        let id = self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                callback.as_ref().unchecked_ref(),
                millis,
            )
            .map_err(|err| ClientError::Scheduler(format!("{err:?}")))?;
        handle.set(Some(id));
        self.pending.borrow_mut().insert(id, callback);
        Ok(TimerId(u64::from(id.unsigned_abs())))
    }

    fn cancel(&self, id: TimerId) {
        match i32::try_from(id.0) {
            Ok(handle) => {
                self.window.clear_timeout_with_handle(handle);
                self.pending.borrow_mut().remove(&handle);
            }
            Err(_) => log::warn!("Timer id {} không hợp lệ", id.0),
        }
    }
}
