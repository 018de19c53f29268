#![cfg(target_arch = "wasm32")]

use std::cell::RefCell;
use std::rc::Rc;

use serde::Serialize;
use serde_json::Value;
use strm_core::page::{self, COPY_SUCCESS_MESSAGE};
use strm_core::{
    fade_then, ClientConfig, ClientError, EventRouter, Navigator, Notification, NotificationSink,
    Scheduler, StatusHandler, StreamClient, ToastId, Toaster,
};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Clipboard, Document, Window};

use crate::behaviors;
use crate::dom::{self, describe_js, js_error, DomToastSurface, WindowNavigator};
use crate::instance::{InstanceSlot, Obtained};
use crate::styles;
use crate::timers::BrowserScheduler;
use crate::transport::EventSourceTransport;

/// Hàm toàn cục trang có thể định nghĩa để nhận `status_update`.
const GLOBAL_STATUS_HOOK: &str = "updateJobStatus";

thread_local! {
    static APP: InstanceSlot<App> = const { InstanceSlot::new() };
}

/// Chuyển `status_update` sang JavaScript: callback đăng ký qua `setStatusHandler`, nếu không
/// có thì `window.updateJobStatus`.
pub struct JsStatusHandler {
    window: Window,
    custom: RefCell<Option<js_sys::Function>>,
}

impl JsStatusHandler {
    fn new(window: Window) -> Self {
        Self {
            window,
            custom: RefCell::new(None),
        }
    }

    fn set(&self, callback: Option<js_sys::Function>) {
        *self.custom.borrow_mut() = callback;
    }

    fn callback(&self) -> Option<js_sys::Function> {
        if let Some(custom) = self.custom.borrow().clone() {
            return Some(custom);
        }
        js_sys::Reflect::get(&self.window, &JsValue::from_str(GLOBAL_STATUS_HOOK))
            .ok()
            .and_then(|value| value.dyn_into::<js_sys::Function>().ok())
    }
}

impl StatusHandler for JsStatusHandler {
    fn update(&self, payload: &Value) {
        let Some(callback) = self.callback() else {
            log::debug!("Bỏ qua status_update: trang không có handler");
            return;
        };
        let serializer = serde_wasm_bindgen::Serializer::json_compatible();
        let argument = match payload.serialize(&serializer) {
            Ok(value) => value,
            Err(err) => {
                log::warn!("Không chuyển được status_update sang JS: {err}");
                return;
            }
        };
        if let Err(err) = callback.call1(&JsValue::NULL, &argument) {
            log::error!("Handler status_update lỗi: {}", describe_js(&err));
        }
    }
}

struct Inner {
    window: Window,
    document: Document,
    config: ClientConfig,
    scheduler: Rc<dyn Scheduler>,
    toaster: Toaster<DomToastSurface>,
    stream: StreamClient<EventSourceTransport>,
    navigator: Rc<WindowNavigator>,
    status: Rc<JsStatusHandler>,
}

/// Trạng thái của trang sau `init`. Clone chỉ tăng bộ đếm tham chiếu.
#[derive(Clone)]
pub struct App {
    inner: Rc<Inner>,
}

impl App {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let window =
            web_sys::window().ok_or_else(|| ClientError::Dom("Không có window".to_string()))?;
        let document = window
            .document()
            .ok_or_else(|| ClientError::Dom("Không có document".to_string()))?;

        let scheduler: Rc<dyn Scheduler> = Rc::new(BrowserScheduler::new(window.clone()));
        let toaster = Toaster::new(
            DomToastSurface::new(document.clone()),
            Rc::clone(&scheduler),
            config.toast_timing(),
        );
        let status = Rc::new(JsStatusHandler::new(window.clone()));
        let router = EventRouter::standard(
            Rc::new(toaster.clone()) as Rc<dyn NotificationSink>,
            Some(Rc::clone(&status) as Rc<dyn StatusHandler>),
        );
        let stream = StreamClient::new(
            EventSourceTransport,
            Rc::clone(&scheduler),
            router,
            &config,
        );

        Ok(Self {
            inner: Rc::new(Inner {
                navigator: Rc::new(WindowNavigator::new(window.clone())),
                window,
                document,
                config,
                scheduler,
                toaster,
                stream,
                status,
            }),
        })
    }

    /// Dựng instance của trang ở lần gọi đầu. Các lần sau giữ nguyên toast, listener và
    /// cấu hình đã có.
    pub fn obtain(config: ClientConfig) -> Result<Obtained<App>, ClientError> {
        APP.with(|slot| slot.get_or_try_init(|| App::new(config)))
    }

    pub fn current() -> Result<App, ClientError> {
        APP.with(InstanceSlot::get)
            .ok_or_else(|| ClientError::Dom("Chưa gọi init()".to_string()))
    }

    /// Gắn hành vi trang và mở SSE khi DOM sẵn sàng.
    pub fn start(&self) -> Result<(), ClientError> {
        styles::ensure_styles(&self.inner.document).map_err(js_error)?;
        if self.inner.document.ready_state() != "loading" {
            return self.boot();
        }

        let app = self.clone();
        let on_ready = Closure::once_into_js(move || {
            if let Err(err) = app.boot() {
                log::error!("Khởi động trang thất bại: {err}");
            }
        });
        self.inner
            .document
            .add_event_listener_with_callback("DOMContentLoaded", on_ready.unchecked_ref())
            .map_err(js_error)
    }

    fn boot(&self) -> Result<(), ClientError> {
        let navigator: Rc<dyn Navigator> = self.inner.navigator.clone();
        behaviors::install(
            &self.inner.document,
            &self.inner.scheduler,
            navigator,
            &self.inner.config,
        )?;
        // Lỗi mở đã được hẹn kết nối lại bên trong client.
        if let Err(err) = self.inner.stream.connect() {
            log::warn!("Kết nối SSE đầu tiên thất bại: {err}");
        }
        Ok(())
    }

    pub fn connect(&self) -> Result<(), ClientError> {
        self.inner.stream.connect()
    }

    pub fn disconnect(&self) {
        self.inner.stream.disconnect();
    }

    pub fn show(&self, notification: &Notification) -> Result<ToastId, ClientError> {
        self.inner.toaster.show(notification)
    }

    pub fn close(&self, id: ToastId) -> bool {
        self.inner.toaster.close(id)
    }

    pub fn confirm_delete(&self, url: &str, message: Option<&str>) -> bool {
        page::confirm_delete(self.inner.navigator.as_ref(), url, message)
    }

    pub fn set_status_handler(&self, callback: Option<js_sys::Function>) {
        self.inner.status.set(callback);
    }

    /// Ghi `text` vào clipboard; banner xác nhận khi thành công, toast lỗi khi thất bại.
    pub fn copy_to_clipboard(&self, text: String) {
        let app = self.clone();
        wasm_bindgen_futures::spawn_local(async move {
            match app.write_clipboard(&text).await {
                Ok(()) => {
                    if let Err(err) = app.show_copy_feedback() {
                        log::error!("Không hiện được banner copy: {err}");
                    }
                }
                Err(reason) => {
                    log::warn!("Copy thất bại: {reason}");
                    if let Err(err) = app.show(&page::copy_failure_notification(&reason)) {
                        log::error!("Không hiện được toast lỗi copy: {err}");
                    }
                }
            }
        });
    }

    async fn write_clipboard(&self, text: &str) -> Result<(), String> {
        let navigator = self.inner.window.navigator();
        let clipboard = js_sys::Reflect::get(&navigator, &JsValue::from_str("clipboard"))
            .ok()
            .filter(|value| !value.is_undefined() && !value.is_null())
            .and_then(|value| value.dyn_into::<Clipboard>().ok())
            .ok_or_else(|| "Clipboard API unavailable".to_string())?;
        JsFuture::from(clipboard.write_text(text))
            .await
            .map(|_| ())
            .map_err(|err| describe_js(&err))
    }

    fn show_copy_feedback(&self) -> Result<(), ClientError> {
        let document = &self.inner.document;
        let body = document
            .body()
            .ok_or_else(|| ClientError::Dom("Document không có <body>".to_string()))?;
        let banner = dom::create(document, "div", "copy-feedback")?;
        banner.set_text_content(Some(COPY_SUCCESS_MESSAGE));
        body.append_child(&banner).map_err(js_error)?;

        let (visible, fade) = self.inner.config.copy_feedback_timing();
        let fading = banner.clone();
        let transition = format!("opacity {}ms", fade.as_millis());
        fade_then(
            &self.inner.scheduler,
            visible,
            fade,
            move || {
                dom::set_style(&fading, "transition", &transition);
                dom::set_style(&fading, "opacity", "0");
            },
            move || banner.remove(),
        )?;
        Ok(())
    }
}
