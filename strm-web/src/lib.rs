//! Bridge WASM <-> JavaScript cho các trang của M3U to STRM converter.
//!
//! Trang gọi `init(config?)` một lần; sau đó toast, SSE và các hành vi form chạy trong Rust.
//! Các hàm `showNotification`, `copyToClipboard`, `confirmDelete`... được export cho template.

mod config;
pub mod instance;

#[cfg(target_arch = "wasm32")]
mod app;
#[cfg(target_arch = "wasm32")]
mod behaviors;
#[cfg(target_arch = "wasm32")]
mod dom;
#[cfg(target_arch = "wasm32")]
mod logger;
#[cfg(target_arch = "wasm32")]
mod styles;
#[cfg(target_arch = "wasm32")]
mod timers;
#[cfg(target_arch = "wasm32")]
mod transport;

pub use config::JsClientConfig;

use strm_core::ClientError;
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
use crate::instance::Obtained;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    logger::init(level);
}

fn to_js_error(err: ClientError) -> JsValue {
    JsValue::from_str(&format!("strm-web error: {err}"))
}

#[cfg(target_arch = "wasm32")]
fn read_config(config: Option<JsValue>) -> Result<strm_core::ClientConfig, JsValue> {
    let Some(js_cfg) = config.filter(|value| !value.is_undefined() && !value.is_null()) else {
        return Ok(strm_core::ClientConfig::default());
    };
    let cfg: JsClientConfig = serde_wasm_bindgen::from_value(js_cfg)
        .map_err(|err| JsValue::from_str(&format!("Không đọc được config: {err}")))?;
    Ok(cfg.into())
}

/// Khởi tạo lớp giao diện một lần; gọi lại chỉ kết nối lại SSE.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn init(config: Option<JsValue>) -> Result<(), JsValue> {
    let config = read_config(config)?;
    log::info!("Khởi tạo strm-web, endpoint {}", config.endpoint);
    match app::App::obtain(config).map_err(to_js_error)? {
        Obtained::Fresh(app) => app.start().map_err(to_js_error),
        Obtained::Existing(app) => {
            log::warn!("init được gọi lại; giữ instance cũ và chỉ kết nối lại SSE");
            app.connect().map_err(to_js_error)
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
#[wasm_bindgen]
pub fn init(_config: Option<JsValue>) -> Result<(), JsValue> {
    Err(to_js_error(ClientError::Dom(
        "strm-web chỉ chạy được trên wasm32".to_string(),
    )))
}

#[cfg(target_arch = "wasm32")]
mod exports {
    use strm_core::{Details, Notification, Severity, ToastId};
    use wasm_bindgen::prelude::*;

    use super::to_js_error;
    use crate::app::App;

    fn current() -> Result<App, JsValue> {
        App::current().map_err(to_js_error)
    }

    #[wasm_bindgen(js_name = connectToSSE)]
    pub fn connect_to_sse() -> Result<(), JsValue> {
        current()?.connect().map_err(to_js_error)
    }

    #[wasm_bindgen(js_name = disconnectSSE)]
    pub fn disconnect_sse() -> Result<(), JsValue> {
        current()?.disconnect();
        Ok(())
    }

    /// Hiện một toast; trả id để `closeNotification` dùng.
    #[wasm_bindgen(js_name = showNotification)]
    pub fn show_notification(
        title: String,
        message: String,
        kind: Option<String>,
        details: Option<JsValue>,
    ) -> Result<u32, JsValue> {
        let severity = kind.map(Severity::from).unwrap_or_default();
        let mut notification = Notification::new(title, message, severity);
        if let Some(raw) = details.filter(|value| !value.is_undefined() && !value.is_null()) {
            let details: Details = serde_wasm_bindgen::from_value(raw)
                .map_err(|err| JsValue::from_str(&format!("Không đọc được details: {err}")))?;
            notification = notification.with_details(details);
        }

        let id = current()?.show(&notification).map_err(to_js_error)?;
        u32::try_from(id.0).map_err(|_| JsValue::from_str("Toast id vượt quá u32"))
    }

    #[wasm_bindgen(js_name = closeNotification)]
    pub fn close_notification(id: u32) -> Result<bool, JsValue> {
        Ok(current()?.close(ToastId(u64::from(id))))
    }

    #[wasm_bindgen(js_name = copyToClipboard)]
    pub fn copy_to_clipboard(text: String) -> Result<(), JsValue> {
        current()?.copy_to_clipboard(text);
        Ok(())
    }

    /// Dùng trong `onclick="return confirmDelete(...)"`; luôn trả `false`.
    #[wasm_bindgen(js_name = confirmDelete)]
    pub fn confirm_delete(url: String, message: Option<String>) -> Result<bool, JsValue> {
        Ok(current()?.confirm_delete(&url, message.as_deref()))
    }

    /// Đăng ký callback nhận `status_update`; truyền `null` để quay về `window.updateJobStatus`.
    #[wasm_bindgen(js_name = setStatusHandler)]
    pub fn set_status_handler(callback: Option<js_sys::Function>) -> Result<(), JsValue> {
        current()?.set_status_handler(callback);
        Ok(())
    }
}
