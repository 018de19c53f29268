use serde::Deserialize;
use strm_core::ClientConfig;

/// Cấu hình một phần từ JavaScript; trường vắng giữ giá trị mặc định.
#[derive(Debug, Default, Deserialize)]
pub struct JsClientConfig {
    #[serde(default)]
    endpoint: Option<String>,
    #[serde(default)]
    reconnect_delay_ms: Option<u32>,
    #[serde(default)]
    toast_auto_close_ms: Option<u32>,
    #[serde(default)]
    toast_fade_ms: Option<u32>,
    #[serde(default)]
    flash_visible_ms: Option<u32>,
    #[serde(default)]
    flash_fade_ms: Option<u32>,
    #[serde(default)]
    validation_banner_ms: Option<u32>,
    #[serde(default)]
    copy_feedback_ms: Option<u32>,
    #[serde(default)]
    copy_fade_ms: Option<u32>,
}

impl From<JsClientConfig> for ClientConfig {
    fn from(cfg: JsClientConfig) -> Self {
        let mut base = ClientConfig::default();
        if let Some(endpoint) = cfg.endpoint.filter(|value| !value.is_empty()) {
            base.endpoint = endpoint;
        }
        if let Some(ms) = cfg.reconnect_delay_ms {
            base.reconnect_delay_ms = ms;
        }
        if let Some(ms) = cfg.toast_auto_close_ms {
            base.toast_auto_close_ms = ms;
        }
        if let Some(ms) = cfg.toast_fade_ms {
            base.toast_fade_ms = ms;
        }
        if let Some(ms) = cfg.flash_visible_ms {
            base.flash_visible_ms = ms;
        }
        if let Some(ms) = cfg.flash_fade_ms {
            base.flash_fade_ms = ms;
        }
        if let Some(ms) = cfg.validation_banner_ms {
            base.validation_banner_ms = ms;
        }
        if let Some(ms) = cfg.copy_feedback_ms {
            base.copy_feedback_ms = ms;
        }
        if let Some(ms) = cfg.copy_fade_ms {
            base.copy_fade_ms = ms;
        }
        base
    }
}
