#![cfg(target_arch = "wasm32")]

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Node};

pub const STYLE_ID: &str = "notification-styles";

/// Default CSS for toasts and the copy banner. Colors fall back to the page's own variables.
pub const DEFAULT_STYLES: &str = r#"
:root {
  --strm-toast-bg: var(--card-bg, #fff);
  --strm-toast-text: var(--text-color, #000);
  --strm-toast-radius: 8px;
  --strm-toast-shadow: 0 4px 15px rgba(0, 0, 0, 0.2);
  --strm-severity-info: var(--info-color, #5ac8fa);
  --strm-severity-success: var(--success-color, #34c759);
  --strm-severity-warning: var(--warning-color, #ffcc00);
  --strm-severity-error: var(--danger-color, #ff3b30);
}

#notifications-container {
  position: fixed;
  top: 20px;
  right: 20px;
  z-index: 1000;
  max-width: 350px;
  max-height: 80vh;
  overflow-y: auto;
  display: flex;
  flex-direction: column;
  gap: 10px;
}

.notification {
  position: relative;
  padding: 15px;
  border-radius: var(--strm-toast-radius);
  background-color: var(--strm-toast-bg);
  box-shadow: var(--strm-toast-shadow);
  border-left: 4px solid transparent;
  animation: slideIn 0.3s ease-out;
}

.notification.info {
  border-left-color: var(--strm-severity-info);
}

.notification.success {
  border-left-color: var(--strm-severity-success);
}

.notification.warning {
  border-left-color: var(--strm-severity-warning);
}

.notification.error {
  border-left-color: var(--strm-severity-error);
}

.notification-title {
  font-weight: 600;
  margin-bottom: 5px;
  padding-right: 20px;
}

.notification-message {
  font-size: 0.9rem;
  word-break: break-word;
}

.notification-details {
  font-size: 0.85rem;
  word-break: break-word;
}

.notification-close {
  position: absolute;
  top: 10px;
  right: 10px;
  padding: 0;
  border: none;
  background: none;
  color: var(--strm-toast-text);
  font-size: 1rem;
  opacity: 0.5;
  cursor: pointer;
}

.notification-close:hover {
  opacity: 1;
}

.copy-feedback {
  position: fixed;
  bottom: 20px;
  left: 50%;
  transform: translateX(-50%);
  z-index: 1000;
  padding: 10px 20px;
  border-radius: 5px;
  background-color: var(--strm-severity-success);
  color: white;
}

@keyframes slideIn {
  from {
    transform: translateX(100%);
    opacity: 0;
  }
  to {
    transform: translateX(0);
    opacity: 1;
  }
}

@keyframes fadeOut {
  from {
    opacity: 1;
  }
  to {
    opacity: 0;
  }
}
"#;

pub fn ensure_styles(document: &Document) -> Result<(), JsValue> {
    if document.get_element_by_id(STYLE_ID).is_some() {
        return Ok(());
    }

    let head = document
        .head()
        .ok_or_else(|| JsValue::from_str("Document không có thẻ <head>"))?;

    let style_el = document.create_element("style")?;
    style_el.set_id(STYLE_ID);
    style_el.set_attribute("data-strm-web", "v1")?;
    style_el.set_text_content(Some(DEFAULT_STYLES));
    head.append_child(&style_el.clone().dyn_into::<Node>()?)?;

    Ok(())
}
