#![cfg(target_arch = "wasm32")]

use std::time::Duration;

use strm_core::{ClientError, Navigator, Notification, ToastSurface};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, Event, HtmlElement, NodeList, Window};

use crate::styles;

pub const CONTAINER_ID: &str = "notifications-container";

pub(crate) fn js_error(err: JsValue) -> ClientError {
    ClientError::Dom(format!("{err:?}"))
}

/// Thông điệp dễ đọc từ lỗi JS (DOMException, Error, chuỗi).
pub(crate) fn describe_js(err: &JsValue) -> String {
    if let Some(text) = err.as_string() {
        return text;
    }
    match err.dyn_ref::<js_sys::Error>() {
        Some(error) => String::from(error.message()),
        None => format!("{err:?}"),
    }
}

pub(crate) fn elements(list: NodeList) -> Vec<Element> {
    (0..list.length())
        .filter_map(|index| list.item(index))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

pub(crate) fn create(document: &Document, tag: &str, class: &str) -> Result<Element, ClientError> {
    let element = document.create_element(tag).map_err(js_error)?;
    if !class.is_empty() {
        element.set_class_name(class);
    }
    Ok(element)
}

pub(crate) fn set_style(element: &Element, property: &str, value: &str) {
    let Some(html) = element.dyn_ref::<HtmlElement>() else {
        return;
    };
    if let Err(err) = html.style().set_property(property, value) {
        log::warn!("Không đặt được style {property}: {}", describe_js(&err));
    }
}

/// Toast dựng bằng web-sys, nội dung chèn dạng text.
pub struct DomToastSurface {
    document: Document,
}

impl DomToastSurface {
    pub fn new(document: Document) -> Self {
        Self { document }
    }

    fn text_block(&self, class: &str, text: &str) -> Result<Element, ClientError> {
        let block = create(&self.document, "div", class)?;
        block.set_text_content(Some(text));
        Ok(block)
    }

    fn details_block(&self, notification: &Notification) -> Result<Option<Element>, ClientError> {
        let Some(details) = notification.details.as_ref().filter(|d| !d.is_empty()) else {
            return Ok(None);
        };

        let block = create(&self.document, "div", "notification-details")?;
        block
            .append_child(&create(&self.document, "hr", "")?)
            .map_err(js_error)?;
        for (key, value) in details.iter() {
            let row = create(&self.document, "div", "")?;
            let label = create(&self.document, "strong", "")?;
            label.set_text_content(Some(&format!("{key}:")));
            row.append_child(&label).map_err(js_error)?;
            row.append_with_str_1(&format!(" {value}"))
                .map_err(js_error)?;
            block.append_child(&row).map_err(js_error)?;
        }
        Ok(Some(block))
    }
}

pub struct ToastNode {
    element: Element,
    _on_close: Closure<dyn FnMut(Event)>,
}

impl ToastSurface for DomToastSurface {
    type Container = Element;
    type Node = ToastNode;

    fn obtain_container(&self) -> Result<Element, ClientError> {
        styles::ensure_styles(&self.document).map_err(js_error)?;
        if let Some(existing) = self.document.get_element_by_id(CONTAINER_ID) {
            return Ok(existing);
        }

        let body = self
            .document
            .body()
            .ok_or_else(|| ClientError::Dom("Document không có <body>".to_string()))?;
        let container = create(&self.document, "div", "")?;
        container.set_id(CONTAINER_ID);
        container
            .set_attribute("aria-live", "polite")
            .map_err(js_error)?;
        body.append_child(&container).map_err(js_error)?;
        Ok(container)
    }

    fn mount(
        &self,
        container: &Element,
        notification: &Notification,
        on_close: Box<dyn Fn()>,
    ) -> Result<ToastNode, ClientError> {
        let toast = create(&self.document, "div", &notification.css_class())?;
        toast.set_attribute("role", "status").map_err(js_error)?;
        toast
            .append_child(&self.text_block("notification-title", &notification.title)?)
            .map_err(js_error)?;
        toast
            .append_child(&self.text_block("notification-message", &notification.message)?)
            .map_err(js_error)?;

        let close = create(&self.document, "button", "notification-close")?;
        close.set_attribute("type", "button").map_err(js_error)?;
        close.set_attribute("aria-label", "Close").map_err(js_error)?;
        close.set_text_content(Some("\u{00d7}"));
        toast.append_child(&close).map_err(js_error)?;

        if let Some(details) = self.details_block(notification)? {
            toast.append_child(&details).map_err(js_error)?;
        }

        let on_click = Closure::<dyn FnMut(Event)>::new(move |_event: Event| on_close());
        close
            .add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())
            .map_err(js_error)?;

        container.append_child(&toast).map_err(js_error)?;

        Ok(ToastNode {
            element: toast,
            _on_close: on_click,
        })
    }

    fn begin_fade(&self, node: &ToastNode, fade: Duration) {
        set_style(
            &node.element,
            "animation",
            &format!("fadeOut {}ms ease-out forwards", fade.as_millis()),
        );
    }

    fn detach(&self, node: &ToastNode) -> bool {
        match node.element.parent_node() {
            Some(parent) => parent.remove_child(&node.element).is_ok(),
            None => false,
        }
    }
}

/// `confirm()` và `location.href` của window.
pub struct WindowNavigator {
    window: Window,
}

impl WindowNavigator {
    pub fn new(window: Window) -> Self {
        Self { window }
    }
}

impl Navigator for WindowNavigator {
    fn confirm(&self, message: &str) -> bool {
        self.window.confirm_with_message(message).unwrap_or_else(|err| {
            log::error!("Không mở được hộp thoại xác nhận: {}", describe_js(&err));
            false
        })
    }

    fn navigate(&self, url: &str) {
        if let Err(err) = self.window.location().set_href(url) {
            log::error!("Không điều hướng được tới {url}: {}", describe_js(&err));
        }
    }
}
