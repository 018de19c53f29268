#![cfg(target_arch = "wasm32")]

//! Hành vi của các trang render sẵn: flash, file input, form, công tắc theme.

use std::rc::Rc;

use strm_core::page::{
    self, FILE_INPUT_SELECTOR, FILE_LABEL_CLASS, FLASH_SELECTOR, INVALID_CLASS,
    REQUIRED_SELECTOR, THEME_TOGGLE_ID, VALIDATION_BANNER_CLASS,
};
use strm_core::{fade_then, ClientConfig, ClientError, Navigator, RequiredForm, Scheduler};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, Event, HtmlInputElement};

use crate::dom::{self, create, describe_js, js_error, set_style};

pub fn install(
    document: &Document,
    scheduler: &Rc<dyn Scheduler>,
    navigator: Rc<dyn Navigator>,
    config: &ClientConfig,
) -> Result<(), ClientError> {
    schedule_flash_hide(document, scheduler, config)?;
    bind_file_labels(document)?;
    bind_required_forms(document, scheduler, config)?;
    bind_theme_toggle(document, navigator)?;
    Ok(())
}

fn schedule_flash_hide(
    document: &Document,
    scheduler: &Rc<dyn Scheduler>,
    config: &ClientConfig,
) -> Result<(), ClientError> {
    let (visible, fade) = config.flash_timing();
    let alerts = dom::elements(document.query_selector_all(FLASH_SELECTOR).map_err(js_error)?);
    log::debug!("Tự ẩn {} flash message", alerts.len());

    for alert in alerts {
        let fading = alert.clone();
        let transition = format!("opacity {}ms", fade.as_millis());
        fade_then(
            scheduler,
            visible,
            fade,
            move || {
                set_style(&fading, "transition", &transition);
                set_style(&fading, "opacity", "0");
            },
            move || set_style(&alert, "display", "none"),
        )?;
    }
    Ok(())
}

fn bind_file_labels(document: &Document) -> Result<(), ClientError> {
    let inputs = dom::elements(document.query_selector_all(FILE_INPUT_SELECTOR).map_err(js_error)?);
    for element in inputs {
        let Ok(input) = element.dyn_into::<HtmlInputElement>() else {
            continue;
        };
        let target = input.clone();
        let on_change = Closure::<dyn FnMut(Event)>::new(move |_event: Event| {
            let Some(label) = target
                .next_element_sibling()
                .filter(|sibling| sibling.class_list().contains(FILE_LABEL_CLASS))
            else {
                return;
            };
            let file_name = target.files().and_then(|files| files.get(0)).map(|file| file.name());
            label.set_text_content(Some(page::file_label_text(file_name.as_deref())));
        });
        input
            .add_event_listener_with_callback("change", on_change.as_ref().unchecked_ref())
            .map_err(js_error)?;
        on_change.forget();
    }
    Ok(())
}

/// Form nhìn qua DOM; danh sách trường bắt buộc đọc lại ở mỗi lần submit.
struct DomForm {
    document: Document,
    form: Element,
    fields: Vec<Element>,
}

impl DomForm {
    fn snapshot(document: &Document, form: &Element) -> Result<Self, ClientError> {
        let fields = dom::elements(form.query_selector_all(REQUIRED_SELECTOR).map_err(js_error)?);
        Ok(Self {
            document: document.clone(),
            form: form.clone(),
            fields,
        })
    }
}

impl RequiredForm for DomForm {
    type Banner = Element;

    fn required_values(&self) -> Vec<String> {
        self.fields
            .iter()
            .map(|field| {
                js_sys::Reflect::get(field, &JsValue::from_str("value"))
                    .ok()
                    .and_then(|value| value.as_string())
                    .unwrap_or_default()
            })
            .collect()
    }

    fn set_invalid(&self, index: usize, invalid: bool) {
        let Some(field) = self.fields.get(index) else {
            return;
        };
        let classes = field.class_list();
        let result = if invalid {
            classes.add_1(INVALID_CLASS)
        } else {
            classes.remove_1(INVALID_CLASS)
        };
        if let Err(err) = result {
            log::warn!("Không cập nhật được class {INVALID_CLASS}: {}", describe_js(&err));
        }
    }

    fn insert_banner(&self, message: &str) -> Result<Element, ClientError> {
        let banner = create(&self.document, "div", VALIDATION_BANNER_CLASS)?;
        banner.set_text_content(Some(message));
        self.form
            .insert_before(&banner, self.form.first_child().as_ref())
            .map_err(js_error)?;
        Ok(banner)
    }

    fn remove_banner(banner: Element) {
        banner.remove();
    }
}

fn bind_required_forms(
    document: &Document,
    scheduler: &Rc<dyn Scheduler>,
    config: &ClientConfig,
) -> Result<(), ClientError> {
    let banner_for = config.validation_banner();
    let forms = dom::elements(document.query_selector_all("form").map_err(js_error)?);

    for form in forms {
        let document = document.clone();
        let scheduler = Rc::clone(scheduler);
        let target = form.clone();
        let on_submit = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            let form = match DomForm::snapshot(&document, &target) {
                Ok(form) => form,
                Err(err) => {
                    log::error!("Không đọc được form: {err}");
                    return;
                }
            };
            let validation = page::guard_submit(&form, &scheduler, banner_for);
            if !validation.is_valid() {
                log::debug!("Chặn submit: {} trường trống", validation.invalid().len());
                event.prevent_default();
            }
        });
        form.add_event_listener_with_callback("submit", on_submit.as_ref().unchecked_ref())
            .map_err(js_error)?;
        on_submit.forget();
    }
    Ok(())
}

fn bind_theme_toggle(document: &Document, navigator: Rc<dyn Navigator>) -> Result<(), ClientError> {
    let Some(element) = document.get_element_by_id(THEME_TOGGLE_ID) else {
        return Ok(());
    };
    let input = element
        .dyn_into::<HtmlInputElement>()
        .map_err(|_| ClientError::Dom(format!("#{THEME_TOGGLE_ID} không phải <input>")))?;

    let target = input.clone();
    let on_change = Closure::<dyn FnMut(Event)>::new(move |_event: Event| {
        let theme = page::toggle_theme(navigator.as_ref(), target.checked());
        log::info!("Chuyển theme sang {}", theme.as_str());
    });
    input
        .add_event_listener_with_callback("change", on_change.as_ref().unchecked_ref())
        .map_err(js_error)?;
    on_change.forget();
    Ok(())
}
