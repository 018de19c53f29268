//! Quy tắc cho các hành vi trang độc lập (flash, file input, form, theme, clipboard, xóa).

use std::rc::Rc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::notification::{Notification, Severity};
use crate::scheduler::Scheduler;
use crate::ClientError;

pub const FLASH_SELECTOR: &str = ".alert";
pub const FILE_INPUT_SELECTOR: &str = "input[type=\"file\"]";
pub const FILE_LABEL_CLASS: &str = "file-label";
pub const NO_FILE_CHOSEN: &str = "No file chosen";
pub const REQUIRED_SELECTOR: &str = "[required]";
pub const INVALID_CLASS: &str = "is-invalid";
pub const VALIDATION_BANNER_CLASS: &str = "alert alert-danger";
pub const VALIDATION_MESSAGE: &str = "Please fill in all required fields.";
pub const THEME_TOGGLE_ID: &str = "theme-toggle";
pub const COPY_SUCCESS_MESSAGE: &str = "Copied to clipboard!";
pub const DEFAULT_DELETE_PROMPT: &str = "Are you sure you want to delete this item?";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn from_checked(checked: bool) -> Self {
        if checked {
            Theme::Dark
        } else {
            Theme::Light
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    /// Server lưu theme khi trình duyệt điều hướng tới đường dẫn này.
    pub fn path(self) -> String {
        format!("/theme/{}", self.as_str())
    }
}

/// Nhãn hiển thị cạnh file input.
pub fn file_label_text(file_name: Option<&str>) -> &str {
    match file_name {
        Some(name) if !name.is_empty() => name,
        _ => NO_FILE_CHOSEN,
    }
}

/// Kết quả kiểm tra các trường bắt buộc, theo thứ tự trong form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Validation {
    checked: usize,
    invalid: Vec<usize>,
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        self.invalid.is_empty()
    }

    pub fn checked(&self) -> usize {
        self.checked
    }

    pub fn invalid(&self) -> &[usize] {
        &self.invalid
    }

    pub fn is_invalid(&self, index: usize) -> bool {
        self.invalid.contains(&index)
    }
}

pub fn validate_required<'a, I>(values: I) -> Validation
where
    I: IntoIterator<Item = &'a str>,
{
    let mut validation = Validation::default();
    for (index, value) in values.into_iter().enumerate() {
        validation.checked += 1;
        if value.trim().is_empty() {
            validation.invalid.push(index);
        }
    }
    validation
}

/// Form có các trường bắt buộc, nhìn từ phía kiểm tra khi submit.
pub trait RequiredForm {
    type Banner: 'static;

    fn required_values(&self) -> Vec<String>;
    fn set_invalid(&self, index: usize, invalid: bool);
    /// Chèn banner lỗi lên đầu form.
    fn insert_banner(&self, message: &str) -> Result<Self::Banner, ClientError>;
    fn remove_banner(banner: Self::Banner);
}

/// Kiểm tra form khi submit. Caller hủy submit khi kết quả không hợp lệ.
pub fn guard_submit<F: RequiredForm>(
    form: &F,
    scheduler: &Rc<dyn Scheduler>,
    banner_for: Duration,
) -> Validation {
    let values = form.required_values();
    let validation = validate_required(values.iter().map(String::as_str));

    for index in 0..validation.checked() {
        form.set_invalid(index, validation.is_invalid(index));
    }

    if !validation.is_valid() {
        match form.insert_banner(VALIDATION_MESSAGE) {
            Ok(banner) => {
                let scheduled =
                    scheduler.schedule(banner_for, Box::new(move || F::remove_banner(banner)));
                if let Err(err) = scheduled {
                    log::error!("Không hẹn được gỡ banner validation: {err}");
                }
            }
            Err(err) => log::error!("Không chèn được banner validation: {err}"),
        }
    }

    validation
}

/// Hộp thoại xác nhận và điều hướng của trình duyệt.
pub trait Navigator {
    fn confirm(&self, message: &str) -> bool;
    fn navigate(&self, url: &str);
}

/// Luôn trả `false` để hủy hành động mặc định của link.
pub fn confirm_delete(navigator: &dyn Navigator, url: &str, message: Option<&str>) -> bool {
    let prompt = message
        .filter(|text| !text.is_empty())
        .unwrap_or(DEFAULT_DELETE_PROMPT);
    if navigator.confirm(prompt) {
        navigator.navigate(url);
    }
    false
}

pub fn toggle_theme(navigator: &dyn Navigator, checked: bool) -> Theme {
    let theme = Theme::from_checked(checked);
    navigator.navigate(&theme.path());
    theme
}

pub fn copy_failure_notification(reason: &str) -> Notification {
    Notification::new(
        "Copy failed",
        format!("Could not copy to clipboard: {reason}"),
        Severity::Error,
    )
}
