//! Logic lõi cho lớp thông báo và hành vi trang của M3U to STRM converter.
//!
//! Crate này không phụ thuộc trình duyệt: DOM, `EventSource` và bộ hẹn giờ đều đi qua
//! trait (`ToastSurface`, `Transport`, `Scheduler`) để kiểm thử được trên host.

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub mod event;
pub mod notification;
pub mod page;
pub mod scheduler;
pub mod stream;
pub mod toast;

pub use event::{
    Dispatch, EventKind, EventRouter, NoopStatusHandler, NotificationSink, StatusHandler,
    StreamEvent,
};
pub use notification::{Details, Notification, Severity};
pub use page::{Navigator, RequiredForm, Theme, Validation};
pub use scheduler::{fade_then, ManualScheduler, Scheduler, Task, TimerId};
pub use stream::{Connection, EventSink, Signal, StreamClient, Transport};
pub use toast::{ToastId, ToastPhase, ToastSurface, ToastTiming, Toaster};

/// Cấu hình endpoint và các mốc thời gian của lớp giao diện.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClientConfig {
    /// Đường dẫn kênh server-push.
    pub endpoint: String,
    /// Độ trễ cố định trước mỗi lần kết nối lại.
    pub reconnect_delay_ms: u32,
    pub toast_auto_close_ms: u32,
    pub toast_fade_ms: u32,
    pub flash_visible_ms: u32,
    pub flash_fade_ms: u32,
    /// Thời gian banner lỗi validation nằm trên form.
    pub validation_banner_ms: u32,
    pub copy_feedback_ms: u32,
    pub copy_fade_ms: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: "/events".to_string(),
            reconnect_delay_ms: 5_000,
            toast_auto_close_ms: 10_000,
            toast_fade_ms: 300,
            flash_visible_ms: 5_000,
            flash_fade_ms: 500,
            validation_banner_ms: 3_000,
            copy_feedback_ms: 2_000,
            copy_fade_ms: 500,
        }
    }
}

impl ClientConfig {
    pub fn reconnect_delay(&self) -> Duration {
        millis(self.reconnect_delay_ms)
    }

    pub fn flash_timing(&self) -> (Duration, Duration) {
        (millis(self.flash_visible_ms), millis(self.flash_fade_ms))
    }

    pub fn copy_feedback_timing(&self) -> (Duration, Duration) {
        (millis(self.copy_feedback_ms), millis(self.copy_fade_ms))
    }

    pub fn validation_banner(&self) -> Duration {
        millis(self.validation_banner_ms)
    }

    pub fn toast_timing(&self) -> ToastTiming {
        ToastTiming {
            auto_close: millis(self.toast_auto_close_ms),
            fade: millis(self.toast_fade_ms),
        }
    }
}

fn millis(value: u32) -> Duration {
    Duration::from_millis(u64::from(value))
}

/// Lỗi chung của lớp thông báo.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Payload của sự kiện `{kind}` không hợp lệ: {source}")]
    Payload {
        kind: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Envelope sự kiện không hợp lệ: {0}")]
    Envelope(String),
    #[error("Lỗi kết nối: {0}")]
    Transport(String),
    #[error("Lỗi DOM: {0}")]
    Dom(String),
    #[error("Không hẹn giờ được: {0}")]
    Scheduler(String),
}
