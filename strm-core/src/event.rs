//! Giải mã sự kiện server-push và bảng điều phối theo loại sự kiện.

use std::collections::HashMap;
use std::rc::Rc;

use serde::Serialize;
use serde_json::Value;

use crate::notification::Notification;
use crate::ClientError;

/// Các loại sự kiện có tên mà client đăng ký.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Connected,
    Notification,
    StatusUpdate,
}

impl EventKind {
    pub const ALL: [EventKind; 3] = [
        EventKind::Connected,
        EventKind::Notification,
        EventKind::StatusUpdate,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Connected => "connected",
            EventKind::Notification => "notification",
            EventKind::StatusUpdate => "status_update",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        EventKind::ALL.into_iter().find(|kind| kind.as_str() == name)
    }
}

/// Sự kiện đã giải mã, sẵn sàng chuyển cho handler.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum StreamEvent {
    Connected { message: Option<String> },
    Notification(Notification),
    /// Payload giữ nguyên, client không diễn giải.
    StatusUpdate(Value),
}

/// Tên sự kiện mặc định của frame không có dòng `event:`.
const ENVELOPE_EVENT: &str = "message";

impl StreamEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            StreamEvent::Connected { .. } => EventKind::Connected,
            StreamEvent::Notification(_) => EventKind::Notification,
            StreamEvent::StatusUpdate(_) => EventKind::StatusUpdate,
        }
    }

    /// Giải mã một frame theo tên sự kiện. `Ok(None)` nghĩa là không có gì để điều phối
    /// (ping, loại chưa đăng ký).
    pub fn decode(name: &str, data: &str) -> Result<Option<Self>, ClientError> {
        if name == ENVELOPE_EVENT {
            return Self::decode_envelope(data);
        }
        match EventKind::from_name(name) {
            Some(kind) => Self::decode_text(kind, data).map(Some),
            None => Ok(None),
        }
    }

    fn decode_text(kind: EventKind, data: &str) -> Result<Self, ClientError> {
        match kind {
            EventKind::Connected => Ok(StreamEvent::Connected {
                message: connected_message(data),
            }),
            EventKind::Notification => serde_json::from_str(data)
                .map(StreamEvent::Notification)
                .map_err(|source| payload_error(kind.as_str(), source)),
            EventKind::StatusUpdate => serde_json::from_str(data)
                .map(StreamEvent::StatusUpdate)
                .map_err(|source| payload_error(kind.as_str(), source)),
        }
    }

    fn decode_value(kind: EventKind, value: Value) -> Result<Self, ClientError> {
        match kind {
            EventKind::Connected => Ok(StreamEvent::Connected {
                message: value.as_str().map(str::to_string),
            }),
            EventKind::Notification => serde_json::from_value(value)
                .map(StreamEvent::Notification)
                .map_err(|source| payload_error(kind.as_str(), source)),
            EventKind::StatusUpdate => Ok(StreamEvent::StatusUpdate(value)),
        }
    }

    fn decode_envelope(data: &str) -> Result<Option<Self>, ClientError> {
        let value: Value =
            serde_json::from_str(data).map_err(|source| payload_error(ENVELOPE_EVENT, source))?;
        let Value::Object(mut envelope) = value else {
            return Err(ClientError::Envelope("không phải object JSON".to_string()));
        };
        let kind_name = envelope
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| ClientError::Envelope("thiếu trường `type`".to_string()))?;

        match EventKind::from_name(kind_name) {
            Some(kind) => {
                let inner = envelope.remove("data").unwrap_or(Value::Null);
                Self::decode_value(kind, inner).map(Some)
            }
            None => Ok(None),
        }
    }
}

fn connected_message(data: &str) -> Option<String> {
    let trimmed = data.trim();
    if trimmed.is_empty() {
        return None;
    }
    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::String(text)) => Some(text),
        _ => Some(trimmed.to_string()),
    }
}

fn payload_error(kind: &str, source: serde_json::Error) -> ClientError {
    ClientError::Payload {
        kind: kind.to_string(),
        source,
    }
}

/// Nơi nhận thông báo để hiển thị (toast renderer).
pub trait NotificationSink {
    fn notify(&self, notification: Notification);
}

/// Handler bên ngoài cho `status_update`.
pub trait StatusHandler {
    fn update(&self, payload: &Value);
}

/// Mặc định khi trang không cung cấp handler trạng thái.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopStatusHandler;

impl StatusHandler for NoopStatusHandler {
    fn update(&self, _payload: &Value) {}
}

/// Kết quả điều phối một frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Handled(EventKind),
    Ignored,
}

type Handler = Box<dyn Fn(StreamEvent)>;

/// Bảng điều phối: loại sự kiện → handler.
#[derive(Default)]
pub struct EventRouter {
    routes: HashMap<EventKind, Handler>,
}

impl EventRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bảng chuẩn: `connected` chỉ ghi log, `notification` sang toast, `status_update` sang
    /// handler trạng thái (no-op khi vắng).
    pub fn standard(
        notifications: Rc<dyn NotificationSink>,
        status: Option<Rc<dyn StatusHandler>>,
    ) -> Self {
        let status: Rc<dyn StatusHandler> = match status {
            Some(handler) => handler,
            None => Rc::new(NoopStatusHandler),
        };

        Self::new()
            .route(EventKind::Connected, |event| {
                if let StreamEvent::Connected { message } = event {
                    match message {
                        Some(message) => log::info!("SSE connection established: {message}"),
                        None => log::info!("SSE connection established"),
                    }
                }
            })
            .route(EventKind::Notification, move |event| {
                if let StreamEvent::Notification(notification) = event {
                    notifications.notify(notification);
                }
            })
            .route(EventKind::StatusUpdate, move |event| {
                if let StreamEvent::StatusUpdate(payload) = event {
                    status.update(&payload);
                }
            })
    }

    pub fn route<F>(mut self, kind: EventKind, handler: F) -> Self
    where
        F: Fn(StreamEvent) + 'static,
    {
        self.routes.insert(kind, Box::new(handler));
        self
    }

    pub fn handles(&self, kind: EventKind) -> bool {
        self.routes.contains_key(&kind)
    }

    /// Giải mã rồi gọi handler tương ứng. Lỗi payload chỉ ảnh hưởng frame hiện tại.
    pub fn dispatch(&self, name: &str, data: &str) -> Result<Dispatch, ClientError> {
        let Some(event) = StreamEvent::decode(name, data)? else {
            return Ok(Dispatch::Ignored);
        };
        let kind = event.kind();
        match self.routes.get(&kind) {
            Some(handler) => {
                handler(event);
                Ok(Dispatch::Handled(kind))
            }
            None => Ok(Dispatch::Ignored),
        }
    }
}
