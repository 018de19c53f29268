//! Vòng đời toast: `Created → Visible → Fading → Removed`.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};
use std::time::Duration;

use crate::event::NotificationSink;
use crate::notification::Notification;
use crate::scheduler::{Scheduler, TimerId};
use crate::ClientError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ToastId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastPhase {
    Created,
    Visible,
    Fading,
    Removed,
}

impl ToastPhase {
    /// Trạng thái kế tiếp; không có bước nhảy qua `Fading`.
    pub fn next(self) -> Option<Self> {
        match self {
            ToastPhase::Created => Some(ToastPhase::Visible),
            ToastPhase::Visible => Some(ToastPhase::Fading),
            ToastPhase::Fading => Some(ToastPhase::Removed),
            ToastPhase::Removed => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToastTiming {
    pub auto_close: Duration,
    pub fade: Duration,
}

impl Default for ToastTiming {
    fn default() -> Self {
        Self {
            auto_close: Duration::from_millis(10_000),
            fade: Duration::from_millis(300),
        }
    }
}

/// Nửa gắn với DOM của bộ render toast.
pub trait ToastSurface {
    type Container;
    type Node;

    /// Tìm hoặc tạo container. `Toaster` chỉ gọi một lần và giữ lại kết quả.
    fn obtain_container(&self) -> Result<Self::Container, ClientError>;

    /// Dựng phần tử toast; `on_close` gắn vào nút đóng.
    fn mount(
        &self,
        container: &Self::Container,
        notification: &Notification,
        on_close: Box<dyn Fn()>,
    ) -> Result<Self::Node, ClientError>;

    fn begin_fade(&self, node: &Self::Node, fade: Duration);

    /// Gỡ phần tử khỏi document; `false` nếu nó không còn gắn vào đâu.
    fn detach(&self, node: &Self::Node) -> bool;
}

struct Entry<N> {
    /// `None` khi còn ở `Created`, trước khi surface mount xong.
    node: Option<N>,
    phase: ToastPhase,
    auto_close: Option<TimerId>,
}

struct Inner<S: ToastSurface> {
    surface: S,
    scheduler: Rc<dyn Scheduler>,
    timing: ToastTiming,
    container: RefCell<Option<S::Container>>,
    toasts: RefCell<HashMap<ToastId, Entry<S::Node>>>,
    next_id: Cell<u64>,
}

/// Bộ render toast. Clone rẻ, mọi bản sao dùng chung trạng thái.
pub struct Toaster<S: ToastSurface> {
    inner: Rc<Inner<S>>,
}

impl<S: ToastSurface> Clone for Toaster<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<S: ToastSurface + 'static> Toaster<S> {
    pub fn new(surface: S, scheduler: Rc<dyn Scheduler>, timing: ToastTiming) -> Self {
        Self {
            inner: Rc::new(Inner {
                surface,
                scheduler,
                timing,
                container: RefCell::new(None),
                toasts: RefCell::new(HashMap::new()),
                next_id: Cell::new(0),
            }),
        }
    }

    pub fn surface(&self) -> &S {
        &self.inner.surface
    }

    pub fn show(&self, notification: &Notification) -> Result<ToastId, ClientError> {
        self.ensure_container()?;

        let id = ToastId(self.inner.next_id.get());
        self.inner.next_id.set(id.0 + 1);

        let on_close: Box<dyn Fn()> = {
            let weak = Rc::downgrade(&self.inner);
            Box::new(move || {
                if let Some(toaster) = Self::upgrade(&weak) {
                    toaster.close(id);
                }
            })
        };

        self.inner.toasts.borrow_mut().insert(
            id,
            Entry {
                node: None,
                phase: ToastPhase::Created,
                auto_close: None,
            },
        );

        let mounted = {
            let container = self.inner.container.borrow();
            let mounted = match container.as_ref() {
                Some(container) => self.inner.surface.mount(container, notification, on_close),
                None => Err(ClientError::Dom("Chưa có container thông báo".to_string())),
            };
            mounted
        };
        let node = match mounted {
            Ok(node) => node,
            Err(err) => {
                self.inner.toasts.borrow_mut().remove(&id);
                return Err(err);
            }
        };

        if let Some(entry) = self.inner.toasts.borrow_mut().get_mut(&id) {
            entry.node = Some(node);
            entry.phase = ToastPhase::Visible;
        }

        if notification.auto_dismisses() {
            let weak = Rc::downgrade(&self.inner);
            let scheduled = self.inner.scheduler.schedule(
                self.inner.timing.auto_close,
                Box::new(move || {
                    if let Some(toaster) = Self::upgrade(&weak) {
                        toaster.close(id);
                    }
                }),
            );
            match scheduled {
                Ok(timer) => {
                    if let Some(entry) = self.inner.toasts.borrow_mut().get_mut(&id) {
                        entry.auto_close = Some(timer);
                    }
                }
                Err(err) => log::error!("Không hẹn được tự đóng cho toast {}: {err}", id.0),
            }
        }

        Ok(id)
    }

    /// Bắt đầu mờ dần rồi gỡ toast. Gọi lại lần hai là no-op.
    pub fn close(&self, id: ToastId) -> bool {
        let auto_close = {
            let mut toasts = self.inner.toasts.borrow_mut();
            let Some(entry) = toasts.get_mut(&id) else {
                return false;
            };
            if entry.phase != ToastPhase::Visible {
                return false;
            }
            entry.phase = ToastPhase::Fading;
            if let Some(node) = &entry.node {
                self.inner.surface.begin_fade(node, self.inner.timing.fade);
            }
            entry.auto_close.take()
        };

        if let Some(timer) = auto_close {
            self.inner.scheduler.cancel(timer);
        }

        let weak = Rc::downgrade(&self.inner);
        let scheduled = self.inner.scheduler.schedule(
            self.inner.timing.fade,
            Box::new(move || {
                if let Some(toaster) = Self::upgrade(&weak) {
                    toaster.finish(id);
                }
            }),
        );
        if let Err(err) = scheduled {
            log::error!("Không hẹn được bước gỡ toast {}: {err}", id.0);
            self.finish(id);
        }
        true
    }

    /// `None` cho id chưa từng cấp.
    pub fn phase(&self, id: ToastId) -> Option<ToastPhase> {
        if let Some(entry) = self.inner.toasts.borrow().get(&id) {
            return Some(entry.phase);
        }
        (id.0 < self.inner.next_id.get()).then_some(ToastPhase::Removed)
    }

    /// Số toast còn trong document (kể cả đang mờ dần).
    pub fn live_count(&self) -> usize {
        self.inner.toasts.borrow().len()
    }

    fn ensure_container(&self) -> Result<(), ClientError> {
        if self.inner.container.borrow().is_some() {
            return Ok(());
        }
        let container = self.inner.surface.obtain_container()?;
        *self.inner.container.borrow_mut() = Some(container);
        Ok(())
    }

    fn finish(&self, id: ToastId) {
        let node = self
            .inner
            .toasts
            .borrow_mut()
            .remove(&id)
            .and_then(|entry| entry.node);
        if let Some(node) = node {
            if !self.inner.surface.detach(&node) {
                log::debug!("Toast {} đã bị gỡ trước đó", id.0);
            }
        }
    }

    fn upgrade(weak: &Weak<Inner<S>>) -> Option<Self> {
        weak.upgrade().map(|inner| Self { inner })
    }
}

impl<S: ToastSurface + 'static> NotificationSink for Toaster<S> {
    fn notify(&self, notification: Notification) {
        if let Err(err) = self.show(&notification) {
            log::error!("Không hiển thị được thông báo `{}`: {err}", notification.title);
        }
    }
}
