//! Client cho kênh server-push: mở kết nối, điều phối sự kiện, kết nối lại sau lỗi.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::time::Duration;

use crate::event::EventRouter;
use crate::scheduler::{Scheduler, TimerId};
use crate::{ClientConfig, ClientError};

/// Tín hiệu transport đẩy về client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal {
    Event { name: String, data: String },
    Error,
}

/// Đầu nhận tín hiệu gắn với một lần mở kết nối.
#[derive(Clone)]
pub struct EventSink {
    deliver: Rc<dyn Fn(Signal)>,
}

impl EventSink {
    pub fn new<F: Fn(Signal) + 'static>(deliver: F) -> Self {
        Self {
            deliver: Rc::new(deliver),
        }
    }

    pub fn event(&self, name: &str, data: &str) {
        (self.deliver)(Signal::Event {
            name: name.to_string(),
            data: data.to_string(),
        });
    }

    pub fn error(&self) {
        (self.deliver)(Signal::Error);
    }
}

pub trait Connection {
    fn close(&mut self);
}

pub trait Transport {
    type Connection: Connection;

    /// Mở kết nối tới `endpoint`; mọi sự kiện của kết nối đi qua `sink`.
    fn open(&self, endpoint: &str, sink: EventSink) -> Result<Self::Connection, ClientError>;
}

struct Inner<T: Transport> {
    transport: T,
    scheduler: Rc<dyn Scheduler>,
    router: EventRouter,
    endpoint: String,
    reconnect_delay: Duration,
    connection: RefCell<Option<T::Connection>>,
    // Tăng mỗi lần mở hoặc ngắt; tín hiệu từ kết nối cũ bị bỏ qua.
    generation: Cell<u64>,
    reconnect: Cell<Option<TimerId>>,
    attempts: Cell<u64>,
}

/// Tối đa một kết nối sống; đóng kết nối cũ trước khi mở kết nối mới.
pub struct StreamClient<T: Transport> {
    inner: Rc<Inner<T>>,
}

impl<T: Transport> Clone for StreamClient<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: Transport + 'static> StreamClient<T> {
    pub fn new(
        transport: T,
        scheduler: Rc<dyn Scheduler>,
        router: EventRouter,
        config: &ClientConfig,
    ) -> Self {
        Self {
            inner: Rc::new(Inner {
                transport,
                scheduler,
                router,
                endpoint: config.endpoint.clone(),
                reconnect_delay: config.reconnect_delay(),
                connection: RefCell::new(None),
                generation: Cell::new(0),
                reconnect: Cell::new(None),
                attempts: Cell::new(0),
            }),
        }
    }

    pub fn transport(&self) -> &T {
        &self.inner.transport
    }

    pub fn connect(&self) -> Result<(), ClientError> {
        self.cancel_reconnect();
        self.close_current();

        let generation = self.inner.generation.get() + 1;
        self.inner.generation.set(generation);
        self.inner.attempts.set(self.inner.attempts.get() + 1);

        let sink = self.sink(generation);
        match self.inner.transport.open(&self.inner.endpoint, sink) {
            Ok(connection) => {
                *self.inner.connection.borrow_mut() = Some(connection);
                Ok(())
            }
            Err(err) => {
                log::error!("Không mở được kết nối SSE tới {}: {err}", self.inner.endpoint);
                self.schedule_reconnect();
                Err(err)
            }
        }
    }

    /// Đóng kết nối và hủy lần kết nối lại đang chờ.
    pub fn disconnect(&self) {
        self.cancel_reconnect();
        self.close_current();
        self.inner.generation.set(self.inner.generation.get() + 1);
    }

    pub fn is_connected(&self) -> bool {
        self.inner.connection.borrow().is_some()
    }

    pub fn reconnect_pending(&self) -> bool {
        self.inner.reconnect.get().is_some()
    }

    /// Tổng số lần đã gọi mở kết nối.
    pub fn attempts(&self) -> u64 {
        self.inner.attempts.get()
    }

    fn sink(&self, generation: u64) -> EventSink {
        let weak = Rc::downgrade(&self.inner);
        EventSink::new(move |signal| {
            if let Some(client) = Self::upgrade(&weak) {
                client.handle(generation, signal);
            }
        })
    }

    fn handle(&self, generation: u64, signal: Signal) {
        if generation != self.inner.generation.get() {
            log::debug!("Bỏ qua tín hiệu từ kết nối cũ #{generation}");
            return;
        }
        match signal {
            Signal::Event { name, data } => {
                if let Err(err) = self.inner.router.dispatch(&name, &data) {
                    log::warn!("Bỏ qua sự kiện `{name}`: {err}");
                }
            }
            Signal::Error => self.on_transport_error(),
        }
    }

    fn on_transport_error(&self) {
        log::error!("SSE connection error");
        self.close_current();
        self.schedule_reconnect();
    }

    fn schedule_reconnect(&self) {
        if self.reconnect_pending() {
            return;
        }
        let weak = Rc::downgrade(&self.inner);
        let scheduled = self.inner.scheduler.schedule(
            self.inner.reconnect_delay,
            Box::new(move || {
                if let Some(client) = Self::upgrade(&weak) {
                    client.inner.reconnect.set(None);
                    // Lỗi đã được ghi log và lần thử kế tiếp đã được hẹn trong `connect`.
                    let _ = client.connect();
                }
            }),
        );
        match scheduled {
            Ok(timer) => self.inner.reconnect.set(Some(timer)),
            Err(err) => log::error!("Không hẹn được kết nối lại: {err}"),
        }
    }

    fn cancel_reconnect(&self) {
        if let Some(timer) = self.inner.reconnect.take() {
            self.inner.scheduler.cancel(timer);
        }
    }

    fn close_current(&self) {
        let previous = self.inner.connection.borrow_mut().take();
        if let Some(mut connection) = previous {
            connection.close();
        }
    }

    fn upgrade(weak: &Weak<Inner<T>>) -> Option<Self> {
        weak.upgrade().map(|inner| Self { inner })
    }
}
