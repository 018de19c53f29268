use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use serde_json::{json, Value};
use strm_core::{
    ClientConfig, ClientError, Connection, EventRouter, EventSink, ManualScheduler, Notification,
    NotificationSink, Scheduler, Severity, StatusHandler, StreamClient, ToastSurface, Toaster,
    Transport,
};

#[derive(Default)]
struct FakeTransport {
    log: Rc<RefCell<Vec<String>>>,
    live: Rc<Cell<usize>>,
    max_live: Rc<Cell<usize>>,
    sinks: RefCell<Vec<EventSink>>,
    refuse_next: Cell<bool>,
}

impl FakeTransport {
    fn opened(&self) -> usize {
        self.sinks.borrow().len()
    }

    fn sink(&self, index: usize) -> EventSink {
        self.sinks.borrow()[index].clone()
    }

    fn latest(&self) -> EventSink {
        let sinks = self.sinks.borrow();
        sinks[sinks.len() - 1].clone()
    }

    fn log(&self) -> Vec<String> {
        self.log.borrow().clone()
    }
}

struct FakeConnection {
    id: usize,
    log: Rc<RefCell<Vec<String>>>,
    live: Rc<Cell<usize>>,
}

impl Connection for FakeConnection {
    fn close(&mut self) {
        self.log.borrow_mut().push(format!("close#{}", self.id));
        self.live.set(self.live.get() - 1);
    }
}

impl Transport for FakeTransport {
    type Connection = FakeConnection;

    fn open(&self, endpoint: &str, sink: EventSink) -> Result<FakeConnection, ClientError> {
        assert_eq!(endpoint, "/events");
        if self.refuse_next.replace(false) {
            self.log.borrow_mut().push("refused".to_string());
            return Err(ClientError::Transport("refused".to_string()));
        }
        self.sinks.borrow_mut().push(sink);
        let id = self.sinks.borrow().len();
        self.log.borrow_mut().push(format!("open#{id}"));
        self.live.set(self.live.get() + 1);
        self.max_live.set(self.max_live.get().max(self.live.get()));
        Ok(FakeConnection {
            id,
            log: Rc::clone(&self.log),
            live: Rc::clone(&self.live),
        })
    }
}

#[derive(Default)]
struct RecordingSink {
    shown: RefCell<Vec<Notification>>,
}

impl NotificationSink for RecordingSink {
    fn notify(&self, notification: Notification) {
        self.shown.borrow_mut().push(notification);
    }
}

#[derive(Default)]
struct RecordingStatus {
    updates: RefCell<Vec<Value>>,
}

impl StatusHandler for RecordingStatus {
    fn update(&self, payload: &Value) {
        self.updates.borrow_mut().push(payload.clone());
    }
}

/// Surface chỉ đếm số toast còn gắn trong document.
#[derive(Default)]
struct CountingSurface {
    attached: Cell<usize>,
}

impl ToastSurface for CountingSurface {
    type Container = ();
    type Node = ();

    fn obtain_container(&self) -> Result<(), ClientError> {
        Ok(())
    }

    fn mount(
        &self,
        _container: &(),
        _notification: &Notification,
        _on_close: Box<dyn Fn()>,
    ) -> Result<(), ClientError> {
        self.attached.set(self.attached.get() + 1);
        Ok(())
    }

    fn begin_fade(&self, _node: &(), _fade: Duration) {}

    fn detach(&self, _node: &()) -> bool {
        self.attached.set(self.attached.get() - 1);
        true
    }
}

struct Harness {
    client: StreamClient<FakeTransport>,
    clock: Rc<ManualScheduler>,
    shown: Rc<RecordingSink>,
    status: Rc<RecordingStatus>,
}

fn harness(with_status: bool) -> Harness {
    let clock = Rc::new(ManualScheduler::new());
    let scheduler: Rc<dyn Scheduler> = clock.clone();
    let shown = Rc::new(RecordingSink::default());
    let status = Rc::new(RecordingStatus::default());
    let status_handler = with_status.then(|| status.clone() as Rc<dyn StatusHandler>);
    let router = EventRouter::standard(shown.clone(), status_handler);
    let client = StreamClient::new(
        FakeTransport::default(),
        scheduler,
        router,
        &ClientConfig::default(),
    );
    Harness {
        client,
        clock,
        shown,
        status,
    }
}

#[test]
fn routes_named_events_to_handlers() {
    let h = harness(true);
    h.client.connect().expect("kết nối được");
    let sink = h.client.transport().latest();

    sink.event("connected", "");
    sink.event(
        "notification",
        r#"{"title":"Job done","message":"Export finished","type":"success"}"#,
    );
    sink.event("status_update", r#"{"job_id":7,"progress":40}"#);

    let shown = h.shown.shown.borrow();
    assert_eq!(shown.len(), 1);
    assert_eq!(shown[0].title, "Job done");
    assert_eq!(shown[0].severity, Severity::Success);
    assert_eq!(
        h.status.updates.borrow().as_slice(),
        &[json!({"job_id": 7, "progress": 40})]
    );
}

#[test]
fn error_notification_from_stream_is_forwarded() {
    let h = harness(false);
    h.client.connect().expect("kết nối được");
    h.client.transport().latest().event(
        "notification",
        r#"{"title":"Error","message":"Disk full","type":"error"}"#,
    );

    let shown = h.shown.shown.borrow();
    assert_eq!(shown[0].severity, Severity::Error);
    assert!(!shown[0].auto_dismisses());
}

#[test]
fn error_toast_from_stream_is_never_auto_removed() {
    let clock = Rc::new(ManualScheduler::new());
    let scheduler: Rc<dyn Scheduler> = clock.clone();
    let config = ClientConfig::default();
    let toaster = Toaster::new(
        CountingSurface::default(),
        Rc::clone(&scheduler),
        config.toast_timing(),
    );
    let router = EventRouter::standard(Rc::new(toaster.clone()), None);
    let client = StreamClient::new(FakeTransport::default(), scheduler, router, &config);

    client.connect().expect("kết nối được");
    let sink = client.transport().latest();
    sink.event(
        "notification",
        r#"{"title":"Error","message":"Disk full","type":"error"}"#,
    );
    sink.event(
        "notification",
        r#"{"title":"Job done","message":"Export finished","type":"success"}"#,
    );
    assert_eq!(toaster.live_count(), 2);

    clock.advance(Duration::from_secs(3_600));

    assert_eq!(toaster.live_count(), 1);
    assert_eq!(toaster.surface().attached.get(), 1);
    assert!(client.is_connected());
}

#[test]
fn malformed_payload_is_dropped_without_killing_the_stream() {
    let h = harness(true);
    h.client.connect().expect("kết nối được");
    let sink = h.client.transport().latest();

    sink.event("notification", "{not json");
    sink.event("status_update", "");
    sink.event("notification", r#"{"title":"ok","message":"still alive"}"#);

    assert!(h.client.is_connected());
    assert_eq!(h.shown.shown.borrow().len(), 1);
    assert!(h.status.updates.borrow().is_empty());
    assert_eq!(h.client.transport().opened(), 1);
}

#[test]
fn status_update_without_handler_is_ignored() {
    let h = harness(false);
    h.client.connect().expect("kết nối được");
    h.client
        .transport()
        .latest()
        .event("status_update", r#"{"progress":10}"#);
    assert!(h.status.updates.borrow().is_empty());
}

#[test]
fn transport_error_reconnects_once_after_delay() {
    let h = harness(false);
    h.client.connect().expect("kết nối được");
    let sink = h.client.transport().latest();

    sink.error();
    sink.error();
    assert!(!h.client.is_connected());
    assert!(h.client.reconnect_pending());
    assert_eq!(h.clock.pending(), 1);

    h.clock.advance_ms(4_999);
    assert_eq!(h.client.transport().opened(), 1);

    h.clock.advance_ms(1);
    assert_eq!(h.client.transport().opened(), 2);
    assert_eq!(h.client.transport().log(), ["open#1", "close#1", "open#2"]);
    assert_eq!(h.client.transport().max_live.get(), 1);
    assert!(!h.client.reconnect_pending());
}

#[test]
fn reconnect_loop_repeats_without_backoff() {
    let h = harness(false);
    h.client.connect().expect("kết nối được");

    for round in 1..=3 {
        h.client.transport().latest().error();
        h.clock.advance_ms(5_000);
        assert_eq!(h.client.transport().opened(), round + 1);
    }
    assert_eq!(h.client.attempts(), 4);
}

#[test]
fn connecting_again_closes_the_previous_handle_first() {
    let h = harness(false);
    h.client.connect().expect("kết nối được");
    h.client.connect().expect("kết nối được");

    assert_eq!(h.client.transport().log(), ["open#1", "close#1", "open#2"]);
    assert_eq!(h.client.transport().max_live.get(), 1);
}

#[test]
fn signals_from_a_replaced_handle_are_ignored() {
    let h = harness(false);
    h.client.connect().expect("kết nối được");
    let stale = h.client.transport().sink(0);
    h.client.connect().expect("kết nối được");

    stale.event("notification", r#"{"title":"late","message":"m"}"#);
    stale.error();

    assert!(h.shown.shown.borrow().is_empty());
    assert!(h.client.is_connected());
    assert!(!h.client.reconnect_pending());
}

#[test]
fn disconnect_stops_the_reconnect_loop() {
    let h = harness(false);
    h.client.connect().expect("kết nối được");
    h.client.transport().latest().error();
    assert!(h.client.reconnect_pending());

    h.client.disconnect();
    h.clock.advance_ms(60_000);

    assert_eq!(h.client.transport().opened(), 1);
    assert!(!h.client.is_connected());
    assert_eq!(h.clock.pending(), 0);
}

#[test]
fn refused_open_is_retried_after_delay() {
    let h = harness(false);
    h.client.transport().refuse_next.set(true);

    assert!(h.client.connect().is_err());
    assert!(h.client.reconnect_pending());

    h.clock.advance_ms(5_000);
    assert!(h.client.is_connected());
    assert_eq!(h.client.transport().log(), ["refused", "open#1"]);
}

#[test]
fn unnamed_envelope_frames_are_unwrapped() {
    let h = harness(true);
    h.client.connect().expect("kết nối được");
    let sink = h.client.transport().latest();

    sink.event(
        "message",
        r#"{"type":"connected","data":"Connection established"}"#,
    );
    sink.event(
        "message",
        r#"{"type":"status_update","data":{"job":"sync","state":"running"}}"#,
    );
    sink.event("message", r#"{"type":"ping","data":""}"#);

    assert_eq!(
        h.status.updates.borrow().as_slice(),
        &[json!({"job": "sync", "state": "running"})]
    );
}
