#![cfg(target_arch = "wasm32")]

use std::iter;

use strm_core::{ClientError, Connection, EventKind, EventSink, Transport};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{Event, EventSource, MessageEvent};

use crate::dom::describe_js;

/// Frame không có dòng `event:` tới dưới tên này.
const UNNAMED_EVENT: &str = "message";

/// Mở `EventSource` thật của trình duyệt.
#[derive(Debug, Default, Clone, Copy)]
pub struct EventSourceTransport;

pub struct EventSourceConnection {
    source: EventSource,
    _listeners: Vec<Closure<dyn FnMut(MessageEvent)>>,
    _on_error: Closure<dyn FnMut(Event)>,
}

impl Connection for EventSourceConnection {
    fn close(&mut self) {
        self.source.set_onerror(None);
        self.source.close();
    }
}

impl Transport for EventSourceTransport {
    type Connection = EventSourceConnection;

    fn open(&self, endpoint: &str, sink: EventSink) -> Result<EventSourceConnection, ClientError> {
        let source = EventSource::new(endpoint)
            .map_err(|err| ClientError::Transport(describe_js(&err)))?;

        let names =
            iter::once(UNNAMED_EVENT).chain(EventKind::ALL.into_iter().map(EventKind::as_str));
        let mut listeners = Vec::new();
        for name in names {
            let sink = sink.clone();
            let listener = Closure::<dyn FnMut(MessageEvent)>::new(move |event: MessageEvent| {
                let data = event.data().as_string().unwrap_or_default();
                sink.event(name, &data);
            });
            if let Err(err) =
                source.add_event_listener_with_callback(name, listener.as_ref().unchecked_ref())
            {
                source.close();
                return Err(ClientError::Transport(describe_js(&err)));
            }
            listeners.push(listener);
        }

        let on_error = Closure::<dyn FnMut(Event)>::new(move |_event: Event| sink.error());
        source.set_onerror(Some(on_error.as_ref().unchecked_ref()));

        Ok(EventSourceConnection {
            source,
            _listeners: listeners,
            _on_error: on_error,
        })
    }
}
