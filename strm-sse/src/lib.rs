//! `text/event-stream` decoding for the notification channel.
//!
//! The browser's `EventSource` does this framing natively; this crate exists so captured
//! streams can be replayed through the same decoding path on the host.

use std::mem;

mod replay;

pub use replay::{replay_str, ReplayEntry, ReplayReport};

/// Event name used by frames without an `event:` field.
pub const DEFAULT_EVENT: &str = "message";

/// One dispatched event from the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub event: String,
    pub data: String,
    pub id: Option<String>,
    pub retry: Option<u32>,
}

/// Incremental frame parser. Chunks may split lines anywhere, including between `\r` and `\n`.
#[derive(Debug, Default)]
pub struct FrameParser {
    line: String,
    after_cr: bool,
    started: bool,
    event: Option<String>,
    data: String,
    has_data: bool,
    last_id: Option<String>,
    retry: Option<u32>,
    comments: usize,
}

impl FrameParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of comment lines seen so far (`: ping`, `: keep-alive`).
    pub fn comments(&self) -> usize {
        self.comments
    }

    /// True when a partial frame is buffered. It is discarded if the stream ends here.
    pub fn has_pending(&self) -> bool {
        !self.line.is_empty() || self.has_data || self.event.is_some()
    }

    pub fn feed(&mut self, chunk: &str) -> Vec<Frame> {
        let mut frames = Vec::new();
        let mut chars = chunk.chars().peekable();

        if !self.started {
            if chars.peek() == Some(&'\u{feff}') {
                chars.next();
            }
            self.started = chars.peek().is_some();
        }

        for ch in chars {
            match ch {
                '\n' if self.after_cr => self.after_cr = false,
                '\n' | '\r' => {
                    self.after_cr = ch == '\r';
                    let line = mem::take(&mut self.line);
                    if let Some(frame) = self.process_line(&line) {
                        frames.push(frame);
                    }
                }
                _ => {
                    self.after_cr = false;
                    self.line.push(ch);
                }
            }
        }

        frames
    }

    fn process_line(&mut self, line: &str) -> Option<Frame> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            self.comments += 1;
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        match field {
            "event" => self.event = Some(value.to_string()),
            "data" => {
                self.data.push_str(value);
                self.data.push('\n');
                self.has_data = true;
            }
            "id" if !value.contains('\0') => self.last_id = Some(value.to_string()),
            "retry" if !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()) => {
                match value.parse() {
                    Ok(retry) => self.retry = Some(retry),
                    Err(_) => log::debug!("Ignoring out-of-range retry value {value}"),
                }
            }
            _ => log::debug!("Ignoring unknown field {field:?}"),
        }
        None
    }

    fn dispatch(&mut self) -> Option<Frame> {
        let event = self.event.take();
        if !mem::take(&mut self.has_data) {
            return None;
        }

        let mut data = mem::take(&mut self.data);
        if data.ends_with('\n') {
            data.pop();
        }

        Some(Frame {
            event: event
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| DEFAULT_EVENT.to_string()),
            data,
            id: self.last_id.clone(),
            retry: self.retry,
        })
    }
}

/// Parse a complete capture. A trailing frame without its blank line is dropped.
pub fn parse_frames(text: &str) -> Vec<Frame> {
    FrameParser::new().feed(text)
}
