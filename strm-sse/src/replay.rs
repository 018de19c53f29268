use serde::Serialize;
use strm_core::StreamEvent;

use crate::FrameParser;

/// What the client would do with one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ReplayEntry {
    Decoded { event: String, decoded: StreamEvent },
    Ignored { event: String },
    Rejected { event: String, reason: String },
}

impl ReplayEntry {
    pub fn event(&self) -> &str {
        match self {
            ReplayEntry::Decoded { event, .. }
            | ReplayEntry::Ignored { event }
            | ReplayEntry::Rejected { event, .. } => event,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReplayReport {
    pub entries: Vec<ReplayEntry>,
    /// Comment lines the server sent to keep the connection open.
    pub keepalives: usize,
    /// The capture ended in the middle of a frame.
    pub truncated: bool,
}

impl ReplayReport {
    pub fn decoded(&self) -> impl Iterator<Item = &StreamEvent> {
        self.entries.iter().filter_map(|entry| match entry {
            ReplayEntry::Decoded { decoded, .. } => Some(decoded),
            _ => None,
        })
    }

    pub fn rejected(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| matches!(entry, ReplayEntry::Rejected { .. }))
            .count()
    }
}

/// Decode a captured stream exactly as the browser client would dispatch it.
pub fn replay_str(text: &str) -> ReplayReport {
    let mut parser = FrameParser::new();
    let frames = parser.feed(text);

    let entries = frames
        .into_iter()
        .map(|frame| match StreamEvent::decode(&frame.event, &frame.data) {
            Ok(Some(decoded)) => ReplayEntry::Decoded {
                event: frame.event,
                decoded,
            },
            Ok(None) => ReplayEntry::Ignored { event: frame.event },
            Err(err) => ReplayEntry::Rejected {
                event: frame.event,
                reason: err.to_string(),
            },
        })
        .collect();

    ReplayReport {
        entries,
        keepalives: parser.comments(),
        truncated: parser.has_pending(),
    }
}
