use strm_sse::{parse_frames, Frame, FrameParser, DEFAULT_EVENT};

fn frame(event: &str, data: &str) -> Frame {
    Frame {
        event: event.to_string(),
        data: data.to_string(),
        id: None,
        retry: None,
    }
}

#[test]
fn named_and_unnamed_frames() {
    let frames = parse_frames("data: hello\n\nevent: notification\ndata: {}\n\n");
    assert_eq!(
        frames,
        vec![frame(DEFAULT_EVENT, "hello"), frame("notification", "{}")]
    );
}

#[test]
fn multi_line_data_is_joined_with_newlines() {
    let frames = parse_frames("data: a\ndata:b\ndata:  c\n\n");
    assert_eq!(frames, vec![frame(DEFAULT_EVENT, "a\nb\n c")]);
}

#[test]
fn comments_are_counted_but_not_dispatched() {
    let mut parser = FrameParser::new();
    let frames = parser.feed(": ping\n\n: keep-alive\n\n");
    assert!(frames.is_empty());
    assert_eq!(parser.comments(), 2);
}

#[test]
fn frame_without_data_resets_event_name() {
    let frames = parse_frames("event: notification\n\ndata: x\n\n");
    assert_eq!(frames, vec![frame(DEFAULT_EVENT, "x")]);
}

#[test]
fn chunks_may_split_lines_and_crlf() {
    let mut parser = FrameParser::new();
    let mut frames = parser.feed("event: status_up");
    frames.extend(parser.feed("date\r"));
    frames.extend(parser.feed("\ndata: {\"p\":1}\r\n\r"));
    frames.extend(parser.feed("\n"));
    assert_eq!(frames, vec![frame("status_update", "{\"p\":1}")]);
    assert!(!parser.has_pending());
}

#[test]
fn bare_carriage_returns_end_lines() {
    let frames = parse_frames("data: one\r\rdata: two\r\r");
    assert_eq!(
        frames,
        vec![frame(DEFAULT_EVENT, "one"), frame(DEFAULT_EVENT, "two")]
    );
}

#[test]
fn leading_bom_is_stripped_once() {
    let frames = parse_frames("\u{feff}data: x\n\n");
    assert_eq!(frames, vec![frame(DEFAULT_EVENT, "x")]);
}

#[test]
fn id_persists_and_retry_accepts_digits_only() {
    let frames = parse_frames("id: 7\nretry: 2500\ndata: a\n\nretry: soon\ndata: b\n\n");
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0].id.as_deref(), Some("7"));
    assert_eq!(frames[0].retry, Some(2500));
    assert_eq!(frames[1].id.as_deref(), Some("7"));
    assert_eq!(frames[1].retry, Some(2500));
}

#[test]
fn unterminated_frame_is_reported_as_pending() {
    let mut parser = FrameParser::new();
    assert!(parser.feed("event: notification\ndata: {}").is_empty());
    assert!(parser.has_pending());
}
