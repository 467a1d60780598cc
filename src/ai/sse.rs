//! Server-sent events parsing for streamed chat completions
//!
//! Bytes arrive in arbitrary chunks. Lines end with `\n` or `\r\n`; a blank
//! line dispatches the event built so far. Multiple `data:` lines join with
//! `\n`, lines starting with `:` are comments, and a `data: [DONE]` payload
//! ends the stream.

use serde_json::Value;

/// Payload that terminates an OpenAI-style stream
pub const DONE_MARKER: &str = "[DONE]";

/// One dispatched event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseEvent {
    Message {
        /// The `event:` field, if any
        event: Option<String>,
        data: String,
    },
    Done,
}

/// Incremental SSE parser
#[derive(Debug, Default)]
pub struct SseParser {
    buffer: Vec<u8>,
    event: Option<String>,
    data: Vec<String>,
    done: bool,
}

impl SseParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `[DONE]` has been seen
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Feed a chunk and return the events it completed
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<SseEvent> {
        self.buffer.extend_from_slice(chunk);
        let mut events = Vec::new();

        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let mut line: Vec<u8> = self.buffer.drain(..=pos).collect();
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            let line = String::from_utf8_lossy(&line).into_owned();
            if let Some(event) = self.process_line(&line) {
                events.push(event);
            }
        }
        events
    }

    /// Flush a trailing event that was not followed by a blank line
    pub fn finish(&mut self) -> Vec<SseEvent> {
        let mut events = Vec::new();
        if !self.buffer.is_empty() {
            let line = String::from_utf8_lossy(&std::mem::take(&mut self.buffer)).into_owned();
            let line = line.trim_end_matches('\r').to_string();
            if let Some(event) = self.process_line(&line) {
                events.push(event);
            }
        }
        if let Some(event) = self.dispatch() {
            events.push(event);
        }
        events
    }

    fn process_line(&mut self, line: &str) -> Option<SseEvent> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        match field {
            "data" => self.data.push(value.to_string()),
            "event" => self.event = Some(value.to_string()),
            // id and retry carry nothing a completion stream needs
            _ => {}
        }
        None
    }

    fn dispatch(&mut self) -> Option<SseEvent> {
        let event = self.event.take();
        if self.data.is_empty() {
            return None;
        }
        let data = std::mem::take(&mut self.data).join("\n");
        if data.trim() == DONE_MARKER {
            self.done = true;
            return Some(SseEvent::Done);
        }
        Some(SseEvent::Message { event, data })
    }
}

/// Text delta of a streamed chat completion chunk
///
/// Reads `choices[0].delta.content`; returns None for role-only or
/// malformed chunks.
pub fn extract_delta(data: &str) -> Option<String> {
    let value: Value = serde_json::from_str(data).ok()?;
    value
        .pointer("/choices/0/delta/content")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(data: &str) -> SseEvent {
        SseEvent::Message {
            event: None,
            data: data.to_string(),
        }
    }

    #[test]
    fn test_events_split_across_chunks() {
        let mut parser = SseParser::new();
        assert!(parser.feed(b"data: {\"a\"").is_empty());
        assert!(parser.feed(b":1}\n").is_empty());
        let events = parser.feed(b"\ndata: second\n\n");
        assert_eq!(events, vec![message("{\"a\":1}"), message("second")]);
    }

    #[test]
    fn test_multiline_data_and_crlf() {
        let mut parser = SseParser::new();
        let events = parser.feed(b"event: note\r\ndata: one\r\ndata: two\r\n\r\n");
        assert_eq!(
            events,
            vec![SseEvent::Message {
                event: Some("note".into()),
                data: "one\ntwo".into()
            }]
        );
    }

    #[test]
    fn test_comments_and_done() {
        let mut parser = SseParser::new();
        let events = parser.feed(b": keep-alive\n\ndata: hi\n\ndata: [DONE]\n\n");
        assert_eq!(events, vec![message("hi"), SseEvent::Done]);
        assert!(parser.is_done());
    }

    #[test]
    fn test_finish_flushes_unterminated_event() {
        let mut parser = SseParser::new();
        assert!(parser.feed(b"data: tail").is_empty());
        assert_eq!(parser.finish(), vec![message("tail")]);
        assert!(parser.finish().is_empty());
    }

    #[test]
    fn test_utf8_split_between_chunks() {
        let mut parser = SseParser::new();
        let bytes = "data: café\n\n".as_bytes();
        let (a, b) = bytes.split_at(10);
        let mut events = parser.feed(a);
        events.extend(parser.feed(b));
        assert_eq!(events, vec![message("café")]);
    }

    #[test]
    fn test_extract_delta() {
        let chunk = r#"{"choices":[{"delta":{"content":"Hel"}}]}"#;
        assert_eq!(extract_delta(chunk), Some("Hel".into()));
        assert_eq!(extract_delta(r#"{"choices":[{"delta":{"role":"assistant"}}]}"#), None);
        assert_eq!(extract_delta("not json"), None);
    }
}
