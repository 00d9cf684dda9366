//! STOMP 1.2 frame codec.
//!
//! A frame is a command line, `key:value` header lines, a blank line, the
//! body and a NUL byte. Lines end in LF or CRLF. A bare EOL between frames is
//! a heart-beat. When `content-length` is present exactly that many body
//! bytes are read (the body may then contain NUL); otherwise the body runs to
//! the first NUL.
//!
//! Header names and values are escaped (`\\`, `\n`, `\r`, `\c`) in every
//! frame except `CONNECT` and `CONNECTED`.

use std::fmt;

use thiserror::Error;

/// Upper bound for one buffered frame.
pub const MAX_FRAME_BYTES: usize = 1024 * 1024;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FrameError {
    #[error("unknown STOMP command: {0:?}")]
    UnknownCommand(String),
    #[error("malformed header line: {0:?}")]
    MalformedHeader(String),
    #[error("invalid escape sequence in header: {0:?}")]
    InvalidEscape(String),
    #[error("invalid content-length: {0:?}")]
    InvalidContentLength(String),
    #[error("frame body is not terminated by NUL")]
    MissingNul,
    #[error("frame exceeds {limit} bytes")]
    TooLarge { limit: usize },
    #[error("frame header is not valid UTF-8")]
    InvalidUtf8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Connect,
    Connected,
    Subscribe,
    Unsubscribe,
    Send,
    Message,
    Receipt,
    Error,
    Disconnect,
}

impl Command {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Connect => "CONNECT",
            Self::Connected => "CONNECTED",
            Self::Subscribe => "SUBSCRIBE",
            Self::Unsubscribe => "UNSUBSCRIBE",
            Self::Send => "SEND",
            Self::Message => "MESSAGE",
            Self::Receipt => "RECEIPT",
            Self::Error => "ERROR",
            Self::Disconnect => "DISCONNECT",
        }
    }

    fn parse(line: &str) -> Result<Self, FrameError> {
        Ok(match line {
            "CONNECT" => Self::Connect,
            "CONNECTED" => Self::Connected,
            "SUBSCRIBE" => Self::Subscribe,
            "UNSUBSCRIBE" => Self::Unsubscribe,
            "SEND" => Self::Send,
            "MESSAGE" => Self::Message,
            "RECEIPT" => Self::Receipt,
            "ERROR" => Self::Error,
            "DISCONNECT" => Self::Disconnect,
            other => return Err(FrameError::UnknownCommand(other.to_string())),
        })
    }

    /// `CONNECT`/`CONNECTED` headers are sent verbatim.
    const fn escapes_headers(self) -> bool {
        !matches!(self, Self::Connect | Self::Connected)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct Frame {
    pub command: Command,
    headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Header values can carry the bearer token.
        let names: Vec<&str> = self.headers.iter().map(|(k, _)| k.as_str()).collect();
        f.debug_struct("Frame")
            .field("command", &self.command)
            .field("headers", &names)
            .field("body_len", &self.body.len())
            .finish()
    }
}

impl Frame {
    #[must_use]
    pub fn new(command: Command) -> Self {
        Self {
            command,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// First value of `name`; repeated headers keep the first occurrence.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    #[must_use]
    pub fn body_text(&self) -> Option<&str> {
        std::str::from_utf8(&self.body).ok()
    }

    /// Serialize with a `content-length` header for non-empty bodies.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let escape = self.command.escapes_headers();
        let mut out = Vec::with_capacity(64 + self.body.len());
        out.extend_from_slice(self.command.as_str().as_bytes());
        out.push(b'\n');
        for (name, value) in &self.headers {
            push_header_part(&mut out, name, escape);
            out.push(b':');
            push_header_part(&mut out, value, escape);
            out.push(b'\n');
        }
        if !self.body.is_empty() && self.get("content-length").is_none() {
            out.extend_from_slice(format!("content-length:{}\n", self.body.len()).as_bytes());
        }
        out.push(b'\n');
        out.extend_from_slice(&self.body);
        out.push(0);
        out
    }
}

fn push_header_part(out: &mut Vec<u8>, raw: &str, escape: bool) {
    if !escape {
        out.extend_from_slice(raw.as_bytes());
        return;
    }
    for ch in raw.chars() {
        match ch {
            '\\' => out.extend_from_slice(b"\\\\"),
            '\n' => out.extend_from_slice(b"\\n"),
            '\r' => out.extend_from_slice(b"\\r"),
            ':' => out.extend_from_slice(b"\\c"),
            c => {
                let mut buf = [0u8; 4];
                out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            }
        }
    }
}

fn unescape(raw: &str) -> Result<String, FrameError> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('c') => out.push(':'),
            _ => return Err(FrameError::InvalidEscape(raw.to_string())),
        }
    }
    Ok(out)
}

/// Output of [`FrameDecoder::next_frame`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Incoming {
    Heartbeat,
    Frame(Frame),
}

/// Incremental decoder over a byte buffer that may hold partial or several
/// frames.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buf: Vec<u8>,
}

impl FrameDecoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Next complete frame or heart-beat, `None` when more bytes are needed.
    ///
    /// On error the buffer is discarded; the stream cannot be resynchronized.
    pub fn next_frame(&mut self) -> Result<Option<Incoming>, FrameError> {
        let result = self.decode();
        if result.is_err() {
            self.buf.clear();
        }
        result
    }

    fn decode(&mut self) -> Result<Option<Incoming>, FrameError> {
        if self.buf.starts_with(b"\n") {
            self.buf.drain(..1);
            return Ok(Some(Incoming::Heartbeat));
        }
        if self.buf.starts_with(b"\r\n") {
            self.buf.drain(..2);
            return Ok(Some(Incoming::Heartbeat));
        }
        if self.buf.is_empty() || self.buf == b"\r" {
            return Ok(None);
        }

        let Some((command, headers, body_start)) = self.parse_head()? else {
            if self.buf.len() > MAX_FRAME_BYTES {
                return Err(FrameError::TooLarge {
                    limit: MAX_FRAME_BYTES,
                });
            }
            return Ok(None);
        };

        let content_length = headers
            .iter()
            .find(|(k, _)| k == "content-length")
            .map(|(_, v)| {
                v.trim()
                    .parse::<usize>()
                    .map_err(|_| FrameError::InvalidContentLength(v.clone()))
            })
            .transpose()?;

        let (body_end, frame_end) = match content_length {
            Some(len) => {
                if len > MAX_FRAME_BYTES {
                    return Err(FrameError::TooLarge {
                        limit: MAX_FRAME_BYTES,
                    });
                }
                let end = body_start + len;
                if self.buf.len() <= end {
                    return Ok(None);
                }
                if self.buf[end] != 0 {
                    return Err(FrameError::MissingNul);
                }
                (end, end + 1)
            }
            None => match self.buf[body_start..].iter().position(|b| *b == 0) {
                Some(pos) => (body_start + pos, body_start + pos + 1),
                None if self.buf.len() > MAX_FRAME_BYTES => {
                    return Err(FrameError::TooLarge {
                        limit: MAX_FRAME_BYTES,
                    });
                }
                None => return Ok(None),
            },
        };

        let body = self.buf[body_start..body_end].to_vec();
        self.buf.drain(..frame_end);
        Ok(Some(Incoming::Frame(Frame {
            command,
            headers,
            body,
        })))
    }

    /// Command, headers and body offset once the blank line has arrived.
    #[allow(clippy::type_complexity)]
    fn parse_head(&self) -> Result<Option<(Command, Vec<(String, String)>, usize)>, FrameError> {
        let mut pos = 0;
        let mut command = None;
        let mut headers = Vec::new();

        while let Some(rel) = self.buf[pos..].iter().position(|b| *b == b'\n') {
            let raw = &self.buf[pos..pos + rel];
            let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
            let line = std::str::from_utf8(raw).map_err(|_| FrameError::InvalidUtf8)?;
            pos += rel + 1;

            let Some(cmd) = command else {
                command = Some(Command::parse(line)?);
                continue;
            };
            if line.is_empty() {
                return Ok(Some((cmd, headers, pos)));
            }
            let (name, value) = line
                .split_once(':')
                .ok_or_else(|| FrameError::MalformedHeader(line.to_string()))?;
            if cmd.escapes_headers() {
                headers.push((unescape(name)?, unescape(value)?));
            } else {
                headers.push((name.to_string(), value.to_string()));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn decode_one(bytes: &[u8]) -> Incoming {
        let mut decoder = FrameDecoder::new();
        decoder.push(bytes);
        decoder.next_frame().unwrap().unwrap()
    }

    #[test]
    fn encodes_send_with_content_length() {
        let frame = Frame::new(Command::Send)
            .header("destination", "/app/chat")
            .header("content-type", "application/json")
            .body(r#"{"a":1}"#);
        assert_eq!(
            String::from_utf8(frame.encode()).unwrap(),
            "SEND\ndestination:/app/chat\ncontent-type:application/json\ncontent-length:7\n\n{\"a\":1}\0"
        );
    }

    #[test]
    fn connect_headers_are_not_escaped() {
        let frame = Frame::new(Command::Connect).header("host", "localhost:8080");
        assert_eq!(
            String::from_utf8(frame.encode()).unwrap(),
            "CONNECT\nhost:localhost:8080\n\n\0"
        );
    }

    #[test]
    fn message_headers_are_escaped_and_unescaped() {
        let frame = Frame::new(Command::Message).header("note", "a:b\\c\nd");
        let encoded = frame.encode();
        assert!(String::from_utf8_lossy(&encoded).contains("note:a\\cb\\\\c\\nd"));
        assert_eq!(decode_one(&encoded), Incoming::Frame(frame));
    }

    #[test]
    fn decodes_message_with_crlf_lines() {
        let Incoming::Frame(frame) = decode_one(
            b"MESSAGE\r\ndestination:/user/queue/messages\r\nsubscription:sub-0\r\n\r\n{}\0",
        ) else {
            panic!("expected frame");
        };
        assert_eq!(frame.command, Command::Message);
        assert_eq!(frame.get("destination"), Some("/user/queue/messages"));
        assert_eq!(frame.body_text(), Some("{}"));
    }

    #[test]
    fn content_length_allows_nul_in_body() {
        let Incoming::Frame(frame) = decode_one(b"MESSAGE\ncontent-length:3\n\na\0b\0") else {
            panic!("expected frame");
        };
        assert_eq!(frame.body, b"a\0b");
    }

    #[test]
    fn repeated_header_keeps_first_value() {
        let Incoming::Frame(frame) = decode_one(b"MESSAGE\nfoo:1\nfoo:2\n\n\0") else {
            panic!("expected frame");
        };
        assert_eq!(frame.get("foo"), Some("1"));
    }

    #[test]
    fn heartbeats_and_split_frames() {
        let mut decoder = FrameDecoder::new();
        decoder.push(b"\n\r\nCONNECTED\nversion:1.2\nheart-");
        assert_eq!(decoder.next_frame().unwrap(), Some(Incoming::Heartbeat));
        assert_eq!(decoder.next_frame().unwrap(), Some(Incoming::Heartbeat));
        assert_eq!(decoder.next_frame().unwrap(), None);

        decoder.push(b"beat:10000,10000\n\n\0\n");
        let Some(Incoming::Frame(frame)) = decoder.next_frame().unwrap() else {
            panic!("expected frame");
        };
        assert_eq!(frame.command, Command::Connected);
        assert_eq!(frame.get("heart-beat"), Some("10000,10000"));
        assert_eq!(decoder.next_frame().unwrap(), Some(Incoming::Heartbeat));
        assert!(decoder.is_empty());
    }

    #[test]
    fn several_frames_in_one_push() {
        let mut decoder = FrameDecoder::new();
        decoder.push(b"RECEIPT\nreceipt-id:1\n\n\0RECEIPT\nreceipt-id:2\n\n\0");
        for id in ["1", "2"] {
            let Some(Incoming::Frame(frame)) = decoder.next_frame().unwrap() else {
                panic!("expected frame");
            };
            assert_eq!(frame.get("receipt-id"), Some(id));
        }
        assert_eq!(decoder.next_frame().unwrap(), None);
    }

    #[test]
    fn rejects_bad_input() {
        let mut decoder = FrameDecoder::new();
        decoder.push(b"HELLO\n\n\0");
        assert_eq!(
            decoder.next_frame(),
            Err(FrameError::UnknownCommand("HELLO".into()))
        );
        assert!(decoder.is_empty());

        decoder.push(b"MESSAGE\nbad\\x:1\n\n\0");
        assert!(matches!(decoder.next_frame(), Err(FrameError::InvalidEscape(_))));

        decoder.push(b"MESSAGE\nno-colon\n\n\0");
        assert!(matches!(decoder.next_frame(), Err(FrameError::MalformedHeader(_))));

        decoder.push(b"MESSAGE\ncontent-length:1\n\nab");
        assert_eq!(decoder.next_frame(), Err(FrameError::MissingNul));
    }

    #[test]
    fn debug_hides_header_values() {
        let frame = Frame::new(Command::Connect).header("Authorization", "Bearer secret");
        let debug = format!("{frame:?}");
        assert!(debug.contains("Authorization"));
        assert!(!debug.contains("secret"));
    }
}
