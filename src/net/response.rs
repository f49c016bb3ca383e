//! Response wrapper with lazy, at-most-once body buffering.
//!
//! A [`Response`] is built right after the transport returns. It keeps the
//! status line and headers as received and holds the body stream **unread**.
//! The first call to [`Response::body_bytes`] drains the stream into an owned
//! buffer and drops the stream; every later read is served from that buffer.
//!
//! ## Notes
//! - The media type is parsed from `Content-Type` once, on first use, and is an
//!   empty string when the header is absent or malformed.
//! - Text conversion does no charset detection; invalid UTF-8 is replaced
//!   lossily.
//! - If draining fails halfway, the bytes read so far are kept and the stream
//!   stays in place. Retrying continues from where the stream stopped instead
//!   of reading it from the start again.

use std::cell::OnceCell;
use std::collections::HashSet;
use std::fmt;
use std::io::{Cursor, Read};

use http::header::CONTENT_TYPE;
use http::{HeaderMap, StatusCode, Version};

use crate::errors::{Error, Result};
use crate::net::transport::RawResponse;

pub const MEDIA_TYPE_JSON: &str = "application/json";
pub const MEDIA_TYPE_XML: &str = "application/xml";
pub const MEDIA_TYPE_TEXT_XML: &str = "text/xml";

enum BodyState {
    /// Stream not (fully) drained yet; `partial` holds what an interrupted read left behind.
    Pending {
        stream: Box<dyn Read + Send>,
        partial: Vec<u8>,
    },
    Buffered(Vec<u8>),
}

impl fmt::Debug for BodyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BodyState::Pending { partial, .. } => {
                f.debug_struct("Pending").field("partial", &partial.len()).finish()
            }
            BodyState::Buffered(bytes) => f.debug_tuple("Buffered").field(&bytes.len()).finish(),
        }
    }
}

/// HTTP response as handed to `after` hooks and returned to the caller.
#[derive(Debug)]
pub struct Response {
    head: http::response::Parts,
    body: BodyState,
    media_type: OnceCell<String>,
}

impl Response {
    /// Wraps a raw transport response. The body is not touched.
    pub fn new(raw: RawResponse) -> Self {
        let (head, stream) = raw.into_parts();
        Self {
            head,
            body: BodyState::Pending {
                stream,
                partial: Vec::new(),
            },
            media_type: OnceCell::new(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.head.status
    }

    pub fn version(&self) -> Version {
        self.head.version
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.head.headers
    }

    /// Returns the first value of header `name` if present and valid text.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.head.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Lower-cased `type/subtype` from the `Content-Type` header, without parameters.
    ///
    /// Never fails: an absent or malformed header yields `""`.
    pub fn media_type(&self) -> &str {
        self.media_type.get_or_init(|| {
            self.head
                .headers
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .and_then(parse_media_type)
                .unwrap_or_default()
        })
    }

    pub fn is_json(&self) -> bool {
        self.media_type() == MEDIA_TYPE_JSON
    }

    pub fn is_xml(&self) -> bool {
        matches!(self.media_type(), MEDIA_TYPE_TEXT_XML | MEDIA_TYPE_XML)
    }

    /// Returns the full body, draining the transport stream on the first call.
    ///
    /// Later calls return the cached bytes without touching the stream. A read
    /// error is returned as-is and nothing is cached.
    pub fn body_bytes(&mut self) -> Result<&[u8]> {
        if let BodyState::Pending { stream, partial } = &mut self.body {
            stream.read_to_end(partial).map_err(Error::BodyRead)?;
            let bytes = std::mem::take(partial);
            // Dropping the pending state releases the stream.
            self.body = BodyState::Buffered(bytes);
            log::trace!("buffered response body");
        }

        match &self.body {
            BodyState::Buffered(bytes) => Ok(bytes.as_slice()),
            BodyState::Pending { .. } => unreachable!("body is buffered above"),
        }
    }

    /// Body as text, converted byte-for-byte (lossy on invalid UTF-8).
    pub fn body_string(&mut self) -> Result<String> {
        let bytes = self.body_bytes()?;
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }

    /// A fresh reader over the buffered body. Can be called any number of times.
    pub fn body(&mut self) -> Result<Cursor<&[u8]>> {
        Ok(Cursor::new(self.body_bytes()?))
    }
}

// ---------- Media type parsing ----------
//
// Hand-rolled on purpose instead of `mime::Mime`. The accepted grammar is the
// lenient one callers rely on: a bare type without subtype passes, a trailing
// `;` passes, and a repeated parameter name rejects the whole value.

fn is_tchar(c: char) -> bool {
    c.is_ascii_alphanumeric() || "!#$%&'*+-.^_`|~".contains(c)
}

fn is_token(s: &str) -> bool {
    !s.is_empty() && s.chars().all(is_tchar)
}

/// Splits a leading token off `s`.
fn take_token(s: &str) -> Option<(&str, &str)> {
    let end = s.find(|c: char| !is_tchar(c)).unwrap_or(s.len());
    if end == 0 {
        return None;
    }
    Some(s.split_at(end))
}

/// Consumes a parameter value (token or quoted-string) and returns the remainder.
fn skip_value(s: &str) -> Option<&str> {
    let Some(quoted) = s.strip_prefix('"') else {
        return take_token(s).map(|(_, rest)| rest);
    };

    let mut escaped = false;
    for (i, c) in quoted.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '"' => return Some(&quoted[i + 1..]),
            _ => {}
        }
    }
    None
}

/// Parses a `Content-Type` value into its lower-cased media type.
///
/// Returns `None` when the type, the subtype or any parameter is malformed,
/// or when a parameter name is repeated.
pub(crate) fn parse_media_type(value: &str) -> Option<String> {
    let (essence, mut rest) = value.split_at(value.find(';').unwrap_or(value.len()));

    let essence = essence.trim().to_ascii_lowercase();
    let valid = match essence.split_once('/') {
        Some((main, sub)) => is_token(main) && is_token(sub),
        None => is_token(&essence),
    };
    if !valid {
        return None;
    }

    let mut seen = HashSet::new();
    loop {
        rest = rest.trim_start();
        if rest.trim_end().is_empty() || rest.trim_end() == ";" {
            break;
        }
        rest = rest.strip_prefix(';')?.trim_start();

        let (name, after) = take_token(rest)?;
        let after = after.trim_start().strip_prefix('=')?.trim_start();
        rest = skip_value(after)?;

        if !seen.insert(name.to_ascii_lowercase()) {
            return None;
        }
    }

    Some(essence)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    /// Stream that hands out its data once and panics if drained a second time.
    struct OnceStream {
        data: Cursor<Vec<u8>>,
        exhausted: bool,
    }

    impl Read for OnceStream {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            assert!(!self.exhausted, "stream read after it was drained");
            let n = self.data.read(buf)?;
            if n == 0 {
                self.exhausted = true;
            }
            Ok(n)
        }
    }

    /// Stream that fails once after emitting a prefix, then yields the rest.
    struct FlakyStream {
        chunks: Vec<io::Result<Vec<u8>>>,
    }

    impl Read for FlakyStream {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.chunks.is_empty() {
                return Ok(0);
            }
            match self.chunks.remove(0) {
                Ok(chunk) => {
                    buf[..chunk.len()].copy_from_slice(&chunk);
                    Ok(chunk.len())
                }
                Err(e) => Err(e),
            }
        }
    }

    fn response(content_type: Option<&str>, stream: impl Read + Send + 'static) -> Response {
        let mut builder = http::Response::builder().status(200);
        if let Some(ct) = content_type {
            builder = builder.header(CONTENT_TYPE, ct);
        }
        Response::new(builder.body(Box::new(stream) as Box<dyn Read + Send>).unwrap())
    }

    #[test]
    fn body_is_read_from_stream_only_once() {
        let stream = OnceStream {
            data: Cursor::new(b"payload".to_vec()),
            exhausted: false,
        };
        let mut resp = response(None, stream);

        let first = resp.body_bytes().unwrap().to_vec();
        let second = resp.body_bytes().unwrap().to_vec();
        assert_eq!(first, b"payload");
        assert_eq!(first, second);
        assert_eq!(resp.body_string().unwrap(), "payload");
    }

    #[test]
    fn body_returns_fresh_reader_each_time() {
        let mut resp = response(None, Cursor::new(b"abc".to_vec()));

        let mut a = String::new();
        resp.body().unwrap().read_to_string(&mut a).unwrap();
        let mut b = String::new();
        resp.body().unwrap().read_to_string(&mut b).unwrap();

        assert_eq!(a, "abc");
        assert_eq!(b, "abc");
    }

    #[test]
    fn failed_read_is_not_cached_and_retry_resumes() {
        let stream = FlakyStream {
            chunks: vec![
                Ok(b"hel".to_vec()),
                Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset")),
                Ok(b"lo".to_vec()),
            ],
        };
        let mut resp = response(None, stream);

        match resp.body_bytes() {
            Err(Error::BodyRead(e)) => assert_eq!(e.kind(), io::ErrorKind::ConnectionReset),
            other => panic!("expected BodyRead error, got {:?}", other),
        }

        // Retry continues after the bytes already consumed
        assert_eq!(resp.body_bytes().unwrap(), b"hello");
    }

    #[test]
    fn lossy_text_conversion() {
        let mut resp = response(None, Cursor::new(b"\xffok".to_vec()));
        assert!(resp.body_string().unwrap().ends_with("ok"));
    }

    #[test]
    fn classifies_content_types() {
        let json = response(Some("application/json; charset=utf-8"), io::empty());
        assert_eq!(json.media_type(), "application/json");
        assert!(json.is_json());
        assert!(!json.is_xml());

        assert!(response(Some("text/xml"), io::empty()).is_xml());
        assert!(response(Some("Application/XML"), io::empty()).is_xml());
        assert!(!response(Some("application/problem+json"), io::empty()).is_json());
    }

    #[test]
    fn missing_or_malformed_content_type_is_empty() {
        assert_eq!(response(None, io::empty()).media_type(), "");
        assert_eq!(response(Some("application/"), io::empty()).media_type(), "");
        assert_eq!(response(Some("text/plain; charset"), io::empty()).media_type(), "");
        assert_eq!(response(Some("a/b; x=1; X=2"), io::empty()).media_type(), "");
    }

    #[test]
    fn media_type_parser_handles_parameters() {
        assert_eq!(parse_media_type("text/html").as_deref(), Some("text/html"));
        assert_eq!(parse_media_type(" TEXT/Plain ;").as_deref(), Some("text/plain"));
        assert_eq!(
            parse_media_type(r#"multipart/form-data; boundary="a;b\"c"; charset=utf-8"#).as_deref(),
            Some("multipart/form-data")
        );
        assert_eq!(parse_media_type(r#"text/plain; x="open"#), None);
        assert_eq!(parse_media_type(""), None);
    }

    #[test]
    fn exposes_status_and_headers() {
        let raw = http::Response::builder()
            .status(404)
            .header("X-Request-Id", "r-1")
            .body(Box::new(io::empty()) as Box<dyn Read + Send>)
            .unwrap();
        let resp = Response::new(raw);

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(resp.header("x-request-id"), Some("r-1"));
        assert_eq!(resp.headers().len(), 1);
    }
}
