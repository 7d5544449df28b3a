use crate::http::request::{Method, Request};
use bytes::Bytes;
use std::collections::HashMap;
use std::num::IntErrorKind;
use thiserror::Error;

const HEAD_TERMINATOR: &[u8] = b"\r\n\r\n";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("empty request")]
    Empty,
    #[error("request head is not valid UTF-8")]
    InvalidEncoding,
    #[error("malformed request line")]
    InvalidRequestLine,
    #[error("malformed header line: {0:?}")]
    InvalidHeader(String),
}

/// Parses a request out of `buf`.
///
/// The head ends at the first blank line and the body is every byte after it,
/// untouched. A buffer that never reaches a blank line is still accepted, with
/// an empty body.
pub fn parse_http_request(buf: Bytes) -> Result<Request, ParseError> {
    if buf.is_empty() {
        return Err(ParseError::Empty);
    }

    let (head, body) = match find_headers_end(&buf) {
        Some(end) => (buf.slice(..end), buf.slice(end + HEAD_TERMINATOR.len()..)),
        None => (buf.clone(), Bytes::new()),
    };

    let head = std::str::from_utf8(&head).map_err(|_| ParseError::InvalidEncoding)?;
    let mut lines = head.split("\r\n");

    // Request line
    let request_line = lines.next().ok_or(ParseError::InvalidRequestLine)?;
    let parts: Vec<&str> = request_line.split(' ').collect();
    let &[method, target, version] = parts.as_slice() else {
        return Err(ParseError::InvalidRequestLine);
    };
    if method.is_empty() || target.is_empty() || version.is_empty() {
        return Err(ParseError::InvalidRequestLine);
    }

    // Headers
    let mut headers = HashMap::new();

    for line in lines {
        if line.is_empty() {
            break;
        }

        let (key, value) = line
            .split_once(": ")
            .ok_or_else(|| ParseError::InvalidHeader(line.to_string()))?;

        headers.insert(key.to_string(), value.to_string());
    }

    Ok(Request {
        method: Method::parse(method),
        target: target.to_string(),
        version: version.to_string(),
        headers,
        body,
    })
}

/// How much of a request a buffer holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framing {
    /// The first request occupies this many bytes.
    Complete(usize),
    /// More bytes are needed.
    Incomplete,
    /// The announced request would exceed the size limit.
    TooLarge,
    /// `Content-Length` is present but not a number.
    InvalidContentLength,
}

/// Decides whether `buf` holds a complete request.
///
/// A request is complete once the head terminator has arrived along with as
/// many body bytes as its `Content-Length` announces (zero when absent). A
/// request whose announced size exceeds `max_request_bytes` is reported as
/// `TooLarge` without waiting for the body.
pub fn request_frame_len(buf: &[u8], max_request_bytes: usize) -> Framing {
    let Some(headers_end) = find_headers_end(buf) else {
        return Framing::Incomplete;
    };

    let declared = std::str::from_utf8(&buf[..headers_end])
        .ok()
        .and_then(|head| {
            head.split("\r\n")
                .skip(1)
                .filter_map(|line| line.split_once(": "))
                .filter(|(key, _)| *key == "Content-Length")
                .last()
                .map(|(_, value)| value.trim())
        });

    let content_length = match declared {
        None => 0,
        Some(value) => match value.parse::<usize>() {
            Ok(n) => n,
            Err(e) if *e.kind() == IntErrorKind::PosOverflow => return Framing::TooLarge,
            Err(_) => return Framing::InvalidContentLength,
        },
    };

    let total = headers_end
        .checked_add(HEAD_TERMINATOR.len())
        .and_then(|n| n.checked_add(content_length));
    match total {
        Some(total) if total <= max_request_bytes => {
            if buf.len() >= total {
                Framing::Complete(total)
            } else {
                Framing::Incomplete
            }
        }
        _ => Framing::TooLarge,
    }
}

fn find_headers_end(buf: &[u8]) -> Option<usize> {
    buf.windows(HEAD_TERMINATOR.len())
        .position(|w| w == HEAD_TERMINATOR)
}
