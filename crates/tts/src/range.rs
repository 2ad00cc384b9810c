//! Single byte-range resolution for partial audio delivery

use std::sync::OnceLock;

use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use bytes::Bytes;
use regex::Regex;

use crate::error::{Result, TtsError};

/// Byte window of an audio buffer to send, and how to frame it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeWindow {
    total: u64,
    span: Option<Span>,
}

/// Inclusive `start..=end` span of a matched range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Span {
    start: u64,
    end: u64,
    open_ended: bool,
}

impl RangeWindow {
    /// Window covering the whole buffer
    pub const fn full(total: u64) -> Self {
        Self { total, span: None }
    }

    /// `200 OK` for the full buffer, `206 Partial Content` for a matched range
    pub const fn status(&self) -> StatusCode {
        if self.span.is_some() {
            StatusCode::PARTIAL_CONTENT
        } else {
            StatusCode::OK
        }
    }

    /// First byte offset sent
    pub fn start(&self) -> u64 {
        self.span.map_or(0, |span| span.start)
    }

    /// Last byte offset requested, `None` when the range runs to the end of the buffer
    pub fn end(&self) -> Option<u64> {
        self.span.filter(|span| !span.open_ended).map(|span| span.end)
    }

    /// Partial content headers; empty when no range applies
    pub fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();

        let Some(span) = self.span else {
            return headers;
        };

        let length = span.end - span.start + 1;
        let content_range = format!("bytes {}-{}/{}", span.start, span.end, self.total);

        headers.insert(header::CONTENT_LENGTH, HeaderValue::from(length));
        headers.insert(header::ACCEPT_RANGES, HeaderValue::from_static("bytes"));
        if let Ok(value) = HeaderValue::from_str(&content_range) {
            headers.insert(header::CONTENT_RANGE, value);
        }
        headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));

        headers
    }

    /// View of the window within `audio`, sharing the underlying buffer
    pub fn slice(&self, audio: Bytes) -> Bytes {
        match self.span {
            // Bounds were checked against `total` in `resolve`
            Some(span) => audio.slice(to_index(span.start)..=to_index(span.end)),
            None => audio,
        }
    }
}

/// Resolve an optional `Range` header value against a buffer of `total` bytes
///
/// Values that do not start with `bytes=<digits>-<digits?>` are ignored and the
/// whole buffer is served. A matched range must lie within the buffer.
///
/// # Errors
///
/// Returns [`TtsError::RangeNotSatisfiable`] when the matched range starts past
/// the end of the buffer, ends before it starts, or ends past the buffer
pub fn resolve(range: Option<&str>, total: u64) -> Result<RangeWindow> {
    fn pattern() -> &'static Regex {
        static RE: OnceLock<Regex> = OnceLock::new();
        RE.get_or_init(|| Regex::new(r"^bytes=([0-9]+)-([0-9]+)?").expect("must be valid regex"))
    }

    let Some(value) = range else {
        return Ok(RangeWindow::full(total));
    };

    let Some(captures) = pattern().captures(value) else {
        tracing::debug!(range = value, "ignoring unparseable range header");
        return Ok(RangeWindow::full(total));
    };

    let unsatisfiable = || TtsError::RangeNotSatisfiable {
        range: value.to_string(),
        total,
    };

    let start = captures
        .get(1)
        .and_then(|m| m.as_str().parse::<u64>().ok())
        .ok_or_else(unsatisfiable)?;

    let requested_end = match captures.get(2) {
        Some(m) => Some(m.as_str().parse::<u64>().map_err(|_| unsatisfiable())?),
        None => None,
    };

    if start >= total {
        return Err(unsatisfiable());
    }

    let span = match requested_end {
        Some(end) if end < start || end >= total => return Err(unsatisfiable()),
        Some(end) => Span {
            start,
            end,
            open_ended: false,
        },
        None => Span {
            start,
            end: total - 1,
            open_ended: true,
        },
    };

    Ok(RangeWindow {
        total,
        span: Some(span),
    })
}

#[allow(clippy::cast_possible_truncation)]
const fn to_index(offset: u64) -> usize {
    offset as usize
}
