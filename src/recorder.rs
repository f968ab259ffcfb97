//! An in-memory [`ResponseSink`] for tests and offline rendering.

use std::io;

use http::{header::AsHeaderName, HeaderMap, StatusCode};
use rendition_core::{ResponseSink, Sink};

/// Records everything a [`Writer`](crate::Writer) does to a response.
///
/// Headers are snapshotted when the head is sent, so later changes to
/// [`headers_mut`](ResponseSink::headers_mut) do not leak into what was "sent".
/// Writing body bytes before the head commits `200 OK` implicitly, like most servers.
#[derive(Debug, Clone)]
pub struct Recorder {
    status: Option<StatusCode>,
    headers: HeaderMap,
    sent_headers: Option<HeaderMap>,
    body: Vec<u8>,
    heads_sent: usize,
    flushes: usize,
    flushable: bool,
}

impl Default for Recorder {
    fn default() -> Self {
        Self::new()
    }
}

impl Recorder {
    /// A recorder that supports flushing.
    #[must_use]
    pub fn new() -> Self {
        Self {
            status: None,
            headers: HeaderMap::new(),
            sent_headers: None,
            body: Vec::new(),
            heads_sent: 0,
            flushes: 0,
            flushable: true,
        }
    }

    /// A recorder standing in for a channel that cannot flush. Flushes are accepted and not counted.
    #[must_use]
    pub fn unflushable() -> Self {
        Self {
            flushable: false,
            ..Self::new()
        }
    }

    /// The committed status, if the head was sent.
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        self.status
    }

    /// The headers as sent, or the pending headers before the head was sent.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        self.sent_headers.as_ref().unwrap_or(&self.headers)
    }

    /// A single header as text. Values that are not visible ASCII read as `None`.
    #[must_use]
    pub fn header<K: AsHeaderName>(&self, name: K) -> Option<&str> {
        self.headers().get(name)?.to_str().ok()
    }

    /// Body bytes received so far.
    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// The body decoded as UTF-8, replacing invalid sequences.
    #[must_use]
    pub fn body_string(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// How many times the head was requested. Only the first call takes effect.
    #[must_use]
    pub const fn heads_sent(&self) -> usize {
        self.heads_sent
    }

    /// How many flushes reached the channel.
    #[must_use]
    pub const fn flushes(&self) -> usize {
        self.flushes
    }

    /// Whether the head was committed.
    #[must_use]
    pub const fn is_committed(&self) -> bool {
        self.status.is_some()
    }

    /// Convert the recording into an [`http::Response`].
    ///
    /// An uncommitted recording becomes `200 OK` with the pending headers.
    #[must_use]
    pub fn into_response(self) -> http::Response<Vec<u8>> {
        let mut response = http::Response::new(self.body);
        *response.status_mut() = self.status.unwrap_or(StatusCode::OK);
        *response.headers_mut() = self.sent_headers.unwrap_or(self.headers);
        response
    }

    fn commit(&mut self, status: StatusCode) {
        if self.status.is_none() {
            self.status = Some(status);
            self.sent_headers = Some(self.headers.clone());
        }
    }
}

impl Sink for Recorder {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.commit(StatusCode::OK);
        self.body.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.flushable {
            self.flushes += 1;
        }
        Ok(())
    }
}

impl ResponseSink for Recorder {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    fn send_head(&mut self, status: StatusCode) -> io::Result<()> {
        self.heads_sent += 1;
        if self.is_committed() {
            tracing::debug!(status = status.as_u16(), "head already sent, ignoring");
        }
        self.commit(status);
        Ok(())
    }
}
