//! Rendering a [`Response`] onto a [`ResponseSink`].
//!
//! [`Writer`] is configured once at startup and shared by every request
//! handler. For each response it decides between error mode and the payload's
//! own representation, sets the headers, commits the status and writes the body.
//!
//! ```
//! use rendition::{Recorder, Response, Writer};
//!
//! let writer = Writer::new();
//! let mut recorder = Recorder::new();
//! writer.write(Response::ok().with_text("baba is you"), &mut recorder)?;
//!
//! assert_eq!(recorder.body(), b"baba is you");
//! assert_eq!(recorder.header("content-type"), Some("text/plain; charset=UTF-8"));
//! # Ok::<(), rendition::Error>(())
//! ```

use std::{io::Write, sync::Arc};

use http::{
    header::{CONNECTION, CONTENT_TYPE, X_CONTENT_TYPE_OPTIONS},
    HeaderValue, StatusCode,
};
use rendition_core::{Encodable, JsonStream, ResponseSink, Result, StreamWriter, Streamable};
use tracing::{debug, error, warn};

use crate::response::{JsonValue, Payload, Response};

#[allow(clippy::declare_interior_mutable_const)]
const TEXT_PLAIN: HeaderValue = HeaderValue::from_static("text/plain; charset=UTF-8");
#[allow(clippy::declare_interior_mutable_const)]
const APPLICATION_JSON: HeaderValue = HeaderValue::from_static("application/json; charset=UTF-8");
#[allow(clippy::declare_interior_mutable_const)]
const NOSNIFF: HeaderValue = HeaderValue::from_static("nosniff");
#[allow(clippy::declare_interior_mutable_const)]
const KEEP_ALIVE: HeaderValue = HeaderValue::from_static("keep-alive");

impl_error!(
    UnsupportedPayloadKind,
    "unsupported payload kind",
    "The response has no payload kind the writer knows how to render."
);

impl_error!(
    NotStreamable,
    "provided payload is not streamable",
    "A stream response was finished without a body to stream."
);

/// A callback that replaces the default rendering of error-mode responses.
///
/// It owns the whole response: headers, status and body.
pub type ErrorRenderer = dyn Fn(&Response, &mut dyn ResponseSink) -> Result<()> + Send + Sync;

/// Renders responses onto sinks.
///
/// Cheap to clone and safe to share between threads.
#[derive(Clone)]
pub struct Writer {
    text_content_type: HeaderValue,
    json_content_type: HeaderValue,
    error_renderer: Option<Arc<ErrorRenderer>>,
}

impl Default for Writer {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for Writer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Writer")
            .field("text_content_type", &self.text_content_type)
            .field("json_content_type", &self.json_content_type)
            .field("error_renderer", &self.error_renderer.is_some())
            .finish()
    }
}

impl Writer {
    /// A writer with the default content types and no error renderer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            text_content_type: TEXT_PLAIN,
            json_content_type: APPLICATION_JSON,
            error_renderer: None,
        }
    }

    /// Content type for text bodies and default error bodies.
    #[must_use]
    pub fn text_content_type(mut self, value: HeaderValue) -> Self {
        self.text_content_type = value;
        self
    }

    /// Content type for both JSON payload kinds.
    #[must_use]
    pub fn json_content_type(mut self, value: HeaderValue) -> Self {
        self.json_content_type = value;
        self
    }

    /// Hand every error-mode response to `renderer` instead of the plain-text default.
    ///
    /// ```
    /// use std::io::Write;
    /// use rendition::{header, HeaderValue, Recorder, Response, StreamWriter, Writer};
    ///
    /// let writer = Writer::new().error_renderer(|response, mut sink| {
    ///     sink.headers_mut()
    ///         .insert(header::CONTENT_TYPE, HeaderValue::from_static("application/problem+json"));
    ///     sink.send_head(response.status())?;
    ///     let body = format!(r#"{{"detail":"{}"}}"#, response.public_message());
    ///     StreamWriter::new(&mut sink).write_all(body.as_bytes())?;
    ///     Ok(())
    /// });
    ///
    /// let mut recorder = Recorder::new();
    /// let response = Response::not_found(rendition::Error::msg("no row 7"), "missing");
    /// writer.write(response, &mut recorder)?;
    /// assert_eq!(recorder.body(), br#"{"detail":"missing"}"#);
    /// # Ok::<(), rendition::Error>(())
    /// ```
    #[must_use]
    pub fn error_renderer<F>(mut self, renderer: F) -> Self
    where
        F: Fn(&Response, &mut dyn ResponseSink) -> Result<()> + Send + Sync + 'static,
    {
        self.error_renderer = Some(Arc::new(renderer));
        self
    }

    /// Render `response` onto `sink`.
    ///
    /// # Errors
    ///
    /// Returns [`UnsupportedPayloadKind`] for a bare response and [`NotStreamable`]
    /// for a stream response without a body, in both cases before anything is sent.
    /// Serialization failures of whole JSON documents also surface before the head.
    /// Sink failures, encoder failures and stream callback failures are returned as
    /// they happen; whatever was already sent stays sent.
    pub fn write<S: ResponseSink>(&self, mut response: Response, mut sink: S) -> Result<()> {
        let status = response.status();

        if response.is_error() {
            return self.write_error(&response, &mut sink);
        }

        let Some(payload) = response.take_payload() else {
            warn!(status = status.as_u16(), "response has no payload kind");
            return Err(UnsupportedPayloadKind.into());
        };

        debug!(status = status.as_u16(), kind = ?payload.kind(), "rendering response");

        match payload {
            Payload::Empty => {
                sink.send_head(status)?;
                Ok(())
            }
            Payload::Text(text) => {
                write_whole(&mut sink, status, self.text_content_type.clone(), text.as_bytes())
            }
            Payload::Json(value) => self.write_json(&mut sink, status, &*value),
            Payload::JsonStream(value) => self.write_json_stream(&mut sink, status, &*value),
            Payload::Stream { body, content_type } => {
                write_stream(&mut sink, status, body, content_type)
            }
        }
    }

    fn write_error<S: ResponseSink>(&self, response: &Response, sink: &mut S) -> Result<()> {
        let status = response.status();

        if let Some(err) = response.error() {
            if status.is_server_error() {
                error!(status = status.as_u16(), error = ?err, "request failed");
            } else {
                warn!(status = status.as_u16(), error = %err, "request rejected");
            }
        }

        if let Some(renderer) = &self.error_renderer {
            debug!(status = status.as_u16(), "rendering error with custom renderer");
            return renderer(response, sink).inspect_err(|err| {
                warn!(error = %err, "error renderer failed");
            });
        }

        sink.headers_mut().insert(X_CONTENT_TYPE_OPTIONS, NOSNIFF);
        write_whole(
            sink,
            status,
            self.text_content_type.clone(),
            response.public_message().as_bytes(),
        )
    }

    fn write_json<S: ResponseSink>(
        &self,
        sink: &mut S,
        status: StatusCode,
        value: &dyn JsonValue,
    ) -> Result<()> {
        let body = value.to_json().inspect_err(|err| {
            warn!(error = %err, "failed to serialize json payload");
        })?;
        write_whole(sink, status, self.json_content_type.clone(), &body)
    }

    fn write_json_stream<S: ResponseSink>(
        &self,
        sink: &mut S,
        status: StatusCode,
        value: &(dyn Encodable + Send),
    ) -> Result<()> {
        let headers = sink.headers_mut();
        headers.insert(CONTENT_TYPE, self.json_content_type.clone());
        headers.insert(X_CONTENT_TYPE_OPTIONS, NOSNIFF);
        headers.insert(CONNECTION, KEEP_ALIVE);
        sink.send_head(status)?;

        let mut stream = JsonStream::new(sink);
        let encoded = stream.write_object(value);
        let flushed = stream.flush();

        encoded.inspect_err(|err| warn!(error = %err, "json stream aborted"))?;
        flushed?;
        Ok(())
    }
}

fn write_whole<S: ResponseSink>(
    sink: &mut S,
    status: StatusCode,
    content_type: HeaderValue,
    body: &[u8],
) -> Result<()> {
    sink.headers_mut().insert(CONTENT_TYPE, content_type);
    sink.send_head(status)?;
    StreamWriter::new(sink).write_all(body)?;
    Ok(())
}

fn write_stream<S: ResponseSink>(
    sink: &mut S,
    status: StatusCode,
    body: Option<Box<dyn Streamable>>,
    content_type: Option<HeaderValue>,
) -> Result<()> {
    let Some(mut body) = body else {
        warn!(status = status.as_u16(), "stream response has no body");
        return Err(NotStreamable.into());
    };

    let headers = sink.headers_mut();
    headers.insert(X_CONTENT_TYPE_OPTIONS, NOSNIFF);
    headers.insert(CONNECTION, KEEP_ALIVE);
    if let Some(content_type) = content_type {
        headers.insert(CONTENT_TYPE, content_type);
    }
    sink.send_head(status)?;

    let mut writer = StreamWriter::new(sink);
    body.stream(&mut writer)
        .inspect_err(|err| warn!(error = %err, "stream aborted"))?;
    writer.flush()?;
    Ok(())
}
