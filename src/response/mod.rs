//! The transport-independent response value.
//!
//! A [`Response`] is built once, usually through the factories in this module
//! (`Response::ok().with_json(..)`, `Response::not_found(err, "..")`), handed to a
//! [`Writer`](crate::Writer) and dropped. It is never mutated after hand-off.
//!
//! A response is in *error mode* when it carries a diagnostic error or a non-empty
//! public message. Error mode wins over any payload: the writer sends the public
//! message as plain text and only logs the diagnostic error.
//!
//! ```
//! use rendition::{PayloadKind, Response, StatusCode};
//!
//! let response = Response::created().with_text("baba");
//! assert_eq!(response.status(), StatusCode::CREATED);
//! assert_eq!(response.payload_kind(), Some(PayloadKind::Text));
//! assert_eq!(response.text(), Some("baba"));
//! assert!(!response.is_error());
//! ```

mod builder;
pub use builder::{Partial, PartialCustom};

use core::any::Any;

use http::{HeaderValue, StatusCode};
use rendition_core::{Encodable, Error, Streamable};
use serde::Serialize;

/// The wire representation a response's payload asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PayloadKind {
    /// Status and headers only.
    Empty,
    /// A plain-text body.
    Text,
    /// A value serialized as one JSON document.
    Json,
    /// A value that encodes itself token by token through a [`JsonStream`](rendition_core::JsonStream).
    JsonStream,
    /// A long-lived body written by a [`Streamable`] callback.
    Stream,
}

/// A serde value with its concrete type erased.
pub(crate) trait JsonValue: Send {
    fn to_json(&self) -> serde_json::Result<Vec<u8>>;
    fn as_any(&self) -> &dyn Any;
}

impl<T: Serialize + Send + 'static> JsonValue for T {
    fn to_json(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub(crate) enum Payload {
    Empty,
    Text(String),
    Json(Box<dyn JsonValue>),
    JsonStream(Box<dyn Encodable + Send>),
    Stream {
        body: Option<Box<dyn Streamable>>,
        content_type: Option<HeaderValue>,
    },
}

impl Payload {
    pub(crate) const fn kind(&self) -> PayloadKind {
        match self {
            Self::Empty => PayloadKind::Empty,
            Self::Text(_) => PayloadKind::Text,
            Self::Json(_) => PayloadKind::Json,
            Self::JsonStream(_) => PayloadKind::JsonStream,
            Self::Stream { .. } => PayloadKind::Stream,
        }
    }
}

/// An HTTP response waiting to be rendered.
pub struct Response {
    status: StatusCode,
    payload: Option<Payload>,
    error: Option<Error>,
    public_message: String,
}

impl Response {
    /// A bare response with no payload kind chosen yet.
    ///
    /// Rendering it fails with [`UnsupportedPayloadKind`](crate::error::UnsupportedPayloadKind);
    /// pick a kind through [`Response::custom`] instead when building by hand.
    #[must_use]
    pub const fn new(status: StatusCode) -> Self {
        Self {
            status,
            payload: None,
            error: None,
            public_message: String::new(),
        }
    }

    pub(crate) const fn with_payload(status: StatusCode, payload: Payload) -> Self {
        Self {
            status,
            payload: Some(payload),
            error: None,
            public_message: String::new(),
        }
    }

    pub(crate) fn failed(status: StatusCode, error: Option<Error>, public_message: String) -> Self {
        Self {
            status,
            payload: Some(Payload::Empty),
            error,
            public_message,
        }
    }

    /// The status code the response will be sent with.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// The kind of payload, or `None` for a bare response.
    #[must_use]
    pub fn payload_kind(&self) -> Option<PayloadKind> {
        self.payload.as_ref().map(Payload::kind)
    }

    /// The text body, if this is a text response.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match &self.payload {
            Some(Payload::Text(text)) => Some(text),
            _ => None,
        }
    }

    /// The JSON payload, if this is a whole-document JSON response holding a `T`.
    ///
    /// ```
    /// use rendition::Response;
    ///
    /// let response = Response::accepted().with_json(vec![1, 2, 3]);
    /// assert_eq!(response.json::<Vec<i32>>(), Some(&vec![1, 2, 3]));
    /// assert_eq!(response.json::<String>(), None);
    /// ```
    #[must_use]
    pub fn json<T: 'static>(&self) -> Option<&T> {
        match &self.payload {
            Some(Payload::Json(value)) => value.as_any().downcast_ref(),
            _ => None,
        }
    }

    /// The explicit `Content-Type` of a streamed response.
    #[must_use]
    pub fn content_type(&self) -> Option<&HeaderValue> {
        match &self.payload {
            Some(Payload::Stream { content_type, .. }) => content_type.as_ref(),
            _ => None,
        }
    }

    /// The diagnostic error. It is logged, never sent.
    #[must_use]
    pub const fn error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    /// The message sent to the client in error mode.
    #[must_use]
    pub fn public_message(&self) -> &str {
        &self.public_message
    }

    /// Whether the writer will render this response as an error.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.error.is_some() || !self.public_message.is_empty()
    }

    pub(crate) fn take_payload(&mut self) -> Option<Payload> {
        self.payload.take()
    }
}

impl core::fmt::Debug for Response {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Response")
            .field("status", &self.status)
            .field("payload_kind", &self.payload_kind())
            .field("error", &self.error)
            .field("public_message", &self.public_message)
            .finish()
    }
}
