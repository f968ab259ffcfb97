use http::{HeaderValue, StatusCode};
use rendition_core::{Encodable, Error, Streamable};
use serde::Serialize;

use super::{Payload, Response};

/// A response with its status chosen and its body still pending.
///
/// Returned by [`Response::ok`], [`Response::created`] and [`Response::accepted`].
/// Every finisher consumes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "a partial response renders nothing until it is finished"]
pub struct Partial {
    status: StatusCode,
}

impl Partial {
    const fn new(status: StatusCode) -> Self {
        Self { status }
    }

    /// The status the finished response will carry.
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Finish with a value serialized as a single JSON document.
    pub fn with_json<T>(self, payload: T) -> Response
    where
        T: Serialize + Send + 'static,
    {
        Response::with_payload(self.status, Payload::Json(Box::new(payload)))
    }

    /// Finish with a plain-text body.
    pub fn with_text(self, text: impl Into<String>) -> Response {
        Response::with_payload(self.status, Payload::Text(text.into()))
    }

    /// Finish with a value that encodes itself through a [`JsonStream`](rendition_core::JsonStream).
    pub fn with_encodable<E>(self, payload: E) -> Response
    where
        E: Encodable + Send + 'static,
    {
        Response::with_payload(self.status, Payload::JsonStream(Box::new(payload)))
    }

    /// Finish with a streamed body.
    ///
    /// When `content_type` is `None` no `Content-Type` header is set. A missing body is
    /// accepted here and rejected at render time with
    /// [`NotStreamable`](crate::error::NotStreamable).
    pub fn with_stream<S>(self, body: Option<S>, content_type: Option<HeaderValue>) -> Response
    where
        S: Streamable + 'static,
    {
        let body = body.map(|body| Box::new(body) as Box<dyn Streamable>);
        Response::with_payload(self.status, Payload::Stream { body, content_type })
    }
}

/// A partial response with a caller-chosen status.
///
/// Returned by [`Response::custom`]. Besides the [`Partial`] finishers it can finish
/// without a body or as an error, which the success shorthands do not allow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "a partial response renders nothing until it is finished"]
pub struct PartialCustom {
    partial: Partial,
}

impl PartialCustom {
    /// The status the finished response will carry.
    pub const fn status(&self) -> StatusCode {
        self.partial.status
    }

    /// See [`Partial::with_json`].
    pub fn with_json<T>(self, payload: T) -> Response
    where
        T: Serialize + Send + 'static,
    {
        self.partial.with_json(payload)
    }

    /// See [`Partial::with_text`].
    pub fn with_text(self, text: impl Into<String>) -> Response {
        self.partial.with_text(text)
    }

    /// See [`Partial::with_encodable`].
    pub fn with_encodable<E>(self, payload: E) -> Response
    where
        E: Encodable + Send + 'static,
    {
        self.partial.with_encodable(payload)
    }

    /// See [`Partial::with_stream`].
    pub fn with_stream<S>(self, body: Option<S>, content_type: Option<HeaderValue>) -> Response
    where
        S: Streamable + 'static,
    {
        self.partial.with_stream(body, content_type)
    }

    /// Finish with status and headers only.
    pub fn without_content(self) -> Response {
        Response::with_payload(self.status(), Payload::Empty)
    }

    /// Finish as an error: `error` is logged, `public_message` is what the client reads.
    pub fn with_error(self, error: impl Into<Error>, public_message: impl Into<String>) -> Response {
        Response::failed(self.status(), Some(error.into()), public_message.into())
    }

    /// Finish as an error with nothing to log.
    pub fn with_public_message(self, public_message: impl Into<String>) -> Response {
        Response::failed(self.status(), None, public_message.into())
    }
}

impl Response {
    /// `200 OK`.
    pub const fn ok() -> Partial {
        Partial::new(StatusCode::OK)
    }

    /// `201 Created`.
    pub const fn created() -> Partial {
        Partial::new(StatusCode::CREATED)
    }

    /// `202 Accepted`.
    pub const fn accepted() -> Partial {
        Partial::new(StatusCode::ACCEPTED)
    }

    /// `204 No Content`, already finished.
    #[must_use]
    pub const fn no_content() -> Self {
        Self::with_payload(StatusCode::NO_CONTENT, Payload::Empty)
    }

    /// Any status, including codes outside the registered set.
    ///
    /// ```
    /// use rendition::{Response, StatusCode};
    ///
    /// let status = StatusCode::from_u16(600).unwrap();
    /// let response = Response::custom(status).with_text("baba");
    /// assert_eq!(response.status().as_u16(), 600);
    /// ```
    pub const fn custom(status: StatusCode) -> PartialCustom {
        PartialCustom {
            partial: Partial::new(status),
        }
    }

    error_constructors! {
        /// `400 Bad Request`.
        bad_request => BAD_REQUEST,
        /// `401 Unauthorized`.
        unauthorized => UNAUTHORIZED,
        /// `402 Payment Required`.
        payment_required => PAYMENT_REQUIRED,
        /// `403 Forbidden`.
        forbidden => FORBIDDEN,
        /// `404 Not Found`.
        not_found => NOT_FOUND,
        /// `406 Not Acceptable`.
        not_acceptable => NOT_ACCEPTABLE,
        /// `409 Conflict`.
        conflict => CONFLICT,
        /// `500 Internal Server Error`.
        internal_server_error => INTERNAL_SERVER_ERROR,
        /// `501 Not Implemented`.
        not_implemented => NOT_IMPLEMENTED,
        /// `503 Service Unavailable`.
        service_unavailable => SERVICE_UNAVAILABLE,
        /// `507 Insufficient Storage`.
        insufficient_storage => INSUFFICIENT_STORAGE,
    }
}
