#![deny(unsafe_code)]
//! Base types and traits for rendering HTTP responses.
//!
//! This crate holds the pieces that user payloads implement or write through:
//! the [`Sink`] abstraction, the incremental [`JsonStream`] encoder with its
//! [`Encodable`] trait, the [`Streamable`] trait for long-lived bodies, and the
//! shared [`Error`] type.

mod error;
pub use error::{Error, Result, ResultExt};

pub mod sink;
pub use sink::{IoSink, ResponseSink, Sink, StreamWriter};

mod json;
pub use json::{Encodable, JsonStream};

pub mod streaming;
pub use streaming::Streamable;

pub use http::{header, HeaderMap, HeaderValue, StatusCode};
