#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

//! Transport-independent HTTP responses, rendered exactly once.
//!
//! Build a [`Response`] with one of its factories, then hand it to a shared
//! [`Writer`] together with whatever [`ResponseSink`] the host server provides.
//! The writer picks the representation (plain text, whole JSON, incrementally
//! encoded JSON or a long-lived stream), sets the headers and commits the status.
//!
//! ```
//! use rendition::{JsonStream, Encodable, Recorder, Response, Result, Writer};
//!
//! struct Temperature(f64);
//!
//! impl Encodable for Temperature {
//!     fn encode(&self, stream: &mut JsonStream<'_>) -> Result<()> {
//!         stream.begin_object()?;
//!         stream.write_key("celsius")?;
//!         stream.write_f64(self.0)?;
//!         stream.end_object()?;
//!         Ok(())
//!     }
//! }
//!
//! let mut recorder = Recorder::new();
//! Writer::new().write(Response::ok().with_encodable(Temperature(21.5)), &mut recorder)?;
//! assert_eq!(recorder.body(), br#"{"celsius":21.5}"#);
//! # Ok::<(), rendition::Error>(())
//! ```

#[macro_use]
mod macros;

pub mod response;
pub use response::{Partial, PartialCustom, PayloadKind, Response};

pub mod writer;
pub use writer::{ErrorRenderer, Writer};

pub mod recorder;
pub use recorder::Recorder;

#[cfg(all(not(target_arch = "wasm32"), feature = "logging"))]
pub mod logging;

/// Error types.
pub mod error {
    pub use crate::writer::{NotStreamable, UnsupportedPayloadKind};
    pub use rendition_core::{Error, Result, ResultExt};
}

#[doc(inline)]
pub use rendition_core::{
    header, sink, streaming, Encodable, Error, HeaderMap, HeaderValue, IoSink, JsonStream,
    ResponseSink, Result, ResultExt, Sink, StatusCode, StreamWriter, Streamable,
};
