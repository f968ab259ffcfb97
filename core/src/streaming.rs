//! Long-lived response bodies produced by a callback.

use crate::sink::StreamWriter;
use crate::Result;

/// A body that writes itself incrementally, flushing whenever the client should see progress.
///
/// The writer calls [`stream`](Self::stream) once, after the head has been sent, and
/// neither times out nor cancels it.
pub trait Streamable: Send {
    /// Produce the body.
    ///
    /// # Errors
    ///
    /// Returns sink failures, or any error the implementation raises itself.
    fn stream(&mut self, writer: &mut StreamWriter<'_>) -> Result<()>;
}

impl<S: Streamable + ?Sized> Streamable for Box<S> {
    fn stream(&mut self, writer: &mut StreamWriter<'_>) -> Result<()> {
        (**self).stream(writer)
    }
}

/// Build a [`Streamable`] from a closure.
///
/// ```rust
/// use std::io::Write;
/// use rendition_core::{streaming, Streamable, sink::StreamWriter};
///
/// let mut body = streaming::from_fn(|writer| {
///     writer.write_all(b"tick")?;
///     writer.flush()?;
///     Ok(())
/// });
///
/// let mut out = Vec::new();
/// body.stream(&mut StreamWriter::new(&mut out))?;
/// assert_eq!(out, b"tick");
/// # Ok::<(), rendition_core::Error>(())
/// ```
pub const fn from_fn<F>(f: F) -> FromFn<F>
where
    F: FnMut(&mut StreamWriter<'_>) -> Result<()> + Send,
{
    FromFn { f }
}

/// A [`Streamable`] backed by a closure, see [`from_fn`].
pub struct FromFn<F> {
    f: F,
}

impl<F> core::fmt::Debug for FromFn<F> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("FromFn")
    }
}

impl<F> Streamable for FromFn<F>
where
    F: FnMut(&mut StreamWriter<'_>) -> Result<()> + Send,
{
    fn stream(&mut self, writer: &mut StreamWriter<'_>) -> Result<()> {
        (self.f)(writer)
    }
}
