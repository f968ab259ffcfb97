//! Byte sinks that responses are rendered onto.
//!
//! A [`Sink`] is the smallest capability a transport has to offer: write bytes,
//! and flush them toward the peer if the channel knows how. Channels that cannot
//! flush keep the default no-op [`Sink::flush`].
//!
//! [`ResponseSink`] adds what the response writer needs on top of that: a header
//! map and a way to commit the status line and headers before the first body byte.

use std::io;

use http::{HeaderMap, StatusCode};

/// A raw byte channel with an optional flush capability.
///
/// Implementations must forward every `write` immediately; no buffering is added
/// at this layer.
pub trait Sink {
    /// Write some bytes, returning how many were accepted.
    ///
    /// # Errors
    ///
    /// Returns the channel's I/O error. It is surfaced to the caller unchanged and never retried.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize>;

    /// Push already written bytes toward the transport.
    ///
    /// The default is a no-op, for channels that cannot flush.
    ///
    /// # Errors
    ///
    /// Returns the channel's I/O error.
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A [`Sink`] bound to one HTTP response: headers, one status commit, then body bytes.
pub trait ResponseSink: Sink {
    /// Headers that will be sent with [`send_head`](Self::send_head).
    ///
    /// Changes made after the head was sent have no effect on the wire.
    fn headers_mut(&mut self) -> &mut HeaderMap;

    /// Commit the status line and the current headers.
    ///
    /// # Errors
    ///
    /// Returns the channel's I/O error.
    fn send_head(&mut self, status: StatusCode) -> io::Result<()>;
}

impl<S: Sink + ?Sized> Sink for &mut S {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        (**self).write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }
}

impl<S: Sink + ?Sized> Sink for Box<S> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        (**self).write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }
}

impl<S: ResponseSink + ?Sized> ResponseSink for &mut S {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        (**self).headers_mut()
    }

    fn send_head(&mut self, status: StatusCode) -> io::Result<()> {
        (**self).send_head(status)
    }
}

// In-memory, nothing to flush.
impl Sink for Vec<u8> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.extend_from_slice(buf);
        Ok(buf.len())
    }
}

/// A [`Sink`] over any [`io::Write`], forwarding both writes and flushes.
///
/// ```rust
/// use rendition_core::{JsonStream, sink::IoSink};
///
/// let mut sink = IoSink::new(Vec::new());
/// let mut stream = JsonStream::new(&mut sink);
/// stream.begin_array()?;
/// stream.write_u8(1)?;
/// stream.write_u8(2)?;
/// stream.end_array()?;
/// assert_eq!(sink.into_inner(), b"[1,2]");
/// # Ok::<(), std::io::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct IoSink<W> {
    inner: W,
}

impl<W: io::Write> IoSink<W> {
    /// Wrap a writer.
    pub const fn new(inner: W) -> Self {
        Self { inner }
    }

    /// Borrow the wrapped writer.
    pub const fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Unwrap the writer.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: io::Write> Sink for IoSink<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// The handle streaming callbacks write through.
///
/// Implements [`io::Write`], so `write!` and `write_all` work on it; `flush` goes
/// straight to the underlying sink.
pub struct StreamWriter<'a> {
    sink: &'a mut dyn Sink,
}

impl<'a> StreamWriter<'a> {
    /// Borrow a sink for the duration of one stream.
    pub fn new(sink: &'a mut dyn Sink) -> Self {
        Self { sink }
    }
}

impl core::fmt::Debug for StreamWriter<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("StreamWriter").finish_non_exhaustive()
    }
}

impl io::Write for StreamWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.sink.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.sink.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::{IoSink, Sink, StreamWriter};
    use std::io::{self, Write};

    /// Accepts at most `chunk` bytes per call and counts flushes.
    struct Trickle {
        chunk: usize,
        data: Vec<u8>,
        flushes: usize,
    }

    impl Sink for Trickle {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let n = buf.len().min(self.chunk);
            self.data.extend_from_slice(&buf[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            self.flushes += 1;
            Ok(())
        }
    }

    #[test]
    fn vec_flush_is_a_no_op() {
        let mut sink = Vec::new();
        Sink::write(&mut sink, b"abc").unwrap();
        Sink::flush(&mut sink).unwrap();
        assert_eq!(sink, b"abc");
    }

    #[test]
    fn stream_writer_completes_short_writes() {
        let mut sink = Trickle {
            chunk: 2,
            data: Vec::new(),
            flushes: 0,
        };
        let mut writer = StreamWriter::new(&mut sink);
        write!(writer, "baba is you").unwrap();
        writer.flush().unwrap();
        assert_eq!(sink.data, b"baba is you");
        assert_eq!(sink.flushes, 1);
    }

    #[test]
    fn io_sink_forwards_to_writer() {
        let mut sink = IoSink::new(Vec::new());
        assert_eq!(Sink::write(&mut sink, b"hello").unwrap(), 5);
        Sink::flush(&mut sink).unwrap();
        assert_eq!(sink.get_ref(), b"hello");
    }
}
