//! Incremental JSON encoding.
//!
//! [`JsonStream`] writes a JSON document token by token straight into a [`Sink`],
//! remembering only whether a `,` is owed before the next token. Memory use does
//! not grow with the document, which makes it suitable for long responses that a
//! client consumes while they are produced.
//!
//! ```rust
//! use rendition_core::JsonStream;
//!
//! let mut out = Vec::new();
//! let mut stream = JsonStream::new(&mut out);
//! stream.begin_object()?;
//! stream.write_key("name")?;
//! stream.write_str("baba")?;
//! stream.write_key("tags")?;
//! stream.begin_array()?;
//! stream.write_str("is")?;
//! stream.write_str("you")?;
//! stream.end_array()?;
//! stream.end_object()?;
//!
//! assert_eq!(out, br#"{"name":"baba","tags":["is","you"]}"#);
//! # Ok::<(), std::io::Error>(())
//! ```
//!
//! The stream does not check that containers are balanced; mismatched
//! `begin_*`/`end_*` calls produce malformed output rather than an error.

use std::io::{self, Write};

use serde::Serialize;

use crate::sink::{Sink, StreamWriter};
use crate::Result;

/// A value that writes itself onto a [`JsonStream`].
///
/// The implementation owns its own container pairing: a value that opens an
/// object must close it before returning.
///
/// ```rust
/// use rendition_core::{Encodable, JsonStream, Result};
///
/// struct Point {
///     x: i32,
///     y: i32,
/// }
///
/// impl Encodable for Point {
///     fn encode(&self, stream: &mut JsonStream<'_>) -> Result<()> {
///         stream.begin_object()?;
///         stream.write_key("x")?;
///         stream.write_i32(self.x)?;
///         stream.write_key("y")?;
///         stream.write_i32(self.y)?;
///         stream.end_object()?;
///         Ok(())
///     }
/// }
///
/// let mut out = Vec::new();
/// JsonStream::new(&mut out).write_object(&Point { x: 1, y: -2 })?;
/// assert_eq!(out, br#"{"x":1,"y":-2}"#);
/// # Ok::<(), rendition_core::Error>(())
/// ```
pub trait Encodable {
    /// Emit this value.
    ///
    /// # Errors
    ///
    /// Returns sink failures, or any error the implementation raises itself.
    fn encode(&self, stream: &mut JsonStream<'_>) -> Result<()>;
}

impl<T: Encodable + ?Sized> Encodable for &T {
    fn encode(&self, stream: &mut JsonStream<'_>) -> Result<()> {
        (**self).encode(stream)
    }
}

impl<T: Encodable + ?Sized> Encodable for Box<T> {
    fn encode(&self, stream: &mut JsonStream<'_>) -> Result<()> {
        (**self).encode(stream)
    }
}

// `None` is `null`.
impl<T: Encodable> Encodable for Option<T> {
    fn encode(&self, stream: &mut JsonStream<'_>) -> Result<()> {
        match self {
            Some(value) => value.encode(stream),
            None => Ok(stream.write_null()?),
        }
    }
}

impl<T: Encodable> Encodable for [T] {
    fn encode(&self, stream: &mut JsonStream<'_>) -> Result<()> {
        stream.begin_array()?;
        for item in self {
            stream.write_object(item)?;
        }
        stream.end_array()?;
        Ok(())
    }
}

impl<T: Encodable> Encodable for Vec<T> {
    fn encode(&self, stream: &mut JsonStream<'_>) -> Result<()> {
        self.as_slice().encode(stream)
    }
}

/// A constant-memory JSON token writer.
///
/// Every method forwards its token to the sink immediately. When a write fails the
/// error is returned as is and the separator state stays what it was before the call.
pub struct JsonStream<'a> {
    writer: StreamWriter<'a>,
    needs_separator: bool,
}

macro_rules! integer_writers {
    ($($name:ident: $ty:ty),* $(,)?) => {
        $(
            #[doc = concat!("Write a `", stringify!($ty), "` as a base-10 JSON number.")]
            pub fn $name(&mut self, value: $ty) -> io::Result<()> {
                self.write_scalar(itoa::Buffer::new().format(value).as_bytes())
            }
        )*
    };
}

#[allow(clippy::missing_errors_doc)]
impl<'a> JsonStream<'a> {
    /// Start a fresh document over `sink`.
    pub fn new(sink: &'a mut dyn Sink) -> Self {
        Self::from_writer(StreamWriter::new(sink))
    }

    /// Start a fresh document over an existing stream handle.
    pub const fn from_writer(writer: StreamWriter<'a>) -> Self {
        Self {
            writer,
            needs_separator: false,
        }
    }

    /// Whether a `,` will be written before the next value or key.
    #[must_use]
    pub const fn needs_separator(&self) -> bool {
        self.needs_separator
    }

    /// Write `{`.
    pub fn begin_object(&mut self) -> io::Result<()> {
        self.write_opening(b"{")
    }

    /// Write `}`.
    pub fn end_object(&mut self) -> io::Result<()> {
        self.write_closing(b"}")
    }

    /// Write `[`.
    pub fn begin_array(&mut self) -> io::Result<()> {
        self.write_opening(b"[")
    }

    /// Write `]`.
    pub fn end_array(&mut self) -> io::Result<()> {
        self.write_closing(b"]")
    }

    /// Write an object member name followed by `:`.
    pub fn write_key(&mut self, name: &str) -> io::Result<()> {
        let mut token = serde_json::to_vec(name)?;
        token.push(b':');
        self.write_separated(&token)?;
        self.needs_separator = false;
        Ok(())
    }

    /// Write an escaped JSON string.
    pub fn write_str(&mut self, value: &str) -> io::Result<()> {
        let token = serde_json::to_vec(value)?;
        self.write_scalar(&token)
    }

    /// Write `true` or `false`.
    pub fn write_bool(&mut self, value: bool) -> io::Result<()> {
        self.write_scalar(if value { b"true" } else { b"false" })
    }

    /// Write `null`.
    pub fn write_null(&mut self) -> io::Result<()> {
        self.write_scalar(b"null")
    }

    integer_writers! {
        write_i8: i8,
        write_i16: i16,
        write_i32: i32,
        write_i64: i64,
        write_i128: i128,
        write_isize: isize,
        write_u8: u8,
        write_u16: u16,
        write_u32: u32,
        write_u64: u64,
        write_u128: u128,
        write_usize: usize,
    }

    /// Write an `f32` in its shortest round-trippable form (`32.0` is written as `32`).
    ///
    /// Very large and very small magnitudes use exponent notation (`1e300`).
    /// NaN and infinities have no JSON representation and are written as `null`.
    pub fn write_f32(&mut self, value: f32) -> io::Result<()> {
        if value.is_finite() {
            self.write_float(&format!("{value:?}"))
        } else {
            self.write_null()
        }
    }

    /// Write an `f64` in its shortest round-trippable form (`64.0` is written as `64`).
    ///
    /// Very large and very small magnitudes use exponent notation (`1e300`).
    /// NaN and infinities have no JSON representation and are written as `null`.
    pub fn write_f64(&mut self, value: f64) -> io::Result<()> {
        if value.is_finite() {
            self.write_float(&format!("{value:?}"))
        } else {
            self.write_null()
        }
    }

    /// Write any serde value as a single compact token.
    pub fn write_value<T: Serialize + ?Sized>(&mut self, value: &T) -> io::Result<()> {
        let token = serde_json::to_vec(value)?;
        self.write_scalar(&token)
    }

    /// Hand the stream to `value` and treat whatever it wrote as one completed sibling.
    ///
    /// A separator is owed afterwards even if `value` failed halfway.
    pub fn write_object<E: Encodable + ?Sized>(&mut self, value: &E) -> Result<()> {
        let result = value.encode(self);
        self.needs_separator = true;
        result
    }

    /// Flush the underlying sink.
    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    /// Give back the stream handle.
    pub fn into_writer(self) -> StreamWriter<'a> {
        self.writer
    }

    // `Debug` keeps the shortest digits and switches to exponent form at the extremes;
    // only the integral `.0` suffix has to go.
    fn write_float(&mut self, repr: &str) -> io::Result<()> {
        let token = repr.strip_suffix(".0").unwrap_or(repr);
        self.write_scalar(token.as_bytes())
    }

    fn write_opening(&mut self, token: &[u8]) -> io::Result<()> {
        self.write_separated(token)?;
        self.needs_separator = false;
        Ok(())
    }

    fn write_closing(&mut self, token: &[u8]) -> io::Result<()> {
        self.writer.write_all(token)?;
        self.needs_separator = true;
        Ok(())
    }

    fn write_scalar(&mut self, token: &[u8]) -> io::Result<()> {
        self.write_separated(token)?;
        self.needs_separator = true;
        Ok(())
    }

    fn write_separated(&mut self, token: &[u8]) -> io::Result<()> {
        if self.needs_separator {
            self.writer.write_all(b",")?;
        }
        self.writer.write_all(token)
    }
}

impl core::fmt::Debug for JsonStream<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("JsonStream")
            .field("needs_separator", &self.needs_separator)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::{Encodable, JsonStream};
    use crate::{sink::Sink, Error, Result};
    use serde::Deserialize;
    use std::io;

    fn render(f: impl FnOnce(&mut JsonStream<'_>) -> Result<()>) -> String {
        let mut out = Vec::new();
        f(&mut JsonStream::new(&mut out)).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn single_tokens() {
        assert_eq!(render(|s| Ok(s.begin_object()?)), "{");
        assert_eq!(render(|s| Ok(s.end_object()?)), "}");
        assert_eq!(render(|s| Ok(s.begin_array()?)), "[");
        assert_eq!(render(|s| Ok(s.end_array()?)), "]");
        assert_eq!(render(|s| Ok(s.write_key("baba")?)), r#""baba":"#);
    }

    #[test]
    fn separators_only_between_siblings() {
        let json = render(|s| {
            s.begin_array()?;
            s.begin_object()?;
            s.end_object()?;
            s.begin_array()?;
            s.end_array()?;
            s.write_null()?;
            s.write_bool(true)?;
            s.begin_object()?;
            s.write_key("a")?;
            s.begin_array()?;
            s.end_array()?;
            s.write_key("b")?;
            s.write_bool(false)?;
            s.end_object()?;
            s.end_array()?;
            Ok(())
        });
        assert_eq!(json, r#"[{},[],null,true,{"a":[],"b":false}]"#);
        serde_json::from_str::<serde_json::Value>(&json).unwrap();
    }

    #[test]
    fn unsigned_integers() {
        let json = render(|s| {
            s.write_u8(8)?;
            s.write_u8(8)?;
            s.write_u16(16)?;
            s.write_u32(32)?;
            s.write_u64(64)?;
            s.write_usize(7)?;
            s.write_u128(u128::MAX)?;
            Ok(())
        });
        assert_eq!(json, format!("8,8,16,32,64,7,{}", u128::MAX));
    }

    #[test]
    fn signed_integers() {
        let json = render(|s| {
            s.write_i8(i8::MIN)?;
            s.write_i16(-16)?;
            s.write_i32(0)?;
            s.write_i64(i64::MAX)?;
            s.write_isize(-1)?;
            Ok(())
        });
        assert_eq!(json, format!("-128,-16,0,{},-1", i64::MAX));
    }

    #[test]
    fn floats_use_minimal_digits() {
        let json = render(|s| {
            s.write_f32(32.0)?;
            s.write_f32(32.5)?;
            s.write_f32(32.55)?;
            Ok(())
        });
        assert_eq!(json, "32,32.5,32.55");

        let json = render(|s| {
            s.write_f64(64.0)?;
            s.write_f64(64.5)?;
            s.write_f64(64.55)?;
            Ok(())
        });
        assert_eq!(json, "64,64.5,64.55");
    }

    #[test]
    fn extreme_floats_use_exponent_form() {
        let json = render(|s| {
            s.write_f64(1e300)?;
            s.write_f64(f64::MIN_POSITIVE)?;
            s.write_f32(1e-20)?;
            s.write_f64(-2.5e-7)?;
            Ok(())
        });
        assert_eq!(json, "1e300,2.2250738585072014e-308,1e-20,-2.5e-7");

        let values: Vec<f64> = serde_json::from_str(&format!("[{json}]")).unwrap();
        assert_eq!(values[0], 1e300);
        assert_eq!(values[1], f64::MIN_POSITIVE);
    }

    #[test]
    fn non_finite_floats_become_null() {
        let json = render(|s| {
            s.begin_array()?;
            s.write_f64(f64::NAN)?;
            s.write_f32(f32::INFINITY)?;
            s.end_array()?;
            Ok(())
        });
        assert_eq!(json, "[null,null]");
    }

    #[test]
    fn strings_and_keys_are_escaped() {
        let json = render(|s| {
            s.begin_object()?;
            s.write_key("quote\"d")?;
            s.write_str("line\nbreak\\")?;
            s.end_object()?;
            Ok(())
        });
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["quote\"d"], "line\nbreak\\");
    }

    #[test]
    fn write_value_embeds_serde_values() {
        let json = render(|s| {
            s.begin_array()?;
            s.write_value(&serde_json::json!({"k": [1, 2]}))?;
            s.write_value("plain")?;
            s.end_array()?;
            Ok(())
        });
        assert_eq!(json, r#"[{"k":[1,2]},"plain"]"#);
    }

    struct Pair {
        key: &'static str,
        value: i64,
    }

    impl Encodable for Pair {
        fn encode(&self, stream: &mut JsonStream<'_>) -> Result<()> {
            stream.begin_object()?;
            stream.write_key("Key")?;
            stream.write_str(self.key)?;
            stream.write_key("Value")?;
            stream.write_i64(self.value)?;
            stream.end_object()?;
            Ok(())
        }
    }

    struct Serializable {
        text: &'static str,
        int8: i8,
        int16: i16,
        int32: i32,
        int64: i64,
        uint8: u8,
        uint16: u16,
        uint32: u32,
        uint64: u64,
        float32: f32,
        float64: f64,
        texts: Vec<&'static str>,
        pairs: Vec<Pair>,
    }

    impl Encodable for Serializable {
        fn encode(&self, stream: &mut JsonStream<'_>) -> Result<()> {
            stream.begin_object()?;
            stream.write_key("TextData")?;
            stream.write_str(self.text)?;
            stream.write_key("Int8Data")?;
            stream.write_i8(self.int8)?;
            stream.write_key("Int16Data")?;
            stream.write_i16(self.int16)?;
            stream.write_key("Int32Data")?;
            stream.write_i32(self.int32)?;
            stream.write_key("Int64Data")?;
            stream.write_i64(self.int64)?;
            stream.write_key("Uint8Data")?;
            stream.write_u8(self.uint8)?;
            stream.write_key("Uint16Data")?;
            stream.write_u16(self.uint16)?;
            stream.write_key("Uint32Data")?;
            stream.write_u32(self.uint32)?;
            stream.write_key("Uint64Data")?;
            stream.write_u64(self.uint64)?;
            stream.write_key("Float32Data")?;
            stream.write_f32(self.float32)?;
            stream.write_key("Float64Data")?;
            stream.write_f64(self.float64)?;

            stream.write_key("TextArray")?;
            stream.begin_array()?;
            for text in &self.texts {
                stream.write_str(text)?;
            }
            stream.end_array()?;

            stream.write_key("PairsArray")?;
            stream.write_object(&self.pairs)?;

            stream.end_object()?;
            Ok(())
        }
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "PascalCase")]
    struct Decoded {
        text_data: String,
        int8_data: i8,
        int16_data: i16,
        int32_data: i32,
        int64_data: i64,
        uint8_data: u8,
        uint16_data: u16,
        uint32_data: u32,
        uint64_data: u64,
        float32_data: f32,
        float64_data: f64,
        text_array: Vec<String>,
        pairs_array: Vec<DecodedPair>,
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "PascalCase")]
    struct DecodedPair {
        key: String,
        value: i64,
    }

    #[test]
    fn write_object_round_trips_through_serde() {
        let value = Serializable {
            text: "baba",
            int8: -8,
            int16: 16,
            int32: -32,
            int64: i64::MIN,
            uint8: u8::MAX,
            uint16: 16,
            uint32: 32,
            uint64: u64::MAX,
            float32: 32.55,
            float64: 64.125,
            texts: vec!["baba", "is", "you"],
            pairs: vec![
                Pair {
                    key: "first",
                    value: 1,
                },
                Pair {
                    key: "second",
                    value: 2,
                },
            ],
        };

        let json = render(|s| s.write_object(&value));
        let decoded: Decoded = serde_json::from_str(&json).unwrap();

        assert_eq!(decoded.text_data, "baba");
        assert_eq!(decoded.int8_data, -8);
        assert_eq!(decoded.int16_data, 16);
        assert_eq!(decoded.int32_data, -32);
        assert_eq!(decoded.int64_data, i64::MIN);
        assert_eq!(decoded.uint8_data, u8::MAX);
        assert_eq!(decoded.uint16_data, 16);
        assert_eq!(decoded.uint32_data, 32);
        assert_eq!(decoded.uint64_data, u64::MAX);
        assert!((decoded.float32_data - 32.55).abs() < f32::EPSILON);
        assert!((decoded.float64_data - 64.125).abs() < f64::EPSILON);
        assert_eq!(decoded.text_array, ["baba", "is", "you"]);
        assert_eq!(decoded.pairs_array.len(), 2);
        assert_eq!(decoded.pairs_array[0].key, "first");
        assert_eq!(decoded.pairs_array[0].value, 1);
        assert_eq!(decoded.pairs_array[1].key, "second");
        assert_eq!(decoded.pairs_array[1].value, 2);
    }

    #[test]
    fn option_and_nested_objects() {
        let json = render(|s| {
            s.begin_array()?;
            s.write_object(&None::<Pair>)?;
            s.write_object(&Some(Pair {
                key: "k",
                value: 3,
            }))?;
            s.write_u8(4)?;
            s.end_array()?;
            Ok(())
        });
        assert_eq!(json, r#"[null,{"Key":"k","Value":3},4]"#);
    }

    struct Failing;

    impl Encodable for Failing {
        fn encode(&self, stream: &mut JsonStream<'_>) -> Result<()> {
            stream.begin_object()?;
            Err(Error::msg("halfway"))
        }
    }

    #[test]
    fn write_object_owes_separator_even_after_failure() {
        let mut out = Vec::new();
        let mut stream = JsonStream::new(&mut out);
        let err = stream.write_object(&Failing).unwrap_err();
        assert_eq!(err.to_string(), "halfway");
        assert!(stream.needs_separator());
    }

    /// Fails every write once `budget` writes have gone through.
    struct Budget {
        budget: usize,
        data: Vec<u8>,
    }

    impl Sink for Budget {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.budget == 0 {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"));
            }
            self.budget -= 1;
            self.data.extend_from_slice(buf);
            Ok(buf.len())
        }
    }

    #[test]
    fn failed_write_keeps_separator_state() {
        let mut sink = Budget {
            budget: 1,
            data: Vec::new(),
        };
        let mut stream = JsonStream::new(&mut sink);
        stream.write_u32(1).unwrap();
        assert!(stream.needs_separator());

        let err = stream.begin_object().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        assert!(stream.needs_separator());

        let err = stream.write_key("k").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        assert!(stream.needs_separator());
        assert_eq!(sink.data, b"1");
    }

    #[test]
    fn failed_close_keeps_separator_state() {
        let mut sink = Budget {
            budget: 1,
            data: Vec::new(),
        };
        let mut stream = JsonStream::new(&mut sink);
        stream.begin_array().unwrap();
        assert!(!stream.needs_separator());
        stream.end_array().unwrap_err();
        assert!(!stream.needs_separator());
    }
}
