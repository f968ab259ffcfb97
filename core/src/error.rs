//! The error type shared by the sink, the JSON encoder and the response writer.

use core::ops::Deref;

use http::StatusCode;
use http_kit::HttpError;

/// A specialized `Result` type for rendering operations.
pub type Result<T> = core::result::Result<T, Error>;

/// The main error type for rendering.
///
/// Wraps any error together with the HTTP status code a host should report
/// if it decides to turn the failure into a response of its own. Failures
/// raised while rendering default to `500 Internal Server Error`.
///
/// Any `std::error::Error + Send + Sync + 'static` converts into it, so `?`
/// works on [`std::io::Error`] and [`serde_json::Error`] inside encode and
/// stream callbacks.
///
/// # Examples
///
/// ```rust
/// # use rendition_core::Error;
/// # use http::StatusCode;
///
/// let err = Error::msg("upstream closed");
/// assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
///
/// let err = Error::msg("gone").set_status(StatusCode::GONE);
/// assert_eq!(err.status(), StatusCode::GONE);
/// ```
pub struct Error {
    error: eyre::Error,
    status: StatusCode,
}

impl Error {
    /// Creates a new `Error` from any error type with the given HTTP status code.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use rendition_core::Error;
    /// # use http::StatusCode;
    ///
    /// let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "peer went away");
    /// let err = Error::new(io_err, StatusCode::BAD_GATEWAY);
    /// assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
    /// ```
    pub fn new<E>(error: E, status: StatusCode) -> Self
    where
        E: Into<eyre::Error>,
    {
        Self {
            error: error.into(),
            status,
        }
    }

    /// Creates an `Error` from a message with the default `500` status code.
    pub fn msg<S>(msg: S) -> Self
    where
        S: core::fmt::Display + core::fmt::Debug + Send + Sync + 'static,
    {
        Self {
            error: eyre::Error::msg(msg),
            status: StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Sets the HTTP status code of this error.
    #[must_use]
    pub const fn set_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Returns the HTTP status code associated with this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Attempts to downcast the inner error to a concrete type.
    ///
    /// # Errors
    ///
    /// Returns `Err(Self)` when the inner error is not an `E`.
    pub fn downcast<E>(self) -> core::result::Result<Box<E>, Self>
    where
        E: core::error::Error + Send + Sync + 'static,
    {
        let Self { status, error } = self;
        error
            .downcast()
            .map(Box::new)
            .map_err(|error| Self { error, status })
    }

    /// Attempts to downcast the inner error to a reference of the concrete type.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use rendition_core::Error;
    /// use std::io;
    ///
    /// let err = Error::from(io::Error::new(io::ErrorKind::WriteZero, "short write"));
    /// let io_err = err.downcast_ref::<io::Error>().unwrap();
    /// assert_eq!(io_err.kind(), io::ErrorKind::WriteZero);
    /// ```
    #[must_use]
    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: core::error::Error + Send + Sync + 'static,
    {
        self.error.downcast_ref()
    }

    /// Attempts to downcast the inner error to a mutable reference of the concrete type.
    pub fn downcast_mut<E>(&mut self) -> Option<&mut E>
    where
        E: core::error::Error + Send + Sync + 'static,
    {
        self.error.downcast_mut()
    }

    /// Consume the error and return the inner `eyre::Report`.
    #[must_use]
    pub fn into_inner(self) -> eyre::Error {
        self.error
    }

    /// Converts this error into a boxed `http-kit` error, for hosts built on it.
    #[must_use]
    pub fn into_boxed_http_error(self) -> Box<dyn HttpError> {
        struct Wrapper {
            inner: Error,
        }

        impl core::error::Error for Wrapper {}
        impl core::fmt::Display for Wrapper {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.inner)
            }
        }
        impl core::fmt::Debug for Wrapper {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Debug::fmt(&self.inner, f)
            }
        }
        impl HttpError for Wrapper {
            fn status(&self) -> StatusCode {
                self.inner.status()
            }
        }
        Box::new(Wrapper { inner: self })
    }
}

impl<E: core::error::Error + Send + Sync + 'static> From<E> for Error {
    fn from(error: E) -> Self {
        Self::new(error, StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl core::fmt::Debug for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Debug::fmt(&self.error, f)
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.error, f)
    }
}

impl Deref for Error {
    type Target = dyn core::error::Error + Send + Sync + 'static;

    fn deref(&self) -> &Self::Target {
        &*self.error
    }
}

/// Extension trait that attaches an HTTP status code to `Result` and `Option` failures.
///
/// # Examples
///
/// ```rust
/// use rendition_core::{Result, ResultExt};
/// # use http::StatusCode;
///
/// fn lookup(id: u32) -> Result<&'static str> {
///     (id == 7).then_some("seven").status(StatusCode::NOT_FOUND)
/// }
///
/// assert_eq!(lookup(1).unwrap_err().status(), StatusCode::NOT_FOUND);
/// ```
pub trait ResultExt<T>
where
    Self: Sized,
{
    /// Associates an HTTP status code with an error or `None` value.
    ///
    /// # Errors
    ///
    /// Returns an `Error` when the result is `Err` or the option is `None`, using the provided status code.
    fn status(self, status: StatusCode) -> Result<T>;
}

impl<T, E> ResultExt<T> for core::result::Result<T, E>
where
    E: core::error::Error + Send + Sync + 'static,
{
    fn status(self, status: StatusCode) -> Result<T> {
        self.map_err(|error| Error::new(error, status))
    }
}

impl<T> ResultExt<T> for Option<T> {
    fn status(self, status: StatusCode) -> Result<T> {
        self.ok_or_else(|| Error::msg("None Error").set_status(status))
    }
}
