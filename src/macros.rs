macro_rules! impl_error {
    ($ty:ident, $message:expr, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
        pub struct $ty;

        impl core::fmt::Display for $ty {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str($message)
            }
        }

        impl core::error::Error for $ty {}
    };
}

macro_rules! error_constructors {
    ($($(#[$meta:meta])* $name:ident => $status:ident),* $(,)?) => {
        $(
            $(#[$meta])*
            #[doc = ""]
            #[doc = concat!("Shorthand for `Response::custom(StatusCode::", stringify!($status), ").with_error(..)`.")]
            #[must_use]
            pub fn $name(
                error: impl Into<rendition_core::Error>,
                public_message: impl Into<String>,
            ) -> Self {
                Self::custom(http::StatusCode::$status).with_error(error, public_message)
            }
        )*
    };
}
