//! Provides logging facilities for the transducer crates.
//!
//! The macros forward to [`defmt`](https://docs.rs/defmt) when the `defmt` feature is enabled,
//! to the [`log`](https://docs.rs/log) facade when the `log` feature is enabled, and compile to
//! nothing otherwise.
//!
//! Format strings must stick to plain `{}` placeholders, which both backends accept.

#![cfg_attr(not(test), no_std)]
#![deny(missing_docs)]
#![deny(clippy::pedantic)]

#[cfg(all(feature = "defmt", feature = "log"))]
compile_error!("feature \"defmt\" and feature \"log\" cannot be enabled at the same time");

#[doc(hidden)]
pub mod hidden {
    // Required so the macros can name the backend from any crate.
    #[cfg(feature = "defmt")]
    pub use defmt;
    #[cfg(feature = "log")]
    pub use log;
}

#[cfg(feature = "defmt")]
#[doc(hidden)]
#[macro_export]
macro_rules! __dispatch {
    ($level:ident, $($arg:tt)*) => {{
        use $crate::hidden::defmt;
        defmt::$level!($($arg)*);
    }};
}

#[cfg(feature = "log")]
#[doc(hidden)]
#[macro_export]
macro_rules! __dispatch {
    ($level:ident, $($arg:tt)*) => {{
        $crate::hidden::log::$level!($($arg)*);
    }};
}

#[cfg(not(any(feature = "defmt", feature = "log")))]
#[doc(hidden)]
#[macro_export]
macro_rules! __dispatch {
    ($level:ident, $($arg:tt)*) => {{
        // Evaluate the arguments so that they do not trigger unused warnings.
        let _ = ($($arg)*);
    }};
}

/// Logs a message at the trace level.
#[macro_export]
macro_rules! trace {
    ($($arg:tt)*) => {
        $crate::__dispatch!(trace, $($arg)*)
    };
}

/// Logs a message at the debug level.
#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {
        $crate::__dispatch!(debug, $($arg)*)
    };
}

/// Logs a message at the info level.
#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        $crate::__dispatch!(info, $($arg)*)
    };
}

/// Logs a message at the warn level.
#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        $crate::__dispatch!(warn, $($arg)*)
    };
}

/// Logs a message at the error level.
#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        $crate::__dispatch!(error, $($arg)*)
    };
}
