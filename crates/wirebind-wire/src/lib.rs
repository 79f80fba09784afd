//! Wire value model for wirebind
//!
//! Everything the remote caller sends arrives as text. This crate holds the
//! representation of that text before any host type is involved:
//!
//! - [`WireValue`]: one raw value plus the type hint the caller attached
//! - [`WireBatch`]: every wire value of one call, addressable by id
//! - escaping helpers for both directions (percent-decoding inbound, string
//!   escaping outbound)
//! - splitting of array/object wire text into their tagged items
//!
//! The crate is `no_std` + `alloc` so it can be shared with constrained
//! transports; the `std` feature only adds `std::error::Error` impls.

#![no_std]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

mod batch;
mod escape;
mod syntax;
mod value;

pub use batch::WireBatch;
pub use escape::{escape_string, percent_decode, percent_encode, quote_string};
pub use syntax::{split_array, split_object};
pub use value::{WireKind, WireValue};

use alloc::string::String;
use core::fmt;

/// Errors raised while reading wire text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireError {
    /// A `%` escape that is truncated or not followed by two hex digits
    InvalidEscape { text: String, position: usize },
    /// Percent-decoded bytes that are not UTF-8
    InvalidUtf8 { text: String },
    /// Array or object text without its opening/closing delimiter
    Unbalanced { text: String, open: char, close: char },
    /// Object member without a `key:value` separator
    MissingKey { text: String },
}

impl WireError {
    /// The literal wire text that could not be read.
    pub fn text(&self) -> &str {
        match self {
            WireError::InvalidEscape { text, .. }
            | WireError::InvalidUtf8 { text }
            | WireError::Unbalanced { text, .. }
            | WireError::MissingKey { text } => text,
        }
    }
}

impl fmt::Display for WireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireError::InvalidEscape { text, position } => {
                write!(f, "invalid percent escape at byte {} in {:?}", position, text)
            }
            WireError::InvalidUtf8 { text } => write!(f, "decoded text is not UTF-8: {:?}", text),
            WireError::Unbalanced { text, open, close } => {
                write!(f, "expected {}...{} around {:?}", open, close, text)
            }
            WireError::MissingKey { text } => write!(f, "object member without key: {:?}", text),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for WireError {}
