//! Conversion failures
//!
//! Three kinds, never collapsed into each other and never replaced by a
//! default value: the text did not parse, the value does not fit the
//! declared type, or nothing knows how to convert the type at all.

use thiserror::Error;

use crate::types::HostType;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConversionError {
    /// Wire text cannot be parsed into the declared type.
    #[error("cannot parse {text:?} as {target}")]
    Format { target: HostType, text: String },

    /// The wire value is well-formed but not assignable to the declared type.
    #[error("value is not assignable to {target}")]
    TypeMismatch { target: HostType },

    /// No converter is registered for the declared or runtime type.
    #[error("no converter registered for {target}")]
    UnsupportedType { target: HostType },
}

/// The kind of a [`ConversionError`], for transports that map kinds onto
/// response codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Format,
    TypeMismatch,
    UnsupportedType,
}

impl ConversionError {
    pub fn format(target: &HostType, text: impl Into<String>) -> Self {
        ConversionError::Format {
            target: target.clone(),
            text: text.into(),
        }
    }

    pub fn mismatch(target: &HostType) -> Self {
        ConversionError::TypeMismatch {
            target: target.clone(),
        }
    }

    pub fn unsupported(target: &HostType) -> Self {
        ConversionError::UnsupportedType {
            target: target.clone(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ConversionError::Format { .. } => ErrorKind::Format,
            ConversionError::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            ConversionError::UnsupportedType { .. } => ErrorKind::UnsupportedType,
        }
    }

    pub fn target(&self) -> &HostType {
        match self {
            ConversionError::Format { target, .. }
            | ConversionError::TypeMismatch { target }
            | ConversionError::UnsupportedType { target } => target,
        }
    }

    /// The literal offending text, for format errors.
    pub fn text(&self) -> Option<&str> {
        match self {
            ConversionError::Format { text, .. } => Some(text),
            _ => None,
        }
    }
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Format => "format",
            ErrorKind::TypeMismatch => "type-mismatch",
            ErrorKind::UnsupportedType => "unsupported-type",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
