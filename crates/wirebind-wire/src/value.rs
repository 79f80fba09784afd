//! Wire values

use alloc::string::String;

use crate::{percent_decode, WireError};

/// Coarse classification of a wire value by its type hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WireKind {
    /// No hint was attached
    Untyped,
    Number,
    Boolean,
    String,
    Null,
    /// Back-reference to another wire value of the same call
    Reference,
    Array,
    Object,
    /// A hint this crate does not know; converters decide what to do with it
    Other,
}

impl WireKind {
    /// Classify a type hint. Matching is ASCII case-insensitive, and
    /// `Object_<Name>` hints (the object form carrying a class name) count as
    /// objects.
    pub fn from_hint(hint: &str) -> Self {
        let hint = hint.trim();
        if hint.eq_ignore_ascii_case("number") {
            WireKind::Number
        } else if hint.eq_ignore_ascii_case("boolean") {
            WireKind::Boolean
        } else if hint.eq_ignore_ascii_case("string") {
            WireKind::String
        } else if hint.eq_ignore_ascii_case("null") || hint.eq_ignore_ascii_case("undefined") {
            WireKind::Null
        } else if hint.eq_ignore_ascii_case("reference") {
            WireKind::Reference
        } else if hint.eq_ignore_ascii_case("array") {
            WireKind::Array
        } else if hint.eq_ignore_ascii_case("object")
            || hint
                .get(..7)
                .is_some_and(|prefix| prefix.eq_ignore_ascii_case("object_"))
        {
            WireKind::Object
        } else {
            WireKind::Other
        }
    }

    /// Whether values of this kind are scalars (not aggregates or references).
    pub fn is_scalar(self) -> bool {
        matches!(
            self,
            WireKind::Untyped | WireKind::Number | WireKind::Boolean | WireKind::String
        )
    }
}

/// One value as the remote caller sent it.
///
/// Immutable once built. The raw text is kept exactly as received (still
/// percent-encoded); use [`WireValue::decoded`] to read it.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WireValue {
    raw: String,
    type_hint: Option<String>,
}

impl WireValue {
    /// A value without a type hint.
    pub fn new(raw: impl Into<String>) -> Self {
        Self {
            raw: raw.into(),
            type_hint: None,
        }
    }

    /// A value with an explicit type hint.
    pub fn with_hint(hint: impl Into<String>, raw: impl Into<String>) -> Self {
        Self {
            raw: raw.into(),
            type_hint: Some(hint.into()),
        }
    }

    /// A back-reference to the wire value stored under `id`.
    pub fn reference(id: impl Into<String>) -> Self {
        Self::with_hint("reference", id)
    }

    /// Split tagged text (`number:42`, `reference:c0-e1`) at its first `:`.
    ///
    /// Text whose prefix is not a plausible hint (letters, digits and `_`)
    /// is taken as an untyped raw value in full.
    pub fn parse(tagged: &str) -> Self {
        match tagged.split_once(':') {
            Some((hint, raw)) if is_hint(hint) => Self::with_hint(hint, raw),
            _ => Self::new(tagged),
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn type_hint(&self) -> Option<&str> {
        self.type_hint.as_deref()
    }

    pub fn kind(&self) -> WireKind {
        match &self.type_hint {
            Some(hint) => WireKind::from_hint(hint),
            None => WireKind::Untyped,
        }
    }

    /// The referenced id, if this is a back-reference.
    pub fn reference_id(&self) -> Option<&str> {
        match self.kind() {
            WireKind::Reference => Some(self.raw.trim()),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        self.kind() == WireKind::Null
    }

    /// Trimmed and percent-decoded raw text.
    pub fn decoded(&self) -> Result<String, WireError> {
        percent_decode(self.raw.trim())
    }
}

fn is_hint(text: &str) -> bool {
    !text.is_empty()
        && text
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}
