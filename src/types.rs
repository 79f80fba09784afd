//! Host type descriptors
//!
//! [`HostType`] names the type a wire value must become, and is also the
//! runtime type of a host value on the way out. [`TypeFamily`] groups types
//! for registry fallback.
//!
//! Types are written the way they appear in interface definitions:
//! `bool`, `char`, `s8`..`s64`, `u8`..`u64`, `f32`, `f64`, `string`,
//! `option<T>`, `list<T>` and `record<Name>`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A host type descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HostType {
    Bool,
    Char,
    S8,
    S16,
    S32,
    S64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    String,
    /// Nullable wrapper; the wire `null` maps to [`crate::HostValue::Null`]
    Optional(Box<HostType>),
    List(Box<HostType>),
    /// Named record type
    Record(String),
}

impl HostType {
    pub fn optional(inner: HostType) -> Self {
        HostType::Optional(Box::new(inner))
    }

    pub fn list(elem: HostType) -> Self {
        HostType::List(Box::new(elem))
    }

    pub fn record(name: impl Into<String>) -> Self {
        HostType::Record(name.into())
    }

    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            HostType::S8
                | HostType::S16
                | HostType::S32
                | HostType::S64
                | HostType::U8
                | HostType::U16
                | HostType::U32
                | HostType::U64
        )
    }

    pub fn is_float(&self) -> bool {
        matches!(self, HostType::F32 | HostType::F64)
    }

    pub fn is_numeric(&self) -> bool {
        self.is_integer() || self.is_float()
    }

    /// Numerics, `bool` and `char`.
    pub fn is_primitive(&self) -> bool {
        self.is_numeric() || matches!(self, HostType::Bool | HostType::Char)
    }
}

impl fmt::Display for HostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostType::Bool => f.write_str("bool"),
            HostType::Char => f.write_str("char"),
            HostType::S8 => f.write_str("s8"),
            HostType::S16 => f.write_str("s16"),
            HostType::S32 => f.write_str("s32"),
            HostType::S64 => f.write_str("s64"),
            HostType::U8 => f.write_str("u8"),
            HostType::U16 => f.write_str("u16"),
            HostType::U32 => f.write_str("u32"),
            HostType::U64 => f.write_str("u64"),
            HostType::F32 => f.write_str("f32"),
            HostType::F64 => f.write_str("f64"),
            HostType::String => f.write_str("string"),
            HostType::Optional(inner) => write!(f, "option<{}>", inner),
            HostType::List(elem) => write!(f, "list<{}>", elem),
            HostType::Record(name) => write!(f, "record<{}>", name),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid type descriptor {text:?}: {reason}")]
pub struct ParseTypeError {
    pub text: String,
    pub reason: &'static str,
}

impl FromStr for HostType {
    type Err = ParseTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let err = |reason| ParseTypeError {
            text: s.to_string(),
            reason,
        };

        if let Some((head, rest)) = text.split_once('<') {
            let inner = rest
                .strip_suffix('>')
                .ok_or_else(|| err("missing closing '>'"))?
                .trim();
            if inner.is_empty() {
                return Err(err("empty type argument"));
            }
            return match head.trim() {
                "option" => Ok(HostType::optional(inner.parse().map_err(|_| err("bad option argument"))?)),
                "list" => Ok(HostType::list(inner.parse().map_err(|_| err("bad list argument"))?)),
                "record" => {
                    if inner.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '.') {
                        Ok(HostType::record(inner))
                    } else {
                        Err(err("record name must be an identifier"))
                    }
                }
                _ => Err(err("unknown type constructor")),
            };
        }

        match text {
            "bool" => Ok(HostType::Bool),
            "char" => Ok(HostType::Char),
            "s8" => Ok(HostType::S8),
            "s16" => Ok(HostType::S16),
            "s32" => Ok(HostType::S32),
            "s64" => Ok(HostType::S64),
            "u8" => Ok(HostType::U8),
            "u16" => Ok(HostType::U16),
            "u32" => Ok(HostType::U32),
            "u64" => Ok(HostType::U64),
            "f32" => Ok(HostType::F32),
            "f64" => Ok(HostType::F64),
            "string" => Ok(HostType::String),
            _ => Err(err("unknown type name")),
        }
    }
}

/// A group of host types a single converter can serve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeFamily {
    /// All signed and unsigned integer types
    Integer,
    /// `f32` and `f64`
    Float,
    /// Integers and floats
    Numeric,
    /// Numerics plus `bool` and `char`
    Primitive,
    /// Every `option<T>`
    Optional,
    /// Every `list<T>`
    List,
    /// Every named record
    Record,
    /// Catch-all
    Any,
}

impl TypeFamily {
    pub fn contains(&self, ty: &HostType) -> bool {
        match self {
            TypeFamily::Integer => ty.is_integer(),
            TypeFamily::Float => ty.is_float(),
            TypeFamily::Numeric => ty.is_numeric(),
            TypeFamily::Primitive => ty.is_primitive(),
            TypeFamily::Optional => matches!(ty, HostType::Optional(_)),
            TypeFamily::List => matches!(ty, HostType::List(_)),
            TypeFamily::Record => matches!(ty, HostType::Record(_)),
            TypeFamily::Any => true,
        }
    }

    /// Lower is more specific. Families with equal rank never overlap,
    /// except `Any`, which is alone at the bottom.
    pub fn specificity(&self) -> u8 {
        match self {
            TypeFamily::Integer | TypeFamily::Float => 0,
            TypeFamily::Numeric => 1,
            TypeFamily::Primitive => 2,
            TypeFamily::Optional | TypeFamily::List | TypeFamily::Record => 0,
            TypeFamily::Any => u8::MAX,
        }
    }
}

impl fmt::Display for TypeFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TypeFamily::Integer => "integer",
            TypeFamily::Float => "float",
            TypeFamily::Numeric => "numeric",
            TypeFamily::Primitive => "primitive",
            TypeFamily::Optional => "optional",
            TypeFamily::List => "list",
            TypeFamily::Record => "record",
            TypeFamily::Any => "any",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_nested_types() {
        let ty: HostType = "list< option<u8> >".parse().unwrap();
        assert_eq!(ty, HostType::list(HostType::optional(HostType::U8)));
        assert_eq!(ty.to_string(), "list<option<u8>>");
        assert_eq!("record<Person>".parse::<HostType>().unwrap(), HostType::record("Person"));
    }

    #[test]
    fn parse_rejects_unknown() {
        assert!("int".parse::<HostType>().is_err());
        assert!("list<s32".parse::<HostType>().is_err());
        assert!("map<string>".parse::<HostType>().is_err());
        assert!("record<a b>".parse::<HostType>().is_err());
    }

    #[test]
    fn family_membership() {
        assert!(TypeFamily::Integer.contains(&HostType::U16));
        assert!(!TypeFamily::Integer.contains(&HostType::F32));
        assert!(TypeFamily::Primitive.contains(&HostType::Char));
        assert!(!TypeFamily::Primitive.contains(&HostType::String));
        assert!(TypeFamily::Numeric.specificity() < TypeFamily::Primitive.specificity());
    }
}
