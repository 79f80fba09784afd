//! Booleans, characters and numbers

use std::str::FromStr;

use wirebind_wire::{quote_string, WireValue};

use super::{runtime_mismatch, Converter};
use crate::context::{InboundContext, OutboundContext};
use crate::error::ConversionError;
use crate::types::HostType;
use crate::value::HostValue;
use crate::variable::OutboundVariable;

/// Converter for all primitive types.
///
/// Inbound text is trimmed, decoded, then parsed exactly: no defaults for
/// empty text, no truncation, no out-of-range wrapping.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrimitiveConverter;

impl Converter for PrimitiveConverter {
    fn name(&self) -> &'static str {
        "primitive"
    }

    fn convert_inbound(
        &self,
        target: &HostType,
        data: &WireValue,
        _ctx: &mut InboundContext<'_>,
    ) -> Result<HostValue, ConversionError> {
        if !data.kind().is_scalar() {
            return Err(ConversionError::mismatch(target));
        }
        let text = data
            .decoded()
            .map_err(|_| ConversionError::format(target, data.raw()))?;
        parse_primitive(target, &text)
    }

    fn convert_outbound(
        &self,
        data: &HostValue,
        ctx: &mut OutboundContext<'_>,
    ) -> Result<OutboundVariable, ConversionError> {
        let text = match data {
            HostValue::Bool(true) => "true".to_string(),
            HostValue::Bool(false) => "false".to_string(),
            // Characters travel as one-character strings
            HostValue::Char(c) => {
                let mut buf = [0u8; 4];
                quote_string(c.encode_utf8(&mut buf), ctx.config().escape_non_ascii)
            }
            HostValue::S8(n) => n.to_string(),
            HostValue::S16(n) => n.to_string(),
            HostValue::S32(n) => n.to_string(),
            HostValue::S64(n) => n.to_string(),
            HostValue::U8(n) => n.to_string(),
            HostValue::U16(n) => n.to_string(),
            HostValue::U32(n) => n.to_string(),
            HostValue::U64(n) => n.to_string(),
            HostValue::F32(n) => float_text(f64::from(*n), n.to_string()),
            HostValue::F64(n) => float_text(*n, n.to_string()),
            other => return Err(runtime_mismatch(other, HostType::Bool)),
        };
        Ok(OutboundVariable::leaf(text))
    }
}

/// Parse trimmed, decoded text as `target`.
pub(crate) fn parse_primitive(target: &HostType, text: &str) -> Result<HostValue, ConversionError> {
    match target {
        HostType::Bool => match text {
            "true" => Ok(HostValue::Bool(true)),
            "false" => Ok(HostValue::Bool(false)),
            _ => Err(ConversionError::format(target, text)),
        },
        HostType::Char => {
            let mut chars = text.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(HostValue::Char(c)),
                _ => Err(ConversionError::mismatch(target)),
            }
        }
        HostType::S8 => parse_number(target, text).map(HostValue::S8),
        HostType::S16 => parse_number(target, text).map(HostValue::S16),
        HostType::S32 => parse_number(target, text).map(HostValue::S32),
        HostType::S64 => parse_number(target, text).map(HostValue::S64),
        HostType::U8 => parse_number(target, text).map(HostValue::U8),
        HostType::U16 => parse_number(target, text).map(HostValue::U16),
        HostType::U32 => parse_number(target, text).map(HostValue::U32),
        HostType::U64 => parse_number(target, text).map(HostValue::U64),
        HostType::F32 => parse_number(target, text).map(HostValue::F32),
        HostType::F64 => parse_number(target, text).map(HostValue::F64),
        _ => Err(ConversionError::unsupported(target)),
    }
}

fn parse_number<T: FromStr>(target: &HostType, text: &str) -> Result<T, ConversionError> {
    text.parse::<T>()
        .map_err(|_| ConversionError::format(target, text))
}

// Non-finite values use the script spellings
fn float_text(value: f64, display: String) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value == f64::INFINITY {
        "Infinity".to_string()
    } else if value == f64::NEG_INFINITY {
        "-Infinity".to_string()
    } else {
        display
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_each_kind() {
        assert_eq!(parse_primitive(&HostType::Bool, "true"), Ok(HostValue::Bool(true)));
        assert_eq!(parse_primitive(&HostType::Char, "é"), Ok(HostValue::Char('é')));
        assert_eq!(parse_primitive(&HostType::S16, "-300"), Ok(HostValue::S16(-300)));
        assert_eq!(parse_primitive(&HostType::U64, "18446744073709551615"), Ok(HostValue::U64(u64::MAX)));
        assert_eq!(parse_primitive(&HostType::F64, "2.5e3"), Ok(HostValue::F64(2500.0)));
    }

    #[test]
    fn out_of_range_is_a_format_error() {
        assert_eq!(
            parse_primitive(&HostType::U8, "256"),
            Err(ConversionError::format(&HostType::U8, "256"))
        );
        assert_eq!(
            parse_primitive(&HostType::S32, ""),
            Err(ConversionError::format(&HostType::S32, ""))
        );
    }

    #[test]
    fn char_arity_is_a_mismatch() {
        assert_eq!(
            parse_primitive(&HostType::Char, "ab"),
            Err(ConversionError::mismatch(&HostType::Char))
        );
    }

    #[test]
    fn non_finite_spellings() {
        assert_eq!(float_text(f64::NAN, "NaN".into()), "NaN");
        assert_eq!(float_text(f64::NEG_INFINITY, "-inf".into()), "-Infinity");
        assert_eq!(float_text(0.5, "0.5".into()), "0.5");
    }
}
