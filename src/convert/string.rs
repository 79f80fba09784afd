use wirebind_wire::{percent_decode, quote_string, WireValue};

use super::{runtime_mismatch, Converter};
use crate::context::{InboundContext, OutboundContext};
use crate::error::ConversionError;
use crate::types::HostType;
use crate::value::HostValue;
use crate::variable::OutboundVariable;

/// Strings. Inbound text is decoded but not trimmed.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringConverter;

impl Converter for StringConverter {
    fn name(&self) -> &'static str {
        "string"
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
        percent_decode(data.raw())
            .map(HostValue::String)
            .map_err(|_| ConversionError::format(target, data.raw()))
    }

    fn convert_outbound(
        &self,
        data: &HostValue,
        ctx: &mut OutboundContext<'_>,
    ) -> Result<OutboundVariable, ConversionError> {
        match data {
            HostValue::String(s) => Ok(OutboundVariable::leaf(quote_string(
                s,
                ctx.config().escape_non_ascii,
            ))),
            other => Err(runtime_mismatch(other, HostType::String)),
        }
    }
}
