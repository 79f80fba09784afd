use wirebind_wire::WireValue;

use super::{runtime_mismatch, Converter};
use crate::context::{InboundContext, OutboundContext};
use crate::error::ConversionError;
use crate::types::HostType;
use crate::value::HostValue;
use crate::variable::OutboundVariable;

/// `option<T>`: wire null becomes [`HostValue::Null`], anything else is
/// converted as `T` through the context.
#[derive(Debug, Clone, Copy, Default)]
pub struct OptionalConverter;

impl Converter for OptionalConverter {
    fn name(&self) -> &'static str {
        "optional"
    }

    fn convert_inbound(
        &self,
        target: &HostType,
        data: &WireValue,
        ctx: &mut InboundContext<'_>,
    ) -> Result<HostValue, ConversionError> {
        let HostType::Optional(inner) = target else {
            return Err(ConversionError::unsupported(target));
        };
        if data.is_null() {
            return Ok(HostValue::Null);
        }
        ctx.convert(data, inner)
    }

    // Runtime values are never typed `option<T>`, so dispatch only lands
    // here for null or when a registry maps a concrete type onto this
    // converter, which it cannot serialize.
    fn convert_outbound(
        &self,
        data: &HostValue,
        _ctx: &mut OutboundContext<'_>,
    ) -> Result<OutboundVariable, ConversionError> {
        match data {
            HostValue::Null => Ok(OutboundVariable::leaf("null")),
            other => Err(runtime_mismatch(other, HostType::optional(HostType::String))),
        }
    }
}
