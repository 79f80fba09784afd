use wirebind_wire::{split_array, WireKind, WireValue};

use super::{runtime_mismatch, Converter};
use crate::context::{InboundContext, OutboundContext};
use crate::error::ConversionError;
use crate::types::HostType;
use crate::value::{HostValue, List, Shared};
use crate::variable::{MemberKey, MemberValue, OutboundVariable};

/// `list<T>` in both directions.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListConverter;

impl Converter for ListConverter {
    fn name(&self) -> &'static str {
        "list"
    }

    fn convert_inbound(
        &self,
        target: &HostType,
        data: &WireValue,
        ctx: &mut InboundContext<'_>,
    ) -> Result<HostValue, ConversionError> {
        let HostType::List(elem) = target else {
            return Err(ConversionError::unsupported(target));
        };
        if !matches!(data.kind(), WireKind::Array | WireKind::Untyped) {
            return Err(ConversionError::mismatch(target));
        }
        let items = split_array(data.raw()).map_err(|e| ConversionError::format(target, e.text()))?;

        let list = Shared::new(List {
            elem_type: (**elem).clone(),
            items: Vec::new(),
        });
        ctx.defer(HostValue::List(list.clone()));

        let mut values = Vec::with_capacity(items.len());
        for item in &items {
            values.push(ctx.convert(item, elem)?);
        }
        list.write().items = values;
        Ok(HostValue::List(list))
    }

    fn convert_outbound(
        &self,
        data: &HostValue,
        _ctx: &mut OutboundContext<'_>,
    ) -> Result<OutboundVariable, ConversionError> {
        let HostValue::List(list) = data else {
            return Err(runtime_mismatch(data, HostType::list(HostType::String)));
        };
        // Items are handed back as handles; the context converts them
        let members = list
            .read()
            .items
            .iter()
            .enumerate()
            .map(|(index, item)| (MemberKey::Index(index), MemberValue::Pending(item.clone())))
            .collect();
        Ok(OutboundVariable::composite("[]", members))
    }
}
