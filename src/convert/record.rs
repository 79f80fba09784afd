//! Named records
//!
//! Outbound, any record converts: its fields are walked in order. Inbound
//! needs to know what each member must become, so the converter carries a
//! [`RecordSchema`] per record name and treats unknown names as unsupported.

use std::collections::{HashMap, HashSet};

use wirebind_wire::{split_object, WireKind, WireValue};

use super::{runtime_mismatch, Converter};
use crate::context::{InboundContext, OutboundContext};
use crate::error::ConversionError;
use crate::types::HostType;
use crate::value::{HostValue, Record, Shared};
use crate::variable::{MemberKey, MemberValue, OutboundVariable};

/// Field layout of one record type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSchema {
    name: String,
    fields: Vec<(String, HostType)>,
}

impl RecordSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, name: impl Into<String>, ty: HostType) -> Self {
        self.fields.push((name.into(), ty));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[(String, HostType)] {
        &self.fields
    }

    pub fn field_type(&self, name: &str) -> Option<&HostType> {
        self.fields.iter().find(|(key, _)| key == name).map(|(_, ty)| ty)
    }
}

#[derive(Debug, Clone, Default)]
pub struct RecordConverter {
    schemas: HashMap<String, RecordSchema>,
}

impl RecordConverter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_schema(mut self, schema: RecordSchema) -> Self {
        self.schemas.insert(schema.name().to_string(), schema);
        self
    }
}

impl Converter for RecordConverter {
    fn name(&self) -> &'static str {
        "record"
    }

    fn convert_inbound(
        &self,
        target: &HostType,
        data: &WireValue,
        ctx: &mut InboundContext<'_>,
    ) -> Result<HostValue, ConversionError> {
        let HostType::Record(name) = target else {
            return Err(ConversionError::unsupported(target));
        };
        let schema = self
            .schemas
            .get(name)
            .ok_or_else(|| ConversionError::unsupported(target))?;
        if !matches!(data.kind(), WireKind::Object | WireKind::Untyped) {
            return Err(ConversionError::mismatch(target));
        }
        let members = split_object(data.raw()).map_err(|e| ConversionError::format(target, e.text()))?;
        // Unknown and repeated members are both mismatches
        let mut seen = HashSet::new();
        if members
            .iter()
            .any(|(key, _)| schema.field_type(key).is_none() || !seen.insert(key.as_str()))
        {
            return Err(ConversionError::mismatch(target));
        }

        let record = Shared::new(Record::new(name.clone()));
        ctx.defer(HostValue::Record(record.clone()));

        let mut fields = Vec::with_capacity(schema.fields().len());
        for (field, ty) in schema.fields() {
            let value = match members.iter().find(|(key, _)| key == field) {
                Some((_, item)) => ctx.convert(item, ty)?,
                None if matches!(ty, HostType::Optional(_)) => HostValue::Null,
                None => return Err(ConversionError::mismatch(target)),
            };
            fields.push((field.clone(), value));
        }
        record.write().fields = fields;
        Ok(HostValue::Record(record))
    }

    fn convert_outbound(
        &self,
        data: &HostValue,
        _ctx: &mut OutboundContext<'_>,
    ) -> Result<OutboundVariable, ConversionError> {
        let HostValue::Record(record) = data else {
            return Err(runtime_mismatch(data, HostType::record("Object")));
        };
        let members = record
            .read()
            .fields
            .iter()
            .map(|(key, value)| (MemberKey::Field(key.clone()), MemberValue::Pending(value.clone())))
            .collect();
        Ok(OutboundVariable::composite("{}", members))
    }
}
