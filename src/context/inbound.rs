//! Inbound conversion context
//!
//! Wire values of a call can point at each other (`reference:c0-e2`). The
//! context resolves each referenced id at most once per declared type:
//!
//! - before the referenced value is converted, it is marked
//!   [`InboundState::InProgress`]
//! - a composite converter publishes an empty placeholder for it through
//!   [`InboundContext::defer`] before converting children
//! - afterwards it is [`InboundState::Resolved`] with the produced value
//!
//! A reference that reaches a value still in progress gets the placeholder,
//! which the composite converter fills once its children are done. If there
//! is no placeholder (the target cannot be built before its contents, such
//! as a primitive) the cycle is a type mismatch for that target.
//!
//! State is kept per id and declared type, with `option<T>` counted as `T`.
//! The same id read as two different types is two independent objects, each
//! with its own cycle tracking.

use std::collections::HashMap;

use tracing::trace;
use wirebind_wire::{WireBatch, WireValue};

use crate::config::MarshalConfig;
use crate::error::ConversionError;
use crate::registry::ConverterRegistry;
use crate::types::HostType;
use crate::value::HostValue;

/// Resolution state of one referenced wire id.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundState {
    /// Conversion has started; holds the placeholder once one is published
    InProgress(Option<HostValue>),
    Resolved(HostValue),
}

// Referenced id plus the declared type with optional wrappers removed
type StateKey = (String, HostType);

pub struct InboundContext<'a> {
    registry: &'a ConverterRegistry,
    config: &'a MarshalConfig,
    batch: &'a WireBatch,
    states: HashMap<StateKey, InboundState>,
    // Referenced values whose conversion is running, innermost last
    frames: Vec<StateKey>,
    depth: usize,
}

impl<'a> InboundContext<'a> {
    pub fn new(
        registry: &'a ConverterRegistry,
        config: &'a MarshalConfig,
        batch: &'a WireBatch,
    ) -> Self {
        Self {
            registry,
            config,
            batch,
            states: HashMap::new(),
            frames: Vec::new(),
            depth: 0,
        }
    }

    /// Convert parameter `index` of the batch to `target`.
    ///
    /// The parameter is the one whose id names `index`, wherever it appeared
    /// in the call. A missing parameter is a mismatch: the call does not
    /// have the arity the target signature expects.
    pub fn convert_param(
        &mut self,
        index: usize,
        target: &HostType,
    ) -> Result<HostValue, ConversionError> {
        let batch = self.batch;
        let (id, _) = batch
            .param(index)
            .ok_or_else(|| ConversionError::mismatch(target))?;
        self.convert_id(id, target)
    }

    /// Convert one wire value, following it if it is a reference.
    pub fn convert(
        &mut self,
        data: &WireValue,
        target: &HostType,
    ) -> Result<HostValue, ConversionError> {
        match data.reference_id() {
            Some(id) => self.convert_id(id, target),
            None => self.convert_inline(data, target),
        }
    }

    /// Convert the wire value stored under `id`, reusing an earlier result
    /// for the same id and type.
    pub fn convert_id(&mut self, id: &str, target: &HostType) -> Result<HostValue, ConversionError> {
        let key = state_key(id, target);
        match self.states.get(&key) {
            Some(InboundState::Resolved(value)) => {
                // A null read through `option<T>` does not satisfy `T`
                if value.is_null() && !matches!(target, HostType::Optional(_)) {
                    return Err(ConversionError::mismatch(target));
                }
                trace!(id, %target, "reusing resolved value");
                return Ok(value.clone());
            }
            Some(InboundState::InProgress(Some(placeholder))) => {
                trace!(id, %target, "back-reference to value in progress");
                return Ok(placeholder.clone());
            }
            Some(InboundState::InProgress(None)) => {
                trace!(id, %target, "cycle through a target without placeholder");
                return Err(ConversionError::mismatch(target));
            }
            None => {}
        }

        let batch = self.batch;
        let data = batch
            .get(id)
            .ok_or_else(|| ConversionError::format(target, format!("reference:{}", id)))?;

        trace!(id, %target, "resolving");
        self.states
            .insert(key.clone(), InboundState::InProgress(None));
        self.frames.push(key.clone());
        let result = self.convert(data, target);
        self.frames.pop();

        match &result {
            Ok(value) => {
                self.states
                    .insert(key, InboundState::Resolved(value.clone()));
            }
            Err(_) => {
                self.states.remove(&key);
            }
        }
        result
    }

    /// Publish the placeholder for the referenced value currently being
    /// resolved.
    ///
    /// Only the first placeholder counts; later calls (and calls outside any
    /// referenced conversion) are ignored.
    pub fn defer(&mut self, placeholder: HostValue) {
        let Some(key) = self.frames.last() else {
            return;
        };
        if let Some(state) = self.states.get_mut(key) {
            if matches!(state, InboundState::InProgress(None)) {
                trace!(id = key.0.as_str(), "placeholder published");
                *state = InboundState::InProgress(Some(placeholder));
            }
        }
    }

    /// State of a referenced id as read for `target`, if it has been
    /// reached in this call.
    pub fn state(&self, id: &str, target: &HostType) -> Option<&InboundState> {
        self.states.get(&state_key(id, target))
    }

    // Every nested converter call counts toward the depth limit, including
    // `option<T>` wrappers.
    fn convert_inline(
        &mut self,
        data: &WireValue,
        target: &HostType,
    ) -> Result<HostValue, ConversionError> {
        if self.depth >= self.config.max_inbound_depth {
            return Err(ConversionError::mismatch(target));
        }
        let registry = self.registry;
        let converter = registry.resolve(target)?;

        self.depth += 1;
        let result = converter.convert_inbound(target, data, self);
        self.depth -= 1;
        result
    }
}

fn state_key(id: &str, target: &HostType) -> StateKey {
    let mut ty = target;
    while let HostType::Optional(inner) = ty {
        ty = inner;
    }
    (id.to_string(), ty.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch(body: &str) -> WireBatch {
        WireBatch::parse_lines(body)
    }

    #[test]
    fn state_moves_to_resolved() {
        let registry = ConverterRegistry::with_defaults();
        let config = MarshalConfig::default();
        let batch = batch("c0-param0=reference:c0-e1\nc0-e1=number:5");
        let mut ctx = InboundContext::new(&registry, &config, &batch);

        let value = ctx.convert_param(0, &HostType::S32).unwrap();
        assert_eq!(value, HostValue::S32(5));
        assert_eq!(
            ctx.state("c0-e1", &HostType::S32),
            Some(&InboundState::Resolved(HostValue::S32(5)))
        );
        assert_eq!(
            ctx.state("c0-e1", &HostType::optional(HostType::S32)),
            Some(&InboundState::Resolved(HostValue::S32(5)))
        );
    }

    #[test]
    fn failed_resolution_leaves_no_state() {
        let registry = ConverterRegistry::with_defaults();
        let config = MarshalConfig::default();
        let batch = batch("c0-param0=number:12x");
        let mut ctx = InboundContext::new(&registry, &config, &batch);

        assert!(ctx.convert_param(0, &HostType::S32).is_err());
        assert_eq!(ctx.state("c0-param0", &HostType::S32), None);
    }

    #[test]
    fn self_reference_without_placeholder_is_a_mismatch() {
        let registry = ConverterRegistry::with_defaults();
        let config = MarshalConfig::default();
        let batch = batch("c0-param0=reference:c0-param0");
        let mut ctx = InboundContext::new(&registry, &config, &batch);

        assert_eq!(
            ctx.convert_param(0, &HostType::S32),
            Err(ConversionError::mismatch(&HostType::S32))
        );
    }

    #[test]
    fn defer_outside_reference_is_ignored() {
        let registry = ConverterRegistry::with_defaults();
        let config = MarshalConfig::default();
        let batch = WireBatch::new();
        let mut ctx = InboundContext::new(&registry, &config, &batch);

        ctx.defer(HostValue::Null);
        let value = ctx
            .convert(&WireValue::parse("array:[number:1,number:2]"), &HostType::list(HostType::U8))
            .unwrap();
        assert_eq!(value.host_type(), Some(HostType::list(HostType::U8)));
    }

    #[test]
    fn depth_limit() {
        let registry = ConverterRegistry::with_defaults();
        let config = MarshalConfig {
            max_inbound_depth: 2,
            ..MarshalConfig::default()
        };
        let batch = batch("c0-param0=array:[reference:c0-e1]\nc0-e1=array:[reference:c0-e2]\nc0-e2=array:[]");
        let mut ctx = InboundContext::new(&registry, &config, &batch);
        let ty = HostType::list(HostType::list(HostType::list(HostType::S32)));

        assert_eq!(
            ctx.convert_param(0, &ty),
            Err(ConversionError::mismatch(&HostType::list(HostType::S32)))
        );
    }

    #[test]
    fn optional_wrappers_count_toward_depth() {
        use crate::convert::{RecordConverter, RecordSchema};

        let node = HostType::record("Node");
        let schema = RecordSchema::new("Node")
            .field("name", HostType::String)
            .field("next", HostType::optional(node.clone()));
        let mut registry = ConverterRegistry::with_defaults();
        registry.register(node.clone(), RecordConverter::new().with_schema(schema));
        let batch = batch(
            "c0-param0=reference:c0-e1\n\
             c0-e1=Object_Node:{name:string:a,next:reference:c0-e2}\n\
             c0-e2=Object_Node:{name:string:b}",
        );

        // record, option, record, string
        let config = MarshalConfig {
            max_inbound_depth: 4,
            ..MarshalConfig::default()
        };
        let mut ctx = InboundContext::new(&registry, &config, &batch);
        assert!(ctx.convert_param(0, &node).is_ok());

        let config = MarshalConfig {
            max_inbound_depth: 3,
            ..MarshalConfig::default()
        };
        let mut ctx = InboundContext::new(&registry, &config, &batch);
        assert_eq!(
            ctx.convert_param(0, &node),
            Err(ConversionError::mismatch(&HostType::String))
        );
    }
}
