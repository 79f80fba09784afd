//! Outbound conversion context
//!
//! Every list or record gets a name the first time it is reached. The name
//! is reserved (and the object marked [`OutboundState::InProgress`]) before
//! its converter runs, so a path that leads back to the object while it is
//! being converted emits the name instead of recursing. Once done, the
//! object is [`OutboundState::Resolved`] and every later occurrence in the
//! call is the bare name.
//!
//! Identities are addresses of live objects. Values handed to one context
//! must stay alive until the context is dropped.

use std::collections::{HashMap, HashSet};

use tracing::trace;

use crate::config::MarshalConfig;
use crate::error::ConversionError;
use crate::registry::ConverterRegistry;
use crate::value::{HostValue, Identity};
use crate::variable::{Binding, MemberKey, MemberValue, OutboundVariable};

/// Resolution state of one host object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundState {
    InProgress(String),
    Resolved(String),
}

impl OutboundState {
    pub fn name(&self) -> &str {
        match self {
            OutboundState::InProgress(name) | OutboundState::Resolved(name) => name,
        }
    }
}

enum Step {
    Done(OutboundVariable),
    Open(Frame),
}

// An object whose name is reserved and whose members are being assigned
struct Frame {
    identity: Option<Identity>,
    binding: Binding,
    // Key of the member currently being converted
    waiting: Option<MemberKey>,
}

impl Frame {
    fn assign(&mut self, variable: OutboundVariable) {
        if let Some(key) = self.waiting.take() {
            self.binding.assign(key, variable);
        }
    }
}

pub struct OutboundContext<'a> {
    registry: &'a ConverterRegistry,
    config: &'a MarshalConfig,
    states: HashMap<Identity, OutboundState>,
    used_names: HashSet<String>,
    next_index: usize,
}

impl<'a> OutboundContext<'a> {
    pub fn new(registry: &'a ConverterRegistry, config: &'a MarshalConfig) -> Self {
        Self {
            registry,
            config,
            states: HashMap::new(),
            used_names: config.reserved_names.iter().cloned().collect(),
            next_index: 0,
        }
    }

    pub fn config(&self) -> &'a MarshalConfig {
        self.config
    }

    /// Mark a name as taken so it is never generated in this call.
    pub fn reserve_name(&mut self, name: impl Into<String>) {
        self.used_names.insert(name.into());
    }

    pub fn state(&self, value: &HostValue) -> Option<&OutboundState> {
        value.identity().and_then(|identity| self.states.get(&identity))
    }

    /// Convert one host value.
    ///
    /// Composite converters hand their children back unconverted, and this
    /// walks them with an explicit stack of objects being filled, so a long
    /// chain of nested objects does not grow the call stack.
    pub fn convert(&mut self, data: &HostValue) -> Result<OutboundVariable, ConversionError> {
        let mut current = match self.start(data)? {
            Step::Done(variable) => return Ok(variable),
            Step::Open(frame) => frame,
        };
        let mut parents: Vec<Frame> = Vec::new();

        loop {
            match current.binding.next_member() {
                Some((key, member)) => {
                    current.waiting = Some(key);
                    let step = match member {
                        MemberValue::Pending(value) => self.start(&value),
                        MemberValue::Converted(variable) => self.start_converted(variable),
                    };
                    match step {
                        Ok(Step::Done(variable)) => current.assign(variable),
                        Ok(Step::Open(child)) => parents.push(std::mem::replace(&mut current, child)),
                        Err(err) => {
                            for frame in parents.iter().chain(std::iter::once(&current)) {
                                if let Some(identity) = frame.identity {
                                    self.states.remove(&identity);
                                }
                            }
                            return Err(err);
                        }
                    }
                }
                None => {
                    let variable = self.close(current);
                    match parents.pop() {
                        Some(mut parent) => {
                            parent.assign(variable);
                            current = parent;
                        }
                        None => return Ok(variable),
                    }
                }
            }
        }
    }

    /// Convert several values against this one context, in order.
    pub fn convert_all<'v>(
        &mut self,
        values: impl IntoIterator<Item = &'v HostValue>,
    ) -> Result<Vec<OutboundVariable>, ConversionError> {
        values.into_iter().map(|value| self.convert(value)).collect()
    }

    // Begin converting one value: either it is finished at once, or it is an
    // object whose members still have to be walked.
    fn start(&mut self, data: &HostValue) -> Result<Step, ConversionError> {
        // Only null has no runtime type
        let Some(ty) = data.host_type() else {
            return Ok(Step::Done(OutboundVariable::leaf("null")));
        };

        let Some(identity) = data.identity() else {
            let registry = self.registry;
            let variable = registry.resolve(&ty)?.convert_outbound(data, self)?;
            return self.start_converted(variable);
        };

        match self.states.get(&identity) {
            Some(OutboundState::Resolved(name)) => {
                trace!(name = name.as_str(), "reference to converted object");
                return Ok(Step::Done(OutboundVariable::leaf(name.clone())));
            }
            Some(OutboundState::InProgress(name)) => {
                trace!(name = name.as_str(), "cycle cut");
                return Ok(Step::Done(OutboundVariable::leaf(name.clone())));
            }
            None => {}
        }

        let registry = self.registry;
        let converter = registry.resolve(&ty)?;
        let name = self.next_name();
        trace!(name = name.as_str(), %ty, "reserved");
        self.states
            .insert(identity, OutboundState::InProgress(name.clone()));

        match converter.convert_outbound(data, self) {
            Ok(variable) if variable.is_unbound() => Ok(Step::Open(Frame {
                identity: Some(identity),
                binding: Binding::new(name, variable),
                waiting: None,
            })),
            // Converted without members: nothing else can point back into it
            Ok(variable) => {
                self.states.insert(identity, OutboundState::Resolved(name.clone()));
                Ok(Step::Done(Binding::new(name, variable).finish()))
            }
            Err(err) => {
                self.states.remove(&identity);
                Err(err)
            }
        }
    }

    // A composite without identity still needs a name to be filled in.
    fn start_converted(&mut self, variable: OutboundVariable) -> Result<Step, ConversionError> {
        if !variable.is_unbound() {
            return Ok(Step::Done(variable));
        }
        let name = self.next_name();
        trace!(name = name.as_str(), "reserved for untracked composite");
        Ok(Step::Open(Frame {
            identity: None,
            binding: Binding::new(name, variable),
            waiting: None,
        }))
    }

    fn close(&mut self, frame: Frame) -> OutboundVariable {
        let variable = frame.binding.finish();
        if let Some(identity) = frame.identity {
            self.states
                .insert(identity, OutboundState::Resolved(variable.expression().to_string()));
        }
        variable
    }

    fn next_name(&mut self) -> String {
        loop {
            let candidate = format!("{}{}", self.config.name_prefix, self.next_index);
            self.next_index += 1;
            if self.used_names.insert(candidate.clone()) {
                return candidate;
            }
        }
    }
}
