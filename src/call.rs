//! Call boundary
//!
//! What the transport layer calls: convert a call's parameters before the
//! host logic runs, and convert its return values afterwards.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};
use wirebind_wire::WireBatch;

use crate::config::MarshalConfig;
use crate::context::{InboundContext, OutboundContext};
use crate::error::{ConversionError, ErrorKind};
use crate::registry::ConverterRegistry;
use crate::types::HostType;
use crate::value::HostValue;
use crate::variable::{Declaration, OutboundVariable};

/// What one wire parameter must become.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypedParameter {
    pub target: HostType,
}

impl TypedParameter {
    pub fn new(target: HostType) -> Self {
        Self { target }
    }
}

/// A parameter that failed to convert.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("parameter {index} ({target}): {source}")]
pub struct ParamError {
    pub index: usize,
    /// Wire id of the parameter, when the call supplied one
    pub id: Option<String>,
    /// Declared type of the parameter
    pub target: HostType,
    #[source]
    pub source: ConversionError,
}

impl ParamError {
    pub fn kind(&self) -> ErrorKind {
        self.source.kind()
    }

    /// Text safe to send to the remote caller: which parameter, which type,
    /// and which kind of failure.
    pub fn remote_message(&self) -> String {
        let detail = match &self.source {
            ConversionError::Format { target, text } => {
                format!("cannot parse {:?} as {}", text, target)
            }
            ConversionError::TypeMismatch { target } => {
                format!("value is not assignable to {}", target)
            }
            ConversionError::UnsupportedType { target } => {
                format!("type {} is not supported", target)
            }
        };
        format!(
            "{} error in parameter {} (declared {}): {}",
            self.kind(),
            self.index,
            self.target,
            detail
        )
    }
}

/// Convert every declared parameter of a call through one inbound context.
///
/// Parameter `i` is the wire value whose id names index `i`. Wire
/// parameters beyond the declared ones are ignored.
pub fn convert_params(
    registry: &ConverterRegistry,
    config: &MarshalConfig,
    batch: &WireBatch,
    params: &[TypedParameter],
) -> Result<Vec<HostValue>, ParamError> {
    let extra: Vec<&str> = batch
        .param_ids()
        .filter(|id| WireBatch::param_index(id).is_some_and(|index| index >= params.len()))
        .collect();
    if !extra.is_empty() {
        debug!(?extra, declared = params.len(), "ignoring extra parameters");
    }

    let mut ctx = InboundContext::new(registry, config, batch);
    let mut values = Vec::with_capacity(params.len());
    for (index, param) in params.iter().enumerate() {
        let value = ctx.convert_param(index, &param.target).map_err(|source| {
            let err = ParamError {
                index,
                id: batch.param(index).map(|(id, _)| id.to_string()),
                target: param.target.clone(),
                source,
            };
            warn!(error = %err, "parameter conversion failed");
            err
        })?;
        values.push(value);
    }
    Ok(values)
}

/// Converted return values of one call.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub results: Vec<OutboundVariable>,
}

impl Response {
    /// All declarations, in the order they must run.
    pub fn declarations(&self) -> impl Iterator<Item = &Declaration> {
        self.results.iter().flat_map(|result| result.declarations())
    }

    pub fn expressions(&self) -> Vec<&str> {
        self.results.iter().map(|result| result.expression()).collect()
    }

    /// Render every declaration on its own line, then one call of
    /// `callback` with the result expressions as arguments.
    pub fn to_script(&self, callback: &str) -> String {
        let mut script = String::new();
        for declaration in self.declarations() {
            script.push_str(&declaration.to_string());
            script.push('\n');
        }
        script.push_str(callback);
        script.push('(');
        script.push_str(&self.expressions().join(","));
        script.push_str(");");
        script
    }
}

/// Convert the return values of a call through one outbound context, so an
/// object reachable from several values is declared once.
pub fn convert_returns(
    registry: &ConverterRegistry,
    config: &MarshalConfig,
    values: &[HostValue],
) -> Result<Response, ConversionError> {
    let mut ctx = OutboundContext::new(registry, config);
    let results = ctx.convert_all(values).map_err(|err| {
        warn!(error = %err, "return value conversion failed");
        err
    })?;
    Ok(Response { results })
}
