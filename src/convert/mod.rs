//! Converters
//!
//! A converter owns both directions for one type or type family. It is
//! built once, registered in a [`crate::ConverterRegistry`], and shared by
//! every call; all per-call state lives in the context it is handed.
//!
//! [`PrimitiveConverter`] is the reference shape. Composite converters
//! ([`ListConverter`], [`RecordConverter`]) additionally take part in
//! reference tracking:
//!
//! - inbound, they publish an empty placeholder with
//!   [`InboundContext::defer`] before converting children through the
//!   context, then fill it
//! - outbound, they return [`OutboundVariable::composite`] with their
//!   children as [`MemberValue::Pending`](crate::variable::MemberValue::Pending) and let the context convert the
//!   children and bind the object to the reserved name

mod list;
mod optional;
mod primitive;
mod record;
mod string;

pub use list::ListConverter;
pub use optional::OptionalConverter;
pub use primitive::PrimitiveConverter;
pub use record::{RecordConverter, RecordSchema};
pub use string::StringConverter;

use wirebind_wire::WireValue;

use crate::context::{InboundContext, OutboundContext};
use crate::error::ConversionError;
use crate::types::HostType;
use crate::value::HostValue;
use crate::variable::OutboundVariable;

pub trait Converter: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Turn `data` into a value of type `target`.
    fn convert_inbound(
        &self,
        target: &HostType,
        data: &WireValue,
        ctx: &mut InboundContext<'_>,
    ) -> Result<HostValue, ConversionError>;

    /// Turn `data` into script. Dispatch happens on the runtime type of
    /// `data`, so `data` is never null here. Children of a composite should
    /// be returned as [`MemberValue::Pending`](crate::variable::MemberValue::Pending) rather than converted here.
    fn convert_outbound(
        &self,
        data: &HostValue,
        ctx: &mut OutboundContext<'_>,
    ) -> Result<OutboundVariable, ConversionError>;
}

/// The runtime type of `data`, for mismatch errors on the outbound path.
pub(crate) fn runtime_mismatch(data: &HostValue, fallback: HostType) -> ConversionError {
    ConversionError::TypeMismatch {
        target: data.host_type().unwrap_or(fallback),
    }
}
