//! wirebind: typed host values over a textual remoting wire format
//!
//! A remote caller sends parameters as tagged text (`number:42`,
//! `reference:c0-e1`, ...) and receives results as generated script. This
//! crate is the marshalling core between the two:
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                Transport layer               │
//! ├──────────────────────────────────────────────┤
//! │  call      - parameter / response boundary   │
//! │  context   - per-call reference tracking     │
//! │  registry  - type -> converter resolution    │
//! │  convert   - primitive, string, list, ...    │
//! │  variable  - generated declarations          │
//! ├──────────────────────────────────────────────┤
//! │      wirebind-wire (wire values, escaping)   │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use wirebind::{convert_params, convert_returns, ConverterRegistry, HostType, HostValue,
//!                MarshalConfig, TypedParameter, WireBatch};
//!
//! let registry = ConverterRegistry::with_defaults();
//! let config = MarshalConfig::default();
//!
//! let batch = WireBatch::parse_lines("c0-param0=number:41");
//! let params = [TypedParameter::new(HostType::S32)];
//! let values = convert_params(&registry, &config, &batch, &params).unwrap();
//! assert_eq!(values, vec![HostValue::S32(41)]);
//!
//! let response = convert_returns(&registry, &config, &[HostValue::S32(42)]).unwrap();
//! assert_eq!(response.to_script("done"), "done(42);");
//! ```

pub mod call;
pub mod config;
pub mod context;
pub mod convert;
pub mod error;
pub mod registry;
pub mod types;
pub mod value;
pub mod variable;

pub use call::{convert_params, convert_returns, ParamError, Response, TypedParameter};
pub use config::{ConfigError, MarshalConfig};
pub use context::{InboundContext, InboundState, OutboundContext, OutboundState};
pub use convert::{
    Converter, ListConverter, OptionalConverter, PrimitiveConverter, RecordConverter,
    RecordSchema, StringConverter,
};
pub use error::{ConversionError, ErrorKind};
pub use registry::{ConverterRegistry, SharedRegistry};
pub use types::{HostType, ParseTypeError, TypeFamily};
pub use value::{FromHost, HostValue, Identity, List, Record, Shared};
pub use variable::{Declaration, MemberKey, MemberValue, OutboundVariable};
pub use wirebind_wire::{WireBatch, WireKind, WireValue};
