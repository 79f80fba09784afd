//! Per-call conversion contexts
//!
//! One [`InboundContext`] converts all parameters of a call; one
//! [`OutboundContext`] converts all values of a response. Both keep a map
//! from "something seen before" to its resolution state, which is how
//! shared references stay shared and cycles terminate. Neither outlives
//! the call it was created for.

mod inbound;
mod outbound;

pub use inbound::{InboundContext, InboundState};
pub use outbound::{OutboundContext, OutboundState};
