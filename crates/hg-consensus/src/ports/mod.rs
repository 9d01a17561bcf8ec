//! Ports layer for the consensus engine.
//!
//! - Inbound (Driving) ports: API exposed to event intake
//! - Outbound (Driven) ports: roster history and freeze boundary

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
