//! Shipment lifecycle: aggregation of packed boxes into a shipment and the
//! transitions that move both along the supply chain together.
//!
//! Pure domain logic (no IO, no storage).

pub mod shipment;

pub use shipment::{Shipment, ShipmentRequest, ShipmentState};
