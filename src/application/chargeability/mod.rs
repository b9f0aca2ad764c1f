//! Tariff-class chargeability and charge computation

pub mod service;
pub mod table;

pub use service::{ChargeDetermination, ChargeabilityService};
pub use table::ChargeabilityTable;
