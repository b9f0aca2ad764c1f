//! Application layer: the chargeability engine and its collaborators.

pub mod chargeability;
pub mod classification;
pub mod compliance;
pub mod exemption;
pub mod ports;
pub mod services;

pub use services::{CacheInvalidation, ChargeCalculationService, Engine, ExternalPorts};
