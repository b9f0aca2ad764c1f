//! Clean Air Zone aggregate

pub mod model;

pub use model::{CleanAirZone, TariffClass};
