//! Vehicle type classification

pub mod classifier;
pub mod registry;

pub use classifier::{Classification, UnidentifiableReason, VehicleTypeClassifier};
pub use registry::{UnidentifiableVehicle, UnidentifiableVehicleRegistry};
