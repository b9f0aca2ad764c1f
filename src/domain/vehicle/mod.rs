//! Vehicle aggregate

pub mod model;
pub mod repository;

pub use model::{FleetVehicle, Vehicle, VehicleType, Wheelchair};
pub use repository::FleetVehicleRepository;
