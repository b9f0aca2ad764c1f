//! Database entities module

pub mod fleet_vehicle;
pub mod vehicle_chargeability;

pub use fleet_vehicle::Entity as FleetVehicle;
pub use vehicle_chargeability::Entity as VehicleChargeability;
