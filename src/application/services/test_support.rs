//! Shared fixtures for service tests.

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::config::AppConfig;
use crate::domain::{CleanAirZone, TariffClass, Vehicle, VehicleType};
use crate::infrastructure::storage::{InMemoryPorts, InMemoryStorage};

use super::engine::Engine;

pub struct Zones {
    pub class_c: CleanAirZone,
    pub class_d: CleanAirZone,
}

pub struct Fixture {
    pub engine: Engine,
    pub ports: InMemoryPorts,
    pub storage: Arc<InMemoryStorage>,
    pub zones: Zones,
}

fn rates(zone: CleanAirZone) -> CleanAirZone {
    zone.with_rate(VehicleType::PrivateCar, Decimal::from(50))
        .with_rate(VehicleType::TaxiOrPhv, Decimal::from(12))
        .with_rate(VehicleType::Bus, Decimal::from(100))
        .with_rate(VehicleType::Coach, Decimal::from(100))
        .with_rate(VehicleType::Hgv, Decimal::from(100))
        .with_rate(VehicleType::SmallVan, Decimal::from(12))
        .with_rate(VehicleType::LargeVan, Decimal::from(12))
        .with_rate(VehicleType::Minibus, Decimal::from(12))
}

pub fn zones() -> Zones {
    let mut class_c = rates(CleanAirZone::new("Bath", TariffClass::C));
    class_c.wheelchair_accessible_taxi_rate = Some(Decimal::from(4));
    Zones {
        class_c,
        class_d: rates(CleanAirZone::new("Birmingham", TariffClass::D)),
    }
}

/// Retries with millisecond delays so failure paths stay fast.
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.engine.retry.initial_delay_ms = 1;
    config.engine.retry.max_delay_ms = 2;
    config.engine.bulk_check_batch_size = 2;
    config.engine.worker_count = 2;
    config.engine.call_timeout_secs = 5;
    config.engine.batch_timeout_secs = 10;
    config
}

pub fn fixture() -> Fixture {
    fixture_with(test_config())
}

pub fn fixture_with(config: AppConfig) -> Fixture {
    let zones = zones();
    let ports = InMemoryPorts::default();
    ports.zones.insert(zones.class_c.clone());
    ports.zones.insert(zones.class_d.clone());
    let storage = Arc::new(InMemoryStorage::new());
    let engine = Engine::build(&config, storage.clone(), ports.external());
    Fixture {
        engine,
        ports,
        storage,
        zones,
    }
}

/// M1 car with no euro status, so compliance follows its registration date.
pub fn car(vrn: &str, fuel: &str, first_registered: &str) -> Vehicle {
    Vehicle {
        tax_class: Some("PRIVATE/LIGHT GOODS (PLG)".into()),
        body_type: Some("2 DOOR SALOON".into()),
        type_approval: Some("M1".into()),
        revenue_weight: Some(1500),
        seating_capacity: Some(4),
        fuel_type: Some(fuel.into()),
        date_of_first_registration: NaiveDate::parse_from_str(first_registered, "%Y-%m-%d").ok(),
        ..Vehicle::new(vrn)
    }
}
