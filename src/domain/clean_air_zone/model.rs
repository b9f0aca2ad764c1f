//! Clean Air Zone domain entity

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::vehicle::VehicleType;

/// CAZ tariff class. Chargeable-type sets grow from A to D.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TariffClass {
    A,
    B,
    C,
    D,
}

impl TariffClass {
    pub const ALL: [TariffClass; 4] = [Self::A, Self::B, Self::C, Self::D];
}

impl fmt::Display for TariffClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
        };
        f.write_str(s)
    }
}

impl FromStr for TariffClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A" => Ok(Self::A),
            "B" => Ok(Self::B),
            "C" => Ok(Self::C),
            "D" => Ok(Self::D),
            other => Err(format!("unknown tariff class: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanAirZone {
    pub id: Uuid,
    pub name: String,
    pub tariff_class: TariffClass,
    /// Code reported alongside every charge computed for this zone.
    pub tariff_code: String,
    /// Daily charge per vehicle type, in pounds.
    #[serde(default)]
    pub rates: HashMap<VehicleType, Decimal>,
    /// Rate for wheelchair-accessible taxis; `None` means they pay the taxi rate.
    #[serde(default)]
    pub wheelchair_accessible_taxi_rate: Option<Decimal>,
    #[serde(default)]
    pub charges_motorcycles: bool,
    #[serde(default)]
    pub disabled_tax_class_chargeable: bool,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl CleanAirZone {
    pub fn new(name: impl Into<String>, tariff_class: TariffClass) -> Self {
        let name = name.into();
        Self {
            id: Uuid::new_v4(),
            tariff_code: format!("{}-{}", name.to_uppercase().replace(' ', "-"), tariff_class),
            name,
            tariff_class,
            rates: HashMap::new(),
            wheelchair_accessible_taxi_rate: None,
            charges_motorcycles: false,
            disabled_tax_class_chargeable: false,
            active: true,
        }
    }

    pub fn with_rate(mut self, vehicle_type: VehicleType, rate: Decimal) -> Self {
        self.rates.insert(vehicle_type, rate);
        self
    }

    pub fn rate_for(&self, vehicle_type: VehicleType) -> Option<Decimal> {
        self.rates.get(&vehicle_type).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tariff_classes_are_ordered() {
        assert!(TariffClass::A < TariffClass::B);
        assert!(TariffClass::C < TariffClass::D);
        assert_eq!("c".parse::<TariffClass>().unwrap(), TariffClass::C);
        assert!("E".parse::<TariffClass>().is_err());
    }

    #[test]
    fn missing_rate_is_none() {
        let zone = CleanAirZone::new("Leeds", TariffClass::B).with_rate(VehicleType::Bus, Decimal::from(50));
        assert_eq!(zone.rate_for(VehicleType::Bus), Some(Decimal::from(50)));
        assert_eq!(zone.rate_for(VehicleType::Hgv), None);
        assert_eq!(zone.tariff_code, "LEEDS-B");
    }

    #[test]
    fn deserializes_rate_table() {
        let zone: CleanAirZone = serde_json::from_str(
            r#"{
                "id": "5cd7441d-766f-48ff-b8ad-1809586fea37",
                "name": "Birmingham",
                "tariff_class": "D",
                "tariff_code": "BCC01",
                "rates": { "PRIVATE_CAR": 8, "BUS": "50.00" }
            }"#,
        )
        .unwrap();

        assert_eq!(zone.rate_for(VehicleType::PrivateCar), Some(Decimal::from(8)));
        assert_eq!(zone.rate_for(VehicleType::Bus), Some(Decimal::new(5000, 2)));
        assert!(zone.active);
    }
}
