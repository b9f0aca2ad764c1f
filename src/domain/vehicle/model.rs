//! Vehicle domain entity

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Closed set of vehicle types a zone can charge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VehicleType {
    PrivateCar,
    SmallVan,
    LargeVan,
    Minibus,
    Bus,
    Coach,
    Hgv,
    Motorcycle,
    Agricultural,
    TaxiOrPhv,
}

impl VehicleType {
    pub const ALL: [VehicleType; 10] = [
        Self::PrivateCar,
        Self::SmallVan,
        Self::LargeVan,
        Self::Minibus,
        Self::Bus,
        Self::Coach,
        Self::Hgv,
        Self::Motorcycle,
        Self::Agricultural,
        Self::TaxiOrPhv,
    ];

    /// Stable code used in storage.
    pub fn code(&self) -> &'static str {
        match self {
            Self::PrivateCar => "PRIVATE_CAR",
            Self::SmallVan => "SMALL_VAN",
            Self::LargeVan => "LARGE_VAN",
            Self::Minibus => "MINIBUS",
            Self::Bus => "BUS",
            Self::Coach => "COACH",
            Self::Hgv => "HGV",
            Self::Motorcycle => "MOTORCYCLE",
            Self::Agricultural => "AGRICULTURAL",
            Self::TaxiOrPhv => "TAXI_OR_PHV",
        }
    }

    /// Human-readable label used in exports.
    pub fn label(&self) -> &'static str {
        match self {
            Self::PrivateCar => "Private Car",
            Self::SmallVan => "Small Van",
            Self::LargeVan => "Large Van",
            Self::Minibus => "Minibus",
            Self::Bus => "Bus",
            Self::Coach => "Coach",
            Self::Hgv => "Heavy Goods Vehicle",
            Self::Motorcycle => "Motorcycle",
            Self::Agricultural => "Agricultural Vehicle",
            Self::TaxiOrPhv => "Taxi/PHV",
        }
    }
}

impl fmt::Display for VehicleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for VehicleType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.code().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown vehicle type: {s}"))
    }
}

/// Wheelchair accessibility as reported by the taxi register.
/// `Unknown` must never be read as "accessible".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Wheelchair {
    Accessible,
    NotAccessible,
    #[default]
    Unknown,
}

impl From<Option<bool>> for Wheelchair {
    fn from(flag: Option<bool>) -> Self {
        match flag {
            Some(true) => Self::Accessible,
            Some(false) => Self::NotAccessible,
            None => Self::Unknown,
        }
    }
}

/// Vehicle as evaluated by the engine: registry attributes plus what the
/// classifier and the taxi register add.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Vehicle {
    pub vrn: String,
    pub tax_class: Option<String>,
    pub body_type: Option<String>,
    pub type_approval: Option<String>,
    pub euro_status: Option<String>,
    /// Revenue weight in kg
    pub revenue_weight: Option<i32>,
    pub seating_capacity: Option<i32>,
    pub standing_capacity: Option<i32>,
    pub fuel_type: Option<String>,
    pub date_of_first_registration: Option<NaiveDate>,

    /// Physical type, set by the classifier. `None` when unidentifiable.
    #[serde(skip)]
    pub vehicle_type: Option<VehicleType>,
    #[serde(skip)]
    pub is_taxi_or_phv: bool,
    #[serde(skip)]
    pub wheelchair: Wheelchair,
    #[serde(skip)]
    pub licensing_authorities: Vec<String>,
}

impl Vehicle {
    pub fn new(vrn: impl Into<String>) -> Self {
        Self {
            vrn: vrn.into(),
            ..Default::default()
        }
    }

    /// Type used for chargeability: taxis and PHVs are charged as such
    /// whatever their body.
    pub fn effective_type(&self) -> Option<VehicleType> {
        if self.is_taxi_or_phv {
            Some(VehicleType::TaxiOrPhv)
        } else {
            self.vehicle_type
        }
    }

    pub fn fuel_is(&self, fuel: &str) -> bool {
        self.fuel_type
            .as_deref()
            .is_some_and(|f| f.trim().eq_ignore_ascii_case(fuel))
    }

    pub fn is_petrol(&self) -> bool {
        self.fuel_is("petrol")
    }

    pub fn is_diesel(&self) -> bool {
        self.fuel_is("diesel") || self.fuel_is("heavy oil")
    }
}

/// Vehicle registered to an account's fleet. Source of the candidate set
/// for cache population.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FleetVehicle {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub vrn: String,
    /// Last classified type, updated by cache population.
    pub vehicle_type: Option<VehicleType>,
}

impl FleetVehicle {
    pub fn new(owner_id: Uuid, vrn: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            vrn: vrn.into(),
            vehicle_type: None,
        }
    }
}
