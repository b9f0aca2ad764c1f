//! Emission-standard rules, with and without a recorded euro status.

use chrono::NaiveDate;

use crate::domain::clean_air_zone::CleanAirZone;
use crate::domain::vehicle::{Vehicle, VehicleType};

use super::rules::{ComplianceRule, RuleVerdict};

fn has_euro_status(vehicle: &Vehicle) -> bool {
    vehicle
        .euro_status
        .as_deref()
        .is_some_and(|s| !s.trim().is_empty())
}

/// Numeric standard from strings like "Euro 6", "EURO VI", "euro5a", "4".
pub fn parse_euro_standard(raw: &str) -> Option<u8> {
    let lowered = raw.trim().to_lowercase();
    let rest = lowered.strip_prefix("euro").unwrap_or(&lowered).trim_start();

    let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
    if !digits.is_empty() {
        return digits.parse().ok();
    }

    let numeral: String = rest
        .chars()
        .take_while(|c| matches!(c, 'i' | 'v' | 'x'))
        .collect();
    match numeral.as_str() {
        "i" => Some(1),
        "ii" => Some(2),
        "iii" => Some(3),
        "iv" => Some(4),
        "v" => Some(5),
        "vi" => Some(6),
        "vii" => Some(7),
        _ => None,
    }
}

// ── Euro status present ────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct EuroStatusPresentRule;

impl EuroStatusPresentRule {
    fn required_standard(vehicle: &Vehicle) -> u8 {
        if vehicle.vehicle_type == Some(VehicleType::Motorcycle) {
            3
        } else if vehicle.is_petrol() {
            4
        } else {
            6
        }
    }
}

impl ComplianceRule for EuroStatusPresentRule {
    fn name(&self) -> &'static str {
        "euro_status_present"
    }

    fn applies_to(&self, vehicle: &Vehicle, _zone: &CleanAirZone) -> bool {
        has_euro_status(vehicle)
    }

    fn evaluate(&self, vehicle: &Vehicle, _zone: &CleanAirZone) -> RuleVerdict {
        let raw = vehicle.euro_status.as_deref().unwrap_or_default();
        match parse_euro_standard(raw) {
            Some(standard) => RuleVerdict::Compliant(standard >= Self::required_standard(vehicle)),
            None => RuleVerdict::Undeterminable(format!("euro status not recognised: {raw}")),
        }
    }
}

// ── Euro status absent ─────────────────────────────────────────

/// Dates from which newly registered vehicles had to meet each standard.
mod cutover {
    use chrono::NaiveDate;

    pub fn motorcycle_euro_3() -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(2007, 1, 1)
    }
    pub fn euro_4_low_weight() -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(2006, 1, 1)
    }
    pub fn euro_4_high_weight() -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(2007, 1, 1)
    }
    pub fn euro_6() -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(2015, 9, 1)
    }
    pub fn euro_iv() -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(2006, 1, 1)
    }
    pub fn euro_vi() -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(2013, 12, 31)
    }
    pub fn van_euro_6_low_weight() -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(2015, 9, 1)
    }
    pub fn van_euro_6_high_weight() -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(2016, 9, 1)
    }
}

const CAR_LOW_WEIGHT_LIMIT: i32 = 2500;
const VAN_LOW_WEIGHT_LIMIT: i32 = 1330;

/// Falls back on the date of first registration when no euro status is
/// recorded: a vehicle registered on or after the date its standard became
/// mandatory is assumed to meet it.
#[derive(Debug, Clone, Default)]
pub struct EuroStatusAbsentRule;

impl EuroStatusAbsentRule {
    fn cutover_for(vehicle: &Vehicle, vehicle_type: VehicleType) -> Option<NaiveDate> {
        let petrol = vehicle.is_petrol();
        let weight = vehicle.revenue_weight;

        match vehicle_type {
            VehicleType::PrivateCar | VehicleType::Minibus => {
                if !petrol {
                    cutover::euro_6()
                } else if weight.map_or(true, |w| w <= CAR_LOW_WEIGHT_LIMIT) {
                    cutover::euro_4_low_weight()
                } else {
                    cutover::euro_4_high_weight()
                }
            }
            VehicleType::Bus | VehicleType::Coach | VehicleType::Hgv => {
                if petrol {
                    cutover::euro_iv()
                } else {
                    cutover::euro_vi()
                }
            }
            VehicleType::SmallVan | VehicleType::LargeVan => {
                let low = weight.map_or(true, |w| w <= VAN_LOW_WEIGHT_LIMIT);
                match (low, petrol) {
                    (true, true) => cutover::euro_4_low_weight(),
                    (true, false) => cutover::van_euro_6_low_weight(),
                    (false, true) => cutover::euro_4_high_weight(),
                    (false, false) => cutover::van_euro_6_high_weight(),
                }
            }
            VehicleType::Motorcycle => cutover::motorcycle_euro_3(),
            VehicleType::Agricultural | VehicleType::TaxiOrPhv => None,
        }
    }
}

impl ComplianceRule for EuroStatusAbsentRule {
    fn name(&self) -> &'static str {
        "euro_status_absent"
    }

    fn applies_to(&self, vehicle: &Vehicle, _zone: &CleanAirZone) -> bool {
        !has_euro_status(vehicle)
    }

    fn evaluate(&self, vehicle: &Vehicle, _zone: &CleanAirZone) -> RuleVerdict {
        let Some(vehicle_type) = vehicle.vehicle_type else {
            return RuleVerdict::Undeterminable("vehicle type unset".into());
        };
        if vehicle.fuel_type.as_deref().map_or(true, |f| f.trim().is_empty()) {
            return RuleVerdict::Undeterminable("fuel type missing".into());
        }
        let Some(registered) = vehicle.date_of_first_registration else {
            return RuleVerdict::Undeterminable("date of first registration missing".into());
        };
        match Self::cutover_for(vehicle, vehicle_type) {
            Some(cutover) => RuleVerdict::Compliant(registered >= cutover),
            None => RuleVerdict::Undeterminable(format!(
                "no registration cut-over for {}",
                vehicle_type.code()
            )),
        }
    }
}
