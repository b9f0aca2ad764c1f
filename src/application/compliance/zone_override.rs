//! Zone-specific compliance overrides

use uuid::Uuid;

use crate::config::ZoneOverrideSettings;
use crate::domain::clean_air_zone::CleanAirZone;
use crate::domain::vehicle::Vehicle;

use super::rules::{ComplianceRule, RuleVerdict};

/// Bespoke rule for one zone: vehicles running on one of the listed fuels
/// are compliant there. Anything else is left to the euro-status rules.
#[derive(Debug, Clone)]
pub struct FuelTypeZoneOverride {
    zone_id: Uuid,
    compliant_fuel_types: Vec<String>,
}

impl FuelTypeZoneOverride {
    pub fn new(zone_id: Uuid, compliant_fuel_types: Vec<String>) -> Self {
        Self {
            zone_id,
            compliant_fuel_types: compliant_fuel_types
                .into_iter()
                .map(|f| f.trim().to_lowercase())
                .collect(),
        }
    }
}

impl From<&ZoneOverrideSettings> for FuelTypeZoneOverride {
    fn from(s: &ZoneOverrideSettings) -> Self {
        Self::new(s.zone_id, s.compliant_fuel_types.clone())
    }
}

impl ComplianceRule for FuelTypeZoneOverride {
    fn name(&self) -> &'static str {
        "zone_override"
    }

    fn applies_to(&self, _vehicle: &Vehicle, zone: &CleanAirZone) -> bool {
        zone.id == self.zone_id
    }

    fn evaluate(&self, vehicle: &Vehicle, _zone: &CleanAirZone) -> RuleVerdict {
        let Some(fuel) = vehicle.fuel_type.as_deref().map(|f| f.trim().to_lowercase()) else {
            return RuleVerdict::Undeterminable("fuel type missing".into());
        };
        if self.compliant_fuel_types.contains(&fuel) {
            RuleVerdict::Compliant(true)
        } else {
            RuleVerdict::NotApplicable
        }
    }

    fn falls_through_when_undeterminable(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::clean_air_zone::TariffClass;

    #[test]
    fn only_applies_to_its_zone() {
        let bath = CleanAirZone::new("Bath", TariffClass::C);
        let leeds = CleanAirZone::new("Leeds", TariffClass::B);
        let rule = FuelTypeZoneOverride::new(bath.id, vec!["Electric".into()]);

        let v = Vehicle::new("AB1");
        assert!(rule.applies_to(&v, &bath));
        assert!(!rule.applies_to(&v, &leeds));
    }

    #[test]
    fn listed_fuel_is_compliant() {
        let bath = CleanAirZone::new("Bath", TariffClass::C);
        let rule = FuelTypeZoneOverride::new(bath.id, vec!["Electric".into(), "gas bi-fuel".into()]);

        let mut v = Vehicle::new("AB1");
        v.fuel_type = Some("ELECTRIC".into());
        assert_eq!(rule.evaluate(&v, &bath), RuleVerdict::Compliant(true));

        v.fuel_type = Some("diesel".into());
        assert_eq!(rule.evaluate(&v, &bath), RuleVerdict::NotApplicable);

        v.fuel_type = None;
        assert!(matches!(rule.evaluate(&v, &bath), RuleVerdict::Undeterminable(_)));
    }
}
