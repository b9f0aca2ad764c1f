//! Priority chain of compliance rules.

use std::sync::Arc;

use tracing::debug;

use crate::domain::clean_air_zone::CleanAirZone;
use crate::domain::vehicle::Vehicle;

use super::euro_status::{EuroStatusAbsentRule, EuroStatusPresentRule};
use super::rules::{ComplianceRule, RuleVerdict};
use super::zone_override::FuelTypeZoneOverride;

/// Rules are tried in order; the first one that applies and reaches a
/// verdict decides. `None` means compliance could not be determined and
/// must never be read as `false`.
#[derive(Clone)]
pub struct ComplianceService {
    rules: Vec<Arc<dyn ComplianceRule>>,
}

impl ComplianceService {
    pub fn new(rules: Vec<Arc<dyn ComplianceRule>>) -> Self {
        Self { rules }
    }

    /// Zone overrides first, then the euro-status rules.
    pub fn standard(overrides: Vec<FuelTypeZoneOverride>) -> Self {
        let mut rules: Vec<Arc<dyn ComplianceRule>> = overrides
            .into_iter()
            .map(|o| Arc::new(o) as Arc<dyn ComplianceRule>)
            .collect();
        rules.push(Arc::new(EuroStatusPresentRule));
        rules.push(Arc::new(EuroStatusAbsentRule));
        Self { rules }
    }

    pub fn evaluate(&self, vehicle: &Vehicle, zone: &CleanAirZone) -> Option<bool> {
        if vehicle.vehicle_type.is_none() {
            debug!(vrn = %vehicle.vrn, "Vehicle type unset, compliance undeterminable");
            return None;
        }

        for rule in self.rules.iter().filter(|r| r.applies_to(vehicle, zone)) {
            match rule.evaluate(vehicle, zone) {
                RuleVerdict::Compliant(compliant) => {
                    debug!(vrn = %vehicle.vrn, zone = %zone.name, rule = rule.name(), compliant, "Compliance decided");
                    return Some(compliant);
                }
                RuleVerdict::NotApplicable => continue,
                RuleVerdict::Undeterminable(reason) => {
                    debug!(vrn = %vehicle.vrn, zone = %zone.name, rule = rule.name(), %reason, "Compliance undeterminable");
                    if rule.falls_through_when_undeterminable() {
                        continue;
                    }
                    return None;
                }
            }
        }
        None
    }
}

impl Default for ComplianceService {
    fn default() -> Self {
        Self::standard(Vec::new())
    }
}
