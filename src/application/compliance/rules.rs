use crate::domain::clean_air_zone::CleanAirZone;
use crate::domain::vehicle::Vehicle;

/// Answer of a single compliance rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleVerdict {
    Compliant(bool),
    /// The rule has nothing to say about this vehicle.
    NotApplicable,
    /// The rule applies but the data is insufficient.
    Undeterminable(String),
}

pub trait ComplianceRule: Send + Sync {
    fn name(&self) -> &'static str;

    /// Whether this rule is selected for the (vehicle, zone) pair.
    fn applies_to(&self, vehicle: &Vehicle, zone: &CleanAirZone) -> bool;

    fn evaluate(&self, vehicle: &Vehicle, zone: &CleanAirZone) -> RuleVerdict;

    /// When true, an `Undeterminable` verdict hands over to the next rule
    /// instead of ending evaluation.
    fn falls_through_when_undeterminable(&self) -> bool {
        false
    }
}
