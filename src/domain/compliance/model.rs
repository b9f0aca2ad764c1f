//! Evaluation results returned to callers

use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::vehicle::VehicleType;

/// Result of evaluating one vehicle against one zone.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplianceOutcome {
    pub zone_id: Uuid,
    pub zone_name: String,
    pub exempt: bool,
    /// `None` means compliance could not be determined.
    pub compliant: Option<bool>,
    pub chargeable: bool,
    /// Always >= 0, and 0 whenever `chargeable` is false.
    pub charge: Decimal,
    pub retrofitted: bool,
    pub tariff_code: Option<String>,
    pub exemption_code: Option<String>,
}

impl ComplianceOutcome {
    pub fn is_undeterminable(&self) -> bool {
        !self.exempt && !self.retrofitted && self.compliant.is_none()
    }
}

/// All zone outcomes for one VRN.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplianceResults {
    pub vrn: String,
    /// Type used for charging; taxis and PHVs report `TaxiOrPhv`.
    pub vehicle_type: Option<VehicleType>,
    /// Physical type from classification alone, as stored on the fleet.
    #[serde(skip)]
    pub classified_type: Option<VehicleType>,
    pub is_exempt: bool,
    pub is_retrofitted: bool,
    pub outcomes: Vec<ComplianceOutcome>,
    /// Human-readable summary, e.g. "Exempt from charges.".
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnresolvedVrn {
    pub vrn: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BulkComplianceResults {
    /// Sorted by VRN.
    pub results: Vec<ComplianceResults>,
    /// Sorted by VRN.
    pub unresolved: Vec<UnresolvedVrn>,
}
