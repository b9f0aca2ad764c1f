//! Exemption verdicts and registry records

use serde::{Deserialize, Serialize};

use crate::domain::vehicle::{VehicleType, Wheelchair};

/// Where a verdict came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExemptionSource {
    Military,
    Whitelist,
    Retrofit,
    Taxi,
    /// Fuel type, tax class or type approval of the vehicle itself.
    VehicleAttributes,
}

impl ExemptionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Military => "military",
            Self::Whitelist => "whitelist",
            Self::Retrofit => "retrofit",
            Self::Taxi => "taxi",
            Self::VehicleAttributes => "vehicle_attributes",
        }
    }
}

impl std::fmt::Display for ExemptionSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Answer of one exemption source for one VRN.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExemptionVerdict {
    pub source: Option<ExemptionSource>,
    pub exempt: bool,
    /// Only meaningful when `exempt` is false.
    pub compliant: bool,
    pub retrofitted: bool,
    /// `Some(None)` forces the vehicle type to "unset".
    pub override_vehicle_type: Option<Option<VehicleType>>,
    pub exemption_code: Option<String>,
    pub category: Option<String>,
    /// Taxi register only.
    pub is_taxi_or_phv: bool,
    pub wheelchair: Wheelchair,
    pub licensing_authorities: Vec<String>,
}

impl ExemptionVerdict {
    pub fn exempt(source: ExemptionSource) -> Self {
        Self {
            source: Some(source),
            exempt: true,
            ..Default::default()
        }
    }

    pub fn compliant(source: ExemptionSource) -> Self {
        Self {
            source: Some(source),
            compliant: true,
            ..Default::default()
        }
    }

    pub fn retrofitted() -> Self {
        Self {
            source: Some(ExemptionSource::Retrofit),
            retrofitted: true,
            ..Default::default()
        }
    }

    pub fn taxi(wheelchair: Wheelchair, licensing_authorities: Vec<String>) -> Self {
        Self {
            source: Some(ExemptionSource::Taxi),
            is_taxi_or_phv: true,
            wheelchair,
            licensing_authorities,
            ..Default::default()
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.exemption_code = Some(code.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Whether this verdict ends the chain. Taxi data only enriches.
    pub fn is_decisive(&self) -> bool {
        self.exempt || self.compliant || self.retrofitted
    }
}

// ── Registry records ───────────────────────────────────────────

/// Entry in the MOD registry of white fleet vehicles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MilitaryRecord {
    pub vrn: String,
    #[serde(default)]
    pub exemption_code: Option<String>,
}

/// General-purpose whitelist entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhitelistEntry {
    pub vrn: String,
    pub category: String,
    #[serde(default)]
    pub exempt: bool,
    #[serde(default)]
    pub compliant: bool,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrofitRecord {
    pub vrn: String,
    #[serde(default)]
    pub model: Option<String>,
}

/// Licence information held by the national taxi register.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxiLicence {
    pub vrn: String,
    #[serde(default)]
    pub wheelchair_accessible: Option<bool>,
    #[serde(default)]
    pub licensing_authorities: Vec<String>,
}

/// A registry entry that can answer for one VRN.
pub trait RegistryRecord: Clone + Send + Sync + 'static {
    const SOURCE: ExemptionSource;

    fn vrn(&self) -> &str;

    /// What this entry means for the vehicle. `None` when the entry carries
    /// no usable information.
    fn verdict(&self) -> Option<ExemptionVerdict>;
}

impl RegistryRecord for MilitaryRecord {
    const SOURCE: ExemptionSource = ExemptionSource::Military;

    fn vrn(&self) -> &str {
        &self.vrn
    }

    fn verdict(&self) -> Option<ExemptionVerdict> {
        let mut verdict =
            ExemptionVerdict::exempt(Self::SOURCE).with_category(WHITE_VEHICLE_CATEGORY);
        verdict.exemption_code = self.exemption_code.clone();
        Some(verdict)
    }
}

impl RegistryRecord for WhitelistEntry {
    const SOURCE: ExemptionSource = ExemptionSource::Whitelist;

    fn vrn(&self) -> &str {
        &self.vrn
    }

    fn verdict(&self) -> Option<ExemptionVerdict> {
        // Exempt and compliant are mutually exclusive; exempt wins on bad data.
        let mut verdict = if self.exempt {
            ExemptionVerdict::exempt(Self::SOURCE)
        } else if self.compliant {
            ExemptionVerdict::compliant(Self::SOURCE)
        } else {
            return None;
        };
        verdict.category = Some(self.category.clone());
        if self.category.eq_ignore_ascii_case(WHITELIST_CATEGORY_OTHER) {
            verdict.override_vehicle_type = Some(None);
        }
        Some(verdict)
    }
}

impl RegistryRecord for RetrofitRecord {
    const SOURCE: ExemptionSource = ExemptionSource::Retrofit;

    fn vrn(&self) -> &str {
        &self.vrn
    }

    fn verdict(&self) -> Option<ExemptionVerdict> {
        Some(ExemptionVerdict::retrofitted())
    }
}

impl RegistryRecord for TaxiLicence {
    const SOURCE: ExemptionSource = ExemptionSource::Taxi;

    fn vrn(&self) -> &str {
        &self.vrn
    }

    fn verdict(&self) -> Option<ExemptionVerdict> {
        Some(ExemptionVerdict::taxi(
            Wheelchair::from(self.wheelchair_accessible),
            self.licensing_authorities.clone(),
        ))
    }
}

pub const WHITE_VEHICLE_CATEGORY: &str = "WHITE VEHICLE";
/// Whitelist category whose entries carry no trustworthy vehicle type.
pub const WHITELIST_CATEGORY_OTHER: &str = "Other";
pub const WHITELIST_CATEGORY_NON_UK: &str = "Non-UK Vehicle";
pub const WHITELIST_CATEGORY_PROBLEMATIC_VRN: &str = "Problematic VRN";
