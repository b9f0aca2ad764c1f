//! Exemptions that follow from the vehicle's own attributes

use crate::config::ExemptionSettings;
use crate::domain::exemption::{ExemptionSource, ExemptionVerdict};
use crate::domain::vehicle::{Vehicle, VehicleType};

/// Fuel types, tax classes and type approvals that are never charged,
/// checked after the registry chain found nothing decisive.
#[derive(Debug, Clone)]
pub struct AttributeExemptions {
    fuel_types: Vec<String>,
    tax_classes: Vec<String>,
    type_approvals: Vec<String>,
    agricultural: bool,
}

impl Default for AttributeExemptions {
    fn default() -> Self {
        Self::from(&ExemptionSettings::default())
    }
}

impl From<&ExemptionSettings> for AttributeExemptions {
    fn from(s: &ExemptionSettings) -> Self {
        let lower = |list: &[String]| -> Vec<String> {
            list.iter().map(|v| v.trim().to_lowercase()).collect()
        };
        Self {
            fuel_types: lower(&s.fuel_types),
            tax_classes: lower(&s.tax_classes),
            type_approvals: s.type_approvals.iter().map(|v| v.trim().to_uppercase()).collect(),
            agricultural: s.agricultural,
        }
    }
}

impl AttributeExemptions {
    pub fn assess(&self, vehicle: &Vehicle) -> Option<ExemptionVerdict> {
        let normalized = |value: &Option<String>| {
            value
                .as_deref()
                .map(|v| v.trim().to_lowercase())
                .filter(|v| !v.is_empty())
        };

        if let Some(fuel) = normalized(&vehicle.fuel_type) {
            if self.fuel_types.contains(&fuel) {
                return Some(Self::verdict(format!("Exempt fuel type: {}", fuel)));
            }
        }
        if let Some(tax_class) = normalized(&vehicle.tax_class) {
            if self.tax_classes.contains(&tax_class) {
                return Some(Self::verdict(format!("Exempt tax class: {}", tax_class)));
            }
        }
        if let Some(approval) = vehicle.type_approval.as_deref().map(|v| v.trim().to_uppercase()) {
            if self.type_approvals.contains(&approval) {
                return Some(Self::verdict(format!("Exempt type approval: {}", approval)));
            }
        }
        if self.agricultural && vehicle.vehicle_type == Some(VehicleType::Agricultural) {
            return Some(Self::verdict("Agricultural vehicle"));
        }
        None
    }

    fn verdict(category: impl Into<String>) -> ExemptionVerdict {
        ExemptionVerdict::exempt(ExemptionSource::VehicleAttributes).with_category(category)
    }
}
