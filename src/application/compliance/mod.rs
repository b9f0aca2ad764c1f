//! Compliance rule chain

pub mod euro_status;
pub mod rules;
pub mod service;
pub mod zone_override;

pub use euro_status::{parse_euro_standard, EuroStatusAbsentRule, EuroStatusPresentRule};
pub use rules::{ComplianceRule, RuleVerdict};
pub use service::ComplianceService;
pub use zone_override::FuelTypeZoneOverride;
