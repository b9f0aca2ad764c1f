pub mod model;

pub use model::{BulkComplianceResults, ComplianceOutcome, ComplianceResults, UnresolvedVrn};
