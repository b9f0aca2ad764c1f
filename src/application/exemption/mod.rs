//! Exemption chain: registry adapters, their lookup caches and
//! attribute-based exemptions.

pub mod attributes;
pub mod chain;
pub mod lookup_cache;
pub mod registry_source;
pub mod source;

pub use attributes::AttributeExemptions;
pub use chain::{BulkAssessment, ExemptionAssessment, ExemptionChain};
pub use lookup_cache::{EvictableCache, LookupCache};
pub use registry_source::RegistryExemptionSource;
pub use source::{BulkLookup, ExemptionLookup, LookupSettings};
