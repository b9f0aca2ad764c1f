//! Application services

mod cache_invalidation;
mod cache_population;
mod charge_calculation;
mod csv_export;
mod engine;
#[cfg(test)]
mod test_support;

pub use cache_invalidation::CacheInvalidation;
pub use charge_calculation::{
    ChargeCalculationService, NOTE_COMPLIANT, NOTE_EXEMPT, NOTE_RETROFITTED, NOTE_UNDETERMINABLE, NOTE_UNIDENTIFIED,
    NOTE_UNPROCESSED,
};
pub use csv_export::{read_vrns, to_csv_rows, write_csv, CsvRow};
pub use engine::{Engine, ExternalPorts};
