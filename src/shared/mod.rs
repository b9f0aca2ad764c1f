pub mod errors;
pub mod retry;
pub mod telemetry;
pub mod vrn;

pub use errors::{DomainError, EngineError, EngineResult, InfraError, LookupError};
pub use retry::RetryPolicy;
pub use vrn::{matching_key, normalize_vrn};
