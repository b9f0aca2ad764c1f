//! # CAZ Chargeability Engine
//!
//! Determines, for a vehicle and a set of Clean Air Zones, whether the
//! vehicle is exempt, compliant or chargeable and at what daily rate, and
//! persists those results as a per-(vehicle, zone) chargeability cache.
//!
//! ## Architecture
//!
//! - **domain**: Core entities, value types and repository traits
//! - **application**: Classification, exemption chain, compliance rules and
//!   the orchestration services (single/bulk checks, cache population, CSV)
//! - **infrastructure**: SeaORM database, in-memory storage, JSON fixtures
//! - **shared**: Error taxonomy, retry helper, VRN handling, tracing setup

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod shared;

pub use config::{default_config_path, AppConfig};

pub use application::{CacheInvalidation, ChargeCalculationService, Engine, ExternalPorts};

// Re-export database types for easy access
pub use infrastructure::{init_database, run_migrations, DatabaseConfig, SeaOrmRepositoryProvider};
