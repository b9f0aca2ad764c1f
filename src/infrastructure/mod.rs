//! Infrastructure layer - external concerns

pub mod database;
pub mod fixtures;
pub mod storage;

pub use database::{init_database, run_migrations, DatabaseConfig, SeaOrmRepositoryProvider};
pub use fixtures::Fixtures;
pub use storage::{InMemoryPorts, InMemoryStorage};
