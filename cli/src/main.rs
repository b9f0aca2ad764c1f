//! CAZ chargeability engine - command line runner
//!
//! ```sh
//! # Check one VRN against every zone, registries seeded from a fixtures file
//! caz-chargeability --fixtures data.json check AB12CDE
//!
//! # Bulk check a CSV of VRNs, CSV report on stdout
//! caz-chargeability --fixtures data.json bulk --input vrns.csv
//!
//! # Populate the chargeability cache for one account's fleet
//! caz-chargeability --fixtures data.json populate --owner 0e1f0b52-... --limit 100
//!
//! # Validate config without running anything
//! caz-chargeability --check
//! ```

use std::fs::File;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::{error, info, warn};
use uuid::Uuid;

use caz_chargeability::application::services::{read_vrns, write_csv};
use caz_chargeability::config::AppConfig;
use caz_chargeability::domain::RepositoryProvider;
use caz_chargeability::infrastructure::{Fixtures, InMemoryPorts};
use caz_chargeability::shared::telemetry::init_tracing;
use caz_chargeability::{
    default_config_path, init_database, run_migrations, DatabaseConfig, Engine, SeaOrmRepositoryProvider,
};

/// Clean Air Zone chargeability engine.
#[derive(Parser, Debug)]
#[command(
    name = "caz-chargeability",
    version,
    about = "Clean Air Zone vehicle chargeability engine",
    long_about = "Determines whether vehicles are exempt, compliant or chargeable in \
                  Clean Air Zones and maintains the chargeability cache.\n\n\
                  Default config: ~/.config/caz-chargeability/config.toml"
)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = "CAZ_CONFIG")]
    config: Option<PathBuf>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    /// JSON file seeding zones, vehicle details, registries and the fleet.
    #[arg(long, env = "CAZ_FIXTURES")]
    fixtures: Option<PathBuf>,

    /// Validate the configuration file and exit.
    #[arg(long)]
    check: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Evaluate one VRN; prints the results as JSON.
    Check {
        vrn: String,
        /// Zone ids to evaluate; all zones when omitted.
        #[arg(long = "zone")]
        zones: Vec<Uuid>,
    },
    /// Evaluate a CSV of VRNs (first column) and write the CSV report.
    Bulk {
        #[arg(short, long)]
        input: PathBuf,
        /// Output file; stdout when omitted.
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long = "zone")]
        zones: Vec<Uuid>,
    },
    /// Populate the chargeability cache for one owner's fleet.
    Populate {
        #[arg(long)]
        owner: Uuid,
        /// Maximum vehicles to process; 0 means no limit.
        #[arg(long, default_value_t = 0)]
        limit: usize,
    },
    /// Recompute the cache rows of a single vehicle.
    PopulateVehicle {
        #[arg(long)]
        vehicle_id: Uuid,
        #[arg(long)]
        vrn: String,
    },
    /// Recompute missing or stale rows across all owners.
    Refresh {
        #[arg(long, default_value_t = 0)]
        limit: usize,
    },
    /// Apply database migrations and exit.
    Migrate,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // ── Load configuration ─────────────────────────────────────
    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    let (mut config, load_error) = if config_path.exists() {
        match AppConfig::load(&config_path) {
            Ok(cfg) => (cfg, None),
            Err(e) => (AppConfig::default(), Some(e)),
        }
    } else {
        (AppConfig::default(), None)
    };

    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }
    init_tracing(&config);

    match load_error {
        Some(e) if cli.check => {
            error!("Invalid configuration in {}: {}", config_path.display(), e);
            return Err(e.into());
        }
        Some(e) => {
            error!("Failed to load config from {}: {}", config_path.display(), e);
            error!("Using default configuration.");
        }
        None => info!("Configuration loaded from {}", config_path.display()),
    }

    // ── Config validation mode ─────────────────────────────────
    if cli.check {
        println!("Configuration is valid");
        println!("   Config file : {}", config_path.display());
        println!("   Database    : {}", config.database.url);
        println!("   Log level   : {}", config.logging.level);
        println!("   Workers     : {}", config.engine.worker_count);
        println!("   Batch size  : {}", config.engine.bulk_check_batch_size);
        return Ok(());
    }

    let Some(command) = cli.command else {
        warn!("No command given, nothing to do (see --help)");
        return Ok(());
    };

    // ── Metrics ────────────────────────────────────────────────
    if config.metrics.enabled {
        let addr: SocketAddr = config.metrics.listen.parse()?;
        metrics_exporter_prometheus::PrometheusBuilder::new()
            .with_http_listener(addr)
            .install()?;
        info!("Prometheus metrics exporter listening on http://{}", addr);
    }

    // ── Database ───────────────────────────────────────────────
    let db = init_database(&DatabaseConfig::from(&config.database)).await?;
    run_migrations(&db).await?;
    if matches!(command, Command::Migrate) {
        db.close().await?;
        return Ok(());
    }
    let repos: Arc<dyn RepositoryProvider> = Arc::new(SeaOrmRepositoryProvider::new(db.clone()));

    // ── External sources ───────────────────────────────────────
    let ports = match cli.fixtures {
        Some(ref path) => {
            let fixtures = Fixtures::load(path)?;
            let seeded = fixtures.seed_fleet(repos.fleet_vehicles()).await?;
            info!("Seeded {} fleet vehicles", seeded);
            fixtures.ports()
        }
        None => {
            warn!("No fixtures given; every registry and the zone catalogue are empty");
            InMemoryPorts::default()
        }
    };

    let engine = Engine::build(&config, repos, ports.external());
    let service = engine.calculation.clone();

    // ── Run ────────────────────────────────────────────────────
    match command {
        Command::Check { vrn, zones } => {
            let results = service.check_vrn_against_caz(&vrn, &zones).await?;
            println!("{}", serde_json::to_string_pretty(&results)?);
        }
        Command::Bulk { input, output, zones } => {
            let vrns = read_vrns(File::open(&input)?)?;
            info!("Read {} VRNs from {}", vrns.len(), input.display());
            let rows = service.get_compliance_check_as_csv(&vrns, &zones).await?;
            match output {
                Some(path) => write_csv(&rows, File::create(&path)?)?,
                None => write_csv(&rows, std::io::stdout().lock())?,
            }
        }
        Command::Populate { owner, limit } => {
            let outcome = service.populate_cache(owner, limit).await?;
            println!("{}", outcome);
        }
        Command::PopulateVehicle { vehicle_id, vrn } => {
            service.populate_cache_for_single_vehicle(vehicle_id, &vrn).await?;
            println!("Cached vehicle {}", vehicle_id);
        }
        Command::Refresh { limit } => {
            let outcome = service.refresh_cache(limit).await?;
            println!("{}", outcome);
        }
        Command::Migrate => {}
    }

    let unidentified = engine.unidentifiable.len();
    if unidentified > 0 {
        warn!("{} vehicles could not be classified", unidentified);
    }

    if let Err(e) = db.close().await {
        warn!("Error closing database connection: {}", e);
    }
    Ok(())
}
