//! Wiring of the engine from configuration and outbound ports.

use std::sync::Arc;
use std::time::Duration;

use crate::application::classification::{UnidentifiableVehicleRegistry, VehicleTypeClassifier};
use crate::application::compliance::{ComplianceService, FuelTypeZoneOverride};
use crate::application::exemption::{
    AttributeExemptions, EvictableCache, ExemptionChain, ExemptionLookup, LookupCache, LookupSettings,
    RegistryExemptionSource,
};
use crate::application::ports::{
    CachedVehicleDetails, CachedZoneCatalog, RegistryPort, VehicleDetailsProvider, ZoneCatalog,
};
use crate::config::AppConfig;
use crate::domain::exemption::{MilitaryRecord, RegistryRecord, RetrofitRecord, TaxiLicence, WhitelistEntry};
use crate::domain::RepositoryProvider;

use super::cache_invalidation::CacheInvalidation;
use super::charge_calculation::ChargeCalculationService;

/// Every external source the engine reads.
#[derive(Clone)]
pub struct ExternalPorts {
    pub zones: Arc<dyn ZoneCatalog>,
    pub vehicle_details: Arc<dyn VehicleDetailsProvider>,
    pub military: Arc<dyn RegistryPort<MilitaryRecord>>,
    pub whitelist: Arc<dyn RegistryPort<WhitelistEntry>>,
    pub retrofit: Arc<dyn RegistryPort<RetrofitRecord>>,
    pub taxi: Arc<dyn RegistryPort<TaxiLicence>>,
}

/// Fully wired engine.
pub struct Engine {
    pub calculation: Arc<ChargeCalculationService>,
    pub invalidation: CacheInvalidation,
    pub unidentifiable: Arc<UnidentifiableVehicleRegistry>,
}

impl Engine {
    /// Exemption chain order: military, whitelist, retrofit, taxi register.
    pub fn build(config: &AppConfig, repos: Arc<dyn RepositoryProvider>, ports: ExternalPorts) -> Self {
        let lookups = LookupSettings::from_config(&config.registries, &config.engine);
        let ttl = Duration::from_secs(config.registries.lookup_cache_ttl_secs);

        let military = registry_source(ports.military, ttl, &lookups);
        let whitelist = registry_source(ports.whitelist, ttl, &lookups);
        let retrofit = registry_source(ports.retrofit, ttl, &lookups);
        let taxi = registry_source(ports.taxi, ttl, &lookups);

        let zones = Arc::new(CachedZoneCatalog::new(ports.zones, ttl));
        let vehicle_details = Arc::new(CachedVehicleDetails::new(ports.vehicle_details, ttl));

        let registry_caches: Vec<Arc<dyn EvictableCache>> =
            vec![military.cache().clone(), whitelist.cache().clone(), retrofit.cache().clone()];
        let invalidation = CacheInvalidation::new(
            zones.cache(),
            taxi.cache().clone(),
            vehicle_details.cache(),
            registry_caches,
        );

        let sources: Vec<Arc<dyn ExemptionLookup>> = vec![military, whitelist, retrofit, taxi];
        let unidentifiable = Arc::new(UnidentifiableVehicleRegistry::new());
        let overrides = config
            .compliance
            .zone_overrides
            .iter()
            .map(FuelTypeZoneOverride::from)
            .collect();

        let calculation = ChargeCalculationService::new(repos, zones, vehicle_details, ExemptionChain::new(sources))
            .with_classifier(VehicleTypeClassifier::new(unidentifiable.clone()))
            .with_compliance(ComplianceService::standard(overrides))
            .with_attribute_exemptions(AttributeExemptions::from(&config.exemptions))
            .with_settings(config.engine.clone(), lookups);

        Self {
            calculation: Arc::new(calculation),
            invalidation,
            unidentifiable,
        }
    }
}

fn registry_source<R: RegistryRecord>(
    port: Arc<dyn RegistryPort<R>>,
    ttl: Duration,
    lookups: &LookupSettings,
) -> Arc<RegistryExemptionSource<R>> {
    Arc::new(RegistryExemptionSource::new(
        port,
        Arc::new(LookupCache::new(ttl)),
        lookups.clone(),
    ))
}
