//! Eviction of upstream lookup caches.
//!
//! Only the in-process caches in front of external sources are touched;
//! persisted chargeability rows are refreshed by cache population alone.

use std::sync::Arc;

use tracing::info;

use crate::application::exemption::EvictableCache;

#[derive(Clone)]
pub struct CacheInvalidation {
    zones: Arc<dyn EvictableCache>,
    licences: Arc<dyn EvictableCache>,
    vehicle_details: Arc<dyn EvictableCache>,
    registries: Vec<Arc<dyn EvictableCache>>,
}

impl CacheInvalidation {
    pub fn new(
        zones: Arc<dyn EvictableCache>,
        licences: Arc<dyn EvictableCache>,
        vehicle_details: Arc<dyn EvictableCache>,
        registries: Vec<Arc<dyn EvictableCache>>,
    ) -> Self {
        Self {
            zones,
            licences,
            vehicle_details,
            registries,
        }
    }

    pub fn evict_zones(&self) {
        self.zones.evict_all();
        info!("Clean Air Zone cache evicted");
    }

    /// Taxi register lookups.
    pub fn evict_licences(&self) {
        self.licences.evict_all();
        info!("Licence cache evicted");
    }

    pub fn evict_vehicle_details(&self) {
        self.vehicle_details.evict_all();
        info!("Vehicle details cache evicted");
    }

    /// Military, whitelist and retrofit lookups.
    pub fn evict_registries(&self) {
        for cache in &self.registries {
            cache.evict_all();
        }
        info!(count = self.registries.len(), "Registry caches evicted");
    }

    pub fn evict_all(&self) {
        self.evict_zones();
        self.evict_licences();
        self.evict_vehicle_details();
        self.evict_registries();
    }
}
