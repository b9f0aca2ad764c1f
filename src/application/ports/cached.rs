//! Caching decorators for the reference-data ports.
//!
//! Registries are cached inside their exemption adapters; zones and vehicle
//! details are cached here so that every consumer shares one instance.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::application::exemption::LookupCache;
use crate::domain::clean_air_zone::CleanAirZone;
use crate::domain::vehicle::Vehicle;
use crate::shared::errors::LookupError;
use crate::shared::vrn::matching_key;

use super::outbound::{VehicleDetailsProvider, ZoneCatalog};

const ZONES_KEY: &str = "all-zones";

pub struct CachedZoneCatalog {
    inner: Arc<dyn ZoneCatalog>,
    cache: Arc<LookupCache<Vec<CleanAirZone>>>,
}

impl CachedZoneCatalog {
    pub fn new(inner: Arc<dyn ZoneCatalog>, ttl: Duration) -> Self {
        Self {
            inner,
            cache: Arc::new(LookupCache::new(ttl)),
        }
    }

    pub fn cache(&self) -> Arc<LookupCache<Vec<CleanAirZone>>> {
        self.cache.clone()
    }
}

#[async_trait]
impl ZoneCatalog for CachedZoneCatalog {
    async fn zones(&self) -> Result<Vec<CleanAirZone>, LookupError> {
        if let Some(Some(zones)) = self.cache.get(ZONES_KEY) {
            return Ok(zones);
        }
        let zones = self.inner.zones().await?;
        self.cache.insert(ZONES_KEY, Some(zones.clone()));
        Ok(zones)
    }
}

pub struct CachedVehicleDetails {
    inner: Arc<dyn VehicleDetailsProvider>,
    cache: Arc<LookupCache<Vehicle>>,
}

impl CachedVehicleDetails {
    pub fn new(inner: Arc<dyn VehicleDetailsProvider>, ttl: Duration) -> Self {
        Self {
            inner,
            cache: Arc::new(LookupCache::new(ttl)),
        }
    }

    pub fn cache(&self) -> Arc<LookupCache<Vehicle>> {
        self.cache.clone()
    }
}

#[async_trait]
impl VehicleDetailsProvider for CachedVehicleDetails {
    async fn find(&self, vrn: &str) -> Result<Option<Vehicle>, LookupError> {
        if let Some(cached) = self.cache.get(vrn) {
            return Ok(cached);
        }
        let vehicle = match self.inner.find(vrn).await {
            Ok(v) => v,
            Err(LookupError::NotFound(_)) => None,
            Err(e) => return Err(e),
        };
        self.cache.insert(vrn, vehicle.clone());
        Ok(vehicle)
    }

    async fn find_many(&self, vrns: &[String]) -> Result<Vec<Vehicle>, LookupError> {
        let mut found = Vec::new();
        let mut pending = Vec::new();
        for vrn in vrns {
            match self.cache.get(vrn) {
                Some(Some(vehicle)) => found.push(vehicle),
                Some(None) => {}
                None => pending.push(vrn.clone()),
            }
        }
        if pending.is_empty() {
            return Ok(found);
        }

        let fetched = self.inner.find_many(&pending).await?;
        for vrn in &pending {
            let key = matching_key(vrn);
            let hit = fetched.iter().find(|v| matching_key(&v.vrn) == key).cloned();
            self.cache.insert(vrn, hit);
        }
        found.extend(fetched);
        Ok(found)
    }
}
