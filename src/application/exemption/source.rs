//! The single capability every exemption source offers.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;

use crate::config::{EngineSettings, RegistrySettings};
use crate::domain::exemption::{ExemptionSource, ExemptionVerdict};
use crate::shared::errors::LookupError;
use crate::shared::retry::RetryPolicy;

/// Outcome of a bulk lookup. VRNs in neither map are absent from the source.
#[derive(Debug, Default)]
pub struct BulkLookup {
    pub verdicts: HashMap<String, ExemptionVerdict>,
    /// VRNs whose lookup failed after retries.
    pub unprocessed: HashMap<String, LookupError>,
}

#[async_trait]
pub trait ExemptionLookup: Send + Sync {
    fn source(&self) -> ExemptionSource;

    async fn lookup(&self, vrn: &str) -> Result<Option<ExemptionVerdict>, LookupError>;

    /// Bulk variant. The default issues one lookup per VRN, in order.
    async fn lookup_many(&self, vrns: &[String]) -> BulkLookup {
        let mut out = BulkLookup::default();
        for vrn in vrns {
            match self.lookup(vrn).await {
                Ok(Some(verdict)) => {
                    out.verdicts.insert(vrn.clone(), verdict);
                }
                Ok(None) => {}
                Err(e) => {
                    out.unprocessed.insert(vrn.clone(), e);
                }
            }
        }
        out
    }
}

/// How adapters talk to their registry.
#[derive(Debug, Clone)]
pub struct LookupSettings {
    pub chunk_size: usize,
    pub max_concurrent_calls: usize,
    pub call_timeout: Duration,
    pub retry: RetryPolicy,
    pub use_bulk: bool,
}

impl Default for LookupSettings {
    fn default() -> Self {
        Self::from_config(&RegistrySettings::default(), &EngineSettings::default())
    }
}

impl LookupSettings {
    pub fn from_config(registries: &RegistrySettings, engine: &EngineSettings) -> Self {
        Self {
            chunk_size: registries.bulk_chunk_size.max(1),
            max_concurrent_calls: registries.max_concurrent_calls.max(1),
            call_timeout: Duration::from_secs(engine.call_timeout_secs.max(1)),
            retry: RetryPolicy::from(&engine.retry),
            use_bulk: registries.use_bulk_endpoints,
        }
    }
}
