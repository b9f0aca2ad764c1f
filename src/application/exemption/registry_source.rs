//! Exemption source backed by an external VRN registry.

use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::stream::{self, StreamExt};
use tracing::{debug, warn};

use crate::application::ports::RegistryPort;
use crate::domain::exemption::{ExemptionSource, ExemptionVerdict, RegistryRecord};
use crate::shared::errors::LookupError;
use crate::shared::retry::with_timeout;
use crate::shared::vrn::matching_key;

use super::lookup_cache::LookupCache;
use super::source::{BulkLookup, ExemptionLookup, LookupSettings};

/// Wraps a [`RegistryPort`] with caching, timeouts, retries, chunked bulk
/// calls and a bound on concurrent calls.
///
/// A failed bulk chunk is retried VRN by VRN so that one bad VRN does not
/// take its whole chunk down with it.
pub struct RegistryExemptionSource<R: RegistryRecord> {
    port: Arc<dyn RegistryPort<R>>,
    cache: Arc<LookupCache<ExemptionVerdict>>,
    settings: LookupSettings,
    _record: PhantomData<fn() -> R>,
}

impl<R: RegistryRecord> RegistryExemptionSource<R> {
    pub fn new(
        port: Arc<dyn RegistryPort<R>>,
        cache: Arc<LookupCache<ExemptionVerdict>>,
        settings: LookupSettings,
    ) -> Self {
        Self {
            port,
            cache,
            settings,
            _record: PhantomData,
        }
    }

    pub fn cache(&self) -> &Arc<LookupCache<ExemptionVerdict>> {
        &self.cache
    }

    fn record_failure(&self, count: usize) {
        metrics::counter!("exemption_lookup_failures_total", "source" => R::SOURCE.as_str())
            .increment(count as u64);
    }

    async fn fetch_one(&self, vrn: &str) -> Result<Option<ExemptionVerdict>, LookupError> {
        let operation = format!("{}_lookup", R::SOURCE);
        let op = operation.as_str();
        let port = &self.port;
        let timeout = self.settings.call_timeout;

        let result = self
            .settings
            .retry
            .run(op, move || with_timeout(op, timeout, port.find(vrn)), LookupError::is_retryable)
            .await;

        match result {
            Ok(record) => Ok(record.and_then(|r| r.verdict())),
            Err(LookupError::NotFound(_)) => Ok(None),
            Err(e) => {
                self.record_failure(1);
                Err(e)
            }
        }
    }

    async fn fetch_chunk<'a>(
        &self,
        chunk: &'a [String],
    ) -> (&'a [String], Result<HashMap<String, R>, LookupError>) {
        let operation = format!("{}_bulk_lookup", R::SOURCE);
        let op = operation.as_str();
        let port = &self.port;
        let timeout = self.settings.call_timeout;

        let result = self
            .settings
            .retry
            .run(op, move || with_timeout(op, timeout, port.find_many(chunk)), LookupError::is_retryable)
            .await
            .map(|records| {
                records
                    .into_iter()
                    .map(|r| (matching_key(r.vrn()), r))
                    .collect::<HashMap<_, _>>()
            });
        (chunk, result)
    }

    async fn lookup_pair<'a>(
        &self,
        vrn: &'a String,
    ) -> (&'a String, Result<Option<ExemptionVerdict>, LookupError>) {
        (vrn, self.lookup(vrn).await)
    }

    /// One call per VRN, at most `max_concurrent_calls` in flight.
    async fn lookup_individually(&self, vrns: &[String], out: &mut BulkLookup) {
        let calls: Vec<_> = vrns.iter().map(|vrn| self.lookup_pair(vrn)).collect();
        let results: Vec<_> = stream::iter(calls)
            .buffer_unordered(self.settings.max_concurrent_calls)
            .collect()
            .await;

        for (vrn, result) in results {
            match result {
                Ok(Some(verdict)) => {
                    out.verdicts.insert(vrn.clone(), verdict);
                }
                Ok(None) => {}
                Err(e) => {
                    out.unprocessed.insert(vrn.clone(), e);
                }
            }
        }
    }
}

#[async_trait]
impl<R: RegistryRecord> ExemptionLookup for RegistryExemptionSource<R> {
    fn source(&self) -> ExemptionSource {
        R::SOURCE
    }

    async fn lookup(&self, vrn: &str) -> Result<Option<ExemptionVerdict>, LookupError> {
        if let Some(cached) = self.cache.get(vrn) {
            return Ok(cached);
        }
        let verdict = self.fetch_one(vrn).await?;
        self.cache.insert(vrn, verdict.clone());
        Ok(verdict)
    }

    async fn lookup_many(&self, vrns: &[String]) -> BulkLookup {
        let mut out = BulkLookup::default();
        let mut pending = Vec::new();
        for vrn in vrns {
            match self.cache.get(vrn) {
                Some(Some(verdict)) => {
                    out.verdicts.insert(vrn.clone(), verdict);
                }
                Some(None) => {}
                None => pending.push(vrn.clone()),
            }
        }

        if pending.is_empty() {
            return out;
        }
        if !self.settings.use_bulk {
            self.lookup_individually(&pending, &mut out).await;
            return out;
        }

        let calls: Vec<_> = pending
            .chunks(self.settings.chunk_size)
            .map(|chunk| self.fetch_chunk(chunk))
            .collect();
        let chunks: Vec<_> = stream::iter(calls)
            .buffer_unordered(self.settings.max_concurrent_calls)
            .collect()
            .await;

        let mut fallback = Vec::new();
        for (chunk, result) in chunks {
            match result {
                Ok(found) => {
                    for vrn in chunk {
                        let verdict = found.get(&matching_key(vrn)).and_then(|r| r.verdict());
                        self.cache.insert(vrn, verdict.clone());
                        if let Some(verdict) = verdict {
                            out.verdicts.insert(vrn.clone(), verdict);
                        }
                    }
                }
                Err(LookupError::NotFound(_)) => {
                    for vrn in chunk {
                        self.cache.insert(vrn, None);
                    }
                }
                Err(e) => {
                    warn!(
                        source = %R::SOURCE,
                        chunk_size = chunk.len(),
                        error = %e,
                        "Bulk lookup failed, falling back to single lookups"
                    );
                    fallback.extend(chunk.iter().cloned());
                }
            }
        }

        if !fallback.is_empty() {
            self.lookup_individually(&fallback, &mut out).await;
        }

        debug!(
            source = %R::SOURCE,
            requested = vrns.len(),
            matched = out.verdicts.len(),
            unprocessed = out.unprocessed.len(),
            "Bulk lookup finished"
        );
        out
    }
}
