//! Chargeability cache entity

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

/// One persisted row per (vehicle, zone). Overwritten on recalculation,
/// never deleted by the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct ChargeabilityCacheEntry {
    pub vehicle_id: Uuid,
    pub zone_id: Uuid,
    /// `None` when compliance could not be determined.
    pub charge: Option<Decimal>,
    pub is_exempt: bool,
    pub is_retrofitted: bool,
    pub tariff_code: Option<String>,
    pub refreshed_at: DateTime<Utc>,
}

/// Summary of one cache-population run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePopulationOutcome {
    /// Every candidate vehicle was cached.
    AllProcessed,
    /// `failed` vehicles could not be cached after retries.
    PartiallyProcessed { failed: usize },
    /// The run was capped by its limit; `remaining` vehicles still need work.
    BatchProcessedMoreRemaining { remaining: usize },
    /// Every candidate was already cached for every active zone.
    NothingToProcess,
}

impl CachePopulationOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AllProcessed => "ALL_PROCESSED",
            Self::PartiallyProcessed { .. } => "PARTIALLY_PROCESSED",
            Self::BatchProcessedMoreRemaining { .. } => "BATCH_PROCESSED_MORE_REMAINING",
            Self::NothingToProcess => "NOTHING_TO_PROCESS",
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::PartiallyProcessed { .. })
    }
}

impl std::fmt::Display for CachePopulationOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PartiallyProcessed { failed } => write!(f, "{} (failed: {})", self.as_str(), failed),
            Self::BatchProcessedMoreRemaining { remaining } => {
                write!(f, "{} (remaining: {})", self.as_str(), remaining)
            }
            _ => f.write_str(self.as_str()),
        }
    }
}
