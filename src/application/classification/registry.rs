//! Record of vehicles the classifier could not identify, kept for offline review.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::warn;

use super::classifier::UnidentifiableReason;

#[derive(Debug, Clone, PartialEq)]
pub struct UnidentifiableVehicle {
    pub vrn: String,
    pub reason: UnidentifiableReason,
    pub recorded_at: DateTime<Utc>,
}

/// Latest failure per VRN.
#[derive(Default)]
pub struct UnidentifiableVehicleRegistry {
    entries: DashMap<String, UnidentifiableVehicle>,
}

impl UnidentifiableVehicleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, vrn: &str, reason: UnidentifiableReason) {
        warn!(vrn, reason = %reason, "Vehicle could not be identified");
        metrics::counter!("unidentifiable_vehicles_total").increment(1);
        self.entries.insert(
            vrn.to_string(),
            UnidentifiableVehicle {
                vrn: vrn.to_string(),
                reason,
                recorded_at: Utc::now(),
            },
        );
    }

    pub fn get(&self, vrn: &str) -> Option<UnidentifiableVehicle> {
        self.entries.get(vrn).map(|e| e.value().clone())
    }

    /// Snapshot sorted by VRN.
    pub fn entries(&self) -> Vec<UnidentifiableVehicle> {
        let mut all: Vec<_> = self.entries.iter().map(|e| e.value().clone()).collect();
        all.sort_by(|a, b| a.vrn.cmp(&b.vrn));
        all
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}
