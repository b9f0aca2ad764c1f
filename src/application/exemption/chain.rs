//! Ordered chain of exemption sources.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::compliance::UnresolvedVrn;
use crate::domain::exemption::{ExemptionSource, ExemptionVerdict};
use crate::domain::vehicle::Vehicle;
use crate::shared::errors::LookupError;

use super::source::ExemptionLookup;

/// What the chain learned about one VRN.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExemptionAssessment {
    /// First exempt/compliant/retrofit verdict. Later sources were skipped.
    pub decisive: Option<ExemptionVerdict>,
    /// Non-decisive verdicts (taxi register) gathered before that point.
    pub enrichment: Vec<ExemptionVerdict>,
}

impl ExemptionAssessment {
    pub fn is_exempt(&self) -> bool {
        self.decisive.as_ref().is_some_and(|v| v.exempt)
    }

    pub fn is_compliant(&self) -> bool {
        self.decisive.as_ref().is_some_and(|v| !v.exempt && v.compliant)
    }

    pub fn is_retrofitted(&self) -> bool {
        self.decisive.as_ref().is_some_and(|v| v.retrofitted)
    }

    pub fn source(&self) -> Option<ExemptionSource> {
        self.decisive.as_ref().and_then(|v| v.source)
    }

    /// Copy taxi data and any vehicle type override onto `vehicle`.
    pub fn apply_to(&self, vehicle: &mut Vehicle) {
        for verdict in self.enrichment.iter().chain(self.decisive.iter()) {
            if verdict.is_taxi_or_phv {
                vehicle.is_taxi_or_phv = true;
                vehicle.wheelchair = verdict.wheelchair;
                vehicle.licensing_authorities = verdict.licensing_authorities.clone();
            }
            if let Some(override_type) = verdict.override_vehicle_type {
                vehicle.vehicle_type = override_type;
            }
        }
    }

    fn absorb(&mut self, verdict: ExemptionVerdict) {
        if verdict.is_decisive() {
            self.decisive = Some(verdict);
        } else {
            self.enrichment.push(verdict);
        }
    }
}

/// Chain result for a set of VRNs.
#[derive(Debug, Default)]
pub struct BulkAssessment {
    /// One entry per VRN that every source answered for.
    pub assessments: HashMap<String, ExemptionAssessment>,
    pub unprocessed: Vec<UnresolvedVrn>,
}

/// Sources are consulted in order; the first decisive verdict ends the
/// chain for that VRN.
#[derive(Clone, Default)]
pub struct ExemptionChain {
    sources: Vec<Arc<dyn ExemptionLookup>>,
}

impl ExemptionChain {
    pub fn new(sources: Vec<Arc<dyn ExemptionLookup>>) -> Self {
        Self { sources }
    }

    pub fn sources(&self) -> impl Iterator<Item = ExemptionSource> + '_ {
        self.sources.iter().map(|s| s.source())
    }

    pub async fn assess(&self, vrn: &str) -> Result<ExemptionAssessment, LookupError> {
        let mut assessment = ExemptionAssessment::default();
        for source in &self.sources {
            if let Some(verdict) = source.lookup(vrn).await? {
                assessment.absorb(verdict);
                if assessment.decisive.is_some() {
                    break;
                }
            }
        }
        Ok(assessment)
    }

    /// Bulk variant. A VRN that any source fails for is reported as
    /// unprocessed and dropped from the remaining sources.
    pub async fn assess_many(&self, vrns: &[String]) -> BulkAssessment {
        let mut assessments: HashMap<String, ExemptionAssessment> = vrns
            .iter()
            .map(|vrn| (vrn.clone(), ExemptionAssessment::default()))
            .collect();
        let mut unprocessed = Vec::new();
        let mut remaining: Vec<String> = vrns.to_vec();

        for source in &self.sources {
            if remaining.is_empty() {
                break;
            }
            let mut bulk = source.lookup_many(&remaining).await;

            let mut settled = HashSet::new();
            for (vrn, error) in bulk.unprocessed.drain() {
                assessments.remove(&vrn);
                unprocessed.push(UnresolvedVrn {
                    reason: format!("{} lookup failed: {}", source.source(), error),
                    vrn: vrn.clone(),
                });
                settled.insert(vrn);
            }

            let mut decisive = 0usize;
            for (vrn, verdict) in bulk.verdicts {
                if settled.contains(&vrn) {
                    continue;
                }
                if let Some(assessment) = assessments.get_mut(&vrn) {
                    assessment.absorb(verdict);
                    if assessment.decisive.is_some() {
                        decisive += 1;
                        settled.insert(vrn);
                    }
                }
            }

            debug!(
                source = %source.source(),
                checked = remaining.len(),
                decisive,
                "Exemption source consulted"
            );
            remaining.retain(|vrn| !settled.contains(vrn));
        }

        if !unprocessed.is_empty() {
            info!(count = unprocessed.len(), "VRNs left unprocessed by exemption sources");
        }
        unprocessed.sort_by(|a, b| a.vrn.cmp(&b.vrn));
        BulkAssessment {
            assessments,
            unprocessed,
        }
    }
}
