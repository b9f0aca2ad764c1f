//! Chargeability pipeline: exemption chain, compliance, then charge.
//!
//! One VRN is evaluated against every requested zone. Exempt VRNs never
//! reach the vehicle-details source or the compliance rules.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures_util::stream::{self, StreamExt};
use rust_decimal::Decimal;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::application::chargeability::ChargeabilityService;
use crate::application::classification::{UnidentifiableVehicleRegistry, VehicleTypeClassifier};
use crate::application::compliance::ComplianceService;
use crate::application::exemption::{AttributeExemptions, ExemptionAssessment, ExemptionChain, LookupSettings};
use crate::application::ports::{VehicleDetailsProvider, ZoneCatalog};
use crate::config::EngineSettings;
use crate::domain::{
    BulkComplianceResults, ChargeabilityCacheEntry, CleanAirZone, ComplianceOutcome, ComplianceResults,
    DomainError, RepositoryProvider, UnresolvedVrn, Vehicle,
};
use crate::shared::errors::{EngineResult, LookupError};
use crate::shared::retry::with_timeout;
use crate::shared::vrn::{matching_key, normalize_all, normalize_vrn};

pub const NOTE_EXEMPT: &str = "Exempt from charges.";
pub const NOTE_RETROFITTED: &str = "Retrofitted vehicle.";
pub const NOTE_UNDETERMINABLE: &str = "Unable to determine compliance.";
pub const NOTE_UNIDENTIFIED: &str = "Vehicle type could not be identified.";
pub const NOTE_UNPROCESSED: &str = "Unable to process.";
pub const NOTE_COMPLIANT: &str = "No charge: vehicle is compliant.";

/// A VRN whose exemption status is known and whose details were fetched
/// when needed.
#[derive(Debug, Clone)]
pub(super) struct ResolvedVrn {
    pub vrn: String,
    /// `None` for exempt VRNs, and for decisive verdicts whose details
    /// could not be fetched.
    pub details: Option<Vehicle>,
    pub assessment: ExemptionAssessment,
}

/// Vehicle details keyed by matching key, plus per-VRN failures.
#[derive(Debug, Default)]
struct DetailsLookup {
    found: HashMap<String, Vehicle>,
    failed: HashMap<String, LookupError>,
}

pub struct ChargeCalculationService {
    pub(super) repos: Arc<dyn RepositoryProvider>,
    zones: Arc<dyn ZoneCatalog>,
    vehicle_details: Arc<dyn VehicleDetailsProvider>,
    exemptions: ExemptionChain,
    attribute_exemptions: AttributeExemptions,
    classifier: VehicleTypeClassifier,
    compliance: ComplianceService,
    chargeability: ChargeabilityService,
    pub(super) engine: EngineSettings,
    lookups: LookupSettings,
}

impl ChargeCalculationService {
    pub fn new(
        repos: Arc<dyn RepositoryProvider>,
        zones: Arc<dyn ZoneCatalog>,
        vehicle_details: Arc<dyn VehicleDetailsProvider>,
        exemptions: ExemptionChain,
    ) -> Self {
        Self {
            repos,
            zones,
            vehicle_details,
            exemptions,
            attribute_exemptions: AttributeExemptions::default(),
            classifier: VehicleTypeClassifier::new(Arc::new(UnidentifiableVehicleRegistry::new())),
            compliance: ComplianceService::default(),
            chargeability: ChargeabilityService::default(),
            engine: EngineSettings::default(),
            lookups: LookupSettings::default(),
        }
    }

    pub fn with_classifier(mut self, classifier: VehicleTypeClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn with_compliance(mut self, compliance: ComplianceService) -> Self {
        self.compliance = compliance;
        self
    }

    pub fn with_chargeability(mut self, chargeability: ChargeabilityService) -> Self {
        self.chargeability = chargeability;
        self
    }

    pub fn with_attribute_exemptions(mut self, exemptions: AttributeExemptions) -> Self {
        self.attribute_exemptions = exemptions;
        self
    }

    pub fn with_settings(mut self, engine: EngineSettings, lookups: LookupSettings) -> Self {
        self.engine = engine;
        self.lookups = lookups;
        self
    }

    pub fn classifier(&self) -> &VehicleTypeClassifier {
        &self.classifier
    }

    // ── Exposed operations ─────────────────────────────────────

    /// Evaluate one VRN against `zone_ids` (all active zones when empty).
    pub async fn check_vrn_against_caz(&self, vrn: &str, zone_ids: &[Uuid]) -> EngineResult<ComplianceResults> {
        let zones = self.zones_for(zone_ids).await?;
        self.check_in(vrn, &zones).await
    }

    /// Evaluate many VRNs. Failures are reported per VRN in `unresolved`.
    pub async fn bulk_compliance_check(
        &self,
        vrns: &[String],
        zone_ids: &[Uuid],
    ) -> EngineResult<BulkComplianceResults> {
        let zones = self.zones_for(zone_ids).await?;
        self.bulk_check_in(vrns, &zones).await
    }

    // ── Pipeline ───────────────────────────────────────────────

    pub(super) async fn check_in(&self, vrn: &str, zones: &[CleanAirZone]) -> EngineResult<ComplianceResults> {
        let vrn = normalize_vrn(vrn);
        if vrn.is_empty() {
            return Err(DomainError::Metadata("VRN must not be empty".to_string()).into());
        }

        let assessment = self.exemptions.assess(&vrn).await?;
        let details = if assessment.is_exempt() {
            None
        } else {
            match self.fetch_details_one(&vrn).await {
                Ok(Some(vehicle)) => Some(vehicle),
                Ok(None) if assessment.decisive.is_some() => None,
                Ok(None) => {
                    return Err(DomainError::NotFound {
                        entity: "Vehicle",
                        field: "vrn",
                        value: vrn,
                    }
                    .into())
                }
                Err(e) if assessment.decisive.is_some() => {
                    warn!(error = %e, "Vehicle details unavailable, relying on registry verdict");
                    None
                }
                Err(e) => return Err(e.into()),
            }
        };

        Ok(self.evaluate(
            ResolvedVrn {
                vrn,
                details,
                assessment,
            },
            zones,
        ))
    }

    pub(super) async fn bulk_check_in(
        &self,
        vrns: &[String],
        zones: &[CleanAirZone],
    ) -> EngineResult<BulkComplianceResults> {
        let vrns = normalize_all(vrns);
        if vrns.is_empty() {
            return Err(DomainError::Metadata("No vehicles supplied".to_string()).into());
        }

        let (resolved, unresolved) = self.resolve_many(&vrns).await;
        let mut results: Vec<_> = resolved.into_iter().map(|r| self.evaluate(r, zones)).collect();
        results.sort_by(|a, b| a.vrn.cmp(&b.vrn));

        info!(
            requested = vrns.len(),
            resolved = results.len(),
            unresolved = unresolved.len(),
            zones = zones.len(),
            "Bulk compliance check finished"
        );
        Ok(BulkComplianceResults { results, unresolved })
    }

    /// Run the exemption chain in bulk, then fetch details for every VRN
    /// that is not exempt. Returned unresolved VRNs are sorted.
    pub(super) async fn resolve_many(&self, vrns: &[String]) -> (Vec<ResolvedVrn>, Vec<UnresolvedVrn>) {
        let bulk = self.exemptions.assess_many(vrns).await;
        let mut assessments = bulk.assessments;
        let mut unresolved = bulk.unprocessed;

        let needs_details: Vec<String> = vrns
            .iter()
            .filter(|vrn| assessments.get(*vrn).is_some_and(|a| !a.is_exempt()))
            .cloned()
            .collect();
        let mut details = self.fetch_details_many(&needs_details).await;

        let mut resolved = Vec::with_capacity(vrns.len());
        for vrn in vrns {
            let Some(assessment) = assessments.remove(vrn) else {
                continue;
            };
            if assessment.is_exempt() {
                resolved.push(ResolvedVrn {
                    vrn: vrn.clone(),
                    details: None,
                    assessment,
                });
                continue;
            }

            match details.found.remove(&matching_key(vrn)) {
                Some(vehicle) => resolved.push(ResolvedVrn {
                    vrn: vrn.clone(),
                    details: Some(vehicle),
                    assessment,
                }),
                None if assessment.decisive.is_some() => resolved.push(ResolvedVrn {
                    vrn: vrn.clone(),
                    details: None,
                    assessment,
                }),
                None => {
                    let reason = match details.failed.remove(vrn) {
                        Some(e) => format!("vehicle details lookup failed: {}", e),
                        None => "vehicle details not found".to_string(),
                    };
                    unresolved.push(UnresolvedVrn {
                        vrn: vrn.clone(),
                        reason,
                    });
                }
            }
        }

        unresolved.sort_by(|a, b| a.vrn.cmp(&b.vrn));
        (resolved, unresolved)
    }

    /// Classify, apply the exemption assessment and evaluate every zone.
    pub(super) fn evaluate(&self, resolved: ResolvedVrn, zones: &[CleanAirZone]) -> ComplianceResults {
        let ResolvedVrn {
            vrn,
            details,
            assessment,
        } = resolved;

        let mut vehicle = match details {
            Some(mut vehicle) => {
                vehicle.vrn = vrn.clone();
                self.classifier.classify_in_place(&mut vehicle);
                vehicle
            }
            None => Vehicle::new(vrn.clone()),
        };
        assessment.apply_to(&mut vehicle);

        let verdict = assessment
            .decisive
            .clone()
            .or_else(|| self.attribute_exemptions.assess(&vehicle));

        let outcomes: Vec<_> = zones
            .iter()
            .map(|zone| {
                let mut outcome = ComplianceOutcome {
                    zone_id: zone.id,
                    zone_name: zone.name.clone(),
                    exempt: false,
                    compliant: None,
                    chargeable: false,
                    charge: Decimal::ZERO,
                    retrofitted: false,
                    tariff_code: None,
                    exemption_code: None,
                };

                match &verdict {
                    Some(v) if v.exempt => {
                        outcome.exempt = true;
                        outcome.exemption_code = v.exemption_code.clone();
                        outcome.tariff_code = Some(zone.tariff_code.clone());
                    }
                    Some(v) if v.retrofitted => {
                        outcome.retrofitted = true;
                        outcome.compliant = Some(true);
                        outcome.tariff_code = Some(zone.tariff_code.clone());
                    }
                    Some(v) if v.compliant => {
                        outcome.compliant = Some(true);
                        outcome.tariff_code = Some(zone.tariff_code.clone());
                    }
                    _ => match self.compliance.evaluate(&vehicle, zone) {
                        None => {}
                        Some(true) => {
                            outcome.compliant = Some(true);
                            outcome.tariff_code = Some(zone.tariff_code.clone());
                        }
                        Some(false) => {
                            let determination = self.chargeability.charge(&vehicle, zone);
                            outcome.compliant = Some(false);
                            outcome.chargeable = determination.chargeable;
                            outcome.charge = determination.charge;
                            outcome.tariff_code = determination
                                .tariff_applicable
                                .then(|| zone.tariff_code.clone());
                        }
                    },
                }
                outcome
            })
            .collect();

        let is_exempt = verdict.as_ref().is_some_and(|v| v.exempt);
        let is_retrofitted = verdict.as_ref().is_some_and(|v| v.retrofitted);
        let note = if is_exempt {
            Some(NOTE_EXEMPT)
        } else if is_retrofitted {
            Some(NOTE_RETROFITTED)
        } else if verdict.is_none() && vehicle.vehicle_type.is_none() {
            Some(NOTE_UNIDENTIFIED)
        } else if outcomes.iter().any(ComplianceOutcome::is_undeterminable) {
            Some(NOTE_UNDETERMINABLE)
        } else if outcomes.iter().any(|o| o.compliant == Some(true)) {
            Some(NOTE_COMPLIANT)
        } else {
            None
        };

        debug!(
            exempt = is_exempt,
            retrofitted = is_retrofitted,
            zones = outcomes.len(),
            "Vehicle evaluated"
        );

        ComplianceResults {
            vrn,
            vehicle_type: vehicle.effective_type(),
            classified_type: vehicle.vehicle_type,
            is_exempt,
            is_retrofitted,
            outcomes,
            note: note.map(str::to_string),
        }
    }

    /// One cache row per zone outcome. Undeterminable outcomes keep a null charge.
    pub(super) fn cache_entries(
        vehicle_id: Uuid,
        results: &ComplianceResults,
        refreshed_at: DateTime<Utc>,
    ) -> Vec<ChargeabilityCacheEntry> {
        results
            .outcomes
            .iter()
            .map(|o| ChargeabilityCacheEntry {
                vehicle_id,
                zone_id: o.zone_id,
                charge: (!o.is_undeterminable()).then_some(o.charge),
                is_exempt: o.exempt,
                is_retrofitted: o.retrofitted,
                tariff_code: o.tariff_code.clone(),
                refreshed_at,
            })
            .collect()
    }

    // ── Reference data ─────────────────────────────────────────

    /// Active zones, restricted to `zone_ids` when given. Unknown or
    /// inactive ids fail the whole call.
    pub(super) async fn zones_for(&self, zone_ids: &[Uuid]) -> EngineResult<Vec<CleanAirZone>> {
        let mut zones: Vec<_> = with_timeout("zones", self.lookups.call_timeout, self.zones.zones())
            .await?
            .into_iter()
            .filter(|z| z.active)
            .collect();

        if zone_ids.is_empty() {
            if zones.is_empty() {
                return Err(DomainError::Metadata("No active Clean Air Zones".to_string()).into());
            }
            zones.sort_by(|a, b| a.name.cmp(&b.name));
            return Ok(zones);
        }

        zone_ids
            .iter()
            .map(|id| {
                zones
                    .iter()
                    .find(|z| z.id == *id)
                    .cloned()
                    .ok_or_else(|| DomainError::Metadata(format!("Unknown or inactive zone id: {}", id)).into())
            })
            .collect()
    }

    async fn fetch_details_one(&self, vrn: &str) -> Result<Option<Vehicle>, LookupError> {
        let details = &self.vehicle_details;
        let timeout = self.lookups.call_timeout;
        let result = self
            .lookups
            .retry
            .run(
                "vehicle_details",
                move || with_timeout("vehicle_details", timeout, details.find(vrn)),
                LookupError::is_retryable,
            )
            .await;
        match result {
            Err(LookupError::NotFound(_)) => Ok(None),
            other => other,
        }
    }

    async fn fetch_details_chunk<'a>(
        &self,
        chunk: &'a [String],
    ) -> (&'a [String], Result<Vec<Vehicle>, LookupError>) {
        let details = &self.vehicle_details;
        let timeout = self.lookups.call_timeout;
        let result = self
            .lookups
            .retry
            .run(
                "vehicle_details_bulk",
                move || with_timeout("vehicle_details_bulk", timeout, details.find_many(chunk)),
                LookupError::is_retryable,
            )
            .await;
        (chunk, result)
    }

    async fn fetch_details_pair<'a>(&self, vrn: &'a String) -> (&'a String, Result<Option<Vehicle>, LookupError>) {
        (vrn, self.fetch_details_one(vrn).await)
    }

    async fn fetch_details_individually(&self, vrns: &[String], out: &mut DetailsLookup) {
        let calls: Vec<_> = vrns.iter().map(|vrn| self.fetch_details_pair(vrn)).collect();
        let results: Vec<_> = stream::iter(calls)
            .buffer_unordered(self.lookups.max_concurrent_calls)
            .collect()
            .await;
        for (vrn, result) in results {
            match result {
                Ok(Some(vehicle)) => {
                    out.found.insert(matching_key(vrn), vehicle);
                }
                Ok(None) => {}
                Err(e) => {
                    out.failed.insert(vrn.clone(), e);
                }
            }
        }
    }

    /// Chunked bulk fetch; a failed chunk is retried VRN by VRN.
    async fn fetch_details_many(&self, vrns: &[String]) -> DetailsLookup {
        let mut out = DetailsLookup::default();
        if vrns.is_empty() {
            return out;
        }
        if !self.lookups.use_bulk {
            self.fetch_details_individually(vrns, &mut out).await;
            return out;
        }

        let calls: Vec<_> = vrns
            .chunks(self.lookups.chunk_size)
            .map(|chunk| self.fetch_details_chunk(chunk))
            .collect();
        let chunks: Vec<_> = stream::iter(calls)
            .buffer_unordered(self.lookups.max_concurrent_calls)
            .collect()
            .await;

        let mut fallback = Vec::new();
        for (chunk, result) in chunks {
            match result {
                Ok(vehicles) => {
                    for vehicle in vehicles {
                        out.found.insert(matching_key(&vehicle.vrn), vehicle);
                    }
                }
                Err(LookupError::NotFound(_)) => {}
                Err(e) => {
                    warn!(chunk_size = chunk.len(), error = %e, "Bulk vehicle details failed, falling back to single lookups");
                    fallback.extend(chunk.iter().cloned());
                }
            }
        }
        if !fallback.is_empty() {
            self.fetch_details_individually(&fallback, &mut out).await;
        }
        out
    }

    pub(super) fn batch_timeout(&self) -> Duration {
        Duration::from_secs(self.engine.batch_timeout_secs.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::test_support::{car, fixture, Fixture};
    use crate::domain::exemption::{MilitaryRecord, RetrofitRecord, TaxiLicence, WhitelistEntry};
    use crate::domain::{TariffClass, VehicleType};
    use crate::shared::errors::EngineError;

    #[tokio::test]
    async fn military_vehicle_is_exempt_without_further_calls() {
        let Fixture { engine, ports, .. } = fixture();
        ports.military.insert(MilitaryRecord {
            vrn: "CAS312".into(),
            exemption_code: Some("WDC001".into()),
        });

        let results = engine.calculation.check_vrn_against_caz("CAS312", &[]).await.unwrap();

        assert!(results.is_exempt);
        assert_eq!(results.note.as_deref(), Some(NOTE_EXEMPT));
        assert_eq!(results.outcomes.len(), 2);
        for outcome in &results.outcomes {
            assert!(outcome.exempt);
            assert!(!outcome.chargeable);
            assert_eq!(outcome.charge, Decimal::ZERO);
            assert_eq!(outcome.exemption_code.as_deref(), Some("WDC001"));
        }
        assert_eq!(ports.vehicle_details.calls(), 0);
        assert_eq!(ports.whitelist.calls(), 0);
        assert_eq!(ports.retrofit.calls(), 0);
        assert_eq!(ports.taxi.calls(), 0);
    }

    #[tokio::test]
    async fn private_car_is_charged_only_in_class_d() {
        let Fixture { engine, ports, zones, .. } = fixture();
        ports.vehicle_details.insert(car("OLD1", "diesel", "2010-01-01"));

        let results = engine.calculation.check_vrn_against_caz("old1", &[]).await.unwrap();

        assert_eq!(results.vrn, "OLD1");
        assert_eq!(results.vehicle_type, Some(VehicleType::PrivateCar));
        let by_zone: HashMap<_, _> = results.outcomes.iter().map(|o| (o.zone_id, o)).collect();
        let class_d = by_zone[&zones.class_d.id];
        assert_eq!(class_d.compliant, Some(false));
        assert!(class_d.chargeable);
        assert_eq!(class_d.charge, Decimal::from(50));
        let class_c = by_zone[&zones.class_c.id];
        assert!(!class_c.chargeable);
        assert_eq!(class_c.charge, Decimal::ZERO);
        assert_eq!(results.note, None);
    }

    #[tokio::test]
    async fn compliant_and_retrofitted_vehicles_are_not_charged() {
        let Fixture { engine, ports, .. } = fixture();
        ports.vehicle_details.insert(car("NEW1", "petrol", "2019-05-01"));
        ports.vehicle_details.insert(car("RET1", "diesel", "2010-01-01"));
        ports.retrofit.insert(RetrofitRecord {
            vrn: "RET1".into(),
            model: None,
        });

        let new = engine.calculation.check_vrn_against_caz("NEW1", &[]).await.unwrap();
        assert!(new.outcomes.iter().all(|o| o.compliant == Some(true) && o.charge.is_zero()));
        assert_eq!(new.note.as_deref(), Some(NOTE_COMPLIANT));

        let retrofitted = engine.calculation.check_vrn_against_caz("RET1", &[]).await.unwrap();
        assert!(retrofitted.is_retrofitted);
        assert_eq!(retrofitted.note.as_deref(), Some(NOTE_RETROFITTED));
        assert!(retrofitted.outcomes.iter().all(|o| !o.chargeable && o.retrofitted));
    }

    #[tokio::test]
    async fn missing_euro_status_data_is_undeterminable() {
        let Fixture { engine, ports, .. } = fixture();
        let mut vehicle = car("NODATE1", "diesel", "2010-01-01");
        vehicle.date_of_first_registration = None;
        ports.vehicle_details.insert(vehicle);

        let results = engine.calculation.check_vrn_against_caz("NODATE1", &[]).await.unwrap();

        assert_eq!(results.note.as_deref(), Some(NOTE_UNDETERMINABLE));
        for outcome in &results.outcomes {
            assert_eq!(outcome.compliant, None);
            assert!(!outcome.chargeable);
        }
        let entries = ChargeCalculationService::cache_entries(Uuid::new_v4(), &results, Utc::now());
        assert!(entries.iter().all(|e| e.charge.is_none()));
    }

    #[tokio::test]
    async fn unidentifiable_vehicle_is_recorded_not_failed() {
        let Fixture { engine, ports, .. } = fixture();
        ports.vehicle_details.insert(Vehicle {
            tax_class: Some("something odd".into()),
            ..Vehicle::new("ODD1")
        });

        let results = engine.calculation.check_vrn_against_caz("ODD1", &[]).await.unwrap();

        assert_eq!(results.vehicle_type, None);
        assert_eq!(results.note.as_deref(), Some(NOTE_UNIDENTIFIED));
        assert!(results.outcomes.iter().all(|o| o.compliant.is_none() && !o.chargeable));
        assert!(engine.unidentifiable.get("ODD1").is_some());
    }

    #[tokio::test]
    async fn accessible_taxi_pays_the_wav_rate() {
        let Fixture { engine, ports, zones, .. } = fixture();
        ports.vehicle_details.insert(car("CAB1", "diesel", "2010-01-01"));
        ports.taxi.insert(TaxiLicence {
            vrn: "CAB1".into(),
            wheelchair_accessible: Some(true),
            licensing_authorities: vec!["Bath".into()],
        });

        let results = engine
            .calculation
            .check_vrn_against_caz("CAB1", &[zones.class_c.id])
            .await
            .unwrap();

        assert_eq!(results.vehicle_type, Some(VehicleType::TaxiOrPhv));
        assert_eq!(results.outcomes.len(), 1);
        assert_eq!(results.outcomes[0].charge, Decimal::from(4));
    }

    #[tokio::test]
    async fn whitelisted_unknown_vehicle_is_compliant() {
        let Fixture { engine, ports, .. } = fixture();
        ports.whitelist.insert(WhitelistEntry {
            vrn: "WL1".into(),
            category: "Other".into(),
            exempt: false,
            compliant: true,
            reason: None,
        });

        // No vehicle details at all: the whitelist verdict stands on its own.
        let results = engine.calculation.check_vrn_against_caz("WL1", &[]).await.unwrap();
        assert!(results.outcomes.iter().all(|o| o.compliant == Some(true)));
        assert_eq!(results.vehicle_type, None);
        assert_eq!(results.note.as_deref(), Some(NOTE_COMPLIANT));
    }

    #[tokio::test]
    async fn unknown_zone_and_empty_input_fail_fast() {
        let Fixture { engine, .. } = fixture();

        let err = engine
            .calculation
            .check_vrn_against_caz("CAR1", &[Uuid::new_v4()])
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Domain(DomainError::Metadata(_))));

        let err = engine.calculation.bulk_compliance_check(&[], &[]).await.unwrap_err();
        assert!(matches!(err, EngineError::Domain(DomainError::Metadata(_))));

        let err = engine.calculation.check_vrn_against_caz("GHOST1", &[]).await.unwrap_err();
        assert!(matches!(err, EngineError::Domain(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn bulk_check_reports_failed_vrns_separately() {
        let Fixture { engine, ports, .. } = fixture();
        ports.vehicle_details.insert(car("GOOD1", "diesel", "2010-01-01"));
        ports.vehicle_details.insert(car("BAD1", "diesel", "2010-01-01"));
        ports.vehicle_details.fail_for("BAD1");

        let bulk = engine
            .calculation
            .bulk_compliance_check(&["good1".to_string(), "BAD1".to_string()], &[])
            .await
            .unwrap();

        assert_eq!(bulk.results.len(), 1);
        assert_eq!(bulk.results[0].vrn, "GOOD1");
        assert_eq!(bulk.unresolved.len(), 1);
        assert_eq!(bulk.unresolved[0].vrn, "BAD1");
        assert!(bulk.unresolved[0].reason.contains("vehicle details lookup failed"));
    }

    #[tokio::test]
    async fn bulk_results_are_sorted_by_vrn() {
        let Fixture { engine, ports, .. } = fixture();
        for vrn in ["ZZ1", "AA1", "MM1"] {
            ports.vehicle_details.insert(car(vrn, "petrol", "2018-01-01"));
        }

        let bulk = engine
            .calculation
            .bulk_compliance_check(&["ZZ1".to_string(), "AA1".to_string(), "MM1".to_string()], &[])
            .await
            .unwrap();

        let order: Vec<_> = bulk.results.iter().map(|r| r.vrn.as_str()).collect();
        assert_eq!(order, vec!["AA1", "MM1", "ZZ1"]);
    }

    #[test]
    fn zone_fixture_is_sane() {
        let zones = crate::application::services::test_support::zones();
        assert_eq!(zones.class_c.tariff_class, TariffClass::C);
        assert_eq!(zones.class_d.tariff_class, TariffClass::D);
    }
}
