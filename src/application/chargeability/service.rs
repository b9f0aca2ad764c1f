//! Charge for a non-compliant vehicle in one zone.

use rust_decimal::Decimal;
use tracing::debug;

use crate::domain::clean_air_zone::CleanAirZone;
use crate::domain::vehicle::{Vehicle, VehicleType, Wheelchair};

use super::table::ChargeabilityTable;

const DISABLED_TAX_CLASS: &str = "disabled";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChargeDetermination {
    pub chargeable: bool,
    /// A tariff rate applied, even if that rate is 0.
    pub tariff_applicable: bool,
    pub charge: Decimal,
}

impl ChargeDetermination {
    pub fn not_chargeable() -> Self {
        Self {
            chargeable: false,
            tariff_applicable: false,
            charge: Decimal::ZERO,
        }
    }

    fn at_rate(rate: Decimal) -> Self {
        Self {
            chargeable: true,
            tariff_applicable: true,
            charge: rate.max(Decimal::ZERO),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ChargeabilityService {
    table: ChargeabilityTable,
}

impl ChargeabilityService {
    pub fn new(table: ChargeabilityTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &ChargeabilityTable {
        &self.table
    }

    /// Whether `vehicle_type` is charged at all in `zone`. Motorcycles also
    /// need the zone's `charges_motorcycles` flag.
    pub fn is_chargeable_in(&self, zone: &CleanAirZone, vehicle_type: VehicleType) -> bool {
        if vehicle_type == VehicleType::Motorcycle && !zone.charges_motorcycles {
            return false;
        }
        self.table.is_chargeable(zone.tariff_class, vehicle_type)
    }

    /// Charge `vehicle` (already known to be non-compliant) in `zone`.
    pub fn charge(&self, vehicle: &Vehicle, zone: &CleanAirZone) -> ChargeDetermination {
        let Some(vehicle_type) = vehicle.effective_type() else {
            return ChargeDetermination::not_chargeable();
        };

        // Only an explicit "accessible" earns the WAV rate; unknown pays as a taxi.
        if vehicle_type == VehicleType::TaxiOrPhv && vehicle.wheelchair == Wheelchair::Accessible {
            if let Some(rate) = zone.wheelchair_accessible_taxi_rate {
                debug!(vrn = %vehicle.vrn, zone = %zone.name, "Wheelchair accessible taxi rate");
                return ChargeDetermination::at_rate(rate);
            }
        }

        if !has_recognised_tax_class(vehicle) && !zone.disabled_tax_class_chargeable {
            debug!(vrn = %vehicle.vrn, zone = %zone.name, "Tax class not chargeable in zone");
            return ChargeDetermination::not_chargeable();
        }

        if !self.is_chargeable_in(zone, vehicle_type) {
            return ChargeDetermination::not_chargeable();
        }

        ChargeDetermination::at_rate(zone.rate_for(vehicle_type).unwrap_or(Decimal::ZERO))
    }
}

/// Missing, blank and DISABLED tax classes are governed by the zone flag.
fn has_recognised_tax_class(vehicle: &Vehicle) -> bool {
    match vehicle.tax_class.as_deref().map(str::trim) {
        None | Some("") => false,
        Some(tc) => !tc.eq_ignore_ascii_case(DISABLED_TAX_CLASS),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::clean_air_zone::TariffClass;

    fn service() -> ChargeabilityService {
        ChargeabilityService::default()
    }

    fn zone(class: TariffClass) -> CleanAirZone {
        CleanAirZone::new("Test", class)
            .with_rate(VehicleType::PrivateCar, Decimal::from(50))
            .with_rate(VehicleType::TaxiOrPhv, Decimal::from(12))
            .with_rate(VehicleType::Hgv, Decimal::from(100))
            .with_rate(VehicleType::Motorcycle, Decimal::from(5))
    }

    fn car() -> Vehicle {
        Vehicle {
            tax_class: Some("PRIVATE/LIGHT GOODS (PLG)".into()),
            vehicle_type: Some(VehicleType::PrivateCar),
            ..Vehicle::new("CAR1")
        }
    }

    #[test]
    fn private_car_charged_in_d_but_not_c() {
        let d = service().charge(&car(), &zone(TariffClass::D));
        assert!(d.chargeable);
        assert_eq!(d.charge, Decimal::from(50));

        let c = service().charge(&car(), &zone(TariffClass::C));
        assert!(!c.chargeable);
        assert_eq!(c.charge, Decimal::ZERO);
    }

    #[test]
    fn zero_rate_is_distinct_from_not_chargeable() {
        let mut z = zone(TariffClass::D);
        z.rates.insert(VehicleType::PrivateCar, Decimal::ZERO);

        let d = service().charge(&car(), &z);
        assert!(d.chargeable && d.tariff_applicable);
        assert_eq!(d.charge, Decimal::ZERO);
    }

    #[test]
    fn wav_rate_only_when_explicitly_accessible() {
        let mut z = zone(TariffClass::A);
        z.wheelchair_accessible_taxi_rate = Some(Decimal::ZERO);

        let mut taxi = car();
        taxi.is_taxi_or_phv = true;

        for wheelchair in [Wheelchair::Unknown, Wheelchair::NotAccessible] {
            taxi.wheelchair = wheelchair;
            let d = service().charge(&taxi, &z);
            assert_eq!(d.charge, Decimal::from(12), "{wheelchair:?}");
        }

        taxi.wheelchair = Wheelchair::Accessible;
        let d = service().charge(&taxi, &z);
        assert!(d.chargeable);
        assert_eq!(d.charge, Decimal::ZERO);
    }

    #[test]
    fn disabled_or_missing_tax_class_follows_zone_flag() {
        let mut z = zone(TariffClass::D);
        let mut v = car();

        for tax_class in [None, Some(""), Some("Disabled")] {
            v.tax_class = tax_class.map(String::from);
            z.disabled_tax_class_chargeable = false;
            assert_eq!(service().charge(&v, &z), ChargeDetermination::not_chargeable());

            z.disabled_tax_class_chargeable = true;
            assert_eq!(service().charge(&v, &z).charge, Decimal::from(50));
        }
    }

    #[test]
    fn motorcycles_only_where_the_zone_says_so() {
        let mut bike = car();
        bike.vehicle_type = Some(VehicleType::Motorcycle);

        let mut z = zone(TariffClass::D);
        assert!(!service().charge(&bike, &z).chargeable);

        z.charges_motorcycles = true;
        assert_eq!(service().charge(&bike, &z).charge, Decimal::from(5));

        let mut c = zone(TariffClass::C);
        c.charges_motorcycles = true;
        assert!(!service().charge(&bike, &c).chargeable);
    }

    #[test]
    fn custom_table_decides_chargeable_types() {
        use std::collections::HashSet;

        let mut sets: std::collections::HashMap<_, HashSet<_>> =
            TariffClass::ALL.into_iter().map(|class| (class, HashSet::new())).collect();
        sets.get_mut(&TariffClass::C).unwrap().insert(VehicleType::Motorcycle);
        sets.get_mut(&TariffClass::D).unwrap().extend([VehicleType::Motorcycle, VehicleType::Agricultural]);
        let service = ChargeabilityService::new(ChargeabilityTable::from_sets(sets).unwrap());

        let mut bike = car();
        bike.vehicle_type = Some(VehicleType::Motorcycle);
        let mut c = zone(TariffClass::C);
        assert!(!service.charge(&bike, &c).chargeable);
        c.charges_motorcycles = true;
        assert_eq!(service.charge(&bike, &c).charge, Decimal::from(5));

        let mut tractor = car();
        tractor.vehicle_type = Some(VehicleType::Agricultural);
        assert!(service.charge(&tractor, &zone(TariffClass::D)).chargeable);
        assert!(!service.charge(&car(), &zone(TariffClass::D)).chargeable);
    }

    #[test]
    fn unset_type_and_missing_rate() {
        let mut v = car();
        v.vehicle_type = None;
        assert_eq!(service().charge(&v, &zone(TariffClass::D)), ChargeDetermination::not_chargeable());

        v.vehicle_type = Some(VehicleType::Bus);
        let d = service().charge(&v, &zone(TariffClass::A));
        assert!(d.chargeable);
        assert_eq!(d.charge, Decimal::ZERO);
    }

    #[test]
    fn charge_is_never_negative() {
        let z = zone(TariffClass::D).with_rate(VehicleType::PrivateCar, Decimal::from(-3));
        let d = service().charge(&car(), &z);
        assert_eq!(d.charge, Decimal::ZERO);

        for class in TariffClass::ALL {
            for t in VehicleType::ALL {
                let mut v = car();
                v.vehicle_type = Some(t);
                let d = service().charge(&v, &zone(class));
                assert!(d.charge >= Decimal::ZERO);
                if !d.chargeable {
                    assert_eq!(d.charge, Decimal::ZERO);
                }
            }
        }
    }
}
