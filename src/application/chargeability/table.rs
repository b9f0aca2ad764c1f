//! Which vehicle types each tariff class charges.

use std::collections::{HashMap, HashSet};

use crate::domain::clean_air_zone::TariffClass;
use crate::domain::vehicle::VehicleType;
use crate::shared::errors::DomainError;

/// Map of tariff class -> chargeable vehicle types.
///
/// Invariant: the sets are monotonic, every type chargeable in A is
/// chargeable in B, every type in B in C, and so on. Construction rejects
/// tables that break it.
#[derive(Debug, Clone, PartialEq)]
pub struct ChargeabilityTable {
    sets: HashMap<TariffClass, HashSet<VehicleType>>,
}

impl Default for ChargeabilityTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl ChargeabilityTable {
    /// National CAZ framework classes. Motorcycles sit in D; a zone still
    /// has to opt in with `charges_motorcycles`.
    pub fn standard() -> Self {
        use VehicleType::*;

        let a: HashSet<_> = [Bus, Coach, TaxiOrPhv].into_iter().collect();
        let b: HashSet<_> = a.iter().copied().chain([Hgv]).collect();
        let c: HashSet<_> = b.iter().copied().chain([SmallVan, LargeVan, Minibus]).collect();
        let d: HashSet<_> = c.iter().copied().chain([PrivateCar, Motorcycle]).collect();

        Self {
            sets: HashMap::from([
                (TariffClass::A, a),
                (TariffClass::B, b),
                (TariffClass::C, c),
                (TariffClass::D, d),
            ]),
        }
    }

    /// Build a custom table. Every class must be present and the sets must
    /// be monotonic.
    pub fn from_sets(sets: HashMap<TariffClass, HashSet<VehicleType>>) -> Result<Self, DomainError> {
        let table = Self { sets };
        table.check_monotonic()?;
        Ok(table)
    }

    pub fn check_monotonic(&self) -> Result<(), DomainError> {
        for class in TariffClass::ALL {
            if !self.sets.contains_key(&class) {
                return Err(DomainError::Validation(format!(
                    "chargeability table has no entry for class {class}"
                )));
            }
        }

        for pair in TariffClass::ALL.windows(2) {
            let (lower, upper) = (pair[0], pair[1]);
            let missing: Vec<_> = self
                .chargeable_types(lower)
                .difference(self.chargeable_types(upper))
                .map(VehicleType::code)
                .collect();
            if !missing.is_empty() {
                return Err(DomainError::Validation(format!(
                    "class {upper} must charge everything class {lower} charges; missing {}",
                    missing.join(", ")
                )));
            }
        }
        Ok(())
    }

    pub fn chargeable_types(&self, class: TariffClass) -> &HashSet<VehicleType> {
        static EMPTY: std::sync::OnceLock<HashSet<VehicleType>> = std::sync::OnceLock::new();
        self.sets
            .get(&class)
            .unwrap_or_else(|| EMPTY.get_or_init(HashSet::new))
    }

    pub fn is_chargeable(&self, class: TariffClass, vehicle_type: VehicleType) -> bool {
        self.chargeable_types(class).contains(&vehicle_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_table_is_monotonic() {
        let table = ChargeabilityTable::standard();
        assert!(table.check_monotonic().is_ok());

        for pair in TariffClass::ALL.windows(2) {
            for t in VehicleType::ALL {
                if table.is_chargeable(pair[0], t) {
                    assert!(table.is_chargeable(pair[1], t), "{t} in {} but not {}", pair[0], pair[1]);
                }
            }
        }
    }

    #[test]
    fn class_membership() {
        let table = ChargeabilityTable::standard();
        assert!(table.is_chargeable(TariffClass::A, VehicleType::Bus));
        assert!(table.is_chargeable(TariffClass::A, VehicleType::TaxiOrPhv));
        assert!(!table.is_chargeable(TariffClass::A, VehicleType::Hgv));
        assert!(table.is_chargeable(TariffClass::B, VehicleType::Hgv));
        assert!(table.is_chargeable(TariffClass::C, VehicleType::LargeVan));
        assert!(!table.is_chargeable(TariffClass::C, VehicleType::PrivateCar));
        assert!(table.is_chargeable(TariffClass::D, VehicleType::PrivateCar));
        assert!(table.is_chargeable(TariffClass::D, VehicleType::Motorcycle));
        assert!(!table.is_chargeable(TariffClass::C, VehicleType::Motorcycle));
        for class in TariffClass::ALL {
            assert!(!table.is_chargeable(class, VehicleType::Agricultural));
        }
    }

    #[test]
    fn rejects_non_monotonic_tables() {
        let mut sets = ChargeabilityTable::standard().sets;
        sets.get_mut(&TariffClass::C).unwrap().remove(&VehicleType::Hgv);

        let err = ChargeabilityTable::from_sets(sets).unwrap_err();
        assert!(err.to_string().contains("HGV"));
    }

    #[test]
    fn rejects_missing_classes() {
        let mut sets = ChargeabilityTable::standard().sets;
        sets.remove(&TariffClass::B);
        assert!(ChargeabilityTable::from_sets(sets).is_err());
    }

    #[test]
    fn accepts_custom_monotonic_table() {
        let mut sets = ChargeabilityTable::standard().sets;
        sets.get_mut(&TariffClass::D).unwrap().insert(VehicleType::Agricultural);
        let table = ChargeabilityTable::from_sets(sets).unwrap();
        assert!(table.is_chargeable(TariffClass::D, VehicleType::Agricultural));
    }
}
