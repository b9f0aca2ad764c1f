//! Raw vehicle attributes -> [`VehicleType`].
//!
//! Decision order is type approval, then tax class, then body type. A
//! missing or unknown type approval falls back to the tax class path. A
//! known type approval whose required fields are missing or out of range
//! makes the vehicle unidentifiable.

use std::fmt;
use std::sync::Arc;

use crate::domain::vehicle::{Vehicle, VehicleType};

use super::registry::UnidentifiableVehicleRegistry;

// ── Reference lists (lower-case) ───────────────────────────────

const HGV_TAX_CLASSES: &[&str] = &[
    "hgv",
    "trailer hgv",
    "private hgv",
    "special vehicle",
    "special types vehicles",
    "small islands",
    "hgv ct",
    "recovery vehicle",
    "rp general haulage",
    "rp special types",
    "rp hgv",
    "special vehicle trailer",
];

const BODY_TYPE_CHECK_TAX_CLASSES: &[&str] = &[
    "bicycle",
    "private/light goods (plg)",
    "crown vehicle",
    "not licensed",
    "exempt (no license)",
    "exempt (nil license)",
    "consular",
    "diplomatic",
    "plg (old)",
    "disabled",
    "electric",
    "limited use",
    "police",
    "tricycle",
    "nhsv",
    "ambulance",
    "mowing machine",
    "fire service",
    "fire engine",
    "gritting machine",
    "steam",
    "lifeboat haulage",
    "snow plough",
    "visiting forces",
    "lighthouse authority",
    "mine rescue",
    "digging machine",
    "personal export private",
    "works truck",
    "direct export private",
];

const MOTORCYCLE_BODY_TYPES: &[&str] = &[
    "tricycle",
    "goods tricycle",
    "moped",
    "scooter",
    "scooter combination",
    "motorcycle",
    "m/c combination",
];

const AGRICULTURAL_BODY_TYPES: &[&str] = &[
    "tel material handler",
    "agricultural tractor",
    "combine harvester",
    "root crop harvester",
    "forage harvester",
    "windrower",
    "sprayer",
    "viner/picker",
    "agricultural machine",
    "mowing machine",
];

const COACH_BODY_TYPES: &[&str] = &["s/d bus/coach", "d/d bus/coach", "standee bus", "h/d bus/coach"];

const PRIVATE_CAR_BODY_TYPES: &[&str] = &[
    "2 door saloon",
    "4 door saloon",
    "saloon",
    "convertible",
    "coupe",
    "estate",
    "taxi",
    "hearse",
    "limousine",
    "3 door hatchback",
    "5 door hatchback",
    "sports",
    "pick-up",
    "light 4x4 utility",
    "tourer",
    "mpv",
];

const MINIBUS_MAX_WEIGHT: i32 = 5000;
const N1_MAX_WEIGHT: i32 = 3500;
const SMALL_VAN_MAX_WEIGHT: i32 = 1205;
const COACH_MIN_SEATS: i32 = 23;

// ── Result types ───────────────────────────────────────────────

/// Why a vehicle could not be classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnidentifiableReason {
    /// Field present but its value matched no rule.
    NotRecognised(&'static str),
    /// Field needed by the branch taken was missing.
    MissingField(&'static str),
}

impl fmt::Display for UnidentifiableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotRecognised(field) => write!(f, "{field} not recognised"),
            Self::MissingField(field) => write!(f, "cannot identify with null: {field}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Identified(VehicleType),
    Unidentifiable(UnidentifiableReason),
}

impl Classification {
    pub fn vehicle_type(&self) -> Option<VehicleType> {
        match self {
            Self::Identified(t) => Some(*t),
            Self::Unidentifiable(_) => None,
        }
    }
}

type Verdict = Result<VehicleType, UnidentifiableReason>;

// ── Classifier ─────────────────────────────────────────────────

#[derive(Clone)]
pub struct VehicleTypeClassifier {
    registry: Arc<UnidentifiableVehicleRegistry>,
}

impl VehicleTypeClassifier {
    pub fn new(registry: Arc<UnidentifiableVehicleRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<UnidentifiableVehicleRegistry> {
        &self.registry
    }

    /// Pure classification, no side effects.
    pub fn classify(&self, vehicle: &Vehicle) -> Classification {
        match by_type_approval(vehicle) {
            Ok(t) => Classification::Identified(t),
            Err(reason) => Classification::Unidentifiable(reason),
        }
    }

    /// Classify and store the type on the vehicle. Failures are recorded in
    /// the registry and leave the type unset; they never propagate.
    pub fn classify_in_place(&self, vehicle: &mut Vehicle) -> Option<VehicleType> {
        let classification = self.classify(vehicle);
        if let Classification::Unidentifiable(reason) = &classification {
            self.registry.record(&vehicle.vrn, reason.clone());
        }
        vehicle.vehicle_type = classification.vehicle_type();
        vehicle.vehicle_type
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase)
}

fn by_type_approval(v: &Vehicle) -> Verdict {
    let Some(approval) = non_blank(&v.type_approval) else {
        return by_tax_class(v);
    };

    match approval.to_uppercase().as_str() {
        "M1" => Ok(VehicleType::PrivateCar),
        "M2" => {
            let weight = required(v.revenue_weight, "revenue_weight")?;
            let seats = required(v.seating_capacity, "seating_capacity")?;
            if weight > MINIBUS_MAX_WEIGHT {
                Err(UnidentifiableReason::NotRecognised("revenue_weight"))
            } else if seats <= 0 {
                Err(UnidentifiableReason::NotRecognised("seating_capacity"))
            } else {
                Ok(VehicleType::Minibus)
            }
        }
        "M3" => match required(v.revenue_weight, "revenue_weight")? {
            w if w > MINIBUS_MAX_WEIGHT => Ok(bus_or_coach(v)),
            _ => Err(UnidentifiableReason::NotRecognised("revenue_weight")),
        },
        "N1" => match required(v.revenue_weight, "revenue_weight")? {
            w if w <= SMALL_VAN_MAX_WEIGHT => Ok(VehicleType::SmallVan),
            w if w <= N1_MAX_WEIGHT => Ok(VehicleType::LargeVan),
            _ => Err(UnidentifiableReason::NotRecognised("revenue_weight")),
        },
        "N2" | "N3" => Ok(VehicleType::Hgv),
        a if a.starts_with('L') => Ok(VehicleType::Motorcycle),
        a if a.starts_with('T') => Ok(VehicleType::Agricultural),
        _ => by_tax_class(v),
    }
}

fn required(value: Option<i32>, field: &'static str) -> Result<i32, UnidentifiableReason> {
    value.ok_or(UnidentifiableReason::MissingField(field))
}

fn bus_or_coach(v: &Vehicle) -> VehicleType {
    let seated = v.seating_capacity.unwrap_or(0);
    let standing = v.standing_capacity.unwrap_or(0);
    if seated >= COACH_MIN_SEATS && standing == 0 {
        VehicleType::Coach
    } else {
        VehicleType::Bus
    }
}

fn by_tax_class(v: &Vehicle) -> Verdict {
    let tax_class = non_blank(&v.tax_class).ok_or(UnidentifiableReason::MissingField("tax_class"))?;

    match tax_class.as_str() {
        "electric motorcycle" => Ok(VehicleType::Motorcycle),
        "euro lgv" | "light goods vehicle" => Ok(VehicleType::SmallVan),
        "bus" | "rp bus" => by_minibus_body_type(v),
        t if HGV_TAX_CLASSES.contains(&t) => Ok(VehicleType::Hgv),
        t if BODY_TYPE_CHECK_TAX_CLASSES.contains(&t) => by_body_type(v),
        _ => Err(UnidentifiableReason::NotRecognised("tax_class")),
    }
}

fn body_type(v: &Vehicle) -> Result<String, UnidentifiableReason> {
    non_blank(&v.body_type).ok_or(UnidentifiableReason::MissingField("body_type"))
}

fn by_minibus_body_type(v: &Vehicle) -> Verdict {
    let body = body_type(v)?;
    match body.as_str() {
        "minibus" => Ok(VehicleType::Minibus),
        b if COACH_BODY_TYPES.contains(&b) => Ok(VehicleType::Bus),
        _ => Err(UnidentifiableReason::NotRecognised("body_type")),
    }
}

fn by_body_type(v: &Vehicle) -> Verdict {
    let body = body_type(v)?;
    match body.as_str() {
        "minibus" => Ok(VehicleType::Minibus),
        b if MOTORCYCLE_BODY_TYPES.contains(&b) => Ok(VehicleType::Motorcycle),
        b if AGRICULTURAL_BODY_TYPES.contains(&b) => Ok(VehicleType::Agricultural),
        b if COACH_BODY_TYPES.contains(&b) => Ok(VehicleType::Bus),
        b if PRIVATE_CAR_BODY_TYPES.contains(&b) => Ok(VehicleType::PrivateCar),
        _ => Err(UnidentifiableReason::NotRecognised("body_type")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> VehicleTypeClassifier {
        VehicleTypeClassifier::new(Arc::new(UnidentifiableVehicleRegistry::new()))
    }

    fn vehicle(type_approval: Option<&str>) -> Vehicle {
        Vehicle {
            type_approval: type_approval.map(String::from),
            ..Vehicle::new("CU57ABC")
        }
    }

    fn identified(v: &Vehicle) -> Option<VehicleType> {
        classifier().classify(v).vehicle_type()
    }

    #[test]
    fn m1_is_private_car() {
        assert_eq!(identified(&vehicle(Some("M1"))), Some(VehicleType::PrivateCar));
    }

    #[test]
    fn m2_needs_weight_and_seats() {
        let mut v = vehicle(Some("M2"));
        v.revenue_weight = Some(4000);
        v.seating_capacity = Some(12);
        assert_eq!(identified(&v), Some(VehicleType::Minibus));

        v.seating_capacity = Some(0);
        assert_eq!(
            classifier().classify(&v),
            Classification::Unidentifiable(UnidentifiableReason::NotRecognised("seating_capacity"))
        );

        v.seating_capacity = None;
        assert_eq!(
            classifier().classify(&v),
            Classification::Unidentifiable(UnidentifiableReason::MissingField("seating_capacity"))
        );
    }

    #[test]
    fn m2_without_weight_is_unidentifiable_despite_tax_class() {
        let mut v = vehicle(Some("M2"));
        v.seating_capacity = Some(12);
        v.tax_class = Some("RP HGV".into());
        let c = classifier().classify(&v);
        assert_eq!(
            c,
            Classification::Unidentifiable(UnidentifiableReason::MissingField("revenue_weight"))
        );
        if let Classification::Unidentifiable(reason) = c {
            assert_eq!(reason.to_string(), "cannot identify with null: revenue_weight");
        }
    }

    #[test]
    fn m3_splits_bus_and_coach() {
        let mut v = vehicle(Some("M3"));
        v.revenue_weight = Some(18000);
        v.seating_capacity = Some(49);
        v.standing_capacity = Some(0);
        assert_eq!(identified(&v), Some(VehicleType::Coach));

        v.standing_capacity = Some(30);
        assert_eq!(identified(&v), Some(VehicleType::Bus));

        v.revenue_weight = None;
        v.tax_class = Some("bus".into());
        assert_eq!(
            classifier().classify(&v),
            Classification::Unidentifiable(UnidentifiableReason::MissingField("revenue_weight"))
        );
    }

    #[test]
    fn n1_splits_small_and_large_vans() {
        let mut v = vehicle(Some("N1"));
        v.revenue_weight = Some(1205);
        assert_eq!(identified(&v), Some(VehicleType::SmallVan));
        v.revenue_weight = Some(3500);
        assert_eq!(identified(&v), Some(VehicleType::LargeVan));

        v.revenue_weight = Some(3501);
        v.tax_class = Some("light goods vehicle".into());
        assert_eq!(
            classifier().classify(&v),
            Classification::Unidentifiable(UnidentifiableReason::NotRecognised("revenue_weight"))
        );

        v.revenue_weight = None;
        assert_eq!(
            classifier().classify(&v),
            Classification::Unidentifiable(UnidentifiableReason::MissingField("revenue_weight"))
        );
    }

    #[test]
    fn heavy_goods_motorcycles_and_tractors() {
        assert_eq!(identified(&vehicle(Some("N3"))), Some(VehicleType::Hgv));
        assert_eq!(identified(&vehicle(Some("L3e"))), Some(VehicleType::Motorcycle));
        assert_eq!(identified(&vehicle(Some("T1"))), Some(VehicleType::Agricultural));
    }

    #[test]
    fn body_type_path_for_private_light_goods() {
        let mut v = vehicle(None);
        v.tax_class = Some("PRIVATE/LIGHT GOODS (PLG)".into());
        v.body_type = Some("5 Door Hatchback".into());
        assert_eq!(identified(&v), Some(VehicleType::PrivateCar));

        v.body_type = Some("Moped".into());
        assert_eq!(identified(&v), Some(VehicleType::Motorcycle));

        v.body_type = Some("Combine Harvester".into());
        assert_eq!(identified(&v), Some(VehicleType::Agricultural));

        v.body_type = Some("Hovercraft".into());
        assert_eq!(
            classifier().classify(&v),
            Classification::Unidentifiable(UnidentifiableReason::NotRecognised("body_type"))
        );
    }

    #[test]
    fn bus_tax_class_checks_minibus_body() {
        let mut v = vehicle(None);
        v.tax_class = Some("bus".into());
        v.body_type = Some("Minibus".into());
        assert_eq!(identified(&v), Some(VehicleType::Minibus));

        v.body_type = Some("D/D Bus/Coach".into());
        assert_eq!(identified(&v), Some(VehicleType::Bus));

        v.body_type = None;
        assert_eq!(
            classifier().classify(&v),
            Classification::Unidentifiable(UnidentifiableReason::MissingField("body_type"))
        );
    }

    #[test]
    fn unknown_type_approval_uses_tax_class() {
        let mut v = vehicle(Some("ZZ9"));
        v.tax_class = Some("electric motorcycle".into());
        assert_eq!(identified(&v), Some(VehicleType::Motorcycle));
    }

    #[test]
    fn unrecognised_tax_class_is_reported() {
        let mut v = vehicle(None);
        v.tax_class = Some("hovercraft".into());
        let c = classifier().classify(&v);
        assert_eq!(
            c,
            Classification::Unidentifiable(UnidentifiableReason::NotRecognised("tax_class"))
        );
        if let Classification::Unidentifiable(reason) = c {
            assert_eq!(reason.to_string(), "tax_class not recognised");
        }
    }

    #[test]
    fn classify_in_place_records_failures_without_raising() {
        let classifier = classifier();
        let mut v = vehicle(None);
        v.vehicle_type = Some(VehicleType::Bus);

        assert_eq!(classifier.classify_in_place(&mut v), None);
        assert_eq!(v.vehicle_type, None);

        let recorded = classifier.registry().get("CU57ABC").unwrap();
        assert_eq!(recorded.reason.to_string(), "cannot identify with null: tax_class");
        assert_eq!(classifier.registry().len(), 1);
    }
}
