//! Exemption aggregate: verdicts and the registry records behind them

pub mod model;

pub use model::{
    ExemptionSource, ExemptionVerdict, MilitaryRecord, RegistryRecord, RetrofitRecord, TaxiLicence,
    WhitelistEntry, WHITELIST_CATEGORY_NON_UK, WHITELIST_CATEGORY_OTHER,
    WHITELIST_CATEGORY_PROBLEMATIC_VRN, WHITE_VEHICLE_CATEGORY,
};
