//! Boundaries that never take part in generic matching.
//!
//! These are polygons the attributes source lacks or describes badly
//! (disputed territories, Antarctica). They get a fixed synthetic record.

use foundation::fold_name;
use formats::{CountryAttributes, CountryName};

struct SpecialEntity {
    /// Spellings seen in boundary datasets.
    names: &'static [&'static str],
    common: &'static str,
    official: &'static str,
    region: &'static str,
    subregion: &'static str,
    area_km2: f64,
}

#[rustfmt::skip]
const SPECIAL: &[SpecialEntity] = &[
    SpecialEntity { names: &["Antarctica"], common: "Antarctica", official: "Antarctica", region: "Antarctic", subregion: "", area_km2: 14_000_000.0 },
    SpecialEntity { names: &["West Bank"], common: "West Bank", official: "West Bank", region: "Asia", subregion: "Western Asia", area_km2: 5_655.0 },
    SpecialEntity { names: &["Gaza", "Gaza Strip"], common: "Gaza Strip", official: "Gaza Strip", region: "Asia", subregion: "Western Asia", area_km2: 365.0 },
    SpecialEntity { names: &["Northern Cyprus", "N. Cyprus"], common: "Northern Cyprus", official: "Turkish Republic of Northern Cyprus", region: "Asia", subregion: "Western Asia", area_km2: 3_355.0 },
    SpecialEntity { names: &["Somaliland"], common: "Somaliland", official: "Republic of Somaliland", region: "Africa", subregion: "Eastern Africa", area_km2: 176_120.0 },
];

/// Synthetic record for a special-cased boundary name, if it is one.
pub fn special_attributes(boundary_name: &str) -> Option<CountryAttributes> {
    let key = fold_name(boundary_name);
    let entity = SPECIAL
        .iter()
        .find(|e| e.names.iter().any(|n| fold_name(n) == key))?;
    Some(CountryAttributes {
        name: CountryName {
            common: entity.common.to_string(),
            official: entity.official.to_string(),
        },
        region: entity.region.to_string(),
        subregion: entity.subregion.to_string(),
        area: entity.area_km2,
        ..CountryAttributes::default()
    })
}

pub fn is_special(boundary_name: &str) -> bool {
    special_attributes(boundary_name).is_some()
}
