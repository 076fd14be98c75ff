//! Last-resort country list used when every attributes endpoint fails.
//!
//! Names, codes, capitals and regions only; numbers stay at zero because a
//! stale hardcoded population is worse than an obviously missing one.

use crate::attributes::{CountryAttributes, CountryName};

struct BuiltinCountry {
    common: &'static str,
    official: &'static str,
    cca2: &'static str,
    cca3: &'static str,
    capital: &'static str,
    region: &'static str,
    subregion: &'static str,
}

const fn c(
    common: &'static str,
    official: &'static str,
    cca2: &'static str,
    cca3: &'static str,
    capital: &'static str,
    region: &'static str,
    subregion: &'static str,
) -> BuiltinCountry {
    BuiltinCountry {
        common,
        official,
        cca2,
        cca3,
        capital,
        region,
        subregion,
    }
}

#[rustfmt::skip]
const BUILTIN: &[BuiltinCountry] = &[
    c("Argentina", "Argentine Republic", "AR", "ARG", "Buenos Aires", "Americas", "South America"),
    c("Australia", "Commonwealth of Australia", "AU", "AUS", "Canberra", "Oceania", "Australia and New Zealand"),
    c("Bangladesh", "People's Republic of Bangladesh", "BD", "BGD", "Dhaka", "Asia", "Southern Asia"),
    c("Brazil", "Federative Republic of Brazil", "BR", "BRA", "Brasília", "Americas", "South America"),
    c("Canada", "Canada", "CA", "CAN", "Ottawa", "Americas", "North America"),
    c("Chile", "Republic of Chile", "CL", "CHL", "Santiago", "Americas", "South America"),
    c("China", "People's Republic of China", "CN", "CHN", "Beijing", "Asia", "Eastern Asia"),
    c("Colombia", "Republic of Colombia", "CO", "COL", "Bogotá", "Americas", "South America"),
    c("DR Congo", "Democratic Republic of the Congo", "CD", "COD", "Kinshasa", "Africa", "Middle Africa"),
    c("Egypt", "Arab Republic of Egypt", "EG", "EGY", "Cairo", "Africa", "Northern Africa"),
    c("Ethiopia", "Federal Democratic Republic of Ethiopia", "ET", "ETH", "Addis Ababa", "Africa", "Eastern Africa"),
    c("France", "French Republic", "FR", "FRA", "Paris", "Europe", "Western Europe"),
    c("Germany", "Federal Republic of Germany", "DE", "DEU", "Berlin", "Europe", "Western Europe"),
    c("Greece", "Hellenic Republic", "GR", "GRC", "Athens", "Europe", "Southern Europe"),
    c("India", "Republic of India", "IN", "IND", "New Delhi", "Asia", "Southern Asia"),
    c("Indonesia", "Republic of Indonesia", "ID", "IDN", "Jakarta", "Asia", "South-Eastern Asia"),
    c("Iran", "Islamic Republic of Iran", "IR", "IRN", "Tehran", "Asia", "Southern Asia"),
    c("Iraq", "Republic of Iraq", "IQ", "IRQ", "Baghdad", "Asia", "Western Asia"),
    c("Italy", "Italian Republic", "IT", "ITA", "Rome", "Europe", "Southern Europe"),
    c("Japan", "Japan", "JP", "JPN", "Tokyo", "Asia", "Eastern Asia"),
    c("Kenya", "Republic of Kenya", "KE", "KEN", "Nairobi", "Africa", "Eastern Africa"),
    c("Mexico", "United Mexican States", "MX", "MEX", "Mexico City", "Americas", "North America"),
    c("Morocco", "Kingdom of Morocco", "MA", "MAR", "Rabat", "Africa", "Northern Africa"),
    c("Netherlands", "Kingdom of the Netherlands", "NL", "NLD", "Amsterdam", "Europe", "Western Europe"),
    c("New Zealand", "New Zealand", "NZ", "NZL", "Wellington", "Oceania", "Australia and New Zealand"),
    c("Niger", "Republic of Niger", "NE", "NER", "Niamey", "Africa", "Western Africa"),
    c("Nigeria", "Federal Republic of Nigeria", "NG", "NGA", "Abuja", "Africa", "Western Africa"),
    c("Norway", "Kingdom of Norway", "NO", "NOR", "Oslo", "Europe", "Northern Europe"),
    c("Pakistan", "Islamic Republic of Pakistan", "PK", "PAK", "Islamabad", "Asia", "Southern Asia"),
    c("Peru", "Republic of Peru", "PE", "PER", "Lima", "Americas", "South America"),
    c("Philippines", "Republic of the Philippines", "PH", "PHL", "Manila", "Asia", "South-Eastern Asia"),
    c("Poland", "Republic of Poland", "PL", "POL", "Warsaw", "Europe", "Central Europe"),
    c("Portugal", "Portuguese Republic", "PT", "PRT", "Lisbon", "Europe", "Southern Europe"),
    c("Russia", "Russian Federation", "RU", "RUS", "Moscow", "Europe", "Eastern Europe"),
    c("Saudi Arabia", "Kingdom of Saudi Arabia", "SA", "SAU", "Riyadh", "Asia", "Western Asia"),
    c("South Africa", "Republic of South Africa", "ZA", "ZAF", "Pretoria", "Africa", "Southern Africa"),
    c("South Korea", "Republic of Korea", "KR", "KOR", "Seoul", "Asia", "Eastern Asia"),
    c("Spain", "Kingdom of Spain", "ES", "ESP", "Madrid", "Europe", "Southern Europe"),
    c("Sweden", "Kingdom of Sweden", "SE", "SWE", "Stockholm", "Europe", "Northern Europe"),
    c("Thailand", "Kingdom of Thailand", "TH", "THA", "Bangkok", "Asia", "South-Eastern Asia"),
    c("Turkey", "Republic of Turkey", "TR", "TUR", "Ankara", "Asia", "Western Asia"),
    c("Ukraine", "Ukraine", "UA", "UKR", "Kyiv", "Europe", "Eastern Europe"),
    c("United Kingdom", "United Kingdom of Great Britain and Northern Ireland", "GB", "GBR", "London", "Europe", "Northern Europe"),
    c("United States", "United States of America", "US", "USA", "Washington, D.C.", "Americas", "North America"),
    c("Vietnam", "Socialist Republic of Vietnam", "VN", "VNM", "Hanoi", "Asia", "South-Eastern Asia"),
];

/// The built-in list as attribute records, in a fixed order.
pub fn builtin_countries() -> Vec<CountryAttributes> {
    BUILTIN
        .iter()
        .map(|b| CountryAttributes {
            name: CountryName {
                common: b.common.to_string(),
                official: b.official.to_string(),
            },
            cca2: Some(b.cca2.to_string()),
            cca3: Some(b.cca3.to_string()),
            capital: vec![b.capital.to_string()],
            region: b.region.to_string(),
            subregion: b.subregion.to_string(),
            ..CountryAttributes::default()
        })
        .collect()
}
