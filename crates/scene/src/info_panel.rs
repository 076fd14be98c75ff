use reconcile::{Confidence, ReconciledCountry};
use serde::Serialize;

pub const NOT_AVAILABLE: &str = "N/A";

/// Display strings for the country info panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoPanel {
    pub title: String,
    pub official_name: String,
    pub capital: String,
    pub population: String,
    pub area: String,
    pub region: String,
    pub subregion: Option<String>,
    pub languages: String,
    pub currencies: String,
    pub timezones: String,
    pub flag: Option<String>,
    pub confidence: Confidence,
    /// `[lon, lat]` the panel is pinned to.
    pub anchor: Option<[f64; 2]>,
}

impl InfoPanel {
    pub fn from_country(country: &ReconciledCountry, anchor: Option<(f64, f64)>) -> Self {
        let a = &country.attributes;
        let or_na = |s: String| if s.is_empty() { NOT_AVAILABLE.to_string() } else { s };

        let capital = or_na(a.capital.join(", "));
        let population = if a.population == 0 {
            NOT_AVAILABLE.to_string()
        } else {
            group_thousands(a.population)
        };
        let area = if a.area > 0.0 {
            format!("{} km²", group_thousands(a.area.round() as u64))
        } else {
            NOT_AVAILABLE.to_string()
        };
        let languages = or_na(
            a.languages
                .values()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(", "),
        );
        let currencies = or_na(
            a.currencies
                .values()
                .map(|c| {
                    if c.symbol.is_empty() {
                        c.name.clone()
                    } else {
                        format!("{} ({})", c.name, c.symbol)
                    }
                })
                .collect::<Vec<_>>()
                .join(", "),
        );

        Self {
            title: a.common_name().to_string(),
            official_name: a.official_name().to_string(),
            capital,
            population,
            area,
            region: or_na(a.region.clone()),
            subregion: Some(a.subregion.clone()).filter(|s| !s.is_empty()),
            languages,
            currencies,
            timezones: or_na(a.timezones.join(", ")),
            flag: a.flag.clone(),
            confidence: country.confidence(),
            anchor: anchor.map(|(lon, lat)| [lon, lat]),
        }
    }
}

/// `38005238` -> `"38,005,238"`.
pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
