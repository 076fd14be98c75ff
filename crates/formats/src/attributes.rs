//! Country attribute records as served by the REST Countries v3.1 API.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryName {
    pub common: String,
    pub official: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Currency {
    pub name: String,
    #[serde(default)]
    pub symbol: String,
}

/// Descriptive metadata for one country.
///
/// Immutable once fetched; records that could not be matched to any source
/// are represented by [`CountryAttributes::placeholder`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CountryAttributes {
    pub name: CountryName,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cca2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cca3: Option<String>,
    pub capital: Vec<String>,
    pub population: u64,
    /// Square kilometres.
    pub area: f64,
    pub region: String,
    pub subregion: String,
    /// Language code to language name.
    pub languages: BTreeMap<String, String>,
    /// Currency code to currency.
    pub currencies: BTreeMap<String, Currency>,
    /// UTC offsets such as `"UTC+01:00"`.
    pub timezones: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flag: Option<String>,
    /// `[lat, lng]` as published by the API.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latlng: Option<[f64; 2]>,
}

impl CountryAttributes {
    /// Stand-in for a boundary with no attributes match: the boundary's own
    /// name for both names, zero for numbers, empty collections.
    pub fn placeholder(display_name: &str) -> Self {
        Self {
            name: CountryName {
                common: display_name.to_string(),
                official: display_name.to_string(),
            },
            ..Self::default()
        }
    }

    pub fn common_name(&self) -> &str {
        &self.name.common
    }

    pub fn official_name(&self) -> &str {
        &self.name.official
    }

    pub fn first_capital(&self) -> Option<&str> {
        self.capital.first().map(String::as_str)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AttributesError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("expected an array of country records")]
    NotAnArray,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RestName {
    common: Option<String>,
    official: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RestCurrency {
    name: Option<String>,
    symbol: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RestFlags {
    svg: Option<String>,
    png: Option<String>,
}

/// Wire shape of one REST Countries record. Every field is optional because
/// callers request different `fields=` subsets.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RestCountry {
    name: RestName,
    cca2: Option<String>,
    cca3: Option<String>,
    capital: Option<CapitalField>,
    population: Option<f64>,
    area: Option<f64>,
    region: Option<String>,
    subregion: Option<String>,
    languages: Option<BTreeMap<String, String>>,
    currencies: Option<BTreeMap<String, RestCurrency>>,
    timezones: Option<Vec<String>>,
    flags: Option<RestFlags>,
    latlng: Option<Vec<f64>>,
}

/// Older API revisions return `capital` as a bare string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CapitalField {
    Many(Vec<String>),
    One(String),
}

impl RestCountry {
    fn into_attributes(self) -> Option<CountryAttributes> {
        let common = self.name.common.filter(|s| !s.trim().is_empty())?;
        let official = self
            .name
            .official
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| common.clone());

        let capital = match self.capital {
            Some(CapitalField::Many(v)) => v,
            Some(CapitalField::One(s)) => vec![s],
            None => Vec::new(),
        };
        let currencies = self
            .currencies
            .unwrap_or_default()
            .into_iter()
            .map(|(code, c)| {
                let currency = Currency {
                    name: c.name.unwrap_or_else(|| code.clone()),
                    symbol: c.symbol.unwrap_or_default(),
                };
                (code, currency)
            })
            .collect();
        let flag = self.flags.and_then(|f| f.svg.or(f.png));
        let latlng = self.latlng.and_then(|v| match v.as_slice() {
            [lat, lng, ..] => Some([*lat, *lng]),
            _ => None,
        });

        Some(CountryAttributes {
            name: CountryName { common, official },
            cca2: self.cca2,
            cca3: self.cca3,
            capital,
            population: self.population.unwrap_or(0.0).max(0.0) as u64,
            area: self.area.unwrap_or(0.0).max(0.0),
            region: self.region.unwrap_or_default(),
            subregion: self.subregion.unwrap_or_default(),
            languages: self.languages.unwrap_or_default(),
            currencies,
            timezones: self.timezones.unwrap_or_default(),
            flag,
            latlng,
        })
    }
}

/// Decodes a REST Countries response body.
///
/// Accepts an array of records or a single record. Records without a common
/// name are skipped; order is preserved because it is the tie-break for
/// duplicate names.
pub fn attributes_from_str(payload: &str) -> Result<Vec<CountryAttributes>, AttributesError> {
    let value: Value = serde_json::from_str(payload)?;
    attributes_from_value(value)
}

pub fn attributes_from_value(value: Value) -> Result<Vec<CountryAttributes>, AttributesError> {
    let items = match value {
        Value::Array(items) => items,
        obj @ Value::Object(_) => vec![obj],
        _ => return Err(AttributesError::NotAnArray),
    };

    let mut out = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        let record: RestCountry = match serde_json::from_value(item) {
            Ok(r) => r,
            Err(e) => {
                debug!("skipping malformed country record {index}: {e}");
                continue;
            }
        };
        match record.into_attributes() {
            Some(attrs) => out.push(attrs),
            None => debug!("skipping country record {index} without a common name"),
        }
    }
    Ok(out)
}

/// Joins the responses of one dataset split across several `fields=`
/// requests.
///
/// The first payload fixes which records exist and their order. Later
/// payloads only add keys a record lacks, matched on `cca3`; their records
/// without a `cca3` or with an unknown one are dropped.
pub fn merge_by_cca3(payloads: Vec<Value>) -> Result<Value, AttributesError> {
    let mut payloads = payloads.into_iter();
    let Some(first) = payloads.next() else {
        return Ok(Value::Array(Vec::new()));
    };
    let mut records = match first {
        Value::Array(items) => items,
        obj @ Value::Object(_) => vec![obj],
        _ => return Err(AttributesError::NotAnArray),
    };

    let mut by_code: HashMap<String, usize> = HashMap::new();
    for (i, record) in records.iter().enumerate() {
        if let Some(code) = record.get("cca3").and_then(Value::as_str) {
            by_code.entry(code.to_string()).or_insert(i);
        }
    }

    for payload in payloads {
        let Value::Array(extra) = payload else {
            return Err(AttributesError::NotAnArray);
        };
        for item in extra {
            let Value::Object(fields) = item else {
                continue;
            };
            let Some(&i) = fields
                .get("cca3")
                .and_then(Value::as_str)
                .and_then(|code| by_code.get(code))
            else {
                continue;
            };
            if let Value::Object(target) = &mut records[i] {
                for (key, value) in fields {
                    target.entry(key).or_insert(value);
                }
            }
        }
    }
    Ok(Value::Array(records))
}

#[cfg(test)]
mod tests {
    use super::{
        AttributesError, CountryAttributes, attributes_from_str, attributes_from_value,
        merge_by_cca3,
    };
    use pretty_assertions::assert_eq;

    const CANADA: &str = r#"[{
        "name": {"common": "Canada", "official": "Canada", "nativeName": {}},
        "cca2": "CA", "cca3": "CAN",
        "capital": ["Ottawa"],
        "region": "Americas", "subregion": "North America",
        "population": 38005238, "area": 9984670.0,
        "languages": {"eng": "English", "fra": "French"},
        "currencies": {"CAD": {"name": "Canadian dollar", "symbol": "$"}},
        "timezones": ["UTC-08:00", "UTC-03:30"],
        "flags": {"png": "https://flagcdn.com/w320/ca.png", "svg": "https://flagcdn.com/ca.svg"},
        "latlng": [60.0, -95.0]
    }]"#;

    #[test]
    fn decodes_full_record() {
        let records = attributes_from_str(CANADA).unwrap();
        assert_eq!(records.len(), 1);
        let ca = &records[0];
        assert_eq!(ca.common_name(), "Canada");
        assert_eq!(ca.first_capital(), Some("Ottawa"));
        assert_eq!(ca.population, 38_005_238);
        assert_eq!(ca.languages.len(), 2);
        assert_eq!(ca.currencies["CAD"].symbol, "$");
        assert_eq!(ca.flag.as_deref(), Some("https://flagcdn.com/ca.svg"));
        assert_eq!(ca.latlng, Some([60.0, -95.0]));
    }

    #[test]
    fn tolerates_filtered_fields_and_string_capital() {
        let payload = r#"[
            {"name": {"common": "Chad"}, "capital": "N'Djamena"},
            {"name": {}},
            {"population": 5}
        ]"#;
        let records = attributes_from_str(payload).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].official_name(), "Chad");
        assert_eq!(records[0].capital, vec!["N'Djamena".to_string()]);
        assert_eq!(records[0].area, 0.0);
    }

    #[test]
    fn single_object_is_accepted() {
        let records = attributes_from_str(r#"{"name": {"common": "Japan"}}"#).unwrap();
        assert_eq!(records[0].common_name(), "Japan");
    }

    #[test]
    fn scalar_payload_is_rejected() {
        assert!(matches!(
            attributes_from_str("42"),
            Err(AttributesError::NotAnArray)
        ));
    }

    #[test]
    fn split_payloads_merge_on_cca3() {
        let names: serde_json::Value = serde_json::from_str(
            r#"[
                {"name": {"common": "Canada"}, "cca3": "CAN", "population": 38005238},
                {"name": {"common": "Chad"}, "cca3": "TCD"},
                {"name": {"common": "Kosovo"}}
            ]"#,
        )
        .unwrap();
        let extra: serde_json::Value = serde_json::from_str(
            r#"[
                {"cca3": "TCD", "timezones": ["UTC+01:00"], "latlng": [15.0, 19.0]},
                {"cca3": "CAN", "population": 1, "flags": {"svg": "ca.svg"}},
                {"cca3": "XXX", "timezones": ["UTC"]},
                {"timezones": ["UTC"]}
            ]"#,
        )
        .unwrap();

        let merged = merge_by_cca3(vec![names, extra]).unwrap();
        let records = attributes_from_value(merged).unwrap();
        let names: Vec<&str> = records.iter().map(|r| r.common_name()).collect();
        assert_eq!(names, vec!["Canada", "Chad", "Kosovo"]);
        assert_eq!(records[0].population, 38_005_238);
        assert_eq!(records[0].flag.as_deref(), Some("ca.svg"));
        assert_eq!(records[1].timezones, vec!["UTC+01:00".to_string()]);
        assert_eq!(records[1].latlng, Some([15.0, 19.0]));
        assert!(records[2].timezones.is_empty());

        assert!(matches!(
            merge_by_cca3(vec![serde_json::json!([]), serde_json::json!(7)]),
            Err(AttributesError::NotAnArray)
        ));
    }

    #[test]
    fn placeholder_is_zeroed() {
        let p = CountryAttributes::placeholder("Atlantis");
        assert_eq!(p.common_name(), "Atlantis");
        assert_eq!(p.official_name(), "Atlantis");
        assert_eq!(p.population, 0);
        assert_eq!(p.area, 0.0);
        assert!(p.languages.is_empty());
        assert!(p.currencies.is_empty());
        assert!(p.capital.is_empty());
    }
}
