//! Per-country detail lookup for boundaries that reconciled to a placeholder.

use std::time::Duration;

use formats::{attributes_from_str, BoundaryFeature, CountryAttributes};
use reqwest::Url;
use tracing::{debug, warn};

use crate::sources::{fetch_text, SourceError};

/// What is known about a country before asking the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupKey {
    pub name: String,
    pub cca3: Option<String>,
    pub cca2: Option<String>,
}

impl From<&BoundaryFeature> for LookupKey {
    fn from(b: &BoundaryFeature) -> Self {
        Self {
            name: b.name.clone(),
            cca3: b.iso_a3.clone(),
            cca2: b.iso_a2.clone(),
        }
    }
}

/// Tries, in order: `/alpha/{cca3}`, `/alpha/{cca2}`, `/name/{name}`,
/// `/name/{name}?fullText=true`. The first record of the first
/// successful answer wins.
#[derive(Clone)]
pub struct CountryLookup {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl CountryLookup {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            timeout,
        }
    }

    pub fn candidate_urls(&self, key: &LookupKey) -> Vec<Url> {
        let mut urls = Vec::new();
        let codes = [key.cca3.as_deref(), key.cca2.as_deref()];
        for code in codes.into_iter().flatten().filter(|c| !c.trim().is_empty()) {
            urls.extend(self.endpoint(&["alpha", code.trim()]));
        }
        let name = key.name.trim();
        if !name.is_empty() {
            urls.extend(self.endpoint(&["name", name]));
            if let Some(mut full) = self.endpoint(&["name", name]) {
                full.query_pairs_mut().append_pair("fullText", "true");
                urls.push(full);
            }
        }
        urls
    }

    pub async fn lookup(&self, key: &LookupKey) -> Result<CountryAttributes, SourceError> {
        let urls = self.candidate_urls(key);
        let count = urls.len();
        for url in urls {
            match self.fetch_first(url.as_str()).await {
                Ok(record) => {
                    debug!(%url, name = record.common_name(), "country lookup hit");
                    return Ok(record);
                }
                Err(e) => debug!("country lookup miss: {e}"),
            }
        }
        warn!(name = %key.name, "no country details found");
        Err(SourceError::Exhausted {
            name: format!("lookup for {}", key.name),
            count,
        })
    }

    async fn fetch_first(&self, url: &str) -> Result<CountryAttributes, SourceError> {
        let text = fetch_text(&self.client, url, self.timeout).await?;
        let records = attributes_from_str(&text).map_err(|e| SourceError::Decode {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        records.into_iter().next().ok_or_else(|| SourceError::Empty {
            name: url.to_string(),
        })
    }

    /// `base_url` plus percent-encoded path segments.
    fn endpoint(&self, segments: &[&str]) -> Option<Url> {
        let mut url = Url::parse(&self.base_url).ok()?;
        {
            let mut path = url.path_segments_mut().ok()?;
            path.pop_if_empty();
            for s in segments {
                path.push(s);
            }
        }
        Some(url)
    }
}
