//! Data sources for the two startup datasets.
//!
//! A source yields a whole dataset: boundary features or attribute records.
//! Implementations:
//! - `HttpSource`: one URL, decoded with a format function, with a timeout
//! - `SplitSource`: one attributes dataset spread over several `fields=`
//!   requests, joined on `cca3`
//! - `StaticSource`: fixed in-memory records (the built-in country list)
//! - `FallbackSource`: tries sources in order until one returns data

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use formats::{
    attributes_from_str, attributes_from_value, boundaries_from_str, merge_by_cca3,
    BoundaryFeature, CountryAttributes,
};
use tracing::{debug, warn};

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("request to {url} timed out after {secs}s")]
    Timeout { url: String, secs: u64 },
    #[error("{url} answered HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("could not decode {url}: {reason}")]
    Decode { url: String, reason: String },
    #[error("{name} returned no records")]
    Empty { name: String },
    #[error("all {count} sources of {name} failed")]
    Exhausted { name: String, count: usize },
}

/// Type alias for a boxed future that can be sent between threads.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A dataset provider. Methods return boxed futures for dyn-compatibility.
pub trait DataSource: Send + Sync {
    type Item: Send;

    fn name(&self) -> &str;

    /// Fetches the full dataset. An empty dataset is an error.
    fn fetch(&self) -> BoxFuture<'_, Result<Vec<Self::Item>, SourceError>>;
}

pub type BoundarySource = dyn DataSource<Item = BoundaryFeature>;
pub type AttributeSource = dyn DataSource<Item = CountryAttributes>;

type Decoder<T> = fn(&str) -> Result<Vec<T>, String>;

/// Single-URL source.
pub struct HttpSource<T> {
    url: String,
    client: reqwest::Client,
    timeout: Duration,
    decode: Decoder<T>,
}

impl<T> HttpSource<T> {
    pub fn new(
        url: impl Into<String>,
        client: reqwest::Client,
        timeout: Duration,
        decode: Decoder<T>,
    ) -> Self {
        Self {
            url: url.into(),
            client,
            timeout,
            decode,
        }
    }
}

impl HttpSource<BoundaryFeature> {
    /// GeoJSON `FeatureCollection` or TopoJSON `Topology`.
    pub fn boundaries(url: impl Into<String>, client: reqwest::Client, timeout: Duration) -> Self {
        Self::new(url, client, timeout, |text| {
            boundaries_from_str(text).map_err(|e| e.to_string())
        })
    }
}

impl HttpSource<CountryAttributes> {
    /// REST Countries v3.1 response.
    pub fn attributes(url: impl Into<String>, client: reqwest::Client, timeout: Duration) -> Self {
        Self::new(url, client, timeout, |text| {
            attributes_from_str(text).map_err(|e| e.to_string())
        })
    }
}

/// Fetches `url` as text, mapping every failure onto a `SourceError`.
pub async fn fetch_text(
    client: &reqwest::Client,
    url: &str,
    timeout: Duration,
) -> Result<String, SourceError> {
    let classify = |e: reqwest::Error| {
        if e.is_timeout() {
            SourceError::Timeout {
                url: url.to_string(),
                secs: timeout.as_secs(),
            }
        } else {
            SourceError::Http {
                url: url.to_string(),
                source: e,
            }
        }
    };

    let resp = client
        .get(url)
        .timeout(timeout)
        .send()
        .await
        .map_err(classify)?;

    if !resp.status().is_success() {
        return Err(SourceError::Status {
            url: url.to_string(),
            status: resp.status().as_u16(),
        });
    }

    resp.text().await.map_err(classify)
}

impl<T: Send + 'static> DataSource for HttpSource<T> {
    type Item = T;

    fn name(&self) -> &str {
        &self.url
    }

    fn fetch(&self) -> BoxFuture<'_, Result<Vec<T>, SourceError>> {
        Box::pin(async move {
            let text = fetch_text(&self.client, &self.url, self.timeout).await?;
            let items = (self.decode)(&text).map_err(|reason| SourceError::Decode {
                url: self.url.clone(),
                reason,
            })?;
            if items.is_empty() {
                return Err(SourceError::Empty {
                    name: self.url.clone(),
                });
            }
            debug!(url = %self.url, records = items.len(), "fetched dataset");
            Ok(items)
        })
    }
}

/// Separator between the requests of one [`SplitSource`] in a URL list.
pub const SPLIT_SEPARATOR: char = '|';

/// Attributes fetched as several requests whose records are joined on
/// `cca3`. The first URL decides which countries exist.
pub struct SplitSource {
    name: String,
    urls: Vec<String>,
    client: reqwest::Client,
    timeout: Duration,
}

impl SplitSource {
    /// `joined` is a list of URLs joined by [`SPLIT_SEPARATOR`].
    pub fn new(joined: &str, client: reqwest::Client, timeout: Duration) -> Self {
        Self {
            name: joined.to_string(),
            urls: joined
                .split(SPLIT_SEPARATOR)
                .map(str::trim)
                .filter(|u| !u.is_empty())
                .map(String::from)
                .collect(),
            client,
            timeout,
        }
    }
}

impl DataSource for SplitSource {
    type Item = CountryAttributes;

    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&self) -> BoxFuture<'_, Result<Vec<CountryAttributes>, SourceError>> {
        Box::pin(async move {
            let mut payloads = Vec::with_capacity(self.urls.len());
            for url in &self.urls {
                let text = fetch_text(&self.client, url, self.timeout).await?;
                let value: serde_json::Value =
                    serde_json::from_str(&text).map_err(|e| SourceError::Decode {
                        url: url.clone(),
                        reason: e.to_string(),
                    })?;
                payloads.push(value);
            }
            let decode_err = |reason: String| SourceError::Decode {
                url: self.name.clone(),
                reason,
            };
            let merged = merge_by_cca3(payloads).map_err(|e| decode_err(e.to_string()))?;
            let items = attributes_from_value(merged).map_err(|e| decode_err(e.to_string()))?;
            if items.is_empty() {
                return Err(SourceError::Empty {
                    name: self.name.clone(),
                });
            }
            debug!(requests = self.urls.len(), records = items.len(), "fetched split dataset");
            Ok(items)
        })
    }
}

/// In-memory source.
pub struct StaticSource<T> {
    name: String,
    items: Vec<T>,
}

impl<T> StaticSource<T> {
    pub fn new(name: impl Into<String>, items: Vec<T>) -> Self {
        Self {
            name: name.into(),
            items,
        }
    }
}

impl<T: Clone + Send + Sync> DataSource for StaticSource<T> {
    type Item = T;

    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&self) -> BoxFuture<'_, Result<Vec<T>, SourceError>> {
        Box::pin(async move {
            if self.items.is_empty() {
                return Err(SourceError::Empty {
                    name: self.name.clone(),
                });
            }
            Ok(self.items.clone())
        })
    }
}

/// Composite source that tries multiple sources in order.
pub struct FallbackSource<T> {
    name: String,
    sources: Vec<Arc<dyn DataSource<Item = T>>>,
}

impl<T> FallbackSource<T> {
    pub fn new(name: impl Into<String>, sources: Vec<Arc<dyn DataSource<Item = T>>>) -> Self {
        Self {
            name: name.into(),
            sources,
        }
    }
}

impl<T: Send + 'static> DataSource for FallbackSource<T> {
    type Item = T;

    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&self) -> BoxFuture<'_, Result<Vec<T>, SourceError>> {
        Box::pin(async move {
            for source in &self.sources {
                match source.fetch().await {
                    Ok(items) => {
                        debug!(
                            chain = %self.name,
                            source = source.name(),
                            "fallback source answered"
                        );
                        return Ok(items);
                    }
                    Err(e) => {
                        warn!(chain = %self.name, "fallback source error: {e}");
                        continue;
                    }
                }
            }
            Err(SourceError::Exhausted {
                name: self.name.clone(),
                count: self.sources.len(),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{DataSource, FallbackSource, HttpSource, SourceError, SplitSource, StaticSource};
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::Router;
    use formats::{builtin_countries, CountryAttributes};
    use std::sync::Arc;
    use std::time::Duration;

    const CHAD: &str =
        r#"[{"name":{"common":"Chad","official":"Republic of Chad"},"capital":["N'Djamena"]}]"#;
    const NAMES: &str = r#"[{"name":{"common":"Chad"},"cca3":"TCD"}]"#;
    const ZONES: &str = r#"[{"cca3":"TCD","timezones":["UTC+01:00"]}]"#;

    /// Serves fixtures on an ephemeral local port and returns its base URL.
    async fn fixture_server() -> String {
        let app = Router::new()
            .route("/ok", get(|| async { CHAD }))
            .route("/empty", get(|| async { "[]" }))
            .route("/names", get(|| async { NAMES }))
            .route("/zones", get(|| async { ZONES }))
            .route(
                "/broken",
                get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
            )
            .route("/garbage", get(|| async { "<html>" }))
            .route(
                "/slow",
                get(|| async {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    CHAD
                }),
            );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn http(
        base: &str,
        path: &str,
        timeout: Duration,
    ) -> Arc<dyn DataSource<Item = CountryAttributes>> {
        Arc::new(HttpSource::attributes(
            format!("{base}{path}"),
            reqwest::Client::new(),
            timeout,
        ))
    }

    #[tokio::test]
    async fn http_source_decodes_and_classifies_errors() {
        let base = fixture_server().await;
        let t = Duration::from_secs(2);

        let ok = http(&base, "/ok", t).fetch().await.unwrap();
        assert_eq!(ok[0].common_name(), "Chad");

        assert!(matches!(
            http(&base, "/broken", t).fetch().await,
            Err(SourceError::Status { status: 500, .. })
        ));
        assert!(matches!(
            http(&base, "/garbage", t).fetch().await,
            Err(SourceError::Decode { .. })
        ));
        assert!(matches!(
            http(&base, "/empty", t).fetch().await,
            Err(SourceError::Empty { .. })
        ));
    }

    #[tokio::test]
    async fn slow_endpoint_times_out() {
        let base = fixture_server().await;
        let err = http(&base, "/slow", Duration::from_millis(200))
            .fetch()
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::Timeout { .. }), "{err}");
    }

    #[tokio::test]
    async fn fallback_skips_failures_in_order() {
        let base = fixture_server().await;
        let t = Duration::from_millis(300);
        let chain = FallbackSource::new(
            "attributes",
            vec![
                http(&base, "/broken", t),
                http(&base, "/slow", t),
                http(&base, "/ok", t),
                Arc::new(StaticSource::new("builtin", builtin_countries())),
            ],
        );
        let items = chain.fetch().await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].common_name(), "Chad");
    }

    #[tokio::test]
    async fn builtin_list_is_the_last_resort() {
        let base = fixture_server().await;
        let t = Duration::from_millis(300);
        let chain = FallbackSource::new(
            "attributes",
            vec![
                http(&base, "/broken", t),
                Arc::new(StaticSource::new("builtin", builtin_countries())),
            ],
        );
        let items = chain.fetch().await.unwrap();
        assert_eq!(items.len(), builtin_countries().len());
    }

    #[tokio::test]
    async fn split_source_joins_requests_on_cca3() {
        let base = fixture_server().await;
        let t = Duration::from_secs(2);
        let split = SplitSource::new(
            &format!("{base}/names | {base}/zones"),
            reqwest::Client::new(),
            t,
        );
        let items = split.fetch().await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].common_name(), "Chad");
        assert_eq!(items[0].timezones, vec!["UTC+01:00".to_string()]);

        let broken = SplitSource::new(
            &format!("{base}/names|{base}/broken"),
            reqwest::Client::new(),
            t,
        );
        assert!(matches!(
            broken.fetch().await,
            Err(SourceError::Status { status: 500, .. })
        ));
    }

    #[tokio::test]
    async fn exhausted_chain_is_an_error() {
        let chain: FallbackSource<CountryAttributes> = FallbackSource::new(
            "attributes",
            vec![Arc::new(StaticSource::<CountryAttributes>::new(
                "nothing",
                Vec::new(),
            ))],
        );
        assert!(matches!(
            chain.fetch().await,
            Err(SourceError::Exhausted { count: 1, .. })
        ));
    }
}
