//! Startup data load: both datasets fetched concurrently, reconciled once.
//!
//! The load runs as a spawned task whose abort handle is kept, so a reload
//! cancels whatever is still in flight.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use formats::BoundaryFeature;
use parking_lot::{Mutex, RwLock};
use reconcile::{reconcile, tier_counts, ReconciledCountry};
use scene::PickIndex;
use serde::Serialize;
use tokio::task::AbortHandle;
use tracing::{error, info, warn};
use trivia::QuizCountry;

use crate::sources::{AttributeSource, BoundarySource, SourceError};

/// The only load failure users ever see.
pub const MAP_LOAD_FAILED: &str = "map data failed to load";

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("boundary dataset unavailable: {0}")]
    Boundaries(#[source] SourceError),
}

/// Reconciled world, immutable once built.
pub struct WorldData {
    pub boundaries: Vec<BoundaryFeature>,
    pub countries: Vec<ReconciledCountry>,
    /// Per-boundary anchor, `(lon, lat)`.
    pub centroids: Vec<Option<(f64, f64)>>,
    pub pick: PickIndex,
}

impl WorldData {
    pub fn build(
        boundaries: Vec<BoundaryFeature>,
        attributes: &[formats::CountryAttributes],
    ) -> Self {
        let countries = reconcile(&boundaries, attributes);
        let centroids = boundaries.iter().map(BoundaryFeature::centroid).collect();
        let pick = PickIndex::build(&boundaries);
        Self {
            boundaries,
            countries,
            centroids,
            pick,
        }
    }

    pub fn country(&self, index: usize) -> Option<&ReconciledCountry> {
        self.countries.get(index)
    }

    pub fn centroid(&self, index: usize) -> Option<(f64, f64)> {
        self.centroids.get(index).copied().flatten()
    }

    /// Matched countries for the quiz, one entry per common name.
    pub fn quiz_countries(&self) -> Vec<QuizCountry> {
        let mut out: Vec<QuizCountry> = Vec::new();
        for c in self.countries.iter().filter(|c| c.source_index.is_some()) {
            if out.iter().all(|q| q.name != c.common_name()) {
                out.push(QuizCountry::from(&c.attributes));
            }
        }
        out
    }
}

pub enum DataStatus {
    Loading,
    Ready(Arc<WorldData>),
    Failed(String),
}

/// Wire form of [`DataStatus`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    pub state: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub countries: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholders: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Fetches both datasets concurrently and reconciles them.
///
/// Attribute failures degrade to an empty list (every boundary becomes a
/// placeholder); boundary failures are fatal.
pub async fn load_world(
    boundaries: &BoundarySource,
    attributes: &AttributeSource,
) -> Result<WorldData, LoadError> {
    let (b, a) = tokio::join!(boundaries.fetch(), attributes.fetch());
    let boundaries = b.map_err(LoadError::Boundaries)?;
    let attributes = a.unwrap_or_else(|e| {
        warn!("attributes unavailable, using placeholders: {e}");
        Vec::new()
    });
    Ok(WorldData::build(boundaries, &attributes))
}

/// Owns the current [`DataStatus`] and the in-flight load task.
pub struct DataStore {
    boundaries: Arc<BoundarySource>,
    attributes: Arc<AttributeSource>,
    status: RwLock<DataStatus>,
    task: Mutex<Option<AbortHandle>>,
    generation: AtomicU64,
}

impl DataStore {
    pub fn new(boundaries: Arc<BoundarySource>, attributes: Arc<AttributeSource>) -> Self {
        Self {
            boundaries,
            attributes,
            status: RwLock::new(DataStatus::Loading),
            task: Mutex::new(None),
            generation: AtomicU64::new(0),
        }
    }

    /// Data already in place, no fetch.
    #[cfg(test)]
    pub fn ready(
        boundaries: Arc<BoundarySource>,
        attributes: Arc<AttributeSource>,
        world: WorldData,
    ) -> Self {
        let store = Self::new(boundaries, attributes);
        *store.status.write() = DataStatus::Ready(Arc::new(world));
        store
    }

    /// Starts a load, aborting any load still in flight.
    ///
    /// Results of a superseded load are discarded even if it finishes
    /// between the abort request and its next await point.
    pub fn start(self: &Arc<Self>) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        *self.status.write() = DataStatus::Loading;

        let store = Arc::clone(self);
        let handle = tokio::spawn(async move {
            let result = load_world(store.boundaries.as_ref(), store.attributes.as_ref()).await;
            if store.generation.load(Ordering::SeqCst) != generation {
                return;
            }
            let next = match result {
                Ok(world) => {
                    let counts = tier_counts(&world.countries);
                    info!(countries = world.countries.len(), ?counts, "world data ready");
                    DataStatus::Ready(Arc::new(world))
                }
                Err(e) => {
                    error!("{e}");
                    DataStatus::Failed(MAP_LOAD_FAILED.to_string())
                }
            };
            *store.status.write() = next;
        });

        if let Some(previous) = self.task.lock().replace(handle.abort_handle()) {
            previous.abort();
        }
    }

    pub fn world(&self) -> Option<Arc<WorldData>> {
        match &*self.status.read() {
            DataStatus::Ready(world) => Some(Arc::clone(world)),
            _ => None,
        }
    }

    pub fn report(&self) -> StatusReport {
        match &*self.status.read() {
            DataStatus::Loading => StatusReport {
                state: "loading",
                countries: None,
                placeholders: None,
                error: None,
            },
            DataStatus::Ready(world) => StatusReport {
                state: "ready",
                countries: Some(world.countries.len()),
                placeholders: Some(
                    world.countries.iter().filter(|c| c.is_placeholder()).count(),
                ),
                error: None,
            },
            DataStatus::Failed(message) => StatusReport {
                state: "failed",
                countries: None,
                placeholders: None,
                error: Some(message.clone()),
            },
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::{load_world, DataStore, LoadError, WorldData, MAP_LOAD_FAILED};
    use crate::sources::{AttributeSource, BoundarySource, StaticSource};
    use formats::{
        boundaries_from_geojson_str, builtin_countries, BoundaryFeature, CountryAttributes,
    };
    use reconcile::Confidence;
    use std::sync::Arc;
    use std::time::Duration;

    pub(crate) const WORLD: &str = r#"{"type":"FeatureCollection","features":[
      {"type":"Feature","properties":{"NAME":"Canada"},"geometry":{"type":"Polygon","coordinates":[
        [[-140,45],[-55,45],[-55,70],[-140,70],[-140,45]]]}},
      {"type":"Feature","properties":{"NAME":"Mexico"},"geometry":{"type":"Polygon","coordinates":[
        [[-117,15],[-87,15],[-87,32],[-117,32],[-117,15]]]}},
      {"type":"Feature","properties":{"name":"Korea, Republic of"},
       "geometry":{"type":"Polygon","coordinates":[
        [[126,34],[129,34],[129,38],[126,38],[126,34]]]}},
      {"type":"Feature","properties":{"ADMIN":"Atlantis"},
       "geometry":{"type":"Polygon","coordinates":[
        [[-40,20],[-30,20],[-30,30],[-40,30],[-40,20]]]}}
    ]}"#;

    pub(crate) fn boundaries() -> Vec<BoundaryFeature> {
        boundaries_from_geojson_str(WORLD).unwrap()
    }

    pub(crate) fn boundary_source(items: Vec<BoundaryFeature>) -> Arc<BoundarySource> {
        Arc::new(StaticSource::new("boundaries", items))
    }

    pub(crate) fn attribute_source(items: Vec<CountryAttributes>) -> Arc<AttributeSource> {
        Arc::new(StaticSource::new("attributes", items))
    }

    async fn wait_until_settled(store: &DataStore) {
        for _ in 0..200 {
            if store.report().state != "loading" {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("load never settled");
    }

    #[tokio::test]
    async fn reconciles_after_both_fetches() {
        let world = load_world(
            boundary_source(boundaries()).as_ref(),
            attribute_source(builtin_countries()).as_ref(),
        )
        .await
        .unwrap();
        assert_eq!(world.countries.len(), 4);
        assert_eq!(world.countries[2].common_name(), "South Korea");
        assert_eq!(world.countries[0].confidence(), Confidence::Exact);
        assert_eq!(world.countries[2].confidence(), Confidence::Alias);
        assert!(world.countries[3].is_placeholder());
        assert_eq!(world.pick.pick(-100.0, 50.0).map(|id| id.as_usize()), Some(0));
        let (lon, lat) = world.centroid(1).unwrap();
        assert!((lon + 102.0).abs() < 1.0 && (lat - 23.5).abs() < 1.0);
    }

    #[tokio::test]
    async fn attribute_failure_degrades_to_placeholders() {
        let world = load_world(
            boundary_source(boundaries()).as_ref(),
            attribute_source(Vec::new()).as_ref(),
        )
        .await
        .unwrap();
        assert_eq!(world.countries.len(), 4);
        assert!(world.countries.iter().all(|c| c.is_placeholder()));
        assert!(world.quiz_countries().is_empty());
    }

    #[tokio::test]
    async fn boundary_failure_is_fatal() {
        let err = load_world(
            boundary_source(Vec::new()).as_ref(),
            attribute_source(builtin_countries()).as_ref(),
        )
        .await;
        assert!(matches!(err, Err(LoadError::Boundaries(_))));
    }

    #[tokio::test]
    async fn store_reports_ready_and_failed() {
        let store = Arc::new(DataStore::new(
            boundary_source(boundaries()),
            attribute_source(builtin_countries()),
        ));
        assert_eq!(store.report().state, "loading");
        store.start();
        wait_until_settled(&store).await;
        let report = store.report();
        assert_eq!(report.state, "ready");
        assert_eq!((report.countries, report.placeholders), (Some(4), Some(1)));

        let broken = Arc::new(DataStore::new(
            boundary_source(Vec::new()),
            attribute_source(builtin_countries()),
        ));
        broken.start();
        wait_until_settled(&broken).await;
        assert!(broken.world().is_none());
        assert_eq!(broken.report().error.as_deref(), Some(MAP_LOAD_FAILED));
    }

    #[tokio::test]
    async fn restart_supersedes_previous_load() {
        let store = Arc::new(DataStore::new(
            boundary_source(boundaries()),
            attribute_source(builtin_countries()),
        ));
        store.start();
        store.start();
        wait_until_settled(&store).await;
        assert_eq!(store.report().state, "ready");
    }

    #[test]
    fn quiz_countries_skip_placeholders_and_duplicates() {
        let mut b = boundaries();
        b.push(b[0].clone());
        let world = WorldData::build(b, &builtin_countries());
        let names: Vec<String> = world.quiz_countries().into_iter().map(|q| q.name).collect();
        assert_eq!(names, vec!["Canada", "Mexico", "South Korea"]);
    }
}
