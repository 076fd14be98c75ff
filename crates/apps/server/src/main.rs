use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::http::Method;
use clap::Parser;
use formats::builtin_countries;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use trivia::{GameConfig, GameSession, QuizSession};

mod api;
mod config;
mod loader;
mod lookup;
mod sessions;
mod sources;

use api::ViewSession;
use config::Config;
use loader::DataStore;
use lookup::CountryLookup;
use sessions::{sweep_period, SessionStore};
use sources::{
    AttributeSource, BoundarySource, FallbackSource, HttpSource, SplitSource, StaticSource,
    SPLIT_SEPARATOR,
};

#[derive(Clone)]
pub struct AppState {
    data: Arc<DataStore>,
    lookup: Arc<CountryLookup>,
    games: Arc<SessionStore<GameSession>>,
    quizzes: Arc<SessionStore<QuizSession>>,
    views: Arc<SessionStore<ViewSession>>,
    game: GameConfig,
    quiz_rounds: u32,
}

impl AppState {
    pub fn new(
        data: Arc<DataStore>,
        lookup: CountryLookup,
        game: GameConfig,
        quiz_rounds: u32,
        session_ttl: Duration,
    ) -> Self {
        Self {
            data,
            lookup: Arc::new(lookup),
            games: Arc::new(SessionStore::new("game", session_ttl)),
            quizzes: Arc::new(SessionStore::new("quiz", session_ttl)),
            views: Arc::new(SessionStore::new("view", session_ttl)),
            game,
            quiz_rounds,
        }
    }

    /// Drops idle views, games and quizzes; returns how many went.
    pub fn evict_idle(&self, now: Instant) -> usize {
        let evicted =
            self.views.evict_idle(now) + self.games.evict_idle(now) + self.quizzes.evict_idle(now);
        debug!(
            evicted,
            views = self.views.len(),
            games = self.games.len(),
            quizzes = self.quizzes.len(),
            "session sweep"
        );
        evicted
    }

    /// Background sweep so abandoned sessions go even without new traffic.
    pub fn spawn_sweeper(&self, ttl: Duration) -> JoinHandle<()> {
        let state = self.clone();
        tokio::spawn(async move {
            let mut tick = tokio::time::interval(sweep_period(ttl));
            tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tick.tick().await;
                state.evict_idle(Instant::now());
            }
        })
    }
}

fn boundary_chain(cfg: &Config, client: &reqwest::Client) -> Arc<BoundarySource> {
    let sources = cfg
        .boundary_urls
        .iter()
        .map(|url| {
            let source = HttpSource::boundaries(url, client.clone(), cfg.fetch_timeout());
            Arc::new(source) as Arc<BoundarySource>
        })
        .collect();
    Arc::new(FallbackSource::new("boundaries", sources))
}

/// Configured endpoints first, the built-in list last.
fn attribute_chain(cfg: &Config, client: &reqwest::Client) -> Arc<AttributeSource> {
    let mut sources: Vec<Arc<AttributeSource>> = cfg
        .attributes_urls
        .iter()
        .map(|url| {
            if url.contains(SPLIT_SEPARATOR) {
                Arc::new(SplitSource::new(url, client.clone(), cfg.fetch_timeout()))
                    as Arc<AttributeSource>
            } else {
                Arc::new(HttpSource::attributes(url, client.clone(), cfg.fetch_timeout()))
                    as Arc<AttributeSource>
            }
        })
        .collect();
    sources.push(Arc::new(StaticSource::new("builtin", builtin_countries())));
    Arc::new(FallbackSource::new("attributes", sources))
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cfg = Config::parse();
    let game = cfg.game();
    game.validate().expect("invalid game config");

    let client = reqwest::Client::new();
    let data = Arc::new(DataStore::new(
        boundary_chain(&cfg, &client),
        attribute_chain(&cfg, &client),
    ));
    data.start();

    let lookup = CountryLookup::new(client, cfg.country_api.clone(), cfg.fetch_timeout());
    let state = AppState::new(data, lookup, game, cfg.quiz_rounds, cfg.session_ttl());
    state.spawn_sweeper(cfg.session_ttl());

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS]);

    let app = api::router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    info!("globe server listening on http://{}", cfg.addr);
    axum::serve(tokio::net::TcpListener::bind(cfg.addr).await.unwrap(), app)
        .await
        .unwrap();
}
