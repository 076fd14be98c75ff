//! HTTP surface: countries, picking, views, games and quizzes.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Path as AxumPath, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use foundation::CountryId;
use rand::rngs::StdRng;
use rand::SeedableRng;
use reconcile::{Confidence, MatchTier, ReconciledCountry};
use scene::{
    search_countries, InfoPanel, InteractionEvent, InteractionMode, InteractionState,
    InteractionUpdate,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{debug, info};
use trivia::{
    ClickOutcome, GameConfig, GameSession, GameSnapshot, QuestionBank, QuizKind, QuizSession,
    QuizSnapshot, TriviaError, ALL_KINDS,
};
use uuid::Uuid;

use crate::loader::{StatusReport, WorldData, MAP_LOAD_FAILED};
use crate::lookup::LookupKey;
use crate::AppState;

fn api_error(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "error": message.into() })))
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Unavailable(String),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unprocessable(String),
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<TriviaError> for ApiError {
    fn from(e: TriviaError) -> Self {
        match e {
            TriviaError::InvalidConfig(_) => ApiError::BadRequest(e.to_string()),
            TriviaError::EmptyBank | TriviaError::TooFewCountries { .. } => {
                ApiError::Unprocessable(e.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        api_error(self.status(), self.to_string()).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/status", get(status))
        .route("/reload", post(reload))
        .route("/countries", get(list_countries))
        .route("/countries/search", get(search))
        .route("/countries/:id", get(country_panel))
        .route("/countries/:id/details", get(country_details))
        .route("/pick", get(pick))
        .route("/views", post(create_view))
        .route("/views/:id", get(get_view).delete(delete_view))
        .route("/views/:id/events", post(view_event))
        .route("/games", post(create_game))
        .route("/games/:id", get(get_game).delete(delete_game))
        .route("/games/:id/click", post(game_click))
        .route("/games/:id/retry", post(game_retry))
        .route("/games/:id/next", post(game_next))
        .route("/games/:id/restart", post(game_restart))
        .route("/quizzes", post(create_quiz))
        .route("/quizzes/:id", get(get_quiz).delete(delete_quiz))
        .route("/quizzes/:id/answer", post(quiz_answer))
        .route("/quizzes/:id/next", post(quiz_next))
        .route("/quizzes/:id/restart", post(quiz_restart))
        .with_state(state)
}

async fn healthz() -> Response {
    (StatusCode::OK, "ok").into_response()
}

async fn status(State(state): State<AppState>) -> Json<StatusReport> {
    Json(state.data.report())
}

async fn reload(State(state): State<AppState>) -> (StatusCode, Json<StatusReport>) {
    info!("reloading world data");
    state.data.start();
    (StatusCode::ACCEPTED, Json(state.data.report()))
}

/// The reconciled world, or why it is not there.
fn require_world(state: &AppState) -> Result<Arc<WorldData>, ApiError> {
    state.data.world().ok_or_else(|| {
        let report = state.data.report();
        let message = report
            .error
            .unwrap_or_else(|| "country data is still loading".to_string());
        ApiError::Unavailable(message)
    })
}

fn country_at(world: &WorldData, id: usize) -> Result<&ReconciledCountry, ApiError> {
    world.country(id).ok_or(ApiError::NotFound("Country"))
}

// ---------------------------------------------------------------------------
// Countries
// ---------------------------------------------------------------------------

async fn list_countries(State(state): State<AppState>) -> ApiResult<Value> {
    let world = require_world(&state)?;
    let mut features = Vec::with_capacity(world.boundaries.len());
    for (boundary, country) in world.boundaries.iter().zip(&world.countries) {
        let mut feature = boundary.to_geojson_value();
        let data = serde_json::to_value(&country.attributes)
            .map_err(|e| ApiError::Internal(e.to_string()))?;
        if let Some(props) = feature.get_mut("properties").and_then(Value::as_object_mut) {
            props.insert("countryId".into(), json!(country.id));
            props.insert("confidence".into(), json!(country.confidence()));
            props.insert("tier".into(), json!(country.tier));
            props.insert("countryData".into(), data);
        }
        features.push(feature);
    }
    let mut fc = Map::new();
    fc.insert("type".into(), Value::String("FeatureCollection".into()));
    fc.insert("features".into(), Value::Array(features));
    Ok(Json(Value::Object(fc)))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CountrySummary {
    country_id: CountryId,
    name: String,
    common_name: String,
    confidence: Confidence,
    tier: MatchTier,
}

impl From<&ReconciledCountry> for CountrySummary {
    fn from(c: &ReconciledCountry) -> Self {
        Self {
            country_id: c.id,
            name: c.boundary_name.clone(),
            common_name: c.common_name().to_string(),
            confidence: c.confidence(),
            tier: c.tier,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    q: String,
}

async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Vec<CountrySummary>> {
    let world = require_world(&state)?;
    let hits = search_countries(&world.countries, &query.q)
        .into_iter()
        .filter_map(|id| world.country(id.as_usize()))
        .map(CountrySummary::from)
        .collect();
    Ok(Json(hits))
}

async fn country_panel(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<usize>,
) -> ApiResult<InfoPanel> {
    let world = require_world(&state)?;
    let country = country_at(&world, id)?;
    Ok(Json(InfoPanel::from_country(country, world.centroid(id))))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DetailsResponse {
    panel: InfoPanel,
    /// True when the panel was filled by a per-country lookup.
    looked_up: bool,
}

/// Info panel, asking the per-country endpoints when reconciliation found nothing.
async fn country_details(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<usize>,
) -> ApiResult<DetailsResponse> {
    let world = require_world(&state)?;
    let country = country_at(&world, id)?;
    let anchor = world.centroid(id);
    if !country.is_placeholder() {
        return Ok(Json(DetailsResponse {
            panel: InfoPanel::from_country(country, anchor),
            looked_up: false,
        }));
    }

    let key = world
        .boundaries
        .get(id)
        .map(LookupKey::from)
        .ok_or(ApiError::NotFound("Country"))?;
    match state.lookup.lookup(&key).await {
        Ok(attributes) => {
            let mut filled = country.clone();
            filled.attributes = attributes;
            Ok(Json(DetailsResponse {
                panel: InfoPanel::from_country(&filled, anchor),
                looked_up: true,
            }))
        }
        Err(e) => {
            debug!("details lookup failed, keeping placeholder: {e}");
            Ok(Json(DetailsResponse {
                panel: InfoPanel::from_country(country, anchor),
                looked_up: false,
            }))
        }
    }
}

#[derive(Debug, Deserialize)]
struct PickQuery {
    lon: f64,
    lat: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PickResponse {
    country: Option<CountrySummary>,
}

async fn pick(
    State(state): State<AppState>,
    Query(q): Query<PickQuery>,
) -> ApiResult<PickResponse> {
    let world = require_world(&state)?;
    let country = world
        .pick
        .pick(q.lon, q.lat)
        .and_then(|id| world.country(id.as_usize()))
        .map(CountrySummary::from);
    Ok(Json(PickResponse { country }))
}

// ---------------------------------------------------------------------------
// Views (hover / selection)
// ---------------------------------------------------------------------------

/// One globe view. A view bound to a game is hover-highlight-only and its
/// country clicks go to that game.
#[derive(Debug, Clone)]
pub struct ViewSession {
    interaction: InteractionState,
    game: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct NewView {
    mode: InteractionMode,
    game_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ViewResponse {
    view_id: Uuid,
    view: InteractionState,
    #[serde(skip_serializing_if = "Option::is_none")]
    game_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    update: Option<InteractionUpdate>,
    /// Info panel for the selected country, when data is loaded.
    panel: Option<InfoPanel>,
    /// The bound game after a forwarded click.
    #[serde(skip_serializing_if = "Option::is_none")]
    game: Option<GameResponse>,
}

fn view_response(
    state: &AppState,
    view_id: Uuid,
    view: &ViewSession,
    update: Option<InteractionUpdate>,
    game: Option<GameResponse>,
) -> ViewResponse {
    let panel = view.interaction.selected().and_then(|id| {
        let world = state.data.world()?;
        let country = world.country(id.as_usize())?;
        Some(InfoPanel::from_country(country, world.centroid(id.as_usize())))
    });
    ViewResponse {
        view_id,
        view: view.interaction.clone(),
        game_id: view.game,
        update,
        panel,
        game,
    }
}

async fn create_view(
    State(state): State<AppState>,
    body: Option<Json<NewView>>,
) -> ApiResult<ViewResponse> {
    let req = body.map(|Json(b)| b).unwrap_or_default();
    let now = Instant::now();
    let mode = match req.game_id {
        Some(game_id) => {
            state
                .games
                .touch(&game_id, now, |_| ())
                .ok_or(ApiError::NotFound("Game"))?;
            InteractionMode::HoverHighlightOnly
        }
        None => req.mode,
    };
    let view = ViewSession {
        interaction: InteractionState::new(mode),
        game: req.game_id,
    };
    let id = state.views.insert(view.clone(), now);
    Ok(Json(view_response(&state, id, &view, None, None)))
}

async fn get_view(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<Uuid>,
) -> ApiResult<ViewResponse> {
    let view = state
        .views
        .touch(&id, Instant::now(), |v| v.clone())
        .ok_or(ApiError::NotFound("View"))?;
    Ok(Json(view_response(&state, id, &view, None, None)))
}

async fn view_event(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<Uuid>,
    Json(event): Json<InteractionEvent>,
) -> ApiResult<ViewResponse> {
    let target = match event {
        InteractionEvent::Hover { country } | InteractionEvent::Click { country } => country,
        InteractionEvent::Escape | InteractionEvent::ClosePanel => None,
    };
    if let (Some(target), Some(world)) = (target, state.data.world()) {
        if world.country(target.as_usize()).is_none() {
            let message = format!("unknown country id {}", target.as_usize());
            return Err(ApiError::BadRequest(message));
        }
    }
    let (view, update) = state
        .views
        .touch(&id, Instant::now(), |v| {
            let update = v.interaction.apply(event);
            (v.clone(), update)
        })
        .ok_or(ApiError::NotFound("View"))?;

    let forward_to = match (view.game, update.clicked) {
        (Some(game_id), Some(country))
            if view.interaction.mode() == InteractionMode::HoverHighlightOnly =>
        {
            Some((game_id, country))
        }
        _ => None,
    };
    let game = match forward_to {
        Some((game_id, country)) => {
            let candidate = clicked_name(&state, country.as_usize())?;
            match click_game(&state, game_id, candidate) {
                Ok(Json(game)) => Some(game),
                Err(ApiError::NotFound(_)) => {
                    debug!(view = %id, game = %game_id, "bound game is gone, click dropped");
                    None
                }
                Err(e) => return Err(e),
            }
        }
        None => None,
    };
    Ok(Json(view_response(&state, id, &view, Some(update), game)))
}

async fn delete_view(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<Uuid>,
) -> Result<StatusCode, ApiError> {
    if state.views.remove(&id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("View"))
    }
}

// ---------------------------------------------------------------------------
// Click-the-country game
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct NewGame {
    rounds: Option<u32>,
    max_attempts: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GameResponse {
    game_id: Uuid,
    #[serde(flatten)]
    snapshot: GameSnapshot,
    #[serde(skip_serializing_if = "Option::is_none")]
    click: Option<ClickOutcome>,
}

/// Candidate from a globe click: a country id or a plain name.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ClickRequest {
    country_id: Option<usize>,
    name: Option<String>,
}

/// Brings a session up to date: leaves `Loading` once data is ready and
/// lets an elapsed correct-answer delay advance the round.
fn refresh(game: &mut GameSession, data_ready: bool, now: Instant) {
    if data_ready {
        game.begin();
    }
    game.poll(now);
}

fn with_game<F>(state: &AppState, id: Uuid, f: F) -> ApiResult<GameResponse>
where
    F: FnOnce(&mut GameSession) -> Option<ClickOutcome>,
{
    let ready = state.data.world().is_some();
    let now = Instant::now();
    state
        .games
        .touch(&id, now, |game| {
            refresh(game, ready, now);
            let click = f(game);
            GameResponse {
                game_id: id,
                snapshot: game.snapshot(),
                click,
            }
        })
        .map(Json)
        .ok_or(ApiError::NotFound("Game"))
}

/// Common name behind a clicked country id.
///
/// `None` while no world is loaded: there is nothing to compare against, so
/// the click is ignored like any other click during loading.
fn clicked_name(state: &AppState, country_id: usize) -> Result<Option<String>, ApiError> {
    match state.data.world() {
        Some(world) => Ok(Some(country_at(&world, country_id)?.common_name().to_string())),
        None => Ok(None),
    }
}

fn click_game(state: &AppState, id: Uuid, candidate: Option<String>) -> ApiResult<GameResponse> {
    with_game(state, id, |game| {
        let outcome = match candidate {
            Some(name) => game.click(&name, Instant::now()),
            None => ClickOutcome::Ignored,
        };
        Some(outcome)
    })
}

async fn create_game(
    State(state): State<AppState>,
    body: Option<Json<NewGame>>,
) -> ApiResult<GameResponse> {
    let req = body.map(|Json(b)| b).unwrap_or_default();
    let config = GameConfig {
        rounds: req.rounds.unwrap_or(state.game.rounds),
        max_attempts: req.max_attempts.unwrap_or(state.game.max_attempts),
        ..state.game
    };
    let game = GameSession::new(config, QuestionBank::demonyms(), StdRng::from_entropy())?;
    let id = state.games.insert(game, Instant::now());
    debug!(%id, rounds = config.rounds, "game created");
    with_game(&state, id, |_| None)
}

async fn get_game(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<Uuid>,
) -> ApiResult<GameResponse> {
    with_game(&state, id, |_| None)
}

async fn game_click(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<Uuid>,
    Json(req): Json<ClickRequest>,
) -> ApiResult<GameResponse> {
    let candidate = match (req.country_id, req.name) {
        (Some(country_id), _) => clicked_name(&state, country_id)?,
        (None, Some(name)) => Some(name),
        (None, None) => {
            return Err(ApiError::BadRequest("countryId or name is required".into()));
        }
    };
    click_game(&state, id, candidate)
}

async fn game_retry(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<Uuid>,
) -> ApiResult<GameResponse> {
    with_game(&state, id, |game| {
        game.try_again();
        None
    })
}

async fn game_next(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<Uuid>,
) -> ApiResult<GameResponse> {
    with_game(&state, id, |game| {
        game.next();
        None
    })
}

async fn game_restart(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<Uuid>,
) -> ApiResult<GameResponse> {
    with_game(&state, id, |game| {
        game.restart();
        None
    })
}

async fn delete_game(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<Uuid>,
) -> Result<StatusCode, ApiError> {
    if state.games.remove(&id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("Game"))
    }
}

// ---------------------------------------------------------------------------
// Multiple-choice quiz
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct NewQuiz {
    rounds: Option<u32>,
    kinds: Option<Vec<QuizKind>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QuizResponse {
    quiz_id: Uuid,
    #[serde(flatten)]
    snapshot: QuizSnapshot,
    #[serde(skip_serializing_if = "Option::is_none")]
    correct: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct AnswerRequest {
    option: usize,
}

fn with_quiz<F>(state: &AppState, id: Uuid, f: F) -> ApiResult<QuizResponse>
where
    F: FnOnce(&mut QuizSession) -> Option<bool>,
{
    state
        .quizzes
        .touch(&id, Instant::now(), |quiz| {
            let correct = f(quiz);
            QuizResponse {
                quiz_id: id,
                snapshot: quiz.snapshot(),
                correct,
            }
        })
        .map(Json)
        .ok_or(ApiError::NotFound("Quiz"))
}

async fn create_quiz(
    State(state): State<AppState>,
    body: Option<Json<NewQuiz>>,
) -> ApiResult<QuizResponse> {
    let req = body.map(|Json(b)| b).unwrap_or_default();
    let world = state.data.world().ok_or_else(|| {
        let report = state.data.report();
        ApiError::Unavailable(report.error.unwrap_or_else(|| MAP_LOAD_FAILED.to_string()))
    })?;
    let kinds = req.kinds.unwrap_or_else(|| ALL_KINDS.to_vec());
    let quiz = QuizSession::new(
        world.quiz_countries(),
        &kinds,
        req.rounds.unwrap_or(state.quiz_rounds),
        StdRng::from_entropy(),
    )?;
    let id = state.quizzes.insert(quiz, Instant::now());
    with_quiz(&state, id, |_| None)
}

async fn get_quiz(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<Uuid>,
) -> ApiResult<QuizResponse> {
    with_quiz(&state, id, |_| None)
}

async fn quiz_answer(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<Uuid>,
    Json(req): Json<AnswerRequest>,
) -> ApiResult<QuizResponse> {
    with_quiz(&state, id, |quiz| quiz.select(req.option))
}

async fn quiz_next(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<Uuid>,
) -> ApiResult<QuizResponse> {
    with_quiz(&state, id, |quiz| {
        quiz.next();
        None
    })
}

async fn quiz_restart(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<Uuid>,
) -> ApiResult<QuizResponse> {
    with_quiz(&state, id, |quiz| {
        quiz.restart();
        None
    })
}

async fn delete_quiz(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<Uuid>,
) -> Result<StatusCode, ApiError> {
    if state.quizzes.remove(&id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("Quiz"))
    }
}

#[cfg(test)]
mod tests {
    use super::router;
    use crate::loader::tests::{attribute_source, boundaries, boundary_source};
    use crate::loader::{DataStore, WorldData};
    use crate::lookup::CountryLookup;
    use crate::AppState;
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode};
    use axum::Router;
    use formats::builtin_countries;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use std::time::{Duration, Instant};
    use tower::ServiceExt;
    use trivia::GameConfig;

    const SESSION_TTL: Duration = Duration::from_secs(600);

    fn state_with_ttl(data: DataStore, ttl: Duration) -> AppState {
        let lookup = CountryLookup::new(
            reqwest::Client::new(),
            "http://127.0.0.1:9/v3.1",
            Duration::from_millis(200),
        );
        let game = GameConfig {
            correct_delay: Duration::ZERO,
            ..GameConfig::default()
        };
        AppState::new(Arc::new(data), lookup, game, 5, ttl)
    }

    fn state_with(data: DataStore) -> AppState {
        state_with_ttl(data, SESSION_TTL)
    }

    fn ready_store() -> DataStore {
        let world = WorldData::build(boundaries(), &builtin_countries());
        DataStore::ready(
            boundary_source(boundaries()),
            attribute_source(builtin_countries()),
            world,
        )
    }

    fn ready_app() -> Router {
        router(state_with(ready_store()))
    }

    fn loading_app() -> Router {
        router(state_with(DataStore::new(
            boundary_source(boundaries()),
            attribute_source(builtin_countries()),
        )))
    }

    async fn call(
        app: &Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut req = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(v) => {
                req = req.header("content-type", "application/json");
                Body::from(v.to_string())
            }
            None => Body::empty(),
        };
        let resp = app.clone().oneshot(req.body(body).unwrap()).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn countries_are_served_as_feature_collection() {
        let app = ready_app();
        let (status, body) = call(&app, Method::GET, "/countries", None).await;
        assert_eq!(status, StatusCode::OK);
        let features = body["features"].as_array().unwrap();
        assert_eq!(features.len(), 4);
        let korea = &features[2]["properties"];
        assert_eq!(korea["countryData"]["name"]["common"], "South Korea");
        assert_eq!(korea["confidence"], "alias");
        assert_eq!(features[3]["properties"]["confidence"], "unmatched");
        assert_eq!(features[3]["properties"]["countryData"]["population"], 0);
    }

    #[tokio::test]
    async fn loading_data_answers_unavailable() {
        let app = loading_app();
        let (status, body) = call(&app, Method::GET, "/countries", None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"], "country data is still loading");

        let (_, status_body) = call(&app, Method::GET, "/status", None).await;
        assert_eq!(status_body, json!({ "state": "loading" }));
    }

    #[tokio::test]
    async fn reload_restarts_the_load() {
        let app = ready_app();
        let (status, body) = call(&app, Method::POST, "/reload", None).await;
        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(body["state"], "loading");
    }

    #[tokio::test]
    async fn panel_search_and_pick() {
        let app = ready_app();
        let (status, panel) = call(&app, Method::GET, "/countries/0", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(panel["title"], "Canada");
        assert_eq!(panel["capital"], "Ottawa");
        assert!(panel["anchor"].is_array());

        let (status, _) = call(&app, Method::GET, "/countries/99", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, hits) = call(&app, Method::GET, "/countries/search?q=MEX", None).await;
        assert_eq!(hits.as_array().unwrap().len(), 1);
        assert_eq!(hits[0]["commonName"], "Mexico");

        let (_, picked) = call(&app, Method::GET, "/pick?lon=-100&lat=25", None).await;
        assert_eq!(picked["country"]["countryId"], 1);
        let (_, ocean) = call(&app, Method::GET, "/pick?lon=0&lat=-60", None).await;
        assert_eq!(ocean["country"], Value::Null);
    }

    #[tokio::test]
    async fn failed_lookup_keeps_placeholder() {
        let app = ready_app();
        let (status, body) = call(&app, Method::GET, "/countries/3/details", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["lookedUp"], false);
        assert_eq!(body["panel"]["title"], "Atlantis");
        assert_eq!(body["panel"]["population"], "N/A");
    }

    #[tokio::test]
    async fn view_selection_opens_panel_and_escape_closes_it() {
        let app = ready_app();
        let (_, created) = call(&app, Method::POST, "/views", None).await;
        let id = created["viewId"].as_str().unwrap().to_string();
        let uri = format!("/views/{id}/events");

        let click = json!({"type": "click", "country": 1});
        let (_, clicked) = call(&app, Method::POST, &uri, Some(click)).await;
        assert_eq!(clicked["view"]["selected"], 1);
        assert_eq!(clicked["panel"]["title"], "Mexico");
        assert_eq!(clicked["update"]["clicked"], 1);
        assert!(clicked.get("game").is_none());

        let (_, closed) = call(&app, Method::POST, &uri, Some(json!({"type": "escape"}))).await;
        assert_eq!(closed["view"]["selected"], Value::Null);
        assert_eq!(closed["panel"], Value::Null);

        let hover = json!({"type": "hover", "country": 42});
        let (status, _) = call(&app, Method::POST, &uri, Some(hover)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn game_plays_through_click_by_id_and_name() {
        let app = ready_app();
        let (status, created) =
            call(&app, Method::POST, "/games", Some(json!({"rounds": 1}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(created["state"], "asking");
        let id = created["gameId"].as_str().unwrap().to_string();
        let click = format!("/games/{id}/click");

        let (_, wrong) =
            call(&app, Method::POST, &click, Some(json!({"name": "Atlantis"}))).await;
        assert_eq!(wrong["click"], json!({"outcome": "wrong", "remaining": 1}));
        let (_, locked) =
            call(&app, Method::POST, &click, Some(json!({"countryId": 3}))).await;
        assert_eq!(locked["state"], "locked");

        let (_, retried) = call(&app, Method::POST, &format!("/games/{id}/retry"), None).await;
        assert_eq!(retried["state"], "asking");
        assert_eq!(retried["attempts"], 0);

        let (_, skipped) = call(&app, Method::POST, &format!("/games/{id}/next"), None).await;
        assert_eq!(skipped["state"], "asking", "next only leaves a locked round");

        call(&app, Method::POST, &click, Some(json!({"name": "nowhere"}))).await;
        call(&app, Method::POST, &click, Some(json!({"name": "nowhere"}))).await;
        let (_, summary) = call(&app, Method::POST, &format!("/games/{id}/next"), None).await;
        assert_eq!(summary["state"], "summary");
        assert_eq!(summary["score"], 0);

        let (_, restarted) =
            call(&app, Method::POST, &format!("/games/{id}/restart"), None).await;
        assert_eq!(restarted["state"], "asking");

        let (status, _) = call(&app, Method::DELETE, &format!("/games/{id}"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = call(&app, Method::GET, &format!("/games/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn game_waits_while_loading_and_rejects_bad_config() {
        let app = loading_app();
        let (_, created) = call(&app, Method::POST, "/games", None).await;
        assert_eq!(created["state"], "loading");
        let id = created["gameId"].as_str().unwrap().to_string();
        let click = format!("/games/{id}/click");
        let (_, clicked) = call(&app, Method::POST, &click, Some(json!({"name": "Canada"}))).await;
        assert_eq!(clicked["click"], json!({"outcome": "ignored"}));
        assert_eq!(clicked["state"], "loading");

        // By id too: no world yet, so nothing to resolve and nothing to answer.
        let (status, by_id) =
            call(&app, Method::POST, &click, Some(json!({"countryId": 0}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(by_id["click"], json!({"outcome": "ignored"}));
        assert_eq!(by_id["state"], "loading");

        let (status, _) = call(&app, Method::POST, "/games", Some(json!({"maxAttempts": 0}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn quiz_needs_enough_countries() {
        let app = ready_app();
        // Three matched countries cannot fill four options.
        let (status, body) = call(&app, Method::POST, "/quizzes", None).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["error"].as_str().unwrap().contains("not enough countries"));
    }

    #[tokio::test]
    async fn quiz_round_trip_on_builtin_world() {
        use formats::{BoundaryFeature, BoundaryGeometry};
        use serde_json::Map;

        let boundaries: Vec<BoundaryFeature> = builtin_countries()
            .iter()
            .map(|c| {
                let mut p = Map::new();
                p.insert("NAME".into(), Value::String(c.common_name().to_string()));
                BoundaryFeature::new(None, p, BoundaryGeometry::Empty)
            })
            .collect();
        let world = WorldData::build(boundaries.clone(), &builtin_countries());
        let app = router(state_with(DataStore::ready(
            boundary_source(boundaries),
            attribute_source(builtin_countries()),
            world,
        )));

        let new_quiz = json!({"rounds": 2, "kinds": ["capital_of"]});
        let (status, created) = call(&app, Method::POST, "/quizzes", Some(new_quiz)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(created["question"]["options"].as_array().unwrap().len(), 4);
        assert_eq!(created["correctIndex"], Value::Null);
        let id = created["quizId"].as_str().unwrap().to_string();

        let answer = format!("/quizzes/{id}/answer");
        let (_, answered) = call(&app, Method::POST, &answer, Some(json!({"option": 0}))).await;
        assert_eq!(answered["state"], "answered");
        let correct_index = answered["correctIndex"].as_u64().unwrap();
        assert_eq!(answered["correct"], json!(correct_index == 0));

        call(&app, Method::POST, &format!("/quizzes/{id}/next"), None).await;
        call(&app, Method::POST, &answer, Some(json!({"option": 1}))).await;
        let (_, summary) = call(&app, Method::POST, &format!("/quizzes/{id}/next"), None).await;
        assert_eq!(summary["state"], "summary");
    }

    #[tokio::test]
    async fn bound_view_forwards_clicks_to_its_game() {
        let app = ready_app();
        let (_, created) = call(&app, Method::POST, "/games", Some(json!({"rounds": 1}))).await;
        let game_id = created["gameId"].as_str().unwrap().to_string();

        let (status, view) =
            call(&app, Method::POST, "/views", Some(json!({"gameId": game_id}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(view["view"]["mode"], "hover_highlight_only");
        assert_eq!(view["gameId"], game_id.as_str());
        let events = format!("/views/{}/events", view["viewId"].as_str().unwrap());

        let click = json!({"type": "click", "country": 3});
        let (_, clicked) = call(&app, Method::POST, &events, Some(click)).await;
        assert_eq!(clicked["view"]["selected"], Value::Null);
        assert_eq!(clicked["update"]["clicked"], 3);
        assert_eq!(clicked["game"]["gameId"], game_id.as_str());
        assert_eq!(clicked["game"]["click"], json!({"outcome": "wrong", "remaining": 1}));

        let hover = json!({"type": "hover", "country": 0});
        let (_, hovered) = call(&app, Method::POST, &events, Some(hover)).await;
        assert!(hovered.get("game").is_none());

        let (_, game) = call(&app, Method::GET, &format!("/games/{game_id}"), None).await;
        assert_eq!(game["attempts"], 1);

        let missing = json!({"gameId": "00000000-0000-0000-0000-000000000000"});
        let (status, _) = call(&app, Method::POST, "/views", Some(missing)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn idle_sessions_expire_after_ttl() {
        let ttl = Duration::from_millis(250);
        let app = router(state_with_ttl(ready_store(), ttl));
        let (_, game) = call(&app, Method::POST, "/games", None).await;
        let game_uri = format!("/games/{}", game["gameId"].as_str().unwrap());
        let (_, view) = call(&app, Method::POST, "/views", None).await;
        let view_uri = format!("/views/{}", view["viewId"].as_str().unwrap());

        let (status, _) = call(&app, Method::GET, &game_uri, None).await;
        assert_eq!(status, StatusCode::OK);

        tokio::time::sleep(ttl * 2).await;
        let (status, _) = call(&app, Method::GET, &game_uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = call(&app, Method::GET, &view_uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn sweep_drops_sessions_nobody_comes_back_for() {
        let state = state_with_ttl(ready_store(), Duration::from_secs(60));
        let app = router(state.clone());
        call(&app, Method::POST, "/games", None).await;
        call(&app, Method::POST, "/games", None).await;
        call(&app, Method::POST, "/views", None).await;
        assert_eq!((state.games.len(), state.views.len()), (2, 1));

        assert_eq!(state.evict_idle(Instant::now()), 0);
        let later = Instant::now() + Duration::from_secs(61);
        assert_eq!(state.evict_idle(later), 3);
        assert_eq!((state.games.len(), state.views.len()), (0, 0));
    }
}
