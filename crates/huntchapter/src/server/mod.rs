//! HTTP server: the generation relay and the game API.

mod error;
mod game;
mod relay;

pub use error::ApiError;
pub use game::{
    ChallengeBody, ChoiceBody, GameHub, StartGame, answer_challenge, create_game, delete_game,
    get_game, go_back, list_games, submit_choice,
};
pub use relay::{RelayUpstream, generate_image, generate_text};

use crate::{HuntChapterConfig, Runtime};
use axum::Router;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use axum::routing::{get, post};
use huntchapter_error::{HttpError, HttpErrorKind, HuntChapterResult};
use huntchapter_models::{GeminiClient, GeminiImageClient};
use huntchapter_story::FileSessionRepository;
use serde_json::json;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Shared state of every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Upstream models behind the relay endpoints
    pub relay: RelayUpstream,
    /// Live games
    pub games: GameHub,
}

impl AppState {
    /// State from its parts.
    pub fn new(relay: RelayUpstream, games: GameHub) -> Self {
        Self { relay, games }
    }
}

/// Routes of the relay and the game API.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/generate", post(generate_text))
        .route("/api/generate-image", post(generate_image))
        .route("/api/game", post(create_game).get(list_games))
        .route("/api/game/:id", get(get_game).delete(delete_game))
        .route("/api/game/:id/choice", post(submit_choice))
        .route("/api/game/:id/challenge", post(answer_challenge))
        .route("/api/game/:id/back", post(go_back))
        .with_state(state)
}

async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status": "ok"})))
}

/// Relay upstreams from the environment; missing credentials leave them unset.
pub fn relay_upstream(config: &HuntChapterConfig) -> RelayUpstream {
    let mut upstream = RelayUpstream::unconfigured();
    if !*config.server().relay() {
        return upstream;
    }

    match GeminiClient::from_env(config.remote().model().clone()) {
        Ok(client) => upstream = upstream.with_text(Arc::new(client)),
        Err(e) => warn!(error = %e, "Text relay has no upstream"),
    }
    let image_model = config
        .images()
        .model()
        .clone()
        .unwrap_or_else(|| GeminiImageClient::DEFAULT_MODEL.to_string());
    match GeminiImageClient::from_env(image_model) {
        Ok(client) => upstream = upstream.with_image(Arc::new(client)),
        Err(e) => warn!(error = %e, "Image relay has no upstream"),
    }
    upstream
}

/// Serve until the process is stopped.
///
/// `bind` overrides the configured address.
#[instrument(skip(runtime))]
pub async fn serve(runtime: Runtime, bind: Option<String>) -> HuntChapterResult<()> {
    let config = runtime.config().clone();
    let bind = bind.unwrap_or_else(|| config.server().bind().clone());
    let repository = Arc::new(FileSessionRepository::new(config.server().sessions_file()));
    let games = GameHub::new(Arc::new(runtime), repository);
    let app = create_router(AppState::new(relay_upstream(&config), games));

    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .map_err(|e| {
            HttpError::new(HttpErrorKind::Bind {
                address: bind.clone(),
                reason: e.to_string(),
            })
        })?;
    info!(address = %bind, sessions = %config.server().sessions_file().display(), "Listening");

    axum::serve(listener, app)
        .await
        .map_err(|e| HttpError::new(HttpErrorKind::Serve(e.to_string())))?;
    Ok(())
}
