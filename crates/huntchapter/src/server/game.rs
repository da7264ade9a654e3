//! Game API: one story engine per session.

use super::{ApiError, AppState};
use crate::Runtime;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use huntchapter_core::{Session, SessionId, SessionSummary, StoryParams, Universe};
use huntchapter_error::{EngineError, EngineErrorKind, HuntChapterResult, StorageError, StorageErrorKind};
use huntchapter_interface::SessionRepository;
use huntchapter_story::StoryEngine;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};

/// Engines of live sessions plus their persistent records.
///
/// A session missing from memory (after a restart, say) is loaded from the
/// repository and resumed on a fresh engine.
#[derive(Clone)]
pub struct GameHub {
    runtime: Arc<Runtime>,
    engines: Arc<RwLock<HashMap<SessionId, Arc<StoryEngine>>>>,
    repository: Arc<dyn SessionRepository>,
}

impl std::fmt::Debug for GameHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameHub")
            .field("runtime", &self.runtime)
            .finish_non_exhaustive()
    }
}

impl GameHub {
    /// Hub creating engines from `runtime` and saving to `repository`.
    pub fn new(runtime: Arc<Runtime>, repository: Arc<dyn SessionRepository>) -> Self {
        Self {
            runtime,
            engines: Arc::new(RwLock::new(HashMap::new())),
            repository,
        }
    }

    /// Start a story on a new engine.
    #[instrument(skip(self, params), fields(genre = %params.genre()))]
    pub async fn start(&self, params: StoryParams) -> HuntChapterResult<Session> {
        let engine = Arc::new(self.runtime.engine());
        let session = engine.start_game(params).await?;
        self.repository.save(&session).await?;
        self.engines.write().await.insert(session.id, engine);
        info!(session = %session.id, "Game created");
        Ok(session)
    }

    async fn engine(&self, id: SessionId) -> HuntChapterResult<Arc<StoryEngine>> {
        if let Some(engine) = self.engines.read().await.get(&id) {
            return Ok(engine.clone());
        }

        let session = self.repository.load(id).await?;
        let mut engines = self.engines.write().await;
        if let Some(engine) = engines.get(&id) {
            return Ok(engine.clone());
        }
        let engine = Arc::new(self.runtime.engine());
        engine.resume(session)?;
        engines.insert(id, engine.clone());
        debug!(session = %id, "Game restored from storage");
        Ok(engine)
    }

    async fn persist(&self, engine: &StoryEngine) -> HuntChapterResult<Session> {
        let session = engine
            .session()
            .ok_or_else(|| EngineError::new(EngineErrorKind::NotStarted))?;
        self.repository.save(&session).await?;
        Ok(session)
    }

    /// Current record of a session.
    pub async fn get(&self, id: SessionId) -> HuntChapterResult<Session> {
        let engine = self.engine(id).await?;
        engine
            .session()
            .ok_or_else(|| StorageError::new(StorageErrorKind::NotFound(id.to_string())).into())
    }

    /// Summaries of stored sessions, newest first.
    pub async fn list(&self) -> HuntChapterResult<Vec<SessionSummary>> {
        self.repository.list().await
    }

    /// Advance a session with a free-form or option choice.
    pub async fn choose(&self, id: SessionId, choice: &str) -> HuntChapterResult<Session> {
        let engine = self.engine(id).await?;
        engine.submit_choice(choice).await?;
        self.persist(&engine).await
    }

    /// Answer the challenge a session is waiting on.
    pub async fn answer(&self, id: SessionId, index: usize) -> HuntChapterResult<Session> {
        let engine = self.engine(id).await?;
        engine.answer_challenge(index).await?;
        self.persist(&engine).await
    }

    /// Show the previous scene of a session.
    pub async fn back(&self, id: SessionId) -> HuntChapterResult<Session> {
        let engine = self.engine(id).await?;
        engine.go_back()?;
        self.persist(&engine).await
    }

    /// Discard a session everywhere.
    ///
    /// Refused with `Busy` while the session is generating; the live engine
    /// then stays registered.
    #[instrument(skip(self))]
    pub async fn remove(&self, id: SessionId) -> HuntChapterResult<()> {
        let engine = self.engines.read().await.get(&id).cloned();
        if let Some(engine) = engine {
            engine.reset().await?;
            self.engines.write().await.remove(&id);
        }
        self.repository.delete(id).await?;
        info!(session = %id, "Game removed");
        Ok(())
    }
}

/// Body of `POST /api/game`.
///
/// Either a preset universe, or explicit genre, tone and setting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartGame {
    /// Preset supplying genre and tone
    #[serde(default)]
    pub universe: Option<Universe>,
    /// Genre, required without a universe
    #[serde(default)]
    pub genre: Option<String>,
    /// Tone, required without a universe
    #[serde(default)]
    pub tone: Option<String>,
    /// Point of view, second person unless given
    #[serde(default)]
    pub pov: Option<String>,
    /// Setting; a universe supplies one from its motifs when absent
    #[serde(default)]
    pub setting: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl StartGame {
    /// Resolve the story parameters, naming the first missing field.
    pub fn into_params(self) -> Result<StoryParams, ApiError> {
        let setting = non_blank(self.setting);
        let pov = non_blank(self.pov).unwrap_or_else(|| "second person".to_string());

        if let Some(universe) = self.universe {
            let setting = setting.unwrap_or_else(|| universe.motifs()[..2].join(", "));
            let genre = non_blank(self.genre).unwrap_or_else(|| universe.genre().to_string());
            let tone = non_blank(self.tone).unwrap_or_else(|| universe.tone().to_string());
            return Ok(StoryParams::new(genre, tone, pov, setting));
        }

        let genre = non_blank(self.genre).ok_or_else(|| ApiError::bad_request("Missing genre"))?;
        let tone = non_blank(self.tone).ok_or_else(|| ApiError::bad_request("Missing tone"))?;
        let setting = setting.ok_or_else(|| ApiError::bad_request("Missing setting"))?;
        Ok(StoryParams::new(genre, tone, pov, setting))
    }
}

/// Body of `POST /api/game/:id/choice`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceBody {
    /// Option text or free-form action
    pub choice: String,
}

/// Body of `POST /api/game/:id/challenge`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeBody {
    /// Index of the chosen answer
    pub index: usize,
}

fn session_id(raw: &str) -> Result<SessionId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::not_found(format!("session {}", raw)))
}

/// `POST /api/game`
pub async fn create_game(
    State(state): State<AppState>,
    body: Result<Json<StartGame>, JsonRejection>,
) -> Result<(StatusCode, Json<Session>), ApiError> {
    let Json(request) = body?;
    let session = state.games.start(request.into_params()?).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

/// `GET /api/game`
pub async fn list_games(
    State(state): State<AppState>,
) -> Result<Json<Vec<SessionSummary>>, ApiError> {
    Ok(Json(state.games.list().await?))
}

/// `GET /api/game/:id`
pub async fn get_game(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Session>, ApiError> {
    Ok(Json(state.games.get(session_id(&id)?).await?))
}

/// `POST /api/game/:id/choice`
pub async fn submit_choice(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<ChoiceBody>, JsonRejection>,
) -> Result<Json<Session>, ApiError> {
    let id = session_id(&id)?;
    let Json(body) = body?;
    Ok(Json(state.games.choose(id, &body.choice).await?))
}

/// `POST /api/game/:id/challenge`
pub async fn answer_challenge(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<ChallengeBody>, JsonRejection>,
) -> Result<Json<Session>, ApiError> {
    let id = session_id(&id)?;
    let Json(body) = body?;
    Ok(Json(state.games.answer(id, body.index).await?))
}

/// `POST /api/game/:id/back`
pub async fn go_back(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Session>, ApiError> {
    Ok(Json(state.games.back(session_id(&id)?).await?))
}

/// `DELETE /api/game/:id`
pub async fn delete_game(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.games.remove(session_id(&id)?).await?;
    Ok(StatusCode::NO_CONTENT)
}
