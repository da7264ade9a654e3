//! The story progression engine.
//!
//! A state machine driving one session: it sequences scenes according to
//! the pacing, runs each turn through a generation adapter, and moves from
//! the local backend to the remote one by replaying the session when the
//! local backend fails.
//!
//! ```text
//! Idle ──start──▶ Starting ──intro ok──▶ Active(Local | Remote)
//!   ▲                │                        │
//!   │           both failed                   ├─ local failure ─▶ replay on remote ─▶ Active(Remote)
//!   └────────────────┘                        │                          │
//!   ▲                                         │                    replay failed
//!   └──────────────────── reset ──────────────┴──────────────── Faulted ◀┘
//! ```

use crate::{
    Checkpoint, EngineConfig, GenerationAdapter, Illustrator, PlayerTurn, PromptComposer,
    SessionStore,
};
use huntchapter_core::{
    ChoiceMarker, HistoryEntry, Mode, PromptPayload, Scene, SceneContent, Session, StoryParams,
};
use huntchapter_error::{BackendError, EngineError, EngineErrorKind, EngineResult};
use huntchapter_interface::TextGenerator;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, error, info, instrument, warn};

/// Lifecycle phase of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, derive_more::Display)]
#[serde(rename_all = "snake_case")]
pub enum EnginePhase {
    /// No session
    #[display("idle")]
    Idle,
    /// Generating the intro
    #[display("starting")]
    Starting,
    /// Session in progress, authored by the given backend
    #[display("active ({})", _0)]
    Active(Mode),
    /// A fallback replay failed; reset required
    #[display("faulted")]
    Faulted,
}

#[derive(Debug)]
struct EngineState {
    phase: EnginePhase,
    store: Option<SessionStore>,
}

/// Restores the engine state when a turn does not complete.
///
/// Covers both explicit failures and futures dropped mid-generation.
struct TurnGuard<'a> {
    state: &'a Mutex<EngineState>,
    restore: Option<(EnginePhase, Option<Checkpoint>)>,
}

impl<'a> TurnGuard<'a> {
    fn new(state: &'a Mutex<EngineState>, phase: EnginePhase, checkpoint: Option<Checkpoint>) -> Self {
        Self {
            state,
            restore: Some((phase, checkpoint)),
        }
    }

    /// Leave the engine in `phase` instead of the original one on drop.
    fn fail_to(&mut self, phase: EnginePhase) {
        if let Some((restore_phase, _)) = self.restore.as_mut() {
            *restore_phase = phase;
        }
    }

    /// The turn completed; keep the current state.
    fn disarm(mut self) {
        self.restore = None;
    }
}

impl Drop for TurnGuard<'_> {
    fn drop(&mut self) {
        let Some((phase, checkpoint)) = self.restore.take() else {
            return;
        };
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.phase = phase;
        if let (Some(checkpoint), Some(store)) = (checkpoint, state.store.as_mut()) {
            store.rollback(checkpoint);
        }
        debug!(phase = %phase, "Turn rolled back");
    }
}

/// Inputs of a turn captured while the state lock is held.
struct PendingTurn {
    mode: Mode,
    checkpoint: Checkpoint,
    prompt: PromptPayload,
    params: StoryParams,
}

/// Drives one interactive story.
///
/// Operations take `&self`; an engine is shared behind an `Arc` between
/// the player-facing layer and whatever persists its session. Only one
/// generation runs at a time: a second `start_game`, `submit_choice` or
/// `reset` while one is in flight fails with `Busy`. Navigation and reads
/// stay available during generation.
pub struct StoryEngine {
    config: EngineConfig,
    composer: PromptComposer,
    local: Option<GenerationAdapter>,
    remote: GenerationAdapter,
    illustrator: Illustrator,
    state: Mutex<EngineState>,
    in_flight: tokio::sync::Mutex<()>,
}

impl std::fmt::Debug for StoryEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoryEngine")
            .field("config", &self.config)
            .field("local", &self.local)
            .field("remote", &self.remote)
            .field("illustrator", &self.illustrator)
            .field("phase", &self.phase())
            .finish()
    }
}

impl StoryEngine {
    /// Engine authored by `remote` only.
    pub fn new(config: EngineConfig, remote: Arc<dyn TextGenerator>) -> Self {
        let composer = PromptComposer::new(config.pacing().clone())
            .with_language(config.language().clone())
            .with_history_window(*config.history_window());
        let remote = GenerationAdapter::new(remote, *config.max_retries());
        Self {
            config,
            composer,
            local: None,
            remote,
            illustrator: Illustrator::disabled(),
            state: Mutex::new(EngineState {
                phase: EnginePhase::Idle,
                store: None,
            }),
            in_flight: tokio::sync::Mutex::new(()),
        }
    }

    /// Prefer `local` and fall back to the remote backend when it fails.
    pub fn with_local(mut self, local: Arc<dyn TextGenerator>) -> Self {
        self.local = Some(GenerationAdapter::new(local, *self.config.max_retries()));
        self
    }

    /// Illustrate scenes with `illustrator`.
    pub fn with_illustrator(mut self, illustrator: Illustrator) -> Self {
        self.illustrator = illustrator;
        self
    }

    /// Engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Current phase.
    pub fn phase(&self) -> EnginePhase {
        self.state().phase
    }

    /// Snapshot of the current session, if any.
    pub fn session(&self) -> Option<Session> {
        self.state().store.as_ref().map(|store| store.session().clone())
    }

    fn state(&self) -> MutexGuard<'_, EngineState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn begin(&self) -> EngineResult<tokio::sync::MutexGuard<'_, ()>> {
        self.in_flight
            .try_lock()
            .map_err(|_| EngineError::new(EngineErrorKind::Busy))
    }

    /// Start a new story.
    ///
    /// The intro comes from the local backend when one is configured and
    /// works, from the remote backend otherwise.
    ///
    /// # Errors
    ///
    /// `AlreadyStarted` outside `Idle`, `Busy` during another generation,
    /// `Fatal` when neither backend produced an intro (the engine stays
    /// `Idle`).
    #[instrument(skip(self, params), fields(genre = %params.genre(), tone = %params.tone()))]
    pub async fn start_game(&self, params: StoryParams) -> EngineResult<Session> {
        let _busy = self.begin()?;
        {
            let mut state = self.state();
            match state.phase {
                EnginePhase::Idle => {}
                EnginePhase::Faulted => {
                    return Err(EngineError::new(EngineErrorKind::ResetRequired));
                }
                EnginePhase::Starting | EnginePhase::Active(_) => {
                    return Err(EngineError::new(EngineErrorKind::AlreadyStarted));
                }
            }
            state.phase = EnginePhase::Starting;
        }
        let guard = TurnGuard::new(&self.state, EnginePhase::Idle, None);

        let prompt = self.composer.compose_intro(&params);
        let (mode, content) = match self.generate_intro(&prompt).await {
            Ok(generated) => generated,
            Err(e) => {
                error!(error = %e.kind, "No backend could produce an intro");
                return Err(EngineError::new(EngineErrorKind::Fatal(format!(
                    "no backend could start the story: {}",
                    e.kind
                ))));
            }
        };
        let intro = self.materialize(content, &params).await;

        let session = Session::new(params, mode, intro);
        {
            let mut state = self.state();
            state.store = Some(SessionStore::new(session.clone()));
            state.phase = EnginePhase::Active(mode);
        }
        guard.disarm();
        info!(session = %session.id, mode = %mode, "Story started");
        Ok(session)
    }

    async fn generate_intro(&self, prompt: &PromptPayload) -> Result<(Mode, SceneContent), BackendError> {
        if let Some(local) = &self.local {
            match local.generate(prompt).await {
                Ok(content) => return Ok((Mode::Local, content)),
                Err(e) => {
                    warn!(error = %e.kind, "Local intro failed, trying remote backend");
                    local.reset_session().await;
                }
            }
        }
        let content = self.remote.generate(prompt).await?;
        Ok((Mode::Remote, content))
    }

    /// Advance the story with the player's choice.
    ///
    /// A marker for the choice is appended before generation and removed
    /// again if the turn fails. When the local backend fails the whole
    /// session, including this choice, is replayed on the remote backend.
    ///
    /// # Errors
    ///
    /// `EmptyChoice`, `NotStarted`, `StoryEnded`, `Busy` and
    /// `ResetRequired` leave everything untouched. A remote failure is
    /// reported as `Generation` after rollback and may be retried. A failed
    /// replay is `Fatal` and leaves the engine `Faulted`.
    #[instrument(skip(self, choice), fields(choice_length = choice.len()))]
    pub async fn submit_choice(&self, choice: &str) -> EngineResult<Session> {
        let choice = choice.trim();
        if choice.is_empty() {
            return Err(EngineError::new(EngineErrorKind::EmptyChoice));
        }
        let _busy = self.begin()?;
        let pending = self.prepare_turn(choice)?;
        let mut guard = TurnGuard::new(
            &self.state,
            EnginePhase::Active(pending.mode),
            Some(pending.checkpoint),
        );

        let adapter = match pending.mode {
            Mode::Local => self.local.as_ref(),
            Mode::Remote => Some(&self.remote),
        };
        let generated = match adapter {
            Some(adapter) => adapter.generate(&pending.prompt).await,
            None => Err(BackendError::unavailable("no local backend configured")),
        };

        match (generated, pending.mode) {
            (Ok(content), _) => {
                let scene = self.materialize(content, &pending.params).await;
                let session = {
                    let mut state = self.state();
                    let store = state
                        .store
                        .as_mut()
                        .ok_or_else(|| EngineError::new(EngineErrorKind::NotStarted))?;
                    store.push_scene(scene);
                    store.session().clone()
                };
                guard.disarm();
                debug!(scenes = session.scene_count(), "Turn committed");
                Ok(session)
            }
            (Err(e), Mode::Local) => {
                warn!(error = %e.kind, "Local backend failed, replaying on remote");
                match self.fall_back(&pending.params).await {
                    Ok(session) => {
                        guard.disarm();
                        Ok(session)
                    }
                    Err(e) => {
                        guard.fail_to(EnginePhase::Faulted);
                        Err(e)
                    }
                }
            }
            (Err(e), Mode::Remote) => {
                warn!(error = %e.kind, "Remote backend failed, turn rolled back");
                Err(EngineError::new(EngineErrorKind::Generation(e.kind)))
            }
        }
    }

    /// Validate the turn, append the choice marker and compose the prompt.
    fn prepare_turn(&self, choice: &str) -> EngineResult<PendingTurn> {
        let mut state = self.state();
        let mode = match state.phase {
            EnginePhase::Active(mode) => mode,
            EnginePhase::Faulted => return Err(EngineError::new(EngineErrorKind::ResetRequired)),
            EnginePhase::Idle | EnginePhase::Starting => {
                return Err(EngineError::new(EngineErrorKind::NotStarted));
            }
        };
        let store = state
            .store
            .as_mut()
            .ok_or_else(|| EngineError::new(EngineErrorKind::NotStarted))?;
        if store.session().is_ended() {
            return Err(EngineError::new(EngineErrorKind::StoryEnded));
        }

        let checkpoint = store.checkpoint();
        let position = store.next_position();
        let role = self.config.pacing().role_at(position);
        let turn = PlayerTurn::following(store.session().latest_scene(), choice);
        let recent = store.recent_scenes(self.composer.history_window());
        let params = store.session().params.clone();
        let prompt = self
            .composer
            .compose_continuation(&recent, &turn, position, role, &params);
        store.push_choice(choice);

        debug!(position, role = %role, mode = %mode, "Turn prepared");
        Ok(PendingTurn {
            mode,
            checkpoint,
            prompt,
            params,
        })
    }

    /// Replay the session on the remote backend and adopt the result.
    async fn fall_back(&self, params: &StoryParams) -> EngineResult<Session> {
        if let Some(local) = &self.local {
            local.reset_session().await;
        }
        let turns = self
            .state()
            .store
            .as_ref()
            .map(|store| PlayerTurn::recorded(store.session()))
            .unwrap_or_default();
        info!(choices = turns.len(), "Replaying session on remote backend");

        let history = self.replay(params, &turns).await.map_err(|e| {
            error!(error = %e.kind, "Remote replay failed");
            EngineError::new(EngineErrorKind::Fatal(format!(
                "remote replay failed: {}",
                e.kind
            )))
        })?;

        let mut state = self.state();
        let store = state
            .store
            .as_mut()
            .ok_or_else(|| EngineError::new(EngineErrorKind::NotStarted))?;
        store.rebuild(history, Mode::Remote);
        let session = store.session().clone();
        state.phase = EnginePhase::Active(Mode::Remote);
        info!(scenes = session.scene_count(), "Session now authored remotely");
        Ok(session)
    }

    /// Regenerate intro and every choice, in order, on the remote backend.
    ///
    /// Challenge answers keep the question and verdict the player actually
    /// faced, not those of the regenerated scene.
    async fn replay(
        &self,
        params: &StoryParams,
        turns: &[PlayerTurn],
    ) -> Result<Vec<HistoryEntry>, BackendError> {
        let window = self.composer.history_window();
        let pacing = self.config.pacing();

        let intro = self.remote.generate(&self.composer.compose_intro(params)).await?;
        let mut scenes = vec![self.materialize(intro, params).await];
        let mut history = vec![HistoryEntry::Scene(scenes[0].clone())];

        for turn in turns {
            let position = scenes.len() + 1;
            if position > pacing.final_scene_position() {
                break;
            }
            let recent = &scenes[scenes.len().saturating_sub(window)..];
            let prompt = self.composer.compose_continuation(
                recent,
                turn,
                position,
                pacing.role_at(position),
                params,
            );
            history.push(ChoiceMarker::new(&turn.choice).into());

            let content = self.remote.generate(&prompt).await?;
            let scene = self.materialize(content, params).await;
            history.push(scene.clone().into());
            scenes.push(scene);
        }
        Ok(history)
    }

    async fn materialize(&self, content: SceneContent, params: &StoryParams) -> Scene {
        let image = self.illustrator.illustrate(&content.narration, params).await;
        Scene::from_content(content, image)
    }

    /// Answer the latest challenge with its `index`-th choice.
    ///
    /// # Errors
    ///
    /// `NoChallenge` unless the latest scene is a challenge,
    /// `ChoiceOutOfRange` for a bad index, plus every error of
    /// [`StoryEngine::submit_choice`].
    pub async fn answer_challenge(&self, index: usize) -> EngineResult<Session> {
        let answer = {
            let state = self.state();
            let session = state
                .store
                .as_ref()
                .map(SessionStore::session)
                .ok_or_else(|| EngineError::new(EngineErrorKind::NotStarted))?;
            let challenge = session
                .latest_scene()
                .and_then(Scene::challenge)
                .ok_or_else(|| EngineError::new(EngineErrorKind::NoChallenge))?;
            challenge.choices.get(index).cloned().ok_or_else(|| {
                EngineError::new(EngineErrorKind::ChoiceOutOfRange {
                    index,
                    available: challenge.choices.len(),
                })
            })?
        };
        self.submit_choice(&answer).await
    }

    /// Display the previous real scene. Never changes history.
    ///
    /// # Errors
    ///
    /// `NotStarted` when there is no session.
    pub fn go_back(&self) -> EngineResult<Session> {
        let mut state = self.state();
        let store = state
            .store
            .as_mut()
            .ok_or_else(|| EngineError::new(EngineErrorKind::NotStarted))?;
        store.go_back();
        Ok(store.session().clone())
    }

    /// Discard the session and any local model session.
    ///
    /// # Errors
    ///
    /// `Busy` while a generation is in flight.
    #[instrument(skip(self))]
    pub async fn reset(&self) -> EngineResult<()> {
        let _busy = self.begin()?;
        {
            let mut state = self.state();
            state.store = None;
            state.phase = EnginePhase::Idle;
        }
        if let Some(local) = &self.local {
            local.reset_session().await;
        }
        info!("Engine reset");
        Ok(())
    }

    /// Continue a previously persisted session.
    ///
    /// # Errors
    ///
    /// `AlreadyStarted` unless the engine is idle, `Busy` during generation.
    pub fn resume(&self, session: Session) -> EngineResult<()> {
        let _busy = self.begin()?;
        let mut state = self.state();
        if state.phase != EnginePhase::Idle {
            return Err(EngineError::new(EngineErrorKind::AlreadyStarted));
        }
        info!(session = %session.id, mode = %session.mode, "Session resumed");
        state.phase = EnginePhase::Active(session.mode);
        state.store = Some(SessionStore::new(session));
        Ok(())
    }
}
