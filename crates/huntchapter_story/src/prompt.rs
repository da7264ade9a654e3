//! Prompt composition for intro and continuation scenes.

use huntchapter_core::{
    PacingConfig, PromptPayload, Scene, SceneRole, SceneStatus, Session, StoryParams,
};
use serde::Serialize;

/// Default number of recent scenes shown to the model.
pub const DEFAULT_HISTORY_WINDOW: usize = 4;

/// Most recent scenes a continuation prompt may show.
pub const MAX_HISTORY_WINDOW: usize = 4;

/// The player's input for the scene being generated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerTurn {
    /// Text of the chosen option or answer
    pub choice: String,
    /// Present when the previous scene was a challenge
    pub challenge: Option<ChallengeAnswer>,
}

/// Context of an answer given to a challenge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChallengeAnswer {
    /// The question that was answered
    pub question: String,
    /// Whether the answer was the intended one, when known
    pub correct: Option<bool>,
}

impl PlayerTurn {
    /// A turn answering whatever `previous` asked.
    ///
    /// When `previous` is a challenge the answer is checked against the
    /// intended answer, if the storyteller named one.
    ///
    /// # Examples
    ///
    /// ```
    /// use huntchapter_story::PlayerTurn;
    ///
    /// let turn = PlayerTurn::following(None, "Open the door");
    /// assert_eq!(turn.choice, "Open the door");
    /// assert!(turn.challenge.is_none());
    /// ```
    pub fn following(previous: Option<&Scene>, choice: &str) -> Self {
        let choice = choice.trim().to_string();
        let challenge = previous.and_then(Scene::challenge).map(|challenge| ChallengeAnswer {
            question: challenge.question.clone(),
            correct: challenge.is_correct(&choice),
        });
        Self { choice, challenge }
    }

    /// Every turn the player took in `session`, judged against the scene
    /// each choice was made on.
    pub fn recorded(session: &Session) -> Vec<Self> {
        session
            .answered_choices()
            .into_iter()
            .map(|(previous, choice)| Self::following(previous, choice))
            .collect()
    }
}

/// Condensed scene shown to the model as recent history.
#[derive(Debug, Serialize)]
struct SceneDigest<'a> {
    scene: usize,
    narration: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    challenge: Option<&'a str>,
    status: SceneStatus,
}

/// Builds generation instructions from pacing, history and parameters.
#[derive(Debug, Clone)]
pub struct PromptComposer {
    pacing: PacingConfig,
    language: String,
    history_window: usize,
}

impl PromptComposer {
    /// Composer for the given pacing, writing English narration.
    pub fn new(pacing: PacingConfig) -> Self {
        Self {
            pacing,
            language: "English".to_string(),
            history_window: DEFAULT_HISTORY_WINDOW,
        }
    }

    /// Language the narration must be written in.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Number of recent scenes included in continuation prompts, kept
    /// within `1..=MAX_HISTORY_WINDOW`.
    pub fn with_history_window(mut self, window: usize) -> Self {
        self.history_window = window.clamp(1, MAX_HISTORY_WINDOW);
        self
    }

    /// Number of recent scenes included in continuation prompts.
    pub fn history_window(&self) -> usize {
        self.history_window
    }

    /// Pacing the composer describes to the model.
    pub fn pacing(&self) -> &PacingConfig {
        &self.pacing
    }

    /// Exact JSON shape required for `role`.
    pub fn shape_for(role: SceneRole) -> &'static str {
        match role {
            SceneRole::Normal => {
                r#"{ "narration": "2-4 sentences", "options": ["option 1", "option 2", "option 3"], "status": "ongoing" }"#
            }
            SceneRole::Challenge => {
                r#"{ "narration": "2-3 sentences", "challenge": { "question": "riddle built on clues already given", "choices": ["answer 1", "answer 2", "answer 3"], "answerIndex": 0 }, "status": "ongoing" }"#
            }
            SceneRole::Ending => {
                r#"{ "narration": "resolution in 2-4 sentences", "endingTitle": "short title", "status": "win" }  (status is "win" or "loss")"#
            }
        }
    }

    fn challenge_summary(&self) -> String {
        let positions: Vec<String> = self
            .pacing
            .challenge_positions()
            .map(|p| p.to_string())
            .collect();
        if positions.is_empty() {
            "There are no challenge scenes.".to_string()
        } else {
            format!(
                "Scenes {} are mandatory challenge scenes.",
                positions.join(", ")
            )
        }
    }

    fn parameter_line(params: &StoryParams) -> String {
        format!(
            "Story parameters: genre={}, tone={}, point of view={}, setting={}.",
            params.genre(),
            params.tone(),
            params.pov(),
            params.setting()
        )
    }

    /// Instructions for the opening scene (position 1).
    ///
    /// # Examples
    ///
    /// ```
    /// use huntchapter_core::{PacingConfig, SceneRole, StoryParams};
    /// use huntchapter_story::PromptComposer;
    ///
    /// let composer = PromptComposer::new(PacingConfig::default());
    /// let params = StoryParams::new("Fantasy", "Epic", "second person", "Ruins");
    /// let prompt = composer.compose_intro(&params);
    /// assert_eq!(prompt.role, SceneRole::Normal);
    /// assert_eq!(prompt.position, 1);
    /// assert!(prompt.text.contains("exactly 6 scenes"));
    /// ```
    pub fn compose_intro(&self, params: &StoryParams) -> PromptPayload {
        let total = self.pacing.total_scenes();
        let role = self.pacing.role_at(1);
        let shape = Self::shape_for(role);
        let text = format!(
            "You are an interactive storyteller. Plan a {language} adventure of exactly {total} scenes (scenes 1-{total}). {challenges} Scene {total} is the ending.\n\
             \n\
             {parameters}\n\
             \n\
             Write scene 1: a prologue that sets the tone and stops right before the first decision, then offer exactly 3 options.\n\
             \n\
             Respond with JSON only, in exactly this shape:\n\
             {shape}\n\
             \n\
             All narrative content must be in {language}.",
            language = self.language,
            total = total,
            challenges = self.challenge_summary(),
            parameters = Self::parameter_line(params),
            shape = shape,
        );
        PromptPayload {
            text,
            role,
            position: 1,
            shape: shape.to_string(),
        }
    }

    /// Instructions for the scene at `position`, following `turn`.
    ///
    /// Only the last few scenes of `recent_history` are shown; older ones
    /// are dropped.
    pub fn compose_continuation(
        &self,
        recent_history: &[Scene],
        turn: &PlayerTurn,
        position: usize,
        role: SceneRole,
        params: &StoryParams,
    ) -> PromptPayload {
        let total = self.pacing.total_scenes();
        let skip = recent_history.len().saturating_sub(self.history_window);
        let window = &recent_history[skip..];
        let first_number = position.saturating_sub(window.len()).max(1);
        let digest: Vec<SceneDigest<'_>> = window
            .iter()
            .enumerate()
            .map(|(i, scene)| SceneDigest {
                scene: first_number + i,
                narration: &scene.narration,
                challenge: scene.challenge().map(|c| c.question.as_str()),
                status: scene.status(),
            })
            .collect();
        let digest = serde_json::to_string(&digest).unwrap_or_else(|_| "[]".to_string());

        let player_input = match &turn.challenge {
            Some(answer) => {
                let verdict = match answer.correct {
                    Some(true) => "This answer is correct.",
                    Some(false) => "This answer is incorrect.",
                    None => "Judge the answer against the clues given so far.",
                };
                format!(
                    "The player answered the challenge \"{}\" with: {}\n{}",
                    answer.question, turn.choice, verdict
                )
            }
            None => format!("Last player choice: {}", turn.choice),
        };

        let requirement = match role {
            SceneRole::Normal => {
                "This is a regular scene: narration followed by exactly 3 options.".to_string()
            }
            SceneRole::Challenge => "This is a challenge scene: narration followed by a puzzle with 2 to 4 possible answers. The puzzle must build on elements already established in earlier scenes.".to_string(),
            SceneRole::Ending => format!(
                "This is scene {total}, the ending: conclude the story with status \"win\" or \"loss\". Do not include options or a challenge."
            ),
        };

        let shape = Self::shape_for(role);
        let text = format!(
            "You are an interactive storyteller. Continue a {language} adventure capped at {total} scenes. {challenges} Scene {total} must conclude the story with status \"win\" or \"loss\".\n\
             \n\
             {parameters}\n\
             \n\
             Recent scenes:\n\
             {digest}\n\
             \n\
             {player_input}\n\
             Upcoming scene index: {position} of {total}\n\
             \n\
             {requirement}\n\
             Respond with JSON only, in exactly this shape:\n\
             {shape}\n\
             \n\
             All narrative content must be in {language}. No commentary.",
            language = self.language,
            total = total,
            challenges = self.challenge_summary(),
            parameters = Self::parameter_line(params),
            digest = digest,
            player_input = player_input,
            position = position,
            requirement = requirement,
            shape = shape,
        );

        PromptPayload {
            text,
            role,
            position,
            shape: shape.to_string(),
        }
    }
}
