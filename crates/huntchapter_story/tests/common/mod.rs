//! Scripted backends shared by the story tests.

#![allow(dead_code)]

use async_trait::async_trait;
use huntchapter_core::{GenerationRequest, ImagePrompt, ImageRef, StoryParams};
use huntchapter_error::{BackendError, BackendErrorKind, IllustrationError};
use huntchapter_interface::{ImageGenerator, TextGenerator};
use serde_json::json;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Notify;

/// What the storyteller does on one call.
pub enum Step {
    /// Answer with a well-formed scene for whatever shape the prompt asks for
    Scene,
    /// Answer with this raw text
    Raw(String),
    /// Fail with this error
    Fail(BackendErrorKind),
    /// Signal `entered`, wait for `release`, then answer with a scene
    Gate {
        entered: Arc<Notify>,
        release: Arc<Notify>,
    },
}

/// Text backend answering from a script, then with well-formed scenes.
pub struct Storyteller {
    name: &'static str,
    script: Mutex<VecDeque<Step>>,
    prompts: Mutex<Vec<String>>,
    calls: AtomicUsize,
    resets: AtomicUsize,
    counter: AtomicUsize,
}

impl Storyteller {
    pub fn new(name: &'static str) -> Arc<Self> {
        Self::scripted(name, Vec::new())
    }

    pub fn scripted(name: &'static str, steps: Vec<Step>) -> Arc<Self> {
        Arc::new(Self {
            name,
            script: Mutex::new(steps.into()),
            prompts: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            resets: AtomicUsize::new(0),
            counter: AtomicUsize::new(0),
        })
    }

    pub fn push(&self, step: Step) {
        self.script.lock().unwrap().push_back(step);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn resets(&self) -> usize {
        self.resets.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    fn scene_for(&self, prompt: &str) -> String {
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        let value = if prompt.contains("\"answerIndex\"") {
            json!({
                "narration": format!("{} challenge {}.", self.name, n),
                "challenge": {
                    "question": "Which key opens the vault?",
                    "choices": ["Brass", "Iron", "Bone"],
                    "answerIndex": 0
                },
                "status": "ongoing"
            })
        } else if prompt.contains("\"endingTitle\"") {
            json!({
                "narration": format!("{} ending {}.", self.name, n),
                "endingTitle": "Dawn",
                "status": "win"
            })
        } else {
            json!({
                "narration": format!("{} scene {}.", self.name, n),
                "options": ["Climb", "Hide", "Call out"],
                "status": "ongoing"
            })
        };
        value.to_string()
    }
}

#[async_trait]
impl TextGenerator for Storyteller {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(request.prompt.clone());
        let step = self.script.lock().unwrap().pop_front().unwrap_or(Step::Scene);
        match step {
            Step::Scene => Ok(self.scene_for(&request.prompt)),
            Step::Raw(text) => Ok(text),
            Step::Fail(kind) => Err(BackendError::new(kind)),
            Step::Gate { entered, release } => {
                entered.notify_one();
                release.notified().await;
                Ok(self.scene_for(&request.prompt))
            }
        }
    }

    fn provider_name(&self) -> &'static str {
        self.name
    }

    fn model_name(&self) -> &str {
        "scripted"
    }

    async fn reset_session(&self) {
        self.resets.fetch_add(1, Ordering::SeqCst);
    }
}

/// Image backend that always fails.
pub struct BrokenImages;

#[async_trait]
impl ImageGenerator for BrokenImages {
    async fn generate_image(&self, _prompt: &ImagePrompt) -> Result<ImageRef, IllustrationError> {
        Err(IllustrationError::new("renderer offline"))
    }

    fn provider_name(&self) -> &'static str {
        "broken"
    }
}

/// Image backend returning a fixed URL.
pub struct FixedImages(pub &'static str);

#[async_trait]
impl ImageGenerator for FixedImages {
    async fn generate_image(&self, _prompt: &ImagePrompt) -> Result<ImageRef, IllustrationError> {
        Ok(ImageRef::new(self.0))
    }

    fn provider_name(&self) -> &'static str {
        "fixed"
    }
}

pub fn params() -> StoryParams {
    StoryParams::new("Fantasy", "Epic", "second person", "A drowned city")
}

pub fn unavailable(message: &str) -> Step {
    Step::Fail(BackendErrorKind::Unavailable(message.to_string()))
}
