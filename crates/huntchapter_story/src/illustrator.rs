//! Best-effort scene illustration.

use huntchapter_core::{ImagePrompt, ImageRef, StoryParams, hash_seed};
use huntchapter_interface::ImageGenerator;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Longest narration excerpt placed in an image prompt.
const SCENE_EXCERPT_CHARS: usize = 280;

const LOOKS: [&str; 5] = [
    "short black hair",
    "wavy brown hair",
    "silver hair",
    "shaved head",
    "dark ponytail",
];
const GEAR: [&str; 5] = [
    "tactical suit",
    "long coat",
    "light armor",
    "explorer outfit",
    "worn jacket",
];
const ACCENTS: [&str; 5] = [
    "faint scar",
    "fine tattoo",
    "breathing mask",
    "clear goggles",
    "reinforced gloves",
];

/// Visual style for a genre.
pub fn style_preset(genre: &str) -> &'static str {
    match genre {
        "Science-fiction" => {
            "digital painting, space concept art, cold blue and violet palette, nebulae, cinematic lighting"
        }
        "Fantasy" => "digital painting, epic concept art, emerald and gold palette, cinematic lighting",
        "Urban thriller" | "Investigation" => {
            "digital painting, modern film noir, high contrast, misty atmosphere"
        }
        "Survival" => "digital painting, desaturated palette, light grain, dramatic lighting",
        "Historical" => "digital painting, fine textures, warm tones, natural light",
        _ => "digital painting, concept art, cinematic lighting",
    }
}

/// Description of the protagonist, stable for a given set of parameters.
///
/// # Examples
///
/// ```
/// use huntchapter_core::StoryParams;
/// use huntchapter_story::hero_descriptor;
///
/// let params = StoryParams::new("Fantasy", "Epic", "second person", "Ruins");
/// assert_eq!(hero_descriptor(&params), hero_descriptor(&params.clone()));
/// assert!(hero_descriptor(&params).starts_with("same protagonist"));
/// ```
pub fn hero_descriptor(params: &StoryParams) -> String {
    let seed = hash_seed(&params.fingerprint()) as usize;
    format!(
        "same protagonist, {}, {}, {}, determined expression",
        LOOKS[seed % LOOKS.len()],
        GEAR[(seed >> 3) % GEAR.len()],
        ACCENTS[(seed >> 5) % ACCENTS.len()]
    )
}

/// Image prompt for a scene.
///
/// The seed depends only on the parameters, so every illustration of a
/// session shares it.
pub fn build_image_prompt(narration: &str, params: &StoryParams) -> ImagePrompt {
    let excerpt: String = narration
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .take(SCENE_EXCERPT_CHARS)
        .collect();
    let hero = hero_descriptor(params);
    let style = style_preset(params.genre());
    let text = [
        style.to_string(),
        format!("{}, {} atmosphere", params.setting(), params.tone().to_lowercase()),
        format!("always the same character: {}", hero),
        format!("scene: {}", excerpt),
        "no text, no caption, no letters, no logo, no watermark, SFW".to_string(),
    ]
    .join(", ");
    ImagePrompt {
        text,
        seed: hash_seed(&format!("{}|{}", hero, style)),
    }
}

/// Attaches artwork to scenes without ever failing them.
#[derive(Clone, Default)]
pub struct Illustrator {
    primary: Option<Arc<dyn ImageGenerator>>,
    fallback: Option<Arc<dyn ImageGenerator>>,
}

impl std::fmt::Debug for Illustrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Illustrator")
            .field("primary", &self.primary.as_ref().map(|g| g.provider_name()))
            .field("fallback", &self.fallback.as_ref().map(|g| g.provider_name()))
            .finish()
    }
}

impl Illustrator {
    /// Illustrator that never produces images.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Illustrator using `primary`.
    pub fn new(primary: Arc<dyn ImageGenerator>) -> Self {
        Self {
            primary: Some(primary),
            fallback: None,
        }
    }

    /// Generator tried when the primary one fails or is absent.
    pub fn with_fallback(mut self, fallback: Arc<dyn ImageGenerator>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// Whether any generator is configured.
    pub fn is_enabled(&self) -> bool {
        self.primary.is_some() || self.fallback.is_some()
    }

    /// Illustrate a scene; `None` when every generator fails.
    #[instrument(skip_all, fields(narration_length = narration.len()))]
    pub async fn illustrate(&self, narration: &str, params: &StoryParams) -> Option<ImageRef> {
        if !self.is_enabled() {
            return None;
        }
        let prompt = build_image_prompt(narration, params);

        for generator in self.primary.iter().chain(self.fallback.iter()) {
            match generator.generate_image(&prompt).await {
                Ok(image) => {
                    debug!(provider = generator.provider_name(), "Scene illustrated");
                    return Some(image);
                }
                Err(e) => {
                    warn!(provider = generator.provider_name(), error = %e, "Illustration failed");
                }
            }
        }
        None
    }
}
