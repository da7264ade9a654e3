//! Seeded Pollinations image URLs.

use async_trait::async_trait;
use huntchapter_core::{ImagePrompt, ImageRef};
use huntchapter_error::IllustrationError;
use huntchapter_interface::ImageGenerator;
use reqwest::Url;

const BASE_URL: &str = "https://image.pollinations.ai/prompt/";

/// Builds a Pollinations URL for the prompt without contacting the service.
///
/// The same prompt and seed always give the same URL; the browser fetches it.
///
/// # Examples
///
/// ```
/// use huntchapter_models::PollinationsImages;
///
/// let images = PollinationsImages::default();
/// assert_eq!(images.dimensions(), (960, 540));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollinationsImages {
    width: u32,
    height: u32,
}

impl Default for PollinationsImages {
    fn default() -> Self {
        Self {
            width: 960,
            height: 540,
        }
    }
}

impl PollinationsImages {
    /// Use a different image size.
    pub fn with_dimensions(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width and height requested.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// URL for the prompt.
    pub fn url_for(&self, prompt: &ImagePrompt) -> Result<Url, IllustrationError> {
        let mut url = Url::parse(BASE_URL)
            .map_err(|e| IllustrationError::new(format!("Invalid base URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| IllustrationError::new("Base URL cannot carry a path"))?
            .pop_if_empty()
            .push(&format!("{}, 4k, highly detailed", prompt.text));
        url.query_pairs_mut()
            .append_pair("width", &self.width.to_string())
            .append_pair("height", &self.height.to_string())
            .append_pair("seed", &prompt.seed.to_string());
        Ok(url)
    }
}

#[async_trait]
impl ImageGenerator for PollinationsImages {
    async fn generate_image(&self, prompt: &ImagePrompt) -> Result<ImageRef, IllustrationError> {
        Ok(ImageRef::new(self.url_for(prompt)?.to_string()))
    }

    fn provider_name(&self) -> &'static str {
        "pollinations"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_is_deterministic_and_encoded() {
        let images = PollinationsImages::default();
        let prompt = ImagePrompt {
            text: "a lighthouse / at dusk".to_string(),
            seed: 4242,
        };
        let first = images.url_for(&prompt).unwrap();
        let second = images.url_for(&prompt).unwrap();
        assert_eq!(first, second);

        let rendered = first.to_string();
        assert!(rendered.starts_with("https://image.pollinations.ai/prompt/"));
        assert!(rendered.contains("%2F"));
        assert!(rendered.ends_with("width=960&height=540&seed=4242"));
    }
}
