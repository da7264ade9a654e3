//! Offline placeholder artwork.

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use huntchapter_core::{ImagePrompt, ImageRef};
use huntchapter_error::IllustrationError;
use huntchapter_interface::ImageGenerator;

/// Gradient SVG whose colors derive from the prompt seed.
///
/// Needs no network, so it always succeeds.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderImages;

impl PlaceholderImages {
    /// SVG document for a seed.
    pub fn svg(seed: u32) -> String {
        let hue = seed % 360;
        let shifted = (hue + 40) % 360;
        format!(
            "<svg xmlns='http://www.w3.org/2000/svg' viewBox='0 0 960 540'>\
             <defs><linearGradient id='g' x1='0' y1='0' x2='1' y2='1'>\
             <stop stop-color='hsl({hue},40%,18%)' offset='0'/>\
             <stop stop-color='hsl({shifted},35%,12%)' offset='1'/>\
             </linearGradient></defs>\
             <rect width='100%' height='100%' fill='url(#g)'/></svg>"
        )
    }
}

#[async_trait]
impl ImageGenerator for PlaceholderImages {
    async fn generate_image(&self, prompt: &ImagePrompt) -> Result<ImageRef, IllustrationError> {
        let encoded = STANDARD.encode(Self::svg(prompt.seed));
        Ok(ImageRef::from_base64("image/svg+xml", &encoded))
    }

    fn provider_name(&self) -> &'static str {
        "placeholder"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_placeholder_is_deterministic() {
        let prompt = ImagePrompt {
            text: "anything".to_string(),
            seed: 1234,
        };
        let first = PlaceholderImages.generate_image(&prompt).await.unwrap();
        let second = PlaceholderImages.generate_image(&prompt).await.unwrap();
        assert_eq!(first, second);
        assert!(first.as_str().starts_with("data:image/svg+xml;base64,"));
    }

    #[test]
    fn test_svg_varies_with_seed() {
        assert_ne!(PlaceholderImages::svg(1), PlaceholderImages::svg(2));
    }
}
