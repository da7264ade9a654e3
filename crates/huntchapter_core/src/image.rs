//! Illustration references and prompts.

use serde::{Deserialize, Serialize};

/// Reference to an illustration: a `data:` URI or a URL.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
)]
#[serde(transparent)]
pub struct ImageRef(String);

impl ImageRef {
    /// Wrap a URI.
    pub fn new(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    /// Build a `data:` URI from base64 payload and mime type.
    ///
    /// # Examples
    ///
    /// ```
    /// use huntchapter_core::ImageRef;
    ///
    /// let image = ImageRef::from_base64("image/png", "iVBORw0KGgo=");
    /// assert_eq!(image.as_str(), "data:image/png;base64,iVBORw0KGgo=");
    /// assert!(image.is_data_uri());
    /// ```
    pub fn from_base64(mime_type: &str, data: &str) -> Self {
        Self(format!("data:{};base64,{}", mime_type, data))
    }

    /// The underlying URI.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the image is inlined rather than linked.
    pub fn is_data_uri(&self) -> bool {
        self.0.starts_with("data:")
    }
}

/// Prompt handed to an image backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagePrompt {
    /// Full textual prompt
    pub text: String,
    /// Seed kept stable for a session so the protagonist stays recognizable
    pub seed: u32,
}

/// Deterministic 32-bit string hash folded into `0..100_000`.
///
/// # Examples
///
/// ```
/// use huntchapter_core::hash_seed;
///
/// assert_eq!(hash_seed(""), 0);
/// assert_eq!(hash_seed("a"), 97);
/// assert_eq!(hash_seed("Fantasy"), hash_seed("Fantasy"));
/// assert!(hash_seed("a much longer key with many characters") < 100_000);
/// ```
pub fn hash_seed(key: &str) -> u32 {
    let hash = key.encode_utf16().fold(0i32, |hash, unit| {
        hash.wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(i32::from(unit))
    });
    hash.unsigned_abs() % 100_000
}
