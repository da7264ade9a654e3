//! Pull a JSON object out of raw model output.
//!
//! Models wrap JSON in markdown fences or surround it with chatter; this
//! module finds the payload before it reaches the validator.

use huntchapter_error::{ValidationError, ValidationErrorKind};

/// Extract the JSON text from a response that may contain markdown or extra text.
///
/// Strategies, in order:
/// 1. Markdown code blocks: ```json ... ``` or ``` ... ```
/// 2. The first balanced `{ ... }` object
///
/// # Examples
///
/// ```
/// use huntchapter_story::extract_json;
///
/// let response = "Sure! ```json\n{\"narration\": \"Rain.\"}\n```";
/// assert_eq!(extract_json(response).unwrap(), "{\"narration\": \"Rain.\"}");
/// ```
pub fn extract_json(response: &str) -> Option<String> {
    if let Some(block) = extract_from_code_block(response)
        && block.starts_with('{')
    {
        return Some(block);
    }
    extract_balanced(response, '{', '}')
}

/// Parse the JSON object embedded in `response`.
///
/// # Errors
///
/// Returns a `$` field [`ValidationError`] when no JSON can be found or parsed.
pub fn parse_json(response: &str) -> Result<serde_json::Value, ValidationError> {
    let Some(json) = extract_json(response) else {
        tracing::debug!(
            response_length = response.len(),
            "No JSON object found in model output"
        );
        return Err(ValidationError::new(
            "$",
            ValidationErrorKind::NotJson("no JSON object found".to_string()),
        ));
    };
    serde_json::from_str(&json)
        .map_err(|e| ValidationError::new("$", ValidationErrorKind::NotJson(e.to_string())))
}

/// Content of the first markdown code block, with or without a language tag.
fn extract_from_code_block(response: &str) -> Option<String> {
    let start = response.find("```")?;
    let after_fence = start + 3;
    // Skip the language tag, if any
    let content_start = response[after_fence..]
        .find('\n')
        .map(|n| after_fence + n + 1)
        .unwrap_or(after_fence);
    let content = match response[content_start..].find("```") {
        Some(end) => &response[content_start..content_start + end],
        // Truncated response: keep everything after the fence
        None => &response[content_start..],
    };
    Some(content.trim().to_string())
}

/// Content between the first `open` and its matching `close`, string-aware.
fn extract_balanced(response: &str, open: char, close: char) -> Option<String> {
    let start = response.find(open)?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, ch) in response[start..].char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }
        match ch {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            c if c == open && !in_string => depth += 1,
            c if c == close && !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(response[start..start + i + 1].to_string());
                }
            }
            _ => {}
        }
    }
    None
}
