//! Shape contract of generated scenes.
//!
//! A raw generation result is accepted only if it has exactly the shape
//! required by the role of the position being generated. Accepted payloads
//! are normalized (strings trimmed, camelCase keys folded) into
//! [`SceneContent`].

use huntchapter_core::{Challenge, ChoiceMarker, Outcome, SceneBody, SceneContent, SceneRole};
use huntchapter_error::{ValidationError, ValidationErrorKind};
use serde_json::{Map, Value};

/// Number of options offered by a normal scene.
pub const OPTION_COUNT: usize = 3;

/// Fewest answers a challenge may offer.
pub const MIN_CHALLENGE_CHOICES: usize = 2;

/// Most answers a challenge may offer.
pub const MAX_CHALLENGE_CHOICES: usize = 4;

type Fields = Map<String, Value>;

/// Check `raw` against the shape required for `role` and normalize it.
///
/// Absent keys and `null` are equivalent; an empty array counts as absent
/// when checking for fields a role forbids.
///
/// # Errors
///
/// Returns the first violation found, naming the offending field.
///
/// # Examples
///
/// ```
/// use huntchapter_core::SceneRole;
/// use huntchapter_story::validate;
/// use serde_json::json;
///
/// let raw = json!({
///     "narration": "  The gate creaks open.  ",
///     "options": ["Enter", "Wait", "Flee"],
///     "status": "ongoing"
/// });
/// let content = validate(&raw, SceneRole::Normal).unwrap();
/// assert_eq!(content.narration, "The gate creaks open.");
///
/// assert!(validate(&raw, SceneRole::Ending).is_err());
/// ```
pub fn validate(raw: &Value, role: SceneRole) -> Result<SceneContent, ValidationError> {
    let fields = raw
        .as_object()
        .ok_or_else(|| ValidationError::new("$", ValidationErrorKind::WrongType("an object")))?;

    let narration = required_text(fields, "narration")?;
    if narration.starts_with(ChoiceMarker::PREFIX) {
        return Err(ValidationError::new(
            "narration",
            ValidationErrorKind::InvalidValue("starts with the reserved choice prefix".to_string()),
        ));
    }

    let body = match role {
        SceneRole::Normal => normal_body(fields)?,
        SceneRole::Challenge => challenge_body(fields)?,
        SceneRole::Ending => ending_body(fields)?,
    };

    Ok(SceneContent { narration, body })
}

fn normal_body(fields: &Fields) -> Result<SceneBody, ValidationError> {
    forbid(fields, "challenge", "normal")?;
    reject_terminal_status(fields, "normal")?;

    let options = text_list(fields, "options")?;
    let options: [String; OPTION_COUNT] = options.try_into().map_err(|options: Vec<String>| {
        ValidationError::new(
            "options",
            ValidationErrorKind::WrongCount {
                expected: "exactly 3",
                found: options.len(),
            },
        )
    })?;
    Ok(SceneBody::Normal { options })
}

fn challenge_body(fields: &Fields) -> Result<SceneBody, ValidationError> {
    forbid(fields, "options", "challenge")?;
    reject_terminal_status(fields, "challenge")?;

    let challenge = match fields.get("challenge") {
        None | Some(Value::Null) => {
            return Err(ValidationError::new("challenge", ValidationErrorKind::Missing));
        }
        Some(Value::Object(challenge)) => challenge,
        Some(_) => {
            return Err(ValidationError::new(
                "challenge",
                ValidationErrorKind::WrongType("an object"),
            ));
        }
    };

    let question = required_text(challenge, "question")
        .map_err(|e| ValidationError::new(format!("challenge.{}", e.field), e.kind))?;
    let choices = text_list(challenge, "choices")
        .map_err(|e| ValidationError::new(format!("challenge.{}", e.field), e.kind))?;
    if !(MIN_CHALLENGE_CHOICES..=MAX_CHALLENGE_CHOICES).contains(&choices.len()) {
        return Err(ValidationError::new(
            "challenge.choices",
            ValidationErrorKind::WrongCount {
                expected: "2 to 4",
                found: choices.len(),
            },
        ));
    }

    let answer_index = match challenge.get("answerIndex").or_else(|| challenge.get("answer_index")) {
        None | Some(Value::Null) => None,
        Some(value) => {
            let index = value
                .as_u64()
                .and_then(|i| usize::try_from(i).ok())
                .ok_or_else(|| {
                    ValidationError::new(
                        "challenge.answerIndex",
                        ValidationErrorKind::WrongType("a non-negative integer"),
                    )
                })?;
            if index >= choices.len() {
                return Err(ValidationError::new(
                    "challenge.answerIndex",
                    ValidationErrorKind::InvalidValue(format!(
                        "{} does not name one of {} choices",
                        index,
                        choices.len()
                    )),
                ));
            }
            Some(index)
        }
    };

    Ok(SceneBody::Challenge {
        challenge: Challenge {
            question,
            choices,
            answer_index,
        },
    })
}

fn ending_body(fields: &Fields) -> Result<SceneBody, ValidationError> {
    forbid(fields, "options", "ending")?;
    forbid(fields, "challenge", "ending")?;

    let outcome = match status(fields)? {
        Some("win") => Outcome::Win,
        Some("loss") => Outcome::Loss,
        Some(other) => {
            return Err(ValidationError::new(
                "status",
                ValidationErrorKind::InvalidValue(format!("expected win or loss, got {}", other)),
            ));
        }
        None => return Err(ValidationError::new("status", ValidationErrorKind::Missing)),
    };

    let key = if fields.contains_key("endingTitle") {
        "endingTitle"
    } else {
        "ending_title"
    };
    let ending_title = match fields.get(key) {
        None | Some(Value::Null) => None,
        Some(_) => Some(required_text(fields, key)?),
    };

    Ok(SceneBody::Ending {
        outcome,
        ending_title,
    })
}

/// Trimmed, non-empty string field.
fn required_text(fields: &Fields, key: &str) -> Result<String, ValidationError> {
    match fields.get(key) {
        None | Some(Value::Null) => Err(ValidationError::new(key, ValidationErrorKind::Missing)),
        Some(Value::String(text)) => {
            let text = text.trim();
            if text.is_empty() {
                Err(ValidationError::new(key, ValidationErrorKind::Empty))
            } else {
                Ok(text.to_string())
            }
        }
        Some(_) => Err(ValidationError::new(key, ValidationErrorKind::WrongType("a string"))),
    }
}

/// Array of trimmed, non-empty strings.
fn text_list(fields: &Fields, key: &str) -> Result<Vec<String>, ValidationError> {
    let items = match fields.get(key) {
        None | Some(Value::Null) => {
            return Err(ValidationError::new(key, ValidationErrorKind::Missing));
        }
        Some(Value::Array(items)) => items,
        Some(_) => {
            return Err(ValidationError::new(key, ValidationErrorKind::WrongType("an array")));
        }
    };

    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let field = format!("{}[{}]", key, i);
            match item.as_str().map(str::trim) {
                Some("") => Err(ValidationError::new(field, ValidationErrorKind::Empty)),
                Some(text) => Ok(text.to_string()),
                None => Err(ValidationError::new(field, ValidationErrorKind::WrongType("a string"))),
            }
        })
        .collect()
}

/// Reject a field that is present for a role that does not allow it.
fn forbid(fields: &Fields, key: &str, role: &'static str) -> Result<(), ValidationError> {
    let present = match fields.get(key) {
        None | Some(Value::Null) => false,
        Some(Value::Array(items)) => !items.is_empty(),
        Some(_) => true,
    };
    if present {
        Err(ValidationError::new(key, ValidationErrorKind::Forbidden(role)))
    } else {
        Ok(())
    }
}

/// Status string, if any.
fn status(fields: &Fields) -> Result<Option<&str>, ValidationError> {
    match fields.get("status") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(status)) => Ok(Some(status.trim())),
        Some(_) => Err(ValidationError::new(
            "status",
            ValidationErrorKind::WrongType("a string"),
        )),
    }
}

/// Non-ending scenes may only carry `ongoing` (or nothing).
fn reject_terminal_status(fields: &Fields, role: &'static str) -> Result<(), ValidationError> {
    match status(fields)? {
        None | Some("ongoing") => Ok(()),
        Some("win") | Some("loss") => {
            Err(ValidationError::new("status", ValidationErrorKind::Forbidden(role)))
        }
        Some(other) => Err(ValidationError::new(
            "status",
            ValidationErrorKind::InvalidValue(format!("expected ongoing, got {}", other)),
        )),
    }
}
