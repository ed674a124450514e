//! Parsing and sanitizing the model's raw answer
//!
//! Missing or unusable required fields mean the answer cannot be trusted and
//! the caller falls back to the fail-safe result. Out-of-range values in fields
//! that are present are repaired locally.

use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;
use tracing::debug;

use super::{ClassificationResult, FailSafeCause};
use crate::taxonomy::{Action, Category, Priority};

/// A fence wrapping the whole answer; the body is greedy so backticks inside
/// JSON strings stay part of it
static WRAPPING_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\A```[A-Za-z0-9_-]*[ \t]*\r?\n?(.*)```\z").expect("valid fence regex")
});

/// First fenced block inside surrounding prose
static EMBEDDED_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```[A-Za-z0-9_-]*[ \t]*\r?\n(.*?)\n[ \t]*```").expect("valid fence regex")
});

/// Remove Markdown code fences (```json ... ``` or ``` ... ```) around the answer
pub fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();

    if trimmed.starts_with("```") {
        if let Some(inner) = WRAPPING_FENCE.captures(trimmed).and_then(|c| c.get(1)) {
            return inner.as_str().trim();
        }
        // An opening fence without a closing one
        let rest = &trimmed[3..];
        let rest = rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        return rest.trim();
    }

    // A bare JSON answer is never searched for fences
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        return trimmed;
    }

    match EMBEDDED_FENCE.captures(trimmed).and_then(|c| c.get(1)) {
        Some(inner) => inner.as_str().trim(),
        None => trimmed,
    }
}

/// Parse the model's raw text into a sanitized result
pub fn parse_classification(raw: &str) -> Result<ClassificationResult, FailSafeCause> {
    let body = strip_code_fences(raw);
    let value: Value = serde_json::from_str(body).map_err(|e| FailSafeCause::Parse(e.to_string()))?;
    let object = value
        .as_object()
        .ok_or_else(|| FailSafeCause::Parse("response is not a JSON object".to_string()))?;

    let flagged = required(object, "flagged")?;
    let flagged = as_bool(flagged).ok_or(FailSafeCause::MissingField("flagged"))?;

    let priority = match required(object, "priority")?.as_str().and_then(Priority::parse) {
        Some(p) => p,
        None => {
            debug!("Coercing unrecognized priority {:?} to medium", object.get("priority"));
            Priority::Medium
        }
    };

    let category = match required(object, "category")?.as_str().and_then(Category::parse) {
        Some(c) => c,
        None => {
            debug!("Coercing unrecognized category {:?} to other", object.get("category"));
            Category::Other
        }
    };

    let confidence = clamp_confidence(required(object, "confidence")?);

    let mut action_required = match required(object, "actionRequired")?.as_str().and_then(Action::parse) {
        Some(a) => a,
        None => {
            debug!("Coercing unrecognized action {:?} to review", object.get("actionRequired"));
            Action::Review
        }
    };
    // Flagged content is never waved through
    if flagged && action_required == Action::None {
        action_required = Action::Review;
    }

    Ok(ClassificationResult {
        flagged,
        priority,
        category,
        violations: violations(object.get("violations")),
        reason: text(object.get("reason")),
        confidence,
        action_required,
        learning_note: text(object.get("learningNote")),
    })
}

fn required<'a>(object: &'a Map<String, Value>, field: &'static str) -> Result<&'a Value, FailSafeCause> {
    match object.get(field) {
        Some(Value::Null) | None => Err(FailSafeCause::MissingField(field)),
        Some(value) => Ok(value),
    }
}

fn as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "yes" => Some(true),
            "false" | "no" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Numbers and numeric strings, clamped to [0, 1]; anything else is 0
fn clamp_confidence(value: &Value) -> f64 {
    let raw = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').parse::<f64>().ok().map(|v| {
            if s.trim().ends_with('%') {
                v / 100.0
            } else {
                v
            }
        }),
        _ => None,
    };
    match raw {
        Some(v) if v.is_finite() => v.clamp(0.0, 1.0),
        _ => 0.0,
    }
}

fn violations(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
                Value::String(_) | Value::Null => None,
                other => Some(other.to_string()),
            })
            .collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.trim().to_string()],
        _ => Vec::new(),
    }
}

fn text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"{
        "flagged": true,
        "priority": "critical",
        "category": "sexual_content",
        "violations": ["solicitation"],
        "reason": "Hookup request",
        "confidence": 0.95,
        "actionRequired": "remove",
        "learningNote": ""
    }"#;

    #[test]
    fn test_strip_json_fence() {
        let raw = format!("```json\n{}\n```", VALID);
        assert_eq!(strip_code_fences(&raw), VALID.trim());
    }

    #[test]
    fn test_strip_bare_fence_and_surrounding_text() {
        assert_eq!(strip_code_fences("```\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("Here you go:\n```json\n{}\n```\nThanks"), "{}");
        assert_eq!(strip_code_fences("```json\n{}"), "{}");
        assert_eq!(strip_code_fences("  {}  "), "{}");
    }

    #[test]
    fn test_backticks_inside_strings_survive() {
        let raw = r#"{"flagged": true, "priority": "critical", "category": "sexual_content",
                      "reason": "posts ```code``` blocks", "confidence": 0.9, "actionRequired": "remove"}"#;
        let result = parse_classification(raw).unwrap();
        assert_eq!(result.priority, Priority::Critical);
        assert_eq!(result.reason, "posts ```code``` blocks");

        let fenced = format!("```json\n{}\n```", raw);
        let result = parse_classification(&fenced).unwrap();
        assert_eq!(result.priority, Priority::Critical);
        assert_eq!(result.action_required, Action::Remove);
        assert_eq!(result.reason, "posts ```code``` blocks");
    }

    #[test]
    fn test_parse_valid_response() {
        let result = parse_classification(VALID).unwrap();
        assert!(result.flagged);
        assert_eq!(result.priority, Priority::Critical);
        assert_eq!(result.category, Category::SexualContent);
        assert_eq!(result.violations, vec!["solicitation".to_string()]);
        assert_eq!(result.action_required, Action::Remove);
        assert_eq!(result.confidence, 0.95);
    }

    #[test]
    fn test_invalid_enums_are_coerced() {
        let raw = r#"{"flagged": true, "priority": "severe", "category": "violence",
                      "confidence": 4.2, "actionRequired": "ban"}"#;
        let result = parse_classification(raw).unwrap();
        assert_eq!(result.priority, Priority::Medium);
        assert_eq!(result.category, Category::Other);
        assert_eq!(result.action_required, Action::Review);
        assert_eq!(result.confidence, 1.0);
        assert!(result.violations.is_empty());
        assert_eq!(result.reason, "");
    }

    #[test]
    fn test_confidence_variants() {
        assert_eq!(clamp_confidence(&serde_json::json!(-3)), 0.0);
        assert_eq!(clamp_confidence(&serde_json::json!("0.4")), 0.4);
        assert_eq!(clamp_confidence(&serde_json::json!("85%")), 0.85);
        assert_eq!(clamp_confidence(&serde_json::json!("high")), 0.0);
        assert_eq!(clamp_confidence(&serde_json::json!([1])), 0.0);
    }

    #[test]
    fn test_missing_field_fails() {
        let raw = r#"{"flagged": false, "priority": "low", "category": "other", "actionRequired": "none"}"#;
        assert_eq!(
            parse_classification(raw).unwrap_err(),
            FailSafeCause::MissingField("confidence")
        );
        let raw = r#"{"flagged": null, "priority": "low", "category": "other", "confidence": 1, "actionRequired": "none"}"#;
        assert_eq!(
            parse_classification(raw).unwrap_err(),
            FailSafeCause::MissingField("flagged")
        );
    }

    #[test]
    fn test_non_object_and_garbage_fail() {
        assert!(matches!(parse_classification("[1,2]"), Err(FailSafeCause::Parse(_))));
        assert!(matches!(parse_classification("I think it's fine"), Err(FailSafeCause::Parse(_))));
        assert!(matches!(parse_classification(""), Err(FailSafeCause::Parse(_))));
    }

    #[test]
    fn test_flagged_content_never_gets_no_action() {
        let raw = r#"{"flagged": "yes", "priority": "high", "category": "harassment_bullying",
                      "confidence": 0.7, "actionRequired": "none", "violations": "insult"}"#;
        let result = parse_classification(raw).unwrap();
        assert!(result.flagged);
        assert_eq!(result.action_required, Action::Review);
        assert_eq!(result.violations, vec!["insult".to_string()]);
    }
}
