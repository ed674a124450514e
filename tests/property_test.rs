//! Property tests: whatever the model returns, results stay inside the taxonomy

mod common;

use std::sync::Arc;

use common::ScriptedLlm;
use moderation_ai::classifier::parse_classification;
use moderation_ai::{Classifier, MemoryTrainingStore, Priority};
use proptest::prelude::*;
use serde_json::{json, Value};

fn in_bounds(confidence: f64) -> bool {
    (0.0..=1.0).contains(&confidence)
}

fn confidence_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<f64>().prop_map(|v| json!(v)),
        any::<i64>().prop_map(|v| json!(v)),
        "-?[0-9]{1,4}(\\.[0-9]{1,3})?%?".prop_map(Value::String),
        "(NaN|inf|-inf|high|low|)".prop_map(Value::String),
        Just(Value::Null),
        Just(json!([0.5])),
    ]
}

fn label_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        "(low|medium|high|critical|LOW| High |urgent|severe|)".prop_map(Value::String),
        "[a-z_ -]{0,16}".prop_map(Value::String),
        any::<i32>().prop_map(|v| json!(v)),
        Just(Value::Null),
    ]
}

/// Mostly-shaped model answers with hostile field values
fn malformed_answer() -> impl Strategy<Value = String> {
    (
        label_value(),
        label_value(),
        label_value(),
        confidence_value(),
        prop_oneof![Just(json!(true)), Just(json!(false)), Just(json!("yes")), Just(Value::Null)],
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(|(priority, category, action, confidence, flagged, fenced, truncate)| {
            let body = json!({
                "flagged": flagged,
                "priority": priority,
                "category": category,
                "confidence": confidence,
                "actionRequired": action,
            })
            .to_string();
            let body = if truncate { body[..body.len() / 2].to_string() } else { body };
            if fenced {
                format!("```json\n{}\n```", body)
            } else {
                body
            }
        })
}

proptest! {
    #[test]
    fn parsed_results_respect_bounds(raw in malformed_answer()) {
        if let Ok(result) = parse_classification(&raw) {
            prop_assert!(Priority::all().contains(&result.priority));
            prop_assert!(in_bounds(result.confidence), "confidence {} out of bounds", result.confidence);
        }
    }

    #[test]
    fn arbitrary_text_never_panics_the_parser(raw in ".{0,200}") {
        if let Ok(result) = parse_classification(&raw) {
            prop_assert!(in_bounds(result.confidence));
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn classifier_output_respects_bounds(raw in malformed_answer()) {
        let llm = ScriptedLlm::new().on("", raw);
        let classifier = Classifier::new(Arc::new(llm), Arc::new(MemoryTrainingStore::new()));

        let result = tokio_test::block_on(classifier.classify("some post", "post"));
        prop_assert!(Priority::all().contains(&result.priority));
        prop_assert!(in_bounds(result.confidence), "confidence {} out of bounds", result.confidence);
        if result.is_fail_safe() {
            prop_assert_eq!(result.priority, Priority::Medium);
        }
    }
}
