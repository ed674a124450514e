//! Feedback analysis over the training log
//!
//! Measures how often the classifier agreed with moderators, mines recurring
//! "<ai> -> <human>" tier mistakes and turns both into threshold-driven
//! improvement suggestions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::training::{Outcome, TrainingCase, TrainingStore};

/// Below this accuracy the report asks for more training data
pub const ACCURACY_THRESHOLD: f64 = 0.8;

/// Share of errors in one direction that counts as a systematic bias
pub const BIAS_THRESHOLD: f64 = 0.6;

/// Number of patterns reported
pub const TOP_PATTERNS: usize = 5;

/// A recurring misclassification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternCount {
    pub pattern: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackReport {
    pub total_cases: usize,
    pub accuracy_rate: f64,
    pub common_misclassifications: Vec<PatternCount>,
    pub improvement_suggestions: Vec<String>,
    pub under_classified: usize,
    pub over_classified: usize,
    pub generated_at: DateTime<Utc>,
}

pub struct FeedbackAnalyzer {
    store: Arc<dyn TrainingStore>,
}

impl FeedbackAnalyzer {
    pub fn new(store: Arc<dyn TrainingStore>) -> Self {
        Self { store }
    }

    /// Analyze the current store snapshot
    pub async fn analyze(&self) -> FeedbackReport {
        let cases = self.store.snapshot().await;
        let report = analyze_cases(&cases);
        info!(
            "Feedback report: {} cases, accuracy {:.1}%, {} patterns",
            report.total_cases,
            report.accuracy_rate * 100.0,
            report.common_misclassifications.len()
        );
        report
    }
}

/// Pure analysis of a set of cases
pub fn analyze_cases(cases: &[TrainingCase]) -> FeedbackReport {
    let total_cases = cases.len();
    let correct = cases.iter().filter(|c| c.outcome().is_correct()).count();
    let under_classified = cases
        .iter()
        .filter(|c| c.outcome() == Outcome::UnderClassified)
        .count();
    let over_classified = total_cases - correct - under_classified;

    let accuracy_rate = if total_cases == 0 {
        0.0
    } else {
        correct as f64 / total_cases as f64
    };

    let common_misclassifications = mine_patterns(cases);
    let improvement_suggestions = suggestions(
        accuracy_rate,
        &common_misclassifications,
        under_classified,
        over_classified,
    );

    FeedbackReport {
        total_cases,
        accuracy_rate,
        common_misclassifications,
        improvement_suggestions,
        under_classified,
        over_classified,
        generated_at: Utc::now(),
    }
}

/// Top patterns by frequency; ties keep first-seen order
fn mine_patterns(cases: &[TrainingCase]) -> Vec<PatternCount> {
    let mut counts: Vec<PatternCount> = Vec::new();
    for case in cases.iter().filter(|c| !c.outcome().is_correct()) {
        let pattern = case.pattern();
        if let Some(pos) = counts.iter().position(|p| p.pattern == pattern) {
            counts[pos].count += 1;
        } else {
            counts.push(PatternCount { pattern, count: 1 });
        }
    }

    // Stable sort preserves first-seen order among equal counts
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(TOP_PATTERNS);
    counts
}

fn suggestions(
    accuracy_rate: f64,
    patterns: &[PatternCount],
    under_classified: usize,
    over_classified: usize,
) -> Vec<String> {
    let mut suggestions = Vec::new();

    if accuracy_rate < ACCURACY_THRESHOLD {
        suggestions.push("accuracy below 80% — increase training data".to_string());
    }

    if let Some(top) = patterns.first() {
        suggestions.push(format!("most common error: {}", top.pattern));
    }

    let errors = under_classified + over_classified;
    if errors > 0 {
        let under_share = under_classified as f64 / errors as f64;
        if under_share > BIAS_THRESHOLD {
            suggestions.push("AI is too lenient: most errors are under-classifications".to_string());
        } else if 1.0 - under_share > BIAS_THRESHOLD {
            suggestions.push("AI is too strict: most errors are over-classifications".to_string());
        }
    }

    suggestions
}
