//! Training case - one AI prediction paired with the moderator's decision

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::classifier::ClassificationResult;
use crate::taxonomy::{Action, Category, Priority};

/// Snapshot of what the classifier produced
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiClassification {
    pub priority: Priority,
    pub category: Category,
    pub confidence: f64,
}

impl From<&ClassificationResult> for AiClassification {
    fn from(result: &ClassificationResult) -> Self {
        Self {
            priority: result.priority,
            category: result.category,
            confidence: result.confidence,
        }
    }
}

/// Ground truth supplied by the moderation workflow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HumanDecision {
    pub final_priority: Priority,
    pub final_category: Category,
    pub action: Action,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moderator_notes: Option<String>,
}

impl HumanDecision {
    pub fn new(final_priority: Priority, final_category: Category, action: Action) -> Self {
        Self {
            final_priority,
            final_category,
            action,
            moderator_notes: None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        let notes = notes.into();
        self.moderator_notes = if notes.trim().is_empty() { None } else { Some(notes) };
        self
    }
}

/// How the AI priority compared with the moderator's
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Correct,
    UnderClassified,
    OverClassified,
}

impl Outcome {
    /// Compare tiers only; a category disagreement alone still counts as correct
    pub fn derive(ai: Priority, human: Priority) -> Self {
        match ai.cmp(&human) {
            std::cmp::Ordering::Less => Outcome::UnderClassified,
            std::cmp::Ordering::Greater => Outcome::OverClassified,
            std::cmp::Ordering::Equal => Outcome::Correct,
        }
    }

    pub fn is_correct(&self) -> bool {
        matches!(self, Outcome::Correct)
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Correct => write!(f, "correct"),
            Outcome::UnderClassified => write!(f, "under_classified"),
            Outcome::OverClassified => write!(f, "over_classified"),
        }
    }
}

/// A recorded (prediction, correction) pair. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingCase {
    id: Uuid,
    content: String,
    content_type: String,
    ai_classification: AiClassification,
    human_decision: HumanDecision,
    outcome: Outcome,
    timestamp: DateTime<Utc>,
}

impl TrainingCase {
    /// Build a case; the outcome is derived, never supplied
    pub fn new(
        content: impl Into<String>,
        content_type: impl Into<String>,
        ai_classification: AiClassification,
        human_decision: HumanDecision,
    ) -> Self {
        let outcome = Outcome::derive(ai_classification.priority, human_decision.final_priority);
        Self {
            id: Uuid::new_v4(),
            content: content.into(),
            content_type: content_type.into(),
            ai_classification,
            human_decision,
            outcome,
            timestamp: Utc::now(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn ai_classification(&self) -> &AiClassification {
        &self.ai_classification
    }

    pub fn human_decision(&self) -> &HumanDecision {
        &self.human_decision
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Pattern key used for misclassification mining, e.g. "medium -> high"
    pub fn pattern(&self) -> String {
        format!(
            "{} -> {}",
            self.ai_classification.priority, self.human_decision.final_priority
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ai(priority: Priority) -> AiClassification {
        AiClassification {
            priority,
            category: Category::Other,
            confidence: 0.5,
        }
    }

    #[test]
    fn test_outcome_follows_priority_ordering() {
        assert_eq!(Outcome::derive(Priority::Medium, Priority::High), Outcome::UnderClassified);
        assert_eq!(Outcome::derive(Priority::Critical, Priority::Low), Outcome::OverClassified);
        assert_eq!(Outcome::derive(Priority::Low, Priority::Low), Outcome::Correct);
    }

    #[test]
    fn test_category_mismatch_alone_is_correct() {
        let decision = HumanDecision::new(Priority::Medium, Category::Spam, Action::Review);
        let case = TrainingCase::new("buy now", "post", ai(Priority::Medium), decision);
        assert_eq!(case.outcome(), Outcome::Correct);
    }

    #[test]
    fn test_case_serializes_camel_case() {
        let decision = HumanDecision::new(Priority::High, Category::HarassmentBullying, Action::Hide)
            .with_notes("direct insult");
        let case = TrainingCase::new("you're pathetic", "comment", ai(Priority::Low), decision);
        let json = serde_json::to_value(&case).unwrap();

        assert_eq!(json["contentType"], "comment");
        assert_eq!(json["aiClassification"]["priority"], "low");
        assert_eq!(json["humanDecision"]["finalPriority"], "high");
        assert_eq!(json["humanDecision"]["moderatorNotes"], "direct insult");
        assert_eq!(json["outcome"], "under_classified");
        assert_eq!(case.pattern(), "low -> high");
    }

    #[test]
    fn test_blank_notes_are_dropped() {
        let decision = HumanDecision::new(Priority::Low, Category::Other, Action::None).with_notes("   ");
        assert!(decision.moderator_notes.is_none());
    }
}
