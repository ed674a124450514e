//! Review lifecycle for a piece of content
//!
//! unclassified -> classified -> awaiting human decision -> case recorded.
//! Each state is a type: raw content, a [`ClassificationResult`], a
//! [`PendingReview`] and finally a [`TrainingCase`]. A case can only be
//! produced by resolving a pending review, which in turn only comes out of
//! the classifier, so no case skips the classified state. Dropping a pending
//! review leaves nothing to roll back.

use crate::classifier::ClassificationResult;
use crate::error::ReviewError;
use crate::training::{AiClassification, HumanDecision, TrainingCase};

/// A classified item waiting for a moderator
#[derive(Debug, Clone)]
pub struct PendingReview {
    content: String,
    content_type: String,
    classification: ClassificationResult,
}

impl PendingReview {
    pub(crate) fn new(content: &str, content_type: &str, classification: ClassificationResult) -> Self {
        Self {
            content: content.to_string(),
            content_type: content_type.to_string(),
            classification,
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn classification(&self) -> &ClassificationResult {
        &self.classification
    }

    /// Moderator confirmed the AI's tier and category as-is.
    ///
    /// A fail-safe result is not a prediction, so it cannot be confirmed;
    /// the moderator has to supply an explicit decision via [`resolve`](Self::resolve).
    pub fn confirm(self) -> Result<TrainingCase, ReviewError> {
        if self.classification.is_fail_safe() {
            return Err(ReviewError::NothingToConfirm);
        }
        let decision = HumanDecision::new(
            self.classification.priority,
            self.classification.category,
            self.classification.action_required,
        );
        Ok(self.resolve(decision))
    }

    /// Record the moderator's decision, producing the training case
    pub fn resolve(self, decision: HumanDecision) -> TrainingCase {
        let ai = AiClassification::from(&self.classification);
        TrainingCase::new(self.content, self.content_type, ai, decision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::{Action, Category, Priority};
    use crate::training::Outcome;

    fn pending(priority: Priority) -> PendingReview {
        let mut result = ClassificationResult::fail_safe();
        result.priority = priority;
        result.confidence = 0.5;
        result.reason = "test".to_string();
        PendingReview::new("some text", "discussion", result)
    }

    #[test]
    fn test_resolve_carries_both_sides() {
        let case = pending(Priority::Medium).resolve(HumanDecision::new(
            Priority::High,
            Category::HarassmentBullying,
            Action::Hide,
        ));
        assert_eq!(case.content(), "some text");
        assert_eq!(case.content_type(), "discussion");
        assert_eq!(case.ai_classification().priority, Priority::Medium);
        assert_eq!(case.ai_classification().confidence, 0.5);
        assert_eq!(case.outcome(), Outcome::UnderClassified);
    }

    #[test]
    fn test_confirm_is_correct() {
        let case = pending(Priority::Low).confirm().unwrap();
        assert_eq!(case.outcome(), Outcome::Correct);
        assert_eq!(case.human_decision().action, Action::Review);
    }

    #[test]
    fn test_fail_safe_cannot_be_confirmed() {
        let review = PendingReview::new("anything", "post", ClassificationResult::fail_safe());
        assert!(matches!(review.clone().confirm(), Err(ReviewError::NothingToConfirm)));

        // An explicit decision is still accepted
        let case = review.resolve(HumanDecision::new(Priority::Critical, Category::SexualContent, Action::Remove));
        assert_eq!(case.outcome(), Outcome::UnderClassified);
        assert_eq!(case.ai_classification().confidence, 0.0);
    }
}
