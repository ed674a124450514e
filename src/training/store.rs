//! Training store - append-only log of classification-vs-human-decision cases
//!
//! Readers work on immutable snapshots. An append builds the next snapshot and
//! swaps it in, so a reader sees either the log before the case or the log
//! with the complete case, never anything in between.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use super::case::TrainingCase;
use crate::error::StoreError;

/// Append-only source of truth for learning
#[async_trait]
pub trait TrainingStore: Send + Sync {
    /// Append a case. No deduplication: identical content appended twice is
    /// stored twice.
    async fn append(&self, case: TrainingCase) -> Result<(), StoreError>;

    /// Current immutable view of every case, oldest first
    async fn snapshot(&self) -> Arc<Vec<TrainingCase>>;

    /// The `n` most recently appended cases, most recent last
    async fn recent(&self, n: usize) -> Vec<TrainingCase> {
        let cases = self.snapshot().await;
        let start = cases.len().saturating_sub(n);
        cases[start..].to_vec()
    }

    /// Full copy of the log
    async fn all(&self) -> Vec<TrainingCase> {
        self.snapshot().await.as_ref().clone()
    }

    async fn len(&self) -> usize {
        self.snapshot().await.len()
    }

    async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// Copy-on-write publication point shared by the store implementations
#[derive(Debug, Default)]
pub(crate) struct Published {
    cases: RwLock<Arc<Vec<TrainingCase>>>,
}

impl Published {
    pub(crate) fn with_cases(cases: Vec<TrainingCase>) -> Self {
        Self {
            cases: RwLock::new(Arc::new(cases)),
        }
    }

    /// Make a fully built case visible to readers
    pub(crate) async fn publish(&self, case: TrainingCase) -> usize {
        let mut guard = self.cases.write().await;
        // Clones the vector only while an older snapshot is still held
        Arc::make_mut(&mut guard).push(case);
        guard.len()
    }

    pub(crate) async fn current(&self) -> Arc<Vec<TrainingCase>> {
        Arc::clone(&*self.cases.read().await)
    }
}

/// In-process store, constructed once per service instance
#[derive(Debug, Default)]
pub struct MemoryTrainingStore {
    published: Published,
}

impl MemoryTrainingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a store with existing cases, oldest first
    pub fn with_cases(cases: Vec<TrainingCase>) -> Self {
        Self {
            published: Published::with_cases(cases),
        }
    }
}

#[async_trait]
impl TrainingStore for MemoryTrainingStore {
    async fn append(&self, case: TrainingCase) -> Result<(), StoreError> {
        let id = case.id();
        let total = self.published.publish(case).await;
        debug!("Appended training case {} ({} total)", id, total);
        Ok(())
    }

    async fn snapshot(&self) -> Arc<Vec<TrainingCase>> {
        self.published.current().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::{Action, Category, Priority};
    use crate::training::case::{AiClassification, HumanDecision};

    fn case(content: &str, ai: Priority, human: Priority) -> TrainingCase {
        TrainingCase::new(
            content,
            "post",
            AiClassification {
                priority: ai,
                category: Category::Other,
                confidence: 0.7,
            },
            HumanDecision::new(human, Category::Other, Action::Review),
        )
    }

    #[tokio::test]
    async fn test_recent_is_chronological_and_bounded() {
        let store = MemoryTrainingStore::new();
        for i in 0..5 {
            store.append(case(&format!("post {}", i), Priority::Low, Priority::Low)).await.unwrap();
        }

        let recent = store.recent(3).await;
        let contents: Vec<&str> = recent.iter().map(|c| c.content()).collect();
        assert_eq!(contents, vec!["post 2", "post 3", "post 4"]);

        assert_eq!(store.recent(50).await.len(), 5);
        assert!(store.recent(0).await.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_content_is_not_deduplicated() {
        let store = MemoryTrainingStore::new();
        store.append(case("same words", Priority::Low, Priority::Low)).await.unwrap();
        store.append(case("same words", Priority::Low, Priority::High)).await.unwrap();

        let all = store.all().await;
        assert_eq!(all.len(), 2);
        assert_ne!(all[0].outcome(), all[1].outcome());
        assert_ne!(all[0].id(), all[1].id());
    }

    #[tokio::test]
    async fn test_snapshot_is_unaffected_by_later_appends() {
        let store = MemoryTrainingStore::new();
        store.append(case("first", Priority::Low, Priority::Low)).await.unwrap();

        let before = store.snapshot().await;
        store.append(case("second", Priority::Low, Priority::Low)).await.unwrap();

        assert_eq!(before.len(), 1);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_concurrent_appends_are_all_kept() {
        let store = Arc::new(MemoryTrainingStore::new());
        let mut handles = Vec::new();
        for i in 0..32 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.append(case(&format!("c{}", i), Priority::Medium, Priority::High)).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }
        assert_eq!(store.len().await, 32);
    }
}
