//! Moderation AI - content classification with a moderator feedback loop
//!
//! - Four-tier moderation taxonomy (critical / high / medium / low)
//! - LLM-backed classifier that never fails open
//! - Append-only training log of moderator corrections
//! - Lessons from recent corrections fed back into every prompt
//! - Accuracy analysis and a labelled self-test corpus
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use moderation_ai::{Classifier, Config, JsonlTrainingStore, OpenRouterClient};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let store = Arc::new(JsonlTrainingStore::open(config.store.resolved_path()?).await?);
//!     let llm = Arc::new(OpenRouterClient::from_config(&config)?);
//!     let classifier = Classifier::new(llm, store);
//!     let result = classifier.classify("Looking for a hookup after church", "post").await;
//!     println!("{} / {}", result.priority, result.category);
//!     Ok(())
//! }
//! ```

pub mod taxonomy;
pub mod error;
pub mod training;
pub mod context;
pub mod llm;
pub mod classifier;
pub mod review;
pub mod feedback;
pub mod harness;
pub mod config;
pub mod keyring;
pub mod cli;

pub use taxonomy::{Action, Category, Priority, TierDefinition};

pub use training::{
    AiClassification,
    HumanDecision,
    JsonlTrainingStore,
    MemoryTrainingStore,
    Outcome,
    TrainingCase,
    TrainingStore,
};

pub use classifier::{ClassificationResult, Classifier, ClassifierSettings};
pub use context::ContextBuilder;
pub use error::{ReviewError, StoreError};
pub use feedback::{FeedbackAnalyzer, FeedbackReport, PatternCount};
pub use harness::{HarnessReport, TestHarness};
pub use llm::{CompletionRequest, CompletionService, OpenRouterClient};
pub use review::PendingReview;
pub use config::Config;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
