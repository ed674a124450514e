//! Content classifier
//!
//! Builds the prompt (taxonomy + lessons from recent corrections + content),
//! calls the external completion service and sanitizes the answer. Any
//! failure along the way resolves to [`ClassificationResult::fail_safe`]:
//! content is never approved because of an infrastructure fault.

pub mod prompt;
pub mod response;

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::context::ContextBuilder;
use crate::llm::CompletionService;
use crate::review::PendingReview;
use crate::taxonomy::{Action, Category, Priority};
use crate::training::TrainingStore;

pub use prompt::PromptBuilder;
pub use response::{parse_classification, strip_code_fences};

/// Reason text carried by the fail-safe result
pub const ANALYSIS_FAILED: &str = "analysis_failed";

/// Structured verdict for one piece of content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationResult {
    pub flagged: bool,
    pub priority: Priority,
    pub category: Category,
    pub violations: Vec<String>,
    pub reason: String,
    /// Always within [0.0, 1.0]
    pub confidence: f64,
    pub action_required: Action,
    #[serde(default)]
    pub learning_note: String,
}

impl ClassificationResult {
    /// Conservative default used whenever no trustworthy answer exists
    pub fn fail_safe() -> Self {
        Self {
            flagged: false,
            priority: Priority::Medium,
            category: Category::Other,
            violations: Vec::new(),
            reason: ANALYSIS_FAILED.to_string(),
            confidence: 0.0,
            action_required: Action::Review,
            learning_note: String::new(),
        }
    }

    pub fn is_fail_safe(&self) -> bool {
        self.reason == ANALYSIS_FAILED && self.confidence == 0.0
    }
}

/// Why a classification fell back to the fail-safe result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailSafeCause {
    Timeout,
    Transport(String),
    Parse(String),
    MissingField(&'static str),
}

impl std::fmt::Display for FailSafeCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailSafeCause::Timeout => write!(f, "timeout"),
            FailSafeCause::Transport(msg) => write!(f, "transport: {}", msg),
            FailSafeCause::Parse(msg) => write!(f, "parse: {}", msg),
            FailSafeCause::MissingField(field) => write!(f, "missing field: {}", field),
        }
    }
}

/// Tunables for the classification call
#[derive(Debug, Clone)]
pub struct ClassifierSettings {
    pub temperature: f32,
    pub max_tokens: Option<u32>,
    pub timeout: Duration,
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            temperature: prompt::DEFAULT_TEMPERATURE,
            max_tokens: Some(prompt::DEFAULT_MAX_TOKENS),
            timeout: Duration::from_secs(30),
        }
    }
}

impl ClassifierSettings {
    pub fn from_config(config: &crate::config::Config) -> Self {
        Self {
            temperature: config.classifier.temperature,
            max_tokens: Some(config.llm.max_tokens),
            timeout: Duration::from_secs(config.classifier.timeout_secs),
        }
    }
}

/// Stateless classifier; each call snapshots the training store's recent cases
#[derive(Clone)]
pub struct Classifier {
    llm: Arc<dyn CompletionService>,
    store: Arc<dyn TrainingStore>,
    context: ContextBuilder,
    settings: ClassifierSettings,
}

impl Classifier {
    pub fn new(llm: Arc<dyn CompletionService>, store: Arc<dyn TrainingStore>) -> Self {
        Self {
            llm,
            store,
            context: ContextBuilder::default(),
            settings: ClassifierSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: ClassifierSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_context_builder(mut self, context: ContextBuilder) -> Self {
        self.context = context;
        self
    }

    pub fn settings(&self) -> &ClassifierSettings {
        &self.settings
    }

    /// The prompt builder for the current store snapshot
    pub async fn prompt_builder(&self) -> PromptBuilder {
        let lessons = self.context.build_from_store(self.store.as_ref()).await;
        PromptBuilder::new()
            .lessons(lessons)
            .temperature(self.settings.temperature)
            .max_tokens(self.settings.max_tokens)
    }

    /// Classify one piece of content. Never fails; see the module docs.
    pub async fn classify(&self, content: &str, content_type: &str) -> ClassificationResult {
        match self.try_classify(content, content_type).await {
            Ok(result) => {
                info!(
                    "Classified {} as {} / {} (confidence {:.2}, action {})",
                    content_type, result.priority, result.category, result.confidence, result.action_required
                );
                result
            }
            Err(cause) => {
                warn!("Classification of {} fell back to fail-safe: {}", content_type, cause);
                ClassificationResult::fail_safe()
            }
        }
    }

    /// Classify and hold the result for a moderator's decision
    pub async fn classify_for_review(&self, content: &str, content_type: &str) -> PendingReview {
        let result = self.classify(content, content_type).await;
        PendingReview::new(content, content_type, result)
    }

    async fn try_classify(&self, content: &str, content_type: &str) -> Result<ClassificationResult, FailSafeCause> {
        let request = self.prompt_builder().await.build(content, content_type);
        debug!(
            "Classification request: {} system chars, {} user chars",
            request.system_prompt.len(),
            request.user_message.len()
        );

        let raw = match tokio::time::timeout(self.settings.timeout, self.llm.complete(request)).await {
            Err(_) => return Err(FailSafeCause::Timeout),
            Ok(Err(e)) => return Err(FailSafeCause::Transport(format!("{:#}", e))),
            Ok(Ok(raw)) => raw,
        };

        parse_classification(&raw)
    }
}
