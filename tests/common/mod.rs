//! Shared fixtures for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use moderation_ai::{CompletionRequest, CompletionService};

/// Completion service that answers by matching content in the user message
pub struct ScriptedLlm {
    rules: Vec<(String, String)>,
    fallback: String,
    calls: AtomicUsize,
    system_prompts: Mutex<Vec<String>>,
}

impl ScriptedLlm {
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            fallback: verdict(false, "low", "other", "none", 0.5),
            calls: AtomicUsize::new(0),
            system_prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn on(mut self, needle: &str, response: impl Into<String>) -> Self {
        self.rules.push((needle.to_string(), response.into()));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_system_prompt(&self) -> Option<String> {
        self.system_prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl CompletionService for ScriptedLlm {
    async fn complete(&self, request: CompletionRequest) -> anyhow::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.system_prompts.lock().unwrap().push(request.system_prompt.clone());

        let response = self
            .rules
            .iter()
            .find(|(needle, _)| request.user_message.contains(needle.as_str()))
            .map(|(_, response)| response.clone())
            .unwrap_or_else(|| self.fallback.clone());
        Ok(response)
    }
}

/// A well-formed model answer, wrapped in a json code fence
pub fn verdict(flagged: bool, priority: &str, category: &str, action: &str, confidence: f64) -> String {
    let violations: Vec<&str> = if flagged { vec![category] } else { Vec::new() };
    let reason = format!("scripted {} verdict", priority);
    format!(
        "```json\n{}\n```",
        serde_json::json!({
            "flagged": flagged,
            "priority": priority,
            "category": category,
            "violations": violations,
            "reason": reason,
            "confidence": confidence,
            "actionRequired": action,
            "learningNote": "",
        })
    )
}
