//! Lessons-learned block built from recent moderator corrections
//!
//! The output is injected verbatim into the classification prompt. Only the
//! most recent window of cases is considered, so the block stays the same
//! size however large the training log grows.

use crate::training::{Outcome, TrainingCase, TrainingStore};

/// Returned when the window holds no corrections
pub const ACCURATE_SENTINEL: &str = "Recent classifications have been accurate.";

/// Number of recent cases considered
pub const DEFAULT_WINDOW: usize = 20;

/// Characters of content quoted per correction
pub const DEFAULT_EXCERPT_CHARS: usize = 100;

const HEADER: &str = "LEARNING FROM RECENT MODERATOR CORRECTIONS:";
const SEPARATOR: &str = "\n\n---\n\n";

#[derive(Debug, Clone)]
pub struct ContextBuilder {
    window: usize,
    excerpt_chars: usize,
}

impl Default for ContextBuilder {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            excerpt_chars: DEFAULT_EXCERPT_CHARS,
        }
    }
}

impl ContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }

    pub fn with_excerpt_chars(mut self, excerpt_chars: usize) -> Self {
        self.excerpt_chars = excerpt_chars;
        self
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Snapshot the store's recent cases and render them
    pub async fn build_from_store(&self, store: &dyn TrainingStore) -> String {
        let recent = store.recent(self.window).await;
        self.build(&recent)
    }

    /// Render the lessons block from cases ordered oldest first
    pub fn build(&self, cases: &[TrainingCase]) -> String {
        let start = cases.len().saturating_sub(self.window);
        let blocks: Vec<String> = cases[start..]
            .iter()
            .filter(|c| !c.outcome().is_correct())
            .map(|c| self.render_correction(c))
            .collect();

        if blocks.is_empty() {
            return ACCURATE_SENTINEL.to_string();
        }

        format!("{}\n\n{}", HEADER, blocks.join(SEPARATOR))
    }

    fn render_correction(&self, case: &TrainingCase) -> String {
        let ai = case.ai_classification();
        let human = case.human_decision();
        let lesson = match case.outcome() {
            Outcome::UnderClassified => "be more strict",
            _ => "be less strict",
        };

        let mut block = String::with_capacity(256);
        block.push_str(&format!("Content: \"{}\"\n", excerpt(case.content(), self.excerpt_chars)));
        block.push_str(&format!("AI classified: {} / {}\n", ai.priority, ai.category));
        block.push_str(&format!(
            "Moderator corrected to: {} / {}\n",
            human.final_priority, human.final_category
        ));
        block.push_str(&format!("Lesson: {} with similar content", lesson));
        if let Some(notes) = &human.moderator_notes {
            block.push_str(&format!("\nModerator notes: {}", notes));
        }
        block
    }
}

/// First `max_chars` characters, with an ellipsis when cut
fn excerpt(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}
