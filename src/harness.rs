//! Self-test harness - a fixed labelled corpus run through the classifier
//!
//! Only the priority tier is scored. Category mismatches are reported but do
//! not fail a case. Run this whenever the taxonomy or prompt wording changes.

use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{info, warn};

use crate::classifier::{ClassificationResult, Classifier};
use crate::taxonomy::{Category, Priority};

/// Bumped whenever the corpus below changes
pub const CORPUS_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CorpusCase {
    pub content: &'static str,
    pub content_type: &'static str,
    pub expected_priority: Priority,
    pub expected_category: Category,
}

const CORPUS: &[CorpusCase] = &[
    CorpusCase {
        content: "Looking for a hookup after church",
        content_type: "post",
        expected_priority: Priority::Critical,
        expected_category: Category::SexualContent,
    },
    CorpusCase {
        content: "Any single ladies from the youth group want to come over tonight? DM me pics",
        content_type: "comment",
        expected_priority: Priority::Critical,
        expected_category: Category::SexualContent,
    },
    CorpusCase {
        content: "You're a hypocrite and a fake Christian. Nobody in this church wants you here.",
        content_type: "comment",
        expected_priority: Priority::High,
        expected_category: Category::HarassmentBullying,
    },
    CorpusCase {
        content: "Keep posting your prayers and I'll find out where you live.",
        content_type: "comment",
        expected_priority: Priority::High,
        expected_category: Category::HarassmentBullying,
    },
    CorpusCase {
        content: "The Bible clearly says Christians should refuse all medicine and doctors.",
        content_type: "discussion",
        expected_priority: Priority::Medium,
        expected_category: Category::FalseInformation,
    },
    CorpusCase {
        content: "Here is Brother Tom's home address and phone number, call him about his divorce.",
        content_type: "prayer_request",
        expected_priority: Priority::Medium,
        expected_category: Category::PrivacyViolation,
    },
    CorpusCase {
        content: "I feel like sermons are boring sometimes.",
        content_type: "post",
        expected_priority: Priority::Low,
        expected_category: Category::Other,
    },
    CorpusCase {
        content: "The parking lot was a mess after service again, so frustrating.",
        content_type: "post",
        expected_priority: Priority::Low,
        expected_category: Category::Other,
    },
];

/// The default labelled corpus (version [`CORPUS_VERSION`])
pub fn default_corpus() -> &'static [CorpusCase] {
    CORPUS
}

/// Result of one corpus case
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseOutcome {
    pub case: CorpusCase,
    pub actual: ClassificationResult,
    pub passed: bool,
    pub category_matched: bool,
}

impl CaseOutcome {
    /// One diagnostic line: expected vs actual vs confidence vs reason
    pub fn diagnostic(&self) -> String {
        format!(
            "[{}] \"{}\" expected {}/{} got {}/{} (confidence {:.2}) reason: {}",
            if self.passed { "PASS" } else { "FAIL" },
            self.case.content,
            self.case.expected_priority,
            self.case.expected_category,
            self.actual.priority,
            self.actual.category,
            self.actual.confidence,
            self.actual.reason
        )
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HarnessReport {
    pub corpus_version: u32,
    pub passed: usize,
    pub total: usize,
    pub cases: Vec<CaseOutcome>,
}

impl HarnessReport {
    pub fn pass_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.passed as f64 / self.total as f64
        }
    }

    pub fn all_passed(&self) -> bool {
        self.passed == self.total
    }

    /// Human-readable report with per-case diagnostics
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(256 * self.cases.len().max(1));
        for outcome in &self.cases {
            out.push_str(&outcome.diagnostic());
            out.push('\n');
        }
        out.push_str(&format!(
            "\n{}/{} passed ({:.0}%) - corpus v{}\n",
            self.passed,
            self.total,
            self.pass_rate() * 100.0,
            self.corpus_version
        ));
        out
    }
}

pub struct TestHarness {
    classifier: Classifier,
    corpus: Vec<CorpusCase>,
    concurrency: usize,
}

impl TestHarness {
    pub fn new(classifier: Classifier) -> Self {
        Self {
            classifier,
            corpus: default_corpus().to_vec(),
            concurrency: 4,
        }
    }

    pub fn with_corpus(mut self, corpus: Vec<CorpusCase>) -> Self {
        self.corpus = corpus;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Classify every corpus case; results keep corpus order
    pub async fn run(&self) -> HarnessReport {
        let cases: Vec<CaseOutcome> = stream::iter(self.corpus.iter().copied())
            .map(|case| async move {
                let actual = self.classifier.classify(case.content, case.content_type).await;
                score(case, actual)
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        let passed = cases.iter().filter(|c| c.passed).count();
        let report = HarnessReport {
            corpus_version: CORPUS_VERSION,
            passed,
            total: cases.len(),
            cases,
        };
        info!("Self-test: {}/{} cases passed", report.passed, report.total);
        report
    }
}

fn score(case: CorpusCase, actual: ClassificationResult) -> CaseOutcome {
    let passed = actual.priority == case.expected_priority;
    let category_matched = actual.category == case.expected_category;
    let outcome = CaseOutcome {
        case,
        actual,
        passed,
        category_matched,
    };

    if !passed {
        warn!("{}", outcome.diagnostic());
    } else if !category_matched {
        info!(
            "Category mismatch (not scored) for \"{}\": expected {}, got {}",
            case.content, case.expected_category, outcome.actual.category
        );
    }
    outcome
}
