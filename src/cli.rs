//! CLI interface for moderation-ai

use anyhow::{Context, Result};
use clap::{ArgGroup, Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::Duration;

use crate::classifier::{Classifier, ClassifierSettings};
use crate::config::Config;
use crate::feedback::FeedbackAnalyzer;
use crate::harness::TestHarness;
use crate::llm::OpenRouterClient;
use crate::taxonomy::{Action, Category, Priority};
use crate::training::{AiClassification, HumanDecision, JsonlTrainingStore, TrainingCase, TrainingStore};

#[derive(Parser)]
#[command(name = "moderation-ai")]
#[command(about = "Content moderation classifier that learns from moderator corrections", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify one piece of content and print the result as JSON
    Classify {
        /// Content text
        text: String,
        /// Kind of content (post, comment, prayer_request, ...)
        #[arg(short = 't', long, default_value = "post")]
        content_type: String,
    },
    /// Classify content, then record the moderator's decision on it
    #[command(group(ArgGroup::new("verdict").required(true).args(["confirm", "priority"])))]
    Review {
        /// Content text
        text: String,
        #[arg(short = 't', long, default_value = "post")]
        content_type: String,
        /// Accept the AI's tier, category and action as-is
        #[arg(long, conflicts_with_all = ["priority", "category", "action"])]
        confirm: bool,
        #[command(flatten)]
        decision: DecisionArgs,
    },
    /// Append a reviewed case to the training log
    Record {
        #[arg(long)]
        content: String,
        #[arg(long, default_value = "post")]
        content_type: String,
        /// Priority the AI assigned
        #[arg(long, value_parser = parse_priority)]
        ai_priority: Priority,
        /// Category the AI assigned
        #[arg(long, value_parser = parse_category)]
        ai_category: Category,
        /// Confidence the AI reported
        #[arg(long, value_parser = parse_confidence)]
        ai_confidence: f64,
        #[command(flatten)]
        decision: DecisionArgs,
    },
    /// Print the feedback report for the training log
    Report,
    /// Print the lessons block currently injected into prompts
    Lessons,
    /// Run the labelled corpus against the configured model
    SelfTest {
        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Configure the classifier
    Config {
        /// Set OpenRouter API key
        #[arg(long)]
        set_api_key: Option<String>,
        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
}

/// The moderator's side of a training case
#[derive(Args)]
struct DecisionArgs {
    /// Final priority
    #[arg(long, value_parser = parse_priority, requires = "category")]
    priority: Option<Priority>,
    /// Final category
    #[arg(long, value_parser = parse_category)]
    category: Option<Category>,
    /// Action taken
    #[arg(long, value_parser = parse_action)]
    action: Option<Action>,
    /// Free-text moderator notes
    #[arg(long)]
    notes: Option<String>,
}

impl DecisionArgs {
    fn into_decision(self) -> Result<HumanDecision> {
        let priority = self.priority.context("--priority is required")?;
        let category = self.category.context("--category is required")?;
        let action = self
            .action
            .unwrap_or_else(|| crate::taxonomy::required_action(priority));

        let decision = HumanDecision::new(priority, category, action);
        Ok(match self.notes {
            Some(notes) => decision.with_notes(notes),
            None => decision,
        })
    }
}

fn parse_priority(value: &str) -> Result<Priority, String> {
    Priority::parse(value).ok_or_else(|| {
        format!("unknown priority '{}', expected one of: {}", value, names(Priority::all()))
    })
}

fn parse_category(value: &str) -> Result<Category, String> {
    Category::parse(value).ok_or_else(|| {
        format!("unknown category '{}', expected one of: {}", value, names(Category::all()))
    })
}

fn parse_action(value: &str) -> Result<Action, String> {
    Action::parse(value).ok_or_else(|| {
        format!("unknown action '{}', expected one of: {}", value, names(Action::all()))
    })
}

fn parse_confidence(value: &str) -> Result<f64, String> {
    let confidence: f64 = value.parse().map_err(|_| format!("'{}' is not a number", value))?;
    if (0.0..=1.0).contains(&confidence) {
        Ok(confidence)
    } else {
        Err(format!("confidence {} is outside 0.0..=1.0", confidence))
    }
}

fn names<T: std::fmt::Display>(values: &[T]) -> String {
    values.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(", ")
}

/// Run the CLI
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Classify { text, content_type } => {
            let config = Config::load()?;
            let classifier = build_classifier(&config, open_store(&config).await?)?;
            let result = classifier.classify(&text, &content_type).await;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::Review { text, content_type, confirm, decision } => {
            // Validated before the classification call
            let decision = if confirm { None } else { Some(decision.into_decision()?) };

            let config = Config::load()?;
            let store = open_store(&config).await?;
            let classifier = build_classifier(&config, store.clone())?;

            let pending = classifier.classify_for_review(&text, &content_type).await;
            let result = pending.classification();
            println!(
                "AI: {} / {} (confidence {:.2}, action {}) - {}",
                result.priority, result.category, result.confidence, result.action_required, result.reason
            );

            let case = match decision {
                Some(decision) => pending.resolve(decision),
                None => pending.confirm()?,
            };
            let outcome = case.outcome();
            store.append(case).await?;
            println!("Recorded as {} ({} cases in log)", outcome, store.len().await);
        }
        Commands::Record {
            content,
            content_type,
            ai_priority,
            ai_category,
            ai_confidence,
            decision,
        } => {
            let config = Config::load()?;
            let store = open_store(&config).await?;
            let ai = AiClassification {
                priority: ai_priority,
                category: ai_category,
                confidence: ai_confidence,
            };
            let case = TrainingCase::new(content, content_type, ai, decision.into_decision()?);
            let (id, outcome) = (case.id(), case.outcome());
            store.append(case).await?;
            println!("Recorded case {} as {}", id, outcome);
        }
        Commands::Report => {
            let config = Config::load()?;
            let store = open_store(&config).await?;
            let report = FeedbackAnalyzer::new(store).analyze().await;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Lessons => {
            let config = Config::load()?;
            let store = open_store(&config).await?;
            println!("{}", config.context_builder().build_from_store(store.as_ref()).await);
        }
        Commands::SelfTest { json } => {
            let config = Config::load()?;
            let classifier = build_classifier(&config, open_store(&config).await?)?;
            let harness = TestHarness::new(classifier).with_concurrency(config.harness.concurrency);

            let spinner = create_spinner("Running self-test corpus...");
            let report = harness.run().await;
            spinner.finish_and_clear();

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", report.render());
            }

            if !report.all_passed() {
                std::process::exit(1);
            }
        }
        Commands::Config { set_api_key, show } => {
            if let Some(key) = set_api_key {
                crate::config::set_api_key(&key)?;
            } else if show {
                crate::config::show_config()?;
            } else {
                println!("Configuration options:");
                println!("  --set-api-key <key>      Set your OpenRouter API key");
                println!("  --show                   Display current configuration");
                println!();
                println!("Config file: {}", crate::config::config_path()?.display());
                println!("The API key can also be supplied via {}.", crate::keyring::API_KEY_ENV);
            }
        }
    }

    Ok(())
}

async fn open_store(config: &Config) -> Result<Arc<JsonlTrainingStore>> {
    let path = config.store.resolved_path()?;
    let store = JsonlTrainingStore::open(&path)
        .await
        .with_context(|| format!("Failed to open training log {}", path.display()))?;
    Ok(Arc::new(store))
}

fn build_classifier(config: &Config, store: Arc<JsonlTrainingStore>) -> Result<Classifier> {
    let llm = OpenRouterClient::from_config(config)?;
    Ok(Classifier::new(Arc::new(llm), store)
        .with_settings(ClassifierSettings::from_config(config))
        .with_context_builder(config.context_builder()))
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("  {spinner:.dim} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_record_parses_taxonomy_values() {
        let cli = Cli::try_parse_from([
            "moderation-ai",
            "record",
            "--content",
            "you people are clowns",
            "--ai-priority",
            "low",
            "--ai-category",
            "other",
            "--ai-confidence",
            "0.6",
            "--priority",
            "HIGH",
            "--category",
            "harassment-bullying",
        ])
        .unwrap();

        match cli.command {
            Commands::Record { ai_priority, decision, .. } => {
                assert_eq!(ai_priority, Priority::Low);
                let decision = decision.into_decision().unwrap();
                assert_eq!(decision.final_priority, Priority::High);
                assert_eq!(decision.final_category, Category::HarassmentBullying);
                assert_eq!(decision.action, Action::Hide);
            }
            _ => panic!("expected record"),
        }
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(Cli::try_parse_from(["moderation-ai", "classify", "x", "--content-type"]).is_err());
        assert!(parse_priority("urgent").is_err());
        assert!(parse_confidence("1.5").is_err());
        assert!(Cli::try_parse_from(["moderation-ai", "review", "x", "--confirm", "--priority", "low"]).is_err());
    }

    #[test]
    fn test_review_needs_a_verdict_up_front() {
        assert!(Cli::try_parse_from(["moderation-ai", "review", "x"]).is_err());
        assert!(Cli::try_parse_from(["moderation-ai", "review", "x", "--priority", "high"]).is_err());
        assert!(Cli::try_parse_from(["moderation-ai", "review", "x", "--confirm"]).is_ok());

        let cli = Cli::try_parse_from([
            "moderation-ai", "review", "x", "--priority", "high", "--category", "spam",
        ])
        .unwrap();
        match cli.command {
            Commands::Review { confirm, decision, .. } => {
                assert!(!confirm);
                assert_eq!(decision.into_decision().unwrap().action, Action::Hide);
            }
            _ => panic!("expected review"),
        }
    }
}
