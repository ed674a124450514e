//! Moderation taxonomy - priority tiers, violation categories and required actions
//!
//! This is the single vocabulary shared by the classifier, the training log and
//! the feedback analyzer. Changing a threshold or an example phrase means
//! editing only the tables in this file.

use serde::{Deserialize, Serialize};

/// Severity tier of flagged content
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

impl Priority {
    /// All tiers, least severe first
    pub fn all() -> &'static [Priority] {
        &[Priority::Low, Priority::Medium, Priority::High, Priority::Critical]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Critical => "critical",
        }
    }

    /// Parse a tier name, ignoring case and surrounding whitespace
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "low" => Some(Priority::Low),
            "medium" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            "critical" => Some(Priority::Critical),
            _ => None,
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Policy violation type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    SexualContent,
    InappropriateContent,
    HarassmentBullying,
    FalseInformation,
    PrivacyViolation,
    Spam,
    Other,
}

impl Category {
    pub fn all() -> &'static [Category] {
        &[
            Category::SexualContent,
            Category::InappropriateContent,
            Category::HarassmentBullying,
            Category::FalseInformation,
            Category::PrivacyViolation,
            Category::Spam,
            Category::Other,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::SexualContent => "sexual_content",
            Category::InappropriateContent => "inappropriate_content",
            Category::HarassmentBullying => "harassment_bullying",
            Category::FalseInformation => "false_information",
            Category::PrivacyViolation => "privacy_violation",
            Category::Spam => "spam",
            Category::Other => "other",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_lowercase().replace(['-', ' '], "_");
        Category::all()
            .iter()
            .copied()
            .find(|c| c.as_str() == normalized)
    }

    /// One-line policy description used in the classification instructions
    pub fn description(&self) -> &'static str {
        match self {
            Category::SexualContent => "sexual solicitation, explicit material, hookup or dating requests",
            Category::InappropriateContent => "profanity, crude jokes, content unsuitable for a faith community",
            Category::HarassmentBullying => "personal attacks, threats, mockery of members or their faith",
            Category::FalseInformation => "fabricated scripture, misleading health or doctrinal claims presented as fact",
            Category::PrivacyViolation => "sharing phone numbers, addresses or private prayer requests of others",
            Category::Spam => "advertising, repeated links, fundraising scams",
            Category::Other => "anything else worth a moderator's attention",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Action a moderator is expected to take
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Remove,
    Hide,
    Review,
    Coach,
    None,
}

impl Action {
    pub fn all() -> &'static [Action] {
        &[Action::Remove, Action::Hide, Action::Review, Action::Coach, Action::None]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Remove => "remove",
            Action::Hide => "hide",
            Action::Review => "review",
            Action::Coach => "coach",
            Action::None => "none",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "remove" => Some(Action::Remove),
            "hide" => Some(Action::Hide),
            "review" => Some(Action::Review),
            "coach" => Some(Action::Coach),
            "none" => Some(Action::None),
            _ => None,
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Example-driven definition of a priority tier
#[derive(Debug, Clone, Copy)]
pub struct TierDefinition {
    pub priority: Priority,
    pub summary: &'static str,
    pub categories: &'static [Category],
    pub action: Action,
    pub examples: &'static [&'static str],
}

const TIERS: &[TierDefinition] = &[
    TierDefinition {
        priority: Priority::Critical,
        summary: "Sexual content or solicitation of any kind, including veiled dating and hookup requests",
        categories: &[Category::SexualContent],
        action: Action::Remove,
        examples: &[
            "looking for a hookup",
            "anyone want to meet up tonight, no strings",
            "send me pics",
            "DM me for something fun after service",
        ],
    },
    TierDefinition {
        priority: Priority::High,
        summary: "Harassment, bullying, threats, or attacks on someone's faith or identity",
        categories: &[Category::HarassmentBullying, Category::InappropriateContent],
        action: Action::Hide,
        examples: &[
            "you're a fake christian and everyone knows it",
            "people like you don't belong in this church",
            "I know where you live",
            "shut up, nobody cares about your prayers",
        ],
    },
    TierDefinition {
        priority: Priority::Medium,
        summary: "Misinformation, privacy leaks, spam, or content needing a moderator's judgement",
        categories: &[Category::FalseInformation, Category::PrivacyViolation, Category::Spam],
        action: Action::Review,
        examples: &[
            "the Bible says vaccines are the mark of the beast",
            "here is Sister Mary's phone number, call her about her diagnosis",
            "click this link to double your tithe",
            "pastor is secretly stealing from the offering",
        ],
    },
    TierDefinition {
        priority: Priority::Low,
        summary: "Mild negativity, venting or off-topic remarks that call for gentle coaching at most",
        categories: &[Category::InappropriateContent, Category::Other],
        action: Action::Coach,
        examples: &[
            "sermons are boring sometimes",
            "the worship music was too loud today",
            "ugh, Monday again",
            "why does the coffee at fellowship hour taste like that",
        ],
    },
];

/// All tier definitions, most severe first
pub fn tiers() -> &'static [TierDefinition] {
    TIERS
}

/// Look up the definition of a tier
pub fn tier(priority: Priority) -> &'static TierDefinition {
    // Every Priority variant has exactly one row in TIERS
    TIERS
        .iter()
        .find(|t| t.priority == priority)
        .unwrap_or(&TIERS[2])
}

/// The action the policy requires for a tier
pub fn required_action(priority: Priority) -> Action {
    tier(priority).action
}

pub fn is_valid_priority(value: &str) -> bool {
    Priority::parse(value).is_some()
}

pub fn is_valid_category(value: &str) -> bool {
    Category::parse(value).is_some()
}

pub fn is_valid_action(value: &str) -> bool {
    Action::parse(value).is_some()
}
