//! Training data - cases recorded after a moderator reviews a classification
//!
//! The store is append-only for auditability; everything that learns from
//! moderator corrections reads snapshots of it.

pub mod case;
pub mod store;
pub mod jsonl;

pub use case::{AiClassification, HumanDecision, Outcome, TrainingCase};
pub use store::{MemoryTrainingStore, TrainingStore};
pub use jsonl::JsonlTrainingStore;
