//! Guessify core: a twenty-questions engine over a fixed celebrity catalog.
//!
//! Entry points for the session layer:
//! - [`load_catalog`] reads the entity table
//! - [`train`] fits the decision tree
//! - [`advance_turn`] asks the next question or commits to a guess
//! - [`record_answer`] folds raw player input into yes/no

pub mod answer;
pub mod catalog;
pub mod classifier;
pub mod config;
pub mod error;
pub mod filter;
pub mod progress;
pub mod questions;
pub mod selector;
pub mod service;
pub mod session;
pub mod stats;
pub mod turn;

pub use answer::{record_answer, Answer, AnswerRecord, RawAnswer};
pub use catalog::{Catalog, Entity};
pub use classifier::{Classifier, ModelConfig, Prediction, TrainingReport};
pub use config::GuessifyConfig;
pub use error::{GuessError, Result};
pub use service::{CatalogSource, Engine, GuessService};
pub use session::GameSession;
pub use stats::GameStats;
pub use turn::{advance_turn, FinalGuess, GuessKind, StopPolicy, StopReason, TurnController, TurnOutcome, NO_MATCH_LABEL};

use std::path::Path;

/// Load a catalog from a CSV file
pub fn load_catalog(path: impl AsRef<Path>) -> Result<Catalog> {
    Catalog::load(path)
}

/// Train the default decision tree on a catalog
pub fn train(catalog: &Catalog) -> Result<Classifier> {
    Classifier::train(catalog, ModelConfig::default())
}
