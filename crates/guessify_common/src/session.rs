//! Game turn state owned by the caller.
//!
//! Append-only answer log, frozen once a guess is made. The correctness flag
//! can be set exactly once after completion. Turns for one session must be
//! serialized by whoever persists it.

use crate::answer::{record_answer, Answer, AnswerRecord, RawAnswer};
use crate::error::{GuessError, Result};
use crate::turn::FinalGuess;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSession {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    answers: Vec<AnswerRecord>,
    completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    guess: Option<FinalGuess>,
    #[serde(skip_serializing_if = "Option::is_none")]
    is_correct: Option<bool>,
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}

impl GameSession {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            answers: Vec::new(),
            completed: false,
            guess: None,
            is_correct: None,
        }
    }

    pub fn answers(&self) -> &[AnswerRecord] {
        &self.answers
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn guess(&self) -> Option<&FinalGuess> {
        self.guess.as_ref()
    }

    pub fn is_correct(&self) -> Option<bool> {
        self.is_correct
    }

    /// Normalize and append an answer
    pub fn record(&mut self, attribute: &str, raw: RawAnswer) -> Result<Answer> {
        if self.completed {
            return Err(GuessError::Session(format!(
                "session {} is completed; cannot answer '{}'",
                self.id, attribute
            )));
        }
        if self.answers.iter().any(|r| r.attribute == attribute) {
            return Err(GuessError::Session(format!(
                "attribute '{}' already answered",
                attribute
            )));
        }
        let answer = record_answer(raw);
        self.answers.push(AnswerRecord::new(attribute, answer));
        self.updated_at = Utc::now();
        Ok(answer)
    }

    /// Freeze the session with its final guess
    pub fn complete(&mut self, guess: FinalGuess) -> Result<()> {
        if self.completed {
            return Err(GuessError::Session(format!(
                "session {} already completed",
                self.id
            )));
        }
        self.completed = true;
        self.guess = Some(guess);
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Player feedback on the guess; allowed once, after completion
    pub fn confirm(&mut self, correct: bool) -> Result<()> {
        if !self.completed {
            return Err(GuessError::Session(
                "cannot confirm a guess before the game is completed".to_string(),
            ));
        }
        if self.is_correct.is_some() {
            return Err(GuessError::Session(format!(
                "session {} already confirmed",
                self.id
            )));
        }
        self.is_correct = Some(correct);
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_json(&fs::read_to_string(path)?)
    }
}
