//! Turn controller: ask another question or commit to a guess.
//!
//! The caller feeds back the full answer log on every turn. A turn either
//! yields the next question (ASKING) or the final guess (COMPLETED). Once a
//! guess is produced the session is over; the controller keeps no state.

use crate::answer::AnswerRecord;
use crate::catalog::Catalog;
use crate::classifier::Classifier;
use crate::error::{GuessError, Result};
use crate::filter;
use crate::progress::TurnProgress;
use crate::questions::QuestionBook;
use crate::selector::{self, SelectorConfig};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, info, warn};

/// Label stored in place of an entity name when nothing matches
pub const NO_MATCH_LABEL: &str = "No celebrity matches your answers";

/// Question limits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopPolicy {
    #[serde(default = "default_min_questions")]
    pub min_questions: usize,
    #[serde(default = "default_max_questions")]
    pub max_questions: usize,
}

fn default_min_questions() -> usize {
    5
}

fn default_max_questions() -> usize {
    10
}

impl Default for StopPolicy {
    fn default() -> Self {
        Self {
            min_questions: default_min_questions(),
            max_questions: default_max_questions(),
        }
    }
}

/// Why the game stopped asking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Question limit reached
    MaxQuestions,
    /// Exactly one candidate left
    SingleMatch,
    /// No attribute left to ask about
    Exhausted,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MaxQuestions => write!(f, "max_questions"),
            Self::SingleMatch => write!(f, "single_match"),
            Self::Exhausted => write!(f, "exhausted"),
        }
    }
}

impl StopPolicy {
    /// Decide whether to stop before asking question `answered + 1`
    pub fn decide(&self, answered: usize, remaining: usize, has_next: bool) -> Option<StopReason> {
        if answered >= self.max_questions {
            return Some(StopReason::MaxQuestions);
        }
        if answered >= self.min_questions {
            if remaining == 1 {
                return Some(StopReason::SingleMatch);
            }
            if !has_next {
                return Some(StopReason::Exhausted);
            }
            return None;
        }
        if remaining == 1 {
            return Some(StopReason::SingleMatch);
        }
        if !has_next {
            return Some(StopReason::Exhausted);
        }
        None
    }
}

/// How the final guess was reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuessKind {
    /// Exactly one entity matched every answer
    Unique,
    /// Several matched; the model picked the most probable
    Ranked,
    /// Several matched but the model gave no probability; first match taken
    Degraded,
    /// Nothing matched
    NoMatch,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalGuess {
    pub kind: GuessKind,
    /// None for a no-match outcome
    pub entity: Option<String>,
    /// None when no match or degraded
    pub confidence: Option<f64>,
    /// Entities consistent with all answers
    pub candidates: usize,
    pub questions_asked: usize,
    pub reason: StopReason,
}

impl FinalGuess {
    /// Entity name, or the no-match label
    pub fn label(&self) -> &str {
        self.entity.as_deref().unwrap_or(NO_MATCH_LABEL)
    }

    pub fn is_match(&self) -> bool {
        self.entity.is_some()
    }
}

/// Result of one turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TurnOutcome {
    Ask {
        attribute: String,
        question: String,
        progress: TurnProgress,
    },
    Guess(FinalGuess),
}

impl TurnOutcome {
    pub fn is_guess(&self) -> bool {
        matches!(self, TurnOutcome::Guess(_))
    }
}

/// Full attribute vector from answers; unanswered attributes count as false
pub fn answers_to_vector(catalog: &Catalog, answers: &[AnswerRecord]) -> Vec<bool> {
    let mut vector = vec![false; catalog.attributes().len()];
    for rec in answers {
        if let Some(col) = catalog.attribute_position(&rec.attribute) {
            vector[col] = rec.answer.as_bool();
        }
    }
    vector
}

/// Pick the final guess from the filtered candidates
pub fn final_guess(
    catalog: &Catalog,
    model: &Classifier,
    answers: &[AnswerRecord],
    reason: StopReason,
) -> FinalGuess {
    let matches = filter::matches(catalog, answers);
    for (step, left) in filter::narrowing_trace(catalog, answers) {
        debug!("Filter {} -> {} candidates", step, left);
    }
    let mut guess = FinalGuess {
        kind: GuessKind::NoMatch,
        entity: None,
        confidence: None,
        candidates: matches.len(),
        questions_asked: answers.len(),
        reason,
    };

    match matches.as_slice() {
        [] => {
            info!("No entity matches all {} answers", answers.len());
        }
        [only] => {
            guess.kind = GuessKind::Unique;
            guess.entity = Some(only.name.clone());
            guess.confidence = Some(1.0);
        }
        [first, ..] => {
            let vector = answers_to_vector(catalog, answers);
            let ranked = model.predict(&vector).map(|prediction| {
                let mut best: Option<(&str, f64)> = None;
                for entity in &matches {
                    let Some(p) = model.probability_of(&prediction, &entity.name) else {
                        return None;
                    };
                    debug!("Candidate {}: {:.2}%", entity.name, p * 100.0);
                    if best.map_or(true, |(_, bp)| p > bp) {
                        best = Some((entity.name.as_str(), p));
                    }
                }
                best
            });

            match ranked {
                Ok(Some((name, p))) => {
                    guess.kind = GuessKind::Ranked;
                    guess.entity = Some(name.to_string());
                    guess.confidence = Some(p);
                }
                Ok(None) => {
                    warn!("Model has no probability for a candidate; falling back to first match");
                    guess.kind = GuessKind::Degraded;
                    guess.entity = Some(first.name.clone());
                }
                Err(e) => {
                    warn!("Prediction failed ({}); falling back to first match", e);
                    guess.kind = GuessKind::Degraded;
                    guess.entity = Some(first.name.clone());
                }
            }
        }
    }

    info!(
        "Final guess: {} ({:?}, {} candidates, {} questions)",
        guess.label(),
        guess.kind,
        guess.candidates,
        guess.questions_asked
    );
    guess
}

/// Turn controller with its tuning
#[derive(Debug, Clone, Default)]
pub struct TurnController {
    pub policy: StopPolicy,
    pub selector: SelectorConfig,
    pub questions: QuestionBook,
}

impl TurnController {
    pub fn new(policy: StopPolicy, selector: SelectorConfig, questions: QuestionBook) -> Self {
        Self {
            policy,
            selector,
            questions,
        }
    }

    /// Run one turn over the accumulated answer log.
    ///
    /// Every answer must name a catalog attribute; anything else would count
    /// toward the question limit without narrowing the candidates.
    pub fn advance<R: Rng + ?Sized>(
        &self,
        catalog: &Catalog,
        model: &Classifier,
        answers: &[AnswerRecord],
        rng: &mut R,
    ) -> Result<TurnOutcome> {
        if let Some(rec) = answers.iter().find(|r| !catalog.has_attribute(&r.attribute)) {
            return Err(GuessError::Data(format!(
                "answer for unknown attribute '{}'",
                rec.attribute
            )));
        }

        let answered_count = answers.len();
        let remaining = filter::remaining(catalog, answers);

        let next = if answered_count >= self.policy.max_questions {
            None
        } else {
            let answered: HashSet<&str> = answers.iter().map(|r| r.attribute.as_str()).collect();
            selector::next_attribute(&answered, model, catalog, &self.selector, rng)?
        };

        if let Some(reason) = self.policy.decide(answered_count, remaining, next.is_some()) {
            debug!("Stopping after {} answers: {}", answered_count, reason);
            return Ok(TurnOutcome::Guess(final_guess(catalog, model, answers, reason)));
        }

        // decide() only continues when a next attribute exists
        let Some(attribute) = next else {
            return Ok(TurnOutcome::Guess(final_guess(
                catalog,
                model,
                answers,
                StopReason::Exhausted,
            )));
        };

        Ok(TurnOutcome::Ask {
            question: self.questions.question(&attribute),
            progress: TurnProgress::new(
                answered_count,
                self.policy.max_questions,
                remaining,
                catalog.len(),
            ),
            attribute,
        })
    }
}

/// One turn with default limits and wording
pub fn advance_turn<R: Rng + ?Sized>(
    catalog: &Catalog,
    model: &Classifier,
    answers: &[AnswerRecord],
    rng: &mut R,
) -> Result<TurnOutcome> {
    TurnController::default().advance(catalog, model, answers, rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::ModelConfig;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_decide_table() {
        let p = StopPolicy::default();
        assert_eq!(p.decide(10, 30, true), Some(StopReason::MaxQuestions));
        assert_eq!(p.decide(12, 30, true), Some(StopReason::MaxQuestions));
        assert_eq!(p.decide(5, 1, true), Some(StopReason::SingleMatch));
        assert_eq!(p.decide(5, 4, false), Some(StopReason::Exhausted));
        assert_eq!(p.decide(5, 4, true), None);
        assert_eq!(p.decide(2, 1, true), Some(StopReason::SingleMatch));
        assert_eq!(p.decide(2, 4, false), Some(StopReason::Exhausted));
        assert_eq!(p.decide(2, 4, true), None);
        // zero candidates never stops early on its own
        assert_eq!(p.decide(3, 0, true), None);
    }

    #[test]
    fn test_unknown_attributes_rejected() {
        let cat = Catalog::parse(
            "name,actor,musician\nA,yes,no\nB,yes,yes\nC,no,no\nD,no,yes\n",
        )
        .unwrap();
        let model = Classifier::train(&cat, ModelConfig::default()).unwrap();
        let ghosts: Vec<AnswerRecord> =
            (0..10).map(|i| AnswerRecord::yes(format!("ghost{}", i))).collect();
        let mut rng = StdRng::seed_from_u64(0);
        let err = advance_turn(&cat, &model, &ghosts, &mut rng).unwrap_err();
        assert!(matches!(err, GuessError::Data(_)));
        assert!(err.to_string().contains("ghost0"));

        let mixed = [AnswerRecord::yes("actor"), AnswerRecord::no("Actor")];
        assert!(advance_turn(&cat, &model, &mixed, &mut rng).is_err());
    }

    #[test]
    fn test_answers_to_vector_defaults_false() {
        let cat = Catalog::parse("name,actor,musician,athlete\nA,yes,no,no\n").unwrap();
        let v = answers_to_vector(
            &cat,
            &[AnswerRecord::yes("athlete"), AnswerRecord::yes("ghost")],
        );
        assert_eq!(v, vec![false, false, true]);
    }

    #[test]
    fn test_degraded_guess_when_model_lacks_candidate() {
        // model trained on a catalog that does not know 'B'
        let cat = Catalog::parse("name,actor,musician\nA,yes,no\nB,yes,yes\nC,no,no\n").unwrap();
        let other = Catalog::parse("name,actor,musician\nA,yes,no\nC,no,no\n").unwrap();
        let model = Classifier::train(&other, ModelConfig::default()).unwrap();
        let guess = final_guess(&cat, &model, &[AnswerRecord::yes("actor")], StopReason::MaxQuestions);
        assert_eq!(guess.kind, GuessKind::Degraded);
        assert_eq!(guess.entity.as_deref(), Some("A"));
        assert_eq!(guess.confidence, None);
        assert_eq!(guess.candidates, 2);
    }

    #[test]
    fn test_degraded_guess_when_untrained() {
        let cat = Catalog::parse("name,actor\nA,yes\nB,yes\n").unwrap();
        let model = Classifier::untrained(ModelConfig::default());
        let guess = final_guess(&cat, &model, &[], StopReason::Exhausted);
        assert_eq!(guess.kind, GuessKind::Degraded);
        assert_eq!(guess.label(), "A");
    }

    #[test]
    fn test_outcome_json_shape() {
        let outcome = TurnOutcome::Guess(FinalGuess {
            kind: GuessKind::NoMatch,
            entity: None,
            confidence: None,
            candidates: 0,
            questions_asked: 2,
            reason: StopReason::Exhausted,
        });
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["type"], "guess");
        assert_eq!(json["kind"], "no_match");
        assert!(json["entity"].is_null());
    }

    #[test]
    fn test_ask_carries_question_text() {
        let cat = Catalog::parse(
            "name,actor,musician\nA,yes,no\nB,yes,yes\nC,no,no\nD,no,yes\n",
        )
        .unwrap();
        let model = Classifier::train(&cat, ModelConfig::default()).unwrap();
        let mut rng = StdRng::seed_from_u64(11);
        match advance_turn(&cat, &model, &[], &mut rng).unwrap() {
            TurnOutcome::Ask {
                attribute,
                question,
                progress,
            } => {
                assert!(attribute == "actor" || attribute == "musician");
                assert!(question.starts_with("Is the person"));
                assert_eq!(progress.question_number, 1);
                assert_eq!(progress.remaining, 4);
            }
            other => panic!("expected a question, got {:?}", other),
        }
    }
}
