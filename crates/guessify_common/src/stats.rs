//! Aggregate game statistics.

use crate::session::GameSession;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameStats {
    /// Sessions started
    pub total_games: u64,
    pub completed_games: u64,
    /// Started but never reached a guess
    pub pending_games: u64,
    /// Completed and confirmed correct by the player
    pub correct_guesses: u64,
    /// Completed but confirmed wrong
    pub wrong_guesses: u64,
    /// Guesses that found no matching entity
    pub no_match_guesses: u64,
    /// Average answers per completed game
    pub avg_questions: f32,
}

impl GameStats {
    pub fn from_sessions<'a>(sessions: impl IntoIterator<Item = &'a GameSession>) -> Self {
        let mut stats = Self::default();
        for session in sessions {
            stats.record(session);
        }
        stats
    }

    pub fn record(&mut self, session: &GameSession) {
        self.total_games += 1;
        if !session.is_completed() {
            self.pending_games += 1;
            return;
        }

        self.completed_games += 1;
        let n = self.completed_games as f32;
        self.avg_questions =
            ((self.avg_questions * (n - 1.0)) + session.answers().len() as f32) / n;

        match session.is_correct() {
            Some(true) => self.correct_guesses += 1,
            Some(false) => self.wrong_guesses += 1,
            None => {}
        }
        if session.guess().map_or(false, |g| !g.is_match()) {
            self.no_match_guesses += 1;
        }
    }

    /// Rounded percentage of completed games confirmed correct
    pub fn win_rate(&self) -> u32 {
        if self.completed_games == 0 {
            0
        } else {
            (self.correct_guesses as f64 / self.completed_games as f64 * 100.0).round() as u32
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::answer::RawAnswer;
    use crate::turn::{FinalGuess, GuessKind, StopReason};

    fn finished(entity: Option<&str>, answers: usize, correct: Option<bool>) -> GameSession {
        let mut s = GameSession::new();
        for i in 0..answers {
            s.record(&format!("attr{}", i), RawAnswer::Yes).unwrap();
        }
        s.complete(FinalGuess {
            kind: if entity.is_some() { GuessKind::Unique } else { GuessKind::NoMatch },
            entity: entity.map(str::to_string),
            confidence: entity.map(|_| 1.0),
            candidates: usize::from(entity.is_some()),
            questions_asked: answers,
            reason: StopReason::MaxQuestions,
        })
        .unwrap();
        if let Some(c) = correct {
            s.confirm(c).unwrap();
        }
        s
    }

    #[test]
    fn test_empty_stats() {
        let stats = GameStats::default();
        assert_eq!(stats.win_rate(), 0);
    }

    #[test]
    fn test_aggregate() {
        let sessions = vec![
            finished(Some("A"), 4, Some(true)),
            finished(Some("B"), 6, Some(false)),
            finished(None, 10, Some(false)),
            GameSession::new(),
        ];
        let stats = GameStats::from_sessions(&sessions);
        assert_eq!(stats.total_games, 4);
        assert_eq!(stats.completed_games, 3);
        assert_eq!(stats.pending_games, 1);
        assert_eq!(stats.correct_guesses, 1);
        assert_eq!(stats.wrong_guesses, 2);
        assert_eq!(stats.no_match_guesses, 1);
        assert_eq!(stats.win_rate(), 33);
        assert!((stats.avg_questions - 20.0 / 3.0).abs() < 1e-4);
    }
}
