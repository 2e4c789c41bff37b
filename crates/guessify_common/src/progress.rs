//! Progress reporting for an ongoing game.
//!
//! Purely advisory: nothing here feeds back into the stopping policy.

use serde::{Deserialize, Serialize};

/// Shown once the first answer is in, so the bar is never empty mid-game
pub const MIN_PROGRESS: f64 = 0.05;
/// Reserved for the final guess
pub const MAX_PROGRESS: f64 = 0.95;

/// Fraction of the catalog eliminated so far, clamped for display
pub fn progress(total: usize, remaining: usize, answered: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let narrowed = total.saturating_sub(remaining) as f64 / total as f64;
    let floored = if answered > 0 {
        narrowed.max(MIN_PROGRESS)
    } else {
        narrowed
    };
    floored.min(MAX_PROGRESS)
}

/// Progress snapshot attached to every question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnProgress {
    /// 1-based number of the question being asked
    pub question_number: usize,
    pub max_questions: usize,
    pub remaining: usize,
    pub total: usize,
    /// 0.0 - 0.95
    pub fraction: f64,
}

impl TurnProgress {
    pub fn new(answered: usize, max_questions: usize, remaining: usize, total: usize) -> Self {
        Self {
            question_number: answered + 1,
            max_questions,
            remaining,
            total,
            fraction: progress(total, remaining, answered),
        }
    }

    pub fn percent(&self) -> u8 {
        (self.fraction * 100.0).round() as u8
    }

    /// Text bar of `width` cells, e.g. `[#####-----]`
    pub fn bar(&self, width: usize) -> String {
        let filled = ((self.fraction * width as f64).round() as usize).min(width);
        format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_progress_start_is_zero() {
        assert_relative_eq!(progress(100, 100, 0), 0.0);
    }

    #[test]
    fn test_progress_floor_after_first_answer() {
        assert_relative_eq!(progress(100, 99, 1), 0.05);
        assert_relative_eq!(progress(100, 100, 1), 0.05);
    }

    #[test]
    fn test_progress_cap() {
        assert_relative_eq!(progress(100, 1, 6), 0.95);
        assert_relative_eq!(progress(100, 0, 6), 0.95);
    }

    #[test]
    fn test_progress_middle() {
        assert_relative_eq!(progress(100, 40, 3), 0.6);
    }

    #[test]
    fn test_progress_empty_catalog() {
        assert_relative_eq!(progress(0, 0, 3), 0.0);
    }

    #[test]
    fn test_turn_progress_bar() {
        let p = TurnProgress::new(2, 10, 50, 100);
        assert_eq!(p.question_number, 3);
        assert_eq!(p.percent(), 50);
        assert_eq!(p.bar(10), "[#####-----]");
    }
}
