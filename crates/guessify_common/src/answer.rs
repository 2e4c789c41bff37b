//! Answer types.
//!
//! Callers submit one of five raw answers. Only `yes` and `no` are stored;
//! everything else is folded into one of those before it reaches the filter.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Raw answer as typed or clicked by the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RawAnswer {
    Yes,
    No,
    Unknown,
    Probably,
    ProbablyNot,
}

impl RawAnswer {
    pub const ALL: [RawAnswer; 5] = [
        RawAnswer::Yes,
        RawAnswer::No,
        RawAnswer::Unknown,
        RawAnswer::Probably,
        RawAnswer::ProbablyNot,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Yes => "yes",
            Self::No => "no",
            Self::Unknown => "unknown",
            Self::Probably => "probably",
            Self::ProbablyNot => "probably_not",
        }
    }
}

impl fmt::Display for RawAnswer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RawAnswer {
    type Err = String;

    /// Accepts the canonical tokens plus the short forms used by the terminal prompt
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "yes" | "y" => Ok(Self::Yes),
            "no" | "n" => Ok(Self::No),
            "unknown" | "u" | "?" | "dont_know" => Ok(Self::Unknown),
            "probably" | "p" => Ok(Self::Probably),
            "probably_not" | "probably-not" | "pn" => Ok(Self::ProbablyNot),
            other => Err(format!(
                "Invalid answer: '{}'. Valid values: yes, no, unknown, probably, probably_not",
                other
            )),
        }
    }
}

/// Normalized answer, the only form the filter and classifier ever see
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Answer {
    Yes,
    No,
}

impl Answer {
    pub fn as_bool(&self) -> bool {
        matches!(self, Answer::Yes)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Yes => "yes",
            Self::No => "no",
        }
    }
}

impl From<bool> for Answer {
    fn from(value: bool) -> Self {
        if value {
            Answer::Yes
        } else {
            Answer::No
        }
    }
}

impl From<Answer> for RawAnswer {
    fn from(answer: Answer) -> Self {
        match answer {
            Answer::Yes => RawAnswer::Yes,
            Answer::No => RawAnswer::No,
        }
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fold a raw answer into yes/no.
///
/// `unknown` becomes `no`, so an unsure player still filters out every
/// entity that has the attribute.
pub fn record_answer(raw: RawAnswer) -> Answer {
    match raw {
        RawAnswer::Yes | RawAnswer::Probably => Answer::Yes,
        RawAnswer::No | RawAnswer::ProbablyNot | RawAnswer::Unknown => Answer::No,
    }
}

/// One stored (attribute, answer) pair of a game session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub attribute: String,
    pub answer: Answer,
}

impl AnswerRecord {
    pub fn new(attribute: impl Into<String>, answer: Answer) -> Self {
        Self {
            attribute: attribute.into(),
            answer,
        }
    }

    /// Normalize and wrap a raw answer
    pub fn from_raw(attribute: impl Into<String>, raw: RawAnswer) -> Self {
        Self::new(attribute, record_answer(raw))
    }

    pub fn yes(attribute: impl Into<String>) -> Self {
        Self::new(attribute, Answer::Yes)
    }

    pub fn no(attribute: impl Into<String>) -> Self {
        Self::new(attribute, Answer::No)
    }
}

/// Parse `key=answer` pairs, e.g. `actor=yes,musician=probably_not`
pub fn parse_answer_pairs(input: &str) -> Result<Vec<AnswerRecord>, String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair
                .split_once('=')
                .ok_or_else(|| format!("Expected key=answer, got '{}'", pair))?;
            let raw: RawAnswer = value.parse()?;
            Ok(AnswerRecord::from_raw(key.trim(), raw))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalization_table() {
        assert_eq!(record_answer(RawAnswer::Yes), Answer::Yes);
        assert_eq!(record_answer(RawAnswer::Probably), Answer::Yes);
        assert_eq!(record_answer(RawAnswer::No), Answer::No);
        assert_eq!(record_answer(RawAnswer::ProbablyNot), Answer::No);
        assert_eq!(record_answer(RawAnswer::Unknown), Answer::No);
    }

    #[test]
    fn test_normalization_idempotent() {
        for raw in RawAnswer::ALL {
            let once = record_answer(raw);
            let twice = record_answer(RawAnswer::from(once));
            assert_eq!(once, twice, "re-normalizing {} changed it", raw);
        }
    }

    #[test]
    fn test_parse_raw_tokens() {
        assert_eq!("YES".parse::<RawAnswer>().unwrap(), RawAnswer::Yes);
        assert_eq!(" pn ".parse::<RawAnswer>().unwrap(), RawAnswer::ProbablyNot);
        assert_eq!("probably_not".parse::<RawAnswer>().unwrap(), RawAnswer::ProbablyNot);
        assert!("maybe".parse::<RawAnswer>().is_err());
    }

    #[test]
    fn test_serde_snake_case() {
        let json = serde_json::to_string(&RawAnswer::ProbablyNot).unwrap();
        assert_eq!(json, "\"probably_not\"");
        let rec: AnswerRecord =
            serde_json::from_str(r#"{"attribute":"actor","answer":"yes"}"#).unwrap();
        assert_eq!(rec, AnswerRecord::yes("actor"));
    }

    #[test]
    fn test_parse_answer_pairs() {
        let recs = parse_answer_pairs("actor=yes, musician=unknown,").unwrap();
        assert_eq!(recs, vec![AnswerRecord::yes("actor"), AnswerRecord::no("musician")]);
        assert!(parse_answer_pairs("actor").is_err());
        assert!(parse_answer_pairs("actor=sometimes").is_err());
    }
}
