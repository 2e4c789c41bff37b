//! Candidate narrowing.
//!
//! Keeps only the entities consistent with every stored answer. An empty
//! result is a normal outcome: no entity matches the answers given.

use crate::answer::AnswerRecord;
use crate::catalog::{Catalog, Entity};
use tracing::debug;

/// Resolved (column, expected value) constraints; unknown attributes are skipped
fn constraints(catalog: &Catalog, answers: &[AnswerRecord]) -> Vec<(usize, bool)> {
    answers
        .iter()
        .filter_map(|rec| match catalog.attribute_position(&rec.attribute) {
            Some(col) => Some((col, rec.answer.as_bool())),
            None => {
                debug!("Ignoring answer for unknown attribute '{}'", rec.attribute);
                None
            }
        })
        .collect()
}

/// Entities matching all answers, in catalog order
pub fn matches<'a>(catalog: &'a Catalog, answers: &[AnswerRecord]) -> Vec<&'a Entity> {
    let constraints = constraints(catalog, answers);
    catalog
        .entities()
        .iter()
        .filter(|e| constraints.iter().all(|&(col, want)| e.values[col] == want))
        .collect()
}

/// Number of entities matching all answers
pub fn remaining(catalog: &Catalog, answers: &[AnswerRecord]) -> usize {
    let constraints = constraints(catalog, answers);
    catalog
        .entities()
        .iter()
        .filter(|e| constraints.iter().all(|&(col, want)| e.values[col] == want))
        .count()
}

/// Candidate count after each successive answer, for turn-by-turn logs
pub fn narrowing_trace(catalog: &Catalog, answers: &[AnswerRecord]) -> Vec<(String, usize)> {
    (1..=answers.len())
        .map(|n| {
            let rec = &answers[n - 1];
            (
                format!("{} = {}", rec.attribute, rec.answer),
                remaining(catalog, &answers[..n]),
            )
        })
        .collect()
}
