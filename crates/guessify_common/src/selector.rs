//! Next-question selection.
//!
//! Attributes are ranked by model importance, but the pick inside the top of
//! the ranking is random so consecutive games do not repeat the same opening.

use crate::catalog::Catalog;
use crate::classifier::Classifier;
use crate::error::Result;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

/// Selector tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectorConfig {
    /// Attributes at or below this importance never enter the ranked pool
    #[serde(default = "default_importance_threshold")]
    pub importance_threshold: f64,

    /// Answers needed before the pool widens
    #[serde(default = "default_warmup_questions")]
    pub warmup_questions: usize,

    /// Pool size during warm-up
    #[serde(default = "default_early_pool")]
    pub early_pool: usize,

    /// Pool size after warm-up
    #[serde(default = "default_late_pool")]
    pub late_pool: usize,
}

fn default_importance_threshold() -> f64 {
    0.01
}

fn default_warmup_questions() -> usize {
    5
}

fn default_early_pool() -> usize {
    5
}

fn default_late_pool() -> usize {
    15
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            importance_threshold: default_importance_threshold(),
            warmup_questions: default_warmup_questions(),
            early_pool: default_early_pool(),
            late_pool: default_late_pool(),
        }
    }
}

/// Ranked candidate pool from an importance list (highest first).
///
/// Empty when every unanswered attribute is at or below the threshold.
pub fn pool_from_ranking(
    ranking: &[(String, f64)],
    answered: &HashSet<&str>,
    config: &SelectorConfig,
) -> Vec<String> {
    let important: Vec<&String> = ranking
        .iter()
        .filter(|(key, weight)| !answered.contains(key.as_str()) && *weight > config.importance_threshold)
        .map(|(key, _)| key)
        .collect();

    let size = if answered.len() < config.warmup_questions {
        config.early_pool
    } else {
        config.late_pool
    };
    important.into_iter().take(size).cloned().collect()
}

/// Candidate pool for the current turn
pub fn candidate_pool(
    answered: &HashSet<&str>,
    model: &Classifier,
    config: &SelectorConfig,
) -> Result<Vec<String>> {
    let ranking = model.feature_importance()?;
    Ok(pool_from_ranking(&ranking, answered, config))
}

/// Pick the next attribute to ask about, or None when everything is answered
pub fn next_attribute<R: Rng + ?Sized>(
    answered: &HashSet<&str>,
    model: &Classifier,
    catalog: &Catalog,
    config: &SelectorConfig,
    rng: &mut R,
) -> Result<Option<String>> {
    let unanswered: Vec<&String> = catalog
        .attributes()
        .iter()
        .filter(|key| !answered.contains(key.as_str()))
        .collect();
    if unanswered.is_empty() {
        return Ok(None);
    }

    let pool = candidate_pool(answered, model, config)?;
    debug!("Question pool ({} answered): {:?}", answered.len(), pool);
    if let Some(choice) = pool.choose(&mut *rng) {
        return Ok(Some(choice.clone()));
    }

    debug!("No important attributes left, picking from {} unanswered", unanswered.len());
    Ok(unanswered.choose(rng).map(|key| (*key).clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::ModelConfig;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn ranking(items: &[(&str, f64)]) -> Vec<(String, f64)> {
        items.iter().map(|(k, w)| (k.to_string(), *w)).collect()
    }

    #[test]
    fn test_pool_excludes_low_importance() {
        let ranked = ranking(&[
            ("actor", 0.5),
            ("musician", 0.3),
            ("athlete", 0.02),
            ("scientist", 0.005),
        ]);
        let pool = pool_from_ranking(&ranked, &HashSet::new(), &SelectorConfig::default());
        assert_eq!(pool, vec!["actor", "musician", "athlete"]);
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let ranked = ranking(&[("actor", 0.5), ("edge", 0.01)]);
        let pool = pool_from_ranking(&ranked, &HashSet::new(), &SelectorConfig::default());
        assert_eq!(pool, vec!["actor"]);
    }

    #[test]
    fn test_pool_widens_after_warmup() {
        let keys: Vec<String> = (0..25).map(|i| format!("a{:02}", i)).collect();
        let ranked: Vec<(String, f64)> = keys
            .iter()
            .enumerate()
            .map(|(i, k)| (k.clone(), 1.0 - i as f64 * 0.01))
            .collect();

        let few: HashSet<&str> = keys[..4].iter().map(|k| k.as_str()).collect();
        let pool = pool_from_ranking(&ranked, &few, &SelectorConfig::default());
        assert_eq!(pool, vec!["a04", "a05", "a06", "a07", "a08"]);

        let five: HashSet<&str> = keys[..5].iter().map(|k| k.as_str()).collect();
        let pool = pool_from_ranking(&ranked, &five, &SelectorConfig::default());
        assert_eq!(pool.len(), 15);
        assert_eq!(pool[0], "a05");

        let many: HashSet<&str> = keys[..15].iter().map(|k| k.as_str()).collect();
        let pool = pool_from_ranking(&ranked, &many, &SelectorConfig::default());
        assert_eq!(pool.len(), 10);
    }

    #[test]
    fn test_next_attribute_none_when_exhausted() {
        let cat = Catalog::parse("name,actor,musician\nA,yes,no\nB,yes,yes\nC,no,no\n").unwrap();
        let model = Classifier::train(&cat, ModelConfig::default()).unwrap();
        let answered: HashSet<&str> = ["actor", "musician"].into_iter().collect();
        let mut rng = StdRng::seed_from_u64(1);
        let next = next_attribute(&answered, &model, &cat, &SelectorConfig::default(), &mut rng)
            .unwrap();
        assert_eq!(next, None);
    }

    #[test]
    fn test_fallback_to_unimportant_attribute() {
        // 'alive' is constant, so its importance is zero
        let cat = Catalog::parse("name,actor,alive\nA,yes,yes\nB,no,yes\n").unwrap();
        let model = Classifier::train(&cat, ModelConfig::default()).unwrap();
        let answered: HashSet<&str> = ["actor"].into_iter().collect();
        let mut rng = StdRng::seed_from_u64(7);
        let next = next_attribute(&answered, &model, &cat, &SelectorConfig::default(), &mut rng)
            .unwrap();
        assert_eq!(next.as_deref(), Some("alive"));
    }

    #[test]
    fn test_same_seed_same_choice() {
        let cat = Catalog::parse(
            "name,a,b,c,d\nP,yes,no,yes,no\nQ,no,yes,yes,no\nR,yes,yes,no,no\nS,no,no,no,yes\n",
        )
        .unwrap();
        let model = Classifier::train(&cat, ModelConfig::default()).unwrap();
        let answered = HashSet::new();
        let config = SelectorConfig::default();
        let first = next_attribute(&answered, &model, &cat, &config, &mut StdRng::seed_from_u64(3))
            .unwrap();
        let second = next_attribute(&answered, &model, &cat, &config, &mut StdRng::seed_from_u64(3))
            .unwrap();
        assert_eq!(first, second);
        assert!(first.is_some());
    }

    #[test]
    fn test_untrained_model_propagates() {
        let cat = Catalog::parse("name,actor\nA,yes\n").unwrap();
        let model = Classifier::untrained(ModelConfig::default());
        let mut rng = StdRng::seed_from_u64(0);
        assert!(next_attribute(&HashSet::new(), &model, &cat, &SelectorConfig::default(), &mut rng)
            .is_err());
    }
}
