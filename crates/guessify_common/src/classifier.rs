//! Decision-tree classifier over boolean attribute vectors.
//!
//! CART with Gini impurity and a best-split search over every attribute.
//! Every entity is its own class, so a fully grown tree reaches 100% training
//! accuracy unless two entities share an identical vector.
//!
//! Tie-breaking between equally good splits depends on the order attributes
//! are visited at each node. That order is shuffled by a seeded `StdRng`, so
//! a fixed seed always yields the same tree, the same importances, and
//! therefore the same question ranking.

use crate::catalog::Catalog;
use crate::error::{GuessError, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{info, warn};

/// Tree-building parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Seed for the per-node attribute shuffle
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Maximum tree depth (None = grow until pure)
    #[serde(default)]
    pub max_depth: Option<usize>,

    /// Minimum samples a node needs to be split
    #[serde(default = "default_min_samples_split")]
    pub min_samples_split: usize,

    /// Minimum samples on each side of a split
    #[serde(default = "default_min_samples_leaf")]
    pub min_samples_leaf: usize,
}

fn default_seed() -> u64 {
    42
}

fn default_min_samples_split() -> usize {
    2
}

fn default_min_samples_leaf() -> usize {
    1
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            max_depth: None,
            min_samples_split: default_min_samples_split(),
            min_samples_leaf: default_min_samples_leaf(),
        }
    }
}

/// Result of a single prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Most probable entity
    pub label: String,
    /// Probability of the label
    pub confidence: f64,
    /// One probability per entity, in catalog order
    pub probabilities: Vec<f64>,
}

/// Training-set evaluation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    pub entities: usize,
    pub attributes: usize,
    pub accuracy: f64,
    /// (true name, predicted name) for every misclassified entity
    pub misclassified: Vec<(String, String)>,
    /// Groups of entities sharing an identical attribute vector
    pub indistinguishable: Vec<Vec<String>>,
    pub depth: usize,
    pub leaves: usize,
}

impl TrainingReport {
    pub fn is_perfect(&self) -> bool {
        self.misclassified.is_empty()
    }
}

#[derive(Debug, Clone)]
enum Node {
    Leaf {
        /// Class distribution, normalized
        distribution: Vec<f64>,
    },
    Split {
        attribute: usize,
        /// Branch taken when the attribute is false
        when_false: usize,
        /// Branch taken when the attribute is true
        when_true: usize,
    },
}

#[derive(Debug, Clone)]
struct Tree {
    nodes: Vec<Node>,
    attributes: Vec<String>,
    classes: Vec<String>,
    class_index: HashMap<String, usize>,
    importances: Vec<f64>,
    depth: usize,
}

/// Trained (or not yet trained) classifier
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    config: ModelConfig,
    tree: Option<Tree>,
}

impl Classifier {
    /// An untrained model; `fit` must run before any prediction
    pub fn untrained(config: ModelConfig) -> Self {
        Self { config, tree: None }
    }

    /// Train a model on the whole catalog
    pub fn train(catalog: &Catalog, config: ModelConfig) -> Result<Self> {
        let mut model = Self::untrained(config);
        model.fit(catalog)?;
        Ok(model)
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub fn is_trained(&self) -> bool {
        self.tree.is_some()
    }

    /// Fit the tree on every catalog entity
    pub fn fit(&mut self, catalog: &Catalog) -> Result<()> {
        if catalog.is_empty() {
            return Err(GuessError::Data("cannot train on an empty catalog".to_string()));
        }
        if self.config.min_samples_leaf == 0 || self.config.min_samples_split < 2 {
            return Err(GuessError::Data(format!(
                "invalid tree parameters: min_samples_leaf={} min_samples_split={}",
                self.config.min_samples_leaf, self.config.min_samples_split
            )));
        }

        let mut builder = Builder {
            config: &self.config,
            rows: catalog.entities().iter().map(|e| e.values.as_slice()).collect(),
            n_classes: catalog.len(),
            n_attributes: catalog.attributes().len(),
            rng: StdRng::seed_from_u64(self.config.seed),
            nodes: Vec::new(),
            raw_importance: vec![0.0; catalog.attributes().len()],
            depth: 0,
        };
        let samples: Vec<usize> = (0..catalog.len()).collect();
        builder.grow(&samples, 0);

        let total: f64 = builder.raw_importance.iter().sum();
        let importances = if total > 0.0 {
            builder.raw_importance.iter().map(|w| w / total).collect()
        } else {
            builder.raw_importance.clone()
        };

        let classes: Vec<String> = catalog.entities().iter().map(|e| e.name.clone()).collect();
        let class_index = classes
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();

        self.tree = Some(Tree {
            nodes: builder.nodes,
            attributes: catalog.attributes().to_vec(),
            classes,
            class_index,
            importances,
            depth: builder.depth,
        });

        let report = self.evaluate(catalog)?;
        info!(
            "Trained decision tree: {} entities, {} leaves, depth {}, accuracy {:.2}%",
            report.entities,
            report.leaves,
            report.depth,
            report.accuracy * 100.0
        );
        if !report.is_perfect() {
            warn!(
                "Model cannot tell {} entities apart; add attributes to separate them",
                report.misclassified.len()
            );
            for group in &report.indistinguishable {
                warn!("Identical attribute vectors: {}", group.join(", "));
            }
        }
        Ok(())
    }

    fn tree(&self) -> Result<&Tree> {
        self.tree.as_ref().ok_or(GuessError::NotReady)
    }

    /// Predict the most likely entity for an attribute vector
    pub fn predict(&self, vector: &[bool]) -> Result<Prediction> {
        let tree = self.tree()?;
        if vector.len() != tree.attributes.len() {
            return Err(GuessError::Data(format!(
                "expected {} attribute values, got {}",
                tree.attributes.len(),
                vector.len()
            )));
        }

        let mut idx = 0;
        let distribution = loop {
            match &tree.nodes[idx] {
                Node::Leaf { distribution } => break distribution,
                Node::Split {
                    attribute,
                    when_false,
                    when_true,
                } => idx = if vector[*attribute] { *when_true } else { *when_false },
            }
        };

        let (best, confidence) = argmax(distribution);
        Ok(Prediction {
            label: tree.classes[best].clone(),
            confidence,
            probabilities: distribution.clone(),
        })
    }

    /// Probability the model assigns to a named entity
    pub fn probability_of(&self, prediction: &Prediction, name: &str) -> Option<f64> {
        let tree = self.tree.as_ref()?;
        tree.class_index
            .get(name)
            .and_then(|&i| prediction.probabilities.get(i))
            .copied()
    }

    /// Attribute importances, highest first (ties keep catalog order)
    pub fn feature_importance(&self) -> Result<Vec<(String, f64)>> {
        let tree = self.tree()?;
        let mut ranked: Vec<(String, f64)> = tree
            .attributes
            .iter()
            .cloned()
            .zip(tree.importances.iter().copied())
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        Ok(ranked)
    }

    /// Evaluate the model against the catalog it was trained on
    pub fn evaluate(&self, catalog: &Catalog) -> Result<TrainingReport> {
        let tree = self.tree()?;
        let mut misclassified = Vec::new();
        for entity in catalog.entities() {
            let prediction = self.predict(&entity.values)?;
            if prediction.label != entity.name {
                misclassified.push((entity.name.clone(), prediction.label));
            }
        }

        let mut groups: HashMap<&[bool], Vec<String>> = HashMap::new();
        let mut order: Vec<&[bool]> = Vec::new();
        for entity in catalog.entities() {
            let key = entity.values.as_slice();
            let group = groups.entry(key).or_default();
            if group.is_empty() {
                order.push(key);
            }
            group.push(entity.name.clone());
        }
        let indistinguishable = order
            .into_iter()
            .filter_map(|key| groups.remove(key))
            .filter(|group| group.len() > 1)
            .collect();

        let entities = catalog.len();
        Ok(TrainingReport {
            entities,
            attributes: catalog.attributes().len(),
            accuracy: (entities - misclassified.len()) as f64 / entities as f64,
            misclassified,
            indistinguishable,
            depth: tree.depth,
            leaves: tree.nodes.iter().filter(|n| matches!(n, Node::Leaf { .. })).count(),
        })
    }
}

/// First index holding the maximum value
fn argmax(values: &[f64]) -> (usize, f64) {
    let mut best = (0, f64::NEG_INFINITY);
    for (i, &v) in values.iter().enumerate() {
        if v > best.1 {
            best = (i, v);
        }
    }
    best
}

fn gini(counts: &[usize], total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    1.0 - counts
        .iter()
        .map(|&c| {
            let p = c as f64 / total;
            p * p
        })
        .sum::<f64>()
}

struct Builder<'a> {
    config: &'a ModelConfig,
    rows: Vec<&'a [bool]>,
    n_classes: usize,
    n_attributes: usize,
    rng: StdRng,
    nodes: Vec<Node>,
    raw_importance: Vec<f64>,
    depth: usize,
}

struct SplitChoice {
    attribute: usize,
    improvement: f64,
    when_false: Vec<usize>,
    when_true: Vec<usize>,
}

impl<'a> Builder<'a> {
    fn class_counts(&self, samples: &[usize]) -> Vec<usize> {
        let mut counts = vec![0; self.n_classes];
        for &s in samples {
            // entity i is class i
            counts[s] += 1;
        }
        counts
    }

    /// Grow a subtree and return its node index
    fn grow(&mut self, samples: &[usize], depth: usize) -> usize {
        self.depth = self.depth.max(depth);
        let counts = self.class_counts(samples);
        let impurity = gini(&counts, samples.len());

        let at_depth_limit = self.config.max_depth.map_or(false, |max| depth >= max);
        let split = if impurity <= f64::EPSILON
            || samples.len() < self.config.min_samples_split
            || at_depth_limit
        {
            None
        } else {
            self.best_split(samples, impurity)
        };

        let Some(split) = split else {
            let n = samples.len() as f64;
            self.nodes.push(Node::Leaf {
                distribution: counts.iter().map(|&c| c as f64 / n).collect(),
            });
            return self.nodes.len() - 1;
        };

        self.raw_importance[split.attribute] += split.improvement;

        // reserve the slot so the parent precedes its children
        let idx = self.nodes.len();
        self.nodes.push(Node::Leaf { distribution: Vec::new() });
        let when_false = self.grow(&split.when_false, depth + 1);
        let when_true = self.grow(&split.when_true, depth + 1);
        self.nodes[idx] = Node::Split {
            attribute: split.attribute,
            when_false,
            when_true,
        };
        idx
    }

    fn best_split(&mut self, samples: &[usize], impurity: f64) -> Option<SplitChoice> {
        let mut order: Vec<usize> = (0..self.n_attributes).collect();
        order.shuffle(&mut self.rng);

        let total = self.rows.len() as f64;
        let n = samples.len();
        let mut best: Option<SplitChoice> = None;

        for attribute in order {
            let (when_true, when_false): (Vec<usize>, Vec<usize>) =
                samples.iter().partition(|&&s| self.rows[s][attribute]);
            if when_true.len() < self.config.min_samples_leaf
                || when_false.len() < self.config.min_samples_leaf
            {
                continue;
            }

            let gini_true = gini(&self.class_counts(&when_true), when_true.len());
            let gini_false = gini(&self.class_counts(&when_false), when_false.len());
            let weighted_children = (when_true.len() as f64 * gini_true
                + when_false.len() as f64 * gini_false)
                / n as f64;
            let improvement = n as f64 / total * (impurity - weighted_children);

            if best.as_ref().map_or(true, |b| improvement > b.improvement) {
                best = Some(SplitChoice {
                    attribute,
                    improvement,
                    when_false,
                    when_true,
                });
            }
        }
        best
    }
}
