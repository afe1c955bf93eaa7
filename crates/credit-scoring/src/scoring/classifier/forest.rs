//! Random-forest evaluation over the array layout scikit-learn uses for fitted trees.
//!
//! Each tree is stored as parallel arrays indexed by node id. A node is a leaf when its left
//! child is `-1`; otherwise samples with `x[feature] <= threshold` go left. Leaf `value` rows hold
//! per-class sample counts (or fractions), which are normalized at load time.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{CreditClassifier, InferenceError, ModelError};
use crate::scoring::domain::{FEATURE_COUNT, FEATURE_NAMES};

const LEAF: i64 = -1;

/// On-disk representation of a fitted forest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestArtifact {
    pub n_features: usize,
    pub classes: Vec<i64>,
    #[serde(default)]
    pub feature_names: Vec<String>,
    pub trees: Vec<TreeArtifact>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeArtifact {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    pub value: Vec<Vec<f64>>,
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        distribution: Vec<f64>,
    },
}

/// One validated tree.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionTree {
    nodes: Vec<Node>,
}

impl DecisionTree {
    fn from_artifact(
        index: usize,
        tree: TreeArtifact,
        n_features: usize,
        n_classes: usize,
    ) -> Result<Self, ModelError> {
        let len = tree.children_left.len();
        if len == 0 {
            return Err(inconsistent(index, "has no nodes"));
        }
        if tree.children_right.len() != len
            || tree.feature.len() != len
            || tree.threshold.len() != len
            || tree.value.len() != len
        {
            return Err(inconsistent(index, "has node arrays of different lengths"));
        }

        let mut nodes = Vec::with_capacity(len);
        for node in 0..len {
            let left = tree.children_left[node];
            let right = tree.children_right[node];

            if left == LEAF {
                let distribution = normalize(&tree.value[node], n_classes).ok_or_else(|| {
                    inconsistent(index, &format!("leaf {node} has no usable class counts"))
                })?;
                nodes.push(Node::Leaf { distribution });
                continue;
            }

            let left = child_index(left, len).ok_or_else(|| {
                inconsistent(index, &format!("node {node} has an invalid left child"))
            })?;
            let right = child_index(right, len).ok_or_else(|| {
                inconsistent(index, &format!("node {node} has an invalid right child"))
            })?;
            let feature = usize::try_from(tree.feature[node])
                .ok()
                .filter(|feature| *feature < n_features)
                .ok_or_else(|| {
                    inconsistent(index, &format!("node {node} splits on an unknown feature"))
                })?;
            let threshold = tree.threshold[node];
            if !threshold.is_finite() {
                return Err(inconsistent(
                    index,
                    &format!("node {node} has a non-finite threshold"),
                ));
            }

            nodes.push(Node::Split {
                feature,
                threshold,
                left,
                right,
            });
        }

        Ok(Self { nodes })
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|node| matches!(node, Node::Leaf { .. }))
            .count()
    }

    /// Walk from the root to a leaf. The walk is capped at one step per node so a cyclic
    /// artifact fails instead of spinning.
    fn leaf_distribution(&self, tree: usize, features: &[f64]) -> Result<&[f64], InferenceError> {
        let mut cursor = 0;
        for _ in 0..=self.nodes.len() {
            match &self.nodes[cursor] {
                Node::Leaf { distribution } => return Ok(distribution.as_slice()),
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    cursor = if features[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
        Err(InferenceError::UnterminatedTree { tree })
    }
}

fn child_index(raw: i64, len: usize) -> Option<usize> {
    usize::try_from(raw).ok().filter(|child| *child < len)
}

fn normalize(counts: &[f64], n_classes: usize) -> Option<Vec<f64>> {
    if counts.len() != n_classes || counts.iter().any(|count| !count.is_finite() || *count < 0.0) {
        return None;
    }
    let total: f64 = counts.iter().sum();
    if total <= 0.0 {
        return None;
    }
    Some(counts.iter().map(|count| count / total).collect())
}

fn inconsistent(tree: usize, detail: &str) -> ModelError {
    ModelError::Inconsistent(format!("tree {tree} {detail}"))
}

/// Summary exposed to operators through the model metadata endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelSummary {
    pub trees: usize,
    pub nodes: usize,
    pub n_features: usize,
    pub feature_names: Vec<String>,
    pub classes: Vec<i64>,
}

/// Soft-voting forest: class probabilities are the mean of the per-tree leaf distributions.
#[derive(Debug, Clone, PartialEq)]
pub struct RandomForestClassifier {
    n_features: usize,
    classes: Vec<i64>,
    feature_names: Vec<String>,
    trees: Vec<DecisionTree>,
}

impl RandomForestClassifier {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| ModelError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        let artifact: ForestArtifact =
            serde_json::from_slice(&bytes).map_err(|source| ModelError::Malformed {
                path: path.to_path_buf(),
                source,
            })?;

        let forest = Self::from_artifact(artifact)?;
        debug!(path = %path.display(), trees = forest.trees.len(), "loaded forest artifact");
        Ok(forest)
    }

    pub fn from_artifact(artifact: ForestArtifact) -> Result<Self, ModelError> {
        let ForestArtifact {
            n_features,
            classes,
            feature_names,
            trees,
        } = artifact;

        if n_features == 0 {
            return Err(ModelError::Inconsistent(
                "forest declares zero features".to_string(),
            ));
        }
        if classes.is_empty() {
            return Err(ModelError::Inconsistent(
                "forest declares no classes".to_string(),
            ));
        }
        if trees.is_empty() {
            return Err(ModelError::Inconsistent("forest has no trees".to_string()));
        }

        let feature_names = if feature_names.is_empty() {
            default_feature_names(n_features)
        } else if feature_names.len() == n_features {
            feature_names
        } else {
            return Err(ModelError::Inconsistent(format!(
                "forest names {} features but declares {n_features}",
                feature_names.len()
            )));
        };

        if n_features != FEATURE_COUNT {
            warn!(
                n_features,
                expected = FEATURE_COUNT,
                "forest width differs from the application feature vector; inference will fail"
            );
        }

        let n_classes = classes.len();
        let trees = trees
            .into_iter()
            .enumerate()
            .map(|(index, tree)| DecisionTree::from_artifact(index, tree, n_features, n_classes))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            n_features,
            classes,
            feature_names,
            trees,
        })
    }

    pub fn classes(&self) -> &[i64] {
        &self.classes
    }

    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }

    pub fn describe(&self) -> ModelSummary {
        ModelSummary {
            trees: self.trees.len(),
            nodes: self.trees.iter().map(DecisionTree::node_count).sum(),
            n_features: self.n_features,
            feature_names: self.feature_names.clone(),
            classes: self.classes.clone(),
        }
    }

    fn check_shape(&self, features: &[f64]) -> Result<(), InferenceError> {
        if features.len() != self.n_features {
            return Err(InferenceError::ShapeMismatch {
                expected: self.n_features,
                actual: features.len(),
            });
        }
        if let Some(index) = features.iter().position(|value| !value.is_finite()) {
            return Err(InferenceError::NonFiniteFeature { index });
        }
        Ok(())
    }
}

fn default_feature_names(n_features: usize) -> Vec<String> {
    if n_features == FEATURE_COUNT {
        FEATURE_NAMES.iter().map(|name| name.to_string()).collect()
    } else {
        (0..n_features).map(|index| format!("x{index}")).collect()
    }
}

impl CreditClassifier for RandomForestClassifier {
    fn expected_features(&self) -> usize {
        self.n_features
    }

    fn predict(&self, features: &[f64]) -> Result<i64, InferenceError> {
        let proba = self.predict_proba(features)?;
        let mut best = 0;
        for (index, probability) in proba.iter().enumerate() {
            if *probability > proba[best] {
                best = index;
            }
        }
        Ok(self.classes[best])
    }

    fn predict_proba(&self, features: &[f64]) -> Result<Vec<f64>, InferenceError> {
        self.check_shape(features)?;

        let mut totals = vec![0.0; self.classes.len()];
        for (index, tree) in self.trees.iter().enumerate() {
            let distribution = tree.leaf_distribution(index, features)?;
            for (total, share) in totals.iter_mut().zip(distribution) {
                *total += share;
            }
        }

        let count = self.trees.len() as f64;
        Ok(totals.into_iter().map(|total| total / count).collect())
    }

    fn summary(&self) -> Option<ModelSummary> {
        Some(self.describe())
    }
}
