//! Regression model artifacts.
//!
//! The pipeline treats the model as an opaque function of the feature
//! vector. Artifacts are JSON files tagged by `kind`; they are read once at
//! startup and any problem with them is fatal.

use crate::features::{FeatureVector, FEATURE_COUNT};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failure to read or validate a model artifact.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("cannot read model artifact {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse model artifact: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid model artifact: {0}")]
    Invalid(String),
}

/// A trained scalar regressor: feature vector → predicted debris mass (kg).
///
/// Outputs are passed through untouched, negative values included.
pub trait RegressionModel: Send + Sync {
    fn predict(&self, features: &FeatureVector) -> f64;
}

/// `intercept + Σ coefficient·x`
#[derive(Debug, Clone, Deserialize)]
pub struct LinearModel {
    pub intercept: f64,
    pub coefficients: Vec<f64>,
}

impl RegressionModel for LinearModel {
    fn predict(&self, features: &FeatureVector) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(features.values())
                .map(|(c, x)| c * x)
                .sum::<f64>()
    }
}

/// A node of a regression tree; index 0 is the root.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf(f64),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Tree {
    pub nodes: Vec<TreeNode>,
}

impl Tree {
    fn evaluate(&self, x: &[f64; FEATURE_COUNT]) -> f64 {
        let mut index = 0;
        // children point forward, so a walk visits each node at most once
        for _ in 0..self.nodes.len() {
            match &self.nodes[index] {
                TreeNode::Leaf(value) => return *value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if x[*feature] < *threshold { *left } else { *right };
                }
            }
        }
        0.0
    }
}

/// Gradient-boosted ensemble: `base_score + learning_rate · Σ tree(x)`.
#[derive(Debug, Clone, Deserialize)]
pub struct TreeEnsemble {
    pub base_score: f64,
    pub learning_rate: f64,
    pub trees: Vec<Tree>,
}

impl RegressionModel for TreeEnsemble {
    fn predict(&self, features: &FeatureVector) -> f64 {
        let x = features.values();
        self.base_score + self.learning_rate * self.trees.iter().map(|t| t.evaluate(x)).sum::<f64>()
    }
}

/// On-disk artifact layout.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelArtifact {
    Linear(LinearModel),
    TreeEnsemble(TreeEnsemble),
}

impl ModelArtifact {
    /// Parse and validate an artifact from its JSON text.
    pub fn from_json(text: &str) -> Result<Self, ModelError> {
        let artifact: ModelArtifact = serde_json::from_str(text)?;
        artifact.validate()?;
        Ok(artifact)
    }

    fn validate(&self) -> Result<(), ModelError> {
        match self {
            ModelArtifact::Linear(model) => {
                if model.coefficients.len() != FEATURE_COUNT {
                    return Err(ModelError::Invalid(format!(
                        "linear model has {} coefficients, expected {}",
                        model.coefficients.len(),
                        FEATURE_COUNT
                    )));
                }
            }
            ModelArtifact::TreeEnsemble(ensemble) => {
                if ensemble.trees.is_empty() {
                    return Err(ModelError::Invalid("tree ensemble has no trees".to_string()));
                }
                for (t, tree) in ensemble.trees.iter().enumerate() {
                    if tree.nodes.is_empty() {
                        return Err(ModelError::Invalid(format!("tree {} has no nodes", t)));
                    }
                    for (i, node) in tree.nodes.iter().enumerate() {
                        if let TreeNode::Split {
                            feature, left, right, ..
                        } = node
                        {
                            if *feature >= FEATURE_COUNT {
                                return Err(ModelError::Invalid(format!(
                                    "tree {} node {} splits on feature {}",
                                    t, i, feature
                                )));
                            }
                            let n = tree.nodes.len();
                            if *left <= i || *right <= i || *left >= n || *right >= n {
                                return Err(ModelError::Invalid(format!(
                                    "tree {} node {} has out-of-order children",
                                    t, i
                                )));
                            }
                        }
                    }
                }
            }
        }
        Ok(())
    }

    pub fn into_model(self) -> Box<dyn RegressionModel> {
        match self {
            ModelArtifact::Linear(model) => Box::new(model),
            ModelArtifact::TreeEnsemble(ensemble) => Box::new(ensemble),
        }
    }
}

/// Load a model artifact from disk.
pub fn load_model(path: &Path) -> Result<Box<dyn RegressionModel>, ModelError> {
    let text = std::fs::read_to_string(path).map_err(|source| ModelError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let artifact = ModelArtifact::from_json(&text)?;
    log::info!("Loaded model artifact from {}", path.display());
    Ok(artifact.into_model())
}
