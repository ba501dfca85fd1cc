// SPDX-FileCopyrightText: 2026 Santhosh Shyamsundar, Prabhu S., and Studio Tyto
// SPDX-License-Identifier: MIT
//! Tree-ensemble regressor
//!
//! Mirrors the array layout a random-forest trainer exports: every tree is a
//! flat node list rooted at index 0, split nodes send a sample left when
//! `x[feature] <= threshold`, and the ensemble predicts the mean of its trees.

use serde::{Deserialize, Serialize};

use super::Predictor;
use crate::error::{RecipeError, Result};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    pub nodes: Vec<TreeNode>,
}

impl RegressionTree {
    pub fn predict(&self, features: &[f64]) -> f64 {
        let mut idx = 0;
        // Children always sit after their parent (checked in validate), so this terminates.
        while let Some(node) = self.nodes.get(idx) {
            match node {
                TreeNode::Leaf { value } => return *value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let x = features.get(*feature).copied().unwrap_or(0.0);
                    idx = if x <= *threshold { *left } else { *right };
                }
            }
        }
        0.0
    }

    fn validate(&self, n_features: usize) -> std::result::Result<(), String> {
        if self.nodes.is_empty() {
            return Err("empty tree".to_string());
        }
        for (i, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Leaf { value } => {
                    if !value.is_finite() {
                        return Err(format!("node {}: non-finite leaf value", i));
                    }
                }
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= n_features {
                        return Err(format!(
                            "node {}: feature {} out of range ({} features)",
                            i, feature, n_features
                        ));
                    }
                    if threshold.is_nan() {
                        return Err(format!("node {}: NaN threshold", i));
                    }
                    for child in [*left, *right] {
                        if child <= i || child >= self.nodes.len() {
                            return Err(format!("node {}: invalid child index {}", i, child));
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

/// Random-forest regressor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ForestModel {
    pub n_features: usize,
    pub trees: Vec<RegressionTree>,
}

impl ForestModel {
    pub fn validate(&self, name: &str) -> Result<()> {
        let invalid = |reason: String| RecipeError::InvalidModel {
            name: name.to_string(),
            reason,
        };
        if self.n_features == 0 {
            return Err(invalid("n_features must be positive".to_string()));
        }
        if self.trees.is_empty() {
            return Err(invalid("ensemble has no trees".to_string()));
        }
        for (t, tree) in self.trees.iter().enumerate() {
            tree.validate(self.n_features)
                .map_err(|reason| invalid(format!("tree {}: {}", t, reason)))?;
        }
        Ok(())
    }
}

impl Predictor for ForestModel {
    fn predict(&self, features: &[f64]) -> f64 {
        if self.trees.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.trees.iter().map(|t| t.predict(features)).sum();
        sum / self.trees.len() as f64
    }

    fn n_features(&self) -> Option<usize> {
        Some(self.n_features)
    }

    fn kind(&self) -> &'static str {
        "random_forest"
    }
}
