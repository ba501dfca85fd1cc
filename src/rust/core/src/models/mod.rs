// SPDX-FileCopyrightText: 2026 Santhosh Shyamsundar, Prabhu S., and Studio Tyto
// SPDX-License-Identifier: MIT
//! Property Predictors
//!
//! Trained regression models are opaque to the optimizer: it only sees the
//! [`Predictor`] trait. Serialized models are exported from the training
//! pipeline as JSON documents (see [`ModelFile`]).
//!
//! - forest.rs: tree-ensemble (random forest) regressor
//! - linear.rs: linear regressor
//! - registry.rs: explicit, caller-owned property -> predictor registry

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::tensors::SchemaFamily;

pub mod forest;
pub mod linear;
pub mod registry;

pub use forest::{ForestModel, RegressionTree, TreeNode};
pub use linear::LinearModel;
pub use registry::{model_file_stem, BoundPredictor, PredictorRegistry, RegistryBundle};

/// A trained regression model: ordered feature vector in, scalar out.
///
/// Implementations are immutable once built, so one instance can be shared
/// across concurrent optimization calls.
pub trait Predictor: Send + Sync + fmt::Debug {
    /// Predict from a vector laid out in the model's training column order.
    fn predict(&self, features: &[f64]) -> f64;

    /// Input width the model was trained with, when known.
    fn n_features(&self) -> Option<usize> {
        None
    }

    /// Short model family name for logs.
    fn kind(&self) -> &'static str;
}

/// Adapter turning a closure into a [`Predictor`].
pub struct FnPredictor<F> {
    f: F,
    n_features: Option<usize>,
}

impl<F> FnPredictor<F>
where
    F: Fn(&[f64]) -> f64 + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self { f, n_features: None }
    }

    pub fn with_features(f: F, n_features: usize) -> Self {
        Self {
            f,
            n_features: Some(n_features),
        }
    }
}

impl<F> fmt::Debug for FnPredictor<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnPredictor")
            .field("n_features", &self.n_features)
            .finish_non_exhaustive()
    }
}

impl<F> Predictor for FnPredictor<F>
where
    F: Fn(&[f64]) -> f64 + Send + Sync,
{
    fn predict(&self, features: &[f64]) -> f64 {
        (self.f)(features)
    }

    fn n_features(&self) -> Option<usize> {
        self.n_features
    }

    fn kind(&self) -> &'static str {
        "function"
    }
}

/// Serialized model body, tagged by `kind`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelDocument {
    RandomForest(ForestModel),
    Linear(LinearModel),
}

impl ModelDocument {
    /// Validate and wrap as a shareable predictor.
    pub fn into_predictor(self, name: &str) -> Result<Arc<dyn Predictor>> {
        match self {
            ModelDocument::RandomForest(forest) => {
                forest.validate(name)?;
                Ok(Arc::new(forest))
            }
            ModelDocument::Linear(linear) => {
                linear.validate(name)?;
                Ok(Arc::new(linear))
            }
        }
    }
}

/// On-disk model file: the model plus the schema family it was trained on.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ModelFile {
    /// Defaults to [`SchemaFamily::for_property`] of the property name.
    #[serde(default)]
    pub schema: Option<SchemaFamily>,
    pub model: ModelDocument,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn _assert_object_safe(_: &dyn Predictor) {}

    #[test]
    fn test_model_file_tagging() {
        let file: ModelFile = serde_json::from_value(json!({
            "schema": "coating",
            "model": { "kind": "linear", "intercept": 1.0, "coefficients": [2.0, 0.5] }
        }))
        .unwrap();
        assert_eq!(file.schema, Some(SchemaFamily::Coating));

        let predictor = file.model.into_predictor("adhesion").unwrap();
        assert_eq!(predictor.kind(), "linear");
        assert_eq!(predictor.n_features(), Some(2));
        assert_eq!(predictor.predict(&[1.0, 2.0]), 4.0);
    }

    #[test]
    fn test_fn_predictor() {
        let p = FnPredictor::with_features(|x: &[f64]| x.iter().sum(), 3);
        assert_eq!(p.predict(&[1.0, 2.0, 3.0]), 6.0);
        assert_eq!(p.n_features(), Some(3));
    }
}
