// SPDX-FileCopyrightText: 2026 Santhosh Shyamsundar, Prabhu S., and Studio Tyto
// SPDX-License-Identifier: MIT
use serde::{Deserialize, Serialize};

use super::Predictor;
use crate::error::{RecipeError, Result};

/// `intercept + sum(coefficients[i] * x[i])`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    #[serde(default)]
    pub intercept: f64,
    pub coefficients: Vec<f64>,
}

impl LinearModel {
    pub fn new(intercept: f64, coefficients: Vec<f64>) -> Self {
        Self {
            intercept,
            coefficients,
        }
    }

    pub fn validate(&self, name: &str) -> Result<()> {
        if self.coefficients.is_empty() {
            return Err(RecipeError::InvalidModel {
                name: name.to_string(),
                reason: "no coefficients".to_string(),
            });
        }
        if !self.intercept.is_finite() || self.coefficients.iter().any(|c| !c.is_finite()) {
            return Err(RecipeError::InvalidModel {
                name: name.to_string(),
                reason: "non-finite coefficient".to_string(),
            });
        }
        Ok(())
    }
}

impl Predictor for LinearModel {
    fn predict(&self, features: &[f64]) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(features)
                .map(|(c, x)| c * x)
                .sum::<f64>()
    }

    fn n_features(&self) -> Option<usize> {
        Some(self.coefficients.len())
    }

    fn kind(&self) -> &'static str {
        "linear"
    }
}
