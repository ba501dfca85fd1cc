// SPDX-FileCopyrightText: 2026 Santhosh Shyamsundar, Prabhu S., and Studio Tyto
// SPDX-License-Identifier: MIT
//! Error taxonomy for recipe prediction and inverse design.
//!
//! Three families are distinguished:
//! - configuration errors (missing predictor, missing or malformed schema),
//!   raised before any search starts;
//! - input errors (empty or malformed targets, non-finite process values);
//! - search-quality errors, carrying the achieved loss so a caller can decide
//!   whether to retry with relaxed weights or another seed.

use std::path::PathBuf;

use thiserror::Error;

use crate::tensors::SchemaFamily;

/// Errors produced by the recipe core.
#[derive(Debug, Error)]
pub enum RecipeError {
    /// The request named no target property.
    #[error("no target property given")]
    NoTargets,

    /// A target is malformed (non-finite value, negative weight, blank name).
    #[error("invalid target '{property}': {reason}")]
    InvalidTarget { property: String, reason: String },

    /// A fixed process parameter is not a finite number.
    #[error("invalid process parameter '{parameter}': {value}")]
    InvalidProcessParameter { parameter: &'static str, value: f64 },

    /// No trained predictor is registered for the property.
    #[error("model unavailable for property '{property}'")]
    ModelUnavailable { property: String },

    /// The feature schema of a predictor family could not be found.
    #[error("feature schema for {family} predictors unavailable ({path})")]
    SchemaUnavailable { family: SchemaFamily, path: String },

    /// The predictor expects a different input width than its schema provides.
    #[error("predictor for '{property}' expects {expected} features, schema has {actual}")]
    SchemaMismatch {
        property: String,
        expected: usize,
        actual: usize,
    },

    /// None of the configured primary monomers appears in any target schema.
    #[error("none of the primary monomers {0:?} is a feature of the requested predictors")]
    NoSearchableMonomers(Vec<String>),

    /// A feature schema file is malformed.
    #[error("invalid feature schema: {0}")]
    InvalidSchema(String),

    /// A serialized predictor is malformed.
    #[error("invalid model '{name}': {reason}")]
    InvalidModel { name: String, reason: String },

    /// An optimizer setting is out of range.
    #[error("invalid optimizer configuration: {0}")]
    InvalidConfig(String),

    /// The search finished without reaching the acceptance threshold.
    #[error("failed to find a recipe (loss {loss:.4}, threshold {threshold})")]
    SearchFailed { loss: f64, threshold: f64 },

    /// Filesystem access failed.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A JSON document could not be parsed.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for the recipe core.
pub type Result<T> = std::result::Result<T, RecipeError>;

impl RecipeError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        RecipeError::Io {
            path: path.into(),
            source,
        }
    }

    /// True for errors detected before the search begins.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            RecipeError::ModelUnavailable { .. }
                | RecipeError::SchemaUnavailable { .. }
                | RecipeError::SchemaMismatch { .. }
                | RecipeError::NoSearchableMonomers(_)
                | RecipeError::InvalidSchema(_)
                | RecipeError::InvalidModel { .. }
                | RecipeError::InvalidConfig(_)
                | RecipeError::Io { .. }
        )
    }
}
