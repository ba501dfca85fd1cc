// SPDX-FileCopyrightText: 2026 Santhosh Shyamsundar, Prabhu S., and Studio Tyto
// SPDX-License-Identifier: MIT

//! WebAssembly bridge for the formulation dashboard
//!
//! JSON strings in, JSON string out. Models travel as a [`RegistryBundle`]
//! since the browser has no model directory. Every failure is folded into
//! the response's `error` field; nothing panics across the boundary.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

use crate::config::OptimizerConfig;
use crate::error::Result;
use crate::forecast::ForecastEngine;
use crate::models::PredictorRegistry;
use crate::optimization::{OptimizedRecipe, RecipeOptimizer};
use crate::request::{FixedProcessParameters, OptimizationRequest};
use crate::tensors::MonomerComposition;

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct BridgeResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipe: Option<OptimizedRecipe>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub predictions: Option<BTreeMap<String, f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BridgeResponse {
    fn into_json(self) -> String {
        serde_json::to_string(&self)
            .unwrap_or_else(|e| format!("{{\"error\":\"failed to encode response: {}\"}}", e))
    }
}

impl<T> From<Result<T>> for BridgeResponse
where
    T: Into<BridgeResponse>,
{
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(value) => value.into(),
            Err(e) => BridgeResponse {
                error: Some(e.to_string()),
                ..Default::default()
            },
        }
    }
}

impl From<OptimizedRecipe> for BridgeResponse {
    fn from(recipe: OptimizedRecipe) -> Self {
        BridgeResponse {
            predictions: Some(recipe.predictions()),
            recipe: Some(recipe),
            error: None,
        }
    }
}

impl From<BTreeMap<String, f64>> for BridgeResponse {
    fn from(predictions: BTreeMap<String, f64>) -> Self {
        BridgeResponse {
            predictions: Some(predictions),
            ..Default::default()
        }
    }
}

#[derive(Deserialize)]
struct PredictRequest {
    composition: MonomerComposition,
    #[serde(default)]
    fixed_params: FixedProcessParameters,
}

#[wasm_bindgen]
pub struct RecipeBridge;

#[wasm_bindgen]
impl RecipeBridge {
    /// Inverse design.
    ///
    /// Args:
    /// - request: `{"targets": [{"name", "target_value", "weight"}], "fixed_params": {...}}`
    /// - registry: `{"schemas": {"synthesis": [...]}, "models": {"Tg": {...}}}`
    /// - config: `OptimizerConfig` JSON; empty string for defaults
    ///
    /// Returns:
    /// - `{"recipe": {...}, "predictions": {...}}` or `{"error": "..."}`
    pub fn optimize(request: &str, registry: &str, config: &str) -> String {
        BridgeResponse::from(run_optimize(request, registry, config)).into_json()
    }

    /// Forward prediction of every bundled property.
    ///
    /// `request` is `{"composition": {"BA": 70, ...}, "fixed_params": {...}}`.
    pub fn predict(request: &str, registry: &str) -> String {
        BridgeResponse::from(run_predict(request, registry)).into_json()
    }
}

fn run_optimize(request: &str, registry: &str, config: &str) -> Result<OptimizedRecipe> {
    let request: OptimizationRequest = serde_json::from_str(request)?;
    let mut registry = PredictorRegistry::from_bundle_json(registry)?;
    let config = if config.trim().is_empty() {
        OptimizerConfig::default()
    } else {
        OptimizerConfig::from_json(config)?
    };
    RecipeOptimizer::new(config)?.optimize(&mut registry, &request)
}

fn run_predict(request: &str, registry: &str) -> Result<BTreeMap<String, f64>> {
    let request: PredictRequest = serde_json::from_str(request)?;
    let mut registry = PredictorRegistry::from_bundle_json(registry)?;
    ForecastEngine::predict_all(&mut registry, &request.fixed_params, &request.composition)
}
