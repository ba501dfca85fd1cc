// SPDX-FileCopyrightText: 2026 Santhosh Shyamsundar, Prabhu S., and Studio Tyto
// SPDX-License-Identifier: MIT
//! Forward prediction
//!
//! The inverse of the optimizer: recipe and process conditions in, every
//! available property out. Also used to check how strongly the trained
//! models respond to one process parameter while the recipe is held fixed.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::models::{BoundPredictor, PredictorRegistry};
use crate::request::{FixedProcessParameters, ProcessParameter};
use crate::science::descriptors::DescriptorEngine;
use crate::tensors::{FeatureAssembler, MonomerComposition};

/// Predictions at one value of the swept parameter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SweepPoint {
    pub value: f64,
    pub predictions: BTreeMap<String, f64>,
}

pub struct ForecastEngine;

impl ForecastEngine {
    /// Predict every property the registry can serve.
    ///
    /// Properties with a missing schema or unusable model are left out.
    pub fn predict_all(
        registry: &mut PredictorRegistry,
        params: &FixedProcessParameters,
        composition: &MonomerComposition,
    ) -> Result<BTreeMap<String, f64>> {
        params.validate()?;
        let models = bind_all(registry)?;
        Ok(predict_with(&models, params, composition))
    }

    /// Vary `parameter` over `values`, everything else held at `base`.
    pub fn sweep_process_parameter(
        registry: &mut PredictorRegistry,
        base: &FixedProcessParameters,
        composition: &MonomerComposition,
        parameter: ProcessParameter,
        values: &[f64],
    ) -> Result<Vec<SweepPoint>> {
        let models = bind_all(registry)?;
        info!(%parameter, points = values.len(), properties = models.len(), "sensitivity sweep");

        values
            .iter()
            .map(|&value| {
                let mut params = *base;
                params.set(parameter, value);
                params.validate()?;
                let predictions = predict_with(&models, &params, composition);
                debug!(%parameter, value, ?predictions, "sweep point");
                Ok(SweepPoint { value, predictions })
            })
            .collect()
    }
}

/// Bind every available property; ones whose model or schema cannot be used
/// are skipped with a warning.
fn bind_all(registry: &mut PredictorRegistry) -> Result<Vec<BoundPredictor>> {
    let mut models = Vec::new();
    for property in registry.available_properties()? {
        match registry.bind(&property) {
            Ok(model) => models.push(model),
            Err(e) if e.is_configuration() => {
                warn!(property = %property, error = %e, "skipping property");
            }
            Err(e) => return Err(e),
        }
    }
    Ok(models)
}

fn predict_with(
    models: &[BoundPredictor],
    params: &FixedProcessParameters,
    composition: &MonomerComposition,
) -> BTreeMap<String, f64> {
    let descriptors = DescriptorEngine::compute(composition);
    let mut row = Vec::new();
    models
        .iter()
        .map(|model| {
            FeatureAssembler::assemble_into(&model.schema, params, composition, &descriptors, &mut row);
            (model.property.clone(), model.predictor.predict(&row))
        })
        .collect()
}
