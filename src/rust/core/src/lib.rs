// SPDX-FileCopyrightText: 2026 Santhosh Shyamsundar, Prabhu S., and Studio Tyto
// SPDX-License-Identifier: MIT
//
// Polymer recipe core: property prediction and inverse design
// for acrylic emulsion formulations.
//

pub mod bridge; // WASM entry point
pub mod config;
pub mod error;
pub mod forecast;
pub mod models;
pub mod optimization;
pub mod request;
pub mod science;
pub mod tensors;
#[cfg(test)]
pub mod tests_optimizer;

// Re-export core types
pub use config::{OptimizerConfig, SearchConfig};
pub use error::{RecipeError, Result};
pub use forecast::{ForecastEngine, SweepPoint};
pub use models::{Predictor, PredictorRegistry};
pub use optimization::{OptimizedRecipe, RecipeOptimizer};
pub use request::{FixedProcessParameters, OptimizationRequest, ProcessParameter, PropertyTarget};
pub use science::descriptors::{ChemicalDescriptors, DescriptorEngine};
pub use tensors::{FeatureAssembler, FeatureSchema, MonomerComposition, SchemaFamily};
