// SPDX-FileCopyrightText: 2026 Santhosh Shyamsundar, Prabhu S., and Studio Tyto
// SPDX-License-Identifier: MIT
//! Recipe Optimizer
//!
//! Inverse design: find primary-monomer phr values whose predicted properties
//! match a set of weighted targets under fixed process conditions.
//!
//! 1. Validate the request (no model touched yet)
//! 2. Bind every target to its predictor and schema; any miss fails the call
//! 3. Search the primary-monomer box with differential evolution
//! 4. Accept on convergence or on a best loss under the acceptance threshold
//! 5. Clamp, renormalize to the target phr sum, fall back if all-zero

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::differential_evolution::{DifferentialEvolution, SearchStatus};
use super::objective::{LossBreakdown, RecipeObjective, TargetTerm};
use crate::config::OptimizerConfig;
use crate::error::{RecipeError, Result};
use crate::models::PredictorRegistry;
use crate::request::{FixedProcessParameters, OptimizationRequest, PropertyTarget};
use crate::tensors::MonomerComposition;

/// Accepted inverse-design result.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OptimizedRecipe {
    /// Monomer phr, summing to the configured target
    pub composition: MonomerComposition,
    /// Best search loss (penalty included)
    pub loss: f64,
    pub status: SearchStatus,
    pub generations: usize,
    pub evaluations: usize,
    /// Per-target predictions at the returned composition
    pub breakdown: LossBreakdown,
    /// True when the search ended on an all-zero recipe
    pub used_fallback: bool,
}

impl OptimizedRecipe {
    /// Property name -> predicted value at the returned composition.
    pub fn predictions(&self) -> BTreeMap<String, f64> {
        self.breakdown
            .targets
            .iter()
            .map(|t| (t.property.clone(), t.predicted))
            .collect()
    }
}

pub struct RecipeOptimizer {
    config: OptimizerConfig,
}

impl Default for RecipeOptimizer {
    fn default() -> Self {
        Self {
            config: OptimizerConfig::default(),
        }
    }
}

impl RecipeOptimizer {
    /// Monomer ids in `config` are normalized to their bare form.
    pub fn new(mut config: OptimizerConfig) -> Result<Self> {
        config.normalize();
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    pub fn optimize(
        &self,
        registry: &mut PredictorRegistry,
        request: &OptimizationRequest,
    ) -> Result<OptimizedRecipe> {
        request.validate()?;
        info!(
            targets = request.targets.len(),
            temperature = request.fixed_params.temperature,
            "optimization request accepted"
        );

        let terms = request
            .targets
            .iter()
            .map(|target| {
                Ok(TargetTerm {
                    target: target.clone(),
                    model: registry.bind(&target.name)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let monomers = self.searched_monomers(&terms)?;
        info!(monomers = ?monomers, "predictors resolved");

        let objective = RecipeObjective::new(&terms, &request.fixed_params, &monomers, &self.config);
        let de = DifferentialEvolution::new(
            vec![self.config.phr_bounds; monomers.len()],
            self.config.search.clone(),
        )?;
        let outcome = de.minimize(|x| objective.evaluate(x));

        let threshold = self.config.acceptance_threshold;
        if !(outcome.success() || outcome.fun < threshold) {
            warn!(
                loss = outcome.fun,
                threshold,
                status = ?outcome.status,
                "search ended above acceptance threshold"
            );
            return Err(RecipeError::SearchFailed {
                loss: outcome.fun,
                threshold,
            });
        }

        let (composition, used_fallback) = self.finish(objective.composition(&outcome.x));
        let breakdown = objective.breakdown(&composition);
        info!(
            loss = outcome.fun,
            generations = outcome.generations,
            evaluations = outcome.evaluations,
            status = ?outcome.status,
            "search finished"
        );

        Ok(OptimizedRecipe {
            composition,
            loss: outcome.fun,
            status: outcome.status,
            generations: outcome.generations,
            evaluations: outcome.evaluations,
            breakdown,
            used_fallback,
        })
    }

    /// Convenience form of [`RecipeOptimizer::optimize`].
    pub fn optimize_targets(
        &self,
        registry: &mut PredictorRegistry,
        targets: &[PropertyTarget],
        fixed_params: &FixedProcessParameters,
    ) -> Result<OptimizedRecipe> {
        let request = OptimizationRequest::new(targets.to_vec(), *fixed_params);
        self.optimize(registry, &request)
    }

    /// Renormalize a search result to the target sum.
    ///
    /// An all-zero recipe becomes the fallback monomer alone; the flag
    /// reports whether that happened.
    fn finish(&self, candidate: MonomerComposition) -> (MonomerComposition, bool) {
        match candidate.renormalized(self.config.target_phr) {
            Some(composition) => (composition, false),
            None => {
                warn!(
                    monomer = %self.config.fallback_monomer,
                    "search ended on an all-zero recipe, using fallback monomer"
                );
                let fallback = MonomerComposition::from_pairs([(
                    self.config.fallback_monomer.as_str(),
                    self.config.target_phr,
                )]);
                (fallback, true)
            }
        }
    }

    /// Configured primary monomers that at least one target schema can see.
    fn searched_monomers(&self, terms: &[TargetTerm]) -> Result<Vec<String>> {
        let monomers: Vec<String> = self
            .config
            .primary_monomers
            .iter()
            .filter(|m| terms.iter().any(|t| t.model.schema.has_monomer(m)))
            .cloned()
            .collect();

        if monomers.is_empty() {
            return Err(RecipeError::NoSearchableMonomers(
                self.config.primary_monomers.clone(),
            ));
        }

        for term in terms {
            if !monomers.iter().any(|m| term.model.schema.has_monomer(m)) {
                warn!(
                    property = %term.target.name,
                    "schema has no searched monomer column"
                );
            }
        }
        Ok(monomers)
    }
}
