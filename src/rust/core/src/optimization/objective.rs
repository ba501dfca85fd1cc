// SPDX-FileCopyrightText: 2026 Santhosh Shyamsundar, Prabhu S., and Studio Tyto
// SPDX-License-Identifier: MIT
//! Composite recipe loss
//!
//! For a candidate vector of primary-monomer phr values:
//!
//! ```text
//! loss = sum_t  w_t * ((pred_t - target_t) / (|target_t| + eps))^2
//!      + C * (sum(x) - target_phr)^2
//! ```
//!
//! Relative errors keep properties on very different scales (Tg in tens of
//! degrees, viscosity in thousands of cP) comparable. Everything the loss
//! depends on is borrowed immutably, so one objective can be evaluated from
//! any number of threads.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::OptimizerConfig;
use crate::models::BoundPredictor;
use crate::request::{FixedProcessParameters, PropertyTarget};
use crate::science::descriptors::DescriptorEngine;
use crate::tensors::{FeatureAssembler, FeatureSchema, MonomerComposition};

/// A target together with the predictor that estimates it.
#[derive(Clone, Debug)]
pub struct TargetTerm {
    pub target: PropertyTarget,
    pub model: BoundPredictor,
}

/// Per-target contribution to the loss.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TargetLoss {
    pub property: String,
    pub target_value: f64,
    pub weight: f64,
    pub predicted: f64,
    pub relative_error: f64,
    pub weighted_loss: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LossBreakdown {
    pub targets: Vec<TargetLoss>,
    pub composition_penalty: f64,
    pub total: f64,
}

pub struct RecipeObjective<'a> {
    terms: &'a [TargetTerm],
    params: &'a FixedProcessParameters,
    monomers: &'a [String],
    target_phr: f64,
    penalty_weight: f64,
    epsilon: f64,
}

impl<'a> RecipeObjective<'a> {
    /// `monomers` names the searched slots, one per coordinate of `x`.
    pub fn new(
        terms: &'a [TargetTerm],
        params: &'a FixedProcessParameters,
        monomers: &'a [String],
        config: &OptimizerConfig,
    ) -> Self {
        Self {
            terms,
            params,
            monomers,
            target_phr: config.target_phr,
            penalty_weight: config.penalty_weight,
            epsilon: config.relative_epsilon,
        }
    }

    /// Candidate recipe: searched slots take `x`, every other monomer is 0.
    pub fn composition(&self, x: &[f64]) -> MonomerComposition {
        MonomerComposition::from_pairs(
            self.monomers
                .iter()
                .zip(x)
                .map(|(id, phr)| (id.as_str(), *phr)),
        )
    }

    /// Loss at a candidate point.
    pub fn evaluate(&self, x: &[f64]) -> f64 {
        let composition = self.composition(x);
        let predictions = self.predict(&composition);

        let error: f64 = self
            .terms
            .iter()
            .zip(&predictions)
            .map(|(term, pred)| term.target.weight * self.relative_error(&term.target, *pred).powi(2))
            .sum();

        error + self.penalty(x.iter().sum())
    }

    /// Loss of a finished recipe, itemized per target.
    pub fn breakdown(&self, composition: &MonomerComposition) -> LossBreakdown {
        let predictions = self.predict(composition);

        let targets: Vec<TargetLoss> = self
            .terms
            .iter()
            .zip(predictions)
            .map(|(term, predicted)| {
                let relative_error = self.relative_error(&term.target, predicted);
                TargetLoss {
                    property: term.target.name.clone(),
                    target_value: term.target.target_value,
                    weight: term.target.weight,
                    predicted,
                    relative_error,
                    weighted_loss: term.target.weight * relative_error.powi(2),
                }
            })
            .collect();

        let composition_penalty = self.penalty(composition.total_phr());
        let total = targets.iter().map(|t| t.weighted_loss).sum::<f64>() + composition_penalty;

        LossBreakdown {
            targets,
            composition_penalty,
            total,
        }
    }

    /// One prediction per term, in term order.
    ///
    /// Terms sharing a schema share one assembled feature vector.
    pub fn predict(&self, composition: &MonomerComposition) -> Vec<f64> {
        let descriptors = DescriptorEngine::compute(composition);
        let mut rows: Vec<(&Arc<FeatureSchema>, Vec<f64>)> = Vec::new();

        self.terms
            .iter()
            .map(|term| {
                let schema = &term.model.schema;
                let idx = match rows.iter().position(|(s, _)| Arc::ptr_eq(s, schema)) {
                    Some(idx) => idx,
                    None => {
                        let row = FeatureAssembler::assemble(
                            schema,
                            self.params,
                            composition,
                            &descriptors,
                        );
                        rows.push((schema, row));
                        rows.len() - 1
                    }
                };
                term.model.predictor.predict(&rows[idx].1)
            })
            .collect()
    }

    fn relative_error(&self, target: &PropertyTarget, predicted: f64) -> f64 {
        (predicted - target.target_value) / (target.target_value.abs() + self.epsilon)
    }

    fn penalty(&self, total_phr: f64) -> f64 {
        self.penalty_weight * (total_phr - self.target_phr).powi(2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LinearModel, PredictorRegistry};
    use crate::tensors::SchemaFamily;
    use approx::assert_relative_eq;

    fn terms(targets: Vec<PropertyTarget>) -> Vec<TargetTerm> {
        let schema = FeatureSchema::parse("monomer_BA\nmonomer_MMA\nchem_avg_tg").unwrap();
        let mut registry = PredictorRegistry::new()
            .with_schema(SchemaFamily::Synthesis, schema)
            .with_predictor(
                "Tg",
                Arc::new(LinearModel::new(-273.15, vec![0.0, 0.0, 1.0])),
                SchemaFamily::Synthesis,
            )
            .with_predictor(
                "viscosity",
                Arc::new(LinearModel::new(100.0, vec![10.0, 0.0, 0.0])),
                SchemaFamily::Synthesis,
            );
        targets
            .into_iter()
            .map(|target| TargetTerm {
                model: registry.bind(&target.name).unwrap(),
                target,
            })
            .collect()
    }

    #[test]
    fn test_loss_is_relative_and_weighted() {
        let terms = terms(vec![
            PropertyTarget::new("Tg", -30.0).with_weight(2.0),
            PropertyTarget::new("viscosity", 1000.0),
        ]);
        let params = FixedProcessParameters::default();
        let monomers = vec!["BA".to_string(), "MMA".to_string()];
        let config = OptimizerConfig::default();
        let objective = RecipeObjective::new(&terms, &params, &monomers, &config);

        // 100 BA: Tg = 219.15 - 273.15 = -54, viscosity = 100 + 10 * 100 = 1100
        let loss = objective.evaluate(&[100.0, 0.0]);
        let tg_err = (-54.0 - -30.0) / (30.0 + 1e-6);
        let visc_err = (1100.0 - 1000.0) / (1000.0 + 1e-6);
        assert_relative_eq!(loss, 2.0 * tg_err * tg_err + visc_err * visc_err, epsilon = 1e-9);
    }

    #[test]
    fn test_penalty_on_sum_violation() {
        let terms = terms(vec![PropertyTarget::new("viscosity", 1100.0)]);
        let params = FixedProcessParameters::default();
        let monomers = vec!["BA".to_string(), "MMA".to_string()];
        let config = OptimizerConfig::default();
        let objective = RecipeObjective::new(&terms, &params, &monomers, &config);

        // viscosity 1100 is met exactly at 100 BA; 10 extra MMA phr costs 1000 * 10^2
        assert_relative_eq!(objective.evaluate(&[100.0, 0.0]), 0.0, epsilon = 1e-12);
        assert_relative_eq!(objective.evaluate(&[100.0, 10.0]), 1000.0 * 100.0, epsilon = 1e-6);
    }

    #[test]
    fn test_zero_target_guarded() {
        let terms = terms(vec![PropertyTarget::new("Tg", 0.0)]);
        let params = FixedProcessParameters::default();
        let monomers = vec!["BA".to_string(), "MMA".to_string()];
        let config = OptimizerConfig::default();
        let objective = RecipeObjective::new(&terms, &params, &monomers, &config);
        assert!(objective.evaluate(&[50.0, 50.0]).is_finite());
    }

    #[test]
    fn test_breakdown_matches_evaluate() {
        let terms = terms(vec![
            PropertyTarget::new("Tg", -30.0),
            PropertyTarget::new("viscosity", 800.0).with_weight(0.5),
        ]);
        let params = FixedProcessParameters::default();
        let monomers = vec!["BA".to_string(), "MMA".to_string()];
        let config = OptimizerConfig::default();
        let objective = RecipeObjective::new(&terms, &params, &monomers, &config);

        let x = [70.0, 30.5];
        let breakdown = objective.breakdown(&objective.composition(&x));
        assert_relative_eq!(breakdown.total, objective.evaluate(&x), epsilon = 1e-9);
        assert_eq!(breakdown.targets.len(), 2);
        assert_eq!(breakdown.targets[1].property, "viscosity");
        assert_relative_eq!(breakdown.composition_penalty, 1000.0 * 0.25, epsilon = 1e-9);
    }
}
