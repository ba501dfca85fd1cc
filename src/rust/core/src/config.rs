// SPDX-FileCopyrightText: 2026 Santhosh Shyamsundar, Prabhu S., and Studio Tyto
// SPDX-License-Identifier: MIT
//! Optimizer configuration
//!
//! The penalty weight and acceptance threshold are empirical; they are kept
//! here rather than in the search code so they can be tuned per dataset.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{RecipeError, Result};
use crate::tensors::strip_monomer_prefix;

/// Initial population sampling.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PopulationInit {
    LatinHypercube,
    Random,
}

/// Differential evolution knobs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub max_generations: usize,
    /// Population size = multiplier * number of searched monomers
    pub population_multiplier: usize,
    /// Relative convergence tolerance on the population energy spread
    pub tolerance: f64,
    /// Absolute convergence tolerance on the population energy spread
    pub abs_tolerance: f64,
    /// Mutation factor range; a fresh factor is drawn every generation
    pub mutation: (f64, f64),
    /// Crossover probability
    pub recombination: f64,
    pub seed: u64,
    pub init: PopulationInit,
    /// Wall-clock budget for one search, in seconds
    pub max_wall_time_secs: Option<f64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_generations: 100,
            population_multiplier: 20,
            tolerance: 0.01,
            abs_tolerance: 0.0,
            mutation: (0.5, 1.0),
            recombination: 0.7,
            seed: 42,
            init: PopulationInit::LatinHypercube,
            max_wall_time_secs: None,
        }
    }
}

impl SearchConfig {
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: &str| Err(RecipeError::InvalidConfig(msg.to_string()));
        if self.max_generations == 0 {
            return invalid("max_generations must be positive");
        }
        if self.population_multiplier == 0 {
            return invalid("population_multiplier must be positive");
        }
        if !(self.tolerance >= 0.0) || !(self.abs_tolerance >= 0.0) {
            return invalid("tolerances must be non-negative");
        }
        let (lo, hi) = self.mutation;
        if !(0.0..=2.0).contains(&lo) || !(0.0..=2.0).contains(&hi) || lo > hi {
            return invalid("mutation must be an ordered range within [0, 2]");
        }
        if !(0.0..=1.0).contains(&self.recombination) {
            return invalid("recombination must lie in [0, 1]");
        }
        if let Some(secs) = self.max_wall_time_secs {
            if !(secs > 0.0) {
                return invalid("max_wall_time_secs must be positive");
            }
        }
        Ok(())
    }
}

/// Inverse-design settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Monomers varied by the search, in output order. Others stay at 0 phr.
    pub primary_monomers: Vec<String>,
    /// Returned at `target_phr` when the search ends on an all-zero recipe
    pub fallback_monomer: String,
    /// Required composition sum (phr)
    pub target_phr: f64,
    /// Per-monomer search box (phr)
    pub phr_bounds: (f64, f64),
    /// Weight of the squared composition-sum violation
    pub penalty_weight: f64,
    /// Added to |target| in the relative error denominator
    pub relative_epsilon: f64,
    /// Best loss (penalty included) accepted without formal convergence
    pub acceptance_threshold: f64,
    pub search: SearchConfig,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            primary_monomers: ["BA", "MMA", "AA", "2-EHA"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            fallback_monomer: "BA".to_string(),
            target_phr: 100.0,
            phr_bounds: (0.0, 100.0),
            penalty_weight: 1000.0,
            relative_epsilon: 1e-6,
            acceptance_threshold: 0.01,
            search: SearchConfig::default(),
        }
    }
}

impl OptimizerConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let mut config: OptimizerConfig = serde_json::from_str(json)?;
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| RecipeError::io(path, e))?;
        Self::from_json(&text)
    }

    /// Rewrite monomer ids to the bare form compositions use (`monomer_BA` -> `BA`).
    pub fn normalize(&mut self) {
        for id in self.primary_monomers.iter_mut() {
            *id = strip_monomer_prefix(id.trim()).to_string();
        }
        self.fallback_monomer = strip_monomer_prefix(self.fallback_monomer.trim()).to_string();
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: &str| Err(RecipeError::InvalidConfig(msg.to_string()));
        if self.primary_monomers.is_empty() {
            return invalid("primary_monomers is empty");
        }
        let mut seen = HashSet::new();
        for id in &self.primary_monomers {
            let bare = strip_monomer_prefix(id.trim());
            if bare.is_empty() {
                return invalid("primary_monomers contains a blank id");
            }
            if !seen.insert(bare) {
                return Err(RecipeError::InvalidConfig(format!(
                    "primary monomer '{}' listed more than once",
                    bare
                )));
            }
        }
        if self.fallback_monomer.trim().is_empty() {
            return invalid("fallback_monomer is blank");
        }
        if !(self.target_phr > 0.0) || !self.target_phr.is_finite() {
            return invalid("target_phr must be positive");
        }
        let (lo, hi) = self.phr_bounds;
        if !(lo >= 0.0) || !(hi > lo) || !hi.is_finite() {
            return invalid("phr_bounds must satisfy 0 <= low < high");
        }
        if !(self.penalty_weight >= 0.0) || !self.penalty_weight.is_finite() {
            return invalid("penalty_weight must be non-negative");
        }
        if !(self.relative_epsilon > 0.0) {
            return invalid("relative_epsilon must be positive");
        }
        if !(self.acceptance_threshold >= 0.0) {
            return invalid("acceptance_threshold must be non-negative");
        }
        self.search.validate()
    }
}
