// SPDX-FileCopyrightText: 2026 Santhosh Shyamsundar, Prabhu S., and Studio Tyto
// SPDX-License-Identifier: MIT
//! Differential Evolution
//!
//! Seeded, derivative-free global minimizer over a box (`best1bin`):
//! - population lives in unit coordinates, scaled to the bounds on evaluation
//! - Latin hypercube initial population
//! - one dithered mutation factor per generation
//! - mutant = best + F * (r1 - r2), binomial crossover with one forced gene
//! - greedy, immediate replacement
//!
//! Converged when the spread of population energies falls below
//! `abs_tolerance + tolerance * |mean energy|`.

use std::time::Duration;

use instant::Instant;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::{PopulationInit, SearchConfig};
use crate::error::{RecipeError, Result};

/// Distinct vectors needed to build a mutant (candidate, r1, r2 plus slack).
const MIN_POPULATION: usize = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStatus {
    Converged,
    MaxGenerationsReached,
    WallTimeExhausted,
}

impl SearchStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, SearchStatus::Converged)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchOutcome {
    /// Best point found, in bound coordinates
    pub x: Vec<f64>,
    /// Objective at `x`
    pub fun: f64,
    pub generations: usize,
    pub evaluations: usize,
    pub status: SearchStatus,
}

impl SearchOutcome {
    pub fn success(&self) -> bool {
        self.status.is_success()
    }
}

pub struct DifferentialEvolution {
    bounds: Vec<(f64, f64)>,
    config: SearchConfig,
}

impl DifferentialEvolution {
    pub fn new(bounds: Vec<(f64, f64)>, config: SearchConfig) -> Result<Self> {
        config.validate()?;
        if bounds.is_empty() {
            return Err(RecipeError::InvalidConfig(
                "search space has no dimensions".to_string(),
            ));
        }
        if bounds
            .iter()
            .any(|(lo, hi)| !lo.is_finite() || !hi.is_finite() || lo > hi)
        {
            return Err(RecipeError::InvalidConfig(
                "search bounds must be finite and ordered".to_string(),
            ));
        }
        Ok(Self { bounds, config })
    }

    pub fn dimensions(&self) -> usize {
        self.bounds.len()
    }

    pub fn population_size(&self) -> usize {
        (self.config.population_multiplier * self.dimensions()).max(MIN_POPULATION)
    }

    fn scale(&self, unit: &[f64], out: &mut Vec<f64>) {
        out.clear();
        out.extend(
            unit.iter()
                .zip(&self.bounds)
                .map(|(u, (lo, hi))| lo + u * (hi - lo)),
        );
    }

    fn init_population(&self, rng: &mut StdRng) -> Vec<Vec<f64>> {
        let np = self.population_size();
        let dim = self.dimensions();
        match self.config.init {
            PopulationInit::Random => (0..np)
                .map(|_| (0..dim).map(|_| rng.gen::<f64>()).collect())
                .collect(),
            PopulationInit::LatinHypercube => {
                // One sample per stratum in every dimension, strata shuffled per dimension.
                let segment = 1.0 / np as f64;
                let mut population = vec![vec![0.0; dim]; np];
                let mut column: Vec<f64> = Vec::with_capacity(np);
                for j in 0..dim {
                    column.clear();
                    column.extend((0..np).map(|i| (i as f64 + rng.gen::<f64>()) * segment));
                    column.shuffle(rng);
                    for (member, value) in population.iter_mut().zip(&column) {
                        member[j] = *value;
                    }
                }
                population
            }
        }
    }

    /// Minimize `objective` over the bounds.
    ///
    /// Non-finite objective values rank as `+inf`.
    pub fn minimize<F>(&self, mut objective: F) -> SearchOutcome
    where
        F: FnMut(&[f64]) -> f64,
    {
        let dim = self.dimensions();
        let np = self.population_size();
        let cfg = &self.config;
        let mut rng = StdRng::seed_from_u64(cfg.seed);
        let budget = cfg
            .max_wall_time_secs
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok());
        let started = Instant::now();

        let mut scaled = Vec::with_capacity(dim);
        let mut evaluate = |unit: &[f64], scaled: &mut Vec<f64>| {
            self.scale(unit, scaled);
            let energy = objective(scaled.as_slice());
            if energy.is_finite() {
                energy
            } else {
                f64::INFINITY
            }
        };

        let mut population = self.init_population(&mut rng);
        let mut energies: Vec<f64> = population
            .iter()
            .map(|member| evaluate(member.as_slice(), &mut scaled))
            .collect();
        let mut evaluations = np;
        let mut best = argmin(&energies);

        let mut status = SearchStatus::MaxGenerationsReached;
        let mut generations = 0;
        let mut trial = vec![0.0; dim];

        for generation in 1..=cfg.max_generations {
            if let Some(limit) = budget {
                if started.elapsed() >= limit {
                    warn!(generation, "search wall-clock budget exhausted");
                    status = SearchStatus::WallTimeExhausted;
                    break;
                }
            }

            let (f_lo, f_hi) = cfg.mutation;
            let scale_factor = if f_hi > f_lo {
                rng.gen_range(f_lo..f_hi)
            } else {
                f_lo
            };

            for i in 0..np {
                let (r1, r2) = pick_two(&mut rng, np, i);
                let fill_point = rng.gen_range(0..dim);

                trial.copy_from_slice(&population[i]);
                for j in 0..dim {
                    if j == fill_point || rng.gen::<f64>() < cfg.recombination {
                        trial[j] = population[best][j]
                            + scale_factor * (population[r1][j] - population[r2][j]);
                    }
                }
                for gene in trial.iter_mut() {
                    if !(0.0..=1.0).contains(gene) {
                        *gene = rng.gen::<f64>();
                    }
                }

                let energy = evaluate(trial.as_slice(), &mut scaled);
                evaluations += 1;

                if energy <= energies[i] {
                    population[i].copy_from_slice(&trial);
                    energies[i] = energy;
                    if energy < energies[best] || i == best {
                        best = i;
                    }
                }
            }

            generations = generation;
            let (mean, spread) = mean_and_std(&energies);
            debug!(generation, best = energies[best], spread, "search generation");

            if spread.is_finite() && spread <= cfg.abs_tolerance + cfg.tolerance * mean.abs() {
                status = SearchStatus::Converged;
                break;
            }
        }

        self.scale(&population[best], &mut scaled);
        SearchOutcome {
            x: scaled,
            fun: energies[best],
            generations,
            evaluations,
            status,
        }
    }
}

fn argmin(values: &[f64]) -> usize {
    values
        .iter()
        .enumerate()
        .fold(0, |best, (i, v)| if *v < values[best] { i } else { best })
}

/// Two distinct indices in `0..n`, both different from `exclude`.
fn pick_two(rng: &mut StdRng, n: usize, exclude: usize) -> (usize, usize) {
    let mut r1 = rng.gen_range(0..n);
    while r1 == exclude {
        r1 = rng.gen_range(0..n);
    }
    let mut r2 = rng.gen_range(0..n);
    while r2 == exclude || r2 == r1 {
        r2 = rng.gen_range(0..n);
    }
    (r1, r2)
}

fn mean_and_std(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}
