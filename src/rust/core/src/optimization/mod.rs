// SPDX-FileCopyrightText: 2026 Santhosh Shyamsundar, Prabhu S., and Studio Tyto
// SPDX-License-Identifier: MIT
pub mod differential_evolution;
pub mod objective;
pub mod recipe;

pub use differential_evolution::{DifferentialEvolution, SearchOutcome, SearchStatus};
pub use objective::{LossBreakdown, RecipeObjective, TargetLoss, TargetTerm};
pub use recipe::{OptimizedRecipe, RecipeOptimizer};
