// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Santhosh Shyamsundar, Prabhu S., and Studio Tyto
//
//! polyrecipe: CLI for recipe inverse design and property prediction
//!
//! Reads trained models from a model directory (`feature_list.txt`,
//! `coating_feature_list.txt`, `model_rf_<property>.json`) and prints JSON on
//! stdout. Logs go to stderr, filtered by RUST_LOG (default `info`).
//!
//! Usage:
//!   polyrecipe optimize --models ./models Tg=-30 '점도(cP)=1500:0.5' --temperature 80
//!   polyrecipe predict --models ./models --monomer BA=70 --monomer MMA=27 --monomer AA=3
//!   polyrecipe sweep --models ./models --monomer BA=100 --parameter temperature --values 60,70,80,90

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{anyhow, bail, Context};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use polyrecipe_core::{
    FixedProcessParameters, ForecastEngine, MonomerComposition, OptimizationRequest,
    OptimizerConfig, PredictorRegistry, ProcessParameter, PropertyTarget, RecipeOptimizer,
};

#[derive(Parser)]
#[command(
    name = "polyrecipe",
    about = "Polymer recipe inverse design from trained property models",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Find a monomer recipe that meets property targets
    Optimize(OptimizeArgs),
    /// Predict every available property for a recipe
    Predict(PredictArgs),
    /// Predict across values of one process parameter
    Sweep(SweepArgs),
}

#[derive(Args)]
struct ModelOptions {
    /// Directory holding feature lists and model files
    #[arg(short, long, value_name = "DIR", default_value = "models")]
    models: PathBuf,
}

/// Fixed process conditions.
#[derive(Args)]
#[command(next_help_heading = "Process Conditions")]
struct ProcessOptions {
    /// Reaction temperature (C)
    #[arg(long, default_value = "80.0")]
    temperature: f64,

    /// Reaction time (h)
    #[arg(long, default_value = "4.5")]
    reaction_time: f64,

    /// Theoretical solids content (fraction)
    #[arg(long, default_value = "0.48")]
    solids: f64,

    /// Batch scale (g)
    #[arg(long, default_value = "500.0")]
    scale: f64,
}

impl ProcessOptions {
    fn to_params(&self) -> FixedProcessParameters {
        FixedProcessParameters {
            temperature: self.temperature,
            reaction_time: self.reaction_time,
            theoretical_solids: self.solids,
            scale: self.scale,
        }
    }
}

#[derive(Args)]
struct OptimizeArgs {
    /// Targets as NAME=VALUE or NAME=VALUE:WEIGHT
    #[arg(required = true, value_name = "TARGET", value_parser = parse_target, allow_hyphen_values = true)]
    targets: Vec<PropertyTarget>,

    /// Optimizer configuration (JSON)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the search seed
    #[arg(long)]
    seed: Option<u64>,

    #[command(flatten)]
    models: ModelOptions,

    #[command(flatten)]
    process: ProcessOptions,
}

#[derive(Args)]
struct RecipeOptions {
    /// Monomer ratio as ID=PHR, repeatable
    #[arg(long = "monomer", value_name = "ID=PHR", value_parser = parse_monomer, required = true)]
    monomers: Vec<(String, f64)>,
}

impl RecipeOptions {
    fn composition(&self) -> MonomerComposition {
        MonomerComposition::from_pairs(self.monomers.iter().map(|(id, phr)| (id.as_str(), *phr)))
    }
}

#[derive(Args)]
struct PredictArgs {
    #[command(flatten)]
    recipe: RecipeOptions,

    #[command(flatten)]
    models: ModelOptions,

    #[command(flatten)]
    process: ProcessOptions,
}

#[derive(Args)]
struct SweepArgs {
    /// Parameter to vary (temperature, reaction_time, theoretical_solids, scale)
    #[arg(long)]
    parameter: ProcessParameter,

    /// Comma-separated values
    #[arg(long, value_delimiter = ',', required = true, allow_hyphen_values = true)]
    values: Vec<f64>,

    #[command(flatten)]
    recipe: RecipeOptions,

    #[command(flatten)]
    models: ModelOptions,

    #[command(flatten)]
    process: ProcessOptions,
}

fn parse_target(s: &str) -> Result<PropertyTarget, String> {
    let (name, rest) = s
        .rsplit_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE[:WEIGHT], got '{}'", s))?;
    let (value, weight) = match rest.split_once(':') {
        Some((value, weight)) => (value, Some(weight)),
        None => (rest, None),
    };
    let value: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("invalid target value '{}'", value))?;
    let target = PropertyTarget::new(name.trim(), value);
    match weight {
        Some(w) => {
            let w: f64 = w.trim().parse().map_err(|_| format!("invalid weight '{}'", w))?;
            Ok(target.with_weight(w))
        }
        None => Ok(target),
    }
}

fn parse_monomer(s: &str) -> Result<(String, f64), String> {
    let (id, phr) = s
        .split_once('=')
        .ok_or_else(|| format!("expected ID=PHR, got '{}'", s))?;
    let phr: f64 = phr
        .trim()
        .parse()
        .map_err(|_| format!("invalid phr '{}'", phr))?;
    Ok((id.trim().to_string(), phr))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Optimize(args) => {
            let mut config = match &args.config {
                Some(path) => OptimizerConfig::load(path)
                    .with_context(|| format!("loading config {}", path.display()))?,
                None => OptimizerConfig::default(),
            };
            if let Some(seed) = args.seed {
                config.search.seed = seed;
            }

            let mut registry = PredictorRegistry::open(&args.models.models);
            let request = OptimizationRequest::new(args.targets, args.process.to_params());
            let recipe = RecipeOptimizer::new(config)?
                .optimize(&mut registry, &request)
                .context("optimization failed")?;
            print_json(&recipe)
        }
        Command::Predict(args) => {
            let mut registry = PredictorRegistry::open(&args.models.models);
            let predictions = ForecastEngine::predict_all(
                &mut registry,
                &args.process.to_params(),
                &args.recipe.composition(),
            )?;
            if predictions.is_empty() {
                bail!("no models found in {}", args.models.models.display());
            }
            print_json(&predictions)
        }
        Command::Sweep(args) => {
            let mut registry = PredictorRegistry::open(&args.models.models);
            let points = ForecastEngine::sweep_process_parameter(
                &mut registry,
                &args.process.to_params(),
                &args.recipe.composition(),
                args.parameter,
                &args.values,
            )?;
            if points.iter().all(|p| p.predictions.is_empty()) {
                return Err(anyhow!("no models found in {}", args.models.models.display()));
            }
            print_json(&points)
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("ERROR: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
