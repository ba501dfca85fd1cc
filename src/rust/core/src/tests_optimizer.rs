// SPDX-FileCopyrightText: 2026 Santhosh Shyamsundar, Prabhu S., and Studio Tyto
// SPDX-License-Identifier: MIT
//! End-to-end inverse design checks

use std::sync::Arc;

use approx::assert_relative_eq;

use crate::config::OptimizerConfig;
use crate::error::RecipeError;
use crate::models::{
    FnPredictor, ForestModel, LinearModel, PredictorRegistry, RegressionTree, TreeNode,
};
use crate::optimization::{RecipeOptimizer, SearchStatus};
use crate::request::{FixedProcessParameters, OptimizationRequest, PropertyTarget};
use crate::tensors::{FeatureSchema, SchemaFamily};

const SYNTHESIS_COLUMNS: &str = "온도\n반응시간\n이론 고형분(%)\nScale\n\
monomer_BA\nmonomer_MMA\nmonomer_AA\nmonomer_2-EHA\nmonomer_St\n\
chem_avg_tg\nchem_avg_mw\nchem_avg_polarity\n";

const TG: usize = 9;
const POLARITY: usize = 11;

fn coefficients(entries: &[(usize, f64)]) -> Vec<f64> {
    let mut c = vec![0.0; 12];
    for (i, v) in entries {
        c[*i] = *v;
    }
    c
}

/// Synthesis-side predictors resembling the trained lab models.
fn lab_registry() -> PredictorRegistry {
    let schema = FeatureSchema::parse(SYNTHESIS_COLUMNS).unwrap();
    PredictorRegistry::new()
        .with_schema(SchemaFamily::Synthesis, schema)
        // Tg (C): Fox-like average plus a small process effect
        .with_predictor(
            "Tg",
            Arc::new(LinearModel::new(-273.15 - 0.8, coefficients(&[(0, 0.01), (TG, 1.0)]))),
            SchemaFamily::Synthesis,
        )
        // acid value rises with AA content
        .with_predictor(
            "산가",
            Arc::new(LinearModel::new(0.0, coefficients(&[(6, 7.8)]))),
            SchemaFamily::Synthesis,
        )
        // yield dips on very polar recipes
        .with_predictor(
            "수율(%)",
            Arc::new(ForestModel {
                n_features: 12,
                trees: vec![RegressionTree {
                    nodes: vec![
                        TreeNode::Split {
                            feature: POLARITY,
                            threshold: 0.3,
                            left: 1,
                            right: 2,
                        },
                        TreeNode::Leaf { value: 97.0 },
                        TreeNode::Leaf { value: 91.0 },
                    ],
                }],
            }),
            SchemaFamily::Synthesis,
        )
}

fn lab_params() -> FixedProcessParameters {
    FixedProcessParameters {
        temperature: 80.0,
        reaction_time: 4.5,
        theoretical_solids: 0.48,
        scale: 500.0,
    }
}

#[test]
fn test_tg_minus_thirty_recipe() {
    let mut registry = lab_registry();
    let optimizer = RecipeOptimizer::default();
    let recipe = optimizer
        .optimize_targets(&mut registry, &[PropertyTarget::new("Tg", -30.0)], &lab_params())
        .unwrap();

    let composition = &recipe.composition;
    assert_relative_eq!(composition.total_phr(), 100.0, epsilon = 1e-6);
    assert!(composition.iter().all(|(_, phr)| phr >= 0.0));
    // only primary monomers are searched
    let ids: Vec<&str> = composition.iter().map(|(id, _)| id).collect();
    assert_eq!(ids, vec!["2-EHA", "AA", "BA", "MMA"]);
    assert!(recipe.loss < optimizer.config().acceptance_threshold || recipe.status.is_success());

    let predictions = recipe.predictions();
    assert!((predictions["Tg"] + 30.0).abs() < 1.0, "Tg = {}", predictions["Tg"]);
    assert!(!recipe.used_fallback);
    assert!(recipe.evaluations > 0);
}

#[test]
fn test_multi_target_recipe_is_well_formed() {
    let mut registry = lab_registry();
    let request = OptimizationRequest::new(
        vec![
            PropertyTarget::new("Tg", -10.0),
            PropertyTarget::new("산가", 30.0).with_weight(0.5),
        ],
        lab_params(),
    );
    let recipe = RecipeOptimizer::default()
        .optimize(&mut registry, &request)
        .unwrap();

    assert_relative_eq!(recipe.composition.total_phr(), 100.0, epsilon = 1e-6);
    assert!(recipe.composition.iter().all(|(_, phr)| phr >= 0.0));
    assert_eq!(recipe.breakdown.targets.len(), 2);
    // 30 acid value needs roughly 3.85 phr AA
    assert!((recipe.composition.get("AA") - 30.0 / 7.8).abs() < 0.6);
}

#[test]
fn test_same_seed_same_recipe() {
    let request = OptimizationRequest::new(
        vec![PropertyTarget::new("Tg", 5.0), PropertyTarget::new("수율(%)", 97.0)],
        lab_params(),
    );
    let optimizer = RecipeOptimizer::default();
    let a = optimizer.optimize(&mut lab_registry(), &request).unwrap();
    let b = optimizer.optimize(&mut lab_registry(), &request).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_raising_weight_pulls_prediction_toward_target() {
    // Two properties driven by the same descriptor with incompatible targets:
    // A wants avg Tg at -30 C, B wants it at -10 C.
    let schema = FeatureSchema::parse("monomer_BA\nmonomer_MMA\nchem_avg_tg").unwrap();
    let registry = || {
        PredictorRegistry::new()
            .with_schema(SchemaFamily::Synthesis, schema.clone())
            .with_predictor(
                "A",
                Arc::new(LinearModel::new(-273.15, vec![0.0, 0.0, 1.0])),
                SchemaFamily::Synthesis,
            )
            .with_predictor(
                "B",
                Arc::new(LinearModel::new(-2.0 * 273.15, vec![0.0, 0.0, 2.0])),
                SchemaFamily::Synthesis,
            )
    };
    // Conflicting targets never reach a small loss; run every generation
    let optimizer = RecipeOptimizer::new(OptimizerConfig {
        acceptance_threshold: 10.0,
        search: crate::config::SearchConfig {
            tolerance: 1e-6,
            ..Default::default()
        },
        ..OptimizerConfig::default()
    })
    .unwrap();

    let mut errors = Vec::new();
    for weight in [0.25, 1.0, 4.0, 16.0] {
        let targets = [
            PropertyTarget::new("A", -30.0).with_weight(weight),
            PropertyTarget::new("B", -20.0),
        ];
        let recipe = optimizer
            .optimize_targets(&mut registry(), &targets, &FixedProcessParameters::default())
            .unwrap();
        errors.push((recipe.predictions()["A"] + 30.0).abs());
    }

    for pair in errors.windows(2) {
        assert!(pair[1] < pair[0], "errors not decreasing: {:?}", errors);
    }
}

#[test]
fn test_missing_predictor_fails_before_search() {
    let mut registry = lab_registry();
    let targets = [
        PropertyTarget::new("Tg", -30.0),
        PropertyTarget::new("점도(cP)", 1500.0),
    ];
    match RecipeOptimizer::default().optimize_targets(&mut registry, &targets, &lab_params()) {
        Err(RecipeError::ModelUnavailable { property }) => assert_eq!(property, "점도(cP)"),
        other => panic!("unexpected: {:?}", other),
    }
}

#[test]
fn test_empty_targets() {
    let result =
        RecipeOptimizer::default().optimize_targets(&mut lab_registry(), &[], &lab_params());
    assert!(matches!(result, Err(RecipeError::NoTargets)));
}

#[test]
fn test_unreachable_target_reports_loss() {
    let config = OptimizerConfig {
        search: crate::config::SearchConfig {
            max_generations: 5,
            tolerance: 0.0,
            ..Default::default()
        },
        ..OptimizerConfig::default()
    };
    // hottest primary monomer is AA at 106 C
    let result = RecipeOptimizer::new(config).unwrap().optimize_targets(
        &mut lab_registry(),
        &[PropertyTarget::new("Tg", 500.0)],
        &lab_params(),
    );
    match result {
        Err(RecipeError::SearchFailed { loss, threshold }) => {
            assert!(loss > threshold);
            assert!(loss.is_finite());
        }
        other => panic!("unexpected: {:?}", other),
    }
}

#[test]
fn test_coating_target_without_monomer_columns() {
    let coating = FeatureSchema::parse("coating_thickness\nfabric_PET\nchem_avg_polarity").unwrap();
    let mut registry = lab_registry()
        .with_schema(SchemaFamily::Coating, coating)
        .with_predictor(
            "adhesion",
            Arc::new(FnPredictor::with_features(|x: &[f64]| 10.0 * x[2], 3)),
            SchemaFamily::Coating,
        );

    let targets = [
        PropertyTarget::new("Tg", -30.0),
        PropertyTarget::new("adhesion", 2.0).with_weight(0.01),
    ];
    let config = OptimizerConfig {
        acceptance_threshold: 1.0,
        ..OptimizerConfig::default()
    };
    let recipe = RecipeOptimizer::new(config)
        .unwrap()
        .optimize_targets(&mut registry, &targets, &lab_params())
        .unwrap();
    assert_relative_eq!(recipe.composition.total_phr(), 100.0, epsilon = 1e-6);
    assert!(recipe.predictions().contains_key("adhesion"));

    // adhesion alone has nothing to search over
    let only_coating = [PropertyTarget::new("adhesion", 2.0)];
    assert!(matches!(
        RecipeOptimizer::default().optimize_targets(&mut registry, &only_coating, &lab_params()),
        Err(RecipeError::NoSearchableMonomers(_))
    ));
}

#[test]
fn test_width_mismatch_fails_before_search() {
    let schema = FeatureSchema::parse("monomer_BA\nmonomer_MMA").unwrap();
    let mut registry = PredictorRegistry::new()
        .with_schema(SchemaFamily::Synthesis, schema)
        .with_predictor(
            "Tg",
            Arc::new(LinearModel::new(0.0, vec![1.0; 5])),
            SchemaFamily::Synthesis,
        );
    let result = RecipeOptimizer::default().optimize_targets(
        &mut registry,
        &[PropertyTarget::new("Tg", -30.0)],
        &FixedProcessParameters::default(),
    );
    assert!(matches!(result, Err(RecipeError::SchemaMismatch { .. })));
}

#[test]
fn test_wall_time_budget() {
    let config = OptimizerConfig {
        acceptance_threshold: 1e9,
        search: crate::config::SearchConfig {
            max_wall_time_secs: Some(1e-9),
            ..Default::default()
        },
        ..OptimizerConfig::default()
    };
    let recipe = RecipeOptimizer::new(config)
        .unwrap()
        .optimize_targets(
            &mut lab_registry(),
            &[PropertyTarget::new("Tg", -30.0)],
            &lab_params(),
        )
        .unwrap();
    assert_eq!(recipe.status, SearchStatus::WallTimeExhausted);
    assert_relative_eq!(recipe.composition.total_phr(), 100.0, epsilon = 1e-6);
}

#[test]
fn test_prefixed_primary_monomers_are_searched() {
    let config = OptimizerConfig {
        primary_monomers: vec!["monomer_BA".to_string(), "MMA".to_string()],
        ..OptimizerConfig::default()
    };
    let optimizer = RecipeOptimizer::new(config).unwrap();
    assert_eq!(optimizer.config().primary_monomers, vec!["BA", "MMA"]);

    let recipe = optimizer
        .optimize_targets(&mut lab_registry(), &[PropertyTarget::new("Tg", -30.0)], &lab_params())
        .unwrap();
    let ids: Vec<&str> = recipe.composition.iter().map(|(id, _)| id).collect();
    assert_eq!(ids, vec!["BA", "MMA"]);
    // -30 C needs mostly BA (-54 C) with some MMA (105 C)
    assert!(recipe.composition.get("BA") > recipe.composition.get("MMA"));
    assert!((recipe.predictions()["Tg"] + 30.0).abs() < 1.0);
}

#[test]
fn test_duplicate_primary_monomers_rejected() {
    let config = OptimizerConfig {
        primary_monomers: vec!["BA".to_string(), "BA".to_string(), "MMA".to_string()],
        ..OptimizerConfig::default()
    };
    assert!(matches!(
        RecipeOptimizer::new(config),
        Err(RecipeError::InvalidConfig(_))
    ));
}
