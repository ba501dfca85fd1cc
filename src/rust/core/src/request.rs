// SPDX-FileCopyrightText: 2026 Santhosh Shyamsundar, Prabhu S., and Studio Tyto
// SPDX-License-Identifier: MIT
//! Inverse-design request types.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{RecipeError, Result};

/// A property value the recipe should hit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PropertyTarget {
    /// Property identifier, e.g. "Tg" or "점도(cP)"
    pub name: String,
    pub target_value: f64,
    /// Relative importance in the composite loss
    #[serde(default = "default_weight")]
    pub weight: f64,
}

fn default_weight() -> f64 {
    1.0
}

impl PropertyTarget {
    pub fn new(name: impl Into<String>, target_value: f64) -> Self {
        Self {
            name: name.into(),
            target_value,
            weight: default_weight(),
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| RecipeError::InvalidTarget {
            property: self.name.clone(),
            reason: reason.to_string(),
        };
        if self.name.trim().is_empty() {
            return Err(invalid("blank property name"));
        }
        if !self.target_value.is_finite() {
            return Err(invalid("target value is not finite"));
        }
        if !self.weight.is_finite() || self.weight < 0.0 {
            return Err(invalid("weight must be a finite non-negative number"));
        }
        Ok(())
    }
}

/// Process conditions held fixed during one optimization.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixedProcessParameters {
    /// Reaction temperature (C)
    pub temperature: f64,
    /// Reaction time (h)
    pub reaction_time: f64,
    /// Theoretical solids content (mass fraction)
    pub theoretical_solids: f64,
    /// Batch scale (g)
    pub scale: f64,
}

impl Default for FixedProcessParameters {
    fn default() -> Self {
        Self {
            temperature: 80.0,
            reaction_time: 4.5,
            theoretical_solids: 0.48,
            scale: 500.0,
        }
    }
}

impl FixedProcessParameters {
    pub fn get(&self, param: ProcessParameter) -> f64 {
        match param {
            ProcessParameter::Temperature => self.temperature,
            ProcessParameter::ReactionTime => self.reaction_time,
            ProcessParameter::TheoreticalSolids => self.theoretical_solids,
            ProcessParameter::Scale => self.scale,
        }
    }

    pub fn set(&mut self, param: ProcessParameter, value: f64) {
        match param {
            ProcessParameter::Temperature => self.temperature = value,
            ProcessParameter::ReactionTime => self.reaction_time = value,
            ProcessParameter::TheoreticalSolids => self.theoretical_solids = value,
            ProcessParameter::Scale => self.scale = value,
        }
    }

    pub fn validate(&self) -> Result<()> {
        for param in ProcessParameter::ALL {
            let value = self.get(param);
            if !value.is_finite() {
                return Err(RecipeError::InvalidProcessParameter {
                    parameter: param.name(),
                    value,
                });
            }
        }
        Ok(())
    }
}

/// Named process parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessParameter {
    Temperature,
    ReactionTime,
    TheoreticalSolids,
    Scale,
}

impl ProcessParameter {
    pub const ALL: [ProcessParameter; 4] = [
        ProcessParameter::Temperature,
        ProcessParameter::ReactionTime,
        ProcessParameter::TheoreticalSolids,
        ProcessParameter::Scale,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ProcessParameter::Temperature => "temperature",
            ProcessParameter::ReactionTime => "reaction_time",
            ProcessParameter::TheoreticalSolids => "theoretical_solids",
            ProcessParameter::Scale => "scale",
        }
    }

    /// Match a schema column, accepting the lab-sheet headers as aliases.
    pub fn from_column(column: &str) -> Option<Self> {
        match column {
            "temperature" | "온도" => Some(ProcessParameter::Temperature),
            "reaction_time" | "반응시간" => Some(ProcessParameter::ReactionTime),
            "theoretical_solids" | "이론 고형분(%)" => Some(ProcessParameter::TheoreticalSolids),
            "scale" | "Scale" => Some(ProcessParameter::Scale),
            _ => None,
        }
    }
}

impl fmt::Display for ProcessParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ProcessParameter {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        ProcessParameter::from_column(s.trim())
            .ok_or_else(|| format!("unknown process parameter '{}'", s))
    }
}

/// One inverse-design call: targets plus the process conditions to hold.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OptimizationRequest {
    pub targets: Vec<PropertyTarget>,
    #[serde(default)]
    pub fixed_params: FixedProcessParameters,
}

impl OptimizationRequest {
    pub fn new(targets: Vec<PropertyTarget>, fixed_params: FixedProcessParameters) -> Self {
        Self {
            targets,
            fixed_params,
        }
    }

    /// Input checks; runs before any model is touched.
    pub fn validate(&self) -> Result<()> {
        if self.targets.is_empty() {
            return Err(RecipeError::NoTargets);
        }

        let mut seen = HashSet::new();
        for target in &self.targets {
            target.validate()?;
            if !seen.insert(target.name.as_str()) {
                return Err(RecipeError::InvalidTarget {
                    property: target.name.clone(),
                    reason: "property targeted more than once".to_string(),
                });
            }
        }

        self.fixed_params.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_weight_defaults_to_one() {
        let target: PropertyTarget =
            serde_json::from_value(json!({ "name": "Tg", "target_value": -30.0 })).unwrap();
        assert_eq!(target.weight, 1.0);
    }

    #[test]
    fn test_empty_targets_rejected() {
        let request = OptimizationRequest::new(vec![], FixedProcessParameters::default());
        assert!(matches!(request.validate(), Err(RecipeError::NoTargets)));
    }

    #[test]
    fn test_bad_targets_rejected() {
        let params = FixedProcessParameters::default();
        let negative = OptimizationRequest::new(
            vec![PropertyTarget::new("Tg", -30.0).with_weight(-1.0)],
            params,
        );
        assert!(matches!(
            negative.validate(),
            Err(RecipeError::InvalidTarget { .. })
        ));

        let duplicated = OptimizationRequest::new(
            vec![PropertyTarget::new("Tg", -30.0), PropertyTarget::new("Tg", -20.0)],
            params,
        );
        assert!(duplicated.validate().is_err());

        let nan = OptimizationRequest::new(vec![PropertyTarget::new("Tg", f64::NAN)], params);
        assert!(nan.validate().is_err());
    }

    #[test]
    fn test_non_finite_process_parameter() {
        let mut params = FixedProcessParameters::default();
        params.set(ProcessParameter::Scale, f64::INFINITY);
        let request = OptimizationRequest::new(vec![PropertyTarget::new("Tg", -30.0)], params);
        match request.validate() {
            Err(RecipeError::InvalidProcessParameter { parameter, .. }) => {
                assert_eq!(parameter, "scale")
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_parameter_aliases() {
        assert_eq!("온도".parse::<ProcessParameter>(), Ok(ProcessParameter::Temperature));
        assert_eq!(
            ProcessParameter::from_column("이론 고형분(%)"),
            Some(ProcessParameter::TheoreticalSolids)
        );
        assert!("pressure".parse::<ProcessParameter>().is_err());
    }
}
