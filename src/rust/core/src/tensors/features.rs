// SPDX-FileCopyrightText: 2026 Santhosh Shyamsundar, Prabhu S., and Studio Tyto
// SPDX-License-Identifier: MIT
//! Feature schema and feature vector assembly.
//!
//! A predictor is trained against a fixed, ordered list of column names. The
//! schema classifies every column once into a typed [`FeatureSlot`], and the
//! assembler fills the slots in schema order. Column order is the contract
//! with the predictor: a permuted vector produces silently wrong predictions.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::composition::{MonomerComposition, MONOMER_PREFIX};
use crate::error::{RecipeError, Result};
use crate::request::{FixedProcessParameters, ProcessParameter};
use crate::science::descriptors::ChemicalDescriptors;

/// Predictor family; each family is trained against its own schema.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaFamily {
    /// Emulsion synthesis properties (Tg, viscosity, yield, particle size)
    Synthesis,
    /// Coating properties (adhesion)
    Coating,
}

impl SchemaFamily {
    /// Schema file name inside a model directory.
    pub fn file_name(&self) -> &'static str {
        match self {
            SchemaFamily::Synthesis => "feature_list.txt",
            SchemaFamily::Coating => "coating_feature_list.txt",
        }
    }

    /// Family a property's predictor belongs to when the model does not say.
    pub fn for_property(property: &str) -> Self {
        if property.eq_ignore_ascii_case("adhesion") {
            SchemaFamily::Coating
        } else {
            SchemaFamily::Synthesis
        }
    }
}

impl fmt::Display for SchemaFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaFamily::Synthesis => write!(f, "synthesis"),
            SchemaFamily::Coating => write!(f, "coating"),
        }
    }
}

/// Derived chemical descriptor columns.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChemicalFeature {
    AvgTg,
    AvgMw,
    AvgPolarity,
}

impl ChemicalFeature {
    pub fn column(&self) -> &'static str {
        match self {
            ChemicalFeature::AvgTg => "chem_avg_tg",
            ChemicalFeature::AvgMw => "chem_avg_mw",
            ChemicalFeature::AvgPolarity => "chem_avg_polarity",
        }
    }

    fn from_column(name: &str) -> Option<Self> {
        match name {
            "chem_avg_tg" => Some(ChemicalFeature::AvgTg),
            "chem_avg_mw" => Some(ChemicalFeature::AvgMw),
            "chem_avg_polarity" => Some(ChemicalFeature::AvgPolarity),
            _ => None,
        }
    }

    fn value(&self, d: &ChemicalDescriptors) -> f64 {
        match self {
            ChemicalFeature::AvgTg => d.avg_tg,
            ChemicalFeature::AvgMw => d.avg_mw,
            ChemicalFeature::AvgPolarity => d.avg_polarity,
        }
    }
}

/// What a schema column is filled from.
#[derive(Clone, Debug, PartialEq)]
pub enum FeatureSlot {
    Process(ProcessParameter),
    /// Bare monomer identifier (prefix stripped)
    Monomer(String),
    Chemical(ChemicalFeature),
    /// Columns outside the core (e.g. fabric one-hots); always 0.0
    Unmapped,
}

impl FeatureSlot {
    fn classify(name: &str) -> Self {
        if let Some(param) = ProcessParameter::from_column(name) {
            FeatureSlot::Process(param)
        } else if let Some(chem) = ChemicalFeature::from_column(name) {
            FeatureSlot::Chemical(chem)
        } else if let Some(id) = name.strip_prefix(MONOMER_PREFIX) {
            FeatureSlot::Monomer(id.to_string())
        } else {
            FeatureSlot::Unmapped
        }
    }
}

/// Ordered column list a predictor was trained with.
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureSchema {
    names: Vec<String>,
    slots: Vec<FeatureSlot>,
}

impl FeatureSchema {
    /// Build a schema from column names in training order.
    pub fn new<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.is_empty() {
            return Err(RecipeError::InvalidSchema("schema has no columns".to_string()));
        }

        let mut seen = HashSet::with_capacity(names.len());
        for name in &names {
            if name.trim().is_empty() {
                return Err(RecipeError::InvalidSchema("blank column name".to_string()));
            }
            if !seen.insert(name.as_str()) {
                return Err(RecipeError::InvalidSchema(format!(
                    "duplicate column '{}'",
                    name
                )));
            }
        }

        let slots: Vec<FeatureSlot> = names.iter().map(|n| FeatureSlot::classify(n)).collect();
        let unmapped = slots
            .iter()
            .filter(|s| matches!(s, FeatureSlot::Unmapped))
            .count();
        debug!(columns = names.len(), unmapped, "feature schema built");

        Ok(FeatureSchema { names, slots })
    }

    /// Parse the plain-text schema format: one column per line.
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        Self::new(
            text.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty()),
        )
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| RecipeError::io(path, e))?;
        Self::parse(&text)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn slots(&self) -> &[FeatureSlot] {
        &self.slots
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Bare identifiers of the monomer columns, in schema order.
    pub fn monomers(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().filter_map(|slot| match slot {
            FeatureSlot::Monomer(id) => Some(id.as_str()),
            _ => None,
        })
    }

    pub fn has_monomer(&self, id: &str) -> bool {
        self.monomers().any(|m| m == id)
    }
}

pub struct FeatureAssembler;

impl FeatureAssembler {
    /// Assemble the predictor input in `schema` column order.
    ///
    /// Monomer columns absent from `composition` and unmapped columns are 0.0.
    pub fn assemble(
        schema: &FeatureSchema,
        params: &FixedProcessParameters,
        composition: &MonomerComposition,
        descriptors: &ChemicalDescriptors,
    ) -> Vec<f64> {
        let mut row = Vec::with_capacity(schema.len());
        Self::assemble_into(schema, params, composition, descriptors, &mut row);
        row
    }

    /// Same as [`FeatureAssembler::assemble`], reusing `row`'s allocation.
    pub fn assemble_into(
        schema: &FeatureSchema,
        params: &FixedProcessParameters,
        composition: &MonomerComposition,
        descriptors: &ChemicalDescriptors,
        row: &mut Vec<f64>,
    ) {
        row.clear();
        row.extend(schema.slots().iter().map(|slot| match slot {
            FeatureSlot::Process(param) => params.get(*param),
            FeatureSlot::Monomer(id) => composition.get(id),
            FeatureSlot::Chemical(chem) => chem.value(descriptors),
            FeatureSlot::Unmapped => 0.0,
        }));
    }
}
