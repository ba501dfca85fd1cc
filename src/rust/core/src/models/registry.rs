// SPDX-FileCopyrightText: 2026 Santhosh Shyamsundar, Prabhu S., and Studio Tyto
// SPDX-License-Identifier: MIT
//! Predictor registry
//!
//! The registry is an ordinary value owned by the caller. It is populated
//! either in memory, from a JSON bundle, or lazily from a model directory:
//!
//! ```text
//! models/
//!   feature_list.txt          synthesis schema, one column per line
//!   coating_feature_list.txt  coating schema
//!   model_rf_Tg.json          ModelFile for property "Tg"
//!   model_rf_점도cP.json      ModelFile for property "점도(cP)"
//! ```
//!
//! Each property and schema is read at most once; loaded predictors are
//! immutable and handed out as `Arc`s.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{ModelFile, Predictor};
use crate::error::{RecipeError, Result};
use crate::tensors::{FeatureSchema, SchemaFamily};

const MODEL_FILE_PREFIX: &str = "model_rf_";
const MODEL_FILE_SUFFIX: &str = ".json";

/// File-name stem of a property's model: `수율(%)` -> `수율pct`.
pub fn model_file_stem(property: &str) -> String {
    property
        .replace('%', "pct")
        .chars()
        .filter(|c| !matches!(c, '(' | ')' | ' '))
        .collect()
}

/// A predictor paired with the schema it must be fed.
#[derive(Clone, Debug)]
pub struct BoundPredictor {
    pub property: String,
    pub predictor: Arc<dyn Predictor>,
    pub schema: Arc<FeatureSchema>,
}

#[derive(Clone, Debug)]
struct Registered {
    predictor: Arc<dyn Predictor>,
    family: SchemaFamily,
}

/// Serialized registry, used where no filesystem is available.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RegistryBundle {
    /// Family name ("synthesis" / "coating") -> ordered column names
    #[serde(default)]
    pub schemas: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub models: BTreeMap<String, ModelFile>,
}

/// Property name -> trained predictor.
#[derive(Debug, Default)]
pub struct PredictorRegistry {
    model_dir: Option<PathBuf>,
    predictors: HashMap<String, Registered>,
    schemas: HashMap<SchemaFamily, Arc<FeatureSchema>>,
}

impl PredictorRegistry {
    /// Empty in-memory registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry backed by a model directory; nothing is read until first use.
    pub fn open(model_dir: impl Into<PathBuf>) -> Self {
        Self {
            model_dir: Some(model_dir.into()),
            ..Self::default()
        }
    }

    pub fn from_bundle(bundle: RegistryBundle) -> Result<Self> {
        let mut registry = Self::new();
        for (family, columns) in bundle.schemas {
            let family = parse_family(&family)?;
            registry.set_schema(family, FeatureSchema::new(columns)?);
        }
        for (property, file) in bundle.models {
            let family = file
                .schema
                .unwrap_or_else(|| SchemaFamily::for_property(&property));
            let predictor = file.model.into_predictor(&property)?;
            registry.insert(property, predictor, family);
        }
        Ok(registry)
    }

    pub fn from_bundle_json(json: &str) -> Result<Self> {
        Self::from_bundle(serde_json::from_str(json)?)
    }

    pub fn model_dir(&self) -> Option<&Path> {
        self.model_dir.as_deref()
    }

    pub fn insert(
        &mut self,
        property: impl Into<String>,
        predictor: Arc<dyn Predictor>,
        family: SchemaFamily,
    ) {
        self.predictors
            .insert(property.into(), Registered { predictor, family });
    }

    pub fn with_predictor(
        mut self,
        property: impl Into<String>,
        predictor: Arc<dyn Predictor>,
        family: SchemaFamily,
    ) -> Self {
        self.insert(property, predictor, family);
        self
    }

    pub fn set_schema(&mut self, family: SchemaFamily, schema: FeatureSchema) {
        self.schemas.insert(family, Arc::new(schema));
    }

    pub fn with_schema(mut self, family: SchemaFamily, schema: FeatureSchema) -> Self {
        self.set_schema(family, schema);
        self
    }

    /// Schema of a predictor family, loading it from the model directory once.
    pub fn schema(&mut self, family: SchemaFamily) -> Result<Arc<FeatureSchema>> {
        if let Some(schema) = self.schemas.get(&family) {
            return Ok(Arc::clone(schema));
        }

        let Some(dir) = &self.model_dir else {
            return Err(RecipeError::SchemaUnavailable {
                family,
                path: "<not registered>".to_string(),
            });
        };
        let path = dir.join(family.file_name());
        if !path.is_file() {
            return Err(RecipeError::SchemaUnavailable {
                family,
                path: path.display().to_string(),
            });
        }

        let schema = Arc::new(FeatureSchema::load(&path)?);
        debug!(%family, columns = schema.len(), path = %path.display(), "loaded feature schema");
        self.schemas.insert(family, Arc::clone(&schema));
        Ok(schema)
    }

    /// Resolve a property's predictor and schema, failing fast when either is
    /// missing or their widths disagree.
    pub fn bind(&mut self, property: &str) -> Result<BoundPredictor> {
        let registered = self.predictor(property)?;
        let schema = self.schema(registered.family)?;

        if let Some(expected) = registered.predictor.n_features() {
            if expected != schema.len() {
                return Err(RecipeError::SchemaMismatch {
                    property: property.to_string(),
                    expected,
                    actual: schema.len(),
                });
            }
        }

        Ok(BoundPredictor {
            property: property.to_string(),
            predictor: registered.predictor,
            schema,
        })
    }

    fn predictor(&mut self, property: &str) -> Result<Registered> {
        if let Some(registered) = self.predictors.get(property) {
            return Ok(registered.clone());
        }

        let unavailable = || RecipeError::ModelUnavailable {
            property: property.to_string(),
        };
        let dir = self.model_dir.as_ref().ok_or_else(unavailable)?;
        let path = dir.join(format!(
            "{}{}{}",
            MODEL_FILE_PREFIX,
            model_file_stem(property),
            MODEL_FILE_SUFFIX
        ));
        if !path.is_file() {
            return Err(unavailable());
        }

        let text = std::fs::read_to_string(&path).map_err(|e| RecipeError::io(&path, e))?;
        let file: ModelFile =
            serde_json::from_str(&text).map_err(|e| RecipeError::InvalidModel {
                name: property.to_string(),
                reason: e.to_string(),
            })?;
        let family = file
            .schema
            .unwrap_or_else(|| SchemaFamily::for_property(property));
        let predictor = file.model.into_predictor(property)?;
        info!(
            property,
            kind = predictor.kind(),
            %family,
            path = %path.display(),
            "loaded predictor"
        );

        let registered = Registered { predictor, family };
        self.predictors
            .insert(property.to_string(), registered.clone());
        Ok(registered)
    }

    /// Every property with a predictor, registered or on disk, sorted.
    ///
    /// On-disk models are listed by file stem, which `bind` accepts.
    pub fn available_properties(&self) -> Result<Vec<String>> {
        let mut names: BTreeSet<String> = self.predictors.keys().cloned().collect();

        if let Some(dir) = &self.model_dir {
            let entries = std::fs::read_dir(dir).map_err(|e| RecipeError::io(dir, e))?;
            for entry in entries {
                let entry = entry.map_err(|e| RecipeError::io(dir, e))?;
                let file_name = entry.file_name();
                let Some(file_name) = file_name.to_str() else {
                    continue;
                };
                if let Some(stem) = file_name
                    .strip_prefix(MODEL_FILE_PREFIX)
                    .and_then(|rest| rest.strip_suffix(MODEL_FILE_SUFFIX))
                {
                    // An in-memory entry may already cover this file under its original name.
                    if !self.predictors.keys().any(|k| model_file_stem(k) == stem) {
                        names.insert(stem.to_string());
                    }
                }
            }
        }

        Ok(names.into_iter().collect())
    }
}

fn parse_family(name: &str) -> Result<SchemaFamily> {
    match name.trim().to_ascii_lowercase().as_str() {
        "synthesis" => Ok(SchemaFamily::Synthesis),
        "coating" => Ok(SchemaFamily::Coating),
        other => Err(RecipeError::InvalidSchema(format!(
            "unknown schema family '{}'",
            other
        ))),
    }
}
