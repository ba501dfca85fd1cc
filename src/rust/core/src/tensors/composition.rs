// SPDX-FileCopyrightText: 2026 Santhosh Shyamsundar, Prabhu S., and Studio Tyto
// SPDX-License-Identifier: MIT
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Prefix used by the synthesis schema for monomer columns.
pub const MONOMER_PREFIX: &str = "monomer_";

/// `monomer_BA` -> `BA`; bare identifiers pass through.
pub fn strip_monomer_prefix(id: &str) -> &str {
    id.strip_prefix(MONOMER_PREFIX).unwrap_or(id)
}

/// Monomer recipe in phr, keyed by bare monomer identifier.
///
/// Search candidates may sum to anything; [`MonomerComposition::renormalized`]
/// produces the well-formed recipe handed back to callers.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, f64>", into = "BTreeMap<String, f64>")]
pub struct MonomerComposition {
    ratios: BTreeMap<String, f64>,
}

impl From<BTreeMap<String, f64>> for MonomerComposition {
    fn from(ratios: BTreeMap<String, f64>) -> Self {
        Self::from_pairs(ratios)
    }
}

impl From<MonomerComposition> for BTreeMap<String, f64> {
    fn from(composition: MonomerComposition) -> Self {
        composition.ratios
    }
}

impl MonomerComposition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(identifier, phr)` pairs; prefixed identifiers are stripped.
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: AsRef<str>,
    {
        let mut composition = Self::new();
        for (id, phr) in pairs {
            composition.set(id.as_ref(), phr);
        }
        composition
    }

    /// Negative ratios are stored as zero.
    pub fn set(&mut self, id: &str, phr: f64) {
        self.ratios
            .insert(strip_monomer_prefix(id).to_string(), phr.max(0.0));
    }

    /// Ratio of a monomer, zero when absent.
    pub fn get(&self, id: &str) -> f64 {
        self.ratios
            .get(strip_monomer_prefix(id))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ratios.contains_key(strip_monomer_prefix(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.ratios.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.ratios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ratios.is_empty()
    }

    pub fn total_phr(&self) -> f64 {
        self.ratios.values().sum()
    }

    /// Scale so the ratios sum to exactly `target`.
    ///
    /// Returns `None` when every ratio is zero (nothing to scale).
    pub fn renormalized(&self, target: f64) -> Option<MonomerComposition> {
        let total = self.total_phr();
        if total <= 0.0 {
            return None;
        }

        let mut ratios: BTreeMap<String, f64> = self
            .ratios
            .iter()
            .map(|(k, v)| (k.clone(), v / total * target))
            .collect();

        // Push the rounding residue onto the largest component so the sum is exact.
        let residue = target - ratios.values().sum::<f64>();
        if residue != 0.0 {
            if let Some(largest) = ratios
                .values_mut()
                .max_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
            {
                *largest = (*largest + residue).max(0.0);
            }
        }

        Some(MonomerComposition { ratios })
    }

    pub fn into_inner(self) -> BTreeMap<String, f64> {
        self.ratios
    }
}
