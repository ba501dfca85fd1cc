// SPDX-FileCopyrightText: 2026 Santhosh Shyamsundar, Prabhu S., and Studio Tyto
// SPDX-License-Identifier: MIT
//! Chemical descriptor derivation.
//!
//! Collapses a monomer recipe into phr-weighted averages of the reference
//! homopolymer properties. Pure and infallible: unknown monomers degrade to
//! the [`UNKNOWN_MONOMER`] triple instead of failing.

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::monomers::{self, UNKNOWN_MONOMER};
use crate::tensors::composition::{strip_monomer_prefix, MonomerComposition};

/// phr-weighted chemical descriptors of a recipe.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChemicalDescriptors {
    /// Weighted homopolymer Tg (K)
    pub avg_tg: f64,
    /// Weighted molecular weight (g/mol)
    pub avg_mw: f64,
    /// Weighted polarity index
    pub avg_polarity: f64,
}

impl ChemicalDescriptors {
    /// Generic room-temperature monomer, returned for an empty recipe.
    pub const DEFAULT: ChemicalDescriptors = ChemicalDescriptors {
        avg_tg: 298.15,
        avg_mw: 100.0,
        avg_polarity: 0.20,
    };
}

impl Default for ChemicalDescriptors {
    fn default() -> Self {
        Self::DEFAULT
    }
}

pub struct DescriptorEngine;

impl DescriptorEngine {
    /// Weighted-average descriptors of `composition`.
    ///
    /// A recipe whose ratios sum to zero yields [`ChemicalDescriptors::DEFAULT`].
    pub fn compute(composition: &MonomerComposition) -> ChemicalDescriptors {
        let total = composition.total_phr();
        if total == 0.0 {
            return ChemicalDescriptors::DEFAULT;
        }

        let mut avg_tg = 0.0;
        let mut avg_mw = 0.0;
        let mut avg_polarity = 0.0;

        for (id, phr) in composition.iter() {
            let bare = strip_monomer_prefix(id);
            let props = match monomers::lookup(bare) {
                Some(p) => p,
                None => {
                    if phr != 0.0 {
                        warn!(monomer = bare, "no reference data, using fallback properties");
                    }
                    UNKNOWN_MONOMER
                }
            };

            let weight = phr / total;
            avg_tg += weight * props.tg;
            avg_mw += weight * props.mw;
            avg_polarity += weight * props.polarity;
        }

        ChemicalDescriptors {
            avg_tg,
            avg_mw,
            avg_polarity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_zero_total_returns_default() {
        let empty = MonomerComposition::new();
        assert_eq!(DescriptorEngine::compute(&empty), ChemicalDescriptors::DEFAULT);

        let zeros = MonomerComposition::from_pairs([("BA", 0.0), ("MMA", 0.0)]);
        assert_eq!(DescriptorEngine::compute(&zeros), ChemicalDescriptors::DEFAULT);
    }

    #[test]
    fn test_unknown_monomer_returns_fallback() {
        let recipe = MonomerComposition::from_pairs([("XYZ-9", 100.0)]);
        let d = DescriptorEngine::compute(&recipe);
        assert_eq!(d.avg_tg, UNKNOWN_MONOMER.tg);
        assert_eq!(d.avg_mw, UNKNOWN_MONOMER.mw);
        assert_eq!(d.avg_polarity, UNKNOWN_MONOMER.polarity);
        assert_ne!(d, ChemicalDescriptors::DEFAULT);
    }

    #[test]
    fn test_weighted_average_with_prefix() {
        // 80 BA / 20 MMA, keyed the way the synthesis schema names them
        let recipe = MonomerComposition::from_pairs([("monomer_BA", 80.0), ("monomer_MMA", 20.0)]);
        let d = DescriptorEngine::compute(&recipe);
        assert_relative_eq!(d.avg_tg, 0.8 * 219.15 + 0.2 * 378.15, epsilon = 1e-9);
        assert_relative_eq!(d.avg_mw, 0.8 * 128.17 + 0.2 * 100.12, epsilon = 1e-9);
        assert_relative_eq!(d.avg_polarity, 0.8 * 0.15 + 0.2 * 0.30, epsilon = 1e-12);
    }

    #[test]
    fn test_scale_invariance() {
        // Weights are relative, so a recipe summing to 50 matches one summing to 100
        let half = MonomerComposition::from_pairs([("BA", 40.0), ("AA", 10.0)]);
        let full = MonomerComposition::from_pairs([("BA", 80.0), ("AA", 20.0)]);
        let a = DescriptorEngine::compute(&half);
        let b = DescriptorEngine::compute(&full);
        assert_relative_eq!(a.avg_tg, b.avg_tg, epsilon = 1e-9);
        assert_relative_eq!(a.avg_polarity, b.avg_polarity, epsilon = 1e-12);
    }
}
