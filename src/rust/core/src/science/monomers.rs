// SPDX-FileCopyrightText: 2026 Santhosh Shyamsundar, Prabhu S., and Studio Tyto
// SPDX-License-Identifier: MIT
//
// Reference monomer data (Polymer Handbook, supplier technical data sheets)

use serde::{Deserialize, Serialize};

/// Homopolymer reference properties of a single monomer.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MonomerProperties {
    /// Homopolymer glass transition temperature (K)
    pub tg: f64,
    /// Molecular weight (g/mol)
    pub mw: f64,
    /// Polarity index (dimensionless 0-1)
    pub polarity: f64,
}

impl MonomerProperties {
    pub const fn new(tg: f64, mw: f64, polarity: f64) -> Self {
        Self { tg, mw, polarity }
    }
}

/// Substituted for identifiers missing from the table.
pub const UNKNOWN_MONOMER: MonomerProperties = MonomerProperties::new(293.15, 100.0, 0.20);

/// Extending the table only needs new rows here.
static MONOMER_TABLE: &[(&str, MonomerProperties)] = &[
    ("BA", MonomerProperties::new(219.15, 128.17, 0.15)), // Butyl acrylate (-54 C)
    ("2-EHA", MonomerProperties::new(203.15, 184.28, 0.10)), // 2-Ethylhexyl acrylate (-70 C)
    ("MMA", MonomerProperties::new(378.15, 100.12, 0.30)), // Methyl methacrylate (105 C)
    ("AA", MonomerProperties::new(379.15, 72.06, 0.90)),  // Acrylic acid (106 C)
    ("MA", MonomerProperties::new(281.15, 86.09, 0.40)),  // Methyl acrylate (8 C)
    ("EA", MonomerProperties::new(249.15, 100.12, 0.25)), // Ethyl acrylate (-24 C)
    ("BMA", MonomerProperties::new(293.15, 142.20, 0.12)), // Butyl methacrylate (20 C)
    ("St", MonomerProperties::new(373.15, 104.15, 0.05)), // Styrene (100 C)
    ("2-HEMA", MonomerProperties::new(328.15, 130.14, 0.85)),
    ("2-HEA", MonomerProperties::new(258.15, 116.12, 0.80)),
    ("GMA", MonomerProperties::new(319.15, 142.15, 0.50)), // Glycidyl methacrylate (46 C)
    ("VAc", MonomerProperties::new(303.15, 86.09, 0.35)), // Vinyl acetate (30 C)
    ("AN", MonomerProperties::new(378.15, 53.06, 0.75)),  // Acrylonitrile (105 C)
    ("LMA", MonomerProperties::new(208.15, 254.41, 0.05)), // Lauryl methacrylate (-65 C)
    ("EMA", MonomerProperties::new(338.15, 114.14, 0.20)), // Ethyl methacrylate (65 C)
    ("IBOA", MonomerProperties::new(367.15, 208.30, 0.10)), // Isobornyl acrylate (94 C)
    ("IBOMA", MonomerProperties::new(423.15, 222.32, 0.08)),
    ("MAA", MonomerProperties::new(501.15, 86.09, 0.85)), // Methacrylic acid (228 C)
    ("CHMA", MonomerProperties::new(377.15, 168.23, 0.10)), // Cyclohexyl methacrylate (104 C)
    ("4-HBA", MonomerProperties::new(233.15, 144.17, 0.75)), // 4-Hydroxybutyl acrylate (-40 C)
];

/// Look up a monomer by bare identifier (no `monomer_` prefix).
pub fn lookup(id: &str) -> Option<MonomerProperties> {
    MONOMER_TABLE
        .iter()
        .find(|(name, _)| *name == id)
        .map(|(_, props)| *props)
}

/// All identifiers with reference data, in table order.
pub fn known_monomers() -> impl Iterator<Item = &'static str> {
    MONOMER_TABLE.iter().map(|(name, _)| *name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_known_and_unknown() {
        let ba = lookup("BA").unwrap();
        assert_eq!(ba.tg, 219.15);
        assert_eq!(ba.mw, 128.17);
        assert!(lookup("monomer_BA").is_none());
        assert!(lookup("NDM").is_none());
    }

    #[test]
    fn test_table_identifiers_unique() {
        let mut names: Vec<&str> = known_monomers().collect();
        let total = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), total);
    }
}
