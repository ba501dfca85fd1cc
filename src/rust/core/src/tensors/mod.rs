// SPDX-FileCopyrightText: 2026 Santhosh Shyamsundar, Prabhu S., and Studio Tyto
// SPDX-License-Identifier: MIT

pub mod composition;
pub mod features;

pub use composition::{strip_monomer_prefix, MonomerComposition, MONOMER_PREFIX};
pub use features::{
    ChemicalFeature, FeatureAssembler, FeatureSchema, FeatureSlot, SchemaFamily,
};
