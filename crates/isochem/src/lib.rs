//! Theoretical isotope patterns for chemical formulae and their mass-spectrometry adducts

pub mod adducts;
pub mod atoms;
pub mod compound;
pub mod errors;
pub mod isopattern;
pub mod parsers;
#[cfg(test)]
mod testing_tools;

// External Crate Imports
use ahash::HashMap;
use derive_more::{Add, Display, From, Into, Neg, Sub};
use once_cell::sync::OnceCell;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

// FIXME: Work on what's publicly exported / part of the API! Maybe a prelude?
pub use adducts::{AdductTable, adduct_names, modify_charge};
pub use atoms::isotope_registry::ElementKey;
pub use errors::{IsochemError, Result};
pub use isopattern::{IsotopePeak, Isotopologue, PatternOptions, Scale, isopattern};
pub use parsers::{parse_adduct, parse_decoy, parse_formula};

// NOTE: For the types in this module, 'r lifetimes indicate references to the IsotopeRegistry

// Reference Data ======================================================================================================

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Isotope {
    symbol: String,
    mass: OrderedFloat<f64>,
    abundance: OrderedFloat<f64>,
}

#[derive(Clone, Debug)]
pub struct Element {
    symbol: String,
    // NOTE: Never empty and kept sorted by ascending abundance, so the monoisotope is always the last isotope
    isotopes: Vec<Isotope>,
    isotope_index: OnceCell<HashMap<String, usize>>,
}

#[derive(Clone, Debug)]
pub struct IsotopeRegistry {
    elements: HashMap<String, Element>,
    // Maps every isotope symbol to the symbol of the element that owns it
    isotope_owners: HashMap<String, String>,
}

// Formulae ============================================================================================================

/// Signed atom counts keyed by element symbol, kept in the order each symbol was first seen
#[derive(Clone, Debug, Default)]
pub struct AtomCounts(Vec<(String, i64)>);

#[derive(Clone, Debug)]
pub struct Compound<'r> {
    registry: &'r IsotopeRegistry,
    element_counts: Vec<(&'r Element, u32)>,
    formula: String,
    monoisotopic_mass: f64,
    monoisotopic_abundance: f64,
    monoisotopes: Vec<&'r Isotope>,
    other_isotopes: Vec<&'r Isotope>,
}

// ---------------------------------------------------------------------------------------------------------------------

#[derive(
    Copy,
    Clone,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    Debug,
    Display,
    Default,
    Serialize,
    Deserialize,
    From,
    Into,
    Add,
    Sub,
    Neg,
)]
#[serde(transparent)]
pub struct Charge(i64);

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum OffsetKind {
    Add,
    Remove,
}

// Adducts and Decoys ==================================================================================================

/// A parsed adduct like `[2M+Na-H]+`, or a bare list of offsets like `-H2O`
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Adduct {
    multiplier: u32,
    offsets: Vec<(OffsetKind, AtomCounts)>,
    charge: Option<Charge>,
}

/// A signed mass shift like `+2Fe`, measured in monoisotopic masses of a single element
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Decoy {
    element: String,
    multiple: u32,
    kind: OffsetKind,
}
