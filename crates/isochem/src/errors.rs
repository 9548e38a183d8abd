use miette::Diagnostic;
use thiserror::Error;

use crate::{AtomCounts, atoms::errors::LookupError, parsers::errors::FormatError};

pub type Result<T, E = Box<IsochemError>> = std::result::Result<T, E>;

#[derive(Debug, Diagnostic, Clone, Eq, PartialEq, Error)]
pub enum IsochemError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Format {
        #[from]
        error: FormatError,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Lookup {
        #[from]
        error: LookupError,
    },

    #[diagnostic(help(
        "a compound needs at least one atom with a non-zero count, check that the formula (and any adduct applied \
        to it) isn't empty"
    ))]
    #[error("the monoisotopic mass of {formula:?} could not be calculated")]
    Computation { formula: String },

    #[diagnostic(help(
        "atom counts can't drop below zero, so check any offsets that might be removing more atoms than the formula \
        contains"
    ))]
    #[error("the element {symbol} was given a negative atom count ({count})")]
    NegativeCount { symbol: String, count: i64 },

    #[diagnostic(help("compounds hold at most 4294967295 atoms of each element"))]
    #[error("the element {symbol} was given too many atoms ({count})")]
    TooManyAtoms { symbol: String, count: i64 },

    #[diagnostic(help("check the adduct's multiplier, and any offsets that add atoms"))]
    #[error("an adduct overflowed the atom counts of {formula}")]
    AdductOverflow { formula: String },

    #[diagnostic(help("try \"absolute\" (or \"abs\") or \"relative\" (or \"rel\") instead"))]
    #[error("{0:?} is not a known abundance scale")]
    UnknownScale(String),
}

impl IsochemError {
    pub(crate) fn computation(formula: &str) -> Self {
        let formula = formula.to_owned();

        Self::Computation { formula }
    }

    pub(crate) fn negative_count(symbol: &str, count: i64) -> Self {
        let symbol = symbol.to_owned();

        Self::NegativeCount { symbol, count }
    }

    pub(crate) fn too_many_atoms(symbol: &str, count: i64) -> Self {
        let symbol = symbol.to_owned();

        Self::TooManyAtoms { symbol, count }
    }

    pub(crate) fn adduct_overflow(formula: &AtomCounts) -> Self {
        let formula = formula.to_string();

        Self::AdductOverflow { formula }
    }

    pub(crate) fn unknown_scale(scale: &str) -> Self {
        Self::UnknownScale(scale.to_owned())
    }
}

impl From<FormatError> for Box<IsochemError> {
    fn from(error: FormatError) -> Self {
        Box::new(error.into())
    }
}

impl From<LookupError> for Box<IsochemError> {
    fn from(error: LookupError) -> Self {
        Box::new(error.into())
    }
}
