//! Theoretical isotope patterns, built by searching outwards from a compound's all-monoisotopic isotopologue

mod isotopologue;
mod options;

use itertools::Itertools;
use serde::Serialize;
use tracing::debug;

use crate::{Charge, Compound, Isotope};

use self::isotopologue::{Row, search};
pub use options::{DEFAULT_ABUNDANCE_LIMIT, DEFAULT_MAX_ITERATIONS, PatternOptions, Scale};

/// The mass of an electron, in daltons
pub const ELECTRON_MASS: f64 = 5.486e-4;

/// A single peak of an isotope pattern
///
/// `mass` is a mass-to-charge ratio when the pattern was calculated with a non-zero charge, and `abundance` is either
/// a probability or a percentage of the largest peak, depending on the pattern's `Scale`.
#[derive(Copy, Clone, PartialEq, Debug, Serialize)]
pub struct IsotopePeak {
    pub mass: f64,
    pub abundance: f64,
}

/// An isotope pattern peak along with the isotopic composition that produced it
#[derive(Clone, PartialEq, Debug)]
pub struct Isotopologue<'r> {
    composition: Vec<(&'r Isotope, u32)>,
    mass: f64,
    abundance: f64,
    charge: Charge,
}

impl<'r> Isotopologue<'r> {
    /// The number of atoms of every isotope in the compound (including those with none), with monoisotopes first
    #[must_use]
    pub fn composition(&self) -> &[(&'r Isotope, u32)] {
        &self.composition
    }

    #[must_use]
    pub fn count(&self, isotope: &str) -> Option<u32> {
        self.composition
            .iter()
            .find(|(i, _)| i.symbol() == isotope)
            .map(|&(_, c)| c)
    }

    #[must_use]
    pub const fn mass(&self) -> f64 {
        self.mass
    }

    #[must_use]
    pub const fn abundance(&self) -> f64 {
        self.abundance
    }

    #[must_use]
    pub const fn charge(&self) -> Charge {
        self.charge
    }

    #[must_use]
    pub const fn peak(&self) -> IsotopePeak {
        IsotopePeak {
            mass: self.mass,
            abundance: self.abundance,
        }
    }
}

// Public API ==========================================================================================================

/// Calculates the isotope pattern of `compound` as a list of peaks
///
/// See `isotopologues()` for the details of how peaks are found, scaled, and sorted.
#[must_use]
pub fn isopattern(compound: &Compound, options: &PatternOptions) -> Vec<IsotopePeak> {
    isotopologues(compound, options)
        .iter()
        .map(Isotopologue::peak)
        .collect()
}

/// Calculates the isotope pattern of `compound`, keeping the isotopic composition of every peak
///
/// Starting from the all-monoisotopic isotopologue, one more atom is swapped for a non-monoisotope each generation.
/// Isotopologues less abundant than `options.abundance_limit` are kept, but never substituted any further, and the
/// search stops early once `options.max_iterations` isotopologues have been found.
///
/// With a non-zero charge, each mass becomes `(mass - ELECTRON_MASS * charge) / |charge|`. Absolute patterns are
/// sorted by increasing mass. Relative patterns are rescaled so the largest abundance is 100 and the smallest is 0,
/// then sorted by decreasing abundance.
#[must_use]
pub fn isotopologues<'r>(compound: &Compound<'r>, options: &PatternOptions) -> Vec<Isotopologue<'r>> {
    let rows = search(compound, options.abundance_limit, options.max_iterations);
    debug!(
        formula = compound.formula(),
        isotopologues = rows.len(),
        "searched isotopologues"
    );

    let charge = options.charge;
    let mut isotopologues: Vec<_> = rows
        .into_iter()
        .filter(|row| row.abundance > 0.0)
        .map(|row| Isotopologue::from_row(compound, row, charge))
        .collect();

    match options.scale {
        Scale::Absolute => isotopologues.sort_by(|a, b| a.mass.total_cmp(&b.mass)),
        Scale::Relative => {
            rescale(&mut isotopologues);
            isotopologues.sort_by(|a, b| b.abundance.total_cmp(&a.abundance));
        }
    }

    isotopologues
}

// ---------------------------------------------------------------------------------------------------------------------

impl<'r> Isotopologue<'r> {
    fn from_row(compound: &Compound<'r>, row: Row, charge: Charge) -> Self {
        let composition = compound
            .monoisotopes()
            .iter()
            .copied()
            .zip(row.monoisotopic)
            .chain(compound.other_isotopes().iter().copied().zip(row.substituted))
            .collect();

        let mass = if charge.is_zero() {
            row.mass
        } else {
            let charge = charge.value() as f64;
            (row.mass - ELECTRON_MASS * charge) / charge.abs()
        };

        Self {
            composition,
            mass,
            abundance: row.abundance,
            charge,
        }
    }
}

fn rescale(isotopologues: &mut [Isotopologue]) {
    let Some((min, max)) = isotopologues
        .iter()
        .map(|i| i.abundance)
        .minmax_by(f64::total_cmp)
        .into_option()
    else {
        return;
    };

    let range = max - min;
    for isotopologue in isotopologues {
        // NOTE: When every abundance is the same (including when there's only a single peak), every peak is the
        // largest peak
        isotopologue.abundance = if range > 0.0 {
            (isotopologue.abundance - min) / range * 100.0
        } else {
            100.0
        };
    }
}

// Module Tests ========================================================================================================
