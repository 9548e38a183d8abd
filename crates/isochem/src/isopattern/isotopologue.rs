use ahash::{HashSet, HashSetExt};
use tracing::{debug, trace};

use crate::{Compound, Isotope};

// NOTE: Rows are deduplicated on masses rounded to this many decimal places, and on abundances rounded to
// `ABUNDANCE_DECIMALS` places
const MASS_DECIMALS: i32 = 9;
const ABUNDANCE_DECIMALS: i32 = 3;

/// Swapping one atom of an element's monoisotope for one of its heavier (or lighter) isotopes
#[derive(Copy, Clone, Debug)]
struct Substitution<'r> {
    isotope: &'r Isotope,
    monoisotope: &'r Isotope,
    // Index of the element in `Compound::element_counts()`
    element: usize,
}

/// A single isotopologue found while searching, with atom counts laid out in the same order as
/// `Compound::monoisotopes()` and `Compound::other_isotopes()`
#[derive(Clone, PartialEq, Debug)]
pub(super) struct Row {
    pub(super) monoisotopic: Vec<u32>,
    pub(super) substituted: Vec<u32>,
    pub(super) mass: f64,
    pub(super) abundance: f64,
    stop: bool,
}

impl Row {
    fn root(compound: &Compound) -> Self {
        Self {
            monoisotopic: compound.element_counts().iter().map(|&(_, c)| c).collect(),
            substituted: vec![0; compound.other_isotopes().len()],
            mass: compound.monoisotopic_mass(),
            abundance: compound.monoisotopic_abundance(),
            stop: false,
        }
    }

    /// Returns a copy of this row with one more atom of substitution `index`, or `None` if the element being
    /// substituted has no monoisotopic atoms left
    fn substitute(&self, index: usize, substitution: &Substitution, abundance_limit: f64) -> Option<Self> {
        let Substitution {
            isotope,
            monoisotope,
            element,
        } = *substitution;

        let monoisotopic_count = self.monoisotopic[element];
        if monoisotopic_count == 0 {
            return None;
        }
        let substituted_count = self.substituted[index];

        // NOTE: Moving one atom from the monoisotope to `isotope` changes the multinomial probability by exactly this
        // ratio, so every isotopologue is weighted correctly however many times it has been substituted
        let ratio = isotope.abundance() / f64::from(substituted_count + 1)
            * (f64::from(monoisotopic_count) / monoisotope.abundance());
        let abundance = self.abundance * ratio;

        let mut row = self.clone();
        row.monoisotopic[element] -= 1;
        row.substituted[index] += 1;
        row.mass = self.mass - monoisotope.mass() + isotope.mass();
        row.abundance = abundance;
        row.stop = abundance < abundance_limit;
        Some(row)
    }

    fn dedup_key(&self) -> (Vec<u32>, i64, i64) {
        let round = |x: f64, decimals| (x * 10_f64.powi(decimals)).round() as i64;
        (
            self.substituted.clone(),
            round(self.mass, MASS_DECIMALS),
            round(self.abundance, ABUNDANCE_DECIMALS),
        )
    }
}

/// Runs a breadth-first search over isotopologues of `compound`, starting from the all-monoisotopic root
///
/// Every generation substitutes one more atom into each still-active row of the last. Rows with an abundance below
/// `abundance_limit` are kept, but never substituted further. Once `max_iterations` rows have been found, the
/// generation just finished is kept and the search stops.
pub(super) fn search(compound: &Compound, abundance_limit: f64, max_iterations: usize) -> Vec<Row> {
    let substitutions: Vec<_> = compound
        .element_counts()
        .iter()
        .enumerate()
        .flat_map(|(element, &(e, _))| {
            let monoisotope = e.monoisotope();
            e.other_isotopes().iter().map(move |isotope| Substitution {
                isotope,
                monoisotope,
                element,
            })
        })
        .collect();

    let mut rows = vec![Row::root(compound)];
    let mut active = if substitutions.is_empty() { Vec::new() } else { vec![0] };
    let mut generation = 0_u32;

    while !active.is_empty() {
        // NOTE: The budget is checked before every generation, including the first, so a budget of 1 or less keeps
        // only the monoisotopic root
        if rows.len() >= max_iterations {
            debug!(
                formula = compound.formula(),
                rows = rows.len(),
                pending = active.len(),
                "isotopologue search hit its iteration budget"
            );
            break;
        }

        let mut seen = HashSet::with_capacity(active.len() * substitutions.len());
        let children: Vec<_> = active
            .iter()
            .flat_map(|&parent| {
                let parent: &Row = &rows[parent];
                substitutions
                    .iter()
                    .enumerate()
                    .filter_map(move |(i, s)| parent.substitute(i, s, abundance_limit))
            })
            .filter(|row| seen.insert(row.dedup_key()))
            .collect();

        generation += 1;
        let first_child = rows.len();
        rows.extend(children);
        active = (first_child..rows.len()).filter(|&i| !rows[i].stop).collect();

        trace!(
            generation,
            new_rows = rows.len() - first_child,
            active = active.len(),
            "expanded isotopologue generation"
        );
    }

    rows
}
