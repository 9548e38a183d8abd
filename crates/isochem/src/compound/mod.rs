mod atom_counts;

use std::{
    fmt::{self, Display, Formatter},
    hash::{Hash, Hasher},
};

use tracing::{debug, trace};

use crate::{
    AtomCounts, Compound, Element, IsochemError, Isotope, IsotopeRegistry, Result,
    isopattern::{self, IsotopePeak, Isotopologue, PatternOptions},
    parsers::{parse_adduct, parse_charged_formula},
};

/// Elements that always come first in a compound's formula, in this order; any others follow in the order they were
/// first written
pub const ELEMENT_ORDER: [&str; 10] = ["C", "H", "O", "N", "P", "S", "F", "Cl", "Br", "I"];

// Public API ==========================================================================================================

impl<'r> Compound<'r> {
    /// Builds a compound from atom counts, looking up every element in `registry`
    ///
    /// Elements with a count of zero are dropped, but negative counts (or counts that don't fit in a `u32`) are an
    /// error, as is a compound with no atoms.
    pub fn new(atom_counts: &AtomCounts, registry: &'r IsotopeRegistry) -> Result<Self> {
        let element_counts: Vec<_> = Self::ordered_counts(atom_counts)
            .map(|(symbol, count)| {
                let count = u32::try_from(count).map_err(|_| {
                    if count < 0 {
                        IsochemError::negative_count(symbol, count)
                    } else {
                        IsochemError::too_many_atoms(symbol, count)
                    }
                })?;
                Ok((registry.lookup(symbol)?, count))
            })
            .collect::<Result<_>>()?;

        let formula: String = element_counts
            .iter()
            .map(|(element, count)| {
                if *count == 1 {
                    element.symbol().to_owned()
                } else {
                    format!("{}{count}", element.symbol())
                }
            })
            .collect();

        let (monoisotopic_mass, monoisotopic_abundance) =
            element_counts.iter().fold((0.0, 1.0), |(mass, abundance), (element, count)| {
                let monoisotope = element.monoisotope();
                (
                    mass + monoisotope.mass() * f64::from(*count),
                    abundance * monoisotope.abundance().powf(f64::from(*count)),
                )
            });
        if monoisotopic_mass == 0.0 {
            return Err(IsochemError::computation(&formula).into());
        }

        let monoisotopes = element_counts.iter().map(|(e, _)| e.monoisotope()).collect();
        let other_isotopes = element_counts.iter().flat_map(|(e, _)| e.other_isotopes()).collect();

        trace!(%formula, monoisotopic_mass, monoisotopic_abundance, "built compound");
        Ok(Self {
            registry,
            element_counts,
            formula,
            monoisotopic_mass,
            monoisotopic_abundance,
            monoisotopes,
            other_isotopes,
        })
    }

    /// Parses a formula like `C6H12O6` or `(CH3)2SO`, ignoring any trailing charge like the `+` of `C4H9NO2+`
    pub fn from_formula(formula: impl AsRef<str>, registry: &'r IsotopeRegistry) -> Result<Self> {
        let (atom_counts, _) = parse_charged_formula(formula)?;
        Self::new(&atom_counts, registry)
    }

    /// Returns a new compound with `adduct` applied, or `None` if the adduct is impossible for this compound
    pub fn apply_adduct(&self, adduct: impl AsRef<str>) -> Result<Option<Self>> {
        let adduct = adduct.as_ref();
        let Some(atom_counts) = parse_adduct(adduct, &self.atom_counts())? else {
            debug!(formula = %self.formula, adduct, "adduct can't be applied to compound");
            return Ok(None);
        };

        Self::new(&atom_counts, self.registry).map(Some)
    }

    #[must_use]
    pub fn formula(&self) -> &str {
        &self.formula
    }

    #[must_use]
    pub const fn monoisotopic_mass(&self) -> f64 {
        self.monoisotopic_mass
    }

    /// The probability that every atom in the compound is its element's monoisotope
    #[must_use]
    pub const fn monoisotopic_abundance(&self) -> f64 {
        self.monoisotopic_abundance
    }

    /// The monoisotope of each element, in formula order
    #[must_use]
    pub fn monoisotopes(&self) -> &[&'r Isotope] {
        &self.monoisotopes
    }

    /// Every isotope that isn't a monoisotope, grouped by element in formula order
    #[must_use]
    pub fn other_isotopes(&self) -> &[&'r Isotope] {
        &self.other_isotopes
    }

    pub fn elements(&self) -> impl ExactSizeIterator<Item = &'r Element> + '_ {
        self.element_counts.iter().map(|&(e, _)| e)
    }

    #[must_use]
    pub fn count(&self, symbol: &str) -> Option<u32> {
        self.element_counts
            .iter()
            .find(|(e, _)| e.symbol() == symbol)
            .map(|&(_, c)| c)
    }

    #[must_use]
    pub fn contains(&self, symbol: &str) -> bool {
        self.count(symbol).is_some()
    }

    #[must_use]
    pub fn atom_counts(&self) -> AtomCounts {
        self.element_counts
            .iter()
            .map(|(e, c)| (e.symbol(), i64::from(*c)))
            .collect()
    }

    #[must_use]
    pub const fn registry(&self) -> &'r IsotopeRegistry {
        self.registry
    }

    /// See `isopattern::isopattern()`
    #[must_use]
    pub fn isotope_pattern(&self, options: &PatternOptions) -> Vec<IsotopePeak> {
        isopattern::isopattern(self, options)
    }

    /// See `isopattern::isotopologues()`
    #[must_use]
    pub fn isotopologues(&self, options: &PatternOptions) -> Vec<Isotopologue<'r>> {
        isopattern::isotopologues(self, options)
    }

    pub(crate) fn element_counts(&self) -> &[(&'r Element, u32)] {
        &self.element_counts
    }

    fn ordered_counts(atom_counts: &AtomCounts) -> impl Iterator<Item = (&str, i64)> {
        let ordered = ELEMENT_ORDER
            .iter()
            .filter_map(|&symbol| Some((symbol, atom_counts.get(symbol)?)));
        let others = atom_counts.iter().filter(|(symbol, _)| !ELEMENT_ORDER.contains(symbol));

        ordered.chain(others).filter(|&(_, count)| count != 0)
    }
}

impl PartialEq for Compound<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.formula == other.formula
    }
}

impl Eq for Compound<'_> {}

impl PartialEq<str> for Compound<'_> {
    fn eq(&self, other: &str) -> bool {
        self.formula == other
    }
}

impl PartialEq<&str> for Compound<'_> {
    fn eq(&self, other: &&str) -> bool {
        self.formula == *other
    }
}

impl Hash for Compound<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.formula.hash(state);
    }
}

impl Display for Compound<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.formula)
    }
}

// Module Tests ========================================================================================================

#[cfg(test)]
mod tests {
    use assert_float_eq::{assert_float_absolute_eq, assert_float_relative_eq};
    use insta::assert_snapshot;
    use once_cell::sync::Lazy;

    use crate::testing_tools::assert_miette_contains;

    use super::*;

    static REGISTRY: Lazy<IsotopeRegistry> = Lazy::new(IsotopeRegistry::default);

    fn compound(formula: &str) -> Compound<'static> {
        Compound::from_formula(formula, &REGISTRY).unwrap()
    }

    fn symbols<'a>(isotopes: &[&'a Isotope]) -> Vec<&'a str> {
        isotopes.iter().map(|i| i.symbol()).collect()
    }

    #[test]
    fn water() {
        let water = compound("H2O");
        assert_eq!(water.formula(), "H2O");
        assert_float_absolute_eq!(water.monoisotopic_mass(), 18.010_564_684, 1e-9);
        assert_float_relative_eq!(water.monoisotopic_abundance(), 0.997_280_725_673_909_2, 1e-12);
        assert_eq!(water.count("H"), Some(2));
        assert_eq!(water.count("O"), Some(1));
        assert_eq!(water.count("C"), None);
    }

    #[test]
    fn carbon_dioxide() {
        let carbon_dioxide = compound("CO2");
        assert_eq!(carbon_dioxide.formula(), "CO2");
        assert_float_absolute_eq!(carbon_dioxide.monoisotopic_mass(), 43.989_829_24, 1e-9);
        assert_float_relative_eq!(
            carbon_dioxide.monoisotopic_abundance(),
            0.984_597_358_308_059_8,
            1e-12
        );
    }

    #[test]
    fn element_ordering() {
        assert_eq!(compound("HCl").formula(), "HCl");
        assert_eq!(compound("ClH").formula(), "HCl");
        assert_eq!(compound("C4H9NO2+").formula(), "C4H9O2N");
        assert_eq!(compound("C13H20N4O8").formula(), "C13H20O8N4");
        // Elements outside of the usual order keep the order they were written in
        assert_eq!(compound("NaK").formula(), "NaK");
        assert_eq!(compound("KNaCO3").formula(), "CO3KNa");
        // Zero counts are dropped
        assert_eq!(compound("C0H4Na0").formula(), "H4");
    }

    #[test]
    fn formula_round_trip() {
        for formula in ["CH4", "Pb(NO3)2", "C6H12O6", "(CH3)2SO", "Ca3(PO4)2", "2DMSO", "TFA"] {
            let compound = compound(formula);
            let reparsed = Compound::from_formula(compound.formula(), &REGISTRY).unwrap();
            assert_eq!(compound, reparsed);
            assert_eq!(compound.atom_counts(), reparsed.atom_counts());
        }
    }

    #[test]
    fn isotope_inventory() {
        let formaldehyde = compound("CHO").apply_adduct("[M+H]+").unwrap().unwrap();
        assert_eq!(formaldehyde.formula(), "CH2O");
        assert_eq!(symbols(formaldehyde.monoisotopes()), ["12C", "1H", "16O"]);
        assert_eq!(symbols(formaldehyde.other_isotopes()), ["13C", "2H", "17O", "18O"]);
        let elements: Vec<_> = formaldehyde.elements().map(Element::symbol).collect();
        assert_eq!(elements, ["C", "H", "O"]);
    }

    #[test]
    fn adduct_compounds() {
        let formaldehyde = compound("CHO").apply_adduct("[M+H]+").unwrap().unwrap();
        assert_float_absolute_eq!(formaldehyde.monoisotopic_mass(), 30.010_564_684, 1e-9);
        assert_float_relative_eq!(
            formaldehyde.monoisotopic_abundance(),
            0.986_709_549_981_765_9,
            1e-12
        );

        let sodiated = compound("NO").apply_adduct("[M+Na]+").unwrap().unwrap();
        assert_eq!(sodiated.formula(), "ONNa");
        assert_float_absolute_eq!(sodiated.monoisotopic_mass(), 52.987_757_9, 1e-9);
        assert_float_relative_eq!(sodiated.monoisotopic_abundance(), 0.993_784_221_85, 1e-12);
        assert_eq!(symbols(sodiated.monoisotopes()), ["16O", "14N", "23Na"]);
        assert_eq!(symbols(sodiated.other_isotopes()), ["17O", "18O", "15N"]);

        let methylene = compound("CH3").apply_adduct("[M-H]-").unwrap().unwrap();
        assert_eq!(methylene.formula(), "CH2");
        assert_float_absolute_eq!(methylene.monoisotopic_mass(), 14.015_650_064, 1e-9);
        assert_float_relative_eq!(methylene.monoisotopic_abundance(), 0.989_113_094_802_135, 1e-12);
    }

    #[test]
    fn impossible_adducts() {
        let methane = compound("CH4");
        assert_eq!(methane.apply_adduct("[M+H-NH4]+").unwrap(), None);
        assert!(methane.apply_adduct("[M+H").is_err());
        // Removing every atom leaves nothing to weigh
        assert!(matches!(
            *methane.apply_adduct("-CH4").unwrap_err(),
            IsochemError::Computation { .. }
        ));
    }

    #[test]
    fn invalid_compounds() {
        assert_miette_contains!(
            Compound::from_formula("C6H12Xx", &REGISTRY),
            "\"Xx\" could not be found"
        );
        assert_miette_contains!(
            Compound::from_formula("C0", &REGISTRY),
            "monoisotopic mass of \"\" could not be calculated"
        );
        assert!(matches!(
            *Compound::from_formula("C(H2", &REGISTRY).unwrap_err(),
            IsochemError::Format { .. }
        ));
        let negative = AtomCounts::from([("C", 2), ("H", -1)]);
        assert_eq!(
            *Compound::new(&negative, &REGISTRY).unwrap_err(),
            IsochemError::negative_count("H", -1)
        );
    }

    #[test]
    fn oversized_compounds() {
        assert_eq!(
            *Compound::from_formula("(H100000)100000", &REGISTRY).unwrap_err(),
            IsochemError::too_many_atoms("H", 10_000_000_000)
        );
        assert_miette_contains!(
            Compound::from_formula("(H100000)100000", &REGISTRY),
            "the element H was given too many atoms (10000000000)",
            "at most 4294967295 atoms"
        );
        let largest = AtomCounts::from([("C", i64::from(u32::MAX))]);
        assert!(Compound::new(&largest, &REGISTRY).is_ok());
    }

    #[test]
    fn compound_display() {
        let glucose = compound("C6H12O6");
        assert_snapshot!(glucose, @"C6H12O6");
        assert_eq!(glucose, "C6H12O6");
        assert_eq!(glucose.atom_counts().to_string(), "C6H12O6");
        assert!(glucose.contains("O"));
        assert!(!glucose.contains("N"));
        assert!(std::ptr::eq(glucose.registry(), &*REGISTRY));
    }
}
