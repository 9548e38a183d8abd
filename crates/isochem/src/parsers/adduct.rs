use nom::{
    branch::alt,
    bytes::complete::take_till1,
    character::complete::char,
    combinator::{all_consuming, cut, map, map_parser, opt},
    multi::{many0, many1},
    sequence::{pair, tuple},
};
use tracing::trace;

use crate::{Adduct, AtomCounts, Charge, IsochemError, OffsetKind, Result};

use super::{
    errors::{FormatErrorKind, ParseResult, expect, final_parser},
    formula::formula,
    primitives::{charge, count, offset_kind},
};

// Public API ==========================================================================================================

impl Adduct {
    /// Parses an adduct like `[M+H]+`, `[2M+Na-H]+`, or `[M+DMSO+2H]2+`, or a bare list of offsets like `-H2O`
    pub fn new(adduct: impl AsRef<str>) -> Result<Self> {
        let mut parser = final_parser(self::adduct);
        Ok(parser(adduct.as_ref())?)
    }

    /// How many copies of the base molecule the adduct contains: the 2 of `[2M+H]+`
    #[must_use]
    pub const fn multiplier(&self) -> u32 {
        self.multiplier
    }

    pub fn offsets(&self) -> impl Iterator<Item = (OffsetKind, &AtomCounts)> {
        self.offsets.iter().map(|(kind, counts)| (*kind, counts))
    }

    /// The charge written after the closing bracket, if there was one
    #[must_use]
    pub const fn charge(&self) -> Option<Charge> {
        self.charge
    }

    /// Applies this adduct to `base`, returning `None` when the result would contain a negative atom count
    ///
    /// An error is only returned if an atom count overflows.
    pub fn apply(&self, base: &AtomCounts) -> Result<Option<AtomCounts>> {
        let overflow = || IsochemError::adduct_overflow(base);
        let mut counts = base.clone().checked_scale(self.multiplier).ok_or_else(overflow)?;
        for (kind, offset) in &self.offsets {
            counts = counts.checked_offset(*kind, offset).ok_or_else(overflow)?;
        }

        if let Some((symbol, count)) = counts.iter().find(|&(_, count)| count < 0) {
            trace!(symbol, count, "adduct removes more atoms than the formula contains");
            return Ok(None);
        }
        Ok(Some(counts))
    }
}

/// Applies `adduct` to the atom counts of `base`
///
/// Adducts that can't be parsed are errors, but `Ok(None)` is returned when the adduct is chemically impossible, like
/// removing an `NH4` from a formula containing no nitrogen.
pub fn parse_adduct(adduct: impl AsRef<str>, base: &AtomCounts) -> Result<Option<AtomCounts>> {
    Adduct::new(adduct)?.apply(base)
}

// Grammar =============================================================================================================

/// Adduct = Bracketed Adduct | { Offset }- ;
fn adduct(i: &str) -> ParseResult<Adduct> {
    let offset_list = map(many1(offset), |offsets| Adduct {
        multiplier: 1,
        offsets,
        charge: None,
    });
    alt((bracketed_adduct, offset_list))(i)
}

/// Bracketed Adduct = "[" , [ Count ] , "M" , { Offset } , "]" , [ Charge ] ;
fn bracketed_adduct(i: &str) -> ParseResult<Adduct> {
    let open = expect(char('['), FormatErrorKind::ExpectedAdductStart);
    let molecule = expect(char('M'), FormatErrorKind::ExpectedMolecule);
    let close = expect(char(']'), FormatErrorKind::ExpectedAdductEnd);
    let contents = cut(tuple((opt(count), molecule, many0(offset), close)));
    map(
        tuple((open, contents, opt(charge))),
        |(_, (multiplier, _, offsets, _), charge)| Adduct {
            multiplier: multiplier.unwrap_or(1),
            offsets,
            charge,
        },
    )(i)
}

/// Offset = Offset Kind , Formula ;
fn offset(i: &str) -> ParseResult<(OffsetKind, AtomCounts)> {
    // NOTE: Each formula runs up to the next sign or closing bracket, which stops the charge digits of something like
    // `[M+H]2+` being read as part of a formula
    let formula_text = expect(
        take_till1(|c| matches!(c, '+' | '-' | ']')),
        FormatErrorKind::ExpectedFormula,
    );
    let term = map_parser(formula_text, all_consuming(formula));
    pair(offset_kind, cut(term))(i)
}

#[cfg(test)]
mod tests {
    use crate::{IsochemError, testing_tools::assert_miette_contains};

    use super::*;

    fn base() -> AtomCounts {
        AtomCounts::from([
            ("N", 0),
            ("C", 5),
            ("O", 2),
            ("H", 8),
            ("P", 0),
            ("S", 0),
            ("Cl", 0),
            ("I", 0),
        ])
    }

    fn modified<const N: usize>(changes: [(&str, i64); N]) -> AtomCounts {
        let mut counts = base();
        for (symbol, count) in changes {
            counts.set(symbol, count);
        }
        counts
    }

    #[test]
    fn parse_bracketed_adducts() {
        let adduct = Adduct::new("[2M+Na-H]+").unwrap();
        assert_eq!(adduct.multiplier(), 2);
        assert_eq!(adduct.charge(), Some(Charge::new(1)));
        let offsets: Vec<_> = adduct.offsets().map(|(k, c)| (k, c.to_string())).collect();
        assert_eq!(
            offsets,
            [(OffsetKind::Add, "Na".to_owned()), (OffsetKind::Remove, "H".to_owned())]
        );

        let adduct = Adduct::new("[M+DMSO+2H]2+").unwrap();
        assert_eq!(adduct.multiplier(), 1);
        assert_eq!(adduct.charge(), Some(Charge::new(2)));
        assert_eq!(adduct.offsets().count(), 2);

        let adduct = Adduct::new("[M-H]-").unwrap();
        assert_eq!(adduct.charge(), Some(Charge::new(-1)));

        // Both the offsets and the charge are optional
        let adduct = Adduct::new("[M]").unwrap();
        assert_eq!(adduct.offsets().count(), 0);
        assert_eq!(adduct.charge(), None);
    }

    #[test]
    fn parse_offset_lists() {
        let adduct = Adduct::new("-H2O").unwrap();
        assert_eq!(adduct.multiplier(), 1);
        assert_eq!(adduct.charge(), None);
        let adduct = Adduct::new("+Na-H").unwrap();
        assert_eq!(adduct.offsets().count(), 2);
    }

    #[test]
    fn apply_adducts() {
        let base = base();
        let adduct = |adduct: &str| parse_adduct(adduct, &base).unwrap();

        assert_eq!(adduct("-2C"), Some(modified([("C", 3)])));
        assert_eq!(adduct("-H2O"), Some(modified([("O", 1), ("H", 6)])));
        assert_eq!(adduct("+H"), Some(modified([("H", 9)])));
        assert_eq!(adduct("[M+H+Na]2+"), Some(modified([("H", 9), ("Na", 1)])));
        assert_eq!(adduct("[M-H]-"), Some(modified([("H", 7)])));
        assert_eq!(
            adduct("[M+CH3OH+H]+"),
            Some(modified([("C", 6), ("O", 3), ("H", 13)]))
        );
        assert_eq!(adduct("[M+2Na-H]+"), Some(modified([("H", 7), ("Na", 2)])));
        assert_eq!(adduct("[M+2Na]2+"), Some(modified([("Na", 2)])));
        assert_eq!(
            adduct("[M+DMSO+2H]2+"),
            Some(modified([("C", 7), ("O", 3), ("H", 16), ("S", 1)]))
        );
        assert_eq!(
            adduct("[M+2ACN+2H]2+"),
            Some(modified([("N", 2), ("C", 9), ("H", 16)]))
        );
        assert_eq!(
            adduct("[2M+NH4]+"),
            Some(modified([("N", 1), ("C", 10), ("O", 4), ("H", 20)]))
        );
        assert_eq!(
            adduct("[3M-H]+"),
            Some(modified([("C", 15), ("O", 6), ("H", 23)]))
        );
    }

    #[test]
    fn impossible_adducts() {
        let base = base();
        assert_eq!(parse_adduct("[M+H-NH4]", &base).unwrap(), None);
        assert_eq!(parse_adduct("-3O", &base).unwrap(), None);
        assert_eq!(parse_adduct("-Fe", &base).unwrap(), None);
    }

    #[test]
    fn overflowing_adducts() {
        let huge = AtomCounts::from([("C", 1), ("H", i64::MAX / 2 + 1)]);
        assert_eq!(
            *parse_adduct("[2M+H]+", &huge).unwrap_err(),
            IsochemError::adduct_overflow(&huge)
        );
        let full = AtomCounts::from([("H", i64::MAX)]);
        assert_eq!(
            *parse_adduct("+H", &full).unwrap_err(),
            IsochemError::adduct_overflow(&full)
        );
        assert_eq!(
            parse_adduct("-H", &full).unwrap(),
            Some(AtomCounts::from([("H", i64::MAX - 1)]))
        );
        assert_miette_contains!(
            parse_adduct("[2M+H]+", &huge),
            "an adduct overflowed the atom counts"
        );
        // Overflows inside the adduct itself are format errors
        assert!(matches!(
            *parse_adduct("[M+(H4294967295)4294967295]+", &huge).unwrap_err(),
            IsochemError::Format { .. }
        ));
    }

    #[test]
    fn malformed_adducts() {
        let base = base();
        let kind = |adduct: &str| match *parse_adduct(adduct, &base).unwrap_err() {
            IsochemError::Format { error } => error.kind().clone(),
            _ => panic!("expected a format error"),
        };
        assert_eq!(kind("[M+H"), FormatErrorKind::ExpectedAdductEnd);
        assert_eq!(kind("[H]+"), FormatErrorKind::ExpectedMolecule);
        assert_eq!(kind("[M+]+"), FormatErrorKind::ExpectedFormula);
        assert_eq!(kind("[M+h]+"), FormatErrorKind::ExpectedFormula);
        assert_eq!(kind("[M+H]+x"), FormatErrorKind::Incomplete);
        assert_miette_contains!(
            parse_adduct("[M+H", &base),
            "expected ']' to close an adduct",
            "forgotten to close an earlier '[' bracket"
        );
    }
}
