use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::char,
    combinator::{cut, eof, map, opt, peek},
    multi::many1,
    sequence::{delimited, pair, terminated},
};

use crate::{AtomCounts, Charge, Result};

use super::{
    errors::{FormatErrorKind, ParseError, ParseResult, expect, final_parser, map_checked, wrap_err},
    primitives::{count, element_symbol, offset_kind},
};

/// Solvents and reagents that may be written by name in place of a whole formula, along with their composition
const ABBREVIATIONS: [(&str, &[(&str, i64)]); 6] = [
    // CH3CN
    ("ACN", &[("C", 2), ("H", 3), ("N", 1)]),
    // (CH3)2SO
    ("DMSO", &[("C", 2), ("H", 6), ("S", 1), ("O", 1)]),
    // CH2O2
    ("FA", &[("C", 1), ("H", 2), ("O", 2)]),
    // CH3COOH
    ("HAc", &[("C", 2), ("H", 4), ("O", 2)]),
    // CF3CO2H
    ("TFA", &[("C", 2), ("F", 3), ("O", 2), ("H", 1)]),
    // CH3CHOHCH3
    ("IsoProp", &[("C", 3), ("H", 8), ("O", 1)]),
];

// Public API ==========================================================================================================

/// Parses a chemical formula like `C6H12O6`, `Pb(NO3)2`, `2DMSO`, or `TFA` into atom counts
pub fn parse_formula(formula: impl AsRef<str>) -> Result<AtomCounts> {
    let mut parser = final_parser(self::formula);
    Ok(parser(formula.as_ref())?)
}

/// Like `parse_formula`, but allows a trailing charge like the `+` of `C4H9NO2+` or the `-2` of `C6H5O7-2`
pub fn parse_charged_formula(formula: impl AsRef<str>) -> Result<(AtomCounts, Option<Charge>)> {
    let mut parser = final_parser(charged_formula);
    Ok(parser(formula.as_ref())?)
}

// Grammar =============================================================================================================

/// Formula = [ Count ] , ( Abbreviation | Formula Body ) ;
pub(crate) fn formula(i: &str) -> ParseResult<AtomCounts> {
    // NOTE: An abbreviation must make up the rest of the formula, though it may still be followed by a charge
    let whole_abbreviation = terminated(abbreviation, peek(alt((eof, tag("+"), tag("-")))));
    let contents = alt((whole_abbreviation, formula_body));
    let parser = map_checked(
        pair(opt(count), contents),
        |(multiplier, counts)| counts.checked_scale(multiplier.unwrap_or(1)),
        FormatErrorKind::CountOverflow,
    );
    wrap_err(parser, FormatErrorKind::ExpectedFormula)(i)
}

/// Charged Formula = Formula , [ Offset Kind , [ Count ] ] ;
fn charged_formula(i: &str) -> ParseResult<(AtomCounts, Option<Charge>)> {
    let trailing_charge = map(pair(offset_kind, opt(count)), |(kind, count)| {
        kind.offset(Charge::new(count.unwrap_or(1).into()))
    });
    pair(formula, opt(trailing_charge))(i)
}

/// Abbreviation = "ACN" | "DMSO" | "FA" | "HAc" | "TFA" | "IsoProp" ;
fn abbreviation(i: &str) -> ParseResult<AtomCounts> {
    ABBREVIATIONS
        .iter()
        .find_map(|&(abbr, counts)| {
            let rest = i.strip_prefix(abbr)?;
            Some((rest, counts.iter().copied().collect()))
        })
        .ok_or_else(|| nom::Err::Error(ParseError::new(i, FormatErrorKind::ExpectedFormula)))
}

/// Formula Body = { Group | Element Count }- ;
fn formula_body(i: &str) -> ParseResult<AtomCounts> {
    let parser = map_checked(
        many1(alt((group, element_count))),
        |terms| {
            terms
                .iter()
                .try_fold(AtomCounts::new(), |counts, term| counts.checked_merge(term))
        },
        FormatErrorKind::CountOverflow,
    );
    wrap_err(parser, FormatErrorKind::ExpectedFormula)(i)
}

/// Group = "(" , Formula Body , ")" , [ Count ] ;
fn group(i: &str) -> ParseResult<AtomCounts> {
    let close = expect(char(')'), FormatErrorKind::ExpectedGroupEnd);
    let body = delimited(char('('), cut(formula_body), cut(close));
    map_checked(
        pair(body, opt(count)),
        |(counts, multiplier)| counts.checked_scale(multiplier.unwrap_or(1)),
        FormatErrorKind::CountOverflow,
    )(i)
}

/// Element Count = Element Symbol , [ Count ] ;
fn element_count(i: &str) -> ParseResult<AtomCounts> {
    map(pair(element_symbol, opt(count)), |(symbol, count)| {
        AtomCounts::from([(symbol, i64::from(count.unwrap_or(1)))])
    })(i)
}
