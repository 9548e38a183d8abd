use std::fmt;

use miette::{Diagnostic, LabeledSpan, SourceSpan};
use nom::{
    Err, Finish, IResult, Parser,
    combinator::{all_consuming, complete},
    error::ErrorKind,
};
use thiserror::Error;

pub type ParseResult<'a, O> = IResult<&'a str, O, ParseError<'a>>;

#[derive(Clone, Eq, PartialEq, Debug, Error)]
#[error("{kind}")]
pub struct FormatError {
    input: String,
    span: SourceSpan,
    kind: FormatErrorKind,
}

impl FormatError {
    #[must_use]
    pub const fn kind(&self) -> &FormatErrorKind {
        &self.kind
    }

    #[must_use]
    pub const fn span(&self) -> SourceSpan {
        self.span
    }
}

impl Diagnostic for FormatError {
    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&self.input)
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.kind.help()
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let label = self.kind.label()?;
        Some(Box::new(std::iter::once(LabeledSpan::new_with_span(
            Some(label.to_owned()),
            self.span,
        ))))
    }
}

// NOTE: Public so that callers can match on what went wrong, but this should be marked as #[non_exhaustive] before
// the API is stabilised
#[derive(Clone, Eq, PartialEq, Debug, Diagnostic, Error)]
pub enum FormatErrorKind {
    #[error("expected a chemical formula, like C6H12O6 or (CH3)2SO")]
    ExpectedFormula,

    #[error("expected an element symbol, like C or Cl")]
    ExpectedElementSymbol,

    #[error("expected an uppercase ASCII letter")]
    ExpectedUppercase,

    #[error("expected a lowercase ASCII letter")]
    ExpectedLowercase,

    #[error("expected an ASCII digit")]
    ExpectedDigit,

    #[diagnostic(help("you've probably forgotten to close an earlier '(' group"))]
    #[error("expected ')' to close a group")]
    ExpectedGroupEnd,

    #[error("expected '[' to open an adduct")]
    ExpectedAdductStart,

    #[diagnostic(help("adducts are written relative to M, the base molecule, like [M+H]+ or [2M-H]-"))]
    #[error("expected an 'M' standing for the base molecule")]
    ExpectedMolecule,

    #[diagnostic(help("you've probably forgotten to close an earlier '[' bracket"))]
    #[error("expected ']' to close an adduct")]
    ExpectedAdductEnd,

    #[error("expected a '+' or '-'")]
    ExpectedSign,

    #[diagnostic(help("counts must fit in an i64 once every multiplier is applied"))]
    #[error("an atom count in this formula is too large")]
    CountOverflow,

    #[diagnostic(help(
        "decoys are a sign, an optional count, and then an element symbol, like +2Fe or -H"
    ))]
    #[error("expected a decoy mass shift")]
    ExpectedDecoy,

    #[diagnostic(help(
        "this is an internal error that you shouldn't ever see! If you have gotten this error, then please report \
        it as a bug!"
    ))]
    #[error("internal `nom` error: {0:?}")]
    NomError(ErrorKind),

    #[diagnostic(help("check the unparsed region for errors, or remove it from the rest of the input"))]
    #[error("could not interpret the full input")]
    Incomplete,
}

impl FormatErrorKind {
    fn label(&self) -> Option<&'static str> {
        Some(match self {
            Self::ExpectedFormula => "expected a formula",
            Self::ExpectedElementSymbol => "expected an element",
            Self::ExpectedUppercase => "expected uppercase",
            Self::ExpectedLowercase => "expected lowercase",
            Self::ExpectedDigit => "expected digit",
            Self::ExpectedGroupEnd => "expected ')'",
            Self::ExpectedAdductStart => "expected '['",
            Self::ExpectedMolecule => "expected 'M'",
            Self::ExpectedAdductEnd => "expected ']'",
            Self::ExpectedSign => "expected '+' or '-'",
            Self::CountOverflow => "count overflowed here",
            Self::ExpectedDecoy => "expected a decoy",
            Self::Incomplete => "input was valid up until this point",
            Self::NomError(_) => "the region that triggered this bug!",
        })
    }
}

impl From<ErrorKind> for FormatErrorKind {
    fn from(value: ErrorKind) -> Self {
        match value {
            ErrorKind::Eof => Self::Incomplete,
            kind => Self::NomError(kind),
        }
    }
}

// Parser Errors =======================================================================================================

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct ParseError<'a> {
    input: &'a str,
    // The number of bytes of `input` the error covers
    length: usize,
    kind: FormatErrorKind,
}

impl<'a> ParseError<'a> {
    pub(crate) const fn new(input: &'a str, kind: FormatErrorKind) -> Self {
        Self::spanning(input, 0, kind)
    }

    const fn spanning(input: &'a str, length: usize, kind: FormatErrorKind) -> Self {
        Self {
            input,
            length,
            kind,
        }
    }

    // NOTE: Errors always point into the original input, so whichever has the least input left made it furthest
    fn furthest(self, other: Self) -> Self {
        if other.input.len() < self.input.len() {
            other
        } else {
            self
        }
    }

    fn into_final_error(self, full_input: &str) -> FormatError {
        let start = self.input.as_ptr() as usize - full_input.as_ptr() as usize;
        let length = if self.kind == FormatErrorKind::Incomplete {
            self.input.len()
        } else {
            self.length
        };
        // NOTE: The additional space is added so that Diagnostic labels can point to the end of an input
        FormatError {
            input: format!("{full_input} "),
            span: SourceSpan::from(start..start + length),
            kind: self.kind,
        }
    }
}

impl<'a> nom::error::ParseError<&'a str> for ParseError<'a> {
    fn from_error_kind(input: &'a str, kind: ErrorKind) -> Self {
        Self::new(input, kind.into())
    }

    fn append(_input: &str, _kind: ErrorKind, other: Self) -> Self {
        other
    }

    fn or(self, other: Self) -> Self {
        self.furthest(other)
    }
}

// Combinators =========================================================================================================

pub fn final_parser<'a, O, P>(parser: P) -> impl FnMut(&'a str) -> Result<O, FormatError>
where
    P: Parser<&'a str, O, ParseError<'a>>,
{
    let mut parser = all_consuming(complete(parser));
    move |input| {
        parser
            .parse(input)
            .finish()
            .map(|(_, o)| o)
            .map_err(|e| e.into_final_error(input))
    }
}

/// Replaces any error from `parser` with one of `kind`, pointing at the input `parser` was given
pub fn expect<'a, O, P>(mut parser: P, kind: FormatErrorKind) -> impl FnMut(&'a str) -> ParseResult<'a, O>
where
    P: Parser<&'a str, O, ParseError<'a>>,
{
    move |i| {
        parser
            .parse(i)
            .map_err(|e| e.map(|_| ParseError::new(i, kind.clone())))
    }
}

/// Like `expect`, but only replaces errors from `parser` that didn't make it past the start of the input
pub fn wrap_err<'a, O, P>(mut parser: P, kind: FormatErrorKind) -> impl FnMut(&'a str) -> ParseResult<'a, O>
where
    P: Parser<&'a str, O, ParseError<'a>>,
{
    move |i| {
        parser.parse(i).map_err(|e| match e {
            Err::Error(e) if e.input.len() == i.len() => Err::Error(ParseError::new(i, kind.clone())),
            e => e,
        })
    }
}

/// Maps the output of `parser` through `f`, failing with `kind` if `f` returns `None`
///
/// The error covers everything `parser` consumed, and is a failure rather than a recoverable error, so no other
/// alternatives are tried.
pub fn map_checked<'a, O1, O2, P, F>(
    mut parser: P,
    mut f: F,
    kind: FormatErrorKind,
) -> impl FnMut(&'a str) -> ParseResult<'a, O2>
where
    P: Parser<&'a str, O1, ParseError<'a>>,
    F: FnMut(O1) -> Option<O2>,
{
    move |i| {
        let (rest, output) = parser.parse(i)?;
        f(output).map(|output| (rest, output)).ok_or_else(|| {
            let consumed = i.len() - rest.len();
            Err::Failure(ParseError::spanning(i, consumed, kind.clone()))
        })
    }
}
