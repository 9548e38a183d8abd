use nom::{
    combinator::{map, opt},
    sequence::tuple,
};

use crate::{Decoy, OffsetKind, Result};

use super::{
    errors::{FormatErrorKind, ParseResult, final_parser, wrap_err},
    primitives::{count, element_symbol, offset_kind},
};

/// Parses a decoy mass shift like `+2Fe` or `-H`
pub fn parse_decoy(decoy: impl AsRef<str>) -> Result<Decoy> {
    let mut parser = final_parser(self::decoy);
    Ok(parser(decoy.as_ref())?)
}

impl Decoy {
    #[must_use]
    pub fn element(&self) -> &str {
        &self.element
    }

    #[must_use]
    pub const fn multiple(&self) -> u32 {
        self.multiple
    }

    #[must_use]
    pub const fn kind(&self) -> OffsetKind {
        self.kind
    }

    /// Either `1` or `-1`
    #[must_use]
    pub fn sign(&self) -> i64 {
        self.kind.offset(1)
    }
}

/// Decoy = Offset Kind , [ Count ] , Element Symbol ;
fn decoy(i: &str) -> ParseResult<Decoy> {
    let parser = map(
        tuple((offset_kind, opt(count), element_symbol)),
        |(kind, multiple, element)| Decoy {
            element: element.to_owned(),
            multiple: multiple.unwrap_or(1),
            kind,
        },
    );
    wrap_err(parser, FormatErrorKind::ExpectedDecoy)(i)
}
