use nom::{
    character::complete::{one_of, satisfy, u32},
    combinator::{map, opt, recognize},
    sequence::pair,
};

use crate::{Charge, OffsetKind};

use super::errors::{FormatErrorKind, ParseResult, expect};

/// uppercase
///   = "A" | "B" | "C" | "D" | "E" | "F" | "G"
///   | "H" | "I" | "J" | "K" | "L" | "M" | "N"
///   | "O" | "P" | "Q" | "R" | "S" | "T" | "U"
///   | "V" | "W" | "X" | "Y" | "Z"
///   ;
pub fn uppercase(i: &str) -> ParseResult<char> {
    let parser = satisfy(|c| c.is_ascii_uppercase());
    expect(parser, FormatErrorKind::ExpectedUppercase)(i)
}

/// lowercase
///   = "a" | "b" | "c" | "d" | "e" | "f" | "g"
///   | "h" | "i" | "j" | "k" | "l" | "m" | "n"
///   | "o" | "p" | "q" | "r" | "s" | "t" | "u"
///   | "v" | "w" | "x" | "y" | "z"
///   ;
pub fn lowercase(i: &str) -> ParseResult<char> {
    let parser = satisfy(|c| c.is_ascii_lowercase());
    expect(parser, FormatErrorKind::ExpectedLowercase)(i)
}

/// Count = digit , { digit } ;
pub fn count(i: &str) -> ParseResult<u32> {
    expect(u32, FormatErrorKind::ExpectedDigit)(i)
}

/// Element Symbol = uppercase , [ lowercase ] ;
pub fn element_symbol(i: &str) -> ParseResult<&str> {
    let parser = recognize(pair(uppercase, opt(lowercase)));
    expect(parser, FormatErrorKind::ExpectedElementSymbol)(i)
}

/// Offset Kind = "+" | "-" ;
pub fn offset_kind(i: &str) -> ParseResult<OffsetKind> {
    let parser = map(one_of("+-"), |c| match c {
        '+' => OffsetKind::Add,
        '-' => OffsetKind::Remove,
        _ => unreachable!(),
    });
    expect(parser, FormatErrorKind::ExpectedSign)(i)
}

/// Charge = [ Count ] , Offset Kind ;
pub fn charge(i: &str) -> ParseResult<Charge> {
    map(pair(opt(count), offset_kind), |(count, kind)| {
        kind.offset(Charge::new(count.unwrap_or(1).into()))
    })(i)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uppercase() {
        // Ensure the complete uppercase ASCII alphabet is present
        for c in 'A'..='Z' {
            assert_eq!(uppercase(&c.to_string()), Ok(("", c)));
        }
        // Ensure the complete lowercase ASCII alphabet is absent
        for c in 'a'..='z' {
            assert!(uppercase(&c.to_string()).is_err());
        }
        // Ensure only one character is parsed
        assert_eq!(uppercase("Hg"), Ok(("g", 'H')));
        assert_eq!(uppercase("HG"), Ok(("G", 'H')));
    }

    #[test]
    fn test_lowercase() {
        // Ensure the complete lowercase ASCII alphabet is present
        for c in 'a'..='z' {
            assert_eq!(lowercase(&c.to_string()), Ok(("", c)));
        }
        // Ensure the complete uppercase ASCII alphabet is absent
        for c in 'A'..='Z' {
            assert!(lowercase(&c.to_string()).is_err());
        }
        // Ensure only one character is parsed
        assert_eq!(lowercase("hg"), Ok(("g", 'h')));
        assert_eq!(lowercase("hG"), Ok(("G", 'h')));
    }

    #[test]
    fn test_count() {
        // Valid Counts
        assert_eq!(count("0"), Ok(("", 0)));
        assert_eq!(count("1"), Ok(("", 1)));
        assert_eq!(count("10"), Ok(("", 10)));
        assert_eq!(count("9999"), Ok(("", 9999)));
        // Invalid Counts
        assert!(count("H").is_err());
        assert!(count("+H").is_err());
        assert!(count("(H)").is_err());
        // Multiple Counts
        assert_eq!(count("1OH"), Ok(("OH", 1)));
        assert_eq!(count("42HeH"), Ok(("HeH", 42)));
    }

    #[test]
    fn test_element_symbol() {
        // Valid Element Symbols
        assert_eq!(element_symbol("C"), Ok(("", "C")));
        assert_eq!(element_symbol("Cl"), Ok(("", "Cl")));
        assert_eq!(element_symbol("Na2"), Ok(("2", "Na")));
        // Only one lowercase letter is taken
        assert_eq!(element_symbol("Uuo"), Ok(("o", "Uu")));
        // Two uppercase letters are two elements
        assert_eq!(element_symbol("CO"), Ok(("O", "C")));
        // Invalid Element Symbols
        assert!(element_symbol("cl").is_err());
        assert!(element_symbol("2H").is_err());
        assert!(element_symbol("").is_err());
    }

    #[test]
    fn test_offset_kind() {
        // Valid Offset Kinds
        assert_eq!(offset_kind("+"), Ok(("", OffsetKind::Add)));
        assert_eq!(offset_kind("-"), Ok(("", OffsetKind::Remove)));
        // Invalid Offset Kinds
        assert!(offset_kind("p").is_err());
        assert!(offset_kind("H").is_err());
        assert!(offset_kind("1+H").is_err());
        // Multiple Offset Kinds
        assert_eq!(offset_kind("+-"), Ok(("-", OffsetKind::Add)));
        assert_eq!(offset_kind("--"), Ok(("-", OffsetKind::Remove)));
    }

    #[test]
    fn test_charge() {
        assert_eq!(charge("+"), Ok(("", Charge::new(1))));
        assert_eq!(charge("-"), Ok(("", Charge::new(-1))));
        assert_eq!(charge("2+"), Ok(("", Charge::new(2))));
        assert_eq!(charge("3-"), Ok(("", Charge::new(-3))));
        assert!(charge("2").is_err());
        assert!(charge("]").is_err());
    }
}
