use miette::Diagnostic;
use thiserror::Error;

// NOTE: Public so that callers can inspect which kind of lookup failed, though this should eventually be marked as
// #[non_exhaustive] before the API is stabilised
#[derive(Debug, Diagnostic, Clone, Eq, PartialEq, Error)]
pub enum LookupError {
    #[diagnostic(help("double-check for typos, or add a new entry to the isotope table"))]
    #[error("the element {0:?} could not be found in the supplied isotope registry")]
    Element(String),

    #[diagnostic(help(
        "isotopes are only found when their symbol, mass, and abundance all match the isotope table exactly"
    ))]
    #[error("the isotope {0:?} could not be found in the supplied isotope registry")]
    Isotope(String),

    #[diagnostic(help("add the adduct, along with its charge, to the adduct table"))]
    #[error("the adduct {0:?} could not be found in the supplied adduct table")]
    Adduct(String),
}

impl LookupError {
    pub(crate) fn element(symbol: &str) -> Self {
        Self::Element(symbol.to_owned())
    }

    pub(crate) fn isotope(symbol: &str) -> Self {
        Self::Isotope(symbol.to_owned())
    }

    pub(crate) fn adduct(name: &str) -> Self {
        Self::Adduct(name.to_owned())
    }
}
