use std::{
    cmp::Ordering,
    fmt::{self, Display, Formatter},
};

use ordered_float::OrderedFloat;

use crate::Isotope;

impl Isotope {
    pub fn new(symbol: impl Into<String>, mass: f64, abundance: f64) -> Self {
        Self {
            symbol: symbol.into(),
            mass: OrderedFloat(mass),
            abundance: OrderedFloat(abundance),
        }
    }

    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    #[must_use]
    pub const fn mass(&self) -> f64 {
        self.mass.0
    }

    #[must_use]
    pub const fn abundance(&self) -> f64 {
        self.abundance.0
    }
}

// NOTE: Isotopes sort by abundance first, so the last isotope of any sorted collection is the monoisotope
impl Ord for Isotope {
    fn cmp(&self, other: &Self) -> Ordering {
        self.abundance
            .cmp(&other.abundance)
            .then_with(|| self.symbol.cmp(&other.symbol))
            .then_with(|| self.mass.cmp(&other.mass))
    }
}

impl PartialOrd for Isotope {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq<str> for Isotope {
    fn eq(&self, other: &str) -> bool {
        self.symbol == other
    }
}

impl PartialEq<&str> for Isotope {
    fn eq(&self, other: &&str) -> bool {
        self.symbol == *other
    }
}

impl Display for Isotope {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol)
    }
}
