use std::{
    fmt::{self, Display, Formatter},
    hash::{Hash, Hasher},
};

use once_cell::sync::OnceCell;

use crate::{Element, Isotope};

impl Element {
    /// Builds an element from its isotopes, returning `None` if no isotopes were given
    ///
    /// Duplicate isotopes are collapsed, and whichever isotope has the highest abundance becomes the element's
    /// monoisotope.
    pub fn new(symbol: impl Into<String>, isotopes: impl IntoIterator<Item = Isotope>) -> Option<Self> {
        let mut isotopes: Vec<_> = isotopes.into_iter().collect();
        if isotopes.is_empty() {
            return None;
        }
        isotopes.sort();
        isotopes.dedup();

        Some(Self {
            symbol: symbol.into(),
            isotopes,
            isotope_index: OnceCell::new(),
        })
    }

    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    #[must_use]
    pub fn monoisotope(&self) -> &Isotope {
        // SAFETY: `Element::new()` refuses to build elements without any isotopes
        &self.isotopes[self.isotopes.len() - 1]
    }

    /// Every isotope except the monoisotope, in order of increasing abundance
    #[must_use]
    pub fn other_isotopes(&self) -> &[Isotope] {
        &self.isotopes[..self.isotopes.len() - 1]
    }

    pub fn isotopes(&self) -> impl ExactSizeIterator<Item = &Isotope> {
        self.isotopes.iter()
    }

    #[must_use]
    pub fn n_isotopes(&self) -> usize {
        self.isotopes.len()
    }

    #[must_use]
    pub fn contains(&self, isotope: &Isotope) -> bool {
        self.isotopes.contains(isotope)
    }

    /// Finds one of this element's isotopes by its symbol, where the element's own symbol stands for its monoisotope
    #[must_use]
    pub fn isotope(&self, symbol: &str) -> Option<&Isotope> {
        if symbol == self.symbol {
            return Some(self.monoisotope());
        }

        let index = self.isotope_index.get_or_init(|| {
            self.isotopes
                .iter()
                .enumerate()
                .map(|(i, isotope)| (isotope.symbol.clone(), i))
                .collect()
        });
        index.get(symbol).map(|&i| &self.isotopes[i])
    }
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        self.symbol == other.symbol && self.isotopes == other.isotopes
    }
}

impl Eq for Element {}

impl PartialEq<str> for Element {
    fn eq(&self, other: &str) -> bool {
        self.symbol == other
    }
}

impl PartialEq<&str> for Element {
    fn eq(&self, other: &&str) -> bool {
        self.symbol == *other
    }
}

impl Hash for Element {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.symbol.hash(state);
    }
}

impl Display for Element {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol)
    }
}
