use std::fmt::{self, Display, Formatter};

use crate::{AtomCounts, OffsetKind};

impl AtomCounts {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    #[must_use]
    pub fn get(&self, symbol: &str) -> Option<i64> {
        self.0.iter().find(|(s, _)| s == symbol).map(|&(_, c)| c)
    }

    /// Overwrites the count of `symbol`, appending it if it wasn't already present
    pub fn set(&mut self, symbol: &str, count: i64) {
        match self.0.iter_mut().find(|(s, _)| s == symbol) {
            Some((_, c)) => *c = count,
            None => self.0.push((symbol.to_owned(), count)),
        }
    }

    /// Adds `count` to the count of `symbol`, appending it if it wasn't already present
    ///
    /// Counts saturate at the bounds of an `i64`; use `checked_add()` to catch overflows instead.
    pub fn add(&mut self, symbol: &str, count: i64) {
        match self.0.iter_mut().find(|(s, _)| s == symbol) {
            Some((_, c)) => *c = c.saturating_add(count),
            None => self.0.push((symbol.to_owned(), count)),
        }
    }

    /// Like `add()`, but returns the new count, or `None` (leaving the counts untouched) if it would overflow
    pub fn checked_add(&mut self, symbol: &str, count: i64) -> Option<i64> {
        match self.0.iter_mut().find(|(s, _)| s == symbol) {
            Some((_, c)) => {
                *c = c.checked_add(count)?;
                Some(*c)
            }
            None => {
                self.0.push((symbol.to_owned(), count));
                Some(count)
            }
        }
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&str, i64)> {
        self.0.iter().map(|(s, c)| (s.as_str(), *c))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    // NOTE: The `checked_*` methods below return `None` if any count would overflow an `i64`

    pub(crate) fn checked_scale(mut self, multiplier: u32) -> Option<Self> {
        for (_, count) in &mut self.0 {
            *count = count.checked_mul(i64::from(multiplier))?;
        }
        Some(self)
    }

    pub(crate) fn checked_merge(mut self, other: &Self) -> Option<Self> {
        for (symbol, count) in other.iter() {
            self.checked_add(symbol, count)?;
        }
        Some(self)
    }

    pub(crate) fn checked_offset(mut self, kind: OffsetKind, other: &Self) -> Option<Self> {
        for (symbol, count) in other.iter() {
            let count = match kind {
                OffsetKind::Add => count,
                OffsetKind::Remove => count.checked_neg()?,
            };
            self.checked_add(symbol, count)?;
        }
        Some(self)
    }
}

impl<S: Into<String>> FromIterator<(S, i64)> for AtomCounts {
    fn from_iter<T: IntoIterator<Item = (S, i64)>>(iter: T) -> Self {
        let mut counts = Self::new();
        for (symbol, count) in iter {
            counts.add(&symbol.into(), count);
        }
        counts
    }
}

impl<S: Into<String>, const N: usize> From<[(S, i64); N]> for AtomCounts {
    fn from(value: [(S, i64); N]) -> Self {
        value.into_iter().collect()
    }
}

// NOTE: Insertion order is kept for display, but two sets of counts are equal whenever they map the same symbols to
// the same counts
impl PartialEq for AtomCounts {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(s, c)| other.get(s) == Some(c))
    }
}

impl Eq for AtomCounts {}

impl Display for AtomCounts {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (symbol, count) in self.iter() {
            write!(f, "{symbol}")?;
            if count != 1 {
                write!(f, "{count}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_are_summed() {
        let counts: AtomCounts = [("C", 1), ("H", 3), ("C", 1), ("N", 1)].into_iter().collect();
        assert_eq!(counts.len(), 3);
        assert_eq!(counts.get("C"), Some(2));
        assert_eq!(counts.get("O"), None);
        assert_eq!(counts.to_string(), "C2H3N");
    }

    #[test]
    fn equality_ignores_order() {
        let water = AtomCounts::from([("H", 2), ("O", 1)]);
        assert_eq!(water, AtomCounts::from([("O", 1), ("H", 2)]));
        assert_ne!(water, AtomCounts::from([("H", 2)]));
        // Zero counts still count as a difference
        assert_ne!(water, AtomCounts::from([("H", 2), ("O", 1), ("C", 0)]));
    }

    #[test]
    fn scaling_and_offsets() {
        let counts = AtomCounts::from([("C", 2), ("H", 6), ("O", 1)]).checked_scale(2).unwrap();
        assert_eq!(counts, AtomCounts::from([("C", 4), ("H", 12), ("O", 2)]));

        let water = AtomCounts::from([("H", 2), ("O", 1)]);
        let counts = counts.checked_offset(OffsetKind::Remove, &water).unwrap();
        assert_eq!(counts, AtomCounts::from([("C", 4), ("H", 10), ("O", 1)]));

        let sodium = AtomCounts::from([("Na", 1)]);
        let counts = counts
            .checked_offset(OffsetKind::Add, &sodium)
            .and_then(|c| c.checked_offset(OffsetKind::Remove, &sodium))
            .and_then(|c| c.checked_offset(OffsetKind::Remove, &sodium))
            .unwrap();
        assert_eq!(counts.get("Na"), Some(-1));
        assert_eq!(counts.to_string(), "C4H10ONa-1");

        let merged = counts.checked_merge(&water).unwrap();
        assert_eq!(merged.get("H"), Some(12));
    }

    #[test]
    fn overflowing_counts() {
        let huge = AtomCounts::from([("H", i64::MAX / 2 + 1)]);
        assert_eq!(huge.clone().checked_scale(2), None);
        assert_eq!(huge.clone().checked_scale(1), Some(huge.clone()));
        assert_eq!(huge.clone().checked_merge(&huge), None);

        let lowest = AtomCounts::from([("H", i64::MIN)]);
        assert_eq!(AtomCounts::new().checked_offset(OffsetKind::Remove, &lowest), None);

        let mut counts = AtomCounts::from([("H", i64::MAX)]);
        assert_eq!(counts.checked_add("H", 1), None);
        assert_eq!(counts.get("H"), Some(i64::MAX));
        assert_eq!(counts.checked_add("H", -1), Some(i64::MAX - 1));
        assert_eq!(counts.checked_add("O", 3), Some(3));
        // Plain additions saturate instead
        counts.add("H", 5);
        assert_eq!(counts.get("H"), Some(i64::MAX));
    }

    #[test]
    fn set_overwrites() {
        let mut counts = AtomCounts::new();
        assert!(counts.is_empty());
        counts.set("H", 2);
        counts.set("H", 5);
        counts.add("H", 1);
        assert_eq!(counts.get("H"), Some(6));
        assert_eq!(counts.iter().collect::<Vec<_>>(), [("H", 6)]);
    }
}
