//! Charge bookkeeping for named adducts like `[M+H]+` or `[M-H2O+NH4]+`

use ahash::HashMap;
use tracing::trace;

use crate::{Adduct, Charge, Result, atoms::errors::LookupError};

/// Maps adduct names to the change in charge they cause
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct AdductTable {
    charges: HashMap<String, Charge>,
}

impl AdductTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) the charge delta of `name`, returning the old delta if there was one
    pub fn insert(&mut self, name: impl Into<String>, delta: impl Into<Charge>) -> Option<Charge> {
        self.charges.insert(name.into(), delta.into())
    }

    pub fn charge_delta(&self, name: &str) -> Result<Charge> {
        self.charges
            .get(name)
            .copied()
            .ok_or_else(|| LookupError::adduct(name).into())
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.charges.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.charges.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.charges.is_empty()
    }
}

impl<S: Into<String>, C: Into<Charge>> FromIterator<(S, C)> for AdductTable {
    fn from_iter<T: IntoIterator<Item = (S, C)>>(iter: T) -> Self {
        let charges = iter
            .into_iter()
            .map(|(name, delta)| (name.into(), delta.into()))
            .collect();
        Self { charges }
    }
}

// Public API ==========================================================================================================

/// Returns the charge of a molecule with charge `charge` after forming `adduct`
pub fn modify_charge(charge: impl Into<Charge>, adduct: &str, table: &AdductTable) -> Result<Charge> {
    let charge = charge.into();
    let delta = table.charge_delta(adduct)?;
    trace!(adduct, %charge, %delta, "modified charge");
    Ok(charge + delta)
}

/// Keeps only the `items` that name a complete, charged adduct, like `[M+H]+` or `[2M-H]-`
///
/// Useful for picking out the adduct columns from the header of a table.
pub fn adduct_names<'s>(items: impl IntoIterator<Item = &'s str>) -> Vec<&'s str> {
    items
        .into_iter()
        .filter(|item| Adduct::new(item).is_ok_and(|adduct| adduct.charge().is_some()))
        .collect()
}
