use std::{
    fmt::{self, Display, Formatter},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::{Charge, IsochemError};

/// Abundances below this are not substituted any further
pub const DEFAULT_ABUNDANCE_LIMIT: f64 = 1e-4;
/// The number of isotopologues the search may generate before it stops expanding
pub const DEFAULT_MAX_ITERATIONS: usize = 10_000;

#[derive(Copy, Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PatternOptions {
    /// Peak masses are divided by the magnitude of a non-zero charge, after adjusting for lost or gained electrons
    pub charge: Charge,
    pub abundance_limit: f64,
    pub max_iterations: usize,
    pub scale: Scale,
}

impl PatternOptions {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            charge: Charge::new(0),
            abundance_limit: DEFAULT_ABUNDANCE_LIMIT,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            scale: Scale::Absolute,
        }
    }

    #[must_use]
    pub const fn with_charge(self, charge: i64) -> Self {
        Self {
            charge: Charge::new(charge),
            ..self
        }
    }

    #[must_use]
    pub const fn with_abundance_limit(self, abundance_limit: f64) -> Self {
        Self {
            abundance_limit,
            ..self
        }
    }

    #[must_use]
    pub const fn with_max_iterations(self, max_iterations: usize) -> Self {
        Self {
            max_iterations,
            ..self
        }
    }

    #[must_use]
    pub const fn with_scale(self, scale: Scale) -> Self {
        Self { scale, ..self }
    }
}

impl Default for PatternOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// How the abundances of an isotope pattern are reported
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scale {
    /// Probabilities, with peaks sorted by increasing mass
    #[default]
    Absolute,
    /// Rescaled so the most abundant peak is 100 and the least is 0, with peaks sorted by decreasing abundance
    Relative,
}

impl FromStr for Scale {
    type Err = Box<IsochemError>;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "abs" | "absolute" => Ok(Self::Absolute),
            "rel" | "relative" => Ok(Self::Relative),
            _ => Err(IsochemError::unknown_scale(s).into()),
        }
    }
}

impl Display for Scale {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Absolute => "absolute",
                Self::Relative => "relative",
            }
        )
    }
}
