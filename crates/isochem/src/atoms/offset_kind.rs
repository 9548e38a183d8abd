use std::{
    fmt::{self, Display, Formatter},
    ops::Neg,
};

use crate::{Charge, OffsetKind};

impl OffsetKind {
    /// Returns `value` unchanged for an addition, or negated for a removal
    pub(crate) fn offset<T: Neg<Output = T>>(self, value: T) -> T {
        match self {
            Self::Add => value,
            Self::Remove => -value,
        }
    }
}

impl Display for OffsetKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Add => "+",
                Self::Remove => "-",
            }
        )
    }
}

impl From<OffsetKind> for Charge {
    fn from(value: OffsetKind) -> Self {
        value.offset(Self(1))
    }
}
