use crate::Charge;

impl Charge {
    #[must_use]
    pub const fn new(charge: i64) -> Self {
        Self(charge)
    }

    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }

    #[must_use]
    pub const fn abs(self) -> Self {
        Self(self.0.abs())
    }

    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }
}
