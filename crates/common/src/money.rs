//! Monetary amounts.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Currency used when a price arrives without one.
pub const DEFAULT_CURRENCY: &str = "INR";

/// A price: ISO currency code plus a decimal value.
///
/// Arithmetic keeps the currency of the left-hand operand; callers only ever
/// combine prices coming from the same catalog, which share one currency.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Hash, Serialize, Deserialize)]
pub struct Money {
    #[serde(default = "default_currency")]
    currency: String,
    value: Decimal,
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

impl Money {
    /// Creates an amount in the given currency.
    pub fn new(currency: impl Into<String>, value: Decimal) -> Self {
        Self {
            currency: currency.into(),
            value,
        }
    }

    /// Creates an amount of whole units in the default currency.
    pub fn from_units(units: i64) -> Self {
        Self::new(DEFAULT_CURRENCY, Decimal::from(units))
    }

    /// Returns zero in the default currency.
    pub fn zero() -> Self {
        Self::new(DEFAULT_CURRENCY, Decimal::ZERO)
    }

    /// Returns zero in this amount's currency.
    pub fn zeroed(&self) -> Self {
        Self::new(self.currency.clone(), Decimal::ZERO)
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn value(&self) -> Decimal {
        self.value
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }

    /// Returns true if the amount is negative.
    pub fn is_negative(&self) -> bool {
        self.value.is_sign_negative() && !self.value.is_zero()
    }

    /// Returns the same currency with a different value.
    pub fn with_value(&self, value: Decimal) -> Self {
        Self::new(self.currency.clone(), value)
    }

    /// Multiplies by a quantity.
    pub fn multiply(&self, quantity: u32) -> Money {
        self.with_value(self.value * Decimal::from(quantity))
    }

    /// Multiplies by a signed quantity delta.
    pub fn scale(&self, delta: i64) -> Money {
        self.with_value(self.value * Decimal::from(delta))
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.currency, self.value)
    }
}

impl std::ops::Add for Money {
    type Output = Money;

    fn add(self, rhs: Self) -> Self::Output {
        Money {
            currency: self.currency,
            value: self.value + rhs.value,
        }
    }
}

impl std::ops::Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Self) -> Self::Output {
        Money {
            currency: self.currency,
            value: self.value - rhs.value,
        }
    }
}

impl std::ops::AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.value += rhs.value;
    }
}

impl std::ops::SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        self.value -= rhs.value;
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| Money {
            currency: m.currency,
            value: acc.value + m.value,
        })
    }
}
