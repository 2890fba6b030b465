//! Approximate comparison policy.
//!
//! Every tolerance used by the domain lives here, one per semantic category,
//! so that prices, money and ratios are compared consistently everywhere.

use rust_decimal::Decimal;

/// Semantic category of an approximate comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tolerance {
    /// Instrument prices (0.0001)
    Price,
    /// Monetary amounts in account currency (0.01)
    Money,
    /// Dimensionless values: lot sizes, ratios, percentages (0.0001)
    Ratio,
}

impl Tolerance {
    /// Absolute epsilon for this category
    pub fn epsilon(self) -> Decimal {
        match self {
            Tolerance::Price => Decimal::new(1, 4),
            Tolerance::Money => Decimal::new(1, 2),
            Tolerance::Ratio => Decimal::new(1, 4),
        }
    }
}

/// `|a - b| < epsilon`
pub fn approx_eq(a: Decimal, b: Decimal, tolerance: Tolerance) -> bool {
    (a - b).abs() < tolerance.epsilon()
}

/// `|value| < epsilon`
pub fn is_negligible(value: Decimal, tolerance: Tolerance) -> bool {
    value.abs() < tolerance.epsilon()
}
