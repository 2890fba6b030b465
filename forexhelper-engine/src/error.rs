//! Engine error types.

use forexhelper_domain::{DomainError, TradeId};
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised by the calculation services.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// A current price is needed for this pair and was not supplied
    #[error("Current price is required for {0} pairs")]
    MissingPrice(String),

    /// No usable conversion rate between two currencies
    #[error("No exchange rate available from {from} to {to}")]
    MissingConversion {
        /// Source currency
        from: String,
        /// Target currency
        to: String,
    },

    /// A divisor resolved to zero
    #[error("Division by zero: {0}")]
    DivisionByZero(String),

    /// Trade has no recorded exit
    #[error("Cannot analyze an open trade: {0}")]
    NotClosed(TradeId),

    /// Empty trade list
    #[error("Cannot calculate metrics from empty trade list")]
    EmptyInput,

    /// No trade in the list is closed
    #[error("Cannot calculate metrics: no closed trades")]
    NoClosedTrades,

    /// End date precedes start date
    #[error("Invalid date range: {0}")]
    InvalidRange(String),

    /// Trades valued in more than one currency
    #[error("Mixed currencies in trade set: expected {expected}, found {found}")]
    MixedCurrencies {
        /// Currency of the first closed trade
        expected: String,
        /// Offending currency
        found: String,
    },

    /// A result does not fit in the decimal range
    #[error("Arithmetic overflow: {0}")]
    Overflow(String),

    /// Business rule violations, all reported at once
    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// Domain error
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Maps a `checked_*` result to `EngineError::Overflow`.
pub(crate) trait OrOverflow {
    fn or_overflow(self, what: &str) -> EngineResult<Decimal>;
}

impl OrOverflow for Option<Decimal> {
    fn or_overflow(self, what: &str) -> EngineResult<Decimal> {
        self.ok_or_else(|| EngineError::Overflow(what.to_string()))
    }
}
