//! Forex Helper Domain Layer
//!
//! Pure domain logic with zero I/O dependencies.
//! Contains value objects, the trade entity, performance records and the
//! shared tolerance policy.

#![warn(missing_docs)]
#![warn(clippy::all)]

// Public modules
pub mod entities;
pub mod performance;
pub mod tolerance;
pub mod value_objects;

// Re-export commonly used types
pub use entities::{
    CalculationId, NewTrade, PositionSizeCalculation, Trade, TradeExit, TradeId, TradeOutcome,
    TradeState, TradeStatus, UserId,
};
pub use performance::{
    Drawdown, PerformanceMetrics, ProfitFactor, ProfitFactorRating, ReportId, TradeExtreme,
    TradingReport, WinRate,
};
pub use tolerance::{approx_eq, is_negligible, Tolerance};
pub use value_objects::{
    AccountBalance, AccountCurrency, CurrencyCode, CurrencyPair, Direction, DomainError, LotClass,
    LotSize, PairKind, PipValue, Price, PriceMovement, PriceUnit, ProfitLoss, RiskPercentage,
    StopDistance,
};
