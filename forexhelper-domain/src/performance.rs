//! Performance analytics records
//!
//! Win rate, profit factor and drawdown value objects, the metrics summary,
//! and the trading report that snapshots them.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::entities::{Trade, TradeId, UserId};
use crate::tolerance::{approx_eq, Tolerance};
use crate::value_objects::{CurrencyCode, CurrencyPair, DomainError};

// =============================================================================
// WinRate
// =============================================================================

/// Share of winning trades, in percent
///
/// # Invariants
/// - 0 <= value <= 100
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WinRate(Decimal);

impl WinRate {
    /// Create a WinRate with validation
    ///
    /// # Errors
    /// Returns `DomainError::InvalidMetric` outside [0, 100]
    pub fn new(value: Decimal) -> Result<Self, DomainError> {
        if value < Decimal::ZERO || value > Decimal::ONE_HUNDRED {
            return Err(DomainError::InvalidMetric(
                "Win rate must be between 0 and 100".to_string(),
            ));
        }
        Ok(Self(value))
    }

    /// Win rate from counts (0 when there are no trades)
    pub fn from_counts(winning: usize, total: usize) -> Result<Self, DomainError> {
        if total == 0 {
            return Ok(Self(Decimal::ZERO));
        }
        if winning > total {
            return Err(DomainError::InvalidMetric(format!(
                "Winning trades ({}) exceed total trades ({})",
                winning, total
            )));
        }
        Self::new(Decimal::from(winning) / Decimal::from(total) * Decimal::ONE_HUNDRED)
    }

    /// Percentage (0-100)
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// Fraction (0-1)
    pub fn as_fraction(&self) -> Decimal {
        self.0 / Decimal::ONE_HUNDRED
    }
}

impl fmt::Display for WinRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}%", self.0)
    }
}

// =============================================================================
// ProfitFactor
// =============================================================================

/// Qualitative rating of a profit factor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfitFactorRating {
    /// >= 2
    Excellent,
    /// >= 1.5
    Good,
    /// >= 1
    Fair,
    /// < 1
    Poor,
}

/// Gross profit divided by gross loss
///
/// Serialized as a decimal string, or `"Infinity"` when there were profits
/// and no losses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ProfitFactor {
    /// Finite, non-negative ratio
    Finite(Decimal),
    /// Profits with zero losses
    Infinite,
}

impl ProfitFactor {
    const INFINITY: &'static str = "Infinity";

    /// Compute from gross (absolute) profit and loss sums
    ///
    /// Zero losses yield `Infinite` when there is any profit, otherwise 0.
    /// A ratio beyond the decimal range is also `Infinite`.
    pub fn from_gross(gross_profit: Decimal, gross_loss: Decimal) -> Self {
        if gross_loss.is_zero() {
            if gross_profit > Decimal::ZERO {
                ProfitFactor::Infinite
            } else {
                ProfitFactor::Finite(Decimal::ZERO)
            }
        } else {
            gross_profit
                .abs()
                .checked_div(gross_loss.abs())
                .map_or(ProfitFactor::Infinite, ProfitFactor::Finite)
        }
    }

    /// Finite value, if any
    pub fn value(&self) -> Option<Decimal> {
        match self {
            ProfitFactor::Finite(v) => Some(*v),
            ProfitFactor::Infinite => None,
        }
    }

    /// Strictly above 1
    pub fn is_profitable(&self) -> bool {
        match self {
            ProfitFactor::Finite(v) => *v > Decimal::ONE,
            ProfitFactor::Infinite => true,
        }
    }

    /// Rating bucket
    pub fn rating(&self) -> ProfitFactorRating {
        let value = match self {
            ProfitFactor::Infinite => return ProfitFactorRating::Excellent,
            ProfitFactor::Finite(v) => *v,
        };
        if value >= Decimal::TWO {
            ProfitFactorRating::Excellent
        } else if value >= Decimal::new(15, 1) {
            ProfitFactorRating::Good
        } else if value >= Decimal::ONE {
            ProfitFactorRating::Fair
        } else {
            ProfitFactorRating::Poor
        }
    }

    /// Equality within ratio tolerance; infinities are equal
    pub fn approx_eq(&self, other: &ProfitFactor) -> bool {
        match (self, other) {
            (ProfitFactor::Infinite, ProfitFactor::Infinite) => true,
            (ProfitFactor::Finite(a), ProfitFactor::Finite(b)) => approx_eq(*a, *b, Tolerance::Ratio),
            _ => false,
        }
    }
}

impl TryFrom<String> for ProfitFactor {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.eq_ignore_ascii_case(Self::INFINITY) {
            return Ok(ProfitFactor::Infinite);
        }
        let parsed: Decimal = value
            .parse()
            .map_err(|_| DomainError::InvalidMetric(format!("Invalid profit factor: {}", value)))?;
        if parsed < Decimal::ZERO {
            return Err(DomainError::InvalidMetric("Profit factor cannot be negative".to_string()));
        }
        Ok(ProfitFactor::Finite(parsed))
    }
}

impl From<ProfitFactor> for String {
    fn from(value: ProfitFactor) -> Self {
        match value {
            ProfitFactor::Finite(v) => v.to_string(),
            ProfitFactor::Infinite => ProfitFactor::INFINITY.to_string(),
        }
    }
}

impl fmt::Display for ProfitFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfitFactor::Finite(v) => write!(f, "{:.2}", v),
            ProfitFactor::Infinite => write!(f, "∞"),
        }
    }
}

// =============================================================================
// Drawdown
// =============================================================================

/// Largest peak-to-trough decline of the equity curve
///
/// # Invariants
/// - percentage >= 0 (may exceed 100 when equity falls below zero)
/// - amount >= 0
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Drawdown {
    percentage: Decimal,
    amount: Decimal,
    currency: CurrencyCode,
}

impl Drawdown {
    /// Create a Drawdown with validation
    ///
    /// # Errors
    /// Returns `DomainError::InvalidMetric` for negative values
    pub fn new(percentage: Decimal, amount: Decimal, currency: CurrencyCode) -> Result<Self, DomainError> {
        if percentage < Decimal::ZERO {
            return Err(DomainError::InvalidMetric(
                "Drawdown percentage cannot be negative".to_string(),
            ));
        }
        if amount < Decimal::ZERO {
            return Err(DomainError::InvalidMetric("Drawdown amount cannot be negative".to_string()));
        }
        Ok(Self {
            percentage,
            amount,
            currency,
        })
    }

    /// No drawdown
    pub fn none(currency: CurrencyCode) -> Self {
        Self {
            percentage: Decimal::ZERO,
            amount: Decimal::ZERO,
            currency,
        }
    }

    /// Percentage of the peak
    pub fn percentage(&self) -> Decimal {
        self.percentage
    }

    /// Absolute amount
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    /// Currency of the amount
    pub fn currency(&self) -> &CurrencyCode {
        &self.currency
    }

    /// Above 20%
    pub fn is_significant(&self) -> bool {
        self.percentage > Decimal::from(20)
    }
}

impl fmt::Display for Drawdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}% ({} {:.2})", self.percentage, self.currency, self.amount)
    }
}

// =============================================================================
// PerformanceMetrics
// =============================================================================

/// Reference to a best or worst trade
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeExtreme {
    pub trade_id: TradeId,
    pub pair: CurrencyPair,
    pub profit_loss: Decimal,
}

/// Summary of a set of closed trades
///
/// Derived on demand; only persisted as part of a [`TradingReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub break_even_trades: usize,
    pub win_rate: WinRate,
    pub currency: CurrencyCode,
    pub total_profit_loss: Decimal,
    pub average_win: Decimal,
    pub average_loss: Decimal,
    pub profit_factor: ProfitFactor,
    pub expectancy: Decimal,
    pub max_drawdown: Drawdown,
    pub average_risk_reward_ratio: Option<Decimal>,
    pub best_trade: Option<TradeExtreme>,
    pub worst_trade: Option<TradeExtreme>,
    pub longest_winning_streak: usize,
    pub longest_losing_streak: usize,
}

// =============================================================================
// TradingReport
// =============================================================================

/// Identifier of a trading report
pub type ReportId = String;

/// Immutable snapshot of metrics over a date range
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradingReport {
    pub id: ReportId,
    pub user_id: UserId,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub metrics: PerformanceMetrics,
    pub trades: Vec<Trade>,
    pub created_at: DateTime<Utc>,
}

impl TradingReport {
    /// Create a report
    ///
    /// # Errors
    /// Returns `DomainError::InvalidDateRange` if `end_date < start_date`
    pub fn new(
        id: ReportId,
        user_id: UserId,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
        metrics: PerformanceMetrics,
        trades: Vec<Trade>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if end_date < start_date {
            return Err(DomainError::InvalidDateRange(format!(
                "End date {} is before start date {}",
                end_date.format("%Y-%m-%d"),
                start_date.format("%Y-%m-%d")
            )));
        }
        Ok(Self {
            id,
            user_id,
            start_date,
            end_date,
            metrics,
            trades,
            created_at,
        })
    }

    /// Owned by `user_id`
    pub fn belongs_to(&self, user_id: UserId) -> bool {
        self.user_id == user_id
    }

    /// Number of trades in the snapshot
    pub fn trade_count(&self) -> usize {
        self.trades.len()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    #[test]
    fn test_win_rate_from_counts() {
        assert_eq!(WinRate::from_counts(3, 4).unwrap().as_decimal(), dec!(75));
        assert_eq!(WinRate::from_counts(0, 0).unwrap().as_decimal(), dec!(0));
        assert!(WinRate::from_counts(5, 4).is_err());
        assert!(WinRate::new(dec!(100.5)).is_err());
        assert_eq!(WinRate::new(dec!(60)).unwrap().as_fraction(), dec!(0.6));
    }

    #[test]
    fn test_profit_factor_from_gross() {
        assert_eq!(ProfitFactor::from_gross(dec!(300), dec!(150)), ProfitFactor::Finite(dec!(2)));
        assert_eq!(ProfitFactor::from_gross(dec!(450), dec!(0)), ProfitFactor::Infinite);
        assert_eq!(ProfitFactor::from_gross(dec!(0), dec!(0)), ProfitFactor::Finite(dec!(0)));
        assert_eq!(
            ProfitFactor::from_gross(dec!(1000000), Decimal::new(1, 27)),
            ProfitFactor::Infinite
        );
    }

    #[test]
    fn test_profit_factor_rating() {
        assert_eq!(ProfitFactor::Infinite.rating(), ProfitFactorRating::Excellent);
        assert_eq!(ProfitFactor::Finite(dec!(2)).rating(), ProfitFactorRating::Excellent);
        assert_eq!(ProfitFactor::Finite(dec!(1.5)).rating(), ProfitFactorRating::Good);
        assert_eq!(ProfitFactor::Finite(dec!(1)).rating(), ProfitFactorRating::Fair);
        assert_eq!(ProfitFactor::Finite(dec!(0.8)).rating(), ProfitFactorRating::Poor);
        assert!(!ProfitFactor::Finite(dec!(1)).is_profitable());
        assert!(ProfitFactor::Infinite.is_profitable());
    }

    #[test]
    fn test_profit_factor_serde() {
        assert_eq!(serde_json::to_string(&ProfitFactor::Infinite).unwrap(), "\"Infinity\"");
        assert_eq!(serde_json::to_string(&ProfitFactor::Finite(dec!(1.5))).unwrap(), "\"1.5\"");

        let parsed: ProfitFactor = serde_json::from_str("\"Infinity\"").unwrap();
        assert_eq!(parsed, ProfitFactor::Infinite);
        assert!(serde_json::from_str::<ProfitFactor>("\"-1\"").is_err());
    }

    #[test]
    fn test_drawdown_validation() {
        let dd = Drawdown::new(dec!(25), dec!(150), CurrencyCode::usd()).unwrap();
        assert!(dd.is_significant());
        assert!(!Drawdown::new(dec!(20), dec!(1), CurrencyCode::usd()).unwrap().is_significant());
        // Equity may fall below zero after a positive peak
        assert!(Drawdown::new(dec!(150), dec!(300), CurrencyCode::usd()).is_ok());
        assert!(Drawdown::new(dec!(-1), dec!(0), CurrencyCode::usd()).is_err());
        assert!(Drawdown::new(dec!(0), dec!(-1), CurrencyCode::usd()).is_err());
    }

    #[test]
    fn test_report_rejects_inverted_range() {
        let metrics = PerformanceMetrics {
            total_trades: 0,
            winning_trades: 0,
            losing_trades: 0,
            break_even_trades: 0,
            win_rate: WinRate::from_counts(0, 0).unwrap(),
            currency: CurrencyCode::usd(),
            total_profit_loss: dec!(0),
            average_win: dec!(0),
            average_loss: dec!(0),
            profit_factor: ProfitFactor::Finite(dec!(0)),
            expectancy: dec!(0),
            max_drawdown: Drawdown::none(CurrencyCode::usd()),
            average_risk_reward_ratio: None,
            best_trade: None,
            worst_trade: None,
            longest_winning_streak: 0,
            longest_losing_streak: 0,
        };
        let start = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

        let err = TradingReport::new(
            "r".to_string(),
            Uuid::now_v7(),
            start,
            end,
            metrics.clone(),
            vec![],
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::InvalidDateRange(_)));

        let same_day =
            TradingReport::new("r".to_string(), Uuid::now_v7(), start, start, metrics, vec![], Utc::now());
        assert!(same_day.is_ok());
    }
}
