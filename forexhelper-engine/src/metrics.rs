//! Metrics Aggregator
//!
//! Reduces a set of trades to a [`PerformanceMetrics`] summary. Only closed
//! (valued) trades take part.
//!
//! Ordering:
//! - drawdown walks the equity curve chronologically by exit time
//! - streaks follow input order

use rust_decimal::Decimal;
use tracing::debug;

use forexhelper_domain::{
    CurrencyCode, Drawdown, PerformanceMetrics, ProfitFactor, Trade, TradeExtreme, WinRate,
};

use crate::error::{EngineError, EngineResult, OrOverflow};

/// Stateless metrics calculator
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsCalculator;

impl MetricsCalculator {
    /// Create a calculator
    pub fn new() -> Self {
        Self
    }

    /// Compute metrics over the closed subset of `trades`.
    ///
    /// # Errors
    /// - `EngineError::EmptyInput` for an empty list
    /// - `EngineError::NoClosedTrades` if none is closed
    /// - `EngineError::MixedCurrencies` if closed trades are valued in
    ///   different currencies
    /// - `EngineError::Overflow` if a sum does not fit in a decimal
    pub fn calculate(&self, trades: &[Trade]) -> EngineResult<PerformanceMetrics> {
        if trades.is_empty() {
            return Err(EngineError::EmptyInput);
        }

        let closed: Vec<&Trade> = trades.iter().filter(|t| t.is_closed()).collect();
        if closed.is_empty() {
            return Err(EngineError::NoClosedTrades);
        }

        let currency = single_currency(&closed)?;

        let total_trades = closed.len();
        let winning_trades = closed.iter().filter(|t| t.is_win()).count();
        let losing_trades = closed.iter().filter(|t| t.is_loss()).count();
        let break_even_trades = total_trades - winning_trades - losing_trades;

        let win_rate = WinRate::from_counts(winning_trades, total_trades)?;
        let total_profit_loss = sum(closed.iter().map(|t| amount(t)))?;

        let average_win = average_abs(closed.iter().filter(|t| t.is_win()).map(|t| amount(t)))?;
        let average_loss = average_abs(closed.iter().filter(|t| t.is_loss()).map(|t| amount(t)))?;

        let profit_factor = profit_factor(&closed)?;
        let expectancy = win_rate.as_fraction() * average_win
            - (Decimal::ONE - win_rate.as_fraction()) * average_loss;

        let max_drawdown = max_drawdown(&closed, &currency)?;
        let average_risk_reward_ratio = average(closed.iter().filter_map(|t| t.risk_reward_ratio()))?;

        let best_trade = closed
            .iter()
            .filter(|t| amount(t) > Decimal::ZERO)
            .fold(None::<&&Trade>, |best, t| match best {
                Some(b) if amount(b) >= amount(t) => Some(b),
                _ => Some(t),
            })
            .map(|t| extreme(t));
        let worst_trade = closed
            .iter()
            .filter(|t| amount(t) < Decimal::ZERO)
            .fold(None::<&&Trade>, |worst, t| match worst {
                Some(w) if amount(w) <= amount(t) => Some(w),
                _ => Some(t),
            })
            .map(|t| extreme(t));

        let longest_winning_streak = longest_streak(&closed, |t| t.is_win());
        let longest_losing_streak = longest_streak(&closed, |t| t.is_loss());

        debug!(
            total_trades,
            winning_trades,
            losing_trades,
            total_profit_loss = %total_profit_loss,
            "Performance metrics calculated"
        );

        Ok(PerformanceMetrics {
            total_trades,
            winning_trades,
            losing_trades,
            break_even_trades,
            win_rate,
            currency,
            total_profit_loss,
            average_win,
            average_loss,
            profit_factor,
            expectancy,
            max_drawdown,
            average_risk_reward_ratio,
            best_trade,
            worst_trade,
            longest_winning_streak,
            longest_losing_streak,
        })
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn amount(trade: &Trade) -> Decimal {
    trade.profit_loss().map(|p| p.amount()).unwrap_or_default()
}

fn extreme(trade: &Trade) -> TradeExtreme {
    TradeExtreme {
        trade_id: trade.id,
        pair: trade.pair.clone(),
        profit_loss: amount(trade),
    }
}

fn single_currency(closed: &[&Trade]) -> EngineResult<CurrencyCode> {
    let mut currencies = closed.iter().filter_map(|t| t.profit_loss()).map(|p| p.currency());
    let expected = currencies.next().cloned().unwrap_or_else(CurrencyCode::usd);

    match currencies.find(|c| **c != expected) {
        Some(found) => Err(EngineError::MixedCurrencies {
            expected: expected.to_string(),
            found: found.to_string(),
        }),
        None => Ok(expected),
    }
}

fn sum<I: Iterator<Item = Decimal>>(mut values: I) -> EngineResult<Decimal> {
    values.try_fold(Decimal::ZERO, |acc, v| acc.checked_add(v).or_overflow("profit/loss sum"))
}

fn average<I: Iterator<Item = Decimal>>(values: I) -> EngineResult<Option<Decimal>> {
    let mut count = 0u32;
    let total = sum(values.inspect(|_| count += 1))?;
    if count == 0 {
        Ok(None)
    } else {
        Ok(Some(total / Decimal::from(count)))
    }
}

fn average_abs<I: Iterator<Item = Decimal>>(values: I) -> EngineResult<Decimal> {
    Ok(average(values.map(|v| v.abs()))?.unwrap_or_default())
}

fn profit_factor(closed: &[&Trade]) -> EngineResult<ProfitFactor> {
    let gross_profit = sum(closed.iter().map(|t| amount(t)).filter(|a| *a > Decimal::ZERO))?;
    let gross_loss = sum(closed.iter().map(|t| amount(t)).filter(|a| *a <= Decimal::ZERO).map(|a| a.abs()))?;
    Ok(ProfitFactor::from_gross(gross_profit, gross_loss))
}

/// Peak-to-trough on the cumulative P/L curve.
///
/// Evaluated only while the running peak is above zero.
fn max_drawdown(closed: &[&Trade], currency: &CurrencyCode) -> EngineResult<Drawdown> {
    let mut ordered: Vec<&Trade> = closed.to_vec();
    ordered.sort_by_key(|t| t.exit_time());

    let mut running = Decimal::ZERO;
    let mut peak = Decimal::ZERO;
    let mut max_percentage = Decimal::ZERO;
    let mut max_amount = Decimal::ZERO;

    for trade in ordered {
        running = running.checked_add(amount(trade)).or_overflow("equity curve")?;
        if running > peak {
            peak = running;
        }
        if peak <= Decimal::ZERO {
            continue;
        }

        let decline = peak.checked_sub(running).or_overflow("drawdown")?;
        let percentage = decline
            .checked_div(peak)
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
            .or_overflow("drawdown percentage")?;
        if percentage > max_percentage {
            max_percentage = percentage;
            max_amount = decline;
        }
    }

    Ok(Drawdown::new(max_percentage, max_amount, currency.clone())?)
}

fn longest_streak(closed: &[&Trade], predicate: impl Fn(&Trade) -> bool) -> usize {
    closed
        .iter()
        .fold((0usize, 0usize), |(longest, current), t| {
            if predicate(*t) {
                let current = current + 1;
                (longest.max(current), current)
            } else {
                (longest, 0)
            }
        })
        .0
}

// =============================================================================
// Tests
// =============================================================================
