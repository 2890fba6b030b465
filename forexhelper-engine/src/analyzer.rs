//! Trade Outcome Analyzer
//!
//! Turns the realized movement of an exited trade into a profit/loss in the
//! account currency and attaches it, which fixes the trade's final status.

use rust_decimal::Decimal;
use tracing::info;

use forexhelper_domain::{AccountCurrency, CurrencyCode, PriceUnit, ProfitLoss, Trade};

use crate::conversion::CurrencyConverter;
use crate::error::{EngineError, EngineResult, OrOverflow};
use crate::pip_value::PipValueResolver;

/// Pips per pip-value unit in the P/L formula
const PIP_DIVISOR: Decimal = Decimal::TEN;

/// Values exited trades for one account currency.
#[derive(Clone)]
pub struct TradeAnalyzer {
    pip_values: PipValueResolver,
    converter: CurrencyConverter,
    account: AccountCurrency,
}

impl TradeAnalyzer {
    /// Create an analyzer for an account currency.
    pub fn new(pip_values: PipValueResolver, converter: CurrencyConverter, account: AccountCurrency) -> Self {
        Self {
            pip_values,
            converter,
            account,
        }
    }

    /// Account currency the analyzer reports in
    pub fn account_currency(&self) -> &AccountCurrency {
        &self.account
    }

    /// Compute the profit/loss of an exited trade without mutating it.
    ///
    /// The entry price stands in for the current price.
    ///
    /// ```text
    /// pips:   P/L = (pips / 10) × pip value × lots
    /// points: P/L = points × lots (USD), converted to the account currency
    /// ```
    ///
    /// # Errors
    /// `EngineError::NotClosed` if the trade has no exit;
    /// `EngineError::Overflow` if the amount does not fit in a decimal.
    pub async fn profit_loss(&self, trade: &Trade) -> EngineResult<ProfitLoss> {
        let exit = trade.exit().ok_or(EngineError::NotClosed(trade.id))?;

        let pip_value = self
            .pip_values
            .resolve(&trade.pair, &self.account, Some(trade.entry_price))
            .await?;
        let per_unit = pip_value.for_lot_size(trade.lot_size.as_decimal())?;
        let movement = exit.movement.value();

        let profit_loss = match exit.movement.unit() {
            PriceUnit::Pips => {
                let amount = (movement / PIP_DIVISOR).checked_mul(per_unit).or_overflow("profit/loss")?;
                ProfitLoss::new(amount, pip_value.currency().clone())
            },
            PriceUnit::Points => {
                let usd = movement.checked_mul(per_unit).or_overflow("profit/loss")?;
                let account = self.account.code();
                let amount = self.converter.convert(usd, &CurrencyCode::usd(), account).await?;
                ProfitLoss::new(amount, account.clone())
            },
        };

        Ok(profit_loss)
    }

    /// Value an exited trade and attach the result.
    ///
    /// # Errors
    /// `EngineError::NotClosed` if the trade has no exit; a domain
    /// `InvalidStateTransition` if it already has a profit/loss. The trade is
    /// left untouched on error.
    pub async fn analyze(&self, trade: &mut Trade) -> EngineResult<()> {
        let profit_loss = self.profit_loss(trade).await?;
        trade.attach_profit_loss(profit_loss)?;

        info!(
            trade_id = %trade.id,
            pair = %trade.pair,
            status = %trade.status(),
            profit_loss = %trade.profit_loss().map(|p| p.amount()).unwrap_or_default(),
            "Trade analyzed"
        );
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
