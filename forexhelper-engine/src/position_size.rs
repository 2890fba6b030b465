//! Position Size Engine
//!
//! ```text
//! Risk Amount = Balance × Risk% / 100
//! Lot Size    = Risk Amount / (Stop Distance × Pip Value per Lot)
//! Units       = Lot Size × 100,000
//! ```
//!
//! A wider stop gives a smaller position; the amount at risk stays constant.

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use forexhelper_domain::{
    AccountBalance, AccountCurrency, CurrencyPair, LotSize, PositionSizeCalculation, Price,
    RiskPercentage, StopDistance,
};

use crate::error::{EngineError, EngineResult, OrOverflow};
use crate::pip_value::PipValueResolver;

/// Inputs of a position sizing run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionSizeRequest {
    pub account_balance: AccountBalance,
    pub risk_percentage: RiskPercentage,
    pub stop_distance: StopDistance,
    pub pair: CurrencyPair,
    pub account_currency: AccountCurrency,
    /// Required for USD/XXX pairs
    pub current_price: Option<Price>,
}

/// Computes lot sizes from a risk budget.
#[derive(Clone)]
pub struct PositionSizer {
    pip_values: PipValueResolver,
}

impl PositionSizer {
    /// Create a sizer sharing a pip value resolver.
    pub fn new(pip_values: PipValueResolver) -> Self {
        Self { pip_values }
    }

    /// Size a position.
    ///
    /// Zero risk gives a zero lot size and zero risk amount.
    ///
    /// # Errors
    /// Propagates pip value resolution errors; `EngineError::DivisionByZero`
    /// if stop distance × pip value is zero; `EngineError::Overflow` if the
    /// lot size or unit count does not fit in a decimal.
    pub async fn size(&self, request: PositionSizeRequest) -> EngineResult<PositionSizeCalculation> {
        let risk_amount = request
            .risk_percentage
            .risk_amount(request.account_balance.amount());

        let pip_value = self
            .pip_values
            .resolve(&request.pair, &request.account_currency, request.current_price)
            .await?;

        let denominator = request
            .stop_distance
            .value()
            .checked_mul(pip_value.value())
            .or_overflow("stop distance × pip value")?;
        if denominator.is_zero() {
            return Err(EngineError::DivisionByZero(
                "Stop loss and pip value must be greater than 0".to_string(),
            ));
        }

        let lot_size = LotSize::new(risk_amount.checked_div(denominator).or_overflow("lot size")?)?;
        let position_size_units = lot_size.position_units()?;

        debug!(
            pair = %request.pair,
            risk_amount = %risk_amount,
            pip_value = %pip_value.value(),
            stop = %request.stop_distance,
            "Position size inputs resolved"
        );
        info!(
            pair = %request.pair,
            lot_size = %lot_size.as_decimal(),
            units = %position_size_units,
            "Position size calculated"
        );

        Ok(PositionSizeCalculation {
            id: Uuid::now_v7(),
            account_balance: request.account_balance,
            risk_percentage: request.risk_percentage,
            stop_distance: request.stop_distance,
            pair: request.pair,
            account_currency: request.account_currency,
            current_price: request.current_price,
            risk_amount,
            pip_value,
            lot_size,
            position_size_units,
            calculated_at: Utc::now(),
        })
    }
}

/// `lot × stop × pip value`: the amount a sized position risks
pub fn implied_risk(calculation: &PositionSizeCalculation) -> EngineResult<Decimal> {
    calculation
        .lot_size
        .as_decimal()
        .checked_mul(calculation.stop_distance.value())
        .and_then(|v| v.checked_mul(calculation.pip_value.value()))
        .or_overflow("implied risk")
}

// =============================================================================
// Tests
// =============================================================================
