//! Trade business-rule validation.
//!
//! Violations are collected rather than raised one at a time, so a caller can
//! show all of them at once.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use forexhelper_domain::{Direction, LotSize, Price, Trade};

use crate::error::{EngineError, EngineResult};

/// Recommended maximum risk per trade, in percent of balance
pub const MAX_RISK_PERCENT: Decimal = Decimal::from_parts(5, 0, 0, false, 0);

/// Collected rule violations
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub errors: Vec<String>,
}

impl ValidationResult {
    /// No violations
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// `Ok(())` when valid, `EngineError::Validation` otherwise
    pub fn into_result(self) -> EngineResult<()> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(EngineError::Validation(self.errors))
        }
    }

    /// Combine two results
    pub fn merge(mut self, other: ValidationResult) -> Self {
        self.errors.extend(other.errors);
        self
    }

    fn push(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }
}

/// Stateless trade validator
#[derive(Debug, Clone, Copy, Default)]
pub struct TradeValidator;

impl TradeValidator {
    /// Create a validator
    pub fn new() -> Self {
        Self
    }

    /// Check entry parameters before a trade is opened.
    pub fn validate_trade_creation(
        &self,
        entry_price: Price,
        stop_loss: Option<Price>,
        take_profit: Option<Price>,
        lot_size: LotSize,
        direction: Direction,
    ) -> ValidationResult {
        let mut result = ValidationResult::default();
        let entry = entry_price.as_decimal();

        if lot_size.as_decimal() <= Decimal::ZERO {
            result.push("Lot size must be greater than 0");
        }

        if let Some(stop) = stop_loss.map(|p| p.as_decimal()) {
            match direction {
                Direction::Buy if stop >= entry => {
                    result.push("Stop loss for BUY trade must be below entry price")
                },
                Direction::Sell if stop <= entry => {
                    result.push("Stop loss for SELL trade must be above entry price")
                },
                _ => {},
            }
        }

        if let Some(target) = take_profit.map(|p| p.as_decimal()) {
            match direction {
                Direction::Buy if target <= entry => {
                    result.push("Take profit for BUY trade must be above entry price")
                },
                Direction::Sell if target >= entry => {
                    result.push("Take profit for SELL trade must be below entry price")
                },
                _ => {},
            }
        }

        if let (Some(stop), Some(target)) = (stop_loss, take_profit) {
            let (stop, target) = (stop.as_decimal(), target.as_decimal());
            match direction {
                Direction::Buy if target <= stop => {
                    result.push("Take profit must be above stop loss for BUY trade")
                },
                Direction::Sell if target >= stop => {
                    result.push("Take profit must be below stop loss for SELL trade")
                },
                _ => {},
            }
        }

        result
    }

    /// Check that a trade can take an exit.
    ///
    /// The exit price is positive by construction.
    pub fn validate_trade_closing(&self, trade: &Trade, _exit_price: Price) -> ValidationResult {
        let mut result = ValidationResult::default();
        if !trade.can_close() {
            result.push("Cannot close a trade that is not open");
        }
        result
    }

    /// Check the money at risk against the account balance.
    pub fn validate_risk_amount(&self, risk_amount: Decimal, account_balance: Decimal) -> ValidationResult {
        let mut result = ValidationResult::default();

        if risk_amount <= Decimal::ZERO {
            result.push("Risk amount must be greater than 0");
        }

        if risk_amount > account_balance {
            result.push("Risk amount cannot exceed account balance");
        }

        if account_balance <= Decimal::ZERO {
            result.push("Account balance must be greater than 0");
            return result;
        }

        let risk_percent = risk_amount / account_balance * Decimal::ONE_HUNDRED;
        if risk_percent > MAX_RISK_PERCENT {
            result.push(format!(
                "Risk amount ({:.2}%) exceeds recommended maximum of {}%",
                risk_percent, MAX_RISK_PERCENT
            ));
        }

        result
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use forexhelper_domain::{CurrencyPair, NewTrade};
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn p(v: Decimal) -> Price {
        Price::new(v).unwrap()
    }

    fn lots(v: Decimal) -> LotSize {
        LotSize::new(v).unwrap()
    }

    #[test]
    fn test_valid_buy() {
        let result = TradeValidator::new().validate_trade_creation(
            p(dec!(1.1000)),
            Some(p(dec!(1.0950))),
            Some(p(dec!(1.1100))),
            lots(dec!(0.5)),
            Direction::Buy,
        );
        assert!(result.is_valid());
        assert!(result.into_result().is_ok());
    }

    #[test]
    fn test_valid_sell_without_levels() {
        let result = TradeValidator::new().validate_trade_creation(
            p(dec!(150.00)),
            None,
            None,
            lots(dec!(1)),
            Direction::Sell,
        );
        assert!(result.is_valid());
    }

    #[test]
    fn test_buy_with_inverted_levels_reports_everything() {
        let result = TradeValidator::new().validate_trade_creation(
            p(dec!(1.1000)),
            Some(p(dec!(1.1100))),
            Some(p(dec!(1.0950))),
            lots(dec!(0)),
            Direction::Buy,
        );
        assert_eq!(
            result.errors,
            vec![
                "Lot size must be greater than 0",
                "Stop loss for BUY trade must be below entry price",
                "Take profit for BUY trade must be above entry price",
                "Take profit must be above stop loss for BUY trade",
            ]
        );
        assert!(matches!(result.into_result(), Err(EngineError::Validation(e)) if e.len() == 4));
    }

    #[test]
    fn test_sell_levels() {
        let result = TradeValidator::new().validate_trade_creation(
            p(dec!(1.2500)),
            Some(p(dec!(1.2450))),
            None,
            lots(dec!(1)),
            Direction::Sell,
        );
        assert_eq!(result.errors, vec!["Stop loss for SELL trade must be above entry price"]);

        let result = TradeValidator::new().validate_trade_creation(
            p(dec!(1.2500)),
            None,
            Some(p(dec!(1.2600))),
            lots(dec!(1)),
            Direction::Sell,
        );
        assert_eq!(result.errors, vec!["Take profit for SELL trade must be below entry price"]);
    }

    #[test]
    fn test_stop_on_entry_is_rejected() {
        let result = TradeValidator::new().validate_trade_creation(
            p(dec!(1.1000)),
            Some(p(dec!(1.1000))),
            None,
            lots(dec!(1)),
            Direction::Buy,
        );
        assert!(!result.is_valid());
    }

    #[test]
    fn test_risk_amount_rules() {
        let v = TradeValidator::new();
        assert!(v.validate_risk_amount(dec!(100), dec!(10000)).is_valid());
        assert!(v.validate_risk_amount(dec!(500), dec!(10000)).is_valid());

        let over = v.validate_risk_amount(dec!(600), dec!(10000));
        assert_eq!(over.errors, vec!["Risk amount (6.00%) exceeds recommended maximum of 5%"]);

        let zero = v.validate_risk_amount(dec!(0), dec!(10000));
        assert_eq!(zero.errors, vec!["Risk amount must be greater than 0"]);

        let exceeds = v.validate_risk_amount(dec!(2000), dec!(1000));
        assert!(exceeds
            .errors
            .contains(&"Risk amount cannot exceed account balance".to_string()));
        assert_eq!(exceeds.errors.len(), 2);
    }

    #[test]
    fn test_risk_amount_with_zero_balance() {
        let result = TradeValidator::new().validate_risk_amount(dec!(10), dec!(0));
        assert!(result
            .errors
            .contains(&"Account balance must be greater than 0".to_string()));
    }

    #[test]
    fn test_closing_requires_open_trade() {
        let mut trade = Trade::open(NewTrade {
            user_id: Uuid::now_v7(),
            pair: CurrencyPair::parse("EURUSD").unwrap(),
            direction: Direction::Buy,
            entry_price: p(dec!(1.1)),
            lot_size: lots(dec!(1)),
            stop_loss: None,
            take_profit: None,
            risk_amount: dec!(50),
            entry_time: Utc::now(),
            notes: None,
        });
        let v = TradeValidator::new();
        assert!(v.validate_trade_closing(&trade, p(dec!(1.2))).is_valid());

        trade.close(p(dec!(1.2)), Utc::now()).unwrap();
        let result = v.validate_trade_closing(&trade, p(dec!(1.3)));
        assert_eq!(result.errors, vec!["Cannot close a trade that is not open"]);
    }

    #[test]
    fn test_merge() {
        let a = ValidationResult { errors: vec!["a".to_string()] };
        let b = ValidationResult { errors: vec!["b".to_string()] };
        assert_eq!(a.merge(b).errors, vec!["a", "b"]);
    }
}
