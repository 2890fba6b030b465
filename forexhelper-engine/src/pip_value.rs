//! Pip Value Resolver
//!
//! Determines the monetary value of one pip (forex) or one point (metal) per
//! standard lot, in the account currency where a conversion is needed.
//!
//! # Rules (first match wins)
//!
//! ```text
//! 1. Metal (XAUUSD)                       → 1 USD per point
//! 2. XXX/USD, USD account                 → 10 USD
//! 3. USD/XXX, USD account                 → 10 / current price USD
//! 4. Cross pair, or account ≠ quote       → base value, converted
//!       base = 10            (XXX/USD)
//!            = 10 / price    (USD/XXX)
//!            = 10 × USD→quote (cross)
//!       then × quote→account when they differ
//! 5. Otherwise (account = quote)          → 10 in account currency
//! ```
//!
//! Values are never rounded here.

use rust_decimal::Decimal;
use tracing::debug;

use forexhelper_domain::{AccountCurrency, CurrencyCode, CurrencyPair, PipValue, Price};

use crate::conversion::CurrencyConverter;
use crate::error::{EngineError, EngineResult, OrOverflow};

/// Pip value per standard lot for forex pairs quoted in USD
const STANDARD_PIP_VALUE: Decimal = Decimal::TEN;

/// Resolves pip values, converting through an exchange rate provider.
#[derive(Clone)]
pub struct PipValueResolver {
    converter: CurrencyConverter,
}

impl PipValueResolver {
    /// Create a resolver.
    pub fn new(converter: CurrencyConverter) -> Self {
        Self { converter }
    }

    /// Resolve the pip value of `pair` for an account in `account`.
    ///
    /// `current_price` is only required for USD/XXX pairs.
    ///
    /// # Errors
    /// - `EngineError::MissingPrice` when a USD/XXX pair has no current price
    /// - `EngineError::MissingConversion` when a needed rate is unavailable
    /// - `EngineError::Overflow` when the value does not fit in a decimal
    pub async fn resolve(
        &self,
        pair: &CurrencyPair,
        account: &AccountCurrency,
        current_price: Option<Price>,
    ) -> EngineResult<PipValue> {
        let account_code = account.code();

        if pair.is_metal() {
            return Ok(PipValue::new(Decimal::ONE, CurrencyCode::usd())?);
        }

        if pair.is_usd_quoted() && account_code.is_usd() {
            return Ok(PipValue::new(STANDARD_PIP_VALUE, CurrencyCode::usd())?);
        }

        if pair.is_usd_based() && account_code.is_usd() {
            let value = per_price(pair, current_price)?;
            return Ok(PipValue::new(value, CurrencyCode::usd())?);
        }

        if pair.is_cross() || account_code != pair.quote() {
            return self.resolve_with_conversion(pair, account_code, current_price).await;
        }

        Ok(PipValue::new(STANDARD_PIP_VALUE, account_code.clone())?)
    }

    async fn resolve_with_conversion(
        &self,
        pair: &CurrencyPair,
        account: &CurrencyCode,
        current_price: Option<Price>,
    ) -> EngineResult<PipValue> {
        let usd = CurrencyCode::usd();
        let quote = pair.quote();

        let mut value = if pair.is_usd_quoted() {
            STANDARD_PIP_VALUE
        } else if pair.is_usd_based() {
            per_price(pair, current_price)?
        } else {
            // Cross: USD-denominated base value, moved into the quote currency
            let rate = self.converter.rate(&usd, quote).await?;
            STANDARD_PIP_VALUE.checked_mul(rate).or_overflow("cross pip value")?
        };

        if quote != account {
            let rate = self.converter.rate(quote, account).await?;
            value = value.checked_mul(rate).or_overflow("pip value conversion")?;
        }

        debug!(pair = %pair, account = %account, pip_value = %value, "Resolved pip value with conversion");
        Ok(PipValue::new(value, account.clone())?)
    }
}

fn require_price(pair: &CurrencyPair, current_price: Option<Price>) -> EngineResult<Price> {
    current_price.ok_or_else(|| EngineError::MissingPrice(format!("USD/{}", pair.quote())))
}

/// `10 / price` for USD/XXX pairs
fn per_price(pair: &CurrencyPair, current_price: Option<Price>) -> EngineResult<Decimal> {
    let price = require_price(pair, current_price)?;
    STANDARD_PIP_VALUE
        .checked_div(price.as_decimal())
        .or_overflow(&format!("pip value of {} at {}", pair, price.as_decimal()))
}

// =============================================================================
// Tests
// =============================================================================
