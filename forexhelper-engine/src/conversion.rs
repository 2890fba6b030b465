//! Currency conversion on top of an [`ExchangeRateProvider`].

use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::debug;

use forexhelper_domain::CurrencyCode;

use crate::error::{EngineError, EngineResult, OrOverflow};
use crate::ports::ExchangeRateProvider;

/// Converts amounts between currencies.
///
/// Identical currencies short-circuit to rate 1 without calling the provider.
#[derive(Clone)]
pub struct CurrencyConverter {
    provider: Arc<dyn ExchangeRateProvider>,
}

impl CurrencyConverter {
    /// Create a converter over a rate provider.
    pub fn new(provider: Arc<dyn ExchangeRateProvider>) -> Self {
        Self { provider }
    }

    /// Rate from `from` to `to`.
    ///
    /// # Errors
    /// `EngineError::MissingConversion` if the provider has no rate or
    /// returns a non-positive one.
    pub async fn rate(&self, from: &CurrencyCode, to: &CurrencyCode) -> EngineResult<Decimal> {
        if from == to {
            return Ok(Decimal::ONE);
        }

        let rate = self.provider.get_rate(from, to).await?;
        if rate <= Decimal::ZERO {
            return Err(EngineError::MissingConversion {
                from: from.to_string(),
                to: to.to_string(),
            });
        }

        debug!(%from, %to, %rate, "Resolved exchange rate");
        Ok(rate)
    }

    /// Convert `amount` from one currency to another.
    pub async fn convert(
        &self,
        amount: Decimal,
        from: &CurrencyCode,
        to: &CurrencyCode,
    ) -> EngineResult<Decimal> {
        let rate = self.rate(from, to).await?;
        amount
            .checked_mul(rate)
            .or_overflow(&format!("{} {} in {}", amount, from, to))
    }
}
