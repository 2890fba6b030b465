//! Engine port definitions.
//!
//! The engine's only external collaborator is an exchange rate lookup.
//! Adapters implement it for specific sources (static table, live feed, ...).

use async_trait::async_trait;
use rust_decimal::Decimal;

use forexhelper_domain::CurrencyCode;

use crate::error::EngineResult;

/// Port for currency conversion rates.
///
/// The returned rate satisfies `amount_in_to = amount_in_from × rate`.
/// Retries and timeouts belong to the adapter, not to the engine.
///
/// Implementations:
/// - `StaticRateProvider` - Fixed rate table (configuration, tests)
#[async_trait]
pub trait ExchangeRateProvider: Send + Sync {
    /// Get the multiplicative rate from `from` to `to`.
    ///
    /// Returns `EngineError::MissingConversion` when no rate is known.
    async fn get_rate(&self, from: &CurrencyCode, to: &CurrencyCode) -> EngineResult<Decimal>;
}
