//! Static exchange rate table.
//!
//! Serves rates from memory without any external calls. Used by the daemon
//! (rates come from configuration) and by tests.

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::RwLock;

use forexhelper_domain::CurrencyCode;

use crate::error::{EngineError, EngineResult};
use crate::ports::ExchangeRateProvider;

// =============================================================================
// Static Rate Provider
// =============================================================================

/// Exchange rate provider backed by a fixed table.
///
/// When only the opposite direction is configured, the inverse (1 / rate) is
/// returned.
#[derive(Default)]
pub struct StaticRateProvider {
    /// Rates keyed by (from, to)
    rates: RwLock<HashMap<(String, String), Decimal>>,
}

impl StaticRateProvider {
    /// Create an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a provider from `(from, to, rate)` entries.
    pub fn from_rates<I>(rates: I) -> Self
    where
        I: IntoIterator<Item = (CurrencyCode, CurrencyCode, Decimal)>,
    {
        let provider = Self::new();
        for (from, to, rate) in rates {
            provider.set_rate(&from, &to, rate);
        }
        provider
    }

    /// Builder-style variant of [`set_rate`](Self::set_rate).
    pub fn with_rate(self, from: &str, to: &str, rate: Decimal) -> Self {
        if let (Ok(from), Ok(to)) = (CurrencyCode::new(from), CurrencyCode::new(to)) {
            self.set_rate(&from, &to, rate);
        }
        self
    }

    /// Set the rate for a currency direction.
    pub fn set_rate(&self, from: &CurrencyCode, to: &CurrencyCode, rate: Decimal) {
        let mut rates = self.rates.write().unwrap();
        rates.insert((from.to_string(), to.to_string()), rate);
    }

    /// Number of configured entries.
    pub fn len(&self) -> usize {
        self.rates.read().unwrap().len()
    }

    /// No rates configured.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lookup(&self, from: &str, to: &str) -> Option<Decimal> {
        let rates = self.rates.read().unwrap();
        if let Some(rate) = rates.get(&(from.to_string(), to.to_string())) {
            return Some(*rate);
        }
        rates
            .get(&(to.to_string(), from.to_string()))
            .filter(|inverse| !inverse.is_zero())
            .map(|inverse| Decimal::ONE / *inverse)
    }
}

#[async_trait]
impl ExchangeRateProvider for StaticRateProvider {
    async fn get_rate(&self, from: &CurrencyCode, to: &CurrencyCode) -> EngineResult<Decimal> {
        self.lookup(from.as_str(), to.as_str())
            .ok_or_else(|| EngineError::MissingConversion {
                from: from.to_string(),
                to: to.to_string(),
            })
    }
}

// =============================================================================
// Tests
// =============================================================================
