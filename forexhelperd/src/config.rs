//! Daemon configuration.
//!
//! Loads configuration from environment variables with sensible defaults.

use crate::error::{DaemonError, DaemonResult};
use forexhelper_domain::{AccountCurrency, CurrencyCode};
use rust_decimal::Decimal;
use std::env;
use std::str::FromStr;

/// Rate table used when `FXH_EXCHANGE_RATES` is unset
pub const DEFAULT_EXCHANGE_RATES: &str =
    "USDJPY=150,EURUSD=1.08,GBPUSD=1.27,USDCHF=0.90,AUDUSD=0.66,USDCAD=1.36,NZDUSD=0.61";

// =============================================================================
// Configuration
// =============================================================================

/// Daemon configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Journal configuration
    pub journal: JournalConfig,

    /// Environment (test, development, production)
    pub environment: Environment,
}

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,
    /// Port to bind to
    pub port: u16,
}

/// Journal configuration.
#[derive(Debug, Clone)]
pub struct JournalConfig {
    /// Currency trade results are valued in
    pub account_currency: AccountCurrency,
    /// Static exchange rates
    pub exchange_rates: Vec<ExchangeRate>,
}

/// One configured exchange rate: 1 `from` = `rate` `to`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeRate {
    pub from: CurrencyCode,
    pub to: CurrencyCode,
    pub rate: Decimal,
}

/// Environment type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    /// Test environment
    Test,
    /// Development environment
    Development,
    /// Production environment
    Production,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> DaemonResult<Self> {
        // Load .env file if present (ignore errors)
        let _ = dotenvy::dotenv();

        let environment = Self::load_environment()?;
        let api = Self::load_api_config()?;
        let journal = Self::load_journal_config()?;

        Ok(Self {
            api,
            journal,
            environment,
        })
    }

    /// Create test configuration.
    pub fn test() -> Self {
        Self {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 0, // Let OS assign port
            },
            journal: JournalConfig::default(),
            environment: Environment::Test,
        }
    }

    fn load_environment() -> DaemonResult<Environment> {
        let env_str = env::var("FXH_ENV").unwrap_or_else(|_| "development".to_string());
        Environment::from_str(&env_str)
    }

    fn load_api_config() -> DaemonResult<ApiConfig> {
        let host = env::var("FXH_API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port_str = env::var("FXH_API_PORT").unwrap_or_else(|_| "8080".to_string());

        let port = port_str
            .parse::<u16>()
            .map_err(|_| DaemonError::Config(format!("Invalid FXH_API_PORT: {}", port_str)))?;

        Ok(ApiConfig { host, port })
    }

    fn load_journal_config() -> DaemonResult<JournalConfig> {
        let currency = env::var("FXH_ACCOUNT_CURRENCY").unwrap_or_else(|_| "USD".to_string());
        let account_currency = AccountCurrency::new(&currency).map_err(|e| {
            DaemonError::Config(format!("Invalid FXH_ACCOUNT_CURRENCY: {}", e))
        })?;

        let rates =
            env::var("FXH_EXCHANGE_RATES").unwrap_or_else(|_| DEFAULT_EXCHANGE_RATES.to_string());
        let exchange_rates = parse_exchange_rates(&rates)?;

        Ok(JournalConfig {
            account_currency,
            exchange_rates,
        })
    }
}

/// Parse `FROMTO=rate` entries separated by commas.
///
/// `USDJPY=150` and `USD/JPY=150` are both accepted. Blank entries are
/// skipped; anything else malformed is a configuration error.
pub fn parse_exchange_rates(raw: &str) -> DaemonResult<Vec<ExchangeRate>> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(parse_exchange_rate)
        .collect()
}

fn parse_exchange_rate(entry: &str) -> DaemonResult<ExchangeRate> {
    let invalid = || DaemonError::Config(format!("Invalid FXH_EXCHANGE_RATES entry: {}", entry));

    let (pair, rate) = entry.split_once('=').ok_or_else(invalid)?;
    let pair: String = pair.trim().chars().filter(|c| *c != '/').collect();
    if pair.len() != 6 || !pair.is_ascii() {
        return Err(invalid());
    }

    let from = CurrencyCode::new(&pair[..3]).map_err(|_| invalid())?;
    let to = CurrencyCode::new(&pair[3..]).map_err(|_| invalid())?;
    let rate = Decimal::from_str(rate.trim()).map_err(|_| invalid())?;
    if rate <= Decimal::ZERO {
        return Err(invalid());
    }

    Ok(ExchangeRate { from, to, rate })
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            journal: JournalConfig::default(),
            environment: Environment::Development,
        }
    }
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            account_currency: AccountCurrency::usd(),
            exchange_rates: parse_exchange_rates(DEFAULT_EXCHANGE_RATES).unwrap_or_default(),
        }
    }
}

impl FromStr for Environment {
    type Err = DaemonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "test" => Ok(Environment::Test),
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(DaemonError::Config(format!(
                "Invalid FXH_ENV: {}. Expected: test, development, production",
                other
            ))),
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Test => write!(f, "test"),
            Environment::Development => write!(f, "development"),
            Environment::Production => write!(f, "production"),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.api.port, 8080);
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.journal.account_currency.as_str(), "USD");
    }

    #[test]
    fn test_test_config() {
        let config = Config::test();

        assert_eq!(config.api.port, 0);
        assert_eq!(config.environment, Environment::Test);
    }

    #[test]
    fn test_default_rate_table_parses() {
        let config = JournalConfig::default();

        assert_eq!(config.exchange_rates.len(), 7);
        assert_eq!(config.exchange_rates[0].from, "USD");
        assert_eq!(config.exchange_rates[0].to, "JPY");
        assert_eq!(config.exchange_rates[0].rate, dec!(150));
    }

    #[test]
    fn test_parse_exchange_rates_accepts_slash_and_spaces() {
        let rates = parse_exchange_rates(" EUR/USD = 1.08 , usdjpy=151.5,").unwrap();

        assert_eq!(rates.len(), 2);
        assert_eq!(rates[0].from, "EUR");
        assert_eq!(rates[0].rate, dec!(1.08));
        assert_eq!(rates[1].to, "JPY");
        assert_eq!(rates[1].rate, dec!(151.5));
    }

    #[test]
    fn test_parse_exchange_rates_rejects_bad_entries() {
        for raw in ["USDJPY", "USDJP=150", "USDJPY=abc", "USDJPY=0", "US1JPY=2", "EURUSD=-1.1"] {
            let err = parse_exchange_rates(raw).unwrap_err();
            assert!(matches!(err, DaemonError::Config(_)), "{raw}");
        }
    }

    #[test]
    fn test_parse_empty_rate_table() {
        assert!(parse_exchange_rates("").unwrap().is_empty());
    }

    #[test]
    fn test_environment_parsing() {
        assert_eq!("prod".parse::<Environment>().unwrap(), Environment::Production);
        assert_eq!("DEV".parse::<Environment>().unwrap(), Environment::Development);
        assert_eq!("test".parse::<Environment>().unwrap(), Environment::Test);
        assert!("staging".parse::<Environment>().is_err());
    }

    #[test]
    fn test_environment_display() {
        assert_eq!(Environment::Test.to_string(), "test");
        assert_eq!(Environment::Development.to_string(), "development");
        assert_eq!(Environment::Production.to_string(), "production");
    }
}
