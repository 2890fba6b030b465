//! Forex Helper Daemon
//!
//! # Usage
//!
//! ```bash
//! # Start with default configuration
//! cargo run -p forexhelperd
//!
//! # Start with custom environment
//! FXH_ENV=test FXH_API_PORT=8081 cargo run -p forexhelperd
//! ```
//!
//! # Environment Variables
//!
//! - `FXH_ENV`: Environment (test, development, production)
//! - `FXH_API_HOST`: API host (default: 0.0.0.0)
//! - `FXH_API_PORT`: API port (default: 8080)
//! - `FXH_ACCOUNT_CURRENCY`: Currency trade results are valued in (default: USD)
//! - `FXH_EXCHANGE_RATES`: Static rates, e.g. `USDJPY=150,EURUSD=1.08`

use forexhelperd::{Config, Daemon};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("forexhelperd=info".parse()?))
        .init();

    let config = Config::from_env()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = %config.environment,
        api_host = %config.api.host,
        api_port = config.api.port,
        rates = config.journal.exchange_rates.len(),
        "Forex Helper Daemon"
    );

    let daemon = Daemon::new_in_memory(config);
    daemon.run().await?;

    Ok(())
}
