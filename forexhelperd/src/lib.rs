//! Forex Helper Daemon Library
//!
//! HTTP service for the lot calculator, the trade journal and performance
//! reports.
//!
//! # Architecture
//!
//! ```text
//! HTTP client → API (axum) → JournalService → Engine services
//!                                   ↓
//!                                 Store
//! ```
//!
//! # Components
//!
//! - **Daemon**: binds the listener and serves the API
//! - **Journal Service**: use cases (sizing, trades, reports)
//! - **API**: HTTP endpoints, caller identity from `x-user-id`
//! - **Config**: Environment-based configuration
//!
//! # Example
//!
//! ```rust,ignore
//! use forexhelperd::{Config, Daemon};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = Config::from_env().expect("Failed to load config");
//!     let daemon = Daemon::new_in_memory(config);
//!     daemon.run().await.expect("Daemon error");
//! }
//! ```

#![warn(clippy::all)]

pub mod api;
pub mod config;
pub mod daemon;
pub mod error;
pub mod journal;

// Re-exports for convenience
pub use config::{ApiConfig, Config, Environment, ExchangeRate, JournalConfig};
pub use daemon::Daemon;
pub use error::{DaemonError, DaemonResult};
pub use journal::{
    CalculatePositionSize, CloseTrade, CreateTrade, JournalService, PipValueQuote, TradePage,
    TradeQuery,
};
