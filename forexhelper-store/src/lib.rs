//! Forex Helper Storage Layer
//!
//! Provides persistence for trades and trading reports.
//!
//! # Architecture
//!
//! - **Repository traits**: Define the storage interface (ports)
//! - **In-memory store**: Thread-safe implementation for the daemon and tests
//!
//! # Usage
//!
//! ```rust
//! use chrono::Utc;
//! use forexhelper_domain::{CurrencyPair, Direction, LotSize, NewTrade, Price, Trade};
//! use forexhelper_store::{MemoryStore, Store};
//! use rust_decimal_macros::dec;
//! use uuid::Uuid;
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = MemoryStore::new();
//!     let user_id = Uuid::now_v7();
//!
//!     let trade = Trade::open(NewTrade {
//!         user_id,
//!         pair: CurrencyPair::parse("EURUSD").unwrap(),
//!         direction: Direction::Buy,
//!         entry_price: Price::new(dec!(1.0850)).unwrap(),
//!         lot_size: LotSize::new(dec!(0.5)).unwrap(),
//!         stop_loss: None,
//!         take_profit: None,
//!         risk_amount: dec!(50),
//!         entry_time: Utc::now(),
//!         notes: None,
//!     });
//!     store.trades().save(&trade).await.unwrap();
//!
//!     let mine = store.trades().find_by_user(user_id).await.unwrap();
//!     println!("Trades: {}", mine.len());
//! }
//! ```

#![warn(clippy::all)]

// Modules
mod error;
mod memory;
mod repository;

// Re-exports
pub use error::StoreError;
pub use memory::MemoryStore;
pub use repository::{ReportRepository, Store, TradeRepository};
