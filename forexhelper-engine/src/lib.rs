//! Forex Helper Engine Layer
//!
//! Risk sizing and performance analytics over the domain types.
//!
//! # Components
//!
//! - **Pip Value Resolver**: value of one pip/point per standard lot
//! - **Position Sizer**: lot size from a risk budget
//! - **Trade Validator**: business rules, reported as a list
//! - **Trade Analyzer**: profit/loss of exited trades
//! - **Metrics Calculator**: performance summary of closed trades
//! - **Report Generator**: metrics over a date range, as a report record
//!
//! # Data Flow
//!
//! ```text
//! Trade (exited) → TradeAnalyzer → Trade (closed) → MetricsCalculator → ReportGenerator
//!                        │
//!                 PipValueResolver ← PositionSizer
//!                        │
//!               CurrencyConverter → ExchangeRateProvider (port)
//! ```
//!
//! The rate lookup is the only suspension point; everything else is
//! synchronous and pure over its inputs.

#![warn(clippy::all)]

pub mod analyzer;
pub mod conversion;
pub mod error;
pub mod metrics;
pub mod pip_value;
pub mod ports;
pub mod position_size;
pub mod report;
pub mod stub;
pub mod validator;

// Re-exports for convenience
pub use analyzer::TradeAnalyzer;
pub use conversion::CurrencyConverter;
pub use error::{EngineError, EngineResult};
pub use metrics::MetricsCalculator;
pub use pip_value::PipValueResolver;
pub use ports::ExchangeRateProvider;
pub use position_size::{implied_risk, PositionSizeRequest, PositionSizer};
pub use report::{report_id, ReportGenerator};
pub use stub::StaticRateProvider;
pub use validator::{TradeValidator, ValidationResult, MAX_RISK_PERCENT};
