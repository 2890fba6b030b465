//! Daemon error types.

use forexhelper_domain::{DomainError, ReportId};
use forexhelper_engine::EngineError;
use forexhelper_store::StoreError;
use thiserror::Error;
use uuid::Uuid;

/// Daemon-level errors.
#[derive(Debug, Error)]
pub enum DaemonError {
    /// Domain error
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    /// Engine error
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// Store error
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Trade not found (or owned by someone else)
    #[error("Trade not found: {0}")]
    TradeNotFound(Uuid),

    /// Report not found (or owned by someone else)
    #[error("Report not found: {0}")]
    ReportNotFound(ReportId),

    /// Trade is not in a state that allows the operation
    #[error("Invalid trade state: {id} is {state}")]
    InvalidTradeState { id: Uuid, state: String },

    /// Missing or malformed caller identity
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for daemon operations.
pub type DaemonResult<T> = Result<T, DaemonError>;
