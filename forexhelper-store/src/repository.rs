//! Repository trait definitions (Ports)
//!
//! These traits define the storage interface for the journal.
//! Implementations can be a database, in-memory, or mock for testing.

use crate::error::StoreError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use forexhelper_domain::{ReportId, Trade, TradeId, TradeStatus, TradingReport, UserId};

/// Repository for Trade entities
#[async_trait]
pub trait TradeRepository: Send + Sync {
    /// Save a trade (insert or update)
    async fn save(&self, trade: &Trade) -> Result<(), StoreError>;

    /// Replace a stored trade, provided it still equals `current`
    ///
    /// Read-modify-write cycles go through here so that two writers
    /// starting from the same snapshot cannot both succeed.
    ///
    /// # Errors
    /// `StoreError::NotFound` if the trade is gone, `StoreError::Conflict`
    /// if it changed since `current` was read.
    async fn replace(&self, current: &Trade, updated: &Trade) -> Result<(), StoreError>;

    /// Find a trade by ID
    async fn find_by_id(&self, id: TradeId) -> Result<Option<Trade>, StoreError>;

    /// Find all trades of a user, oldest entry first
    async fn find_by_user(&self, user_id: UserId) -> Result<Vec<Trade>, StoreError>;

    /// Find a user's trades with a given status
    async fn find_by_user_and_status(
        &self,
        user_id: UserId,
        status: TradeStatus,
    ) -> Result<Vec<Trade>, StoreError>;

    /// Find a user's trades entered within `[start, end]`
    async fn find_by_user_and_date_range(
        &self,
        user_id: UserId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Trade>, StoreError>;

    /// Delete a trade
    async fn delete(&self, id: TradeId) -> Result<(), StoreError>;

    /// Number of trades a user owns
    async fn count_by_user(&self, user_id: UserId) -> Result<usize, StoreError>;
}

/// Repository for TradingReport records (write-once)
#[async_trait]
pub trait ReportRepository: Send + Sync {
    /// Save a new report; fails on an existing id
    async fn save(&self, report: &TradingReport) -> Result<(), StoreError>;

    /// Find a report by ID
    async fn find_by_id(&self, id: &ReportId) -> Result<Option<TradingReport>, StoreError>;

    /// Find all reports of a user, newest first
    async fn find_by_user(&self, user_id: UserId) -> Result<Vec<TradingReport>, StoreError>;

    /// Delete a report
    async fn delete(&self, id: &ReportId) -> Result<(), StoreError>;
}

/// Combined store interface
pub trait Store: Send + Sync {
    /// Get trade repository
    fn trades(&self) -> &dyn TradeRepository;

    /// Get report repository
    fn reports(&self) -> &dyn ReportRepository;
}
