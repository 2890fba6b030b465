//! In-memory store implementation
//!
//! Used for testing and development without a database.
//! Thread-safe using RwLock for concurrent access. `replace` compares and
//! writes under one write lock, so concurrent updates to a trade built from
//! the same snapshot are serialized and only the first one lands.

use crate::error::StoreError;
use crate::repository::{ReportRepository, Store, TradeRepository};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use forexhelper_domain::{ReportId, Trade, TradeId, TradeStatus, TradingReport, UserId};
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::debug;

/// In-memory store
#[derive(Default)]
pub struct MemoryStore {
    trades: RwLock<HashMap<TradeId, Trade>>,
    reports: RwLock<HashMap<ReportId, TradingReport>>,
}

impl MemoryStore {
    /// Create a new empty in-memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of trades
    pub fn trade_count(&self) -> usize {
        self.trades.read().unwrap().len()
    }

    /// Get the number of reports
    pub fn report_count(&self) -> usize {
        self.reports.read().unwrap().len()
    }

    /// Clear all data (useful for test setup)
    pub fn clear(&self) {
        self.trades.write().unwrap().clear();
        self.reports.write().unwrap().clear();
    }

    fn select_trades(&self, predicate: impl Fn(&Trade) -> bool) -> Vec<Trade> {
        let trades = self.trades.read().unwrap();
        let mut found: Vec<Trade> = trades.values().filter(|t| predicate(*t)).cloned().collect();
        found.sort_by_key(|t| (t.entry_time, t.id));
        found
    }
}

// =============================================================================
// TradeRepository
// =============================================================================

#[async_trait]
impl TradeRepository for MemoryStore {
    async fn save(&self, trade: &Trade) -> Result<(), StoreError> {
        let mut trades = self.trades.write().unwrap();
        trades.insert(trade.id, trade.clone());
        debug!(trade_id = %trade.id, status = %trade.status(), "Trade saved");
        Ok(())
    }

    async fn replace(&self, current: &Trade, updated: &Trade) -> Result<(), StoreError> {
        let mut trades = self.trades.write().unwrap();
        match trades.get(&current.id) {
            None => return Err(StoreError::not_found("trade", current.id.to_string())),
            Some(stored) if stored != current => {
                return Err(StoreError::conflict("trade", current.id.to_string()))
            },
            Some(_) => {},
        }
        trades.insert(updated.id, updated.clone());
        debug!(trade_id = %updated.id, status = %updated.status(), "Trade replaced");
        Ok(())
    }

    async fn find_by_id(&self, id: TradeId) -> Result<Option<Trade>, StoreError> {
        let trades = self.trades.read().unwrap();
        Ok(trades.get(&id).cloned())
    }

    async fn find_by_user(&self, user_id: UserId) -> Result<Vec<Trade>, StoreError> {
        Ok(self.select_trades(|t| t.belongs_to(user_id)))
    }

    async fn find_by_user_and_status(
        &self,
        user_id: UserId,
        status: TradeStatus,
    ) -> Result<Vec<Trade>, StoreError> {
        Ok(self.select_trades(|t| t.belongs_to(user_id) && t.status() == status))
    }

    async fn find_by_user_and_date_range(
        &self,
        user_id: UserId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Trade>, StoreError> {
        Ok(self.select_trades(|t| {
            t.belongs_to(user_id) && t.entry_time >= start && t.entry_time <= end
        }))
    }

    async fn delete(&self, id: TradeId) -> Result<(), StoreError> {
        let mut trades = self.trades.write().unwrap();
        trades
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found("trade", id.to_string()))
    }

    async fn count_by_user(&self, user_id: UserId) -> Result<usize, StoreError> {
        let trades = self.trades.read().unwrap();
        Ok(trades.values().filter(|t| t.belongs_to(user_id)).count())
    }
}

// =============================================================================
// ReportRepository
// =============================================================================

#[async_trait]
impl ReportRepository for MemoryStore {
    async fn save(&self, report: &TradingReport) -> Result<(), StoreError> {
        let mut reports = self.reports.write().unwrap();
        if reports.contains_key(&report.id) {
            return Err(StoreError::duplicate("report", report.id.clone()));
        }
        reports.insert(report.id.clone(), report.clone());
        debug!(report_id = %report.id, "Report saved");
        Ok(())
    }

    async fn find_by_id(&self, id: &ReportId) -> Result<Option<TradingReport>, StoreError> {
        let reports = self.reports.read().unwrap();
        Ok(reports.get(id).cloned())
    }

    async fn find_by_user(&self, user_id: UserId) -> Result<Vec<TradingReport>, StoreError> {
        let reports = self.reports.read().unwrap();
        let mut found: Vec<TradingReport> =
            reports.values().filter(|r| r.belongs_to(user_id)).cloned().collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        Ok(found)
    }

    async fn delete(&self, id: &ReportId) -> Result<(), StoreError> {
        let mut reports = self.reports.write().unwrap();
        reports
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found("report", id.clone()))
    }
}

impl Store for MemoryStore {
    fn trades(&self) -> &dyn TradeRepository {
        self
    }

    fn reports(&self) -> &dyn ReportRepository {
        self
    }
}

// =============================================================================
// Tests
// =============================================================================
