//! Report Assembler
//!
//! Binds a date range, the metrics over the trades entered in that range,
//! and the trades themselves into a [`TradingReport`].

use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use forexhelper_domain::{ReportId, Trade, TradingReport, UserId};

use crate::error::{EngineError, EngineResult};
use crate::metrics::MetricsCalculator;

/// Generates trading reports.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportGenerator {
    metrics: MetricsCalculator,
}

impl ReportGenerator {
    /// Create a generator.
    pub fn new(metrics: MetricsCalculator) -> Self {
        Self { metrics }
    }

    /// Generate a report stamped with the current time.
    pub fn generate(
        &self,
        user_id: UserId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        trades: &[Trade],
    ) -> EngineResult<TradingReport> {
        self.generate_at(user_id, start, end, trades, Utc::now())
    }

    /// Generate a report with an explicit generation time.
    ///
    /// Trades are kept when `start <= entry_time <= end`.
    ///
    /// # Errors
    /// `EngineError::InvalidRange` if `end < start`, checked before anything
    /// else; metrics errors for the filtered set.
    pub fn generate_at(
        &self,
        user_id: UserId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        trades: &[Trade],
        generated_at: DateTime<Utc>,
    ) -> EngineResult<TradingReport> {
        if end < start {
            return Err(EngineError::InvalidRange(
                "End date must be after or equal to start date".to_string(),
            ));
        }

        let in_range: Vec<Trade> = trades
            .iter()
            .filter(|t| t.entry_time >= start && t.entry_time <= end)
            .cloned()
            .collect();

        let metrics = self.metrics.calculate(&in_range)?;
        let id = report_id(user_id, start, end, generated_at, Uuid::now_v7());

        info!(
            report_id = %id,
            user_id = %user_id,
            trades = in_range.len(),
            "Trading report generated"
        );

        Ok(TradingReport::new(id, user_id, start, end, metrics, in_range, generated_at)?)
    }
}

/// `report_{user}_{start}_{end}_{generation millis}_{nonce}`, dates as
/// `YYYY-MM-DD`
///
/// The nonce is the random tail of `nonce` (last 12 hex digits), so two
/// reports generated in the same millisecond still get distinct ids.
pub fn report_id(
    user_id: UserId,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    generated_at: DateTime<Utc>,
    nonce: Uuid,
) -> ReportId {
    let nonce = nonce.simple().to_string();
    format!(
        "report_{}_{}_{}_{}_{}",
        user_id,
        start.format("%Y-%m-%d"),
        end.format("%Y-%m-%d"),
        generated_at.timestamp_millis(),
        &nonce[nonce.len() - 12..]
    )
}

// =============================================================================
// Tests
// =============================================================================
