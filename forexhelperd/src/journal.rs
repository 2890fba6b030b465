//! Journal Service: the use cases behind the HTTP API.
//!
//! One service per process. It owns the engine services and the store and
//! exposes three groups of operations:
//! - Lot calculator (position size, pip value, pair catalog)
//! - Trade history (record, list, close, annotate, delete)
//! - Reports (metrics over a range, generate and keep reports)
//!
//! # Architecture
//!
//! ```text
//! API → JournalService → PositionSizer / TradeValidator / TradeAnalyzer
//!              │                         │
//!              │                  PipValueResolver → CurrencyConverter
//!              ↓
//!        Store (trades, reports)
//! ```
//!
//! Trades are only visible to their owner. A trade or report owned by
//! another user is reported as not found.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use forexhelper_domain::{
    AccountBalance, AccountCurrency, CurrencyCode, CurrencyPair, Direction, LotSize, NewTrade,
    PairKind, PerformanceMetrics, PositionSizeCalculation, Price, PriceUnit, ReportId,
    RiskPercentage, StopDistance, Trade, TradeId, TradeStatus, TradingReport, UserId,
};
use forexhelper_engine::{
    CurrencyConverter, EngineError, MetricsCalculator, PipValueResolver, PositionSizeRequest,
    PositionSizer, ReportGenerator, StaticRateProvider, TradeAnalyzer, TradeValidator,
};
use forexhelper_store::{Store, StoreError};

use crate::config::JournalConfig;
use crate::error::{DaemonError, DaemonResult};

/// First page when none is requested
pub const DEFAULT_PAGE: usize = 1;

/// Page size when none is requested
pub const DEFAULT_PAGE_SIZE: usize = 20;

// =============================================================================
// Commands and Queries
// =============================================================================

/// Inputs of a lot size calculation.
#[derive(Debug, Clone, Deserialize)]
pub struct CalculatePositionSize {
    pub account_balance: Decimal,
    pub account_currency: String,
    pub risk_percentage: Decimal,
    pub stop_loss: Decimal,
    pub stop_loss_unit: PriceUnit,
    pub currency_pair: String,
    /// Required for USD/XXX pairs
    pub current_price: Option<Decimal>,
}

/// Pip (or point) value of a pair for an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipValueQuote {
    pub pip_value: Decimal,
    pub currency: CurrencyCode,
    pub unit: PriceUnit,
}

/// Inputs for recording a trade.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTrade {
    pub pair: String,
    /// BUY or SELL (LONG/SHORT accepted)
    pub direction: String,
    pub entry_price: Decimal,
    pub lot_size: Decimal,
    pub stop_loss: Option<Decimal>,
    pub take_profit: Option<Decimal>,
    pub risk_amount: Decimal,
    /// Balance the risk amount is checked against
    pub account_balance: Decimal,
    /// Defaults to now
    pub entry_time: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

/// Inputs for closing a trade.
#[derive(Debug, Clone, Deserialize)]
pub struct CloseTrade {
    pub exit_price: Decimal,
    /// Defaults to now
    pub exit_time: Option<DateTime<Utc>>,
}

/// Trade list filters and pagination.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TradeQuery {
    pub status: Option<TradeStatus>,
    pub pair: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

/// One page of trades, newest entry first.
#[derive(Debug, Clone)]
pub struct TradePage {
    pub trades: Vec<Trade>,
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
}

// =============================================================================
// Journal Service
// =============================================================================

/// Application service for the trading journal.
pub struct JournalService<S: Store + 'static> {
    /// Trades and reports
    store: Arc<S>,
    pip_values: PipValueResolver,
    sizer: PositionSizer,
    validator: TradeValidator,
    analyzer: TradeAnalyzer,
    metrics: MetricsCalculator,
    reports: ReportGenerator,
}

impl<S: Store + 'static> JournalService<S> {
    /// Create a service valuing trades in `account_currency`.
    pub fn new(store: Arc<S>, converter: CurrencyConverter, account_currency: AccountCurrency) -> Self {
        let pip_values = PipValueResolver::new(converter.clone());

        Self {
            store,
            sizer: PositionSizer::new(pip_values.clone()),
            analyzer: TradeAnalyzer::new(pip_values.clone(), converter, account_currency),
            pip_values,
            validator: TradeValidator::new(),
            metrics: MetricsCalculator::new(),
            reports: ReportGenerator::default(),
        }
    }

    /// Create a service backed by the configured static rate table.
    pub fn from_config(store: Arc<S>, config: &JournalConfig) -> Self {
        let provider = StaticRateProvider::from_rates(
            config
                .exchange_rates
                .iter()
                .map(|r| (r.from.clone(), r.to.clone(), r.rate)),
        );
        debug!(rates = provider.len(), "Exchange rate table loaded");

        Self::new(
            store,
            CurrencyConverter::new(Arc::new(provider)),
            config.account_currency.clone(),
        )
    }

    /// Currency trade results are valued in
    pub fn account_currency(&self) -> &AccountCurrency {
        self.analyzer.account_currency()
    }

    // =========================================================================
    // Lot calculator
    // =========================================================================

    /// Size a position from a risk budget.
    pub async fn calculate_position_size(
        &self,
        user_id: UserId,
        command: CalculatePositionSize,
    ) -> DaemonResult<PositionSizeCalculation> {
        let pair = CurrencyPair::parse(&command.currency_pair)?;
        let account_currency = AccountCurrency::new(&command.account_currency)?;

        let request = PositionSizeRequest {
            account_balance: AccountBalance::new(command.account_balance, account_currency.as_str())?,
            risk_percentage: RiskPercentage::new(command.risk_percentage)?,
            stop_distance: StopDistance::new(command.stop_loss, command.stop_loss_unit)?,
            pair,
            account_currency,
            current_price: command.current_price.map(Price::new).transpose()?,
        };

        let calculation = self.sizer.size(request).await?;

        info!(
            %user_id,
            calculation_id = %calculation.id,
            lot_size = %calculation.lot_size.as_decimal(),
            "Position size calculated for user"
        );

        Ok(calculation)
    }

    /// Value of one pip (one point for metals) per standard lot.
    pub async fn pip_value(
        &self,
        pair: &str,
        account_currency: &str,
        current_price: Option<Decimal>,
    ) -> DaemonResult<PipValueQuote> {
        let pair = CurrencyPair::parse(pair)?;
        let account_currency = AccountCurrency::new(account_currency)?;
        let current_price = current_price.map(Price::new).transpose()?;

        let pip_value = self
            .pip_values
            .resolve(&pair, &account_currency, current_price)
            .await?;

        Ok(PipValueQuote {
            pip_value: pip_value.value(),
            currency: pip_value.currency().clone(),
            unit: pair.price_unit(),
        })
    }

    /// Supported pairs, optionally of one kind.
    pub fn currency_pairs(&self, kind: Option<PairKind>) -> Vec<CurrencyPair> {
        CurrencyPair::catalog_by_kind(kind)
    }

    // =========================================================================
    // Trade history
    // =========================================================================

    /// Record a new open trade.
    ///
    /// Entry levels and the risk amount are validated together; every
    /// violation is reported.
    pub async fn create_trade(&self, user_id: UserId, command: CreateTrade) -> DaemonResult<Trade> {
        let pair = CurrencyPair::parse(&command.pair)?;
        let direction: Direction = command.direction.parse()?;
        let entry_price = Price::new(command.entry_price)?;
        let lot_size = LotSize::new(command.lot_size)?;
        let stop_loss = command.stop_loss.map(Price::new).transpose()?;
        let take_profit = command.take_profit.map(Price::new).transpose()?;

        self.validator
            .validate_trade_creation(entry_price, stop_loss, take_profit, lot_size, direction)
            .merge(
                self.validator
                    .validate_risk_amount(command.risk_amount, command.account_balance),
            )
            .into_result()?;

        let trade = Trade::open(NewTrade {
            user_id,
            pair,
            direction,
            entry_price,
            lot_size,
            stop_loss,
            take_profit,
            risk_amount: command.risk_amount,
            entry_time: command.entry_time.unwrap_or_else(Utc::now),
            notes: command.notes,
        });

        self.store.trades().save(&trade).await?;

        info!(
            trade_id = %trade.id,
            %user_id,
            pair = %trade.pair,
            direction = %trade.direction,
            lot_size = %trade.lot_size.as_decimal(),
            "Trade recorded"
        );

        Ok(trade)
    }

    /// Get one of the caller's trades.
    pub async fn get_trade(&self, user_id: UserId, trade_id: TradeId) -> DaemonResult<Trade> {
        self.owned_trade(user_id, trade_id).await
    }

    /// List the caller's trades, newest entry first.
    pub async fn list_trades(&self, user_id: UserId, query: TradeQuery) -> DaemonResult<TradePage> {
        let pair = query.pair.as_deref().map(CurrencyPair::parse).transpose()?;

        let mut trades = match query.status {
            Some(status) => {
                self.store
                    .trades()
                    .find_by_user_and_status(user_id, status)
                    .await?
            },
            None => self.store.trades().find_by_user(user_id).await?,
        };

        trades.retain(|t| {
            pair.as_ref().map_or(true, |p| t.pair == *p)
                && query.start_date.map_or(true, |start| t.entry_time >= start)
                && query.end_date.map_or(true, |end| t.entry_time <= end)
        });
        trades.sort_by(|a, b| b.entry_time.cmp(&a.entry_time));

        let page = query.page.filter(|p| *p > 0).unwrap_or(DEFAULT_PAGE);
        let page_size = query.page_size.filter(|s| *s > 0).unwrap_or(DEFAULT_PAGE_SIZE);
        let total = trades.len();
        let total_pages = total.div_ceil(page_size);

        let trades = trades
            .into_iter()
            .skip((page - 1).saturating_mul(page_size))
            .take(page_size)
            .collect();

        Ok(TradePage {
            trades,
            total,
            page,
            page_size,
            total_pages,
        })
    }

    /// Record the exit of a trade and value it.
    ///
    /// The trade is only saved once both the exit and the valuation
    /// succeeded; on any error the stored trade is unchanged. When two closes
    /// race, the first to be stored wins and the other fails with
    /// `StoreError::Conflict`.
    pub async fn close_trade(
        &self,
        user_id: UserId,
        trade_id: TradeId,
        command: CloseTrade,
    ) -> DaemonResult<Trade> {
        let exit_price = Price::new(command.exit_price)?;
        let snapshot = self.owned_trade(user_id, trade_id).await?;
        let mut trade = snapshot.clone();

        if !self
            .validator
            .validate_trade_closing(&trade, exit_price)
            .is_valid()
        {
            return Err(DaemonError::InvalidTradeState {
                id: trade_id,
                state: trade.state().name().to_string(),
            });
        }

        trade.close(exit_price, command.exit_time.unwrap_or_else(Utc::now))?;
        self.analyzer.analyze(&mut trade).await?;
        self.replace_trade(&snapshot, &trade).await?;

        info!(
            %trade_id,
            %user_id,
            status = %trade.status(),
            exit_price = %exit_price,
            "Trade closed"
        );

        Ok(trade)
    }

    /// Replace the notes of a trade.
    pub async fn update_notes(
        &self,
        user_id: UserId,
        trade_id: TradeId,
        notes: Option<String>,
    ) -> DaemonResult<Trade> {
        let snapshot = self.owned_trade(user_id, trade_id).await?;
        let mut trade = snapshot.clone();
        trade.update_notes(notes);
        self.replace_trade(&snapshot, &trade).await?;

        debug!(%trade_id, "Trade notes updated");
        Ok(trade)
    }

    /// Delete a trade.
    pub async fn delete_trade(&self, user_id: UserId, trade_id: TradeId) -> DaemonResult<()> {
        self.owned_trade(user_id, trade_id).await?;
        self.store.trades().delete(trade_id).await?;

        info!(%trade_id, %user_id, "Trade deleted");
        Ok(())
    }

    async fn replace_trade(&self, snapshot: &Trade, updated: &Trade) -> DaemonResult<()> {
        self.store
            .trades()
            .replace(snapshot, updated)
            .await
            .map_err(|e| {
                if matches!(e, StoreError::Conflict { .. }) {
                    warn!(trade_id = %snapshot.id, "Trade modified concurrently, update dropped");
                }
                DaemonError::from(e)
            })
    }

    async fn owned_trade(&self, user_id: UserId, trade_id: TradeId) -> DaemonResult<Trade> {
        match self.store.trades().find_by_id(trade_id).await? {
            Some(trade) if trade.belongs_to(user_id) => Ok(trade),
            Some(_) => {
                warn!(%trade_id, %user_id, "Trade requested by a user who does not own it");
                Err(DaemonError::TradeNotFound(trade_id))
            },
            None => Err(DaemonError::TradeNotFound(trade_id)),
        }
    }

    // =========================================================================
    // Reports
    // =========================================================================

    /// Performance metrics over the caller's trades entered within the
    /// optional bounds.
    pub async fn performance_metrics(
        &self,
        user_id: UserId,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> DaemonResult<PerformanceMetrics> {
        if let (Some(start), Some(end)) = (start, end) {
            if end < start {
                return Err(EngineError::InvalidRange(
                    "End date must be after or equal to start date".to_string(),
                )
                .into());
            }
        }

        let trades: Vec<Trade> = self
            .store
            .trades()
            .find_by_user(user_id)
            .await?
            .into_iter()
            .filter(|t| {
                start.map_or(true, |s| t.entry_time >= s) && end.map_or(true, |e| t.entry_time <= e)
            })
            .collect();

        Ok(self.metrics.calculate(&trades)?)
    }

    /// Generate a report over `[start, end]` and keep it.
    pub async fn generate_report(
        &self,
        user_id: UserId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DaemonResult<TradingReport> {
        let trades = self
            .store
            .trades()
            .find_by_user_and_date_range(user_id, start, end)
            .await?;

        let report = self.reports.generate(user_id, start, end, &trades)?;
        self.store.reports().save(&report).await?;

        Ok(report)
    }

    /// Get one of the caller's reports.
    pub async fn get_report(&self, user_id: UserId, report_id: &ReportId) -> DaemonResult<TradingReport> {
        match self.store.reports().find_by_id(report_id).await? {
            Some(report) if report.belongs_to(user_id) => Ok(report),
            _ => Err(DaemonError::ReportNotFound(report_id.clone())),
        }
    }

    /// The caller's reports, newest first.
    pub async fn list_reports(&self, user_id: UserId) -> DaemonResult<Vec<TradingReport>> {
        Ok(self.store.reports().find_by_user(user_id).await?)
    }
}

// =============================================================================
// Tests
// =============================================================================
