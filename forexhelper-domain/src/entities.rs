//! Domain Entities for the Forex Helper
//!
//! Trades with lifecycle management, and the position size calculation record.
//! All entities have identity and state transitions.

use crate::value_objects::{
    AccountBalance, AccountCurrency, CurrencyPair, Direction, DomainError, LotSize, PipValue,
    Price, PriceMovement, PriceUnit, ProfitLoss, RiskPercentage, StopDistance,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// =============================================================================
// IDs
// =============================================================================

/// Unique identifier for a Trade
pub type TradeId = Uuid;

/// Unique identifier for a User (owner of trades and reports)
pub type UserId = Uuid;

/// Unique identifier for a position size calculation
pub type CalculationId = Uuid;

// =============================================================================
// Trade Status
// =============================================================================

/// Externally visible trade status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeStatus {
    /// Not yet valued
    Open,
    /// Closed with a profit
    Win,
    /// Closed with a loss
    Loss,
    /// Closed flat (within one cent)
    BreakEven,
}

impl TradeStatus {
    /// Status string as used on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeStatus::Open => "OPEN",
            TradeStatus::Win => "WIN",
            TradeStatus::Loss => "LOSS",
            TradeStatus::BreakEven => "BREAK_EVEN",
        }
    }
}

impl FromStr for TradeStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "OPEN" => Ok(TradeStatus::Open),
            "WIN" => Ok(TradeStatus::Win),
            "LOSS" => Ok(TradeStatus::Loss),
            "BREAK_EVEN" | "BREAKEVEN" => Ok(TradeStatus::BreakEven),
            other => Err(DomainError::InvalidValue(format!(
                "Unknown trade status: {}. Expected: OPEN, WIN, LOSS, BREAK_EVEN",
                other
            ))),
        }
    }
}

impl fmt::Display for TradeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of valuing a closed trade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeOutcome {
    /// Profit above one cent
    Win,
    /// Loss above one cent
    Loss,
    /// |P/L| below one cent
    BreakEven,
}

impl TradeOutcome {
    /// Derive the outcome from a realized profit/loss
    ///
    /// Break-even is checked first, so a tiny positive amount is not a win.
    pub fn from_profit_loss(profit_loss: &ProfitLoss) -> Self {
        if profit_loss.is_break_even() {
            TradeOutcome::BreakEven
        } else if profit_loss.is_profit() {
            TradeOutcome::Win
        } else {
            TradeOutcome::Loss
        }
    }
}

impl From<TradeOutcome> for TradeStatus {
    fn from(outcome: TradeOutcome) -> Self {
        match outcome {
            TradeOutcome::Win => TradeStatus::Win,
            TradeOutcome::Loss => TradeStatus::Loss,
            TradeOutcome::BreakEven => TradeStatus::BreakEven,
        }
    }
}

// =============================================================================
// Trade State Machine
// =============================================================================

/// Exit data fixed when the trader closes a trade
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeExit {
    /// Exit price
    pub price: Price,
    /// Exit time
    pub time: DateTime<Utc>,
    /// Signed realized movement (pips, or points for metals)
    pub movement: PriceMovement,
    /// |entry - take profit| / |entry - stop loss|, when both are set
    pub risk_reward_ratio: Option<Decimal>,
}

/// Trade lifecycle
///
/// ```text
/// Open ──close──▶ Exited ──attach_profit_loss──▶ Closed
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TradeState {
    /// Trade running
    Open,

    /// Exit recorded, valuation pending
    Exited {
        /// Exit data
        exit: TradeExit,
    },

    /// Valued; terminal
    Closed {
        /// Exit data
        exit: TradeExit,
        /// Outcome derived from the profit/loss
        outcome: TradeOutcome,
        /// Realized profit/loss in account currency
        profit_loss: ProfitLoss,
    },
}

impl TradeState {
    /// Get the name of the state for display
    pub fn name(&self) -> &str {
        match self {
            TradeState::Open => "open",
            TradeState::Exited { .. } => "exited",
            TradeState::Closed { .. } => "closed",
        }
    }

    /// Reported status
    pub fn status(&self) -> TradeStatus {
        match self {
            TradeState::Open | TradeState::Exited { .. } => TradeStatus::Open,
            TradeState::Closed { outcome, .. } => (*outcome).into(),
        }
    }

    /// Exit data, once the trade has been closed by the trader
    pub fn exit(&self) -> Option<&TradeExit> {
        match self {
            TradeState::Open => None,
            TradeState::Exited { exit } | TradeState::Closed { exit, .. } => Some(exit),
        }
    }
}

// =============================================================================
// Trade
// =============================================================================

/// Input for opening a trade
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTrade {
    /// Owner
    pub user_id: UserId,
    /// Instrument
    pub pair: CurrencyPair,
    /// BUY or SELL
    pub direction: Direction,
    /// Entry price
    pub entry_price: Price,
    /// Volume in lots
    pub lot_size: LotSize,
    /// Optional stop loss price
    pub stop_loss: Option<Price>,
    /// Optional take profit price
    pub take_profit: Option<Price>,
    /// Money at risk on this trade
    pub risk_amount: Decimal,
    /// Entry time
    pub entry_time: DateTime<Utc>,
    /// Free-text notes
    pub notes: Option<String>,
}

/// A journaled trade owned by a single user
///
/// Entry parameters are fixed at creation. Exit data and valuation are held
/// by [`TradeState`] and can only be set through [`Trade::close`] and
/// [`Trade::attach_profit_loss`]. Notes stay editable in every state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    pub id: TradeId,
    pub user_id: UserId,
    pub pair: CurrencyPair,
    pub direction: Direction,

    // Entry parameters
    pub entry_price: Price,
    pub lot_size: LotSize,
    pub stop_loss: Option<Price>,
    pub take_profit: Option<Price>,
    pub risk_amount: Decimal,
    pub entry_time: DateTime<Utc>,

    state: TradeState,
    notes: Option<String>,

    // Audit
    pub created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Trade {
    /// Open a new trade
    pub fn open(new: NewTrade) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            user_id: new.user_id,
            pair: new.pair,
            direction: new.direction,
            entry_price: new.entry_price,
            lot_size: new.lot_size,
            stop_loss: new.stop_loss,
            take_profit: new.take_profit,
            risk_amount: new.risk_amount,
            entry_time: new.entry_time,
            state: TradeState::Open,
            notes: new.notes,
            created_at: now,
            updated_at: now,
        }
    }

    /// Record the exit
    ///
    /// Computes the realized movement (sign-adjusted so a favorable move is
    /// positive) and the risk-reward ratio. Status stays OPEN until a
    /// profit/loss is attached.
    ///
    /// # Errors
    /// Returns `DomainError::InvalidStateTransition` unless the trade is open,
    /// `DomainError::Overflow` if the movement does not fit. The trade is left
    /// untouched on error.
    pub fn close(&mut self, exit_price: Price, exit_time: DateTime<Utc>) -> Result<(), DomainError> {
        if !self.can_close() {
            return Err(DomainError::InvalidStateTransition(format!(
                "Trade {} is already closed",
                self.id
            )));
        }

        let exit = TradeExit {
            price: exit_price,
            time: exit_time,
            movement: self.movement_to(exit_price)?,
            risk_reward_ratio: self.planned_risk_reward(),
        };

        self.state = TradeState::Exited { exit };
        self.touch();
        Ok(())
    }

    /// Attach the realized profit/loss, which fixes the final status
    ///
    /// # Errors
    /// Returns `DomainError::InvalidStateTransition` unless the exit has been
    /// recorded and no profit/loss is attached yet.
    pub fn attach_profit_loss(&mut self, profit_loss: ProfitLoss) -> Result<(), DomainError> {
        let exit = match &self.state {
            TradeState::Exited { exit } => exit.clone(),
            TradeState::Open => {
                return Err(DomainError::InvalidStateTransition(format!(
                    "Trade {} must be closed before profit/loss can be attached",
                    self.id
                )))
            },
            TradeState::Closed { .. } => {
                return Err(DomainError::InvalidStateTransition(format!(
                    "Trade {} already has a profit/loss",
                    self.id
                )))
            },
        };

        let outcome = TradeOutcome::from_profit_loss(&profit_loss);
        self.state = TradeState::Closed {
            exit,
            outcome,
            profit_loss,
        };
        self.touch();
        Ok(())
    }

    /// Replace the notes
    pub fn update_notes(&mut self, notes: Option<String>) {
        self.notes = notes;
        self.touch();
    }

    /// Signed movement from entry to `price`, in the instrument's unit
    ///
    /// # Errors
    /// Returns `DomainError::Overflow` if the movement does not fit
    pub fn movement_to(&self, price: Price) -> Result<PriceMovement, DomainError> {
        let delta = (price.as_decimal() - self.entry_price.as_decimal())
            * self.direction.favorable_sign();

        let unit = self.pair.price_unit();
        let multiplier = match unit {
            PriceUnit::Points => Decimal::ONE_HUNDRED,
            PriceUnit::Pips if self.pair.is_jpy_quoted() => Decimal::ONE_HUNDRED,
            PriceUnit::Pips => Decimal::from(10_000),
        };
        let value = delta
            .checked_mul(multiplier)
            .ok_or_else(|| DomainError::Overflow(format!("movement of {} on {}", delta, self.pair)))?;

        Ok(match unit {
            PriceUnit::Points => PriceMovement::points(value),
            PriceUnit::Pips => PriceMovement::pips(value),
        })
    }

    /// Risk-reward ratio from stop loss and take profit
    ///
    /// `None` if either is missing, the stop sits on the entry price, or the
    /// ratio does not fit in a decimal.
    pub fn planned_risk_reward(&self) -> Option<Decimal> {
        let (stop_loss, take_profit) = (self.stop_loss?, self.take_profit?);
        let risk = self.entry_price.distance_to(&stop_loss);
        if risk.is_zero() {
            return None;
        }
        self.entry_price.distance_to(&take_profit).checked_div(risk)
    }

    /// Current lifecycle state
    pub fn state(&self) -> &TradeState {
        &self.state
    }

    /// Reported status
    pub fn status(&self) -> TradeStatus {
        self.state.status()
    }

    /// Exit data, if the trader has closed the trade
    pub fn exit(&self) -> Option<&TradeExit> {
        self.state.exit()
    }

    /// Exit price
    pub fn exit_price(&self) -> Option<Price> {
        self.exit().map(|e| e.price)
    }

    /// Exit time
    pub fn exit_time(&self) -> Option<DateTime<Utc>> {
        self.exit().map(|e| e.time)
    }

    /// Realized pips (forex only)
    pub fn pips(&self) -> Option<Decimal> {
        self.exit()
            .filter(|e| e.movement.unit() == PriceUnit::Pips)
            .map(|e| e.movement.value())
    }

    /// Realized points (metals only)
    pub fn points(&self) -> Option<Decimal> {
        self.exit()
            .filter(|e| e.movement.unit() == PriceUnit::Points)
            .map(|e| e.movement.value())
    }

    /// Realized risk-reward ratio
    pub fn risk_reward_ratio(&self) -> Option<Decimal> {
        self.exit().and_then(|e| e.risk_reward_ratio)
    }

    /// Attached profit/loss
    pub fn profit_loss(&self) -> Option<&ProfitLoss> {
        match &self.state {
            TradeState::Closed { profit_loss, .. } => Some(profit_loss),
            _ => None,
        }
    }

    /// Notes
    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    /// Last modification time
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Exit can still be recorded
    pub fn can_close(&self) -> bool {
        matches!(self.state, TradeState::Open)
    }

    /// Status is OPEN (includes trades awaiting valuation)
    pub fn is_open(&self) -> bool {
        self.status() == TradeStatus::Open
    }

    /// Valued and terminal
    pub fn is_closed(&self) -> bool {
        matches!(self.state, TradeState::Closed { .. })
    }

    /// Status is WIN
    pub fn is_win(&self) -> bool {
        self.status() == TradeStatus::Win
    }

    /// Status is LOSS
    pub fn is_loss(&self) -> bool {
        self.status() == TradeStatus::Loss
    }

    /// Owned by `user_id`
    pub fn belongs_to(&self, user_id: UserId) -> bool {
        self.user_id == user_id
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

// =============================================================================
// Position Size Calculation
// =============================================================================

/// Auditable record of one position sizing run
///
/// Carries every input next to the outputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionSizeCalculation {
    pub id: CalculationId,
    pub account_balance: AccountBalance,
    pub risk_percentage: RiskPercentage,
    pub stop_distance: StopDistance,
    pub pair: CurrencyPair,
    pub account_currency: AccountCurrency,
    pub current_price: Option<Price>,

    // Outputs
    pub risk_amount: Decimal,
    pub pip_value: PipValue,
    pub lot_size: LotSize,
    pub position_size_units: Decimal,

    pub calculated_at: DateTime<Utc>,
}

// =============================================================================
// Tests
// =============================================================================
