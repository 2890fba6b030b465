//! Value Objects for the Forex Helper Domain
//!
//! Immutable, validated measurement types.
//! All value objects enforce invariants at construction time, so an invalid
//! balance, percentage or distance can never exist.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::tolerance::{approx_eq, is_negligible, Tolerance};

/// Domain errors for value object validation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// Currency code must be three letters
    #[error("Invalid currency: {0}")]
    InvalidCurrency(String),

    /// Currency pair could not be parsed
    #[error("Invalid currency pair: {0}")]
    InvalidCurrencyPair(String),

    /// Price must be positive
    #[error("Invalid price: {0}")]
    InvalidPrice(String),

    /// Account balance must be non-negative
    #[error("Invalid account balance: {0}")]
    InvalidAccountBalance(String),

    /// Risk percentage must be within [0, 100]
    #[error("Invalid risk percentage: {0}")]
    InvalidRiskPercentage(String),

    /// Stop distance must be positive
    #[error("Invalid stop distance: {0}")]
    InvalidStopDistance(String),

    /// Lot size must be non-negative
    #[error("Invalid lot size: {0}")]
    InvalidLotSize(String),

    /// Pip value must be positive
    #[error("Invalid pip value: {0}")]
    InvalidPipValue(String),

    /// Profit/loss sign or currency mismatch
    #[error("Invalid profit/loss: {0}")]
    InvalidProfitLoss(String),

    /// Metric outside its allowed range
    #[error("Invalid metric: {0}")]
    InvalidMetric(String),

    /// Date range end precedes start
    #[error("Invalid date range: {0}")]
    InvalidDateRange(String),

    /// Invalid state transition
    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(String),

    /// Unrecognized enumerated value (direction, status)
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// Result does not fit in the decimal range
    #[error("Arithmetic overflow: {0}")]
    Overflow(String),
}

// =============================================================================
// CurrencyCode
// =============================================================================

/// ISO-style three letter currency code, stored uppercase
///
/// # Invariants
/// - Exactly 3 ASCII letters
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Create a CurrencyCode with validation
    ///
    /// # Errors
    /// Returns `DomainError::InvalidCurrency` unless the code is three letters
    pub fn new(code: &str) -> Result<Self, DomainError> {
        let normalized = code.trim().to_ascii_uppercase();
        if normalized.len() != 3 || !normalized.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(DomainError::InvalidCurrency(format!(
                "Currency must be a 3-letter code (e.g., USD, EUR), got '{}'",
                code
            )));
        }
        Ok(Self(normalized))
    }

    /// US dollar
    pub fn usd() -> Self {
        Self("USD".to_string())
    }

    /// Get the code as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check if this is USD
    pub fn is_usd(&self) -> bool {
        self.0 == "USD"
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<CurrencyCode> for String {
    fn from(value: CurrencyCode) -> Self {
        value.0
    }
}

impl PartialEq<str> for CurrencyCode {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for CurrencyCode {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// AccountCurrency
// =============================================================================

/// Currencies a trading account may be denominated in
pub const SUPPORTED_ACCOUNT_CURRENCIES: &[&str] =
    &["USD", "EUR", "JPY", "GBP", "AUD", "CAD", "CHF", "NZD", "IDR"];

/// Account denomination currency
///
/// # Invariants
/// - One of [`SUPPORTED_ACCOUNT_CURRENCIES`]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountCurrency(CurrencyCode);

impl AccountCurrency {
    /// Create an AccountCurrency with validation
    ///
    /// # Errors
    /// Returns `DomainError::InvalidCurrency` for unsupported currencies
    pub fn new(code: &str) -> Result<Self, DomainError> {
        let currency = CurrencyCode::new(code)?;
        if !SUPPORTED_ACCOUNT_CURRENCIES.contains(&currency.as_str()) {
            return Err(DomainError::InvalidCurrency(format!(
                "Unsupported currency: {}. Supported currencies: {}",
                code,
                SUPPORTED_ACCOUNT_CURRENCIES.join(", ")
            )));
        }
        Ok(Self(currency))
    }

    /// USD account
    pub fn usd() -> Self {
        Self(CurrencyCode::usd())
    }

    /// Check if a code is a supported account currency
    pub fn is_supported(code: &str) -> bool {
        SUPPORTED_ACCOUNT_CURRENCIES.contains(&code.trim().to_ascii_uppercase().as_str())
    }

    /// Get the underlying currency code
    pub fn code(&self) -> &CurrencyCode {
        &self.0
    }

    /// Get the code as a string slice
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for AccountCurrency {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<AccountCurrency> for String {
    fn from(value: AccountCurrency) -> Self {
        value.0.into()
    }
}

impl fmt::Display for AccountCurrency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// CurrencyPair
// =============================================================================

const METAL_PAIR: &str = "XAUUSD";

const MAJOR_PAIRS: &[&str] = &["EURUSD", "GBPUSD", "AUDUSD", "NZDUSD", "USDJPY", "USDCHF", "USDCAD"];

const CROSS_PAIRS: &[&str] = &[
    "EURJPY", "EURGBP", "EURCHF", "GBPJPY", "GBPCHF", "AUDJPY", "AUDCHF", "CADJPY", "CHFJPY",
    "NZDJPY",
];

/// Instrument classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PairKind {
    /// USD paired with another major currency
    Major,
    /// Anything else that is not a metal
    Cross,
    /// Gold against USD
    Metal,
}

impl FromStr for PairKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "major" => Ok(PairKind::Major),
            "cross" => Ok(PairKind::Cross),
            "metal" => Ok(PairKind::Metal),
            other => Err(DomainError::InvalidCurrencyPair(format!(
                "Unknown pair kind: {}. Expected: major, cross, metal",
                other
            ))),
        }
    }
}

impl fmt::Display for PairKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PairKind::Major => write!(f, "major"),
            PairKind::Cross => write!(f, "cross"),
            PairKind::Metal => write!(f, "metal"),
        }
    }
}

/// Tradable instrument (e.g., EURUSD, XAUUSD)
///
/// # Invariants
/// - Stored as base + quote, uppercase, without separator
/// - Six letters, or the metal symbol XAUUSD
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyPair {
    base: CurrencyCode,
    quote: CurrencyCode,
    kind: PairKind,
}

impl CurrencyPair {
    /// Parse a currency pair
    ///
    /// # Examples
    /// ```
    /// # use forexhelper_domain::value_objects::{CurrencyPair, PairKind};
    /// let pair = CurrencyPair::parse("eur/usd").unwrap();
    /// assert_eq!(pair.as_pair(), "EURUSD");
    /// assert_eq!(pair.kind(), PairKind::Major);
    /// ```
    ///
    /// # Errors
    /// Returns `DomainError::InvalidCurrencyPair` if the format is invalid
    pub fn parse(pair: &str) -> Result<Self, DomainError> {
        let normalized = pair.trim().to_ascii_uppercase().replace('/', "");

        if normalized == METAL_PAIR {
            return Ok(Self {
                base: CurrencyCode("XAU".to_string()),
                quote: CurrencyCode::usd(),
                kind: PairKind::Metal,
            });
        }

        if normalized.len() != 6 || !normalized.is_ascii() {
            return Err(DomainError::InvalidCurrencyPair(format!(
                "Invalid currency pair format: {}. Expected format: XXXYYY (e.g., EURUSD)",
                pair
            )));
        }

        let invalid = |_| {
            DomainError::InvalidCurrencyPair(format!("Invalid currency codes in pair: {}", pair))
        };
        let base = CurrencyCode::new(&normalized[..3]).map_err(invalid)?;
        let quote = CurrencyCode::new(&normalized[3..]).map_err(invalid)?;

        if base == quote {
            return Err(DomainError::InvalidCurrencyPair(format!(
                "Base and quote must differ: {}",
                pair
            )));
        }

        let kind = if MAJOR_PAIRS.contains(&normalized.as_str()) {
            PairKind::Major
        } else {
            PairKind::Cross
        };

        Ok(Self { base, quote, kind })
    }

    /// All instruments offered by the lot calculator
    pub fn catalog() -> Vec<CurrencyPair> {
        MAJOR_PAIRS
            .iter()
            .chain(CROSS_PAIRS.iter())
            .chain(std::iter::once(&METAL_PAIR))
            .filter_map(|p| Self::parse(p).ok())
            .collect()
    }

    /// Catalogue filtered by kind (`None` returns everything)
    pub fn catalog_by_kind(kind: Option<PairKind>) -> Vec<CurrencyPair> {
        Self::catalog()
            .into_iter()
            .filter(|p| kind.map_or(true, |k| p.kind == k))
            .collect()
    }

    /// Get the base currency
    pub fn base(&self) -> &CurrencyCode {
        &self.base
    }

    /// Get the quote currency
    pub fn quote(&self) -> &CurrencyCode {
        &self.quote
    }

    /// Get the classification
    pub fn kind(&self) -> PairKind {
        self.kind
    }

    /// Get the pair as string (e.g., "EURUSD")
    pub fn as_pair(&self) -> String {
        format!("{}{}", self.base, self.quote)
    }

    /// Display form with separator (e.g., "EUR/USD")
    pub fn display_name(&self) -> String {
        format!("{}/{}", self.base, self.quote)
    }

    /// Gold
    pub fn is_metal(&self) -> bool {
        self.kind == PairKind::Metal
    }

    /// XXX/USD: quote is USD, base is not
    pub fn is_usd_quoted(&self) -> bool {
        self.quote.is_usd() && !self.base.is_usd()
    }

    /// USD/XXX: base is USD, quote is not
    pub fn is_usd_based(&self) -> bool {
        self.base.is_usd() && !self.quote.is_usd()
    }

    /// Neither side is USD
    pub fn is_cross(&self) -> bool {
        !self.base.is_usd() && !self.quote.is_usd() && !self.is_metal()
    }

    /// Quote currency is JPY (pip = 0.01)
    pub fn is_jpy_quoted(&self) -> bool {
        self.quote == "JPY"
    }

    /// Unit used to measure price movement on this instrument
    pub fn price_unit(&self) -> PriceUnit {
        if self.is_metal() {
            PriceUnit::Points
        } else {
            PriceUnit::Pips
        }
    }
}

impl TryFrom<String> for CurrencyPair {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CurrencyPair> for String {
    fn from(value: CurrencyPair) -> Self {
        value.as_pair()
    }
}

impl fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_pair())
    }
}

// =============================================================================
// Price
// =============================================================================

/// Price represents a positive decimal price
///
/// # Invariants
/// - Must be > 0
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Price(Decimal);

impl Price {
    /// Create a new Price with validation
    ///
    /// # Errors
    /// Returns `DomainError::InvalidPrice` if value <= 0
    pub fn new(value: Decimal) -> Result<Self, DomainError> {
        if value <= Decimal::ZERO {
            return Err(DomainError::InvalidPrice("Price must be positive".to_string()));
        }
        Ok(Self(value))
    }

    /// Get the underlying Decimal value
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// Absolute distance to another price
    pub fn distance_to(&self, other: &Price) -> Decimal {
        (self.0 - other.0).abs()
    }

    /// Equality within price tolerance
    pub fn approx_eq(&self, other: &Price) -> bool {
        approx_eq(self.0, other.0, Tolerance::Price)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.5}", self.0)
    }
}

// =============================================================================
// Direction
// =============================================================================

/// Trade direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    /// Long (profit when price rises)
    Buy,
    /// Short (profit when price falls)
    Sell,
}

impl Direction {
    /// Sign that turns a raw price delta into a favorable-positive delta
    ///
    /// Buy → +1, Sell → -1
    pub fn favorable_sign(&self) -> Decimal {
        match self {
            Direction::Buy => Decimal::ONE,
            Direction::Sell => Decimal::NEGATIVE_ONE,
        }
    }
}

impl FromStr for Direction {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BUY" | "LONG" => Ok(Direction::Buy),
            "SELL" | "SHORT" => Ok(Direction::Sell),
            other => Err(DomainError::InvalidValue(format!(
                "Invalid direction: {}. Expected: BUY or SELL",
                other
            ))),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Buy => write!(f, "BUY"),
            Direction::Sell => write!(f, "SELL"),
        }
    }
}

// =============================================================================
// Pips / Points
// =============================================================================

/// Unit of price movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceUnit {
    /// Forex pip (0.0001, or 0.01 on JPY-quoted pairs)
    Pips,
    /// Metal point
    Points,
}

impl FromStr for PriceUnit {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pips" | "pip" => Ok(PriceUnit::Pips),
            "points" | "point" => Ok(PriceUnit::Points),
            other => Err(DomainError::InvalidStopDistance(format!(
                "Unit must be 'pips' or 'points', got '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for PriceUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriceUnit::Pips => write!(f, "pips"),
            PriceUnit::Points => write!(f, "points"),
        }
    }
}

/// Signed realized movement of a trade, positive when favorable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceMovement {
    value: Decimal,
    unit: PriceUnit,
}

impl PriceMovement {
    /// Movement measured in pips
    pub fn pips(value: Decimal) -> Self {
        Self { value, unit: PriceUnit::Pips }
    }

    /// Movement measured in points
    pub fn points(value: Decimal) -> Self {
        Self { value, unit: PriceUnit::Points }
    }

    /// Signed value
    pub fn value(&self) -> Decimal {
        self.value
    }

    /// Unit
    pub fn unit(&self) -> PriceUnit {
        self.unit
    }

    /// Absolute value
    pub fn abs(&self) -> Decimal {
        self.value.abs()
    }
}

impl fmt::Display for PriceMovement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.value >= Decimal::ZERO { "+" } else { "" };
        write!(f, "{}{:.2} {}", sign, self.value, self.unit)
    }
}

// =============================================================================
// AccountBalance
// =============================================================================

/// Account balance in a specific currency
///
/// # Invariants
/// - Amount >= 0
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBalance {
    amount: Decimal,
    currency: CurrencyCode,
}

impl AccountBalance {
    /// Create an AccountBalance with validation
    ///
    /// # Errors
    /// Returns `DomainError::InvalidAccountBalance` if amount < 0, or
    /// `DomainError::InvalidCurrency` for a malformed currency code
    pub fn new(amount: Decimal, currency: &str) -> Result<Self, DomainError> {
        if amount < Decimal::ZERO {
            return Err(DomainError::InvalidAccountBalance(
                "Account balance cannot be negative".to_string(),
            ));
        }
        Ok(Self {
            amount,
            currency: CurrencyCode::new(currency)?,
        })
    }

    /// Get the amount
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    /// Get the currency
    pub fn currency(&self) -> &CurrencyCode {
        &self.currency
    }
}

impl fmt::Display for AccountBalance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:.2}", self.currency, self.amount)
    }
}

// =============================================================================
// RiskPercentage
// =============================================================================

/// Share of the account balance put at risk on one trade
///
/// ```
/// # use forexhelper_domain::value_objects::RiskPercentage;
/// # use rust_decimal_macros::dec;
/// let risk = RiskPercentage::new(dec!(2)).unwrap();
/// assert_eq!(risk.risk_amount(dec!(10000)), dec!(200));
/// ```
///
/// # Invariants
/// - 0 <= value <= 100
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RiskPercentage(Decimal);

impl RiskPercentage {
    /// Create a RiskPercentage with validation
    ///
    /// # Errors
    /// Returns `DomainError::InvalidRiskPercentage` outside [0, 100]
    pub fn new(value: Decimal) -> Result<Self, DomainError> {
        if value < Decimal::ZERO || value > Decimal::ONE_HUNDRED {
            return Err(DomainError::InvalidRiskPercentage(
                "Risk percentage must be between 0 and 100".to_string(),
            ));
        }
        Ok(Self(value))
    }

    /// Percentage value (0-100)
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// Fraction (0-1)
    pub fn as_fraction(&self) -> Decimal {
        self.0 / Decimal::ONE_HUNDRED
    }

    /// Amount at risk for a given balance
    pub fn risk_amount(&self, balance: Decimal) -> Decimal {
        balance * self.as_fraction()
    }
}

impl fmt::Display for RiskPercentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0.normalize())
    }
}

// =============================================================================
// StopDistance
// =============================================================================

/// Distance from entry to stop, in pips (forex) or points (metal)
///
/// # Invariants
/// - Value > 0
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopDistance {
    value: Decimal,
    unit: PriceUnit,
}

impl StopDistance {
    /// Create a StopDistance with validation
    ///
    /// # Errors
    /// Returns `DomainError::InvalidStopDistance` if value <= 0
    pub fn new(value: Decimal, unit: PriceUnit) -> Result<Self, DomainError> {
        if value <= Decimal::ZERO {
            return Err(DomainError::InvalidStopDistance(
                "Stop loss must be greater than 0".to_string(),
            ));
        }
        Ok(Self { value, unit })
    }

    /// Stop distance in pips
    pub fn in_pips(value: Decimal) -> Result<Self, DomainError> {
        Self::new(value, PriceUnit::Pips)
    }

    /// Stop distance in points
    pub fn in_points(value: Decimal) -> Result<Self, DomainError> {
        Self::new(value, PriceUnit::Points)
    }

    /// Distance value
    pub fn value(&self) -> Decimal {
        self.value
    }

    /// Distance unit
    pub fn unit(&self) -> PriceUnit {
        self.unit
    }
}

impl fmt::Display for StopDistance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value.normalize(), self.unit)
    }
}

// =============================================================================
// LotSize
// =============================================================================

/// Lot size classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LotClass {
    /// >= 1 lot
    Standard,
    /// >= 0.1 lot
    Mini,
    /// >= 0.01 lot
    Micro,
    /// Below one micro lot
    Fractional,
}

/// Position volume in standard lots
///
/// # Invariants
/// - Value >= 0
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LotSize(Decimal);

impl LotSize {
    /// Units of base currency in one standard lot
    pub const STANDARD_CONTRACT_SIZE: u32 = 100_000;

    /// Create a LotSize with validation
    ///
    /// # Errors
    /// Returns `DomainError::InvalidLotSize` if value < 0
    pub fn new(value: Decimal) -> Result<Self, DomainError> {
        if value < Decimal::ZERO {
            return Err(DomainError::InvalidLotSize("Lot size cannot be negative".to_string()));
        }
        Ok(Self(value))
    }

    /// Zero lots
    pub fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    /// Get the underlying Decimal value
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// Position size in units for a standard (100,000) contract
    ///
    /// # Errors
    /// Returns `DomainError::Overflow` if the unit count does not fit
    pub fn position_units(&self) -> Result<Decimal, DomainError> {
        self.position_units_with_contract(Decimal::from(Self::STANDARD_CONTRACT_SIZE))
    }

    /// Position size in units for a custom contract size
    pub fn position_units_with_contract(&self, contract_size: Decimal) -> Result<Decimal, DomainError> {
        self.0
            .checked_mul(contract_size)
            .ok_or_else(|| DomainError::Overflow(format!("{} lots in units", self.0)))
    }

    /// Lot classification
    pub fn class(&self) -> LotClass {
        if self.0 >= Decimal::ONE {
            LotClass::Standard
        } else if self.0 >= Decimal::new(1, 1) {
            LotClass::Mini
        } else if self.0 >= Decimal::new(1, 2) {
            LotClass::Micro
        } else {
            LotClass::Fractional
        }
    }

    /// Equality within ratio tolerance
    pub fn approx_eq(&self, other: &LotSize) -> bool {
        approx_eq(self.0, other.0, Tolerance::Ratio)
    }
}

impl fmt::Display for LotSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let suffix = if self.0 == Decimal::ONE { "" } else { "s" };
        write!(f, "{:.2} lot{}", self.0, suffix)
    }
}

// =============================================================================
// PipValue
// =============================================================================

/// Monetary value of one pip (or point) per standard lot
///
/// # Invariants
/// - Value > 0
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipValue {
    value: Decimal,
    currency: CurrencyCode,
}

impl PipValue {
    /// Create a PipValue with validation
    ///
    /// # Errors
    /// Returns `DomainError::InvalidPipValue` if value <= 0
    pub fn new(value: Decimal, currency: CurrencyCode) -> Result<Self, DomainError> {
        if value <= Decimal::ZERO {
            return Err(DomainError::InvalidPipValue(
                "Pip value must be greater than 0".to_string(),
            ));
        }
        Ok(Self { value, currency })
    }

    /// Value per standard lot
    pub fn value(&self) -> Decimal {
        self.value
    }

    /// Currency of the value
    pub fn currency(&self) -> &CurrencyCode {
        &self.currency
    }

    /// Value of one pip for the given number of lots
    pub fn for_lot_size(&self, lots: Decimal) -> Result<Decimal, DomainError> {
        self.value
            .checked_mul(lots)
            .ok_or_else(|| DomainError::Overflow(format!("pip value for {} lots", lots)))
    }

    /// Equality within money tolerance (same currency required)
    pub fn approx_eq(&self, other: &PipValue) -> bool {
        self.currency == other.currency && approx_eq(self.value, other.value, Tolerance::Money)
    }
}

impl fmt::Display for PipValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:.2} per lot", self.currency, self.value)
    }
}

// =============================================================================
// ProfitLoss
// =============================================================================

/// Realized profit (positive) or loss (negative) in a currency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfitLoss {
    amount: Decimal,
    currency: CurrencyCode,
}

impl ProfitLoss {
    /// Create from a signed amount
    pub fn new(amount: Decimal, currency: CurrencyCode) -> Self {
        Self { amount, currency }
    }

    /// Create a profit
    ///
    /// # Errors
    /// Returns `DomainError::InvalidProfitLoss` if amount < 0
    pub fn profit(amount: Decimal, currency: CurrencyCode) -> Result<Self, DomainError> {
        if amount < Decimal::ZERO {
            return Err(DomainError::InvalidProfitLoss(
                "Profit amount cannot be negative".to_string(),
            ));
        }
        Ok(Self { amount, currency })
    }

    /// Create a loss
    ///
    /// # Errors
    /// Returns `DomainError::InvalidProfitLoss` if amount > 0
    pub fn loss(amount: Decimal, currency: CurrencyCode) -> Result<Self, DomainError> {
        if amount > Decimal::ZERO {
            return Err(DomainError::InvalidProfitLoss(
                "Loss amount cannot be positive".to_string(),
            ));
        }
        Ok(Self { amount, currency })
    }

    /// Signed amount
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    /// Currency
    pub fn currency(&self) -> &CurrencyCode {
        &self.currency
    }

    /// Amount > 0
    pub fn is_profit(&self) -> bool {
        self.amount > Decimal::ZERO
    }

    /// Amount < 0
    pub fn is_loss(&self) -> bool {
        self.amount < Decimal::ZERO
    }

    /// |amount| below the money tolerance
    pub fn is_break_even(&self) -> bool {
        is_negligible(self.amount, Tolerance::Money)
    }

    /// Absolute amount
    pub fn abs(&self) -> Decimal {
        self.amount.abs()
    }

    /// Sum of two amounts in the same currency
    ///
    /// # Errors
    /// Returns `DomainError::InvalidProfitLoss` on currency mismatch
    pub fn checked_add(&self, other: &ProfitLoss) -> Result<ProfitLoss, DomainError> {
        if self.currency != other.currency {
            return Err(DomainError::InvalidProfitLoss(format!(
                "Cannot add profit/loss with different currencies ({} and {})",
                self.currency, other.currency
            )));
        }
        Ok(Self::new(self.amount + other.amount, self.currency.clone()))
    }

    /// Equality within money tolerance (same currency required)
    pub fn approx_eq(&self, other: &ProfitLoss) -> bool {
        self.currency == other.currency && approx_eq(self.amount, other.amount, Tolerance::Money)
    }
}

impl fmt::Display for ProfitLoss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.amount >= Decimal::ZERO { "+" } else { "" };
        write!(f, "{}{} {:.2}", sign, self.currency, self.amount)
    }
}

// =============================================================================
// Tests
// =============================================================================
