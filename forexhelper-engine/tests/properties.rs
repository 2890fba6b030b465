//! End-to-end checks of the sizing and analytics rules.
//!
//! The "for all" rules run as proptest properties over generated balances,
//! risks, stops and prices; fixed scenarios stay plain tests.

use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use forexhelper_domain::{
    approx_eq, AccountBalance, AccountCurrency, CurrencyPair, Direction, DomainError, LotSize,
    NewTrade, Price, ProfitFactor, RiskPercentage, StopDistance, Tolerance, Trade, TradeStatus,
};
use forexhelper_engine::{
    implied_risk, CurrencyConverter, EngineError, MetricsCalculator, PipValueResolver,
    PositionSizeRequest, PositionSizer, ReportGenerator, StaticRateProvider, TradeAnalyzer,
};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

/// Pairs whose pip value resolves for every account in [`ACCOUNTS`]
const PAIRS: &[&str] = &[
    "EURUSD", "GBPUSD", "USDJPY", "USDCHF", "XAUUSD", "EURJPY", "GBPJPY", "CHFJPY",
];

const ACCOUNTS: &[&str] = &["USD", "JPY"];

fn converter() -> CurrencyConverter {
    let provider = StaticRateProvider::new()
        .with_rate("USD", "JPY", dec!(150))
        .with_rate("USD", "CHF", dec!(0.9))
        .with_rate("CHF", "JPY", dec!(166))
        .with_rate("EUR", "USD", dec!(1.08))
        .with_rate("GBP", "USD", dec!(1.27));
    CurrencyConverter::new(Arc::new(provider))
}

fn resolver() -> PipValueResolver {
    PipValueResolver::new(converter())
}

fn block_on<F: Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
        .block_on(future)
}

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 3, 8, 0, 0).unwrap()
}

fn request(
    pair: &CurrencyPair,
    account: &AccountCurrency,
    balance: Decimal,
    risk: Decimal,
    stop: Decimal,
    price: Decimal,
) -> PositionSizeRequest {
    PositionSizeRequest {
        account_balance: AccountBalance::new(balance, account.as_str()).unwrap(),
        risk_percentage: RiskPercentage::new(risk).unwrap(),
        stop_distance: StopDistance::new(stop, pair.price_unit()).unwrap(),
        pair: pair.clone(),
        account_currency: account.clone(),
        current_price: Some(Price::new(price).unwrap()),
    }
}

/// EURUSD trades moved by the given pips, valued for a USD account.
async fn valued_trades(moves_in_pips: &[Decimal]) -> Vec<Trade> {
    let analyzer = TradeAnalyzer::new(resolver(), converter(), AccountCurrency::usd());
    let mut trades = Vec::new();
    for (i, pips) in moves_in_pips.iter().enumerate() {
        let entry = dec!(1.1000);
        let mut trade = Trade::open(NewTrade {
            user_id: Uuid::nil(),
            pair: CurrencyPair::parse("EURUSD").unwrap(),
            direction: Direction::Buy,
            entry_price: Price::new(entry).unwrap(),
            lot_size: LotSize::new(dec!(1)).unwrap(),
            stop_loss: None,
            take_profit: None,
            risk_amount: dec!(100),
            entry_time: start() + Duration::hours(i as i64),
            notes: None,
        });
        let exit = entry + *pips / dec!(10000);
        trade
            .close(Price::new(exit).unwrap(), start() + Duration::hours(i as i64) + Duration::minutes(30))
            .unwrap();
        analyzer.analyze(&mut trade).await.unwrap();
        trades.push(trade);
    }
    trades
}

// =============================================================================
// Strategies
// =============================================================================

/// 0.01 ..= 100,000,000.00
fn balance() -> impl Strategy<Value = Decimal> {
    (1i64..=10_000_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

/// 0.01% ..= 100%
fn risk() -> impl Strategy<Value = Decimal> {
    (1i64..=10_000).prop_map(|bp| Decimal::new(bp, 2))
}

/// 0.1 ..= 100,000 pips or points
fn stop() -> impl Strategy<Value = Decimal> {
    (1i64..=1_000_000).prop_map(|tenths| Decimal::new(tenths, 1))
}

/// 0.5 ..= 200
fn price() -> impl Strategy<Value = Decimal> {
    (5_000i64..=2_000_000).prop_map(|m| Decimal::new(m, 4))
}

fn pair_and_account() -> impl Strategy<Value = (CurrencyPair, AccountCurrency)> {
    (prop::sample::select(PAIRS), prop::sample::select(ACCOUNTS)).prop_map(|(pair, account)| {
        (
            CurrencyPair::parse(pair).unwrap(),
            AccountCurrency::new(account).unwrap(),
        )
    })
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn zero_risk_always_sizes_to_zero(
        balance in balance(),
        stop in stop(),
        price in price(),
        (pair, account) in pair_and_account(),
    ) {
        let sizer = PositionSizer::new(resolver());
        let calc = block_on(sizer.size(request(&pair, &account, balance, Decimal::ZERO, stop, price)))
            .unwrap();

        prop_assert_eq!(calc.lot_size.as_decimal(), Decimal::ZERO);
        prop_assert_eq!(calc.risk_amount, Decimal::ZERO);
    }

    #[test]
    fn sized_position_risks_exactly_the_budget(
        balance in balance(),
        risk in risk(),
        stop in stop(),
        price in price(),
        (pair, account) in pair_and_account(),
    ) {
        let sizer = PositionSizer::new(resolver());
        let calc = block_on(sizer.size(request(&pair, &account, balance, risk, stop, price))).unwrap();

        let diff = (implied_risk(&calc).unwrap() - calc.risk_amount).abs();
        prop_assert!(diff < dec!(0.000001), "{}/{}: diff {}", pair, account.as_str(), diff);
    }

    #[test]
    fn eurusd_usd_account_pip_value_ignores_price(price in price()) {
        let pair = CurrencyPair::parse("EURUSD").unwrap();
        let pv = block_on(resolver().resolve(&pair, &AccountCurrency::usd(), Some(Price::new(price).unwrap())))
            .unwrap();
        prop_assert_eq!(pv.value(), dec!(10));
    }

    #[test]
    fn extreme_stops_and_prices_fail_without_panicking(
        stop_mantissa in 1i64..=1_000,
        stop_scale in 20u32..=28,
        price_mantissa in 1i64..=1_000,
        price_scale in 20u32..=28,
        (pair, account) in pair_and_account(),
    ) {
        let stop = Decimal::new(stop_mantissa, stop_scale);
        let price = Decimal::new(price_mantissa, price_scale);
        let sizer = PositionSizer::new(resolver());

        match block_on(sizer.size(request(&pair, &account, dec!(10000), dec!(1), stop, price))) {
            Ok(calc) => prop_assert!(calc.lot_size.as_decimal() >= Decimal::ZERO),
            Err(EngineError::Overflow(_)) | Err(EngineError::Domain(DomainError::Overflow(_))) => {},
            Err(other) => prop_assert!(false, "unexpected error: {}", other),
        }
    }

    #[test]
    fn profit_loss_sign_matches_outcome(
        buy in any::<bool>(),
        entry in price(),
        exit in price(),
        lots in (1i64..=10_000).prop_map(|m| Decimal::new(m, 2)),
    ) {
        let direction = if buy { Direction::Buy } else { Direction::Sell };
        let mut trade = Trade::open(NewTrade {
            user_id: Uuid::nil(),
            pair: CurrencyPair::parse("EURUSD").unwrap(),
            direction,
            entry_price: Price::new(entry).unwrap(),
            lot_size: LotSize::new(lots).unwrap(),
            stop_loss: None,
            take_profit: None,
            risk_amount: dec!(100),
            entry_time: start(),
            notes: None,
        });
        trade.close(Price::new(exit).unwrap(), start() + Duration::hours(1)).unwrap();

        let analyzer = TradeAnalyzer::new(resolver(), converter(), AccountCurrency::usd());
        block_on(analyzer.analyze(&mut trade)).unwrap();

        let amount = trade.profit_loss().unwrap().amount();
        let pips = trade.pips().unwrap();
        match trade.status() {
            TradeStatus::Win => {
                prop_assert!(amount >= dec!(0.01));
                prop_assert!(pips > Decimal::ZERO);
            },
            TradeStatus::Loss => {
                prop_assert!(amount <= dec!(-0.01));
                prop_assert!(pips < Decimal::ZERO);
            },
            TradeStatus::BreakEven => prop_assert!(amount.abs() < dec!(0.01)),
            TradeStatus::Open => prop_assert!(false, "valued trade reported OPEN"),
        }
    }

    #[test]
    fn inverted_report_range_always_fails(
        gap_minutes in 1i64..=525_600,
        moves in prop::collection::vec(-500i64..=500, 0..8),
    ) {
        let moves: Vec<Decimal> = moves.into_iter().map(Decimal::from).collect();
        let trades = block_on(valued_trades(&moves));
        let end = start() - Duration::minutes(gap_minutes);

        let err = ReportGenerator::default()
            .generate(Uuid::nil(), start(), end, &trades)
            .unwrap_err();
        prop_assert!(matches!(err, EngineError::InvalidRange(_)));
    }
}

// =============================================================================
// Scenarios
// =============================================================================

#[tokio::test]
async fn gold_point_value_is_one() {
    let pair = CurrencyPair::parse("XAUUSD").unwrap();
    let pv = resolver().resolve(&pair, &AccountCurrency::usd(), None).await.unwrap();
    assert_eq!(pv.value(), dec!(1));
}

#[tokio::test]
async fn usdjpy_pip_value_at_150() {
    let pair = CurrencyPair::parse("USDJPY").unwrap();
    let pv = resolver()
        .resolve(&pair, &AccountCurrency::usd(), Some(Price::new(dec!(150)).unwrap()))
        .await
        .unwrap();
    let expected = dec!(10) / dec!(150);
    assert!((pv.value() - expected).abs() < dec!(0.000000001));
}

#[tokio::test]
async fn second_close_is_rejected_and_keeps_first_exit() {
    let mut trades = valued_trades(&[dec!(25)]).await;
    let trade = &mut trades[0];
    let before = trade.clone();

    let err = trade.close(Price::new(dec!(1.5)).unwrap(), Utc::now()).unwrap_err();
    assert!(matches!(err, DomainError::InvalidStateTransition(_)));
    assert_eq!(*trade, before);
    assert_eq!(trade.pips(), Some(dec!(25)));
}

#[tokio::test]
async fn three_winners_have_infinite_profit_factor() {
    // 100 / 200 / 150 USD at 10 USD per 10 pips per lot
    let trades = valued_trades(&[dec!(100), dec!(200), dec!(150)]).await;
    let profits: Vec<_> = trades.iter().map(|t| t.profit_loss().unwrap().amount()).collect();
    assert_eq!(profits, vec![dec!(100), dec!(200), dec!(150)]);

    let metrics = MetricsCalculator::new().calculate(&trades).unwrap();
    assert_eq!(metrics.win_rate.as_decimal(), dec!(100));
    assert_eq!(metrics.profit_factor, ProfitFactor::Infinite);
    assert_eq!(metrics.average_loss, Decimal::ZERO);
}

#[tokio::test]
async fn alternating_results_have_unit_streaks() {
    let trades = valued_trades(&[dec!(100), dec!(-50), dec!(200), dec!(-75)]).await;
    let metrics = MetricsCalculator::new().calculate(&trades).unwrap();
    assert_eq!(metrics.longest_winning_streak, 1);
    assert_eq!(metrics.total_profit_loss, dec!(175));
    assert_eq!(trades[1].status(), TradeStatus::Loss);
}

#[tokio::test]
async fn drawdown_measured_from_prior_peak() {
    // Cumulative 100, 300, 150, 400
    let trades = valued_trades(&[dec!(100), dec!(200), dec!(-150), dec!(250)]).await;
    let metrics = MetricsCalculator::new().calculate(&trades).unwrap();
    assert!(approx_eq(metrics.max_drawdown.percentage(), dec!(50), Tolerance::Ratio));
    assert!(approx_eq(metrics.max_drawdown.amount(), dec!(150), Tolerance::Money));
}

#[test]
fn inverted_report_range_fails_for_empty_set() {
    let end = start() - Duration::days(1);
    let err = ReportGenerator::default()
        .generate(Uuid::nil(), start(), end, &[])
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidRange(_)));
}
