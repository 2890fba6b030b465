//! HTTP API for the Forex Helper daemon.
//!
//! Provides REST endpoints for:
//! - Health check
//! - Lot calculator (position size, pip value, pairs)
//! - Trade history (record, list, close, notes, delete)
//! - Reports (metrics, generate, list, get)
//!
//! Every endpoint except health and the read-only calculator lookups needs
//! the caller's identity in the `x-user-id` header.

use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Path, Query, State},
    http::{request::Parts, StatusCode},
    routing::{get, patch, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use forexhelper_domain::{
    CurrencyPair, Direction, DomainError, PairKind, PerformanceMetrics, PositionSizeCalculation,
    PriceUnit, Trade, TradeStatus, TradingReport, UserId,
};
use forexhelper_engine::EngineError;
use forexhelper_store::{Store, StoreError};

use crate::error::DaemonError;
use crate::journal::{
    CalculatePositionSize, CloseTrade, CreateTrade, JournalService, PipValueQuote, TradePage,
    TradeQuery,
};

/// Header carrying the caller's user id
pub const USER_ID_HEADER: &str = "x-user-id";

// =============================================================================
// API State
// =============================================================================

/// Shared state for API handlers.
pub struct ApiState<S: Store + 'static> {
    pub journal: Arc<JournalService<S>>,
}

// =============================================================================
// Caller identity
// =============================================================================

/// Authenticated caller, taken from the `x-user-id` header.
#[derive(Debug, Clone, Copy)]
pub struct Caller(pub UserId);

#[async_trait]
impl<T: Send + Sync> FromRequestParts<T> for Caller {
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request_parts(parts: &mut Parts, _state: &T) -> Result<Self, Self::Rejection> {
        let value = parts.headers.get(USER_ID_HEADER).ok_or_else(|| {
            to_error_response(DaemonError::Unauthorized(format!("missing {} header", USER_ID_HEADER)))
        })?;

        value
            .to_str()
            .ok()
            .and_then(|v| Uuid::parse_str(v.trim()).ok())
            .map(Caller)
            .ok_or_else(|| {
                to_error_response(DaemonError::Unauthorized(format!(
                    "{} must be a UUID",
                    USER_ID_HEADER
                )))
            })
    }
}

// =============================================================================
// Request/Response Types
// =============================================================================

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    /// Individual rule violations
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
}

/// Query of the pip value endpoint.
#[derive(Debug, Deserialize)]
pub struct PipValueParams {
    pub currency_pair: String,
    pub account_currency: String,
    pub current_price: Option<Decimal>,
}

/// Query of the pairs endpoint.
#[derive(Debug, Deserialize)]
pub struct PairsParams {
    #[serde(rename = "type")]
    pub kind: Option<PairKind>,
}

/// A supported currency pair.
#[derive(Debug, Serialize)]
pub struct PairSummary {
    pub pair: String,
    pub display_name: String,
    pub base: String,
    pub quote: String,
    pub kind: PairKind,
    pub unit: PriceUnit,
}

/// Pairs response.
#[derive(Debug, Serialize)]
pub struct PairsResponse {
    pub pairs: Vec<PairSummary>,
}

/// Body of the notes endpoint.
#[derive(Debug, Deserialize)]
pub struct UpdateNotesRequest {
    pub notes: Option<String>,
}

/// Query of the metrics endpoint.
#[derive(Debug, Deserialize)]
pub struct MetricsParams {
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

/// Body of the report endpoint.
#[derive(Debug, Deserialize)]
pub struct GenerateReportRequest {
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

/// Flat view of a trade.
#[derive(Debug, Serialize)]
pub struct TradeResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub pair: String,
    pub direction: Direction,
    pub status: TradeStatus,
    pub entry_price: Decimal,
    pub exit_price: Option<Decimal>,
    pub lot_size: Decimal,
    pub stop_loss: Option<Decimal>,
    pub take_profit: Option<Decimal>,
    pub pips: Option<Decimal>,
    pub points: Option<Decimal>,
    pub movement_unit: Option<PriceUnit>,
    pub profit_loss: Option<Decimal>,
    pub profit_loss_currency: Option<String>,
    pub risk_amount: Decimal,
    pub risk_reward_ratio: Option<Decimal>,
    pub entry_time: DateTime<Utc>,
    pub exit_time: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Page of trades.
#[derive(Debug, Serialize)]
pub struct TradeListResponse {
    pub trades: Vec<TradeResponse>,
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
}

/// Full report.
#[derive(Debug, Serialize)]
pub struct ReportResponse {
    pub id: String,
    pub user_id: Uuid,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub metrics: PerformanceMetrics,
    pub trades: Vec<TradeResponse>,
    pub created_at: DateTime<Utc>,
}

/// Report listing entry.
#[derive(Debug, Serialize)]
pub struct ReportSummary {
    pub id: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub total_trades: usize,
    pub total_profit_loss: Decimal,
    pub currency: String,
    pub created_at: DateTime<Utc>,
}

/// Reports response.
#[derive(Debug, Serialize)]
pub struct ReportsResponse {
    pub reports: Vec<ReportSummary>,
}

// =============================================================================
// Router
// =============================================================================

/// Create the API router.
pub fn create_router<S>(state: Arc<ApiState<S>>) -> Router
where
    S: Store + 'static,
{
    Router::new()
        .route("/health", get(health_handler))
        .route("/lot-calculator/calculate", post(calculate_handler))
        .route("/lot-calculator/pip-value", get(pip_value_handler))
        .route("/lot-calculator/pairs", get(pairs_handler))
        .route("/trades", post(create_trade_handler).get(list_trades_handler))
        .route("/trades/:id", get(get_trade_handler).delete(delete_trade_handler))
        .route("/trades/:id/close", post(close_trade_handler))
        .route("/trades/:id/notes", patch(update_notes_handler))
        .route("/reports/metrics", get(metrics_handler))
        .route("/reports", post(generate_report_handler).get(list_reports_handler))
        .route("/reports/:id", get(get_report_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

type ApiResult<T> = Result<T, (StatusCode, Json<ErrorResponse>)>;

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint.
async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn calculate_handler<S: Store + 'static>(
    State(state): State<Arc<ApiState<S>>>,
    Caller(user_id): Caller,
    Json(req): Json<CalculatePositionSize>,
) -> ApiResult<Json<PositionSizeCalculation>> {
    let calculation = state
        .journal
        .calculate_position_size(user_id, req)
        .await
        .map_err(to_error_response)?;

    Ok(Json(calculation))
}

async fn pip_value_handler<S: Store + 'static>(
    State(state): State<Arc<ApiState<S>>>,
    Query(params): Query<PipValueParams>,
) -> ApiResult<Json<PipValueQuote>> {
    let quote = state
        .journal
        .pip_value(&params.currency_pair, &params.account_currency, params.current_price)
        .await
        .map_err(to_error_response)?;

    Ok(Json(quote))
}

async fn pairs_handler<S: Store + 'static>(
    State(state): State<Arc<ApiState<S>>>,
    Query(params): Query<PairsParams>,
) -> Json<PairsResponse> {
    let pairs = state
        .journal
        .currency_pairs(params.kind)
        .iter()
        .map(pair_to_summary)
        .collect();

    Json(PairsResponse { pairs })
}

/// Record a trade.
async fn create_trade_handler<S: Store + 'static>(
    State(state): State<Arc<ApiState<S>>>,
    Caller(user_id): Caller,
    Json(req): Json<CreateTrade>,
) -> ApiResult<(StatusCode, Json<TradeResponse>)> {
    let trade = state
        .journal
        .create_trade(user_id, req)
        .await
        .map_err(to_error_response)?;

    Ok((StatusCode::CREATED, Json(trade_to_response(&trade))))
}

async fn list_trades_handler<S: Store + 'static>(
    State(state): State<Arc<ApiState<S>>>,
    Caller(user_id): Caller,
    Query(query): Query<TradeQuery>,
) -> ApiResult<Json<TradeListResponse>> {
    let page = state
        .journal
        .list_trades(user_id, query)
        .await
        .map_err(to_error_response)?;

    Ok(Json(page_to_response(page)))
}

async fn get_trade_handler<S: Store + 'static>(
    State(state): State<Arc<ApiState<S>>>,
    Caller(user_id): Caller,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<TradeResponse>> {
    let trade = state
        .journal
        .get_trade(user_id, id)
        .await
        .map_err(to_error_response)?;

    Ok(Json(trade_to_response(&trade)))
}

/// Close a trade at an exit price.
async fn close_trade_handler<S: Store + 'static>(
    State(state): State<Arc<ApiState<S>>>,
    Caller(user_id): Caller,
    Path(id): Path<Uuid>,
    Json(req): Json<CloseTrade>,
) -> ApiResult<Json<TradeResponse>> {
    let trade = state
        .journal
        .close_trade(user_id, id, req)
        .await
        .map_err(to_error_response)?;

    Ok(Json(trade_to_response(&trade)))
}

async fn update_notes_handler<S: Store + 'static>(
    State(state): State<Arc<ApiState<S>>>,
    Caller(user_id): Caller,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateNotesRequest>,
) -> ApiResult<Json<TradeResponse>> {
    let trade = state
        .journal
        .update_notes(user_id, id, req.notes)
        .await
        .map_err(to_error_response)?;

    Ok(Json(trade_to_response(&trade)))
}

async fn delete_trade_handler<S: Store + 'static>(
    State(state): State<Arc<ApiState<S>>>,
    Caller(user_id): Caller,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state
        .journal
        .delete_trade(user_id, id)
        .await
        .map_err(to_error_response)?;

    Ok(StatusCode::NO_CONTENT)
}

async fn metrics_handler<S: Store + 'static>(
    State(state): State<Arc<ApiState<S>>>,
    Caller(user_id): Caller,
    Query(params): Query<MetricsParams>,
) -> ApiResult<Json<PerformanceMetrics>> {
    let metrics = state
        .journal
        .performance_metrics(user_id, params.start_date, params.end_date)
        .await
        .map_err(to_error_response)?;

    Ok(Json(metrics))
}

/// Generate and keep a report.
async fn generate_report_handler<S: Store + 'static>(
    State(state): State<Arc<ApiState<S>>>,
    Caller(user_id): Caller,
    Json(req): Json<GenerateReportRequest>,
) -> ApiResult<(StatusCode, Json<ReportResponse>)> {
    let report = state
        .journal
        .generate_report(user_id, req.start_date, req.end_date)
        .await
        .map_err(to_error_response)?;

    Ok((StatusCode::CREATED, Json(report_to_response(report))))
}

async fn list_reports_handler<S: Store + 'static>(
    State(state): State<Arc<ApiState<S>>>,
    Caller(user_id): Caller,
) -> ApiResult<Json<ReportsResponse>> {
    let reports = state
        .journal
        .list_reports(user_id)
        .await
        .map_err(to_error_response)?;

    Ok(Json(ReportsResponse {
        reports: reports.iter().map(report_to_summary).collect(),
    }))
}

async fn get_report_handler<S: Store + 'static>(
    State(state): State<Arc<ApiState<S>>>,
    Caller(user_id): Caller,
    Path(id): Path<String>,
) -> ApiResult<Json<ReportResponse>> {
    let report = state
        .journal
        .get_report(user_id, &id)
        .await
        .map_err(to_error_response)?;

    Ok(Json(report_to_response(report)))
}

// =============================================================================
// Helpers
// =============================================================================

fn to_error_response(error: DaemonError) -> (StatusCode, Json<ErrorResponse>) {
    let status = match &error {
        DaemonError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        DaemonError::TradeNotFound(_)
        | DaemonError::ReportNotFound(_)
        | DaemonError::Store(StoreError::NotFound { .. }) => StatusCode::NOT_FOUND,
        DaemonError::InvalidTradeState { .. }
        | DaemonError::Domain(DomainError::InvalidStateTransition(_))
        | DaemonError::Engine(EngineError::Domain(DomainError::InvalidStateTransition(_)))
        | DaemonError::Store(StoreError::Duplicate { .. })
        | DaemonError::Store(StoreError::Conflict { .. }) => StatusCode::CONFLICT,
        DaemonError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::BAD_REQUEST,
    };

    let details = match &error {
        DaemonError::Engine(EngineError::Validation(errors)) => errors.clone(),
        _ => Vec::new(),
    };

    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
            details,
        }),
    )
}

fn pair_to_summary(pair: &CurrencyPair) -> PairSummary {
    PairSummary {
        pair: pair.as_pair(),
        display_name: pair.display_name(),
        base: pair.base().to_string(),
        quote: pair.quote().to_string(),
        kind: pair.kind(),
        unit: pair.price_unit(),
    }
}

fn trade_to_response(trade: &Trade) -> TradeResponse {
    let exit = trade.exit();

    TradeResponse {
        id: trade.id,
        user_id: trade.user_id,
        pair: trade.pair.as_pair(),
        direction: trade.direction,
        status: trade.status(),
        entry_price: trade.entry_price.as_decimal(),
        exit_price: trade.exit_price().map(|p| p.as_decimal()),
        lot_size: trade.lot_size.as_decimal(),
        stop_loss: trade.stop_loss.map(|p| p.as_decimal()),
        take_profit: trade.take_profit.map(|p| p.as_decimal()),
        pips: trade.pips(),
        points: trade.points(),
        movement_unit: exit.map(|e| e.movement.unit()),
        profit_loss: trade.profit_loss().map(|p| p.amount()),
        profit_loss_currency: trade.profit_loss().map(|p| p.currency().to_string()),
        risk_amount: trade.risk_amount,
        risk_reward_ratio: trade.risk_reward_ratio(),
        entry_time: trade.entry_time,
        exit_time: trade.exit_time(),
        notes: trade.notes().map(str::to_string),
        created_at: trade.created_at,
        updated_at: trade.updated_at(),
    }
}

fn page_to_response(page: TradePage) -> TradeListResponse {
    TradeListResponse {
        trades: page.trades.iter().map(trade_to_response).collect(),
        total: page.total,
        page: page.page,
        page_size: page.page_size,
        total_pages: page.total_pages,
    }
}

fn report_to_response(report: TradingReport) -> ReportResponse {
    ReportResponse {
        trades: report.trades.iter().map(trade_to_response).collect(),
        id: report.id,
        user_id: report.user_id,
        start_date: report.start_date,
        end_date: report.end_date,
        metrics: report.metrics,
        created_at: report.created_at,
    }
}

fn report_to_summary(report: &TradingReport) -> ReportSummary {
    ReportSummary {
        id: report.id.clone(),
        start_date: report.start_date,
        end_date: report.end_date,
        total_trades: report.metrics.total_trades,
        total_profit_loss: report.metrics.total_profit_loss,
        currency: report.metrics.currency.to_string(),
        created_at: report.created_at,
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::JournalConfig;
    use axum::body::Body;
    use axum::http::{header, Method, Request};
    use forexhelper_store::MemoryStore;
    use http_body_util::BodyExt;
    use rust_decimal_macros::dec;
    use serde_json::{json, Value};
    use std::str::FromStr;
    use tower::ServiceExt;

    fn create_test_app() -> Router {
        let store = Arc::new(MemoryStore::new());
        let journal = JournalService::from_config(store, &JournalConfig::default());
        let state = Arc::new(ApiState {
            journal: Arc::new(journal),
        });
        create_router(state)
    }

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        user: Option<Uuid>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            builder = builder.header(USER_ID_HEADER, user.to_string());
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    fn decimal(value: &Value) -> Decimal {
        match value {
            Value::String(s) => Decimal::from_str(s).unwrap(),
            other => Decimal::from_str(&other.to_string()).unwrap(),
        }
    }

    fn eurusd_buy(entry_time: &str) -> Value {
        json!({
            "pair": "EURUSD",
            "direction": "BUY",
            "entry_price": "1.0850",
            "lot_size": "0.5",
            "stop_loss": "1.0800",
            "take_profit": "1.0950",
            "risk_amount": "25",
            "account_balance": "10000",
            "entry_time": entry_time,
        })
    }

    async fn create_trade(app: &Router, user: Uuid, entry_time: &str) -> Uuid {
        let (status, body) =
            send(app, Method::POST, "/trades", Some(user), Some(eurusd_buy(entry_time))).await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        Uuid::parse_str(body["id"].as_str().unwrap()).unwrap()
    }

    async fn close_trade(app: &Router, user: Uuid, id: Uuid, exit_price: &str) -> (StatusCode, Value) {
        send(
            app,
            Method::POST,
            &format!("/trades/{}/close", id),
            Some(user),
            Some(json!({ "exit_price": exit_price, "exit_time": "2024-03-05T12:00:00Z" })),
        )
        .await
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = create_test_app();

        let (status, body) = send(&app, Method::GET, "/health", None, None).await;

        assert_eq!(status, StatusCode::OK);
        let health: HealthResponse = serde_json::from_value(body).unwrap();
        assert_eq!(health.status, "healthy");
    }

    #[tokio::test]
    async fn test_missing_identity_is_unauthorized() {
        let app = create_test_app();

        let (status, body) = send(&app, Method::GET, "/trades", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body["error"].as_str().unwrap().contains(USER_ID_HEADER));

        let request = Request::builder()
            .uri("/reports")
            .header(USER_ID_HEADER, "not-a-uuid")
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_calculate_endpoint() {
        let app = create_test_app();
        let body = json!({
            "account_balance": "10000",
            "account_currency": "USD",
            "risk_percentage": "1",
            "stop_loss": "20",
            "stop_loss_unit": "pips",
            "currency_pair": "EURUSD",
        });

        let (status, body) = send(
            &app,
            Method::POST,
            "/lot-calculator/calculate",
            Some(Uuid::now_v7()),
            Some(body),
        )
        .await;

        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(decimal(&body["lot_size"]), dec!(0.5));
        assert_eq!(decimal(&body["risk_amount"]), dec!(100));
    }

    #[tokio::test]
    async fn test_calculate_rejects_out_of_range_risk() {
        let app = create_test_app();
        let body = json!({
            "account_balance": "10000",
            "account_currency": "USD",
            "risk_percentage": "150",
            "stop_loss": "20",
            "stop_loss_unit": "pips",
            "currency_pair": "EURUSD",
        });

        let (status, _) = send(
            &app,
            Method::POST,
            "/lot-calculator/calculate",
            Some(Uuid::now_v7()),
            Some(body),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_calculate_unrepresentable_size_is_bad_request() {
        let app = create_test_app();
        let body = json!({
            "account_balance": "10000",
            "account_currency": "USD",
            "risk_percentage": "1",
            "stop_loss": "0.000000000000000000000000001",
            "stop_loss_unit": "pips",
            "currency_pair": "EURUSD",
        });

        let (status, body) = send(
            &app,
            Method::POST,
            "/lot-calculator/calculate",
            Some(Uuid::now_v7()),
            Some(body),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
        assert!(body["error"].as_str().unwrap().contains("overflow"));
    }

    #[tokio::test]
    async fn test_pip_value_endpoint() {
        let app = create_test_app();

        let (status, body) = send(
            &app,
            Method::GET,
            "/lot-calculator/pip-value?currency_pair=XAUUSD&account_currency=USD",
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["unit"], "points");
        assert_eq!(decimal(&body["pip_value"]), dec!(1));

        let (status, body) = send(
            &app,
            Method::GET,
            "/lot-calculator/pip-value?currency_pair=USDJPY&account_currency=USD&current_price=150",
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["unit"], "pips");
        let expected = dec!(10) / dec!(150);
        assert!((decimal(&body["pip_value"]) - expected).abs() < dec!(0.000000001));
    }

    #[tokio::test]
    async fn test_pairs_endpoint() {
        let app = create_test_app();

        let (status, body) = send(&app, Method::GET, "/lot-calculator/pairs?type=metal", None, None).await;

        assert_eq!(status, StatusCode::OK);
        let pairs = body["pairs"].as_array().unwrap();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0]["pair"], "XAUUSD");
        assert_eq!(pairs[0]["unit"], "points");
    }

    #[tokio::test]
    async fn test_trade_lifecycle() {
        let app = create_test_app();
        let user = Uuid::now_v7();
        let id = create_trade(&app, user, "2024-03-04T09:00:00Z").await;

        let (status, body) = send(&app, Method::GET, &format!("/trades/{}", id), Some(user), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "OPEN");
        assert_eq!(body["exit_price"], Value::Null);

        let (status, body) = close_trade(&app, user, id, "1.0900").await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["status"], "WIN");
        assert_eq!(body["movement_unit"], "pips");
        assert_eq!(decimal(&body["pips"]), dec!(50));
        assert_eq!(decimal(&body["profit_loss"]), dec!(25));
        assert_eq!(body["profit_loss_currency"], "USD");

        let (status, body) = send(
            &app,
            Method::PATCH,
            &format!("/trades/{}/notes", id),
            Some(user),
            Some(json!({ "notes": "Clean breakout" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["notes"], "Clean breakout");
        assert_eq!(body["status"], "WIN");

        let (status, _) = send(&app, Method::DELETE, &format!("/trades/{}", id), Some(user), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = send(&app, Method::GET, &format!("/trades/{}", id), Some(user), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_second_close_conflicts() {
        let app = create_test_app();
        let user = Uuid::now_v7();
        let id = create_trade(&app, user, "2024-03-04T09:00:00Z").await;

        let (status, _) = close_trade(&app, user, id, "1.0900").await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = close_trade(&app, user, id, "1.0700").await;
        assert_eq!(status, StatusCode::CONFLICT, "{body}");
    }

    #[tokio::test]
    async fn test_invalid_trade_lists_violations() {
        let app = create_test_app();
        let mut body = eurusd_buy("2024-03-04T09:00:00Z");
        body["stop_loss"] = json!("1.0900");

        let (status, body) = send(&app, Method::POST, "/trades", Some(Uuid::now_v7()), Some(body)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let details = body["details"].as_array().unwrap();
        assert!(details
            .iter()
            .any(|d| d == "Stop loss for BUY trade must be below entry price"));
    }

    #[tokio::test]
    async fn test_other_users_trade_is_not_found() {
        let app = create_test_app();
        let owner = Uuid::now_v7();
        let id = create_trade(&app, owner, "2024-03-04T09:00:00Z").await;

        let (status, _) =
            send(&app, Method::GET, &format!("/trades/{}", id), Some(Uuid::now_v7()), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = close_trade(&app, Uuid::now_v7(), id, "1.0900").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_list_trades_pagination() {
        let app = create_test_app();
        let user = Uuid::now_v7();
        for hour in ["09", "10", "11"] {
            create_trade(&app, user, &format!("2024-03-04T{}:00:00Z", hour)).await;
        }

        let (status, body) = send(&app, Method::GET, "/trades?page_size=2", Some(user), None).await;

        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["total"], 3);
        assert_eq!(body["total_pages"], 2);
        assert_eq!(body["page"], 1);
        let trades = body["trades"].as_array().unwrap();
        assert_eq!(trades.len(), 2);
        assert_eq!(trades[0]["entry_time"], "2024-03-04T11:00:00Z");

        let (status, body) = send(&app, Method::GET, "/trades?status=WIN", Some(user), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 0);
    }

    #[tokio::test]
    async fn test_reports_flow() {
        let app = create_test_app();
        let user = Uuid::now_v7();
        let win = create_trade(&app, user, "2024-03-04T09:00:00Z").await;
        let loss = create_trade(&app, user, "2024-03-04T10:00:00Z").await;
        close_trade(&app, user, win, "1.0900").await;
        close_trade(&app, user, loss, "1.0830").await;

        let (status, body) = send(&app, Method::GET, "/reports/metrics", Some(user), None).await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["total_trades"], 2);
        assert_eq!(decimal(&body["total_profit_loss"]), dec!(15));

        let (status, body) = send(
            &app,
            Method::POST,
            "/reports",
            Some(user),
            Some(json!({
                "start_date": "2024-03-01T00:00:00Z",
                "end_date": "2024-03-31T23:59:59Z",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        assert_eq!(body["trades"].as_array().unwrap().len(), 2);
        let report_id = body["id"].as_str().unwrap().to_string();
        assert!(report_id.starts_with(&format!("report_{}_2024-03-01_2024-03-31_", user)));

        let (status, body) = send(&app, Method::GET, "/reports", Some(user), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["reports"].as_array().unwrap().len(), 1);

        let uri = format!("/reports/{}", report_id);
        let (status, body) = send(&app, Method::GET, &uri, Some(user), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["metrics"]["winning_trades"], 1);

        let (status, _) = send(&app, Method::GET, &uri, Some(Uuid::now_v7()), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_inverted_report_range_is_bad_request() {
        let app = create_test_app();

        let (status, _) = send(
            &app,
            Method::POST,
            "/reports",
            Some(Uuid::now_v7()),
            Some(json!({
                "start_date": "2024-03-31T00:00:00Z",
                "end_date": "2024-03-01T00:00:00Z",
            })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
