//! 동기화 트리거 / 조회 엔드포인트.
//!
//! - `GET  /health`
//! - `POST /api/sync/base`
//! - `POST /api/sync/daily`
//! - `POST /api/sync/range`
//! - `POST /api/sync/boards`
//! - `GET  /api/sync/records`
//! - `GET  /api/sync/failures`
//! - `GET  /api/rate-limit/stats`

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use tusync_collector::modules;
use tusync_data::SyncLedger;

use crate::state::AppState;

/// 공통 응답 래퍼.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            message: None,
        })
    }
}

/// 핸들러 에러. 500과 함께 실패 응답으로 변환됩니다.
pub struct ApiError(String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ApiResponse::<()> {
            success: false,
            data: None,
            message: Some(self.0),
        });
        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}

impl From<tusync_collector::CollectorError> for ApiError {
    fn from(err: tusync_collector::CollectorError) -> Self {
        Self(err.to_string())
    }
}

impl From<tusync_data::DataError> for ApiError {
    fn from(err: tusync_data::DataError) -> Self {
        Self(err.to_string())
    }
}

/// 라우터 구성.
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/api/sync/base", post(sync_base))
        .route("/api/sync/daily", post(sync_daily))
        .route("/api/sync/range", post(sync_range))
        .route("/api/sync/boards", post(sync_boards))
        .route("/api/sync/records", get(sync_records))
        .route("/api/sync/failures", get(sync_failures))
        .route("/api/rate-limit/stats", get(rate_limit_stats))
}

/// 헬스 체크 응답.
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp: String,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

async fn sync_base(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<tusync_collector::SyncSummary>>, ApiError> {
    let summary = modules::sync_base_data(&state.pool, &state.client).await?;
    Ok(ApiResponse::ok(summary))
}

#[derive(Debug, Deserialize)]
struct SyncDailyRequest {
    /// 거래일 (YYYYMMDD, 기본: 오늘)
    trade_date: Option<String>,
    /// 특정 종목만 동기화
    ts_codes: Option<Vec<String>>,
}

async fn sync_daily(
    State(state): State<AppState>,
    Json(request): Json<SyncDailyRequest>,
) -> Result<Json<ApiResponse<tusync_collector::SyncSummary>>, ApiError> {
    let date = request.trade_date.unwrap_or_else(tusync_core::date::today);
    let summary = modules::sync_daily_by_date(
        &state.pool,
        &state.client,
        &date,
        request.ts_codes.as_deref(),
    )
    .await?;
    Ok(ApiResponse::ok(summary))
}

#[derive(Debug, Deserialize)]
struct SyncRangeRequest {
    start_date: String,
    end_date: String,
    ts_codes: Option<Vec<String>>,
}

async fn sync_range(
    State(state): State<AppState>,
    Json(request): Json<SyncRangeRequest>,
) -> Result<Json<ApiResponse<tusync_collector::SyncSummary>>, ApiError> {
    let summary = modules::sync_daily_by_range(
        &state.pool,
        &state.client,
        &request.start_date,
        &request.end_date,
        request.ts_codes.as_deref(),
    )
    .await?;
    Ok(ApiResponse::ok(summary))
}

#[derive(Debug, Deserialize)]
struct BoardsParams {
    /// DC 명부 스냅샷 날짜 (YYYYMMDD)
    trade_date: Option<String>,
}

async fn sync_boards(
    State(state): State<AppState>,
    Query(params): Query<BoardsParams>,
) -> Result<Json<ApiResponse<tusync_collector::SyncSummary>>, ApiError> {
    let mut summary = modules::sync_ths_boards(&state.pool, &state.client).await?;

    let dc = modules::sync_dc_boards(&state.pool, &state.client, params.trade_date.as_deref())
        .await?;
    for (dataset, rows) in &dc.details {
        summary.add(dataset, *rows);
    }

    Ok(ApiResponse::ok(summary))
}

#[derive(Debug, Deserialize)]
struct LimitParams {
    limit: Option<i64>,
}

async fn sync_records(
    State(state): State<AppState>,
    Query(params): Query<LimitParams>,
) -> Result<Json<ApiResponse<Vec<tusync_data::SyncRecord>>>, ApiError> {
    let ledger = SyncLedger::new(state.pool.clone());
    let records = ledger.recent(params.limit.unwrap_or(100)).await?;
    Ok(ApiResponse::ok(records))
}

async fn sync_failures(
    State(state): State<AppState>,
    Query(params): Query<LimitParams>,
) -> Result<Json<ApiResponse<Vec<tusync_data::SyncRecord>>>, ApiError> {
    let ledger = SyncLedger::new(state.pool.clone());
    let records = ledger.failures(params.limit.unwrap_or(100)).await?;
    Ok(ApiResponse::ok(records))
}

async fn rate_limit_stats(
    State(state): State<AppState>,
) -> Json<ApiResponse<Vec<tusync_data::RateLimiterStats>>> {
    let stats = state.client.all_rate_limit_stats().await;
    ApiResponse::ok(stats)
}
