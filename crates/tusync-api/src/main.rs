//! TuSync API 서버.
//!
//! 동기화 트리거 엔드포인트를 제공하는 Axum 기반 REST 서버를 시작합니다.

use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use tusync_api::routes::create_router;
use tusync_api::AppState;
use tusync_collector::CollectorConfig;
use tusync_data::storage::connect;
use tusync_data::{RateLimiter, TushareClient};

/// 서버 설정 구조체.
struct ServerConfig {
    /// 바인딩할 호스트 주소
    host: String,
    /// 바인딩할 포트
    port: u16,
}

impl ServerConfig {
    /// 환경 변수에서 설정 로드.
    fn from_env() -> Self {
        let host = std::env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = std::env::var("API_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(5001);

        Self { host, port }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 로깅 초기화 (RUST_LOG / LOG_FORMAT)
    tusync_core::logging::init_logging_from_env()?;

    tracing::info!("TuSync API 서버 시작");

    // 설정 로드 (collector와 같은 환경변수 표면 공유)
    let config = CollectorConfig::from_env()?;
    let server = ServerConfig::from_env();

    // DB 연결
    let pool = connect(&config.database_url).await?;
    tracing::info!("데이터베이스 연결 성공");

    // 클라이언트 구성 (제한기 인스턴스 하나를 주입)
    let limiter = Arc::new(RateLimiter::new(
        config.tushare.max_calls_per_min,
        config.tushare.rate_period(),
    ));
    let client = Arc::new(TushareClient::new(&config.tushare, limiter)?);

    let state = AppState::new(pool, client);
    let app = create_router()
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = format!("{}:{}", server.host, server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "서버 리스닝 시작");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("종료 신호 수신, 서버 종료 중...");
        })
        .await?;

    Ok(())
}
