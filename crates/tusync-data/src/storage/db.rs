//! 데이터베이스 연결 풀 구성.

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::error::{DataError, Result};

/// 연결 풀을 생성합니다.
///
/// 체크아웃 시 연결을 검증하고(pre-ping), 오래된 연결은 주기적으로
/// 재생성합니다.
pub async fn connect(database_url: &str) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(30))
        .test_before_acquire(true)
        .max_lifetime(Duration::from_secs(1800))
        .connect(database_url)
        .await
        .map_err(|e| DataError::ConnectionError(e.to_string()))?;

    tracing::info!("데이터베이스 연결 풀 생성 완료");
    Ok(pool)
}

/// 스키마 마이그레이션을 적용합니다.
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| DataError::MigrationError(e.to_string()))?;

    tracing::info!("마이그레이션 적용 완료");
    Ok(())
}
