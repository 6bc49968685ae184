//! 오케스트레이터 원장 게이트 통합 테스트.
//!
//! 실제 PostgreSQL과 mockito HTTP 서버를 사용합니다. `DATABASE_URL`이
//! 없으면 건너뜁니다.

use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;

use tusync_collector::modules::sync_dataset_for_date;
use tusync_collector::UnitOutcome;
use tusync_core::catalog::{BLOCK_LIMIT_STRONG, STOCK_LIMIT_LADDER, STOCK_LIMIT_STATUS};
use tusync_data::storage::{connect, run_migrations};
use tusync_data::{RateLimiter, RetryPolicy, SyncLedger, SyncStatus, TushareClient, TushareConfig};

async fn test_pool() -> Option<PgPool> {
    let url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!("Skipping test: DATABASE_URL not set");
            return None;
        }
    };

    let pool = connect(&url).await.expect("DB 연결 실패");
    run_migrations(&pool).await.expect("마이그레이션 실패");
    Some(pool)
}

fn test_client(server_url: &str) -> TushareClient {
    let config = TushareConfig {
        token: "test-token".into(),
        api_url: server_url.to_string(),
        max_calls_per_min: 100,
        rate_period_secs: 60,
        retry: RetryPolicy {
            max_attempts: 1,
            delay: Duration::from_millis(10),
        },
        timeout_secs: 5,
    };
    let limiter = Arc::new(RateLimiter::new(
        config.max_calls_per_min,
        config.rate_period(),
    ));
    TushareClient::new(&config, limiter).unwrap()
}

async fn clear_unit(pool: &PgPool, sync_type: &str, trade_date: &str) {
    sqlx::query("DELETE FROM sync_record WHERE sync_type = $1 AND trade_date = $2")
        .bind(sync_type)
        .bind(trade_date)
        .execute(pool)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_synced_unit_skips_refetch() {
    let Some(pool) = test_pool().await else { return };
    let date = "20240105";
    clear_unit(&pool, STOCK_LIMIT_LADDER.name, date).await;

    let ledger = SyncLedger::new(pool.clone());
    ledger
        .record(date, STOCK_LIMIT_LADDER.name, SyncStatus::Success, 7, None)
        .await
        .unwrap();

    let mut server = mockito::Server::new_async().await;
    // 성공 기록이 있으면 상류 호출이 한 번도 나가면 안 된다
    let mock = server.mock("POST", "/").expect(0).create_async().await;

    let client = test_client(&server.url());
    let outcome = sync_dataset_for_date(&pool, &client, &ledger, &STOCK_LIMIT_LADDER, date).await;

    assert!(matches!(outcome, UnitOutcome::Skipped));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_empty_result_is_terminal_success() {
    let Some(pool) = test_pool().await else { return };
    let date = "20240106";
    clear_unit(&pool, BLOCK_LIMIT_STRONG.name, date).await;

    let mut server = mockito::Server::new_async().await;
    // 휴장일: 빈 결과 — 정확히 한 번만 호출되어야 한다
    let mock = server
        .mock("POST", "/")
        .with_status(200)
        .with_body(r#"{"code":0,"msg":null,"data":null}"#)
        .expect(1)
        .create_async()
        .await;

    let client = test_client(&server.url());
    let ledger = SyncLedger::new(pool.clone());

    let first = sync_dataset_for_date(&pool, &client, &ledger, &BLOCK_LIMIT_STRONG, date).await;
    assert!(matches!(first, UnitOutcome::Empty));
    assert!(ledger.is_synced(date, BLOCK_LIMIT_STRONG.name).await.unwrap());

    // 두 번째 패스는 0건 성공을 재시도하지 않는다
    let second = sync_dataset_for_date(&pool, &client, &ledger, &BLOCK_LIMIT_STRONG, date).await;
    assert!(matches!(second, UnitOutcome::Skipped));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_failed_unit_is_recorded_and_retryable() {
    let Some(pool) = test_pool().await else { return };
    let date = "20240107";
    clear_unit(&pool, STOCK_LIMIT_STATUS.name, date).await;

    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/")
        .with_status(500)
        .create_async()
        .await;

    let client = test_client(&server.url());
    let ledger = SyncLedger::new(pool.clone());

    let outcome = sync_dataset_for_date(&pool, &client, &ledger, &STOCK_LIMIT_STATUS, date).await;
    assert!(matches!(outcome, UnitOutcome::Failed(_)));

    // failed 기록은 동기화된 것으로 치지 않으므로 다음 패스가 재시도한다
    assert!(!ledger.is_synced(date, STOCK_LIMIT_STATUS.name).await.unwrap());

    let failures = ledger.failures(10).await.unwrap();
    assert!(failures
        .iter()
        .any(|r| r.sync_type == STOCK_LIMIT_STATUS.name && r.trade_date == date));
}
