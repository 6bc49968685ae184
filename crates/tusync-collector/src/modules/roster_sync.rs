//! 명부 동기화 모듈.
//!
//! 전량 교체 형태의 데이터셋입니다. 멱등 upsert 덕분에 재실행이 항상
//! 안전하므로 원장 항목을 남기지 않습니다.

use sqlx::PgPool;

use tusync_core::catalog::{STOCK_HOLDER, STOCK_HOT_MONEY, STOCK_LIST};
use tusync_data::storage::{batch_upsert, replace_members, roster};
use tusync_data::{QueryFilter, TushareClient};

use crate::error::Result;
use crate::stats::{SyncStats, SyncSummary, UnitOutcome};

/// 주식 기본 목록 전량 동기화.
pub async fn sync_stock_list(pool: &PgPool, client: &TushareClient) -> Result<u64> {
    tracing::info!("주식 목록 동기화 시작");

    let table = client.stock_basic(&QueryFilter::new()).await?;
    if table.is_empty() {
        tracing::warn!("주식 목록 데이터가 비어 있습니다");
        return Ok(0);
    }

    let count = batch_upsert(pool, &STOCK_LIST, &table.records()).await?;
    tracing::info!(count, "주식 목록 동기화 완료");
    Ok(count)
}

/// 핫머니 명부 전량 동기화.
pub async fn sync_hot_money_roster(pool: &PgPool, client: &TushareClient) -> Result<u64> {
    tracing::info!("핫머니 명부 동기화 시작");

    let table = client.hm_list(&QueryFilter::new()).await?;
    if table.is_empty() {
        tracing::warn!("핫머니 명부 데이터가 비어 있습니다");
        return Ok(0);
    }

    let count = batch_upsert(pool, &STOCK_HOT_MONEY, &table.records()).await?;
    tracing::info!(count, "핫머니 명부 동기화 완료");
    Ok(count)
}

/// 단일 종목 주주 명단 교체.
async fn sync_one_holder(pool: &PgPool, client: &TushareClient, ts_code: &str) -> Result<u64> {
    let table = client
        .top10_holders(&QueryFilter::new().ts_code(ts_code))
        .await?;

    if table.is_empty() {
        tracing::debug!(ts_code, "주주 명단 데이터 없음");
        return Ok(0);
    }

    let count = replace_members(pool, &STOCK_HOLDER, ts_code, &table.records()).await?;
    Ok(count)
}

/// 전체 종목 주주 명단 동기화.
///
/// 단일 종목 실패는 기록 후 다음 종목으로 계속합니다.
pub async fn sync_stock_holders(pool: &PgPool, client: &TushareClient) -> Result<SyncStats> {
    let start = std::time::Instant::now();
    let codes = roster::all_stock_codes(pool).await?;
    tracing::info!(stocks = codes.len(), "주주 명단 동기화 시작");

    let mut stats = SyncStats::new();
    for ts_code in &codes {
        let outcome = match sync_one_holder(pool, client, ts_code).await {
            Ok(0) => UnitOutcome::Empty,
            Ok(count) => UnitOutcome::Written(count),
            Err(e) => {
                tracing::error!(ts_code, error = %e, "주주 명단 동기화 실패");
                UnitOutcome::Failed(e.to_string())
            }
        };
        stats.observe(&outcome);
    }

    stats.elapsed = start.elapsed();
    stats.log_summary("stock_holder");
    Ok(stats)
}

/// 기초 데이터 전량 동기화: 종목 목록 → 주주 명단 → 핫머니 명부.
///
/// 종목 목록 실패는 이후 단계의 전제 조건 실패이므로 전파합니다.
pub async fn sync_base_data(pool: &PgPool, client: &TushareClient) -> Result<SyncSummary> {
    tracing::info!("기초 데이터 전량 동기화 시작");
    let mut summary = SyncSummary::default();

    let count = sync_stock_list(pool, client).await?;
    summary.add(STOCK_LIST.name, count);

    let holder_stats = sync_stock_holders(pool, client).await?;
    summary.add(STOCK_HOLDER.name, holder_stats.rows);

    let count = sync_hot_money_roster(pool, client).await?;
    summary.add(STOCK_HOT_MONEY.name, count);

    tracing::info!(total_rows = summary.total_rows, "기초 데이터 전량 동기화 완료");
    Ok(summary)
}
