//! 날짜별 배치 동기화 드라이버.
//!
//! (날짜, 데이터셋) 단위의 공통 상태 기계:
//!
//! ```text
//! UNKNOWN -> [조회 시도] -> SUCCESS | FAILED
//! FAILED  -> [재시도]    -> SUCCESS | FAILED   (원장 항목 제자리 덮어쓰기)
//! ```
//!
//! IN_PROGRESS 상태는 저장하지 않습니다. 조회 도중 프로세스가 죽으면
//! 해당 단위는 UNKNOWN(또는 이전 기록)으로 남고, 다음 실행이 다시
//! 동기화합니다. 원장은 최소 한 번(at-least-once) 재개를 보장할 뿐,
//! 부분 적재 배치에 대한 크래시 원자성은 제공하지 않습니다.

use sqlx::PgPool;

use tusync_core::catalog::DatasetSchema;
use tusync_data::storage::batch_upsert;
use tusync_data::{DataError, QueryFilter, SyncLedger, SyncStatus, TushareClient};

use crate::stats::{SyncStats, UnitOutcome};

/// 데이터셋 한 번 조회 후 적재.
///
/// 빈 결과는 0으로 돌아옵니다. 오류는 그대로 전파합니다.
pub(crate) async fn fetch_and_store(
    pool: &PgPool,
    client: &TushareClient,
    schema: &DatasetSchema,
    filter: &QueryFilter,
) -> Result<u64, DataError> {
    let table = client.query(schema.api_name, filter).await?;
    if table.is_empty() {
        return Ok(0);
    }
    batch_upsert(pool, schema, &table.records()).await
}

/// 단일 동기화 단위를 실행하고 원장에 결과를 기록합니다.
///
/// `sync_type`은 원장 키입니다. 날짜별 배치 데이터셋은 데이터셋 이름을,
/// 종목 단위 재개가 필요한 데이터셋은 `{이름}_{종목코드}` 복합 키를
/// 넘깁니다.
///
/// 실패는 값으로 돌아오며 원장에 `failed`로 기록됩니다. 원장 기록 자체가
/// 실패하면 경고만 남깁니다 — 단위 결과가 원장 장애에 가려지면 안
/// 됩니다.
pub(crate) async fn sync_unit(
    pool: &PgPool,
    client: &TushareClient,
    ledger: &SyncLedger,
    schema: &DatasetSchema,
    sync_type: &str,
    trade_date: &str,
    filter: &QueryFilter,
) -> UnitOutcome {
    match ledger.is_synced(trade_date, sync_type).await {
        Ok(true) => {
            tracing::debug!(sync_type, trade_date, "이미 동기화됨, 건너뜀");
            return UnitOutcome::Skipped;
        }
        Ok(false) => {}
        Err(e) => {
            tracing::error!(sync_type, trade_date, error = %e, "원장 조회 실패");
            return UnitOutcome::Failed(e.to_string());
        }
    }

    match fetch_and_store(pool, client, schema, filter).await {
        Ok(count) => {
            if let Err(e) = ledger
                .record(trade_date, sync_type, SyncStatus::Success, count as i64, None)
                .await
            {
                tracing::warn!(sync_type, trade_date, error = %e, "원장 기록 실패");
            }

            if count == 0 {
                tracing::debug!(sync_type, trade_date, "데이터 없음 (0건 성공)");
                UnitOutcome::Empty
            } else {
                UnitOutcome::Written(count)
            }
        }
        Err(e) => {
            let message = e.to_string();
            if let Err(ledger_err) = ledger
                .record(
                    trade_date,
                    sync_type,
                    SyncStatus::Failed,
                    0,
                    Some(&message),
                )
                .await
            {
                tracing::warn!(sync_type, trade_date, error = %ledger_err, "원장 기록 실패");
            }

            tracing::error!(sync_type, trade_date, error = %message, "단위 동기화 실패");
            UnitOutcome::Failed(message)
        }
    }
}

/// 단일 날짜의 데이터셋 동기화 (원장 키 = 데이터셋 이름).
pub async fn sync_dataset_for_date(
    pool: &PgPool,
    client: &TushareClient,
    ledger: &SyncLedger,
    schema: &DatasetSchema,
    trade_date: &str,
) -> UnitOutcome {
    let filter = QueryFilter::new().trade_date(trade_date);
    sync_unit(pool, client, ledger, schema, schema.name, trade_date, &filter).await
}

/// 날짜 목록 전체에 대한 데이터셋 동기화.
///
/// 단일 날짜 실패는 기록 후 다음 날짜로 계속합니다.
pub async fn sync_dataset_by_dates(
    pool: &PgPool,
    client: &TushareClient,
    schema: &DatasetSchema,
    dates: &[String],
) -> SyncStats {
    let start = std::time::Instant::now();
    let ledger = SyncLedger::new(pool.clone());
    let mut stats = SyncStats::new();

    for trade_date in dates {
        let outcome = sync_dataset_for_date(pool, client, &ledger, schema, trade_date).await;
        stats.observe(&outcome);
    }

    stats.elapsed = start.elapsed();
    stats.log_summary(schema.name);
    stats
}
