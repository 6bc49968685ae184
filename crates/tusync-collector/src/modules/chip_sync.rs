//! 매집 분포 매트릭스 동기화.
//!
//! cyq_chips는 종목×날짜당 API 호출이 한 번씩 필요한 데이터셋입니다.
//! 원장 키는 `stock_chip_{종목코드}`로, 종목×날짜 쌍 단위로 재개됩니다.
//! 단일 쌍 실패는 배치를 중단시키지 않습니다.

use sqlx::PgPool;

use tusync_core::catalog::STOCK_CHIP;
use tusync_data::storage::roster;
use tusync_data::{QueryFilter, SyncLedger, TushareClient};

use crate::error::Result;
use crate::modules::dataset_sync::sync_unit;
use crate::stats::SyncStats;

/// 종목×날짜 매트릭스 동기화.
///
/// `codes`가 없으면 저장된 명부의 전 종목을 돕니다. 명부 조회 실패는
/// 전제 조건 실패로 전파됩니다.
pub async fn sync_chips(
    pool: &PgPool,
    client: &TushareClient,
    dates: &[String],
    codes: Option<&[String]>,
) -> Result<SyncStats> {
    let start = std::time::Instant::now();

    let owned_codes;
    let codes: &[String] = match codes {
        Some(codes) => codes,
        None => {
            owned_codes = roster::all_stock_codes(pool).await?;
            &owned_codes
        }
    };

    tracing::info!(
        stocks = codes.len(),
        dates = dates.len(),
        "매집 분포 매트릭스 동기화 시작"
    );

    let ledger = SyncLedger::new(pool.clone());
    let mut stats = SyncStats::new();

    for ts_code in codes {
        let sync_type = format!("{}_{}", STOCK_CHIP.name, ts_code);
        for trade_date in dates {
            let filter = QueryFilter::new().ts_code(ts_code).trade_date(trade_date);
            let outcome = sync_unit(
                pool,
                client,
                &ledger,
                &STOCK_CHIP,
                &sync_type,
                trade_date,
                &filter,
            )
            .await;
            stats.observe(&outcome);
        }
    }

    stats.elapsed = start.elapsed();
    stats.log_summary(STOCK_CHIP.name);
    Ok(stats)
}
