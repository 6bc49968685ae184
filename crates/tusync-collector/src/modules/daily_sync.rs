//! 일별 데이터 통합 동기화 드라이버.
//!
//! 세 가지 반복 형태를 조합합니다:
//! - 날짜별 배치 (한 호출이 전 종목을 돌려주는 데이터셋)
//! - 종목×날짜 매트릭스 (매집 분포)
//! - 지정 종목 범위 동기화 (시작/종료일 한 호출)
//!
//! 단위 실패는 원장에 기록하고 형제 단위를 계속 진행합니다. 거래일 달력
//! 조회나 명부 읽기처럼 배치 전체의 전제 조건이 되는 실패만 전파합니다.

use sqlx::PgPool;

use tusync_core::catalog::{
    DatasetSchema, BLOCK_DC_MONEY_FLOW, BLOCK_LIMIT_STRONG, BLOCK_THS_MONEY_FLOW, DC_BLOCK_DAILY,
    INDUSTRY_DC_MONEY_FLOW, INDUSTRY_THS_MONEY_FLOW, STOCK_CHIP, STOCK_DAILY, STOCK_HOT_MONEY_DAILY,
    STOCK_LHB_DAILY, STOCK_LHB_INST, STOCK_LIMIT_LADDER, STOCK_LIMIT_STATUS, STOCK_MONEY_FLOW,
    STOCK_MONEY_FLOW_DC, STOCK_MONEY_FLOW_THS, STOCK_TECH_FACTOR, STOCK_TECH_FACTOR_PRO,
    THS_BLOCK_DAILY,
};
use tusync_data::{QueryFilter, SyncLedger, SyncStatus, TushareClient};

use crate::error::Result;
use crate::modules::chip_sync::sync_chips;
use crate::modules::dataset_sync::{
    fetch_and_store, sync_dataset_by_dates, sync_dataset_for_date,
};
use crate::modules::calendar::trading_dates;
use crate::stats::{SyncSummary, UnitOutcome};

/// 날짜별 배치로 도는 종목 데이터셋.
static STOCK_DATE_DATASETS: &[&DatasetSchema] = &[
    &STOCK_DAILY,
    &STOCK_MONEY_FLOW,
    &STOCK_MONEY_FLOW_THS,
    &STOCK_MONEY_FLOW_DC,
    &STOCK_TECH_FACTOR,
    &STOCK_TECH_FACTOR_PRO,
];

/// 날짜별 배치로 도는 시장 전체 데이터셋 (전량 동기화일 때만).
static MARKET_DATE_DATASETS: &[&DatasetSchema] = &[
    &STOCK_LHB_DAILY,
    &STOCK_LHB_INST,
    &BLOCK_THS_MONEY_FLOW,
    &INDUSTRY_THS_MONEY_FLOW,
    &BLOCK_DC_MONEY_FLOW,
    &INDUSTRY_DC_MONEY_FLOW,
    &STOCK_LIMIT_STATUS,
    &STOCK_LIMIT_LADDER,
    &BLOCK_LIMIT_STRONG,
    &STOCK_HOT_MONEY_DAILY,
    &THS_BLOCK_DAILY,
    &DC_BLOCK_DAILY,
];

/// 지정 종목을 날짜 범위 한 호출로 당기는 데이터셋.
static STOCK_RANGE_DATASETS: &[&DatasetSchema] = &[
    &STOCK_DAILY,
    &STOCK_CHIP,
    &STOCK_TECH_FACTOR,
    &STOCK_TECH_FACTOR_PRO,
    &STOCK_MONEY_FLOW,
];

/// 통합 동기화의 원장 키.
fn composite_sync_type(ts_codes: Option<&[String]>) -> String {
    match ts_codes {
        Some(codes) => format!("daily_all_{}", codes.join("_")),
        None => "daily_all".to_string(),
    }
}

/// 단일 거래일의 전체 데이터셋 동기화.
///
/// `ts_codes`가 주어지면 매집 분포는 해당 종목만 돌고, 시장 전체
/// 데이터셋은 건너뜁니다. 통합 결과는 `daily_all[_{codes}]` 원장 키로
/// 시도당 한 번 기록됩니다.
pub async fn sync_daily_by_date(
    pool: &PgPool,
    client: &TushareClient,
    trade_date: &str,
    ts_codes: Option<&[String]>,
) -> Result<SyncSummary> {
    tracing::info!(trade_date, ts_codes = ?ts_codes, "일별 데이터 동기화 시작");

    let ledger = SyncLedger::new(pool.clone());
    let sync_type = composite_sync_type(ts_codes);

    if ledger.is_synced(trade_date, &sync_type).await? {
        tracing::info!(trade_date, "이미 동기화됨, 건너뜀");
        return Ok(SyncSummary {
            skipped: true,
            ..Default::default()
        });
    }

    let mut summary = SyncSummary {
        synced_dates: 1,
        ..Default::default()
    };

    // 날짜별 배치 데이터셋
    for schema in STOCK_DATE_DATASETS {
        let outcome = sync_dataset_for_date(pool, client, &ledger, schema, trade_date).await;
        if let UnitOutcome::Written(rows) = outcome {
            summary.add(schema.name, rows);
        }
    }

    // 종목×날짜 매트릭스 (명부 읽기 실패는 전제 조건 실패)
    let dates = vec![trade_date.to_string()];
    match sync_chips(pool, client, &dates, ts_codes).await {
        Ok(stats) => summary.add(STOCK_CHIP.name, stats.rows),
        Err(e) => {
            let message = e.to_string();
            if let Err(ledger_err) = ledger
                .record(trade_date, &sync_type, SyncStatus::Failed, 0, Some(&message))
                .await
            {
                tracing::warn!(trade_date, error = %ledger_err, "원장 기록 실패");
            }
            tracing::error!(trade_date, error = %message, "일별 데이터 동기화 실패");
            return Err(e);
        }
    }

    // 시장 전체 데이터셋 (전량 동기화일 때만)
    if ts_codes.is_none() {
        for schema in MARKET_DATE_DATASETS {
            let outcome = sync_dataset_for_date(pool, client, &ledger, schema, trade_date).await;
            if let UnitOutcome::Written(rows) = outcome {
                summary.add(schema.name, rows);
            }
        }
    }

    ledger
        .record(
            trade_date,
            &sync_type,
            SyncStatus::Success,
            summary.total_rows as i64,
            None,
        )
        .await?;

    tracing::info!(trade_date, total_rows = summary.total_rows, "일별 데이터 동기화 완료");
    Ok(summary)
}

/// 날짜 범위의 전체 데이터셋 동기화.
///
/// 거래일 달력으로 개장일만 거릅니다. 달력 조회 실패는 전파합니다.
pub async fn sync_daily_by_range(
    pool: &PgPool,
    client: &TushareClient,
    start_date: &str,
    end_date: &str,
    ts_codes: Option<&[String]>,
) -> Result<SyncSummary> {
    tracing::info!(start_date, end_date, ts_codes = ?ts_codes, "기간 데이터 동기화 시작");

    let dates = trading_dates(client, start_date, end_date).await?;
    if dates.is_empty() {
        tracing::info!(start_date, end_date, "기간 내 개장일 없음");
        return Ok(SyncSummary::default());
    }

    let mut summary = SyncSummary {
        synced_dates: dates.len(),
        ..Default::default()
    };

    if let Some(codes) = ts_codes {
        // 지정 종목: 범위 한 호출씩 당긴다. 멱등 upsert가 체크포인트라
        // 원장 항목은 남기지 않는다.
        for ts_code in codes {
            for schema in STOCK_RANGE_DATASETS {
                let filter = QueryFilter::new()
                    .ts_code(ts_code)
                    .start_date(start_date)
                    .end_date(end_date);
                match fetch_and_store(pool, client, schema, &filter).await {
                    Ok(rows) => summary.add(schema.name, rows),
                    Err(e) => {
                        tracing::error!(ts_code, dataset = schema.name, error = %e, "종목 동기화 실패");
                        continue;
                    }
                }
            }
        }
    } else {
        // 전량: 날짜별 배치 + 매트릭스 + 시장 데이터
        for schema in STOCK_DATE_DATASETS {
            let stats = sync_dataset_by_dates(pool, client, schema, &dates).await;
            summary.add(schema.name, stats.rows);
        }

        let chip_stats = sync_chips(pool, client, &dates, None).await?;
        summary.add(STOCK_CHIP.name, chip_stats.rows);

        for schema in MARKET_DATE_DATASETS {
            let stats = sync_dataset_by_dates(pool, client, schema, &dates).await;
            summary.add(schema.name, stats.rows);
        }
    }

    tracing::info!(
        start_date,
        end_date,
        synced_dates = summary.synced_dates,
        total_rows = summary.total_rows,
        "기간 데이터 동기화 완료"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_composite_sync_type() {
        assert_eq!(composite_sync_type(None), "daily_all");

        let codes = vec!["000001.SZ".to_string(), "000002.SZ".to_string()];
        assert_eq!(
            composite_sync_type(Some(&codes)),
            "daily_all_000001.SZ_000002.SZ"
        );
    }
}
