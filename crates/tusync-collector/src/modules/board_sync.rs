//! 블록(업종/콘셉트) 명부와 구성 종목 동기화.
//!
//! 명부는 전량 upsert, 구성 종목은 블록 단위 삭제-후-삽입 교체입니다.
//! 단일 블록 실패는 기록 후 다음 블록으로 계속합니다.

use serde_json::Value;
use sqlx::PgPool;

use tusync_core::catalog::{DC_BLOCK, DC_BLOCK_DETAIL, THS_BLOCK, THS_BLOCK_DETAIL};
use tusync_data::storage::{batch_upsert, replace_members, roster};
use tusync_data::{QueryFilter, Record, TushareClient};

use crate::error::Result;
use crate::stats::{SyncStats, SyncSummary, UnitOutcome};

/// 구성 종목 수가 0이거나 없는 명부 행인지 확인합니다.
fn has_members(record: &Record) -> bool {
    match record.get("count") {
        Some(Value::Number(n)) => n.as_i64().unwrap_or(0) > 0,
        Some(Value::String(s)) => s.parse::<i64>().unwrap_or(0) > 0,
        _ => false,
    }
}

/// THS 블록 명부 + 구성 종목 동기화.
pub async fn sync_ths_boards(pool: &PgPool, client: &TushareClient) -> Result<SyncSummary> {
    tracing::info!("THS 블록 동기화 시작");
    let mut summary = SyncSummary::default();

    let table = client.ths_index(&QueryFilter::new()).await?;
    if table.is_empty() {
        tracing::warn!("THS 블록 명부 데이터가 비어 있습니다");
        return Ok(summary);
    }

    // 구성 종목이 없는 블록은 제외한다
    let records: Vec<Record> = table.records().into_iter().filter(has_members).collect();
    if records.is_empty() {
        tracing::warn!("필터링 후 유효한 블록이 없습니다");
        return Ok(summary);
    }

    let count = batch_upsert(pool, &THS_BLOCK, &records).await?;
    summary.add(THS_BLOCK.name, count);
    tracing::info!(count, "THS 블록 명부 동기화 완료");

    let member_stats = sync_block_members(pool, client, MemberSource::Ths).await?;
    summary.add(THS_BLOCK_DETAIL.name, member_stats.rows);

    Ok(summary)
}

/// DC 블록 명부 + 구성 종목 동기화.
///
/// DC 명부는 일자별 스냅샷이므로 날짜 필터를 받을 수 있습니다.
pub async fn sync_dc_boards(
    pool: &PgPool,
    client: &TushareClient,
    trade_date: Option<&str>,
) -> Result<SyncSummary> {
    tracing::info!(trade_date = ?trade_date, "DC 블록 동기화 시작");
    let mut summary = SyncSummary::default();

    let mut filter = QueryFilter::new();
    if let Some(date) = trade_date {
        filter = filter.trade_date(date);
    }

    let table = client.dc_index(&filter).await?;
    if table.is_empty() {
        tracing::warn!("DC 블록 명부 데이터가 비어 있습니다");
        return Ok(summary);
    }

    let count = batch_upsert(pool, &DC_BLOCK, &table.records()).await?;
    summary.add(DC_BLOCK.name, count);
    tracing::info!(count, "DC 블록 명부 동기화 완료");

    let member_stats = sync_block_members(pool, client, MemberSource::Dc).await?;
    summary.add(DC_BLOCK_DETAIL.name, member_stats.rows);

    Ok(summary)
}

/// 구성 종목 출처.
#[derive(Debug, Clone, Copy)]
enum MemberSource {
    Ths,
    Dc,
}

/// 전체 블록의 구성 종목 교체.
async fn sync_block_members(
    pool: &PgPool,
    client: &TushareClient,
    source: MemberSource,
) -> Result<SyncStats> {
    let start = std::time::Instant::now();
    let (roster_schema, detail_schema) = match source {
        MemberSource::Ths => (&THS_BLOCK, &THS_BLOCK_DETAIL),
        MemberSource::Dc => (&DC_BLOCK, &DC_BLOCK_DETAIL),
    };

    let blocks = roster::all_block_codes(pool, roster_schema).await?;
    tracing::info!(blocks = blocks.len(), dataset = detail_schema.name, "구성 종목 동기화 시작");

    let mut stats = SyncStats::new();
    for block_code in &blocks {
        let outcome: std::result::Result<u64, tusync_data::DataError> = async {
            let filter = QueryFilter::new().ts_code(block_code);
            let table = match source {
                MemberSource::Ths => client.ths_member(&filter).await?,
                MemberSource::Dc => client.dc_member(&filter).await?,
            };

            if table.is_empty() {
                return Ok(0);
            }
            replace_members(pool, detail_schema, block_code, &table.records()).await
        }
        .await;

        let outcome = match outcome {
            Ok(0) => {
                tracing::debug!(block_code, "구성 종목 데이터 없음");
                UnitOutcome::Empty
            }
            Ok(count) => UnitOutcome::Written(count),
            Err(e) => {
                tracing::error!(block_code, error = %e, "구성 종목 동기화 실패");
                UnitOutcome::Failed(e.to_string())
            }
        };
        stats.observe(&outcome);
    }

    stats.elapsed = start.elapsed();
    stats.log_summary(detail_schema.name);
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    fn record(value: Value) -> Record {
        value
            .as_object()
            .unwrap()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect::<HashMap<_, _>>()
    }

    #[test]
    fn test_has_members_filters_empty_blocks() {
        assert!(has_members(&record(json!({"count": 12}))));
        assert!(has_members(&record(json!({"count": "3"}))));
        assert!(!has_members(&record(json!({"count": 0}))));
        assert!(!has_members(&record(json!({"count": null}))));
        assert!(!has_members(&record(json!({"name": "블록"}))));
    }
}
