//! 동기화 원장.
//!
//! `(거래일, 동기화 유형)` 쌍별 성공/실패 결과를 기록해 배치 재개의
//! 기반이 됩니다. `sync_type`은 데이터셋 이름이며, 종목 단위 재개가
//! 필요한 데이터셋은 종목 코드를 접미사로 붙인 복합 이름을 씁니다
//! (예: `stock_chip_000001.SZ`).
//!
//! 원장 항목은 시도마다 제자리 덮어쓰기되며(append 아님) 오케스트레이터가
//! 삭제하지 않습니다. `success`에 `record_count = 0`은 정상 종결 상태
//! (휴장일, 희소 데이터셋)이고, 0이라는 이유로 재시도하지 않습니다.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use crate::error::Result;

/// 동기화 시도 결과 상태.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    /// 성공 (0건 포함)
    Success,
    /// 실패 (다음 패스에서 재시도 대상)
    Failed,
}

impl SyncStatus {
    /// 문자열로 변환.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failed => "failed",
        }
    }
}

/// 원장 레코드.
#[derive(Debug, Clone, FromRow, serde::Serialize)]
pub struct SyncRecord {
    pub trade_date: String,
    pub sync_type: String,
    pub status: String,
    pub record_count: i64,
    pub error_msg: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 동기화 원장 저장소.
#[derive(Clone)]
pub struct SyncLedger {
    pool: PgPool,
}

impl SyncLedger {
    /// 새 원장 저장소를 생성합니다.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 해당 쌍이 성공적으로 동기화되었는지 확인합니다.
    ///
    /// `failed` 항목은 동기화된 것으로 치지 않습니다.
    pub async fn is_synced(&self, trade_date: &str, sync_type: &str) -> Result<bool> {
        let exists: Option<(i32,)> = sqlx::query_as(
            r#"
            SELECT 1
            FROM sync_record
            WHERE trade_date = $1 AND sync_type = $2 AND status = 'success'
            LIMIT 1
            "#,
        )
        .bind(trade_date)
        .bind(sync_type)
        .fetch_optional(&self.pool)
        .await?;

        Ok(exists.is_some())
    }

    /// 아직 성공하지 못한 날짜 목록을 반환합니다 (입력 순서 유지).
    pub async fn unsynced_dates(&self, dates: &[String], sync_type: &str) -> Result<Vec<String>> {
        if dates.is_empty() {
            return Ok(Vec::new());
        }

        let synced: Vec<(String,)> = sqlx::query_as(
            r#"
            SELECT trade_date
            FROM sync_record
            WHERE trade_date = ANY($1) AND sync_type = $2 AND status = 'success'
            "#,
        )
        .bind(dates)
        .bind(sync_type)
        .fetch_all(&self.pool)
        .await?;

        let synced: std::collections::HashSet<String> =
            synced.into_iter().map(|(d,)| d).collect();

        Ok(dates
            .iter()
            .filter(|d| !synced.contains(*d))
            .cloned()
            .collect())
    }

    /// 동기화 시도 결과를 기록합니다.
    ///
    /// 같은 쌍의 기존 항목은 상태/건수/오류가 제자리 덮어쓰기됩니다.
    /// 시도당 정확히 한 번, 성공이든 실패든 호출해야 합니다.
    pub async fn record(
        &self,
        trade_date: &str,
        sync_type: &str,
        status: SyncStatus,
        record_count: i64,
        error_msg: Option<&str>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO sync_record (trade_date, sync_type, status, record_count, error_msg, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, NOW(), NOW())
            ON CONFLICT (trade_date, sync_type)
            DO UPDATE SET
                status = EXCLUDED.status,
                record_count = EXCLUDED.record_count,
                error_msg = EXCLUDED.error_msg,
                updated_at = NOW()
            "#,
        )
        .bind(trade_date)
        .bind(sync_type)
        .bind(status.as_str())
        .bind(record_count)
        .bind(error_msg)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// 최근 원장 항목 목록 (갱신 시각 역순).
    pub async fn recent(&self, limit: i64) -> Result<Vec<SyncRecord>> {
        let records: Vec<SyncRecord> = sqlx::query_as(
            r#"
            SELECT trade_date, sync_type, status, record_count, error_msg, created_at, updated_at
            FROM sync_record
            ORDER BY updated_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// 실패 상태 항목 목록 (갱신 시각 역순).
    pub async fn failures(&self, limit: i64) -> Result<Vec<SyncRecord>> {
        let records: Vec<SyncRecord> = sqlx::query_as(
            r#"
            SELECT trade_date, sync_type, status, record_count, error_msg, created_at, updated_at
            FROM sync_record
            WHERE status = 'failed'
            ORDER BY updated_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_as_str() {
        assert_eq!(SyncStatus::Success.as_str(), "success");
        assert_eq!(SyncStatus::Failed.as_str(), "failed");
    }
}
