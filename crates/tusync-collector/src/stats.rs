//! 동기화 단위 결과와 집계 통계.
//!
//! 루프 안의 단위 실패는 예외 되감기가 아니라 값으로 표현합니다.
//! 수천 단위 배치에서 산발적 단일 실패가 형제 단위를 중단시키면 안
//! 됩니다.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Serialize;

/// 단일 동기화 단위 (날짜, 데이터셋[, 종목])의 결과.
#[derive(Debug, Clone)]
pub enum UnitOutcome {
    /// 적재 완료 (쓰인 행 수)
    Written(u64),
    /// 원장에 이미 성공 기록이 있어 건너뜀
    Skipped,
    /// 조회 성공, 데이터 없음 (0건 성공으로 기록됨)
    Empty,
    /// 실패 (원장에 failed로 기록됨, 형제 단위는 계속)
    Failed(String),
}

/// 동기화 작업 통계
#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncStats {
    /// 총 시도 횟수
    pub total: usize,
    /// 성공 횟수
    pub success: usize,
    /// 에러 횟수
    pub errors: usize,
    /// 건너뛴 횟수 (원장에 이미 성공 기록)
    pub skipped: usize,
    /// 빈 데이터 (조회 성공, 데이터 없음)
    pub empty: usize,
    /// 적재된 총 행 수
    pub rows: u64,
    /// 소요 시간
    #[serde(skip)]
    pub elapsed: Duration,
}

impl SyncStats {
    /// 새 통계 객체 생성
    pub fn new() -> Self {
        Self::default()
    }

    /// 단위 결과를 반영합니다.
    pub fn observe(&mut self, outcome: &UnitOutcome) {
        self.total += 1;
        match outcome {
            UnitOutcome::Written(rows) => {
                self.success += 1;
                self.rows += rows;
            }
            UnitOutcome::Skipped => self.skipped += 1,
            UnitOutcome::Empty => {
                self.success += 1;
                self.empty += 1;
            }
            UnitOutcome::Failed(_) => self.errors += 1,
        }
    }

    /// 성공률 계산 (%)
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.success as f64 / self.total as f64) * 100.0
        }
    }

    /// 통계 요약 로그 출력
    pub fn log_summary(&self, operation: &str) {
        tracing::info!(
            operation = operation,
            total = self.total,
            success = self.success,
            errors = self.errors,
            skipped = self.skipped,
            empty = self.empty,
            rows = self.rows,
            success_rate = format!("{:.1}%", self.success_rate()),
            elapsed = format!("{:.1}s", self.elapsed.as_secs_f64()),
            "동기화 완료"
        );
    }
}

/// 데이터셋별 적재 행 수 요약.
///
/// 호출자(CLI/HTTP 계층)에 보고되는 최종 결과입니다.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncSummary {
    /// 데이터셋 이름 → 적재 행 수
    pub details: BTreeMap<String, u64>,
    /// 총 적재 행 수
    pub total_rows: u64,
    /// 처리한 거래일 수
    pub synced_dates: usize,
    /// 원장 게이트로 전체를 건너뛰었는지 여부
    pub skipped: bool,
}

impl SyncSummary {
    /// 데이터셋 적재 행 수를 누적합니다.
    pub fn add(&mut self, dataset: &str, rows: u64) {
        *self.details.entry(dataset.to_string()).or_insert(0) += rows;
        self.total_rows += rows;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observe_counts_each_outcome() {
        let mut stats = SyncStats::new();
        stats.observe(&UnitOutcome::Written(100));
        stats.observe(&UnitOutcome::Written(50));
        stats.observe(&UnitOutcome::Skipped);
        stats.observe(&UnitOutcome::Empty);
        stats.observe(&UnitOutcome::Failed("boom".into()));

        assert_eq!(stats.total, 5);
        assert_eq!(stats.success, 3);
        assert_eq!(stats.errors, 1);
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.empty, 1);
        assert_eq!(stats.rows, 150);
    }

    #[test]
    fn test_success_rate() {
        let mut stats = SyncStats::new();
        assert_eq!(stats.success_rate(), 0.0);

        stats.observe(&UnitOutcome::Written(1));
        stats.observe(&UnitOutcome::Failed("x".into()));
        assert!((stats.success_rate() - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_summary_accumulates_by_dataset() {
        let mut summary = SyncSummary::default();
        summary.add("stock_daily", 100);
        summary.add("stock_daily", 20);
        summary.add("stock_chip", 5);

        assert_eq!(summary.details["stock_daily"], 120);
        assert_eq!(summary.details["stock_chip"], 5);
        assert_eq!(summary.total_rows, 125);
    }
}
