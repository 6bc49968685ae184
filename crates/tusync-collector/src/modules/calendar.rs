//! 거래일 달력 조회.
//!
//! 달력 조회 실패는 배치 전체의 전제 조건 실패이므로 단위 실패처럼
//! 삼키지 않고 호출자에게 전파합니다.

use serde_json::Value;

use tusync_data::{DataTable, QueryFilter, TushareClient};

use crate::error::Result;

/// 달력 테이블에서 개장일(`is_open = 1`)의 `cal_date`만 추립니다.
///
/// 상류가 `is_open`을 숫자로도 문자열로도 돌려주는 경우가 있어 둘 다
/// 허용합니다.
pub fn open_dates(table: &DataTable) -> Vec<String> {
    let mut dates: Vec<String> = table
        .records()
        .iter()
        .filter(|record| match record.get("is_open") {
            Some(Value::Number(n)) => n.as_i64() == Some(1),
            Some(Value::String(s)) => s == "1",
            _ => false,
        })
        .filter_map(|record| {
            record
                .get("cal_date")
                .and_then(|v| v.as_str())
                .map(String::from)
        })
        .collect();
    dates.sort_unstable();
    dates
}

/// 기간 내 개장일 목록을 조회합니다.
pub async fn trading_dates(
    client: &TushareClient,
    start_date: &str,
    end_date: &str,
) -> Result<Vec<String>> {
    let table = client
        .trade_cal(
            &QueryFilter::new()
                .start_date(start_date)
                .end_date(end_date),
        )
        .await?;

    let dates = open_dates(&table);
    tracing::info!(
        start_date,
        end_date,
        open_days = dates.len(),
        "거래일 달력 조회 완료"
    );
    Ok(dates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_open_dates_filters_closed_days() {
        let table = DataTable {
            fields: vec!["cal_date".into(), "is_open".into()],
            items: vec![
                vec![json!("20240101"), json!(0)],
                vec![json!("20240102"), json!(1)],
                vec![json!("20240103"), json!("1")],
                vec![json!("20240104"), json!("0")],
            ],
        };

        assert_eq!(open_dates(&table), vec!["20240102", "20240103"]);
    }

    #[test]
    fn test_open_dates_empty_table() {
        assert!(open_dates(&DataTable::default()).is_empty());
    }
}
