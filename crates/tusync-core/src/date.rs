//! 거래일 문자열(YYYYMMDD) 유틸리티.
//!
//! 상류 API와 저장소 모두 거래일을 `YYYYMMDD` 8자리 문자열로 다룹니다.
//! 이 모듈은 검증과 달력일 범위 생성을 제공합니다. 실제 개장일 필터링은
//! 거래일 달력 API 결과로 수행합니다.

use chrono::{Duration, NaiveDate, Utc};

use crate::error::{TusyncError, TusyncResult};

/// 거래일 문자열 형식.
pub const TRADE_DATE_FORMAT: &str = "%Y%m%d";

/// `YYYYMMDD` 문자열을 NaiveDate로 파싱합니다.
pub fn parse_trade_date(s: &str) -> TusyncResult<NaiveDate> {
    NaiveDate::parse_from_str(s, TRADE_DATE_FORMAT)
        .map_err(|_| TusyncError::InvalidInput(format!("잘못된 거래일 형식: {}", s)))
}

/// 유효한 `YYYYMMDD` 문자열인지 검사합니다.
pub fn is_valid_trade_date(s: &str) -> bool {
    parse_trade_date(s).is_ok()
}

/// 오늘 날짜를 `YYYYMMDD` 문자열로 반환합니다.
pub fn today() -> String {
    Utc::now().format(TRADE_DATE_FORMAT).to_string()
}

/// 시작일부터 종료일까지(양끝 포함) 달력일 목록을 생성합니다.
///
/// 시작일이 종료일보다 뒤면 빈 목록을 반환합니다.
pub fn date_range(start: &str, end: &str) -> TusyncResult<Vec<String>> {
    let start = parse_trade_date(start)?;
    let end = parse_trade_date(end)?;

    let mut dates = Vec::new();
    let mut current = start;
    while current <= end {
        dates.push(current.format(TRADE_DATE_FORMAT).to_string());
        current = current + Duration::days(1);
    }
    Ok(dates)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trade_date() {
        assert!(parse_trade_date("20240102").is_ok());
        assert!(parse_trade_date("2024-01-02").is_err());
        assert!(parse_trade_date("20240230").is_err());
        assert!(parse_trade_date("").is_err());
    }

    #[test]
    fn test_date_range_inclusive() {
        let dates = date_range("20231230", "20240102").unwrap();
        assert_eq!(
            dates,
            vec!["20231230", "20231231", "20240101", "20240102"]
        );
    }

    #[test]
    fn test_date_range_reversed_is_empty() {
        let dates = date_range("20240102", "20240101").unwrap();
        assert!(dates.is_empty());
    }

    #[test]
    fn test_today_format() {
        let t = today();
        assert_eq!(t.len(), 8);
        assert!(is_valid_trade_date(&t));
    }
}
