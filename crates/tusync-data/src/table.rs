//! 상류 API의 표 형식 응답.
//!
//! TuShare는 `{fields: [...], items: [[...], ...]}` 형태의 컬럼명 + 행
//! 배열로 응답합니다. 저장 계층은 필드명 → 값 맵으로 변환된 레코드를
//! 소비합니다.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

/// 필드명 → JSON 값 맵 한 행.
pub type Record = HashMap<String, Value>;

/// 표 형식 결과 집합.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DataTable {
    /// 컬럼 이름 목록
    #[serde(default)]
    pub fields: Vec<String>,
    /// 행 데이터 (fields와 같은 순서)
    #[serde(default)]
    pub items: Vec<Vec<Value>>,
}

impl DataTable {
    /// 행 수.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// 빈 결과인지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// 행을 필드명 → 값 맵으로 변환합니다.
    ///
    /// 행이 컬럼 수보다 짧으면 남은 필드는 생략되고, 길면 넘치는 값은
    /// 버려집니다.
    pub fn records(&self) -> Vec<Record> {
        self.items
            .iter()
            .map(|row| {
                self.fields
                    .iter()
                    .zip(row.iter())
                    .map(|(name, value)| (name.clone(), value.clone()))
                    .collect()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_records_zip_fields_and_rows() {
        let table = DataTable {
            fields: vec!["ts_code".into(), "close".into()],
            items: vec![
                vec![json!("000001.SZ"), json!(10.55)],
                vec![json!("000002.SZ"), json!(Value::Null)],
            ],
        };

        let records = table.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["ts_code"], json!("000001.SZ"));
        assert_eq!(records[0]["close"], json!(10.55));
        assert_eq!(records[1]["close"], Value::Null);
    }

    #[test]
    fn test_short_row_omits_missing_fields() {
        let table = DataTable {
            fields: vec!["a".into(), "b".into()],
            items: vec![vec![json!(1)]],
        };

        let records = table.records();
        assert!(records[0].contains_key("a"));
        assert!(!records[0].contains_key("b"));
    }

    #[test]
    fn test_deserialize_with_missing_parts() {
        let table: DataTable = serde_json::from_str("{}").unwrap();
        assert!(table.is_empty());
        assert_eq!(table.len(), 0);
    }
}
