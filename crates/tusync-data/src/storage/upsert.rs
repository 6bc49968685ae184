//! 범용 배치 upsert.
//!
//! 데이터셋 스키마 기술자로 수신 레코드를 필터링한 뒤, 고유키 충돌 시
//! 비키 컬럼을 갱신하는 멀티로우 INSERT를 한 트랜잭션으로 실행합니다.
//!
//! # 누락 필드 정책
//!
//! 필수(NOT NULL) 컬럼이 비어 있는 레코드는 오류 없이 버려집니다. 이는
//! 상류 데이터 품질 공백을 가리는 silent-drop 정책이며, 반환되는 쓰기
//! 건수와 debug 로그의 제외 건수로만 드러납니다.

use std::collections::HashMap;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::Value;
use sqlx::{PgPool, Postgres, QueryBuilder};

use tusync_core::catalog::{DatasetSchema, FieldKind};

use crate::error::Result;
use crate::table::Record;

/// 문장당 바인드 파라미터 상한 (PostgreSQL 프로토콜 한계 65535 아래).
const BIND_LIMIT: usize = 60_000;

/// 바인딩 직전의 타입 지정 값.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum SqlValue {
    Text(String),
    Int(i64),
    Num(Decimal),
    Null,
}

/// JSON 값을 컬럼 타입에 맞춰 변환합니다.
///
/// 변환할 수 없는 값은 NULL로 취급합니다 (필수 컬럼이면 해당 레코드가
/// 버려집니다).
fn convert(value: &Value, kind: FieldKind) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::String(s) => match kind {
            FieldKind::Text => SqlValue::Text(s.clone()),
            FieldKind::Integer => s.parse().map(SqlValue::Int).unwrap_or(SqlValue::Null),
            FieldKind::Decimal => Decimal::from_str(s)
                .map(SqlValue::Num)
                .unwrap_or(SqlValue::Null),
        },
        Value::Number(n) => match kind {
            FieldKind::Text => SqlValue::Text(n.to_string()),
            FieldKind::Integer => match n.as_i64() {
                Some(i) => SqlValue::Int(i),
                None => n
                    .as_f64()
                    .filter(|f| f.fract() == 0.0)
                    .map(|f| SqlValue::Int(f as i64))
                    .unwrap_or(SqlValue::Null),
            },
            // 숫자 리터럴 문자열을 그대로 파싱해 정밀도를 유지한다.
            // 이 계층에서는 반올림하지 않는다.
            FieldKind::Decimal => Decimal::from_str(&n.to_string())
                .map(SqlValue::Num)
                .unwrap_or(SqlValue::Null),
        },
        _ => SqlValue::Null,
    }
}

/// 한 행: 컬럼 이름 → 타입 지정 값.
pub(crate) type SqlRow = HashMap<&'static str, SqlValue>;

/// 스키마 기술자로 레코드를 필터링합니다.
///
/// - 기술자에 없는 필드는 버립니다.
/// - 필수 컬럼(고유키 포함)이 누락/NULL인 레코드는 통째로 제외합니다.
///
/// 반환: (살아남은 행, 제외된 레코드 수)
pub(crate) fn filter_records(schema: &DatasetSchema, records: &[Record]) -> (Vec<SqlRow>, usize) {
    let mut rows = Vec::with_capacity(records.len());
    let mut dropped = 0usize;

    'records: for record in records {
        let mut row = SqlRow::new();
        for field in schema.fields {
            if let Some(value) = record.get(field.name) {
                row.insert(field.name, convert(value, field.kind));
            }
        }

        for name in schema.required_fields() {
            match row.get(name) {
                None | Some(SqlValue::Null) => {
                    dropped += 1;
                    continue 'records;
                }
                _ => {}
            }
        }

        rows.push(row);
    }

    (rows, dropped)
}

/// 식별자 인용 ("change", "limit" 같은 예약어 컬럼 대비).
fn quote(ident: &str) -> String {
    format!("\"{}\"", ident)
}

/// INSERT 충돌 처리 방식.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConflictAction {
    /// 고유키 충돌 시 비키 컬럼 갱신
    Update,
    /// 고유키 충돌 시 무시
    Nothing,
}

/// 멀티로우 INSERT 문을 조립합니다.
fn build_insert<'a>(
    schema: &DatasetSchema,
    columns: &[&'static str],
    chunk: &'a [SqlRow],
    action: ConflictAction,
) -> QueryBuilder<'a, Postgres> {
    let mut qb: QueryBuilder<Postgres> =
        QueryBuilder::new(format!("INSERT INTO {} (", schema.table));
    let quoted: Vec<String> = columns.iter().map(|c| quote(c)).collect();
    qb.push(quoted.join(", "));
    qb.push(") ");

    qb.push_values(chunk.iter(), |mut b, row| {
        for col in columns {
            match row.get(col) {
                Some(SqlValue::Text(s)) => {
                    b.push_bind(s.clone());
                }
                Some(SqlValue::Int(i)) => {
                    b.push_bind(*i);
                }
                Some(SqlValue::Num(d)) => {
                    b.push_bind(*d);
                }
                // NULL은 컬럼 타입에 맞춰 바인딩해야 VALUES 행 간
                // 타입 통일이 유지된다
                Some(SqlValue::Null) | None => match schema.field(col).map(|f| f.kind) {
                    Some(FieldKind::Integer) => {
                        b.push_bind(None::<i64>);
                    }
                    Some(FieldKind::Decimal) => {
                        b.push_bind(None::<Decimal>);
                    }
                    _ => {
                        b.push_bind(None::<String>);
                    }
                },
            }
        }
    });

    qb.push(" ON CONFLICT (");
    let keys: Vec<String> = schema.unique_key.iter().map(|k| quote(k)).collect();
    qb.push(keys.join(", "));
    qb.push(")");

    match action {
        ConflictAction::Nothing => {
            qb.push(" DO NOTHING");
        }
        ConflictAction::Update => {
            let updates: Vec<String> = columns
                .iter()
                .filter(|c| !schema.is_key(c))
                .map(|c| format!("{} = EXCLUDED.{}", quote(c), quote(c)))
                .collect();

            if updates.is_empty() {
                qb.push(" DO NOTHING");
            } else {
                qb.push(" DO UPDATE SET ");
                qb.push(updates.join(", "));
                qb.push(", \"updated_at\" = NOW()");
            }
        }
    }

    qb
}

/// 배치에 실제로 등장한 컬럼 목록 (스키마 순서 유지).
fn batch_columns(schema: &DatasetSchema, rows: &[SqlRow]) -> Vec<&'static str> {
    schema
        .fields
        .iter()
        .map(|f| f.name)
        .filter(|name| rows.iter().any(|row| row.contains_key(name)))
        .collect()
}

/// 배치 insert-or-update.
///
/// 살아남은 레코드 전체가 한 트랜잭션으로 쓰이거나 전혀 쓰이지 않습니다.
/// 같은 입력으로 두 번 호출해도 저장 상태는 한 번 호출과 동일합니다.
///
/// 빈 입력은 트랜잭션 없이 0을 반환합니다.
pub async fn batch_upsert(
    pool: &PgPool,
    schema: &DatasetSchema,
    records: &[Record],
) -> Result<u64> {
    if records.is_empty() {
        return Ok(0);
    }

    let (rows, dropped) = filter_records(schema, records);
    if dropped > 0 {
        tracing::debug!(
            table = schema.table,
            dropped,
            "필수 컬럼 누락으로 제외된 레코드"
        );
    }
    if rows.is_empty() {
        return Ok(0);
    }

    let columns = batch_columns(schema, &rows);
    let chunk_rows = (BIND_LIMIT / columns.len()).max(1);

    let mut tx = pool.begin().await.map_err(crate::error::DataError::from)?;
    let mut written = 0u64;

    for chunk in rows.chunks(chunk_rows) {
        let mut qb = build_insert(schema, &columns, chunk, ConflictAction::Update);
        match qb.build().execute(&mut *tx).await {
            Ok(result) => written += result.rows_affected(),
            Err(e) => {
                tx.rollback().await.ok();
                tracing::error!(table = schema.table, error = %e, "배치 upsert 실패, 롤백");
                return Err(e.into());
            }
        }
    }

    tx.commit().await.map_err(crate::error::DataError::from)?;
    Ok(written)
}

/// 엔티티 범위 교체 (블록 구성 종목, 종목별 주주 명단).
///
/// 구성원 제외가 의미를 갖는 데이터셋은 upsert 대신 `ts_code` 범위
/// 삭제-후-삽입으로 교체합니다. 삭제와 삽입은 한 트랜잭션입니다.
pub async fn replace_members(
    pool: &PgPool,
    schema: &DatasetSchema,
    block_code: &str,
    records: &[Record],
) -> Result<u64> {
    let (rows, dropped) = filter_records(schema, records);
    if dropped > 0 {
        tracing::debug!(
            table = schema.table,
            dropped,
            "필수 컬럼 누락으로 제외된 레코드"
        );
    }

    let mut tx = pool.begin().await.map_err(crate::error::DataError::from)?;

    let delete_sql = format!("DELETE FROM {} WHERE \"ts_code\" = $1", schema.table);
    if let Err(e) = sqlx::query(&delete_sql)
        .bind(block_code)
        .execute(&mut *tx)
        .await
    {
        tx.rollback().await.ok();
        return Err(e.into());
    }

    let mut written = 0u64;
    if !rows.is_empty() {
        let columns = batch_columns(schema, &rows);
        let chunk_rows = (BIND_LIMIT / columns.len()).max(1);

        for chunk in rows.chunks(chunk_rows) {
            let mut qb = build_insert(schema, &columns, chunk, ConflictAction::Nothing);
            match qb.build().execute(&mut *tx).await {
                Ok(result) => written += result.rows_affected(),
                Err(e) => {
                    tx.rollback().await.ok();
                    tracing::error!(table = schema.table, error = %e, "구성 종목 교체 실패, 롤백");
                    return Err(e.into());
                }
            }
        }
    }

    tx.commit().await.map_err(crate::error::DataError::from)?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;
    use tusync_core::catalog::STOCK_DAILY;

    fn record(value: serde_json::Value) -> Record {
        value
            .as_object()
            .unwrap()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    #[test]
    fn test_filter_drops_record_missing_key_field() {
        let records = vec![
            record(json!({"ts_code": "000001.SZ", "trade_date": "20240102", "close": 10.5})),
            record(json!({"ts_code": null, "trade_date": "20240102", "close": 11.0})),
            record(json!({"trade_date": "20240102", "close": 12.0})),
        ];

        let (rows, dropped) = filter_records(&STOCK_DAILY, &records);
        assert_eq!(rows.len(), 1);
        assert_eq!(dropped, 2);
    }

    #[test]
    fn test_filter_strips_unknown_fields() {
        let records = vec![record(json!({
            "ts_code": "000001.SZ",
            "trade_date": "20240102",
            "close": 10.5,
            "not_a_column": "whatever"
        }))];

        let (rows, dropped) = filter_records(&STOCK_DAILY, &records);
        assert_eq!(dropped, 0);
        assert!(!rows[0].contains_key("not_a_column"));
        assert_eq!(rows[0]["close"], SqlValue::Num(dec!(10.5)));
    }

    #[test]
    fn test_filter_keeps_explicit_null_for_nullable_field() {
        let records = vec![record(json!({
            "ts_code": "000001.SZ",
            "trade_date": "20240102",
            "close": null
        }))];

        let (rows, dropped) = filter_records(&STOCK_DAILY, &records);
        assert_eq!(dropped, 0);
        assert_eq!(rows[0]["close"], SqlValue::Null);
    }

    #[test]
    fn test_convert_preserves_decimal_literal() {
        // f64 최단 왕복 표현을 통해 시세 리터럴이 그대로 보존된다
        let value = json!(1234.5678);
        assert_eq!(
            convert(&value, FieldKind::Decimal),
            SqlValue::Num(dec!(1234.5678))
        );

        let value = json!("0.0123");
        assert_eq!(
            convert(&value, FieldKind::Decimal),
            SqlValue::Num(dec!(0.0123))
        );
    }

    #[test]
    fn test_convert_integer_from_number_and_string() {
        assert_eq!(convert(&json!(42), FieldKind::Integer), SqlValue::Int(42));
        assert_eq!(convert(&json!("42"), FieldKind::Integer), SqlValue::Int(42));
        assert_eq!(convert(&json!(42.0), FieldKind::Integer), SqlValue::Int(42));
        assert_eq!(convert(&json!(4.2), FieldKind::Integer), SqlValue::Null);
    }

    #[test]
    fn test_batch_columns_follow_schema_order() {
        let records = vec![record(json!({
            "close": 10.5,
            "ts_code": "000001.SZ",
            "trade_date": "20240102"
        }))];
        let (rows, _) = filter_records(&STOCK_DAILY, &records);
        let columns = batch_columns(&STOCK_DAILY, &rows);
        assert_eq!(columns, vec!["ts_code", "trade_date", "close"]);
    }
}
