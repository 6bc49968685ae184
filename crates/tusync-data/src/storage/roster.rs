//! 명부 조회.
//!
//! 오케스트레이터가 종목별/블록별 반복에 쓰는 코드 목록을 읽습니다.

use sqlx::PgPool;

use tusync_core::catalog::DatasetSchema;

use crate::error::Result;

/// 상장 중인 전체 종목 코드.
pub async fn all_stock_codes(pool: &PgPool) -> Result<Vec<String>> {
    let rows: Vec<(String,)> = sqlx::query_as(
        r#"
        SELECT "ts_code"
        FROM stock_list
        WHERE "list_status" = 'L'
        ORDER BY "ts_code"
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|(code,)| code).collect())
}

/// 블록 명부 테이블의 전체 블록 코드.
pub async fn all_block_codes(pool: &PgPool, schema: &DatasetSchema) -> Result<Vec<String>> {
    let sql = format!(
        r#"SELECT DISTINCT "ts_code" FROM {} ORDER BY "ts_code""#,
        schema.table
    );
    let rows: Vec<(String,)> = sqlx::query_as(&sql).fetch_all(pool).await?;

    Ok(rows.into_iter().map(|(code,)| code).collect())
}
