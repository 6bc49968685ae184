//! 데이터 모듈 오류 타입.

use thiserror::Error;

/// 데이터 관련 오류.
#[derive(Debug, Error)]
pub enum DataError {
    /// 데이터베이스 연결 오류
    #[error("Database connection error: {0}")]
    ConnectionError(String),

    /// 쿼리 실행 오류
    #[error("Query error: {0}")]
    QueryError(String),

    /// 레코드를 찾을 수 없음
    #[error("Record not found: {0}")]
    NotFound(String),

    /// 중복 레코드
    #[error("Duplicate record: {0}")]
    DuplicateError(String),

    /// 직렬화/역직렬화 오류
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// 잘못된 데이터 형식
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// 설정 오류
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// 마이그레이션 오류
    #[error("Migration error: {0}")]
    MigrationError(String),

    /// 연결 풀 소진
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// 타임아웃 오류
    #[error("Operation timeout: {0}")]
    Timeout(String),

    /// 데이터 가져오기 오류 (네트워크/HTTP)
    #[error("Fetch error: {0}")]
    FetchError(String),

    /// 상류 API가 반환한 오류 응답
    #[error("TuShare API error [{code}]: {message}")]
    ApiError { code: i64, message: String },
}

/// 상류의 분당 호출 한도 초과 응답 코드.
const UPSTREAM_RATE_LIMIT_CODE: i64 = 40203;

impl DataError {
    /// 재시도 가능한 오류인지 확인합니다.
    ///
    /// 네트워크 오류, 타임아웃, 풀 소진, 상류의 호출 한도 응답은 일시
    /// 장애로 취급합니다.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::FetchError(_) | Self::Timeout(_) | Self::PoolExhausted => true,
            Self::ApiError { code, message } => {
                *code == UPSTREAM_RATE_LIMIT_CODE || message.contains("每分钟")
            }
            _ => false,
        }
    }
}

impl From<sqlx::Error> for DataError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DataError::NotFound("Row not found".to_string()),
            sqlx::Error::PoolTimedOut => DataError::PoolExhausted,
            sqlx::Error::Database(db_err) => {
                let code = db_err.code().unwrap_or_default();
                if code == "23505" {
                    // PostgreSQL 고유 제약 조건 위반
                    DataError::DuplicateError(db_err.message().to_string())
                } else {
                    DataError::QueryError(db_err.message().to_string())
                }
            }
            _ => DataError::QueryError(err.to_string()),
        }
    }
}

impl From<reqwest::Error> for DataError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            DataError::Timeout(err.to_string())
        } else if err.is_decode() {
            DataError::SerializationError(err.to_string())
        } else {
            DataError::FetchError(err.to_string())
        }
    }
}

impl From<serde_json::Error> for DataError {
    fn from(err: serde_json::Error) -> Self {
        DataError::SerializationError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DataError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_is_retryable() {
        assert!(DataError::FetchError("connection reset".into()).is_retryable());
        assert!(DataError::Timeout("30s".into()).is_retryable());
        assert!(!DataError::InvalidData("bad field".into()).is_retryable());
    }

    #[test]
    fn test_upstream_rate_limit_is_retryable() {
        let err = DataError::ApiError {
            code: 40203,
            message: "抱歉，您每分钟最多访问该接口200次".into(),
        };
        assert!(err.is_retryable());

        let err = DataError::ApiError {
            code: 40001,
            message: "token invalid".into(),
        };
        assert!(!err.is_retryable());
    }
}
