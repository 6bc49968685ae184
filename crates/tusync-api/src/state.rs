//! 모든 핸들러에서 공유되는 애플리케이션 상태.

use std::sync::Arc;

use sqlx::PgPool;
use tusync_data::TushareClient;

/// 애플리케이션 공유 상태.
///
/// Axum의 State extractor를 통해 핸들러에 주입됩니다.
#[derive(Clone)]
pub struct AppState {
    /// 데이터베이스 연결 풀
    pub pool: PgPool,
    /// TuShare 클라이언트 (공유 호출 제한기 내장)
    pub client: Arc<TushareClient>,
}

impl AppState {
    /// 새 상태를 생성합니다.
    pub fn new(pool: PgPool, client: Arc<TushareClient>) -> Self {
        Self { pool, client }
    }
}
