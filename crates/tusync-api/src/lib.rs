//! HTTP trigger layer for the TuSync market data service.
//!
//! 동기화 트리거와 원장/호출 제한 조회 엔드포인트를 제공하는 얇은
//! 계층입니다. 요청/응답 매핑만 하고 로직은 collector 드라이버에
//! 위임합니다.

pub mod routes;
pub mod state;

pub use state::AppState;
