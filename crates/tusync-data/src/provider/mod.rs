//! 외부 데이터 소스 클라이언트.

pub mod tushare;
