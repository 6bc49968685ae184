//! TuShare Pro API 클라이언트.
//!
//! 모든 데이터셋 메서드는 단일 `query` 관문을 거칩니다. 관문은:
//! 1. 데이터셋 이름으로 호출 제한 슬롯을 획득하고,
//! 2. 재시도 정책으로 감싸 HTTP POST를 실행하고,
//! 3. 요청 파라미터와 결과 행 수를 기록하고,
//! 4. 재시도 소진 후에는 상류 오류를 그대로 전파합니다.
//!
//! 같은 프로세스에서 같은 데이터셋으로 향하는 호출이 공유 제한기를
//! 우회하는 경로는 없습니다.
//!
//! # 사용 예제
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tusync_data::{RateLimiter, TushareClient, TushareConfig, QueryFilter};
//!
//! let config = TushareConfig::from_env()?;
//! let limiter = Arc::new(RateLimiter::new(config.max_calls_per_min, config.rate_period()));
//! let client = TushareClient::new(&config, limiter)?;
//!
//! let table = client.daily(&QueryFilter::new().trade_date("20240102")).await?;
//! ```

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{DataError, Result};
use crate::limiter::{RateLimiter, RateLimiterStats};
use crate::retry::{retry, RetryPolicy};
use crate::table::DataTable;

/// TuShare Pro 기본 엔드포인트.
const DEFAULT_API_URL: &str = "http://api.tushare.pro";

/// TuShare 클라이언트 설정.
#[derive(Debug, Clone)]
pub struct TushareConfig {
    /// API 토큰
    pub token: String,
    /// API 엔드포인트 URL
    pub api_url: String,
    /// 윈도우당 최대 호출 수 (인터페이스별)
    pub max_calls_per_min: usize,
    /// 호출 제한 윈도우 크기 (초)
    pub rate_period_secs: u64,
    /// 재시도 정책
    pub retry: RetryPolicy,
    /// HTTP 요청 타임아웃 (초)
    pub timeout_secs: u64,
}

impl Default for TushareConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            api_url: DEFAULT_API_URL.to_string(),
            max_calls_per_min: 180,
            rate_period_secs: 60,
            retry: RetryPolicy::default(),
            timeout_secs: 30,
        }
    }
}

impl TushareConfig {
    /// 환경변수에서 설정을 로드합니다.
    ///
    /// `TUSHARE_TOKEN`은 필수입니다.
    pub fn from_env() -> Result<Self> {
        let token = std::env::var("TUSHARE_TOKEN").map_err(|_| {
            DataError::ConfigError("TUSHARE_TOKEN 환경변수가 설정되지 않았습니다".to_string())
        })?;

        let defaults = Self::default();
        Ok(Self {
            token,
            api_url: std::env::var("TUSHARE_API_URL").unwrap_or(defaults.api_url),
            max_calls_per_min: env_parse("TUSHARE_MAX_CALLS_PER_MIN", defaults.max_calls_per_min),
            rate_period_secs: env_parse("TUSHARE_RATE_PERIOD_SECS", defaults.rate_period_secs),
            retry: RetryPolicy {
                max_attempts: env_parse("TUSHARE_RETRY_ATTEMPTS", defaults.retry.max_attempts),
                delay: Duration::from_millis(env_parse(
                    "TUSHARE_RETRY_DELAY_MS",
                    defaults.retry.delay.as_millis() as u64,
                )),
            },
            timeout_secs: env_parse("TUSHARE_TIMEOUT_SECS", defaults.timeout_secs),
        })
    }

    /// 호출 제한 윈도우를 Duration으로 반환합니다.
    pub fn rate_period(&self) -> Duration {
        Duration::from_secs(self.rate_period_secs)
    }
}

/// 환경변수에서 값을 파싱합니다 (실패 시 기본값 사용).
fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// 데이터셋 요청 필터.
///
/// 종목 코드, 단일 거래일(`YYYYMMDD`), 또는 시작/종료 범위를 조합합니다.
#[derive(Debug, Clone, Default)]
pub struct QueryFilter {
    ts_code: Option<String>,
    trade_date: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
    extra: Vec<(String, String)>,
}

impl QueryFilter {
    /// 빈 필터를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 종목/블록 코드 필터.
    pub fn ts_code(mut self, code: impl Into<String>) -> Self {
        self.ts_code = Some(code.into());
        self
    }

    /// 단일 거래일 필터.
    pub fn trade_date(mut self, date: impl Into<String>) -> Self {
        self.trade_date = Some(date.into());
        self
    }

    /// 범위 시작일 필터.
    pub fn start_date(mut self, date: impl Into<String>) -> Self {
        self.start_date = Some(date.into());
        self
    }

    /// 범위 종료일 필터.
    pub fn end_date(mut self, date: impl Into<String>) -> Self {
        self.end_date = Some(date.into());
        self
    }

    /// 데이터셋 고유 파라미터 (예: ths_index의 `type`).
    pub fn extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.push((key.into(), value.into()));
        self
    }

    /// 요청 본문의 params 객체로 변환합니다.
    fn to_params(&self) -> Map<String, Value> {
        let mut params = Map::new();
        if let Some(v) = &self.ts_code {
            params.insert("ts_code".into(), Value::String(v.clone()));
        }
        if let Some(v) = &self.trade_date {
            params.insert("trade_date".into(), Value::String(v.clone()));
        }
        if let Some(v) = &self.start_date {
            params.insert("start_date".into(), Value::String(v.clone()));
        }
        if let Some(v) = &self.end_date {
            params.insert("end_date".into(), Value::String(v.clone()));
        }
        for (key, value) in &self.extra {
            params.insert(key.clone(), Value::String(value.clone()));
        }
        params
    }
}

/// TuShare 응답 래퍼.
#[derive(Debug, Deserialize)]
struct TushareResponse {
    code: i64,
    msg: Option<String>,
    data: Option<DataTable>,
}

/// TuShare Pro API 클라이언트.
#[derive(Clone)]
pub struct TushareClient {
    client: reqwest::Client,
    token: String,
    api_url: String,
    limiter: Arc<RateLimiter>,
    retry_policy: RetryPolicy,
}

impl TushareClient {
    /// 새 클라이언트를 생성합니다.
    ///
    /// 제한기 인스턴스는 외부에서 주입합니다. 여러 컴포넌트가 같은
    /// 인스턴스를 공유해야 같은 윈도우를 공유합니다.
    pub fn new(config: &TushareConfig, limiter: Arc<RateLimiter>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DataError::ConfigError(format!("HTTP 클라이언트 생성 실패: {}", e)))?;

        Ok(Self {
            client,
            token: config.token.clone(),
            api_url: config.api_url.clone(),
            limiter,
            retry_policy: config.retry,
        })
    }

    /// 통일 쿼리 관문.
    ///
    /// 호출 제한 획득은 재시도되는 클로저 안에 있으므로 매 시도마다
    /// 슬롯을 소비합니다.
    pub async fn query(&self, api_name: &str, filter: &QueryFilter) -> Result<DataTable> {
        let params = filter.to_params();

        let result = retry(self.retry_policy, api_name, || {
            let params = params.clone();
            async move {
                self.limiter.acquire(api_name).await;
                self.call(api_name, params).await
            }
        })
        .await;

        match &result {
            Ok(table) => {
                tracing::info!(api = api_name, rows = table.len(), "API 호출 성공");
            }
            Err(e) => {
                tracing::error!(api = api_name, error = %e, "API 호출 실패");
            }
        }
        result
    }

    /// 단일 HTTP 요청 실행.
    async fn call(&self, api_name: &str, params: Map<String, Value>) -> Result<DataTable> {
        tracing::debug!(api = api_name, params = ?params, "TuShare API 요청");

        let body = serde_json::json!({
            "api_name": api_name,
            "token": self.token,
            "params": Value::Object(params),
            "fields": "",
        });

        let response = self.client.post(&self.api_url).json(&body).send().await?;

        if !response.status().is_success() {
            return Err(DataError::FetchError(format!(
                "TuShare HTTP 오류 [{}]: {}",
                api_name,
                response.status()
            )));
        }

        let parsed: TushareResponse = response.json().await?;
        if parsed.code != 0 {
            return Err(DataError::ApiError {
                code: parsed.code,
                message: parsed.msg.unwrap_or_default(),
            });
        }

        Ok(parsed.data.unwrap_or_default())
    }

    /// 호출 제한 통계 (단일 인터페이스).
    pub async fn rate_limit_stats(&self, interface: &str) -> RateLimiterStats {
        self.limiter.stats(interface).await
    }

    /// 호출 제한 통계 (전체 인터페이스).
    pub async fn all_rate_limit_stats(&self) -> Vec<RateLimiterStats> {
        self.limiter.all_stats().await
    }

    // ---- 데이터셋 메서드 ----

    /// 주식 기본 목록.
    pub async fn stock_basic(&self, filter: &QueryFilter) -> Result<DataTable> {
        self.query("stock_basic", filter).await
    }

    /// 전십대 주주.
    pub async fn top10_holders(&self, filter: &QueryFilter) -> Result<DataTable> {
        self.query("top10_holders", filter).await
    }

    /// 일봉 시세.
    pub async fn daily(&self, filter: &QueryFilter) -> Result<DataTable> {
        self.query("daily", filter).await
    }

    /// 일별 매집 분포.
    pub async fn cyq_chips(&self, filter: &QueryFilter) -> Result<DataTable> {
        self.query("cyq_chips", filter).await
    }

    /// 기술 지표.
    pub async fn stk_factor(&self, filter: &QueryFilter) -> Result<DataTable> {
        self.query("stk_factor", filter).await
    }

    /// 기술 지표 프로.
    pub async fn stk_factor_pro(&self, filter: &QueryFilter) -> Result<DataTable> {
        self.query("stk_factor_pro", filter).await
    }

    /// 개별 종목 자금 흐름.
    pub async fn moneyflow(&self, filter: &QueryFilter) -> Result<DataTable> {
        self.query("moneyflow", filter).await
    }

    /// THS 개별 종목 자금 흐름.
    pub async fn moneyflow_ths(&self, filter: &QueryFilter) -> Result<DataTable> {
        self.query("moneyflow_ths", filter).await
    }

    /// DC 개별 종목 자금 흐름.
    pub async fn moneyflow_dc(&self, filter: &QueryFilter) -> Result<DataTable> {
        self.query("moneyflow_dc", filter).await
    }

    /// THS 콘셉트 블록 자금 흐름.
    pub async fn moneyflow_cnt_ths(&self, filter: &QueryFilter) -> Result<DataTable> {
        self.query("moneyflow_cnt_ths", filter).await
    }

    /// THS 업종 자금 흐름.
    pub async fn moneyflow_ind_ths(&self, filter: &QueryFilter) -> Result<DataTable> {
        self.query("moneyflow_ind_ths", filter).await
    }

    /// DC 콘셉트 블록 자금 흐름.
    pub async fn moneyflow_dc_cnt(&self, filter: &QueryFilter) -> Result<DataTable> {
        self.query("moneyflow_dc_cnt", filter).await
    }

    /// DC 업종 자금 흐름.
    pub async fn moneyflow_dc_industry(&self, filter: &QueryFilter) -> Result<DataTable> {
        self.query("moneyflow_dc_industry", filter).await
    }

    /// 상위 거래 종목 일별 통계.
    pub async fn top_list(&self, filter: &QueryFilter) -> Result<DataTable> {
        self.query("top_list", filter).await
    }

    /// 상위 거래 기관 내역.
    pub async fn top_inst(&self, filter: &QueryFilter) -> Result<DataTable> {
        self.query("top_inst", filter).await
    }

    /// 상·하한가 및 개장 반락 현황.
    pub async fn limit_list_d(&self, filter: &QueryFilter) -> Result<DataTable> {
        self.query("limit_list_d", filter).await
    }

    /// 연속 상한가 사다리.
    pub async fn limit_step(&self, filter: &QueryFilter) -> Result<DataTable> {
        self.query("limit_step", filter).await
    }

    /// 상한가 최강 블록 통계.
    pub async fn limit_cpt_list(&self, filter: &QueryFilter) -> Result<DataTable> {
        self.query("limit_cpt_list", filter).await
    }

    /// 핫머니 명부.
    pub async fn hm_list(&self, filter: &QueryFilter) -> Result<DataTable> {
        self.query("hm_list", filter).await
    }

    /// 핫머니 일별 상세.
    pub async fn hm_detail(&self, filter: &QueryFilter) -> Result<DataTable> {
        self.query("hm_detail", filter).await
    }

    /// 거래일 달력.
    pub async fn trade_cal(&self, filter: &QueryFilter) -> Result<DataTable> {
        self.query("trade_cal", filter).await
    }

    /// THS 업종/콘셉트 지수 명부.
    pub async fn ths_index(&self, filter: &QueryFilter) -> Result<DataTable> {
        self.query("ths_index", filter).await
    }

    /// THS 블록 구성 종목.
    pub async fn ths_member(&self, filter: &QueryFilter) -> Result<DataTable> {
        self.query("ths_member", filter).await
    }

    /// THS 블록 일별 시세.
    pub async fn ths_daily(&self, filter: &QueryFilter) -> Result<DataTable> {
        self.query("ths_daily", filter).await
    }

    /// DC 콘셉트 블록 명부.
    pub async fn dc_index(&self, filter: &QueryFilter) -> Result<DataTable> {
        self.query("dc_index", filter).await
    }

    /// DC 블록 구성 종목.
    pub async fn dc_member(&self, filter: &QueryFilter) -> Result<DataTable> {
        self.query("dc_member", filter).await
    }

    /// DC 블록 일별 시세.
    pub async fn dc_daily(&self, filter: &QueryFilter) -> Result<DataTable> {
        self.query("dc_daily", filter).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client(server_url: &str, max_attempts: u32) -> TushareClient {
        let config = TushareConfig {
            token: "test-token".into(),
            api_url: server_url.to_string(),
            max_calls_per_min: 100,
            rate_period_secs: 60,
            retry: RetryPolicy {
                max_attempts,
                delay: Duration::from_millis(10),
            },
            timeout_secs: 5,
        };
        let limiter = Arc::new(RateLimiter::new(
            config.max_calls_per_min,
            config.rate_period(),
        ));
        TushareClient::new(&config, limiter).unwrap()
    }

    #[tokio::test]
    async fn test_query_parses_table() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"code":0,"msg":null,"data":{"fields":["ts_code","close"],"items":[["000001.SZ",10.55],["000002.SZ",22.4]]}}"#,
            )
            .create_async()
            .await;

        let client = test_client(&server.url(), 1);
        let table = client
            .daily(&QueryFilter::new().trade_date("20240102"))
            .await
            .unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.fields, vec!["ts_code", "close"]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_api_error_code_propagates() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(200)
            .with_body(r#"{"code":40001,"msg":"token invalid","data":null}"#)
            .create_async()
            .await;

        let client = test_client(&server.url(), 1);
        let err = client.daily(&QueryFilter::new()).await.unwrap_err();

        match err {
            DataError::ApiError { code, message } => {
                assert_eq!(code, 40001);
                assert_eq!(message, "token invalid");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_null_data_is_empty_table() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(200)
            .with_body(r#"{"code":0,"msg":null,"data":null}"#)
            .create_async()
            .await;

        let client = test_client(&server.url(), 1);
        let table = client
            .daily(&QueryFilter::new().trade_date("20240101"))
            .await
            .unwrap();

        // 휴장일 등 데이터 없음은 오류가 아니라 빈 테이블
        assert!(table.is_empty());
    }

    #[tokio::test]
    async fn test_http_failure_retried_then_propagated() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .with_status(500)
            .expect(3)
            .create_async()
            .await;

        let client = test_client(&server.url(), 3);
        let err = client.daily(&QueryFilter::new()).await.unwrap_err();

        assert!(matches!(err, DataError::FetchError(_)));
        // 재시도 포함 정확히 3회 호출되었는지 확인
        mock.assert_async().await;
    }

    #[test]
    fn test_filter_to_params() {
        let filter = QueryFilter::new()
            .ts_code("000001.SZ")
            .start_date("20240101")
            .end_date("20240131")
            .extra("type", "N");

        let params = filter.to_params();
        assert_eq!(params["ts_code"], "000001.SZ");
        assert_eq!(params["start_date"], "20240101");
        assert_eq!(params["end_date"], "20240131");
        assert_eq!(params["type"], "N");
        assert!(!params.contains_key("trade_date"));
    }
}
