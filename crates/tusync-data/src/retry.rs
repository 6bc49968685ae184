//! 일시 장애 재시도 래퍼.
//!
//! 감싸는 연산에 대해 아무것도 모르는 범용 래퍼입니다. 호출 제한이 걸린
//! 클라이언트 호출을 포함해 어떤 비동기 연산에도 합성할 수 있습니다.

use std::future::Future;
use std::time::Duration;

/// 재시도 정책.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// 총 시도 횟수 (첫 시도 포함)
    pub max_attempts: u32,
    /// 기본 대기 시간
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(1),
        }
    }
}

/// 연산을 실행하고 실패 시 정책에 따라 재시도합니다.
///
/// 백오프는 선형입니다: n번째 시도가 실패하면 `delay × n` 만큼 대기한 뒤
/// 다음 시도를 합니다 (지수 백오프 아님 — 호출자의 타임아웃 예산이 이
/// 정책에 의존합니다). 마지막 시도까지 실패하면 마지막 오류를 그대로
/// 돌려줍니다.
///
/// 각 재시도는 warn, 최종 실패는 error 레벨로 기록합니다.
pub async fn retry<T, E, F, Fut>(policy: RetryPolicy, op_name: &str, mut op: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1u32;

    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if attempt >= max_attempts {
                    tracing::error!(
                        op = op_name,
                        attempts = max_attempts,
                        error = %err,
                        "재시도 한도 초과, 실패 전파"
                    );
                    return Err(err);
                }

                tracing::warn!(
                    op = op_name,
                    attempt,
                    error = %err,
                    "시도 실패, 재시도 예정"
                );
                tokio::time::sleep(policy.delay * attempt).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Instant;

    #[tokio::test]
    async fn test_succeeds_on_third_attempt_with_linear_delays() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy {
            max_attempts: 3,
            delay: Duration::from_millis(50),
        };

        let start = Instant::now();
        let result: Result<u32, String> = retry(policy, "flaky", || {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if n < 3 {
                    Err(format!("attempt {} failed", n))
                } else {
                    Ok(n)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // 선형 대기: 50ms + 100ms
        assert!(start.elapsed() >= Duration::from_millis(140));
    }

    #[tokio::test]
    async fn test_exhaustion_returns_last_error() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy {
            max_attempts: 2,
            delay: Duration::from_millis(10),
        };

        let result: Result<(), String> = retry(policy, "always_fails", || {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move { Err(format!("boom {}", n)) }
        })
        .await;

        assert_eq!(result.unwrap_err(), "boom 2");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_immediate_success_never_sleeps() {
        let policy = RetryPolicy {
            max_attempts: 3,
            delay: Duration::from_secs(10),
        };

        let start = Instant::now();
        let result: Result<&str, String> = retry(policy, "ok", || async { Ok("done") }).await;

        assert_eq!(result.unwrap(), "done");
        assert!(start.elapsed() < Duration::from_millis(100));
    }
}
