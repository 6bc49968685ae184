//! 슬라이딩 윈도우 호출 제한기.
//!
//! 인터페이스 이름별로 독립된 호출 기록 윈도우를 유지합니다. 같은 제한기
//! 인스턴스를 공유하는 호출자만 같은 윈도우를 공유하며, 프로세스 간 조율은
//! 범위 밖입니다 (단일 프로세스 전제).
//!
//! 제한기 인스턴스는 클라이언트 생성자를 통해 주입합니다. 모듈 전역
//! 싱글턴에 의존하지 않습니다.

use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

/// 인터페이스별 윈도우 통계.
#[derive(Debug, Clone, serde::Serialize)]
pub struct RateLimiterStats {
    /// 인터페이스 이름
    pub interface: String,
    /// 현재 윈도우 내 호출 수
    pub calls_in_window: usize,
    /// 윈도우당 최대 호출 수
    pub max_calls: usize,
    /// 윈도우 크기 (초)
    pub period_secs: u64,
}

/// 슬라이딩 윈도우 제한기.
///
/// `acquire`는 슬롯이 빌 때까지 대기한 뒤 호출을 기록합니다. 대기는
/// 뮤텍스를 잡은 채로 이루어지며, 이 인스턴스를 공유하는 모든 호출자를
/// 직렬화합니다. 제한기 자체의 처리량보다 정확성을 우선한 단순화입니다.
pub struct RateLimiter {
    max_calls: usize,
    period: Duration,
    /// 윈도우 경계에서의 이른 재시도를 피하기 위한 여유분
    buffer: Duration,
    windows: Mutex<HashMap<String, VecDeque<Instant>>>,
}

impl RateLimiter {
    /// 새 제한기를 생성합니다.
    ///
    /// `max_calls`는 1 이상, `period`는 0보다 커야 합니다.
    pub fn new(max_calls: usize, period: Duration) -> Self {
        debug_assert!(max_calls >= 1, "max_calls는 1 이상이어야 함");
        debug_assert!(period > Duration::ZERO, "period는 0보다 커야 함");

        Self {
            max_calls,
            period,
            buffer: Duration::from_millis(100),
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// 호출 허가를 획득합니다.
    ///
    /// 윈도우에 자리가 있으면 즉시 기록하고 반환합니다. 가득 찼으면 가장
    /// 오래된 호출이 윈도우를 벗어날 때까지 잠든 뒤 기록합니다.
    pub async fn acquire(&self, interface: &str) {
        let mut windows = self.windows.lock().await;
        let calls = windows.entry(interface.to_string()).or_default();

        let now = Instant::now();
        Self::purge(calls, now, self.period);

        if calls.len() >= self.max_calls {
            // 가장 오래된 호출이 윈도우를 벗어나는 시점까지 대기
            let oldest = *calls.front().expect("윈도우가 가득 찼는데 기록이 없음");
            let sleep_time = self
                .period
                .checked_sub(now.duration_since(oldest))
                .unwrap_or_default()
                + self.buffer;

            tracing::debug!(
                interface,
                wait_ms = sleep_time.as_millis() as u64,
                "호출 한도 도달, 대기"
            );

            // 락을 잡은 채로 잠든다. 같은 제한기를 공유하는 다른
            // 인터페이스의 호출자도 함께 직렬화된다.
            tokio::time::sleep(sleep_time).await;

            let now = Instant::now();
            Self::purge(calls, now, self.period);
            calls.push_back(now);
            return;
        }

        calls.push_back(now);
    }

    /// 단일 인터페이스의 윈도우 통계를 반환합니다.
    pub async fn stats(&self, interface: &str) -> RateLimiterStats {
        let mut windows = self.windows.lock().await;
        let calls = windows.entry(interface.to_string()).or_default();
        Self::purge(calls, Instant::now(), self.period);

        RateLimiterStats {
            interface: interface.to_string(),
            calls_in_window: calls.len(),
            max_calls: self.max_calls,
            period_secs: self.period.as_secs(),
        }
    }

    /// 기록된 모든 인터페이스의 윈도우 통계를 반환합니다.
    pub async fn all_stats(&self) -> Vec<RateLimiterStats> {
        let mut windows = self.windows.lock().await;
        let now = Instant::now();

        let mut stats: Vec<RateLimiterStats> = windows
            .iter_mut()
            .map(|(interface, calls)| {
                Self::purge(calls, now, self.period);
                RateLimiterStats {
                    interface: interface.clone(),
                    calls_in_window: calls.len(),
                    max_calls: self.max_calls,
                    period_secs: self.period.as_secs(),
                }
            })
            .collect();
        stats.sort_by(|a, b| a.interface.cmp(&b.interface));
        stats
    }

    /// 윈도우를 벗어난 호출 기록을 제거합니다.
    fn purge(calls: &mut VecDeque<Instant>, now: Instant, period: Duration) {
        while let Some(front) = calls.front() {
            if now.duration_since(*front) > period {
                calls.pop_front();
            } else {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_burst_within_limit_does_not_block() {
        let limiter = RateLimiter::new(3, Duration::from_millis(500));

        let start = Instant::now();
        for _ in 0..3 {
            limiter.acquire("daily").await;
        }
        // 정확히 max_calls번까지는 대기 없음
        assert!(start.elapsed() < Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_exceeding_limit_blocks_until_window_frees() {
        let limiter = RateLimiter::new(2, Duration::from_millis(300));

        limiter.acquire("daily").await;
        limiter.acquire("daily").await;

        let start = Instant::now();
        limiter.acquire("daily").await;
        let waited = start.elapsed();

        // 남은 윈도우 시간(~300ms) 가까이 대기해야 함
        assert!(waited >= Duration::from_millis(250), "waited {:?}", waited);
    }

    #[tokio::test]
    async fn test_interfaces_have_independent_windows() {
        let limiter = RateLimiter::new(1, Duration::from_millis(500));

        limiter.acquire("daily").await;

        // 다른 인터페이스는 "daily"의 한도 소진에 영향받지 않음
        let start = Instant::now();
        limiter.acquire("moneyflow").await;
        assert!(start.elapsed() < Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_stats_reports_window_usage() {
        let limiter = RateLimiter::new(5, Duration::from_secs(60));

        limiter.acquire("daily").await;
        limiter.acquire("daily").await;

        let stats = limiter.stats("daily").await;
        assert_eq!(stats.calls_in_window, 2);
        assert_eq!(stats.max_calls, 5);

        let all = limiter.all_stats().await;
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].interface, "daily");
    }
}
