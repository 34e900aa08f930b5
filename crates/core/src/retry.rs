//! 제한된 재시도 루틴 -- 조건이 참이 될 때까지 일정 간격으로 폴링합니다.
//!
//! [`wait_until`]은 호출 스레드를 블로킹하며 백그라운드 스레드를 만들지 않습니다.
//! 최대 대기 시간이 지나면 반드시 반환합니다.
//!
//! # 사용 예시
//! ```
//! use std::time::Duration;
//! use logcheck_core::retry::{RetryPolicy, WaitOutcome, wait_until};
//!
//! let policy = RetryPolicy::new(Duration::from_millis(1), Duration::from_millis(50));
//! let mut calls = 0;
//! let outcome = wait_until(&policy, || -> Result<bool, std::io::Error> {
//!     calls += 1;
//!     Ok(calls == 3)
//! })?;
//! assert!(matches!(outcome, WaitOutcome::Ready { attempts: 3, .. }));
//! # Ok::<(), std::io::Error>(())
//! ```

use std::time::{Duration, Instant};

/// 재시도 정책
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// 폴링 간격
    pub interval: Duration,
    /// 최대 대기 시간
    pub max_wait: Duration,
}

impl RetryPolicy {
    /// 새 재시도 정책을 생성합니다.
    pub fn new(interval: Duration, max_wait: Duration) -> Self {
        Self { interval, max_wait }
    }

    /// 밀리초 단위 값으로 정책을 생성합니다.
    pub fn from_millis(interval_ms: u64, max_wait_ms: u64) -> Self {
        Self::new(
            Duration::from_millis(interval_ms),
            Duration::from_millis(max_wait_ms),
        )
    }
}

/// 대기 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// 조건 충족
    Ready {
        /// 검사 횟수
        attempts: u32,
        /// 경과 시간
        elapsed: Duration,
    },
    /// 최대 대기 시간 초과
    TimedOut {
        /// 검사 횟수
        attempts: u32,
        /// 경과 시간
        elapsed: Duration,
    },
}

impl WaitOutcome {
    /// 조건이 충족되었는지 확인합니다.
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready { .. })
    }

    /// 검사 횟수를 반환합니다.
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Ready { attempts, .. } | Self::TimedOut { attempts, .. } => *attempts,
        }
    }
}

/// `check`가 `true`를 반환할 때까지 정책에 따라 폴링합니다.
///
/// 첫 검사는 즉시 수행하고, 실패하면 `min(interval, 남은 시간)`만큼 잠든 뒤 다시 검사합니다.
/// 검사 후 경과 시간이 `max_wait` 이상이면 [`WaitOutcome::TimedOut`]을 반환합니다.
/// `check`가 에러를 반환하면 대기를 중단하고 에러를 그대로 전파합니다.
pub fn wait_until<E, F>(policy: &RetryPolicy, mut check: F) -> Result<WaitOutcome, E>
where
    F: FnMut() -> Result<bool, E>,
{
    let started = Instant::now();
    let mut attempts: u32 = 0;

    loop {
        attempts = attempts.saturating_add(1);
        if check()? {
            return Ok(WaitOutcome::Ready {
                attempts,
                elapsed: started.elapsed(),
            });
        }

        let elapsed = started.elapsed();
        if elapsed >= policy.max_wait {
            return Ok(WaitOutcome::TimedOut { attempts, elapsed });
        }

        let remaining = policy.max_wait - elapsed;
        let pause = policy.interval.min(remaining);
        tracing::trace!(
            attempt = attempts,
            pause_ms = u64::try_from(pause.as_millis()).unwrap_or(u64::MAX),
            "condition not met, retrying"
        );
        std::thread::sleep(pause);
    }
}
