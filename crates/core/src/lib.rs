#![doc = include_str!("../README.md")]

pub mod config;
pub mod error;
pub mod metrics;
pub mod retry;
pub mod types;

// --- 주요 타입 re-export ---

// 에러
pub use error::{ConfigError, LogCheckError};

// 설정
pub use config::LogCheckConfig;

// 재시도
pub use retry::{RetryPolicy, WaitOutcome, wait_until};

// 도메인 타입
pub use types::{LogLine, Readiness, ScanResult};
