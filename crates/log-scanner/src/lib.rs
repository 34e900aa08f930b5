#![doc = include_str!("../README.md")]
//!
//! # 모듈 구성
//!
//! - [`source`]: 로그 파일 위치 결정 및 커서 기반 증분 읽기
//! - [`end_marker`]: `파일명;마커` 종료 마커 파서
//! - [`scanner`]: 에러 마커 분류 및 첫 에러 중단 정책
//! - [`known_issue`]: 알려진 이슈 필터
//! - [`rule`]: 검사 생명주기 오케스트레이션 (before/after, 범위 가드)
//! - [`context`]: 중첩 테스트 범위의 설정 조회
//! - [`config`]: 규칙 설정 (core 설정 확장)
//! - [`error`]: 도메인 에러 타입
//!
//! # 아키텍처
//!
//! ```text
//! LogFileRule -> EndMarkers -> LogFileSource (poll) -> ErrorScanner -> KnownIssueFilter -> errors()
//!      |                            |
//!  TestContext              test resources / quickstart logs
//! ```

pub mod config;
pub mod context;
pub mod end_marker;
pub mod error;
pub mod known_issue;
pub mod rule;
pub mod scanner;
pub mod source;

// --- 주요 타입 re-export ---

// 규칙
pub use rule::{LogFileRule, RuleScope, RuleState};

// 설정
pub use config::{RuleConfig, RuleConfigBuilder};
pub use context::TestContext;

// 에러
pub use error::LogScannerError;

// 스캔
pub use end_marker::EndMarkers;
pub use known_issue::KnownIssueFilter;
pub use scanner::{ErrorScanner, ScanOutcome};

// 소스
pub use source::{Cursor, EnvProperties, LogFileSource, PropertySource, SourceLine};
