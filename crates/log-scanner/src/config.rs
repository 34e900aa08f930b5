//! 로그 검사 규칙 설정
//!
//! [`RuleConfig`]는 core의 [`ScanConfig`](logcheck_core::config::ScanConfig)와
//! [`WaitConfig`](logcheck_core::config::WaitConfig)를 기반으로
//! 테스트 하나에 적용되는 검사 옵션을 제공합니다.
//!
//! # 사용 예시
//! ```ignore
//! use logcheck_core::config::LogCheckConfig;
//! use logcheck_scanner::config::RuleConfig;
//!
//! let core_config = LogCheckConfig::default();
//! let config = RuleConfig::from_core(&core_config);
//! ```
//!
//! `end_markers`는 여기서 검증하지 않습니다. 항목은 실제로 조회될 때
//! [`EndMarkers::parse`](crate::end_marker::EndMarkers::parse)가 검사합니다.

use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use logcheck_core::config::LogCheckConfig;
use logcheck_core::retry::RetryPolicy;

use crate::error::LogScannerError;

/// 로그 검사 규칙 설정
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleConfig {
    /// 검사할 로그 파일 이름 목록
    pub file_names: Vec<String>,
    /// 에러 마커 (설정 순서대로 검사)
    pub error_markers: Vec<String>,
    /// 파일별 종료 마커 원본 문자열 (`파일명;마커`)
    pub end_markers: Vec<String>,
    /// 알려진 이슈 문자열
    pub known_issues: Vec<String>,
    /// 첫 에러만 수집할지 여부
    pub stop_at_error: bool,
    /// 라이브 로그 루트를 가리키는 외부 속성 이름
    pub quickstart_folder_property: String,
    /// 테스트 리소스에서 로그를 읽을지 여부
    pub read_log_file_from_test_resources: bool,
    /// 테스트 리소스 루트 (None이면 기본 위치)
    pub test_resources_dir: Option<PathBuf>,

    // --- 확장 설정 (종료 마커 대기) ---
    /// 폴링 간격 (밀리초)
    pub poll_interval_ms: u64,
    /// 최대 대기 시간 (밀리초)
    pub max_wait_ms: u64,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self::from_core(&LogCheckConfig::default())
    }
}

impl RuleConfig {
    /// core의 `LogCheckConfig`에서 규칙 설정을 생성합니다.
    pub fn from_core(core: &LogCheckConfig) -> Self {
        let scan = &core.scan;
        Self {
            file_names: scan.file_names.clone(),
            error_markers: scan.error_markers.clone(),
            end_markers: scan.end_markers.clone(),
            known_issues: scan.known_issues.clone(),
            stop_at_error: scan.stop_at_error,
            quickstart_folder_property: scan.quickstart_folder_property.clone(),
            read_log_file_from_test_resources: scan.read_log_file_from_test_resources,
            test_resources_dir: scan.test_resources_dir.clone(),
            poll_interval_ms: core.wait.poll_interval_ms,
            max_wait_ms: core.wait.max_wait_ms,
        }
    }

    /// 종료 마커 대기에 사용할 재시도 정책을 반환합니다.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            Duration::from_millis(self.poll_interval_ms),
            Duration::from_millis(self.max_wait_ms),
        )
    }

    /// 로그 파일 이름이 안전한지 검증합니다.
    ///
    /// # 검증 규칙
    /// - 비어 있지 않아야 함
    /// - 상대 경로여야 함 (로그 루트 아래에서 해석)
    /// - ".." 컴포넌트를 포함하지 않아야 함
    fn validate_file_name(name: &str) -> Result<(), LogScannerError> {
        if name.trim().is_empty() {
            return Err(LogScannerError::Config {
                field: "file_names".to_owned(),
                reason: "file name must not be empty".to_owned(),
            });
        }

        let path = Path::new(name);

        if path.components().any(|c| c == Component::ParentDir) {
            return Err(LogScannerError::Config {
                field: "file_names".to_owned(),
                reason: format!("file name '{name}' contains path traversal pattern '..'"),
            });
        }

        if path.is_absolute() {
            return Err(LogScannerError::Config {
                field: "file_names".to_owned(),
                reason: format!("file name '{name}' must be relative to the log root"),
            });
        }

        Ok(())
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), LogScannerError> {
        if self.file_names.is_empty() {
            return Err(LogScannerError::Config {
                field: "file_names".to_owned(),
                reason: "at least one log file must be configured".to_owned(),
            });
        }
        for name in &self.file_names {
            Self::validate_file_name(name)?;
        }

        if self.error_markers.is_empty() {
            return Err(LogScannerError::Config {
                field: "error_markers".to_owned(),
                reason: "at least one error marker must be configured".to_owned(),
            });
        }
        // 빈 문자열은 모든 라인에 포함되므로 허용하지 않음
        if self.error_markers.iter().any(|m| m.is_empty()) {
            return Err(LogScannerError::Config {
                field: "error_markers".to_owned(),
                reason: "error markers must not be empty strings".to_owned(),
            });
        }

        if self.known_issues.iter().any(|k| k.is_empty()) {
            return Err(LogScannerError::Config {
                field: "known_issues".to_owned(),
                reason: "known issues must not be empty strings".to_owned(),
            });
        }

        if !self.read_log_file_from_test_resources && self.quickstart_folder_property.is_empty() {
            return Err(LogScannerError::Config {
                field: "quickstart_folder_property".to_owned(),
                reason: "must be set when reading live server logs".to_owned(),
            });
        }

        if self.poll_interval_ms == 0 {
            return Err(LogScannerError::Config {
                field: "poll_interval_ms".to_owned(),
                reason: "must be greater than 0".to_owned(),
            });
        }

        Ok(())
    }
}

/// 규칙 설정 빌더
///
/// 옵션이 많으므로 빌더 패턴을 사용합니다. 지정하지 않은 옵션은 기본값을 따릅니다.
#[derive(Default)]
pub struct RuleConfigBuilder {
    config: RuleConfig,
}

impl RuleConfigBuilder {
    /// 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 기존 설정에서 시작합니다.
    pub fn from_config(config: RuleConfig) -> Self {
        Self { config }
    }

    /// 검사할 파일 이름을 설정합니다.
    pub fn file_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.file_names = names.into_iter().map(Into::into).collect();
        self
    }

    /// 에러 마커를 설정합니다.
    pub fn error_markers<I, S>(mut self, markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.error_markers = markers.into_iter().map(Into::into).collect();
        self
    }

    /// 종료 마커 원본 문자열을 설정합니다.
    pub fn end_markers<I, S>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.end_markers = entries.into_iter().map(Into::into).collect();
        self
    }

    /// 알려진 이슈를 설정합니다.
    pub fn known_issues<I, S>(mut self, issues: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.known_issues = issues.into_iter().map(Into::into).collect();
        self
    }

    /// 첫 에러에서 중단할지 설정합니다.
    pub fn stop_at_error(mut self, stop: bool) -> Self {
        self.config.stop_at_error = stop;
        self
    }

    /// quickstart 폴더 속성 이름을 설정합니다.
    pub fn quickstart_folder_property(mut self, property: impl Into<String>) -> Self {
        self.config.quickstart_folder_property = property.into();
        self
    }

    /// 테스트 리소스에서 로그를 읽을지 설정합니다.
    pub fn read_log_file_from_test_resources(mut self, enabled: bool) -> Self {
        self.config.read_log_file_from_test_resources = enabled;
        self
    }

    /// 테스트 리소스 루트를 지정하고 테스트 리소스 모드를 켭니다.
    pub fn test_resources_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.test_resources_dir = Some(dir.into());
        self.config.read_log_file_from_test_resources = true;
        self
    }

    /// 폴링 간격(밀리초)을 설정합니다.
    pub fn poll_interval_ms(mut self, ms: u64) -> Self {
        self.config.poll_interval_ms = ms;
        self
    }

    /// 최대 대기 시간(밀리초)을 설정합니다.
    pub fn max_wait_ms(mut self, ms: u64) -> Self {
        self.config.max_wait_ms = ms;
        self
    }

    /// 설정을 검증하고 `RuleConfig`를 생성합니다.
    pub fn build(self) -> Result<RuleConfig, LogScannerError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
