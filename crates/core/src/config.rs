//! 설정 관리 -- logcheck.toml 파싱 및 런타임 설정
//!
//! [`LogCheckConfig`]는 로그 검사에 필요한 모든 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`LOGCHECK_SCAN_STOP_AT_ERROR=false` 형식)
//! 3. 설정 파일 (`logcheck.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), logcheck_core::error::LogCheckError> {
//! use logcheck_core::config::LogCheckConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = LogCheckConfig::load("logcheck.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = LogCheckConfig::parse("[scan]\nstop_at_error = false")?;
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, LogCheckError};

/// 기본 검사 대상 파일
pub const DEFAULT_FILE_NAME: &str = "error.log";

/// 기본 에러 마커 (검사 순서대로)
pub const DEFAULT_ERROR_MARKERS: &[&str] = &["ERROR", "WARN"];

/// 기본 종료 마커 (`파일명;마커` 형식)
pub const DEFAULT_END_MARKER: &str =
    "error.log;WorkflowLauncherListener StartupListener.startupFinished called";

/// quickstart 폴더를 가리키는 외부 속성 이름 기본값
pub const DEFAULT_QUICKSTART_FOLDER_PROPERTY: &str = "granite.it.default.quickstart.folders";

/// logcheck 통합 설정
///
/// `logcheck.toml` 파일의 최상위 구조를 나타냅니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogCheckConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 스캔 설정
    #[serde(default)]
    pub scan: ScanConfig,
    /// 종료 마커 대기 설정
    #[serde(default)]
    pub wait: WaitConfig,
}

impl LogCheckConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, LogCheckError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// 설정 파일이 없으면 기본값으로 시작하여 로드합니다.
    ///
    /// 파일 이외의 에러(파싱 실패, 권한 문제 등)는 그대로 전파합니다.
    pub async fn load_or_default(path: impl AsRef<Path>) -> Result<Self, LogCheckError> {
        let mut config = match Self::from_file(path.as_ref()).await {
            Ok(config) => config,
            Err(LogCheckError::Config(ConfigError::FileNotFound { path })) => {
                tracing::debug!(path = %path, "config file not found, using defaults");
                Self::default()
            }
            Err(e) => return Err(e),
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, LogCheckError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                LogCheckError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                LogCheckError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, LogCheckError> {
        toml::from_str(toml_str).map_err(|e| {
            LogCheckError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `LOGCHECK_{SECTION}_{FIELD}`
    ///
    /// `end_markers`와 `known_issues`는 값 자체에 쉼표가 들어갈 수 있어
    /// 환경변수 오버라이드 대상에서 제외합니다.
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "LOGCHECK_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "LOGCHECK_GENERAL_LOG_FORMAT");

        // Scan
        override_csv(&mut self.scan.file_names, "LOGCHECK_SCAN_FILE_NAMES");
        override_csv(&mut self.scan.error_markers, "LOGCHECK_SCAN_ERROR_MARKERS");
        override_bool(&mut self.scan.stop_at_error, "LOGCHECK_SCAN_STOP_AT_ERROR");
        override_string(
            &mut self.scan.quickstart_folder_property,
            "LOGCHECK_SCAN_QUICKSTART_FOLDER_PROPERTY",
        );
        override_bool(
            &mut self.scan.read_log_file_from_test_resources,
            "LOGCHECK_SCAN_READ_LOG_FILE_FROM_TEST_RESOURCES",
        );
        if let Ok(val) = std::env::var("LOGCHECK_SCAN_TEST_RESOURCES_DIR") {
            self.scan.test_resources_dir = Some(PathBuf::from(val));
        }

        // Wait
        override_u64(&mut self.wait.poll_interval_ms, "LOGCHECK_WAIT_POLL_INTERVAL_MS");
        override_u64(&mut self.wait.max_wait_ms, "LOGCHECK_WAIT_MAX_WAIT_MS");
    }

    /// 설정값의 유효성을 검증합니다.
    ///
    /// 스캔 옵션 자체의 검증은 스캐너 크레이트의 `RuleConfig::validate`가 담당합니다.
    pub fn validate(&self) -> Result<(), LogCheckError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        if self.wait.poll_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "wait.poll_interval_ms".to_owned(),
                reason: "must be greater than 0".to_owned(),
            }
            .into());
        }

        if self.wait.max_wait_ms > 0 && self.wait.poll_interval_ms > self.wait.max_wait_ms {
            return Err(ConfigError::InvalidValue {
                field: "wait.poll_interval_ms".to_owned(),
                reason: format!(
                    "must not exceed wait.max_wait_ms ({})",
                    self.wait.max_wait_ms
                ),
            }
            .into());
        }

        Ok(())
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "pretty".to_owned(),
        }
    }
}

/// 스캔 설정
///
/// 테스트 하나에 적용되는 로그 검사 옵션입니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// 검사할 로그 파일 이름 목록
    pub file_names: Vec<String>,
    /// 에러 마커 (라인에 포함되면 주목 대상, 순서대로 검사)
    pub error_markers: Vec<String>,
    /// 파일별 종료 마커 (`파일명;마커` 형식)
    pub end_markers: Vec<String>,
    /// 알려진 이슈 (포함된 라인은 에러에서 제외)
    pub known_issues: Vec<String>,
    /// 첫 에러에서 중단할지 여부
    pub stop_at_error: bool,
    /// 라이브 로그 루트를 가리키는 외부 속성 이름
    pub quickstart_folder_property: String,
    /// 테스트 리소스 디렉토리에서 로그를 읽을지 여부
    pub read_log_file_from_test_resources: bool,
    /// 테스트 리소스 루트 (없으면 `$CARGO_MANIFEST_DIR/tests/resources`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_resources_dir: Option<PathBuf>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            file_names: vec![DEFAULT_FILE_NAME.to_owned()],
            error_markers: DEFAULT_ERROR_MARKERS
                .iter()
                .map(|m| (*m).to_owned())
                .collect(),
            end_markers: vec![DEFAULT_END_MARKER.to_owned()],
            known_issues: Vec::new(),
            stop_at_error: true,
            quickstart_folder_property: DEFAULT_QUICKSTART_FOLDER_PROPERTY.to_owned(),
            read_log_file_from_test_resources: false,
            test_resources_dir: None,
        }
    }
}

/// 종료 마커 대기 설정
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaitConfig {
    /// 폴링 간격 (밀리초)
    pub poll_interval_ms: u64,
    /// 최대 대기 시간 (밀리초)
    pub max_wait_ms: u64,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1000,
            max_wait_ms: 120_000,
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<bool>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse bool from env var, ignoring"
            ),
        }
    }
}

fn override_u64(target: &mut u64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u64 from env var, ignoring"
            ),
        }
    }
}

fn override_csv(target: &mut Vec<String>, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val
            .split(',')
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
            .collect();
    }
}
