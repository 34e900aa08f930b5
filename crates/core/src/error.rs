//! 에러 타입 -- 도메인별 에러 정의

/// logcheck 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum LogCheckError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 로그 스캔 에러
    #[error("scan error: {0}")]
    Scan(String),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl LogCheckError {
    /// 설정 거부 계열 에러인지 확인합니다.
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}
