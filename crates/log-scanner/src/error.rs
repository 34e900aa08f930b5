//! 로그 스캐너 에러 타입
//!
//! [`LogScannerError`]는 로그 스캐너 내부에서 발생하는 모든 에러를 표현합니다.
//! `From<LogScannerError> for LogCheckError` 변환이 구현되어 있어
//! 상위 레이어에서 `?` 연산자로 자연스럽게 전파할 수 있습니다.
//!
//! 로그 내용 때문에 실패하는 경우는 없습니다. 스캔과 필터링은 어떤 라인이든 처리하며,
//! 설정 해석과 파일 I/O만 에러를 반환합니다.

use logcheck_core::error::{ConfigError, LogCheckError};

/// 로그 스캐너 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum LogScannerError {
    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },

    /// 형식이 잘못된 종료 마커 항목 (`파일명;마커` 형식 위반)
    #[error("malformed end-marker entry '{entry}': {reason}")]
    MalformedEndMarker {
        /// 원본 설정 문자열
        entry: String,
        /// 거부 사유
        reason: String,
    },

    /// 라이브 로그 위치를 가리키는 외부 속성이 없음
    #[error("property '{property}' is not set, cannot locate quickstart folder")]
    MissingProperty {
        /// 속성 이름
        property: String,
    },

    /// 로그 파일 읽기 실패
    #[error("source error: {path}: {reason}")]
    Source {
        /// 파일 경로
        path: String,
        /// 실패 사유
        reason: String,
    },

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl LogScannerError {
    /// 설정 거부 계열 에러인지 확인합니다.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::Config { .. } | Self::MalformedEndMarker { .. } | Self::MissingProperty { .. }
        )
    }
}

impl From<LogScannerError> for LogCheckError {
    fn from(err: LogScannerError) -> Self {
        match err {
            LogScannerError::Config { field, reason } => {
                LogCheckError::Config(ConfigError::InvalidValue { field, reason })
            }
            LogScannerError::MalformedEndMarker { .. } => {
                LogCheckError::Config(ConfigError::InvalidValue {
                    field: "scan.end_markers".to_owned(),
                    reason: err.to_string(),
                })
            }
            LogScannerError::MissingProperty { ref property } => {
                LogCheckError::Config(ConfigError::InvalidValue {
                    field: "scan.quickstart_folder_property".to_owned(),
                    reason: format!("property '{property}' is not set"),
                })
            }
            LogScannerError::Io(e) => LogCheckError::Io(e),
            LogScannerError::Source { .. } => LogCheckError::Scan(err.to_string()),
        }
    }
}
