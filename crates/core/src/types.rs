//! 도메인 타입 -- 스캔 결과를 표현하는 공통 타입
//!
//! 스캐너가 생성하고 CLI/테스트 코드가 소비하는 데이터 구조를 정의합니다.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// 로그 라인
///
/// 에러로 분류된 라인은 `marker`에 처음 매칭된 에러 마커를 담습니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogLine {
    /// 라인이 속한 로그 파일 이름
    pub file: String,
    /// 파일 내 0 기반 라인 번호
    pub index: usize,
    /// 원본 라인 텍스트 (줄바꿈 제외)
    pub text: String,
    /// 매칭된 에러 마커 (분류되지 않은 라인은 None)
    pub marker: Option<String>,
}

impl LogLine {
    /// 분류되지 않은 라인을 생성합니다.
    pub fn new(file: impl Into<String>, index: usize, text: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            index,
            text: text.into(),
            marker: None,
        }
    }

    /// 매칭된 에러 마커를 설정합니다.
    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = Some(marker.into());
        self
    }
}

impl fmt::Display for LogLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.marker {
            Some(ref marker) => write!(f, "{}:{} [{}] {}", self.file, self.index, marker, self.text),
            None => write!(f, "{}:{} {}", self.file, self.index, self.text),
        }
    }
}

/// 종료 마커 대기 결과
///
/// 마커가 끝내 나타나지 않아도 스캔은 진행되므로,
/// 준비 상태가 확인되었는지 여부를 호출자가 직접 확인할 수 있도록 노출합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Readiness {
    /// 해당 파일에 종료 마커가 설정되지 않음
    NotConfigured,
    /// 종료 마커 확인됨
    Ready {
        /// 폴링 시도 횟수
        attempts: u32,
    },
    /// 최대 대기 시간 내에 종료 마커가 나타나지 않음
    TimedOut {
        /// 폴링 시도 횟수
        attempts: u32,
    },
}

impl Readiness {
    /// 대기 시간이 초과되었는지 확인합니다.
    pub fn is_timed_out(&self) -> bool {
        matches!(self, Self::TimedOut { .. })
    }
}

impl fmt::Display for Readiness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConfigured => write!(f, "no end marker"),
            Self::Ready { attempts } => write!(f, "ready after {attempts} attempt(s)"),
            Self::TimedOut { attempts } => write!(f, "timed out after {attempts} attempt(s)"),
        }
    }
}

/// 파일 하나에 대한 스캔 결과
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResult {
    /// 로그 파일 이름
    pub file: String,
    /// 실제로 읽은 경로
    pub path: PathBuf,
    /// 종료 마커 대기 결과
    pub readiness: Readiness,
    /// 스캔한 라인 수
    pub lines_scanned: usize,
    /// 알려진 이슈로 제외된 라인 수
    pub suppressed: usize,
    /// 에러로 분류된 라인 (파일 순서)
    pub errors: Vec<LogLine>,
}

impl ScanResult {
    /// 빈 결과를 생성합니다.
    pub fn new(file: impl Into<String>, path: impl Into<PathBuf>, readiness: Readiness) -> Self {
        Self {
            file: file.into(),
            path: path.into(),
            readiness,
            lines_scanned: 0,
            suppressed: 0,
            errors: Vec::new(),
        }
    }

    /// 에러가 없는지 확인합니다.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}
