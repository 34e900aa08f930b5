//! 에러 스캐너 -- 로그 라인을 에러 마커로 분류합니다.
//!
//! [`ErrorScanner`]는 라인마다 설정 순서대로 에러 마커 포함 여부를 확인하고,
//! 처음 매칭된 마커로 라인을 분류합니다 (대소문자 구분, 단순 포함 검사).
//!
//! 알려진 이슈는 첫 에러 중단 정책보다 먼저 걸러집니다.
//! `stop_at_error`가 켜져 있어도 알려진 이슈는 "첫 에러"로 세지 않습니다.

use logcheck_core::types::LogLine;

use crate::known_issue::KnownIssueFilter;
use crate::source::SourceLine;

/// 스캔 결과 요약
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanOutcome {
    /// 에러로 보고된 라인 (파일 순서)
    pub errors: Vec<LogLine>,
    /// 실제로 검사한 라인 수
    pub lines_scanned: usize,
    /// 알려진 이슈로 제외된 라인 수
    pub suppressed: usize,
    /// 첫 에러 정책으로 스캔이 중단되었는지 여부
    pub halted: bool,
}

/// 에러 스캐너
#[derive(Debug, Clone)]
pub struct ErrorScanner {
    /// 에러 마커 (검사 순서)
    markers: Vec<String>,
    /// 첫 에러에서 중단할지 여부
    stop_at_error: bool,
}

impl ErrorScanner {
    /// 새 스캐너를 생성합니다.
    pub fn new<I, S>(markers: I, stop_at_error: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            markers: markers.into_iter().map(Into::into).collect(),
            stop_at_error,
        }
    }

    /// 첫 에러에서 중단하는지 반환합니다.
    pub fn stops_at_error(&self) -> bool {
        self.stop_at_error
    }

    /// 텍스트에 처음 매칭되는 에러 마커를 반환합니다.
    pub fn classify(&self, text: &str) -> Option<&str> {
        self.markers
            .iter()
            .find(|marker| text.contains(marker.as_str()))
            .map(String::as_str)
    }

    /// 라인 목록을 스캔합니다.
    ///
    /// 에러 마커에 매칭되고 알려진 이슈가 아닌 라인만 보고합니다.
    /// `stop_at_error`가 켜져 있으면 첫 보고 라인에서 스캔을 멈춥니다.
    pub fn scan(
        &self,
        file: &str,
        lines: &[SourceLine],
        known_issues: &KnownIssueFilter,
    ) -> ScanOutcome {
        let mut outcome = ScanOutcome::default();

        for line in lines {
            outcome.lines_scanned += 1;

            let Some(marker) = self.classify(&line.text) else {
                continue;
            };

            if let Some(issue) = known_issues.matching_issue(&line.text) {
                tracing::debug!(file, line = line.index, issue, "suppressed known issue");
                outcome.suppressed += 1;
                continue;
            }

            outcome
                .errors
                .push(LogLine::new(file, line.index, line.text.as_str()).with_marker(marker));

            if self.stop_at_error {
                outcome.halted = true;
                break;
            }
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(texts: &[&str]) -> Vec<SourceLine> {
        let mut offset = 0u64;
        texts
            .iter()
            .enumerate()
            .map(|(index, text)| {
                offset += text.len() as u64 + 1;
                SourceLine {
                    index,
                    text: (*text).to_owned(),
                    next_offset: offset,
                }
            })
            .collect()
    }

    fn sample() -> Vec<SourceLine> {
        lines(&[
            "*INFO* startup",
            "*WARN* slow query",
            "*ERROR* broken pipe",
            "*INFO* ok",
            "*ERROR* WARN both markers",
        ])
    }

    #[test]
    fn classify_uses_configured_order() {
        let scanner = ErrorScanner::new(["ERROR", "WARN"], false);
        assert_eq!(scanner.classify("*ERROR* WARN both"), Some("ERROR"));

        let reversed = ErrorScanner::new(["WARN", "ERROR"], false);
        assert_eq!(reversed.classify("*ERROR* WARN both"), Some("WARN"));
    }

    #[test]
    fn classify_is_case_sensitive() {
        let scanner = ErrorScanner::new(["ERROR"], false);
        assert_eq!(scanner.classify("an error occurred"), None);
    }

    #[test]
    fn collects_all_when_not_stopping() {
        let scanner = ErrorScanner::new(["ERROR", "WARN"], false);
        let outcome = scanner.scan("error.log", &sample(), &KnownIssueFilter::default());
        let indices: Vec<_> = outcome.errors.iter().map(|l| l.index).collect();
        assert_eq!(indices, vec![1, 2, 4]);
        assert_eq!(outcome.errors[0].marker.as_deref(), Some("WARN"));
        assert_eq!(outcome.errors[2].marker.as_deref(), Some("ERROR"));
        assert_eq!(outcome.lines_scanned, 5);
        assert!(!outcome.halted);
    }

    #[test]
    fn stops_at_first_error() {
        let scanner = ErrorScanner::new(["ERROR", "WARN"], true);
        let outcome = scanner.scan("error.log", &sample(), &KnownIssueFilter::default());
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].index, 1);
        assert_eq!(outcome.lines_scanned, 2);
        assert!(outcome.halted);
    }

    #[test]
    fn known_issue_is_not_the_first_error() {
        let scanner = ErrorScanner::new(["ERROR", "WARN"], true);
        let filter = KnownIssueFilter::new(["slow query"]);
        let outcome = scanner.scan("error.log", &sample(), &filter);
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].index, 2);
        assert_eq!(outcome.suppressed, 1);
    }

    #[test]
    fn only_known_issues_yield_nothing_even_when_stopping() {
        let scanner = ErrorScanner::new(["ERROR"], true);
        let filter = KnownIssueFilter::new(["broken pipe", "both markers"]);
        let outcome = scanner.scan("error.log", &sample(), &filter);
        assert!(outcome.errors.is_empty());
        assert_eq!(outcome.suppressed, 2);
        assert!(!outcome.halted);
    }

    #[test]
    fn errors_carry_file_name() {
        let scanner = ErrorScanner::new(["ERROR"], false);
        let outcome = scanner.scan("request.log", &sample(), &KnownIssueFilter::default());
        assert!(outcome.errors.iter().all(|l| l.file == "request.log"));
    }
}
