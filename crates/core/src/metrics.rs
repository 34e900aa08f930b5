//! 메트릭 이름 상수
//!
//! 모든 메트릭의 이름을 중앙에서 정의합니다.
//! 스캐너는 이 상수로 `metrics::counter!()` 매크로를 호출합니다.
//! 레코더가 설치되지 않은 환경에서는 아무 동작도 하지 않습니다.
//! 레코더 설치와 설명 등록은 호스트 애플리케이션이 담당합니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `logcheck_`
//! - 접미어: `_total` (counter)

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 로그 파일 레이블 키
pub const LABEL_FILE: &str = "file";

/// 에러 마커 레이블 키
pub const LABEL_MARKER: &str = "marker";

// ─── 스캐너 메트릭 ──────────────────────────────────────────────────

/// 스캔한 라인 수 (counter, label: file)
pub const LINES_SCANNED_TOTAL: &str = "logcheck_lines_scanned_total";

/// 에러로 보고된 라인 수 (counter, label: file, marker)
pub const ERRORS_FOUND_TOTAL: &str = "logcheck_errors_found_total";

/// 알려진 이슈로 제외된 라인 수 (counter, label: file)
pub const KNOWN_ISSUES_SUPPRESSED_TOTAL: &str = "logcheck_known_issues_suppressed_total";

/// 종료 마커 대기 시간 초과 횟수 (counter, label: file)
pub const END_MARKER_TIMEOUTS_TOTAL: &str = "logcheck_end_marker_timeouts_total";
