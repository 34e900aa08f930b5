//! 로그 검사 규칙 -- 테스트 앞뒤로 로그 파일을 찾고, 준비 신호를 기다리고, 에러를 수집합니다.
//!
//! [`LogFileRule`]은 테스트 하나의 검사 생명주기를 관리합니다.
//!
//! # 상태 전이
//! ```text
//! Init -> LocatingFile -> AwaitingEndMarker -> Scanning -> Done
//! Init -> Skipped   (설정 없음)
//! ```
//!
//! 종료 마커 대기는 호출 스레드를 블로킹합니다. 마커가 최대 대기 시간 안에
//! 나타나지 않아도 실패하지 않고, 그때까지 읽은 내용으로 스캔한 뒤
//! [`Readiness::TimedOut`]으로 기록합니다.
//!
//! # 사용 예시
//! ```ignore
//! use logcheck_scanner::{LogFileRule, RuleConfigBuilder};
//!
//! let config = RuleConfigBuilder::new().test_resources_dir("tests/resources").build()?;
//! let mut rule = LogFileRule::new(Some(config));
//! let errors = rule.run(|rule| rule.errors().to_vec())?;
//! assert!(errors.is_empty());
//! ```

use std::collections::HashSet;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use uuid::Uuid;

use logcheck_core::metrics as m;
use logcheck_core::retry::{RetryPolicy, WaitOutcome, wait_until};
use logcheck_core::types::{LogLine, Readiness, ScanResult};

use crate::config::RuleConfig;
use crate::context::TestContext;
use crate::end_marker::EndMarkers;
use crate::error::LogScannerError;
use crate::known_issue::KnownIssueFilter;
use crate::scanner::{ErrorScanner, ScanOutcome};
use crate::source::{Cursor, EnvProperties, LogFileSource, PropertySource, SourceLine};

/// 규칙 실행 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleState {
    /// 생성됨, 아직 실행하지 않음
    Init,
    /// 로그 파일 위치 결정 중
    LocatingFile,
    /// 종료 마커 대기 중
    AwaitingEndMarker,
    /// 에러 스캔 중
    Scanning,
    /// 스캔 완료
    Done,
    /// 설정이 없어 아무것도 하지 않음
    Skipped,
}

impl fmt::Display for RuleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Init => "init",
            Self::LocatingFile => "locating_file",
            Self::AwaitingEndMarker => "awaiting_end_marker",
            Self::Scanning => "scanning",
            Self::Done => "done",
            Self::Skipped => "skipped",
        };
        f.write_str(name)
    }
}

/// 파일별 읽기 상태 (`scan_appended`에서 이어 읽기 위해 유지)
#[derive(Debug)]
struct FileCursor {
    source: LogFileSource,
    cursor: Cursor,
    /// 첫 에러 정책으로 더 이상 스캔하지 않음
    halted: bool,
}

/// 종료 마커 대기 결과 (스캔 창)
struct Window {
    lines: Vec<SourceLine>,
    cursor: Cursor,
    readiness: Readiness,
}

/// 로그 파일 검사 규칙
pub struct LogFileRule {
    /// 적용된 설정 (None이면 비활성)
    config: Option<RuleConfig>,
    /// 외부 속성 소스
    properties: Arc<dyn PropertySource>,
    /// 실행 식별자 (로그 상관관계용)
    run_id: Uuid,
    /// 현재 상태
    state: RuleState,
    /// 파일별 결과 (설정된 파일 순서)
    results: Vec<ScanResult>,
    /// 전체 에러 (파일 순서, 라인 순서)
    errors: Vec<LogLine>,
    /// 파일별 커서
    files: Vec<FileCursor>,
    /// `after()` 호출 여부
    finalized: bool,
}

impl fmt::Debug for LogFileRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogFileRule")
            .field("config", &self.config)
            .field("run_id", &self.run_id)
            .field("state", &self.state)
            .field("results", &self.results)
            .field("finalized", &self.finalized)
            .finish_non_exhaustive()
    }
}

impl LogFileRule {
    /// 새 규칙을 생성합니다. 설정이 `None`이면 규칙은 아무것도 하지 않습니다.
    pub fn new(config: Option<RuleConfig>) -> Self {
        Self {
            config,
            properties: Arc::new(EnvProperties),
            run_id: Uuid::new_v4(),
            state: RuleState::Init,
            results: Vec::new(),
            errors: Vec::new(),
            files: Vec::new(),
            finalized: false,
        }
    }

    /// 테스트 컨텍스트 체인에서 가장 가까운 설정으로 규칙을 생성합니다.
    pub fn for_context(context: &TestContext) -> Self {
        let config = context.resolve_config().cloned();
        tracing::debug!(
            context = %context.path(),
            configured = config.is_some(),
            "resolved log check configuration"
        );
        Self::new(config)
    }

    /// 외부 속성 소스를 교체합니다 (기본: 환경변수).
    pub fn with_properties(mut self, properties: Arc<dyn PropertySource>) -> Self {
        self.properties = properties;
        self
    }

    /// 현재 상태를 반환합니다.
    pub fn state(&self) -> RuleState {
        self.state
    }

    /// 실행 식별자를 반환합니다.
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// 적용된 설정을 반환합니다.
    pub fn rule_config(&self) -> Option<&RuleConfig> {
        self.config.as_ref()
    }

    /// 파일별 스캔 결과를 반환합니다.
    pub fn results(&self) -> &[ScanResult] {
        &self.results
    }

    /// 보고된 에러를 파일 순서, 라인 순서로 반환합니다.
    pub fn errors(&self) -> &[LogLine] {
        &self.errors
    }

    /// 종료 마커를 기다리다 시간 초과된 파일 이름을 반환합니다.
    pub fn timed_out_files(&self) -> Vec<&str> {
        self.results
            .iter()
            .filter(|r| r.readiness.is_timed_out())
            .map(|r| r.file.as_str())
            .collect()
    }

    /// `after()`가 호출되었는지 확인합니다.
    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// 파일에 설정된 종료 마커를 조회합니다.
    ///
    /// 설정이 없거나 해당 파일에 마커가 없으면 `Ok(None)`.
    /// 종료 마커 항목의 형식이 잘못되었으면 이 시점에 설정 에러를 반환합니다.
    pub fn end_marker_for_log_file(&self, file_name: &str) -> Result<Option<String>, LogScannerError> {
        let Some(config) = self.config.as_ref() else {
            return Ok(None);
        };
        let markers = EndMarkers::parse(&config.end_markers)?;
        Ok(markers.get(file_name).map(str::to_owned))
    }

    /// 테스트 본문 전에 실행합니다: 파일 위치 결정, 종료 마커 대기, 에러 스캔.
    pub fn before(&mut self) -> Result<(), LogScannerError> {
        self.reset();

        let Some(config) = self.config.clone() else {
            self.state = RuleState::Skipped;
            tracing::debug!(run_id = %self.run_id, "no log check configuration, rule is inert");
            return Ok(());
        };
        config.validate()?;

        tracing::info!(
            run_id = %self.run_id,
            files = config.file_names.len(),
            stop_at_error = config.stop_at_error,
            "log check started"
        );

        self.state = RuleState::LocatingFile;
        let sources = self.locate_files(&config)?;

        self.state = RuleState::AwaitingEndMarker;
        let end_markers = EndMarkers::parse(&config.end_markers)?;
        let policy = config.retry_policy();
        let mut windows = Vec::with_capacity(sources.len());
        for source in sources {
            let window = await_end_marker(&source, end_markers.get(source.name()), &policy)?;
            windows.push((source, window));
        }

        self.state = RuleState::Scanning;
        let scanner = ErrorScanner::new(config.error_markers.iter().cloned(), config.stop_at_error);
        let known_issues = KnownIssueFilter::new(config.known_issues.iter().cloned());
        for (source, window) in windows {
            let outcome = scanner.scan(source.name(), &window.lines, &known_issues);
            record_metrics(source.name(), &outcome);

            let mut result = ScanResult::new(source.name(), source.path(), window.readiness);
            let halted = scanner.stops_at_error() && !outcome.errors.is_empty();
            merge_outcome(&mut result, outcome);
            self.results.push(result);
            self.files.push(FileCursor {
                source,
                cursor: window.cursor,
                halted,
            });
        }

        self.collect_errors();
        self.state = RuleState::Done;
        Ok(())
    }

    /// 준비 시점 이후 추가된 라인을 같은 정책으로 스캔합니다.
    ///
    /// 새로 보고된 에러 수를 반환합니다. 규칙이 완료 상태가 아니면 아무것도 하지 않습니다.
    pub fn scan_appended(&mut self) -> Result<usize, LogScannerError> {
        if self.state != RuleState::Done {
            return Ok(0);
        }
        let Some(config) = self.config.as_ref() else {
            return Ok(0);
        };

        let scanner = ErrorScanner::new(config.error_markers.iter().cloned(), config.stop_at_error);
        let known_issues = KnownIssueFilter::new(config.known_issues.iter().cloned());
        let mut found = 0;

        for (file, result) in self.files.iter_mut().zip(self.results.iter_mut()) {
            let (lines, next) = file.source.read_from(file.cursor)?;
            file.cursor = next;
            if file.halted || lines.is_empty() {
                continue;
            }

            let outcome = scanner.scan(file.source.name(), &lines, &known_issues);
            record_metrics(file.source.name(), &outcome);
            found += outcome.errors.len();
            file.halted = scanner.stops_at_error() && !outcome.errors.is_empty();
            merge_outcome(result, outcome);
        }

        if found > 0 {
            self.collect_errors();
            tracing::info!(run_id = %self.run_id, errors = found, "errors found in appended log lines");
        }
        Ok(found)
    }

    /// 테스트 본문 후에 실행합니다. 여러 번 호출해도 한 번만 처리합니다.
    pub fn after(&mut self) {
        if self.finalized {
            return;
        }
        self.finalized = true;

        match self.state {
            RuleState::Done => {
                let timed_out = self.timed_out_files();
                tracing::info!(
                    run_id = %self.run_id,
                    errors = self.errors.len(),
                    timed_out = ?timed_out,
                    "log check finished"
                );
            }
            RuleState::Skipped | RuleState::Init => {
                tracing::debug!(run_id = %self.run_id, state = %self.state, "log check finalized");
            }
            state => {
                tracing::warn!(run_id = %self.run_id, state = %state, "log check aborted before completion");
            }
        }

        self.files.clear();
    }

    /// `before()`를 실행하고, 범위를 벗어날 때 `after()`를 호출하는 가드를 반환합니다.
    ///
    /// `before()`가 실패해도 `after()`는 호출됩니다.
    pub fn scope(&mut self) -> Result<RuleScope<'_>, LogScannerError> {
        if let Err(e) = self.before() {
            self.after();
            return Err(e);
        }
        Ok(RuleScope { rule: self })
    }

    /// 테스트 본문을 규칙 범위 안에서 실행하고 그 결과를 반환합니다.
    pub fn run<F, T>(&mut self, body: F) -> Result<T, LogScannerError>
    where
        F: FnOnce(&mut LogFileRule) -> T,
    {
        let mut scope = self.scope()?;
        Ok(body(&mut scope))
    }

    fn reset(&mut self) {
        self.state = RuleState::Init;
        self.results.clear();
        self.errors.clear();
        self.files.clear();
        self.finalized = false;
    }

    /// 설정된 파일의 소스를 결정합니다. 중복 이름은 한 번만 검사합니다.
    fn locate_files(&self, config: &RuleConfig) -> Result<Vec<LogFileSource>, LogScannerError> {
        let mut seen = HashSet::new();
        let mut sources = Vec::with_capacity(config.file_names.len());

        for name in &config.file_names {
            if !seen.insert(name.as_str()) {
                tracing::warn!(file = name.as_str(), "duplicate log file name, scanning once");
                continue;
            }
            let source = LogFileSource::resolve(config, self.properties.as_ref(), name)?;
            if !source.exists() {
                // 라이브 로그는 아직 생성되지 않았을 수 있음
                tracing::debug!(
                    file = name.as_str(),
                    path = %source.path().display(),
                    "log file not present yet"
                );
            }
            sources.push(source);
        }

        Ok(sources)
    }

    fn collect_errors(&mut self) {
        self.errors = self
            .results
            .iter()
            .flat_map(|r| r.errors.iter().cloned())
            .collect();
    }
}

/// 종료 마커가 나타날 때까지 라인을 읽어 스캔 창을 만듭니다.
///
/// 창은 마커가 있는 라인에서 끝나며, 그 뒤에 쓰인 라인은 포함하지 않습니다.
/// 마커가 설정되지 않은 파일은 기다리지 않고 현재 완전한 라인을 모두 읽습니다.
fn await_end_marker(
    source: &LogFileSource,
    marker: Option<&str>,
    policy: &RetryPolicy,
) -> Result<Window, LogScannerError> {
    let Some(marker) = marker else {
        let (lines, cursor) = source.read_from(Cursor::default())?;
        return Ok(Window {
            lines,
            cursor,
            readiness: Readiness::NotConfigured,
        });
    };

    let mut lines = Vec::new();
    let mut cursor = Cursor::default();
    let outcome = wait_until(policy, || -> Result<bool, LogScannerError> {
        let (batch, _) = source.read_from(cursor)?;
        for line in batch {
            cursor.advance_past(&line);
            let found = line.text.contains(marker);
            lines.push(line);
            if found {
                return Ok(true);
            }
        }
        Ok(false)
    })?;

    let readiness = match outcome {
        WaitOutcome::Ready { attempts, elapsed } => {
            tracing::debug!(
                file = source.name(),
                attempts,
                elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
                "end marker found"
            );
            Readiness::Ready { attempts }
        }
        WaitOutcome::TimedOut { attempts, elapsed } => {
            tracing::warn!(
                file = source.name(),
                marker,
                attempts,
                elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
                lines = lines.len(),
                "end marker not found within max wait, scanning captured lines"
            );
            metrics::counter!(m::END_MARKER_TIMEOUTS_TOTAL, m::LABEL_FILE => source.name().to_owned())
                .increment(1);
            Readiness::TimedOut { attempts }
        }
    };

    Ok(Window {
        lines,
        cursor,
        readiness,
    })
}

fn merge_outcome(result: &mut ScanResult, outcome: ScanOutcome) {
    result.lines_scanned += outcome.lines_scanned;
    result.suppressed += outcome.suppressed;
    result.errors.extend(outcome.errors);
}

fn record_metrics(file: &str, outcome: &ScanOutcome) {
    metrics::counter!(m::LINES_SCANNED_TOTAL, m::LABEL_FILE => file.to_owned())
        .increment(outcome.lines_scanned as u64);
    metrics::counter!(m::KNOWN_ISSUES_SUPPRESSED_TOTAL, m::LABEL_FILE => file.to_owned())
        .increment(outcome.suppressed as u64);
    for line in &outcome.errors {
        let marker = line.marker.clone().unwrap_or_default();
        metrics::counter!(
            m::ERRORS_FOUND_TOTAL,
            m::LABEL_FILE => file.to_owned(),
            m::LABEL_MARKER => marker
        )
        .increment(1);
    }
}

/// 규칙 범위 가드
///
/// 드롭될 때 `after()`를 호출합니다 (패닉으로 빠져나가는 경우 포함).
#[derive(Debug)]
pub struct RuleScope<'a> {
    rule: &'a mut LogFileRule,
}

impl Deref for RuleScope<'_> {
    type Target = LogFileRule;

    fn deref(&self) -> &Self::Target {
        self.rule
    }
}

impl DerefMut for RuleScope<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.rule
    }
}

impl Drop for RuleScope<'_> {
    fn drop(&mut self) {
        self.rule.after();
    }
}
