//! 통합 테스트 -- 규칙 전체 흐름 검증
//!
//! 번들된 샘플 로그(`tests/resources/error.log`)와 임시 디렉토리의 라이브 로그로
//! 파일 위치 결정부터 에러 수집까지의 흐름을 검증합니다.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use serial_test::serial;

use logcheck_core::error::LogCheckError;
use logcheck_core::types::Readiness;
use logcheck_scanner::{
    EnvProperties, LogFileRule, LogScannerError, RuleConfig, RuleConfigBuilder, RuleState,
    TestContext,
};

const LUCENE_ISSUE: &str = "LuceneSearchCollection Error executing doUpdate";
const TEMPLATE_ISSUE: &str = "Unable to resolve the template for the project";

fn resources() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("resources")
}

fn sample_config() -> RuleConfigBuilder {
    RuleConfigBuilder::new().test_resources_dir(resources())
}

fn errors_for(config: RuleConfig) -> usize {
    let mut rule = LogFileRule::new(Some(config));
    rule.run(|rule| rule.errors().len()).unwrap()
}

fn append(path: &Path, content: &str) {
    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .unwrap();
    file.write_all(content.as_bytes()).unwrap();
}

// --- 기본 설정 ---

#[test]
fn test_default_configuration() {
    let config = RuleConfig::default();
    assert_eq!(config.file_names, vec!["error.log"]);
    assert_eq!(config.error_markers, vec!["ERROR", "WARN"]);
    assert!(config.stop_at_error);
    assert!(config.known_issues.is_empty());
    assert_eq!(
        config.end_markers,
        vec!["error.log;WorkflowLauncherListener StartupListener.startupFinished called"]
    );
    assert_eq!(
        config.quickstart_folder_property,
        "granite.it.default.quickstart.folders"
    );
}

// --- 샘플 로그 스캔 ---

#[test]
fn test_stop_at_first_error() {
    let config = sample_config().build().unwrap();
    let mut rule = LogFileRule::new(Some(config));
    rule.before().unwrap();

    assert_eq!(rule.errors().len(), 1);
    assert!(rule.errors()[0].text.contains(LUCENE_ISSUE));
    assert_eq!(rule.errors()[0].marker.as_deref(), Some("ERROR"));
    assert!(matches!(
        rule.results()[0].readiness,
        Readiness::Ready { .. }
    ));
    rule.after();
}

#[test]
fn test_collect_all_errors() {
    let config = sample_config().stop_at_error(false).build().unwrap();
    assert_eq!(errors_for(config), 4);
}

#[test]
fn test_marker_categories_partition_matches() {
    let error_only = sample_config()
        .error_markers(["ERROR"])
        .stop_at_error(false)
        .build()
        .unwrap();
    assert_eq!(errors_for(error_only), 2);

    let warn_only = sample_config()
        .error_markers(["WARN"])
        .stop_at_error(false)
        .build()
        .unwrap();
    assert_eq!(errors_for(warn_only), 2);
}

#[test]
fn test_errors_are_in_line_order() {
    let config = sample_config().stop_at_error(false).build().unwrap();
    let mut rule = LogFileRule::new(Some(config));
    let lines = rule.run(|rule| rule.errors().to_vec()).unwrap();

    let indices: Vec<_> = lines.iter().map(|l| l.index).collect();
    let mut sorted = indices.clone();
    sorted.sort_unstable();
    assert_eq!(indices, sorted);

    let markers: Vec<_> = lines.iter().filter_map(|l| l.marker.as_deref()).collect();
    assert_eq!(markers, vec!["ERROR", "WARN", "ERROR", "WARN"]);
}

#[test]
fn test_known_issues_suppress_everything() {
    let config = sample_config()
        .known_issues([LUCENE_ISSUE, TEMPLATE_ISSUE])
        .stop_at_error(false)
        .build()
        .unwrap();
    let mut rule = LogFileRule::new(Some(config));
    rule.before().unwrap();

    assert!(rule.errors().is_empty());
    assert_eq!(rule.results()[0].suppressed, 4);
}

#[test]
fn test_known_issues_suppress_even_when_stopping() {
    let config = sample_config()
        .known_issues([LUCENE_ISSUE, TEMPLATE_ISSUE])
        .build()
        .unwrap();
    assert_eq!(errors_for(config), 0);
}

#[test]
fn test_partial_known_issues_shift_first_error() {
    let config = sample_config().known_issues([LUCENE_ISSUE]).build().unwrap();
    let mut rule = LogFileRule::new(Some(config));
    rule.before().unwrap();

    assert_eq!(rule.errors().len(), 1);
    assert!(rule.errors()[0].text.contains(TEMPLATE_ISSUE));
}

#[test]
fn test_default_resource_location() {
    let config = RuleConfigBuilder::new()
        .read_log_file_from_test_resources(true)
        .stop_at_error(false)
        .build()
        .unwrap();
    assert_eq!(errors_for(config), 4);
}

// --- 종료 마커 조회 ---

#[test]
fn test_end_marker_lookup() {
    let config = sample_config()
        .end_markers(["error.log;some end marker"])
        .build()
        .unwrap();
    let rule = LogFileRule::new(Some(config));
    assert_eq!(
        rule.end_marker_for_log_file("error.log").unwrap().as_deref(),
        Some("some end marker")
    );
    assert_eq!(rule.end_marker_for_log_file("request.log").unwrap(), None);
}

#[test]
fn test_end_marker_with_wrong_separator_is_rejected() {
    let config = sample_config()
        .end_markers(["error.log,some wrong separator for end marker"])
        .build()
        .unwrap();
    let rule = LogFileRule::new(Some(config));
    let err = rule.end_marker_for_log_file("error.log").unwrap_err();
    assert!(err.is_config_error());

    let core: LogCheckError = err.into();
    assert!(core.is_config());
}

#[test]
fn test_end_marker_without_text_is_rejected() {
    let config = sample_config().end_markers(["error.log;"]).build().unwrap();
    let rule = LogFileRule::new(Some(config));
    let err = rule.end_marker_for_log_file("error.log").unwrap_err();
    assert!(matches!(err, LogScannerError::MalformedEndMarker { .. }));
}

// --- 설정 없음 ---

#[test]
fn test_rule_without_configuration_is_inert() {
    let mut rule = LogFileRule::new(None);
    let errors = rule.run(|rule| rule.errors().len()).unwrap();
    assert_eq!(errors, 0);
    assert!(rule.rule_config().is_none());
    assert_eq!(rule.state(), RuleState::Skipped);
    assert!(rule.results().is_empty());
}

#[test]
fn test_context_chain_supplies_configuration() {
    let config = sample_config().stop_at_error(false).build().unwrap();
    let suite = Arc::new(TestContext::new("suite").with_config(config));
    let class = Arc::new(TestContext::new("PageIT").nested_in(suite));
    let method = TestContext::new("creates_page").nested_in(class);

    let mut rule = LogFileRule::for_context(&method);
    assert_eq!(rule.run(|rule| rule.errors().len()).unwrap(), 4);

    let bare = TestContext::new("unconfigured");
    let rule = LogFileRule::for_context(&bare);
    assert!(rule.rule_config().is_none());
}

// --- 라이브 로그 ---

fn live_config(end_marker: &str) -> RuleConfig {
    RuleConfigBuilder::new()
        .end_markers([format!("error.log;{end_marker}")])
        .stop_at_error(false)
        .poll_interval_ms(10)
        .max_wait_ms(2_000)
        .build()
        .unwrap()
}

fn quickstart_logs(root: &Path) -> PathBuf {
    let logs = root.join("crx-quickstart").join("logs");
    fs::create_dir_all(&logs).unwrap();
    logs
}

#[test]
fn test_live_log_times_out_and_still_scans() {
    let dir = tempfile::tempdir().unwrap();
    let logs = quickstart_logs(dir.path());
    append(&logs.join("error.log"), "*ERROR* early failure\n*INFO* booting\n");

    let config = RuleConfigBuilder::from_config(live_config("server ready"))
        .max_wait_ms(60)
        .build()
        .unwrap();
    let props = Arc::new(std::collections::HashMap::from([(
        config.quickstart_folder_property.clone(),
        dir.path().display().to_string(),
    )]));

    let started = Instant::now();
    let mut rule = LogFileRule::new(Some(config)).with_properties(props);
    rule.before().unwrap();

    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(rule.timed_out_files(), vec!["error.log"]);
    assert_eq!(rule.errors().len(), 1);
    assert_eq!(rule.results()[0].lines_scanned, 2);
}

#[test]
fn test_live_log_missing_file_times_out_empty() {
    let dir = tempfile::tempdir().unwrap();
    quickstart_logs(dir.path());

    let config = RuleConfigBuilder::from_config(live_config("server ready"))
        .max_wait_ms(30)
        .build()
        .unwrap();
    let props = Arc::new(std::collections::HashMap::from([(
        config.quickstart_folder_property.clone(),
        dir.path().display().to_string(),
    )]));

    let mut rule = LogFileRule::new(Some(config)).with_properties(props);
    rule.before().unwrap();

    assert!(rule.errors().is_empty());
    assert!(rule.results()[0].readiness.is_timed_out());
    assert_eq!(rule.results()[0].lines_scanned, 0);
}

#[test]
fn test_live_log_waits_for_late_end_marker() {
    let dir = tempfile::tempdir().unwrap();
    let logs = quickstart_logs(dir.path());
    let log = logs.join("error.log");
    append(&log, "*INFO* booting\n");

    let config = live_config("startupFinished called");
    let props = Arc::new(std::collections::HashMap::from([(
        config.quickstart_folder_property.clone(),
        dir.path().display().to_string(),
    )]));

    let writer_log = log.clone();
    let writer = thread::spawn(move || {
        thread::sleep(Duration::from_millis(50));
        append(&writer_log, "*WARN* slow bundle\n*INFO* startup");
        thread::sleep(Duration::from_millis(30));
        append(&writer_log, "Finished called\n*ERROR* after ready\n");
    });

    let mut rule = LogFileRule::new(Some(config)).with_properties(props);
    rule.before().unwrap();
    writer.join().unwrap();

    match rule.results()[0].readiness {
        Readiness::Ready { attempts } => assert!(attempts > 1),
        other => panic!("expected ready, got {other}"),
    }
    // 종료 마커 이후의 라인은 스캔 창에 포함되지 않음
    assert_eq!(rule.errors().len(), 1);
    assert_eq!(rule.errors()[0].text, "*WARN* slow bundle");

    // 테스트 본문 중 추가된 라인은 이어서 스캔
    assert_eq!(rule.scan_appended().unwrap(), 1);
    assert_eq!(rule.errors()[1].text, "*ERROR* after ready");
    rule.after();
}

#[test]
fn test_live_log_dir_created_during_wait() {
    let dir = tempfile::tempdir().unwrap();
    // 서버가 crx-quickstart를 만들기 전에 다른 디렉토리가 먼저 있어도 따라가지 않음
    fs::create_dir_all(dir.path().join("logs")).unwrap();

    let config = live_config("ready");
    let props = Arc::new(std::collections::HashMap::from([(
        config.quickstart_folder_property.clone(),
        dir.path().display().to_string(),
    )]));

    let root = dir.path().to_path_buf();
    let writer = thread::spawn(move || {
        thread::sleep(Duration::from_millis(50));
        let logs = quickstart_logs(&root);
        append(&logs.join("error.log"), "*ERROR* boom
*INFO* ready
");
    });

    let mut rule = LogFileRule::new(Some(config)).with_properties(props);
    rule.before().unwrap();
    writer.join().unwrap();

    let result = &rule.results()[0];
    assert!(matches!(result.readiness, Readiness::Ready { .. }));
    assert_eq!(
        result.path,
        dir.path().join("crx-quickstart").join("logs").join("error.log")
    );
    assert_eq!(rule.errors().len(), 1);
    assert_eq!(rule.errors()[0].text, "*ERROR* boom");
    rule.after();
}

#[test]
fn test_live_log_file_created_during_wait() {
    let dir = tempfile::tempdir().unwrap();
    let log = quickstart_logs(dir.path()).join("error.log");

    let config = live_config("ready");
    let props = Arc::new(std::collections::HashMap::from([(
        config.quickstart_folder_property.clone(),
        dir.path().display().to_string(),
    )]));

    let writer_log = log.clone();
    let writer = thread::spawn(move || {
        thread::sleep(Duration::from_millis(50));
        append(&writer_log, "*WARN* late bundle
*INFO* ready
");
    });

    let mut rule = LogFileRule::new(Some(config)).with_properties(props);
    rule.before().unwrap();
    writer.join().unwrap();

    let result = &rule.results()[0];
    match result.readiness {
        Readiness::Ready { attempts } => assert!(attempts > 1),
        other => panic!("expected ready, got {other}"),
    }
    assert_eq!(result.path, log);
    assert_eq!(result.lines_scanned, 2);
    assert_eq!(rule.errors().len(), 1);
    assert_eq!(rule.errors()[0].marker.as_deref(), Some("WARN"));
    rule.after();
}

#[test]
fn test_directory_in_place_of_log_is_treated_as_absent() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("error.log")).unwrap();

    let config = RuleConfigBuilder::new()
        .test_resources_dir(dir.path())
        .end_markers(Vec::<String>::new())
        .build()
        .unwrap();
    let mut rule = LogFileRule::new(Some(config));
    rule.before().unwrap();

    assert_eq!(rule.state(), RuleState::Done);
    assert!(rule.errors().is_empty());
    assert_eq!(rule.results()[0].readiness, Readiness::NotConfigured);
    assert_eq!(rule.results()[0].lines_scanned, 0);
}

#[test]
fn test_scope_finalizes_on_panic() {
    let config = sample_config().build().unwrap();
    let mut rule = LogFileRule::new(Some(config));

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        let _scope = rule.scope().unwrap();
        panic!("test body failed");
    }));

    assert!(result.is_err());
    assert!(rule.is_finalized());
}

#[test]
#[serial]
fn test_env_properties_resolve_quickstart_folder() {
    let dir = tempfile::tempdir().unwrap();
    let logs = quickstart_logs(dir.path());
    append(&logs.join("error.log"), "*INFO* startupFinished called\n");

    let property = "logcheck.it.quickstart.folders";
    // SAFETY: serial 테스트에서만 환경변수를 변경함
    unsafe {
        std::env::set_var(
            EnvProperties::env_key(property),
            format!("{},/unused/second", dir.path().display()),
        );
    }

    let config = RuleConfigBuilder::from_config(live_config("startupFinished called"))
        .quickstart_folder_property(property)
        .build()
        .unwrap();
    let mut rule = LogFileRule::new(Some(config));
    let outcome = rule.before();

    unsafe {
        std::env::remove_var(EnvProperties::env_key(property));
    }

    outcome.unwrap();
    assert!(rule.errors().is_empty());
    assert_eq!(rule.results()[0].path, logs.join("error.log"));
}
