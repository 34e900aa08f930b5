//! 로그 파일 소스 -- 커서 위치 이후에 추가된 완전한 라인을 읽습니다.
//!
//! `tail -f`와 비슷하게 바이트 오프셋 커서를 유지하며, 매 호출마다
//! 파일을 열고 읽은 뒤 바로 닫습니다 (핸들을 폴링 사이에 유지하지 않음).
//!
//! # 로그 위치
//! - 테스트 리소스 모드: 테스트와 함께 배포된 리소스 디렉토리
//! - 라이브 모드: 외부 속성이 가리키는 quickstart 폴더의 로그 디렉토리

use std::collections::HashMap;
use std::fs::File;
use std::io::{ErrorKind, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use crate::config::RuleConfig;
use crate::error::LogScannerError;

/// 외부 속성 조회 인터페이스
///
/// quickstart 폴더 위치처럼 테스트 실행 환경이 제공하는 값을 조회합니다.
pub trait PropertySource: Send + Sync {
    /// 속성 값을 반환합니다. 없으면 `None`.
    fn property(&self, name: &str) -> Option<String>;
}

/// 환경변수 기반 속성 소스
///
/// 이름을 그대로 조회한 뒤, 없으면 대문자 + `_` 형식으로 다시 조회합니다.
/// (`granite.it.default.quickstart.folders` -> `GRANITE_IT_DEFAULT_QUICKSTART_FOLDERS`)
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvProperties;

impl EnvProperties {
    /// 속성 이름을 환경변수 이름으로 변환합니다.
    pub fn env_key(name: &str) -> String {
        name.chars()
            .map(|c| match c {
                '.' | '-' => '_',
                other => other.to_ascii_uppercase(),
            })
            .collect()
    }
}

impl PropertySource for EnvProperties {
    fn property(&self, name: &str) -> Option<String> {
        std::env::var(name)
            .ok()
            .or_else(|| std::env::var(Self::env_key(name)).ok())
    }
}

impl PropertySource for HashMap<String, String> {
    fn property(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// 테스트 리소스 기본 루트를 반환합니다.
///
/// cargo가 테스트 바이너리에 설정하는 `CARGO_MANIFEST_DIR` 아래 `tests/resources`를 우선 사용합니다.
pub fn default_test_resources_dir() -> PathBuf {
    match std::env::var_os("CARGO_MANIFEST_DIR") {
        Some(dir) => PathBuf::from(dir).join("tests").join("resources"),
        None => PathBuf::from("tests").join("resources"),
    }
}

/// 설정과 속성으로부터 로그 루트 디렉토리를 결정합니다.
pub fn resolve_log_root(
    config: &RuleConfig,
    properties: &dyn PropertySource,
) -> Result<PathBuf, LogScannerError> {
    if config.read_log_file_from_test_resources {
        return Ok(config
            .test_resources_dir
            .clone()
            .unwrap_or_else(default_test_resources_dir));
    }

    let property = &config.quickstart_folder_property;
    let value = properties
        .property(property)
        .ok_or_else(|| LogScannerError::MissingProperty {
            property: property.clone(),
        })?;

    // 여러 폴더가 쉼표로 나열될 수 있으며 첫 항목을 사용
    let folder = value
        .split(',')
        .map(str::trim)
        .find(|s| !s.is_empty())
        .ok_or_else(|| LogScannerError::Config {
            field: "quickstart_folder_property".to_owned(),
            reason: format!("property '{property}' is blank"),
        })?;

    Ok(quickstart_log_dir(Path::new(folder)))
}

/// quickstart 폴더의 로그 디렉토리 경로를 반환합니다.
///
/// 항상 `<folder>/crx-quickstart/logs`입니다. 서버가 아직 기동 중이라
/// 디렉토리가 없어도 경로는 바뀌지 않으며, 파일은 대기 중에 나타날 수 있습니다.
pub fn quickstart_log_dir(folder: &Path) -> PathBuf {
    folder.join("crx-quickstart").join("logs")
}

/// 읽기 커서
///
/// 바이트 오프셋과 그 지점까지의 라인 수를 함께 추적합니다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    /// 다음 읽기 시작 위치 (바이트 오프셋)
    pub offset: u64,
    /// 오프셋 이전의 완전한 라인 수 (다음 라인의 0 기반 번호)
    pub line_index: usize,
}

impl Cursor {
    /// 라인 하나만큼 커서를 전진시킵니다.
    pub fn advance_past(&mut self, line: &SourceLine) {
        self.offset = line.next_offset;
        self.line_index = line.index + 1;
    }
}

/// 소스에서 읽은 완전한 라인
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    /// 파일 내 0 기반 라인 번호
    pub index: usize,
    /// 라인 텍스트 (줄바꿈 제외)
    pub text: String,
    /// 이 라인 바로 다음의 바이트 오프셋
    pub next_offset: u64,
}

/// 로그 파일 소스
#[derive(Debug, Clone)]
pub struct LogFileSource {
    /// 설정상의 파일 이름
    name: String,
    /// 실제 파일 경로
    path: PathBuf,
}

impl LogFileSource {
    /// 로그 루트 아래의 파일로 소스를 생성합니다.
    pub fn new(root: &Path, name: impl Into<String>) -> Self {
        let name = name.into();
        let path = root.join(&name);
        Self { name, path }
    }

    /// 설정과 속성으로 로그 루트를 결정하여 소스를 생성합니다.
    pub fn resolve(
        config: &RuleConfig,
        properties: &dyn PropertySource,
        name: &str,
    ) -> Result<Self, LogScannerError> {
        let root = resolve_log_root(config, properties)?;
        Ok(Self::new(&root, name))
    }

    /// 파일 이름을 반환합니다.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 파일 경로를 반환합니다.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 파일이 현재 존재하는지 확인합니다.
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// 커서 이후에 추가된 완전한 라인을 읽습니다.
    ///
    /// 줄바꿈으로 끝나지 않은 마지막 라인은 아직 쓰는 중일 수 있으므로 반환하지 않습니다.
    /// 파일이 없거나 일반 파일이 아니면(예: 같은 이름의 디렉토리) 빈 목록과 같은 커서를 반환합니다.
    /// 파일이 커서보다 짧아졌다면(잘림) 새 라인이 없는 것으로 처리합니다.
    pub fn read_from(&self, cursor: Cursor) -> Result<(Vec<SourceLine>, Cursor), LogScannerError> {
        if !self.exists() {
            return Ok((Vec::new(), cursor));
        }
        let mut file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok((Vec::new(), cursor)),
            Err(e) => {
                return Err(LogScannerError::Source {
                    path: self.path.display().to_string(),
                    reason: format!("failed to open: {e}"),
                });
            }
        };

        let len = file.metadata()?.len();
        if len < cursor.offset {
            tracing::warn!(
                path = %self.path.display(),
                len,
                offset = cursor.offset,
                "log file is shorter than the read cursor, ignoring"
            );
            return Ok((Vec::new(), cursor));
        }
        if len == cursor.offset {
            return Ok((Vec::new(), cursor));
        }

        file.seek(SeekFrom::Start(cursor.offset))
            .map_err(|e| LogScannerError::Source {
                path: self.path.display().to_string(),
                reason: format!("failed to seek to {}: {e}", cursor.offset),
            })?;

        let mut buf = Vec::new();
        file.read_to_end(&mut buf)?;

        let lines = split_complete_lines(&buf, cursor);
        let next = lines.last().map_or(cursor, |last| Cursor {
            offset: last.next_offset,
            line_index: last.index + 1,
        });
        Ok((lines, next))
    }
}

/// 버퍼에서 줄바꿈으로 끝나는 라인만 잘라냅니다.
fn split_complete_lines(buf: &[u8], start: Cursor) -> Vec<SourceLine> {
    let mut lines = Vec::new();
    let mut line_start = 0usize;
    let mut index = start.line_index;

    for (pos, byte) in buf.iter().enumerate() {
        if *byte != b'\n' {
            continue;
        }
        let mut raw = &buf[line_start..pos];
        if let Some(stripped) = raw.strip_suffix(b"\r") {
            raw = stripped;
        }
        lines.push(SourceLine {
            index,
            text: String::from_utf8_lossy(raw).into_owned(),
            next_offset: start.offset + (pos as u64) + 1,
        });
        index += 1;
        line_start = pos + 1;
    }

    lines
}
