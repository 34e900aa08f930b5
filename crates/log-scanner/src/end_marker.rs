//! 종료 마커 파서 -- `파일명;마커` 설정 문자열을 파일별 마커로 해석합니다.
//!
//! 첫 번째 세미콜론에서만 분리하므로 마커 텍스트 자체에는 세미콜론이 들어갈 수 있습니다.
//! 구분자가 없거나 마커 텍스트가 비어 있으면 설정 에러입니다.
//! 쉼표 등 다른 구분자는 받아들이지 않습니다.

use std::collections::HashMap;

use crate::error::LogScannerError;

/// 종료 마커 구분자
pub const SEPARATOR: char = ';';

/// 파일명 -> 종료 마커 매핑
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EndMarkers {
    markers: HashMap<String, String>,
}

impl EndMarkers {
    /// 설정 문자열 목록을 파싱합니다.
    ///
    /// 항목 하나라도 형식이 잘못되면 전체가 거부됩니다.
    /// 같은 파일이 여러 번 나오면 마지막 항목이 적용됩니다.
    pub fn parse<S: AsRef<str>>(entries: &[S]) -> Result<Self, LogScannerError> {
        let mut markers = HashMap::with_capacity(entries.len());
        for entry in entries {
            let (file, marker) = parse_entry(entry.as_ref())?;
            if let Some(previous) = markers.insert(file.to_owned(), marker.to_owned()) {
                tracing::warn!(
                    file,
                    previous = previous.as_str(),
                    "duplicate end marker entry, last one wins"
                );
            }
        }
        Ok(Self { markers })
    }

    /// 파일에 등록된 종료 마커를 반환합니다.
    ///
    /// 등록되지 않은 파일이면 `None`을 반환합니다 (파싱 실패와 구분됨).
    pub fn get(&self, file_name: &str) -> Option<&str> {
        self.markers.get(file_name).map(String::as_str)
    }

    /// 등록된 마커 수를 반환합니다.
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    /// 등록된 마커가 없는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}

/// 단일 항목을 `(파일명, 마커)`로 분리합니다.
pub fn parse_entry(entry: &str) -> Result<(&str, &str), LogScannerError> {
    let Some((file, marker)) = entry.split_once(SEPARATOR) else {
        return Err(LogScannerError::MalformedEndMarker {
            entry: entry.to_owned(),
            reason: format!("missing '{SEPARATOR}' separator between file name and marker"),
        });
    };

    if file.is_empty() {
        return Err(LogScannerError::MalformedEndMarker {
            entry: entry.to_owned(),
            reason: "empty file name".to_owned(),
        });
    }

    if marker.is_empty() {
        return Err(LogScannerError::MalformedEndMarker {
            entry: entry.to_owned(),
            reason: "empty marker text".to_owned(),
        });
    }

    Ok((file, marker))
}
