//! 알려진 이슈 필터 -- 사전 승인된 문제를 에러 목록에서 제외합니다.

/// 알려진 이슈 필터
///
/// 라인 텍스트에 알려진 이슈 문자열 중 하나라도 포함되면(대소문자 구분) 제외합니다.
#[derive(Debug, Clone, Default)]
pub struct KnownIssueFilter {
    issues: Vec<String>,
}

impl KnownIssueFilter {
    /// 새 필터를 생성합니다.
    pub fn new<I, S>(issues: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            issues: issues.into_iter().map(Into::into).collect(),
        }
    }

    /// 텍스트에 포함된 첫 번째 알려진 이슈를 반환합니다.
    pub fn matching_issue(&self, text: &str) -> Option<&str> {
        self.issues
            .iter()
            .find(|issue| text.contains(issue.as_str()))
            .map(String::as_str)
    }

    /// 텍스트가 알려진 이슈인지 확인합니다.
    pub fn is_known(&self, text: &str) -> bool {
        self.matching_issue(text).is_some()
    }

    /// 등록된 이슈 수를 반환합니다.
    pub fn len(&self) -> usize {
        self.issues.len()
    }

    /// 등록된 이슈가 없는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }
}
