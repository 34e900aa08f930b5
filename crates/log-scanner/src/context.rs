//! 테스트 컨텍스트 -- 중첩된 테스트 범위에서 검사 설정을 찾습니다.
//!
//! 테스트 메서드 -> 클래스 -> 스위트 순으로 부모를 따라 올라가며
//! 가장 가까운 설정을 사용합니다. 어디에도 설정이 없으면 규칙은 아무것도 하지 않습니다.
//!
//! ```
//! use std::sync::Arc;
//! use logcheck_scanner::{RuleConfig, TestContext};
//!
//! let suite = Arc::new(TestContext::new("suite").with_config(RuleConfig::default()));
//! let class = Arc::new(TestContext::new("PageTest").nested_in(suite));
//! let method = TestContext::new("creates_page").nested_in(class);
//!
//! assert!(method.resolve_config().is_some());
//! assert_eq!(method.path(), "suite::PageTest::creates_page");
//! ```

use std::sync::Arc;

use crate::config::RuleConfig;

/// 테스트 실행 범위
#[derive(Debug, Clone)]
pub struct TestContext {
    /// 범위 이름 (스위트, 클래스, 메서드)
    name: String,
    /// 이 범위에 직접 붙은 설정
    config: Option<RuleConfig>,
    /// 바깥 범위
    parent: Option<Arc<TestContext>>,
}

impl TestContext {
    /// 설정 없는 범위를 생성합니다.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            config: None,
            parent: None,
        }
    }

    /// 이 범위에 설정을 붙입니다.
    pub fn with_config(mut self, config: RuleConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// 바깥 범위를 지정합니다.
    pub fn nested_in(mut self, parent: Arc<TestContext>) -> Self {
        self.parent = Some(parent);
        self
    }

    /// 범위 이름을 반환합니다.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 바깥 범위를 반환합니다.
    pub fn parent(&self) -> Option<&TestContext> {
        self.parent.as_deref()
    }

    /// 이 범위부터 바깥으로 올라가며 가장 가까운 설정을 찾습니다.
    pub fn resolve_config(&self) -> Option<&RuleConfig> {
        let mut current = Some(self);
        while let Some(ctx) = current {
            if let Some(ref config) = ctx.config {
                return Some(config);
            }
            current = ctx.parent();
        }
        None
    }

    /// 가장 바깥 범위부터의 전체 경로를 반환합니다 (`suite::class::method`).
    pub fn path(&self) -> String {
        let mut names = Vec::new();
        let mut current = Some(self);
        while let Some(ctx) = current {
            names.push(ctx.name.as_str());
            current = ctx.parent();
        }
        names.reverse();
        names.join("::")
    }
}
