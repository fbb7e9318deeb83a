//! User-visible progress of the balance → route → execute flow

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    #[default]
    Idle,
    Scanning,
    Finding,
    Found,
    Executing,
    Error,
    Success,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct FlowStatus {
    pub kind: StatusKind,
    pub detail: String,
}

impl FlowStatus {
    pub fn new(kind: StatusKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }

    pub fn idle() -> Self {
        Self::default()
    }

    pub fn scanning(detail: impl Into<String>) -> Self {
        Self::new(StatusKind::Scanning, detail)
    }

    pub fn finding(detail: impl Into<String>) -> Self {
        Self::new(StatusKind::Finding, detail)
    }

    pub fn found(detail: impl Into<String>) -> Self {
        Self::new(StatusKind::Found, detail)
    }

    pub fn executing(detail: impl Into<String>) -> Self {
        Self::new(StatusKind::Executing, detail)
    }

    pub fn error(detail: impl Into<String>) -> Self {
        Self::new(StatusKind::Error, detail)
    }

    pub fn success(detail: impl Into<String>) -> Self {
        Self::new(StatusKind::Success, detail)
    }

    /// An operation is running
    pub fn is_in_progress(&self) -> bool {
        matches!(
            self.kind,
            StatusKind::Scanning | StatusKind::Finding | StatusKind::Executing
        )
    }
}

impl std::fmt::Display for FlowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.detail.is_empty() {
            write!(f, "{:?}", self.kind)
        } else {
            write!(f, "{:?}: {}", self.kind, self.detail)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serialization() {
        let status = FlowStatus::executing("Step 1/2");
        let value = serde_json::to_value(&status).expect("serialize");
        assert_eq!(value["kind"], "executing");
        assert_eq!(value["detail"], "Step 1/2");
        assert!(status.is_in_progress());
        assert!(!FlowStatus::success("done").is_in_progress());
        assert_eq!(FlowStatus::idle().kind, StatusKind::Idle);
    }
}
