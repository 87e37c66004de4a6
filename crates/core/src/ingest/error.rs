use crate::ingest::source::SourceKind;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionStage {
    Transport,
    Validation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceRejection {
    pub kind: SourceKind,
    pub locator: String,
    pub stage: RejectionStage,
    pub detail: String,
}

impl SourceRejection {
    pub fn transport(kind: SourceKind, locator: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            kind,
            locator: locator.into(),
            stage: RejectionStage::Transport,
            detail: detail.into(),
        }
    }

    pub fn validation(kind: SourceKind, locator: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            kind,
            locator: locator.into(),
            stage: RejectionStage::Validation,
            detail: detail.into(),
        }
    }
}

impl fmt::Display for SourceRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "source rejected (tier={}, stage={:?}, locator={}): {}",
            self.kind, self.stage, self.locator, self.detail
        )
    }
}

impl std::error::Error for SourceRejection {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_tier_stage_and_locator() {
        let r = SourceRejection::validation(SourceKind::Local, "../data", "news.json: missing news");
        assert_eq!(
            r.to_string(),
            "source rejected (tier=local, stage=Validation, locator=../data): news.json: missing news"
        );
    }
}
