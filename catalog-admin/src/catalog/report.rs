//! Submission report
//!
//! Per-entity outcomes plus the ordered notifications shown to the operator.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Variants,
    Addons,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EntityOutcome {
    /// Row inserted; `image_keys` lists every stored image (main first)
    Persisted {
        id: i64,
        image_keys: Vec<String>,
        failed_images: Vec<usize>,
    },
    /// Incomplete entry, nothing written
    Skipped { missing: Vec<String> },
    /// A sub-step failed and the entity's own writes were undone
    Failed { error: String },
    /// Not reached because its phase halted first
    NotAttempted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityReport {
    pub index: usize,
    pub title: Option<String>,
    #[serde(flatten)]
    pub outcome: EntityOutcome,
}

impl EntityReport {
    pub fn is_persisted(&self) -> bool {
        matches!(self.outcome, EntityOutcome::Persisted { .. })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SubmissionReport {
    pub product_id: Option<i64>,
    pub product_created: bool,
    pub variants: Vec<EntityReport>,
    pub addon_category_id: Option<i64>,
    pub addons: Vec<EntityReport>,
    /// First phase that halted, if any
    pub halted: Option<Phase>,
    pub rolled_back: bool,
    pub notices: Vec<Notice>,
}

impl SubmissionReport {
    fn notify(&mut self, level: NoticeLevel, message: String) {
        self.notices.push(Notice { level, message });
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.notify(NoticeLevel::Success, message.into());
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.notify(NoticeLevel::Info, message.into());
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.notify(NoticeLevel::Error, message.into());
    }

    pub fn persisted_variants(&self) -> usize {
        self.variants.iter().filter(|r| r.is_persisted()).count()
    }

    pub fn persisted_addons(&self) -> usize {
        self.addons.iter().filter(|r| r.is_persisted()).count()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Notice> {
        self.notices.iter().filter(|n| n.level == NoticeLevel::Error)
    }
}
