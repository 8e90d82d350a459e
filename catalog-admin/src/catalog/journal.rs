//! Compensating-action journal
//!
//! Every successful write of a submission is recorded. Compensation replays
//! the journal backwards, deleting rows and removing uploaded images.

use shared::Filter;

use crate::backend::Backend;

/// One undoable write
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteAction {
    Row { table: &'static str, id: i64 },
    Blob { key: String },
}

/// Result of replaying a journal
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Compensation {
    pub undone: usize,
    pub failures: Vec<String>,
}

impl Compensation {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct WriteJournal {
    entries: Vec<WriteAction>,
}

impl WriteJournal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_row(&mut self, table: &'static str, id: i64) {
        self.entries.push(WriteAction::Row { table, id });
    }

    pub fn record_blob(&mut self, key: impl Into<String>) {
        self.entries.push(WriteAction::Blob { key: key.into() });
    }

    /// Move another journal's entries to the end of this one
    pub fn absorb(&mut self, other: WriteJournal) {
        self.entries.extend(other.entries);
    }

    pub fn entries(&self) -> &[WriteAction] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Undo every recorded write, newest first
    ///
    /// Best effort: a failed undo is logged and reported, and the replay
    /// continues with the remaining entries.
    pub async fn compensate(self, backend: &Backend) -> Compensation {
        let mut result = Compensation::default();

        for action in self.entries.into_iter().rev() {
            let outcome = match &action {
                WriteAction::Row { table, id } => {
                    backend.store().delete(table, &[Filter::id(*id)]).await
                }
                WriteAction::Blob { key } => backend.remove_images(std::slice::from_ref(key)).await,
            };

            match outcome {
                Ok(()) => {
                    tracing::debug!(?action, "Write compensated");
                    result.undone += 1;
                }
                Err(e) => {
                    tracing::error!(?action, error = %e, "Compensation failed");
                    result.failures.push(format!("{action:?}: {e}"));
                }
            }
        }

        result
    }
}
