//! Catalog write orchestration
//!
//! One submission of the creation form runs three phases in fixed order:
//!
//! 1. [`CatalogResolver`]: find or create the product for a category path
//! 2. [`VariantPersister`]: upload images and insert one row per variant
//! 3. [`AddonPersister`]: insert the add-on category, then its variants
//!
//! Every entity is written all-or-nothing: its own earlier writes are undone
//! through a [`WriteJournal`] when a later sub-step fails. Whether the rest of
//! a phase continues is decided by [`SubmissionPolicy`].

pub mod addons;
pub mod draft;
pub mod journal;
pub mod keys;
pub mod policy;
pub mod report;
pub mod resolver;
pub mod submission;
pub mod variants;

pub use addons::AddonPersister;
pub use draft::{
    AddonDraft, AddonGroupDraft, CategoryPath, Checked, ProductDraft, ReadyAddon, ReadyVariant,
    ValidatedAddonGroup, ValidatedDraft, VariantDraft,
};
pub use journal::{Compensation, WriteAction, WriteJournal};
pub use policy::{OnFailure, SubmissionPolicy};
pub use report::{EntityOutcome, EntityReport, Notice, NoticeLevel, Phase, SubmissionReport};
pub use resolver::{CatalogResolver, Resolution};
pub use submission::SubmissionService;
pub use variants::VariantPersister;

/// How a phase ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseOutcome {
    Completed,
    Halted,
}
