//! Submission service: runs the three phases of a creation form

use super::addons::AddonPersister;
use super::draft::ProductDraft;
use super::journal::WriteJournal;
use super::policy::SubmissionPolicy;
use super::report::{Phase, SubmissionReport};
use super::resolver::CatalogResolver;
use super::variants::VariantPersister;
use super::PhaseOutcome;
use crate::backend::Backend;
use crate::error::CatalogResult;
use shared::models::tables;

#[derive(Clone)]
pub struct SubmissionService {
    backend: Backend,
    policy: SubmissionPolicy,
}

impl SubmissionService {
    pub fn new(backend: Backend, policy: SubmissionPolicy) -> Self {
        Self { backend, policy }
    }

    pub fn policy(&self) -> &SubmissionPolicy {
        &self.policy
    }

    /// Validate and persist a creation form
    ///
    /// Validation and resolver failures are returned as errors with nothing
    /// written. Once the product is resolved the result is always a report;
    /// failures of individual entities are recorded in it.
    pub async fn submit(&self, draft: ProductDraft) -> CatalogResult<SubmissionReport> {
        let draft = draft.validate()?;
        let resolution = CatalogResolver::new(self.backend.store())
            .resolve(&draft.path)
            .await?;

        let mut journal = WriteJournal::new();
        let mut report = SubmissionReport {
            product_id: Some(resolution.product_id),
            product_created: resolution.created,
            ..Default::default()
        };
        if resolution.created {
            journal.record_row(tables::PRODUCTS, resolution.product_id);
            report.success("Product created successfully");
        } else {
            report.info("Product already exists. Proceeding with variants and add-ons.");
        }

        let variants = VariantPersister::new(&self.backend, self.policy.variants)
            .persist(resolution.product_id, draft.variants, &mut report, &mut journal)
            .await;

        if variants == PhaseOutcome::Halted {
            report.halted = Some(Phase::Variants);
        }

        // A halted variant phase only stops the remaining variants
        if let Some(group) = draft.addon_group {
            let addons = AddonPersister::new(&self.backend, self.policy.addons)
                .persist(resolution.product_id, group, &mut report, &mut journal)
                .await;
            if addons == PhaseOutcome::Halted && report.halted.is_none() {
                report.halted = Some(Phase::Addons);
            }
        }

        if report.halted.is_some() && self.policy.rollback_on_abort {
            let writes = journal.len();
            let undo = journal.compensate(&self.backend).await;
            report.rolled_back = true;
            if undo.is_clean() {
                report.info(format!("Submission rolled back ({writes} writes undone)"));
            } else {
                report.error(format!(
                    "Rollback incomplete: {}",
                    undo.failures.join("; ")
                ));
            }
        }

        tracing::info!(
            product_id = resolution.product_id,
            variants = report.persisted_variants(),
            addons = report.persisted_addons(),
            halted = ?report.halted,
            rolled_back = report.rolled_back,
            "Catalog submission finished"
        );
        Ok(report)
    }
}
