//! Add-on persister

use shared::backend::insert_as;
use shared::models::{AddonCategory, AddonCategoryCreate, AddonVariant, AddonVariantCreate, tables};

use super::PhaseOutcome;
use super::draft::{Checked, ReadyAddon, ValidatedAddonGroup};
use super::journal::WriteJournal;
use super::keys;
use super::policy::OnFailure;
use super::report::{EntityOutcome, EntityReport, SubmissionReport};
use crate::backend::Backend;
use crate::error::{CatalogError, CatalogResult};

pub struct AddonPersister<'a> {
    backend: &'a Backend,
    on_failure: OnFailure,
}

impl<'a> AddonPersister<'a> {
    pub fn new(backend: &'a Backend, on_failure: OnFailure) -> Self {
        Self { backend, on_failure }
    }

    /// Insert the add-on category for `product_id`, then each add-on variant
    ///
    /// A failed category insert aborts the phase regardless of policy, since
    /// no add-on variant has an owner to reference.
    pub async fn persist(
        &self,
        product_id: i64,
        group: ValidatedAddonGroup,
        report: &mut SubmissionReport,
        journal: &mut WriteJournal,
    ) -> PhaseOutcome {
        let category: CatalogResult<AddonCategory> = insert_as(
            self.backend.store(),
            tables::ADDONS,
            &AddonCategoryCreate {
                title: group.title.clone(),
                product_id,
            },
        )
        .await
        .map_err(CatalogError::from);

        let addon_id = match category {
            Ok(category) => {
                journal.record_row(tables::ADDONS, category.id);
                report.addon_category_id = Some(category.id);
                report.success(format!("Add-on category {} created", group.title));
                tracing::info!(addon_id = category.id, product_id, "Add-on category created");
                category.id
            }
            Err(e) => {
                tracing::error!(product_id, title = %group.title, error = %e, "Add-on category insert failed");
                report.error(format!("Error creating add-on category {}: {e}", group.title));
                for (index, checked) in group.addons.into_iter().enumerate() {
                    report.addons.push(EntityReport {
                        index,
                        title: checked.title(),
                        outcome: EntityOutcome::NotAttempted,
                    });
                }
                return PhaseOutcome::Halted;
            }
        };

        let mut outcome = PhaseOutcome::Completed;
        for (index, checked) in group.addons.into_iter().enumerate() {
            if outcome == PhaseOutcome::Halted {
                report.addons.push(EntityReport {
                    index,
                    title: checked.title(),
                    outcome: EntityOutcome::NotAttempted,
                });
                continue;
            }

            let addon = match checked {
                Checked::Ready(addon) => addon,
                Checked::Skipped { title, missing } => {
                    report.info(format!(
                        "Add-on {} skipped: missing {}",
                        index + 1,
                        missing.join(", ")
                    ));
                    report.addons.push(EntityReport {
                        index,
                        title,
                        outcome: EntityOutcome::Skipped {
                            missing: missing.into_iter().map(String::from).collect(),
                        },
                    });
                    continue;
                }
            };

            let mut own = WriteJournal::new();
            match self.persist_one(addon_id, &addon, &mut own).await {
                Ok(row) => {
                    journal.absorb(own);
                    report.success(format!("Add-on {} added successfully", addon.title));
                    report.addons.push(EntityReport {
                        index,
                        title: Some(addon.title),
                        outcome: EntityOutcome::Persisted {
                            id: row.id,
                            image_keys: row.image.into_iter().collect(),
                            failed_images: Vec::new(),
                        },
                    });
                }
                Err(e) => {
                    tracing::error!(index, title = %addon.title, error = %e, "Add-on failed");
                    let undo = own.compensate(self.backend).await;
                    if !undo.is_clean() {
                        report.error(format!(
                            "Could not fully undo add-on {}: {}",
                            addon.title,
                            undo.failures.join("; ")
                        ));
                    }
                    report.error(format!("Error adding add-on {}: {e}", addon.title));
                    report.addons.push(EntityReport {
                        index,
                        title: Some(addon.title),
                        outcome: EntityOutcome::Failed {
                            error: e.to_string(),
                        },
                    });
                    if self.on_failure == OnFailure::Halt {
                        outcome = PhaseOutcome::Halted;
                    }
                }
            }
        }

        outcome
    }

    async fn persist_one(
        &self,
        addon_id: i64,
        addon: &ReadyAddon,
        journal: &mut WriteJournal,
    ) -> CatalogResult<AddonVariant> {
        let key = keys::addon_variant(&addon.title, addon_id);
        let stored = self
            .backend
            .upload(&key, &addon.image, false)
            .await
            .map_err(|source| CatalogError::Upload {
                key: key.clone(),
                source,
            })?;
        journal.record_blob(stored.clone());

        let row: AddonVariant = insert_as(
            self.backend.store(),
            tables::ADDON_VARIANTS,
            &AddonVariantCreate {
                addon_id,
                title: addon.title.clone(),
                price: addon.price,
                image: stored,
            },
        )
        .await?;
        journal.record_row(tables::ADDON_VARIANTS, row.id);
        tracing::info!(addon_variant_id = row.id, addon_id, "Add-on variant persisted");
        Ok(row)
    }
}
