//! Variant persister

use shared::backend::insert_as;
use shared::models::{Variant, VariantCreate, tables};

use super::draft::{Checked, ReadyVariant};
use super::journal::WriteJournal;
use super::keys;
use super::policy::OnFailure;
use super::report::{EntityOutcome, EntityReport, SubmissionReport};
use super::PhaseOutcome;
use crate::backend::Backend;
use crate::error::{CatalogError, CatalogResult};

struct PersistedVariant {
    id: i64,
    image_keys: Vec<String>,
    failed_images: Vec<usize>,
}

pub struct VariantPersister<'a> {
    backend: &'a Backend,
    on_failure: OnFailure,
}

impl<'a> VariantPersister<'a> {
    pub fn new(backend: &'a Backend, on_failure: OnFailure) -> Self {
        Self { backend, on_failure }
    }

    /// Persist variants in order under `product_id`
    ///
    /// Successful writes are appended to `journal`; a failed variant's own
    /// writes are compensated before the policy decides whether to continue.
    pub async fn persist(
        &self,
        product_id: i64,
        variants: Vec<Checked<ReadyVariant>>,
        report: &mut SubmissionReport,
        journal: &mut WriteJournal,
    ) -> PhaseOutcome {
        let mut outcome = PhaseOutcome::Completed;

        for (index, checked) in variants.into_iter().enumerate() {
            if outcome == PhaseOutcome::Halted {
                report.variants.push(EntityReport {
                    index,
                    title: checked.title(),
                    outcome: EntityOutcome::NotAttempted,
                });
                continue;
            }

            let variant = match checked {
                Checked::Ready(variant) => variant,
                Checked::Skipped { title, missing } => {
                    tracing::debug!(index, ?missing, "Variant skipped");
                    report.info(format!(
                        "Variant {} skipped: missing {}",
                        index + 1,
                        missing.join(", ")
                    ));
                    report.variants.push(EntityReport {
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
            match self.persist_one(product_id, &variant, &mut own).await {
                Ok(persisted) => {
                    journal.absorb(own);
                    for failed in &persisted.failed_images {
                        report.error(format!(
                            "Error uploading additional image {} for variant {}",
                            failed + 1,
                            variant.title
                        ));
                    }
                    report.success(format!("Variant {} added successfully", variant.title));
                    report.variants.push(EntityReport {
                        index,
                        title: Some(variant.title),
                        outcome: EntityOutcome::Persisted {
                            id: persisted.id,
                            image_keys: persisted.image_keys,
                            failed_images: persisted.failed_images,
                        },
                    });
                }
                Err(e) => {
                    tracing::error!(index, title = %variant.title, error = %e, "Variant failed");
                    let undo = own.compensate(self.backend).await;
                    if !undo.is_clean() {
                        report.error(format!(
                            "Could not fully undo variant {}: {}",
                            variant.title,
                            undo.failures.join("; ")
                        ));
                    }
                    report.error(format!("Error adding variant {}: {e}", variant.title));
                    report.variants.push(EntityReport {
                        index,
                        title: Some(variant.title),
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

    /// Main image, additional images (joined set), then the row
    async fn persist_one(
        &self,
        product_id: i64,
        variant: &ReadyVariant,
        journal: &mut WriteJournal,
    ) -> CatalogResult<PersistedVariant> {
        let main_key = keys::variant_main(&variant.title, product_id);
        let main = self
            .backend
            .upload(&main_key, &variant.main_image, false)
            .await
            .map_err(|source| CatalogError::Upload {
                key: main_key.clone(),
                source,
            })?;
        journal.record_blob(main.clone());

        let items: Vec<(String, &_)> = variant
            .additional_images
            .iter()
            .enumerate()
            .map(|(i, image)| (keys::variant_additional(&variant.title, i, product_id), image))
            .collect();
        let batch = self.backend.upload_all(&items, false).await;
        for key in &batch.keys {
            journal.record_blob(key.clone());
        }

        let row: Variant = insert_as(
            self.backend.store(),
            tables::PRODUCT_VARIANTS,
            &VariantCreate {
                product_id,
                title: variant.title.clone(),
                price: variant.price,
                details: variant.details.clone(),
                image: main.clone(),
                additional_images: batch.keys.clone(),
            },
        )
        .await?;
        journal.record_row(tables::PRODUCT_VARIANTS, row.id);
        tracing::info!(variant_id = row.id, product_id, title = %variant.title, "Variant persisted");

        let mut image_keys = vec![main];
        image_keys.extend(batch.keys.iter().cloned());
        Ok(PersistedVariant {
            id: row.id,
            image_keys,
            failed_images: batch.failed_indices(),
        })
    }
}
