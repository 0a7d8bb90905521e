use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::constants::{PROGRESS_EVERY, UNKNOWN};
use crate::error::Result;
use crate::observability::metrics;
use crate::pipeline::export::ExtractBundle;
use crate::pipeline::processing::normalize::normalize_text;
use crate::storage::{PractitionerRow, QualificationLink, ReferenceKind, Storage};
use crate::types::PractitionerRecord;

/// What one import run wrote.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub statuses: usize,
    pub specialities: usize,
    pub sub_specialities: usize,
    pub institutions: usize,
    pub degrees: usize,
    pub addresses: usize,
    pub practitioners: usize,
    pub skipped_practitioners: usize,
    pub qualification_links: usize,
    /// References that resolved to the UNKNOWN entity of their kind
    pub unknown_fallbacks: usize,
}

/// Ids of the UNKNOWN placeholder for every reference kind.
struct UnknownIds {
    references: HashMap<ReferenceKind, Uuid>,
    sub_speciality: Uuid,
}

impl UnknownIds {
    fn get(&self, kind: ReferenceKind) -> Uuid {
        self.references.get(&kind).copied().unwrap_or_else(Uuid::nil)
    }
}

/// Loads an extract bundle into a `Storage`, reference tables first so practitioner
/// references can be resolved.
pub struct Importer {
    storage: Arc<dyn Storage>,
}

impl std::fmt::Debug for Importer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Importer").finish_non_exhaustive()
    }
}

impl Importer {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    #[instrument(skip(self, bundle), fields(practitioners = bundle.practitioners.len()))]
    pub async fn import(&self, bundle: &ExtractBundle) -> Result<ImportSummary> {
        let mut summary = ImportSummary::default();
        let unknown = self.ensure_unknowns().await?;
        let sets = &bundle.reference_sets;

        summary.statuses = self.import_names(ReferenceKind::Status, &sets.statuses).await?;
        summary.specialities = self
            .import_names(ReferenceKind::Speciality, &sets.specialities)
            .await?;
        summary.sub_specialities = self.import_sub_specialities(&sets.sub_specialities).await?;
        summary.institutions = self
            .import_names(ReferenceKind::Institution, &sets.institutions)
            .await?;
        summary.degrees = self.import_names(ReferenceKind::Degree, &sets.degrees).await?;
        summary.addresses = self.import_names(ReferenceKind::Address, &sets.addresses).await?;

        info!("Importing {} practitioners...", bundle.practitioners.len());
        for (index, record) in bundle.practitioners.iter().enumerate() {
            self.import_practitioner(record, &unknown, &mut summary).await?;
            if (index + 1) % PROGRESS_EVERY == 0 {
                info!("Imported {} practitioners...", index + 1);
            }
        }

        info!(
            practitioners = summary.practitioners,
            skipped = summary.skipped_practitioners,
            links = summary.qualification_links,
            unknown_fallbacks = summary.unknown_fallbacks,
            "Import complete"
        );
        Ok(summary)
    }

    async fn ensure_unknowns(&self) -> Result<UnknownIds> {
        let mut references = HashMap::new();
        for kind in ReferenceKind::ALL {
            references.insert(kind, self.storage.upsert_reference(kind, UNKNOWN).await?);
        }
        let sub_speciality = self
            .storage
            .upsert_sub_speciality(references[&ReferenceKind::Speciality], UNKNOWN)
            .await?;
        Ok(UnknownIds {
            references,
            sub_speciality,
        })
    }

    async fn import_names(&self, kind: ReferenceKind, names: &[String]) -> Result<usize> {
        let mut count = 0;
        for name in names {
            let name = normalize_text(name);
            if name.is_empty() {
                continue;
            }
            self.storage.upsert_reference(kind, &name).await?;
            count += 1;
        }
        info!("Imported {} {} records", count, kind.as_str());
        Ok(count)
    }

    async fn import_sub_specialities(
        &self,
        sub_specialities: &std::collections::BTreeMap<String, Vec<String>>,
    ) -> Result<usize> {
        let mut count = 0;
        for (parent, names) in sub_specialities {
            let parent = match normalize_text(parent) {
                p if p.is_empty() => UNKNOWN.to_string(),
                p => p,
            };
            let speciality_id = self
                .storage
                .upsert_reference(ReferenceKind::Speciality, &parent)
                .await?;

            for name in names {
                let name = normalize_text(name);
                if name.is_empty() {
                    continue;
                }
                self.storage.upsert_sub_speciality(speciality_id, &name).await?;
                count += 1;
            }
        }
        info!("Imported {} subspecialities", count);
        Ok(count)
    }

    async fn import_practitioner(
        &self,
        record: &PractitionerRecord,
        unknown: &UnknownIds,
        summary: &mut ImportSummary,
    ) -> Result<()> {
        let registration_number = record.registration_number.trim();
        if registration_number.is_empty() {
            warn!("Skipping practitioner without registration number: {}", record.full_name.trim());
            summary.skipped_practitioners += 1;
            metrics::import::practitioner_skipped();
            return Ok(());
        }

        let speciality_id = self
            .resolve(ReferenceKind::Speciality, &record.speciality, unknown, summary)
            .await?;
        let sub_speciality_id = self
            .resolve_sub_speciality(speciality_id, &record.sub_speciality, unknown, summary)
            .await?;

        let row = PractitionerRow {
            registration_number: registration_number.to_string(),
            full_name: record.full_name.trim().to_string(),
            discipline: record.discipline.trim().to_string(),
            address_id: self
                .resolve(ReferenceKind::Address, &record.address, unknown, summary)
                .await?,
            status_id: self
                .resolve(ReferenceKind::Status, &record.status, unknown, summary)
                .await?,
            speciality_id,
            sub_speciality_id,
        };
        let practitioner_id = self.storage.upsert_practitioner(&row).await?;
        summary.practitioners += 1;
        metrics::import::practitioner_imported();

        for qualification in &record.qualifications {
            let link = QualificationLink {
                practitioner_id,
                degree_id: self
                    .resolve(ReferenceKind::Degree, &qualification.degree, unknown, summary)
                    .await?,
                institution_id: self
                    .resolve(ReferenceKind::Institution, &qualification.institution, unknown, summary)
                    .await?,
                speciality_name: qualification.speciality.clone(),
                year: qualification.year,
            };
            if self.storage.link_qualification(&link).await? {
                summary.qualification_links += 1;
                metrics::import::qualification_linked();
            }
        }
        Ok(())
    }

    /// Id of the entity named `name`, or the UNKNOWN entity of that kind.
    async fn resolve(
        &self,
        kind: ReferenceKind,
        name: &str,
        unknown: &UnknownIds,
        summary: &mut ImportSummary,
    ) -> Result<Uuid> {
        let name = normalize_text(name);
        if !name.is_empty() {
            if let Some(id) = self.storage.find_reference(kind, &name).await? {
                return Ok(id);
            }
        }
        summary.unknown_fallbacks += 1;
        metrics::import::unknown_fallback(kind.as_str());
        Ok(unknown.get(kind))
    }

    async fn resolve_sub_speciality(
        &self,
        speciality_id: Uuid,
        name: &str,
        unknown: &UnknownIds,
        summary: &mut ImportSummary,
    ) -> Result<Uuid> {
        let name = normalize_text(name);
        if !name.is_empty() {
            if let Some(id) = self.storage.find_sub_speciality(speciality_id, &name).await? {
                return Ok(id);
            }
        }
        summary.unknown_fallbacks += 1;
        metrics::import::unknown_fallback("sub_speciality");
        Ok(unknown.sub_speciality)
    }
}
