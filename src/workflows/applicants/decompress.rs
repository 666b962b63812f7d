use std::sync::Arc;

use tracing::info;

use crate::store::{RecordStore, ReplaceError, StoreError};

use super::domain::{fields, tables, ApplicantId, CompressedProfile};
use super::mapping;

/// Fans a previously compressed snapshot back out into the normalized
/// tables. The snapshot is treated as the new authoritative content: the
/// one-to-one sections upsert, the experience list is replaced wholesale.
pub struct Decompressor<S> {
    store: Arc<S>,
}

/// Per-section outcome so callers can assert on what actually happened
/// instead of parsing log output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionOutcome {
    /// The section was empty in the snapshot; nothing was written.
    SkippedEmpty,
    Created,
    Updated,
    Replaced { deleted: usize, created: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecompressionReport {
    pub applicant_id: ApplicantId,
    pub personal: SectionOutcome,
    pub experience: SectionOutcome,
    pub salary: SectionOutcome,
}

#[derive(Debug, thiserror::Error)]
pub enum DecompressionError {
    #[error("applicant '{0}' not found")]
    ApplicantNotFound(ApplicantId),
    #[error("applicant '{0}' has no compressed snapshot")]
    MissingSnapshot(ApplicantId),
    #[error("compressed snapshot for applicant '{applicant_id}' is not valid JSON: {source}")]
    MalformedSnapshot {
        applicant_id: ApplicantId,
        source: serde_json::Error,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Replace(#[from] ReplaceError),
}

impl<S> Decompressor<S>
where
    S: RecordStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn decompress(
        &self,
        applicant_id: &ApplicantId,
    ) -> Result<DecompressionReport, DecompressionError> {
        let root = self
            .store
            .find_first(tables::APPLICANTS, fields::APPLICANT_ID, &applicant_id.0)?
            .ok_or_else(|| DecompressionError::ApplicantNotFound(applicant_id.clone()))?;
        let applicant = mapping::applicant_from_record(&root);

        let serialized = applicant
            .compressed_json
            .ok_or_else(|| DecompressionError::MissingSnapshot(applicant_id.clone()))?;
        let profile: CompressedProfile = serde_json::from_str(&serialized).map_err(|source| {
            DecompressionError::MalformedSnapshot {
                applicant_id: applicant_id.clone(),
                source,
            }
        })?;

        // Root resolved; the three sections are independent of each other.
        let personal = self.upsert_personal(applicant_id, &applicant.record_id, &profile)?;
        let experience = self.replace_experience(applicant_id, &applicant.record_id, &profile)?;
        let salary = self.upsert_salary(applicant_id, &applicant.record_id, &profile)?;

        info!(applicant = %applicant_id, ?personal, ?experience, ?salary, "snapshot decompressed");

        Ok(DecompressionReport {
            applicant_id: applicant_id.clone(),
            personal,
            experience,
            salary,
        })
    }

    fn upsert_personal(
        &self,
        applicant_id: &ApplicantId,
        root_record_id: &str,
        profile: &CompressedProfile,
    ) -> Result<SectionOutcome, DecompressionError> {
        if profile.personal.is_empty() {
            return Ok(SectionOutcome::SkippedEmpty);
        }

        let payload = mapping::personal_fields(&profile.personal, root_record_id);
        let existing = self.store.find_first(
            tables::PERSONAL_DETAILS,
            fields::APPLICANT_LINK,
            &applicant_id.0,
        )?;

        match existing {
            Some(record) => {
                self.store
                    .update(tables::PERSONAL_DETAILS, &record.id, payload)?;
                Ok(SectionOutcome::Updated)
            }
            None => {
                self.store.create(tables::PERSONAL_DETAILS, payload)?;
                Ok(SectionOutcome::Created)
            }
        }
    }

    fn replace_experience(
        &self,
        applicant_id: &ApplicantId,
        root_record_id: &str,
        profile: &CompressedProfile,
    ) -> Result<SectionOutcome, DecompressionError> {
        if profile.experience.is_empty() {
            return Ok(SectionOutcome::SkippedEmpty);
        }

        let existing = self
            .store
            .find_all(
                tables::WORK_EXPERIENCE,
                fields::APPLICANT_LINK,
                &applicant_id.0,
            )?
            .into_iter()
            .map(|record| record.id)
            .collect();

        let rows = profile
            .experience
            .iter()
            .map(|entry| mapping::experience_fields(entry, root_record_id))
            .collect();

        let report = self
            .store
            .replace_children(tables::WORK_EXPERIENCE, existing, rows)?;

        Ok(SectionOutcome::Replaced {
            deleted: report.deleted,
            created: report.created,
        })
    }

    fn upsert_salary(
        &self,
        applicant_id: &ApplicantId,
        root_record_id: &str,
        profile: &CompressedProfile,
    ) -> Result<SectionOutcome, DecompressionError> {
        if profile.salary.is_empty() {
            return Ok(SectionOutcome::SkippedEmpty);
        }

        let payload = mapping::salary_fields(&profile.salary, root_record_id);
        let existing = self.store.find_first(
            tables::SALARY_PREFERENCES,
            fields::APPLICANT_LINK,
            &applicant_id.0,
        )?;

        match existing {
            Some(record) => {
                self.store
                    .update(tables::SALARY_PREFERENCES, &record.id, payload)?;
                Ok(SectionOutcome::Updated)
            }
            None => {
                self.store.create(tables::SALARY_PREFERENCES, payload)?;
                Ok(SectionOutcome::Created)
            }
        }
    }
}
