use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use crate::store::{FieldMap, RecordStore, StoreError};

use super::domain::{fields, tables, Applicant, ApplicantId, CompressedProfile};
use super::mapping;

/// Builds the denormalized snapshot for one applicant and persists it onto
/// the root record's `Compressed JSON` field.
pub struct Compressor<S> {
    store: Arc<S>,
}

/// Result of a compression pass: the resolved root entity, the typed
/// snapshot, and the exact serialized document written to the store.
#[derive(Debug, Clone)]
pub struct CompressedSnapshot {
    pub applicant: Applicant,
    pub profile: CompressedProfile,
    pub serialized: String,
}

#[derive(Debug, thiserror::Error)]
pub enum CompressionError {
    #[error("applicant '{0}' not found")]
    ApplicantNotFound(ApplicantId),
    #[error("failed to encode snapshot: {0}")]
    Encode(#[from] serde_json::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl<S> Compressor<S>
where
    S: RecordStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn compress(&self, applicant_id: &ApplicantId) -> Result<CompressedSnapshot, CompressionError> {
        let root = self
            .store
            .find_first(tables::APPLICANTS, fields::APPLICANT_ID, &applicant_id.0)?
            .ok_or_else(|| CompressionError::ApplicantNotFound(applicant_id.clone()))?;
        let applicant = mapping::applicant_from_record(&root);

        let personal = self
            .store
            .find_first(
                tables::PERSONAL_DETAILS,
                fields::APPLICANT_LINK,
                &applicant_id.0,
            )?
            .map(|record| mapping::personal_from_record(&record))
            .unwrap_or_default();

        let experience = self
            .store
            .find_all(
                tables::WORK_EXPERIENCE,
                fields::APPLICANT_LINK,
                &applicant_id.0,
            )?
            .iter()
            .map(mapping::experience_from_record)
            .collect();

        let salary = self
            .store
            .find_first(
                tables::SALARY_PREFERENCES,
                fields::APPLICANT_LINK,
                &applicant_id.0,
            )?
            .map(|record| mapping::salary_from_record(&record))
            .unwrap_or_default();

        let profile = CompressedProfile {
            personal,
            experience,
            salary,
        };
        let serialized = serde_json::to_string_pretty(&profile)?;

        let mut update = FieldMap::new();
        update.insert(
            fields::COMPRESSED_JSON.to_string(),
            Value::String(serialized.clone()),
        );
        self.store
            .update(tables::APPLICANTS, &applicant.record_id, update)?;

        info!(applicant = %applicant_id, entries = profile.experience.len(), "snapshot compressed");

        Ok(CompressedSnapshot {
            applicant,
            profile,
            serialized,
        })
    }
}
