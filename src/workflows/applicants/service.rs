use std::sync::Arc;

use chrono::NaiveDate;
use tracing::info;

use crate::store::{RecordStore, StoreError};

use super::compress::{CompressedSnapshot, CompressionError, Compressor};
use super::decompress::{DecompressionError, DecompressionReport, Decompressor};
use super::domain::{fields, tables, Applicant, ApplicantId, ShortlistedLead};
use super::enrichment::{AssessmentAttempt, EnrichmentOutcome, LlmEnricher};
use super::mapping;
use super::shortlist::{ShortlistConfig, ShortlistDecision, ShortlistEngine, ShortlistOutcome};

/// Facade sequencing compress -> shortlist -> enrich for one applicant.
/// Every stage reports a typed outcome; re-running the pipeline for the
/// same identifier is always safe (upserts and the score guard throughout).
pub struct ApplicantPipeline<S> {
    store: Arc<S>,
    compressor: Compressor<S>,
    decompressor: Decompressor<S>,
    engine: ShortlistEngine,
    enricher: LlmEnricher,
}

/// Whether the shortlist lead row was freshly created or refreshed in
/// place. Re-evaluation intentionally does not append duplicate leads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeadWrite {
    Created,
    Refreshed,
}

/// Shortlist stage result: the rule decision plus the lead write, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct ShortlistStage {
    pub outcome: ShortlistOutcome,
    pub lead: Option<LeadWrite>,
}

/// Aggregated per-stage outcomes for one pipeline pass.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineReport {
    pub applicant_id: ApplicantId,
    pub shortlist: ShortlistStage,
    pub enrichment: EnrichmentOutcome,
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Compression(#[from] CompressionError),
    #[error(transparent)]
    Decompression(#[from] DecompressionError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl<S> ApplicantPipeline<S>
where
    S: RecordStore,
{
    pub fn new(store: Arc<S>, enricher: LlmEnricher, config: ShortlistConfig) -> Self {
        Self {
            compressor: Compressor::new(store.clone()),
            decompressor: Decompressor::new(store.clone()),
            store,
            engine: ShortlistEngine::new(config),
            enricher,
        }
    }

    /// Compress one applicant's records into the snapshot field.
    pub fn compress(&self, applicant_id: &ApplicantId) -> Result<CompressedSnapshot, PipelineError> {
        Ok(self.compressor.compress(applicant_id)?)
    }

    /// Fan the stored snapshot back out into the normalized tables.
    pub fn decompress(
        &self,
        applicant_id: &ApplicantId,
    ) -> Result<DecompressionReport, PipelineError> {
        Ok(self.decompressor.decompress(applicant_id)?)
    }

    /// Full pass: compress, evaluate the shortlist, then enrich via the
    /// generation service. Terminal after one pass.
    pub fn process(
        &self,
        applicant_id: &ApplicantId,
        today: NaiveDate,
    ) -> Result<PipelineReport, PipelineError> {
        let snapshot = self.compressor.compress(applicant_id)?;
        let shortlist = self.evaluate_shortlist(&snapshot, today)?;
        let enrichment = self.enrich(&snapshot.applicant, &snapshot.serialized)?;

        Ok(PipelineReport {
            applicant_id: applicant_id.clone(),
            shortlist,
            enrichment,
        })
    }

    fn evaluate_shortlist(
        &self,
        snapshot: &CompressedSnapshot,
        today: NaiveDate,
    ) -> Result<ShortlistStage, PipelineError> {
        let outcome = self
            .engine
            .evaluate(&snapshot.applicant.applicant_id, &snapshot.profile, today);

        let lead = match &outcome.decision {
            ShortlistDecision::Accepted { reason } => {
                let write = self.upsert_lead(snapshot, reason)?;
                info!(applicant = %outcome.applicant_id, ?write, "applicant shortlisted");
                Some(write)
            }
            ShortlistDecision::Rejected { failed_rules } => {
                info!(
                    applicant = %outcome.applicant_id,
                    failed = failed_rules.len(),
                    "applicant did not meet shortlist criteria"
                );
                None
            }
        };

        Ok(ShortlistStage { outcome, lead })
    }

    fn upsert_lead(
        &self,
        snapshot: &CompressedSnapshot,
        reason: &str,
    ) -> Result<LeadWrite, PipelineError> {
        let lead = ShortlistedLead {
            applicant_record_id: snapshot.applicant.record_id.clone(),
            compressed_json: snapshot.serialized.clone(),
            score_reason: reason.to_string(),
        };
        let payload = mapping::lead_fields(&lead);

        let existing = self.store.find_first(
            tables::SHORTLISTED_LEADS,
            fields::APPLICANT_LINK,
            &snapshot.applicant.applicant_id.0,
        )?;

        match existing {
            Some(record) => {
                self.store
                    .update(tables::SHORTLISTED_LEADS, &record.id, payload)?;
                Ok(LeadWrite::Refreshed)
            }
            None => {
                self.store.create(tables::SHORTLISTED_LEADS, payload)?;
                Ok(LeadWrite::Created)
            }
        }
    }

    fn enrich(
        &self,
        applicant: &Applicant,
        serialized: &str,
    ) -> Result<EnrichmentOutcome, PipelineError> {
        // Idempotence guard: at most one enrichment call per applicant
        // across repeated runs.
        if applicant.llm_score.is_some() {
            info!(applicant = %applicant.applicant_id, "applicant already scored, skipping enrichment");
            return Ok(EnrichmentOutcome::SkippedExisting);
        }

        match self.enricher.request_assessment(serialized) {
            AssessmentAttempt::Abandoned { attempts } => {
                info!(
                    applicant = %applicant.applicant_id,
                    attempts,
                    "enrichment abandoned, applicant left un-enriched"
                );
                Ok(EnrichmentOutcome::Abandoned { attempts })
            }
            AssessmentAttempt::Completed(assessment) if assessment.is_empty() => {
                info!(applicant = %applicant.applicant_id, "completion carried no parseable fields");
                Ok(EnrichmentOutcome::EmptyCompletion)
            }
            AssessmentAttempt::Completed(assessment) => {
                self.store.update(
                    tables::APPLICANTS,
                    &applicant.record_id,
                    mapping::enrichment_fields(&assessment),
                )?;
                info!(applicant = %applicant.applicant_id, score = ?assessment.score, "applicant enriched");
                Ok(EnrichmentOutcome::Applied(assessment))
            }
        }
    }
}
