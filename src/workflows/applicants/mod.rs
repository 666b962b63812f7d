//! Applicant snapshot synchronization and enrichment workflow.
//!
//! One applicant at a time: the compressor folds the normalized tables into
//! a single JSON snapshot on the root record, the decompressor fans a
//! snapshot back out, and the pipeline runs shortlist evaluation plus LLM
//! scoring over a freshly compressed snapshot.

pub(crate) mod compress;
pub(crate) mod decompress;
pub mod domain;
pub mod enrichment;
pub(crate) mod mapping;
pub mod shortlist;
pub mod service;

#[cfg(test)]
mod tests;

pub use compress::{CompressedSnapshot, CompressionError, Compressor};
pub use decompress::{DecompressionError, DecompressionReport, Decompressor, SectionOutcome};
pub use domain::{
    fields, tables, Applicant, ApplicantId, CompressedProfile, PersonalDetails, SalaryPreferences,
    ShortlistedLead, WorkExperience,
};
pub use enrichment::{EnrichmentOutcome, LlmAssessment, LlmEnricher};
pub use service::{ApplicantPipeline, LeadWrite, PipelineError, PipelineReport, ShortlistStage};
pub use shortlist::{
    RuleFailure, ShortlistConfig, ShortlistDecision, ShortlistEngine, ShortlistOutcome,
};
