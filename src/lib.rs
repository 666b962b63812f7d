//! Applicant record synchronization and enrichment.
//!
//! The crate mirrors one applicant's normalized records (personal details,
//! work experience, salary preferences) into a single denormalized JSON
//! snapshot, then runs two enrichment stages over that snapshot: a
//! rule-based shortlist evaluation and an LLM scoring pass. The normalized
//! records stay authoritative; the snapshot is a derived projection.

pub mod config;
pub mod error;
pub mod store;
pub mod telemetry;
pub mod workflows;
