//! Record-store abstraction consumed by the applicant workflows.
//!
//! The store holds flat, string-keyed field maps grouped into named tables
//! and is queried with simple equality predicates. The trait keeps the
//! workflow code exercisable against an in-memory double; `airtable`
//! provides the production implementation.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub mod airtable;

pub use airtable::AirtableClient;

/// Raw field map as the store sees it, keyed by native field names.
pub type FieldMap = Map<String, Value>;

/// One stored row: the store-assigned record id plus its fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    #[serde(default)]
    pub fields: FieldMap,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record store request failed: {0}")]
    Backend(String),
    #[error("record store returned an unexpected payload: {0}")]
    Payload(String),
    #[error("record store runtime unavailable: {0}")]
    Runtime(String),
}

/// Outcome of a two-phase child-collection replace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplaceReport {
    pub deleted: usize,
    pub created: usize,
}

/// Failure modes of [`RecordStore::replace_children`]. The partial case
/// (existing rows deleted, replacements not written) is named so callers
/// and tests can distinguish it from a clean failure.
#[derive(Debug, thiserror::Error)]
pub enum ReplaceError {
    #[error("failed to clear existing child records: {0}")]
    Delete(#[source] StoreError),
    #[error("cleared {deleted} child record(s) but failed to write replacements: {source}")]
    CreateAfterDelete {
        deleted: usize,
        #[source]
        source: StoreError,
    },
}

/// Minimal store surface required by the workflows: equality-filtered reads
/// plus create/update/batch writes, all keyed by table name.
pub trait RecordStore: Send + Sync {
    /// First record whose `field` equals `value`, if any.
    fn find_first(&self, table: &str, field: &str, value: &str)
        -> Result<Option<Record>, StoreError>;

    /// Every record whose `field` equals `value`.
    fn find_all(&self, table: &str, field: &str, value: &str) -> Result<Vec<Record>, StoreError>;

    fn create(&self, table: &str, fields: FieldMap) -> Result<Record, StoreError>;

    /// Partial update; fields absent from the map are left untouched.
    fn update(&self, table: &str, record_id: &str, fields: FieldMap)
        -> Result<Record, StoreError>;

    fn batch_create(&self, table: &str, rows: Vec<FieldMap>) -> Result<Vec<Record>, StoreError>;

    fn batch_delete(&self, table: &str, record_ids: &[String]) -> Result<(), StoreError>;

    /// Replace a child collection wholesale: delete every record in
    /// `existing`, then create one record per entry in `rows`. This is a
    /// destructive two-phase operation, not a merge; a failure after the
    /// delete phase leaves the collection empty and is reported as
    /// [`ReplaceError::CreateAfterDelete`].
    fn replace_children(
        &self,
        table: &str,
        existing: Vec<String>,
        rows: Vec<FieldMap>,
    ) -> Result<ReplaceReport, ReplaceError> {
        let deleted = existing.len();
        if !existing.is_empty() {
            self.batch_delete(table, &existing)
                .map_err(ReplaceError::Delete)?;
        }

        let created = rows.len();
        if !rows.is_empty() {
            self.batch_create(table, rows)
                .map_err(|source| ReplaceError::CreateAfterDelete { deleted, source })?;
        }

        Ok(ReplaceReport { deleted, created })
    }
}
