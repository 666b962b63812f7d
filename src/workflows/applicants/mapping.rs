//! Translation boundary between raw store records and typed entities.
//!
//! All missing-field handling lives here: a record with absent or oddly
//! typed fields maps to an entity with `None` in those positions, and
//! entities map back to field maps carrying only present fields plus the
//! back-reference link the store needs.

use serde_json::Value;

use crate::store::{FieldMap, Record};

use super::domain::{
    fields, Applicant, ApplicantId, PersonalDetails, SalaryPreferences, ShortlistedLead,
    WorkExperience,
};
use super::enrichment::LlmAssessment;

pub fn applicant_from_record(record: &Record) -> Applicant {
    Applicant {
        record_id: record.id.clone(),
        applicant_id: ApplicantId(
            string_field(&record.fields, fields::APPLICANT_ID).unwrap_or_default(),
        ),
        compressed_json: string_field(&record.fields, fields::COMPRESSED_JSON),
        llm_summary: string_field(&record.fields, fields::LLM_SUMMARY),
        llm_score: int_field(&record.fields, fields::LLM_SCORE),
        llm_follow_ups: string_field(&record.fields, fields::LLM_FOLLOW_UPS),
    }
}

pub fn personal_from_record(record: &Record) -> PersonalDetails {
    entity_from_fields(&record.fields)
}

pub fn experience_from_record(record: &Record) -> WorkExperience {
    entity_from_fields(&record.fields)
}

pub fn salary_from_record(record: &Record) -> SalaryPreferences {
    entity_from_fields(&record.fields)
}

pub fn personal_fields(personal: &PersonalDetails, root_record_id: &str) -> FieldMap {
    linked_fields(personal, root_record_id)
}

pub fn experience_fields(entry: &WorkExperience, root_record_id: &str) -> FieldMap {
    linked_fields(entry, root_record_id)
}

pub fn salary_fields(salary: &SalaryPreferences, root_record_id: &str) -> FieldMap {
    linked_fields(salary, root_record_id)
}

pub fn lead_fields(lead: &ShortlistedLead) -> FieldMap {
    let mut map = FieldMap::new();
    map.insert(
        fields::APPLICANT_LINK.to_string(),
        Value::Array(vec![Value::String(lead.applicant_record_id.clone())]),
    );
    map.insert(
        fields::COMPRESSED_JSON.to_string(),
        Value::String(lead.compressed_json.clone()),
    );
    map.insert(
        fields::SCORE_REASON.to_string(),
        Value::String(lead.score_reason.clone()),
    );
    map
}

pub fn enrichment_fields(assessment: &LlmAssessment) -> FieldMap {
    let mut map = FieldMap::new();
    if let Some(summary) = &assessment.summary {
        map.insert(
            fields::LLM_SUMMARY.to_string(),
            Value::String(summary.clone()),
        );
    }
    if let Some(score) = assessment.score {
        map.insert(fields::LLM_SCORE.to_string(), Value::from(score));
    }
    if let Some(follow_ups) = &assessment.follow_ups {
        map.insert(
            fields::LLM_FOLLOW_UPS.to_string(),
            Value::String(follow_ups.clone()),
        );
    }
    map
}

/// Decode an entity from a raw field map. Unknown fields (including the
/// back-reference and any residual record id) are dropped; scalar fields
/// decode leniently per the entity's serde contract.
fn entity_from_fields<T: serde::de::DeserializeOwned + Default>(fields: &FieldMap) -> T {
    serde_json::from_value(Value::Object(fields.clone())).unwrap_or_default()
}

/// Encode an entity to a field map and attach the back-reference the store
/// expects on child tables (a list of linked record ids).
fn linked_fields<T: serde::Serialize>(entity: &T, root_record_id: &str) -> FieldMap {
    let mut map = match serde_json::to_value(entity) {
        Ok(Value::Object(map)) => map,
        _ => FieldMap::new(),
    };
    map.insert(
        fields::APPLICANT_LINK.to_string(),
        Value::Array(vec![Value::String(root_record_id.to_string())]),
    );
    map
}

fn string_field(fields: &FieldMap, name: &str) -> Option<String> {
    fields
        .get(name)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
        .map(str::to_string)
}

fn int_field(fields: &FieldMap, name: &str) -> Option<u8> {
    fields
        .get(name)
        .and_then(Value::as_i64)
        .and_then(|value| u8::try_from(value).ok())
}
