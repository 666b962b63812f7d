use std::sync::atomic::Ordering;
use std::sync::Arc;

use serde_json::json;

use super::common::*;
use crate::store::{RecordStore, ReplaceError};
use crate::workflows::applicants::domain::{fields, tables, ApplicantId};
use crate::workflows::applicants::{
    mapping, CompressionError, Compressor, DecompressionError, Decompressor, SectionOutcome,
};

fn child_record_ids(store: &MemoryStore, table: &str) -> Vec<String> {
    store
        .records(table)
        .into_iter()
        .map(|record| record.id)
        .collect()
}

#[test]
fn compress_persists_the_snapshot_on_the_root_record() {
    let store = Arc::new(MemoryStore::default());
    let root = seed_qualifying_applicant(&store, "4");
    let compressor = Compressor::new(store.clone());

    let snapshot = compressor
        .compress(&ApplicantId("4".to_string()))
        .expect("compression succeeds");

    assert_eq!(snapshot.applicant.record_id, root);
    assert_eq!(snapshot.profile.experience.len(), 2);
    assert_eq!(
        snapshot.profile.personal.location.as_deref(),
        Some("Austin, United States")
    );

    let stored = store
        .record_by_id(tables::APPLICANTS, &root)
        .expect("root record present");
    let serialized = stored
        .fields
        .get(fields::COMPRESSED_JSON)
        .and_then(serde_json::Value::as_str)
        .expect("snapshot written");
    assert_eq!(serialized, snapshot.serialized);
    assert!(serialized.contains("\"personal\""));
}

#[test]
fn compress_strips_back_references_from_the_snapshot() {
    let store = Arc::new(MemoryStore::default());
    seed_qualifying_applicant(&store, "4");
    let compressor = Compressor::new(store);

    let snapshot = compressor
        .compress(&ApplicantId("4".to_string()))
        .expect("compression succeeds");

    assert!(!snapshot.serialized.contains("\"Applicant\""));
}

#[test]
fn compress_fails_for_unknown_applicants() {
    let store = Arc::new(MemoryStore::default());
    let compressor = Compressor::new(store);

    match compressor.compress(&ApplicantId("ghost".to_string())) {
        Err(CompressionError::ApplicantNotFound(id)) => assert_eq!(id.0, "ghost"),
        other => panic!("expected not-found error, got {other:?}"),
    }
}

#[test]
fn compress_handles_applicants_with_no_child_records() {
    let store = Arc::new(MemoryStore::default());
    store.insert(tables::APPLICANTS, json!({ "Applicant ID": "9" }));
    let compressor = Compressor::new(store);

    let snapshot = compressor
        .compress(&ApplicantId("9".to_string()))
        .expect("compression succeeds");

    assert!(snapshot.profile.personal.is_empty());
    assert!(snapshot.profile.experience.is_empty());
    assert!(snapshot.profile.salary.is_empty());
}

#[test]
fn decompress_round_trips_the_normalized_records() {
    let store = Arc::new(MemoryStore::default());
    seed_qualifying_applicant(&store, "4");
    let applicant_id = ApplicantId("4".to_string());

    let snapshot = Compressor::new(store.clone())
        .compress(&applicant_id)
        .expect("compression succeeds");

    // Wipe the children so decompression must rebuild them from the snapshot.
    for table in [
        tables::PERSONAL_DETAILS,
        tables::WORK_EXPERIENCE,
        tables::SALARY_PREFERENCES,
    ] {
        let ids = child_record_ids(&store, table);
        store.batch_delete(table, &ids).expect("seed wipe succeeds");
    }

    let report = Decompressor::new(store.clone())
        .decompress(&applicant_id)
        .expect("decompression succeeds");

    assert_eq!(report.personal, SectionOutcome::Created);
    assert_eq!(
        report.experience,
        SectionOutcome::Replaced {
            deleted: 0,
            created: 2
        }
    );
    assert_eq!(report.salary, SectionOutcome::Created);

    let personal_records = store.records(tables::PERSONAL_DETAILS);
    assert_eq!(personal_records.len(), 1);
    assert_eq!(
        mapping::personal_from_record(&personal_records[0]),
        snapshot.profile.personal
    );

    let salary_records = store.records(tables::SALARY_PREFERENCES);
    assert_eq!(salary_records.len(), 1);
    assert_eq!(
        mapping::salary_from_record(&salary_records[0]),
        snapshot.profile.salary
    );

    // Experience compares as a set: ordering is not part of the contract.
    let mut rebuilt: Vec<_> = store
        .records(tables::WORK_EXPERIENCE)
        .iter()
        .map(mapping::experience_from_record)
        .collect();
    let mut expected = snapshot.profile.experience.clone();
    rebuilt.sort_by(|a, b| a.company.cmp(&b.company));
    expected.sort_by(|a, b| a.company.cmp(&b.company));
    assert_eq!(rebuilt, expected);
}

#[test]
fn decompress_twice_is_idempotent() {
    let store = Arc::new(MemoryStore::default());
    seed_qualifying_applicant(&store, "4");
    let applicant_id = ApplicantId("4".to_string());

    Compressor::new(store.clone())
        .compress(&applicant_id)
        .expect("compression succeeds");

    let decompressor = Decompressor::new(store.clone());
    let first = decompressor
        .decompress(&applicant_id)
        .expect("first pass succeeds");
    let second = decompressor
        .decompress(&applicant_id)
        .expect("second pass succeeds");

    assert_eq!(first.personal, SectionOutcome::Updated);
    assert_eq!(second.personal, SectionOutcome::Updated);
    assert_eq!(
        second.experience,
        SectionOutcome::Replaced {
            deleted: 2,
            created: 2
        }
    );

    assert_eq!(store.records(tables::PERSONAL_DETAILS).len(), 1);
    assert_eq!(store.records(tables::SALARY_PREFERENCES).len(), 1);
    assert_eq!(store.records(tables::WORK_EXPERIENCE).len(), 2);
}

#[test]
fn decompress_requires_a_snapshot() {
    let store = Arc::new(MemoryStore::default());
    store.insert(tables::APPLICANTS, json!({ "Applicant ID": "4" }));

    match Decompressor::new(store).decompress(&ApplicantId("4".to_string())) {
        Err(DecompressionError::MissingSnapshot(id)) => assert_eq!(id.0, "4"),
        other => panic!("expected missing-snapshot error, got {other:?}"),
    }
}

#[test]
fn decompress_reports_malformed_snapshots() {
    let store = Arc::new(MemoryStore::default());
    store.insert(
        tables::APPLICANTS,
        json!({ "Applicant ID": "4", "Compressed JSON": "{not json" }),
    );

    match Decompressor::new(store).decompress(&ApplicantId("4".to_string())) {
        Err(DecompressionError::MalformedSnapshot { applicant_id, .. }) => {
            assert_eq!(applicant_id.0, "4");
        }
        other => panic!("expected malformed-snapshot error, got {other:?}"),
    }
}

#[test]
fn decompress_skips_sections_that_are_empty_in_the_snapshot() {
    let store = Arc::new(MemoryStore::default());
    store.insert(
        tables::APPLICANTS,
        json!({
            "Applicant ID": "4",
            "Compressed JSON": "{\"personal\": {}, \"experience\": [], \"salary\": {}}",
        }),
    );

    let report = Decompressor::new(store.clone())
        .decompress(&ApplicantId("4".to_string()))
        .expect("decompression succeeds");

    assert_eq!(report.personal, SectionOutcome::SkippedEmpty);
    assert_eq!(report.experience, SectionOutcome::SkippedEmpty);
    assert_eq!(report.salary, SectionOutcome::SkippedEmpty);
    assert!(store.records(tables::PERSONAL_DETAILS).is_empty());
}

#[test]
fn experience_replace_names_the_partial_failure_mode() {
    let store = Arc::new(MemoryStore::default());
    seed_qualifying_applicant(&store, "4");
    let applicant_id = ApplicantId("4".to_string());

    Compressor::new(store.clone())
        .compress(&applicant_id)
        .expect("compression succeeds");

    store.fail_batch_create.store(true, Ordering::Relaxed);

    match Decompressor::new(store.clone()).decompress(&applicant_id) {
        Err(DecompressionError::Replace(ReplaceError::CreateAfterDelete { deleted, .. })) => {
            assert_eq!(deleted, 2);
        }
        other => panic!("expected partial-replace error, got {other:?}"),
    }

    // The delete phase ran: the old rows are gone and no replacements exist.
    assert!(store.records(tables::WORK_EXPERIENCE).is_empty());
}
