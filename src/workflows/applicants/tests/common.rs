use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::NaiveDate;
use serde_json::{json, Value};

use crate::store::{FieldMap, Record, RecordStore, StoreError};
use crate::workflows::applicants::domain::{fields, tables};
use crate::workflows::applicants::enrichment::{
    CompletionError, CompletionGateway, GenerationParams, LlmEnricher, RetryPolicy, Sleeper,
};
use crate::workflows::applicants::{ApplicantPipeline, ShortlistConfig};

/// In-memory record store mirroring the equality-filter semantics the
/// workflows rely on. Linked-record fields (arrays of record ids) match a
/// query when the linked Applicants row's external id equals it, the way
/// the real store's formula fields resolve links to their primary field.
#[derive(Default)]
pub(super) struct MemoryStore {
    tables: Mutex<HashMap<String, Vec<Record>>>,
    sequence: AtomicU64,
    pub fail_batch_create: AtomicBool,
}

impl MemoryStore {
    fn next_id(&self) -> String {
        format!("rec{:05}", self.sequence.fetch_add(1, Ordering::Relaxed))
    }

    /// Seed one record from a JSON object literal; returns the record id.
    pub fn insert(&self, table: &str, fields: Value) -> String {
        let fields = fields.as_object().expect("object literal").clone();
        let id = self.next_id();
        self.tables
            .lock()
            .expect("store mutex poisoned")
            .entry(table.to_string())
            .or_default()
            .push(Record {
                id: id.clone(),
                fields,
            });
        id
    }

    pub fn records(&self, table: &str) -> Vec<Record> {
        self.tables
            .lock()
            .expect("store mutex poisoned")
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    pub fn record_by_id(&self, table: &str, record_id: &str) -> Option<Record> {
        self.records(table)
            .into_iter()
            .find(|record| record.id == record_id)
    }
}

fn field_matches(all: &HashMap<String, Vec<Record>>, value: &Value, query: &str) -> bool {
    match value {
        Value::String(raw) => raw == query,
        Value::Number(number) => number.to_string() == query,
        Value::Array(items) => items.iter().any(|item| match item.as_str() {
            Some(id) => id == query || links_to_applicant(all, id, query),
            None => false,
        }),
        _ => false,
    }
}

fn links_to_applicant(all: &HashMap<String, Vec<Record>>, record_id: &str, query: &str) -> bool {
    all.get(tables::APPLICANTS)
        .map(|records| {
            records.iter().any(|record| {
                record.id == record_id
                    && record.fields.get(fields::APPLICANT_ID).and_then(Value::as_str)
                        == Some(query)
            })
        })
        .unwrap_or(false)
}

impl RecordStore for MemoryStore {
    fn find_first(
        &self,
        table: &str,
        field: &str,
        value: &str,
    ) -> Result<Option<Record>, StoreError> {
        let all = self.tables.lock().expect("store mutex poisoned");
        Ok(all.get(table).and_then(|records| {
            records
                .iter()
                .find(|record| {
                    record
                        .fields
                        .get(field)
                        .map(|candidate| field_matches(&all, candidate, value))
                        .unwrap_or(false)
                })
                .cloned()
        }))
    }

    fn find_all(&self, table: &str, field: &str, value: &str) -> Result<Vec<Record>, StoreError> {
        let all = self.tables.lock().expect("store mutex poisoned");
        Ok(all
            .get(table)
            .map(|records| {
                records
                    .iter()
                    .filter(|record| {
                        record
                            .fields
                            .get(field)
                            .map(|candidate| field_matches(&all, candidate, value))
                            .unwrap_or(false)
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn create(&self, table: &str, fields: FieldMap) -> Result<Record, StoreError> {
        let record = Record {
            id: self.next_id(),
            fields,
        };
        self.tables
            .lock()
            .expect("store mutex poisoned")
            .entry(table.to_string())
            .or_default()
            .push(record.clone());
        Ok(record)
    }

    fn update(
        &self,
        table: &str,
        record_id: &str,
        fields: FieldMap,
    ) -> Result<Record, StoreError> {
        let mut all = self.tables.lock().expect("store mutex poisoned");
        let records = all
            .get_mut(table)
            .ok_or_else(|| StoreError::Backend(format!("unknown table {table}")))?;
        let record = records
            .iter_mut()
            .find(|record| record.id == record_id)
            .ok_or_else(|| StoreError::Backend(format!("record {record_id} not found")))?;
        record.fields.extend(fields);
        Ok(record.clone())
    }

    fn batch_create(&self, table: &str, rows: Vec<FieldMap>) -> Result<Vec<Record>, StoreError> {
        if self.fail_batch_create.load(Ordering::Relaxed) {
            return Err(StoreError::Backend("simulated batch create outage".to_string()));
        }
        rows.into_iter().map(|row| self.create(table, row)).collect()
    }

    fn batch_delete(&self, table: &str, record_ids: &[String]) -> Result<(), StoreError> {
        let mut all = self.tables.lock().expect("store mutex poisoned");
        if let Some(records) = all.get_mut(table) {
            records.retain(|record| !record_ids.contains(&record.id));
        }
        Ok(())
    }
}

/// Scripted completion gateway recording every prompt it sees.
#[derive(Clone, Default)]
pub(super) struct ScriptedGateway {
    replies: Arc<Mutex<VecDeque<Result<String, String>>>>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl ScriptedGateway {
    pub fn replying(replies: Vec<Result<&str, &str>>) -> Self {
        let gateway = Self::default();
        let mut queue = gateway.replies.lock().expect("gateway mutex poisoned");
        for reply in replies {
            queue.push_back(match reply {
                Ok(text) => Ok(text.to_string()),
                Err(message) => Err(message.to_string()),
            });
        }
        drop(queue);
        gateway
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().expect("gateway mutex poisoned").len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("gateway mutex poisoned").clone()
    }
}

impl CompletionGateway for ScriptedGateway {
    fn complete(&self, prompt: &str, _params: &GenerationParams) -> Result<String, CompletionError> {
        self.prompts
            .lock()
            .expect("gateway mutex poisoned")
            .push(prompt.to_string());

        match self
            .replies
            .lock()
            .expect("gateway mutex poisoned")
            .pop_front()
        {
            Some(Ok(text)) => Ok(text),
            Some(Err(message)) => Err(CompletionError::Api(message)),
            None => Err(CompletionError::Request("no scripted reply left".to_string())),
        }
    }
}

/// Records backoff waits instead of sleeping.
#[derive(Clone, Default)]
pub(super) struct RecordingSleeper {
    waits: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingSleeper {
    pub fn waits(&self) -> Vec<Duration> {
        self.waits.lock().expect("sleeper mutex poisoned").clone()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) {
        self.waits
            .lock()
            .expect("sleeper mutex poisoned")
            .push(duration);
    }
}

pub(super) fn generation_params() -> GenerationParams {
    GenerationParams {
        max_output_tokens: 500,
        temperature: 0.5,
    }
}

pub(super) fn evaluation_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 6, 1).expect("valid date")
}

pub(super) fn enricher(gateway: ScriptedGateway) -> LlmEnricher {
    LlmEnricher::with_sleeper(
        Box::new(gateway),
        generation_params(),
        RetryPolicy::default(),
        Box::new(RecordingSleeper::default()),
    )
}

pub(super) fn pipeline(
    store: Arc<MemoryStore>,
    gateway: ScriptedGateway,
) -> ApplicantPipeline<MemoryStore> {
    ApplicantPipeline::new(store, enricher(gateway), ShortlistConfig::default())
}

/// Seed the canonical qualifying applicant: 4.0 years of experience as of
/// [`evaluation_date`], rate 80, availability 25, United States.
pub(super) fn seed_qualifying_applicant(store: &MemoryStore, applicant_id: &str) -> String {
    let root = store.insert(
        tables::APPLICANTS,
        json!({ "Applicant ID": applicant_id }),
    );

    store.insert(
        tables::PERSONAL_DETAILS,
        json!({
            "Full Name": "Jordan Reyes",
            "Email": "jordan@example.com",
            "Location": "Austin, United States",
            "Applicant": [root],
        }),
    );
    store.insert(
        tables::WORK_EXPERIENCE,
        json!({
            "Company": "Initech",
            "Title": "Backend Engineer",
            "Start": "2019-01-01",
            "End": "2021-01-01",
            "Applicant": [root],
        }),
    );
    store.insert(
        tables::WORK_EXPERIENCE,
        json!({
            "Company": "Hooli",
            "Title": "Platform Engineer",
            "Start": "2021-06-01",
            "Applicant": [root],
        }),
    );
    store.insert(
        tables::SALARY_PREFERENCES,
        json!({
            "Preferred Rate": 80,
            "Currency": "USD",
            "Availability (hrs/wk)": 25,
            "Applicant": [root],
        }),
    );

    root
}

pub(super) const ASSESSMENT_REPLY: &str =
    "Summary: Strong candidate\nScore: 8\nIssues: None\nFollow-Ups: - Ask about visa status\n- Ask about notice period";
