use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use tokio::runtime::Runtime;

use crate::config::StoreConfig;

use super::{FieldMap, Record, RecordStore, StoreError};

// Airtable caps list pages and batch writes at these sizes.
const PAGE_SIZE: usize = 100;
const BATCH_LIMIT: usize = 10;

#[derive(Debug, Deserialize)]
struct RecordPage {
    #[serde(default)]
    records: Vec<Record>,
    offset: Option<String>,
}

#[derive(Serialize)]
struct WriteRequest<'a> {
    fields: &'a FieldMap,
}

#[derive(Serialize)]
struct BatchCreateRequest<'a> {
    records: Vec<WriteRequest<'a>>,
}

#[derive(Deserialize)]
struct BatchCreateResponse {
    #[serde(default)]
    records: Vec<Record>,
}

/// Thin wrapper around the Airtable REST API allowing the synchronous
/// workflows to read and write records without exposing async details.
pub struct AirtableClient {
    http: HttpClient,
    runtime: Runtime,
    api_url: String,
    api_key: String,
    base_id: String,
}

impl AirtableClient {
    pub fn new(config: &StoreConfig) -> Result<Self, StoreError> {
        let runtime = Runtime::new().map_err(|err| StoreError::Runtime(err.to_string()))?;
        Self::with_runtime(config, runtime)
    }

    pub fn with_runtime(config: &StoreConfig, runtime: Runtime) -> Result<Self, StoreError> {
        let http = HttpClient::builder()
            .build()
            .map_err(|err| StoreError::Backend(err.to_string()))?;

        Ok(Self {
            http,
            runtime,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            base_id: config.base_id.clone(),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/{}/{}", self.api_url, self.base_id, table)
    }

    fn record_url(&self, table: &str, record_id: &str) -> String {
        format!("{}/{}", self.table_url(table), record_id)
    }

    /// Equality predicate in Airtable's formula language. Single quotes in
    /// the value are escaped so identifiers cannot break out of the literal.
    fn equality_formula(field: &str, value: &str) -> String {
        format!("{{{field}}} = '{}'", value.replace('\'', "\\'"))
    }

    async fn read_page(
        &self,
        table: &str,
        formula: &str,
        max_records: Option<usize>,
        offset: Option<&str>,
    ) -> Result<RecordPage, StoreError> {
        let mut query: Vec<(String, String)> =
            vec![("filterByFormula".to_string(), formula.to_string())];
        if let Some(limit) = max_records {
            query.push(("maxRecords".to_string(), limit.to_string()));
        } else {
            query.push(("pageSize".to_string(), PAGE_SIZE.to_string()));
        }
        if let Some(offset) = offset {
            query.push(("offset".to_string(), offset.to_string()));
        }

        let response = self
            .http
            .get(self.table_url(table))
            .bearer_auth(&self.api_key)
            .query(&query)
            .send()
            .await
            .map_err(|err| StoreError::Backend(err.to_string()))?;

        Self::decode(response).await
    }

    async fn decode<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, StoreError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Backend(format!("{status}: {body}")));
        }

        response
            .json::<T>()
            .await
            .map_err(|err| StoreError::Payload(err.to_string()))
    }
}

impl std::fmt::Debug for AirtableClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AirtableClient")
            .field("base_id", &self.base_id)
            .finish_non_exhaustive()
    }
}

impl RecordStore for AirtableClient {
    fn find_first(
        &self,
        table: &str,
        field: &str,
        value: &str,
    ) -> Result<Option<Record>, StoreError> {
        let formula = Self::equality_formula(field, value);
        let page = self
            .runtime
            .block_on(self.read_page(table, &formula, Some(1), None))?;
        Ok(page.records.into_iter().next())
    }

    fn find_all(&self, table: &str, field: &str, value: &str) -> Result<Vec<Record>, StoreError> {
        let formula = Self::equality_formula(field, value);
        let mut records = Vec::new();
        let mut offset: Option<String> = None;

        loop {
            let page = self.runtime.block_on(self.read_page(
                table,
                &formula,
                None,
                offset.as_deref(),
            ))?;
            records.extend(page.records);
            match page.offset {
                Some(next) => offset = Some(next),
                None => break,
            }
        }

        Ok(records)
    }

    fn create(&self, table: &str, fields: FieldMap) -> Result<Record, StoreError> {
        self.runtime.block_on(async {
            let response = self
                .http
                .post(self.table_url(table))
                .bearer_auth(&self.api_key)
                .json(&WriteRequest { fields: &fields })
                .send()
                .await
                .map_err(|err| StoreError::Backend(err.to_string()))?;

            Self::decode(response).await
        })
    }

    fn update(
        &self,
        table: &str,
        record_id: &str,
        fields: FieldMap,
    ) -> Result<Record, StoreError> {
        self.runtime.block_on(async {
            let response = self
                .http
                .patch(self.record_url(table, record_id))
                .bearer_auth(&self.api_key)
                .json(&WriteRequest { fields: &fields })
                .send()
                .await
                .map_err(|err| StoreError::Backend(err.to_string()))?;

            Self::decode(response).await
        })
    }

    fn batch_create(&self, table: &str, rows: Vec<FieldMap>) -> Result<Vec<Record>, StoreError> {
        self.runtime.block_on(async {
            let mut created = Vec::with_capacity(rows.len());

            for chunk in rows.chunks(BATCH_LIMIT) {
                let request = BatchCreateRequest {
                    records: chunk.iter().map(|fields| WriteRequest { fields }).collect(),
                };

                let response = self
                    .http
                    .post(self.table_url(table))
                    .bearer_auth(&self.api_key)
                    .json(&request)
                    .send()
                    .await
                    .map_err(|err| StoreError::Backend(err.to_string()))?;

                let page: BatchCreateResponse = Self::decode(response).await?;
                created.extend(page.records);
            }

            Ok(created)
        })
    }

    fn batch_delete(&self, table: &str, record_ids: &[String]) -> Result<(), StoreError> {
        self.runtime.block_on(async {
            for chunk in record_ids.chunks(BATCH_LIMIT) {
                let query: Vec<(&str, &str)> =
                    chunk.iter().map(|id| ("records[]", id.as_str())).collect();

                let response = self
                    .http
                    .delete(self.table_url(table))
                    .bearer_auth(&self.api_key)
                    .query(&query)
                    .send()
                    .await
                    .map_err(|err| StoreError::Backend(err.to_string()))?;

                let status = response.status();
                if !status.is_success() {
                    let body = response.text().await.unwrap_or_default();
                    return Err(StoreError::Backend(format!("{status}: {body}")));
                }
            }

            Ok(())
        })
    }
}
