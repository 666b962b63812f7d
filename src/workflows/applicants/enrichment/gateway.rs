use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use tokio::runtime::Runtime;

use crate::config::LlmConfig;

/// Sampling controls sent with every completion request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    pub max_output_tokens: u32,
    pub temperature: f32,
}

impl From<&LlmConfig> for GenerationParams {
    fn from(config: &LlmConfig) -> Self {
        Self {
            max_output_tokens: config.max_output_tokens,
            temperature: config.temperature,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    #[error("completion request failed: {0}")]
    Request(String),
    #[error("generation service rejected the request: {0}")]
    Api(String),
    #[error("generation service returned an unusable response: {0}")]
    MalformedResponse(String),
    #[error("completion runtime unavailable: {0}")]
    Runtime(String),
}

/// Seam to the external text-generation service so the enrichment logic
/// can be exercised with scripted responses.
pub trait CompletionGateway: Send + Sync {
    fn complete(&self, prompt: &str, params: &GenerationParams) -> Result<String, CompletionError>;
}

// Request/response shapes for the Gemini generateContent endpoint.

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: String,
}

/// Gemini-backed gateway. The async HTTP client stays hidden behind the
/// synchronous trait, the same way the record-store client is wrapped.
pub struct GeminiClient {
    http: HttpClient,
    runtime: Runtime,
    api_url: String,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(config: &LlmConfig) -> Result<Self, CompletionError> {
        let runtime = Runtime::new().map_err(|err| CompletionError::Runtime(err.to_string()))?;
        Self::with_runtime(config, runtime)
    }

    pub fn with_runtime(config: &LlmConfig, runtime: Runtime) -> Result<Self, CompletionError> {
        let http = HttpClient::builder()
            .build()
            .map_err(|err| CompletionError::Request(err.to_string()))?;

        Ok(Self {
            http,
            runtime,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl CompletionGateway for GeminiClient {
    fn complete(&self, prompt: &str, params: &GenerationParams) -> Result<String, CompletionError> {
        let request = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                max_output_tokens: params.max_output_tokens,
                temperature: params.temperature,
            },
        };

        let url = format!("{}/models/{}:generateContent", self.api_url, self.model);

        self.runtime.block_on(async {
            let response = self
                .http
                .post(&url)
                .query(&[("key", &self.api_key)])
                .json(&request)
                .send()
                .await
                .map_err(|err| CompletionError::Request(err.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(CompletionError::Api(format!("{status}: {body}")));
            }

            let payload: GenerateResponse = response
                .json()
                .await
                .map_err(|err| CompletionError::MalformedResponse(err.to_string()))?;

            payload
                .candidates
                .into_iter()
                .next()
                .and_then(|candidate| candidate.content.parts.into_iter().next())
                .map(|part| part.text)
                .ok_or_else(|| {
                    CompletionError::MalformedResponse("response carried no candidates".to_string())
                })
        })
    }
}
