//! LLM enrichment: prompt construction, completion retry, and response
//! parsing. Writing the parsed fields back onto the applicant is the
//! pipeline's job; this module never touches the record store.

pub mod gateway;
pub(crate) mod parser;
pub(crate) mod prompt;

pub use gateway::{CompletionError, CompletionGateway, GeminiClient, GenerationParams};
pub use parser::LlmAssessment;

use std::time::Duration;

use tracing::warn;

/// Seam for the backoff waits so tests can observe them without sleeping.
pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration);
}

/// Production sleeper; the pipeline is synchronous by design.
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Bounded retry with exponential backoff (1s, 2s, ... between attempts).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_attempts: 3 }
    }
}

impl RetryPolicy {
    fn backoff_after(attempt: u32) -> Duration {
        Duration::from_secs(1 << attempt)
    }
}

/// How an enrichment pass ended. Abandonment is an outcome, not an error:
/// the applicant stays un-enriched and a future run will retry because the
/// score guard still sees no `LLM Score`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnrichmentOutcome {
    /// Fields parsed and written onto the applicant.
    Applied(LlmAssessment),
    /// The applicant already carried a score; no call, no write.
    SkippedExisting,
    /// The service answered but no labeled fields could be parsed.
    EmptyCompletion,
    Abandoned { attempts: u32 },
}

/// Result of the call-and-parse half of enrichment, before any store write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum AssessmentAttempt {
    Completed(LlmAssessment),
    Abandoned { attempts: u32 },
}

/// Drives the completion gateway with bounded retry and parses whatever
/// comes back.
pub struct LlmEnricher {
    gateway: Box<dyn CompletionGateway>,
    params: GenerationParams,
    retry: RetryPolicy,
    sleeper: Box<dyn Sleeper>,
}

impl LlmEnricher {
    pub fn new(gateway: Box<dyn CompletionGateway>, params: GenerationParams) -> Self {
        Self::with_sleeper(gateway, params, RetryPolicy::default(), Box::new(ThreadSleeper))
    }

    pub fn with_sleeper(
        gateway: Box<dyn CompletionGateway>,
        params: GenerationParams,
        retry: RetryPolicy,
        sleeper: Box<dyn Sleeper>,
    ) -> Self {
        Self {
            gateway,
            params,
            retry,
            sleeper,
        }
    }

    pub(crate) fn request_assessment(&self, profile_json: &str) -> AssessmentAttempt {
        let prompt = prompt::build_assessment_prompt(profile_json);

        for attempt in 0..self.retry.max_attempts {
            match self.gateway.complete(&prompt, &self.params) {
                Ok(text) => return AssessmentAttempt::Completed(parser::parse_completion(&text)),
                Err(err) => {
                    warn!(
                        attempt = attempt + 1,
                        max_attempts = self.retry.max_attempts,
                        error = %err,
                        "completion attempt failed"
                    );
                    if attempt + 1 < self.retry.max_attempts {
                        self.sleeper.sleep(RetryPolicy::backoff_after(attempt));
                    }
                }
            }
        }

        AssessmentAttempt::Abandoned {
            attempts: self.retry.max_attempts,
        }
    }
}
