use serde::{Deserialize, Serialize};

/// Thresholds and allow-lists backing the shortlist rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShortlistConfig {
    pub minimum_experience_years: f64,
    /// Employers treated as satisfying the experience bar regardless of
    /// tenure. Matched case-insensitively against `Company`.
    pub tier_one_companies: Vec<String>,
    pub maximum_hourly_rate: f64,
    pub minimum_weekly_availability: f64,
    /// Substrings matched against the lower-cased `Location` field.
    pub approved_locations: Vec<String>,
}

impl Default for ShortlistConfig {
    fn default() -> Self {
        Self {
            minimum_experience_years: 4.0,
            tier_one_companies: [
                "google",
                "meta",
                "openai",
                "apple",
                "amazon",
                "netflix",
                "microsoft",
            ]
            .map(str::to_string)
            .to_vec(),
            maximum_hourly_rate: 100.0,
            minimum_weekly_availability: 20.0,
            approved_locations: [
                "us",
                "united states",
                "canada",
                "uk",
                "united kingdom",
                "germany",
                "india",
            ]
            .map(str::to_string)
            .to_vec(),
        }
    }
}
