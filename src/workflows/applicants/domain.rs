use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Table names in the applicant base.
pub mod tables {
    pub const APPLICANTS: &str = "Applicants";
    pub const PERSONAL_DETAILS: &str = "Personal Details";
    pub const WORK_EXPERIENCE: &str = "Work Experience";
    pub const SALARY_PREFERENCES: &str = "Salary Preferences";
    pub const SHORTLISTED_LEADS: &str = "Shortlisted Leads";
}

/// Store field names shared across modules.
pub mod fields {
    /// External, human-assigned applicant key on the root table.
    pub const APPLICANT_ID: &str = "Applicant ID";
    /// Back-reference from child tables to the root record.
    pub const APPLICANT_LINK: &str = "Applicant";
    pub const COMPRESSED_JSON: &str = "Compressed JSON";
    pub const LLM_SUMMARY: &str = "LLM Summary";
    pub const LLM_SCORE: &str = "LLM Score";
    pub const LLM_FOLLOW_UPS: &str = "LLM Follow-Ups";
    pub const SCORE_REASON: &str = "Score Reason";
}

/// External identifier distinguishing one candidate's full record set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApplicantId(pub String);

impl std::fmt::Display for ApplicantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Root entity. At most one per external identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Applicant {
    /// Opaque record id assigned by the store.
    pub record_id: String,
    pub applicant_id: ApplicantId,
    pub compressed_json: Option<String>,
    pub llm_summary: Option<String>,
    pub llm_score: Option<u8>,
    pub llm_follow_ups: Option<String>,
}

/// One-to-one with the applicant. `Location` feeds the shortlist rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalDetails {
    #[serde(rename = "Full Name", skip_serializing_if = "Option::is_none", default)]
    pub full_name: Option<String>,
    #[serde(rename = "Email", skip_serializing_if = "Option::is_none", default)]
    pub email: Option<String>,
    #[serde(rename = "Location", skip_serializing_if = "Option::is_none", default)]
    pub location: Option<String>,
    #[serde(rename = "LinkedIn", skip_serializing_if = "Option::is_none", default)]
    pub linkedin: Option<String>,
}

impl PersonalDetails {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// One-to-many with the applicant. Dates are `YYYY-MM-DD`; a missing `End`
/// means still employed. Unparsable dates map to `None` rather than erroring.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkExperience {
    #[serde(rename = "Company", skip_serializing_if = "Option::is_none", default)]
    pub company: Option<String>,
    #[serde(rename = "Title", skip_serializing_if = "Option::is_none", default)]
    pub title: Option<String>,
    #[serde(
        rename = "Start",
        skip_serializing_if = "Option::is_none",
        default,
        deserialize_with = "lenient_date"
    )]
    pub start: Option<NaiveDate>,
    #[serde(
        rename = "End",
        skip_serializing_if = "Option::is_none",
        default,
        deserialize_with = "lenient_date"
    )]
    pub end: Option<NaiveDate>,
}

/// One-to-one with the applicant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SalaryPreferences {
    #[serde(
        rename = "Preferred Rate",
        skip_serializing_if = "Option::is_none",
        default,
        deserialize_with = "lenient_number"
    )]
    pub preferred_rate: Option<f64>,
    #[serde(
        rename = "Minimum Rate",
        skip_serializing_if = "Option::is_none",
        default,
        deserialize_with = "lenient_number"
    )]
    pub minimum_rate: Option<f64>,
    #[serde(rename = "Currency", skip_serializing_if = "Option::is_none", default)]
    pub currency: Option<String>,
    #[serde(
        rename = "Availability (hrs/wk)",
        skip_serializing_if = "Option::is_none",
        default,
        deserialize_with = "lenient_number"
    )]
    pub availability_hours: Option<f64>,
}

impl SalaryPreferences {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Append-style lead row written when an applicant passes the shortlist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortlistedLead {
    pub applicant_record_id: String,
    pub compressed_json: String,
    pub score_reason: String,
}

/// The denormalized snapshot document: exactly three sections, nested keys
/// being the store's native field names minus back-reference/id fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompressedProfile {
    #[serde(default)]
    pub personal: PersonalDetails,
    #[serde(default)]
    pub experience: Vec<WorkExperience>,
    #[serde(default)]
    pub salary: SalaryPreferences,
}

// The snapshot travels through a store that does not enforce field types,
// so scalar decoding is lenient: anything that is not a parseable date or
// number becomes `None` instead of failing the whole document.

fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value
        .as_str()
        .and_then(|raw| NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()))
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(number) => number.as_f64(),
        Value::String(raw) => raw.trim().parse::<f64>().ok(),
        _ => None,
    })
}
