use chrono::{Datelike, NaiveDate};

use super::super::domain::{CompressedProfile, WorkExperience};
use super::config::ShortlistConfig;

/// Raw inputs to the shortlist decision, extracted in one pass over the
/// snapshot so the decision and the reason string read from the same data.
pub(crate) struct ShortlistSignals {
    pub experience_years: f64,
    pub tier_one_company: Option<String>,
    pub preferred_rate: Option<f64>,
    pub weekly_availability: Option<f64>,
    pub location: Option<String>,
}

pub(crate) fn gather_signals(
    profile: &CompressedProfile,
    config: &ShortlistConfig,
    today: NaiveDate,
) -> ShortlistSignals {
    let total_months = total_experience_months(&profile.experience, today);

    let tier_one_company = profile.experience.iter().find_map(|entry| {
        entry.company.as_ref().and_then(|company| {
            let lowered = company.to_lowercase();
            config
                .tier_one_companies
                .iter()
                .any(|tier_one| *tier_one == lowered)
                .then(|| company.clone())
        })
    });

    ShortlistSignals {
        experience_years: f64::from(total_months) / 12.0,
        tier_one_company,
        preferred_rate: profile.salary.preferred_rate,
        weekly_availability: profile.salary.availability_hours,
        location: profile.personal.location.clone(),
    }
}

/// Month-granularity tenure sum. Entries without a parseable `Start` are
/// skipped; a missing `End` counts up to `today`.
pub(crate) fn total_experience_months(entries: &[WorkExperience], today: NaiveDate) -> i32 {
    entries
        .iter()
        .filter_map(|entry| {
            let start = entry.start?;
            let end = entry.end.unwrap_or(today);
            Some(months_between(start, end))
        })
        .sum()
}

fn months_between(start: NaiveDate, end: NaiveDate) -> i32 {
    (end.year() - start.year()) * 12 + (end.month() as i32 - start.month() as i32)
}
