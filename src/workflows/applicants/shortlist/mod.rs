//! Rule-based shortlist evaluation over the compressed snapshot.
//!
//! The engine is a pure function of the snapshot, the configured rubric,
//! and an explicit evaluation date; persisting the resulting lead is the
//! pipeline's job.

mod config;
mod rules;

pub use config::ShortlistConfig;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::{ApplicantId, CompressedProfile};
use rules::{gather_signals, ShortlistSignals};

/// Stateless evaluator applying the shortlist rubric to a snapshot.
pub struct ShortlistEngine {
    config: ShortlistConfig,
}

/// Accept/reject decision with its justification trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ShortlistDecision {
    Accepted { reason: String },
    Rejected { failed_rules: Vec<RuleFailure> },
}

impl ShortlistDecision {
    pub fn is_accepted(&self) -> bool {
        matches!(self, ShortlistDecision::Accepted { .. })
    }
}

/// Individual rule failures, named so rejections are auditable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RuleFailure {
    InsufficientExperience { years: f64 },
    /// Missing rate fails the compensation rule outright; there is no
    /// implicit "treat as infinite" default.
    MissingPreferredRate,
    RateAboveCap { rate: f64 },
    /// Missing availability fails the compensation rule outright.
    MissingAvailability,
    AvailabilityBelowMinimum { hours: f64 },
    LocationNotApproved { location: Option<String> },
}

/// Evaluation output: the decision plus the headline signals it was
/// computed from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShortlistOutcome {
    pub applicant_id: ApplicantId,
    pub decision: ShortlistDecision,
    pub experience_years: f64,
    pub tier_one_company: Option<String>,
}

impl ShortlistEngine {
    pub fn new(config: ShortlistConfig) -> Self {
        Self { config }
    }

    pub fn evaluate(
        &self,
        applicant_id: &ApplicantId,
        profile: &CompressedProfile,
        today: NaiveDate,
    ) -> ShortlistOutcome {
        let signals = gather_signals(profile, &self.config, today);
        let mut failed_rules = Vec::new();

        let experience_ok = signals.experience_years >= self.config.minimum_experience_years
            || signals.tier_one_company.is_some();
        if !experience_ok {
            failed_rules.push(RuleFailure::InsufficientExperience {
                years: signals.experience_years,
            });
        }

        match signals.preferred_rate {
            None => failed_rules.push(RuleFailure::MissingPreferredRate),
            Some(rate) if rate > self.config.maximum_hourly_rate => {
                failed_rules.push(RuleFailure::RateAboveCap { rate });
            }
            Some(_) => {}
        }
        match signals.weekly_availability {
            None => failed_rules.push(RuleFailure::MissingAvailability),
            Some(hours) if hours < self.config.minimum_weekly_availability => {
                failed_rules.push(RuleFailure::AvailabilityBelowMinimum { hours });
            }
            Some(_) => {}
        }

        let location_ok = signals
            .location
            .as_ref()
            .map(|location| {
                let lowered = location.to_lowercase();
                self.config
                    .approved_locations
                    .iter()
                    .any(|approved| lowered.contains(approved))
            })
            .unwrap_or(false);
        if !location_ok {
            failed_rules.push(RuleFailure::LocationNotApproved {
                location: signals.location.clone(),
            });
        }

        let decision = if failed_rules.is_empty() {
            ShortlistDecision::Accepted {
                reason: acceptance_reason(&signals),
            }
        } else {
            ShortlistDecision::Rejected { failed_rules }
        };

        ShortlistOutcome {
            applicant_id: applicant_id.clone(),
            decision,
            experience_years: signals.experience_years,
            tier_one_company: signals.tier_one_company,
        }
    }
}

fn acceptance_reason(signals: &ShortlistSignals) -> String {
    let rate = signals.preferred_rate.unwrap_or_default();
    let availability = signals.weekly_availability.unwrap_or_default();
    let location = signals.location.as_deref().unwrap_or("unknown");

    format!(
        "Exp: {:.1} yrs (Tier-1: {}), Comp: ${rate}/hr @ {availability} hrs/wk, Loc: {location}",
        signals.experience_years,
        signals.tier_one_company.is_some(),
    )
}
