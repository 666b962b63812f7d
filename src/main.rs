use std::sync::Arc;

use applicant_ai::config::AppConfig;
use applicant_ai::error::AppError;
use applicant_ai::store::AirtableClient;
use applicant_ai::telemetry;
use applicant_ai::workflows::applicants::enrichment::{GeminiClient, GenerationParams};
use applicant_ai::workflows::applicants::{
    ApplicantId, ApplicantPipeline, Compressor, DecompressionReport, Decompressor,
    EnrichmentOutcome, LeadWrite, LlmEnricher, PipelineReport, RuleFailure, SectionOutcome,
    ShortlistConfig, ShortlistDecision,
};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "applicant-ai",
    about = "Synchronize and enrich one applicant's records",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compress the applicant's records, then run shortlist and LLM scoring
    Process {
        /// External applicant identifier
        applicant_id: String,
        /// Evaluation date for the experience rule (defaults to today)
        #[arg(long, value_parser = parse_date)]
        today: Option<NaiveDate>,
    },
    /// Rebuild the compressed JSON snapshot only
    Compress {
        /// External applicant identifier
        applicant_id: String,
    },
    /// Fan the stored snapshot back out into the normalized tables
    Decompress {
        /// External applicant identifier
        applicant_id: String,
    },
}

fn main() {
    if let Err(err) = run_cli() {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();

    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let store = Arc::new(AirtableClient::new(&config.store)?);

    match cli.command {
        Command::Process {
            applicant_id,
            today,
        } => {
            let gateway = GeminiClient::new(&config.llm)?;
            let enricher =
                LlmEnricher::new(Box::new(gateway), GenerationParams::from(&config.llm));
            let pipeline = ApplicantPipeline::new(store, enricher, ShortlistConfig::default());

            let today = today.unwrap_or_else(|| Local::now().date_naive());
            let applicant_id = ApplicantId(applicant_id);
            info!(applicant = %applicant_id, %today, "processing applicant");

            let report = pipeline.process(&applicant_id, today)?;
            render_pipeline_report(&report);
        }
        Command::Compress { applicant_id } => {
            let compressor = Compressor::new(store);
            let snapshot = compressor.compress(&ApplicantId(applicant_id))?;
            println!(
                "Compressed {} experience entr{} for applicant {}",
                snapshot.profile.experience.len(),
                if snapshot.profile.experience.len() == 1 {
                    "y"
                } else {
                    "ies"
                },
                snapshot.applicant.applicant_id
            );
        }
        Command::Decompress { applicant_id } => {
            let decompressor = Decompressor::new(store);
            let report = decompressor.decompress(&ApplicantId(applicant_id))?;
            render_decompression_report(&report);
        }
    }

    Ok(())
}

fn render_pipeline_report(report: &PipelineReport) {
    println!("Applicant {}", report.applicant_id);

    match &report.shortlist.outcome.decision {
        ShortlistDecision::Accepted { reason } => {
            println!("Shortlist: accepted ({reason})");
        }
        ShortlistDecision::Rejected { failed_rules } => {
            println!("Shortlist: rejected");
            for failure in failed_rules {
                println!("- {}", describe_rule_failure(failure));
            }
        }
    }

    match report.shortlist.lead {
        Some(LeadWrite::Created) => println!("Lead: created"),
        Some(LeadWrite::Refreshed) => println!("Lead: refreshed existing record"),
        None => {}
    }

    match &report.enrichment {
        EnrichmentOutcome::Applied(assessment) => {
            match assessment.score {
                Some(score) => println!("Enrichment: applied (score {score})"),
                None => println!("Enrichment: applied (no score returned)"),
            }
            if let Some(summary) = &assessment.summary {
                println!("Summary: {summary}");
            }
        }
        EnrichmentOutcome::SkippedExisting => {
            println!("Enrichment: skipped, applicant already scored");
        }
        EnrichmentOutcome::EmptyCompletion => {
            println!("Enrichment: completion carried no parseable fields, nothing written");
        }
        EnrichmentOutcome::Abandoned { attempts } => {
            println!("Enrichment: abandoned after {attempts} attempt(s); will retry next run");
        }
    }
}

fn describe_rule_failure(failure: &RuleFailure) -> String {
    match failure {
        RuleFailure::InsufficientExperience { years } => {
            format!("{years:.1} years of experience and no tier-1 employer")
        }
        RuleFailure::MissingPreferredRate => "no preferred rate on file".to_string(),
        RuleFailure::RateAboveCap { rate } => format!("preferred rate ${rate}/hr above cap"),
        RuleFailure::MissingAvailability => "no availability on file".to_string(),
        RuleFailure::AvailabilityBelowMinimum { hours } => {
            format!("availability {hours} hrs/wk below minimum")
        }
        RuleFailure::LocationNotApproved { location } => match location {
            Some(location) => format!("location '{location}' not in approved regions"),
            None => "no location on file".to_string(),
        },
    }
}

fn render_decompression_report(report: &DecompressionReport) {
    println!("Applicant {}", report.applicant_id);
    println!("Personal details: {}", describe_section(&report.personal));
    println!("Work experience: {}", describe_section(&report.experience));
    println!("Salary preferences: {}", describe_section(&report.salary));
}

fn describe_section(outcome: &SectionOutcome) -> String {
    match outcome {
        SectionOutcome::SkippedEmpty => "empty in snapshot, skipped".to_string(),
        SectionOutcome::Created => "created".to_string(),
        SectionOutcome::Updated => "updated".to_string(),
        SectionOutcome::Replaced { deleted, created } => {
            format!("replaced ({deleted} deleted, {created} created)")
        }
    }
}
