//! Common types shared across the form-pilot crates.
//!
//! This crate defines the candidate data model, per-target outcome types,
//! observability helpers, and the shared error enum used throughout the
//! workspace. It is intentionally lightweight and dependency-minimal so
//! that all crates can depend on it without heavy transitive costs.
//!
//! # Overview
//!
//! - [`CandidateProfile`]: The immutable applicant record filled into forms
//! - [`ApplicationResult`]: One outcome record per submission target
//! - [`Target`]: A URL plus display name to apply against
//! - [`observability`]: Centralised tracing/logging initialisation
//! - [`PilotError`] and [`Result`]: Shared error handling
use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub mod observability;

/// Highest education level reached by the candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EducationLevel {
    HighSchool,
    Associate,
    Bachelor,
    Master,
    Doctorate,
}

impl EducationLevel {
    /// Human-readable label as it typically appears in form dropdowns.
    pub fn label(&self) -> &'static str {
        match self {
            EducationLevel::HighSchool => "High school diploma",
            EducationLevel::Associate => "Associate degree",
            EducationLevel::Bachelor => "Bachelor's degree",
            EducationLevel::Master => "Master's degree",
            EducationLevel::Doctorate => "Doctorate",
        }
    }
}

/// Years-of-experience bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceBracket {
    LessThanOne,
    OneToThree,
    ThreeToFive,
    FiveToTen,
    TenPlus,
}

impl ExperienceBracket {
    /// Human-readable label as it typically appears in form dropdowns.
    pub fn label(&self) -> &'static str {
        match self {
            ExperienceBracket::LessThanOne => "Less than 1 year",
            ExperienceBracket::OneToThree => "1-3 years",
            ExperienceBracket::ThreeToFive => "3-5 years",
            ExperienceBracket::FiveToTen => "5-10 years",
            ExperienceBracket::TenPlus => "10+ years",
        }
    }
}

/// The applicant record driven through each form.
///
/// Created once per run (normally from the YAML config) and read-only
/// thereafter; handlers only ever borrow it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub linkedin: Option<String>,
    #[serde(default)]
    pub portfolio: Option<String>,
    pub education: EducationLevel,
    pub experience: ExperienceBracket,
    /// Free-form skill names; order carries no meaning.
    #[serde(default)]
    pub skills: Vec<String>,
    pub work_authorized: bool,
    pub requires_visa: bool,
    /// Earliest start date (ISO 8601).
    pub available_from: NaiveDate,
    #[serde(default)]
    pub desired_salary: Option<String>,
    pub referral_source: String,
    pub cover_letter: String,
}

impl CandidateProfile {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// A submission target: one form URL plus a display name for reporting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Target {
    pub name: String,
    pub url: String,
}

/// Outcome of one submission attempt. Produced exactly once per target and
/// never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmation_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact_path: Option<PathBuf>,
    pub duration_ms: u64,
}

impl ApplicationResult {
    /// Successful submission with the platform's confirmation identifier.
    pub fn succeeded(
        confirmation_id: String,
        artifact_path: Option<PathBuf>,
        elapsed: Duration,
    ) -> Self {
        Self {
            success: true,
            confirmation_id: Some(confirmation_id),
            error: None,
            artifact_path,
            duration_ms: elapsed.as_millis() as u64,
        }
    }

    /// Failed attempt carrying the triggering error's message.
    pub fn failed(error: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            success: false,
            confirmation_id: None,
            error: Some(error.into()),
            artifact_path: None,
            duration_ms: elapsed.as_millis() as u64,
        }
    }
}

/// Error types used across the form-pilot system.
#[derive(thiserror::Error, Debug)]
pub enum PilotError {
    /// No registered handler claimed the current page.
    #[error("No handler found for URL: {0}")]
    NoHandler(String),

    /// A hard wait expired before its condition held.
    #[error("timed out after {waited_ms} ms waiting for {what}")]
    WaitTimeout { what: String, waited_ms: u64 },

    /// Fuzzy option resolution found no match and the literal fallback was
    /// rejected by the target control.
    #[error("could not resolve option {input:?} for field {field}")]
    FieldResolution { field: String, input: String },

    /// Artifact generation or cleanup reported a problem.
    #[error("artifact error: {0}")]
    Artifact(String),

    /// The browser driver reported an error.
    #[error("driver error: {0}")]
    Driver(#[from] anyhow::Error),
}

/// Convenient alias for results that use [`PilotError`].
pub type Result<T> = std::result::Result<T, PilotError>;
