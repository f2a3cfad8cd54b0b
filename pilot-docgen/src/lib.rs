//! Per-target submission artifacts.
//!
//! Renders a tailored cover-letter file for each target before its attempt
//! and removes it afterwards, so no attempt ever reuses a previous target's
//! attachment. Rendering failures degrade to a pre-existing fallback
//! attachment when one is configured; the fallback is never tracked for
//! deletion.

use std::path::{Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;
use pilot_common::CandidateProfile;
use pilot_engine::ArtifactProvider;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// File-backed [`ArtifactProvider`] writing one rendered letter per target
/// into `output_dir`.
pub struct CoverLetterProvider {
    output_dir: PathBuf,
    fallback: Option<PathBuf>,
    current: Mutex<Option<PathBuf>>,
}

impl CoverLetterProvider {
    pub fn new(output_dir: impl Into<PathBuf>, fallback: Option<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            fallback,
            current: Mutex::new(None),
        }
    }

    fn render(profile: &CandidateProfile, target_name: &str) -> String {
        let mut letter = String::new();
        letter.push_str(&format!("Application for {target_name}\n\n"));
        letter.push_str(&profile.cover_letter);
        letter.push_str("\n\n");
        letter.push_str(&format!(
            "{}\n{} | {}\n",
            profile.full_name(),
            profile.email,
            profile.phone
        ));
        letter
    }

    async fn write_letter(
        &self,
        profile: &CandidateProfile,
        target_name: &str,
    ) -> anyhow::Result<PathBuf> {
        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .with_context(|| format!("creating artifact dir {}", self.output_dir.display()))?;
        let path = self
            .output_dir
            .join(format!("cover-letter-{}.txt", slugify(target_name)));
        tokio::fs::write(&path, Self::render(profile, target_name))
            .await
            .with_context(|| format!("writing artifact {}", path.display()))?;
        Ok(path)
    }
}

#[async_trait]
impl ArtifactProvider for CoverLetterProvider {
    async fn obtain(
        &self,
        profile: &CandidateProfile,
        target_name: &str,
    ) -> anyhow::Result<PathBuf> {
        match self.write_letter(profile, target_name).await {
            Ok(path) => {
                debug!(target: "docgen", path = %path.display(), "artifact rendered");
                *self.current.lock().await = Some(path.clone());
                Ok(path)
            }
            Err(e) => match &self.fallback {
                Some(fallback) => {
                    warn!(
                        target: "docgen",
                        error = %e,
                        fallback = %fallback.display(),
                        "rendering failed, using fallback attachment"
                    );
                    Ok(fallback.clone())
                }
                None => Err(e),
            },
        }
    }

    async fn release(&self) {
        let Some(path) = self.current.lock().await.take() else {
            return;
        };
        match tokio::fs::remove_file(&path).await {
            Ok(()) => debug!(target: "docgen", path = %path.display(), "artifact removed"),
            Err(e) => {
                warn!(target: "docgen", path = %path.display(), error = %e, "artifact cleanup failed")
            }
        }
    }
}

fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_dash = true;
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    slug.trim_end_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pilot_common::{EducationLevel, ExperienceBracket};

    fn profile() -> CandidateProfile {
        CandidateProfile {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@example.test".into(),
            phone: "+1 555 0100".into(),
            linkedin: None,
            portfolio: None,
            education: EducationLevel::Master,
            experience: ExperienceBracket::ThreeToFive,
            skills: vec![],
            work_authorized: true,
            requires_visa: false,
            available_from: NaiveDate::from_ymd_opt(2026, 10, 1).unwrap(),
            desired_salary: None,
            referral_source: "Job board".into(),
            cover_letter: "Dear team,".into(),
        }
    }

    #[test]
    fn slugify_collapses_punctuation_runs() {
        assert_eq!(slugify("Acme — Software Engineer!"), "acme-software-engineer");
        assert_eq!(slugify("globex"), "globex");
    }

    #[tokio::test]
    async fn obtain_writes_a_letter_and_release_removes_it() {
        let dir = tempfile::tempdir().unwrap();
        let provider = CoverLetterProvider::new(dir.path(), None);

        let path = provider.obtain(&profile(), "Acme SE").await.unwrap();
        assert_eq!(path, dir.path().join("cover-letter-acme-se.txt"));
        let body = tokio::fs::read_to_string(&path).await.unwrap();
        assert!(body.contains("Application for Acme SE"));
        assert!(body.contains("Ada Lovelace"));

        provider.release().await;
        assert!(!path.exists());
        // Releasing again is a no-op.
        provider.release().await;
    }

    #[tokio::test]
    async fn rendering_failure_degrades_to_the_fallback() {
        let dir = tempfile::tempdir().unwrap();
        // Occupy the output path with a file so the directory can't exist.
        let blocker = dir.path().join("occupied");
        tokio::fs::write(&blocker, b"x").await.unwrap();
        let fallback = dir.path().join("resume.pdf");
        tokio::fs::write(&fallback, b"pdf").await.unwrap();

        let provider = CoverLetterProvider::new(&blocker, Some(fallback.clone()));
        let path = provider.obtain(&profile(), "acme").await.unwrap();
        assert_eq!(path, fallback);

        // The fallback is never tracked, so release leaves it alone.
        provider.release().await;
        assert!(fallback.exists());
    }

    #[tokio::test]
    async fn rendering_failure_without_fallback_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("occupied");
        tokio::fs::write(&blocker, b"x").await.unwrap();

        let provider = CoverLetterProvider::new(&blocker, None);
        assert!(provider.obtain(&profile(), "acme").await.is_err());
    }
}
