//! Acme-shaped handler: a four-step wizard.
//!
//! The form exposes its state through an `active` class on exactly one
//! `.wizard-step` at a time. Advancing is click-the-active-continue-control
//! then a hard wait for the next step's marker; the wizard itself validates
//! required fields, so the engine fills before it asks to advance and treats
//! a missing marker as a failed attempt, not something to retry.

use std::path::Path;
use std::time::Instant;

use async_trait::async_trait;
use pilot_common::{ApplicationResult, CandidateProfile, PilotError, Result};
use pilot_drivers::{PageDriver, Pacing};
use tracing::{debug, warn};

use crate::fields::FieldActor;
use crate::handler::{claims, PageContext, PlatformHandler, WaitBudget};
use crate::waits::wait_until;

const URL_MARKER: &str = "acme";
const TITLE_MARKER: &str = "acme talent";

const STEP_COUNT: u8 = 4;
const ACTIVE_CONTINUE: &str = ".wizard-step.active button.next-step";
const SUBMIT: &str = "#submit-application";
const CONFIRMATION: &str = ".confirmation-banner .confirmation-id";

// Step 1 — contact
const FIRST_NAME: &str = "#first-name";
const LAST_NAME: &str = "#last-name";
const EMAIL: &str = "#email";
const PHONE: &str = "#phone";
const LINKEDIN: &str = "#linkedin";
const PORTFOLIO: &str = "#portfolio";

// Step 2 — qualifications
const EDUCATION: &str = "#education";
const EXPERIENCE: &str = "#experience";
const SKILLS_INPUT: &str = "#skills-input";
const SKILL_SUGGESTIONS: &str = "#skills-suggestions li";

// Step 3 — additional
const WORK_AUTH: &str = "#work-authorized";
const VISA_SECTION: &str = "#visa-section";
const VISA_SPONSORSHIP: &str = "#visa-sponsorship";
const START_DATE: &str = "#start-date";
const SALARY: &str = "#salary";
const REFERRAL: &str = "#referral-source";
const COVER_LETTER: &str = "#cover-letter";
const RESUME_UPLOAD: &str = "#resume-upload";

// Step 4 — review
const TERMS: &str = "#terms-accept";

fn step_selector(step: u8) -> String {
    format!(".wizard-step[data-step='{step}']")
}

/// Which step the DOM currently marks active, if any. The wizard's invariant
/// is exactly one active step; a frozen DOM shows up here as no change.
pub async fn observed_step(page: &dyn PageDriver) -> Result<Option<u8>> {
    for step in 1..=STEP_COUNT {
        if let Some(class) = page.attribute(&step_selector(step), "class").await? {
            if class.split_whitespace().any(|c| c == "active") {
                return Ok(Some(step));
            }
        }
    }
    Ok(None)
}

#[derive(Debug, Default)]
pub struct AcmeHandler {
    budget: WaitBudget,
}

impl AcmeHandler {
    pub fn new(budget: WaitBudget) -> Self {
        Self { budget }
    }

    /// Activate the active step's continue control and hard-wait for the
    /// DOM to mark step `from + 1` active.
    async fn advance(
        &self,
        page: &dyn PageDriver,
        pacing: &dyn Pacing,
        fields: &FieldActor<'_>,
        from: u8,
    ) -> Result<()> {
        let to = from + 1;
        pacing.reading_pause().await;
        fields.hover_then_click(ACTIVE_CONTINUE).await?;
        wait_until(
            &format!("wizard step {to} to become active"),
            self.budget.step_transition,
            false,
            move || async move { Ok(observed_step(page).await? == Some(to)) },
        )
        .await?;
        debug!(target: "handler.acme", step = to, "step transition observed");
        Ok(())
    }

    /// Synchronous typeahead: type the skill, give the suggestion list a
    /// short tolerated window, pick the first suggestion or commit the typed
    /// text directly when nothing showed up.
    async fn add_skill(
        &self,
        page: &dyn PageDriver,
        fields: &FieldActor<'_>,
        skill: &str,
    ) -> Result<()> {
        fields.type_text(SKILLS_INPUT, skill).await?;
        let populated = wait_until(
            "skill suggestions",
            self.budget.suggestion_list,
            true,
            move || async move { Ok(page.count(SKILL_SUGGESTIONS).await? > 0) },
        )
        .await?;
        if populated {
            page.click_nth(SKILL_SUGGESTIONS, 0).await?;
        } else {
            page.press_key(SKILLS_INPUT, "Enter").await?;
        }
        Ok(())
    }

    async fn run(
        &self,
        page: &dyn PageDriver,
        pacing: &dyn Pacing,
        profile: &CandidateProfile,
        artifact: Option<&Path>,
    ) -> Result<String> {
        let fields = FieldActor::new(page, pacing);

        // Step 1: contact.
        fields.type_text(FIRST_NAME, &profile.first_name).await?;
        fields.type_text(LAST_NAME, &profile.last_name).await?;
        fields.type_text(EMAIL, &profile.email).await?;
        fields.type_text(PHONE, &profile.phone).await?;
        if let Some(linkedin) = &profile.linkedin {
            fields.type_text(LINKEDIN, linkedin).await?;
        }
        if let Some(portfolio) = &profile.portfolio {
            fields.type_text(PORTFOLIO, portfolio).await?;
        }
        self.advance(page, pacing, &fields, 1).await?;

        // Step 2: qualifications.
        fields
            .select_option(EDUCATION, profile.education.label())
            .await?;
        fields
            .select_option(EXPERIENCE, profile.experience.label())
            .await?;
        for skill in &profile.skills {
            self.add_skill(page, &fields, skill).await?;
        }
        self.advance(page, pacing, &fields, 2).await?;

        // Step 3: additional. The visa block only exists for authorized
        // candidates and appears asynchronously after the checkbox settles.
        fields
            .ensure_checked(WORK_AUTH, profile.work_authorized)
            .await?;
        if profile.work_authorized {
            wait_until(
                "visa sponsorship section",
                self.budget.conditional_field,
                false,
                move || async move { page.is_visible(VISA_SECTION).await.map_err(PilotError::from) },
            )
            .await?;
            fields
                .ensure_checked(VISA_SPONSORSHIP, profile.requires_visa)
                .await?;
        }
        fields.set_date(START_DATE, profile.available_from).await?;
        if let Some(salary) = &profile.desired_salary {
            fields.type_text(SALARY, salary).await?;
        }
        fields
            .select_option(REFERRAL, &profile.referral_source)
            .await?;
        fields.type_text(COVER_LETTER, &profile.cover_letter).await?;
        if let Some(path) = artifact {
            fields.attach_file(RESUME_UPLOAD, path).await?;
        }
        self.advance(page, pacing, &fields, 3).await?;

        // Step 4: review, terms, final submit.
        pacing.reading_pause().await;
        fields.ensure_checked(TERMS, true).await?;
        fields.hover_then_click(SUBMIT).await?;

        wait_until(
            "submission confirmation",
            self.budget.confirmation,
            false,
            move || async move { page.exists(CONFIRMATION).await.map_err(PilotError::from) },
        )
        .await?;
        Ok(page.text(CONFIRMATION).await?)
    }
}

#[async_trait]
impl PlatformHandler for AcmeHandler {
    fn name(&self) -> &'static str {
        "acme-wizard"
    }

    fn detect(&self, ctx: &PageContext) -> bool {
        claims(ctx, URL_MARKER, TITLE_MARKER)
    }

    async fn fill_and_submit(
        &self,
        page: &dyn PageDriver,
        pacing: &dyn Pacing,
        profile: &CandidateProfile,
        artifact: Option<&Path>,
    ) -> ApplicationResult {
        let started = Instant::now();
        match self.run(page, pacing, profile, artifact).await {
            Ok(confirmation_id) => {
                debug!(target: "handler.acme", %confirmation_id, "submission confirmed");
                ApplicationResult::succeeded(
                    confirmation_id,
                    artifact.map(Path::to_path_buf),
                    started.elapsed(),
                )
            }
            Err(e) => {
                warn!(target: "handler.acme", error = %e, "attempt failed");
                ApplicationResult::failed(e.to_string(), started.elapsed())
            }
        }
    }
}
