//! Globex-shaped handler: an accordion-sectioned single page.
//!
//! Sections open independently and stay open; the only structural invariant
//! is that every section has been visited before submit. The hard part is
//! the asynchronous typeahead: results arrive after a variable network delay
//! behind a loading indicator, and their order is randomized per request, so
//! resolution scans the delivered list instead of assuming positions.

use std::path::Path;
use std::time::Instant;

use async_trait::async_trait;
use pilot_common::{ApplicationResult, CandidateProfile, PilotError, Result};
use pilot_drivers::{PageDriver, Pacing};
use tracing::{debug, warn};

use crate::fields::FieldActor;
use crate::handler::{claims, PageContext, PlatformHandler, WaitBudget};
use crate::waits::wait_until;

const URL_MARKER: &str = "globex";
const TITLE_MARKER: &str = "globex careers";

/// One accordion section: activation header plus the collapsible body that
/// carries an `open` class while expanded.
#[derive(Debug, Clone, Copy)]
struct Section {
    name: &'static str,
    header: &'static str,
    body: &'static str,
}

const CONTACT: Section = Section {
    name: "contact",
    header: "#gx-section-contact-header",
    body: "#gx-section-contact",
};
const QUALIFICATIONS: Section = Section {
    name: "qualifications",
    header: "#gx-section-qualifications-header",
    body: "#gx-section-qualifications",
};
const ADDITIONAL: Section = Section {
    name: "additional",
    header: "#gx-section-additional-header",
    body: "#gx-section-additional",
};

// Contact
const FIRST_NAME: &str = "#gx-first-name";
const LAST_NAME: &str = "#gx-last-name";
const EMAIL: &str = "#gx-email";
const PHONE: &str = "#gx-phone";
const LINKEDIN: &str = "#gx-linkedin";

// Qualifications
const EDUCATION: &str = "#gx-education";
const EXPERIENCE: &str = "#gx-experience";

/// Canonical skill name (lowercased) to toggle-chip element. Skills the form
/// has no chip for are skipped, not errors.
const SKILL_TOGGLES: &[(&str, &str)] = &[
    ("rust", "#gx-skill-rust"),
    ("python", "#gx-skill-python"),
    ("javascript", "#gx-skill-javascript"),
    ("typescript", "#gx-skill-typescript"),
    ("go", "#gx-skill-go"),
    ("sql", "#gx-skill-sql"),
    ("docker", "#gx-skill-docker"),
    ("kubernetes", "#gx-skill-kubernetes"),
    ("aws", "#gx-skill-aws"),
];

// Additional
const WORK_AUTH: &str = "#gx-work-auth";
const VISA_BLOCK: &str = "#gx-visa-block";
const VISA_TOGGLE: &str = "#gx-visa-required";
const TOGGLE_STATE_ATTR: &str = "data-checked";
const START_DATE: &str = "#gx-start-date";
const SALARY_RANGE: &str = "#gx-salary-range";
const COVER_LETTER: &str = "#gx-cover-letter";
const RESUME_UPLOAD: &str = "#gx-resume";

const SUBMIT: &str = "#gx-submit";
const CONFIRMATION: &str = "#gx-confirmation .ref-code";

/// Selector group for one async typeahead widget.
#[derive(Debug, Clone, Copy)]
pub struct TypeaheadSelectors {
    pub input: &'static str,
    pub loading: &'static str,
    pub container: &'static str,
    pub items: &'static str,
}

pub const REFERRAL_TYPEAHEAD: TypeaheadSelectors = TypeaheadSelectors {
    input: "#gx-referral-input",
    loading: "#gx-referral-loading",
    container: "#gx-referral-results",
    items: "#gx-referral-results li",
};

async fn has_open_marker(page: &dyn PageDriver, selector: &str) -> Result<bool> {
    Ok(page
        .attribute(selector, "class")
        .await?
        .map(|c| c.split_whitespace().any(|x| x == "open"))
        .unwrap_or(false))
}

/// Resolve one async typeahead: type the query, tolerate the loading
/// indicator never showing (the response can outrun it), then hard-wait for
/// the result container to be open with at least one non-empty item. Scan
/// for the first case-insensitive substring match; no match falls back to
/// the first delivered item so the submission still proceeds.
pub async fn resolve_async_typeahead(
    page: &dyn PageDriver,
    pacing: &dyn Pacing,
    budget: &WaitBudget,
    widget: &TypeaheadSelectors,
    query: &str,
) -> Result<()> {
    let fields = FieldActor::new(page, pacing);
    fields.type_text(widget.input, query).await?;

    let loading = widget.loading;
    wait_until(
        "typeahead loading indicator",
        budget.loading_indicator,
        true,
        move || async move { page.exists(loading).await.map_err(PilotError::from) },
    )
    .await?;

    let (container, items) = (widget.container, widget.items);
    wait_until(
        "typeahead results",
        budget.result_list,
        false,
        move || async move {
            if !has_open_marker(page, container).await? {
                return Ok(false);
            }
            let texts = page.texts(items).await?;
            Ok(texts.iter().any(|t| !t.is_empty()))
        },
    )
    .await?;

    let texts = page.texts(widget.items).await?;
    let needle = query.to_lowercase();
    let index = texts
        .iter()
        .position(|t| t.to_lowercase().contains(&needle))
        .unwrap_or(0);
    let picked = texts
        .get(index)
        .ok_or_else(|| anyhow::anyhow!("typeahead result list emptied between poll and pick"))?;
    debug!(
        target: "handler.globex",
        query,
        %picked,
        index,
        "typeahead resolved"
    );
    page.click_nth(widget.items, index).await?;
    Ok(())
}

#[derive(Debug, Default)]
pub struct GlobexHandler {
    budget: WaitBudget,
}

impl GlobexHandler {
    pub fn new(budget: WaitBudget) -> Self {
        Self { budget }
    }

    /// Open a section on first use. Already-open sections are left alone;
    /// the engine never closes one.
    async fn open_section(
        &self,
        page: &dyn PageDriver,
        pacing: &dyn Pacing,
        fields: &FieldActor<'_>,
        section: Section,
    ) -> Result<()> {
        if !has_open_marker(page, section.body).await? {
            debug!(target: "handler.globex", section = section.name, "expanding section");
            fields.hover_then_click(section.header).await?;
            pacing.settle().await;
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

        self.open_section(page, pacing, &fields, CONTACT).await?;
        fields.type_text(FIRST_NAME, &profile.first_name).await?;
        fields.type_text(LAST_NAME, &profile.last_name).await?;
        fields.type_text(EMAIL, &profile.email).await?;
        fields.type_text(PHONE, &profile.phone).await?;
        if let Some(linkedin) = &profile.linkedin {
            fields.type_text(LINKEDIN, linkedin).await?;
        }

        pacing.reading_pause().await;
        self.open_section(page, pacing, &fields, QUALIFICATIONS)
            .await?;
        fields
            .select_option(EDUCATION, profile.education.label())
            .await?;
        fields
            .select_option(EXPERIENCE, profile.experience.label())
            .await?;
        for skill in &profile.skills {
            let canonical = skill.trim().to_lowercase();
            match SKILL_TOGGLES.iter().find(|(name, _)| *name == canonical) {
                Some((_, selector)) => {
                    fields
                        .ensure_toggled(selector, TOGGLE_STATE_ATTR, true)
                        .await?;
                }
                None => {
                    debug!(target: "handler.globex", skill = %skill, "no chip for skill; skipping")
                }
            }
        }

        pacing.reading_pause().await;
        self.open_section(page, pacing, &fields, ADDITIONAL).await?;
        fields
            .ensure_toggled(WORK_AUTH, TOGGLE_STATE_ATTR, profile.work_authorized)
            .await?;
        if profile.work_authorized {
            // The visa block renders only once work authorization is on.
            wait_until(
                "visa block",
                self.budget.conditional_field,
                false,
                move || async move { page.is_visible(VISA_BLOCK).await.map_err(PilotError::from) },
            )
            .await?;
            fields
                .ensure_toggled(VISA_TOGGLE, TOGGLE_STATE_ATTR, profile.requires_visa)
                .await?;
        }
        resolve_async_typeahead(
            page,
            pacing,
            &self.budget,
            &REFERRAL_TYPEAHEAD,
            &profile.referral_source,
        )
        .await?;
        fields.set_date(START_DATE, profile.available_from).await?;
        if let Some(salary) = &profile.desired_salary {
            // Range control: direct numeric assignment, not keystrokes.
            let amount: String = salary.chars().filter(char::is_ascii_digit).collect();
            if !amount.is_empty() {
                fields.set_range(SALARY_RANGE, &amount).await?;
            }
        }
        fields.type_text(COVER_LETTER, &profile.cover_letter).await?;
        if let Some(path) = artifact {
            fields.attach_file(RESUME_UPLOAD, path).await?;
        }

        pacing.reading_pause().await;
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
impl PlatformHandler for GlobexHandler {
    fn name(&self) -> &'static str {
        "globex-accordion"
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
                debug!(target: "handler.globex", %confirmation_id, "submission confirmed");
                ApplicationResult::succeeded(
                    confirmation_id,
                    artifact.map(Path::to_path_buf),
                    started.elapsed(),
                )
            }
            Err(e) => {
                warn!(target: "handler.globex", error = %e, "attempt failed");
                ApplicationResult::failed(e.to_string(), started.elapsed())
            }
        }
    }
}
