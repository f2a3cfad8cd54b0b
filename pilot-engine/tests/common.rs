//! Shared test scaffolding: a scripted in-memory [`PageDriver`] fake plus
//! pre-built form fixtures for both platform layouts.
//!
//! The fake treats selectors as opaque keys, records every interaction in a
//! log, and lets a scenario attach click hooks (step advancement, section
//! expansion, confirmation reveal) and poll-delayed appearances so the
//! engine's wait paths are exercised deterministically.
#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use pilot_common::{CandidateProfile, EducationLevel, ExperienceBracket};
use pilot_drivers::{PageDriver, PageFactory};
use pilot_engine::WaitBudget;
use std::time::Duration;

pub type ClickHook = Box<dyn FnMut(&mut Inner) + Send>;

#[derive(Debug, Clone, Default)]
pub struct FakeElement {
    pub text: String,
    pub value: String,
    pub checked: bool,
    pub visible: bool,
    pub attrs: HashMap<String, String>,
    pub options: Vec<String>,
}

impl FakeElement {
    pub fn visible() -> Self {
        Self {
            visible: true,
            ..Self::default()
        }
    }

    pub fn with_class(mut self, class: &str) -> Self {
        self.attrs.insert("class".into(), class.into());
        self
    }

    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_options(mut self, options: &[&str]) -> Self {
        self.options = options.iter().map(|s| s.to_string()).collect();
        self
    }
}

#[derive(Default)]
pub struct Inner {
    pub url: String,
    pub title: String,
    pub elements: HashMap<String, FakeElement>,
    pub lists: HashMap<String, Vec<String>>,
    /// Selector -> polls remaining before the engine may observe it.
    pub delays: HashMap<String, usize>,
    pub hooks: HashMap<String, ClickHook>,
    pub log: Vec<String>,
}

impl Inner {
    /// Consume one poll tick for `selector`; false while still hidden.
    fn ready(&mut self, selector: &str) -> bool {
        match self.delays.get_mut(selector) {
            Some(remaining) if *remaining > 0 => {
                *remaining -= 1;
                false
            }
            _ => true,
        }
    }

    fn element_mut(&mut self, selector: &str) -> &mut FakeElement {
        self.elements
            .entry(selector.to_string())
            .or_insert_with(FakeElement::visible)
    }
}

/// Cloneable handle onto one scripted page; clones share state so a test can
/// keep inspecting the log after handing the page to the engine.
#[derive(Clone, Default)]
pub struct FakePage {
    inner: Arc<Mutex<Inner>>,
}

impl FakePage {
    pub fn new(url: &str, title: &str) -> Self {
        let page = Self::default();
        {
            let mut inner = page.inner.lock().unwrap();
            inner.url = url.into();
            inner.title = title.into();
        }
        page
    }

    pub fn put(&self, selector: &str, element: FakeElement) -> &Self {
        self.inner
            .lock()
            .unwrap()
            .elements
            .insert(selector.into(), element);
        self
    }

    pub fn put_list(&self, selector: &str, items: &[&str]) -> &Self {
        self.inner
            .lock()
            .unwrap()
            .lists
            .insert(selector.into(), items.iter().map(|s| s.to_string()).collect());
        self
    }

    /// Keep `selector` unobservable for the next `polls` queries.
    pub fn delay(&self, selector: &str, polls: usize) -> &Self {
        self.inner
            .lock()
            .unwrap()
            .delays
            .insert(selector.into(), polls);
        self
    }

    pub fn on_click(&self, selector: &str, hook: ClickHook) -> &Self {
        self.inner.lock().unwrap().hooks.insert(selector.into(), hook);
        self
    }

    pub fn log(&self) -> Vec<String> {
        self.inner.lock().unwrap().log.clone()
    }

    pub fn log_contains(&self, needle: &str) -> bool {
        self.inner
            .lock()
            .unwrap()
            .log
            .iter()
            .any(|line| line.contains(needle))
    }

    pub fn value_of(&self, selector: &str) -> Option<String> {
        self.inner
            .lock()
            .unwrap()
            .elements
            .get(selector)
            .map(|el| el.value.clone())
    }

    fn record(&self, line: String) {
        self.inner.lock().unwrap().log.push(line);
    }

    fn run_click(&self, selector: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.log.push(format!("click {selector}"));

        // Checkbox/toggle semantics: a click flips whatever boolean state
        // the element carries.
        if let Some(el) = inner.elements.get_mut(selector) {
            el.checked = !el.checked;
            if let Some(state) = el.attrs.get_mut("data-checked") {
                *state = if *state == "true" { "false" } else { "true" }.to_string();
            }
        }

        if let Some(mut hook) = inner.hooks.remove(selector) {
            hook(&mut inner);
            inner.hooks.insert(selector.into(), hook);
        }
    }
}

#[async_trait]
impl PageDriver for FakePage {
    async fn navigate(&self, url: &str) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.log.push(format!("navigate {url}"));
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self.inner.lock().unwrap().url.clone())
    }

    async fn title(&self) -> Result<String> {
        Ok(self.inner.lock().unwrap().title.clone())
    }

    async fn exists(&self, selector: &str) -> Result<bool> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.ready(selector) {
            return Ok(false);
        }
        Ok(inner.elements.contains_key(selector)
            || inner.lists.get(selector).is_some_and(|l| !l.is_empty()))
    }

    async fn is_visible(&self, selector: &str) -> Result<bool> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.ready(selector) {
            return Ok(false);
        }
        Ok(inner.elements.get(selector).map(|el| el.visible).unwrap_or(false))
    }

    async fn click(&self, selector: &str) -> Result<()> {
        self.run_click(selector);
        Ok(())
    }

    async fn click_nth(&self, selector: &str, index: usize) -> Result<()> {
        self.record(format!("click_nth {selector} {index}"));
        Ok(())
    }

    async fn hover(&self, selector: &str) -> Result<()> {
        self.record(format!("hover {selector}"));
        Ok(())
    }

    async fn scroll_into_view(&self, selector: &str) -> Result<()> {
        self.record(format!("scroll {selector}"));
        Ok(())
    }

    async fn type_char(&self, selector: &str, ch: char) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.log.push(format!("type {selector} {ch}"));
        inner.element_mut(selector).value.push(ch);
        Ok(())
    }

    async fn press_key(&self, selector: &str, key: &str) -> Result<()> {
        self.record(format!("press {selector} {key}"));
        Ok(())
    }

    async fn set_value(&self, selector: &str, value: &str) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.log.push(format!("set_value {selector} {value}"));
        inner.element_mut(selector).value = value.to_string();
        Ok(())
    }

    async fn set_files(&self, selector: &str, path: &Path) -> Result<()> {
        self.record(format!("set_files {selector} {}", path.display()));
        Ok(())
    }

    async fn attribute(&self, selector: &str, name: &str) -> Result<Option<String>> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.ready(selector) {
            return Ok(None);
        }
        Ok(inner
            .elements
            .get(selector)
            .and_then(|el| el.attrs.get(name))
            .cloned())
    }

    async fn text(&self, selector: &str) -> Result<String> {
        let inner = self.inner.lock().unwrap();
        inner
            .elements
            .get(selector)
            .map(|el| el.text.trim().to_string())
            .ok_or_else(|| anyhow!("element not found: {selector}"))
    }

    async fn texts(&self, selector: &str) -> Result<Vec<String>> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.ready(selector) {
            return Ok(Vec::new());
        }
        Ok(inner.lists.get(selector).cloned().unwrap_or_default())
    }

    async fn count(&self, selector: &str) -> Result<usize> {
        self.texts(selector).await.map(|t| t.len())
    }

    async fn is_checked(&self, selector: &str) -> Result<bool> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .elements
            .get(selector)
            .map(|el| el.checked)
            .unwrap_or(false))
    }

    async fn option_labels(&self, selector: &str) -> Result<Vec<String>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .elements
            .get(selector)
            .map(|el| el.options.clone())
            .unwrap_or_default())
    }

    async fn select_option_label(&self, selector: &str, label: &str) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        let known = inner
            .elements
            .get(selector)
            .is_some_and(|el| el.options.iter().any(|o| o == label));
        if !known {
            return Err(anyhow!("option {label:?} not present in {selector}"));
        }
        inner.log.push(format!("select_label {selector} {label}"));
        inner.element_mut(selector).value = label.to_string();
        Ok(())
    }

    async fn select_option_value(&self, selector: &str, value: &str) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        let known = inner
            .elements
            .get(selector)
            .is_some_and(|el| el.options.iter().any(|o| o == value));
        if !known {
            return Err(anyhow!("value {value:?} rejected by {selector}"));
        }
        inner.log.push(format!("select_value {selector} {value}"));
        inner.element_mut(selector).value = value.to_string();
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.record("close".to_string());
        Ok(())
    }
}

/// Factory handing out pre-built pages in order; keeps clones so the test
/// can inspect each page after the run.
#[derive(Default)]
pub struct FakeFactory {
    pages: Mutex<Vec<FakePage>>,
}

impl FakeFactory {
    pub fn with_pages(pages: Vec<FakePage>) -> Self {
        Self {
            pages: Mutex::new(pages),
        }
    }
}

#[async_trait]
impl PageFactory for FakeFactory {
    async fn open(&self) -> Result<Box<dyn PageDriver>> {
        let mut pages = self.pages.lock().unwrap();
        if pages.is_empty() {
            return Err(anyhow!("no scripted page left"));
        }
        Ok(Box::new(pages.remove(0)))
    }
}

pub fn profile() -> CandidateProfile {
    CandidateProfile {
        first_name: "Ada".into(),
        last_name: "Lovelace".into(),
        email: "ada@example.test".into(),
        phone: "+1 555 0100".into(),
        linkedin: Some("https://linkedin.test/in/ada".into()),
        portfolio: None,
        education: EducationLevel::Master,
        experience: ExperienceBracket::ThreeToFive,
        skills: vec!["Rust".into(), "SQL".into()],
        work_authorized: true,
        requires_visa: false,
        available_from: NaiveDate::from_ymd_opt(2026, 10, 1).unwrap(),
        desired_salary: Some("95,000".into()),
        referral_source: "Job board".into(),
        cover_letter: "Dear team, I build reliable systems.".into(),
    }
}

/// Millisecond-scale wait bounds so expiry paths don't slow the suite down.
pub fn tiny_budget() -> WaitBudget {
    WaitBudget {
        step_transition: Duration::from_millis(400),
        conditional_field: Duration::from_millis(400),
        suggestion_list: Duration::from_millis(250),
        loading_indicator: Duration::from_millis(150),
        result_list: Duration::from_millis(400),
        confirmation: Duration::from_millis(400),
    }
}

fn step_selector(step: u8) -> String {
    format!(".wizard-step[data-step='{step}']")
}

/// A complete Acme wizard whose steps advance on the continue control and
/// whose submit reveals a confirmation banner after a couple of polls.
pub fn acme_form_page(confirmation: &str) -> FakePage {
    let page = acme_frozen_form_page();

    page.on_click(
        ".wizard-step.active button.next-step",
        Box::new(|inner: &mut Inner| {
            let current = (1..=4u8).find(|n| {
                inner
                    .elements
                    .get(&step_selector(*n))
                    .and_then(|el| el.attrs.get("class"))
                    .is_some_and(|c| c.split_whitespace().any(|x| x == "active"))
            });
            if let Some(n) = current {
                if n < 4 {
                    inner
                        .element_mut(&step_selector(n))
                        .attrs
                        .insert("class".into(), "wizard-step".into());
                    inner
                        .element_mut(&step_selector(n + 1))
                        .attrs
                        .insert("class".into(), "wizard-step active".into());
                }
            }
        }),
    );

    let text = confirmation.to_string();
    page.on_click(
        "#submit-application",
        Box::new(move |inner: &mut Inner| {
            inner.elements.insert(
                ".confirmation-banner .confirmation-id".into(),
                FakeElement::visible().with_text(&text),
            );
            inner
                .delays
                .insert(".confirmation-banner .confirmation-id".into(), 1);
        }),
    );

    page
}

/// Same wizard, but the DOM never reacts to the continue control: the
/// active marker stays on step 1 forever.
pub fn acme_frozen_form_page() -> FakePage {
    let page = FakePage::new(
        "https://apply.acme.test/software-engineer",
        "Acme Talent Portal",
    );

    page.put(
        &step_selector(1),
        FakeElement::visible().with_class("wizard-step active"),
    );
    for n in 2..=4 {
        page.put(&step_selector(n), FakeElement::visible().with_class("wizard-step"));
    }
    page.put(".wizard-step.active button.next-step", FakeElement::visible());

    page.put(
        "#education",
        FakeElement::visible().with_options(&[
            "High school diploma",
            "Associate degree",
            "Bachelor's degree",
            "Master's degree",
            "Doctorate",
        ]),
    );
    page.put(
        "#experience",
        FakeElement::visible().with_options(&[
            "Less than 1 year",
            "1-3 years",
            "3-5 years",
            "5-10 years",
            "10+ years",
        ]),
    );
    page.put_list("#skills-suggestions li", &["Rust", "SQL"]);
    page.put(
        "#referral-source",
        FakeElement::visible().with_options(&["Job board", "Referral", "Other"]),
    );
    page.put("#work-authorized", FakeElement::visible());
    page.put("#terms-accept", FakeElement::visible());
    page.put("#submit-application", FakeElement::visible());

    // The visa block appears only after the work-authorization box is
    // ticked, mirroring the real form's conditional rendering.
    page.on_click(
        "#work-authorized",
        Box::new(|inner: &mut Inner| {
            let authorized = inner
                .elements
                .get("#work-authorized")
                .map(|el| el.checked)
                .unwrap_or(false);
            if authorized {
                inner
                    .elements
                    .insert("#visa-section".into(), FakeElement::visible());
                inner.delays.insert("#visa-section".into(), 1);
            }
        }),
    );

    page
}

fn accordion_section(page: &FakePage, body: &str, header: &str) {
    page.put(body, FakeElement::visible().with_class("accordion-section"));
    page.put(header, FakeElement::visible());
    let body = body.to_string();
    page.on_click(
        header,
        Box::new(move |inner: &mut Inner| {
            inner
                .element_mut(&body)
                .attrs
                .insert("class".into(), "accordion-section open".into());
        }),
    );
}

/// A complete Globex accordion form, typeahead results included.
pub fn globex_form_page(confirmation: &str, referral_results: &[&str]) -> FakePage {
    let page = FakePage::new("https://globex.test/apply/backend", "Globex Careers");

    accordion_section(&page, "#gx-section-contact", "#gx-section-contact-header");
    accordion_section(
        &page,
        "#gx-section-qualifications",
        "#gx-section-qualifications-header",
    );
    accordion_section(&page, "#gx-section-additional", "#gx-section-additional-header");

    page.put(
        "#gx-education",
        FakeElement::visible().with_options(&[
            "High school diploma",
            "Associate degree",
            "Bachelor's degree",
            "Master's degree",
            "Doctorate",
        ]),
    );
    page.put(
        "#gx-experience",
        FakeElement::visible().with_options(&[
            "Less than 1 year",
            "1-3 years",
            "3-5 years",
            "5-10 years",
            "10+ years",
        ]),
    );
    for chip in ["#gx-skill-rust", "#gx-skill-sql"] {
        page.put(chip, FakeElement::visible().with_attr("data-checked", "false"));
    }

    page.put(
        "#gx-work-auth",
        FakeElement::visible().with_attr("data-checked", "false"),
    );
    page.on_click(
        "#gx-work-auth",
        Box::new(|inner: &mut Inner| {
            let on = inner
                .elements
                .get("#gx-work-auth")
                .and_then(|el| el.attrs.get("data-checked"))
                .is_some_and(|v| v == "true");
            if on {
                inner
                    .elements
                    .insert("#gx-visa-block".into(), FakeElement::visible());
                inner.elements.insert(
                    "#gx-visa-required".into(),
                    FakeElement::visible().with_attr("data-checked", "false"),
                );
                inner.delays.insert("#gx-visa-block".into(), 1);
            }
        }),
    );

    wire_referral_typeahead(&page, referral_results, 2);

    let text = confirmation.to_string();
    page.on_click(
        "#gx-submit",
        Box::new(move |inner: &mut Inner| {
            inner.elements.insert(
                "#gx-confirmation .ref-code".into(),
                FakeElement::visible().with_text(&text),
            );
        }),
    );

    page
}

/// Attach the referral typeahead widget: a loading indicator that shows up
/// immediately and a result container that opens after `result_delay` polls
/// with the given items.
pub fn wire_referral_typeahead(page: &FakePage, results: &[&str], result_delay: usize) {
    page.put("#gx-referral-loading", FakeElement::visible());
    page.put(
        "#gx-referral-results",
        FakeElement::visible().with_class("typeahead-results open"),
    );
    page.put_list("#gx-referral-results li", results);
    page.delay("#gx-referral-results", result_delay);
}
