//! Shared platform-handler contract.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use pilot_common::{ApplicationResult, CandidateProfile, Result};
use pilot_drivers::{PageDriver, Pacing};

/// Cheap snapshot of the live page used for detection only.
#[derive(Debug, Clone)]
pub struct PageContext {
    pub url: String,
    pub title: String,
}

impl PageContext {
    pub async fn read(page: &dyn PageDriver) -> Result<Self> {
        Ok(Self {
            url: page.current_url().await?,
            title: page.title().await?,
        })
    }
}

/// Upper bounds for every class of wait a handler performs. Handlers carry
/// defaults; tests shrink these so expiry paths run in milliseconds.
#[derive(Debug, Clone)]
pub struct WaitBudget {
    /// Hard: the wizard must mark the next step active within this bound.
    pub step_transition: Duration,
    /// Hard: a conditionally-appearing field container must become visible.
    pub conditional_field: Duration,
    /// Best-effort: synchronous suggestion list population.
    pub suggestion_list: Duration,
    /// Best-effort: the async typeahead's loading indicator.
    pub loading_indicator: Duration,
    /// Hard: the async typeahead's result list.
    pub result_list: Duration,
    /// Hard: the post-submit confirmation element.
    pub confirmation: Duration,
}

impl Default for WaitBudget {
    fn default() -> Self {
        Self {
            step_transition: Duration::from_secs(10),
            conditional_field: Duration::from_secs(8),
            suggestion_list: Duration::from_secs(2),
            loading_indicator: Duration::from_millis(1_500),
            result_list: Duration::from_secs(10),
            confirmation: Duration::from_secs(15),
        }
    }
}

/// One form layout the engine knows how to complete. Stateless across
/// invocations; any per-run state lives on the stack of `fill_and_submit`.
#[async_trait]
pub trait PlatformHandler: Send + Sync {
    fn name(&self) -> &'static str;

    /// Whether this handler claims the page. Must be cheap and free of side
    /// effects; a URL-substring hit or a title-substring hit suffices.
    fn detect(&self, ctx: &PageContext) -> bool;

    /// Populate every required field group, submit, and read the
    /// confirmation. Never returns an error to the caller: anything raised
    /// during the sequence is folded into a failure result carrying the
    /// error's message and the elapsed time.
    async fn fill_and_submit(
        &self,
        page: &dyn PageDriver,
        pacing: &dyn Pacing,
        profile: &CandidateProfile,
        artifact: Option<&Path>,
    ) -> ApplicationResult;
}

/// Detection helper shared by the concrete handlers: URL marker first, page
/// title as the fallback, both case-insensitive.
pub(crate) fn claims(ctx: &PageContext, url_marker: &str, title_marker: &str) -> bool {
    ctx.url.to_lowercase().contains(url_marker) || ctx.title.to_lowercase().contains(title_marker)
}
