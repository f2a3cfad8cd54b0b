//! Field interaction primitives.
//!
//! Every primitive follows the same shape: make the element reachable
//! (scroll into view), pre-action delay, the effect itself, post-action
//! delay. Text entry is routed through the keystroke pacing so typing speed
//! varies per character class; state-bearing controls (checkboxes, toggles)
//! read their current state first and only act on disagreement.

use std::path::Path;

use chrono::NaiveDate;
use pilot_common::{PilotError, Result};
use pilot_drivers::{PageDriver, Pacing};

/// Pacing-aware wrapper over the driver's element operations. Borrowed per
/// fill sequence; holds no state of its own.
pub struct FieldActor<'a> {
    page: &'a dyn PageDriver,
    pacing: &'a dyn Pacing,
}

impl<'a> FieldActor<'a> {
    pub fn new(page: &'a dyn PageDriver, pacing: &'a dyn Pacing) -> Self {
        Self { page, pacing }
    }

    async fn approach(&self, selector: &str) -> Result<()> {
        self.page.scroll_into_view(selector).await?;
        self.pacing.action_gap().await;
        Ok(())
    }

    /// Type `text` into the element one keystroke at a time.
    pub async fn type_text(&self, selector: &str, text: &str) -> Result<()> {
        self.approach(selector).await?;
        self.page.click(selector).await?;
        for ch in text.chars() {
            self.page.type_char(selector, ch).await?;
            self.pacing.keystroke_gap(ch).await;
        }
        self.pacing.action_gap().await;
        Ok(())
    }

    /// Hover the element, linger, then click. The gap between pointer-over
    /// and activation is always present.
    pub async fn hover_then_click(&self, selector: &str) -> Result<()> {
        self.page.scroll_into_view(selector).await?;
        self.page.hover(selector).await?;
        self.pacing.hover_gap().await;
        self.page.click(selector).await?;
        self.pacing.action_gap().await;
        Ok(())
    }

    /// Pick an option on a `<select>` by fuzzy-matching `input` against the
    /// option labels; falls back to treating `input` as a literal option
    /// value. A rejected fallback surfaces as [`PilotError::FieldResolution`].
    pub async fn select_option(&self, selector: &str, input: &str) -> Result<()> {
        self.approach(selector).await?;
        let labels = self.page.option_labels(selector).await?;
        match resolve_option(input, &labels) {
            Some(index) => {
                self.page
                    .select_option_label(selector, &labels[index])
                    .await?
            }
            None => self
                .page
                .select_option_value(selector, input)
                .await
                .map_err(|_| PilotError::FieldResolution {
                    field: selector.to_string(),
                    input: input.to_string(),
                })?,
        }
        self.pacing.action_gap().await;
        Ok(())
    }

    /// Bring a checkbox/radio to `want`; does nothing when the element is
    /// already in the requested state.
    pub async fn ensure_checked(&self, selector: &str, want: bool) -> Result<()> {
        self.approach(selector).await?;
        if self.page.is_checked(selector).await? != want {
            self.page.hover(selector).await?;
            self.pacing.hover_gap().await;
            self.page.click(selector).await?;
        }
        self.pacing.action_gap().await;
        Ok(())
    }

    /// Bring a toggle-style control to `want`, reading its current boolean
    /// state from `attr`. Returns whether a flip was performed.
    pub async fn ensure_toggled(&self, selector: &str, attr: &str, want: bool) -> Result<bool> {
        self.approach(selector).await?;
        let current = self
            .page
            .attribute(selector, attr)
            .await?
            .map(|v| v == "true")
            .unwrap_or(false);
        let flipped = current != want;
        if flipped {
            self.page.hover(selector).await?;
            self.pacing.hover_gap().await;
            self.page.click(selector).await?;
        }
        self.pacing.action_gap().await;
        Ok(flipped)
    }

    /// Attach a local file to a file input.
    pub async fn attach_file(&self, selector: &str, path: &Path) -> Result<()> {
        self.approach(selector).await?;
        self.page.set_files(selector, path).await?;
        self.pacing.action_gap().await;
        Ok(())
    }

    /// Set a date input by direct assignment (date pickers reject synthetic
    /// keystrokes more often than they accept them).
    pub async fn set_date(&self, selector: &str, date: NaiveDate) -> Result<()> {
        self.approach(selector).await?;
        self.page
            .set_value(selector, &date.format("%Y-%m-%d").to_string())
            .await?;
        self.pacing.action_gap().await;
        Ok(())
    }

    /// Set a numeric range control by direct assignment plus synthetic
    /// input/change notification.
    pub async fn set_range(&self, selector: &str, value: &str) -> Result<()> {
        self.approach(selector).await?;
        self.page.set_value(selector, value).await?;
        self.pacing.action_gap().await;
        Ok(())
    }
}

/// Fuzzy option resolution: exact case-insensitive equality, then substring
/// containment in either direction, then the query's first word as a
/// substring. Returns the index of the first label that matches, or `None`
/// when the caller should fall back to the literal option value.
pub fn resolve_option(input: &str, labels: &[String]) -> Option<usize> {
    let needle = input.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }

    labels
        .iter()
        .position(|l| l.trim().to_lowercase() == needle)
        .or_else(|| {
            labels
                .iter()
                .position(|l| l.to_lowercase().contains(&needle))
        })
        .or_else(|| {
            labels.iter().position(|l| {
                let hay = l.trim().to_lowercase();
                !hay.is_empty() && needle.contains(&hay)
            })
        })
        .or_else(|| {
            let first_word = needle.split_whitespace().next()?;
            labels
                .iter()
                .position(|l| l.to_lowercase().contains(first_word))
        })
}
