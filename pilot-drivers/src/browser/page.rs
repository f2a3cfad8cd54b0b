//! WebDriver-backed implementation of [`PageDriver`].
//!
//! Thin mapping from the engine's selector-addressed operations onto a
//! `fantoccini` session. Anything WebDriver has no first-class command for
//! (visibility, hover events, direct value assignment) goes through an
//! injected script instead.

use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use fantoccini::elements::Element;
use fantoccini::key::Key;
use fantoccini::{Client, Locator};
use serde_json::json;

use crate::browser::traits::PageDriver;

/// How long [`PageDriver::navigate`] waits for the document to settle.
const LOAD_TIMEOUT: Duration = Duration::from_secs(30);
const LOAD_POLL: Duration = Duration::from_millis(250);

pub struct WebdriverPage {
    client: Client,
}

impl WebdriverPage {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    async fn element(&self, selector: &str) -> Result<Element> {
        self.client
            .find(Locator::Css(selector))
            .await
            .map_err(|e| anyhow!("element not found: {selector}: {e}"))
    }

    async fn elements(&self, selector: &str) -> Result<Vec<Element>> {
        Ok(self.client.find_all(Locator::Css(selector)).await?)
    }

    async fn run_on(&self, selector: &str, body: &str) -> Result<serde_json::Value> {
        let script = format!(
            "const el = document.querySelector(arguments[0]); if (!el) return null; {body}"
        );
        Ok(self.client.execute(&script, vec![json!(selector)]).await?)
    }
}

#[async_trait]
impl PageDriver for WebdriverPage {
    async fn navigate(&self, url: &str) -> Result<()> {
        self.client.goto(url).await?;

        // goto resolves on navigation; keep polling until the document
        // itself reports complete so late-loading forms are actually there.
        let started = Instant::now();
        loop {
            let state = self
                .client
                .execute("return document.readyState;", vec![])
                .await?;
            if state.as_str() == Some("complete") {
                return Ok(());
            }
            if started.elapsed() > LOAD_TIMEOUT {
                return Err(anyhow!("page never reached readyState=complete: {url}"));
            }
            tokio::time::sleep(LOAD_POLL).await;
        }
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self.client.current_url().await?.to_string())
    }

    async fn title(&self) -> Result<String> {
        Ok(self.client.title().await?)
    }

    async fn exists(&self, selector: &str) -> Result<bool> {
        Ok(!self.elements(selector).await?.is_empty())
    }

    async fn is_visible(&self, selector: &str) -> Result<bool> {
        let v = self
            .run_on(selector, "return el.offsetParent !== null;")
            .await?;
        Ok(v.as_bool().unwrap_or(false))
    }

    async fn click(&self, selector: &str) -> Result<()> {
        self.element(selector).await?.click().await?;
        Ok(())
    }

    async fn click_nth(&self, selector: &str, index: usize) -> Result<()> {
        let elements = self.elements(selector).await?;
        let el = elements
            .get(index)
            .ok_or_else(|| anyhow!("no element at index {index} for {selector}"))?;
        el.click().await?;
        Ok(())
    }

    async fn hover(&self, selector: &str) -> Result<()> {
        // WebDriver move-to support varies between drivers; synthetic
        // pointer events behave identically for form widgets.
        self.run_on(
            selector,
            "el.dispatchEvent(new MouseEvent('mousemove', {bubbles: true})); \
             el.dispatchEvent(new MouseEvent('mouseover', {bubbles: true}));",
        )
        .await?;
        Ok(())
    }

    async fn scroll_into_view(&self, selector: &str) -> Result<()> {
        self.run_on(
            selector,
            "el.scrollIntoView({block: 'center', behavior: 'instant'});",
        )
        .await?;
        Ok(())
    }

    async fn type_char(&self, selector: &str, ch: char) -> Result<()> {
        self.element(selector)
            .await?
            .send_keys(&ch.to_string())
            .await?;
        Ok(())
    }

    async fn press_key(&self, selector: &str, key: &str) -> Result<()> {
        let code = match key {
            "Enter" => char::from(Key::Enter),
            "Tab" => char::from(Key::Tab),
            "Escape" => char::from(Key::Escape),
            other => return Err(anyhow!("unsupported key: {other}")),
        };
        self.element(selector)
            .await?
            .send_keys(&code.to_string())
            .await?;
        Ok(())
    }

    async fn set_value(&self, selector: &str, value: &str) -> Result<()> {
        let script = "const el = document.querySelector(arguments[0]); if (!el) return false; \
                      el.value = arguments[1]; \
                      el.dispatchEvent(new Event('input', {bubbles: true})); \
                      el.dispatchEvent(new Event('change', {bubbles: true})); \
                      return true;";
        let ok = self
            .client
            .execute(script, vec![json!(selector), json!(value)])
            .await?;
        if ok.as_bool() == Some(true) {
            Ok(())
        } else {
            Err(anyhow!("element not found: {selector}"))
        }
    }

    async fn set_files(&self, selector: &str, path: &Path) -> Result<()> {
        // WebDriver file upload: send the absolute path to the file input.
        let path = path
            .to_str()
            .ok_or_else(|| anyhow!("non-UTF8 artifact path"))?;
        self.element(selector).await?.send_keys(path).await?;
        Ok(())
    }

    async fn attribute(&self, selector: &str, name: &str) -> Result<Option<String>> {
        Ok(self.element(selector).await?.attr(name).await?)
    }

    async fn text(&self, selector: &str) -> Result<String> {
        Ok(self.element(selector).await?.text().await?.trim().to_string())
    }

    async fn texts(&self, selector: &str) -> Result<Vec<String>> {
        let mut out = Vec::new();
        for el in self.elements(selector).await? {
            out.push(el.text().await?.trim().to_string());
        }
        Ok(out)
    }

    async fn count(&self, selector: &str) -> Result<usize> {
        Ok(self.elements(selector).await?.len())
    }

    async fn is_checked(&self, selector: &str) -> Result<bool> {
        let checked = self.element(selector).await?.prop("checked").await?;
        Ok(checked.as_deref() == Some("true"))
    }

    async fn option_labels(&self, selector: &str) -> Result<Vec<String>> {
        self.texts(&format!("{selector} option")).await
    }

    async fn select_option_label(&self, selector: &str, label: &str) -> Result<()> {
        let labels = self.option_labels(selector).await?;
        let index = labels
            .iter()
            .position(|l| l == label)
            .ok_or_else(|| anyhow!("option {label:?} not present in {selector}"))?;
        self.element(selector).await?.select_by_index(index).await?;
        Ok(())
    }

    async fn select_option_value(&self, selector: &str, value: &str) -> Result<()> {
        self.element(selector).await?.select_by_value(value).await?;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.client.clone().close().await?;
        Ok(())
    }
}
