//! Session bootstrap against a running WebDriver service.

use anyhow::Result;
use async_trait::async_trait;
use fantoccini::ClientBuilder;
use serde_json::json;
use std::collections::HashMap;
use tracing::debug;
use webdriver::capabilities::Capabilities;

use crate::browser::page::WebdriverPage;
use crate::browser::traits::{PageDriver, PageFactory};

/// Opens one fresh WebDriver session per call to [`PageFactory::open`].
///
/// Default endpoint is `http://localhost:9515` (Chromedriver); override it
/// through the `browser.webdriver_url` config key.
pub struct PilotDriver {
    webdriver_url: String,
    headless: bool,
}

impl PilotDriver {
    pub fn new(webdriver_url: impl Into<String>, headless: bool) -> Self {
        Self {
            webdriver_url: webdriver_url.into(),
            headless,
        }
    }

    fn capabilities(&self) -> Capabilities {
        let mut args = vec![
            "--disable-gpu".to_string(),
            "--window-size=1440,900".to_string(),
        ];
        if self.headless {
            args.push("--headless=new".to_string());
        }

        let mut chrome_opts = HashMap::new();
        chrome_opts.insert("args".to_string(), json!(args));

        let mut caps = Capabilities::new();
        caps.insert("goog:chromeOptions".to_string(), json!(chrome_opts));
        caps
    }
}

#[async_trait]
impl PageFactory for PilotDriver {
    async fn open(&self) -> Result<Box<dyn PageDriver>> {
        debug!(
            target: "browser.session",
            endpoint = %self.webdriver_url,
            headless = self.headless,
            "opening webdriver session"
        );
        let client = ClientBuilder::native()
            .capabilities(self.capabilities())
            .connect(&self.webdriver_url)
            .await?;
        Ok(Box::new(WebdriverPage::new(client)))
    }
}
