//! Seam between the engine and a live browser.
//!
//! The engine only ever talks to [`PageDriver`]; the production
//! implementation wraps a WebDriver session, while engine tests script an
//! in-memory fake. Every operation addresses elements by CSS selector so the
//! fake never needs a real DOM.

use anyhow::Result;
use async_trait::async_trait;
use std::path::Path;

/// Element-level and page-level capabilities consumed by the engine.
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Navigate and wait until the document reports a loaded state.
    async fn navigate(&self, url: &str) -> Result<()>;

    async fn current_url(&self) -> Result<String>;
    async fn title(&self) -> Result<String>;

    /// Whether at least one element matches the selector.
    async fn exists(&self, selector: &str) -> Result<bool>;

    /// Whether the first matching element is rendered (participates in
    /// layout). Missing elements are simply not visible.
    async fn is_visible(&self, selector: &str) -> Result<bool>;

    async fn click(&self, selector: &str) -> Result<()>;

    /// Click the `index`-th element matching `selector` (0-based, in DOM
    /// delivery order).
    async fn click_nth(&self, selector: &str, index: usize) -> Result<()>;

    async fn hover(&self, selector: &str) -> Result<()>;
    async fn scroll_into_view(&self, selector: &str) -> Result<()>;

    /// Dispatch one keystroke into the element.
    async fn type_char(&self, selector: &str, ch: char) -> Result<()>;

    /// Press a named key ("Enter", "Tab") on the element.
    async fn press_key(&self, selector: &str, key: &str) -> Result<()>;

    /// Assign a value directly and fire synthetic `input` and `change`
    /// events; used for range and date controls that are not typed into.
    async fn set_value(&self, selector: &str, value: &str) -> Result<()>;

    /// Attach a local file to a file input.
    async fn set_files(&self, selector: &str, path: &Path) -> Result<()>;

    async fn attribute(&self, selector: &str, name: &str) -> Result<Option<String>>;

    /// Trimmed text content of the first match.
    async fn text(&self, selector: &str) -> Result<String>;

    /// Trimmed text content of every match, in delivery order.
    async fn texts(&self, selector: &str) -> Result<Vec<String>>;

    async fn count(&self, selector: &str) -> Result<usize>;

    /// Current checked state of a checkbox/radio input.
    async fn is_checked(&self, selector: &str) -> Result<bool>;

    /// Visible labels of a `<select>` control's options, in DOM order.
    async fn option_labels(&self, selector: &str) -> Result<Vec<String>>;

    async fn select_option_label(&self, selector: &str, label: &str) -> Result<()>;
    async fn select_option_value(&self, selector: &str, value: &str) -> Result<()>;

    /// Tear the session down. Further calls on this page are invalid.
    async fn close(&self) -> Result<()>;
}

/// Opens a fresh page session. One session per submission target; the
/// orchestrator closes it before opening the next.
#[async_trait]
pub trait PageFactory: Send + Sync {
    async fn open(&self) -> Result<Box<dyn PageDriver>>;
}
