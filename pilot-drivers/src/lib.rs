//! Browser boundary for form-pilot.
//!
//! Everything the engine knows about a live page goes through the
//! [`PageDriver`] trait; the WebDriver-backed implementation lives in
//! [`browser::page`] and session bootstrap in [`browser::driver`]. The
//! human-timing simulator ([`browser::pacing`]) also lives here because it
//! paces every driver interaction.

pub mod browser;

pub use browser::driver::PilotDriver;
pub use browser::pacing::{DelayRange, HumanPacing, InstantPacing, Pacing, PacingProfile};
pub use browser::page::WebdriverPage;
pub use browser::traits::{PageDriver, PageFactory};
