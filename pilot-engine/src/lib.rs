//! Platform-adaptive form-filling engine.
//!
//! The engine drives a live page (through the `pilot-drivers` boundary
//! traits) to complete one application form per known platform layout:
//!
//! - [`waits`]: the generic bounded wait primitive; `tolerant` expiries are
//!   silently tolerated, hard expiries become [`pilot_common::PilotError::WaitTimeout`]
//! - [`fields`]: element-level interaction primitives paced by the timing
//!   simulator, including fuzzy `<select>` option resolution
//! - [`acme`] / [`globex`]: the two platform handlers and their interaction
//!   state machines (multi-step wizard vs. accordion sections)
//! - [`registry`]: ordered first-match handler selection
//! - [`orchestrator`]: the per-target run loop
//! - [`artifact`]: the document-generation collaborator boundary

pub mod acme;
pub mod artifact;
pub mod fields;
pub mod globex;
pub mod handler;
pub mod orchestrator;
pub mod registry;
pub mod waits;

pub use acme::AcmeHandler;
pub use artifact::ArtifactProvider;
pub use fields::FieldActor;
pub use globex::GlobexHandler;
pub use handler::{PageContext, PlatformHandler, WaitBudget};
pub use orchestrator::{Orchestrator, TargetReport};
pub use registry::HandlerRegistry;
pub use waits::wait_until;
