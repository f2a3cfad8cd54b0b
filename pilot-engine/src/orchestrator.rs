//! Per-target run loop.
//!
//! Targets are processed strictly sequentially: one artifact, one browser
//! session, one attempt each, with both resources released before the next
//! target starts. A failed attempt never aborts the loop; every target ends
//! up with exactly one [`ApplicationResult`].

use std::sync::Arc;
use std::time::{Duration, Instant};

use pilot_common::{ApplicationResult, CandidateProfile, PilotError, Target};
use pilot_drivers::{PageDriver, PageFactory, Pacing};
use tracing::{debug, info, warn};

use crate::artifact::ArtifactProvider;
use crate::handler::PageContext;
use crate::registry::HandlerRegistry;

/// One target's outcome, paired with the target for reporting.
#[derive(Debug, Clone)]
pub struct TargetReport {
    pub target: Target,
    pub result: ApplicationResult,
}

pub struct Orchestrator {
    registry: HandlerRegistry,
    pacing: Arc<dyn Pacing>,
    artifacts: Option<Arc<dyn ArtifactProvider>>,
}

impl Orchestrator {
    pub fn new(registry: HandlerRegistry, pacing: Arc<dyn Pacing>) -> Self {
        Self {
            registry,
            pacing,
            artifacts: None,
        }
    }

    pub fn with_artifacts(mut self, provider: Arc<dyn ArtifactProvider>) -> Self {
        self.artifacts = Some(provider);
        self
    }

    /// Attempt every target once, in order. Always returns one report per
    /// target.
    pub async fn run(
        &self,
        factory: &dyn PageFactory,
        profile: &CandidateProfile,
        targets: &[Target],
    ) -> Vec<TargetReport> {
        let mut reports = Vec::with_capacity(targets.len());
        for target in targets {
            info!(
                target: "run",
                name = %target.name,
                url = %target.url,
                "starting submission attempt"
            );

            let artifact = match &self.artifacts {
                Some(provider) => match provider.obtain(profile, &target.name).await {
                    Ok(path) => Some(path),
                    Err(e) => {
                        warn!(
                            target: "run",
                            name = %target.name,
                            error = %e,
                            "artifact generation failed; proceeding without a fresh artifact"
                        );
                        None
                    }
                },
                None => None,
            };

            let result = match factory.open().await {
                Ok(page) => {
                    let result = self
                        .attempt(page.as_ref(), profile, target, artifact.as_deref())
                        .await;
                    if let Err(e) = page.close().await {
                        warn!(target: "run", name = %target.name, error = %e, "session teardown failed");
                    }
                    result
                }
                Err(e) => ApplicationResult::failed(
                    format!("failed to open browser session: {e}"),
                    Duration::ZERO,
                ),
            };

            if let Some(provider) = &self.artifacts {
                provider.release().await;
            }

            if result.success {
                info!(
                    target: "run",
                    name = %target.name,
                    confirmation = result.confirmation_id.as_deref().unwrap_or(""),
                    duration_ms = result.duration_ms,
                    "submission confirmed"
                );
            } else {
                warn!(
                    target: "run",
                    name = %target.name,
                    error = result.error.as_deref().unwrap_or(""),
                    duration_ms = result.duration_ms,
                    "submission failed"
                );
            }
            reports.push(TargetReport {
                target: target.clone(),
                result,
            });
        }
        reports
    }

    async fn attempt(
        &self,
        page: &dyn PageDriver,
        profile: &CandidateProfile,
        target: &Target,
        artifact: Option<&std::path::Path>,
    ) -> ApplicationResult {
        let started = Instant::now();

        if let Err(e) = page.navigate(&target.url).await {
            return ApplicationResult::failed(format!("navigation failed: {e}"), started.elapsed());
        }

        let ctx = match PageContext::read(page).await {
            Ok(ctx) => ctx,
            Err(e) => return ApplicationResult::failed(e.to_string(), started.elapsed()),
        };

        let Some(handler) = self.registry.find(&ctx) else {
            return ApplicationResult::failed(
                PilotError::NoHandler(target.url.clone()).to_string(),
                Duration::ZERO,
            );
        };
        debug!(
            target: "run",
            handler = handler.name(),
            url = %ctx.url,
            title = %ctx.title,
            "handler claimed page"
        );

        handler
            .fill_and_submit(page, self.pacing.as_ref(), profile, artifact)
            .await
    }
}
