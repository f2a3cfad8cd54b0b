//! Boundary to the document-generation collaborator.

use std::path::PathBuf;

use async_trait::async_trait;
use pilot_common::CandidateProfile;

/// Supplies the per-target submission attachment.
///
/// An artifact is single-use: obtained before one attempt, released
/// unconditionally after it, never shared across targets. `obtain` raising
/// is non-fatal to the run; the orchestrator logs and proceeds without a
/// fresh artifact.
#[async_trait]
pub trait ArtifactProvider: Send + Sync {
    /// Produce an attachment for one target, returning its path.
    async fn obtain(&self, profile: &CandidateProfile, target_name: &str)
        -> anyhow::Result<PathBuf>;

    /// Dispose of whatever `obtain` last produced. Idempotent; releasing an
    /// already-absent artifact is a no-op.
    async fn release(&self);
}
