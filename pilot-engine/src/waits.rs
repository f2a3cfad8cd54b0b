//! Bounded predicate waiting.
//!
//! Every suspension point in the engine goes through [`wait_until`]. The
//! `tolerant` flag is the one distinction that matters: a tolerant wait that
//! expires reports `Ok(false)` and the caller proceeds with its fallback; a
//! hard wait that expires is a failure carrying what was being awaited.

use std::future::Future;
use std::time::{Duration, Instant};

use pilot_common::{PilotError, Result};
use tracing::debug;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Poll `probe` until it reports true or `timeout` elapses.
///
/// Returns `Ok(true)` when the condition held, `Ok(false)` when a tolerant
/// wait expired, and [`PilotError::WaitTimeout`] when a hard wait expired.
/// Errors from the probe itself propagate immediately in either mode.
pub async fn wait_until<F, Fut>(
    what: &str,
    timeout: Duration,
    tolerant: bool,
    mut probe: F,
) -> Result<bool>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    let started = Instant::now();
    loop {
        if probe().await? {
            return Ok(true);
        }
        if started.elapsed() >= timeout {
            let waited_ms = started.elapsed().as_millis() as u64;
            if tolerant {
                debug!(target: "engine.wait", what, waited_ms, "tolerated wait expiry");
                return Ok(false);
            }
            return Err(PilotError::WaitTimeout {
                what: what.to_string(),
                waited_ms,
            });
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}
