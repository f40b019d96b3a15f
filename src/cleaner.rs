//! Sequential, rate-limit aware deletion loop.
//!
//! One request in flight at a time. After every attempt the whole deletion log
//! is persisted before the loop pauses and moves on; a failed write aborts the
//! run. A response reporting zero remaining calls keeps the same candidate and
//! waits until the reported reset time.

use crate::api::{ApiError, DeleteApi, DeleteOutcome};
use crate::deletion_log::DeletionLog;
use crate::progress::ProgressScope;
use crate::record::PostRecord;
use anyhow::{Context, Result};
use std::time::Duration;
use time::OffsetDateTime;

/// Suspension between calls. Swapped out in tests to record waits instead of sleeping.
pub trait Pacer {
    fn pause(&mut self, wait: Duration);
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ThreadSleep;

impl Pacer for ThreadSleep {
    fn pause(&mut self, wait: Duration) {
        if !wait.is_zero() {
            std::thread::sleep(wait);
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct LoopSettings {
    pub calls_interval: Duration,
    pub progress: bool,
}

impl Default for LoopSettings {
    fn default() -> Self {
        Self { calls_interval: Duration::from_millis(1000), progress: false }
    }
}

#[derive(Debug)]
pub enum StepKind {
    /// Confirmed: goes into the log.
    Deleted,
    /// Application or transport error: left out of the log, eligible next run.
    Failed(ApiError),
    /// Zero calls remaining: not confirmed, retry the same candidate after `next_wait`.
    RateLimited,
}

#[derive(Debug)]
pub struct StepDecision {
    pub kind: StepKind,
    pub next_wait: Duration,
}

/// Decide what one response means for the loop.
///
/// Rate-limit exhaustion wins over an error reported by the same response.
/// With no headers at all the remaining count is unknown, not zero.
pub fn decide_step(outcome: DeleteOutcome, now: OffsetDateTime, calls_interval: Duration) -> StepDecision {
    let DeleteOutcome { error, rate_limit } = outcome;
    if let Some(rl) = rate_limit.filter(|rl| rl.exhausted()) {
        let next_wait = match rl.reset_at {
            // A reset already in the past falls back to normal pacing so a
            // stale header cannot drive back-to-back calls.
            Some(reset) => match Duration::try_from(reset - now) {
                Ok(wait) if !wait.is_zero() => wait,
                _ => calls_interval,
            },
            None => calls_interval,
        };
        return StepDecision { kind: StepKind::RateLimited, next_wait };
    }
    let kind = match error {
        Some(e) => StepKind::Failed(e),
        None => StepKind::Deleted,
    };
    StepDecision { kind, next_wait: calls_interval }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DeletionSummary {
    pub candidates: usize,
    pub attempts: usize,
    pub deleted: usize,
    pub failed: usize,
    pub rate_limited: usize,
}

/// Process `candidates` in order until exhausted. Only a log write failure is an error.
pub fn run_deletion<A, P>(
    candidates: &[PostRecord],
    log: &mut DeletionLog,
    api: &mut A,
    pacer: &mut P,
    settings: LoopSettings,
) -> Result<DeletionSummary>
where
    A: DeleteApi + ?Sized,
    P: Pacer + ?Sized,
{
    let mut summary = DeletionSummary { candidates: candidates.len(), ..Default::default() };
    let progress = ProgressScope::count("Deleting", candidates.len() as u64, settings.progress);

    let mut i = 0;
    while i < candidates.len() {
        let post = &candidates[i];
        let outcome = api.delete_post(&post.tweet_id);
        summary.attempts += 1;

        let step = decide_step(outcome, OffsetDateTime::now_utc(), settings.calls_interval);
        match step.kind {
            StepKind::Deleted => {
                tracing::info!("Deleted -> {} | {}", post.tweet_id, post.text);
                log.record(post.clone());
                summary.deleted += 1;
                i += 1;
                progress.inc();
            }
            StepKind::Failed(err) => {
                tracing::warn!("Failed to delete {}: {}", post.tweet_id, err);
                summary.failed += 1;
                i += 1;
                progress.inc();
            }
            StepKind::RateLimited => {
                tracing::info!("Rate limit reached, waiting {} ms before retrying {}", step.next_wait.as_millis(), post.tweet_id);
                summary.rate_limited += 1;
            }
        }

        log.save().with_context(|| format!("write deletion log {}", log.path().display()))?;

        if i >= candidates.len() {
            break;
        }
        tracing::debug!("Next call in {}ms", step.next_wait.as_millis());
        pacer.pause(step.next_wait);
    }

    progress.finish("done");
    tracing::info!(
        "Done! {} deleted, {} failed, {} rate-limit waits",
        summary.deleted, summary.failed, summary.rate_limited
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::RateLimit;

    const INTERVAL: Duration = Duration::from_millis(250);

    fn now() -> OffsetDateTime {
        OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap()
    }

    fn limited(remaining: u64, reset_in_secs: i64) -> Option<RateLimit> {
        Some(RateLimit { remaining: Some(remaining), reset_at: Some(now() + time::Duration::seconds(reset_in_secs)) })
    }

    #[test]
    fn success_uses_pacing_interval() {
        let d = decide_step(DeleteOutcome::ok(limited(5, 60).unwrap()), now(), INTERVAL);
        assert!(matches!(d.kind, StepKind::Deleted));
        assert_eq!(d.next_wait, INTERVAL);
    }

    #[test]
    fn zero_remaining_waits_until_reset_even_with_error() {
        let out = DeleteOutcome::failed(ApiError::Status { status: 429, body: String::new() }, limited(0, 5));
        let d = decide_step(out, now(), INTERVAL);
        assert!(matches!(d.kind, StepKind::RateLimited));
        assert_eq!(d.next_wait, Duration::from_secs(5));
    }

    #[test]
    fn reset_in_the_past_waits_pacing_interval() {
        let d = decide_step(DeleteOutcome::ok(limited(0, -10).unwrap()), now(), INTERVAL);
        assert!(matches!(d.kind, StepKind::RateLimited));
        assert_eq!(d.next_wait, INTERVAL);
    }

    #[test]
    fn transport_error_is_unknown_remaining() {
        let d = decide_step(DeleteOutcome::failed(ApiError::Transport("refused".into()), None), now(), INTERVAL);
        assert!(matches!(d.kind, StepKind::Failed(ApiError::Transport(_))));
        assert_eq!(d.next_wait, INTERVAL);
    }

    #[test]
    fn unparseable_remaining_is_not_zero() {
        let rl = RateLimit { remaining: None, reset_at: None };
        let d = decide_step(DeleteOutcome::ok(rl), now(), INTERVAL);
        assert!(matches!(d.kind, StepKind::Deleted));
    }
}
