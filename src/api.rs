//! The remote deletion call, seen from the loop: one request, one outcome.

use thiserror::Error;
use time::OffsetDateTime;

/// Per-call failure. None of these abort the run.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No response at all (DNS, connect, TLS, timeout...).
    #[error("transport error: {0}")]
    Transport(String),
    /// The service answered with a non-success status.
    #[error("remote returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("missing credentials: {0}")]
    Credentials(String),
}

/// Rate-limit headers as reported with a response. Either half may be absent or
/// unparseable, which is different from a reported zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RateLimit {
    pub remaining: Option<u64>,
    pub reset_at: Option<OffsetDateTime>,
}

impl RateLimit {
    pub fn exhausted(&self) -> bool {
        self.remaining == Some(0)
    }
}

/// Result of a single delete request. `rate_limit` is `None` when no response
/// (and hence no headers) was received.
#[derive(Debug, Default)]
pub struct DeleteOutcome {
    pub error: Option<ApiError>,
    pub rate_limit: Option<RateLimit>,
}

impl DeleteOutcome {
    pub fn ok(rate_limit: RateLimit) -> Self {
        Self { error: None, rate_limit: Some(rate_limit) }
    }

    pub fn failed(error: ApiError, rate_limit: Option<RateLimit>) -> Self {
        Self { error: Some(error), rate_limit }
    }
}

/// Delete a post by id. Implementations must not retry internally; the loop
/// owns pacing and retry decisions.
pub trait DeleteApi {
    fn delete_post(&mut self, id: &str) -> DeleteOutcome;
}

impl<T: DeleteApi + ?Sized> DeleteApi for &mut T {
    fn delete_post(&mut self, id: &str) -> DeleteOutcome {
        (**self).delete_post(id)
    }
}

impl<T: DeleteApi + ?Sized> DeleteApi for Box<T> {
    fn delete_post(&mut self, id: &str) -> DeleteOutcome {
        (**self).delete_post(id)
    }
}
