//! Per-request cancellation and deadline.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error_handling::SearchError;

/// Caller-supplied cancellation signal and deadline for one request.
///
/// Every backend call made on behalf of the request goes through
/// [`RequestContext::call`], which races it against both. Cloning shares the
/// same token, so a component can hand the context to its own downstream calls.
#[derive(Debug, Clone)]
pub struct RequestContext {
    cancel: CancellationToken,
    deadline: Option<(Instant, Duration)>,
}

impl RequestContext {
    /// A context that is never cancelled and has no deadline.
    pub fn background() -> Self {
        RequestContext {
            cancel: CancellationToken::new(),
            deadline: None,
        }
    }

    /// A context that expires `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        RequestContext {
            cancel: CancellationToken::new(),
            deadline: Some((Instant::now() + timeout, timeout)),
        }
    }

    /// Ties the context to an existing cancellation token.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Token that cancels this request when triggered.
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Time left before the deadline, `None` without one.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|(at, _)| at.saturating_duration_since(Instant::now()))
    }

    /// Runs one backend call under this context.
    ///
    /// Fails fast with [`SearchError::Cancelled`] if the request is already
    /// cancelled, and drops the call if cancellation or the deadline arrive
    /// before it completes.
    pub async fn call<F, T, E>(&self, call: F) -> Result<T, SearchError>
    where
        F: Future<Output = Result<T, E>>,
        E: Into<SearchError>,
    {
        if self.cancel.is_cancelled() {
            return Err(SearchError::Cancelled);
        }

        let guarded = async {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => Err(SearchError::Cancelled),
                result = call => result.map_err(Into::into),
            }
        };

        match self.deadline {
            Some((at, timeout)) => tokio::time::timeout_at(at, guarded)
                .await
                .unwrap_or(Err(SearchError::DeadlineExceeded(timeout))),
            None => guarded.await,
        }
    }
}

impl RequestContext {
    /// Runs work that cannot fail on its own, such as a shared one-time load,
    /// under the same cancellation and deadline as [`RequestContext::call`].
    pub async fn run<F, T>(&self, work: F) -> Result<T, SearchError>
    where
        F: Future<Output = T>,
    {
        self.call(async { Ok::<T, SearchError>(work.await) }).await
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::background()
    }
}
