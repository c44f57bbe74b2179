//! Cancellation and deadlines for individual requests.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;

use super::error::{ApiError, Result};

/// Cooperative cancellation state and an optional deadline for a request.
///
/// Clones share the cancellation flag, so a clone handed to another task can
/// cancel every request built from the original.
#[derive(Debug, Clone)]
pub struct RequestContext {
    cancel: Arc<watch::Sender<bool>>,
    deadline: Option<Instant>,
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::background()
    }
}

impl RequestContext {
    /// A context that is never cancelled and has no deadline.
    pub fn background() -> Self {
        let (cancel, _) = watch::channel(false);
        Self {
            cancel: Arc::new(cancel),
            deadline: None,
        }
    }

    /// A context whose requests fail with [`ApiError::TimedOut`] after `timeout`.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::background().deadline_at(Instant::now() + timeout)
    }

    /// Derive a context sharing this one's cancellation with the given deadline.
    ///
    /// An earlier existing deadline is kept.
    pub fn deadline_at(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(existing) if existing < deadline => existing,
            _ => deadline,
        });
        self
    }

    /// The deadline, if one is set.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Cancel every request running under this context or its clones.
    pub fn cancel(&self) {
        self.cancel.send_replace(true);
    }

    /// Whether [`cancel`](Self::cancel) has been called.
    pub fn is_cancelled(&self) -> bool {
        *self.cancel.borrow()
    }

    /// Resolve once the context is cancelled.
    pub async fn cancelled(&self) {
        let mut rx = self.cancel.subscribe();
        if rx.wait_for(|cancelled| *cancelled).await.is_err() {
            // The sender lives as long as `self`, so this is unreachable in practice.
            std::future::pending::<()>().await;
        }
    }

    /// Drive `fut` to completion unless the context is cancelled or expires first.
    pub(crate) async fn run<F, T>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        if self.is_cancelled() {
            return Err(ApiError::Cancelled);
        }

        let guarded = async {
            tokio::select! {
                biased;
                _ = self.cancelled() => Err(ApiError::Cancelled),
                res = fut => res,
            }
        };

        match self.deadline {
            Some(deadline) => tokio::time::timeout_at(deadline, guarded)
                .await
                .unwrap_or(Err(ApiError::TimedOut)),
            None => guarded.await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_background_runs_to_completion() {
        let ctx = RequestContext::background();
        let value = tokio_test::block_on(ctx.run(async { Ok::<_, ApiError>(42) })).unwrap();
        assert_eq!(value, 42);
    }

    #[tokio::test]
    async fn test_pre_cancelled_context_short_circuits() {
        let ctx = RequestContext::background();
        ctx.cancel();
        assert!(ctx.is_cancelled());

        let result = ctx.run(async { Ok::<_, ApiError>(()) }).await;
        assert!(matches!(result, Err(ApiError::Cancelled)));
    }

    #[tokio::test]
    async fn test_clone_shares_cancellation() {
        let ctx = RequestContext::background();
        let handle = ctx.clone();

        let task = tokio::spawn(async move {
            handle
                .run(async {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    Ok::<_, ApiError>(())
                })
                .await
        });

        tokio::time::sleep(Duration::from_millis(10)).await;
        ctx.cancel();

        let result = task.await.unwrap();
        assert!(matches!(result, Err(ApiError::Cancelled)));
    }

    #[tokio::test]
    async fn test_deadline_expires() {
        let ctx = RequestContext::with_timeout(Duration::from_millis(50));
        let result = ctx
            .run(async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok::<_, ApiError>(())
            })
            .await;
        assert!(matches!(result, Err(ApiError::TimedOut)));
    }

    #[test]
    fn test_deadline_keeps_earliest() {
        let now = Instant::now();
        let ctx = RequestContext::background()
            .deadline_at(now + Duration::from_secs(1))
            .deadline_at(now + Duration::from_secs(10));
        assert_eq!(ctx.deadline(), Some(now + Duration::from_secs(1)));
    }
}
