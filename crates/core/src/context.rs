//! Driving context for a resolution pass.
//!
//! A [`ResolveContext`] carries an optional deadline and an optional
//! cancellation signal. It is handed unchanged to every call that reaches a
//! backing service, and [`ResolveContext::run`] races the call against both.
//! No timeout is added when the caller sets none.

use crate::errors::{Error, Result};
use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy)]
struct Deadline {
    at: Instant,
    budget: Duration,
}

/// Deadline and cancellation state shared by every call in a resolution pass
#[derive(Debug, Clone, Default)]
pub struct ResolveContext {
    deadline: Option<Deadline>,
    cancel: Option<watch::Receiver<bool>>,
}

/// Cancels every [`ResolveContext`] cloned from the one it was created with
#[derive(Debug)]
pub struct CancelHandle(watch::Sender<bool>);

impl CancelHandle {
    /// Signal cancellation. In-flight calls return [`Error::Cancelled`].
    pub fn cancel(&self) {
        self.0.send_replace(true);
    }
}

impl ResolveContext {
    /// A context with no deadline that is never cancelled
    #[must_use]
    pub fn background() -> Self {
        Self::default()
    }

    /// Add a deadline `timeout` from now
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Some(Deadline {
            at: Instant::now() + timeout,
            budget: timeout,
        });
        self
    }

    /// Make the context cancellable, returning the handle that cancels it
    #[must_use]
    pub fn with_cancellation(mut self) -> (Self, CancelHandle) {
        let (tx, rx) = watch::channel(false);
        self.cancel = Some(rx);
        (self, CancelHandle(tx))
    }

    /// Whether cancellation has been signalled
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|rx| *rx.borrow())
    }

    /// Time left before the deadline, if one is set
    #[must_use]
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.at.saturating_duration_since(Instant::now()))
    }

    /// Drive `operation` to completion unless the context is cancelled or its
    /// deadline passes first. The operation future is dropped in that case.
    pub async fn run<T, F>(&self, operation: &str, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        if self.is_cancelled() {
            return Err(Error::cancelled(operation));
        }
        let budget = self.deadline.map(|d| d.budget).unwrap_or_default();
        if self.remaining() == Some(Duration::ZERO) {
            return Err(Error::timeout(operation, budget));
        }

        let cancelled = async {
            match self.cancel.clone() {
                Some(mut rx) => {
                    let closed = rx.wait_for(|cancelled| *cancelled).await.is_err();
                    if closed {
                        // handle dropped without cancelling
                        std::future::pending::<()>().await;
                    }
                }
                None => std::future::pending::<()>().await,
            }
        };
        let expired = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline.at).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            () = cancelled => Err(Error::cancelled(operation)),
            () = expired => Err(Error::timeout(operation, budget)),
            result = fut => result,
        }
    }
}
