//! # Handle over a deferred dispatch.
//!
//! `dispatch_deferred` schedules one tokio task per handler and returns a [`Deferred`]
//! holding their join handles. The caller may drop it (handlers keep running) or
//! [`join`](Deferred::join) it to observe failures.

use tokio::task::JoinHandle;

use crate::error::DispatchError;
use crate::subscribers::SubscriptionId;

/// Tasks scheduled by one deferred dispatch, in subscription order.
#[derive(Debug, Default)]
pub struct Deferred {
    tasks: Vec<(SubscriptionId, JoinHandle<Result<(), DispatchError>>)>,
}

impl Deferred {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            tasks: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn push(&mut self, id: SubscriptionId, task: JoinHandle<Result<(), DispatchError>>) {
        self.tasks.push((id, task));
    }

    /// Number of scheduled handler invocations.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Returns `true` if nothing was scheduled.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Waits for every scheduled invocation.
    ///
    /// All tasks are awaited; the first failure in subscription order is returned.
    /// A panicking handler is reported as [`DispatchError::Panicked`].
    /// A task cancelled before completion (its runtime shut down) is reported as
    /// [`DispatchError::Cancelled`].
    pub async fn join(self) -> Result<(), DispatchError> {
        let mut first = None;

        for (id, task) in self.tasks {
            let failure = match task.await {
                Ok(Ok(())) => None,
                Ok(Err(err)) => Some(err),
                Err(join_err) if join_err.is_panic() => {
                    let panic_err = join_err.into_panic();
                    let message = if let Some(msg) = panic_err.downcast_ref::<&'static str>() {
                        (*msg).to_string()
                    } else if let Some(msg) = panic_err.downcast_ref::<String>() {
                        msg.clone()
                    } else {
                        "unknown panic".to_string()
                    };
                    Some(DispatchError::Panicked {
                        subscription: id,
                        message,
                    })
                }
                Err(_) => Some(DispatchError::Cancelled { subscription: id }),
            };

            if first.is_none() {
                first = failure;
            }
        }

        match first {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
