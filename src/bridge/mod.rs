//! Correlates dialogs shown by the UI process with the signals that end them.
//!
//! A portal method registers the request token with a [`Bridge`], sends the
//! dialog to the UI process and then waits on the returned [`Subscription`].
//! The signal listener hands every notification to [`Bridge::complete`], which
//! wakes only the waiter registered under the token carried by the signal.
//! Dropping the [`Subscription`] releases the registration, so a notification
//! arriving after a timeout or cancellation finds nothing to complete.

mod completion;

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::error::BridgeError;

pub use completion::{Completion, Response};

/// State of a registered request as seen by the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    Pending,
    Completed,
    Failed,
    Cancelled,
}

/// What happened to a notification handed to the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// The pending request with this token was resolved.
    Accepted,
    /// The request had already been resolved; the notification was dropped.
    AlreadyCompleted,
    /// No request with this token is in flight; the notification was dropped.
    Unmatched,
}

enum Wake<P> {
    Completed(Completion<P>),
    Failed(String),
    Cancelled,
}

struct Entry<P> {
    state: RequestState,
    waker: Option<oneshot::Sender<Wake<P>>>,
}

type PendingMap<P> = Arc<Mutex<HashMap<String, Entry<P>>>>;

fn lock<P>(pending: &PendingMap<P>) -> MutexGuard<'_, HashMap<String, Entry<P>>> {
    pending.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Table of in-flight requests for one portal type.
pub struct Bridge<P> {
    name: &'static str,
    pending: PendingMap<P>,
}

impl<P> Clone for Bridge<P> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            pending: self.pending.clone(),
        }
    }
}

impl<P: Send + 'static> Bridge<P> {
    /// Creates an empty bridge. `name` only shows up in logs.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            pending: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Registers a pending request under `token`.
    ///
    /// Must be called before the dialog is dispatched so that a completion
    /// racing the dispatch acknowledgement is not lost.
    pub fn subscribe(&self, token: &str) -> Result<Subscription<P>, BridgeError> {
        if token.is_empty() {
            return Err(BridgeError::InvalidToken);
        }

        let (waker, receiver) = oneshot::channel();
        {
            let mut pending = lock(&self.pending);
            if pending.contains_key(token) {
                warn!(bridge = self.name, token, "Request token already in flight");
                return Err(BridgeError::DuplicateToken(token.to_string()));
            }
            pending.insert(
                token.to_string(),
                Entry {
                    state: RequestState::Pending,
                    waker: Some(waker),
                },
            );
        }

        debug!(bridge = self.name, token, "Registered pending request");

        Ok(Subscription {
            name: self.name,
            token: token.to_string(),
            pending: self.pending.clone(),
            receiver,
        })
    }

    /// Completes the request registered under `token`.
    pub fn complete(&self, token: &str, completion: Completion<P>) -> Delivery {
        self.resolve(token, RequestState::Completed, Wake::Completed(completion))
    }

    /// Fails every request still waiting for the UI. Returns how many were failed.
    pub fn fail_pending(&self, reason: &str) -> usize {
        let mut pending = lock(&self.pending);
        let mut failed = 0;

        for (token, entry) in pending.iter_mut() {
            let Some(waker) = entry.waker.take() else {
                continue;
            };
            entry.state = RequestState::Failed;
            if waker.send(Wake::Failed(reason.to_string())).is_err() {
                debug!(bridge = self.name, token = %token, "Waiter went away before resolution");
            }
            failed += 1;
        }

        if failed > 0 {
            warn!(bridge = self.name, failed, reason, "Failed pending requests");
        }
        failed
    }

    /// Aborts the wait of the request registered under `token`.
    pub fn cancel(&self, token: &str) -> Delivery {
        self.resolve(token, RequestState::Cancelled, Wake::Cancelled)
    }

    /// Returns the state of the request registered under `token`, if any.
    pub fn state(&self, token: &str) -> Option<RequestState> {
        lock(&self.pending).get(token).map(|entry| entry.state)
    }

    /// Number of registered requests.
    pub fn pending_count(&self) -> usize {
        lock(&self.pending).len()
    }

    /// Drives one request through dispatch and wait.
    ///
    /// `dispatch` is only polled after the token is registered. If it fails
    /// the error is returned straight away and no wait happens.
    pub async fn run<F>(
        &self,
        token: &str,
        dispatch: F,
        budget: Duration,
    ) -> Result<Completion<P>, BridgeError>
    where
        F: Future<Output = Result<(), BridgeError>>,
    {
        let subscription = self.subscribe(token)?;

        if let Err(err) = dispatch.await {
            warn!(bridge = self.name, token, %err, "Dispatch to UI process failed");
            return Err(err);
        }

        debug!(bridge = self.name, token, "Dispatched, waiting for completion");
        subscription.wait(budget).await
    }

    fn resolve(&self, token: &str, state: RequestState, wake: Wake<P>) -> Delivery {
        let mut pending = lock(&self.pending);

        let Some(entry) = pending.get_mut(token) else {
            warn!(bridge = self.name, token, ?state, "Notification for unknown request dropped");
            return Delivery::Unmatched;
        };

        let Some(waker) = entry.waker.take() else {
            info!(
                bridge = self.name,
                token,
                current = ?entry.state,
                "Request already resolved, ignoring notification"
            );
            return Delivery::AlreadyCompleted;
        };

        entry.state = state;
        if waker.send(wake).is_err() {
            debug!(bridge = self.name, token, "Waiter went away before resolution");
        }
        Delivery::Accepted
    }
}

/// Cancels in-flight requests by token, independent of the payload type.
pub trait Cancel: Send + Sync {
    fn cancel(&self, token: &str) -> Delivery;
}

impl<P: Send + 'static> Cancel for Bridge<P> {
    fn cancel(&self, token: &str) -> Delivery {
        Bridge::cancel(self, token)
    }
}

/// Registration of one in-flight request. Released on drop.
pub struct Subscription<P> {
    name: &'static str,
    token: String,
    pending: PendingMap<P>,
    receiver: oneshot::Receiver<Wake<P>>,
}

impl<P> Subscription<P> {
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Waits until the request is resolved or `budget` elapses.
    pub async fn wait(mut self, budget: Duration) -> Result<Completion<P>, BridgeError> {
        match timeout(budget, &mut self.receiver).await {
            Ok(Ok(Wake::Completed(completion))) => {
                debug!(bridge = self.name, token = %self.token, response = ?completion.response, "Request completed");
                Ok(completion)
            }
            Ok(Ok(Wake::Failed(reason))) => Err(BridgeError::Failed(reason)),
            Ok(Ok(Wake::Cancelled)) => {
                info!(bridge = self.name, token = %self.token, "Request cancelled");
                Err(BridgeError::Cancelled)
            }
            Ok(Err(_)) => Err(BridgeError::Failed(
                "request was dropped without a result".to_string(),
            )),
            Err(_) => {
                warn!(
                    bridge = self.name,
                    token = %self.token,
                    ?budget,
                    "Timed out waiting for the UI process"
                );
                Err(BridgeError::Timeout(budget))
            }
        }
    }
}

impl<P> Drop for Subscription<P> {
    fn drop(&mut self) {
        lock(&self.pending).remove(&self.token);
        debug!(bridge = self.name, token = %self.token, "Released pending request");
    }
}
