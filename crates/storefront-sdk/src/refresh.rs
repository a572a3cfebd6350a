//! Single-flight token refresh coordination
//!
//! `RefreshState` is the only shared mutable state in the pipeline: an
//! in-flight flag plus the queue of callers parked behind the running
//! refresh. Both live under one `std::sync::Mutex` that is never held across
//! an await point.
//!
//! A caller that hits a 401 asks `try_begin_refresh()` what to do:
//! - `Lead`: no refresh is running; this caller performs it and must settle
//!   it through `RefreshLeader::complete()`
//! - `Wait`: a refresh is running; await the shared outcome
//! - `Rotated`: a refresh already finished after this request was sent;
//!   replay with the current token without refreshing again

use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::metrics;

type Waiter = oneshot::Sender<Result<String>>;

#[derive(Default)]
struct Inner {
    in_flight: bool,
    waiters: Vec<Waiter>,
}

/// Refresh flag and waiter queue shared by every request of one client.
#[derive(Default)]
pub struct RefreshState {
    inner: Mutex<Inner>,
}

/// What a caller that received a 401 should do next.
pub enum RefreshTicket<'a> {
    Lead(RefreshLeader<'a>),
    Wait(RefreshWaiter),
    Rotated(String),
}

impl RefreshState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Join or start a refresh.
    ///
    /// `sent_token` is the access token the failed request carried and
    /// `current_token` reads the store's token now. The read happens under
    /// the lock so a leader can't settle between the check and the decision.
    pub fn try_begin_refresh(
        &self,
        sent_token: Option<&str>,
        current_token: impl FnOnce() -> Option<String>,
    ) -> RefreshTicket<'_> {
        let mut inner = self.lock();

        if inner.in_flight {
            let (tx, rx) = oneshot::channel();
            inner.waiters.push(tx);
            let position = inner.waiters.len();
            drop(inner);
            debug!(position, "queued behind in-flight token refresh");
            metrics::record_refresh_waiter();
            return RefreshTicket::Wait(RefreshWaiter { rx });
        }

        if let Some(current) = current_token() {
            if sent_token != Some(current.as_str()) {
                return RefreshTicket::Rotated(current);
            }
        }

        inner.in_flight = true;
        RefreshTicket::Lead(RefreshLeader {
            state: self,
            settled: false,
        })
    }

    /// Clear the in-flight flag and settle every queued caller, in enqueue
    /// order, with `outcome`.
    pub fn complete_refresh(&self, outcome: Result<String>) {
        let waiters = {
            let mut inner = self.lock();
            inner.in_flight = false;
            std::mem::take(&mut inner.waiters)
        };
        for waiter in waiters {
            // Receiver gone means that caller's future was dropped.
            let _ = waiter.send(outcome.clone());
        }
    }

    pub fn is_refreshing(&self) -> bool {
        self.lock().in_flight
    }

    /// Number of callers parked behind the running refresh.
    pub fn pending(&self) -> usize {
        self.lock().waiters.len()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Exclusive right to run the refresh.
///
/// Dropping it without calling `complete()` (for example because the
/// leader's future was cancelled) fails every waiter so none hang forever.
pub struct RefreshLeader<'a> {
    state: &'a RefreshState,
    settled: bool,
}

impl RefreshLeader<'_> {
    pub fn complete(mut self, outcome: Result<String>) {
        self.settled = true;
        self.state.complete_refresh(outcome);
    }
}

impl Drop for RefreshLeader<'_> {
    fn drop(&mut self) {
        if !self.settled {
            warn!(
                waiters = self.state.pending(),
                "token refresh abandoned before completion"
            );
            self.state.complete_refresh(Err(abandoned()));
        }
    }
}

/// A caller parked behind the running refresh.
pub struct RefreshWaiter {
    rx: oneshot::Receiver<Result<String>>,
}

impl RefreshWaiter {
    /// The refreshed access token, or the error the refresh failed with.
    pub async fn wait(self) -> Result<String> {
        self.rx.await.unwrap_or_else(|_| Err(abandoned()))
    }
}

fn abandoned() -> Error {
    Error::Refresh("refresh abandoned before completion".into())
}
