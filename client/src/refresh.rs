//! Single-flight token refresh.
//!
//! At most one refresh call is in flight per client. Callers that hit a 401
//! while it runs queue a oneshot waiter and receive the leader's outcome in
//! arrival order. The state lock is never held across an await.

use std::future::Future;
use std::sync::{Mutex, PoisonError};

use staymate_types::AccessToken;
use tokio::sync::oneshot;

/// Why a caller could not obtain a fresh access token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RefreshFailure {
    /// The backend rejected the refresh token (or none was stored).
    Rejected,
    /// The leader was dropped before the refresh completed.
    Aborted,
}

type Waiter = oneshot::Sender<Result<AccessToken, RefreshFailure>>;

#[derive(Default)]
struct RefreshState {
    refreshing: bool,
    waiters: Vec<Waiter>,
}

#[derive(Default)]
pub(crate) struct RefreshCoordinator {
    state: Mutex<RefreshState>,
}

impl std::fmt::Debug for RefreshCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("RefreshCoordinator")
            .field("refreshing", &state.refreshing)
            .field("waiters", &state.waiters.len())
            .finish()
    }
}

impl RefreshCoordinator {
    /// Obtain an access token to replay a request that failed with
    /// `failed_with`.
    ///
    /// `current` reads the stored access token. It runs under the state lock,
    /// so a refresh that completed since the request was sent is observed
    /// before a new one starts. `refresh` is only run by the leader and must
    /// persist the new pair before resolving.
    pub(crate) async fn recover<C, F, Fut>(
        &self,
        failed_with: Option<&AccessToken>,
        current: C,
        refresh: F,
    ) -> Result<AccessToken, RefreshFailure>
    where
        C: FnOnce() -> Option<AccessToken>,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<AccessToken, RefreshFailure>>,
    {
        let waiter = {
            let mut state = self.lock();
            if let Some(stored) = current()
                && failed_with != Some(&stored)
            {
                tracing::debug!("Access token already rotated; replaying");
                return Ok(stored);
            }
            if state.refreshing {
                let (tx, rx) = oneshot::channel();
                state.waiters.push(tx);
                tracing::debug!(queued = state.waiters.len(), "Waiting for in-flight token refresh");
                Some(rx)
            } else {
                state.refreshing = true;
                None
            }
        };

        if let Some(rx) = waiter {
            return rx.await.unwrap_or(Err(RefreshFailure::Aborted));
        }

        let mut guard = LeaderGuard {
            coordinator: self,
            armed: true,
        };
        let outcome = refresh().await;
        guard.armed = false;
        self.finish(&outcome);
        outcome
    }

    #[cfg(test)]
    pub(crate) fn is_refreshing(&self) -> bool {
        self.lock().refreshing
    }

    #[cfg(test)]
    pub(crate) fn waiter_count(&self) -> usize {
        self.lock().waiters.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, RefreshState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn finish(&self, outcome: &Result<AccessToken, RefreshFailure>) {
        let waiters = {
            let mut state = self.lock();
            state.refreshing = false;
            std::mem::take(&mut state.waiters)
        };
        tracing::debug!(
            waiters = waiters.len(),
            success = outcome.is_ok(),
            "Token refresh settled"
        );
        for waiter in waiters {
            // A waiter whose caller was cancelled has dropped its receiver.
            let _ = waiter.send(outcome.clone());
        }
    }
}

/// Releases the flag and rejects queued waiters if the leader is dropped
/// mid-refresh.
struct LeaderGuard<'a> {
    coordinator: &'a RefreshCoordinator,
    armed: bool,
}

impl Drop for LeaderGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            tracing::warn!("Token refresh cancelled; rejecting queued callers");
            self.coordinator.finish(&Err(RefreshFailure::Aborted));
        }
    }
}
