use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::oneshot;

/// What the leader hands to every waiter when its refresh resolves.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RefreshResolution {
    Renewed(String),
    Expired,
    /// The leader went away without resolving.
    Abandoned,
}

/// Identifier assigned to a waiter at registration, increasing in FIFO order.
pub type WaiterId = u64;

struct Waiter {
    id: WaiterId,
    tx: oneshot::Sender<RefreshResolution>,
}

#[derive(Default)]
struct RefreshState {
    refreshing: bool,
    waiters: VecDeque<Waiter>,
    next_waiter: WaiterId,
}

/// Result of the session check a caller runs under the coordinator lock
/// when no refresh is in flight.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Admission {
    /// The stored access token already differs from the rejected one.
    Rotated(String),
    /// No refresh token is stored.
    NoRefreshToken,
    /// Refresh with this refresh token.
    Refresh(String),
}

/// Role handed to a caller that observed a 401.
pub enum RefreshRole<'a> {
    /// The stored access token already differs from the rejected one.
    Rotated(String),
    /// Idle with no refresh token stored; the caller replays anonymously.
    NoRefreshToken,
    /// No refresh is running; this caller must perform it with the refresh
    /// token read under the lock.
    Leader(LeaderTicket<'a>, String),
    /// A refresh is already running; await its resolution.
    Waiter(WaiterId, oneshot::Receiver<RefreshResolution>),
}

/// Serializes refreshes: at most one leader at a time, everyone else queues.
///
/// The `refreshing` flag and the waiter queue live behind one mutex that is
/// never held across an await point, so check-and-set is a single step.
#[derive(Default)]
pub struct RefreshCoordinator {
    state: Mutex<RefreshState>,
}

impl RefreshCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, RefreshState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Decides this caller's role. `admit` runs under the coordinator lock, and
    /// only when no refresh is in flight, so the session it reads cannot change
    /// before leadership is taken.
    pub fn enter<F>(&self, admit: F) -> RefreshRole<'_>
    where
        F: FnOnce() -> Admission,
    {
        let mut state = self.lock();
        if state.refreshing {
            let id = state.next_waiter;
            state.next_waiter += 1;
            let (tx, rx) = oneshot::channel();
            state.waiters.push_back(Waiter { id, tx });
            return RefreshRole::Waiter(id, rx);
        }
        let refresh_token = match admit() {
            Admission::Rotated(token) => return RefreshRole::Rotated(token),
            Admission::NoRefreshToken => return RefreshRole::NoRefreshToken,
            Admission::Refresh(refresh_token) => refresh_token,
        };
        state.refreshing = true;
        RefreshRole::Leader(
            LeaderTicket {
                coordinator: self,
                resolved: false,
            },
            refresh_token,
        )
    }

    pub fn is_refreshing(&self) -> bool {
        self.lock().refreshing
    }

    pub fn waiting(&self) -> usize {
        self.lock().waiters.len()
    }

    fn finish<F>(&self, resolution: &RefreshResolution, commit: F) -> Vec<WaiterId>
    where
        F: FnOnce(),
    {
        let drained = {
            let mut state = self.lock();
            commit();
            state.refreshing = false;
            std::mem::take(&mut state.waiters)
        };
        let mut delivered = Vec::with_capacity(drained.len());
        for waiter in drained {
            // A dropped receiver only means that waiter stopped listening.
            let _ = waiter.tx.send(resolution.clone());
            delivered.push(waiter.id);
        }
        delivered
    }
}

/// Proof of leadership. Resolving it returns the coordinator to idle.
pub struct LeaderTicket<'a> {
    coordinator: &'a RefreshCoordinator,
    resolved: bool,
}

impl LeaderTicket<'_> {
    /// Runs `commit` under the coordinator lock, returns to idle, then resumes
    /// every waiter in registration order. Returns the resumed waiter ids.
    pub fn resolve<F>(mut self, resolution: RefreshResolution, commit: F) -> Vec<WaiterId>
    where
        F: FnOnce(),
    {
        self.resolved = true;
        self.coordinator.finish(&resolution, commit)
    }
}

impl Drop for LeaderTicket<'_> {
    fn drop(&mut self) {
        if !self.resolved {
            self.coordinator.finish(&RefreshResolution::Abandoned, || {});
        }
    }
}
