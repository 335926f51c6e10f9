//! Single-flight token refresh coordination.
//!
//! The first request to see an expired access token becomes the leader and
//! starts the refresh. The pipeline runs it in a task of its own, so the
//! guard settles even when the leading request is dropped. Requests that fail while a refresh is in flight
//! become followers: they wait in a FIFO queue and are released together
//! when the leader settles, either with the new access token or with the
//! refresh failure.
//!
//! The in-flight flag and the queue share one mutex. The lock is never held
//! across an await, and waiters are signalled after it is released.

use crate::RefreshFailure;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::debug;

type Outcome = Result<String, RefreshFailure>;

struct Waiter {
    id: u64,
    tx: oneshot::Sender<Outcome>,
}

#[derive(Default)]
struct RefreshState {
    in_flight: bool,
    /// Bumped on reset so a guard from before the reset cannot settle.
    generation: u64,
    next_waiter: u64,
    waiters: VecDeque<Waiter>,
}

impl RefreshState {
    /// Clear the flag and take the queue, if `generation` is still current.
    fn drain(&mut self, generation: u64) -> VecDeque<Waiter> {
        if self.generation != generation {
            return VecDeque::new();
        }
        self.in_flight = false;
        std::mem::take(&mut self.waiters)
    }
}

fn release(waiters: VecDeque<Waiter>, outcome: &Outcome) -> Vec<u64> {
    waiters
        .into_iter()
        .map(|waiter| {
            // A follower that gave up has dropped its receiver
            let _ = waiter.tx.send(outcome.clone());
            waiter.id
        })
        .collect()
}

/// Result of asking to refresh.
pub enum RefreshTicket {
    /// No refresh was in flight; the caller must perform it.
    Leader(RefreshGuard),
    /// A refresh is in flight; wait for its outcome.
    Follower(PendingRefresh),
}

/// Pipeline-wide refresh flag and queue of waiting requests.
#[derive(Default)]
pub struct RefreshCoordinator {
    state: Arc<Mutex<RefreshState>>,
}

impl RefreshCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Become the leader, or join the queue behind the current one.
    pub fn begin(&self) -> RefreshTicket {
        let mut state = self.state.lock();

        if state.in_flight {
            let id = state.next_waiter;
            state.next_waiter += 1;
            let (tx, rx) = oneshot::channel();
            state.waiters.push_back(Waiter { id, tx });
            debug!(waiter = id, queued = state.waiters.len(), "Queued behind in-flight refresh");
            return RefreshTicket::Follower(PendingRefresh { id, rx });
        }

        state.in_flight = true;
        RefreshTicket::Leader(RefreshGuard {
            state: Arc::clone(&self.state),
            generation: state.generation,
            settled: false,
        })
    }

    pub fn is_refreshing(&self) -> bool {
        self.state.lock().in_flight
    }

    /// Number of requests waiting on the in-flight refresh.
    pub fn queued(&self) -> usize {
        self.state.lock().waiters.len()
    }

    /// Clear the flag and reject every waiter. The current leader, if any,
    /// can no longer settle.
    pub fn reset(&self) {
        let waiters = {
            let mut state = self.state.lock();
            let generation = state.generation;
            let waiters = state.drain(generation);
            state.generation += 1;
            waiters
        };

        let released = release(waiters, &Err(RefreshFailure::session_ended()));
        if !released.is_empty() {
            debug!(rejected = released.len(), "Refresh queue reset");
        }
    }
}

/// Held by the leader for the duration of the refresh.
///
/// Dropping an unsettled guard rejects the queue and clears the flag.
pub struct RefreshGuard {
    state: Arc<Mutex<RefreshState>>,
    generation: u64,
    settled: bool,
}

impl RefreshGuard {
    /// Release every waiter with the new access token, in queue order.
    /// Returns the released waiter ids.
    pub fn resolve(mut self, access_token: &str) -> Vec<u64> {
        self.settle(Ok(access_token.to_string()))
    }

    /// Release every waiter with `failure`, in queue order.
    /// Returns the released waiter ids.
    pub fn reject(mut self, failure: &RefreshFailure) -> Vec<u64> {
        self.settle(Err(failure.clone()))
    }

    /// False once the coordinator has been reset since this guard was issued.
    pub fn is_current(&self) -> bool {
        self.state.lock().generation == self.generation
    }

    fn settle(&mut self, outcome: Outcome) -> Vec<u64> {
        self.settled = true;
        let waiters = self.state.lock().drain(self.generation);
        release(waiters, &outcome)
    }
}

impl Drop for RefreshGuard {
    fn drop(&mut self) {
        if !self.settled {
            let released = self.settle(Err(RefreshFailure::abandoned()));
            debug!(rejected = released.len(), "Refresh abandoned");
        }
    }
}

/// A request waiting on someone else's refresh.
pub struct PendingRefresh {
    id: u64,
    rx: oneshot::Receiver<Outcome>,
}

impl PendingRefresh {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Wait for the leader to settle.
    pub async fn wait(self) -> Result<String, RefreshFailure> {
        self.rx.await.unwrap_or_else(|_| Err(RefreshFailure::abandoned()))
    }
}
