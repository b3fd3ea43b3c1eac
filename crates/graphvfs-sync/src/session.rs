//! Watch sessions: one delta engine per drive, shared by every watcher
//!
//! [`WatchRegistry::subscribe`] starts an engine on the first subscription
//! for a drive and joins the running one afterwards. Each subscription is a
//! [`WatchHandle`]; releasing (or dropping) the last handle cancels the
//! engine. The reference count and the start/stop decisions are made while
//! holding the drive's map entry, so concurrent subscribe/release calls
//! cannot start two engines or miss a stop.
//!
//! An engine that stopped on its own (remote failure) stays registered until
//! the next subscription replaces it with a fresh one. Handles of the old
//! session keep their [`SessionId`] and are ignored when they release.

use std::sync::Arc;
use std::time::Duration;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use graphvfs_core::domain::{ChangeBatch, DriveId, SessionId};
use graphvfs_core::ports::IDeltaSource;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::engine::{DeltaEngine, EngineState};

/// Default number of undelivered batches kept per subscriber
pub const DEFAULT_EVENT_BUFFER: usize = 64;

// ============================================================================
// WatchSession
// ============================================================================

/// Registry entry for one drive
struct WatchSession {
    id: SessionId,
    subscribers: usize,
    cancel: CancellationToken,
    events: broadcast::Sender<ChangeBatch>,
    state: watch::Receiver<EngineState>,
}

impl WatchSession {
    fn is_stopped(&self) -> bool {
        *self.state.borrow() == EngineState::Stopped
    }
}

// ============================================================================
// WatchRegistry
// ============================================================================

/// Multiplexes watch subscriptions onto one engine per drive
#[derive(Clone)]
pub struct WatchRegistry {
    source: Arc<dyn IDeltaSource>,
    interval: Duration,
    buffer: usize,
    sessions: Arc<DashMap<DriveId, WatchSession>>,
}

impl WatchRegistry {
    /// Creates a registry polling `source` every `interval`
    pub fn new(source: Arc<dyn IDeltaSource>, interval: Duration) -> Self {
        Self {
            source,
            interval,
            buffer: DEFAULT_EVENT_BUFFER,
            sessions: Arc::new(DashMap::new()),
        }
    }

    /// Sets how many batches a slow subscriber may fall behind
    pub fn with_event_buffer(mut self, buffer: usize) -> Self {
        self.buffer = buffer.max(1);
        self
    }

    /// Subscribes to changes on `drive`, starting its engine if needed
    ///
    /// Must be called from within a Tokio runtime.
    pub fn subscribe(&self, drive: &DriveId) -> WatchHandle {
        let (session_id, receiver, state) = match self.sessions.entry(drive.clone()) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().is_stopped() {
                    info!(drive = %drive, "Replacing stopped watch session");
                    let (session, receiver) = self.start(drive);
                    let state = session.state.clone();
                    let id = session.id;
                    let stale = occupied.insert(session);
                    stale.cancel.cancel();
                    (id, receiver, state)
                } else {
                    let session = occupied.get_mut();
                    session.subscribers += 1;
                    debug!(drive = %drive, subscribers = session.subscribers, "Joined watch session");
                    (session.id, session.events.subscribe(), session.state.clone())
                }
            }
            Entry::Vacant(vacant) => {
                let (session, receiver) = self.start(drive);
                let state = session.state.clone();
                let id = session.id;
                vacant.insert(session);
                (id, receiver, state)
            }
        };

        WatchHandle {
            sessions: Arc::clone(&self.sessions),
            drive: drive.clone(),
            session_id,
            receiver,
            state,
            released: false,
        }
    }

    /// Number of drives with a registered session
    pub fn active_sessions(&self) -> usize {
        self.sessions.len()
    }

    /// Current subscriber count for `drive` (0 if none)
    pub fn subscriber_count(&self, drive: &DriveId) -> usize {
        self.sessions.get(drive).map_or(0, |s| s.subscribers)
    }

    /// Spawns a new engine; the returned receiver exists before the engine
    /// can publish anything
    fn start(&self, drive: &DriveId) -> (WatchSession, broadcast::Receiver<ChangeBatch>) {
        let (events, receiver) = broadcast::channel(self.buffer);
        let cancel = CancellationToken::new();
        let (engine, state) = DeltaEngine::new(
            Arc::clone(&self.source),
            drive.clone(),
            self.interval,
            events.clone(),
            cancel.clone(),
        );
        tokio::spawn(engine.run());

        let session = WatchSession {
            id: SessionId::new(),
            subscribers: 1,
            cancel,
            events,
            state,
        };
        info!(drive = %drive, session = %session.id, "Started watch session");
        (session, receiver)
    }
}

// ============================================================================
// WatchHandle
// ============================================================================

/// One subscription to a drive's change batches
///
/// Dropping the handle releases the subscription.
pub struct WatchHandle {
    sessions: Arc<DashMap<DriveId, WatchSession>>,
    drive: DriveId,
    session_id: SessionId,
    receiver: broadcast::Receiver<ChangeBatch>,
    state: watch::Receiver<EngineState>,
    released: bool,
}

impl WatchHandle {
    pub fn drive(&self) -> &DriveId {
        &self.drive
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// Waits for the next batch
    ///
    /// Returns `None` once the engine has stopped and every batch it
    /// published has been delivered. A subscriber that falls more than the
    /// buffer size behind skips the oldest batches.
    pub async fn next_batch(&mut self) -> Option<ChangeBatch> {
        loop {
            tokio::select! {
                biased;
                received = self.receiver.recv() => match received {
                    Ok(batch) => return Some(batch),
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(drive = %self.drive, skipped, "Watch subscriber lagging, batches dropped");
                    }
                    Err(RecvError::Closed) => return None,
                },
                _ = self.state.wait_for(|s| *s == EngineState::Stopped) => {
                    // Batches sent before the stop are already queued
                    return match self.receiver.try_recv() {
                        Ok(batch) => Some(batch),
                        Err(_) => None,
                    };
                }
            }
        }
    }

    /// Observer of the engine behind this subscription
    pub fn engine_state(&self) -> watch::Receiver<EngineState> {
        self.state.clone()
    }

    /// Releases the subscription; the engine stops with the last release
    pub fn release(mut self) {
        self.release_inner();
    }

    fn release_inner(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        if let Entry::Occupied(mut occupied) = self.sessions.entry(self.drive.clone()) {
            if occupied.get().id != self.session_id {
                debug!(drive = %self.drive, session = %self.session_id, "Released handle of a replaced session");
                return;
            }

            let session = occupied.get_mut();
            session.subscribers = session.subscribers.saturating_sub(1);
            if session.subscribers == 0 {
                let session = occupied.remove();
                session.cancel.cancel();
                info!(drive = %self.drive, session = %session.id, "Last watcher released, stopping session");
            } else {
                debug!(drive = %self.drive, subscribers = session.subscribers, "Left watch session");
            }
        }
    }
}

impl Drop for WatchHandle {
    fn drop(&mut self) {
        self.release_inner();
    }
}
