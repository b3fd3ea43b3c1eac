//! Delta polling engine
//!
//! One [`DeltaEngine`] runs per watched drive. It keeps the rolling delta
//! cursor, polls on a fixed interval and turns each non-empty round into one
//! ordered [`ChangeBatch`].
//!
//! ## Lifecycle
//!
//! ```text
//! Initializing ──→ Waiting ⇄ Polling
//!       │             │         │
//!       └─────────────┴─────────┴──→ Stopped
//! ```
//!
//! - **Initializing**: full delta without cursor. The result only seeds the
//!   baseline snapshot; no events are emitted.
//! - **Waiting**: interval sleep, interrupted by cancellation.
//! - **Polling**: fetch since the cursor. A result that arrives after
//!   cancellation is discarded.
//! - **Stopped**: terminal. Reached on cancellation or on a remote error.
//!
//! An expired cursor sends the engine back through Initializing instead of
//! stopping it.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use graphvfs_core::domain::{ChangeBatch, ChangeEvent, ChangeType, DeltaToken, DriveId};
use graphvfs_core::ports::{DeltaCursorExpired, IDeltaSource};
use tokio::sync::{broadcast, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::snapshot::DeltaSnapshot;

// ============================================================================
// EngineState
// ============================================================================

/// Observable phase of a [`DeltaEngine`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Initializing,
    Polling,
    Waiting,
    Stopped,
}

impl std::fmt::Display for EngineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            EngineState::Initializing => "initializing",
            EngineState::Polling => "polling",
            EngineState::Waiting => "waiting",
            EngineState::Stopped => "stopped",
        };
        f.write_str(s)
    }
}

// ============================================================================
// Classification
// ============================================================================

/// Turns one non-empty round into change events, in page order
///
/// - tombstones become `Deleted`, located by their path in `previous`;
///   an item unknown there is located within `current` instead
/// - items created strictly after `since` become `Created`
/// - everything else becomes `Changed`
///
/// An item whose path cannot be determined (a nameless tombstone unknown to
/// `previous`) is skipped with a warning.
///
/// `since` is the server time of the preceding round. Because the server
/// clock and creation stamps can disagree slightly, an item created just
/// before a poll may be reported as `Changed`.
pub fn classify(
    current: &DeltaSnapshot,
    previous: &DeltaSnapshot,
    since: DateTime<Utc>,
) -> Vec<ChangeEvent> {
    let mut current_paths = current.paths();
    let mut previous_paths = previous.paths();

    current
        .items()
        .iter()
        .filter_map(|item| {
            let (change_type, path) = if item.is_deleted {
                let path = previous_paths
                    .path_by_id(&item.id)
                    .or_else(|| current_paths.path_of(item));
                (ChangeType::Deleted, path)
            } else {
                let change_type = match item.created_at {
                    Some(created) if created > since => ChangeType::Created,
                    _ => ChangeType::Changed,
                };
                (change_type, current_paths.path_of(item))
            };

            match path {
                Some(path) => Some(ChangeEvent::new(change_type, path)),
                None => {
                    warn!(item = %item.id, change = %change_type, "Change has no resolvable path, skipping");
                    None
                }
            }
        })
        .collect()
}

// ============================================================================
// DeltaEngine
// ============================================================================

/// State carried from one round to the next
struct RoundState {
    /// Last non-empty snapshot (empty rounds do not replace it)
    previous: DeltaSnapshot,
    cursor: Option<DeltaToken>,
    /// Server time of the most recent round, empty or not
    last_timestamp: DateTime<Utc>,
}

/// Polling loop for one drive
pub struct DeltaEngine {
    source: Arc<dyn IDeltaSource>,
    drive: DriveId,
    interval: Duration,
    events: broadcast::Sender<ChangeBatch>,
    state: watch::Sender<EngineState>,
    cancel: CancellationToken,
}

impl DeltaEngine {
    /// Creates an engine that publishes batches on `events`
    ///
    /// # Returns
    /// The engine and a receiver that observes its state transitions.
    pub fn new(
        source: Arc<dyn IDeltaSource>,
        drive: DriveId,
        interval: Duration,
        events: broadcast::Sender<ChangeBatch>,
        cancel: CancellationToken,
    ) -> (Self, watch::Receiver<EngineState>) {
        let (state, state_rx) = watch::channel(EngineState::Initializing);
        let engine = Self {
            source,
            drive,
            interval,
            events,
            state,
            cancel,
        };
        (engine, state_rx)
    }

    /// Runs until cancelled or until a remote error stops the engine
    pub async fn run(self) {
        info!(drive = %self.drive, interval_ms = self.interval.as_millis() as u64, "Delta engine started");

        if let Some(mut round) = self.baseline().await {
            loop {
                self.set_state(EngineState::Waiting);
                tokio::select! {
                    _ = self.cancel.cancelled() => break,
                    _ = tokio::time::sleep(self.interval) => {}
                }

                self.set_state(EngineState::Polling);
                let result = tokio::select! {
                    biased;
                    _ = self.cancel.cancelled() => break,
                    result = self.source.fetch_delta(&self.drive, round.cursor.as_ref()) => result,
                };

                match result {
                    Ok(page) => {
                        if !self.apply(&mut round, DeltaSnapshot::from(page)) {
                            break;
                        }
                    }
                    Err(e) if e.downcast_ref::<DeltaCursorExpired>().is_some() => {
                        warn!(drive = %self.drive, "Delta cursor expired, rebuilding baseline");
                        match self.baseline().await {
                            Some(fresh) => round = fresh,
                            None => break,
                        }
                    }
                    Err(e) => {
                        error!(drive = %self.drive, error = %format!("{e:#}"), "Delta poll failed, stopping engine");
                        break;
                    }
                }
            }
        }

        self.set_state(EngineState::Stopped);
        info!(drive = %self.drive, "Delta engine stopped");
    }

    /// Fetches the full item set without emitting events
    ///
    /// Returns `None` if cancelled or if the fetch failed.
    async fn baseline(&self) -> Option<RoundState> {
        self.set_state(EngineState::Initializing);

        let result = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return None,
            result = self.source.fetch_delta(&self.drive, None) => result,
        };

        match result {
            Ok(page) => {
                let snapshot = DeltaSnapshot::from(page);
                if snapshot.cursor().is_none() {
                    warn!(drive = %self.drive, "Baseline carried no delta cursor; next poll repeats it");
                }
                debug!(drive = %self.drive, items = snapshot.len(), "Baseline snapshot built");
                Some(RoundState {
                    cursor: snapshot.cursor().cloned(),
                    last_timestamp: snapshot.timestamp(),
                    previous: snapshot,
                })
            }
            Err(e) => {
                error!(drive = %self.drive, error = %format!("{e:#}"), "Baseline delta failed, stopping engine");
                None
            }
        }
    }

    /// Folds one polled snapshot into the round state and publishes its batch
    ///
    /// Returns `false` if the engine was cancelled before publishing.
    fn apply(&self, round: &mut RoundState, snapshot: DeltaSnapshot) -> bool {
        match snapshot.cursor() {
            Some(cursor) => round.cursor = Some(cursor.clone()),
            None => warn!(drive = %self.drive, "Delta response carried no cursor; keeping the previous one"),
        }

        if snapshot.is_empty() {
            debug!(drive = %self.drive, "No remote changes");
            round.last_timestamp = snapshot.timestamp();
            return true;
        }

        let events = classify(&snapshot, &round.previous, round.last_timestamp);
        if self.cancel.is_cancelled() {
            return false;
        }

        debug!(drive = %self.drive, events = events.len(), "Publishing change batch");
        if self.events.send(Arc::new(events)).is_err() {
            debug!(drive = %self.drive, "No subscribers for change batch");
        }

        round.last_timestamp = snapshot.timestamp();
        round.previous = snapshot;
        true
    }

    fn set_state(&self, state: EngineState) {
        self.state.send_replace(state);
        debug!(drive = %self.drive, state = %state, "Engine state");
    }
}
