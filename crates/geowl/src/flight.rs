//! Single-flight coordination for geo lookups.
//!
//! Concurrent requests for the same uncached address share one lookup: the
//! first caller becomes the leader and runs it, later callers subscribe to
//! the leader's result.

use geowl_core::Verdict;
use parking_lot::Mutex;
use std::collections::HashMap;
use tokio::sync::broadcast;

/// Role of a caller joining a flight
pub(crate) enum Join {
    /// No lookup was running; the caller must run one and call [`InFlight::complete`]
    Leader(broadcast::Receiver<Verdict>),
    /// A lookup is already running; wait on the receiver
    Follower(broadcast::Receiver<Verdict>),
}

/// Lookups currently in progress, keyed by canonical address
#[derive(Default)]
pub(crate) struct InFlight {
    calls: Mutex<HashMap<String, broadcast::Sender<Verdict>>>,
}

impl InFlight {
    /// Join the flight for `key`, starting one if none is running
    pub(crate) fn join(&self, key: &str) -> Join {
        let mut calls = self.calls.lock();
        if let Some(tx) = calls.get(key) {
            return Join::Follower(tx.subscribe());
        }

        let (tx, rx) = broadcast::channel(1);
        calls.insert(key.to_string(), tx);
        Join::Leader(rx)
    }

    /// Publish the verdict for `key` and close its flight
    pub(crate) fn complete(&self, key: &str, verdict: Verdict) {
        let tx = self.calls.lock().remove(key);
        if let Some(tx) = tx {
            // No receivers left is fine: every caller went away
            let _ = tx.send(verdict);
        }
    }

    /// Close the flight for `key` without a verdict; waiters see the channel close
    pub(crate) fn abandon(&self, key: &str) {
        self.calls.lock().remove(key);
    }

    /// Number of lookups in progress
    pub(crate) fn len(&self) -> usize {
        self.calls.lock().len()
    }
}

/// Abandons the flight on drop unless completed
///
/// Held by the leader's task so that a panic or cancellation never leaves
/// followers waiting forever.
pub(crate) struct FlightGuard<'a> {
    flights: &'a InFlight,
    key: &'a str,
    done: bool,
}

impl<'a> FlightGuard<'a> {
    pub(crate) const fn new(flights: &'a InFlight, key: &'a str) -> Self {
        Self {
            flights,
            key,
            done: false,
        }
    }

    pub(crate) fn complete(mut self, verdict: Verdict) {
        self.done = true;
        self.flights.complete(self.key, verdict);
    }
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        if !self.done {
            self.flights.abandon(self.key);
        }
    }
}
