//! Outstanding delivery requests, at most one per unit.
//!
//! Every mutation goes through the entry API of a sharded map, so the
//! check-then-act sequences below hold the shard lock for the key they touch
//! and nothing else. Requests for different units do not contend unless they
//! happen to hash into the same shard.

use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::{debug, info};

use crate::types::{DeliveryError, DeliveryResult, UnitId};

/// One outstanding delivery need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub unit: UnitId,
    pub requested_at: DateTime<Utc>,
    /// Whether a group notification has been emitted for this request.
    pub announced: bool,
}

impl Request {
    fn new(unit: UnitId) -> Self {
        Self {
            unit,
            requested_at: Utc::now(),
            announced: false,
        }
    }
}

/// A request was recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accepted(pub Request);

/// A request was removed by an acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cleared(pub Request);

#[derive(Debug, Default)]
pub struct RequestLedger {
    requests: DashMap<UnitId, Request>,
}

impl RequestLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a request for `unit` unless one is already outstanding.
    pub fn submit(&self, unit: &UnitId) -> DeliveryResult<Accepted> {
        match self.requests.entry(unit.clone()) {
            Entry::Occupied(_) => {
                debug!(%unit, "request already outstanding");
                Err(DeliveryError::already_outstanding(unit))
            }
            Entry::Vacant(slot) => {
                let request = Request::new(unit.clone());
                slot.insert(request.clone());
                info!(%unit, "request recorded");
                Ok(Accepted(request))
            }
        }
    }

    /// Remove the outstanding request for `unit`.
    pub fn acknowledge(&self, unit: &UnitId) -> DeliveryResult<Cleared> {
        match self.requests.remove(unit) {
            Some((_, request)) => {
                info!(%unit, "request cleared");
                Ok(Cleared(request))
            }
            None => {
                debug!(%unit, "no outstanding request to clear");
                Err(DeliveryError::not_found(unit))
            }
        }
    }

    pub fn has_outstanding(&self, unit: &UnitId) -> bool {
        self.requests.contains_key(unit)
    }

    /// Mark the request for `unit` as announced.
    ///
    /// Returns `true` for exactly one caller per request; `false` when the
    /// request was already announced or no longer exists.
    pub fn claim_announcement(&self, unit: &UnitId) -> bool {
        match self.requests.get_mut(unit) {
            Some(mut request) if !request.announced => {
                request.announced = true;
                true
            }
            _ => false,
        }
    }

    /// Units whose request has not been announced to any group yet, oldest first.
    pub fn unannounced(&self) -> Vec<UnitId> {
        let mut pending: Vec<(DateTime<Utc>, UnitId)> = self
            .requests
            .iter()
            .filter(|entry| !entry.announced)
            .map(|entry| (entry.requested_at, entry.key().clone()))
            .collect();
        pending.sort();
        pending.into_iter().map(|(_, unit)| unit).collect()
    }

    /// Snapshot of every outstanding request, oldest first.
    pub fn outstanding(&self) -> Vec<Request> {
        let mut requests: Vec<Request> = self
            .requests
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        requests.sort_by(|a, b| {
            a.requested_at
                .cmp(&b.requested_at)
                .then_with(|| a.unit.cmp(&b.unit))
        });
        requests
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(raw: &str) -> UnitId {
        UnitId::parse(raw).expect("valid unit")
    }

    #[test]
    fn submit_then_duplicate_is_rejected() {
        let ledger = RequestLedger::new();

        let Accepted(request) = ledger.submit(&unit("12")).expect("first submit accepted");
        assert_eq!(request.unit, unit("12"));
        assert!(!request.announced);
        assert!(ledger.has_outstanding(&unit("12")));

        let duplicate = ledger.submit(&unit("12"));
        assert_eq!(
            duplicate,
            Err(DeliveryError::AlreadyOutstanding { unit: unit("12") })
        );
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn acknowledge_on_idle_unit_is_not_found() {
        let ledger = RequestLedger::new();

        assert_eq!(
            ledger.acknowledge(&unit("3")),
            Err(DeliveryError::NotFound { unit: unit("3") })
        );
        assert!(!ledger.has_outstanding(&unit("3")));
    }

    #[test]
    fn acknowledge_clears_once() {
        let ledger = RequestLedger::new();
        ledger.submit(&unit("7")).expect("accepted");

        let Cleared(request) = ledger.acknowledge(&unit("7")).expect("cleared");
        assert_eq!(request.unit, unit("7"));
        assert!(!ledger.has_outstanding(&unit("7")));
        assert!(ledger.acknowledge(&unit("7")).is_err());
    }

    #[test]
    fn unit_cycles_back_to_outstanding_after_clear() {
        let ledger = RequestLedger::new();
        ledger.submit(&unit("7")).expect("accepted");
        ledger.acknowledge(&unit("7")).expect("cleared");

        assert!(ledger.submit(&unit("7")).is_ok());
    }

    #[test]
    fn announcement_is_claimed_once() {
        let ledger = RequestLedger::new();
        ledger.submit(&unit("5")).expect("accepted");

        assert_eq!(ledger.unannounced(), vec![unit("5")]);
        assert!(ledger.claim_announcement(&unit("5")));
        assert!(!ledger.claim_announcement(&unit("5")));
        assert!(ledger.unannounced().is_empty());
    }

    #[test]
    fn claim_on_missing_request_fails() {
        let ledger = RequestLedger::new();
        assert!(!ledger.claim_announcement(&unit("5")));
    }

    #[test]
    fn busy_unit_does_not_block_submits_for_other_units() {
        use std::sync::{mpsc, Arc};
        use std::thread;
        use std::time::Duration;

        const UNITS: usize = 64;

        let ledger = Arc::new(RequestLedger::new());
        ledger.submit(&unit("busy")).expect("accepted");

        // Holds the write lock of the shard that stores "busy".
        let guard = ledger
            .requests
            .get_mut(&unit("busy"))
            .expect("request present");

        let (done, finished) = mpsc::channel();
        let workers: Vec<_> = (0..UNITS)
            .map(|index| {
                let ledger = Arc::clone(&ledger);
                let done = done.clone();
                thread::spawn(move || {
                    let accepted = ledger.submit(&unit(&format!("flat-{index}"))).is_ok();
                    let _ = done.send(accepted);
                })
            })
            .collect();
        drop(done);

        let mut while_busy = 0;
        while let Ok(accepted) = finished.recv_timeout(Duration::from_millis(500)) {
            assert!(accepted);
            while_busy += 1;
        }
        assert!(
            while_busy > 0,
            "submits for units in other shards should complete while one unit is held"
        );

        drop(guard);
        for worker in workers {
            worker.join().expect("submitter thread panicked");
        }
        assert_eq!(ledger.len(), UNITS + 1);
    }

    #[test]
    fn outstanding_lists_every_request() {
        let ledger = RequestLedger::new();
        ledger.submit(&unit("1")).expect("accepted");
        ledger.submit(&unit("2")).expect("accepted");

        let units: Vec<UnitId> = ledger
            .outstanding()
            .into_iter()
            .map(|request| request.unit)
            .collect();
        assert_eq!(units.len(), 2);
        assert!(units.contains(&unit("1")));
        assert!(units.contains(&unit("2")));
    }
}
