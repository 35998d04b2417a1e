use std::time::Duration;

use foundation::ids::{RegionId, SceneId};
use foundation::time::Time;
use runtime::timer::Debounce;
use streaming::cache::Completion;
use streaming::protocol::FullRecord;
use streaming::request::{Request, RequestSeq};
use streaming::source::FetchError;
use tracing::{debug, trace, warn};

/// A single-record query the host should run and report back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FullFetch {
    pub request: Request,
    pub scene: SceneId,
    pub id: RegionId,
}

/// Fetches the full record for the active index once it has been stable
/// for the debounce delay.
///
/// Only the newest request is honored, and only if its id is still active
/// when it resolves.
#[derive(Debug)]
pub struct FullRecordUpgrade {
    debounce: Debounce<RegionId>,
    requests: RequestSeq,
    latest: Option<(Request, RegionId)>,
    record: Option<FullRecord>,
}

impl FullRecordUpgrade {
    pub fn new(delay: Duration) -> Self {
        Self {
            debounce: Debounce::new(delay),
            requests: RequestSeq::new(),
            latest: None,
            record: None,
        }
    }

    /// The active index changed; restart the debounce.
    pub fn watch(&mut self, active: Option<RegionId>, now: Time) {
        match active {
            Some(id) => self.debounce.trigger(id, now),
            None => {
                self.debounce.cancel();
            }
        }
    }

    pub fn deadline(&self) -> Option<Time> {
        self.debounce.deadline()
    }

    /// Issue the fetch once the debounce elapses.
    pub fn poll(&mut self, now: Time, scene: Option<&SceneId>) -> Option<FullFetch> {
        let id = self.debounce.poll(now)?;
        let scene = scene?.clone();
        if self.record.as_ref().is_some_and(|r| r.id == id) {
            trace!(id, "full record already resident");
            return None;
        }
        let request = self.requests.next();
        self.latest = Some((request, id));
        debug!(id, ?request, "fetching full record");
        Some(FullFetch { request, scene, id })
    }

    pub fn complete(
        &mut self,
        request: Request,
        result: Result<FullRecord, FetchError>,
        active: Option<RegionId>,
    ) -> Completion {
        let Some((latest, id)) = self.latest else {
            return Completion::Stale;
        };
        if latest != request {
            trace!(?request, "dropping superseded full record");
            return Completion::Stale;
        }
        self.latest = None;

        match result {
            Ok(record) if Some(id) == active && record.id == id => {
                self.record = Some(record);
                Completion::Applied
            }
            Ok(_) => {
                trace!(id, ?active, "dropping full record for inactive index");
                Completion::Stale
            }
            Err(err) => {
                warn!(id, "full record fetch failed: {err}");
                Completion::Failed
            }
        }
    }

    /// Full record for `id`, if that is the one held.
    pub fn record_for(&self, id: RegionId) -> Option<&FullRecord> {
        self.record.as_ref().filter(|r| r.id == id)
    }

    /// A fetch for `active` is waiting on the debounce or in flight.
    pub fn is_upgrading(&self, active: Option<RegionId>) -> bool {
        let Some(active) = active else {
            return false;
        };
        if self.record_for(active).is_some() {
            return false;
        }
        self.debounce.pending() == Some(&active)
            || self.latest.is_some_and(|(_, id)| id == active)
    }

    /// Drop everything, including the request in flight.
    pub fn clear(&mut self) {
        self.debounce.cancel();
        self.latest = None;
        self.record = None;
    }
}
