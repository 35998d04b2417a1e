use std::collections::BTreeMap;
use std::sync::Arc;

use foundation::ids::{RegionId, SceneId};
use tracing::{debug, trace, warn};

use crate::protocol::MinimalRecord;
use crate::request::{Request, RequestSeq};
use crate::residency::ResidencyState;
use crate::source::FetchError;
use crate::window::{DEFAULT_WINDOW_SIZE, RangeKey, WindowSet, WindowSlot};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CacheKey {
    pub scene: SceneId,
    pub range: RangeKey,
}

impl CacheKey {
    pub fn new(scene: SceneId, range: RangeKey) -> Self {
        Self { scene, range }
    }
}

/// A range query the host should run and report back with
/// [`WindowedCache::complete`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeFetch {
    pub request: Request,
    pub key: CacheKey,
    pub slot: WindowSlot,
}

/// What happened to a fetch result.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Completion {
    /// Stored as the window's content.
    Applied,
    /// The fetch failed; the window keeps whatever it had.
    Failed,
    /// Superseded, evicted, or unknown; ignored.
    Stale,
}

/// Counters for dedup/staleness assertions and debug overlays.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub fetches_issued: u64,
    pub applied: u64,
    pub failed: u64,
    pub stale_discarded: u64,
    pub evicted: u64,
}

#[derive(Debug, Clone)]
struct CacheEntry {
    state: ResidencyState,
    /// Sorted by id.
    records: Option<Arc<[MinimalRecord]>>,
    /// Most recent request for this key; only its result is honored.
    latest: Option<Request>,
}

/// Keeps the previous, current and next index windows around the active
/// position resident.
///
/// The cache never performs I/O. Recomputing it yields [`RangeFetch`]
/// commands; the host runs them (concurrently, in any order) and reports the
/// results back through [`WindowedCache::complete`].
///
/// Notes on consistency:
/// - One entry per `(scene, start, end)`; indices in the same window share it
///   and at most one fetch per key is in flight.
/// - Per key only the newest request's result is applied; older results and
///   results for evicted keys are dropped.
/// - Failures never surface as errors. A window with content keeps it; a
///   window without becomes `Failed` and is retried only when a later
///   recomputation asks for it again.
#[derive(Debug)]
pub struct WindowedCache {
    window_size: u64,
    scene: Option<SceneId>,
    windows: WindowSet,
    requests: RequestSeq,
    entries: BTreeMap<CacheKey, CacheEntry>,
    in_flight: BTreeMap<Request, CacheKey>,
    stats: CacheStats,
}

impl Default for WindowedCache {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_SIZE)
    }
}

impl WindowedCache {
    pub fn new(window_size: u64) -> Self {
        Self {
            window_size: window_size.max(1),
            scene: None,
            windows: WindowSet::default(),
            requests: RequestSeq::new(),
            entries: BTreeMap::new(),
            in_flight: BTreeMap::new(),
            stats: CacheStats::default(),
        }
    }

    pub fn window_size(&self) -> u64 {
        self.window_size
    }

    pub fn scene(&self) -> Option<&SceneId> {
        self.scene.as_ref()
    }

    pub fn windows(&self) -> &WindowSet {
        &self.windows
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Switch scenes. A different scene drops every entry; results still in
    /// flight for the old scene become stale.
    pub fn set_scene(&mut self, scene: Option<SceneId>) {
        if self.scene == scene {
            return;
        }
        debug!(from = ?self.scene, to = ?scene, "scene changed, clearing window cache");
        self.stats.evicted += self.entries.len() as u64;
        self.entries.clear();
        self.in_flight.clear();
        self.windows = WindowSet::default();
        self.scene = scene;
    }

    /// Re-center the cache on `active`.
    ///
    /// Returns the fetches to run, current window first. Nothing is fetched
    /// while the scene, the count, or the active index is unknown.
    pub fn recompute(&mut self, active: Option<RegionId>, count: Option<u64>) -> Vec<RangeFetch> {
        let (Some(scene), Some(active), Some(count)) = (self.scene.clone(), active, count) else {
            return Vec::new();
        };

        self.windows = WindowSet::around(active, self.window_size, count);
        self.evict_outside_windows();

        let wanted: Vec<(WindowSlot, RangeKey)> = self.windows.by_priority().collect();
        let mut fetches = Vec::new();
        for (slot, range) in wanted {
            let key = CacheKey::new(scene.clone(), range);
            let needs_fetch = match self.entries.get(&key) {
                None => true,
                Some(e) => e.state == ResidencyState::Failed,
            };
            if needs_fetch {
                fetches.push(self.issue(key, slot));
            }
        }
        fetches
    }

    /// Refresh every window around the active index, keeping current content
    /// readable until the new results land.
    pub fn revalidate(&mut self) -> Vec<RangeFetch> {
        let Some(scene) = self.scene.clone() else {
            return Vec::new();
        };
        let wanted: Vec<(WindowSlot, RangeKey)> = self.windows.by_priority().collect();
        wanted
            .into_iter()
            .map(|(slot, range)| self.issue(CacheKey::new(scene.clone(), range), slot))
            .collect()
    }

    /// Apply the outcome of a fetch issued by this cache.
    pub fn complete(
        &mut self,
        request: Request,
        result: Result<Vec<MinimalRecord>, FetchError>,
    ) -> Completion {
        let Some(key) = self.in_flight.remove(&request) else {
            trace!(?request, "dropping result for superseded or evicted window");
            self.stats.stale_discarded += 1;
            return Completion::Stale;
        };
        let Some(entry) = self.entries.get_mut(&key) else {
            self.stats.stale_discarded += 1;
            return Completion::Stale;
        };
        if entry.latest != Some(request) {
            self.stats.stale_discarded += 1;
            return Completion::Stale;
        }
        entry.latest = None;

        match result {
            Ok(mut records) => {
                records.sort_by_key(|r| r.id);
                debug!(range = %key.range, items = records.len(), "window resident");
                entry.records = Some(records.into());
                entry.state = ResidencyState::Resident;
                self.stats.applied += 1;
                Completion::Applied
            }
            Err(err) => {
                warn!(range = %key.range, scene = %key.scene, "window fetch failed: {err}");
                entry.state = if entry.records.is_some() {
                    ResidencyState::Resident
                } else {
                    ResidencyState::Failed
                };
                self.stats.failed += 1;
                Completion::Failed
            }
        }
    }

    pub fn state(&self, range: RangeKey) -> Option<ResidencyState> {
        self.entry(range).map(|e| e.state)
    }

    /// Content of a window, stale or fresh.
    pub fn records(&self, range: RangeKey) -> Option<&[MinimalRecord]> {
        self.entry(range).and_then(|e| e.records.as_deref())
    }

    /// Minimal record for `id` from whichever resident window holds it.
    pub fn record(&self, id: RegionId) -> Option<&MinimalRecord> {
        let scene = self.scene.as_ref()?;
        self.entries
            .iter()
            .filter(|(k, _)| &k.scene == scene && k.range.contains(id))
            .filter_map(|(_, e)| e.records.as_deref())
            .find_map(|records| {
                records
                    .binary_search_by_key(&id, |r| r.id)
                    .ok()
                    .map(|i| &records[i])
            })
    }

    fn entry(&self, range: RangeKey) -> Option<&CacheEntry> {
        let scene = self.scene.clone()?;
        self.entries.get(&CacheKey::new(scene, range))
    }

    fn issue(&mut self, key: CacheKey, slot: WindowSlot) -> RangeFetch {
        let request = self.requests.next();
        let entry = self.entries.entry(key.clone()).or_insert(CacheEntry {
            state: ResidencyState::Requested,
            records: None,
            latest: None,
        });
        if let Some(old) = entry.latest.replace(request) {
            self.in_flight.remove(&old);
        }
        entry.state = if entry.records.is_some() {
            ResidencyState::Revalidating
        } else {
            ResidencyState::Requested
        };
        self.in_flight.insert(request, key.clone());
        self.stats.fetches_issued += 1;
        debug!(range = %key.range, ?slot, ?request, "fetching window");
        RangeFetch { request, key, slot }
    }

    fn evict_outside_windows(&mut self) {
        let windows = self.windows;
        let before = self.entries.len();
        self.entries.retain(|k, _| windows.contains(&k.range));
        self.in_flight.retain(|_, k| windows.contains(&k.range));
        let evicted = before - self.entries.len();
        if evicted > 0 {
            trace!(evicted, "evicted windows outside the active trio");
            self.stats.evicted += evicted as u64;
        }
    }
}
