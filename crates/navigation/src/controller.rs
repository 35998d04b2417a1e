//! Optimistic navigation over a remote collection.
//!
//! [`NavigationController`] is the single owner of the navigation state. It
//! never performs I/O: inputs (navigations, gesture intents, scene and
//! router updates, fetch results, clock ticks) mutate it synchronously, and
//! the fetches it needs come out of [`NavigationController::take_commands`]
//! for the host (usually [`crate::session::Session`]) to run.

use std::rc::Rc;
use std::str::FromStr;

use foundation::ids::{RegionId, SceneId};
use foundation::time::Time;
use runtime::clock::Clock;
use runtime::observable::{Observable, SubscriptionId};
use runtime::timer::Debounce;
use streaming::cache::{Completion, RangeFetch, WindowedCache};
use streaming::protocol::{FullRecord, MinimalRecord, SceneInfo};
use streaming::request::Request;
use streaming::source::FetchError;
use tracing::{debug, info};

use crate::config::NavigationConfig;
use crate::intent::{NavAction, NavigationIntent};
use crate::reconcile::{Reconciler, SeekPhase};
use crate::upgrade::{FullFetch, FullRecordUpgrade};

/// The authoritative location of the viewer, typically the URL.
pub trait Router {
    /// Make `index` the confirmed position. The new position comes back
    /// through [`NavigationController::set_confirmed`].
    fn commit(&mut self, index: RegionId);
    /// Leave the item view for the collection-level view.
    fn exit(&mut self);
}

/// Where a navigation goes.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum NavTarget {
    /// Relative to the active index.
    Offset(i64),
    /// A specific record, optionally shifted by the navigation offset.
    Record(RegionId),
}

/// A navigation target string that is not a number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTargetError {
    input: String,
}

impl std::fmt::Display for ParseTargetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid navigation target {:?}", self.input)
    }
}

impl std::error::Error for ParseTargetError {}

impl FromStr for NavTarget {
    type Err = ParseTargetError;

    /// Numeric strings are offsets.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(NavTarget::Offset)
            .map_err(|_| ParseTargetError {
                input: s.to_string(),
            })
    }
}

/// What the UI shows for the active index.
#[derive(Debug, Clone, PartialEq)]
pub enum RegionView {
    Full(FullRecord),
    Minimal(MinimalRecord),
    Loading { id: RegionId },
}

impl RegionView {
    pub fn id(&self) -> RegionId {
        match self {
            RegionView::Full(r) => r.id,
            RegionView::Minimal(r) => r.id,
            RegionView::Loading { id } => *id,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, RegionView::Loading { .. })
    }
}

/// A fetch the host must run and report back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Report with [`NavigationController::complete_range`].
    Range(RangeFetch),
    /// Report with [`NavigationController::complete_full`].
    Full(FullFetch),
}

/// What [`NavigationController::apply_intent`] did.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum IntentOutcome {
    Navigated,
    /// The step would leave the collection.
    Rejected,
    Exited,
    /// The host should treat the interaction as a click.
    ClickThrough,
    Ignored,
}

pub struct NavigationController {
    config: NavigationConfig,
    clock: Rc<dyn Clock>,
    router: Box<dyn Router>,
    scene: Option<SceneInfo>,
    seek: Reconciler,
    /// `None` when commits are immediate.
    commit: Option<Debounce<RegionId>>,
    cache: WindowedCache,
    upgrade: FullRecordUpgrade,
    /// Inputs of the last cache recomputation; `None` forces the next one.
    cache_inputs: Option<(Option<RegionId>, Option<u64>)>,
    commands: Vec<Command>,
    active_index: Observable<Option<RegionId>>,
    is_seeking: Observable<bool>,
    region: Observable<Option<RegionView>>,
}

impl NavigationController {
    pub fn new(config: NavigationConfig, router: Box<dyn Router>, clock: Rc<dyn Clock>) -> Self {
        Self {
            seek: Reconciler::new(config.seeking_min()),
            commit: config.commit.delay().map(Debounce::new),
            cache: WindowedCache::new(config.window_size),
            upgrade: FullRecordUpgrade::new(config.upgrade_debounce()),
            cache_inputs: None,
            commands: Vec::new(),
            active_index: Observable::new(None),
            is_seeking: Observable::new(false),
            region: Observable::new(None),
            scene: None,
            config,
            clock,
            router,
        }
    }

    pub fn config(&self) -> &NavigationConfig {
        &self.config
    }

    pub fn now(&self) -> Time {
        self.clock.now()
    }

    pub fn scene(&self) -> Option<&SceneInfo> {
        self.scene.as_ref()
    }

    /// Item count; unknown without a scene or while it loads.
    pub fn count(&self) -> Option<u64> {
        self.scene.as_ref().and_then(SceneInfo::count)
    }

    pub fn active_index(&self) -> Option<RegionId> {
        *self.active_index.get()
    }

    pub fn desired(&self) -> Option<RegionId> {
        self.seek.desired()
    }

    pub fn confirmed(&self) -> Option<RegionId> {
        self.seek.confirmed()
    }

    pub fn phase(&self) -> SeekPhase {
        self.seek.phase()
    }

    pub fn is_seeking(&self) -> bool {
        *self.is_seeking.get()
    }

    pub fn region(&self) -> Option<&RegionView> {
        self.region.get().as_ref()
    }

    pub fn is_upgrading(&self) -> bool {
        self.upgrade.is_upgrading(self.active_index())
    }

    pub fn cache(&self) -> &WindowedCache {
        &self.cache
    }

    pub fn subscribe_active_index(
        &mut self,
        f: impl FnMut(&Option<RegionId>) + 'static,
    ) -> SubscriptionId {
        self.active_index.subscribe(f)
    }

    pub fn unsubscribe_active_index(&mut self, id: SubscriptionId) -> bool {
        self.active_index.unsubscribe(id)
    }

    pub fn subscribe_seeking(&mut self, f: impl FnMut(&bool) + 'static) -> SubscriptionId {
        self.is_seeking.subscribe(f)
    }

    pub fn unsubscribe_seeking(&mut self, id: SubscriptionId) -> bool {
        self.is_seeking.unsubscribe(id)
    }

    pub fn subscribe_region(
        &mut self,
        f: impl FnMut(&Option<RegionView>) + 'static,
    ) -> SubscriptionId {
        self.region.subscribe(f)
    }

    pub fn unsubscribe_region(&mut self, id: SubscriptionId) -> bool {
        self.region.unsubscribe(id)
    }

    /// Move to `target`. Returns `false`, changing nothing, if the result
    /// falls outside `1..=count` or the count is unknown.
    ///
    /// `offset` only applies to [`NavTarget::Record`]; an offset navigation
    /// that also carries one is rejected.
    ///
    /// The new active index is visible as soon as this returns; the router
    /// commit follows the configured policy.
    pub fn navigate(&mut self, target: NavTarget, offset: Option<i64>) -> bool {
        let Some(count) = self.count() else {
            debug!(?target, "navigation rejected, count unknown");
            return false;
        };
        let next = match target {
            NavTarget::Offset(_) if offset.is_some() => {
                debug!(?target, ?offset, "navigation rejected, offset given twice");
                return false;
            }
            NavTarget::Offset(n) => self
                .active_index()
                .and_then(|active| i64::try_from(active).ok())
                .and_then(|active| active.checked_add(n)),
            NavTarget::Record(id) => i64::try_from(id)
                .ok()
                .and_then(|id| id.checked_add(offset.unwrap_or(0))),
        };
        let Some(next) = next
            .and_then(|n| RegionId::try_from(n).ok())
            .filter(|n| (1..=count).contains(n))
        else {
            debug!(?target, ?offset, count, "navigation out of range");
            return false;
        };

        let now = self.clock.now();
        self.seek.begin(next, now);
        match self.commit.as_mut() {
            Some(debounce) => debounce.trigger(next, now),
            None => self.router.commit(next),
        }
        self.upgrade.watch(Some(next), now);
        self.refresh(now);
        true
    }

    /// React to a gesture.
    pub fn apply_intent(&mut self, intent: NavigationIntent) -> IntentOutcome {
        match intent.action() {
            Some(NavAction::Step(n)) => {
                if self.navigate(NavTarget::Offset(n), None) {
                    IntentOutcome::Navigated
                } else {
                    IntentOutcome::Rejected
                }
            }
            Some(NavAction::Level(_)) => {
                self.exit();
                IntentOutcome::Exited
            }
            Some(NavAction::Interrupted) => IntentOutcome::ClickThrough,
            None => IntentOutcome::Ignored,
        }
    }

    /// Back to the collection view. Drops any commit still waiting.
    pub fn exit(&mut self) {
        if let Some(dropped) = self.commit.as_mut().and_then(Debounce::cancel) {
            debug!(index = dropped, "pending commit dropped on exit");
        }
        info!("leaving item view");
        self.router.exit();
    }

    /// Switch or update the scene.
    ///
    /// A different scene id drops all cached records and any navigation in
    /// progress. A count that no longer covers the desired index drops the
    /// navigation too.
    pub fn set_scene(&mut self, scene: Option<SceneInfo>) {
        let now = self.clock.now();
        let id: Option<SceneId> = scene.as_ref().map(|s| s.id.clone());
        let changed = self.cache.scene() != id.as_ref();
        if changed {
            info!(scene = ?id, "scene changed");
            self.cache.set_scene(id);
            self.abandon_navigation();
            self.upgrade.clear();
            self.cache_inputs = None;
        }
        self.scene = scene;

        if let (Some(desired), Some(count)) = (self.seek.desired(), self.count()) {
            if desired > count {
                debug!(desired, count, "desired index beyond the collection");
                self.abandon_navigation();
            }
        }
        if changed {
            self.upgrade.watch(self.seek.active(), now);
        }
        self.refresh(now);
    }

    /// The authoritative index changed.
    pub fn set_confirmed(&mut self, index: Option<RegionId>) {
        self.seek.confirm(index);
        self.refresh(self.clock.now());
    }

    /// Advance every timer to `now`.
    pub fn tick(&mut self, now: Time) {
        if let Some(index) = self.commit.as_mut().and_then(|d| d.poll(now)) {
            debug!(index, "committing navigation");
            self.router.commit(index);
        }
        self.seek.tick(now);
        // While the scene loads the upgrade stays due and fires once it is
        // ready.
        if self.count().is_some() {
            if let Some(fetch) = self.upgrade.poll(now, self.cache.scene()) {
                self.commands.push(Command::Full(fetch));
            }
        }
        self.refresh(now);
    }

    /// Earliest time at which [`Self::tick`] has something to do.
    pub fn next_deadline(&self) -> Option<Time> {
        [
            self.commit.as_ref().and_then(Debounce::deadline),
            self.seek.deadline(),
            self.upgrade.deadline(),
        ]
        .into_iter()
        .flatten()
        .min_by(|a, b| a.0.total_cmp(&b.0))
    }

    /// Refresh the windows around the active index. No-op while the count
    /// is unknown.
    pub fn revalidate(&mut self) {
        if self.count().is_none() {
            return;
        }
        let fetches = self.cache.revalidate();
        self.commands.extend(fetches.into_iter().map(Command::Range));
    }

    pub fn take_commands(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.commands)
    }

    pub fn complete_range(
        &mut self,
        request: Request,
        result: Result<Vec<MinimalRecord>, FetchError>,
    ) -> Completion {
        let outcome = self.cache.complete(request, result);
        self.refresh(self.clock.now());
        outcome
    }

    pub fn complete_full(
        &mut self,
        request: Request,
        result: Result<FullRecord, FetchError>,
    ) -> Completion {
        let outcome = self.upgrade.complete(request, result, self.active_index());
        self.refresh(self.clock.now());
        outcome
    }

    /// Drop the optimistic target and the commit waiting for it.
    fn abandon_navigation(&mut self) {
        self.seek.reset();
        if let Some(dropped) = self.commit.as_mut().and_then(Debounce::cancel) {
            debug!(index = dropped, "pending commit dropped");
        }
    }

    fn region_view(&self) -> Option<RegionView> {
        let id = self.active_index()?;
        let view = if let Some(full) = self.upgrade.record_for(id) {
            RegionView::Full(full.clone())
        } else if let Some(minimal) = self.cache.record(id) {
            RegionView::Minimal(minimal.clone())
        } else {
            RegionView::Loading { id }
        };
        Some(view)
    }

    /// Recompute everything derived from the current inputs and notify
    /// subscribers of what changed.
    fn refresh(&mut self, now: Time) {
        let active = self.seek.active();
        if self.active_index.set(active) {
            self.upgrade.watch(active, now);
        }

        let inputs = (active, self.count());
        if self.cache_inputs != Some(inputs) {
            self.cache_inputs = Some(inputs);
            let fetches = self.cache.recompute(inputs.0, inputs.1);
            self.commands.extend(fetches.into_iter().map(Command::Range));
        }

        self.is_seeking.set(self.seek.is_seeking(now));
        let view = self.region_view();
        self.region.set(view);
    }
}

impl std::fmt::Debug for NavigationController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NavigationController")
            .field("scene", &self.scene)
            .field("seek", &self.seek)
            .field("active_index", self.active_index.get())
            .field("cache", &self.cache)
            .field("pending_commands", &self.commands.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::{Command, IntentOutcome, NavTarget, NavigationController, RegionView, Router};
    use crate::config::{CommitPolicy, NavigationConfig};
    use crate::intent::NavigationIntent;
    use crate::reconcile::SeekPhase;
    use foundation::bounds::Rect;
    use foundation::time::Time;
    use pretty_assertions::assert_eq;
    use runtime::clock::{Clock, ManualClock};
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;
    use streaming::cache::Completion;
    use streaming::protocol::{FullRecord, MinimalRecord, SceneInfo};
    use streaming::source::FetchError;
    use streaming::window::{RangeKey, WindowSlot};

    #[derive(Debug, Clone, PartialEq)]
    enum RouterCall {
        Commit(u64),
        Exit,
    }

    #[derive(Clone, Default)]
    struct RecordingRouter {
        calls: Rc<RefCell<Vec<RouterCall>>>,
    }

    impl RecordingRouter {
        fn calls(&self) -> Vec<RouterCall> {
            self.calls.borrow().clone()
        }
    }

    impl Router for RecordingRouter {
        fn commit(&mut self, index: u64) {
            self.calls.borrow_mut().push(RouterCall::Commit(index));
        }

        fn exit(&mut self) {
            self.calls.borrow_mut().push(RouterCall::Exit);
        }
    }

    struct Harness {
        nav: NavigationController,
        clock: ManualClock,
        router: RecordingRouter,
    }

    impl Harness {
        fn new(config: NavigationConfig, count: u64, confirmed: u64) -> Self {
            let clock = ManualClock::new();
            let router = RecordingRouter::default();
            let mut nav = NavigationController::new(
                config,
                Box::new(router.clone()),
                Rc::new(clock.clone()),
            );
            nav.set_scene(Some(SceneInfo::new("s", count)));
            nav.set_confirmed(Some(confirmed));
            Self { nav, clock, router }
        }

        fn with_count(count: u64, confirmed: u64) -> Self {
            Self::new(NavigationConfig::default(), count, confirmed)
        }

        fn advance_ms(&mut self, ms: u64) {
            self.clock.advance(Duration::from_millis(ms));
            self.nav.tick(self.clock.now());
        }

        fn range_fetches(&mut self) -> Vec<streaming::cache::RangeFetch> {
            self.nav
                .take_commands()
                .into_iter()
                .filter_map(|c| match c {
                    Command::Range(f) => Some(f),
                    Command::Full(_) => None,
                })
                .collect()
        }

        fn resolve_ranges(&mut self) {
            for fetch in self.range_fetches() {
                let records = (fetch.key.range.start..=fetch.key.range.end)
                    .map(|id| MinimalRecord {
                        id,
                        bounds: Rect::new(0.0, id as f64, 1.0, 1.0),
                    })
                    .collect();
                self.nav.complete_range(fetch.request, Ok(records));
            }
        }
    }

    fn full(id: u64) -> FullRecord {
        FullRecord {
            id,
            bounds: Rect::new(0.0, id as f64, 1.0, 1.0),
            data: serde_json::json!({ "name": format!("IMG_{id:04}.jpg") }),
        }
    }

    #[test]
    fn offset_navigation_accepts_exactly_the_collection() {
        let count = 250;
        for start in [1, 2, 125, 249, 250] {
            for offset in [-300, -250, -1, 0, 1, 124, 125, 249, 300] {
                let mut h = Harness::with_count(count, start);
                let target = start as i64 + offset;
                let expected = (1..=count as i64).contains(&target);
                assert_eq!(
                    h.nav.navigate(NavTarget::Offset(offset), None),
                    expected,
                    "start {start} offset {offset}"
                );
                let active = if expected { target as u64 } else { start };
                assert_eq!(h.nav.active_index(), Some(active));
            }
        }
    }

    #[test]
    fn rejected_navigation_changes_nothing() {
        let mut h = Harness::with_count(10, 10);
        h.nav.take_commands();
        assert!(!h.nav.navigate(NavTarget::Offset(1), None));
        assert!(!h.nav.navigate(NavTarget::Record(0), None));
        assert!(!h.nav.navigate(NavTarget::Record(3), Some(-5)));
        assert_eq!(h.nav.desired(), None);
        assert!(!h.nav.is_seeking());
        assert!(h.nav.take_commands().is_empty());
        h.advance_ms(5000);
        assert!(h.router.calls().is_empty());
    }

    #[test]
    fn navigation_needs_a_known_count() {
        let clock = ManualClock::new();
        let mut nav = NavigationController::new(
            NavigationConfig::default(),
            Box::new(RecordingRouter::default()),
            Rc::new(clock),
        );
        assert!(!nav.navigate(NavTarget::Record(1), None));

        nav.set_scene(Some(SceneInfo::loading("s")));
        assert!(!nav.navigate(NavTarget::Record(1), None));
        assert!(nav.take_commands().is_empty());

        nav.set_scene(Some(SceneInfo::new("s", 5)));
        // Nothing to offset from yet.
        assert!(!nav.navigate(NavTarget::Offset(1), None));
        assert!(nav.navigate(NavTarget::Record(2), Some(1)));
        assert_eq!(nav.active_index(), Some(3));
    }

    #[test]
    fn active_index_is_published_synchronously() {
        let mut h = Harness::with_count(250, 1);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        h.nav.subscribe_active_index(move |v| sink.borrow_mut().push(*v));

        assert!(h.nav.navigate(NavTarget::Offset(4), None));
        assert_eq!(*seen.borrow(), vec![Some(5)]);
        assert!(h.nav.is_seeking());
        assert!(h.router.calls().is_empty());
    }

    #[test]
    fn burst_of_navigations_commits_once() {
        let mut h = Harness::with_count(250, 1);
        for step in [1, 1, 1] {
            assert!(h.nav.navigate(NavTarget::Offset(step), None));
            h.advance_ms(300);
        }
        assert_eq!(h.nav.active_index(), Some(4));
        h.advance_ms(600);
        assert!(h.router.calls().is_empty());

        h.advance_ms(200);
        assert_eq!(h.router.calls(), vec![RouterCall::Commit(4)]);
        h.advance_ms(5000);
        assert_eq!(h.router.calls(), vec![RouterCall::Commit(4)]);
    }

    #[test]
    fn immediate_policy_commits_every_navigation() {
        let config = NavigationConfig {
            commit: CommitPolicy::Immediate,
            ..NavigationConfig::default()
        };
        let mut h = Harness::new(config, 250, 1);
        h.nav.navigate(NavTarget::Offset(1), None);
        h.nav.navigate(NavTarget::Record(40), None);
        assert_eq!(
            h.router.calls(),
            vec![RouterCall::Commit(2), RouterCall::Commit(40)]
        );
    }

    #[test]
    fn seeking_outlives_an_instant_confirmation() {
        let mut h = Harness::with_count(250, 1);
        let flips = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&flips);
        h.nav.subscribe_seeking(move |v| sink.borrow_mut().push(*v));

        h.nav.navigate(NavTarget::Offset(1), None);
        h.advance_ms(10);
        h.nav.set_confirmed(Some(2));
        assert_eq!(h.nav.desired(), None);
        assert_eq!(h.nav.phase(), SeekPhase::Reconciled);
        assert!(h.nav.is_seeking());

        h.advance_ms(170);
        assert!(h.nav.is_seeking());
        h.advance_ms(30);
        assert!(!h.nav.is_seeking());
        assert_eq!(h.nav.phase(), SeekPhase::Idle);
        assert_eq!(*flips.borrow(), vec![true, false]);
    }

    #[test]
    fn windows_follow_the_active_index() {
        let mut h = Harness::with_count(250, 1);
        let initial = h.range_fetches();
        let ranges: Vec<_> = initial.iter().map(|f| (f.slot, f.key.range)).collect();
        assert_eq!(
            ranges,
            vec![
                (WindowSlot::Current, RangeKey::new(1, 100)),
                (WindowSlot::Next, RangeKey::new(101, 200)),
            ]
        );
        for f in initial {
            h.nav.complete_range(f.request, Ok(Vec::new()));
        }

        assert!(h.nav.navigate(NavTarget::Offset(150), None));
        assert_eq!(h.nav.active_index(), Some(151));
        let fetched: Vec<_> = h
            .range_fetches()
            .into_iter()
            .map(|f| (f.slot, f.key.range))
            .collect();
        assert_eq!(fetched, vec![(WindowSlot::Next, RangeKey::new(201, 250))]);

        let windows = *h.nav.cache().windows();
        assert_eq!(windows.previous, Some(RangeKey::new(1, 100)));
        assert_eq!(windows.current, Some(RangeKey::new(101, 200)));
        assert_eq!(windows.next, Some(RangeKey::new(201, 250)));
    }

    #[test]
    fn region_view_upgrades_from_loading_to_full() {
        let mut h = Harness::with_count(250, 7);
        assert_eq!(h.nav.region(), Some(&RegionView::Loading { id: 7 }));

        h.resolve_ranges();
        assert!(matches!(h.nav.region(), Some(RegionView::Minimal(r)) if r.id == 7));
        assert!(h.nav.is_upgrading());

        h.advance_ms(200);
        let Some(Command::Full(fetch)) = h.nav.take_commands().pop() else {
            panic!("expected a full record fetch");
        };
        assert_eq!(fetch.id, 7);
        assert_eq!(h.nav.complete_full(fetch.request, Ok(full(7))), Completion::Applied);
        assert_eq!(h.nav.region(), Some(&RegionView::Full(full(7))));
        assert!(!h.nav.is_upgrading());
    }

    #[test]
    fn full_record_for_a_previous_index_is_discarded() {
        let mut h = Harness::with_count(250, 5);
        h.resolve_ranges();
        h.advance_ms(200);
        let Some(Command::Full(for_five)) = h.nav.take_commands().pop() else {
            panic!("expected a full record fetch");
        };

        assert!(h.nav.navigate(NavTarget::Offset(1), None));
        assert_eq!(
            h.nav.complete_full(for_five.request, Ok(full(5))),
            Completion::Stale
        );
        assert!(matches!(h.nav.region(), Some(RegionView::Minimal(r)) if r.id == 6));

        h.advance_ms(200);
        let Some(Command::Full(for_six)) = h.nav.take_commands().pop() else {
            panic!("expected a full record fetch");
        };
        assert_eq!(for_six.id, 6);
        h.nav.complete_full(for_six.request, Ok(full(6)));
        assert_eq!(h.nav.region().map(RegionView::id), Some(6));
    }

    #[test]
    fn fetch_failures_degrade_to_loading() {
        let mut h = Harness::with_count(250, 3);
        for fetch in h.range_fetches() {
            let outcome = h
                .nav
                .complete_range(fetch.request, Err(FetchError::new("connection refused")));
            assert_eq!(outcome, Completion::Failed);
        }
        assert_eq!(h.nav.region(), Some(&RegionView::Loading { id: 3 }));

        // Retried once the index moves.
        h.nav.navigate(NavTarget::Offset(1), None);
        assert_eq!(h.range_fetches().len(), 2);
    }

    #[test]
    fn intents_map_to_actions() {
        let mut h = Harness::with_count(3, 2);
        assert_eq!(
            h.nav.apply_intent(NavigationIntent::Nav { x: 420.0, y: 0.0 }),
            IntentOutcome::Navigated
        );
        assert_eq!(h.nav.active_index(), Some(3));
        assert_eq!(
            h.nav.apply_intent(NavigationIntent::Nav { x: 420.0, y: 0.0 }),
            IntentOutcome::Rejected
        );
        assert_eq!(
            h.nav.apply_intent(NavigationIntent::Interrupted),
            IntentOutcome::ClickThrough
        );
        assert_eq!(h.nav.apply_intent(NavigationIntent::NONE), IntentOutcome::Ignored);

        assert_eq!(
            h.nav.apply_intent(NavigationIntent::Nav { x: 0.0, y: 1.0 }),
            IntentOutcome::Exited
        );
        // The pending commit for index 3 was dropped.
        h.advance_ms(2000);
        assert_eq!(h.router.calls(), vec![RouterCall::Exit]);
    }

    #[test]
    fn scene_change_starts_over() {
        let mut h = Harness::with_count(250, 1);
        h.resolve_ranges();
        assert!(h.nav.cache().record(1).is_some());

        h.nav.set_scene(Some(SceneInfo::new("other", 250)));
        assert!(h.nav.cache().record(1).is_none());
        assert_eq!(h.nav.region(), Some(&RegionView::Loading { id: 1 }));
        let fetches = h.range_fetches();
        assert_eq!(fetches.len(), 2);
        assert!(fetches.iter().all(|f| f.key.scene.as_str() == "other"));
    }

    #[test]
    fn loading_scene_issues_no_fetches() {
        let clock = ManualClock::new();
        let mut nav = NavigationController::new(
            NavigationConfig::default(),
            Box::new(RecordingRouter::default()),
            Rc::new(clock.clone()),
        );
        nav.set_scene(Some(SceneInfo::loading("s")));
        nav.set_confirmed(Some(5));
        clock.advance(Duration::from_millis(250));
        nav.tick(clock.now());
        assert!(nav.take_commands().is_empty());
        assert!(nav.is_upgrading());

        // The upgrade that came due while loading goes out once loaded.
        nav.set_scene(Some(SceneInfo::new("s", 250)));
        nav.tick(clock.now());
        let commands = nav.take_commands();
        assert_eq!(commands.len(), 3);
        assert!(matches!(commands.last(), Some(Command::Full(f)) if f.id == 5));
    }

    #[test]
    fn revalidate_waits_for_the_scene_to_load() {
        let mut h = Harness::with_count(250, 5);
        h.resolve_ranges();

        h.nav.set_scene(Some(SceneInfo::loading("s")));
        h.nav.revalidate();
        assert!(h.range_fetches().is_empty());

        h.nav.set_scene(Some(SceneInfo::new("s", 250)));
        h.nav.take_commands();
        h.nav.revalidate();
        assert_eq!(h.range_fetches().len(), 2);
    }

    #[test]
    fn new_scene_drops_the_navigation_in_progress() {
        let mut h = Harness::with_count(250, 1);
        assert!(h.nav.navigate(NavTarget::Record(240), None));
        assert!(h.nav.is_seeking());

        h.nav.set_scene(Some(SceneInfo::new("b", 100)));
        assert_eq!(h.nav.desired(), None);
        assert_eq!(h.nav.active_index(), Some(1));
        assert!(!h.nav.is_seeking());
        assert_eq!(h.nav.phase(), SeekPhase::Idle);

        h.advance_ms(2000);
        assert!(h.router.calls().is_empty());
    }

    #[test]
    fn shrinking_count_drops_an_out_of_range_target() {
        let mut h = Harness::with_count(250, 1);
        assert!(h.nav.navigate(NavTarget::Record(240), None));

        h.nav.set_scene(Some(SceneInfo::new("s", 300)));
        assert_eq!(h.nav.desired(), Some(240));

        h.nav.set_scene(Some(SceneInfo::new("s", 100)));
        assert_eq!(h.nav.desired(), None);
        assert_eq!(h.nav.active_index(), Some(1));
        h.advance_ms(2000);
        assert!(h.router.calls().is_empty());
    }

    #[test]
    fn offset_navigation_rejects_a_second_offset() {
        let mut h = Harness::with_count(250, 10);
        assert!(!h.nav.navigate(NavTarget::Offset(1), Some(1)));
        assert_eq!(h.nav.active_index(), Some(10));
        assert_eq!(h.nav.desired(), None);
    }

    #[test]
    fn count_update_extends_windows() {
        let mut h = Harness::with_count(150, 120);
        h.resolve_ranges();
        h.nav.set_scene(Some(SceneInfo::new("s", 180)));
        let ranges: Vec<_> = h.range_fetches().into_iter().map(|f| f.key.range).collect();
        assert_eq!(ranges, vec![RangeKey::new(101, 180)]);
    }

    #[test]
    fn string_targets_are_offsets() {
        assert_eq!("3".parse::<NavTarget>(), Ok(NavTarget::Offset(3)));
        assert_eq!(" -2 ".parse::<NavTarget>(), Ok(NavTarget::Offset(-2)));
        let err = "next".parse::<NavTarget>().unwrap_err();
        assert_eq!(err.to_string(), "invalid navigation target \"next\"");
    }

    #[test]
    fn next_deadline_tracks_the_earliest_timer() {
        let mut h = Harness::with_count(250, 1);
        h.advance_ms(200);
        h.nav.take_commands();
        assert_eq!(h.nav.next_deadline(), None);

        h.nav.navigate(NavTarget::Offset(1), None);
        let now = h.clock.now();
        let deadline = h.nav.next_deadline().unwrap();
        assert!((deadline.0 - (now.0 + 0.2)).abs() < 1e-9);
        assert!(deadline > Time::ZERO);
    }
}
