//! Optimistic position tracking.
//!
//! The displayed index is `desired` while a navigation is in flight and the
//! authoritative `confirmed` index otherwise. Once the authority catches up
//! the optimistic value is dropped, but "seeking" stays visible for a
//! minimum time so fast confirmations do not flicker.

use std::time::Duration;

use foundation::ids::RegionId;
use foundation::time::Time;
use runtime::timer::Timer;
use tracing::trace;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum SeekPhase {
    #[default]
    Idle,
    /// `desired` is set and not yet confirmed.
    Seeking,
    /// Confirmed, but the minimum seeking time has not elapsed.
    Reconciled,
}

#[derive(Debug, Clone)]
pub struct Reconciler {
    desired: Option<RegionId>,
    confirmed: Option<RegionId>,
    phase: SeekPhase,
    hold: Timer,
    min_seeking: Duration,
}

impl Reconciler {
    pub fn new(min_seeking: Duration) -> Self {
        Self {
            desired: None,
            confirmed: None,
            phase: SeekPhase::Idle,
            hold: Timer::new(),
            min_seeking,
        }
    }

    pub fn desired(&self) -> Option<RegionId> {
        self.desired
    }

    pub fn confirmed(&self) -> Option<RegionId> {
        self.confirmed
    }

    pub fn phase(&self) -> SeekPhase {
        self.phase
    }

    /// `desired ?? confirmed`.
    pub fn active(&self) -> Option<RegionId> {
        self.desired.or(self.confirmed)
    }

    pub fn is_seeking(&self, now: Time) -> bool {
        match self.phase {
            SeekPhase::Idle => false,
            SeekPhase::Seeking => true,
            SeekPhase::Reconciled => self.hold.is_running(now),
        }
    }

    /// When the minimum seeking time runs out.
    pub fn deadline(&self) -> Option<Time> {
        self.hold.deadline()
    }

    /// Start seeking toward `target`; restarts the minimum seeking time.
    pub fn begin(&mut self, target: RegionId, now: Time) {
        self.hold.start(now, self.min_seeking);
        if self.confirmed == Some(target) {
            self.desired = None;
            self.phase = SeekPhase::Reconciled;
        } else {
            self.desired = Some(target);
            self.phase = SeekPhase::Seeking;
        }
        trace!(target, phase = ?self.phase, "seek started");
    }

    /// Record a new authoritative index.
    pub fn confirm(&mut self, index: Option<RegionId>) {
        if self.confirmed == index {
            return;
        }
        self.confirmed = index;
        if self.desired.is_some() && self.desired == index {
            self.desired = None;
            self.phase = if self.hold.is_armed() {
                SeekPhase::Reconciled
            } else {
                SeekPhase::Idle
            };
            trace!(?index, phase = ?self.phase, "seek reconciled");
        }
    }

    /// Advance the hold timer.
    pub fn tick(&mut self, now: Time) {
        if self.hold.fire(now) && self.phase == SeekPhase::Reconciled {
            self.phase = SeekPhase::Idle;
        }
    }

    /// Forget the optimistic target, e.g. when the scene goes away.
    pub fn reset(&mut self) {
        self.desired = None;
        self.hold.cancel();
        self.phase = SeekPhase::Idle;
    }
}
