//! Async driver for a [`NavigationController`].
//!
//! The session runs the controller's fetch commands against a
//! [`RegionSource`], all of them concurrently, and feeds each result back in
//! the order it arrives. Staleness is decided by the controller; the session
//! never drops or reorders anything itself.

use std::sync::Arc;

use foundation::ids::RegionId;
use futures_util::StreamExt;
use futures_util::stream::FuturesUnordered;
use streaming::cache::Completion;
use streaming::protocol::{FullRecord, MinimalRecord, SceneInfo};
use streaming::request::Request;
use streaming::source::{BoxFuture, FetchError, RegionSource};
use tracing::trace;

use crate::controller::{Command, IntentOutcome, NavTarget, NavigationController};
use crate::intent::NavigationIntent;

enum Fetched {
    Range {
        request: Request,
        result: Result<Vec<MinimalRecord>, FetchError>,
    },
    Full {
        request: Request,
        result: Result<FullRecord, FetchError>,
    },
}

/// A fetch that came back, and what the controller made of it.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Settled {
    Range(Request, Completion),
    Full(Request, Completion),
}

impl Settled {
    pub fn completion(&self) -> Completion {
        match *self {
            Settled::Range(_, c) | Settled::Full(_, c) => c,
        }
    }
}

pub struct Session {
    controller: NavigationController,
    source: Arc<dyn RegionSource>,
    pending: FuturesUnordered<BoxFuture<'static, Fetched>>,
}

impl Session {
    pub fn new(controller: NavigationController, source: Arc<dyn RegionSource>) -> Self {
        Self {
            controller,
            source,
            pending: FuturesUnordered::new(),
        }
    }

    pub fn controller(&self) -> &NavigationController {
        &self.controller
    }

    /// Direct access; call [`Session::dispatch`] after mutating.
    pub fn controller_mut(&mut self) -> &mut NavigationController {
        &mut self.controller
    }

    pub fn in_flight(&self) -> usize {
        self.pending.len()
    }

    pub fn navigate(&mut self, target: NavTarget, offset: Option<i64>) -> bool {
        let accepted = self.controller.navigate(target, offset);
        self.dispatch();
        accepted
    }

    pub fn apply_intent(&mut self, intent: NavigationIntent) -> IntentOutcome {
        let outcome = self.controller.apply_intent(intent);
        self.dispatch();
        outcome
    }

    pub fn set_scene(&mut self, scene: Option<SceneInfo>) {
        self.controller.set_scene(scene);
        self.dispatch();
    }

    pub fn set_confirmed(&mut self, index: Option<RegionId>) {
        self.controller.set_confirmed(index);
        self.dispatch();
    }

    /// Advance the controller's timers to its clock's current time.
    pub fn tick(&mut self) {
        let now = self.controller.now();
        self.controller.tick(now);
        self.dispatch();
    }

    /// Start every command the controller has queued. Returns how many.
    pub fn dispatch(&mut self) -> usize {
        let commands = self.controller.take_commands();
        let started = commands.len();
        for command in commands {
            let source = Arc::clone(&self.source);
            let fetch: BoxFuture<'static, Fetched> = match command {
                Command::Range(fetch) => {
                    trace!(range = %fetch.key.range, request = ?fetch.request, "dispatching range");
                    Box::pin(async move {
                        let result = source.fetch_range(&fetch.key.scene, fetch.key.range).await;
                        Fetched::Range {
                            request: fetch.request,
                            result,
                        }
                    })
                }
                Command::Full(fetch) => {
                    trace!(id = fetch.id, request = ?fetch.request, "dispatching full record");
                    Box::pin(async move {
                        let result = source.fetch_region(&fetch.scene, fetch.id).await;
                        Fetched::Full {
                            request: fetch.request,
                            result,
                        }
                    })
                }
            };
            self.pending.push(fetch);
        }
        started
    }

    /// Wait for the next fetch to finish and apply it. `None` when nothing
    /// is in flight.
    pub async fn next_completion(&mut self) -> Option<Settled> {
        let fetched = self.pending.next().await?;
        let settled = match fetched {
            Fetched::Range { request, result } => {
                Settled::Range(request, self.controller.complete_range(request, result))
            }
            Fetched::Full { request, result } => {
                Settled::Full(request, self.controller.complete_full(request, result))
            }
        };
        self.dispatch();
        Some(settled)
    }

    /// Run until nothing is in flight. Timers are not advanced.
    pub async fn settle(&mut self) -> Vec<Settled> {
        self.dispatch();
        let mut settled = Vec::new();
        while let Some(event) = self.next_completion().await {
            settled.push(event);
        }
        settled
    }
}
