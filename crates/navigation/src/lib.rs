//! Scrub navigation over large remote collections.
//!
//! Pointer gestures become [`intent::NavigationIntent`]s, the
//! [`controller::NavigationController`] turns those (and direct jumps) into
//! an optimistic active index backed by a windowed record cache, and
//! [`session::Session`] runs the resulting fetches.

pub mod config;
pub mod controller;
pub mod gesture;
pub mod intent;
pub mod reconcile;
pub mod session;
pub mod upgrade;

pub use config::{CommitPolicy, GestureConfig, NavigationConfig};
pub use controller::{
    Command, IntentOutcome, NavTarget, NavigationController, ParseTargetError, RegionView, Router,
};
pub use gesture::{Axis, GestureRecognizer, Viewer};
pub use intent::{NavAction, NavigationIntent};
pub use reconcile::{Reconciler, SeekPhase};
pub use session::{Session, Settled};
pub use upgrade::{FullFetch, FullRecordUpgrade};
