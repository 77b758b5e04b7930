#![warn(missing_docs)]

//! # stagebar
//!
//! Progress bar widgets for 2D entity-component engines.
//!
//! A widget here is a *capability*: an object attached to a host entity
//! that owns a handful of visual sub-elements ("blocks") and keeps them in
//! sync with the host's geometry and with an application progress value.
//! The crate ships two interchangeable strategies:
//!
//! - [`progress`] renders two resizing blocks. The host rectangle is split
//!   along its dominant axis and the lower block grows with the filled
//!   fraction.
//! - [`meter`] renders a fixed row or column of discrete units, each
//!   flipping between the empty and filled color when the value crosses
//!   its private threshold.
//!
//! The host engine itself is not part of this crate. Widgets drive their
//! blocks through the [`stage::Stage`] trait and register event interest
//! through the [`event::EventBus`] trait; the host implements both against
//! its own entity and event primitives. [`stage::Headless`] and
//! [`event::Bindings`] are complete in-memory implementations for tests
//! and renderer-less hosts.
//!
//! ## Quick Start
//!
//! ```rust
//! use stagebar::prelude::*;
//!
//! const LOADING: TopicId = TopicId::new(1);
//!
//! let mut stage = Headless::new();
//! let mut bus = Bindings::new();
//!
//! // Attach a bar to a host entity's rectangle.
//! let host = Rect::new(150.0, 140.0, 100.0, 25.0, 100);
//! let mut bar = stagebar::progress::attach(
//!     &mut stage,
//!     &mut bus,
//!     host,
//!     &[
//!         stagebar::progress::with_max_value(100.0),
//!         stagebar::progress::with_topic(LOADING),
//!     ],
//! )
//! .unwrap();
//!
//! // Host dispatch: route a published event to the bound listener.
//! let event = ProgressEvent::new(LOADING, 40.0);
//! if bus.is_bound(event.topic, bar.listener()) {
//!     bar.on_event(&mut stage, &event);
//! }
//! assert_eq!(bar.value(), 40.0);
//!
//! // The host moved; recompute the block layout.
//! bar.sync_geometry(&mut stage, Rect::new(150.0, 200.0, 100.0, 25.0, 100));
//!
//! // Capability removed from the entity: release everything.
//! bar.detach(&mut stage, &mut bus);
//! assert!(bus.is_empty());
//! assert_eq!(stage.alive_count(), 0);
//! ```
//!
//! ## Choosing a strategy
//!
//! | Strategy | Sub-elements | Update effect |
//! |----------|--------------|---------------|
//! | [`progress`] | exactly 2 blocks | blocks resize continuously |
//! | [`meter`] | `unit_count` units | units recolor at thresholds |
//!
//! Both share the same lifecycle: attach spawns and lays out the blocks,
//! updates arrive by direct call or by topic event, and detach unbinds and
//! destroys everything synchronously.

pub mod error;
pub mod event;
pub mod meter;
pub mod progress;
pub mod stage;

use event::{EventBus, ProgressEvent};
use stage::{Rect, Stage};

/// Common surface of both progress widgets.
///
/// Hosts that manage widgets generically can store either strategy behind
/// this trait and drive updates, geometry syncs, event routing and
/// teardown without knowing which one they hold.
///
/// # Examples
///
/// ```rust
/// use stagebar::prelude::*;
///
/// fn drive<W: Capability>(widget: &mut W, stage: &mut dyn Stage) {
///     widget.set_value(stage, 50.0);
/// }
///
/// let mut stage = Headless::new();
/// let mut bus = Bindings::new();
/// let host = Rect::new(0.0, 0.0, 100.0, 25.0, 0);
/// let mut bar = stagebar::progress::attach(&mut stage, &mut bus, host, &[]).unwrap();
/// let mut meter = stagebar::meter::attach(&mut stage, &mut bus, host, &[]).unwrap();
///
/// drive(&mut bar, &mut stage);
/// drive(&mut meter, &mut stage);
/// assert_eq!(bar.value(), 50.0);
/// assert_eq!(meter.value(), 50.0);
/// # bar.detach(&mut stage, &mut bus);
/// # meter.detach(&mut stage, &mut bus);
/// ```
pub trait Capability {
    /// Sets the current progress value. Out-of-range and non-finite
    /// values are ignored.
    fn set_value(&mut self, stage: &mut dyn Stage, value: f64);

    /// Re-lays out the widget's blocks against new host geometry.
    fn sync_geometry(&mut self, stage: &mut dyn Stage, host: Rect);

    /// Applies a broadcast event if it matches the widget's topic.
    fn on_event(&mut self, stage: &mut dyn Stage, event: &ProgressEvent);

    /// Tears the widget down, unbinding its subscription and destroying
    /// every owned block.
    fn detach(self, stage: &mut dyn Stage, bus: &mut dyn EventBus)
    where
        Self: Sized;
}

pub use error::ConfigError;
pub use meter::Model as UnitMeter;
pub use progress::Model as ProgressBar;

/// Prelude module for convenient imports.
///
/// Pulls in the widget models, the host-facing traits and the supporting
/// value types with a single `use`:
///
/// ```rust
/// use stagebar::prelude::*;
///
/// let mut stage = Headless::new();
/// let mut bus = Bindings::new();
/// let bar = stagebar::progress::attach(
///     &mut stage,
///     &mut bus,
///     Rect::new(0.0, 0.0, 80.0, 10.0, 0),
///     &[],
/// )
/// .unwrap();
/// # bar.detach(&mut stage, &mut bus);
/// ```
pub mod prelude {
    pub use crate::error::ConfigError;
    pub use crate::event::{Bindings, EventBus, ListenerId, ProgressEvent, TopicId};
    pub use crate::meter::Model as UnitMeter;
    pub use crate::progress::Model as ProgressBar;
    pub use crate::stage::{Axis, BlockId, Headless, Rect, RenderBackend, Stage};
    pub use crate::Capability;
}
