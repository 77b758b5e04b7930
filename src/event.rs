//! Typed progress event wiring.
//!
//! Widgets can be updated two ways: the owner calls `set_value` directly,
//! or the host broadcasts a [`ProgressEvent`] on a topic the widget was
//! configured with. Topics are explicit [`TopicId`] values the application
//! defines, not strings looked up in ambient global state, and the bus the
//! widget registers on is injected at attach time.
//!
//! The widget side of the contract is small: at attach it calls
//! [`EventBus::bind`] with its topic and its own [`ListenerId`], at detach
//! it calls [`EventBus::unbind`] with the same pair. Delivery stays with
//! the host, which routes a published event to every listener bound to its
//! topic, synchronously and on the same thread.
//!
//! [`Bindings`] is a ready-made subscription table for hosts that do not
//! already have one, and doubles as the observation point in tests.
//!
//! # Basic Usage
//!
//! ```rust
//! use stagebar::event::{Bindings, EventBus, ListenerId, TopicId};
//!
//! let loading = TopicId::new(7);
//! let listener = ListenerId(1);
//!
//! let mut bus = Bindings::new();
//! bus.bind(loading, listener);
//! assert!(bus.is_bound(loading, listener));
//!
//! bus.unbind(loading, listener);
//! assert!(bus.is_empty());
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

// Internal ID management for widget instances. Each attached widget takes
// one, so bindings from different widgets never collide on the bus.
static LAST_ID: AtomicU64 = AtomicU64::new(0);

pub(crate) fn next_listener_id() -> ListenerId {
    ListenerId(LAST_ID.fetch_add(1, Ordering::SeqCst) + 1)
}

/// Identifies one event channel.
///
/// Applications pick the values; the crate only compares them. Declare
/// topics as constants next to the code that publishes them:
///
/// ```rust
/// use stagebar::event::TopicId;
///
/// const ASSET_LOADING: TopicId = TopicId::new(1);
/// const PLAYER_HEALTH: TopicId = TopicId::new(2);
/// assert_ne!(ASSET_LOADING, PLAYER_HEALTH);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TopicId(u64);

impl TopicId {
    /// Creates a topic identifier from an application-chosen value.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }
}

/// Identifies one bound listener.
///
/// Every attached widget carries a unique `ListenerId`, available through
/// its `listener()` accessor. Hosts use it to route a delivery to the
/// right widget after consulting the subscription table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// A progress value broadcast on a topic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressEvent {
    /// The channel this event was published on.
    pub topic: TopicId,
    /// The current progress value, in the receiving widget's value range.
    pub value: f64,
}

impl ProgressEvent {
    /// Creates an event for the given topic and value.
    pub fn new(topic: TopicId, value: f64) -> Self {
        Self { topic, value }
    }
}

/// Subscription registry widgets bind to.
///
/// Hosts with an existing pub/sub system implement this against it; hosts
/// without one can use [`Bindings`]. Both operations must take effect
/// synchronously: after `unbind` returns, the host must no longer deliver
/// the topic to that listener.
pub trait EventBus {
    /// Registers a listener for a topic. Binding the same pair twice is a
    /// no-op.
    fn bind(&mut self, topic: TopicId, listener: ListenerId);

    /// Removes a listener from a topic. Unbinding a pair that is not bound
    /// is a no-op.
    fn unbind(&mut self, topic: TopicId, listener: ListenerId);
}

/// A plain subscription table implementing [`EventBus`].
///
/// Listeners are kept per topic in bind order. The host's dispatch loop
/// asks [`Bindings::listeners`] who is subscribed and routes the event to
/// each widget itself:
///
/// ```rust
/// use stagebar::prelude::*;
///
/// let topic = TopicId::new(1);
/// let mut stage = Headless::new();
/// let mut bus = Bindings::new();
/// let mut bar = stagebar::progress::attach(
///     &mut stage,
///     &mut bus,
///     Rect::new(0.0, 0.0, 100.0, 25.0, 0),
///     &[stagebar::progress::with_topic(topic)],
/// )
/// .unwrap();
///
/// // Host dispatch for a published event.
/// let event = ProgressEvent::new(topic, 40.0);
/// if bus.is_bound(event.topic, bar.listener()) {
///     bar.on_event(&mut stage, &event);
/// }
/// assert_eq!(bar.value(), 40.0);
/// # bar.detach(&mut stage, &mut bus);
/// ```
#[derive(Debug, Default)]
pub struct Bindings {
    by_topic: HashMap<TopicId, Vec<ListenerId>>,
}

impl Bindings {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// The listeners bound to a topic, in bind order.
    pub fn listeners(&self, topic: TopicId) -> &[ListenerId] {
        self.by_topic.get(&topic).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether the given pair is currently bound.
    pub fn is_bound(&self, topic: TopicId, listener: ListenerId) -> bool {
        self.listeners(topic).contains(&listener)
    }

    /// Whether no binding exists on any topic.
    pub fn is_empty(&self) -> bool {
        self.by_topic.values().all(Vec::is_empty)
    }
}

impl EventBus for Bindings {
    fn bind(&mut self, topic: TopicId, listener: ListenerId) {
        let listeners = self.by_topic.entry(topic).or_default();
        if !listeners.contains(&listener) {
            listeners.push(listener);
        }
    }

    fn unbind(&mut self, topic: TopicId, listener: ListenerId) {
        if let Some(listeners) = self.by_topic.get_mut(&topic) {
            listeners.retain(|l| *l != listener);
        }
    }
}
