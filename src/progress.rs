//! Two-block progress bar capability.
//!
//! The bar represents a fraction of completion with exactly two blocks: a
//! lower block anchored at the host's origin and a higher block covering
//! the remainder. On every update the host rectangle is split along its
//! dominant axis (the larger of width and height, ties going to width),
//! with the lower block sized proportionally to the filled fraction. With
//! the default fill direction the lower block carries the filled color, so
//! a wide bar fills left to right and a tall bar top to bottom; flipping
//! the direction swaps the colors and mirrors the fraction.
//!
//! The widget owns its two blocks for its whole lifetime. It spawns them
//! on attach, drives them through the injected [`Stage`] on every update,
//! and destroys them on detach, unbinding its event subscription on the
//! way out.
//!
//! # Basic Usage
//!
//! ```rust
//! use stagebar::event::Bindings;
//! use stagebar::progress::{attach, with_colors, with_max_value};
//! use stagebar::stage::{Headless, Rect};
//!
//! let mut stage = Headless::new();
//! let mut bus = Bindings::new();
//! let host = Rect::new(150.0, 140.0, 100.0, 25.0, 100);
//!
//! let mut bar = attach(
//!     &mut stage,
//!     &mut bus,
//!     host,
//!     &[
//!         with_max_value(100.0),
//!         with_colors("blue".to_string(), "green".to_string()),
//!     ],
//! )
//! .unwrap();
//!
//! bar.set_value(&mut stage, 40.0);
//! assert_eq!(bar.fraction(), 0.4);
//!
//! bar.detach(&mut stage, &mut bus);
//! assert_eq!(stage.alive_count(), 0);
//! ```
//!
//! # Event-driven updates
//!
//! Configure a topic and the bar reacts to matching [`ProgressEvent`]s the
//! host routes to it; events on other topics are ignored:
//!
//! ```rust
//! use stagebar::event::{Bindings, ProgressEvent, TopicId};
//! use stagebar::progress::{attach, with_topic};
//! use stagebar::stage::{Headless, Rect};
//!
//! const LOADING: TopicId = TopicId::new(1);
//!
//! let mut stage = Headless::new();
//! let mut bus = Bindings::new();
//! let host = Rect::new(0.0, 0.0, 100.0, 25.0, 0);
//! let mut bar = attach(&mut stage, &mut bus, host, &[with_topic(LOADING)]).unwrap();
//!
//! bar.on_event(&mut stage, &ProgressEvent::new(LOADING, 55.0));
//! assert_eq!(bar.value(), 55.0);
//!
//! bar.on_event(&mut stage, &ProgressEvent::new(TopicId::new(2), 99.0));
//! assert_eq!(bar.value(), 55.0);
//! # bar.detach(&mut stage, &mut bus);
//! ```

use crate::error::ConfigError;
use crate::event::{next_listener_id, EventBus, ListenerId, ProgressEvent, TopicId};
use crate::stage::{Axis, BlockId, Rect, RenderBackend, Stage};
use tracing::{debug, trace};

/// Default maximum progress value.
pub const DEFAULT_MAX_VALUE: f64 = 100.0;
/// Default color of the empty portion.
pub const DEFAULT_EMPTY_COLOR: &str = "#606060";
/// Default color of the filled portion.
pub const DEFAULT_FILLED_COLOR: &str = "#7571F9";

/// Configuration options for the two-block bar.
///
/// Options are applied in order over the defaults, so later options win.
///
/// # Examples
///
/// ```rust
/// use stagebar::event::Bindings;
/// use stagebar::progress::{attach, with_flip_direction, with_max_value};
/// use stagebar::stage::{Headless, Rect};
///
/// let mut stage = Headless::new();
/// let mut bus = Bindings::new();
/// let bar = attach(
///     &mut stage,
///     &mut bus,
///     Rect::new(0.0, 0.0, 100.0, 25.0, 0),
///     &[with_max_value(64.0), with_flip_direction()],
/// )
/// .unwrap();
/// assert_eq!(bar.max_value(), 64.0);
/// assert!(bar.is_flipped());
/// # bar.detach(&mut stage, &mut bus);
/// ```
pub enum BarOption {
    /// Sets the maximum value incoming progress values are normalized
    /// against. Must be finite and greater than zero.
    WithMaxValue(f64),
    /// Fills from the right/bottom instead of the left/top.
    WithFlipDirection,
    /// Sets the empty and filled colors, in that order.
    WithColors(String, String),
    /// Subscribes the bar to a broadcast topic at attach time.
    WithTopic(TopicId),
    /// Selects the rendering path the blocks are spawned on.
    WithBackend(RenderBackend),
}

impl BarOption {
    fn apply(&self, c: &mut Config) {
        match self {
            BarOption::WithMaxValue(max) => c.max_value = *max,
            BarOption::WithFlipDirection => c.flip = true,
            BarOption::WithColors(empty, filled) => {
                c.empty_color = empty.clone();
                c.filled_color = filled.clone();
            }
            BarOption::WithTopic(topic) => c.topic = Some(*topic),
            BarOption::WithBackend(backend) => c.backend = *backend,
        }
    }
}

/// Sets the maximum progress value. Defaults to [`DEFAULT_MAX_VALUE`].
pub fn with_max_value(max: f64) -> BarOption {
    BarOption::WithMaxValue(max)
}

/// Flips the fill direction so the bar fills from the right or bottom.
pub fn with_flip_direction() -> BarOption {
    BarOption::WithFlipDirection
}

/// Sets the empty and filled colors, in that order. Color strings are
/// passed to the host verbatim.
pub fn with_colors(empty: String, filled: String) -> BarOption {
    BarOption::WithColors(empty, filled)
}

/// Subscribes the bar to a broadcast topic at attach time. Without a
/// topic the bar only reacts to direct `set_value` calls.
pub fn with_topic(topic: TopicId) -> BarOption {
    BarOption::WithTopic(topic)
}

/// Selects the rendering path for the two blocks. Defaults to
/// [`RenderBackend::Dom`].
pub fn with_backend(backend: RenderBackend) -> BarOption {
    BarOption::WithBackend(backend)
}

struct Config {
    max_value: f64,
    flip: bool,
    empty_color: String,
    filled_color: String,
    topic: Option<TopicId>,
    backend: RenderBackend,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_value: DEFAULT_MAX_VALUE,
            flip: false,
            empty_color: DEFAULT_EMPTY_COLOR.to_string(),
            filled_color: DEFAULT_FILLED_COLOR.to_string(),
            topic: None,
            backend: RenderBackend::default(),
        }
    }
}

/// The two-block progress bar model.
///
/// Holds the bar's configuration, the progress state, the host geometry as
/// of the last sync, and the handles of the two blocks it owns. Created
/// with [`attach`], consumed by [`Model::detach`].
#[derive(Debug)]
pub struct Model {
    id: ListenerId,
    max_value: f64,
    flip: bool,
    topic: Option<TopicId>,
    backend: RenderBackend,
    value: f64,
    // Filled fraction in [0, 1], already mirrored when flipped: it is
    // always the share of the host the lower block covers.
    fraction: f64,
    host: Rect,
    lower: BlockId,
    higher: BlockId,
}

/// Attaches a two-block bar to a host rectangle.
///
/// Validates the configuration, spawns and colors the two blocks, lays
/// them out against `host` at value zero, and binds the configured topic
/// (if any) on `bus`. On a configuration error nothing is spawned and
/// nothing is bound.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidMaxValue`] when the configured maximum is
/// zero, negative, or not finite.
///
/// # Examples
///
/// ```rust
/// use stagebar::event::Bindings;
/// use stagebar::progress::{attach, with_max_value};
/// use stagebar::stage::{Headless, Rect};
///
/// let mut stage = Headless::new();
/// let mut bus = Bindings::new();
/// let host = Rect::new(0.0, 0.0, 100.0, 25.0, 0);
///
/// assert!(attach(&mut stage, &mut bus, host, &[with_max_value(0.0)]).is_err());
/// assert_eq!(stage.spawned_count(), 0);
///
/// let bar = attach(&mut stage, &mut bus, host, &[]).unwrap();
/// assert_eq!(stage.alive_count(), 2);
/// # bar.detach(&mut stage, &mut bus);
/// ```
pub fn attach(
    stage: &mut dyn Stage,
    bus: &mut dyn EventBus,
    host: Rect,
    opts: &[BarOption],
) -> Result<Model, ConfigError> {
    let mut cfg = Config::default();
    for opt in opts {
        opt.apply(&mut cfg);
    }
    if !cfg.max_value.is_finite() || cfg.max_value <= 0.0 {
        return Err(ConfigError::InvalidMaxValue(cfg.max_value));
    }

    let lower = stage.spawn(cfg.backend);
    let higher = stage.spawn(cfg.backend);
    // The lower block is the filled end unless the direction is flipped.
    if cfg.flip {
        stage.set_color(lower, &cfg.empty_color);
        stage.set_color(higher, &cfg.filled_color);
    } else {
        stage.set_color(lower, &cfg.filled_color);
        stage.set_color(higher, &cfg.empty_color);
    }

    let mut model = Model {
        id: next_listener_id(),
        max_value: cfg.max_value,
        flip: cfg.flip,
        topic: cfg.topic,
        backend: cfg.backend,
        value: 0.0,
        fraction: 0.0,
        host,
        lower,
        higher,
    };
    model.apply_value(stage, 0.0);

    if let Some(topic) = model.topic {
        bus.bind(topic, model.id);
    }
    debug!(listener = model.id.0, "progress bar attached");
    Ok(model)
}

impl Model {
    /// The current progress value.
    pub fn value(&self) -> f64 {
        self.value
    }

    /// The share of the host the lower block covers, in `[0, 1]`. Mirrored
    /// when the fill direction is flipped.
    pub fn fraction(&self) -> f64 {
        self.fraction
    }

    /// The configured maximum progress value.
    pub fn max_value(&self) -> f64 {
        self.max_value
    }

    /// Whether the fill direction is flipped.
    pub fn is_flipped(&self) -> bool {
        self.flip
    }

    /// The bar's listener identity on the event bus.
    pub fn listener(&self) -> ListenerId {
        self.id
    }

    /// The topic the bar is subscribed to, if any.
    pub fn topic(&self) -> Option<TopicId> {
        self.topic
    }

    /// The rendering path the blocks were spawned on.
    pub fn backend(&self) -> RenderBackend {
        self.backend
    }

    /// Sets the current progress value and resizes both blocks.
    ///
    /// Values outside `[0, max_value]` and non-finite values are ignored:
    /// the call is a no-op and the previous layout stays untouched. Zero
    /// and `max_value` themselves are valid and produce a zero-extent
    /// lower or higher block.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use stagebar::event::Bindings;
    /// use stagebar::progress::attach;
    /// use stagebar::stage::{Headless, Rect};
    ///
    /// let mut stage = Headless::new();
    /// let mut bus = Bindings::new();
    /// let host = Rect::new(0.0, 0.0, 100.0, 25.0, 0);
    /// let mut bar = attach(&mut stage, &mut bus, host, &[]).unwrap();
    ///
    /// bar.set_value(&mut stage, 40.0);
    /// assert_eq!(bar.value(), 40.0);
    ///
    /// // Out-of-range and non-numeric values are rejected.
    /// bar.set_value(&mut stage, -1.0);
    /// bar.set_value(&mut stage, 101.0);
    /// bar.set_value(&mut stage, f64::NAN);
    /// assert_eq!(bar.value(), 40.0);
    /// # bar.detach(&mut stage, &mut bus);
    /// ```
    pub fn set_value(&mut self, stage: &mut dyn Stage, value: f64) {
        if !value.is_finite() || value < 0.0 || value > self.max_value {
            debug!(
                value,
                max = self.max_value,
                "ignoring out-of-range progress value"
            );
            return;
        }
        self.apply_value(stage, value);
    }

    /// Adds `delta` to the current value, clamped to `[0, max_value]`.
    pub fn incr_value(&mut self, stage: &mut dyn Stage, delta: f64) {
        self.set_value(stage, (self.value + delta).clamp(0.0, self.max_value));
    }

    /// Subtracts `delta` from the current value, clamped to
    /// `[0, max_value]`.
    pub fn decr_value(&mut self, stage: &mut dyn Stage, delta: f64) {
        self.set_value(stage, (self.value - delta).clamp(0.0, self.max_value));
    }

    /// Applies a broadcast event if it was published on the bar's topic.
    ///
    /// Events on other topics, or any event when no topic is configured,
    /// are ignored. The value goes through the same validation as
    /// [`Model::set_value`].
    pub fn on_event(&mut self, stage: &mut dyn Stage, event: &ProgressEvent) {
        if self.topic != Some(event.topic) {
            return;
        }
        self.set_value(stage, event.value);
    }

    /// Re-lays out both blocks against new host geometry.
    ///
    /// Call this whenever the host entity moved or resized. The fraction
    /// is kept; only the block rectangles are recomputed.
    pub fn sync_geometry(&mut self, stage: &mut dyn Stage, host: Rect) {
        self.host = host;
        self.layout(stage);
    }

    /// Repositions both blocks after a host move or restack.
    ///
    /// Only position and stacking order change; the host extents from the
    /// last geometry sync are kept, so block sizes stay as they are.
    pub fn sync_stacking(&mut self, stage: &mut dyn Stage, x: f64, y: f64, z: i32) {
        self.host.x = x;
        self.host.y = y;
        self.host.z = z;
        self.layout(stage);
    }

    /// Tears the bar down: unbinds its topic subscription and destroys
    /// both blocks, synchronously. Consumes the bar, so no update can
    /// reach it afterwards.
    pub fn detach(self, stage: &mut dyn Stage, bus: &mut dyn EventBus) {
        if let Some(topic) = self.topic {
            bus.unbind(topic, self.id);
        }
        stage.destroy(self.lower);
        stage.destroy(self.higher);
        debug!(listener = self.id.0, "progress bar detached");
    }

    fn apply_value(&mut self, stage: &mut dyn Stage, value: f64) {
        self.value = value;
        let mut fraction = value / self.max_value;
        if self.flip {
            fraction = 1.0 - fraction;
        }
        self.fraction = fraction;
        self.layout(stage);
    }

    fn layout(&mut self, stage: &mut dyn Stage) {
        let (lower, higher) = split_frames(self.host, self.fraction);
        trace!(
            fraction = self.fraction,
            ?lower,
            ?higher,
            "laying out bar blocks"
        );
        stage.set_frame(self.lower, lower);
        stage.set_frame(self.higher, higher);
    }
}

// Splits a host rectangle along its dominant axis. The lower frame starts
// at the host origin and covers `fraction` of the dominant extent; the
// higher frame covers the rest, offset past the lower one. Both span the
// full host extent on the other axis and inherit the host z.
fn split_frames(host: Rect, fraction: f64) -> (Rect, Rect) {
    match host.dominant_axis() {
        Axis::Horizontal => {
            let cut = host.w * fraction;
            (
                Rect::new(host.x, host.y, cut, host.h, host.z),
                Rect::new(host.x + cut, host.y, host.w - cut, host.h, host.z),
            )
        }
        Axis::Vertical => {
            let cut = host.h * fraction;
            (
                Rect::new(host.x, host.y, host.w, cut, host.z),
                Rect::new(host.x, host.y + cut, host.w, host.h - cut, host.z),
            )
        }
    }
}

impl crate::Capability for Model {
    fn set_value(&mut self, stage: &mut dyn Stage, value: f64) {
        self.set_value(stage, value);
    }

    fn sync_geometry(&mut self, stage: &mut dyn Stage, host: Rect) {
        self.sync_geometry(stage, host);
    }

    fn on_event(&mut self, stage: &mut dyn Stage, event: &ProgressEvent) {
        self.on_event(stage, event);
    }

    fn detach(self, stage: &mut dyn Stage, bus: &mut dyn EventBus) {
        Model::detach(self, stage, bus);
    }
}
