//! Segmented unit meter capability.
//!
//! Where the two-block bar resizes its blocks continuously, the meter
//! shows progress with a fixed count of discrete units laid out evenly
//! along the host's dominant axis. Each unit owns a private threshold
//! computed once at attach time; on every update each unit independently
//! compares the incoming value against its threshold and recolors itself
//! to the filled or empty color. Geometry only changes when the host's
//! does.
//!
//! With the default direction thresholds grow with the unit index, so
//! units light up from the left or top. A flipped meter assigns
//! decreasing thresholds instead, lighting up from the far end first.
//!
//! # Basic Usage
//!
//! ```rust
//! use stagebar::event::Bindings;
//! use stagebar::meter::{attach, with_unit_count};
//! use stagebar::stage::{Headless, Rect};
//!
//! let mut stage = Headless::new();
//! let mut bus = Bindings::new();
//! let host = Rect::new(0.0, 0.0, 100.0, 25.0, 0);
//!
//! let mut meter = attach(&mut stage, &mut bus, host, &[with_unit_count(10)]).unwrap();
//! meter.set_value(&mut stage, 55.0);
//!
//! // Units at thresholds 10..=50 are filled, 60..=100 are empty.
//! assert_eq!(meter.thresholds()[4], 50.0);
//! # meter.detach(&mut stage, &mut bus);
//! ```

use crate::error::ConfigError;
use crate::event::{next_listener_id, EventBus, ListenerId, ProgressEvent, TopicId};
use crate::progress::{DEFAULT_EMPTY_COLOR, DEFAULT_FILLED_COLOR, DEFAULT_MAX_VALUE};
use crate::stage::{Axis, BlockId, Rect, RenderBackend, Stage};
use tracing::{debug, trace};

/// Default number of units.
pub const DEFAULT_UNIT_COUNT: usize = 10;

/// Configuration options for the unit meter.
///
/// Options are applied in order over the defaults, so later options win.
pub enum MeterOption {
    /// Sets the number of discrete units. Must be greater than zero.
    WithUnitCount(usize),
    /// Sets the maximum value incoming progress values are compared
    /// against. Must be finite and greater than zero.
    WithMaxValue(f64),
    /// Assigns decreasing thresholds so units fill from the far end.
    WithFlipDirection,
    /// Sets the empty and filled colors, in that order.
    WithColors(String, String),
    /// Subscribes the meter to a broadcast topic at attach time.
    WithTopic(TopicId),
    /// Selects the rendering path the units are spawned on.
    WithBackend(RenderBackend),
}

impl MeterOption {
    fn apply(&self, c: &mut Config) {
        match self {
            MeterOption::WithUnitCount(count) => c.unit_count = *count,
            MeterOption::WithMaxValue(max) => c.max_value = *max,
            MeterOption::WithFlipDirection => c.flip = true,
            MeterOption::WithColors(empty, filled) => {
                c.empty_color = empty.clone();
                c.filled_color = filled.clone();
            }
            MeterOption::WithTopic(topic) => c.topic = Some(*topic),
            MeterOption::WithBackend(backend) => c.backend = *backend,
        }
    }
}

/// Sets the number of units. Defaults to [`DEFAULT_UNIT_COUNT`].
pub fn with_unit_count(count: usize) -> MeterOption {
    MeterOption::WithUnitCount(count)
}

/// Sets the maximum progress value.
pub fn with_max_value(max: f64) -> MeterOption {
    MeterOption::WithMaxValue(max)
}

/// Flips the fill direction so units fill from the right or bottom.
pub fn with_flip_direction() -> MeterOption {
    MeterOption::WithFlipDirection
}

/// Sets the empty and filled colors, in that order.
pub fn with_colors(empty: String, filled: String) -> MeterOption {
    MeterOption::WithColors(empty, filled)
}

/// Subscribes the meter to a broadcast topic at attach time.
pub fn with_topic(topic: TopicId) -> MeterOption {
    MeterOption::WithTopic(topic)
}

/// Selects the rendering path for the units.
pub fn with_backend(backend: RenderBackend) -> MeterOption {
    MeterOption::WithBackend(backend)
}

struct Config {
    unit_count: usize,
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
            unit_count: DEFAULT_UNIT_COUNT,
            max_value: DEFAULT_MAX_VALUE,
            flip: false,
            empty_color: DEFAULT_EMPTY_COLOR.to_string(),
            filled_color: DEFAULT_FILLED_COLOR.to_string(),
            topic: None,
            backend: RenderBackend::default(),
        }
    }
}

/// The unit meter model.
///
/// Owns one block per unit plus the per-unit thresholds, which are fixed
/// for the meter's lifetime. Created with [`attach`], consumed by
/// [`Model::detach`].
#[derive(Debug)]
pub struct Model {
    id: ListenerId,
    max_value: f64,
    flip: bool,
    empty_color: String,
    filled_color: String,
    topic: Option<TopicId>,
    backend: RenderBackend,
    value: f64,
    host: Rect,
    units: Vec<BlockId>,
    thresholds: Vec<f64>,
}

/// Attaches a unit meter to a host rectangle.
///
/// Validates the configuration, computes the per-unit thresholds, spawns
/// one block per unit, lays them out against `host`, recolors them for
/// value zero, and binds the configured topic (if any) on `bus`. On a
/// configuration error nothing is spawned and nothing is bound.
///
/// # Errors
///
/// Returns [`ConfigError::ZeroUnitCount`] for a zero unit count and
/// [`ConfigError::InvalidMaxValue`] when the configured maximum is zero,
/// negative, or not finite.
pub fn attach(
    stage: &mut dyn Stage,
    bus: &mut dyn EventBus,
    host: Rect,
    opts: &[MeterOption],
) -> Result<Model, ConfigError> {
    let mut cfg = Config::default();
    for opt in opts {
        opt.apply(&mut cfg);
    }
    if cfg.unit_count == 0 {
        return Err(ConfigError::ZeroUnitCount);
    }
    if !cfg.max_value.is_finite() || cfg.max_value <= 0.0 {
        return Err(ConfigError::InvalidMaxValue(cfg.max_value));
    }

    let thresholds = thresholds(cfg.max_value, cfg.unit_count, cfg.flip);
    let units = (0..cfg.unit_count)
        .map(|_| stage.spawn(cfg.backend))
        .collect();

    let mut model = Model {
        id: next_listener_id(),
        max_value: cfg.max_value,
        flip: cfg.flip,
        empty_color: cfg.empty_color,
        filled_color: cfg.filled_color,
        topic: cfg.topic,
        backend: cfg.backend,
        value: 0.0,
        host,
        units,
        thresholds,
    };
    model.layout(stage);
    model.recolor(stage);

    if let Some(topic) = model.topic {
        bus.bind(topic, model.id);
    }
    debug!(listener = model.id.0, units = model.units.len(), "unit meter attached");
    Ok(model)
}

impl Model {
    /// The current progress value.
    pub fn value(&self) -> f64 {
        self.value
    }

    /// The configured maximum progress value.
    pub fn max_value(&self) -> f64 {
        self.max_value
    }

    /// Whether the fill direction is flipped.
    pub fn is_flipped(&self) -> bool {
        self.flip
    }

    /// The number of units.
    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    /// The per-unit fill thresholds, in unit order. Increasing for the
    /// default direction, decreasing when flipped.
    pub fn thresholds(&self) -> &[f64] {
        &self.thresholds
    }

    /// The meter's listener identity on the event bus.
    pub fn listener(&self) -> ListenerId {
        self.id
    }

    /// The topic the meter is subscribed to, if any.
    pub fn topic(&self) -> Option<TopicId> {
        self.topic
    }

    /// The rendering path the units were spawned on.
    pub fn backend(&self) -> RenderBackend {
        self.backend
    }

    /// Sets the current progress value and recolors every unit.
    ///
    /// Values outside `[0, max_value]` and non-finite values are ignored,
    /// leaving the previous coloring untouched. Recoloring is
    /// deterministic and idempotent: unit i is filled exactly when the
    /// value reaches its threshold.
    pub fn set_value(&mut self, stage: &mut dyn Stage, value: f64) {
        if !value.is_finite() || value < 0.0 || value > self.max_value {
            debug!(
                value,
                max = self.max_value,
                "ignoring out-of-range progress value"
            );
            return;
        }
        self.value = value;
        self.recolor(stage);
    }

    /// Applies a broadcast event if it was published on the meter's topic.
    pub fn on_event(&mut self, stage: &mut dyn Stage, event: &ProgressEvent) {
        if self.topic != Some(event.topic) {
            return;
        }
        self.set_value(stage, event.value);
    }

    /// Re-lays out every unit against new host geometry. Coloring is
    /// untouched; only the unit rectangles move.
    pub fn sync_geometry(&mut self, stage: &mut dyn Stage, host: Rect) {
        self.host = host;
        self.layout(stage);
    }

    /// Repositions every unit after a host move or restack, keeping the
    /// host extents from the last geometry sync.
    pub fn sync_stacking(&mut self, stage: &mut dyn Stage, x: f64, y: f64, z: i32) {
        self.host.x = x;
        self.host.y = y;
        self.host.z = z;
        self.layout(stage);
    }

    /// Tears the meter down: unbinds its topic subscription and destroys
    /// every unit, synchronously. Consumes the meter.
    pub fn detach(self, stage: &mut dyn Stage, bus: &mut dyn EventBus) {
        if let Some(topic) = self.topic {
            bus.unbind(topic, self.id);
        }
        for unit in &self.units {
            stage.destroy(*unit);
        }
        debug!(listener = self.id.0, "unit meter detached");
    }

    fn layout(&mut self, stage: &mut dyn Stage) {
        let count = self.units.len() as f64;
        let host = self.host;
        trace!(units = self.units.len(), ?host, "laying out meter units");
        match host.dominant_axis() {
            Axis::Horizontal => {
                let step = host.w / count;
                for (i, unit) in self.units.iter().enumerate() {
                    let x = host.x + step * i as f64;
                    stage.set_frame(*unit, Rect::new(x, host.y, step, host.h, host.z));
                }
            }
            Axis::Vertical => {
                let step = host.h / count;
                for (i, unit) in self.units.iter().enumerate() {
                    let y = host.y + step * i as f64;
                    stage.set_frame(*unit, Rect::new(host.x, y, host.w, step, host.z));
                }
            }
        }
    }

    fn recolor(&mut self, stage: &mut dyn Stage) {
        for (unit, threshold) in self.units.iter().zip(&self.thresholds) {
            let color = if self.value >= *threshold {
                &self.filled_color
            } else {
                &self.empty_color
            };
            stage.set_color(*unit, color);
        }
    }
}

// Per-unit fill cutoffs. Unit i fills at (max/count)*(i+1) in the default
// direction, or at max - (max/count)*i when flipped.
fn thresholds(max_value: f64, unit_count: usize, flip: bool) -> Vec<f64> {
    let step = max_value / unit_count as f64;
    (0..unit_count)
        .map(|i| {
            if flip {
                max_value - step * i as f64
            } else {
                step * (i + 1) as f64
            }
        })
        .collect()
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Bindings;
    use crate::stage::Headless;

    fn wide_host() -> Rect {
        Rect::new(0.0, 0.0, 100.0, 25.0, 4)
    }

    fn unit_colors(stage: &Headless, meter: &Model) -> Vec<String> {
        meter
            .units
            .iter()
            .map(|u| stage.color(*u).unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_thresholds_default_direction() {
        let t = thresholds(100.0, 10, false);
        assert_eq!(t, vec![10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0, 90.0, 100.0]);
        assert!(t.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_thresholds_flipped_direction() {
        let t = thresholds(100.0, 10, true);
        assert_eq!(t, vec![100.0, 90.0, 80.0, 70.0, 60.0, 50.0, 40.0, 30.0, 20.0, 10.0]);
        assert!(t.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_attach_spawns_unit_count_blocks() {
        let mut stage = Headless::new();
        let mut bus = Bindings::new();
        let meter = attach(&mut stage, &mut bus, wide_host(), &[with_unit_count(4)]).unwrap();

        assert_eq!(meter.unit_count(), 4);
        assert_eq!(stage.spawned_count(), 4);
        // Nothing is filled at value zero.
        assert!(unit_colors(&stage, &meter)
            .iter()
            .all(|c| c == DEFAULT_EMPTY_COLOR));
    }

    #[test]
    fn test_attach_rejects_zero_units() {
        let mut stage = Headless::new();
        let mut bus = Bindings::new();
        let err = attach(&mut stage, &mut bus, wide_host(), &[with_unit_count(0)])
            .err()
            .unwrap();
        assert_eq!(err, ConfigError::ZeroUnitCount);
        assert_eq!(stage.spawned_count(), 0);
    }

    #[test]
    fn test_attach_rejects_bad_max_value() {
        let mut stage = Headless::new();
        let mut bus = Bindings::new();
        for bad in [0.0, -1.0, f64::NAN] {
            let err = attach(&mut stage, &mut bus, wide_host(), &[with_max_value(bad)])
                .err()
                .unwrap();
            assert!(matches!(err, ConfigError::InvalidMaxValue(_)));
        }
        assert_eq!(stage.spawned_count(), 0);
    }

    #[test]
    fn test_units_fill_up_to_value() {
        let mut stage = Headless::new();
        let mut bus = Bindings::new();
        let mut meter =
            attach(&mut stage, &mut bus, wide_host(), &[with_unit_count(10)]).unwrap();

        meter.set_value(&mut stage, 55.0);

        let colors = unit_colors(&stage, &meter);
        for (i, color) in colors.iter().enumerate() {
            if i < 5 {
                assert_eq!(color, DEFAULT_FILLED_COLOR, "unit {}", i);
            } else {
                assert_eq!(color, DEFAULT_EMPTY_COLOR, "unit {}", i);
            }
        }
    }

    #[test]
    fn test_flipped_units_fill_from_far_end() {
        let mut stage = Headless::new();
        let mut bus = Bindings::new();
        let mut meter = attach(
            &mut stage,
            &mut bus,
            wide_host(),
            &[with_unit_count(10), with_flip_direction()],
        )
        .unwrap();

        meter.set_value(&mut stage, 55.0);

        // Thresholds run 100, 90, .., 10; only the last five are reached.
        let colors = unit_colors(&stage, &meter);
        for (i, color) in colors.iter().enumerate() {
            if i < 5 {
                assert_eq!(color, DEFAULT_EMPTY_COLOR, "unit {}", i);
            } else {
                assert_eq!(color, DEFAULT_FILLED_COLOR, "unit {}", i);
            }
        }
    }

    #[test]
    fn test_value_at_exact_threshold_fills_unit() {
        let mut stage = Headless::new();
        let mut bus = Bindings::new();
        let mut meter =
            attach(&mut stage, &mut bus, wide_host(), &[with_unit_count(10)]).unwrap();

        meter.set_value(&mut stage, 50.0);
        assert_eq!(unit_colors(&stage, &meter)[4], DEFAULT_FILLED_COLOR);
        assert_eq!(unit_colors(&stage, &meter)[5], DEFAULT_EMPTY_COLOR);
    }

    #[test]
    fn test_horizontal_layout_partitions_width() {
        let mut stage = Headless::new();
        let mut bus = Bindings::new();
        let meter = attach(&mut stage, &mut bus, wide_host(), &[with_unit_count(10)]).unwrap();

        for (i, unit) in meter.units.iter().enumerate() {
            let frame = stage.frame(*unit).unwrap();
            assert_eq!(frame, Rect::new(10.0 * i as f64, 0.0, 10.0, 25.0, 4));
        }
    }

    #[test]
    fn test_vertical_layout_partitions_height() {
        let mut stage = Headless::new();
        let mut bus = Bindings::new();
        let host = Rect::new(5.0, 10.0, 20.0, 100.0, 1);
        let meter = attach(&mut stage, &mut bus, host, &[with_unit_count(4)]).unwrap();

        for (i, unit) in meter.units.iter().enumerate() {
            let frame = stage.frame(*unit).unwrap();
            assert_eq!(frame, Rect::new(5.0, 10.0 + 25.0 * i as f64, 20.0, 25.0, 1));
        }
    }

    #[test]
    fn test_sync_geometry_relayouts_units() {
        let mut stage = Headless::new();
        let mut bus = Bindings::new();
        let mut meter =
            attach(&mut stage, &mut bus, wide_host(), &[with_unit_count(4)]).unwrap();

        meter.sync_geometry(&mut stage, Rect::new(0.0, 0.0, 40.0, 8.0, 9));

        for (i, unit) in meter.units.iter().enumerate() {
            let frame = stage.frame(*unit).unwrap();
            assert_eq!(frame, Rect::new(10.0 * i as f64, 0.0, 10.0, 8.0, 9));
        }
    }

    #[test]
    fn test_sync_stacking_repositions_units() {
        let mut stage = Headless::new();
        let mut bus = Bindings::new();
        let mut meter =
            attach(&mut stage, &mut bus, wide_host(), &[with_unit_count(2)]).unwrap();

        meter.sync_stacking(&mut stage, 100.0, 50.0, 12);

        assert_eq!(
            stage.frame(meter.units[0]),
            Some(Rect::new(100.0, 50.0, 50.0, 25.0, 12))
        );
        assert_eq!(
            stage.frame(meter.units[1]),
            Some(Rect::new(150.0, 50.0, 50.0, 25.0, 12))
        );
    }

    #[test]
    fn test_invalid_values_leave_coloring_unchanged() {
        let mut stage = Headless::new();
        let mut bus = Bindings::new();
        let mut meter =
            attach(&mut stage, &mut bus, wide_host(), &[with_unit_count(10)]).unwrap();
        meter.set_value(&mut stage, 55.0);
        let before = unit_colors(&stage, &meter);

        for bad in [-1.0, 100.5, f64::NAN, f64::INFINITY] {
            meter.set_value(&mut stage, bad);
            assert_eq!(meter.value(), 55.0);
            assert_eq!(unit_colors(&stage, &meter), before);
        }
    }

    #[test]
    fn test_repeated_update_is_idempotent() {
        let mut stage = Headless::new();
        let mut bus = Bindings::new();
        let mut meter =
            attach(&mut stage, &mut bus, wide_host(), &[with_unit_count(10)]).unwrap();

        meter.set_value(&mut stage, 30.0);
        let first = unit_colors(&stage, &meter);
        meter.set_value(&mut stage, 30.0);
        assert_eq!(unit_colors(&stage, &meter), first);
    }

    #[test]
    fn test_event_routing_filters_by_topic() {
        let mut stage = Headless::new();
        let mut bus = Bindings::new();
        let topic = TopicId::new(21);
        let mut meter = attach(
            &mut stage,
            &mut bus,
            wide_host(),
            &[with_unit_count(10), with_topic(topic)],
        )
        .unwrap();
        assert!(bus.is_bound(topic, meter.listener()));

        meter.on_event(&mut stage, &ProgressEvent::new(topic, 70.0));
        assert_eq!(meter.value(), 70.0);

        meter.on_event(&mut stage, &ProgressEvent::new(TopicId::new(22), 10.0));
        assert_eq!(meter.value(), 70.0);
    }

    #[test]
    fn test_detach_destroys_units_and_unbinds() {
        let mut stage = Headless::new();
        let mut bus = Bindings::new();
        let topic = TopicId::new(8);
        let meter = attach(
            &mut stage,
            &mut bus,
            wide_host(),
            &[with_unit_count(6), with_topic(topic)],
        )
        .unwrap();
        let units = meter.units.clone();

        meter.detach(&mut stage, &mut bus);

        for unit in units {
            assert!(!stage.is_alive(unit));
        }
        assert_eq!(stage.alive_count(), 0);
        assert!(bus.is_empty());
    }

    #[test]
    fn test_custom_colors() {
        let mut stage = Headless::new();
        let mut bus = Bindings::new();
        let mut meter = attach(
            &mut stage,
            &mut bus,
            wide_host(),
            &[
                with_unit_count(2),
                with_colors("grey".to_string(), "red".to_string()),
            ],
        )
        .unwrap();

        meter.set_value(&mut stage, 60.0);
        assert_eq!(unit_colors(&stage, &meter), vec!["red", "grey"]);
    }
}
