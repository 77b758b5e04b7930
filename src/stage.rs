//! The host-side surface widgets draw on.
//!
//! A widget never talks to a concrete engine. It spawns, positions, colors
//! and destroys its visual sub-elements ("blocks") through the [`Stage`]
//! trait, which the host framework implements against its real entity
//! primitives. The widget is handed a `&mut dyn Stage` on every operation
//! that touches geometry or color, so the host stays in control of when
//! drawing happens.
//!
//! [`Headless`] is a complete in-memory implementation used by this crate's
//! tests and doc examples. It is equally usable by hosts that want to run
//! widgets without a renderer attached.
//!
//! # Basic Usage
//!
//! ```rust
//! use stagebar::stage::{Headless, Rect, RenderBackend, Stage};
//!
//! let mut stage = Headless::new();
//! let block = stage.spawn(RenderBackend::Dom);
//! stage.set_frame(block, Rect::new(10.0, 20.0, 100.0, 25.0, 5));
//! stage.set_color(block, "green");
//!
//! assert_eq!(stage.frame(block).unwrap().w, 100.0);
//! assert_eq!(stage.color(block), Some("green"));
//!
//! stage.destroy(block);
//! assert!(!stage.is_alive(block));
//! ```

use std::collections::HashMap;

/// An axis-aligned rectangle with a stacking order.
///
/// This is the geometry a host entity exposes and the geometry a widget
/// assigns to each of its blocks: position (`x`, `y`), size (`w`, `h`) and
/// the z stacking value.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    pub w: f64,
    /// Height.
    pub h: f64,
    /// Stacking order. Higher values draw in front.
    pub z: i32,
}

impl Rect {
    /// Creates a rectangle from position, size and stacking order.
    pub fn new(x: f64, y: f64, w: f64, h: f64, z: i32) -> Self {
        Self { x, y, w, h, z }
    }

    /// Returns the axis with the larger extent.
    ///
    /// Widgets subdivide their host along this axis. A square host counts
    /// as horizontally dominant, so bars on square hosts fill left to
    /// right.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use stagebar::stage::{Axis, Rect};
    ///
    /// let wide = Rect::new(0.0, 0.0, 100.0, 25.0, 0);
    /// assert_eq!(wide.dominant_axis(), Axis::Horizontal);
    ///
    /// let tall = Rect::new(0.0, 0.0, 25.0, 100.0, 0);
    /// assert_eq!(tall.dominant_axis(), Axis::Vertical);
    ///
    /// let square = Rect::new(0.0, 0.0, 50.0, 50.0, 0);
    /// assert_eq!(square.dominant_axis(), Axis::Horizontal);
    /// ```
    pub fn dominant_axis(&self) -> Axis {
        if self.w >= self.h {
            Axis::Horizontal
        } else {
            Axis::Vertical
        }
    }
}

/// The geometric axis a host rectangle is subdivided along.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Axis {
    /// Subdivide along the width, left to right.
    Horizontal,
    /// Subdivide along the height, top to bottom.
    Vertical,
}

/// Which of the host's rendering paths a block is created on.
///
/// Hosts that only have one path are free to ignore this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RenderBackend {
    /// Retained DOM-style elements.
    #[default]
    Dom,
    /// Immediate canvas drawing.
    Canvas,
}

/// Opaque handle to a block spawned on a [`Stage`].
///
/// Handles are issued by the stage and only meaningful to the stage that
/// issued them. A widget holds the handles of the blocks it spawned and
/// destroys them when it is detached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockId(pub u64);

/// Host-provided operations on visual sub-elements.
///
/// The four operations map onto the primitives every retained 2D engine
/// already has: create an entity, move/resize it, recolor it, destroy it.
/// Implementations must apply each call synchronously; widgets rely on a
/// destroyed block being gone when `destroy` returns.
pub trait Stage {
    /// Creates a new block on the given rendering path and returns its
    /// handle. The block's initial geometry and color are unspecified
    /// until the first `set_frame` / `set_color` calls.
    fn spawn(&mut self, backend: RenderBackend) -> BlockId;

    /// Moves, resizes and restacks a block in one call.
    fn set_frame(&mut self, block: BlockId, frame: Rect);

    /// Sets a block's fill color. Color strings are passed through to the
    /// host verbatim (named colors, hex codes, whatever the host accepts).
    fn set_color(&mut self, block: BlockId, color: &str);

    /// Destroys a block. The handle must not be used afterwards.
    fn destroy(&mut self, block: BlockId);
}

/// Recorded state of one [`Headless`] block.
#[derive(Debug, Clone)]
struct BlockState {
    backend: RenderBackend,
    frame: Option<Rect>,
    color: Option<String>,
    alive: bool,
}

/// An in-memory [`Stage`] that records everything widgets do to it.
///
/// `Headless` keeps every spawned block around after destruction (marked
/// dead) so tests can assert on the full lifecycle: what was spawned, the
/// last frame and color each block carried, and whether it was destroyed.
///
/// # Panics
///
/// `set_frame`, `set_color` and `destroy` panic when handed a handle that
/// was never spawned here or that was already destroyed. A widget driving
/// a stale handle is a bug worth surfacing loudly in tests.
#[derive(Debug, Default)]
pub struct Headless {
    blocks: HashMap<BlockId, BlockState>,
    next_id: u64,
}

impl Headless {
    /// Creates an empty stage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of blocks ever spawned, including destroyed ones.
    pub fn spawned_count(&self) -> usize {
        self.blocks.len()
    }

    /// Number of blocks currently alive.
    pub fn alive_count(&self) -> usize {
        self.blocks.values().filter(|b| b.alive).count()
    }

    /// Whether a block exists and has not been destroyed.
    pub fn is_alive(&self, block: BlockId) -> bool {
        self.blocks.get(&block).map(|b| b.alive).unwrap_or(false)
    }

    /// The rendering path a block was spawned on, if it was spawned here.
    pub fn backend(&self, block: BlockId) -> Option<RenderBackend> {
        self.blocks.get(&block).map(|b| b.backend)
    }

    /// The last frame assigned to a block, destroyed or not.
    pub fn frame(&self, block: BlockId) -> Option<Rect> {
        self.blocks.get(&block).and_then(|b| b.frame)
    }

    /// The last color assigned to a block, destroyed or not.
    pub fn color(&self, block: BlockId) -> Option<&str> {
        self.blocks.get(&block).and_then(|b| b.color.as_deref())
    }

    fn live_block_mut(&mut self, block: BlockId) -> &mut BlockState {
        let state = self
            .blocks
            .get_mut(&block)
            .unwrap_or_else(|| panic!("unknown block {:?}", block));
        assert!(state.alive, "block {:?} was already destroyed", block);
        state
    }
}

impl Stage for Headless {
    fn spawn(&mut self, backend: RenderBackend) -> BlockId {
        self.next_id += 1;
        let id = BlockId(self.next_id);
        self.blocks.insert(
            id,
            BlockState {
                backend,
                frame: None,
                color: None,
                alive: true,
            },
        );
        id
    }

    fn set_frame(&mut self, block: BlockId, frame: Rect) {
        self.live_block_mut(block).frame = Some(frame);
    }

    fn set_color(&mut self, block: BlockId, color: &str) {
        self.live_block_mut(block).color = Some(color.to_string());
    }

    fn destroy(&mut self, block: BlockId) {
        self.live_block_mut(block).alive = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dominant_axis_width_wins() {
        let r = Rect::new(0.0, 0.0, 100.0, 25.0, 0);
        assert_eq!(r.dominant_axis(), Axis::Horizontal);
    }

    #[test]
    fn test_dominant_axis_height_wins() {
        let r = Rect::new(0.0, 0.0, 25.0, 100.0, 0);
        assert_eq!(r.dominant_axis(), Axis::Vertical);
    }

    #[test]
    fn test_dominant_axis_tie_favors_width() {
        let r = Rect::new(0.0, 0.0, 50.0, 50.0, 0);
        assert_eq!(r.dominant_axis(), Axis::Horizontal);
    }

    #[test]
    fn test_headless_records_lifecycle() {
        let mut stage = Headless::new();
        let a = stage.spawn(RenderBackend::Dom);
        let b = stage.spawn(RenderBackend::Canvas);
        assert_ne!(a, b);
        assert_eq!(stage.spawned_count(), 2);
        assert_eq!(stage.alive_count(), 2);
        assert_eq!(stage.backend(b), Some(RenderBackend::Canvas));

        stage.set_frame(a, Rect::new(1.0, 2.0, 3.0, 4.0, 5));
        stage.set_color(a, "#ff0000");
        assert_eq!(stage.frame(a), Some(Rect::new(1.0, 2.0, 3.0, 4.0, 5)));
        assert_eq!(stage.color(a), Some("#ff0000"));

        stage.destroy(a);
        assert!(!stage.is_alive(a));
        assert!(stage.is_alive(b));
        assert_eq!(stage.alive_count(), 1);
        // Destroyed blocks keep their last recorded state for inspection.
        assert_eq!(stage.color(a), Some("#ff0000"));
    }

    #[test]
    #[should_panic(expected = "already destroyed")]
    fn test_headless_rejects_stale_handles() {
        let mut stage = Headless::new();
        let a = stage.spawn(RenderBackend::Dom);
        stage.destroy(a);
        stage.set_color(a, "blue");
    }
}
