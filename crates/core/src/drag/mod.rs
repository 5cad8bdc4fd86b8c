//! Touch-drag navigation for horizontally scrolling strips.
//!
//! [`DragNavigator`] turns raw pointer X positions into either a committed
//! previous/next step or a snap back to the resting position. The strip
//! itself belongs to the presentation layer and is driven through the
//! [`DragSurface`] trait.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::metrics;

/// Drag tuning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DragConfig {
    /// Minimum horizontal travel, in pixels, for a gesture to navigate
    /// (default: 30).
    #[serde(default = "default_threshold_px")]
    pub threshold_px: f64,
    /// Width of one strip item in pixels.
    #[serde(default = "default_item_width")]
    pub item_width: f64,
    /// Gap between strip items in pixels.
    #[serde(default = "default_gap")]
    pub gap: f64,
}

impl Default for DragConfig {
    fn default() -> Self {
        Self {
            threshold_px: default_threshold_px(),
            item_width: default_item_width(),
            gap: default_gap(),
        }
    }
}

impl DragConfig {
    /// Distance between the resting positions of two neighbouring items.
    pub fn item_stride(&self) -> f64 {
        self.item_width + self.gap
    }
}

fn default_threshold_px() -> f64 {
    30.0
}

fn default_item_width() -> f64 {
    280.0
}

fn default_gap() -> f64 {
    16.0
}

/// The strip a [`DragNavigator`] drives.
pub trait DragSurface {
    /// Drag navigation only runs in mobile mode.
    fn is_mobile(&self) -> bool;

    /// Index of the item the strip currently rests on.
    fn current_index(&self) -> usize;

    fn can_go_previous(&self) -> bool;

    fn can_go_next(&self) -> bool;

    fn go_previous(&mut self);

    fn go_next(&mut self);

    /// Turn off the strip's transition animation so it follows the finger.
    fn disable_transition(&mut self);

    /// Turn the transition animation back on.
    fn restore_transition(&mut self);

    /// Move the strip to `offset` pixels from its left edge.
    fn set_offset(&mut self, offset: f64);

    /// Return the strip to the resting position of the current item.
    fn snap_back(&mut self);
}

/// Gesture phase.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum DragPhase {
    #[default]
    Idle,
    Dragging { start_x: f64, current_x: f64 },
}

/// How a gesture ended, or why an event was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragOutcome {
    /// Not in mobile mode or no gesture in progress.
    Ignored,
    Previous,
    Next,
    SnappedBack,
}

impl DragOutcome {
    fn as_label(self) -> &'static str {
        match self {
            DragOutcome::Ignored => "ignored",
            DragOutcome::Previous => "previous",
            DragOutcome::Next => "next",
            DragOutcome::SnappedBack => "snapped_back",
        }
    }
}

/// Interprets one touch gesture at a time.
///
/// Every handler is a no-op outside mobile mode, and move/end handlers are
/// no-ops without an active gesture, so they can stay wired to the strip
/// permanently.
#[derive(Debug, Clone, Default)]
pub struct DragNavigator {
    config: DragConfig,
    phase: DragPhase,
}

impl DragNavigator {
    pub fn new(config: DragConfig) -> Self {
        Self {
            config,
            phase: DragPhase::Idle,
        }
    }

    pub fn config(&self) -> &DragConfig {
        &self.config
    }

    pub fn phase(&self) -> DragPhase {
        self.phase
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.phase, DragPhase::Dragging { .. })
    }

    /// Signed travel of the current gesture; positive is rightward. 0 when
    /// idle.
    pub fn drag_distance(&self) -> f64 {
        match self.phase {
            DragPhase::Idle => 0.0,
            DragPhase::Dragging { start_x, current_x } => current_x - start_x,
        }
    }

    /// Begin a gesture at `x`. Returns whether a gesture started.
    pub fn touch_start<S: DragSurface + ?Sized>(&mut self, surface: &mut S, x: f64) -> bool {
        if !surface.is_mobile() {
            return false;
        }

        self.phase = DragPhase::Dragging {
            start_x: x,
            current_x: x,
        };
        surface.disable_transition();
        true
    }

    /// Follow the finger to `x`.
    ///
    /// The strip is clamped at its left edge; overscroll past the last item
    /// is allowed here and rejected when the gesture ends.
    pub fn touch_move<S: DragSurface + ?Sized>(&mut self, surface: &mut S, x: f64) {
        if !surface.is_mobile() {
            return;
        }
        let DragPhase::Dragging { start_x, .. } = self.phase else {
            return;
        };

        self.phase = DragPhase::Dragging {
            start_x,
            current_x: x,
        };

        let base_offset = surface.current_index() as f64 * self.config.item_stride();
        surface.set_offset((base_offset - self.drag_distance()).max(0.0));
    }

    /// Finish the gesture: navigate if it travelled far enough in an allowed
    /// direction, otherwise snap back.
    pub fn touch_end<S: DragSurface + ?Sized>(&mut self, surface: &mut S) -> DragOutcome {
        if !surface.is_mobile() || !self.is_dragging() {
            return DragOutcome::Ignored;
        }

        let distance = self.drag_distance();
        self.phase = DragPhase::Idle;
        surface.restore_transition();

        let outcome = if distance.abs() > self.config.threshold_px {
            if distance > 0.0 && surface.can_go_previous() {
                surface.go_previous();
                DragOutcome::Previous
            } else if distance < 0.0 && surface.can_go_next() {
                surface.go_next();
                DragOutcome::Next
            } else {
                surface.snap_back();
                DragOutcome::SnappedBack
            }
        } else {
            surface.snap_back();
            DragOutcome::SnappedBack
        };

        debug!("Drag ended: distance={:.1}, outcome={:?}", distance, outcome);
        metrics::DRAG_GESTURES
            .with_label_values(&[outcome.as_label()])
            .inc();

        outcome
    }

    /// Abort the gesture (e.g. the system took over the touch) and return
    /// the strip to rest without navigating.
    pub fn touch_cancel<S: DragSurface + ?Sized>(&mut self, surface: &mut S) -> DragOutcome {
        if !surface.is_mobile() || !self.is_dragging() {
            return DragOutcome::Ignored;
        }

        self.phase = DragPhase::Idle;
        surface.restore_transition();
        surface.snap_back();
        DragOutcome::SnappedBack
    }
}
