use std::time::Instant;

use tracing::debug;
use wall_config::EdgeStretchOptions;

use crate::scheduler::{Delay, TaskIds, TaskSlot};
use crate::viewport::ViewportState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeSide {
    Left,
    Right,
}

impl EdgeSide {
    /// Sign of the translation pushing the wall away from this edge.
    fn direction(self) -> f64 {
        match self {
            EdgeSide::Left => 1.0,
            EdgeSide::Right => -1.0,
        }
    }
}

/// Which horizontal edge, if any, the viewport is resting on.
pub fn touching_edge(viewport: &ViewportState, tolerance: f64) -> Option<EdgeSide> {
    if viewport.at_left_edge() {
        Some(EdgeSide::Left)
    } else if viewport.at_right_edge(tolerance) {
        Some(EdgeSide::Right)
    } else {
        None
    }
}

/// Cosmetic overscroll cue: a short horizontal shove of the whole wall when
/// scrolling lands on an edge. Horizontal only.
#[derive(Debug)]
pub struct EdgeStretch {
    options: EdgeStretchOptions,
    side: Option<EdgeSide>,
    revert: TaskSlot<Delay>,
    pending_check: TaskSlot<Delay>,
}

impl EdgeStretch {
    pub fn new(options: EdgeStretchOptions) -> Self {
        Self {
            options,
            side: None,
            revert: TaskSlot::default(),
            pending_check: TaskSlot::default(),
        }
    }

    /// Starts a stretch if the viewport rests on an edge and none is running.
    pub fn check(
        &mut self,
        ids: &mut TaskIds,
        viewport: &ViewportState,
        now: Instant,
    ) -> Option<EdgeSide> {
        if !self.options.enabled || self.revert.is_running() {
            return None;
        }
        let side = touching_edge(viewport, self.options.edge_tolerance)?;
        self.side = Some(side);
        self.revert
            .start(ids.spawn(Delay::until(now + self.options.duration)));
        debug!(?side, amount = self.options.amount, "edge stretch");
        Some(side)
    }

    /// Re-checks the edges shortly after a drag ends.
    pub fn schedule_check(&mut self, ids: &mut TaskIds, now: Instant) {
        if self.options.enabled {
            self.pending_check
                .start(ids.spawn(Delay::until(now + self.options.release_delay)));
        }
    }

    /// Advances both timers. Returns the side of a stretch started by a due check.
    pub fn tick(
        &mut self,
        ids: &mut TaskIds,
        viewport: &ViewportState,
        now: Instant,
    ) -> Option<EdgeSide> {
        if self.revert.tick(&mut (), now).is_some() {
            debug!(side = ?self.side, "edge stretch reverted");
            self.side = None;
        }
        if self.pending_check.tick(&mut (), now).is_some() {
            return self.check(ids, viewport, now);
        }
        None
    }

    /// Current horizontal translation of the wall, in px.
    pub fn translation(&self) -> f64 {
        self.side
            .map_or(0.0, |side| side.direction() * self.options.amount)
    }

    pub fn is_active(&self) -> bool {
        self.side.is_some()
    }

    /// A post-release check is waiting for its delay.
    pub fn has_pending_check(&self) -> bool {
        self.pending_check.is_running()
    }

    pub fn cancel(&mut self) {
        self.revert.cancel();
        self.pending_check.cancel();
        self.side = None;
    }
}
