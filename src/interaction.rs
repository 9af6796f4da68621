//! Pointer/drag interaction state machine.
//!
//! `Idle → Dragging → {Momentum | Snapping} → Idle`. The running momentum or
//! snap task lives inside the mode value itself, so the viewport can only ever
//! have one animated mutator and replacing the mode cancels the old one.

use std::time::Instant;

use serde::Serialize;
use tracing::debug;
use wall_config::{MomentumOptions, SnapOptions};

use crate::events::{PointerEvent, PointerTarget};
use crate::layout::{GridLayout, GridMode};
use crate::momentum::Momentum;
use crate::scheduler::{Flow, FrameTask, TaskIds};
use crate::snap::Snap;
use crate::viewport::ViewportState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum InteractionMode {
    Idle,
    Dragging,
    Momentum,
    Snapping,
}

/// Which post-release behaviour a drag feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragTrack {
    /// Horizontal only; snaps to the nearest cell on release.
    Dock,
    /// Free 2D panning; coasts with momentum on release.
    Free,
}

impl From<GridMode> for DragTrack {
    fn from(mode: GridMode) -> Self {
        match mode {
            GridMode::Wall => DragTrack::Free,
            GridMode::Dock => DragTrack::Dock,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GestureSession {
    pub track: DragTrack,
    pub start: (f64, f64),
    pub last: (f64, f64),
    pub last_at: Instant,
    pub start_scroll: (f64, f64),
    /// Instantaneous velocity in px/ms.
    pub velocity: (f64, f64),
}

impl GestureSession {
    fn begin(track: DragTrack, event: &PointerEvent, viewport: &ViewportState) -> Self {
        Self {
            track,
            start: (event.x, event.y),
            last: (event.x, event.y),
            last_at: event.at,
            start_scroll: viewport.offset(),
            velocity: (0.0, 0.0),
        }
    }

    /// Records a move and returns the pointer delta that should scroll the viewport.
    fn advance(&mut self, event: &PointerEvent) -> (f64, f64) {
        let dx = event.x - self.last.0;
        let dy = match self.track {
            DragTrack::Free => event.y - self.last.1,
            DragTrack::Dock => 0.0,
        };
        // Whole milliseconds, +1 so back-to-back samples never divide by zero.
        let elapsed = event.at.saturating_duration_since(self.last_at).as_millis() as f64 + 1.0;
        self.velocity = (dx / elapsed, dy / elapsed);
        self.last = (event.x, event.y);
        self.last_at = event.at;
        (dx, dy)
    }

    /// Total pointer travel since the gesture started.
    pub fn travel(&self) -> (f64, f64) {
        (self.last.0 - self.start.0, self.last.1 - self.start.1)
    }
}

#[derive(Debug)]
enum Motion {
    Idle,
    Dragging(GestureSession),
    Momentum(FrameTask<Momentum>),
    Snapping(FrameTask<Snap>),
}

impl Motion {
    fn mode(&self) -> InteractionMode {
        match self {
            Motion::Idle => InteractionMode::Idle,
            Motion::Dragging(_) => InteractionMode::Dragging,
            Motion::Momentum(_) => InteractionMode::Momentum,
            Motion::Snapping(_) => InteractionMode::Snapping,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragStart {
    /// The pointer went down on a cell; nothing changed.
    OnCell,
    /// A drag session started after cancelling whatever was in `cancelled`.
    Started { cancelled: InteractionMode },
}

/// Result of stepping the active animation for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MotionStep {
    /// The viewport offset changed.
    pub moved: bool,
    /// The animation that just completed, if any.
    pub finished: Option<InteractionMode>,
}

#[derive(Debug)]
pub struct InteractionState {
    motion: Motion,
}

impl Default for InteractionState {
    fn default() -> Self {
        Self {
            motion: Motion::Idle,
        }
    }
}

impl InteractionState {
    pub fn mode(&self) -> InteractionMode {
        self.motion.mode()
    }

    pub fn session(&self) -> Option<&GestureSession> {
        match &self.motion {
            Motion::Dragging(session) => Some(session),
            _ => None,
        }
    }

    pub fn momentum(&self) -> Option<&Momentum> {
        match &self.motion {
            Motion::Momentum(task) => Some(task.body()),
            _ => None,
        }
    }

    pub fn snap(&self) -> Option<&Snap> {
        match &self.motion {
            Motion::Snapping(task) => Some(task.body()),
            _ => None,
        }
    }

    /// Momentum or snap is running.
    pub fn is_animating(&self) -> bool {
        matches!(self.motion, Motion::Momentum(_) | Motion::Snapping(_))
    }

    /// Drops whatever is running and returns to idle. Returns the mode that was cancelled.
    pub fn cancel(&mut self) -> InteractionMode {
        let previous = std::mem::replace(&mut self.motion, Motion::Idle).mode();
        if previous != InteractionMode::Idle {
            debug!(?previous, "interaction cancelled");
        }
        previous
    }

    /// Pointer-down. Drags only ever start on the background.
    pub fn begin_drag(
        &mut self,
        track: DragTrack,
        event: &PointerEvent,
        viewport: &ViewportState,
    ) -> DragStart {
        if let PointerTarget::Cell(_) = event.target {
            return DragStart::OnCell;
        }
        let cancelled = self.cancel();
        self.motion = Motion::Dragging(GestureSession::begin(track, event, viewport));
        debug!(?track, x = event.x, y = event.y, ?cancelled, "drag started");
        DragStart::Started { cancelled }
    }

    /// Pointer-move. Scrolls 1:1 against the pointer; returns whether the viewport moved.
    pub fn drag_move(&mut self, event: &PointerEvent, viewport: &mut ViewportState) -> bool {
        let Motion::Dragging(session) = &mut self.motion else {
            return false;
        };
        let (dx, dy) = session.advance(event);
        viewport.scroll_by(-dx, -dy)
    }

    /// Pointer-up/leave/cancel. Hands the gesture off to momentum or snap.
    pub fn release(
        &mut self,
        ids: &mut TaskIds,
        layout: &GridLayout,
        viewport: &ViewportState,
        momentum: &MomentumOptions,
        snap: &SnapOptions,
    ) -> InteractionMode {
        let session = match std::mem::replace(&mut self.motion, Motion::Idle) {
            Motion::Dragging(session) => session,
            other => {
                self.motion = other;
                return self.mode();
            }
        };

        self.motion = match session.track {
            DragTrack::Free => {
                let body = Momentum::from_release(session.velocity, momentum);
                debug!(
                    velocity = ?session.velocity,
                    speed = ?body.speed(),
                    "drag released into momentum"
                );
                Motion::Momentum(ids.spawn(body))
            }
            DragTrack::Dock => match Snap::to_center(layout, viewport, snap) {
                Some((cell, body)) => {
                    debug!(?cell, target = ?body.target(), "drag released into snap");
                    Motion::Snapping(ids.spawn(body))
                }
                None => Motion::Idle,
            },
        };
        self.mode()
    }

    /// Starts a snap outside of a drag, cancelling anything running.
    pub fn start_snap(&mut self, ids: &mut TaskIds, snap: Snap) -> InteractionMode {
        let cancelled = self.cancel();
        self.motion = Motion::Snapping(ids.spawn(snap));
        cancelled
    }

    /// Advances momentum or snap by one frame.
    pub fn step(&mut self, viewport: &mut ViewportState, now: Instant) -> MotionStep {
        let before = viewport.offset();
        let flow = match &mut self.motion {
            Motion::Momentum(task) => task.tick(viewport, now),
            Motion::Snapping(task) => task.tick(viewport, now),
            Motion::Idle | Motion::Dragging(_) => return MotionStep::default(),
        };
        let moved = viewport.offset() != before;
        let finished = match flow {
            Flow::Continue => None,
            Flow::Done => {
                let mode = self.mode();
                let frames = match &self.motion {
                    Motion::Momentum(task) => task.frames(),
                    Motion::Snapping(task) => task.frames(),
                    _ => 0,
                };
                debug!(?mode, frames, scroll = ?viewport.offset(), "animation settled");
                self.motion = Motion::Idle;
                Some(mode)
            }
        };
        MotionStep { moved, finished }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{CellId, PointerPhase};
    use crate::layout::{GridMode, LayoutRequest, build_grid};
    use crate::color::BackgroundColor;
    use rand::{SeedableRng, rngs::StdRng};
    use std::time::Duration;
    use wall_config::GridOptions;

    fn layout() -> GridLayout {
        let grid = GridOptions::default();
        let images = vec!["https://example.com/a.jpg".to_string()];
        build_grid(
            &LayoutRequest {
                viewport_width: 1280.0,
                viewport_height: 800.0,
                images: &images,
                placeholders: &[],
                background: BackgroundColor::default(),
                grid: &grid,
                mode: GridMode::Wall,
            },
            &mut StdRng::seed_from_u64(3),
        )
    }

    #[test]
    fn velocity_uses_elapsed_plus_one() {
        let layout = layout();
        let mut vp = layout.viewport(1280.0, 800.0);
        let t0 = Instant::now();
        let mut state = InteractionState::default();
        let down = PointerEvent::new(PointerPhase::Down, 500.0, 400.0, t0);
        state.begin_drag(DragTrack::Free, &down, &vp);

        let start = vp.offset();
        let mv = PointerEvent::new(PointerPhase::Move, 530.0, 390.0, t0 + Duration::from_millis(9));
        assert!(state.drag_move(&mv, &mut vp));
        assert_eq!(vp.offset(), (start.0 - 30.0, start.1 + 10.0));
        let session = state.session().unwrap();
        assert_eq!(session.velocity, (3.0, -1.0));
        assert_eq!(session.travel(), (30.0, -10.0));

        // Same timestamp: divides by one rather than zero.
        let mv = PointerEvent::new(PointerPhase::Move, 532.0, 390.0, t0 + Duration::from_millis(9));
        state.drag_move(&mv, &mut vp);
        assert_eq!(state.session().unwrap().velocity, (2.0, 0.0));
    }

    #[test]
    fn dock_track_ignores_vertical_motion() {
        let layout = layout();
        let mut vp = layout.viewport(1280.0, 800.0);
        let start = vp.offset();
        let t0 = Instant::now();
        let mut state = InteractionState::default();
        state.begin_drag(DragTrack::Dock, &PointerEvent::new(PointerPhase::Down, 0.0, 0.0, t0), &vp);
        let mv = PointerEvent::new(PointerPhase::Move, -20.0, 50.0, t0 + Duration::from_millis(4));
        state.drag_move(&mv, &mut vp);
        assert_eq!(vp.offset(), (start.0 + 20.0, start.1));
    }

    #[test]
    fn pointer_down_on_cell_changes_nothing() {
        let layout = layout();
        let vp = layout.viewport(1280.0, 800.0);
        let mut state = InteractionState::default();
        let down = PointerEvent::new(PointerPhase::Down, 10.0, 10.0, Instant::now())
            .on(PointerTarget::Cell(CellId(4)));
        assert_eq!(state.begin_drag(DragTrack::Free, &down, &vp), DragStart::OnCell);
        assert_eq!(state.mode(), InteractionMode::Idle);
    }

    #[test]
    fn release_without_drag_is_a_no_op() {
        let layout = layout();
        let vp = layout.viewport(1280.0, 800.0);
        let mut ids = TaskIds::default();
        let mut state = InteractionState::default();
        let mode = state.release(
            &mut ids,
            &layout,
            &vp,
            &MomentumOptions::default(),
            &SnapOptions::default(),
        );
        assert_eq!(mode, InteractionMode::Idle);
    }

    #[test]
    fn stray_release_keeps_running_momentum() {
        let layout = layout();
        let mut vp = layout.viewport(1280.0, 800.0);
        let mut ids = TaskIds::default();
        let mut state = InteractionState::default();
        let t0 = Instant::now();
        state.begin_drag(DragTrack::Free, &PointerEvent::new(PointerPhase::Down, 600.0, 400.0, t0), &vp);
        let mv = PointerEvent::new(PointerPhase::Move, 500.0, 400.0, t0 + Duration::from_millis(10));
        state.drag_move(&mv, &mut vp);

        let momentum = MomentumOptions::default();
        let snap = SnapOptions::default();
        assert_eq!(
            state.release(&mut ids, &layout, &vp, &momentum, &snap),
            InteractionMode::Momentum
        );
        let speed = state.momentum().map(Momentum::speed);

        assert_eq!(
            state.release(&mut ids, &layout, &vp, &momentum, &snap),
            InteractionMode::Momentum
        );
        assert_eq!(state.mode(), InteractionMode::Momentum);
        assert_eq!(state.momentum().map(Momentum::speed), speed);
    }
}
